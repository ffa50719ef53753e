use crate::db::types::ResultStatus;
use crate::repositories::results::{ResultStore, StoreError};
use crate::schemas::result::{QuestionStatistics, QuizStatistics, UserStatistics};

/// Aggregates over all attempts of a quiz. Score fields stay `None` while
/// nobody has taken it. The queries are independent reads, not one snapshot.
pub(crate) async fn quiz_statistics(
    store: &dyn ResultStore,
    quiz_id: i64,
) -> Result<QuizStatistics, StoreError> {
    Ok(QuizStatistics {
        quiz_id,
        total_attempts: store.count_by_quiz(quiz_id).await?,
        passed_count: store.count_by_quiz_and_status(quiz_id, ResultStatus::Passed).await?,
        failed_count: store.count_by_quiz_and_status(quiz_id, ResultStatus::Failed).await?,
        average_score: store.average_score_by_quiz(quiz_id).await?,
        highest_score: store.max_score_by_quiz(quiz_id).await?,
        lowest_score: store.min_score_by_quiz(quiz_id).await?,
    })
}

pub(crate) async fn user_statistics(
    store: &dyn ResultStore,
    user_id: i64,
) -> Result<UserStatistics, StoreError> {
    let summary = store.user_summary(user_id).await?;
    Ok(UserStatistics {
        user_id,
        total_quizzes_taken: summary.total,
        quizzes_passed: summary.passed,
        quizzes_failed: summary.failed,
        average_score: summary.average_score.unwrap_or(0.0),
        best_score: summary.best_score.unwrap_or(0.0),
    })
}

pub(crate) async fn question_statistics(
    store: &dyn ResultStore,
    question_id: i64,
) -> Result<QuestionStatistics, StoreError> {
    let summary = store.question_summary(question_id).await?;
    Ok(QuestionStatistics {
        question_id,
        total_answers: summary.total,
        correct_count: summary.correct,
        wrong_count: summary.total - summary.correct,
        average_time_seconds: summary.average_time.unwrap_or(0.0),
    })
}
