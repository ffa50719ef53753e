use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::db::models::{GradedAttempt, QuestionResult, QuizResult};
use crate::db::types::ResultStatus;

use super::types::{NewQuizResult, PageRequest, QuestionAnswerSummary, UserScoreSummary};
use super::{ResultStore, StoreError};

pub(crate) const COLUMNS: &str = "\
    id, user_id, quiz_id, total_questions, correct_answers, wrong_answers, score, time_taken, \
    status, start_time, end_time, created_at";

pub(crate) const OUTCOME_COLUMNS: &str = "\
    id, quiz_result_id, position, question_id, user_answer, correct_answer, is_correct, \
    points_earned, max_points, time_taken";

#[derive(Clone)]
pub(crate) struct PgResultStore {
    pool: PgPool,
}

impl PgResultStore {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn page_by(
        &self,
        column: &'static str,
        value: i64,
        page: PageRequest,
    ) -> Result<(Vec<QuizResult>, i64), StoreError> {
        let mut builder =
            QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM quiz_results WHERE "));
        builder.push(column);
        builder.push(" = ");
        builder.push_bind(value);
        builder.push(" ORDER BY created_at DESC, id DESC OFFSET ");
        builder.push_bind(page.skip.max(0));
        builder.push(" LIMIT ");
        builder.push_bind(page.limit.max(1));

        let items = builder.build_query_as::<QuizResult>().fetch_all(&self.pool).await?;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM quiz_results WHERE {column} = $1"
        ))
        .bind(value)
        .fetch_one(&self.pool)
        .await?;

        Ok((items, total))
    }

    async fn score_aggregate(
        &self,
        function: &'static str,
        quiz_id: i64,
    ) -> Result<Option<f64>, StoreError> {
        let value = sqlx::query_scalar::<_, Option<f64>>(&format!(
            "SELECT {function}(score)::DOUBLE PRECISION FROM quiz_results WHERE quiz_id = $1"
        ))
        .bind(quiz_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(value)
    }
}

#[async_trait]
impl ResultStore for PgResultStore {
    async fn save(&self, attempt: NewQuizResult) -> Result<GradedAttempt, StoreError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query_as::<_, QuizResult>(&format!(
            "INSERT INTO quiz_results (
                user_id, quiz_id, total_questions, correct_answers, wrong_answers, score,
                time_taken, status, start_time, end_time, created_at
             ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$10)
             RETURNING {COLUMNS}"
        ))
        .bind(attempt.user_id)
        .bind(attempt.quiz_id)
        .bind(attempt.total_questions)
        .bind(attempt.correct_answers)
        .bind(attempt.wrong_answers)
        .bind(attempt.score)
        .bind(attempt.time_taken)
        .bind(attempt.status)
        .bind(attempt.start_time)
        .bind(attempt.end_time)
        .fetch_one(&mut *tx)
        .await?;

        let outcomes = if attempt.outcomes.is_empty() {
            Vec::new()
        } else {
            let mut builder = QueryBuilder::<Postgres>::new(
                "INSERT INTO question_results (
                    quiz_result_id, position, question_id, user_answer, correct_answer,
                    is_correct, points_earned, max_points, time_taken
                 ) ",
            );
            let result_id = result.id;
            builder.push_values(
                attempt.outcomes.iter().enumerate(),
                |mut row, (position, outcome)| {
                    row.push_bind(result_id)
                        .push_bind(position as i32)
                        .push_bind(outcome.question_id)
                        .push_bind(&outcome.user_answer)
                        .push_bind(&outcome.correct_answer)
                        .push_bind(outcome.is_correct)
                        .push_bind(outcome.points_earned)
                        .push_bind(outcome.max_points)
                        .push_bind(outcome.time_taken);
                },
            );
            builder.push(format!(" RETURNING {OUTCOME_COLUMNS}"));

            let mut rows =
                builder.build_query_as::<QuestionResult>().fetch_all(&mut *tx).await?;
            rows.sort_by_key(|row| row.position);
            rows
        };

        tx.commit().await?;

        Ok(GradedAttempt { result, outcomes })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<GradedAttempt>, StoreError> {
        let result = sqlx::query_as::<_, QuizResult>(&format!(
            "SELECT {COLUMNS} FROM quiz_results WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(result) = result else {
            return Ok(None);
        };

        let outcomes = sqlx::query_as::<_, QuestionResult>(&format!(
            "SELECT {OUTCOME_COLUMNS} FROM question_results
             WHERE quiz_result_id = $1
             ORDER BY position ASC"
        ))
        .bind(result.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(GradedAttempt { result, outcomes }))
    }

    async fn find_by_user(
        &self,
        user_id: i64,
        page: PageRequest,
    ) -> Result<(Vec<QuizResult>, i64), StoreError> {
        self.page_by("user_id", user_id, page).await
    }

    async fn find_by_quiz(
        &self,
        quiz_id: i64,
        page: PageRequest,
    ) -> Result<(Vec<QuizResult>, i64), StoreError> {
        self.page_by("quiz_id", quiz_id, page).await
    }

    async fn count_by_quiz(&self, quiz_id: i64) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM quiz_results WHERE quiz_id = $1",
        )
        .bind(quiz_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn count_by_quiz_and_status(
        &self,
        quiz_id: i64,
        status: ResultStatus,
    ) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM quiz_results WHERE quiz_id = $1 AND status = $2",
        )
        .bind(quiz_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn average_score_by_quiz(&self, quiz_id: i64) -> Result<Option<f64>, StoreError> {
        self.score_aggregate("AVG", quiz_id).await
    }

    async fn max_score_by_quiz(&self, quiz_id: i64) -> Result<Option<f64>, StoreError> {
        self.score_aggregate("MAX", quiz_id).await
    }

    async fn min_score_by_quiz(&self, quiz_id: i64) -> Result<Option<f64>, StoreError> {
        self.score_aggregate("MIN", quiz_id).await
    }

    async fn user_summary(&self, user_id: i64) -> Result<UserScoreSummary, StoreError> {
        let summary = sqlx::query_as::<_, UserScoreSummary>(
            "SELECT COUNT(*) AS total,
                    COUNT(*) FILTER (WHERE status = 'passed') AS passed,
                    COUNT(*) FILTER (WHERE status = 'failed') AS failed,
                    AVG(score)::DOUBLE PRECISION AS average_score,
                    MAX(score)::DOUBLE PRECISION AS best_score
             FROM quiz_results
             WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(summary)
    }

    async fn question_summary(
        &self,
        question_id: i64,
    ) -> Result<QuestionAnswerSummary, StoreError> {
        let summary = sqlx::query_as::<_, QuestionAnswerSummary>(
            "SELECT COUNT(*) AS total,
                    COUNT(*) FILTER (WHERE is_correct) AS correct,
                    AVG(time_taken)::DOUBLE PRECISION AS average_time
             FROM question_results
             WHERE question_id = $1",
        )
        .bind(question_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(summary)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
