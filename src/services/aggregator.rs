use std::collections::HashMap;

use time::PrimitiveDateTime;

use crate::core::time::seconds_before;
use crate::db::types::ResultStatus;
use crate::repositories::results::NewQuizResult;
use crate::services::errors::ResultServiceError;
use crate::services::grader::{self, SubmittedAnswer};
use crate::services::question_bank::AuthoritativeQuestion;

/// One user's answers for one quiz, with the caller's identity attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AttemptSubmission {
    pub(crate) quiz_id: i64,
    pub(crate) user_id: i64,
    pub(crate) answers: Vec<SubmittedAnswer>,
    pub(crate) total_time_spent_seconds: i64,
}

impl AttemptSubmission {
    pub(crate) fn ensure_valid(&self) -> Result<(), ResultServiceError> {
        if self.answers.is_empty() {
            return Err(ResultServiceError::invalid("answers must not be empty"));
        }
        if self.total_time_spent_seconds < 0 {
            return Err(ResultServiceError::invalid("total_time_spent must be non-negative"));
        }
        Ok(())
    }
}

pub(crate) fn score_percentage(earned_marks: i64, total_marks: i64) -> f64 {
    if total_marks > 0 {
        earned_marks as f64 / total_marks as f64 * 100.0
    } else {
        0.0
    }
}

/// Grades every submitted answer against the quiz's questions.
///
/// Outcomes keep submission order. `total_questions` is the size of the quiz,
/// so unanswered questions land in `wrong_answers`, while the percentage only
/// covers the answers that could be graded.
pub(crate) fn aggregate(
    submission: &AttemptSubmission,
    questions: &[AuthoritativeQuestion],
    ended_at: PrimitiveDateTime,
) -> NewQuizResult {
    let by_id: HashMap<i64, &AuthoritativeQuestion> =
        questions.iter().map(|question| (question.id, question)).collect();

    let outcomes: Vec<_> = submission
        .answers
        .iter()
        .filter_map(|answer| grader::grade(answer, by_id.get(&answer.question_id).copied()))
        .collect();

    let total_marks: i64 = outcomes.iter().map(|outcome| i64::from(outcome.max_points)).sum();
    let earned_marks: i64 = outcomes.iter().map(|outcome| i64::from(outcome.points_earned)).sum();
    let score = score_percentage(earned_marks, total_marks);

    let total_questions = i32::try_from(questions.len()).unwrap_or(i32::MAX);
    let correct_count = outcomes.iter().filter(|outcome| outcome.is_correct).count();
    let correct_answers = i32::try_from(correct_count).unwrap_or(i32::MAX);

    NewQuizResult {
        user_id: submission.user_id,
        quiz_id: submission.quiz_id,
        total_questions,
        correct_answers,
        wrong_answers: total_questions - correct_answers,
        score,
        time_taken: submission.total_time_spent_seconds,
        status: ResultStatus::from_percentage(score),
        start_time: seconds_before(ended_at, submission.total_time_spent_seconds),
        end_time: ended_at,
        outcomes,
    }
}
