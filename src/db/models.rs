use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::ResultStatus;

/// One stored attempt. `score` is the marks-weighted percentage.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub(crate) struct QuizResult {
    pub(crate) id: i64,
    pub(crate) user_id: i64,
    pub(crate) quiz_id: i64,
    pub(crate) total_questions: i32,
    pub(crate) correct_answers: i32,
    pub(crate) wrong_answers: i32,
    pub(crate) score: f64,
    pub(crate) time_taken: i64,
    pub(crate) status: ResultStatus,
    pub(crate) start_time: PrimitiveDateTime,
    pub(crate) end_time: PrimitiveDateTime,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub(crate) struct QuestionResult {
    pub(crate) id: i64,
    pub(crate) quiz_result_id: i64,
    pub(crate) position: i32,
    pub(crate) question_id: i64,
    pub(crate) user_answer: String,
    pub(crate) correct_answer: String,
    pub(crate) is_correct: bool,
    pub(crate) points_earned: i32,
    pub(crate) max_points: i32,
    pub(crate) time_taken: i64,
}

/// A stored attempt together with its outcomes in submission order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GradedAttempt {
    pub(crate) result: QuizResult,
    pub(crate) outcomes: Vec<QuestionResult>,
}
