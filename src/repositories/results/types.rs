use time::PrimitiveDateTime;

use crate::db::types::ResultStatus;

/// A graded attempt that has not been stored yet; the store assigns ids and `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NewQuizResult {
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
    pub(crate) outcomes: Vec<NewQuestionResult>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NewQuestionResult {
    pub(crate) question_id: i64,
    pub(crate) user_answer: String,
    pub(crate) correct_answer: String,
    pub(crate) is_correct: bool,
    pub(crate) points_earned: i32,
    pub(crate) max_points: i32,
    pub(crate) time_taken: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageRequest {
    pub(crate) skip: i64,
    pub(crate) limit: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, sqlx::FromRow)]
pub(crate) struct UserScoreSummary {
    pub(crate) total: i64,
    pub(crate) passed: i64,
    pub(crate) failed: i64,
    pub(crate) average_score: Option<f64>,
    pub(crate) best_score: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, sqlx::FromRow)]
pub(crate) struct QuestionAnswerSummary {
    pub(crate) total: i64,
    pub(crate) correct: i64,
    pub(crate) average_time: Option<f64>,
}
