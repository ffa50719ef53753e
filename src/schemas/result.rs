use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::QuizResult;
use crate::db::types::ResultStatus;
use crate::services::aggregator::AttemptSubmission;
use crate::services::errors::ResultServiceError;
use crate::services::grader::SubmittedAnswer;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuizAttemptRequest {
    #[serde(default, alias = "quizId")]
    #[validate(required(message = "quiz_id is required"))]
    pub(crate) quiz_id: Option<i64>,
    #[serde(default)]
    #[validate(nested)]
    pub(crate) answers: Vec<UserAnswerPayload>,
    #[serde(default, alias = "timeSpent")]
    #[validate(range(min = 0, message = "time_spent must be non-negative"))]
    pub(crate) time_spent: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct UserAnswerPayload {
    #[serde(default, alias = "questionId")]
    #[validate(required(message = "question_id is required"))]
    pub(crate) question_id: Option<i64>,
    #[serde(default)]
    #[validate(required(message = "answer is required"))]
    pub(crate) answer: Option<String>,
    #[serde(default, alias = "timeSpent")]
    #[validate(range(min = 0, message = "time_spent must be non-negative"))]
    pub(crate) time_spent: Option<i64>,
}

impl QuizAttemptRequest {
    /// Attaches the caller's identity. Required fields are re-checked so an
    /// unvalidated payload still cannot produce a partial submission.
    pub(crate) fn into_submission(
        self,
        user_id: i64,
    ) -> Result<AttemptSubmission, ResultServiceError> {
        let quiz_id =
            self.quiz_id.ok_or_else(|| ResultServiceError::invalid("quiz_id is required"))?;

        let answers = self
            .answers
            .into_iter()
            .map(|answer| {
                let question_id = answer
                    .question_id
                    .ok_or_else(|| ResultServiceError::invalid("question_id is required"))?;
                let answer_text =
                    answer.answer.ok_or_else(|| ResultServiceError::invalid("answer is required"))?;
                Ok(SubmittedAnswer {
                    question_id,
                    answer_text,
                    time_spent_seconds: answer.time_spent.unwrap_or(0),
                })
            })
            .collect::<Result<Vec<_>, ResultServiceError>>()?;

        Ok(AttemptSubmission {
            quiz_id,
            user_id,
            answers,
            total_time_spent_seconds: self.time_spent.unwrap_or(0),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct ResultView {
    pub(crate) result_id: i64,
    pub(crate) quiz_id: i64,
    pub(crate) quiz_title: String,
    pub(crate) user_id: i64,
    pub(crate) score: i64,
    pub(crate) max_score: i64,
    pub(crate) percentage: f64,
    pub(crate) grade: &'static str,
    pub(crate) status: ResultStatus,
    pub(crate) correct_answers: i32,
    pub(crate) total_questions: i32,
    pub(crate) time_spent: i64,
    pub(crate) submitted_at: String,
    pub(crate) degraded: bool,
    pub(crate) question_results: Vec<QuestionResultView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct QuestionResultView {
    pub(crate) question_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) question_text: Option<String>,
    pub(crate) user_answer: String,
    pub(crate) correct_answer: String,
    pub(crate) is_correct: bool,
    pub(crate) points: i32,
    pub(crate) max_points: i32,
    pub(crate) time_spent: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) options: Option<Vec<String>>,
}

/// Row shape for paginated listings; outcomes are left out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct ResultSummary {
    pub(crate) id: i64,
    pub(crate) user_id: i64,
    pub(crate) quiz_id: i64,
    pub(crate) total_questions: i32,
    pub(crate) correct_answers: i32,
    pub(crate) wrong_answers: i32,
    pub(crate) score: f64,
    pub(crate) time_taken: i64,
    pub(crate) status: ResultStatus,
    pub(crate) start_time: String,
    pub(crate) end_time: String,
    pub(crate) created_at: String,
}

impl From<QuizResult> for ResultSummary {
    fn from(result: QuizResult) -> Self {
        Self {
            id: result.id,
            user_id: result.user_id,
            quiz_id: result.quiz_id,
            total_questions: result.total_questions,
            correct_answers: result.correct_answers,
            wrong_answers: result.wrong_answers,
            score: result.score,
            time_taken: result.time_taken,
            status: result.status,
            start_time: format_primitive(result.start_time),
            end_time: format_primitive(result.end_time),
            created_at: format_primitive(result.created_at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct QuizStatistics {
    pub(crate) quiz_id: i64,
    pub(crate) total_attempts: i64,
    pub(crate) passed_count: i64,
    pub(crate) failed_count: i64,
    pub(crate) average_score: Option<f64>,
    pub(crate) highest_score: Option<f64>,
    pub(crate) lowest_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct UserStatistics {
    pub(crate) user_id: i64,
    pub(crate) total_quizzes_taken: i64,
    pub(crate) quizzes_passed: i64,
    pub(crate) quizzes_failed: i64,
    pub(crate) average_score: f64,
    pub(crate) best_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct QuestionStatistics {
    pub(crate) question_id: i64,
    pub(crate) total_answers: i64,
    pub(crate) correct_count: i64,
    pub(crate) wrong_count: i64,
    pub(crate) average_time_seconds: f64,
}
