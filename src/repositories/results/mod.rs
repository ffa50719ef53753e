mod postgres;
mod types;

use async_trait::async_trait;
use thiserror::Error;

use crate::db::models::{GradedAttempt, QuizResult};
use crate::db::types::ResultStatus;

pub(crate) use postgres::PgResultStore;
pub(crate) use types::{
    NewQuestionResult, NewQuizResult, PageRequest, QuestionAnswerSummary, UserScoreSummary,
};

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Durable storage for graded attempts.
///
/// `save` is all-or-nothing: either the attempt and every outcome become
/// visible together, or nothing does. Page queries return rows newest first
/// along with the total row count for the filter.
#[async_trait]
pub(crate) trait ResultStore: Send + Sync {
    async fn save(&self, attempt: NewQuizResult) -> Result<GradedAttempt, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<GradedAttempt>, StoreError>;

    async fn find_by_user(
        &self,
        user_id: i64,
        page: PageRequest,
    ) -> Result<(Vec<QuizResult>, i64), StoreError>;

    async fn find_by_quiz(
        &self,
        quiz_id: i64,
        page: PageRequest,
    ) -> Result<(Vec<QuizResult>, i64), StoreError>;

    async fn count_by_quiz(&self, quiz_id: i64) -> Result<i64, StoreError>;

    async fn count_by_quiz_and_status(
        &self,
        quiz_id: i64,
        status: ResultStatus,
    ) -> Result<i64, StoreError>;

    async fn average_score_by_quiz(&self, quiz_id: i64) -> Result<Option<f64>, StoreError>;

    async fn max_score_by_quiz(&self, quiz_id: i64) -> Result<Option<f64>, StoreError>;

    async fn min_score_by_quiz(&self, quiz_id: i64) -> Result<Option<f64>, StoreError>;

    async fn user_summary(&self, user_id: i64) -> Result<UserScoreSummary, StoreError>;

    async fn question_summary(&self, question_id: i64)
        -> Result<QuestionAnswerSummary, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
