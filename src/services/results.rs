use std::sync::Arc;
use std::time::Duration;

use crate::core::time::primitive_now_utc;
use crate::db::models::QuizResult;
use crate::repositories::results::{PageRequest, ResultStore};
use crate::schemas::result::{QuestionStatistics, QuizStatistics, ResultView, UserStatistics};
use crate::services::aggregator::{self, AttemptSubmission};
use crate::services::assembler;
use crate::services::errors::ResultServiceError;
use crate::services::question_bank::{
    fetch_quiz_bundle, QuestionSource, QuizBundle, UpstreamError,
};
use crate::services::statistics;

/// Scoring workflow: grade against the question bank, persist, and build views.
#[derive(Clone)]
pub(crate) struct ResultService {
    store: Arc<dyn ResultStore>,
    questions: Arc<dyn QuestionSource>,
    upstream_timeout: Duration,
}

impl ResultService {
    pub(crate) fn new(
        store: Arc<dyn ResultStore>,
        questions: Arc<dyn QuestionSource>,
        upstream_timeout: Duration,
    ) -> Self {
        Self { store, questions, upstream_timeout }
    }

    pub(crate) fn store(&self) -> &dyn ResultStore {
        self.store.as_ref()
    }

    /// Grades and stores one attempt. Any question bank failure aborts the
    /// submission before anything is written.
    pub(crate) async fn submit(
        &self,
        submission: AttemptSubmission,
    ) -> Result<ResultView, ResultServiceError> {
        submission.ensure_valid()?;

        let bundle = match self.fetch_bundle(submission.quiz_id).await {
            Ok(bundle) => bundle,
            Err(err) => {
                tracing::error!(
                    quiz_id = submission.quiz_id,
                    user_id = submission.user_id,
                    error = %err,
                    "Question bank unavailable while grading"
                );
                metrics::counter!("quiz_submissions_total", "status" => "upstream_unavailable")
                    .increment(1);
                return Err(err.into());
            }
        };

        let graded = aggregator::aggregate(&submission, &bundle.questions, primitive_now_utc());
        let stored = self.store.save(graded).await.map_err(|err| {
            tracing::error!(
                quiz_id = submission.quiz_id,
                user_id = submission.user_id,
                error = %err,
                "Failed to persist quiz result"
            );
            metrics::counter!("quiz_submissions_total", "status" => "persistence_failure")
                .increment(1);
            ResultServiceError::from(err)
        })?;

        metrics::counter!("quiz_submissions_total", "status" => stored.result.status.as_str())
            .increment(1);
        tracing::info!(
            result_id = stored.result.id,
            quiz_id = stored.result.quiz_id,
            user_id = stored.result.user_id,
            score = stored.result.score,
            status = stored.result.status.as_str(),
            "Quiz attempt graded"
        );

        Ok(assembler::assemble(&stored, &bundle))
    }

    /// Rebuilds the view of a stored attempt. When the question bank is down
    /// the stored data alone is returned instead of an error.
    pub(crate) async fn get_result(
        &self,
        result_id: i64,
    ) -> Result<ResultView, ResultServiceError> {
        let attempt = self
            .store
            .find_by_id(result_id)
            .await?
            .ok_or(ResultServiceError::NotFound(result_id))?;

        match self.fetch_bundle(attempt.result.quiz_id).await {
            Ok(bundle) => Ok(assembler::assemble(&attempt, &bundle)),
            Err(err) => {
                tracing::warn!(
                    result_id,
                    quiz_id = attempt.result.quiz_id,
                    error = %err,
                    "Question bank unavailable; returning stored result only"
                );
                metrics::counter!("result_views_degraded_total").increment(1);
                Ok(assembler::assemble_degraded(&attempt))
            }
        }
    }

    async fn fetch_bundle(&self, quiz_id: i64) -> Result<QuizBundle, UpstreamError> {
        fetch_quiz_bundle(self.questions.as_ref(), quiz_id, self.upstream_timeout).await
    }

    pub(crate) async fn user_results(
        &self,
        user_id: i64,
        page: PageRequest,
    ) -> Result<(Vec<QuizResult>, i64), ResultServiceError> {
        Ok(self.store.find_by_user(user_id, page).await?)
    }

    pub(crate) async fn quiz_results(
        &self,
        quiz_id: i64,
        page: PageRequest,
    ) -> Result<(Vec<QuizResult>, i64), ResultServiceError> {
        Ok(self.store.find_by_quiz(quiz_id, page).await?)
    }

    pub(crate) async fn quiz_statistics(
        &self,
        quiz_id: i64,
    ) -> Result<QuizStatistics, ResultServiceError> {
        Ok(statistics::quiz_statistics(self.store.as_ref(), quiz_id).await?)
    }

    pub(crate) async fn user_statistics(
        &self,
        user_id: i64,
    ) -> Result<UserStatistics, ResultServiceError> {
        Ok(statistics::user_statistics(self.store.as_ref(), user_id).await?)
    }

    pub(crate) async fn question_statistics(
        &self,
        question_id: i64,
    ) -> Result<QuestionStatistics, ResultServiceError> {
        Ok(statistics::question_statistics(self.store.as_ref(), question_id).await?)
    }
}
