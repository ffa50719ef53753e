use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::core::config::Settings;

/// Quiz metadata as served by the question bank.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuizDefinition {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) category: Option<String>,
    pub(crate) difficulty: Option<String>,
    pub(crate) time_limit: Option<i32>,
    pub(crate) total_questions: Option<i32>,
    pub(crate) is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthoritativeQuestion {
    pub(crate) id: i64,
    pub(crate) question_text: String,
    #[serde(rename = "type")]
    pub(crate) question_type: Option<String>,
    pub(crate) difficulty: Option<String>,
    pub(crate) correct_answer: String,
    pub(crate) options: Option<Vec<String>>,
    pub(crate) explanation: Option<String>,
    pub(crate) time_limit: Option<i32>,
    pub(crate) marks: Option<i32>,
}

impl AuthoritativeQuestion {
    /// Point weight of the question; absent or non-positive marks count as 1.
    pub(crate) fn marks(&self) -> i32 {
        match self.marks {
            Some(marks) if marks > 0 => marks,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum UpstreamError {
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected status {status}")]
    Status { status: u16 },
    #[error("malformed response: {0}")]
    Decode(String),
}

impl UpstreamError {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Transport(_) => "transport",
            Self::Status { .. } => "status",
            Self::Decode(_) => "decode",
        }
    }

    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

#[async_trait]
pub(crate) trait QuestionSource: Send + Sync {
    async fn get_quiz(&self, quiz_id: i64) -> Result<QuizDefinition, UpstreamError>;

    async fn get_quiz_questions(
        &self,
        quiz_id: i64,
    ) -> Result<Vec<AuthoritativeQuestion>, UpstreamError>;
}

#[derive(Debug, Clone)]
pub(crate) struct HttpQuestionBank {
    client: Client,
    base_url: String,
}

impl HttpQuestionBank {
    pub(crate) fn from_settings(settings: &Settings) -> Result<Self> {
        let question_bank = settings.question_bank();
        let client = Client::builder()
            .connect_timeout(question_bank.connect_timeout())
            .timeout(question_bank.timeout())
            .build()
            .context("Failed to build question bank HTTP client")?;

        Ok(Self { client, base_url: question_bank.base_url.trim_end_matches('/').to_string() })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, UpstreamError> {
        let outcome = self.fetch(path).await;
        let label = match &outcome {
            Ok(_) => "ok",
            Err(err) => err.label(),
        };
        metrics::counter!("question_bank_requests_total", "outcome" => label).increment(1);
        outcome
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, UpstreamError> {
        let url = format!("{}{path}", self.base_url);
        let response =
            self.client.get(&url).send().await.map_err(UpstreamError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                url = %url,
                status = status.as_u16(),
                "Question bank returned an error status"
            );
            return Err(UpstreamError::Status { status: status.as_u16() });
        }

        response.json::<T>().await.map_err(UpstreamError::from_reqwest)
    }
}

#[async_trait]
impl QuestionSource for HttpQuestionBank {
    async fn get_quiz(&self, quiz_id: i64) -> Result<QuizDefinition, UpstreamError> {
        self.get_json(&format!("/quizzes/{quiz_id}")).await
    }

    async fn get_quiz_questions(
        &self,
        quiz_id: i64,
    ) -> Result<Vec<AuthoritativeQuestion>, UpstreamError> {
        self.get_json(&format!("/quizzes/{quiz_id}/questions")).await
    }
}

/// A quiz together with its ordered questions, fetched as one unit.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct QuizBundle {
    pub(crate) quiz: QuizDefinition,
    pub(crate) questions: Vec<AuthoritativeQuestion>,
}

impl QuizBundle {
    pub(crate) fn question(&self, question_id: i64) -> Option<&AuthoritativeQuestion> {
        self.questions.iter().rev().find(|question| question.id == question_id)
    }
}

/// Fetches the quiz and its questions concurrently under one deadline.
/// Either call failing, or the deadline passing, fails the whole bundle.
pub(crate) async fn fetch_quiz_bundle(
    source: &dyn QuestionSource,
    quiz_id: i64,
    deadline: Duration,
) -> Result<QuizBundle, UpstreamError> {
    let both = async {
        tokio::try_join!(source.get_quiz(quiz_id), source.get_quiz_questions(quiz_id))
    };

    match tokio::time::timeout(deadline, both).await {
        Ok(Ok((quiz, questions))) => Ok(QuizBundle { quiz, questions }),
        Ok(Err(err)) => Err(err),
        Err(_) => {
            tracing::warn!(
                quiz_id,
                timeout_ms = deadline.as_millis() as u64,
                "Question bank deadline exceeded"
            );
            Err(UpstreamError::Timeout)
        }
    }
}
