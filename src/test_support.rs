use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request};
use axum::Router;
use time::{Date, Month, PrimitiveDateTime, Time};
use tokio::sync::RwLock;

use crate::api::router::router;
use crate::core::config::Settings;
use crate::core::state::AppState;
use crate::db::models::{GradedAttempt, QuestionResult, QuizResult};
use crate::db::types::ResultStatus;
use crate::repositories::results::{
    NewQuestionResult, NewQuizResult, PageRequest, QuestionAnswerSummary, ResultStore,
    StoreError, UserScoreSummary,
};
use crate::services::question_bank::{
    AuthoritativeQuestion, QuestionSource, QuizBundle, QuizDefinition, UpstreamError,
};
use crate::services::results::ResultService;

pub(crate) const TEST_QUIZ_ID: i64 = 3;
pub(crate) const TEST_USER_ID: i64 = 42;

/// Serializes tests that mutate process environment variables.
pub(crate) fn env_lock() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(())).lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub(crate) struct TestContext {
    pub(crate) app: Router,
    pub(crate) store: Arc<InMemoryResultStore>,
    pub(crate) bank: Arc<ScriptedQuestionBank>,
}

pub(crate) fn test_context() -> TestContext {
    test_context_with(Settings::for_tests())
}

pub(crate) fn test_context_with(settings: Settings) -> TestContext {
    let store = Arc::new(InMemoryResultStore::default());
    let bank = Arc::new(ScriptedQuestionBank::new(
        quiz(TEST_QUIZ_ID, "Capitals"),
        vec![
            question(1, "Paris", Some(1)),
            question(2, "Rome", Some(1)),
            question(3, "Berlin", Some(2)),
        ],
    ));
    let results =
        ResultService::new(store.clone(), bank.clone(), settings.question_bank().timeout());
    let app = router(AppState::new(settings, results));

    TestContext { app, store, bank }
}

pub(crate) fn json_request(
    method: Method,
    uri: &str,
    user_id: Option<i64>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(user_id) = user_id {
        builder = builder.header("x-user-id", user_id.to_string());
    }

    if let Some(body) = body {
        let bytes = serde_json::to_vec(&body).expect("serialize body");
        builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(bytes))
            .expect("request body")
    } else {
        builder.body(Body::empty()).expect("request body")
    }
}

pub(crate) async fn read_json(response: axum::response::Response<Body>) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("response body");
    serde_json::from_slice(&body).unwrap_or_else(|err| {
        let body_text = String::from_utf8_lossy(&body);
        panic!("json parse: {err}; body: {body_text}");
    })
}

pub(crate) fn fixed_now() -> PrimitiveDateTime {
    let date = Date::from_calendar_date(2025, Month::March, 14).expect("date");
    PrimitiveDateTime::new(date, Time::from_hms(12, 0, 0).expect("time"))
}

pub(crate) fn quiz(id: i64, title: &str) -> QuizDefinition {
    QuizDefinition {
        id,
        title: title.to_string(),
        description: None,
        category: Some("General".to_string()),
        difficulty: Some("EASY".to_string()),
        time_limit: Some(600),
        total_questions: None,
        is_active: Some(true),
    }
}

pub(crate) fn question(id: i64, correct_answer: &str, marks: Option<i32>) -> AuthoritativeQuestion {
    AuthoritativeQuestion {
        id,
        question_text: format!("Question {id}"),
        question_type: Some("MULTIPLE_CHOICE".to_string()),
        difficulty: Some("EASY".to_string()),
        correct_answer: correct_answer.to_string(),
        options: Some(vec![correct_answer.to_string(), "Other".to_string()]),
        explanation: Some(format!("Because {correct_answer}")),
        time_limit: Some(30),
        marks,
    }
}

pub(crate) fn bundle(
    quiz_id: i64,
    title: &str,
    questions: Vec<AuthoritativeQuestion>,
) -> QuizBundle {
    QuizBundle { quiz: quiz(quiz_id, title), questions }
}

pub(crate) fn outcome(
    question_id: i64,
    is_correct: bool,
    max_points: i32,
    time_taken: i64,
) -> NewQuestionResult {
    NewQuestionResult {
        question_id,
        user_answer: if is_correct { "right".to_string() } else { "wrong".to_string() },
        correct_answer: "right".to_string(),
        is_correct,
        points_earned: if is_correct { max_points } else { 0 },
        max_points,
        time_taken,
    }
}

/// An unsaved attempt with a given score and no outcomes.
pub(crate) fn new_result(user_id: i64, quiz_id: i64, score: f64) -> NewQuizResult {
    let end_time = fixed_now();
    NewQuizResult {
        user_id,
        quiz_id,
        total_questions: 0,
        correct_answers: 0,
        wrong_answers: 0,
        score,
        time_taken: 60,
        status: ResultStatus::from_percentage(score),
        start_time: end_time - time::Duration::seconds(60),
        end_time,
        outcomes: Vec::new(),
    }
}

/// A stored attempt whose outcomes are `(question_id, is_correct, max_points)`.
pub(crate) fn stored_attempt(
    result_id: i64,
    quiz_id: i64,
    outcomes: &[(i64, bool, i32)],
    score: f64,
) -> GradedAttempt {
    let total_questions = outcomes.len() as i32;
    let correct_answers = outcomes.iter().filter(|(_, is_correct, _)| *is_correct).count() as i32;
    let end_time = fixed_now();

    GradedAttempt {
        result: QuizResult {
            id: result_id,
            user_id: TEST_USER_ID,
            quiz_id,
            total_questions,
            correct_answers,
            wrong_answers: total_questions - correct_answers,
            score,
            time_taken: 90,
            status: ResultStatus::from_percentage(score),
            start_time: end_time - time::Duration::seconds(90),
            end_time,
            created_at: end_time,
        },
        outcomes: outcomes
            .iter()
            .enumerate()
            .map(|(position, (question_id, is_correct, max_points))| {
                let new = outcome(*question_id, *is_correct, *max_points, 5);
                QuestionResult {
                    id: position as i64 + 1,
                    quiz_result_id: result_id,
                    position: position as i32,
                    question_id: new.question_id,
                    user_answer: new.user_answer,
                    correct_answer: new.correct_answer,
                    is_correct: new.is_correct,
                    points_earned: new.points_earned,
                    max_points: new.max_points,
                    time_taken: new.time_taken,
                }
            })
            .collect(),
    }
}

/// Result store backed by a map; each save is visible all at once.
#[derive(Default)]
pub(crate) struct InMemoryResultStore {
    attempts: Arc<RwLock<HashMap<i64, GradedAttempt>>>,
    next_result_id: AtomicI64,
    next_outcome_id: AtomicI64,
    fail_writes: AtomicBool,
}

impl InMemoryResultStore {
    pub(crate) fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub(crate) async fn len(&self) -> usize {
        self.attempts.read().await.len()
    }

    async fn page<F>(&self, page: PageRequest, keep: F) -> (Vec<QuizResult>, i64)
    where
        F: Fn(&QuizResult) -> bool,
    {
        let attempts = self.attempts.read().await;
        let mut items: Vec<QuizResult> = attempts
            .values()
            .map(|attempt| attempt.result.clone())
            .filter(|result| keep(result))
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = items.len() as i64;
        let start = page.skip.max(0) as usize;
        let end = (start + page.limit.max(0) as usize).min(items.len());

        let page = if start >= items.len() { vec![] } else { items[start..end].to_vec() };

        (page, total)
    }

    async fn quiz_scores(&self, quiz_id: i64) -> Vec<f64> {
        let attempts = self.attempts.read().await;
        attempts
            .values()
            .filter(|attempt| attempt.result.quiz_id == quiz_id)
            .map(|attempt| attempt.result.score)
            .collect()
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[async_trait]
impl ResultStore for InMemoryResultStore {
    async fn save(&self, attempt: NewQuizResult) -> Result<GradedAttempt, StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }

        let id = self.next_result_id.fetch_add(1, Ordering::SeqCst) + 1;
        let outcomes = attempt
            .outcomes
            .into_iter()
            .enumerate()
            .map(|(position, outcome)| QuestionResult {
                id: self.next_outcome_id.fetch_add(1, Ordering::SeqCst) + 1,
                quiz_result_id: id,
                position: position as i32,
                question_id: outcome.question_id,
                user_answer: outcome.user_answer,
                correct_answer: outcome.correct_answer,
                is_correct: outcome.is_correct,
                points_earned: outcome.points_earned,
                max_points: outcome.max_points,
                time_taken: outcome.time_taken,
            })
            .collect();

        let stored = GradedAttempt {
            result: QuizResult {
                id,
                user_id: attempt.user_id,
                quiz_id: attempt.quiz_id,
                total_questions: attempt.total_questions,
                correct_answers: attempt.correct_answers,
                wrong_answers: attempt.wrong_answers,
                score: attempt.score,
                time_taken: attempt.time_taken,
                status: attempt.status,
                start_time: attempt.start_time,
                end_time: attempt.end_time,
                created_at: fixed_now() + time::Duration::seconds(id),
            },
            outcomes,
        };

        self.attempts.write().await.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<GradedAttempt>, StoreError> {
        Ok(self.attempts.read().await.get(&id).cloned())
    }

    async fn find_by_user(
        &self,
        user_id: i64,
        page: PageRequest,
    ) -> Result<(Vec<QuizResult>, i64), StoreError> {
        Ok(self.page(page, |result| result.user_id == user_id).await)
    }

    async fn find_by_quiz(
        &self,
        quiz_id: i64,
        page: PageRequest,
    ) -> Result<(Vec<QuizResult>, i64), StoreError> {
        Ok(self.page(page, |result| result.quiz_id == quiz_id).await)
    }

    async fn count_by_quiz(&self, quiz_id: i64) -> Result<i64, StoreError> {
        Ok(self.quiz_scores(quiz_id).await.len() as i64)
    }

    async fn count_by_quiz_and_status(
        &self,
        quiz_id: i64,
        status: ResultStatus,
    ) -> Result<i64, StoreError> {
        let attempts = self.attempts.read().await;
        Ok(attempts
            .values()
            .filter(|attempt| attempt.result.quiz_id == quiz_id && attempt.result.status == status)
            .count() as i64)
    }

    async fn average_score_by_quiz(&self, quiz_id: i64) -> Result<Option<f64>, StoreError> {
        Ok(mean(&self.quiz_scores(quiz_id).await))
    }

    async fn max_score_by_quiz(&self, quiz_id: i64) -> Result<Option<f64>, StoreError> {
        Ok(self.quiz_scores(quiz_id).await.into_iter().reduce(f64::max))
    }

    async fn min_score_by_quiz(&self, quiz_id: i64) -> Result<Option<f64>, StoreError> {
        Ok(self.quiz_scores(quiz_id).await.into_iter().reduce(f64::min))
    }

    async fn user_summary(&self, user_id: i64) -> Result<UserScoreSummary, StoreError> {
        let attempts = self.attempts.read().await;
        let results: Vec<&QuizResult> = attempts
            .values()
            .map(|attempt| &attempt.result)
            .filter(|result| result.user_id == user_id)
            .collect();
        let scores: Vec<f64> = results.iter().map(|result| result.score).collect();

        Ok(UserScoreSummary {
            total: results.len() as i64,
            passed: results.iter().filter(|r| r.status == ResultStatus::Passed).count() as i64,
            failed: results.iter().filter(|r| r.status == ResultStatus::Failed).count() as i64,
            average_score: mean(&scores),
            best_score: scores.iter().copied().reduce(f64::max),
        })
    }

    async fn question_summary(
        &self,
        question_id: i64,
    ) -> Result<QuestionAnswerSummary, StoreError> {
        let attempts = self.attempts.read().await;
        let outcomes: Vec<&QuestionResult> = attempts
            .values()
            .flat_map(|attempt| attempt.outcomes.iter())
            .filter(|outcome| outcome.question_id == question_id)
            .collect();
        let times: Vec<f64> = outcomes.iter().map(|outcome| outcome.time_taken as f64).collect();

        Ok(QuestionAnswerSummary {
            total: outcomes.len() as i64,
            correct: outcomes.iter().filter(|outcome| outcome.is_correct).count() as i64,
            average_time: mean(&times),
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Question source with a fixed quiz whose failures and latency can be scripted.
pub(crate) struct ScriptedQuestionBank {
    quiz: QuizDefinition,
    questions: Vec<AuthoritativeQuestion>,
    failure: Mutex<Option<UpstreamError>>,
    delay: Mutex<Option<Duration>>,
    calls: AtomicUsize,
}

impl ScriptedQuestionBank {
    pub(crate) fn new(quiz: QuizDefinition, questions: Vec<AuthoritativeQuestion>) -> Self {
        Self {
            quiz,
            questions,
            failure: Mutex::new(None),
            delay: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn fail_with(&self, err: UpstreamError) {
        *self.failure.lock().expect("failure lock") = Some(err);
    }

    pub(crate) fn recover(&self) {
        *self.failure.lock().expect("failure lock") = None;
    }

    pub(crate) fn delay_by(&self, delay: Duration) {
        *self.delay.lock().expect("delay lock") = Some(delay);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn respond<T>(
        &self,
        quiz_id: i64,
        value: impl FnOnce() -> T,
    ) -> Result<T, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let delay = *self.delay.lock().expect("delay lock");
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self.failure.lock().expect("failure lock").clone();
        if let Some(err) = failure {
            return Err(err);
        }
        if quiz_id != self.quiz.id {
            return Err(UpstreamError::Status { status: 404 });
        }
        Ok(value())
    }
}

#[async_trait]
impl QuestionSource for ScriptedQuestionBank {
    async fn get_quiz(&self, quiz_id: i64) -> Result<QuizDefinition, UpstreamError> {
        self.respond(quiz_id, || self.quiz.clone()).await
    }

    async fn get_quiz_questions(
        &self,
        quiz_id: i64,
    ) -> Result<Vec<AuthoritativeQuestion>, UpstreamError> {
        self.respond(quiz_id, || self.questions.clone()).await
    }
}
