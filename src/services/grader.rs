use crate::repositories::results::NewQuestionResult;
use crate::services::question_bank::AuthoritativeQuestion;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SubmittedAnswer {
    pub(crate) question_id: i64,
    pub(crate) answer_text: String,
    pub(crate) time_spent_seconds: i64,
}

pub(crate) fn normalize(answer: &str) -> String {
    answer.trim().to_lowercase()
}

pub(crate) fn answers_match(submitted: &str, correct: &str) -> bool {
    normalize(submitted) == normalize(correct)
}

/// Grades one answer. Returns `None` when the question is not part of the quiz,
/// in which case the answer contributes nothing to the attempt.
pub(crate) fn grade(
    answer: &SubmittedAnswer,
    question: Option<&AuthoritativeQuestion>,
) -> Option<NewQuestionResult> {
    let question = question?;
    let is_correct = answers_match(&answer.answer_text, &question.correct_answer);
    let max_points = question.marks();

    Some(NewQuestionResult {
        question_id: answer.question_id,
        user_answer: answer.answer_text.clone(),
        correct_answer: question.correct_answer.clone(),
        is_correct,
        points_earned: if is_correct { max_points } else { 0 },
        max_points,
        time_taken: answer.time_spent_seconds.max(0),
    })
}
