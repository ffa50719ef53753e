use crate::core::time::format_primitive;
use crate::db::models::{GradedAttempt, QuestionResult};
use crate::schemas::result::{QuestionResultView, ResultView};
use crate::services::question_bank::QuizBundle;

pub(crate) const MISSING_QUESTION_TEXT: &str = "Question not found";

/// Letter grade for a percentage. Each band includes its lower bound.
pub(crate) fn letter_grade(percentage: f64) -> &'static str {
    if percentage >= 90.0 {
        "A+"
    } else if percentage >= 80.0 {
        "A"
    } else if percentage >= 70.0 {
        "B"
    } else if percentage >= 60.0 {
        "C"
    } else if percentage >= 50.0 {
        "D"
    } else {
        "F"
    }
}

/// Full view: display fields come from the question bank, marks from storage.
pub(crate) fn assemble(attempt: &GradedAttempt, bundle: &QuizBundle) -> ResultView {
    let question_results: Vec<_> = attempt
        .outcomes
        .iter()
        .map(|outcome| {
            let mut view = outcome_view(outcome);
            match bundle.question(outcome.question_id) {
                Some(question) => {
                    view.question_text = Some(question.question_text.clone());
                    view.explanation = question.explanation.clone();
                    view.options = question.options.clone();
                }
                None => view.question_text = Some(MISSING_QUESTION_TEXT.to_string()),
            }
            view
        })
        .collect();

    let score = question_results.iter().map(|view| i64::from(view.points)).sum();
    let max_score = question_results.iter().map(|view| i64::from(view.max_points)).sum();

    base_view(attempt, bundle.quiz.title.clone(), score, max_score, false, question_results)
}

/// Stored-data-only view used when the question bank cannot be reached.
pub(crate) fn assemble_degraded(attempt: &GradedAttempt) -> ResultView {
    let result = &attempt.result;
    base_view(
        attempt,
        format!("Quiz {}", result.quiz_id),
        i64::from(result.correct_answers),
        i64::from(result.total_questions),
        true,
        attempt.outcomes.iter().map(outcome_view).collect(),
    )
}

fn outcome_view(outcome: &QuestionResult) -> QuestionResultView {
    QuestionResultView {
        question_id: outcome.question_id,
        question_text: None,
        user_answer: outcome.user_answer.clone(),
        correct_answer: outcome.correct_answer.clone(),
        is_correct: outcome.is_correct,
        points: outcome.points_earned,
        max_points: outcome.max_points,
        time_spent: outcome.time_taken,
        explanation: None,
        options: None,
    }
}

fn base_view(
    attempt: &GradedAttempt,
    quiz_title: String,
    score: i64,
    max_score: i64,
    degraded: bool,
    question_results: Vec<QuestionResultView>,
) -> ResultView {
    let result = &attempt.result;
    ResultView {
        result_id: result.id,
        quiz_id: result.quiz_id,
        quiz_title,
        user_id: result.user_id,
        score,
        max_score,
        percentage: result.score,
        grade: letter_grade(result.score),
        status: result.status,
        correct_answers: result.correct_answers,
        total_questions: result.total_questions,
        time_spent: result.time_taken,
        submitted_at: format_primitive(result.end_time),
        degraded,
        question_results,
    }
}
