use std::collections::BTreeMap;

use crate::db::models::{Question, QuestionResult};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AutoGrade {
    /// `None` when no question carries an answer key.
    pub(crate) auto_score: Option<f64>,
    pub(crate) results: Vec<QuestionResult>,
}

fn normalize(answer: &str) -> String {
    answer.trim().to_lowercase()
}

/// Scores every keyed question. Results only carry `correct`; the points live
/// in `auto_score` so manual aggregation never counts them twice.
pub(crate) fn auto_grade(questions: &[Question], answers: &BTreeMap<String, String>) -> AutoGrade {
    let mut auto_score = None;
    let mut results = Vec::new();

    for question in questions {
        let Some(key) = question.answer_key.as_deref() else {
            continue;
        };
        let correct =
            answers.get(&question.id).is_some_and(|answer| normalize(answer) == normalize(key));
        let earned = if correct { question.points } else { 0.0 };
        auto_score = Some(auto_score.unwrap_or(0.0) + earned);
        results.push(QuestionResult {
            question_id: question.id.clone(),
            correct: Some(correct),
            points_awarded: None,
            feedback: None,
        });
    }

    AutoGrade { auto_score, results }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str, points: f64, key: Option<&str>) -> Question {
        Question {
            id: id.to_string(),
            prompt: format!("prompt {id}"),
            points,
            answer_key: key.map(str::to_string),
        }
    }

    fn answers(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn matches_ignore_case_and_surrounding_whitespace() {
        let questions = vec![question("q1", 2.0, Some("Paris")), question("q2", 3.0, Some("b"))];
        let grade = auto_grade(&questions, &answers(&[("q1", "  pARIS "), ("q2", "c")]));

        assert_eq!(grade.auto_score, Some(2.0));
        assert_eq!(grade.results.len(), 2);
        assert_eq!(grade.results[0].correct, Some(true));
        assert_eq!(grade.results[1].correct, Some(false));
        assert!(grade.results.iter().all(|result| result.points_awarded.is_none()));
    }

    #[test]
    fn unanswered_keyed_questions_are_incorrect() {
        let grade = auto_grade(&[question("q1", 4.0, Some("x"))], &BTreeMap::new());
        assert_eq!(grade.auto_score, Some(0.0));
        assert_eq!(grade.results[0].correct, Some(false));
    }

    #[test]
    fn questions_without_keys_are_skipped() {
        let questions = vec![question("q1", 5.0, None), question("q2", 1.0, Some("yes"))];
        let grade = auto_grade(&questions, &answers(&[("q1", "essay"), ("q2", "YES")]));
        assert_eq!(grade.auto_score, Some(1.0));
        assert_eq!(grade.results.len(), 1);
        assert_eq!(grade.results[0].question_id, "q2");
    }

    #[test]
    fn no_keyed_questions_means_no_auto_score() {
        let grade = auto_grade(&[question("q1", 5.0, None)], &answers(&[("q1", "anything")]));
        assert_eq!(grade.auto_score, None);
        assert!(grade.results.is_empty());
    }
}
