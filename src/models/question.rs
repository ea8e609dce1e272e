use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// One selectable answer. `id` follows the `<questionId>_<LETTER>` convention;
/// the letter suffix is what phone-camera scanners transmit.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOption {
    pub id: String,
    pub text: String,
    pub is_correct: bool,
}

impl AnswerOption {
    /// The printed letter for this option, i.e. the part of the id after the
    /// last underscore (`"q7_B"` -> `"B"`).
    pub fn letter(&self) -> &str {
        self.id.rsplit('_').next().unwrap_or(&self.id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub text: String,
    pub options: Vec<AnswerOption>,
    #[serde(default)]
    pub is_demo: bool,
}

impl Question {
    pub fn option(&self, option_id: &str) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.id == option_id)
    }

    /// Match a bare letter ("B") against option-id suffixes, case-insensitively.
    pub fn option_for_letter(&self, letter: &str) -> Option<&AnswerOption> {
        self.options
            .iter()
            .find(|o| o.letter().eq_ignore_ascii_case(letter))
    }

    pub fn correct_option(&self) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.is_correct)
    }
}

fn demo_question(id: &str, text: &str, options: [(&str, bool); 4]) -> Question {
    Question {
        id: id.to_string(),
        text: text.to_string(),
        options: options
            .iter()
            .enumerate()
            .map(|(i, (text, is_correct))| AnswerOption {
                id: format!("{}_{}", id, (b'A' + i as u8) as char),
                text: text.to_string(),
                is_correct: *is_correct,
            })
            .collect(),
        is_demo: true,
    }
}

/// Built-in placeholder questions shown before generated content is available.
/// Never written to the persisted pool.
static DEMO_QUESTIONS: Lazy<Vec<Question>> = Lazy::new(|| {
    vec![
        demo_question(
            "q1",
            "What is the capital of France?",
            [
                ("London", false),
                ("Paris", true),
                ("Berlin", false),
                ("Madrid", false),
            ],
        ),
        demo_question(
            "q2",
            "Which planet is known as the Red Planet?",
            [
                ("Jupiter", false),
                ("Saturn", false),
                ("Mars", true),
                ("Venus", false),
            ],
        ),
        demo_question(
            "q3",
            "What is the largest ocean on Earth?",
            [
                ("Atlantic Ocean", false),
                ("Indian Ocean", false),
                ("Arctic Ocean", false),
                ("Pacific Ocean", true),
            ],
        ),
        demo_question(
            "q4",
            "Which element has the chemical symbol 'O'?",
            [
                ("Gold", false),
                ("Oxygen", true),
                ("Osmium", false),
                ("Oganesson", false),
            ],
        ),
    ]
});

pub fn demo_questions() -> Vec<Question> {
    DEMO_QUESTIONS.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_letter_is_suffix_after_last_underscore() {
        let option = AnswerOption {
            id: "gqab12_3_C".to_string(),
            text: "something".to_string(),
            is_correct: false,
        };
        assert_eq!(option.letter(), "C");
    }

    #[test]
    fn option_for_letter_is_case_insensitive() {
        let question = &demo_questions()[0];
        let upper = question.option_for_letter("B").map(|o| o.id.clone());
        let lower = question.option_for_letter("b").map(|o| o.id.clone());
        assert_eq!(upper, Some("q1_B".to_string()));
        assert_eq!(upper, lower);
    }

    #[test]
    fn demo_questions_have_exactly_one_correct_option() {
        for question in demo_questions() {
            assert!(question.is_demo);
            assert_eq!(question.options.len(), 4);
            assert_eq!(
                question.options.iter().filter(|o| o.is_correct).count(),
                1,
                "question {} must have exactly one correct option",
                question.id
            );
        }
    }

    #[test]
    fn question_serialization_round_trip() {
        let question = demo_questions().remove(1);
        let json = serde_json::to_string(&question).expect("question should serialize");
        assert!(json.contains("\"isCorrect\""));
        let parsed: Question = serde_json::from_str(&json).expect("question should deserialize");
        assert_eq!(question, parsed);
    }

    #[test]
    fn is_demo_defaults_to_false_when_absent() {
        let json = r#"{
            "id": "gq1_0",
            "text": "Generated?",
            "options": [
                {"id": "gq1_0_A", "text": "yes", "isCorrect": true},
                {"id": "gq1_0_B", "text": "no", "isCorrect": false}
            ]
        }"#;
        let parsed: Question = serde_json::from_str(json).expect("should deserialize");
        assert!(!parsed.is_demo);
    }
}
