#[cfg(test)]
pub mod fixtures {
    use crate::models::{AnswerOption, Question};

    /// Question with four lettered options; A is the correct one.
    pub fn test_question(id: &str) -> Question {
        Question {
            id: id.to_string(),
            text: format!("Test question {}?", id),
            options: (0..4)
                .map(|i| {
                    let letter = (b'A' + i as u8) as char;
                    AnswerOption {
                        id: format!("{}_{}", id, letter),
                        text: format!("Option {}", letter),
                        is_correct: i == 0,
                    }
                })
                .collect(),
            is_demo: false,
        }
    }

    /// Questions with ids `t0..t{count-1}`.
    pub fn test_questions(count: usize) -> Vec<Question> {
        (0..count).map(|i| test_question(&format!("t{}", i))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;

    #[test]
    fn test_fixtures_have_one_correct_option() {
        let question = test_question("t0");
        assert_eq!(question.options.len(), 4);
        assert_eq!(question.options.iter().filter(|o| o.is_correct).count(), 1);
        assert_eq!(question.correct_option().map(|o| o.letter()), Some("A"));
    }

    #[test]
    fn test_fixtures_test_questions_are_distinct() {
        let questions = test_questions(3);
        assert_eq!(questions.len(), 3);
        assert_eq!(questions[0].id, "t0");
        assert_eq!(questions[2].id, "t2");
    }
}
