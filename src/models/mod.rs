pub mod question;

pub use question::{demo_questions, AnswerOption, Question};
