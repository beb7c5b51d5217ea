//! Quiz domain - security awareness quizzes
//!
//! Categories hold ordered questions; each question carries its answer
//! options. The public payload hides which option is correct and ships
//! a bare index instead.

pub mod models;

pub use models::{QuestionWithCategory, QuizCategory, QuizOption, QuizQuestion};
