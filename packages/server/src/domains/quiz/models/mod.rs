pub mod category;
pub mod question;

pub use category::QuizCategory;
pub use question::{QuestionWithCategory, QuizOption, QuizQuestion};
