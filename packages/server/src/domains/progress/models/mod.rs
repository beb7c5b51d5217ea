//! Progress tracking data models

pub mod quiz_attempt;
pub mod scenario_completion;
pub mod user_progress;

pub use quiz_attempt::QuizAttempt;
pub use scenario_completion::ScenarioCompletion;
pub use user_progress::{quiz_passed, UserProgress, QUIZ_PASS_THRESHOLD};
