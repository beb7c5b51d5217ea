//! Progress domain - scenario completions, quiz attempts, and the
//! per-user counters derived from them

pub mod models;

pub use models::{quiz_passed, QuizAttempt, ScenarioCompletion, UserProgress};
