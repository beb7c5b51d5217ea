// HTTP routes
pub mod auth;
pub mod game;
pub mod health;
pub mod progress;
pub mod quiz;
pub mod users;

pub use health::*;
