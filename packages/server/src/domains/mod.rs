// Business domains
pub mod auth;
pub mod game;
pub mod progress;
pub mod quiz;
pub mod users;
