// AR CyberGuard - API Core
//
// This crate provides the backend API for the AR CyberGuard educational
// cybersecurity platform: phone-verified accounts, quiz and phishing-game
// content management, and per-user learning progress.
//
// Architecture follows domain-driven design; HTTP routing lives in server/.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
