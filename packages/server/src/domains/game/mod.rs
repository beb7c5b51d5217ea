//! Game domain - the phishing inbox minigame's email pool

pub mod models;

pub use models::PhishingEmail;
