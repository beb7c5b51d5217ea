// Common types and utilities shared across the application

pub mod cookies;
pub mod errors;
pub mod input;
pub mod redact;

pub use errors::ApiError;
pub use input::provided;
