//! Users domain - cached directory listings over the credential store

pub mod views;

pub use views::{AdminUserView, PublicUser};
