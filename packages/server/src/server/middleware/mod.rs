// HTTP middleware
pub mod jwt_auth;
pub mod request_log;

pub use jwt_auth::*;
pub use request_log::*;
