pub mod password_reset;
pub mod refresh_token;
pub mod user;

pub use password_reset::PasswordReset;
pub use refresh_token::RefreshToken;
pub use user::User;
