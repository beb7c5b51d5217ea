//! Auth domain - registration, phone verification and session issuance
//!
//! Flow: register → verification SMS → verify phone → login → JWT access
//! token plus an HttpOnly refresh cookie.
//!
//! Responsibilities:
//! - Account registration and duplicate-identity checks
//! - SMS verification gating before first login
//! - Password login, change and reset
//! - JWT access tokens and opaque refresh tokens

pub mod jwt;
pub mod models;
pub mod password;
pub mod service;

pub use jwt::{Claims, JwtService, ROLE_ADMIN, ROLE_USER};
pub use models::{PasswordReset, RefreshToken, User};
pub use service::{
    AdminVerifyInput, AuthService, ChangePasswordInput, ForgotOutcome, LoginInput, LoginSuccess,
    PhoneInput, RegisterInput, RegisteredUser, ResendOutcome, ResetPasswordInput, VerifyPhoneInput,
};
