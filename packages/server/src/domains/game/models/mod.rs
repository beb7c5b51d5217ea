pub mod phishing_email;

pub use phishing_email::PhishingEmail;
