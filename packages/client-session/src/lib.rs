//! Client-side session convention for the CyberGuard SPA.
//!
//! The browser keeps exactly one persisted blob as its source of truth for
//! "am I logged in" and "what is my role". This crate owns that blob's shape,
//! the accessor that reads and writes it, and the pure route-guard decisions
//! made from it, so frontends depend on one interface instead of ad hoc
//! storage reads. The storage itself is abstract: a WASM frontend plugs in
//! `localStorage`, tests use the in-memory backend.
//!
//! None of this is a security boundary. The server's access guard is; these
//! checks only keep protected views from flashing for the wrong audience.

pub mod guard;
pub mod session;

pub use guard::{route_decision, GuardDecision, RouteAccess};
pub use session::{LoginType, MemoryBackend, SessionBackend, SessionStore, StoredSession};
