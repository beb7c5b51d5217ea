//! The persisted session blob and its accessor.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage key shared by every frontend build.
pub const STORAGE_KEY: &str = "userData";

/// How the session was established. Admin logins land in the admin panel,
/// user logins (and guests) in the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginType {
    User,
    Admin,
}

fn is_false(v: &bool) -> bool {
    !v
}

/// The single persisted session blob.
///
/// Authenticated sessions carry the user's public fields plus the access
/// token. Guest sessions carry only a display identity and the guest flag;
/// they have no id, token, or role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub login_time: DateTime<Utc>,
    pub login_type: LoginType,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_guest: bool,
}

impl StoredSession {
    /// Blob for a successful login. The role falls back to the login type
    /// when the server response omitted it.
    pub fn authenticated(
        id: i64,
        username: impl Into<String>,
        email: impl Into<String>,
        name: Option<String>,
        role: Option<String>,
        token: impl Into<String>,
        login_type: LoginType,
    ) -> Self {
        let role = role.or_else(|| {
            Some(match login_type {
                LoginType::Admin => "admin".to_string(),
                LoginType::User => "user".to_string(),
            })
        });
        Self {
            id: Some(id),
            username: username.into(),
            email: email.into(),
            name,
            role,
            token: Some(token.into()),
            login_time: Utc::now(),
            login_type,
            is_guest: false,
        }
    }

    /// The canonical guest blob.
    pub fn guest() -> Self {
        Self {
            id: None,
            username: "Guest User".to_string(),
            email: "guest@example.com".to_string(),
            name: None,
            role: None,
            token: None,
            login_time: Utc::now(),
            login_type: LoginType::User,
            is_guest: true,
        }
    }

    pub fn is_admin(&self) -> bool {
        !self.is_guest && self.role.as_deref() == Some("admin")
    }
}

/// String-KV storage seam. Mirrors the `localStorage` surface.
pub trait SessionBackend {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory backend for tests and non-browser hosts.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl SessionBackend for MemoryBackend {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|map| map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut map) = self.entries.lock() {
            map.insert(key.to_string(), value.to_string());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut map) = self.entries.lock() {
            map.remove(key);
        }
    }
}

/// Accessor with explicit load/save/clear. No other code touches the key.
pub struct SessionStore<B: SessionBackend> {
    backend: B,
}

impl<B: SessionBackend> SessionStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Current session, if a parseable blob is present. A corrupt blob reads
    /// as "not logged in", the same as absence.
    pub fn load(&self) -> Option<StoredSession> {
        let raw = self.backend.get(STORAGE_KEY)?;
        serde_json::from_str(&raw).ok()
    }

    pub fn save(&self, session: &StoredSession) -> serde_json::Result<()> {
        let raw = serde_json::to_string(session)?;
        self.backend.set(STORAGE_KEY, &raw);
        Ok(())
    }

    pub fn clear(&self) {
        self.backend.remove(STORAGE_KEY);
    }

    pub fn is_authenticated(&self) -> bool {
        self.load().is_some()
    }
}
