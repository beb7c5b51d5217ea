use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Cache key for the public user listing
pub const USERS_ALL_KEY: &str = "users:all";
/// Cache key for the admin user listing
pub const ADMIN_USERS_KEY: &str = "admin:users:all";

pub fn user_key(user_id: i64) -> String {
    format!("user:{user_id}")
}

pub fn progress_key(user_id: i64) -> String {
    format!("progress:{user_id}")
}

/// Redis-backed response cache.
///
/// Every operation degrades to a miss when Redis is down or was never
/// reachable at startup; callers treat the cache as advisory and fall
/// back to the database.
#[derive(Clone)]
pub struct Cache {
    manager: Option<ConnectionManager>,
}

impl Cache {
    /// Connect to Redis. A connection failure leaves the cache disabled
    /// instead of taking the server down.
    pub async fn connect(url: &str) -> Self {
        match Self::try_connect(url).await {
            Ok(manager) => {
                tracing::info!("connected to redis");
                Self {
                    manager: Some(manager),
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "redis unavailable, caching disabled");
                Self { manager: None }
            }
        }
    }

    async fn try_connect(url: &str) -> redis::RedisResult<ConnectionManager> {
        let client = redis::Client::open(url)?;
        client.get_connection_manager().await
    }

    /// A cache that never stores anything (tests, Redis-less deploys)
    pub fn disabled() -> Self {
        Self { manager: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.manager.is_some()
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut conn = self.manager.clone()?;
        match conn.get::<_, Option<String>>(key).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).ok(),
            Ok(None) => None,
            Err(err) => {
                tracing::debug!(error = %err, key, "cache read failed");
                None
            }
        }
    }

    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let mut conn = match self.manager.clone() {
            Some(conn) => conn,
            None => return,
        };
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(_) => return,
        };
        if let Err(err) = conn.set_ex::<_, _, ()>(key, raw, ttl.as_secs()).await {
            tracing::debug!(error = %err, key, "cache write failed");
        }
    }

    /// Invalidate a key. Errors are logged and swallowed; a failed
    /// invalidation only means one stale read window.
    pub async fn delete(&self, key: &str) {
        let mut conn = match self.manager.clone() {
            Some(conn) => conn,
            None => return,
        };
        if let Err(err) = conn.del::<_, ()>(key).await {
            tracing::debug!(error = %err, key, "cache invalidation failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_cache_always_misses() {
        let cache = Cache::disabled();
        assert!(!cache.is_enabled());
        assert_eq!(cache.get_json::<Vec<String>>(USERS_ALL_KEY).await, None);
    }

    #[tokio::test]
    async fn disabled_cache_accepts_writes_and_deletes() {
        let cache = Cache::disabled();
        cache
            .set_json(USERS_ALL_KEY, &vec!["a".to_string()], Duration::from_secs(60))
            .await;
        cache.delete(USERS_ALL_KEY).await;
        assert_eq!(cache.get_json::<Vec<String>>(USERS_ALL_KEY).await, None);
    }

    #[test]
    fn per_user_keys_embed_the_id() {
        assert_eq!(user_key(7), "user:7");
        assert_eq!(progress_key(7), "progress:7");
    }
}
