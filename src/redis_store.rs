//! Redis-backed session store.
//!
//! Available only when the `redis` cargo feature is enabled (the default).
//! Records are stored verbatim under `prefix + token` and expire through
//! Redis's native key TTL, set with `PEXPIREAT` in the same transaction as
//! the value write. There is no sweep owned by this crate: an expired record
//! is simply observed as not-found on the next read.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use tracing::debug;

use crate::error::{Error, Result};
use crate::store::SessionStore;

/// Key prefix used by [`RedisStore::new`].
pub const DEFAULT_PREFIX: &str = "session:";

/// Per-request timeout used unless overridden with [`RedisStore::with_timeout`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Redis-backed session store.
///
/// Holds a `redis::aio::ConnectionManager`, which is multiplexed, cheaply
/// cloneable, and reconnects on transient failures. The manager is supplied
/// by the caller and may be shared with unrelated components; the store
/// never closes or reconfigures it.
pub struct RedisStore {
    conn: redis::aio::ConnectionManager,
    prefix: String,
    timeout: Duration,
}

impl RedisStore {
    /// Create a store using the default key prefix.
    pub fn new(conn: redis::aio::ConnectionManager) -> Self {
        Self::with_prefix(conn, DEFAULT_PREFIX)
    }

    /// Create a store with an explicit key prefix. The prefix namespaces
    /// this store's keys so that independent consumers can share one Redis
    /// instance without collisions. It is not validated; an empty or
    /// overlapping prefix is the caller's risk.
    pub fn with_prefix(conn: redis::aio::ConnectionManager, prefix: impl Into<String>) -> Self {
        Self {
            conn,
            prefix: prefix.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Replace the per-request timeout (default 5 seconds).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn key(&self, token: &str) -> String {
        format!("{}{token}", self.prefix)
    }

    /// Run one backend request under the per-request timeout. A request that
    /// outlives the timeout is abandoned and reported as [`Error::Timeout`].
    /// Nothing is retried here; retry policy belongs to the caller.
    async fn request<T>(&self, fut: impl Future<Output = redis::RedisResult<T>>) -> Result<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(reply) => Ok(reply?),
            Err(_) => Err(Error::Timeout(self.timeout)),
        }
    }
}

#[async_trait]
impl SessionStore for RedisStore {
    async fn find(&self, token: &str) -> Result<Option<Vec<u8>>> {
        let key = self.key(token);
        let mut conn = self.conn.clone();
        let data: Option<Vec<u8>> = self.request(conn.get(&key)).await?;
        Ok(data)
    }

    async fn commit(
        &self,
        token: &str,
        data: &[u8],
        expiry: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let key = self.key(token);
        let mut conn = self.conn.clone();

        // SET and PEXPIREAT must land together: a value stored without its
        // expiry could outlive its intended lifetime. MULTI/EXEC via an
        // atomic pipeline. With no expiry a plain SET suffices, since SET
        // also clears any TTL left by a previous commit.
        let mut pipe = redis::pipe();
        pipe.atomic();
        pipe.set(&key, data).ignore();
        if let Some(at) = expiry {
            pipe.cmd("PEXPIREAT").arg(&key).arg(unix_millis(at)).ignore();
        }
        let () = self.request(pipe.query_async(&mut conn)).await?;
        debug!(expires = expiry.is_some(), "committed session record");
        Ok(())
    }

    async fn delete(&self, token: &str) -> Result<()> {
        let key = self.key(token);
        let mut conn = self.conn.clone();
        // DEL treats an absent key as a no-op, so delete is idempotent.
        let _removed: i64 = self.request(conn.del(&key)).await?;
        Ok(())
    }

    async fn all(&self) -> Result<HashMap<String, Vec<u8>>> {
        let pattern = format!("{}*", self.prefix);
        let mut conn = self.conn.clone();
        let keys: Vec<String> = self
            .request(redis::cmd("KEYS").arg(&pattern).query_async(&mut conn))
            .await?;
        debug!(keys = keys.len(), "enumerated session keys");

        // Two-phase scan, not a snapshot: keys enumerated above are re-read
        // one by one. A key that expired or was deleted in between is
        // skipped; any other re-fetch failure fails the whole call rather
        // than returning a partial map.
        let mut sessions = HashMap::new();
        for full_key in keys {
            let Some(token) = full_key.strip_prefix(&self.prefix) else {
                continue;
            };
            if let Some(data) = self.find(token).await? {
                sessions.insert(token.to_owned(), data);
            }
        }
        Ok(sessions)
    }
}

/// Convert an absolute instant to the integer epoch-millisecond form that
/// `PEXPIREAT` takes.
fn unix_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::unix_millis;

    #[test]
    fn unix_millis_at_epoch() {
        let epoch = chrono::Utc.timestamp_opt(0, 0).single().unwrap();
        assert_eq!(unix_millis(epoch), 0);
    }

    #[test]
    fn unix_millis_truncates_sub_millisecond() {
        // 1.999_999 ms past the epoch is still millisecond 1.
        let at = chrono::Utc.timestamp_opt(0, 1_999_999).single().unwrap();
        assert_eq!(unix_millis(at), 1);
    }

    #[test]
    fn unix_millis_known_instant() {
        let at = chrono::Utc.timestamp_opt(1_700_000_000, 250_000_000).single().unwrap();
        assert_eq!(unix_millis(at), 1_700_000_000_250);
    }

    #[test]
    fn unix_millis_before_epoch() {
        let at = chrono::Utc.timestamp_opt(-2, 500_000_000).single().unwrap();
        assert_eq!(unix_millis(at), -1_500);
    }
}
