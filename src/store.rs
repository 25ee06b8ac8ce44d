//! Trait abstraction for session storage.
//!
//! Allows swapping between the in-memory and Redis-backed stores.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;

/// Trait for session storage backends.
///
/// A record is an opaque byte payload stored under a caller-supplied token
/// with an absolute expiry instant; `None` means the record never expires.
/// An absent or expired token is a routine outcome, not an error.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Look up the record for `token`. Returns `Ok(None)` when the token was
    /// never committed, was deleted, or has expired.
    async fn find(&self, token: &str) -> Result<Option<Vec<u8>>>;

    /// Write `data` under `token` with the given absolute expiry. An
    /// existing record and its expiry are replaced unconditionally
    /// (last-writer-wins, no conflict detection).
    async fn commit(
        &self,
        token: &str,
        data: &[u8],
        expiry: Option<DateTime<Utc>>,
    ) -> Result<()>;

    /// Remove the record for `token`. Removing an absent token is a no-op.
    async fn delete(&self, token: &str) -> Result<()>;

    /// Return a token → data map of every record still present at read time.
    async fn all(&self) -> Result<HashMap<String, Vec<u8>>>;
}
