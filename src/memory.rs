use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::error::Result;
use crate::store::SessionStore;

struct Record {
    data: Vec<u8>,
    expiry: Option<DateTime<Utc>>,
}

impl Record {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry.is_some_and(|at| at <= now)
    }
}

/// In-memory session store backed by DashMap (no external services).
///
/// Expiry is enforced lazily: an expired record is dropped when a read
/// touches it, and `all` filters expired records out.
#[derive(Default)]
pub struct MemoryStore {
    sessions: DashMap<String, Record>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn find(&self, token: &str) -> Result<Option<Vec<u8>>> {
        let Some(entry) = self.sessions.get(token) else {
            return Ok(None);
        };
        if entry.is_expired(Utc::now()) {
            // Drop the read guard before removing to avoid deadlocking the shard.
            drop(entry);
            self.sessions.remove(token);
            return Ok(None);
        }
        Ok(Some(entry.data.clone()))
    }

    async fn commit(
        &self,
        token: &str,
        data: &[u8],
        expiry: Option<DateTime<Utc>>,
    ) -> Result<()> {
        self.sessions.insert(
            token.to_owned(),
            Record {
                data: data.to_vec(),
                expiry,
            },
        );
        Ok(())
    }

    async fn delete(&self, token: &str) -> Result<()> {
        self.sessions.remove(token);
        Ok(())
    }

    async fn all(&self) -> Result<HashMap<String, Vec<u8>>> {
        let now = Utc::now();
        self.sessions.retain(|_, record| !record.is_expired(now));
        let sessions = self
            .sessions
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().data.clone()))
            .collect();
        Ok(sessions)
    }
}
