//! Process-local store.  Used by `--dry-run` and by tests.

use std::collections::HashMap;

use async_trait::async_trait;
use dp_domain::error::Result;
use parking_lot::RwLock;

use crate::provider::CursorStore;

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-seeded with `(key, value)` pairs.
    pub fn with_values<K, V>(values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: RwLock::new(
                values
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Current value of `key`, if it was ever set.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }
}

#[async_trait]
impl CursorStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<String> {
        Ok(self.peek(key).unwrap_or_default())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values.write().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
