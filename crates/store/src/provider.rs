//! The `CursorStore` trait defines the interface for every durable
//! key/value backend (YAML file, Workers KV, in-memory/test).

use async_trait::async_trait;
use dp_domain::error::Result;

/// Durable named strings backing feed cursors and posted-day keys.
///
/// A key that was never set reads as the empty string, not as an error.
/// All failures surface as `Error::Store` (or a transport error that the
/// caller reports the same way).
#[async_trait]
pub trait CursorStore: Send + Sync {
    /// Read `key`; missing keys yield `""`.
    async fn get(&self, key: &str) -> Result<String>;

    /// Persist `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Short backend name used in logs.
    fn backend(&self) -> &'static str;
}
