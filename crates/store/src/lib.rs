//! `dp-store` — durable named strings for daypost cursors.
//!
//! Provides the [`CursorStore`] trait and three backends:
//!
//! | Backend  | Implementation  | Best for                          |
//! |----------|-----------------|-----------------------------------|
//! | `yaml`   | [`YamlFileStore`] | single host, state next to config (default) |
//! | `kv`     | [`KvStore`]       | Cloudflare Workers KV, stateless hosts |
//! | `memory` | [`MemoryStore`]   | dry runs and tests                 |
//!
//! Every backend reads a never-written key as `""`.

pub mod kv;
pub mod memory;
pub mod provider;
pub mod yaml;

// ── Re-exports for ergonomic imports ─────────────────────────────────

pub use kv::{from_reqwest, KvStore};
pub use memory::MemoryStore;
pub use provider::CursorStore;
pub use yaml::YamlFileStore;

use std::sync::Arc;

use dp_domain::config::{StoreBackend, StoreConfig};
use dp_domain::error::{Error, Result};

/// Create the [`CursorStore`] selected by `store.backend`.
pub fn create_store(cfg: &StoreConfig) -> Result<Arc<dyn CursorStore>> {
    match cfg.backend {
        StoreBackend::Yaml => {
            tracing::info!(path = %cfg.yaml_path.display(), "using yaml cursor store");
            Ok(Arc::new(YamlFileStore::new(cfg.yaml_path.clone())))
        }
        StoreBackend::Kv => {
            let token = cfg.kv.resolve_token().ok_or_else(|| {
                Error::Config(format!("kv backend selected but ${} is not set", cfg.kv.token_env))
            })?;
            let store = KvStore::new(&cfg.kv, token)?;
            tracing::info!(
                account_id = %cfg.kv.account_id,
                namespace_id = %cfg.kv.namespace_id,
                "using workers kv cursor store"
            );
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory cursor store; cursors are lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
