use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Cursor store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "d_backend")]
    pub backend: StoreBackend,
    /// Flat `key: value` YAML file used by the `yaml` backend.
    #[serde(default = "d_yaml_path")]
    pub yaml_path: PathBuf,
    #[serde(default)]
    pub kv: KvConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Yaml,
    Kv,
    /// Process-local only; state is lost on restart.
    Memory,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: d_backend(),
            yaml_path: d_yaml_path(),
            kv: KvConfig::default(),
        }
    }
}

/// Cloudflare Workers KV namespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KvConfig {
    #[serde(default = "d_kv_url")]
    pub base_url: String,
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub namespace_id: String,
    #[serde(default = "d_kv_token_env")]
    pub token_env: String,
    #[serde(default = "d_8000")]
    pub timeout_ms: u64,
    #[serde(default = "d_3")]
    pub max_retries: u32,
}

impl Default for KvConfig {
    fn default() -> Self {
        Self {
            base_url: d_kv_url(),
            account_id: String::new(),
            namespace_id: String::new(),
            token_env: d_kv_token_env(),
            timeout_ms: 8000,
            max_retries: 3,
        }
    }
}

impl KvConfig {
    pub fn resolve_token(&self) -> Option<String> {
        std::env::var(&self.token_env).ok().filter(|t| !t.is_empty())
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_backend() -> StoreBackend {
    StoreBackend::Yaml
}
fn d_yaml_path() -> PathBuf {
    PathBuf::from("daypost-state.yaml")
}
fn d_kv_url() -> String {
    "https://api.cloudflare.com/client/v4".into()
}
fn d_kv_token_env() -> String {
    "DP_KV_TOKEN".into()
}
fn d_8000() -> u64 {
    8000
}
fn d_3() -> u32 {
    3
}
