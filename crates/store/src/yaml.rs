//! Flat YAML file store: one `key: value` mapping per file.
//!
//! Reads accept string and integer values.  Writes go to a temporary file
//! in the same directory which then replaces the original, so a crash
//! mid-write never leaves a truncated state file behind.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use async_trait::async_trait;
use dp_domain::error::{Error, Result};
use dp_domain::trace::TraceEvent;
use serde_yaml::{Mapping, Value};
use tokio::sync::Mutex;

use crate::provider::CursorStore;

pub struct YamlFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl YamlFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Read the mapping at `path`; a missing or blank file is an empty mapping.
fn read_mapping(path: &Path) -> Result<Mapping> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Mapping::new()),
        Err(e) => {
            return Err(Error::Store(format!("reading {}: {e}", path.display())));
        }
    };
    if raw.trim().is_empty() {
        return Ok(Mapping::new());
    }
    match serde_yaml::from_str::<Value>(&raw)? {
        Value::Mapping(map) => Ok(map),
        Value::Null => Ok(Mapping::new()),
        _ => Err(Error::Store(format!(
            "{} does not hold a key/value mapping",
            path.display()
        ))),
    }
}

fn value_to_string(key: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        _ => Err(Error::Store(format!(
            "value of `{key}` has an unsupported type; only strings and integers are supported"
        ))),
    }
}

fn write_mapping(path: &Path, map: &Mapping) -> Result<()> {
    let yaml = serde_yaml::to_string(map)?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
    tmp.write_all(yaml.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .map_err(|e| Error::Store(format!("replacing {}: {}", path.display(), e.error)))?;
    Ok(())
}

fn trace(op: &str, key: &str, ok: bool, start: Instant) {
    TraceEvent::StoreCall {
        backend: "yaml".into(),
        op: op.into(),
        key: key.into(),
        status: if ok { 200 } else { 500 },
        duration_ms: start.elapsed().as_millis() as u64,
    }
    .emit();
}

#[async_trait]
impl CursorStore for YamlFileStore {
    async fn get(&self, key: &str) -> Result<String> {
        let start = Instant::now();
        let path = self.path.clone();
        let owned_key = key.to_owned();
        // Spawn blocking to avoid blocking the Tokio executor.
        let result = tokio::task::spawn_blocking(move || {
            let map = read_mapping(&path)?;
            match map.get(owned_key.as_str()) {
                Some(v) => value_to_string(&owned_key, v),
                None => Ok(String::new()),
            }
        })
        .await
        .map_err(|e| Error::Store(format!("yaml get task: {e}")))?;
        trace("get", key, result.is_ok(), start);
        result
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let start = Instant::now();
        let path = self.path.clone();
        let owned_key = key.to_owned();
        let owned_value = value.to_owned();
        let result = tokio::task::spawn_blocking(move || {
            let mut map = read_mapping(&path)?;
            map.insert(Value::String(owned_key), Value::String(owned_value));
            write_mapping(&path, &map)
        })
        .await
        .map_err(|e| Error::Store(format!("yaml set task: {e}")))?;
        trace("set", key, result.is_ok(), start);
        if let Err(ref e) = result {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to persist state file");
        }
        result
    }

    fn backend(&self) -> &'static str {
        "yaml"
    }
}
