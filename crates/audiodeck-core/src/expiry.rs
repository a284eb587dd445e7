//! Expiry sidecars: `<file>.meta.json` next to each produced clip, read by
//! the external cleanup sweep.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::filename::unix_millis;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiryMeta {
    /// Unix milliseconds.
    pub created_at: u64,
    pub ttl_ms: u64,
    pub expiry_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_filename: Option<String>,
}

impl ExpiryMeta {
    pub fn new(created_at: u64, ttl: Duration, original_filename: Option<String>) -> Self {
        let ttl_ms = ttl.as_millis() as u64;
        Self {
            created_at,
            ttl_ms,
            expiry_at: created_at.saturating_add(ttl_ms),
            original_filename,
        }
    }
}

pub fn meta_path(file: &Path) -> PathBuf {
    let mut name = file.as_os_str().to_owned();
    name.push(".meta.json");
    PathBuf::from(name)
}

/// Write the sidecar for `file`. Best-effort: failures are logged and
/// otherwise ignored.
pub async fn write_expiry_meta(
    file: &Path,
    ttl: Duration,
    original_filename: Option<String>,
) -> ExpiryMeta {
    let meta = ExpiryMeta::new(unix_millis(), ttl, original_filename);
    let path = meta_path(file);
    let written = match serde_json::to_vec_pretty(&meta) {
        Ok(bytes) => tokio::fs::write(&path, bytes).await.map_err(anyhow::Error::from),
        Err(e) => Err(e.into()),
    };
    if let Err(e) = written {
        tracing::warn!(path = %path.display(), error = %e, "failed to write expiry metadata");
    }
    meta
}

/// Read a sidecar back; `None` if missing or malformed.
pub async fn read_expiry_meta(file: &Path) -> Option<ExpiryMeta> {
    let raw = tokio::fs::read(meta_path(file)).await.ok()?;
    serde_json::from_slice(&raw).ok()
}
