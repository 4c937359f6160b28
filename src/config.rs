//! Settings and the endpoint config store.
//!
//! Settings live in a small YAML file. Resolution order for each value:
//! environment variable > settings file > built-in default.
//!
//! | Variable | Setting |
//! |----------|---------|
//! | `AGENT_WEBHOOK_CONFIG` | settings file path |
//! | `AGENT_WEBHOOK_URL` | `endpoint_url` |
//! | `AGENT_WEBHOOK_TIMEOUT_SECS` | `chat_timeout_secs` |
//! | `AGENT_WEBHOOK_PROBE_TIMEOUT_SECS` | `probe_timeout_secs` |

use crate::{Error, ErrorContext, Result};
use arc_swap::{ArcSwap, ArcSwapOption};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_CHAT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 15;

/// Persisted settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub endpoint_url: Option<String>,
    pub chat_timeout_secs: u64,
    pub probe_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint_url: None,
            chat_timeout_secs: DEFAULT_CHAT_TIMEOUT_SECS,
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Load from `path`. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) if content.trim().is_empty() => Ok(Self::default()),
            Ok(content) => Ok(serde_yaml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write to `path` via a temp file + rename so readers never see a half-written file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let tmp = path.with_extension("yaml.tmp");
        std::fs::write(&tmp, yaml)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Apply `AGENT_WEBHOOK_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = var("AGENT_WEBHOOK_URL").filter(|u| !u.trim().is_empty()) {
            self.endpoint_url = Some(url.trim().to_string());
        }
        if let Some(secs) = var("AGENT_WEBHOOK_TIMEOUT_SECS").and_then(|s| s.parse::<u64>().ok()) {
            self.chat_timeout_secs = secs;
        }
        if let Some(secs) =
            var("AGENT_WEBHOOK_PROBE_TIMEOUT_SECS").and_then(|s| s.parse::<u64>().ok())
        {
            self.probe_timeout_secs = secs;
        }
        self
    }

    pub fn chat_deadline(&self) -> Duration {
        Duration::from_secs(self.chat_timeout_secs.max(1))
    }

    pub fn probe_deadline(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs.max(1))
    }
}

/// `$AGENT_WEBHOOK_CONFIG`, else `$HOME/.config/agent-webhook/config.yaml`, else a file in
/// the working directory.
pub fn default_config_path() -> PathBuf {
    if let Ok(p) = std::env::var("AGENT_WEBHOOK_CONFIG") {
        return PathBuf::from(p);
    }
    let home = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE"));
    match home {
        Some(home) => PathBuf::from(home)
            .join(".config")
            .join("agent-webhook")
            .join("config.yaml"),
        None => PathBuf::from("agent-webhook.yaml"),
    }
}

/// Trim and check an endpoint URL: it must parse and use `http` or `https`.
pub fn validate_endpoint_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let ctx = || {
        ErrorContext::new()
            .with_field_path("settings.endpoint_url")
            .with_source("validate_endpoint_url")
    };
    let parsed = url::Url::parse(trimmed).map_err(|e| {
        Error::validation_with_context(
            "Please enter a valid URL",
            ctx().with_details(format!("{}: {}", trimmed, e)),
        )
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(Error::validation_with_context(
            "Please enter a valid URL",
            ctx().with_details(format!("unsupported scheme '{}'", other)),
        )),
    }
}

/// Where the endpoint URL lives between dispatches.
///
/// Read once at the start of every dispatch; `set` validates before storing.
pub trait ConfigStore: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, url: &str) -> Result<()>;
}

/// In-process store, nothing persisted.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    url: ArcSwapOption<String>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `url` (validated).
    pub fn with_url(url: &str) -> Result<Self> {
        let store = Self::new();
        store.set(url)?;
        Ok(store)
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self) -> Option<String> {
        self.url.load_full().map(|u| u.as_ref().clone())
    }

    fn set(&self, url: &str) -> Result<()> {
        let url = validate_endpoint_url(url)?;
        self.url.store(Some(Arc::new(url)));
        Ok(())
    }
}

/// YAML-file backed store. Environment overrides apply to reads but are never written back.
#[derive(Debug)]
pub struct FileConfigStore {
    path: PathBuf,
    current: ArcSwap<Settings>,
}

impl FileConfigStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let settings = Settings::load(&path)?.with_env_overrides();
        Ok(Self {
            path,
            current: ArcSwap::from_pointee(settings),
        })
    }

    pub fn open_default() -> Result<Self> {
        Self::open(default_config_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Effective settings (file plus env overrides).
    pub fn settings(&self) -> Settings {
        self.current.load().as_ref().clone()
    }
}

impl ConfigStore for FileConfigStore {
    fn get(&self) -> Option<String> {
        self.current.load().endpoint_url.clone()
    }

    fn set(&self, url: &str) -> Result<()> {
        let url = validate_endpoint_url(url)?;

        let mut on_disk = Settings::load(&self.path)?;
        on_disk.endpoint_url = Some(url.clone());
        on_disk.save(&self.path)?;

        let mut effective = self.settings();
        effective.endpoint_url = Some(url);
        self.current.store(Arc::new(effective));
        debug!(path = %self.path.display(), "endpoint url saved");
        Ok(())
    }
}
