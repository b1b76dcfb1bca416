use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::config::constants::defaults;
use crate::config::settings::AppSettings;

/// Source of the settings the orchestrator snapshots once per turn
pub trait SettingsStore: Send + Sync {
    fn get(&self) -> Result<AppSettings>;

    fn set(&self, settings: AppSettings) -> Result<()>;

    /// Immutable view shared with a running turn
    fn snapshot(&self) -> Result<Arc<AppSettings>>;
}

/// `settings.json` in the data directory, cached after the first read.
///
/// A missing or unreadable document yields defaults, so a fresh install
/// works without any setup.
#[derive(Debug)]
pub struct JsonSettingsStore {
    path: PathBuf,
    cache: RwLock<Option<Arc<AppSettings>>>,
}

impl JsonSettingsStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self::at_path(data_dir.as_ref().join(defaults::SETTINGS_FILE_NAME))
    }

    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_disk(&self) -> AppSettings {
        match fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => {
                    debug!(target = "storage", path = %self.path.display(), "settings_loaded");
                    settings
                }
                Err(err) => {
                    warn!(
                        target = "storage",
                        path = %self.path.display(),
                        error = %err,
                        "settings_parse_failed_using_defaults"
                    );
                    AppSettings::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => AppSettings::default(),
            Err(err) => {
                warn!(
                    target = "storage",
                    path = %self.path.display(),
                    error = %err,
                    "settings_read_failed_using_defaults"
                );
                AppSettings::default()
            }
        }
    }

    fn cached(&self) -> Arc<AppSettings> {
        if let Some(settings) = self.cache.read().as_ref() {
            return settings.clone();
        }
        let mut cache = self.cache.write();
        cache
            .get_or_insert_with(|| Arc::new(self.load_from_disk()))
            .clone()
    }
}

impl SettingsStore for JsonSettingsStore {
    fn get(&self) -> Result<AppSettings> {
        Ok(self.cached().as_ref().clone())
    }

    fn set(&self, settings: AppSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(&settings)
            .context("Failed to serialize settings")?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write settings file: {}", self.path.display()))?;

        *self.cache.write() = Some(Arc::new(settings));
        debug!(target = "storage", path = %self.path.display(), "settings_saved");
        Ok(())
    }

    fn snapshot(&self) -> Result<Arc<AppSettings>> {
        Ok(self.cached())
    }
}

/// In-memory settings, for tests and embedding hosts.
/// Created with [`MemorySettingsStore::unloaded`] it reports settings as
/// unavailable until [`SettingsStore::set`] is called.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    settings: RwLock<Option<Arc<AppSettings>>>,
}

impl MemorySettingsStore {
    pub fn new(settings: AppSettings) -> Self {
        Self {
            settings: RwLock::new(Some(Arc::new(settings))),
        }
    }

    pub fn unloaded() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self) -> Result<AppSettings> {
        self.snapshot().map(|settings| settings.as_ref().clone())
    }

    fn set(&self, settings: AppSettings) -> Result<()> {
        *self.settings.write() = Some(Arc::new(settings));
        Ok(())
    }

    fn snapshot(&self) -> Result<Arc<AppSettings>> {
        self.settings
            .read()
            .clone()
            .ok_or_else(|| anyhow!("settings have not been loaded"))
    }
}
