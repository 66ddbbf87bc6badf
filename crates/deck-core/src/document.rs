//! The persisted document: groups of both families plus settings

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use deck_fs::{ConfigStore, FileSystem};
use serde::{Deserialize, Serialize};

use crate::model::{EnvGroup, HostGroup, ManagedGroup, Variable};
use crate::settings::Settings;
use crate::{Error, Result};

/// Schema version written into documents and exports.
pub const SCHEMA_VERSION: &str = "1.0";

/// Directory name under the platform data directory.
pub const APP_DIR_NAME: &str = "envdeck";

/// Everything EnvDeck persists between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub version: String,
    pub groups: Vec<EnvGroup>,
    /// Absent in documents written before hosts support.
    #[serde(default)]
    pub hosts_groups: Vec<HostGroup>,
    #[serde(default)]
    pub settings: Settings,
    pub last_saved_at: DateTime<Utc>,
}

impl Document {
    pub fn empty() -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            groups: Vec::new(),
            hosts_groups: Vec::new(),
            settings: Settings::default(),
            last_saved_at: Utc::now(),
        }
    }

    /// The document a first run starts from: one disabled sample group.
    pub fn starter() -> Self {
        let mut sample = EnvGroup::create("Sample Group", "A sample group, safe to delete");
        sample
            .variables
            .push(Variable::new("EXAMPLE_VAR", "example_value"));
        Self {
            groups: vec![sample],
            ..Self::empty()
        }
    }
}

/// Where EnvDeck keeps its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<platform data dir>/envdeck`, falling back to `~/.envdeck`.
    pub fn platform_default() -> Result<Self> {
        dirs::data_dir()
            .map(|d| d.join(APP_DIR_NAME))
            .or_else(|| dirs::home_dir().map(|h| h.join(format!(".{APP_DIR_NAME}"))))
            .map(Self::new)
            .ok_or(Error::NoDataDir)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn document(&self) -> PathBuf {
        self.root.join("data.json")
    }

    pub fn backups(&self) -> PathBuf {
        self.root.join("backups")
    }
}

/// Loads and saves the [`Document`] through a [`ConfigStore`].
#[derive(Debug, Clone)]
pub struct DocumentStore {
    store: ConfigStore,
    path: PathBuf,
}

impl DocumentStore {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self {
            store: ConfigStore::with_fs(fs),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document, or the starter document if none was saved yet.
    pub fn load(&self) -> Result<Document> {
        let Some(mut document) = self.store.load_optional::<Document>(&self.path)? else {
            tracing::debug!(path = %self.path.display(), "no document yet, using starter");
            return Ok(Document::starter());
        };
        document.settings.normalize();
        Ok(document)
    }

    /// Stamp `last_saved_at` and write atomically.
    pub fn save(&self, document: &mut Document) -> Result<()> {
        document.last_saved_at = Utc::now();
        self.store.save(&self.path, document)?;
        tracing::debug!(
            path = %self.path.display(),
            groups = document.groups.len(),
            hosts_groups = document.hosts_groups.len(),
            "saved document"
        );
        Ok(())
    }
}
