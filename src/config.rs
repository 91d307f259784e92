//! The developer registry persisted in `~/.pearrc`.
//!
//! The file is YAML:
//!
//! ```yaml
//! email: team@example.com
//! devs:
//!   deva:
//!     name: Full Name A
//!     email: a@example.com
//! ```
//!
//! Older files map a key straight to a name (`deva: Full Name A`); those are
//! still read and are rewritten in the current form on the next save.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// File name of the registry inside the home directory.
pub const CONFIG_FILE_NAME: &str = ".pearrc";

/// A developer known to pear.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DevEntry")]
pub struct Dev {
    pub name: String,
    pub email: String,
}

impl Dev {
    /// Creates a developer entry.
    ///
    /// # Parameters
    /// - `name`: Full name used in `user.name` and co-author trailers.
    /// - `email`: Address for the co-author trailer; may be empty.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Dev {
            name: name.into(),
            email: email.into(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DevEntry {
    Full {
        #[serde(default)]
        name: String,
        #[serde(default)]
        email: String,
    },
    Legacy(String),
}

impl From<DevEntry> for Dev {
    fn from(entry: DevEntry) -> Self {
        match entry {
            DevEntry::Full { name, email } => Dev { name, email },
            DevEntry::Legacy(name) => Dev {
                name,
                email: String::new(),
            },
        }
    }
}

/// Base email plus every developer registered so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
    pub devs: BTreeMap<String, Dev>,
}

/// Whole-file storage for a [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store at `~/.pearrc`.
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir().ok_or(Error::NoHomeDir)?;
        Ok(Self::with_path(home.join(CONFIG_FILE_NAME)))
    }

    /// Store backed by the file at `path` instead of `~/.pearrc`.
    ///
    /// # Parameters
    /// - `path`: Registry file; it is created on the first [`ConfigStore::load`].
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// The registry file as given, before any symlink is resolved.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the registry, creating an empty file when none exists yet.
    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "creating empty config");
            OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(false)
                .open(&self.path)
                .map_err(|e| Error::io(&self.path, e))?;
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| Error::io(&self.path, e))?;
        if content.trim().is_empty() {
            return Ok(Config::default());
        }

        let config: Config = serde_yaml::from_str(&content).map_err(|e| Error::ConfigParse {
            path: self.path.clone(),
            source: e,
        })?;
        debug!(
            path = %self.path.display(),
            devs = config.devs.len(),
            "loaded config"
        );
        Ok(config)
    }

    /// Replaces the file contents with `config`.
    ///
    /// The new contents go to a temp file next to the real registry that is
    /// renamed over it, so readers never see a half-written registry. When
    /// the path is a symlink the link is kept and its target is replaced.
    /// The target's permissions carry over to the new file.
    pub fn save(&self, config: &Config) -> Result<()> {
        let content = serde_yaml::to_string(config).map_err(Error::ConfigSerialize)?;

        let target = self.resolved_path()?;
        let temp_path = target.with_extension("tmp");
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(|e| Error::io(&temp_path, e))?;
            file.write_all(content.as_bytes())
                .map_err(|e| Error::io(&temp_path, e))?;
            file.sync_all().map_err(|e| Error::io(&temp_path, e))?;
        }

        match fs::metadata(&target) {
            Ok(meta) => fs::set_permissions(&temp_path, meta.permissions())
                .map_err(|e| Error::io(&temp_path, e))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(Error::io(&target, e)),
        }

        fs::rename(&temp_path, &target).map_err(|e| Error::io(&target, e))?;
        debug!(path = %target.display(), devs = config.devs.len(), "saved config");
        Ok(())
    }

    /// The file a save should replace: the path with symlinks resolved, or
    /// the path itself when nothing exists there yet.
    fn resolved_path(&self) -> Result<PathBuf> {
        match fs::canonicalize(&self.path) {
            Ok(path) => Ok(path),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(self.path.clone()),
            Err(e) => Err(Error::io(&self.path, e)),
        }
    }
}
