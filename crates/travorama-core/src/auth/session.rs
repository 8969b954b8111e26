//! Durable "logged in" flag.
//!
//! Stored in `<base>/session.json` with restricted permissions (0600).

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::paths;

/// Persistence for the logged-in flag.
pub trait SessionStore: Send + Sync {
    /// Records whether a user is logged in.
    ///
    /// # Errors
    /// Returns an error if the flag cannot be persisted.
    fn set_logged_in(&self, logged_in: bool) -> Result<()>;

    /// Reads the flag. A store that was never written reads as logged out.
    ///
    /// # Errors
    /// Returns an error if the stored flag cannot be read.
    fn is_logged_in(&self) -> Result<bool>;
}

/// On-disk session record.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SessionFile {
    #[serde(default)]
    pub is_logged_in: bool,
    /// Stable per-install identifier used for push registration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

/// File-backed [`SessionStore`].
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store at the default location under `TRAVORAMA_HOME`.
    pub fn open_default() -> Self {
        Self::new(paths::session_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the session file. Returns an empty record if it doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<SessionFile> {
        if !self.path.exists() {
            return Ok(SessionFile::default());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session from {}", self.path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse session from {}", self.path.display()))
    }

    /// Returns the device id, creating and persisting one on first use.
    ///
    /// # Errors
    /// Returns an error if the session file cannot be read or written.
    pub fn device_id(&self) -> Result<String> {
        let _guard = self.lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut session = self.load()?;
        if let Some(id) = &session.device_id {
            return Ok(id.clone());
        }
        let id = uuid::Uuid::new_v4().to_string();
        session.device_id = Some(id.clone());
        self.save(&session)?;
        Ok(id)
    }

    fn save(&self, session: &SessionFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents =
            serde_json::to_string_pretty(session).context("Failed to serialize session")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .with_context(|| format!("Failed to open {} for writing", self.path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        #[cfg(not(unix))]
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&self.path)
                .with_context(|| format!("Failed to open {} for writing", self.path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn set_logged_in(&self, logged_in: bool) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut session = self.load()?;
        session.is_logged_in = logged_in;
        self.save(&session)
    }

    fn is_logged_in(&self) -> Result<bool> {
        Ok(self.load()?.is_logged_in)
    }
}
