//! Credential persistence.
//!
//! The session hands a newly issued [`ClientKey`] to a [`CredentialStore`]
//! and asks it for a previously stored key before registering. The store
//! decides format and location.
//!
//! | Store | Backing |
//! |-------|---------|
//! | [`MemoryCredentialStore`] | Process memory; records every persist call |
//! | [`EnvFileCredentialStore`] | `CLIENT_KEY="..."` line in a `.env` file |

// ============================================================================
// Imports
// ============================================================================

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::identifiers::ClientKey;

// ============================================================================
// Constants
// ============================================================================

/// Variable holding the key in `.env` files.
pub const DEFAULT_ENV_VAR: &str = "CLIENT_KEY";

/// File name searched by [`EnvFileCredentialStore::discover`].
const ENV_FILE_NAME: &str = ".env";

// ============================================================================
// CredentialStore
// ============================================================================

/// Persistence boundary for the TV-issued credential.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns the stored key, if any.
    async fn load(&self) -> Result<Option<ClientKey>> {
        Ok(None)
    }

    /// Persists a newly issued key.
    async fn persist(&self, key: &ClientKey) -> Result<()>;
}

// ============================================================================
// MemoryCredentialStore
// ============================================================================

/// In-memory store.
///
/// Keeps the latest key and a log of every [`persist`](CredentialStore::persist)
/// call.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    current: Mutex<Option<ClientKey>>,
    persisted: Mutex<Vec<ClientKey>>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `key`.
    #[must_use]
    pub fn with_key(key: impl Into<ClientKey>) -> Self {
        Self {
            current: Mutex::new(Some(key.into())),
            persisted: Mutex::new(Vec::new()),
        }
    }

    /// Returns the current key.
    #[must_use]
    pub fn current(&self) -> Option<ClientKey> {
        self.current.lock().clone()
    }

    /// Returns every key passed to `persist`, oldest first.
    #[must_use]
    pub fn persisted(&self) -> Vec<ClientKey> {
        self.persisted.lock().clone()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Result<Option<ClientKey>> {
        Ok(self.current())
    }

    async fn persist(&self, key: &ClientKey) -> Result<()> {
        *self.current.lock() = Some(key.clone());
        self.persisted.lock().push(key.clone());
        Ok(())
    }
}

// ============================================================================
// EnvFileCredentialStore
// ============================================================================

/// Store backed by a `KEY="value"` line in a dotenv file.
///
/// Other lines of the file are preserved. Writes go through a temporary
/// file in the same directory and are renamed into place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvFileCredentialStore {
    path: PathBuf,
    variable: String,
}

impl EnvFileCredentialStore {
    /// Creates a store for an explicit file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            variable: DEFAULT_ENV_VAR.to_string(),
        }
    }

    /// Finds `.env` in the working directory or its parents.
    ///
    /// Falls back to `.env` in the working directory; the file is created on
    /// first persist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the working directory is unavailable.
    pub fn discover() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let path = find_upwards(&cwd, ENV_FILE_NAME).unwrap_or_else(|| cwd.join(ENV_FILE_NAME));
        debug!(path = %path.display(), "Using env file credential store");
        Ok(Self::new(path))
    }

    /// Uses a variable name other than `CLIENT_KEY`.
    #[must_use]
    pub fn with_variable(mut self, variable: impl Into<String>) -> Self {
        self.variable = variable.into();
        self
    }

    /// Returns the file path.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the variable name.
    #[inline]
    #[must_use]
    pub fn variable(&self) -> &str {
        &self.variable
    }
}

#[async_trait]
impl CredentialStore for EnvFileCredentialStore {
    async fn load(&self) -> Result<Option<ClientKey>> {
        let path = self.path.clone();
        let variable = self.variable.clone();

        let value = tokio::task::spawn_blocking(move || read_env_value(&path, &variable))
            .await
            .map_err(|e| Error::credential_store(format!("load task failed: {e}")))??;

        Ok(value.filter(|value| !value.is_empty()).map(ClientKey::new))
    }

    async fn persist(&self, key: &ClientKey) -> Result<()> {
        let path = self.path.clone();
        let variable = self.variable.clone();
        let value = key.as_str().to_string();

        tokio::task::spawn_blocking(move || write_env_value(&path, &variable, &value))
            .await
            .map_err(|e| Error::credential_store(format!("persist task failed: {e}")))??;

        info!(path = %self.path.display(), key = %key.redacted(), "Client key saved");
        Ok(())
    }
}

// ============================================================================
// Dotenv Helpers
// ============================================================================

/// Walks from `start` up to the filesystem root looking for `name`.
fn find_upwards(start: &Path, name: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Returns the last value assigned to `variable`; a missing file is `None`.
///
/// Lines dotenvy cannot parse are skipped.
fn read_env_value(path: &Path, variable: &str) -> Result<Option<String>> {
    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(e) if e.not_found() => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut found = None;
    for entry in entries {
        match entry {
            Ok((key, value)) if key == variable => found = Some(value),
            Ok(_) => {}
            Err(e @ dotenvy::Error::LineParse(..)) => {
                warn!(path = %path.display(), error = %e, "Skipping unparsable dotenv line");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(found)
}

/// Splits a dotenv line into the key it assigns.
fn assigned_key(line: &str) -> Option<&str> {
    let line = line.trim_start();
    if line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").unwrap_or(line);
    let (key, _) = line.split_once('=')?;
    Some(key.trim())
}

/// Double-quotes `value` with the escapes dotenvy understands.
fn quote(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('$', "\\$");
    format!("\"{escaped}\"")
}

/// Replaces the assignment of `variable` in `content`, or appends one.
fn upsert_env_value(content: &str, variable: &str, value: &str) -> String {
    let assignment = format!("{variable}={}", quote(value));
    let mut replaced = false;

    let mut lines: Vec<String> = content
        .lines()
        .map(|line| match assigned_key(line) {
            Some(key) if key == variable => {
                replaced = true;
                assignment.clone()
            }
            _ => line.to_string(),
        })
        .collect();

    if !replaced {
        lines.push(assignment);
    }

    let mut updated = lines.join("\n");
    updated.push('\n');
    updated
}

/// Rewrites the file atomically with the new assignment.
fn write_env_value(path: &Path, variable: &str, value: &str) -> Result<()> {
    let existing = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };

    let updated = upsert_env_value(&existing, variable, value);

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut file = NamedTempFile::new_in(&dir)?;
    file.write_all(updated.as_bytes())?;
    file.flush()?;
    file.persist(path)
        .map_err(|e| Error::credential_store(format!("{}: {}", path.display(), e.error)))?;

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
