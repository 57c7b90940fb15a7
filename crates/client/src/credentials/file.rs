//! File-backed token storage.
//!
//! Tokens are stored in `<data dir>/tiffin/tokens.json` with 0600
//! permissions (owner read/write only). Writes go through a temp file and
//! an atomic rename so a crash cannot leave a half-written token file.

use std::path::PathBuf;

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use super::{CredentialError, CredentialStore, TokenPair};

/// On-disk token format with a version for future migrations.
#[derive(Debug, Serialize, Deserialize)]
struct StoredTokens {
    /// Schema version.
    version: u32,
    access_token: String,
    refresh_token: String,
}

/// Credential store persisting to a JSON file in the platform data dir.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Current storage schema version.
    const VERSION: u32 = 1;

    /// Create a store at the default platform location.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::NoStorageDir` if no data directory can be
    /// determined, or an I/O error if it cannot be created.
    pub fn new() -> Result<Self, CredentialError> {
        let data_dir = dirs::data_local_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
            .ok_or(CredentialError::NoStorageDir)?;

        let dir = data_dir.join("tiffin");
        std::fs::create_dir_all(&dir)?;

        Ok(Self {
            path: dir.join("tokens.json"),
        })
    }

    /// Create a store at an explicit path (tests, custom layouts).
    #[must_use]
    pub fn at_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// The token file path.
    #[must_use]
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<TokenPair>, CredentialError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let stored: StoredTokens = serde_json::from_str(&content)?;
        Ok(Some(TokenPair::new(
            &stored.access_token,
            &stored.refresh_token,
        )))
    }

    fn store(&self, pair: &TokenPair) -> Result<(), CredentialError> {
        let stored = StoredTokens {
            version: Self::VERSION,
            access_token: pair.access.expose_secret().to_owned(),
            refresh_token: pair.refresh.expose_secret().to_owned(),
        };
        let content = serde_json::to_string_pretty(&stored)?;

        // Write to a temp file first, then rename (atomic)
        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, &content)?;

        // 0600 = owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&temp_path, perms)?;
        }

        std::fs::rename(&temp_path, &self.path)?;

        tracing::debug!(path = %self.path.display(), "saved tokens");
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "cleared tokens");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
