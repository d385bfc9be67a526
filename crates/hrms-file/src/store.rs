//! Credential persistence in a single JSON file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use hrms_core::error::{Error, StorageError};
use hrms_core::{AccessToken, CredentialPair, CredentialStore, RefreshToken, Result};

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

/// On-disk layout of the credentials file.
#[derive(Debug, Serialize, Deserialize)]
struct StoredCredentials {
    access_token: Option<String>,
    refresh_token: Option<String>,
    saved_at: DateTime<Utc>,
}

impl StoredCredentials {
    fn into_pair(self) -> CredentialPair {
        CredentialPair::new(
            self.access_token.map(AccessToken::new),
            self.refresh_token.map(RefreshToken::new),
        )
    }
}

/// A [`CredentialStore`] that survives process restarts.
///
/// Tokens live in one JSON file, readable only by the owner on Unix. Every
/// read and write holds an advisory lock on a sibling `.lock` file, so
/// several processes can share one credentials file.
///
/// A missing file is the cleared state, and [`clear`](CredentialStore::clear)
/// removes the file.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Create a store backed by the file at `path`. Nothing is touched on
    /// disk until the first write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// When the credentials were last written, if they exist.
    pub fn saved_at(&self) -> Result<Option<DateTime<Utc>>> {
        let _lock = self.lock(false)?;
        Ok(self.read_unlocked()?.map(|stored| stored.saved_at))
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    fn io_error(&self, err: io::Error) -> Error {
        Error::Storage(StorageError::Io {
            location: self.path.display().to_string(),
            message: err.to_string(),
        })
    }

    /// Take the advisory lock. Released when the returned file is dropped.
    fn lock(&self, exclusive: bool) -> Result<File> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }

        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())
            .map_err(|e| self.io_error(e))?;

        let locked = if exclusive {
            FileExt::lock_exclusive(&lock_file)
        } else {
            FileExt::lock_shared(&lock_file)
        };
        locked.map_err(|e| self.io_error(e))?;

        Ok(lock_file)
    }

    fn read_unlocked(&self) -> Result<Option<StoredCredentials>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        let stored = serde_json::from_str(&content).map_err(|e| {
            Error::Storage(StorageError::Corrupt {
                location: self.path.display().to_string(),
                message: e.to_string(),
            })
        })?;

        Ok(Some(stored))
    }

    fn write_unlocked(&self, pair: &CredentialPair) -> Result<()> {
        let stored = StoredCredentials {
            access_token: pair.access.as_ref().map(|t| t.as_str().to_string()),
            refresh_token: pair.refresh.as_ref().map(|t| t.as_str().to_string()),
            saved_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&stored).map_err(|e| {
            Error::Storage(StorageError::Corrupt {
                location: self.path.display().to_string(),
                message: e.to_string(),
            })
        })?;

        // Written beside the target and renamed over it, so a reader never
        // sees half a file.
        let temp_path = self.path.with_extension("tmp");
        let mut options = OpenOptions::new();
        options.create(true).write(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&temp_path).map_err(|e| self.io_error(e))?;
        file.write_all(json.as_bytes())
            .map_err(|e| self.io_error(e))?;
        file.sync_data().map_err(|e| self.io_error(e))?;
        fs::rename(&temp_path, &self.path).map_err(|e| self.io_error(e))?;

        debug!(path = %self.path.display(), "saved credentials");
        Ok(())
    }

    /// Read, modify, and write back under one exclusive lock.
    fn update(&self, change: impl FnOnce(&mut CredentialPair)) -> Result<()> {
        let _lock = self.lock(true)?;
        let mut pair = self
            .read_unlocked()?
            .map(StoredCredentials::into_pair)
            .unwrap_or_default();
        change(&mut pair);
        self.write_unlocked(&pair)
    }

    fn read_pair(&self) -> Result<CredentialPair> {
        if !self.path.exists() {
            return Ok(CredentialPair::default());
        }
        let _lock = self.lock(false)?;
        Ok(self
            .read_unlocked()?
            .map(StoredCredentials::into_pair)
            .unwrap_or_default())
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn access_token(&self) -> Result<Option<AccessToken>> {
        Ok(self.read_pair()?.access)
    }

    async fn refresh_token(&self) -> Result<Option<RefreshToken>> {
        Ok(self.read_pair()?.refresh)
    }

    async fn set_access_token(&self, token: AccessToken) -> Result<()> {
        self.update(|pair| pair.access = Some(token))
    }

    async fn set_refresh_token(&self, token: RefreshToken) -> Result<()> {
        self.update(|pair| pair.refresh = Some(token))
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn clear(&self) -> Result<()> {
        let _lock = self.lock(true)?;
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("removed credentials file");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    async fn load(&self) -> Result<CredentialPair> {
        self.read_pair()
    }

    async fn store(&self, pair: CredentialPair) -> Result<()> {
        self.update(|current| {
            if let Some(refresh) = pair.refresh {
                current.refresh = Some(refresh);
            }
            if let Some(access) = pair.access {
                current.access = Some(access);
            }
        })
    }

    async fn replace(&self, pair: CredentialPair) -> Result<()> {
        self.update(|current| *current = pair)
    }
}
