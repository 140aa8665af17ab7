//! On-device key-value storage: persisted session and cached document lists.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};

use crate::constants::{AUTH_TOKEN_KEY, REFRESH_TOKEN_KEY, STORAGE_DIR_NAME, USER_DATA_KEY};
use crate::error::StorageError;
use crate::models::{DocumentEntry, DocumentKind, User};

/// String key-value storage (the device's async-storage equivalent)
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// One file per key inside a directory
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    /// `~/.gojob`, or `./.gojob` when there is no home directory
    pub fn default_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(STORAGE_DIR_NAME)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    fn ensure_dir(&self) -> Result<(), StorageError> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.ensure_dir()?;
        fs::write(self.path(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process storage, shared by cloning the `Arc` (used to simulate restarts)
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.values
            .lock()
            .map_err(|_| StorageError::Backend("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Session as found in storage at startup
#[derive(Clone, Debug, PartialEq)]
pub struct PersistedSession {
    pub token: String,
    pub user: User,
    pub refresh_token: Option<String>,
}

/// Serializes the session to storage and reads it back once at startup
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        SessionStore { backend }
    }

    pub fn persist(
        &self,
        token: &str,
        user: &User,
        refresh_token: Option<&str>,
    ) -> Result<(), StorageError> {
        self.backend.set(AUTH_TOKEN_KEY, token)?;
        self.persist_user(user)?;
        // a new session never inherits the previous refresh token
        match refresh_token {
            Some(refresh) => self.backend.set(REFRESH_TOKEN_KEY, refresh),
            None => self.backend.remove(REFRESH_TOKEN_KEY),
        }
    }

    pub fn persist_user(&self, user: &User) -> Result<(), StorageError> {
        let json = serde_json::to_string(user)?;
        self.backend.set(USER_DATA_KEY, &json)
    }

    /// Rotation answers may omit the refresh token; the stored one is kept then
    pub fn persist_tokens(&self, token: &str, refresh_token: Option<&str>) -> Result<(), StorageError> {
        self.backend.set(AUTH_TOKEN_KEY, token)?;
        if let Some(refresh) = refresh_token {
            self.backend.set(REFRESH_TOKEN_KEY, refresh)?;
        }
        Ok(())
    }

    /// Reads the stored session. Token and user must both be present; an
    /// unreadable user blob or an expired token clears storage and yields `None`.
    pub fn restore(&self, now: DateTime<Utc>) -> Result<Option<PersistedSession>, StorageError> {
        let token = self.backend.get(AUTH_TOKEN_KEY)?;
        let user_json = self.backend.get(USER_DATA_KEY)?;
        let (token, user_json) = match (token, user_json) {
            (Some(token), Some(user_json)) if !token.is_empty() => (token, user_json),
            _ => return Ok(None),
        };

        let user: User = match serde_json::from_str(&user_json) {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, "Stored user is unreadable, dropping session");
                self.clear()?;
                return Ok(None);
            }
        };

        if let Some(expiry) = token_expiry(&token) {
            if expiry <= now {
                tracing::info!(%expiry, "Stored token has expired, dropping session");
                self.clear()?;
                return Ok(None);
            }
        }

        let refresh_token = self.backend.get(REFRESH_TOKEN_KEY)?;
        Ok(Some(PersistedSession { token, user, refresh_token }))
    }

    /// Removes every session key, even when one removal fails
    pub fn clear(&self) -> Result<(), StorageError> {
        let mut first_error = None;
        for key in [AUTH_TOKEN_KEY, USER_DATA_KEY, REFRESH_TOKEN_KEY] {
            if let Err(e) = self.backend.remove(key) {
                tracing::warn!(key, error = %e, "Failed to remove session key");
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// `exp` claim of a JWT, if the token is a JWT carrying one
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    let exp = claims.get("exp")?.as_i64()?;
    Utc.timestamp_opt(exp, 0).single()
}

/// Locally cached lists of uploaded documents
#[derive(Clone)]
pub struct DocumentCache {
    backend: Arc<dyn KeyValueStore>,
}

impl DocumentCache {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        DocumentCache { backend }
    }

    pub fn list(&self, kind: DocumentKind) -> Result<Vec<DocumentEntry>, StorageError> {
        match self.backend.get(kind.storage_key())? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    /// Adds an entry; its id is one past the highest numeric id in the list
    pub fn add(
        &self,
        kind: DocumentKind,
        name: impl Into<String>,
        uri: impl Into<String>,
    ) -> Result<DocumentEntry, StorageError> {
        let mut entries = self.list(kind)?;
        let next_id = entries
            .iter()
            .filter_map(|entry| entry.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        let entry = DocumentEntry {
            id: next_id.to_string(),
            name: name.into(),
            uri: uri.into(),
            added_at: Utc::now(),
        };
        entries.push(entry.clone());
        self.save(kind, &entries)?;
        Ok(entry)
    }

    pub fn remove(&self, kind: DocumentKind, id: &str) -> Result<Option<DocumentEntry>, StorageError> {
        let mut entries = self.list(kind)?;
        let Some(index) = entries.iter().position(|entry| entry.id == id) else {
            return Ok(None);
        };
        let removed = entries.remove(index);
        self.save(kind, &entries)?;
        Ok(Some(removed))
    }

    fn save(&self, kind: DocumentKind, entries: &[DocumentEntry]) -> Result<(), StorageError> {
        let json = serde_json::to_string(entries)?;
        self.backend.set(kind.storage_key(), &json)
    }
}
