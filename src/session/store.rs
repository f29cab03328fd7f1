use fd_lock::RwLock;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::api::ApiError;
use crate::models::User;

/// Key the logged-in user is stored under.
pub const SESSION_KEY: &str = "safetyos_user";

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default)]
    safetyos_user: Option<User>,
}

/// Persists the logged-in user between invocations. No tokens, no expiry.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    /// Stored user, or `None` when logged out. A file that cannot be parsed
    /// is removed and treated as logged out.
    pub fn load(&self) -> Result<Option<User>, ApiError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ApiError::Session(format!("cannot read {}: {e}", self.path.display()))),
        };

        match serde_json::from_str::<SessionFile>(&text) {
            Ok(file) => Ok(file.safetyos_user),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Discarding corrupt session file");
                fs::remove_file(&self.path).ok();
                Ok(None)
            }
        }
    }

    pub fn save(&self, user: &User) -> Result<(), ApiError> {
        let body = serde_json::to_string_pretty(&SessionFile {
            safetyos_user: Some(user.clone()),
        })
        .map_err(|e| ApiError::Session(e.to_string()))?;

        self.with_write_lock(|path| fs::write(path, &body))?;
        debug!(user_id = %user.id, path = %self.path.display(), "Session saved");
        Ok(())
    }

    pub fn clear(&self) -> Result<(), ApiError> {
        self.with_write_lock(|path| match fs::remove_file(path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        })
    }

    /// Run `f` while holding an exclusive lock beside the session file, so
    /// two invocations never interleave writes.
    fn with_write_lock(&self, f: impl FnOnce(&Path) -> std::io::Result<()>) -> Result<(), ApiError> {
        let to_session_error = |e: std::io::Error| ApiError::Session(format!("{}: {e}", self.path.display()));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(to_session_error)?;
        }
        let lock_file: File = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())
            .map_err(to_session_error)?;
        let mut lock = RwLock::new(lock_file);
        let _guard = lock
            .try_write()
            .map_err(|_| ApiError::Session("another safetyos process is updating the session".into()))?;

        f(&self.path).map_err(to_session_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use tempfile::TempDir;

    fn user() -> User {
        User {
            id: "u-42".into(),
            full_name: "Nattapong S.".into(),
            department: Some("Operations".into()),
            role: Role::AreaOwner,
        }
    }

    #[test]
    fn missing_file_means_logged_out() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn save_load_clear() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().join("nested/session.json"));

        store.save(&user()).unwrap();
        assert_eq!(store.load().unwrap(), Some(user()));

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw[SESSION_KEY]["role"], "AREA_OWNER");

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();
    }

    #[test]
    fn corrupt_file_is_removed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let store = SessionStore::new(&path);
        assert_eq!(store.load().unwrap(), None);
        assert!(!path.exists());
    }

    #[test]
    fn held_lock_blocks_writers() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        store.save(&user()).unwrap();

        let mut held = RwLock::new(File::create(store.lock_path()).unwrap());
        let _guard = held.try_write().unwrap();

        let err = store.save(&user()).unwrap_err();
        assert!(matches!(err, ApiError::Session(_)));
    }
}
