// ABOUTME: Token store holding the current session's tokens and cached profile
// ABOUTME: Durable JSON file store with atomic replace, plus an in-memory store

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};
use crate::models::{Profile, Session};

/// Get the notes config directory (~/.config/notes).
///
/// Uses `XDG_CONFIG_HOME` if set, otherwise falls back to `~/.config`.
pub fn config_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .map(|p| p.join("notes"))
}

/// Default location of the persisted session (~/.config/notes/session.json).
pub fn default_store_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("session.json"))
}

/// The single source of truth for the tokens attached to outgoing calls.
///
/// Implementations are shared by every client through an `Arc` and must
/// answer `get` synchronously. Writes replace the stored session as a whole.
pub trait TokenStore: Send + Sync {
    /// The current session, or `None` when either token is missing.
    fn get(&self) -> Option<Session>;

    /// Replace the stored session wholesale, profile included.
    fn set(&self, session: &Session) -> Result<()>;

    /// Remove tokens and profile together.
    fn clear(&self) -> Result<()>;

    /// The cached profile, readable independently of the tokens.
    fn profile(&self) -> Option<Profile>;

    /// Overwrite only the cached profile.
    fn set_profile(&self, profile: &Profile) -> Result<()>;

    fn access_token(&self) -> Option<String> {
        self.get().map(|s| s.access_token)
    }

    fn refresh_token(&self) -> Option<String> {
        self.get().map(|s| s.refresh_token)
    }
}

/// On-disk document: the three persisted keys, each optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<Profile>,
}

impl StoredSession {
    fn from_session(session: &Session) -> Self {
        Self {
            access_token: Some(session.access_token.clone()),
            refresh_token: Some(session.refresh_token.clone()),
            user: Some(session.profile.clone()),
        }
    }

    fn session(&self) -> Option<Session> {
        match (&self.access_token, &self.refresh_token) {
            (Some(access), Some(refresh)) => Some(Session {
                access_token: access.clone(),
                refresh_token: refresh.clone(),
                profile: self.user.clone().unwrap_or_default(),
            }),
            _ => None,
        }
    }

    fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.user.is_none()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Session persisted as a JSON document on disk, surviving restarts.
///
/// Every write goes to a temp file in the same directory which then replaces
/// the document, so a reader never sees a half-written session.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    // Serializes read-modify-write cycles from this process.
    guard: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> StoredSession {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return StoredSession::default(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read session file");
                return StoredSession::default();
            }
        };

        serde_json::from_str(&data).unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "ignoring corrupt session file");
            StoredSession::default()
        })
    }

    fn write(&self, stored: &StoredSession) -> Result<()> {
        if stored.is_empty() {
            return self.remove();
        }

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;

        let data = serde_json::to_vec_pretty(stored)
            .map_err(|e| SessionError::Storage(format!("failed to serialize session: {e}")))?;

        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(&data)?;
        file.as_file().sync_all()?;

        // Restrict to the owner (0600 = rw-------)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o600))?;
        }

        file.persist(&self.path)
            .map_err(|e| SessionError::Storage(format!("failed to replace session file: {e}")))?;
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<Session> {
        let _guard = lock(&self.guard);
        self.read().session()
    }

    fn set(&self, session: &Session) -> Result<()> {
        let _guard = lock(&self.guard);
        self.write(&StoredSession::from_session(session))
    }

    fn clear(&self) -> Result<()> {
        let _guard = lock(&self.guard);
        self.remove()
    }

    fn profile(&self) -> Option<Profile> {
        let _guard = lock(&self.guard);
        self.read().user
    }

    fn set_profile(&self, profile: &Profile) -> Result<()> {
        let _guard = lock(&self.guard);
        let mut stored = self.read();
        stored.user = Some(profile.clone());
        self.write(&stored)
    }
}

/// Process-local store, used by tests and by embedders with their own persistence.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    inner: Mutex<StoredSession>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: &Session) -> Self {
        Self {
            inner: Mutex::new(StoredSession::from_session(session)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<Session> {
        lock(&self.inner).session()
    }

    fn set(&self, session: &Session) -> Result<()> {
        *lock(&self.inner) = StoredSession::from_session(session);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *lock(&self.inner) = StoredSession::default();
        Ok(())
    }

    fn profile(&self) -> Option<Profile> {
        lock(&self.inner).user.clone()
    }

    fn set_profile(&self, profile: &Profile) -> Result<()> {
        lock(&self.inner).user = Some(profile.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn session(access: &str) -> Session {
        Session {
            access_token: access.to_string(),
            refresh_token: "refresh-1".to_string(),
            profile: Profile {
                username: "ada".to_string(),
                email: "ada@example.com".to_string(),
                roles: ["USER".to_string()].into_iter().collect(),
            },
        }
    }

    #[test]
    fn test_memory_set_get_clear() {
        let store = MemoryTokenStore::new();
        assert!(store.get().is_none());

        store.set(&session("a1")).unwrap();
        assert_eq!(store.get(), Some(session("a1")));
        assert_eq!(store.access_token().as_deref(), Some("a1"));
        assert_eq!(store.refresh_token().as_deref(), Some("refresh-1"));

        store.clear().unwrap();
        assert!(store.get().is_none());
        assert!(store.profile().is_none());
    }

    #[test]
    fn test_file_round_trip_across_instances() {
        let temp_dir = TempDir::new().expect("should create temp dir");
        let path = temp_dir.path().join("nested").join("session.json");

        FileTokenStore::new(&path).set(&session("a1")).unwrap();

        // A fresh instance models a reload
        let reopened = FileTokenStore::new(&path);
        assert_eq!(reopened.get(), Some(session("a1")));

        reopened.clear().unwrap();
        assert!(reopened.get().is_none());
        assert!(!path.exists(), "clear should remove the session file");
    }

    #[test]
    fn test_file_uses_persisted_key_names() {
        let temp_dir = TempDir::new().expect("should create temp dir");
        let path = temp_dir.path().join("session.json");
        FileTokenStore::new(&path).set(&session("a1")).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["accessToken"], "a1");
        assert_eq!(raw["refreshToken"], "refresh-1");
        assert_eq!(raw["user"]["username"], "ada");
    }

    #[test]
    fn test_profile_survives_without_tokens() {
        let temp_dir = TempDir::new().expect("should create temp dir");
        let store = FileTokenStore::new(temp_dir.path().join("session.json"));

        let profile = session("a1").profile;
        store.set_profile(&profile).unwrap();

        assert!(store.get().is_none());
        assert_eq!(store.profile(), Some(profile));
    }

    #[test]
    fn test_corrupt_file_reads_as_absent() {
        let temp_dir = TempDir::new().expect("should create temp dir");
        let path = temp_dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileTokenStore::new(&path);
        assert!(store.get().is_none());

        store.set(&session("a2")).unwrap();
        assert_eq!(store.access_token().as_deref(), Some("a2"));
    }

    #[test]
    fn test_set_overwrites_wholesale() {
        let store = MemoryTokenStore::with_session(&session("a1"));
        let mut next = session("a2");
        next.profile.roles.clear();

        store.set(&next).unwrap();
        assert_eq!(store.get(), Some(next));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_permissions_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().expect("should create temp dir");
        let path = temp_dir.path().join("session.json");
        FileTokenStore::new(&path).set(&session("a1")).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
