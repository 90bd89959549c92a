// ABOUTME: Configuration for the session layer: service base URLs, timeouts, store path
// ABOUTME: Resolved from explicit overrides, environment, a TOML file, then defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::{Result, SessionError};
use crate::store;

pub const DEFAULT_AUTH_URL: &str = "http://localhost:8082/api";
pub const DEFAULT_NOTES_URL: &str = "http://localhost:8081/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub const ENV_AUTH_URL: &str = "NOTES_AUTH_API_URL";
pub const ENV_NOTES_URL: &str = "NOTES_API_URL";
pub const ENV_SESSION_FILE: &str = "NOTES_SESSION_FILE";
pub const ENV_TIMEOUT_SECS: &str = "NOTES_HTTP_TIMEOUT_SECS";

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub auth_url: Url,
    pub notes_url: Url,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Durable token store location; `None` means keep the session in memory.
    pub store_path: Option<PathBuf>,
}

impl SessionConfig {
    pub fn new(auth_url: &str, notes_url: &str) -> Result<Self> {
        Ok(Self {
            auth_url: parse_base_url(auth_url)?,
            notes_url: parse_base_url(notes_url)?,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            store_path: store::default_store_path(),
        })
    }

    pub fn with_store_path(mut self, path: Option<PathBuf>) -> Self {
        self.store_path = path;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Path of the optional config file (~/.config/notes/config.toml).
    pub fn config_path() -> Option<PathBuf> {
        store::config_dir().map(|d| d.join("config.toml"))
    }
}

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub auth_url: Option<String>,
    #[serde(default)]
    pub notes_url: Option<String>,
    #[serde(default)]
    pub store_path: Option<PathBuf>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Load a config file; a missing file yields the empty config.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(SessionError::Config(format!(
                    "failed to read config from {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        toml::from_str(&contents).map_err(|e| {
            SessionError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }
}

/// Explicit values that win over everything else (e.g. CLI flags).
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub auth_url: Option<String>,
    pub notes_url: Option<String>,
    pub store_path: Option<PathBuf>,
}

/// Resolve configuration: overrides > environment > config file > defaults.
pub fn resolve(overrides: Overrides, file: FileConfig) -> Result<SessionConfig> {
    resolve_with(overrides, file, |key| std::env::var(key).ok())
}

/// `resolve` with an injectable environment lookup.
pub fn resolve_with(
    overrides: Overrides,
    file: FileConfig,
    env: impl Fn(&str) -> Option<String>,
) -> Result<SessionConfig> {
    let auth_url = overrides
        .auth_url
        .or_else(|| env(ENV_AUTH_URL))
        .or(file.auth_url)
        .unwrap_or_else(|| DEFAULT_AUTH_URL.to_string());

    let notes_url = overrides
        .notes_url
        .or_else(|| env(ENV_NOTES_URL))
        .or(file.notes_url)
        .unwrap_or_else(|| DEFAULT_NOTES_URL.to_string());

    let store_path = overrides
        .store_path
        .or_else(|| env(ENV_SESSION_FILE).map(PathBuf::from))
        .or(file.store_path)
        .or_else(store::default_store_path);

    let timeout = match env(ENV_TIMEOUT_SECS) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| SessionError::Config(format!("{ENV_TIMEOUT_SECS} must be a number of seconds")))?,
        None => file
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT),
    };

    Ok(SessionConfig::new(&auth_url, &notes_url)?
        .with_store_path(store_path)
        .with_timeout(timeout))
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| SessionError::Config(format!("invalid base url {raw:?}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(SessionError::Config(format!(
            "unsupported scheme {other:?} in {raw:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = resolve_with(Overrides::default(), FileConfig::default(), env_of(&[])).unwrap();
        assert_eq!(config.auth_url.as_str(), "http://localhost:8082/api");
        assert_eq!(config.notes_url.as_str(), "http://localhost:8081/api");
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
    }

    #[test]
    fn test_precedence() {
        let file = FileConfig {
            auth_url: Some("http://file-auth/api".into()),
            notes_url: Some("http://file-notes/api".into()),
            store_path: Some("/tmp/file-session.json".into()),
            timeout_secs: Some(5),
        };
        let env = env_of(&[(ENV_NOTES_URL, "http://env-notes/api")]);
        let overrides = Overrides {
            auth_url: Some("http://flag-auth/api".into()),
            ..Default::default()
        };

        let config = resolve_with(overrides, file, env).unwrap();
        assert_eq!(config.auth_url.as_str(), "http://flag-auth/api");
        assert_eq!(config.notes_url.as_str(), "http://env-notes/api");
        assert_eq!(config.store_path, Some(PathBuf::from("/tmp/file-session.json")));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let env = env_of(&[(ENV_AUTH_URL, "not a url")]);
        let err = resolve_with(Overrides::default(), FileConfig::default(), env).unwrap_err();
        assert!(matches!(err, SessionError::Config(_)));

        let env = env_of(&[(ENV_NOTES_URL, "ftp://notes")]);
        let err = resolve_with(Overrides::default(), FileConfig::default(), env).unwrap_err();
        assert!(matches!(err, SessionError::Config(msg) if msg.contains("scheme")));

        let env = env_of(&[(ENV_TIMEOUT_SECS, "soon")]);
        assert!(resolve_with(Overrides::default(), FileConfig::default(), env).is_err());
    }

    #[test]
    fn test_file_config_loading() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            br#"
auth_url = "https://auth.example.com/api"
timeout_secs = 12
"#,
        )
        .unwrap();

        let config = FileConfig::load(file.path()).unwrap();
        assert_eq!(config.auth_url.as_deref(), Some("https://auth.example.com/api"));
        assert!(config.notes_url.is_none());
        assert_eq!(config.timeout_secs, Some(12));
    }

    #[test]
    fn test_missing_file_is_empty_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = FileConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"auth_url = [").unwrap();
        assert!(matches!(FileConfig::load(file.path()), Err(SessionError::Config(_))));
    }
}
