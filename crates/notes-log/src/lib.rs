// ABOUTME: Shared logging setup for the notes binaries
// ABOUTME: Two functions: init() for stderr with a verbosity flag, init_file() for a log file

use std::fs::File;
use std::path::Path;

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Default level for a `-v` count: WARN, then INFO, then DEBUG.
pub fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    }
}

fn filter(verbosity: u8) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level_for(verbosity).into())
        .from_env_lossy()
}

/// Standard logging to stderr. RUST_LOG overrides the verbosity default.
pub fn init(verbosity: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(filter(verbosity))
        .with_writer(std::io::stderr)
        .init();
}

/// Logging appended to a file, without ANSI colors. Default: INFO level.
/// If setup fails, prints a warning to stderr and continues without logging.
pub fn init_file(path: &Path) {
    if let Err(e) = init_file_inner(path) {
        eprintln!("Warning: failed to set up file logging: {e}");
    }
}

fn init_file_inner(path: &Path) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let log_file = open_log(path)?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(filter(1))
        .with_ansi(false)
        .try_init()?;

    Ok(())
}

fn open_log(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exports_init() {
        let _ = super::init as fn(u8);
    }

    #[test]
    fn exports_init_file() {
        let _ = super::init_file as fn(&Path);
    }

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_for(0), Level::WARN);
        assert_eq!(level_for(1), Level::INFO);
        assert_eq!(level_for(2), Level::DEBUG);
        assert_eq!(level_for(9), Level::DEBUG);
    }

    // Only test in this binary that installs the global subscriber.
    #[test]
    fn init_file_writes_events_to_file() {
        let dir = tempfile::TempDir::new().expect("should create temp dir");
        let path = dir.path().join("notes.log");

        init_file_inner(&path).expect("should install file subscriber");
        tracing::warn!("file logging ready");

        let contents = std::fs::read_to_string(&path).expect("should read log file");
        assert!(contents.contains("file logging ready"));
        assert!(!contents.contains('\u{1b}'));
    }

    #[test]
    fn open_log_creates_parent_dirs() {
        let dir = tempfile::TempDir::new().expect("should create temp dir");
        let path = dir.path().join("logs").join("notes.log");

        open_log(&path).expect("should open log file");
        assert!(path.exists());
    }
}
