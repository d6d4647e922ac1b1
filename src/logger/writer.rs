//! Log file output

use std::fs::{File, OpenOptions};
use std::io;
use std::sync::Mutex;

use crate::logger::config::FileConfig;

/// Opens the configured log file, creating parent directories as needed.
///
/// The returned mutex is a `MakeWriter` for `tracing_subscriber::fmt`.
pub(crate) fn open_log_file(config: &FileConfig) -> io::Result<Mutex<File>> {
    if let Some(parent) = config.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut options = OpenOptions::new();
    options.create(true);
    if config.append {
        options.append(true);
    } else {
        options.write(true).truncate(true);
    }

    options.open(&config.path).map(Mutex::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn config(dir: &TempDir, append: bool) -> FileConfig {
        FileConfig {
            enabled: true,
            path: dir.path().join("nested/logs/jobhub.log"),
            append,
            ..Default::default()
        }
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, true);

        open_log_file(&config).unwrap();
        assert!(config.path.exists());
    }

    #[test]
    fn test_append_keeps_existing_lines() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, true);

        writeln!(open_log_file(&config).unwrap().lock().unwrap(), "first").unwrap();
        writeln!(open_log_file(&config).unwrap().lock().unwrap(), "second").unwrap();

        let content = std::fs::read_to_string(&config.path).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }

    #[test]
    fn test_truncate_when_not_appending() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, false);

        writeln!(open_log_file(&config).unwrap().lock().unwrap(), "old").unwrap();
        writeln!(open_log_file(&config).unwrap().lock().unwrap(), "new").unwrap();

        let content = std::fs::read_to_string(&config.path).unwrap();
        assert_eq!(content, "new\n");
    }
}
