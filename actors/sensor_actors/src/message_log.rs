//! Message logger: records every bus message to a size-rotated file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use sensor_actor::{Actor, TickContext};
use sensor_net::InboundMessage;
use tracing::{info, warn};

/// Name of the active log file inside the log directory.
pub const LOG_FILE_NAME: &str = "messages.log";

/// Default size at which the log rotates.
pub const DEFAULT_MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Default number of rotated files kept.
pub const DEFAULT_BACKUP_COUNT: usize = 5;

/// An append-only file that rotates once it would exceed `max_bytes`.
///
/// Rotation shifts `path.1 .. path.N-1` up by one, drops `path.N`, and
/// moves the active file to `path.1`. With zero backups the active file is
/// truncated instead.
#[derive(Debug)]
pub struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    backups: usize,
    file: File,
    written: u64,
}

impl RotatingFile {
    /// Open (or create) `path` for appending.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn open(path: impl Into<PathBuf>, max_bytes: u64, backups: usize) -> io::Result<Self> {
        let path = path.into();
        let file = open_append(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            path,
            max_bytes,
            backups,
            file,
            written,
        })
    }

    /// The active file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of backup number `index` (1 is the most recent).
    #[must_use]
    pub fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }

    /// Append `line` plus a newline, rotating first if needed.
    ///
    /// A zero `max_bytes` never rotates.
    ///
    /// # Errors
    ///
    /// Returns an error if rotating or writing fails.
    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        let len = line.len() as u64 + 1;
        if self.max_bytes > 0 && self.written > 0 && self.written + len > self.max_bytes {
            self.rotate()?;
        }
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        self.file.flush()?;
        self.written += len;
        Ok(())
    }

    fn rotate(&mut self) -> io::Result<()> {
        if self.backups == 0 {
            self.file.set_len(0)?;
            self.written = 0;
            return Ok(());
        }

        let oldest = self.backup_path(self.backups);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for index in (1..self.backups).rev() {
            let from = self.backup_path(index);
            if from.exists() {
                fs::rename(&from, self.backup_path(index + 1))?;
            }
        }
        fs::rename(&self.path, self.backup_path(1))?;

        self.file = open_append(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Render a payload for the log: JSON is pretty-printed, anything else is
/// logged as trimmed text.
#[must_use]
pub fn render_payload(payload: &[u8]) -> String {
    let text = String::from_utf8_lossy(payload);
    let text = text.trim();
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| text.to_string()),
        Err(_) => text.to_string(),
    }
}

/// Writes every data message to a [`RotatingFile`] and the console.
#[derive(Debug)]
pub struct LoggerActor {
    file: RotatingFile,
    logged: u64,
}

impl LoggerActor {
    /// Log into `dir/messages.log`, creating `dir` if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be created.
    pub fn open(dir: impl AsRef<Path>, max_bytes: u64, backups: usize) -> io::Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let file = RotatingFile::open(dir.join(LOG_FILE_NAME), max_bytes, backups)?;
        info!(path = %file.path().display(), max_bytes, backups, "logging messages to file");
        Ok(Self { file, logged: 0 })
    }

    /// Number of messages written so far.
    #[must_use]
    pub fn logged(&self) -> u64 {
        self.logged
    }
}

impl Actor for LoggerActor {
    fn on_message(&mut self, message: &InboundMessage) {
        let rendered = format!("Topic: {}, Payload: {}", message.topic, render_payload(&message.payload));
        info!("{rendered}");

        let line = format!(
            "{} - message_logger - INFO - {rendered}",
            Local::now().format("%Y-%m-%d %H:%M:%S,%3f")
        );
        match self.file.write_line(&line) {
            Ok(()) => self.logged += 1,
            Err(e) => warn!(path = %self.file.path().display(), error = %e, "failed to write log file"),
        }
    }

    fn on_tick(&mut self, _ctx: &mut TickContext) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_render_payload() {
        assert_eq!(render_payload(b" 20.00 "), "20.0");
        assert_eq!(render_payload(b"hello world"), "hello world");
        assert_eq!(
            render_payload(br#"{"temperature":20.0}"#),
            "{\n  \"temperature\": 20.0\n}"
        );
    }

    #[test]
    fn test_rotation_keeps_backups() {
        let dir = TempDir::new().unwrap();
        let mut file = RotatingFile::open(dir.path().join("m.log"), 8, 2).unwrap();

        for line in ["aaaa", "bbbb", "cccc", "dddd"] {
            file.write_line(line).unwrap();
        }

        assert_eq!(read(file.path()), "dddd\n");
        assert_eq!(read(&file.backup_path(1)), "cccc\n");
        assert_eq!(read(&file.backup_path(2)), "bbbb\n");
        assert!(!file.backup_path(3).exists());
    }

    #[test]
    fn test_rotation_without_backups_truncates() {
        let dir = TempDir::new().unwrap();
        let mut file = RotatingFile::open(dir.path().join("m.log"), 8, 0).unwrap();

        file.write_line("aaaa").unwrap();
        file.write_line("bbbb").unwrap();
        file.write_line("cccc").unwrap();

        assert_eq!(read(file.path()), "cccc\n");
        assert!(!file.backup_path(1).exists());
    }

    #[test]
    fn test_oversized_line_is_written_whole() {
        let dir = TempDir::new().unwrap();
        let mut file = RotatingFile::open(dir.path().join("m.log"), 4, 1).unwrap();

        file.write_line("a long line").unwrap();
        assert_eq!(read(file.path()), "a long line\n");
    }

    #[test]
    fn test_reopen_appends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("m.log");
        RotatingFile::open(&path, 100, 1).unwrap().write_line("first").unwrap();
        RotatingFile::open(&path, 100, 1).unwrap().write_line("second").unwrap();
        assert_eq!(read(&path), "first\nsecond\n");
    }

    #[test]
    fn test_logger_writes_formatted_lines() {
        let dir = TempDir::new().unwrap();
        let log_dir = dir.path().join("logs");
        let mut logger = LoggerActor::open(&log_dir, DEFAULT_MAX_LOG_SIZE, DEFAULT_BACKUP_COUNT).unwrap();

        logger.on_message(&InboundMessage::new("sensoren/temperature", "21.50"));
        logger.on_message(&InboundMessage::new("sensoren/status", "online"));
        assert_eq!(logger.logged(), 2);

        let contents = read(&log_dir.join(LOG_FILE_NAME));
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" - message_logger - INFO - Topic: sensoren/temperature, Payload: 21.5"));
        assert!(lines[1].ends_with(" - message_logger - INFO - Topic: sensoren/status, Payload: online"));
    }
}
