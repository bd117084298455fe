//! File backend implementation
//!
//! Appends one line per call to a log file. Useful when stdout/stderr
//! aren't visible (e.g. a process started by an IDE or a service manager).

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::Mutex;
use serde_json::Value;

use super::render_args;
use super::traits::{downcast_lib, Backend, BackendAdapter, LoggerHandle, RawHandle, SharedHandle};
use crate::error::OnelogResult;
use crate::middleware::{Middleware, MiddlewareOptions, RequestLogger};

/// Environment variable naming the log file
pub const LOG_FILE_ENV: &str = "ONELOG_LOG_FILE";
/// Environment variable setting the minimum level
pub const LOG_LEVEL_ENV: &str = "ONELOG_LOG_LEVEL";

/// Category written for the root logger
const ROOT_CATEGORY: &str = "root";

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl LogLevel {
    /// Parse a level name, case-insensitively
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO "),
            LogLevel::Warn => write!(f, "WARN "),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

fn timestamp() -> String {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| {
            let secs = d.as_secs();
            let millis = d.subsec_millis();
            let hours = (secs % 86400) / 3600;
            let mins = (secs % 3600) / 60;
            let secs = secs % 60;
            format!("{:02}:{:02}:{:02}.{:03}", hours, mins, secs, millis)
        })
        .unwrap_or_else(|_| "??:??:??.???".to_string())
}

/// An open log file with a minimum level
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: Mutex<File>,
    min_level: Mutex<LogLevel>,
}

impl FileSink {
    /// Open (or create) a log file for appending
    pub fn open(path: impl Into<PathBuf>, min_level: LogLevel) -> std::io::Result<Self> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
            min_level: Mutex::new(min_level),
        })
    }

    /// Open the file named by `ONELOG_LOG_FILE` at the `ONELOG_LOG_LEVEL` level
    pub fn from_env() -> std::io::Result<Self> {
        let path = std::env::var(LOG_FILE_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_path());
        let min_level = std::env::var(LOG_LEVEL_ENV)
            .ok()
            .and_then(|v| LogLevel::parse(&v))
            .unwrap_or(LogLevel::Debug);
        Self::open(path, min_level)
    }

    /// `onelog.log` in the temp directory
    pub fn default_path() -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push("onelog.log");
        path
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn min_level(&self) -> LogLevel {
        *self.min_level.lock()
    }

    pub fn set_min_level(&self, level: LogLevel) {
        *self.min_level.lock() = level;
    }

    /// Check if messages at `level` are written
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level()
    }

    /// Append a line if `level` passes the minimum level
    pub fn write(&self, level: LogLevel, category: &str, message: &str) {
        if !self.is_enabled(level) {
            return;
        }
        let mut file = self.file.lock();
        let written = writeln!(file, "[{}] [{}] [{}] {}", timestamp(), level, category, message)
            .and_then(|_| file.flush());
        if let Err(e) = written {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write log line");
        }
    }

    /// Truncate the log file
    pub fn clear(&self) -> std::io::Result<()> {
        let mut file = self.file.lock();
        File::create(&self.path)?;
        *file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        Ok(())
    }
}

/// Logger writing to a `FileSink`
#[derive(Debug)]
pub struct FileHandle {
    sink: Arc<FileSink>,
    category: String,
}

impl LoggerHandle for FileHandle {
    fn has_method(&self, method: &str) -> bool {
        matches!(method, "setLevel" | "isLevelEnabled") || LogLevel::parse(method).is_some()
    }

    fn invoke(&self, method: &str, args: &[Value]) -> Value {
        let requested = || args.first().and_then(Value::as_str).and_then(LogLevel::parse);
        match method {
            "setLevel" => match requested() {
                Some(level) => {
                    self.sink.set_min_level(level);
                    Value::Bool(true)
                }
                None => Value::Bool(false),
            },
            "isLevelEnabled" => {
                Value::Bool(requested().map(|l| self.sink.is_enabled(l)).unwrap_or(false))
            }
            _ => {
                if let Some(level) = LogLevel::parse(method) {
                    self.sink.write(level, &self.category, &render_args(args));
                }
                Value::Null
            }
        }
    }
}

/// Backend appending to a log file
///
/// Declares the extra method `setLevel`, which changes the minimum level
/// of the shared file.
#[derive(Debug, Clone)]
pub struct FileBackend {
    sink: Arc<FileSink>,
}

impl FileBackend {
    pub fn new(sink: Arc<FileSink>) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &Arc<FileSink> {
        &self.sink
    }
}

impl BackendAdapter for FileBackend {
    const NAME: &'static str = "file";

    fn create(lib: Option<RawHandle>) -> OnelogResult<Self> {
        let sink = match downcast_lib::<Self, FileSink>(lib)? {
            Some(sink) => sink,
            None => Arc::new(FileSink::from_env()?),
        };
        Ok(Self { sink })
    }
}

impl Backend for FileBackend {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn get_logger(&self, category: Option<&str>) -> OnelogResult<SharedHandle> {
        Ok(Arc::new(FileHandle {
            sink: Arc::clone(&self.sink),
            category: category.unwrap_or(ROOT_CATEGORY).to_string(),
        }))
    }

    fn default_level(&self) -> OnelogResult<String> {
        Ok("info".to_string())
    }

    fn extra_methods(&self) -> Vec<String> {
        vec!["setLevel".to_string()]
    }

    fn middleware(&self, options: &MiddlewareOptions) -> OnelogResult<Box<dyn Middleware>> {
        Ok(Box::new(RequestLogger::for_backend(self, options, "info")?))
    }

    fn raw_handle(&self) -> Option<RawHandle> {
        Some(Arc::clone(&self.sink) as RawHandle)
    }

    fn sub(&self, namespaces: &[&str]) -> OnelogResult<Option<SharedHandle>> {
        self.get_logger(Some(&namespaces.join("."))).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    fn backend_in(dir: &tempfile::TempDir, level: LogLevel) -> FileBackend {
        let sink = FileSink::open(dir.path().join("test.log"), level).unwrap();
        FileBackend::new(Arc::new(sink))
    }

    #[test]
    fn test_log_levels() {
        assert!(LogLevel::Debug > LogLevel::Trace);
        assert!(LogLevel::Info > LogLevel::Debug);
        assert!(LogLevel::Warn > LogLevel::Info);
        assert!(LogLevel::Error > LogLevel::Warn);
        assert_eq!(LogLevel::parse("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("loud"), None);
    }

    #[test]
    fn test_writes_lines() {
        let dir = tempfile::tempdir().unwrap();
        let backend = backend_in(&dir, LogLevel::Debug);
        let logger = backend.get_logger(Some("db")).unwrap();

        logger.invoke("info", &[json!("connected"), json!(3)]);
        logger.invoke("trace", &[json!("filtered out")]);

        let content = fs::read_to_string(backend.sink().path()).unwrap();
        assert!(content.contains("[INFO ] [db] connected 3"), "{}", content);
        assert!(!content.contains("filtered out"));
    }

    #[test]
    fn test_set_level() {
        let dir = tempfile::tempdir().unwrap();
        let backend = backend_in(&dir, LogLevel::Debug);
        let logger = backend.get_logger(None).unwrap();

        assert_eq!(logger.invoke("setLevel", &[json!("error")]), json!(true));
        assert_eq!(logger.invoke("setLevel", &[json!("nope")]), json!(false));
        assert_eq!(backend.sink().min_level(), LogLevel::Error);
        assert_eq!(logger.invoke("isLevelEnabled", &[json!("warn")]), json!(false));

        logger.invoke("warn", &[json!("hidden")]);
        logger.invoke("error", &[json!("shown")]);
        let content = fs::read_to_string(backend.sink().path()).unwrap();
        assert!(!content.contains("hidden"));
        assert!(content.contains("[ERROR] [root] shown"));
    }

    #[test]
    fn test_clear() {
        let dir = tempfile::tempdir().unwrap();
        let backend = backend_in(&dir, LogLevel::Trace);
        backend.get_logger(None).unwrap().invoke("info", &[json!("old")]);
        backend.sink().clear().unwrap();
        backend.get_logger(None).unwrap().invoke("info", &[json!("new")]);

        let content = fs::read_to_string(backend.sink().path()).unwrap();
        assert!(!content.contains("old"));
        assert!(content.contains("new"));
    }

    #[test]
    fn test_declares_set_level() {
        let dir = tempfile::tempdir().unwrap();
        let backend = backend_in(&dir, LogLevel::Info);
        assert_eq!(backend.extra_methods(), vec!["setLevel".to_string()]);
        assert_eq!(backend.default_level().unwrap(), "info");
        assert!(!backend.get_logger(None).unwrap().has_method("log"));
    }
}
