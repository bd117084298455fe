//! Console backend implementation

use std::sync::Arc;

use serde_json::Value;

use super::render_args;
use super::traits::{downcast_lib, Backend, BackendAdapter, LoggerHandle, RawHandle, SharedHandle};
use crate::error::OnelogResult;
use crate::middleware::{Middleware, MiddlewareOptions, RequestLogger};

/// Methods the console implements natively
pub const CONSOLE_METHODS: &[&str] = &["log", "debug", "info", "warn", "error", "trace", "dir"];

/// Settings shared by all console loggers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleSettings {
    prefix: String,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleSettings {
    /// Create settings with the default prefix
    pub fn new() -> Self {
        Self {
            prefix: "onelog".to_string(),
        }
    }

    /// Create settings with a custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

/// A console logger writing to stdout/stderr
#[derive(Debug, Clone)]
pub struct ConsoleHandle {
    label: String,
}

impl ConsoleHandle {
    /// Format one output line
    pub fn format_line(&self, method: &str, args: &[Value]) -> String {
        let message = if method == "dir" {
            args.iter()
                .map(|arg| serde_json::to_string_pretty(arg).unwrap_or_else(|_| arg.to_string()))
                .collect::<Vec<_>>()
                .join("\n")
        } else {
            render_args(args)
        };
        format!("[{}] {}: {}", self.label, method.to_uppercase(), message)
    }
}

impl LoggerHandle for ConsoleHandle {
    fn has_method(&self, method: &str) -> bool {
        CONSOLE_METHODS.contains(&method)
    }

    fn invoke(&self, method: &str, args: &[Value]) -> Value {
        let line = self.format_line(method, args);
        match method {
            "log" | "info" | "dir" => println!("{}", line),
            _ => eprintln!("{}", line),
        }
        Value::Null
    }
}

/// Backend writing to the process console
///
/// The default backend, installed when a logger is requested before any
/// backend was configured.
#[derive(Debug, Clone, Default)]
pub struct ConsoleBackend {
    settings: Arc<ConsoleSettings>,
}

impl ConsoleBackend {
    pub fn new(settings: ConsoleSettings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }
}

impl BackendAdapter for ConsoleBackend {
    const NAME: &'static str = "console";

    fn create(lib: Option<RawHandle>) -> OnelogResult<Self> {
        let settings = downcast_lib::<Self, ConsoleSettings>(lib)?.unwrap_or_default();
        Ok(Self { settings })
    }
}

impl Backend for ConsoleBackend {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn get_logger(&self, category: Option<&str>) -> OnelogResult<SharedHandle> {
        let label = category.unwrap_or(self.settings.prefix()).to_string();
        Ok(Arc::new(ConsoleHandle { label }))
    }

    fn default_level(&self) -> OnelogResult<String> {
        Ok("log".to_string())
    }

    fn middleware(&self, options: &MiddlewareOptions) -> OnelogResult<Box<dyn Middleware>> {
        Ok(Box::new(RequestLogger::for_backend(self, options, "info")?))
    }

    fn raw_handle(&self) -> Option<RawHandle> {
        Some(Arc::clone(&self.settings) as RawHandle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_console_backend_creation() {
        let backend = ConsoleBackend::create(None).unwrap();
        assert_eq!(backend.settings.prefix(), "onelog");

        let lib: RawHandle = Arc::new(ConsoleSettings::with_prefix("MyApp"));
        let custom = ConsoleBackend::create(Some(lib)).unwrap();
        assert_eq!(custom.settings.prefix(), "MyApp");
    }

    #[test]
    fn test_console_format() {
        let backend = ConsoleBackend::default();
        let root = ConsoleHandle {
            label: backend.settings.prefix().to_string(),
        };
        assert_eq!(
            root.format_line("info", &[json!("user"), json!(7), json!({"a": 1})]),
            "[onelog] INFO: user 7 {\"a\":1}"
        );
        assert_eq!(
            root.format_line("dir", &[json!({"a": 1})]),
            "[onelog] DIR: {\n  \"a\": 1\n}"
        );
    }

    #[test]
    fn test_console_methods() {
        let backend = ConsoleBackend::default();
        let logger = backend.get_logger(Some("db")).unwrap();
        assert!(logger.has_method("warn"));
        assert!(!logger.has_method("notice"));
        assert_eq!(backend.default_level().unwrap(), "log");
    }

    #[test]
    fn test_console_logger_logs() {
        // This test just verifies the logger doesn't panic
        let logger = ConsoleBackend::default().get_logger(None).unwrap();
        for method in CONSOLE_METHODS {
            logger.invoke(method, &[json!("message")]);
        }
    }
}
