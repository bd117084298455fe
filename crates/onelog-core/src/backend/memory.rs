//! Recording backend for testing
//!
//! Keeps every call in memory instead of producing output. Useful for
//! asserting on what application code logged, and for exercising the
//! dispatch rules with a backend that implements only some methods.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use super::traits::{downcast_lib, Backend, BackendAdapter, LoggerHandle, RawHandle, SharedHandle};
use crate::error::{OnelogError, OnelogResult};
use crate::middleware::{Middleware, MiddlewareOptions, RequestLogger};

/// Methods implemented by a default `MemoryLibrary`
pub const DEFAULT_MEMORY_METHODS: &[&str] = &["debug", "info", "warn", "error", "log"];

/// One recorded call
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Category of the logger that received the call
    pub category: Option<String>,
    /// Method name as invoked on the native logger
    pub method: String,
    /// Arguments as passed
    pub args: Vec<Value>,
}

/// Library object shared by a `MemoryBackend` and its loggers
///
/// Pass it as the library handle of `use` to inspect calls afterwards.
///
/// # Example
///
/// ```
/// use onelog_core::{Onelog, UseOptions, MemoryBackend, MemoryLibrary};
/// use std::sync::Arc;
///
/// let lib = Arc::new(MemoryLibrary::new());
/// let onelog = Onelog::new();
/// onelog.use_backend::<MemoryBackend>(UseOptions::new().with_lib(lib.clone())).unwrap();
///
/// onelog.get(Some("db")).unwrap().info(&["connected".into()]).unwrap();
/// assert_eq!(lib.calls()[0].method, "info");
/// ```
#[derive(Debug)]
pub struct MemoryLibrary {
    methods: Vec<String>,
    extra_methods: Vec<String>,
    rejects_loggers: bool,
    calls: Mutex<Vec<RecordedCall>>,
}

impl Default for MemoryLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLibrary {
    /// Create a library implementing `debug`, `info`, `warn`, `error` and `log`
    pub fn new() -> Self {
        Self {
            methods: DEFAULT_MEMORY_METHODS.iter().map(|m| m.to_string()).collect(),
            extra_methods: Vec::new(),
            rejects_loggers: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Replace the set of implemented methods
    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = methods.into_iter().map(Into::into).collect();
        self
    }

    /// Declare backend-specific methods; they are also implemented
    pub fn with_extra_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_methods = methods.into_iter().map(Into::into).collect();
        self
    }

    /// Make every logger request fail
    pub fn rejecting_loggers(mut self) -> Self {
        self.rejects_loggers = true;
        self
    }

    /// Check if a method is implemented
    pub fn implements(&self, method: &str) -> bool {
        self.methods.iter().chain(&self.extra_methods).any(|m| m == method)
    }

    /// All recorded calls in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Recorded calls for one method
    pub fn calls_for(&self, method: &str) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.method == method)
            .cloned()
            .collect()
    }

    /// Forget all recorded calls
    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    /// Record a call, returning its 1-based sequence number
    fn record(&self, category: Option<&str>, method: &str, args: &[Value]) -> usize {
        let mut calls = self.calls.lock();
        calls.push(RecordedCall {
            category: category.map(str::to_string),
            method: method.to_string(),
            args: args.to_vec(),
        });
        calls.len()
    }
}

/// Native logger of the memory backend
#[derive(Debug)]
pub struct MemoryHandle {
    category: Option<String>,
    lib: Arc<MemoryLibrary>,
}

impl LoggerHandle for MemoryHandle {
    fn has_method(&self, method: &str) -> bool {
        self.lib.implements(method)
    }

    fn invoke(&self, method: &str, args: &[Value]) -> Value {
        Value::from(self.lib.record(self.category.as_deref(), method, args))
    }
}

/// Backend recording calls into a `MemoryLibrary`
///
/// Loggers are memoized by category: asking twice for the same category
/// returns the same handle.
pub struct MemoryBackend {
    lib: Arc<MemoryLibrary>,
    handles: Mutex<HashMap<Option<String>, Arc<MemoryHandle>>>,
}

impl MemoryBackend {
    /// Create a backend over an existing library
    pub fn with_library(lib: Arc<MemoryLibrary>) -> Self {
        Self {
            lib,
            handles: Mutex::new(HashMap::new()),
        }
    }

    /// The library recording calls
    pub fn library(&self) -> &Arc<MemoryLibrary> {
        &self.lib
    }
}

impl BackendAdapter for MemoryBackend {
    const NAME: &'static str = "memory";

    fn create(lib: Option<RawHandle>) -> OnelogResult<Self> {
        let lib = downcast_lib::<Self, MemoryLibrary>(lib)?
            .unwrap_or_else(|| Arc::new(MemoryLibrary::new()));
        Ok(Self::with_library(lib))
    }
}

impl Backend for MemoryBackend {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn get_logger(&self, category: Option<&str>) -> OnelogResult<SharedHandle> {
        if self.lib.rejects_loggers {
            return Err(OnelogError::invalid_adapter(
                Self::NAME,
                "logger creation is disabled",
            ));
        }

        let key = category.map(str::to_string);
        let mut handles = self.handles.lock();
        let handle = handles.entry(key.clone()).or_insert_with(|| {
            Arc::new(MemoryHandle {
                category: key,
                lib: Arc::clone(&self.lib),
            })
        });
        Ok(Arc::clone(handle) as SharedHandle)
    }

    fn extra_methods(&self) -> Vec<String> {
        self.lib.extra_methods.clone()
    }

    fn middleware(&self, options: &MiddlewareOptions) -> OnelogResult<Box<dyn Middleware>> {
        Ok(Box::new(RequestLogger::for_backend(self, options, "info")?))
    }

    fn raw_handle(&self) -> Option<RawHandle> {
        Some(Arc::clone(&self.lib) as RawHandle)
    }

    fn sub(&self, namespaces: &[&str]) -> OnelogResult<Option<SharedHandle>> {
        self.get_logger(Some(&namespaces.join(":"))).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_records_calls() {
        let backend = MemoryBackend::create(None).unwrap();
        let handle = backend.get_logger(Some("db")).unwrap();

        assert_eq!(handle.invoke("info", &[json!("a")]), json!(1));
        assert_eq!(handle.invoke("warn", &[json!("b"), json!(2)]), json!(2));

        let calls = backend.library().calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].category.as_deref(), Some("db"));
        assert_eq!(calls[1].args, vec![json!("b"), json!(2)]);
        assert_eq!(backend.library().calls_for("info").len(), 1);
    }

    #[test]
    fn test_handles_are_memoized_by_category() {
        let backend = MemoryBackend::create(None).unwrap();
        let first = backend.get_logger(Some("db")).unwrap();
        let second = backend.get_logger(Some("db")).unwrap();
        let other = backend.get_logger(Some("http")).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &other));
    }

    #[test]
    fn test_custom_methods() {
        let lib = MemoryLibrary::new()
            .with_methods(["warn"])
            .with_extra_methods(["setLevel"]);
        let backend = MemoryBackend::with_library(Arc::new(lib));
        let root = backend.get_logger(None).unwrap();

        assert!(root.has_method("warn"));
        assert!(root.has_method("setLevel"));
        assert!(!root.has_method("info"));
        assert_eq!(backend.extra_methods(), vec!["setLevel".to_string()]);
        assert!(backend.default_level().is_err());
    }

    #[test]
    fn test_rejecting_loggers() {
        let lib = MemoryLibrary::new().rejecting_loggers();
        let backend = MemoryBackend::with_library(Arc::new(lib));
        assert!(backend.get_logger(None).is_err());
    }

    #[test]
    fn test_wrong_library_type() {
        let lib: RawHandle = Arc::new("not a library");
        assert!(matches!(
            MemoryBackend::create(Some(lib)),
            Err(OnelogError::InvalidBackendAdapter { .. })
        ));
    }

    #[test]
    fn test_sub_joins_namespaces() {
        let backend = MemoryBackend::create(None).unwrap();
        let sub = backend.sub(&["app", "db"]).unwrap().unwrap();
        sub.invoke("info", &[]);
        assert_eq!(
            backend.library().calls()[0].category.as_deref(),
            Some("app:db")
        );
    }

    #[test]
    fn test_raw_handle_is_library() {
        let lib = Arc::new(MemoryLibrary::new());
        let backend = MemoryBackend::create(Some(lib.clone() as RawHandle)).unwrap();
        let raw = backend.raw_handle().unwrap();
        let raw = raw.downcast::<MemoryLibrary>().unwrap();
        assert!(Arc::ptr_eq(&raw, &lib));
    }
}
