//! Logger facade wrapping one backend-native logger

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde_json::Value;

use crate::backend::{Backend, SharedHandle};
use crate::error::{OnelogError, OnelogResult};
use crate::methods::{Dispatch, DispatchTable, MethodSet};
use crate::timer::{label_from_args, TimerRegistry};

/// Per-category logger applications call
///
/// Every method of the configured method set is callable, whether or not
/// the backend implements it:
/// - implemented methods are forwarded with the same arguments and return value
/// - missing methods are forwarded to the backend's default level
/// - `start`/`time`/`stop`/`timeEnd` are served by the timer registry
///
/// # Example
///
/// ```
/// use onelog_core::Onelog;
/// use serde_json::json;
///
/// let onelog = Onelog::new();
/// let logger = onelog.get(Some("db")).unwrap();
/// logger.info(&[json!("connected"), json!({"pool": 4})]).unwrap();
///
/// logger.start(&[json!("query")]).unwrap();
/// logger.time_end(&[json!("query")]).unwrap();
/// ```
pub struct Logger {
    category: Option<String>,
    handle: SharedHandle,
    backend: Arc<dyn Backend>,
    table: Arc<DispatchTable>,
    timers: Arc<TimerRegistry>,
    enabled: AtomicBool,
    // resolved on first fallback
    default_level: OnceCell<String>,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("category", &self.category)
            .field("backend", &self.backend.name())
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl Logger {
    /// Wrap a native logger
    pub fn new(
        category: Option<&str>,
        handle: SharedHandle,
        backend: Arc<dyn Backend>,
        table: Arc<DispatchTable>,
        timers: Arc<TimerRegistry>,
    ) -> Self {
        Self {
            category: category.map(str::to_string),
            handle,
            backend,
            table,
            timers,
            enabled: AtomicBool::new(true),
            default_level: OnceCell::new(),
        }
    }

    /// Call a method by name
    ///
    /// A suppressed logger returns `Value::Null` without touching the
    /// backend or the timers.
    pub fn call(&self, method: &str, args: &[Value]) -> OnelogResult<Value> {
        if !self.is_enabled() {
            return Ok(Value::Null);
        }

        let dispatch = self
            .table
            .lookup(method)
            .ok_or_else(|| OnelogError::UnknownMethod(method.to_string()))?;

        match dispatch {
            Dispatch::TimerStart => {
                self.timers.start(&label_from_args(args));
                Ok(Value::Null)
            }
            Dispatch::TimerStop => {
                let elapsed = self.timers.stop(&label_from_args(args))?;
                Ok(Value::from(elapsed))
            }
            Dispatch::TimeEnd => {
                let label = label_from_args(args);
                let elapsed = self.timers.stop(&label)?;
                self.delegate("debug", &[Value::from(format!("{}: {}ms", label, elapsed))])
            }
            Dispatch::Delegate => self.delegate(method, args),
        }
    }

    /// Invoke `method` on the backend, or its default level if missing
    fn delegate(&self, method: &str, args: &[Value]) -> OnelogResult<Value> {
        if self.handle.has_method(method) {
            return Ok(self.handle.invoke(method, args));
        }

        let fallback = self
            .default_level
            .get_or_try_init(|| self.backend.default_level())?;
        if !self.handle.has_method(fallback) {
            return Err(OnelogError::no_default_level(self.backend.name()));
        }
        Ok(self.handle.invoke(fallback, args))
    }

    /// Disable all methods of this logger
    // TODO: accept a level once per-level suppression exists
    pub fn suppress(&self) {
        self.enabled.store(false, Ordering::SeqCst);
    }

    /// Re-enable this logger
    pub fn allow(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Category this logger was requested for, `None` for the default logger
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// The wrapped backend-native logger
    pub fn handle(&self) -> &SharedHandle {
        &self.handle
    }

    /// Methods callable on this logger
    pub fn methods(&self) -> &MethodSet {
        self.table.methods()
    }
}

macro_rules! logger_methods {
    ($($fn_name:ident => $method:literal),* $(,)?) => {
        impl Logger {
            $(
                #[doc = concat!("Call `", $method, "`.")]
                pub fn $fn_name(&self, args: &[Value]) -> OnelogResult<Value> {
                    self.call($method, args)
                }
            )*
        }
    };
}

for_each_builtin_method!(logger_methods);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MemoryBackend, MemoryLibrary, NoOpHandle};
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    fn logger_over(lib: MemoryLibrary) -> (Logger, Arc<MemoryLibrary>) {
        let lib = Arc::new(lib);
        let backend = Arc::new(MemoryBackend::with_library(lib.clone()));
        let mut methods = MethodSet::builtin();
        methods.union(backend.extra_methods());
        let handle = backend.get_logger(Some("test")).unwrap();
        let logger = Logger::new(
            Some("test"),
            handle,
            backend,
            Arc::new(DispatchTable::build(methods)),
            Arc::new(TimerRegistry::new()),
        );
        (logger, lib)
    }

    #[test]
    fn test_forwards_implemented_methods() {
        let (logger, lib) = logger_over(MemoryLibrary::new());

        let returned = logger.info(&[json!("hello"), json!(1)]).unwrap();
        assert_eq!(returned, json!(1));
        let returned = logger.warn(&[json!("careful")]).unwrap();
        assert_eq!(returned, json!(2));

        let calls = lib.calls();
        assert_eq!(calls[0].method, "info");
        assert_eq!(calls[0].args, vec![json!("hello"), json!(1)]);
        assert_eq!(calls[0].category.as_deref(), Some("test"));
        assert_eq!(calls[1].method, "warn");
    }

    #[test]
    fn test_missing_methods_use_default_level() {
        let (logger, lib) = logger_over(MemoryLibrary::new());

        for method in ["notice", "crit", "emerg", "isLevelEnabled"] {
            logger.call(method, &[json!(method)]).unwrap();
        }

        let calls = lib.calls();
        assert_eq!(calls.len(), 4);
        assert!(calls.iter().all(|c| c.method == "log"));
        assert_eq!(calls[1].args, vec![json!("crit")]);
    }

    #[test]
    fn test_default_level_falls_back_to_info() {
        let (logger, lib) = logger_over(MemoryLibrary::new().with_methods(["info"]));
        logger.alert(&[json!("x")]).unwrap();
        assert_eq!(lib.calls_for("info").len(), 1);
    }

    #[test]
    fn test_no_default_level_available() {
        let (logger, lib) = logger_over(MemoryLibrary::new().with_methods(["warn"]));

        assert!(logger.warn(&[json!("fine")]).is_ok());
        assert!(matches!(
            logger.notice(&[json!("lost")]),
            Err(OnelogError::NoDefaultLevelAvailable { backend }) if backend == "memory"
        ));
        assert_eq!(lib.calls().len(), 1);
    }

    #[test]
    fn test_start_stop() {
        let (logger, lib) = logger_over(MemoryLibrary::new());

        assert_eq!(logger.start(&[json!("job")]).unwrap(), Value::Null);
        let elapsed = logger.stop(&[json!("job")]).unwrap().as_u64().unwrap();
        assert!(elapsed < 50);

        // time is an alias for start
        logger.time(&[json!("alias")]).unwrap();
        assert!(logger.stop(&[json!("alias")]).is_ok());
        assert!(lib.calls().is_empty());
    }

    #[test]
    fn test_stop_unknown_label() {
        let (logger, _lib) = logger_over(MemoryLibrary::new());
        assert!(matches!(
            logger.stop(&[json!("never")]),
            Err(OnelogError::UnknownTimerLabel(_))
        ));
        assert!(logger.time_end(&[json!("never")]).is_err());
    }

    #[test]
    fn test_time_end_logs_at_debug() {
        let (logger, lib) = logger_over(MemoryLibrary::new());

        logger.time(&[json!("render")]).unwrap();
        logger.time_end(&[json!("render")]).unwrap();

        let calls = lib.calls_for("debug");
        assert_eq!(calls.len(), 1);
        let message = calls[0].args[0].as_str().unwrap();
        let duration = message
            .strip_prefix("render: ")
            .and_then(|rest| rest.strip_suffix("ms"))
            .unwrap();
        assert!(duration.parse::<u64>().is_ok(), "{}", message);
    }

    #[test]
    fn test_time_end_without_debug_uses_default_level() {
        let (logger, lib) = logger_over(MemoryLibrary::new().with_methods(["log"]));
        logger.start(&[json!("t")]).unwrap();
        logger.time_end(&[json!("t")]).unwrap();
        assert_eq!(lib.calls_for("log").len(), 1);
    }

    #[test]
    fn test_suppress_and_allow() {
        let (logger, lib) = logger_over(MemoryLibrary::new());

        logger.suppress();
        assert!(!logger.is_enabled());
        assert_eq!(logger.info(&[json!("x")]).unwrap(), Value::Null);
        assert_eq!(logger.notice(&[json!("x")]).unwrap(), Value::Null);
        logger.start(&[json!("suppressed")]).unwrap();
        assert!(lib.calls().is_empty());

        logger.allow();
        logger.info(&[json!("x")]).unwrap();
        assert_eq!(lib.calls_for("info").len(), 1);
        // the suppressed start never reached the timers
        assert!(logger.stop(&[json!("suppressed")]).is_err());
    }

    #[test]
    fn test_unknown_method() {
        let (logger, _lib) = logger_over(MemoryLibrary::new());
        assert!(matches!(
            logger.call("shout", &[]),
            Err(OnelogError::UnknownMethod(name)) if name == "shout"
        ));
    }

    #[test]
    fn test_backend_extra_methods_are_callable() {
        let (logger, lib) = logger_over(MemoryLibrary::new().with_extra_methods(["setLevel"]));
        assert!(logger.methods().contains("setLevel"));
        logger.call("setLevel", &[json!("warn")]).unwrap();
        assert_eq!(lib.calls_for("setLevel").len(), 1);
    }

    struct CountingBackend {
        root_requests: AtomicUsize,
    }

    impl Backend for CountingBackend {
        fn name(&self) -> &str {
            "counting"
        }

        fn get_logger(&self, _category: Option<&str>) -> OnelogResult<SharedHandle> {
            self.root_requests.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(NoOpHandle))
        }
    }

    #[test]
    fn test_default_level_resolved_once() {
        let backend = Arc::new(CountingBackend {
            root_requests: AtomicUsize::new(0),
        });
        let logger = Logger::new(
            None,
            Arc::new(NoOpHandle),
            backend.clone(),
            Arc::new(DispatchTable::default()),
            Arc::new(TimerRegistry::new()),
        );

        for _ in 0..3 {
            logger.notice(&[json!("x")]).unwrap();
            logger.crit(&[json!("y")]).unwrap();
        }
        assert_eq!(backend.root_requests.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_debug_impl() {
        let (logger, _lib) = logger_over(MemoryLibrary::new());
        let debug_str = format!("{:?}", logger);
        assert!(debug_str.contains("memory"));
        assert!(debug_str.contains("test"));
    }
}
