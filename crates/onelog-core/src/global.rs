//! Process-wide logging context
//!
//! Free functions mirroring `Onelog` on a context created on first use.
//! Libraries and applications that don't want to thread a context through
//! their code call these directly:
//!
//! ```no_run
//! use onelog_core::{global, UseOptions, TracingBackend};
//! use serde_json::json;
//!
//! TracingBackend::init_subscriber("info");
//! global::use_backend::<TracingBackend>(UseOptions::new()).unwrap();
//!
//! let db = global::get(Some("db")).unwrap();
//! db.info(&[json!("connected")]).unwrap();
//! global::warning(&[json!("disk almost full")]).unwrap();
//! ```

use std::sync::Arc;

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::backend::{BackendAdapter, RawHandle};
use crate::config::OnelogConfig;
use crate::context::{Onelog, UseOptions};
use crate::error::OnelogResult;
use crate::logger::Logger;
use crate::middleware::{Middleware, MiddlewareOptions};

static ONELOG: Lazy<Onelog> = Lazy::new(Onelog::new);

/// The process-wide context
pub fn context() -> &'static Onelog {
    &ONELOG
}

/// Install backend `A` for the process unless one is already installed
#[track_caller]
pub fn use_backend<A: BackendAdapter>(options: UseOptions) -> OnelogResult<()> {
    ONELOG.use_backend::<A>(options)
}

/// Install a registered backend by name unless one is already installed
#[track_caller]
pub fn use_named(name: &str, options: UseOptions) -> OnelogResult<()> {
    ONELOG.use_named(name, options)
}

/// Install the backend described by a configuration
#[track_caller]
pub fn init_from_config(config: &OnelogConfig) -> OnelogResult<()> {
    ONELOG.init_from_config(config)
}

/// Install the backend described by the user-level config file
///
/// Reads `~/.config/onelog/config.yaml` (missing file means defaults) with
/// the `ONELOG_*` environment overrides applied.
#[track_caller]
pub fn init_from_user_config() -> OnelogResult<()> {
    let config = OnelogConfig::load_user()?;
    ONELOG.init_from_config(&config)
}

/// Get a logger, installing the console backend if none is configured
#[track_caller]
pub fn get(category: Option<&str>) -> OnelogResult<Logger> {
    ONELOG.get(category)
}

/// The logger the top-level functions are bound to
#[track_caller]
pub fn default_logger() -> OnelogResult<Arc<Logger>> {
    ONELOG.default_logger()
}

/// Call a method on the default logger
#[track_caller]
pub fn call(method: &str, args: &[Value]) -> OnelogResult<Value> {
    ONELOG.call(method, args)
}

/// Request-logging middleware from the installed backend
#[track_caller]
pub fn middleware(options: &MiddlewareOptions) -> OnelogResult<Box<dyn Middleware>> {
    ONELOG.middleware(options)
}

/// Namespace sub-logger, `None` if the backend has no namespaces
#[track_caller]
pub fn sub(namespaces: &[&str]) -> OnelogResult<Option<Logger>> {
    ONELOG.sub(namespaces)
}

/// The installed backend's library handle
pub fn get_library() -> Option<RawHandle> {
    ONELOG.get_library()
}

/// Current method set
pub fn methods() -> Vec<String> {
    ONELOG.methods()
}

/// Return the process to the unconfigured state
pub fn reset() {
    ONELOG.reset()
}

macro_rules! global_methods {
    ($($fn_name:ident => $method:literal),* $(,)?) => {
        $(
            #[doc = concat!("Call `", $method, "` on the default logger.")]
            #[track_caller]
            pub fn $fn_name(args: &[Value]) -> OnelogResult<Value> {
                ONELOG.call($method, args)
            }
        )*
    };
}

for_each_builtin_method!(global_methods);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MemoryBackend, MemoryLibrary, NoOpBackend};
    use parking_lot::Mutex;
    use serde_json::json;

    // Tests share the process-wide context
    static SERIAL: Mutex<()> = parking_lot::const_mutex(());

    #[test]
    fn test_global_lifecycle() {
        let _guard = SERIAL.lock();
        reset();

        let lib = Arc::new(MemoryLibrary::new().with_methods([
            "debug", "info", "warn", "error", "log", "audit",
        ]));
        use_backend::<MemoryBackend>(
            UseOptions::new()
                .with_lib(lib.clone())
                .with_methods(["audit", "notice"]),
        )
        .unwrap();
        use_backend::<NoOpBackend>(UseOptions::new()).unwrap();

        let raw = get_library().unwrap().downcast::<MemoryLibrary>().unwrap();
        assert!(Arc::ptr_eq(&raw, &lib));
        assert!(methods().contains(&"audit".to_string()));

        info(&[json!("top level")]).unwrap();
        call("audit", &[json!("custom")]).unwrap();
        get(Some("db")).unwrap().error(&[json!("category")]).unwrap();

        notice(&[json!("falls back")]).unwrap();

        let calls = lib.calls();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0].method, "info");
        // implemented by the library, so forwarded as-is
        assert_eq!(calls[1].method, "audit");
        assert_eq!(calls[2].category.as_deref(), Some("db"));
        assert_eq!(calls[3].method, "log");

        reset();
        assert!(get_library().is_none());
    }

    #[test]
    fn test_global_bootstraps_console() {
        let _guard = SERIAL.lock();
        reset();

        let logger = get(None).unwrap();
        assert_eq!(context().backend_name().as_deref(), Some("console"));
        assert!(logger.methods().contains("timeEnd"));
        assert!(sub(&["x"]).unwrap().is_none());

        reset();
    }

    #[test]
    fn test_global_timers() {
        let _guard = SERIAL.lock();
        reset();
        use_backend::<NoOpBackend>(UseOptions::new()).unwrap();

        time(&[json!("global timer")]).unwrap();
        assert!(stop(&[json!("global timer")]).unwrap().as_u64().is_some());
        assert!(time_end(&[json!("global timer")]).is_ok());

        reset();
    }
}
