//! OneLog Core
//!
//! A logging facade: one fixed set of logging methods (`debug`, `info`,
//! `warning`, `error`, `timeEnd`, ...) delegating to a backend chosen once at
//! startup. Application code logs through the facade and never depends on
//! which backend is installed.
//!
//! ## Dispatch
//!
//! Every method in the method set is callable on every logger:
//! - methods the backend implements are forwarded as-is
//! - methods it lacks go to the backend's default level
//! - `start`/`time`/`stop`/`timeEnd` are timers handled by the facade
//!
//! ```rust
//! use onelog_core::{Onelog, UseOptions, MemoryBackend, MemoryLibrary};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let lib = Arc::new(MemoryLibrary::new());
//! let onelog = Onelog::new();
//! onelog.use_backend::<MemoryBackend>(UseOptions::new().with_lib(lib.clone())).unwrap();
//!
//! let db = onelog.get(Some("db")).unwrap();
//! db.info(&[json!("connected")]).unwrap();
//! db.notice(&[json!("pool resized")]).unwrap(); // memory has no `notice`, logged on `log`
//!
//! assert_eq!(lib.calls_for("log").len(), 1);
//! ```
//!
//! The `global` module holds a process-wide context for code that doesn't
//! pass one around; its functions are also available at the crate root
//! (`onelog_core::get`, `onelog_core::info`, ...).

#[macro_use]
mod macros;

pub mod backend;
pub mod config;
pub mod context;
pub mod error;
pub mod global;
pub mod logger;
pub mod methods;
pub mod middleware;
pub mod timer;

pub use serde_json::Value;

pub use backend::{
    Backend, BackendAdapter, ConsoleBackend, FileBackend, LoggerHandle, MemoryBackend,
    MemoryLibrary, NoOpBackend, RawHandle, SharedHandle, TracingBackend,
};
pub use config::{ConfigError, OnelogConfig};
pub use context::{Onelog, UseOptions};
pub use error::{OnelogError, OnelogResult};
pub use logger::Logger;
pub use methods::{Dispatch, DispatchTable, MethodSet, BUILTIN_METHODS};
pub use middleware::{
    Middleware, MiddlewareOptions, PassThrough, RequestInfo, RequestLogger, ResponseInfo,
};
pub use timer::TimerRegistry;

// Top-level API bound to the process-wide context (`onelog_core::info(..)`)
pub use global::*;
