//! Logging backends
//!
//! A backend is the implementation that actually produces output. The
//! facade only talks to backends through the `Backend` trait, so any of
//! the adapters below (or a custom one) can be installed at startup:
//!
//! - `ConsoleBackend`: stdout/stderr, installed implicitly
//! - `TracingBackend`: events on the `tracing` ecosystem
//! - `FileBackend`: a log file with a runtime-adjustable level
//! - `NoOpBackend`: silence
//! - `MemoryBackend`: recorded calls, for tests

mod traits;
mod console;
mod file;
mod memory;
mod noop;
mod registry;
mod tracing_backend;

use serde_json::Value;

pub use traits::{downcast_lib, Backend, BackendAdapter, LoggerHandle, RawHandle, SharedHandle};
pub use console::{ConsoleBackend, ConsoleHandle, ConsoleSettings, CONSOLE_METHODS};
pub use file::{FileBackend, FileHandle, FileSink, LogLevel, LOG_FILE_ENV, LOG_LEVEL_ENV};
pub use memory::{MemoryBackend, MemoryHandle, MemoryLibrary, RecordedCall, DEFAULT_MEMORY_METHODS};
pub use noop::{NoOpBackend, NoOpHandle};
pub use registry::{
    adapter_factory, create_backend, has_backend, list_backends, register_backend,
    unregister_backend, BackendDefinition, BackendFactory,
};
pub use tracing_backend::{TracingBackend, TracingHandle};

/// Render call arguments as one message line
///
/// Strings are written verbatim, other values as compact JSON, separated
/// by spaces.
pub fn render_args(args: &[Value]) -> String {
    args.iter()
        .map(|arg| match arg {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_args() {
        assert_eq!(render_args(&[]), "");
        assert_eq!(
            render_args(&[json!("took"), json!(12), json!(null), json!([1, 2])]),
            "took 12 null [1,2]"
        );
    }
}
