//! Backend provider interface

use std::any::Any;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{OnelogError, OnelogResult};
use crate::middleware::{Middleware, MiddlewareOptions, PassThrough};

/// The underlying library object of a backend, downcast by callers
pub type RawHandle = Arc<dyn Any + Send + Sync>;

/// Type alias for an Arc-wrapped native logger
pub type SharedHandle = Arc<dyn LoggerHandle>;

/// A backend-native logger for one category
///
/// Methods are addressed by name. The facade asks `has_method` before
/// calling `invoke`, so `invoke` is only called with implemented names.
pub trait LoggerHandle: Send + Sync {
    /// Check if this logger implements a method
    fn has_method(&self, method: &str) -> bool;

    /// Invoke a method, returning `Value::Null` when it produces nothing
    fn invoke(&self, method: &str, args: &[Value]) -> Value;
}

/// Capability contract every logging backend satisfies
///
/// Implementations:
/// - `ConsoleBackend`: stdout/stderr, the default
/// - `TracingBackend`: delegates to the `tracing` crate
/// - `FileBackend`: appends to a log file
/// - `NoOpBackend`: discards everything
/// - `MemoryBackend`: records calls for tests
pub trait Backend: Send + Sync {
    /// Human-readable name of this backend
    fn name(&self) -> &str;

    /// Get the native logger for a category, or the root logger for `None`
    fn get_logger(&self, category: Option<&str>) -> OnelogResult<SharedHandle>;

    /// Method invoked when a requested method is not implemented
    ///
    /// The provided implementation prefers `log`, then `info`, as
    /// implemented by the root logger. The facade resolves it once per
    /// logger.
    fn default_level(&self) -> OnelogResult<String> {
        let root = self
            .get_logger(None)
            .map_err(|_| OnelogError::no_default_level(self.name()))?;
        if root.has_method("log") {
            Ok("log".to_string())
        } else if root.has_method("info") {
            Ok("info".to_string())
        } else {
            Err(OnelogError::no_default_level(self.name()))
        }
    }

    /// Backend-specific method names to add to the method set
    fn extra_methods(&self) -> Vec<String> {
        Vec::new()
    }

    /// Request-logging hook
    fn middleware(&self, _options: &MiddlewareOptions) -> OnelogResult<Box<dyn Middleware>> {
        Ok(Box::new(PassThrough))
    }

    /// Direct access to the underlying library
    fn raw_handle(&self) -> Option<RawHandle> {
        None
    }

    /// Namespace sub-logger, if the backend has them
    fn sub(&self, _namespaces: &[&str]) -> OnelogResult<Option<SharedHandle>> {
        Ok(None)
    }
}

/// A backend that can be installed by type
pub trait BackendAdapter: Backend + Sized + 'static {
    /// Name used in diagnostics and errors
    const NAME: &'static str;

    /// Construct the backend, reusing `lib` when one is supplied
    fn create(lib: Option<RawHandle>) -> OnelogResult<Self>;
}

/// Downcast a pre-built library handle for `A`
///
/// A handle of the wrong type is an invalid adapter configuration.
pub fn downcast_lib<A, T>(lib: Option<RawHandle>) -> OnelogResult<Option<Arc<T>>>
where
    A: BackendAdapter,
    T: Any + Send + Sync,
{
    match lib {
        None => Ok(None),
        Some(lib) => lib.downcast::<T>().map(Some).map_err(|_| {
            OnelogError::invalid_adapter(
                A::NAME,
                format!("library handle is not a {}", std::any::type_name::<T>()),
            )
        }),
    }
}
