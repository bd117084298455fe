//! No-op backend implementation

use std::sync::Arc;

use serde_json::Value;

use super::traits::{Backend, BackendAdapter, LoggerHandle, RawHandle, SharedHandle};
use crate::error::OnelogResult;

/// A logger that discards everything
///
/// Only `log` is implemented, so every other method reaches it through
/// the default-level fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpHandle;

impl LoggerHandle for NoOpHandle {
    fn has_method(&self, method: &str) -> bool {
        method == "log"
    }

    #[inline]
    fn invoke(&self, _method: &str, _args: &[Value]) -> Value {
        Value::Null
    }
}

/// Backend that does nothing
///
/// Useful for testing or when logging is not needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpBackend;

impl BackendAdapter for NoOpBackend {
    const NAME: &'static str = "noop";

    fn create(_lib: Option<RawHandle>) -> OnelogResult<Self> {
        Ok(Self)
    }
}

impl Backend for NoOpBackend {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn get_logger(&self, _category: Option<&str>) -> OnelogResult<SharedHandle> {
        Ok(Arc::new(NoOpHandle))
    }
}
