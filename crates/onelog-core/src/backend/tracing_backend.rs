//! Tracing library adapter implementation

use std::sync::Arc;

use serde_json::Value;
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::render_args;
use super::traits::{Backend, BackendAdapter, LoggerHandle, RawHandle, SharedHandle};
use crate::error::OnelogResult;
use crate::middleware::{Middleware, MiddlewareOptions, RequestLogger};

/// Category recorded for the root logger
pub const ROOT_CATEGORY: &str = "root";

/// Map a facade method onto a tracing level
fn level_for(method: &str) -> Option<Level> {
    match method {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" | "notice" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" | "fatal" | "crit" | "alert" | "emerg" => Some(Level::ERROR),
        _ => None,
    }
}

// Event macros need the level as a constant
fn level_enabled(level: Level) -> bool {
    if level == Level::ERROR {
        tracing::enabled!(Level::ERROR)
    } else if level == Level::WARN {
        tracing::enabled!(Level::WARN)
    } else if level == Level::INFO {
        tracing::enabled!(Level::INFO)
    } else if level == Level::DEBUG {
        tracing::enabled!(Level::DEBUG)
    } else {
        tracing::enabled!(Level::TRACE)
    }
}

/// Logger emitting `tracing` events with a `category` field
#[derive(Debug, Clone)]
pub struct TracingHandle {
    category: String,
}

impl LoggerHandle for TracingHandle {
    fn has_method(&self, method: &str) -> bool {
        method == "isLevelEnabled" || level_for(method).is_some()
    }

    fn invoke(&self, method: &str, args: &[Value]) -> Value {
        if method == "isLevelEnabled" {
            let enabled = args
                .first()
                .and_then(Value::as_str)
                .and_then(level_for)
                .map(level_enabled)
                .unwrap_or(false);
            return Value::Bool(enabled);
        }

        let Some(level) = level_for(method) else {
            return Value::Null;
        };
        let category = self.category.as_str();
        let message = render_args(args);
        if level == Level::ERROR {
            tracing::error!(category, "{}", message);
        } else if level == Level::WARN {
            tracing::warn!(category, "{}", message);
        } else if level == Level::INFO {
            tracing::info!(category, "{}", message);
        } else if level == Level::DEBUG {
            tracing::debug!(category, "{}", message);
        } else {
            tracing::trace!(category, "{}", message);
        }
        Value::Null
    }
}

/// Backend that delegates to the `tracing` crate
///
/// Events go to whatever subscriber the application installed;
/// `init_subscriber` installs a formatting subscriber for programs that
/// have none.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingBackend;

impl TracingBackend {
    /// Install a global fmt subscriber filtered by `RUST_LOG`
    ///
    /// Falls back to `default_filter` when `RUST_LOG` is unset or invalid.
    /// Returns false if a global subscriber was already installed.
    pub fn init_subscriber(default_filter: &str) -> bool {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .is_ok()
    }
}

impl BackendAdapter for TracingBackend {
    const NAME: &'static str = "tracing";

    fn create(_lib: Option<RawHandle>) -> OnelogResult<Self> {
        Ok(Self)
    }
}

impl Backend for TracingBackend {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn get_logger(&self, category: Option<&str>) -> OnelogResult<SharedHandle> {
        Ok(Arc::new(TracingHandle {
            category: category.unwrap_or(ROOT_CATEGORY).to_string(),
        }))
    }

    fn default_level(&self) -> OnelogResult<String> {
        Ok("info".to_string())
    }

    fn middleware(&self, options: &MiddlewareOptions) -> OnelogResult<Box<dyn Middleware>> {
        Ok(Box::new(RequestLogger::for_backend(self, options, "info")?))
    }

    fn sub(&self, namespaces: &[&str]) -> OnelogResult<Option<SharedHandle>> {
        self.get_logger(Some(&namespaces.join("::"))).map(Some)
    }
}
