//! Request-logging middleware hook
//!
//! A middleware receives the request, the response being built, and a
//! continuation. It must call the continuation exactly once and may log
//! around it.

use std::time::Instant;

use hyper::{Method, StatusCode, Uri};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backend::{Backend, SharedHandle};
use crate::error::OnelogResult;

/// Category used when none is configured
pub const DEFAULT_MIDDLEWARE_CATEGORY: &str = "Middleware";

/// Options for `middleware()`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiddlewareOptions {
    /// Logger category for request lines
    #[serde(default)]
    pub category: Option<String>,
    /// Method used to log request lines (backend default when unset)
    #[serde(default)]
    pub level: Option<String>,
}

impl MiddlewareOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the level
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    /// Fill unset fields from `defaults`
    pub fn or_defaults(&self, defaults: &MiddlewareOptions) -> MiddlewareOptions {
        MiddlewareOptions {
            category: self.category.clone().or_else(|| defaults.category.clone()),
            level: self.level.clone().or_else(|| defaults.level.clone()),
        }
    }

    /// Category, defaulting to `"Middleware"`
    pub fn category(&self) -> &str {
        self.category.as_deref().unwrap_or(DEFAULT_MIDDLEWARE_CATEGORY)
    }
}

/// The parts of a request a middleware sees
#[derive(Debug, Clone)]
pub struct RequestInfo {
    pub method: Method,
    pub uri: Uri,
}

impl RequestInfo {
    pub fn new(method: Method, uri: Uri) -> Self {
        Self { method, uri }
    }
}

/// The parts of a response a middleware sees
#[derive(Debug, Clone)]
pub struct ResponseInfo {
    pub status: StatusCode,
}

impl Default for ResponseInfo {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
        }
    }
}

/// Continuation passed to a middleware
pub type Next<'a> = &'a mut dyn FnMut(&RequestInfo, &mut ResponseInfo);

/// Request/response hook returned by `Backend::middleware`
pub trait Middleware: Send + Sync {
    /// Handle one request, calling `next` exactly once
    fn handle(&self, request: &RequestInfo, response: &mut ResponseInfo, next: Next<'_>);
}

/// Middleware that only passes control on
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl Middleware for PassThrough {
    fn handle(&self, request: &RequestInfo, response: &mut ResponseInfo, next: Next<'_>) {
        next(request, response);
    }
}

/// Middleware logging one line per request after it completes
pub struct RequestLogger {
    handle: SharedHandle,
    level: String,
}

impl RequestLogger {
    /// Log on `level`, or on `default_level` if the handle lacks it
    pub fn new(handle: SharedHandle, level: &str, default_level: &str) -> Self {
        let level = if handle.has_method(level) {
            level
        } else {
            default_level
        };
        Self {
            handle,
            level: level.to_string(),
        }
    }

    /// Build a request logger on a backend's category logger
    ///
    /// `request_level` is used when the options name no level.
    pub fn for_backend(
        backend: &dyn Backend,
        options: &MiddlewareOptions,
        request_level: &str,
    ) -> OnelogResult<Self> {
        let handle = backend.get_logger(Some(options.category()))?;
        let level = options.level.as_deref().unwrap_or(request_level);
        let default_level = backend.default_level()?;
        Ok(Self::new(handle, level, &default_level))
    }

    /// Method used for request lines
    pub fn level(&self) -> &str {
        &self.level
    }
}

impl Middleware for RequestLogger {
    fn handle(&self, request: &RequestInfo, response: &mut ResponseInfo, next: Next<'_>) {
        let started = Instant::now();
        next(request, response);
        let line = format!(
            "{} {} {} {}ms",
            request.method,
            request.uri,
            response.status.as_u16(),
            started.elapsed().as_millis()
        );
        if self.handle.has_method(&self.level) {
            self.handle.invoke(&self.level, &[Value::from(line)]);
        }
    }
}
