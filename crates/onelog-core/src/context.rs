//! Logging context: the configure-once registry behind the top-level API

use std::panic::Location;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use crate::backend::{
    adapter_factory, create_backend, Backend, BackendAdapter, BackendFactory, ConsoleBackend,
    RawHandle,
};
use crate::config::OnelogConfig;
use crate::error::{OnelogError, OnelogResult};
use crate::logger::Logger;
use crate::methods::{DispatchTable, MethodSet};
use crate::middleware::{Middleware, MiddlewareOptions};
use crate::timer::TimerRegistry;

/// Options for configuring a backend
#[derive(Clone, Default)]
pub struct UseOptions {
    /// Extra methods to add to the method set
    pub methods: Vec<String>,
    /// Pre-built library handle passed to the backend
    pub lib: Option<RawHandle>,
    /// Defaults for options left unset in `middleware()` calls
    pub middleware: MiddlewareOptions,
}

impl std::fmt::Debug for UseOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UseOptions")
            .field("methods", &self.methods)
            .field("lib", &self.lib.is_some())
            .field("middleware", &self.middleware)
            .finish()
    }
}

impl UseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set extra methods
    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = methods.into_iter().map(Into::into).collect();
        self
    }

    /// Set the library handle
    pub fn with_lib(mut self, lib: RawHandle) -> Self {
        self.lib = Some(lib);
        self
    }

    /// Set the middleware defaults
    pub fn with_middleware(mut self, middleware: MiddlewareOptions) -> Self {
        self.middleware = middleware;
        self
    }
}

/// State of a configured context
#[derive(Clone)]
struct Active {
    backend: Arc<dyn Backend>,
    default_logger: Arc<Logger>,
    table: Arc<DispatchTable>,
    middleware: MiddlewareOptions,
}

/// A logging context
///
/// Starts unconfigured. The first successful `use_backend`/`use_named`
/// installs a backend for the lifetime of the context; later calls are
/// ignored. Requesting a logger first installs the console backend.
///
/// # Example
///
/// ```
/// use onelog_core::{Onelog, UseOptions, MemoryBackend, NoOpBackend};
///
/// let onelog = Onelog::new();
/// onelog.use_backend::<MemoryBackend>(UseOptions::new().with_methods(["audit"])).unwrap();
/// // first configuration wins
/// onelog.use_backend::<NoOpBackend>(UseOptions::new()).unwrap();
///
/// assert_eq!(onelog.backend_name().as_deref(), Some("memory"));
/// assert!(onelog.methods().contains(&"audit".to_string()));
/// ```
pub struct Onelog {
    state: Mutex<Option<Active>>,
    timers: Arc<TimerRegistry>,
}

impl Default for Onelog {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Onelog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Onelog")
            .field("backend", &self.backend_name())
            .finish()
    }
}

impl Onelog {
    /// Create an unconfigured context sharing the process-wide timers
    pub fn new() -> Self {
        Self::with_timers(TimerRegistry::global())
    }

    /// Create an unconfigured context with its own timers
    pub fn with_timers(timers: Arc<TimerRegistry>) -> Self {
        Self {
            state: Mutex::new(None),
            timers,
        }
    }

    /// Install backend `A` unless a backend is already installed
    #[track_caller]
    pub fn use_backend<A: BackendAdapter>(&self, options: UseOptions) -> OnelogResult<()> {
        let caller = Location::caller();
        self.install(A::NAME, &adapter_factory::<A>(), options, caller)
    }

    /// Install a registered backend by name unless one is already installed
    #[track_caller]
    pub fn use_named(&self, name: &str, options: UseOptions) -> OnelogResult<()> {
        let caller = Location::caller();
        let factory: BackendFactory = {
            let name = name.to_string();
            Box::new(move |lib| create_backend(&name, lib))
        };
        self.install(name, &factory, options, caller)
    }

    /// Install the backend described by a configuration
    #[track_caller]
    pub fn init_from_config(&self, config: &OnelogConfig) -> OnelogResult<()> {
        let options = config.use_options()?;
        self.use_named(config.backend_name(), options)
    }

    fn install(
        &self,
        name: &str,
        factory: &BackendFactory,
        options: UseOptions,
        caller: &'static Location<'static>,
    ) -> OnelogResult<()> {
        let mut state = self.state.lock();
        if let Some(active) = state.as_ref() {
            tracing::debug!(
                requested = name,
                active = active.backend.name(),
                "onelog already configured, ignoring backend"
            );
            return Ok(());
        }

        *state = Some(self.activate(name, factory, options, caller)?);
        Ok(())
    }

    /// Construct, validate and wire up a backend
    fn activate(
        &self,
        name: &str,
        factory: &BackendFactory,
        options: UseOptions,
        caller: &'static Location<'static>,
    ) -> OnelogResult<Active> {
        let backend = factory(options.lib).map_err(|e| match e {
            OnelogError::InvalidBackendAdapter { .. } | OnelogError::UnknownBackend(_) => e,
            other => OnelogError::invalid_adapter(name, other.to_string()),
        })?;

        if backend.name().is_empty() {
            return Err(OnelogError::invalid_adapter(name, "backend has no name"));
        }
        let root = backend
            .get_logger(None)
            .map_err(|e| OnelogError::invalid_adapter(backend.name(), e.to_string()))?;

        let mut methods = MethodSet::builtin();
        methods.union(backend.extra_methods());
        methods.union(&options.methods);
        let table = Arc::new(DispatchTable::build(methods));

        let default_logger = Arc::new(Logger::new(
            None,
            root,
            Arc::clone(&backend),
            Arc::clone(&table),
            Arc::clone(&self.timers),
        ));

        tracing::info!(
            backend = backend.name(),
            caller = %caller,
            "onelog is using logging backend"
        );

        Ok(Active {
            backend,
            default_logger,
            table,
            middleware: options.middleware,
        })
    }

    /// Snapshot of the active state, installing the console backend if needed
    #[track_caller]
    fn active(&self) -> OnelogResult<Active> {
        let caller = Location::caller();
        let mut state = self.state.lock();
        if let Some(active) = state.as_ref() {
            return Ok(active.clone());
        }

        let factory = adapter_factory::<ConsoleBackend>();
        let active = self.activate(ConsoleBackend::NAME, &factory, UseOptions::default(), caller)?;
        *state = Some(active.clone());
        Ok(active)
    }

    /// Get a logger for a category, or the root logger for `None`
    ///
    /// Each call returns a new facade; whether the native logger is shared
    /// between calls is up to the backend.
    #[track_caller]
    pub fn get(&self, category: Option<&str>) -> OnelogResult<Logger> {
        let active = self.active()?;
        let handle = active.backend.get_logger(category)?;
        Ok(Logger::new(
            category,
            handle,
            active.backend,
            active.table,
            Arc::clone(&self.timers),
        ))
    }

    /// The default logger the top-level methods are bound to
    #[track_caller]
    pub fn default_logger(&self) -> OnelogResult<Arc<Logger>> {
        Ok(self.active()?.default_logger)
    }

    /// Call a method on the default logger
    #[track_caller]
    pub fn call(&self, method: &str, args: &[Value]) -> OnelogResult<Value> {
        self.default_logger()?.call(method, args)
    }

    /// Request-logging middleware from the backend
    ///
    /// Options left unset fall back to the defaults given at `use` time.
    #[track_caller]
    pub fn middleware(&self, options: &MiddlewareOptions) -> OnelogResult<Box<dyn Middleware>> {
        let active = self.active()?;
        let options = options.or_defaults(&active.middleware);
        active.backend.middleware(&options)
    }

    /// Namespace sub-logger, `None` if the backend has no namespaces
    #[track_caller]
    pub fn sub(&self, namespaces: &[&str]) -> OnelogResult<Option<Logger>> {
        let active = self.active()?;
        let Some(handle) = active.backend.sub(namespaces)? else {
            return Ok(None);
        };
        let category = namespaces.join(":");
        Ok(Some(Logger::new(
            Some(&category),
            handle,
            active.backend,
            active.table,
            Arc::clone(&self.timers),
        )))
    }

    /// The installed backend's library handle, `None` if unconfigured
    pub fn get_library(&self) -> Option<RawHandle> {
        self.state
            .lock()
            .as_ref()
            .and_then(|active| active.backend.raw_handle())
    }

    /// Current method set (the built-ins while unconfigured)
    pub fn methods(&self) -> Vec<String> {
        match self.state.lock().as_ref() {
            Some(active) => active.table.methods().to_vec(),
            None => MethodSet::builtin().to_vec(),
        }
    }

    /// Name of the installed backend
    pub fn backend_name(&self) -> Option<String> {
        self.state
            .lock()
            .as_ref()
            .map(|active| active.backend.name().to_string())
    }

    pub fn is_configured(&self) -> bool {
        self.state.lock().is_some()
    }

    /// Drop the installed backend and return to the unconfigured state
    ///
    /// Loggers obtained earlier keep working against the old backend.
    pub fn reset(&self) {
        if let Some(active) = self.state.lock().take() {
            tracing::debug!(backend = active.backend.name(), "onelog reset");
        }
    }
}

macro_rules! context_methods {
    ($($fn_name:ident => $method:literal),* $(,)?) => {
        impl Onelog {
            $(
                #[doc = concat!("Call `", $method, "` on the default logger.")]
                #[track_caller]
                pub fn $fn_name(&self, args: &[Value]) -> OnelogResult<Value> {
                    self.call($method, args)
                }
            )*
        }
    };
}

for_each_builtin_method!(context_methods);
