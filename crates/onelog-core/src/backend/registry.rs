//! Backend registry for selecting backends by name

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use super::console::ConsoleBackend;
use super::file::FileBackend;
use super::memory::MemoryBackend;
use super::noop::NoOpBackend;
use super::tracing_backend::TracingBackend;
use super::traits::{Backend, BackendAdapter, RawHandle};
use crate::error::{OnelogError, OnelogResult};

/// Factory function type for creating backends from an optional library handle
pub type BackendFactory =
    Box<dyn Fn(Option<RawHandle>) -> OnelogResult<Arc<dyn Backend>> + Send + Sync>;

/// Factory for a backend type
pub fn adapter_factory<A: BackendAdapter>() -> BackendFactory {
    Box::new(|lib: Option<RawHandle>| -> OnelogResult<Arc<dyn Backend>> {
        Ok(Arc::new(A::create(lib)?) as Arc<dyn Backend>)
    })
}

/// Definition of a registered backend
pub struct BackendDefinition {
    /// Unique name for this backend
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Factory function to create instances
    pub factory: BackendFactory,
}

impl std::fmt::Debug for BackendDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

fn builtin<A: BackendAdapter>(description: &str) -> (String, BackendDefinition) {
    (
        A::NAME.to_string(),
        BackendDefinition {
            name: A::NAME.to_string(),
            description: description.to_string(),
            factory: adapter_factory::<A>(),
        },
    )
}

/// Global registry of backends
static REGISTRY: Lazy<RwLock<HashMap<String, BackendDefinition>>> = Lazy::new(|| {
    let map = HashMap::from([
        builtin::<ConsoleBackend>("Write to stdout/stderr"),
        builtin::<TracingBackend>("Emit events through the tracing crate"),
        builtin::<FileBackend>("Append to a log file"),
        builtin::<NoOpBackend>("Discard all messages"),
        builtin::<MemoryBackend>("Record calls in memory for testing"),
    ]);
    RwLock::new(map)
});

/// Register a new backend under a name, replacing any previous one
///
/// # Example
///
/// ```
/// use onelog_core::backend::{adapter_factory, has_backend, register_backend, NoOpBackend};
///
/// register_backend("quiet", "Alias for the no-op backend", adapter_factory::<NoOpBackend>());
/// assert!(has_backend("quiet"));
/// ```
pub fn register_backend(name: &str, description: &str, factory: BackendFactory) {
    let mut registry = REGISTRY.write();
    registry.insert(
        name.to_string(),
        BackendDefinition {
            name: name.to_string(),
            description: description.to_string(),
            factory,
        },
    );
}

/// Create a backend by name
pub fn create_backend(name: &str, lib: Option<RawHandle>) -> OnelogResult<Arc<dyn Backend>> {
    let registry = REGISTRY.read();
    let definition = registry
        .get(name)
        .ok_or_else(|| OnelogError::UnknownBackend(name.to_string()))?;
    (definition.factory)(lib)
}

/// List all registered backends as (name, description) pairs, sorted by name
pub fn list_backends() -> Vec<(String, String)> {
    let registry = REGISTRY.read();
    let mut backends: Vec<_> = registry
        .values()
        .map(|def| (def.name.clone(), def.description.clone()))
        .collect();
    backends.sort();
    backends
}

/// Check if a backend is registered
pub fn has_backend(name: &str) -> bool {
    REGISTRY.read().contains_key(name)
}

/// Unregister a backend (mainly for testing)
pub fn unregister_backend(name: &str) -> bool {
    REGISTRY.write().remove(name).is_some()
}
