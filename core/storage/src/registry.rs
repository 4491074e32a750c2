//! Client registry for dynamic backend resolution.
//!
//! The registry maps provider names to client factories. Resolution checks
//! a task-local override table before the shared global table, so tests
//! running concurrently can each swap in their own backend without ever
//! observing each other's overrides.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, LazyLock, Mutex};
use tracing::debug;

use cirrus_common::{Error, Result};

use crate::client::StorageClient;
use crate::local::LocalClient;
use crate::memory::MemoryClient;

/// Factory function type for creating storage clients.
///
/// Zero-argument; configuration such as bucket names or credentials is
/// captured by the closure and never inspected by the registry. A factory
/// may fail with `InvalidConfiguration`, which `resolve` propagates
/// unchanged.
pub type ClientFactory = Arc<dyn Fn() -> Result<Arc<dyn StorageClient>> + Send + Sync>;

/// Reserved provider name used when callers have no reason to pick one.
pub const DEFAULT_PROVIDER: &str = "default";

tokio::task_local! {
    /// Per-task override table. Replaced wholesale on every scope entry so
    /// that unwinding a scope restores the exact enclosing table.
    static OVERRIDES: HashMap<String, ClientFactory>;
}

/// Registry of storage client factories.
///
/// The global table is shared and guarded by a mutex; the override table is
/// carried by the current task and never shared between tasks or threads.
/// The registry owns factories, not the clients they produce: each
/// `resolve` invokes the factory again unless the factory itself caches.
pub struct ClientRegistry {
    factories: Mutex<HashMap<String, ClientFactory>>,
}

impl ClientRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: Mutex::new(HashMap::new()),
        }
    }

    /// Register a client factory for `name`.
    ///
    /// Replaces any existing factory for the same name (last writer wins).
    pub fn register<F>(&self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<Arc<dyn StorageClient>> + Send + Sync + 'static,
    {
        let name = name.into();
        debug!("registering storage client factory for provider '{}'", name);
        self.factories.lock().unwrap().insert(name, Arc::new(factory));
    }

    /// Remove the factory for `name`.
    ///
    /// No-op when nothing is registered under that name.
    pub fn unregister(&self, name: &str) {
        debug!("unregistering storage client factory for provider '{}'", name);
        self.factories.lock().unwrap().remove(name);
    }

    /// Resolve a client for `name`.
    ///
    /// Checks the current task's override table first, then the global
    /// table. The factory runs after the global lock is released, so a slow
    /// constructor never serializes unrelated resolutions.
    ///
    /// # Errors
    /// - `Unconfigured` when neither table has a binding for `name`
    /// - Any error the resolved factory returns, propagated unchanged
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn StorageClient>> {
        let overridden = OVERRIDES
            .try_with(|overrides| overrides.get(name).cloned())
            .unwrap_or(None);
        if let Some(factory) = overridden {
            debug!("resolving provider '{}' via task-local override", name);
            return factory();
        }

        let factory = {
            let factories = self.factories.lock().unwrap();
            match factories.get(name) {
                Some(factory) => factory.clone(),
                None => {
                    let mut known: Vec<String> = factories.keys().cloned().collect();
                    known.sort();
                    return Err(Error::Unconfigured {
                        name: name.to_string(),
                        known,
                    });
                }
            }
        };

        factory()
    }

    /// Run `scope` with `factory` temporarily bound to `name`.
    ///
    /// The override is visible only to `resolve` calls made within `scope`
    /// and within the calling task; sibling tasks are unaffected. The prior
    /// override table is restored on every exit path, including error
    /// returns, panics, and cancellation. Overrides nest: an inner override
    /// shadows only its own name and unwinds back to the outer table.
    ///
    /// Installing an override does not require a global registration for
    /// the same name; exiting such a scope restores the unconfigured state.
    pub async fn with_override<F, Fut>(
        &self,
        name: impl Into<String>,
        factory: F,
        scope: Fut,
    ) -> Fut::Output
    where
        F: Fn() -> Result<Arc<dyn StorageClient>> + Send + Sync + 'static,
        Fut: Future,
    {
        let table = overlay(name.into(), Arc::new(factory));
        OVERRIDES.scope(table, scope).await
    }

    /// Synchronous counterpart of [`with_override`] for code running
    /// outside an async context, with the same restoration guarantees.
    ///
    /// [`with_override`]: ClientRegistry::with_override
    pub fn with_override_sync<F, R>(
        &self,
        name: impl Into<String>,
        factory: F,
        scope: impl FnOnce() -> R,
    ) -> R
    where
        F: Fn() -> Result<Arc<dyn StorageClient>> + Send + Sync + 'static,
    {
        let table = overlay(name.into(), Arc::new(factory));
        OVERRIDES.sync_scope(table, scope)
    }

    /// Get the list of globally registered provider names.
    ///
    /// Task-local overrides are not included.
    pub fn providers(&self) -> Vec<String> {
        self.factories.lock().unwrap().keys().cloned().collect()
    }

    /// Check if a provider is globally registered.
    pub fn has_provider(&self, name: &str) -> bool {
        self.factories.lock().unwrap().contains_key(name)
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a new override table: the current task's table plus one binding.
fn overlay(name: String, factory: ClientFactory) -> HashMap<String, ClientFactory> {
    let mut table = OVERRIDES.try_with(Clone::clone).unwrap_or_default();
    table.insert(name, factory);
    table
}

/// Process-wide registry for wiring code that has no handle to pass.
///
/// Application code should prefer passing an explicit `&ClientRegistry`;
/// this singleton exists for entry points that register backends once at
/// startup.
pub fn global() -> &'static ClientRegistry {
    static GLOBAL: LazyLock<ClientRegistry> = LazyLock::new(ClientRegistry::new);
    &GLOBAL
}

/// Create a registry with default backends.
pub fn create_default_registry() -> ClientRegistry {
    let registry = ClientRegistry::new();

    // In-memory backend (for testing)
    registry.register("memory", || {
        Ok(Arc::new(MemoryClient::new()) as Arc<dyn StorageClient>)
    });

    // Local filesystem backend, rooted via CIRRUS_LOCAL_ROOT
    registry.register("local", || {
        let client = LocalClient::from_env()?;
        Ok(Arc::new(client) as Arc<dyn StorageClient>)
    });

    registry
}
