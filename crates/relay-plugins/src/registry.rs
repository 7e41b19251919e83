//! Plugin registry with lazy singleton instantiation.
//!
//! Membership is fixed when the registry is built; instances are not. A
//! registered plugin stays dormant, represented only by its deferred
//! constructor, until the first command names it, at which point exactly
//! one instance is constructed and cached for every later command. The
//! dispatcher registers itself as an already-active instance because it is
//! necessarily running before any command arrives.

use std::collections::HashMap;

use tracing::debug;

use crate::capability::Plugin;
use crate::error::PluginError;

const REGISTRY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::registry");

/// Deferred constructor invoked on a plugin's first resolution.
pub type PluginConstructor = Box<dyn FnOnce() -> Box<dyn Plugin> + Send>;

/// Registration entry tracking one plugin identity.
struct RegistryEntry {
    activated: bool,
    constructor: Option<PluginConstructor>,
    instance: Option<Box<dyn Plugin>>,
}

impl RegistryEntry {
    fn dormant(constructor: PluginConstructor) -> Self {
        Self {
            activated: false,
            constructor: Some(constructor),
            instance: None,
        }
    }

    fn active(instance: Box<dyn Plugin>) -> Self {
        Self {
            activated: true,
            constructor: None,
            instance: Some(instance),
        }
    }
}

/// Builder assembling the registry's membership.
///
/// # Example
///
/// ```
/// use relay_plugins::{PluginRegistry, builtin::EchoPlugin};
///
/// let mut builder = PluginRegistry::builder();
/// builder
///     .register("echo", || Box::new(EchoPlugin::new()))
///     .expect("identity is unique");
/// let registry = builder.build();
/// assert!(!registry.is_active("echo"));
/// ```
#[derive(Default)]
pub struct PluginRegistryBuilder {
    entries: HashMap<String, RegistryEntry>,
}

impl PluginRegistryBuilder {
    /// Registers a dormant plugin under the given identity.
    ///
    /// The constructor runs at most once, on the identity's first
    /// resolution.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::DuplicateId`] when the identity is already
    /// registered.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        constructor: impl FnOnce() -> Box<dyn Plugin> + Send + 'static,
    ) -> Result<(), PluginError> {
        let id = id.into();
        self.insert(id, RegistryEntry::dormant(Box::new(constructor)))
    }

    /// Registers an already-constructed plugin as an active entry.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::DuplicateId`] when the plugin's identity is
    /// already registered.
    pub fn register_instance(&mut self, plugin: Box<dyn Plugin>) -> Result<(), PluginError> {
        let id = plugin.id().to_owned();
        self.insert(id, RegistryEntry::active(plugin))
    }

    /// Freezes membership and returns the registry.
    #[must_use]
    pub fn build(self) -> PluginRegistry {
        PluginRegistry {
            entries: self.entries,
        }
    }

    fn insert(&mut self, id: String, entry: RegistryEntry) -> Result<(), PluginError> {
        if self.entries.contains_key(&id) {
            return Err(PluginError::duplicate_id(id));
        }
        self.entries.insert(id, entry);
        Ok(())
    }
}

/// Registry resolving plugin identities to singleton instances.
pub struct PluginRegistry {
    entries: HashMap<String, RegistryEntry>,
}

impl PluginRegistry {
    /// Starts building a registry.
    #[must_use]
    pub fn builder() -> PluginRegistryBuilder {
        PluginRegistryBuilder::default()
    }

    /// Resolves an identity to its plugin instance.
    ///
    /// The first resolution of a dormant identity constructs the singleton
    /// and flips the entry active; the flag never reverts. Unknown
    /// identities resolve to `None`; absence is an expected outcome the
    /// caller maps to a status, not an error.
    pub fn resolve(&mut self, name: &str) -> Option<&mut (dyn Plugin + 'static)> {
        let entry = self.entries.get_mut(name)?;
        if !entry.activated {
            let constructor = entry.constructor.take()?;
            entry.instance = Some(constructor());
            entry.activated = true;
            debug!(target: REGISTRY_TARGET, plugin = name, "plugin activated");
        }
        entry.instance.as_deref_mut()
    }

    /// Returns `true` when the identity has an instantiated singleton.
    #[must_use]
    pub fn is_active(&self, name: &str) -> bool {
        self.entries.get(name).is_some_and(|entry| entry.activated)
    }

    /// Number of registered identities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no identities are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
