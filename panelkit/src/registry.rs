//! Component registry.
//!
//! Engines register themselves on construction with the registry they are
//! given and stay registered until disposed. Hosts use the registry for
//! cross-tree lookups ("which grid owns this element?") through opaque
//! [`Handle`]s instead of a process-wide map.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::RwLock;

use thiserror::Error;

/// Opaque handle to a registered component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u64);

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of a registered component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Grid,
    List,
    Tree,
}

/// A component that can live in a [`ComponentRegistry`].
pub trait Component: Send + Sync + 'static {
    /// Kind of component.
    fn kind(&self) -> ComponentKind;

    /// Unique name, e.g. `__grid_3`.
    fn name(&self) -> String;

    /// Downcast support.
    fn as_any(&self) -> &dyn Any;
}

/// Registry errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("component {0} is not registered")]
    NotFound(Handle),
}

#[derive(Default)]
struct RegistryInner {
    next: u64,
    components: HashMap<Handle, Arc<dyn Component>>,
    names: HashMap<String, Handle>,
}

/// Live components by handle and name.
///
/// Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry").field("len", &self.len()).finish()
    }
}

impl ComponentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a component and returns its handle.
    pub fn register(&self, component: Arc<dyn Component>) -> Handle {
        let Ok(mut guard) = self.inner.write() else {
            return Handle(u64::MAX);
        };
        let handle = Handle(guard.next);
        guard.next += 1;
        let name = component.name();
        log::debug!("registered {name} as {handle}");
        guard.names.insert(name, handle);
        guard.components.insert(handle, component);
        handle
    }

    /// Removes a component.
    pub fn deregister(&self, handle: Handle) -> Result<(), RegistryError> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| RegistryError::NotFound(handle))?;
        let component = guard
            .components
            .remove(&handle)
            .ok_or(RegistryError::NotFound(handle))?;
        guard.names.remove(&component.name());
        log::debug!("deregistered {} ({handle})", component.name());
        Ok(())
    }

    /// A registered component.
    pub fn get(&self, handle: Handle) -> Option<Arc<dyn Component>> {
        self.inner
            .read()
            .ok()
            .and_then(|g| g.components.get(&handle).cloned())
    }

    /// A registered component as its concrete type.
    pub fn downcast<T: Component + Clone>(&self, handle: Handle) -> Option<T> {
        self.get(handle)
            .and_then(|component| component.as_any().downcast_ref::<T>().cloned())
    }

    /// Handle of a component by name.
    pub fn find(&self, name: &str) -> Option<Handle> {
        self.inner.read().ok().and_then(|g| g.names.get(name).copied())
    }

    /// Handles of every component of a kind, in registration order.
    pub fn handles(&self, kind: ComponentKind) -> Vec<Handle> {
        let mut handles: Vec<Handle> = self
            .inner
            .read()
            .map(|g| {
                g.components
                    .iter()
                    .filter(|(_, c)| c.kind() == kind)
                    .map(|(h, _)| *h)
                    .collect()
            })
            .unwrap_or_default();
        handles.sort();
        handles
    }

    /// Number of registered components.
    pub fn len(&self) -> usize {
        self.inner.read().map(|g| g.components.len()).unwrap_or(0)
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Marker(&'static str);

    impl Component for Marker {
        fn kind(&self) -> ComponentKind {
            ComponentKind::List
        }

        fn name(&self) -> String {
            self.0.to_string()
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_register_find_deregister() {
        let registry = ComponentRegistry::new();
        let handle = registry.register(Arc::new(Marker("a")));
        assert_eq!(registry.find("a"), Some(handle));
        assert_eq!(registry.downcast::<Marker>(handle).map(|p| p.0), Some("a"));
        assert_eq!(registry.handles(ComponentKind::List), [handle]);

        registry.deregister(handle).unwrap();
        assert!(registry.is_empty());
        assert_eq!(registry.find("a"), None);
        assert_eq!(registry.deregister(handle), Err(RegistryError::NotFound(handle)));
    }
}
