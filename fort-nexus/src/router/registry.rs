//! The route table.

use super::location::Location;
use super::view::View;
use crate::error::{DuplicateRouteSnafu, EmptyRegistrySnafu, MissingDefaultRouteSnafu};
use snafu::{ensure, OptionExt};
use std::collections::HashMap;
use std::sync::Arc;

/// Collects routes at startup.
#[derive(Default)]
pub struct RegistryBuilder {
    entries: Vec<(Location, Arc<dyn View>)>,
}

impl RegistryBuilder {
    pub fn register(mut self, path: &str, view: impl View) -> Self {
        self.entries.push((Location::parse(path), Arc::new(view)));
        self
    }

    /// Freeze the table. Fails if it is empty, has no `/` entry, or repeats
    /// a path.
    pub fn build(self) -> crate::Result<ViewRegistry> {
        ensure!(!self.entries.is_empty(), EmptyRegistrySnafu);

        let mut index = HashMap::with_capacity(self.entries.len());
        for (position, (location, _)) in self.entries.iter().enumerate() {
            let previous = index.insert(location.clone(), position);
            ensure!(
                previous.is_none(),
                DuplicateRouteSnafu {
                    path: location.to_string()
                }
            );
        }

        let fallback = index
            .get(&Location::root())
            .copied()
            .context(MissingDefaultRouteSnafu)?;

        Ok(ViewRegistry {
            entries: self.entries,
            index,
            fallback,
        })
    }
}

/// Immutable mapping from location to view.
pub struct ViewRegistry {
    entries: Vec<(Location, Arc<dyn View>)>,
    index: HashMap<Location, usize>,
    fallback: usize,
}

impl ViewRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Exact match, else the `/` view.
    pub fn resolve(&self, location: &Location) -> &Arc<dyn View> {
        let position = self.index.get(location).copied().unwrap_or(self.fallback);
        &self.entries[position].1
    }

    /// Whether `location` has its own entry.
    pub fn contains(&self, location: &Location) -> bool {
        self.index.contains_key(location)
    }

    /// Registered locations, in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &Location> {
        self.entries.iter().map(|(location, _)| location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::view::MountTarget;

    async fn noop(_target: MountTarget) -> anyhow::Result<()> {
        Ok(())
    }

    async fn other(_target: MountTarget) -> anyhow::Result<()> {
        Ok(())
    }

    #[test]
    fn test_unknown_paths_fall_back_to_root() {
        let registry = ViewRegistry::builder()
            .register("/", noop)
            .register("/forts", other)
            .build()
            .unwrap();

        let root = registry.resolve(&Location::root());
        for path in ["/nowhere", "/forts/12", "#/FORTS", ""] {
            let resolved = registry.resolve(&Location::parse(path));
            assert!(Arc::ptr_eq(resolved, root), "{path} should fall back");
        }
        assert!(!Arc::ptr_eq(registry.resolve(&Location::parse("#/forts")), root));
    }

    #[test]
    fn test_empty_registry_is_rejected() {
        let err = ViewRegistry::builder().build().err().unwrap();
        assert!(matches!(err, crate::Error::EmptyRegistry));
    }

    #[test]
    fn test_missing_root_is_rejected() {
        let err = ViewRegistry::builder().register("/forts", noop).build().err().unwrap();
        assert!(matches!(err, crate::Error::MissingDefaultRoute));
    }

    #[test]
    fn test_duplicate_route_is_rejected() {
        let err = ViewRegistry::builder()
            .register("/", noop)
            .register("/map", noop)
            .register("#/map", other)
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, crate::Error::DuplicateRoute { ref path } if path == "/map"));
    }

    #[test]
    fn test_routes_keep_registration_order() {
        let registry = ViewRegistry::builder()
            .register("/", noop)
            .register("/flora", noop)
            .register("/adviser", noop)
            .build()
            .unwrap();
        let routes: Vec<_> = registry.routes().map(Location::as_str).collect();
        assert_eq!(routes, ["/", "/flora", "/adviser"]);
        assert!(registry.contains(&Location::parse("flora")));
    }
}
