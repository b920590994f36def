//! Shared, observable state.
//!
//! `Entity<T>` is the one way components and background tasks share mutable
//! data. Every `update` bumps a watch channel so the shell can redraw.

use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};
use tokio::sync::watch;

/// Global counter for generating unique entity IDs.
static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);

/// A unique identifier for an entity across the application lifetime.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(NonZeroU64);

impl EntityId {
    fn next() -> Self {
        let id = NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed);
        // Starts at 1 and only increments.
        Self(NonZeroU64::new(id).unwrap_or_else(|| {
            panic!("EntityId overflow: created more than 2^64-1 entities")
        }))
    }
}

impl std::fmt::Debug for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shared state wrapper with RwLock for concurrent access.
pub type SharedState<T> = Arc<RwLock<T>>;

/// Entity handle, inspired by GPUI.
/// Each entity has a unique ID and can be subscribed to for change notifications.
pub struct Entity<T: ?Sized + Send + Sync> {
    id: EntityId,
    pub(crate) inner: SharedState<T>,
    tx: watch::Sender<()>,
}

/// A weak handle to an entity.
pub struct WeakEntity<T: ?Sized + Send + Sync> {
    id: EntityId,
    pub(crate) inner: Weak<RwLock<T>>,
    tx: watch::Sender<()>,
}

impl<T: ?Sized + Send + Sync> Entity<T> {
    /// Get the unique ID of this entity.
    pub fn entity_id(&self) -> EntityId {
        self.id
    }

    /// Update the inner value using a closure and notify subscribers.
    pub fn update<F, R>(&self, f: F) -> crate::Result<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let res = self.update_silently(f)?;
        let _ = self.tx.send(());
        Ok(res)
    }

    /// Mutate the inner value without notifying subscribers.
    ///
    /// Used while drawing: a draw that notified would schedule another draw.
    pub fn update_silently<F, R>(&self, f: F) -> crate::Result<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let mut guard = self.inner.write().map_err(|_| crate::Error::LockPoisoned)?;
        Ok(f(&mut *guard))
    }

    /// Read the inner value using a closure.
    pub fn read<F, R>(&self, f: F) -> crate::Result<R>
    where
        F: FnOnce(&T) -> R,
    {
        let guard = self.inner.read().map_err(|_| crate::Error::LockPoisoned)?;
        Ok(f(&*guard))
    }

    /// Downgrade this entity to a weak handle.
    pub fn downgrade(&self) -> WeakEntity<T> {
        WeakEntity {
            id: self.id,
            inner: Arc::downgrade(&self.inner),
            tx: watch::Sender::clone(&self.tx),
        }
    }

    /// Subscribe to changes of this entity.
    pub fn subscribe(&self) -> watch::Receiver<()> {
        self.tx.subscribe()
    }
}

impl<T: ?Sized + Send + Sync> WeakEntity<T> {
    /// Get the unique ID of this entity.
    pub fn entity_id(&self) -> EntityId {
        self.id
    }

    /// Upgrade this weak handle to a strong handle, if the entity is still alive.
    pub fn upgrade(&self) -> Option<Entity<T>> {
        self.inner.upgrade().map(|inner| Entity {
            id: self.id,
            inner,
            tx: watch::Sender::clone(&self.tx),
        })
    }

    /// Update the entity if it is still alive.
    pub fn update<F, R>(&self, f: F) -> Option<crate::Result<R>>
    where
        F: FnOnce(&mut T) -> R,
    {
        self.upgrade().map(|entity| entity.update(f))
    }
}

impl<T: ?Sized + Send + Sync> Clone for Entity<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Arc::clone(&self.inner),
            tx: watch::Sender::clone(&self.tx),
        }
    }
}

impl<T: ?Sized + Send + Sync> Clone for WeakEntity<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Weak::clone(&self.inner),
            tx: watch::Sender::clone(&self.tx),
        }
    }
}

impl<T: Send + Sync> Entity<T> {
    /// Create a new entity with the given initial value.
    pub fn new(value: T) -> Self {
        let (tx, _) = watch::channel(());
        Self {
            id: EntityId::next(),
            inner: Arc::new(RwLock::new(value)),
            tx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_ids_are_unique() {
        let a = Entity::new(1);
        let b = Entity::new(1);
        assert_ne!(a.entity_id(), b.entity_id());
        assert_eq!(a.clone().entity_id(), a.entity_id());
    }

    #[tokio::test]
    async fn test_update_notifies_subscribers() {
        let entity = Entity::new(0);
        let mut rx = entity.subscribe();

        entity.update(|v| *v += 1).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(entity.read(|v| *v).unwrap(), 1);
    }

    #[test]
    fn test_update_silently_skips_notification() {
        let entity = Entity::new(0);
        let rx = entity.subscribe();

        entity.update_silently(|v| *v = 5).unwrap();
        assert!(!rx.has_changed().unwrap());
        assert_eq!(entity.read(|v| *v).unwrap(), 5);
    }

    #[test]
    fn test_weak_entity_upgrade() {
        let entity = Entity::new(String::from("raigad"));
        let weak = entity.downgrade();
        assert!(weak.update(|s| s.push('!')).is_some());
        assert_eq!(entity.read(|s| s.clone()).unwrap(), "raigad!");

        drop(entity);
        assert!(weak.upgrade().is_none());
    }
}
