//! The page view capability and the handle a view renders through.

use super::history::History;
use super::location::Location;
use crate::application::AppContext;
use crate::component::Component;
use crate::mount::MountPoint;
use crate::state::Entity;
use async_trait::async_trait;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A routable page.
///
/// `render` fetches whatever the page needs and mounts a component through
/// the target before it returns. It may be abandoned: once a newer
/// navigation starts, further mounts through the same target are refused.
#[async_trait]
pub trait View: Send + Sync + 'static {
    async fn render(&self, target: MountTarget) -> anyhow::Result<()>;

    /// Name used in logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

#[async_trait]
impl<F, Fut> View for F
where
    F: Fn(MountTarget) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn render(&self, target: MountTarget) -> anyhow::Result<()> {
        (self)(target).await
    }
}

/// Write access to the mount point for one navigation attempt.
#[derive(Clone)]
pub struct MountTarget {
    generation: u64,
    location: Location,
    counter: Arc<AtomicU64>,
    mount: Entity<MountPoint>,
    history: History,
    app: AppContext,
}

impl MountTarget {
    pub(crate) fn new(
        generation: u64,
        location: Location,
        counter: Arc<AtomicU64>,
        mount: Entity<MountPoint>,
        history: History,
        app: AppContext,
    ) -> Self {
        Self {
            generation,
            location,
            counter,
            mount,
            history,
            app,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The location this attempt is rendering.
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// False once a newer navigation has started.
    pub fn is_current(&self) -> bool {
        self.counter.load(Ordering::SeqCst) == self.generation
    }

    /// Replace the mount point's content with `component`.
    ///
    /// Returns `Ok(false)` without touching the mount point when this attempt
    /// has been superseded; the component is dropped, which aborts anything
    /// it tracked.
    pub fn mount<C: Component>(&self, component: C) -> crate::Result<bool> {
        let mounted = self.mount.update(|point| {
            if !self.is_current() {
                return false;
            }
            point.replace(
                self.location.clone(),
                self.generation,
                Box::new(component),
                &self.app,
            );
            true
        })?;

        if mounted {
            self.app.refresh();
        } else {
            tracing::debug!(
                generation = self.generation,
                location = %self.location,
                "mount refused for superseded navigation"
            );
        }
        Ok(mounted)
    }

    /// Send the user somewhere else. The new location goes through the full
    /// navigation pipeline.
    ///
    /// Returns false without pushing when this attempt has been superseded.
    pub fn redirect(&self, path: &str) -> bool {
        if !self.is_current() {
            tracing::debug!(
                generation = self.generation,
                location = %self.location,
                path,
                "redirect refused for superseded navigation"
            );
            return false;
        }
        self.history.push(path);
        true
    }

    /// The location bus, for components that navigate from background tasks.
    pub fn history(&self) -> History {
        self.history.clone()
    }

    pub fn app(&self) -> &AppContext {
        &self.app
    }
}
