//! Routable pages. Each module pairs a `View`, which loads data and mounts,
//! with the `Component` it mounts.

pub mod admin;
pub mod adviser;
pub mod auth;
pub mod common;
pub mod dashboard;
pub mod favorites;
pub mod flora;
pub mod forts;
pub mod home;
pub mod map;

pub use admin::AdminView;
pub use adviser::AdviserView;
pub use auth::AuthView;
pub use dashboard::DashboardView;
pub use favorites::FavoritesView;
pub use flora::FloraView;
pub use forts::FortsView;
pub use home::HomeView;
pub use map::MapView;

#[cfg(test)]
pub(crate) mod testing {
    use crate::preferences::LocalStorage;
    use crate::services::completion::Adviser;
    use crate::services::gateway::Gateway;
    use crate::services::memory::MemoryGateway;
    use crate::services::store::Store;
    use crate::services::AppServices;
    use crossterm::event::{KeyCode, KeyEvent};
    use fort_nexus::{AppContext, Context, Event};
    use ratatui::layout::Rect;
    use std::future::Future;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Services over `gateway`, or offline ones. Keep the directory alive
    /// for as long as the services.
    pub fn services(gateway: Option<Arc<MemoryGateway>>) -> (AppServices, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = match gateway {
            Some(gateway) => Store::with_gateway(gateway as Arc<dyn Gateway>),
            None => Store::offline(),
        };
        let services = AppServices::new(store, Adviser::offline(), LocalStorage::in_dir(dir.path()));
        (services, dir)
    }

    pub fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::from(code))
    }

    pub fn cx<C: ?Sized + Send + Sync + 'static>() -> Context<C> {
        Context::new(AppContext::headless(), Rect::new(0, 0, 100, 40))
    }

    /// Poll `check` until it holds, failing after five seconds.
    pub async fn eventually<F, Fut>(mut check: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = bool>,
    {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !check().await {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("condition did not hold within 5s");
    }
}
