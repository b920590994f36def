//! External services and the handles pages use to reach them.

pub mod completion;
pub mod gateway;
pub mod memory;
pub mod store;
pub mod supabase;

use crate::config::Config;
use crate::model::Theme;
use crate::preferences::LocalStorage;
use crate::toast::Toasts;
use completion::{Adviser, Completion, GroqCompletion};
use fort_nexus::Entity;
use gateway::Gateway;
use std::sync::Arc;
use store::Store;
use supabase::SupabaseGateway;

/// An optional service. `Absent` when its credentials are not configured.
pub enum Service<T: ?Sized> {
    Configured(Arc<T>),
    Absent,
}

impl<T: ?Sized> Service<T> {
    pub fn get(&self) -> Option<&Arc<T>> {
        match self {
            Service::Configured(service) => Some(service),
            Service::Absent => None,
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Service::Configured(_))
    }
}

impl<T: ?Sized> Clone for Service<T> {
    fn clone(&self) -> Self {
        match self {
            Service::Configured(service) => Service::Configured(Arc::clone(service)),
            Service::Absent => Service::Absent,
        }
    }
}

/// Everything a page may need, shared by every view.
#[derive(Clone)]
pub struct AppServices {
    pub store: Store,
    pub adviser: Adviser,
    pub toasts: Toasts,
    pub theme: Entity<Theme>,
    pub storage: LocalStorage,
}

impl AppServices {
    /// Wire the hosted services named by `config`.
    pub fn from_config(config: &Config) -> Self {
        let gateway = match &config.supabase {
            Some(supabase) => Service::Configured(Arc::new(SupabaseGateway::new(supabase)) as Arc<dyn Gateway>),
            None => {
                tracing::info!("gateway not configured, running on seed data");
                Service::Absent
            }
        };
        let completion = match &config.groq {
            Some(groq) => Service::Configured(Arc::new(GroqCompletion::new(groq)) as Arc<dyn Completion>),
            None => Service::Absent,
        };
        let storage = LocalStorage::in_dir(&config.state_dir);
        Self::new(Store::new(gateway), Adviser::new(completion), storage)
    }

    pub fn new(store: Store, adviser: Adviser, storage: LocalStorage) -> Self {
        let theme = storage.theme();
        Self {
            store,
            adviser,
            toasts: Toasts::new(),
            theme: Entity::new(theme),
            storage,
        }
    }

    pub fn current_theme(&self) -> Theme {
        self.theme.read(|theme| *theme).unwrap_or_default()
    }

    /// Flip the theme and persist the choice.
    pub fn toggle_theme(&self) -> Theme {
        let next = self
            .theme
            .update(|theme| {
                *theme = theme.toggle();
                *theme
            })
            .unwrap_or_default();
        if let Err(err) = self.storage.set_theme(next) {
            tracing::warn!(error = %err, "could not persist theme");
        }
        next
    }
}
