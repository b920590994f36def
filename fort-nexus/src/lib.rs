//! A small reactive terminal framework with a generation-guarded router.
//!
//! Pages are async `View`s registered per location. The `Navigator` turns
//! location changes into renders and guarantees that only the newest
//! navigation ever writes to the single `MountPoint`.

pub mod application;
pub mod component;
pub mod error;
pub mod mount;
pub mod router;
pub mod state;
pub mod task;

pub use error::{Error, Result};

// Re-export common types for convenience
pub use application::{AppContext, Application, Context, EventContext};
pub use component::{Action, AnyComponent, Component, Event};
pub use mount::{MountPoint, NavLink};
pub use router::{History, Location, MountTarget, Navigator, Outcome, Settlement, View, ViewRegistry};
pub use state::{Entity, EntityId, WeakEntity};
pub use task::{TaskHandle, TaskTracker};

