//! Routing: locations, the location bus, the route table, and the
//! generation-guarded navigator.

pub mod history;
pub mod location;
pub mod navigator;
pub mod registry;
pub mod view;

pub use history::History;
pub use location::Location;
pub use navigator::{Navigator, Outcome, Settlement};
pub use registry::{RegistryBuilder, ViewRegistry};
pub use view::{MountTarget, View};
