//! Forts and flora of Maharashtra, in the terminal.
//!
//! [`app::Shell`] is the root component. Pages live in [`pages`] and are
//! registered per location with the `fort_nexus` router.

pub mod app;
pub mod config;
pub mod logging;
pub mod model;
pub mod pages;
pub mod preferences;
pub mod seed;
pub mod services;
pub mod toast;
