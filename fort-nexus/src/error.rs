use snafu::prelude::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Failed to lock entity: poisoned"))]
    LockPoisoned,

    #[snafu(display("Terminal error: {source}"))]
    Terminal { source: std::io::Error },

    #[snafu(display("IO error: {source}"))]
    Io { source: std::io::Error },

    #[snafu(display("View registry is empty"))]
    EmptyRegistry,

    #[snafu(display("View registry has no entry for \"/\""))]
    MissingDefaultRoute,

    #[snafu(display("Route {path} registered twice"))]
    DuplicateRoute { path: String },
}

pub type Result<T> = std::result::Result<T, Error>;
