//! The location bus.
//!
//! `History` plays the part of the address bar: it owns the current
//! location and a back stack, and signals every subscriber each time the
//! location is set. Setting the location to its current value still signals,
//! so the active view can re-run.

use super::location::Location;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

#[derive(Debug, Default)]
struct HistoryState {
    current: Location,
    back: Vec<Location>,
    listeners: Vec<mpsc::UnboundedSender<Location>>,
}

impl HistoryState {
    fn notify(&mut self) {
        let current = self.current.clone();
        self.listeners.retain(|tx| tx.send(current.clone()).is_ok());
    }
}

/// Shared handle to the current location. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct History {
    inner: Arc<Mutex<HistoryState>>,
}

impl History {
    /// Create a history positioned at `initial`.
    pub fn new(initial: impl Into<Location>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HistoryState {
                current: initial.into(),
                ..HistoryState::default()
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, HistoryState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get the current location.
    pub fn current(&self) -> Location {
        self.state().current.clone()
    }

    /// Set the location and signal subscribers.
    ///
    /// The previous location is pushed to the back stack unless it is the
    /// same path.
    pub fn push(&self, location: impl Into<Location>) {
        let location = location.into();
        let mut state = self.state();
        if state.current != location {
            let previous = std::mem::replace(&mut state.current, location);
            state.back.push(previous);
        }
        state.notify();
    }

    /// Go back to the previous location. Returns true if there was one.
    pub fn back(&self) -> bool {
        let mut state = self.state();
        match state.back.pop() {
            Some(previous) => {
                state.current = previous;
                state.notify();
                true
            }
            None => false,
        }
    }

    pub fn can_go_back(&self) -> bool {
        !self.state().back.is_empty()
    }

    /// Get the back stack length.
    pub fn depth(&self) -> usize {
        self.state().back.len()
    }

    /// Receive every location change from now on.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<Location> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state().listeners.push(tx);
        rx
    }
}
