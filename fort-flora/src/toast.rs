//! Transient notifications drawn over the current page.
//!
//! Showing a toast replaces the visible one. Each toast hides itself after
//! [`TOAST_DURATION`] unless a newer toast took its place first.

use fort_nexus::Entity;
use std::time::Duration;

pub const TOAST_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    seq: u64,
}

#[derive(Debug, Default)]
struct ToastState {
    visible: Option<Toast>,
    seq: u64,
}

/// Handle to the toast overlay. Cheap to clone.
#[derive(Clone)]
pub struct Toasts {
    state: Entity<ToastState>,
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new()
    }
}

impl Toasts {
    pub fn new() -> Self {
        Self {
            state: Entity::new(ToastState::default()),
        }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(message.into(), ToastKind::Success);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.show(message.into(), ToastKind::Error);
    }

    /// Must be called inside a tokio runtime; the hide timer is a task.
    pub fn show(&self, message: String, kind: ToastKind) {
        tracing::debug!(?kind, %message, "toast");
        let seq = self
            .state
            .update(|state| {
                state.seq += 1;
                state.visible = Some(Toast {
                    message,
                    kind,
                    seq: state.seq,
                });
                state.seq
            })
            .unwrap_or(0);

        let deadline = tokio::time::Instant::now() + TOAST_DURATION;
        let state = self.state.clone();
        tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let _ = state.update(|state| {
                if state.visible.as_ref().is_some_and(|toast| toast.seq == seq) {
                    state.visible = None;
                }
            });
        });
    }

    pub fn dismiss(&self) -> bool {
        self.state
            .update(|state| state.visible.take().is_some())
            .unwrap_or(false)
    }

    pub fn current(&self) -> Option<Toast> {
        self.state.read(|state| state.visible.clone()).ok().flatten()
    }

    /// Redraw hook for the shell.
    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<()> {
        self.state.subscribe()
    }
}
