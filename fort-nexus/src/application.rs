//! High‑level Application abstraction inspired by GPUI.

use crate::component::traits::{Action, AnyComponent, Component, Event};
use crate::error::{IoSnafu, TerminalSnafu};
use crate::state::Entity;
use crate::task::TaskHandle;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use snafu::ResultExt;
use std::io::{self, stdout};
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

type RootSlot = Arc<Mutex<Option<Arc<Mutex<dyn AnyComponent>>>>>;

/// Application context providing access to global services.
#[derive(Clone)]
pub struct AppContext {
    /// The root component to render, if set by the user.
    root: RootSlot,
    /// Internal: Channel to trigger a re-render.
    re_render_tx: mpsc::UnboundedSender<()>,
}

impl AppContext {
    fn with_channel(re_render_tx: mpsc::UnboundedSender<()>) -> Self {
        Self {
            root: Arc::new(Mutex::new(None)),
            re_render_tx,
        }
    }

    /// A context with no terminal behind it. Redraw requests go nowhere.
    pub fn headless() -> Self {
        let (tx, _rx) = mpsc::unbounded_channel();
        Self::with_channel(tx)
    }

    /// Spawn a task and hand back an abort handle for a `TaskTracker`.
    pub fn spawn_task<F, Fut>(&self, f: F) -> TaskHandle
    where
        F: FnOnce(AppContext) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let cx = self.clone();
        let handle = tokio::spawn(async move {
            f(cx).await;
        });
        TaskHandle::new(handle.abort_handle())
    }

    /// Set the root component of the application.
    pub fn set_root<C: Component>(&self, root: C) -> crate::Result<()> {
        let root: Arc<Mutex<dyn AnyComponent>> = Arc::new(Mutex::new(root));
        let mut guard = self.root.lock().map_err(|_| crate::Error::LockPoisoned)?;
        *guard = Some(root);
        drop(guard);
        self.refresh();
        Ok(())
    }

    /// Trigger a re-render.
    pub fn refresh(&self) {
        let _ = self.re_render_tx.send(());
    }
}

/// A specialized context passed to component methods.
pub struct Context<V: ?Sized + Send + Sync> {
    pub app: AppContext,
    pub area: Rect,
    /// Vertical scroll offset of the mount point.
    pub scroll: u16,
    view: PhantomData<fn() -> Box<V>>,
}

impl<V: ?Sized + Send + Sync> Context<V> {
    pub fn new(app: AppContext, area: Rect) -> Self {
        Self {
            app,
            area,
            scroll: 0,
            view: PhantomData,
        }
    }

    /// Access the underlying AppContext.
    pub fn app(&self) -> &AppContext {
        &self.app
    }

    /// Redraw whenever `entity` changes, until the returned task is aborted.
    pub fn subscribe<T>(&self, entity: &Entity<T>) -> TaskHandle
    where
        T: Send + Sync + 'static,
    {
        let mut rx = entity.subscribe();
        self.app.spawn_task(move |app| async move {
            while rx.changed().await.is_ok() {
                app.refresh();
            }
        })
    }

    /// Spawn a task bound to this component's lifetime via the returned handle.
    pub fn spawn_task<F, Fut>(&self, f: F) -> TaskHandle
    where
        F: FnOnce(AppContext) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        self.app.spawn_task(f)
    }

    /// Cast this context to another view type.
    pub fn cast<U: ?Sized + Send + Sync + 'static>(&self) -> Context<U> {
        Context {
            app: self.app.clone(),
            area: self.area,
            scroll: self.scroll,
            view: PhantomData,
        }
    }

    /// Same context, drawing into a different area.
    pub fn with_area(&self, area: Rect) -> Self {
        Self {
            app: self.app.clone(),
            area,
            scroll: self.scroll,
            view: PhantomData,
        }
    }

    /// Explicitly trigger a re-render.
    pub fn notify(&self) {
        self.app.refresh();
    }
}

/// EventContext for event handling, currently identical to Context but renamed for clarity.
pub type EventContext<V> = Context<V>;

/// Main application handle.
#[derive(Default)]
pub struct Application;

impl Application {
    /// Create a new application instance.
    pub fn new() -> Self {
        Self
    }

    /// Run the application with the given closure that receives a context.
    ///
    /// The closure runs inside the tokio runtime, so it may spawn tasks.
    pub fn run<F>(self, setup: F) -> anyhow::Result<()>
    where
        F: FnOnce(&AppContext) -> anyhow::Result<()>,
    {
        let rt = Runtime::new().map_err(|e| anyhow::anyhow!("Failed to start tokio: {}", e))?;

        let (re_render_tx, re_render_rx) = mpsc::unbounded_channel();
        let app_context = AppContext::with_channel(re_render_tx);

        let guard = rt.enter();
        setup(&app_context)?;
        drop(guard);

        let actual_root = {
            let guard = app_context
                .root
                .lock()
                .map_err(|_| anyhow::anyhow!("Root mutex poisoned"))?;
            guard
                .clone()
                .unwrap_or_else(|| Arc::new(Mutex::new(DummyView)) as Arc<Mutex<dyn AnyComponent>>)
        };

        rt.block_on(async move { self.run_loop(app_context, actual_root, re_render_rx).await })?;
        Ok(())
    }

    async fn run_loop(
        &self,
        app: AppContext,
        root: Arc<Mutex<dyn AnyComponent>>,
        re_render_rx: mpsc::UnboundedReceiver<()>,
    ) -> crate::Result<()> {
        enable_raw_mode().context(TerminalSnafu)?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture, event::EnableFocusChange)
            .context(TerminalSnafu)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context(TerminalSnafu)?;

        {
            let size = terminal.size().context(TerminalSnafu)?;
            let area = Rect::new(0, 0, size.width, size.height);
            let mut guard = root.lock().map_err(|_| crate::Error::LockPoisoned)?;
            let mut cx = Context::<dyn AnyComponent>::new(app.clone(), area);
            guard.on_mount_any(&mut cx);
        }

        let result = self.run_app_loop(app, &mut terminal, root, re_render_rx).await;

        disable_raw_mode().context(TerminalSnafu)?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            event::DisableFocusChange
        )
        .context(TerminalSnafu)?;
        terminal.show_cursor().context(TerminalSnafu)?;

        result
    }

    async fn run_app_loop(
        &self,
        app: AppContext,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        root: Arc<Mutex<dyn AnyComponent>>,
        mut re_render_rx: mpsc::UnboundedReceiver<()>,
    ) -> crate::Result<()> {
        // Initial render
        app.refresh();

        loop {
            tokio::select! {
                _ = re_render_rx.recv() => {
                    // Coalesce queued redraw requests into one frame.
                    while re_render_rx.try_recv().is_ok() {}
                    let mut guard = root.lock().map_err(|_| crate::Error::LockPoisoned)?;
                    terminal.draw(|frame| {
                        let mut cx = Context::<dyn AnyComponent>::new(app.clone(), frame.area());
                        guard.render_any(frame, &mut cx);
                    }).context(TerminalSnafu)?;
                }
                event_ready = async { event::poll(Duration::from_millis(100)) } => {
                    if !event_ready.context(IoSnafu)? {
                        continue;
                    }
                    let internal_event = match event::read().context(IoSnafu)? {
                        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
                        CrosstermEvent::Mouse(mouse) => Some(Event::Mouse(mouse)),
                        CrosstermEvent::Resize(w, h) => Some(Event::Resize(w, h)),
                        CrosstermEvent::FocusGained => Some(Event::FocusGained),
                        CrosstermEvent::FocusLost => Some(Event::FocusLost),
                        CrosstermEvent::Paste(s) => Some(Event::Paste(s)),
                        _ => None,
                    };

                    if let Some(event) = internal_event {
                        let size = terminal.size().context(TerminalSnafu)?;
                        let area = Rect::new(0, 0, size.width, size.height);
                        let mut cx = EventContext::<dyn AnyComponent>::new(app.clone(), area);

                        let mut guard = root.lock().map_err(|_| crate::Error::LockPoisoned)?;
                        let action = guard.handle_event_any(event, &mut cx);
                        app.refresh();

                        if let Some(Action::Quit) = action {
                            guard.on_shutdown_any(&mut cx);
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}

struct DummyView;

impl Component for DummyView {
    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context<Self>) {
        let paragraph = ratatui::widgets::Paragraph::new("No component set")
            .alignment(ratatui::layout::Alignment::Center);
        frame.render_widget(paragraph, cx.area);
    }
}
