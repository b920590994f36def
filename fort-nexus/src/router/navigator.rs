//! Turns location changes into committed page renders.
//!
//! Every navigation attempt takes the next generation number before any
//! asynchronous work starts. When its view finishes rendering, the attempt
//! commits only if no newer attempt has started in the meantime; otherwise
//! its result is dropped without touching the mount point. Slow views can
//! therefore never overwrite a newer page.

use super::history::History;
use super::location::Location;
use super::registry::ViewRegistry;
use super::view::{MountTarget, View};
use crate::application::AppContext;
use crate::mount::{MountPoint, NavLink};
use crate::state::Entity;
use crate::task::TaskHandle;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

const SETTLEMENT_BUFFER: usize = 64;

/// How a navigation attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The view rendered and no newer navigation had started.
    Committed,
    /// A newer navigation started first; the result was ignored.
    Superseded,
    /// The view returned an error or panicked while still current.
    Failed(String),
}

/// A navigation attempt that has not settled yet.
#[derive(Debug)]
struct Attempt {
    generation: u64,
    location: Location,
}

impl Attempt {
    /// Consumes the pending attempt; a settled attempt cannot change again.
    fn settle(self, outcome: Outcome) -> Settlement {
        Settlement {
            generation: self.generation,
            location: self.location,
            outcome,
        }
    }
}

/// The terminal state of one navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub generation: u64,
    pub location: Location,
    pub outcome: Outcome,
}

impl Settlement {
    pub fn is_committed(&self) -> bool {
        self.outcome == Outcome::Committed
    }
}

struct Inner {
    registry: ViewRegistry,
    history: History,
    mount: Entity<MountPoint>,
    generation: Arc<AtomicU64>,
    app: AppContext,
    settled_tx: broadcast::Sender<Settlement>,
}

/// The router core. Cheap to clone; clones drive the same state.
#[derive(Clone)]
pub struct Navigator {
    inner: Arc<Inner>,
}

impl Navigator {
    pub fn new(registry: ViewRegistry, history: History, links: Vec<NavLink>, app: AppContext) -> Self {
        let (settled_tx, _) = broadcast::channel(SETTLEMENT_BUFFER);
        Self {
            inner: Arc::new(Inner {
                registry,
                history,
                mount: Entity::new(MountPoint::new(links)),
                generation: Arc::new(AtomicU64::new(0)),
                app,
                settled_tx,
            }),
        }
    }

    /// Listen for location changes and render the current location once.
    ///
    /// Call exactly once: every call registers another listener, and each
    /// listener runs the full pipeline for every change.
    pub fn start(&self) -> TaskHandle {
        let mut changes = self.inner.history.subscribe();
        let navigator = self.clone();
        let listener = tokio::spawn(async move {
            while let Some(location) = changes.recv().await {
                debug!(%location, "location changed");
                navigator.navigate();
            }
        });
        self.navigate();
        TaskHandle::new(listener.abort_handle())
    }

    /// Change the current location. Listeners started by `start` pick it up.
    pub fn navigate_to(&self, path: &str) {
        self.inner.history.push(path);
    }

    /// Go back one entry. Returns false when there is nothing to go back to.
    pub fn back(&self) -> bool {
        self.inner.history.back()
    }

    /// Run the pipeline once for the current location.
    pub fn navigate(&self) -> JoinHandle<Settlement> {
        let location = self.inner.history.current();
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let view = Arc::clone(self.inner.registry.resolve(&location));
        let attempt = Attempt {
            generation,
            location,
        };
        debug!(
            generation,
            location = %attempt.location,
            view = view.name(),
            "navigation started"
        );

        let navigator = self.clone();
        tokio::spawn(async move { navigator.run(attempt, view).await })
    }

    async fn run(&self, attempt: Attempt, view: Arc<dyn View>) -> Settlement {
        let inner = &self.inner;
        let target = MountTarget::new(
            attempt.generation,
            attempt.location.clone(),
            Arc::clone(&inner.generation),
            inner.mount.clone(),
            inner.history.clone(),
            inner.app.clone(),
        );

        // A separate task so a panicking view settles as a failure instead
        // of taking the navigation down with it.
        let rendered = match tokio::spawn(async move { view.render(target).await }).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(format!("{err:#}")),
            Err(join) if join.is_panic() => Err("view panicked".to_string()),
            Err(_) => Err("view render was cancelled".to_string()),
        };

        let generation = attempt.generation;
        let location = attempt.location.clone();
        let outcome = inner
            .mount
            .update(|point| {
                // A redirect moves history before the next attempt bumps the
                // counter, so both are checked.
                if inner.generation.load(Ordering::SeqCst) != generation
                    || inner.history.current() != location
                {
                    return Outcome::Superseded;
                }
                match rendered {
                    Ok(()) if point.mounted_generation() == Some(generation) => {
                        point.commit(generation, &location);
                        Outcome::Committed
                    }
                    Ok(()) => Outcome::Failed("view returned without mounting anything".to_string()),
                    Err(reason) => Outcome::Failed(reason),
                }
            })
            .unwrap_or_else(|err| Outcome::Failed(err.to_string()));

        match &outcome {
            Outcome::Committed => {
                info!(generation, location = %location, "navigation committed");
                inner.app.refresh();
            }
            Outcome::Superseded => {
                debug!(generation, location = %location, "navigation superseded");
            }
            Outcome::Failed(reason) => {
                error!(generation, location = %location, %reason, "view failed to render");
            }
        }

        let settlement = attempt.settle(outcome);
        let _ = inner.settled_tx.send(settlement.clone());
        settlement
    }

    /// Every settlement from now on.
    pub fn settlements(&self) -> broadcast::Receiver<Settlement> {
        self.inner.settled_tx.subscribe()
    }

    /// The mount point, for drawing.
    pub fn mount(&self) -> Entity<MountPoint> {
        self.inner.mount.clone()
    }

    pub fn history(&self) -> History {
        self.inner.history.clone()
    }

    pub fn current_location(&self) -> Location {
        self.inner.history.current()
    }

    /// The latest generation handed out.
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    pub fn registry(&self) -> &ViewRegistry {
        &self.inner.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::Context;
    use crate::component::Component;
    use crate::task::TaskTracker;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tokio::sync::Semaphore;

    /// Decrements the live count when the owning task is dropped.
    struct LiveGuard(Arc<AtomicUsize>);

    impl Drop for LiveGuard {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// A mounted page that keeps one "listener" task alive while mounted.
    struct Page {
        name: &'static str,
        live: Arc<AtomicUsize>,
        tasks: TaskTracker,
    }

    impl Page {
        fn new(name: &'static str, live: &Arc<AtomicUsize>) -> Self {
            Self {
                name,
                live: Arc::clone(live),
                tasks: TaskTracker::new(),
            }
        }
    }

    impl Component for Page {
        fn on_mount(&mut self, cx: &mut Context<Self>) {
            self.live.fetch_add(1, Ordering::SeqCst);
            let guard = LiveGuard(Arc::clone(&self.live));
            self.tasks.track(cx.spawn_task(move |_| async move {
                let _guard = guard;
                std::future::pending::<()>().await;
            }));
        }

        fn on_exit(&mut self, _cx: &mut Context<Self>) {
            self.tasks.abort_all();
        }

        fn render(&mut self, _frame: &mut ratatui::Frame, _cx: &mut Context<Self>) {}
    }

    /// Mounts a loading page, waits for the gate, then mounts the real page.
    struct GatedView {
        name: &'static str,
        gate: Arc<Semaphore>,
        calls: Arc<AtomicUsize>,
        live: Arc<AtomicUsize>,
    }

    impl GatedView {
        fn new(name: &'static str, live: &Arc<AtomicUsize>) -> Self {
            Self {
                name,
                gate: Arc::new(Semaphore::new(0)),
                calls: Arc::new(AtomicUsize::new(0)),
                live: Arc::clone(live),
            }
        }

        fn handles(&self) -> (Arc<Semaphore>, Arc<AtomicUsize>) {
            (Arc::clone(&self.gate), Arc::clone(&self.calls))
        }
    }

    #[async_trait]
    impl View for GatedView {
        async fn render(&self, target: MountTarget) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            target.mount(Page::new("loading", &self.live))?;
            self.gate.acquire().await?.forget();
            target.mount(Page::new(self.name, &self.live))?;
            Ok(())
        }
    }

    /// Mounts immediately and counts calls.
    struct InstantView {
        name: &'static str,
        calls: Arc<AtomicUsize>,
        live: Arc<AtomicUsize>,
    }

    impl InstantView {
        fn new(name: &'static str, live: &Arc<AtomicUsize>) -> Self {
            Self {
                name,
                calls: Arc::new(AtomicUsize::new(0)),
                live: Arc::clone(live),
            }
        }
    }

    #[async_trait]
    impl View for InstantView {
        async fn render(&self, target: MountTarget) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            target.mount(Page::new(self.name, &self.live))?;
            Ok(())
        }
    }

    async fn exploding_view(_target: MountTarget) -> anyhow::Result<()> {
        anyhow::bail!("gateway exploded")
    }

    async fn panicking_view(_target: MountTarget) -> anyhow::Result<()> {
        panic!("tile server on fire")
    }

    async fn redirect_to_auth(target: MountTarget) -> anyhow::Result<()> {
        target.redirect("/auth");
        Ok(())
    }

    async fn mounts_nothing(_target: MountTarget) -> anyhow::Result<()> {
        Ok(())
    }

    /// Mounts a loading page, then redirects to `/auth` once the gate opens.
    struct SlowGuardView {
        gate: Arc<Semaphore>,
        calls: Arc<AtomicUsize>,
        redirected: Arc<Semaphore>,
        live: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl View for SlowGuardView {
        async fn render(&self, target: MountTarget) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            target.mount(Page::new("checking", &self.live))?;
            self.gate.acquire().await?.forget();
            if target.redirect("/auth") {
                self.redirected.add_permits(1);
            }
            Ok(())
        }
    }

    fn links() -> Vec<NavLink> {
        vec![
            NavLink::new("/", "Home"),
            NavLink::new("/forts", "Forts"),
            NavLink::new("/flora", "Flora"),
            NavLink::new("/auth", "Account"),
        ]
    }

    fn navigator(registry: ViewRegistry, initial: &str) -> Navigator {
        Navigator::new(registry, History::new(initial), links(), AppContext::headless())
    }

    fn mounted_name(navigator: &Navigator) -> Option<&'static str> {
        navigator
            .mount()
            .read(|point| point.component::<Page>().map(|page| page.name))
            .unwrap()
    }

    async fn next_settlement(rx: &mut broadcast::Receiver<Settlement>) -> Settlement {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("no settlement within 5s")
            .unwrap()
    }

    async fn wait_for_calls(calls: &AtomicUsize, at_least: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while calls.load(Ordering::SeqCst) < at_least {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("view was never rendered");
    }

    #[tokio::test]
    async fn test_start_renders_current_location() {
        let live = Arc::new(AtomicUsize::new(0));
        let registry = ViewRegistry::builder()
            .register("/", InstantView::new("home", &live))
            .register("/forts", InstantView::new("forts", &live))
            .build()
            .unwrap();
        let navigator = navigator(registry, "#/forts");
        let mut settled = navigator.settlements();

        let _listener = navigator.start();
        let settlement = next_settlement(&mut settled).await;

        assert_eq!(settlement.generation, 1);
        assert_eq!(settlement.location, "/forts");
        assert!(settlement.is_committed());
        assert_eq!(mounted_name(&navigator), Some("forts"));
    }

    #[tokio::test]
    async fn test_later_navigation_wins_when_earlier_resolves_last() {
        let live = Arc::new(AtomicUsize::new(0));
        let forts = GatedView::new("forts", &live);
        let flora = GatedView::new("flora", &live);
        let (forts_gate, forts_calls) = forts.handles();
        let (flora_gate, flora_calls) = flora.handles();
        let registry = ViewRegistry::builder()
            .register("/", InstantView::new("home", &live))
            .register("/forts", forts)
            .register("/flora", flora)
            .build()
            .unwrap();
        let navigator = navigator(registry, "/");
        let mut settled = navigator.settlements();
        let _listener = navigator.start();
        assert!(next_settlement(&mut settled).await.is_committed());

        navigator.navigate_to("/forts");
        wait_for_calls(&forts_calls, 1).await;
        navigator.navigate_to("/flora");
        wait_for_calls(&flora_calls, 1).await;

        flora_gate.add_permits(1);
        let flora_settled = next_settlement(&mut settled).await;
        assert_eq!(flora_settled.location, "/flora");
        assert!(flora_settled.is_committed());

        forts_gate.add_permits(1);
        let forts_settled = next_settlement(&mut settled).await;
        assert_eq!(forts_settled.location, "/forts");
        assert_eq!(forts_settled.outcome, Outcome::Superseded);
        assert!(forts_settled.generation < flora_settled.generation);

        assert_eq!(mounted_name(&navigator), Some("flora"));
        let route = navigator.mount().read(|p| p.route().cloned()).unwrap();
        assert_eq!(route, Some(Location::parse("/flora")));

        // Only flora's own listener is left running.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(live.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_renavigating_active_path_renders_once_more() {
        let live = Arc::new(AtomicUsize::new(0));
        let home = InstantView::new("home", &live);
        let calls = Arc::clone(&home.calls);
        let registry = ViewRegistry::builder().register("/", home).build().unwrap();
        let navigator = navigator(registry, "/");
        let mut settled = navigator.settlements();
        let _listener = navigator.start();
        next_settlement(&mut settled).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        navigator.navigate_to("/");
        let again = next_settlement(&mut settled).await;
        assert!(again.is_committed());
        assert_eq!(again.generation, 2);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(navigator.history().depth(), 0);
    }

    #[tokio::test]
    async fn test_overlapping_navigations_commit_exactly_once() {
        let live = Arc::new(AtomicUsize::new(0));
        let shared_gate = Arc::new(Semaphore::new(0));
        let mut builder = ViewRegistry::builder().register("/", InstantView::new("home", &live));
        for (path, name) in [("/forts", "forts"), ("/flora", "flora")] {
            let mut view = GatedView::new(name, &live);
            view.gate = Arc::clone(&shared_gate);
            builder = builder.register(path, view);
        }
        let navigator = navigator(builder.build().unwrap(), "/");

        let mut handles = Vec::new();
        for path in ["/forts", "/flora", "/forts", "/flora", "/forts"] {
            navigator.history().push(path);
            handles.push(navigator.navigate());
        }
        shared_gate.add_permits(handles.len());

        let mut settlements = Vec::new();
        for handle in handles {
            settlements.push(handle.await.unwrap());
        }

        let generations: Vec<u64> = settlements.iter().map(|s| s.generation).collect();
        assert!(generations.windows(2).all(|w| w[0] < w[1]));
        let committed: Vec<_> = settlements.iter().filter(|s| s.is_committed()).collect();
        assert_eq!(committed.len(), 1);
        assert_eq!(committed[0].generation, 5);
        assert_eq!(mounted_name(&navigator), Some("forts"));
    }

    #[tokio::test]
    async fn test_sequential_commits_have_increasing_generations() {
        let live = Arc::new(AtomicUsize::new(0));
        let registry = ViewRegistry::builder()
            .register("/", InstantView::new("home", &live))
            .register("/forts", InstantView::new("forts", &live))
            .build()
            .unwrap();
        let navigator = navigator(registry, "/");

        let mut committed = Vec::new();
        for path in ["/forts", "/", "/forts"] {
            navigator.navigate_to(path);
            let settlement = navigator.navigate().await.unwrap();
            assert!(settlement.is_committed());
            committed.push(navigator.mount().read(|p| p.committed().map(|(g, _)| g)).unwrap());
        }
        assert_eq!(committed, [Some(1), Some(2), Some(3)]);
    }

    #[tokio::test]
    async fn test_commit_marks_only_matching_link_and_resets_scroll() {
        let live = Arc::new(AtomicUsize::new(0));
        let registry = ViewRegistry::builder()
            .register("/", InstantView::new("home", &live))
            .register("/flora", InstantView::new("flora", &live))
            .build()
            .unwrap();
        let navigator = navigator(registry, "/");
        navigator.navigate().await.unwrap();
        navigator.mount().update(|p| p.scroll_by(40)).unwrap();

        navigator.navigate_to("/flora");
        navigator.navigate().await.unwrap();

        navigator
            .mount()
            .read(|point| {
                let active: Vec<_> = point.links().iter().filter(|l| l.active).collect();
                assert_eq!(active.len(), 1);
                assert_eq!(active[0].route, "/flora");
                assert_eq!(point.scroll(), 0);
            })
            .unwrap();
    }

    #[tokio::test]
    async fn test_failing_view_settles_without_bookkeeping() {
        let live = Arc::new(AtomicUsize::new(0));
        let registry = ViewRegistry::builder()
            .register("/", InstantView::new("home", &live))
            .register("/forts", exploding_view)
            .build()
            .unwrap();
        let navigator = navigator(registry, "/");
        navigator.navigate().await.unwrap();

        navigator.navigate_to("/forts");
        let failed = navigator.navigate().await.unwrap();
        assert!(matches!(failed.outcome, Outcome::Failed(ref reason) if reason.contains("gateway exploded")));

        let active = navigator
            .mount()
            .read(|p| p.active_link().map(|l| l.route.clone()))
            .unwrap();
        assert_eq!(active, Some(Location::root()));
        assert_eq!(mounted_name(&navigator), Some("home"));

        navigator.navigate_to("/");
        assert!(navigator.navigate().await.unwrap().is_committed());
    }

    #[tokio::test]
    async fn test_panicking_view_is_contained() {
        let live = Arc::new(AtomicUsize::new(0));
        let registry = ViewRegistry::builder()
            .register("/", InstantView::new("home", &live))
            .register("/map", panicking_view)
            .build()
            .unwrap();
        let navigator = navigator(registry, "/map");

        let settlement = navigator.navigate().await.unwrap();
        assert_eq!(settlement.outcome, Outcome::Failed("view panicked".to_string()));

        navigator.navigate_to("/");
        assert!(navigator.navigate().await.unwrap().is_committed());
    }

    #[tokio::test]
    async fn test_redirect_reenters_pipeline() {
        let live = Arc::new(AtomicUsize::new(0));
        let live_for_auth = Arc::clone(&live);
        let registry = ViewRegistry::builder()
            .register("/", InstantView::new("home", &live))
            .register("/admin", redirect_to_auth)
            .register("/auth", InstantView::new("auth", &live_for_auth))
            .build()
            .unwrap();
        let navigator = navigator(registry, "/");
        let mut settled = navigator.settlements();
        let _listener = navigator.start();
        next_settlement(&mut settled).await;

        navigator.navigate_to("/admin");
        loop {
            let settlement = next_settlement(&mut settled).await;
            if settlement.location == "/auth" {
                assert!(settlement.is_committed());
                break;
            }
        }

        assert_eq!(navigator.current_location(), "/auth");
        assert_eq!(mounted_name(&navigator), Some("auth"));
        assert!(navigator.back());
        assert_eq!(navigator.current_location(), "/admin");
    }

    #[tokio::test]
    async fn test_stale_redirect_does_not_move_history() {
        let live = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Semaphore::new(0));
        let calls = Arc::new(AtomicUsize::new(0));
        let redirected = Arc::new(Semaphore::new(0));
        let guard = SlowGuardView {
            gate: Arc::clone(&gate),
            calls: Arc::clone(&calls),
            redirected: Arc::clone(&redirected),
            live: Arc::clone(&live),
        };
        let registry = ViewRegistry::builder()
            .register("/", InstantView::new("home", &live))
            .register("/admin", guard)
            .register("/auth", InstantView::new("auth", &live))
            .register("/forts", InstantView::new("forts", &live))
            .build()
            .unwrap();
        let navigator = navigator(registry, "/");
        let mut settled = navigator.settlements();
        let _listener = navigator.start();
        next_settlement(&mut settled).await;

        navigator.navigate_to("/admin");
        wait_for_calls(&calls, 1).await;
        navigator.navigate_to("/forts");
        loop {
            let settlement = next_settlement(&mut settled).await;
            if settlement.location == "/forts" {
                assert!(settlement.is_committed());
                break;
            }
        }

        gate.add_permits(1);
        loop {
            let settlement = next_settlement(&mut settled).await;
            if settlement.location == "/admin" {
                assert_eq!(settlement.outcome, Outcome::Superseded);
                break;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(redirected.available_permits(), 0);
        assert_eq!(navigator.current_location(), "/forts");
        assert_eq!(mounted_name(&navigator), Some("forts"));
        let active = navigator
            .mount()
            .read(|p| p.active_link().map(|l| l.route.clone()))
            .unwrap();
        assert_eq!(active, Some(Location::parse("/forts")));
    }

    #[tokio::test]
    async fn test_redirecting_view_never_marks_its_own_link() {
        let live = Arc::new(AtomicUsize::new(0));
        let registry = ViewRegistry::builder()
            .register("/", InstantView::new("home", &live))
            .register("/forts", redirect_to_auth)
            .register("/auth", InstantView::new("auth", &live))
            .build()
            .unwrap();
        let navigator = navigator(registry, "/");
        navigator.navigate().await.unwrap();

        navigator.navigate_to("/forts");
        let redirected = navigator.navigate().await.unwrap();
        assert_eq!(redirected.outcome, Outcome::Superseded);
        assert_eq!(navigator.current_location(), "/auth");

        let (active, committed) = navigator
            .mount()
            .read(|p| (p.active_link().map(|l| l.route.clone()), p.committed().map(|(g, _)| g)))
            .unwrap();
        assert_eq!(active, Some(Location::root()));
        assert_eq!(committed, Some(1));
        assert_eq!(mounted_name(&navigator), Some("home"));

        assert!(navigator.navigate().await.unwrap().is_committed());
        assert_eq!(mounted_name(&navigator), Some("auth"));
    }

    #[tokio::test]
    async fn test_view_that_mounts_nothing_does_not_commit() {
        let live = Arc::new(AtomicUsize::new(0));
        let registry = ViewRegistry::builder()
            .register("/", InstantView::new("home", &live))
            .register("/flora", mounts_nothing)
            .build()
            .unwrap();
        let navigator = navigator(registry, "/");
        navigator.navigate().await.unwrap();

        navigator.navigate_to("/flora");
        let settlement = navigator.navigate().await.unwrap();
        assert!(matches!(settlement.outcome, Outcome::Failed(ref reason) if reason.contains("without mounting")));

        let active = navigator
            .mount()
            .read(|p| p.active_link().map(|l| l.route.clone()))
            .unwrap();
        assert_eq!(active, Some(Location::root()));
        assert_eq!(mounted_name(&navigator), Some("home"));
    }

    #[tokio::test]
    async fn test_starting_twice_doubles_renders() {
        let live = Arc::new(AtomicUsize::new(0));
        let home = InstantView::new("home", &live);
        let calls = Arc::clone(&home.calls);
        let registry = ViewRegistry::builder().register("/", home).build().unwrap();
        let navigator = navigator(registry, "/");
        let mut settled = navigator.settlements();

        let _first = navigator.start();
        let _second = navigator.start();
        for _ in 0..2 {
            next_settlement(&mut settled).await;
        }

        navigator.navigate_to("/");
        for _ in 0..2 {
            next_settlement(&mut settled).await;
        }
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }
}
