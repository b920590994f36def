//! The mount point: the single container every view draws into.

use crate::application::{AppContext, Context, EventContext};
use crate::component::{Action, AnyComponent, Component, Event};
use crate::router::Location;
use ratatui::layout::Rect;

/// One entry of the navigation bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub route: Location,
    pub label: String,
    pub active: bool,
}

impl NavLink {
    pub fn new(route: impl Into<Location>, label: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            label: label.into(),
            active: false,
        }
    }
}

struct Mounted {
    route: Location,
    generation: u64,
    component: Box<dyn AnyComponent>,
}

/// Holds the currently mounted component plus the navigation affordance
/// state that is updated when a navigation commits.
///
/// Owned by the navigator. Views only reach it through a `MountTarget`,
/// which refuses writes from superseded navigations.
pub struct MountPoint {
    content: Option<Mounted>,
    links: Vec<NavLink>,
    scroll: u16,
    committed: Option<(u64, Location)>,
}

impl MountPoint {
    pub fn new(links: Vec<NavLink>) -> Self {
        Self {
            content: None,
            links,
            scroll: 0,
            committed: None,
        }
    }

    pub fn links(&self) -> &[NavLink] {
        &self.links
    }

    pub fn active_link(&self) -> Option<&NavLink> {
        self.links.iter().find(|link| link.active)
    }

    /// Route of the mounted component, if any.
    pub fn route(&self) -> Option<&Location> {
        self.content.as_ref().map(|mounted| &mounted.route)
    }

    /// Generation of the navigation that mounted the current component.
    pub fn mounted_generation(&self) -> Option<u64> {
        self.content.as_ref().map(|mounted| mounted.generation)
    }

    /// The last navigation that committed.
    pub fn committed(&self) -> Option<(u64, &Location)> {
        self.committed.as_ref().map(|(generation, location)| (*generation, location))
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none()
    }

    /// Borrow the mounted component as a concrete type.
    pub fn component<C: Component>(&self) -> Option<&C> {
        self.content
            .as_ref()
            .and_then(|mounted| mounted.component.as_ref().as_any().downcast_ref::<C>())
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn scroll_by(&mut self, delta: i32) {
        self.scroll = (i32::from(self.scroll) + delta).clamp(0, i32::from(u16::MAX)) as u16;
    }

    /// Swap in a new component, running the old one's disposer first.
    pub(crate) fn replace(
        &mut self,
        route: Location,
        generation: u64,
        component: Box<dyn AnyComponent>,
        app: &AppContext,
    ) {
        let mut cx = Context::<dyn AnyComponent>::new(app.clone(), Rect::default());
        if let Some(mut previous) = self.content.take() {
            previous.component.on_exit_any(&mut cx);
        }
        let mut mounted = Mounted {
            route,
            generation,
            component,
        };
        mounted.component.on_mount_any(&mut cx);
        self.content = Some(mounted);
    }

    /// Bookkeeping for a committed navigation: exactly the link matching
    /// `location` becomes active and the viewport returns to the top.
    pub(crate) fn commit(&mut self, generation: u64, location: &Location) {
        for link in &mut self.links {
            link.active = &link.route == location;
        }
        self.scroll = 0;
        self.committed = Some((generation, location.clone()));
    }

    /// Draw the mounted component into `cx.area`.
    pub fn render(&mut self, frame: &mut ratatui::Frame, cx: &Context<dyn AnyComponent>) {
        if let Some(mounted) = self.content.as_mut() {
            let mut cx = cx.cast::<dyn AnyComponent>();
            cx.scroll = self.scroll;
            mounted.component.render_any(frame, &mut cx);
        }
    }

    /// Forward an event to the mounted component.
    pub fn handle_event(&mut self, event: Event, cx: &EventContext<dyn AnyComponent>) -> Option<Action> {
        let mounted = self.content.as_mut()?;
        let mut cx = cx.cast::<dyn AnyComponent>();
        cx.scroll = self.scroll;
        mounted.component.handle_event_any(event, &mut cx)
    }

    /// Run the shutdown hook of the mounted component.
    pub fn shutdown(&mut self, app: &AppContext) {
        if let Some(mounted) = self.content.as_mut() {
            let mut cx = Context::<dyn AnyComponent>::new(app.clone(), Rect::default());
            mounted.component.on_shutdown_any(&mut cx);
        }
    }
}
