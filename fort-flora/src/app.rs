//! The shell: navigation bar, the mount point, a status line and toasts.
//!
//! Global keys are handled here. Everything else goes to the mounted page.

use crate::pages::common::{palette, panel};
use crate::pages::{
    AdminView, AdviserView, AuthView, DashboardView, FavoritesView, FloraView, FortsView, HomeView, MapView,
};
use crate::services::AppServices;
use crate::toast::ToastKind;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fort_nexus::{
    Action, AnyComponent, AppContext, Component, Context, Entity, Event, EventContext, History, Location,
    MountPoint, NavLink, Navigator, TaskTracker, ViewRegistry,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph, Tabs, Wrap},
};
use tracing::{debug, info};

/// Navigation bar entries, in tab order.
pub const ROUTES: [(&str, &str); 9] = [
    ("/", "Home"),
    ("/forts", "Forts"),
    ("/flora", "Flora"),
    ("/adviser", "AI Adviser"),
    ("/map", "Map"),
    ("/dashboard", "Dashboard"),
    ("/favorites", "Favorites"),
    ("/admin", "Admin"),
    ("/auth", "Account"),
];

const SCROLL_STEP: i32 = 5;
const TOAST_WIDTH: u16 = 48;

pub fn registry(services: &AppServices) -> fort_nexus::Result<ViewRegistry> {
    ViewRegistry::builder()
        .register("/", HomeView::new(&services.theme))
        .register("/forts", FortsView::new(services))
        .register("/flora", FloraView::new(services))
        .register("/adviser", AdviserView::new(services))
        .register("/map", MapView::new(services))
        .register("/dashboard", DashboardView::new(services))
        .register("/favorites", FavoritesView::new(services))
        .register("/admin", AdminView::new(services))
        .register("/auth", AuthView::new(services))
        .build()
}

pub fn nav_links() -> Vec<NavLink> {
    ROUTES.iter().map(|(route, label)| NavLink::new(*route, *label)).collect()
}

/// Starting location from the command line: the first argument, if any,
/// in any form `Location::parse` accepts (`#/forts`, `/forts`, `forts`).
pub fn initial_location(mut args: impl Iterator<Item = String>) -> Location {
    args.next().map(Location::from).unwrap_or_default()
}

pub struct Shell {
    services: AppServices,
    navigator: Navigator,
    mount: Entity<MountPoint>,
    tasks: TaskTracker,
}

impl Shell {
    pub fn new(services: AppServices, initial: Location, app: &AppContext) -> fort_nexus::Result<Self> {
        let registry = registry(&services)?;
        let navigator = Navigator::new(registry, History::new(initial), nav_links(), app.clone());
        let mount = navigator.mount();
        Ok(Self {
            services,
            navigator,
            mount,
            tasks: TaskTracker::new(),
        })
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Index of the active nav link, if the current page has one.
    fn active_index(&self) -> Option<usize> {
        self.mount
            .read(|point| point.links().iter().position(|link| link.active))
            .ok()
            .flatten()
    }

    fn go_to_index(&self, index: usize) {
        if let Some((route, _)) = ROUTES.get(index) {
            self.navigator.navigate_to(route);
        }
    }

    fn step(&self, forward: bool) {
        let count = ROUTES.len();
        let next = match (self.active_index(), forward) {
            (Some(index), true) => (index + 1) % count,
            (Some(index), false) => (index + count - 1) % count,
            (None, true) => 0,
            (None, false) => count - 1,
        };
        self.go_to_index(next);
    }

    /// Keys the shell keeps for itself. Returns `None` for keys the page
    /// should see.
    fn global_key(&self, key: &KeyEvent) -> Option<Option<Action>> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => Some(Some(Action::Quit)),
            KeyCode::Char('t') if ctrl => {
                let theme = self.services.toggle_theme();
                info!(theme = theme.as_str(), "theme toggled");
                Some(None)
            }
            KeyCode::Tab => {
                self.step(true);
                Some(None)
            }
            KeyCode::BackTab => {
                self.step(false);
                Some(None)
            }
            KeyCode::F(n @ 1..=9) => {
                self.go_to_index(usize::from(n) - 1);
                Some(None)
            }
            KeyCode::Left if alt => {
                if !self.navigator.back() {
                    debug!("nothing to go back to");
                }
                Some(None)
            }
            KeyCode::PageUp => {
                let _ = self.mount.update(|point| point.scroll_by(-SCROLL_STEP));
                Some(None)
            }
            KeyCode::PageDown => {
                let _ = self.mount.update(|point| point.scroll_by(SCROLL_STEP));
                Some(None)
            }
            KeyCode::Esc if self.services.toasts.dismiss() => Some(None),
            _ => None,
        }
    }

    fn render_nav(&self, frame: &mut ratatui::Frame, area: Rect) {
        let palette = palette(&self.services.theme);
        let (titles, selected) = self
            .mount
            .read(|point| {
                let titles: Vec<Line> = point
                    .links()
                    .iter()
                    .enumerate()
                    .map(|(index, link)| Line::from(format!("F{} {}", index + 1, link.label)))
                    .collect();
                (titles, point.links().iter().position(|link| link.active))
            })
            .unwrap_or_default();
        let tabs = Tabs::new(titles)
            .select(selected)
            .style(Style::default().fg(palette.muted).bg(palette.background))
            .highlight_style(Style::default().fg(palette.accent).add_modifier(Modifier::BOLD | Modifier::UNDERLINED))
            .divider("│");
        frame.render_widget(tabs, area);
    }

    fn render_status(&self, frame: &mut ratatui::Frame, area: Rect) {
        let palette = palette(&self.services.theme);
        let location = self.navigator.current_location().as_hash();
        let gateway = if self.services.store.is_configured() {
            "gateway connected"
        } else {
            "seed data"
        };
        let status = Line::from(vec![
            Span::styled(format!(" {location} "), Style::default().fg(palette.background).bg(palette.accent)),
            Span::styled(
                format!(" {gateway} · {} theme ", self.services.current_theme().as_str()),
                Style::default().fg(palette.muted),
            ),
            Span::styled(
                " Tab/F1-F9 pages · Alt+← back · PgUp/PgDn scroll · Ctrl+T theme · Ctrl+Q quit ",
                Style::default().fg(palette.muted),
            ),
        ]);
        frame.render_widget(Paragraph::new(status), area);
    }

    fn render_toast(&self, frame: &mut ratatui::Frame, area: Rect) {
        let Some(toast) = self.services.toasts.current() else {
            return;
        };
        let palette = palette(&self.services.theme);
        let color = match toast.kind {
            ToastKind::Success => palette.success,
            ToastKind::Error => palette.error,
        };
        let width = TOAST_WIDTH.min(area.width);
        let lines = toast_height(&toast.message, width);
        let popup = Rect::new(area.right().saturating_sub(width), area.y, width, lines.min(area.height));
        frame.render_widget(Clear, popup);
        let body = Paragraph::new(toast.message)
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(color))
            .block(panel(" Esc ", &palette));
        frame.render_widget(body, popup);
    }
}

/// Rows a toast of `message` needs at `width` columns, border included.
fn toast_height(message: &str, width: u16) -> u16 {
    let inner = usize::from(width.saturating_sub(4).max(1));
    let rows = message.chars().count() / inner + 3;
    u16::try_from(rows).unwrap_or(u16::MAX)
}

impl Component for Shell {
    fn on_mount(&mut self, cx: &mut Context<Self>) {
        info!(location = %self.navigator.current_location(), "shell mounted");
        self.tasks.track(cx.subscribe(&self.mount));
        self.tasks.track(cx.subscribe(&self.services.theme));
        let mut toasts = self.services.toasts.subscribe();
        self.tasks.track(cx.spawn_task(move |app| async move {
            while toasts.changed().await.is_ok() {
                app.refresh();
            }
        }));
        self.tasks.track(self.navigator.start());
    }

    fn on_shutdown(&mut self, cx: &mut Context<Self>) {
        info!("shutting down");
        let _ = self.mount.update_silently(|point| point.shutdown(&cx.app));
        self.tasks.abort_all();
    }

    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context<Self>) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(1)])
            .split(cx.area);

        self.render_nav(frame, layout[0]);
        let page = cx.cast::<dyn AnyComponent>().with_area(layout[1]);
        let _ = self.mount.update_silently(|point| point.render(frame, &page));
        self.render_status(frame, layout[2]);
        self.render_toast(frame, layout[1]);
    }

    fn handle_event(&mut self, event: Event, cx: &mut EventContext<Self>) -> Option<Action> {
        if let Event::Key(key) = &event {
            if let Some(action) = self.global_key(key) {
                return action;
            }
        }

        let page = cx.cast::<dyn AnyComponent>();
        let action = self
            .mount
            .update_silently(|point| point.handle_event(event, &page))
            .ok()
            .flatten();
        match action? {
            Action::Navigate(path) => self.navigator.navigate_to(&path),
            Action::Back => {
                self.navigator.back();
            }
            Action::Quit => return Some(Action::Quit),
            Action::Noop => {}
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::dashboard::DashboardPage;
    use crate::pages::flora::FloraPage;
    use crate::pages::forts::FortsPage;
    use crate::pages::home::HomePage;
    use crate::model::Theme;
    use crate::pages::testing::{cx, eventually, key, services};
    use ratatui::{backend::TestBackend, Terminal};

    fn shell() -> (Shell, tempfile::TempDir) {
        let (services, dir) = services(None);
        let shell = Shell::new(services, Location::root(), &AppContext::headless()).unwrap();
        (shell, dir)
    }

    async fn settle(shell: &Shell, path: &str) {
        eventually(|| async {
            shell
                .mount
                .read(|point| point.committed().is_some_and(|(_, route)| route == &Location::parse(path)))
                .unwrap()
        })
        .await;
    }

    fn draw(shell: &mut Shell) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 30)).unwrap();
        terminal
            .draw(|frame| {
                let mut cx = Context::<Shell>::new(AppContext::headless(), frame.area());
                shell.render(frame, &mut cx);
            })
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_initial_location_from_args() {
        let args = |raw: &[&str]| raw.iter().map(|arg| arg.to_string()).collect::<Vec<_>>().into_iter();
        assert_eq!(initial_location(args(&["#/forts"])), "/forts");
        assert_eq!(initial_location(args(&["map"])), "/map");
        assert_eq!(initial_location(args(&[])), "/");
    }

    #[test]
    fn test_every_route_is_registered() {
        let (services, _dir) = services(None);
        let registry = registry(&services).unwrap();
        assert_eq!(registry.routes().count(), ROUTES.len());
        assert_eq!(nav_links().len(), ROUTES.len());
    }

    #[tokio::test]
    async fn test_start_mounts_home() {
        let (mut shell, _dir) = shell();
        shell.on_mount(&mut cx());
        settle(&shell, "/").await;

        let home = shell.mount.read(|point| point.component::<HomePage>().is_some()).unwrap();
        assert!(home);
        let active = shell.mount.read(|point| point.active_link().map(|link| link.route.clone())).unwrap();
        assert_eq!(active, Some(Location::root()));
    }

    #[tokio::test]
    async fn test_tab_and_function_keys_move_between_pages() {
        let (mut shell, _dir) = shell();
        let mut cx = cx::<Shell>();
        shell.on_mount(&mut cx);
        settle(&shell, "/").await;

        shell.handle_event(key(KeyCode::Tab), &mut cx);
        settle(&shell, "/forts").await;
        assert!(shell.mount.read(|point| point.component::<FortsPage>().is_some()).unwrap());

        shell.handle_event(key(KeyCode::F(6)), &mut cx);
        settle(&shell, "/dashboard").await;
        assert!(shell.mount.read(|point| point.component::<DashboardPage>().is_some()).unwrap());

        shell.handle_event(key(KeyCode::BackTab), &mut cx);
        settle(&shell, "/map").await;
    }

    #[tokio::test]
    async fn test_alt_left_goes_back() {
        let (mut shell, _dir) = shell();
        let mut cx = cx::<Shell>();
        shell.on_mount(&mut cx);
        settle(&shell, "/").await;

        shell.handle_event(key(KeyCode::F(3)), &mut cx);
        settle(&shell, "/flora").await;
        assert!(shell.mount.read(|point| point.component::<FloraPage>().is_some()).unwrap());

        shell.handle_event(Event::Key(KeyEvent::new(KeyCode::Left, KeyModifiers::ALT)), &mut cx);
        settle(&shell, "/").await;
        assert_eq!(shell.navigator().current_location(), "/");
    }

    #[tokio::test]
    async fn test_ctrl_keys() {
        let (mut shell, _dir) = shell();
        let mut cx = cx::<Shell>();

        let toggle = Event::Key(KeyEvent::new(KeyCode::Char('t'), KeyModifiers::CONTROL));
        assert_eq!(shell.handle_event(toggle, &mut cx), None);
        assert_eq!(shell.services.current_theme(), Theme::Light);
        assert_eq!(shell.services.storage.theme(), Theme::Light);

        let quit = Event::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL));
        assert_eq!(shell.handle_event(quit, &mut cx), Some(Action::Quit));
    }

    #[tokio::test]
    async fn test_esc_dismisses_toast() {
        let (mut shell, _dir) = shell();
        let mut cx = cx::<Shell>();
        shell.services.toasts.success("Saved");

        shell.handle_event(key(KeyCode::Esc), &mut cx);
        assert_eq!(shell.services.toasts.current(), None);
    }

    #[tokio::test]
    async fn test_render_shows_nav_status_and_toast() {
        let (mut shell, _dir) = shell();
        shell.on_mount(&mut cx());
        settle(&shell, "/").await;
        shell.services.toasts.error("Could not reach the gateway");

        let screen = draw(&mut shell);
        assert!(screen.contains("F1 Home"));
        assert!(screen.contains("F9 Account"));
        assert!(screen.contains("#/"));
        assert!(screen.contains("seed data"));
        assert!(screen.contains("Could not reach"));
    }

    #[test]
    fn test_toast_height_counts_wrapped_rows() {
        assert_eq!(toast_height("Saved", TOAST_WIDTH), 3);
        assert_eq!(toast_height(&"x".repeat(70_000), TOAST_WIDTH), (70_000_u32 / 44 + 3) as u16);
        assert_eq!(toast_height(&"x".repeat(300_000), 0), u16::MAX);
    }

    #[tokio::test]
    async fn test_huge_toast_is_clipped_to_page_area() {
        let (mut shell, _dir) = shell();
        shell.on_mount(&mut cx());
        settle(&shell, "/").await;
        shell.services.toasts.error("x".repeat(100_000));

        let screen = draw(&mut shell);
        assert!(screen.contains("F1 Home"));
        assert!(screen.contains("seed data"));
        assert!(screen.contains("xxxx"));
    }
}
