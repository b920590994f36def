//! Sign in and sign up.

use super::common::{hero, palette, panel, LineInput};
use crate::services::AppServices;
use async_trait::async_trait;
use crossterm::event::KeyCode;
use fort_nexus::{Action, Component, Context, Entity, Event, EventContext, History, MountTarget, TaskTracker, View};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Tabs},
};
use tracing::info;

pub const PASSWORDS_DIFFER: &str = "Passwords do not match.";
pub const FIELDS_REQUIRED: &str = "Email and password are required.";
pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters.";
pub const SIGNED_UP: &str = "Account created! Check your email for confirmation, then sign in.";

const MIN_PASSWORD_CHARS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    SignIn,
    SignUp,
}

impl Tab {
    fn fields(self) -> usize {
        match self {
            Tab::SignIn => 2,
            Tab::SignUp => 3,
        }
    }
}

/// Checks a sign-up form before it is sent.
pub fn validate_sign_up(email: &str, password: &str, confirm: &str) -> Result<(), &'static str> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(FIELDS_REQUIRED);
    }
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(PASSWORD_TOO_SHORT);
    }
    if password != confirm {
        return Err(PASSWORDS_DIFFER);
    }
    Ok(())
}

pub struct AuthView {
    services: AppServices,
}

impl AuthView {
    pub fn new(services: &AppServices) -> Self {
        Self {
            services: services.clone(),
        }
    }
}

#[async_trait]
impl View for AuthView {
    async fn render(&self, target: MountTarget) -> anyhow::Result<()> {
        if let Some(user) = self.services.store.current_user().await {
            info!(user = %user.id, "already signed in");
            target.redirect("/");
            return Ok(());
        }
        target.mount(AuthPage::new(&self.services, target.history()))?;
        Ok(())
    }
}

#[derive(Debug)]
pub struct AuthForm {
    pub tab: Tab,
    pub focus: usize,
    pub email: LineInput,
    pub password: LineInput,
    pub confirm: LineInput,
    pub error: Option<String>,
    pub busy: bool,
}

impl Default for AuthForm {
    fn default() -> Self {
        Self {
            tab: Tab::SignIn,
            focus: 0,
            email: LineInput::default(),
            password: LineInput::masked(),
            confirm: LineInput::masked(),
            error: None,
            busy: false,
        }
    }
}

impl AuthForm {
    fn focused(&mut self) -> &mut LineInput {
        match self.focus {
            0 => &mut self.email,
            1 => &mut self.password,
            _ => &mut self.confirm,
        }
    }

    fn switch(&mut self, tab: Tab) {
        self.tab = tab;
        self.focus = 0;
        self.error = None;
        self.password.clear();
        self.confirm.clear();
    }
}

pub struct AuthPage {
    services: AppServices,
    history: History,
    form: Entity<AuthForm>,
    tasks: TaskTracker,
}

impl AuthPage {
    pub fn new(services: &AppServices, history: History) -> Self {
        Self {
            services: services.clone(),
            history,
            form: Entity::new(AuthForm::default()),
            tasks: TaskTracker::new(),
        }
    }

    pub fn form(&self) -> &Entity<AuthForm> {
        &self.form
    }

    fn submit(&mut self, cx: &Context<Self>) {
        let request = self.form.update(|form| {
            if form.busy {
                return None;
            }
            let email = form.email.value().trim().to_string();
            let password = form.password.value().to_string();
            let checked = match form.tab {
                Tab::SignIn if email.is_empty() || password.is_empty() => Err(FIELDS_REQUIRED),
                Tab::SignIn => Ok(()),
                Tab::SignUp => validate_sign_up(&email, &password, form.confirm.value()),
            };
            match checked {
                Ok(()) => {
                    form.error = None;
                    form.busy = true;
                    Some((form.tab, email, password))
                }
                Err(message) => {
                    form.error = Some(message.to_string());
                    None
                }
            }
        });
        let Ok(Some((tab, email, password))) = request else {
            return;
        };

        let store = self.services.store.clone();
        let toasts = self.services.toasts.clone();
        let history = self.history.clone();
        let form = self.form.clone();
        self.tasks.track(cx.spawn_task(move |_| async move {
            match tab {
                Tab::SignIn => match store.sign_in(&email, &password).await {
                    Ok(user) => {
                        info!(user = %user.id, "signed in");
                        let _ = form.update(|form| form.busy = false);
                        history.push("/");
                    }
                    Err(err) => {
                        let _ = form.update(|form| {
                            form.busy = false;
                            form.error = Some(err.to_string());
                        });
                    }
                },
                Tab::SignUp => {
                    let result = store.sign_up(&email, &password).await;
                    let signed_up = result.is_ok();
                    let _ = form.update(|form| {
                        form.busy = false;
                        match result {
                            Ok(_) => form.switch(Tab::SignIn),
                            Err(err) => form.error = Some(err.to_string()),
                        }
                    });
                    if signed_up {
                        toasts.success(SIGNED_UP);
                    }
                }
            }
        }));
    }
}

impl Component for AuthPage {
    fn on_mount(&mut self, cx: &mut Context<Self>) {
        self.tasks.track(cx.subscribe(&self.form));
    }

    fn on_exit(&mut self, _cx: &mut Context<Self>) {
        self.tasks.abort_all();
    }

    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context<Self>) {
        let palette = palette(&self.services.theme);
        let Ok(form) = self.form.read(|form| {
            (
                form.tab,
                form.focus,
                [
                    form.email.display(form.focus == 0),
                    form.password.display(form.focus == 1),
                    form.confirm.display(form.focus == 2),
                ],
                form.error.clone(),
                form.busy,
            )
        }) else {
            return;
        };
        let (tab, focus, values, error, busy) = form;

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(cx.area);
        frame.render_widget(
            Paragraph::new(hero(
                "Welcome to Fort-Flora",
                "Sign in to bookmark your favorite forts and access personalized features",
                &palette,
            )),
            layout[0],
        );

        let tabs = Tabs::new(["Sign In", "Sign Up"])
            .select(match tab {
                Tab::SignIn => 0,
                Tab::SignUp => 1,
            })
            .style(Style::default().fg(palette.muted))
            .highlight_style(Style::default().fg(palette.accent).add_modifier(Modifier::BOLD))
            .block(panel("", &palette));
        frame.render_widget(tabs, layout[1]);

        let labels = ["Email", "Password", "Confirm Password"];
        let mut lines = Vec::new();
        for (index, (label, value)) in labels.iter().zip(values).take(tab.fields()).enumerate() {
            let style = if index == focus {
                Style::default().fg(palette.accent)
            } else {
                Style::default().fg(palette.muted)
            };
            lines.push(Line::from(Span::styled(*label, style)));
            lines.push(Line::from(Span::styled(
                format!("  {value}"),
                Style::default().fg(palette.text),
            )));
            lines.push(Line::from(""));
        }
        if let Some(error) = error {
            lines.push(Line::from(Span::styled(error, Style::default().fg(palette.error))));
        }
        if busy {
            let working = match tab {
                Tab::SignIn => "Signing in...",
                Tab::SignUp => "Creating...",
            };
            lines.push(Line::from(Span::styled(working, Style::default().fg(palette.muted))));
        }
        let title = match tab {
            Tab::SignIn => " Sign In ",
            Tab::SignUp => " Create Account ",
        };
        frame.render_widget(Paragraph::new(lines).block(panel(title, &palette)), layout[2]);

        frame.render_widget(
            Paragraph::new(" ←/→ switch form · ↑/↓ field · Enter submit ")
                .style(Style::default().fg(palette.muted)),
            layout[3],
        );
    }

    fn handle_event(&mut self, event: Event, cx: &mut EventContext<Self>) -> Option<Action> {
        match event {
            Event::Paste(text) => {
                let _ = self.form.update(|form| form.focused().paste(&text));
            }
            Event::Key(key) => match key.code {
                KeyCode::Enter => self.submit(cx),
                KeyCode::Left => {
                    let _ = self.form.update(|form| form.switch(Tab::SignIn));
                }
                KeyCode::Right => {
                    let _ = self.form.update(|form| form.switch(Tab::SignUp));
                }
                KeyCode::Up => {
                    let _ = self.form.update(|form| form.focus = form.focus.saturating_sub(1));
                }
                KeyCode::Down => {
                    let _ = self.form.update(|form| form.focus = (form.focus + 1).min(form.tab.fields() - 1));
                }
                _ => {
                    let _ = self.form.update(|form| form.focused().handle_key(&key));
                }
            },
            _ => {}
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Identity, Theme};
    use crate::pages::home::HomePage;
    use crate::pages::testing::{cx, eventually, key, services};
    use crate::services::gateway::Gateway;
    use crate::services::memory::MemoryGateway;
    use fort_nexus::{AppContext, NavLink, Navigator, ViewRegistry};
    use std::sync::Arc;
    use std::time::Duration;

    async fn home(target: MountTarget) -> anyhow::Result<()> {
        target.mount(HomePage::new(&Entity::new(Theme::Dark)))?;
        Ok(())
    }

    fn fill(page: &mut AuthPage, fields: &[&str]) {
        let mut cx = cx::<AuthPage>();
        for (index, value) in fields.iter().enumerate() {
            if index > 0 {
                page.handle_event(key(KeyCode::Down), &mut cx);
            }
            page.handle_event(Event::Paste(value.to_string()), &mut cx);
        }
        page.handle_event(key(KeyCode::Enter), &mut cx);
    }

    fn error(page: &AuthPage) -> Option<String> {
        page.form().read(|form| form.error.clone()).unwrap()
    }

    fn idle(page: &AuthPage) -> bool {
        !page.form().read(|form| form.busy).unwrap()
    }

    #[test]
    fn test_sign_up_validation() {
        assert_eq!(validate_sign_up("a@b.in", "secret1", "secret1"), Ok(()));
        assert_eq!(validate_sign_up("a@b.in", "secret1", "secret2"), Err(PASSWORDS_DIFFER));
        assert_eq!(validate_sign_up("a@b.in", "abc", "abc"), Err(PASSWORD_TOO_SHORT));
        assert_eq!(validate_sign_up("  ", "secret1", "secret1"), Err(FIELDS_REQUIRED));
    }

    #[tokio::test]
    async fn test_signed_in_user_is_sent_home() {
        let gateway = Arc::new(MemoryGateway::new());
        gateway
            .sign_in_as(Identity {
                id: "u-1".to_string(),
                email: None,
            })
            .await;
        let (services, _dir) = services(Some(gateway));
        let registry = ViewRegistry::builder()
            .register("/", home)
            .register("/auth", AuthView::new(&services))
            .build()
            .unwrap();
        let navigator = Navigator::new(
            registry,
            History::new("/auth"),
            vec![NavLink::new("/", "Home")],
            AppContext::headless(),
        );
        let mut settled = navigator.settlements();
        let _listener = navigator.start();

        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let settlement = settled.recv().await.unwrap();
                if settlement.location == "/" && settlement.is_committed() {
                    break;
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(navigator.current_location(), "/");
    }

    #[tokio::test]
    async fn test_sign_in_goes_home() {
        let gateway = Arc::new(MemoryGateway::new());
        gateway.add_account("rao@fort.in", "raigad1674", "u-7").await;
        let (services, _dir) = services(Some(Arc::clone(&gateway)));
        let history = History::new("/auth");
        let mut page = AuthPage::new(&services, history.clone());

        fill(&mut page, &["rao@fort.in", "raigad1674"]);
        eventually(|| async { history.current() == "/" }).await;
        assert_eq!(error(&page), None);
        assert_eq!(services.store.current_user().await.map(|user| user.id), Some("u-7".to_string()));
    }

    #[tokio::test]
    async fn test_failed_sign_in_shows_error_inline() {
        let gateway = Arc::new(MemoryGateway::new());
        let (services, _dir) = services(Some(gateway));
        let history = History::new("/auth");
        let mut page = AuthPage::new(&services, history.clone());

        fill(&mut page, &["rao@fort.in", "wrong"]);
        eventually(|| async { idle(&page) }).await;
        assert_eq!(error(&page).as_deref(), Some("Invalid login credentials"));
        assert_eq!(history.current(), "/auth");
    }

    #[tokio::test]
    async fn test_mismatched_passwords_never_reach_gateway() {
        let gateway = Arc::new(MemoryGateway::new());
        let (services, _dir) = services(Some(Arc::clone(&gateway)));
        let mut page = AuthPage::new(&services, History::new("/auth"));
        page.handle_event(key(KeyCode::Right), &mut cx::<AuthPage>());

        fill(&mut page, &["new@fort.in", "secret1", "secret2"]);
        assert_eq!(error(&page).as_deref(), Some(PASSWORDS_DIFFER));
        assert!(idle(&page));
        assert!(gateway.sign_in("new@fort.in", "secret1").await.is_err());
    }

    #[tokio::test]
    async fn test_sign_up_toasts_and_returns_to_sign_in() {
        let (services, _dir) = services(Some(Arc::new(MemoryGateway::new())));
        let mut page = AuthPage::new(&services, History::new("/auth"));
        page.handle_event(key(KeyCode::Right), &mut cx::<AuthPage>());

        fill(&mut page, &["new@fort.in", "secret1", "secret1"]);
        eventually(|| async { idle(&page) }).await;
        assert_eq!(page.form().read(|form| form.tab).unwrap(), Tab::SignIn);
        assert_eq!(services.toasts.current().map(|toast| toast.message), Some(SIGNED_UP.to_string()));
    }
}
