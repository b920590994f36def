//! Catalogue management for admins.
//!
//! Anonymous visitors are redirected to `/auth`; signed-in users without the
//! admin role get an access-denied panel. Admins can add, edit and delete
//! forts and flora. Every write is reported with a toast.

use super::common::{height_label, hero, palette, panel, LineInput, Loading};
use super::flora::fort_name;
use crate::model::{Flora, Fort, Identity, NewFlora, NewFort};
use crate::services::store::{WriteOutcome, DELETE_NEEDS_GATEWAY};
use crate::services::AppServices;
use crate::toast::ToastKind;
use async_trait::async_trait;
use crossterm::event::KeyCode;
use fort_nexus::{
    Action, AppContext, Component, Context, Entity, Event, EventContext, History, MountTarget, TaskHandle, TaskTracker,
    View,
};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph, Tabs, Wrap},
};
use tracing::info;

const FORT_FIELDS: [&str; 6] = ["Fort Name", "District", "Height (m)", "Best Time to Visit", "History", "Image URL"];
const FLORA_FIELDS: [&str; 6] = [
    "Plant Name",
    "Scientific Name",
    "Associated Fort (id)",
    "Medicinal Use",
    "Description",
    "Image URL",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Forts,
    Flora,
}

impl Section {
    fn labels(self) -> &'static [&'static str; 6] {
        match self {
            Section::Forts => &FORT_FIELDS,
            Section::Flora => &FLORA_FIELDS,
        }
    }

    fn noun(self) -> &'static str {
        match self {
            Section::Forts => "Fort",
            Section::Flora => "Flora",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Add,
    Update,
    Delete,
}

/// Build a fort payload from form values, in `FORT_FIELDS` order.
///
/// A height that does not parse counts as 0 (a sea fort).
pub fn new_fort(values: &[String]) -> Result<NewFort, &'static str> {
    let value = |index: usize| values.get(index).map(|value| value.trim()).unwrap_or_default();
    if value(0).is_empty() {
        return Err("Fort name is required.");
    }
    if value(1).is_empty() {
        return Err("District is required.");
    }
    let image_url = match value(5) {
        "" => NewFort::DEFAULT_IMAGE,
        url => url,
    };
    Ok(NewFort {
        name: value(0).to_string(),
        district: value(1).to_string(),
        height: value(2).parse().unwrap_or(0),
        best_time: value(3).to_string(),
        history: value(4).to_string(),
        image_url: image_url.to_string(),
    })
}

/// Build a plant payload from form values, in `FLORA_FIELDS` order.
pub fn new_flora(values: &[String]) -> Result<NewFlora, &'static str> {
    let value = |index: usize| values.get(index).map(|value| value.trim()).unwrap_or_default();
    if value(0).is_empty() {
        return Err("Plant name is required.");
    }
    let image_url = match value(5) {
        "" => NewFlora::DEFAULT_IMAGE,
        url => url,
    };
    Ok(NewFlora {
        name: value(0).to_string(),
        scientific_name: value(1).to_string(),
        fort_id: value(2).parse().ok(),
        medicinal_use: value(3).to_string(),
        description: value(4).to_string(),
        image_url: image_url.to_string(),
    })
}

/// Toast text for the outcome of a write.
pub fn outcome_message(change: Change, noun: &str, outcome: &WriteOutcome) -> (String, ToastKind) {
    let lower = noun.to_lowercase();
    match (change, outcome) {
        (Change::Add, WriteOutcome::Saved) => (format!("{noun} added successfully!"), ToastKind::Success),
        (Change::Add, WriteOutcome::SavedLocally) => (
            format!("{noun} saved locally (gateway not configured)"),
            ToastKind::Success,
        ),
        (Change::Add, WriteOutcome::Failed(reason)) => (format!("Error adding {lower}: {reason}"), ToastKind::Error),
        (Change::Update, WriteOutcome::Saved) => (format!("{noun} updated successfully!"), ToastKind::Success),
        (Change::Update, WriteOutcome::SavedLocally) => (
            format!("{noun} updated locally (gateway not configured)"),
            ToastKind::Success,
        ),
        (Change::Update, WriteOutcome::Failed(reason)) => {
            (format!("Error updating {lower}: {reason}"), ToastKind::Error)
        }
        (Change::Delete, WriteOutcome::Failed(reason)) if reason == DELETE_NEEDS_GATEWAY => {
            (reason.clone(), ToastKind::Error)
        }
        (Change::Delete, WriteOutcome::Failed(reason)) => (format!("Error deleting: {reason}"), ToastKind::Error),
        (Change::Delete, _) => (format!("{noun} deleted successfully!"), ToastKind::Success),
    }
}

fn fort_values(fort: &Fort) -> Vec<String> {
    vec![
        fort.name.clone(),
        fort.district.clone(),
        fort.height.to_string(),
        fort.best_time.clone(),
        fort.history.clone(),
        fort.image_url.clone(),
    ]
}

fn flora_values(plant: &Flora) -> Vec<String> {
    vec![
        plant.name.clone(),
        plant.scientific_name.clone(),
        plant.fort_id.map(|id| id.to_string()).unwrap_or_default(),
        plant.medicinal_use.clone(),
        plant.description.clone(),
        plant.image_url.clone(),
    ]
}

pub struct AdminView {
    services: AppServices,
}

impl AdminView {
    pub fn new(services: &AppServices) -> Self {
        Self {
            services: services.clone(),
        }
    }
}

#[async_trait]
impl View for AdminView {
    async fn render(&self, target: MountTarget) -> anyhow::Result<()> {
        target.mount(Loading::new("admin panel", &self.services.theme))?;
        let Some(user) = self.services.store.current_user().await else {
            target.redirect("/auth");
            return Ok(());
        };
        if !self.services.store.is_admin(&user).await {
            info!(user = %user.id, "admin access denied");
            target.mount(AccessDenied::new(&self.services, user, target.history()))?;
            return Ok(());
        }

        let (forts, flora) = tokio::join!(self.services.store.forts(), self.services.store.flora());
        target.mount(AdminPage::new(&self.services, user, target.history(), forts, flora))?;
        Ok(())
    }
}

fn sign_out(services: &AppServices, history: &History, app: &AppContext) -> TaskHandle {
    let store = services.store.clone();
    let toasts = services.toasts.clone();
    let history = history.clone();
    app.spawn_task(move |_| async move {
        store.sign_out().await;
        toasts.success("Signed out");
        history.push("/auth");
    })
}

/// Shown to signed-in users without the admin role.
pub struct AccessDenied {
    services: AppServices,
    user: Identity,
    history: History,
    tasks: TaskTracker,
}

impl AccessDenied {
    pub fn new(services: &AppServices, user: Identity, history: History) -> Self {
        Self {
            services: services.clone(),
            user,
            history,
            tasks: TaskTracker::new(),
        }
    }
}

impl Component for AccessDenied {
    fn on_exit(&mut self, _cx: &mut Context<Self>) {
        self.tasks.abort_all();
    }

    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context<Self>) {
        let palette = palette(&self.services.theme);
        let who = self.user.email.as_deref().unwrap_or(&self.user.id);
        let mut lines = hero("Admin Panel", "Admin access is restricted to authorized users only.", &palette);
        lines.push(Line::from(Span::styled(
            format!("{who} does not have the admin role."),
            Style::default().fg(palette.error),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(" o sign out ", Style::default().fg(palette.muted))));
        frame.render_widget(Paragraph::new(lines).block(panel(" Access denied ", &palette)), cx.area);
    }

    fn handle_event(&mut self, event: Event, cx: &mut EventContext<Self>) -> Option<Action> {
        if let Event::Key(key) = event {
            if key.code == KeyCode::Char('o') {
                self.tasks.track(sign_out(&self.services, &self.history, &cx.app));
            }
        }
        None
    }
}

#[derive(Debug)]
struct Editor {
    /// Row being edited; `None` while adding.
    target: Option<i64>,
    inputs: Vec<LineInput>,
    focus: usize,
    error: Option<String>,
}

impl Editor {
    fn new(target: Option<i64>, values: Vec<String>) -> Self {
        let inputs = values
            .into_iter()
            .map(|value| {
                let mut input = LineInput::default();
                input.set(value);
                input
            })
            .collect();
        Self {
            target,
            inputs,
            focus: 0,
            error: None,
        }
    }

    fn values(&self) -> Vec<String> {
        self.inputs.iter().map(|input| input.value().to_string()).collect()
    }
}

#[derive(Debug)]
enum Mode {
    Browse,
    Editing(Editor),
    ConfirmDelete { id: i64, name: String },
}

#[derive(Debug, Clone)]
enum Job {
    Fort { id: Option<i64>, fort: NewFort },
    Flora { id: Option<i64>, plant: NewFlora },
    Delete { section: Section, id: i64 },
}

impl Job {
    fn section(&self) -> Section {
        match self {
            Job::Fort { .. } => Section::Forts,
            Job::Flora { .. } => Section::Flora,
            Job::Delete { section, .. } => *section,
        }
    }

    fn change(&self) -> Change {
        match self {
            Job::Fort { id: None, .. } | Job::Flora { id: None, .. } => Change::Add,
            Job::Fort { .. } | Job::Flora { .. } => Change::Update,
            Job::Delete { .. } => Change::Delete,
        }
    }
}

pub struct AdminState {
    section: Section,
    mode: Mode,
    forts: Vec<Fort>,
    flora: Vec<Flora>,
    selected: usize,
    busy: bool,
}

impl AdminState {
    fn len(&self) -> usize {
        match self.section {
            Section::Forts => self.forts.len(),
            Section::Flora => self.flora.len(),
        }
    }

    fn selected_row(&self) -> Option<(i64, String, Vec<String>)> {
        match self.section {
            Section::Forts => self
                .forts
                .get(self.selected)
                .map(|fort| (fort.id, fort.name.clone(), fort_values(fort))),
            Section::Flora => self
                .flora
                .get(self.selected)
                .map(|plant| (plant.id, plant.name.clone(), flora_values(plant))),
        }
    }

    /// Mirror a write that only happened on this machine.
    fn apply_locally(&mut self, job: &Job) {
        match job {
            Job::Fort { id: None, fort } => {
                let id = self.forts.iter().map(|fort| fort.id).max().unwrap_or(0) + 1;
                self.forts.push(fort.with_id(id));
            }
            Job::Fort { id: Some(id), fort } => {
                if let Some(existing) = self.forts.iter_mut().find(|existing| existing.id == *id) {
                    *existing = Fort {
                        latitude: existing.latitude,
                        longitude: existing.longitude,
                        ..fort.with_id(*id)
                    };
                }
            }
            Job::Flora { id: None, plant } => {
                let id = self.flora.iter().map(|plant| plant.id).max().unwrap_or(0) + 1;
                self.flora.push(plant.with_id(id));
            }
            Job::Flora { id: Some(id), plant } => {
                if let Some(existing) = self.flora.iter_mut().find(|existing| existing.id == *id) {
                    *existing = plant.with_id(*id);
                }
            }
            Job::Delete {
                section: Section::Forts,
                id,
            } => self.forts.retain(|fort| fort.id != *id),
            Job::Delete {
                section: Section::Flora,
                id,
            } => self.flora.retain(|plant| plant.id != *id),
        }
        self.selected = self.selected.min(self.len().saturating_sub(1));
    }
}

pub struct AdminPage {
    services: AppServices,
    user: Identity,
    history: History,
    state: Entity<AdminState>,
    tasks: TaskTracker,
}

impl AdminPage {
    pub fn new(services: &AppServices, user: Identity, history: History, forts: Vec<Fort>, flora: Vec<Flora>) -> Self {
        Self {
            services: services.clone(),
            user,
            history,
            state: Entity::new(AdminState {
                section: Section::Forts,
                mode: Mode::Browse,
                forts,
                flora,
                selected: 0,
                busy: false,
            }),
            tasks: TaskTracker::new(),
        }
    }

    pub fn fort_names(&self) -> Vec<String> {
        self.state
            .read(|state| state.forts.iter().map(|fort| fort.name.clone()).collect())
            .unwrap_or_default()
    }

    pub fn is_busy(&self) -> bool {
        self.state.read(|state| state.busy).unwrap_or(false)
    }

    /// Validate the open editor and turn it into a job.
    fn take_editor_job(state: &mut AdminState) -> Option<Job> {
        let section = state.section;
        let Mode::Editing(editor) = &mut state.mode else {
            return None;
        };
        let values = editor.values();
        let job = match section {
            Section::Forts => new_fort(&values).map(|fort| Job::Fort {
                id: editor.target,
                fort,
            }),
            Section::Flora => new_flora(&values).map(|plant| Job::Flora {
                id: editor.target,
                plant,
            }),
        };
        match job {
            Ok(job) => {
                state.mode = Mode::Browse;
                Some(job)
            }
            Err(message) => {
                editor.error = Some(message.to_string());
                None
            }
        }
    }

    fn run(&mut self, job: Job, cx: &Context<Self>) {
        let store = self.services.store.clone();
        let toasts = self.services.toasts.clone();
        let state = self.state.clone();
        let _ = state.update(|state| state.busy = true);
        self.tasks.track(cx.spawn_task(move |_| async move {
            let outcome = match &job {
                Job::Fort { id: None, fort } => store.insert_fort(fort).await,
                Job::Fort { id: Some(id), fort } => store.update_fort(*id, fort).await,
                Job::Flora { id: None, plant } => store.insert_flora(plant).await,
                Job::Flora { id: Some(id), plant } => store.update_flora(*id, plant).await,
                Job::Delete {
                    section: Section::Forts,
                    id,
                } => store.delete_fort(*id).await,
                Job::Delete {
                    section: Section::Flora,
                    id,
                } => store.delete_flora(*id).await,
            };

            let section = job.section();
            match outcome {
                WriteOutcome::Saved => match section {
                    Section::Forts => {
                        let forts = store.forts().await;
                        let _ = state.update(|state| state.forts = forts);
                    }
                    Section::Flora => {
                        let flora = store.flora().await;
                        let _ = state.update(|state| state.flora = flora);
                    }
                },
                WriteOutcome::SavedLocally => {
                    let _ = state.update(|state| state.apply_locally(&job));
                }
                WriteOutcome::Failed(_) => {}
            }
            let _ = state.update(|state| {
                state.busy = false;
                state.selected = state.selected.min(state.len().saturating_sub(1));
            });

            let (message, kind) = outcome_message(job.change(), section.noun(), &outcome);
            toasts.show(message, kind);
        }));
    }

    fn handle_browse(&mut self, code: KeyCode, cx: &Context<Self>) {
        match code {
            KeyCode::Char('o') => self.tasks.track(sign_out(&self.services, &self.history, &cx.app)),
            _ => {
                let _ = self.state.update(|state| match code {
                    KeyCode::Left | KeyCode::Right => {
                        state.section = match state.section {
                            Section::Forts => Section::Flora,
                            Section::Flora => Section::Forts,
                        };
                        state.selected = 0;
                    }
                    KeyCode::Up => state.selected = state.selected.saturating_sub(1),
                    KeyCode::Down => state.selected = (state.selected + 1).min(state.len().saturating_sub(1)),
                    KeyCode::Char('a') => {
                        state.mode = Mode::Editing(Editor::new(None, vec![String::new(); 6]));
                    }
                    KeyCode::Char('e') => {
                        if let Some((id, _, values)) = state.selected_row() {
                            state.mode = Mode::Editing(Editor::new(Some(id), values));
                        }
                    }
                    KeyCode::Char('d') | KeyCode::Delete => {
                        if let Some((id, name, _)) = state.selected_row() {
                            state.mode = Mode::ConfirmDelete { id, name };
                        }
                    }
                    _ => {}
                });
            }
        }
    }
}

impl Component for AdminPage {
    fn on_mount(&mut self, cx: &mut Context<Self>) {
        self.tasks.track(cx.subscribe(&self.state));
    }

    fn on_exit(&mut self, _cx: &mut Context<Self>) {
        self.tasks.abort_all();
    }

    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context<Self>) {
        let palette = palette(&self.services.theme);
        let subtitle = if self.services.store.is_configured() {
            "Manage forts and flora data"
        } else {
            "Manage forts and flora data (gateway not configured, showing seed data)"
        };
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(cx.area);
        frame.render_widget(Paragraph::new(hero("Admin Panel", subtitle, &palette)), layout[0]);

        let email = self.user.email.as_deref().unwrap_or(&self.user.id);
        let _ = self.state.read(|state| {
            let tabs = Tabs::new(["Forts", "Flora"])
                .select(match state.section {
                    Section::Forts => 0,
                    Section::Flora => 1,
                })
                .style(Style::default().fg(palette.muted))
                .highlight_style(Style::default().fg(palette.accent).add_modifier(Modifier::BOLD))
                .block(panel(format!(" {email} "), &palette));
            frame.render_widget(tabs, layout[1]);

            let body = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(layout[2]);

            let items: Vec<ListItem> = match state.section {
                Section::Forts => state
                    .forts
                    .iter()
                    .map(|fort| {
                        ListItem::new(Line::from(vec![
                            Span::styled(fort.name.clone(), Style::default().fg(palette.text)),
                            Span::styled(
                                format!("  {} · {}", fort.district, height_label(fort.height)),
                                Style::default().fg(palette.muted),
                            ),
                        ]))
                    })
                    .collect(),
                Section::Flora => state
                    .flora
                    .iter()
                    .map(|plant| {
                        ListItem::new(Line::from(vec![
                            Span::styled(plant.name.clone(), Style::default().fg(palette.text)),
                            Span::styled(
                                format!("  {} · {}", plant.scientific_name, fort_name(&state.forts, plant.fort_id)),
                                Style::default().fg(palette.muted).add_modifier(Modifier::ITALIC),
                            ),
                        ]))
                    })
                    .collect(),
            };
            let title = format!(" Existing {} ({}) ", state.section.noun(), state.len());
            let list = List::new(items)
                .block(panel(title, &palette))
                .highlight_style(Style::default().fg(palette.accent).add_modifier(Modifier::BOLD))
                .highlight_symbol("▶ ");
            let mut list_state = ListState::default().with_selected(Some(state.selected));
            frame.render_stateful_widget(list, body[0], &mut list_state);

            let side = match &state.mode {
                Mode::Browse => {
                    let mut lines = vec![Line::from("Select a row, then:"), Line::from("")];
                    lines.extend(
                        ["a  add new", "e  edit selected", "d  delete selected", "o  sign out"]
                            .into_iter()
                            .map(|hint| Line::from(Span::styled(hint, Style::default().fg(palette.muted)))),
                    );
                    if state.busy {
                        lines.push(Line::from(""));
                        lines.push(Line::from(Span::styled("Saving...", Style::default().fg(palette.highlight))));
                    }
                    Paragraph::new(lines).block(panel(" Actions ", &palette))
                }
                Mode::Editing(editor) => {
                    let mut lines = Vec::new();
                    for (index, (label, input)) in state.section.labels().iter().zip(&editor.inputs).enumerate() {
                        let focused = index == editor.focus;
                        let label_style = if focused {
                            Style::default().fg(palette.accent)
                        } else {
                            Style::default().fg(palette.muted)
                        };
                        let mut spans = vec![
                            Span::styled(format!("{label}: "), label_style),
                            Span::styled(input.display(focused), Style::default().fg(palette.text)),
                        ];
                        if state.section == Section::Flora && index == 2 && !input.value().is_empty() {
                            let resolved = fort_name(&state.forts, input.value().trim().parse().ok());
                            spans.push(Span::styled(format!("  ({resolved})"), Style::default().fg(palette.muted)));
                        }
                        lines.push(Line::from(spans));
                    }
                    if let Some(error) = &editor.error {
                        lines.push(Line::from(""));
                        lines.push(Line::from(Span::styled(error.clone(), Style::default().fg(palette.error))));
                    }
                    let title = match editor.target {
                        None => format!(" Add New {} ", state.section.noun()),
                        Some(_) => format!(" Edit {} ", state.section.noun()),
                    };
                    Paragraph::new(lines).wrap(Wrap { trim: false }).block(panel(title, &palette))
                }
                Mode::ConfirmDelete { name, .. } => Paragraph::new(vec![
                    Line::from(format!("Delete {name}?")),
                    Line::from(""),
                    Line::from(Span::styled("y confirm · any other key cancels", Style::default().fg(palette.muted))),
                ])
                .style(Style::default().fg(palette.error))
                .block(panel(" Confirm ", &palette)),
            };
            frame.render_widget(side, body[1]);

            let hint = match state.mode {
                Mode::Browse => " ←/→ forts/flora · ↑/↓ select · a add · e edit · d delete · o sign out ",
                Mode::Editing(_) => " ↑/↓ field · Enter save · Esc cancel ",
                Mode::ConfirmDelete { .. } => " y delete · any key cancel ",
            };
            frame.render_widget(Paragraph::new(hint).style(Style::default().fg(palette.muted)), layout[3]);
        });
    }

    fn handle_event(&mut self, event: Event, cx: &mut EventContext<Self>) -> Option<Action> {
        let editing = self
            .state
            .read(|state| match state.mode {
                Mode::Browse => 0,
                Mode::Editing(_) => 1,
                Mode::ConfirmDelete { .. } => 2,
            })
            .unwrap_or(0);

        match (editing, event) {
            (1, Event::Paste(text)) => {
                let _ = self.state.update(|state| {
                    if let Mode::Editing(editor) = &mut state.mode {
                        let focus = editor.focus;
                        editor.inputs[focus].paste(&text);
                    }
                });
            }
            (1, Event::Key(key)) => match key.code {
                KeyCode::Enter => {
                    if let Ok(Some(job)) = self.state.update(Self::take_editor_job) {
                        self.run(job, cx);
                    }
                }
                KeyCode::Esc => {
                    let _ = self.state.update(|state| state.mode = Mode::Browse);
                }
                _ => {
                    let _ = self.state.update(|state| {
                        let Mode::Editing(editor) = &mut state.mode else {
                            return;
                        };
                        match key.code {
                            KeyCode::Up => editor.focus = editor.focus.saturating_sub(1),
                            KeyCode::Down => editor.focus = (editor.focus + 1).min(editor.inputs.len() - 1),
                            _ => {
                                let focus = editor.focus;
                                editor.inputs[focus].handle_key(&key);
                            }
                        }
                    });
                }
            },
            (2, Event::Key(key)) => {
                let confirmed = self
                    .state
                    .update(|state| {
                        let section = state.section;
                        match std::mem::replace(&mut state.mode, Mode::Browse) {
                            Mode::ConfirmDelete { id, .. } if key.code == KeyCode::Char('y') => {
                                Some(Job::Delete { section, id })
                            }
                            _ => None,
                        }
                    })
                    .ok()
                    .flatten();
                if let Some(job) = confirmed {
                    self.run(job, cx);
                }
            }
            (0, Event::Key(key)) => self.handle_browse(key.code, cx),
            _ => {}
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Theme;
    use crate::pages::home::HomePage;
    use crate::pages::testing::{cx, eventually, key, services};
    use crate::seed;
    use crate::services::gateway::Collection;
    use crate::services::memory::MemoryGateway;
    use fort_nexus::{NavLink, Navigator, ViewRegistry};
    use std::sync::Arc;
    use std::time::Duration;

    fn values(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|value| value.to_string()).collect()
    }

    fn admin() -> Identity {
        Identity {
            id: "admin-1".to_string(),
            email: Some("admin@fort.in".to_string()),
        }
    }

    async fn placeholder(target: MountTarget) -> anyhow::Result<()> {
        target.mount(HomePage::new(&Entity::new(Theme::Dark)))?;
        Ok(())
    }

    fn navigator(services: &AppServices) -> Navigator {
        let registry = ViewRegistry::builder()
            .register("/", placeholder)
            .register("/admin", AdminView::new(services))
            .register("/auth", placeholder)
            .build()
            .unwrap();
        Navigator::new(
            registry,
            History::new("/admin"),
            vec![NavLink::new("/admin", "Admin"), NavLink::new("/auth", "Account")],
            AppContext::headless(),
        )
    }

    fn type_form(page: &mut AdminPage, fields: &[&str]) {
        let mut cx = cx::<AdminPage>();
        page.handle_event(key(KeyCode::Char('a')), &mut cx);
        for (index, value) in fields.iter().enumerate() {
            if index > 0 {
                page.handle_event(key(KeyCode::Down), &mut cx);
            }
            page.handle_event(Event::Paste(value.to_string()), &mut cx);
        }
        page.handle_event(key(KeyCode::Enter), &mut cx);
    }

    #[test]
    fn test_new_fort_from_form() {
        let fort = new_fort(&values(&["Vijaydurg", "Sindhudurg", "not a number", "", "", ""])).unwrap();
        assert_eq!(fort.height, 0);
        assert_eq!(fort.image_url, NewFort::DEFAULT_IMAGE);
        assert_eq!(new_fort(&values(&["", "Pune"])), Err("Fort name is required."));
        assert_eq!(new_fort(&values(&["Purandar", " "])), Err("District is required."));
    }

    #[test]
    fn test_new_flora_from_form() {
        let plant = new_flora(&values(&["Indian Rosewood", "Dalbergia latifolia", "4", "", "", "https://x"])).unwrap();
        assert_eq!(plant.fort_id, Some(4));
        assert_eq!(plant.image_url, "https://x");
        assert_eq!(new_flora(&values(&["Karvi", "", "none"])).unwrap().fort_id, None);
    }

    #[test]
    fn test_outcome_messages() {
        assert_eq!(
            outcome_message(Change::Add, "Fort", &WriteOutcome::Saved),
            ("Fort added successfully!".to_string(), ToastKind::Success)
        );
        assert_eq!(
            outcome_message(Change::Add, "Fort", &WriteOutcome::SavedLocally).0,
            "Fort saved locally (gateway not configured)"
        );
        assert_eq!(
            outcome_message(Change::Add, "Flora", &WriteOutcome::Failed("boom".to_string())),
            ("Error adding flora: boom".to_string(), ToastKind::Error)
        );
        assert_eq!(
            outcome_message(Change::Delete, "Fort", &WriteOutcome::Failed(DELETE_NEEDS_GATEWAY.to_string())).0,
            DELETE_NEEDS_GATEWAY
        );
    }

    #[tokio::test]
    async fn test_anonymous_visitor_is_redirected_to_auth() {
        let (services, _dir) = services(Some(Arc::new(MemoryGateway::new())));
        let navigator = navigator(&services);
        let mut settled = navigator.settlements();
        let _listener = navigator.start();

        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let settlement = settled.recv().await.unwrap();
                if settlement.location == "/auth" && settlement.is_committed() {
                    break;
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(navigator.current_location(), "/auth");
    }

    #[tokio::test]
    async fn test_non_admin_sees_access_denied() {
        let gateway = Arc::new(MemoryGateway::new());
        gateway
            .sign_in_as(Identity {
                id: "visitor".to_string(),
                email: None,
            })
            .await;
        let (services, _dir) = services(Some(gateway));
        let navigator = navigator(&services);

        assert!(navigator.navigate().await.unwrap().is_committed());
        let denied = navigator
            .mount()
            .read(|point| point.component::<AccessDenied>().is_some())
            .unwrap();
        assert!(denied);
    }

    #[tokio::test]
    async fn test_admin_adds_fort_through_gateway() {
        let gateway = Arc::new(MemoryGateway::new());
        gateway.sign_in_as(admin()).await;
        gateway.grant_admin("admin-1").await;
        let (services, _dir) = services(Some(Arc::clone(&gateway)));
        let navigator = navigator(&services);
        assert!(navigator.navigate().await.unwrap().is_committed());

        let mount = navigator.mount();
        let cx = cx();
        let press = |event: Event| {
            mount.update(|point| point.handle_event(event, &cx)).unwrap();
        };
        press(key(KeyCode::Char('a')));
        press(Event::Paste("Purandar".to_string()));
        press(key(KeyCode::Down));
        press(Event::Paste("Pune".to_string()));
        press(key(KeyCode::Enter));

        eventually(|| async { !gateway.rows(Collection::Forts).await.is_empty() }).await;
        let row = gateway.rows(Collection::Forts).await.remove(0);
        assert_eq!(row["name"], "Purandar");
        assert_eq!(row["image_url"], NewFort::DEFAULT_IMAGE);
        eventually(|| async { services.toasts.current().is_some() }).await;
        assert_eq!(
            services.toasts.current().map(|toast| toast.message),
            Some("Fort added successfully!".to_string())
        );
        let names = mount
            .read(|point| point.component::<AdminPage>().map(AdminPage::fort_names))
            .unwrap()
            .unwrap();
        assert_eq!(names, ["Purandar"]);
    }

    #[tokio::test]
    async fn test_offline_add_is_kept_locally() {
        let (services, _dir) = services(None);
        let mut page = AdminPage::new(
            &services,
            admin(),
            History::new("/admin"),
            seed::forts().to_vec(),
            seed::flora().to_vec(),
        );

        type_form(&mut page, &["Purandar", "Pune", "1387"]);
        eventually(|| async { services.toasts.current().is_some() }).await;
        let names = page.fort_names();
        assert_eq!(names.len(), seed::forts().len() + 1);
        assert_eq!(names.last().map(String::as_str), Some("Purandar"));
        assert_eq!(
            services.toasts.current().map(|toast| toast.message),
            Some("Fort saved locally (gateway not configured)".to_string())
        );
    }

    #[tokio::test]
    async fn test_offline_delete_needs_gateway() {
        let (services, _dir) = services(None);
        let mut page = AdminPage::new(
            &services,
            admin(),
            History::new("/admin"),
            seed::forts().to_vec(),
            seed::flora().to_vec(),
        );
        let mut cx = cx::<AdminPage>();

        page.handle_event(key(KeyCode::Char('d')), &mut cx);
        page.handle_event(key(KeyCode::Char('y')), &mut cx);
        eventually(|| async { services.toasts.current().is_some() }).await;
        assert_eq!(
            services.toasts.current().map(|toast| (toast.message, toast.kind)),
            Some((DELETE_NEEDS_GATEWAY.to_string(), ToastKind::Error))
        );
        assert_eq!(page.fort_names().len(), seed::forts().len());
    }

    #[tokio::test]
    async fn test_invalid_form_stays_open() {
        let (services, _dir) = services(None);
        let mut page = AdminPage::new(&services, admin(), History::new("/admin"), Vec::new(), Vec::new());

        type_form(&mut page, &["Purandar"]);
        let error = page
            .state
            .read(|state| match &state.mode {
                Mode::Editing(editor) => editor.error.clone(),
                _ => None,
            })
            .unwrap();
        assert_eq!(error.as_deref(), Some("District is required."));
        assert!(!page.is_busy());
    }
}
