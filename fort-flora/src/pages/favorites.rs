//! The signed-in user's bookmarked forts.

use super::common::{height_label, hero, palette, panel, Loading};
use crate::model::{Bookmark, Fort, Identity};
use crate::services::store::WriteOutcome;
use crate::services::AppServices;
use async_trait::async_trait;
use crossterm::event::KeyCode;
use fort_nexus::{Action, Component, Context, Entity, Event, EventContext, MountTarget, TaskTracker, View};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph, Wrap},
};
use tracing::warn;

pub const LOAD_FAILED: &str = "Could not load favorites. Please try again.";

/// Bookmarked forts in catalogue order.
pub fn favorite_forts(forts: &[Fort], bookmarks: &[Bookmark]) -> Vec<Fort> {
    forts
        .iter()
        .filter(|fort| bookmarks.iter().any(|bookmark| bookmark.fort_id == fort.id))
        .cloned()
        .collect()
}

pub struct FavoritesView {
    services: AppServices,
}

impl FavoritesView {
    pub fn new(services: &AppServices) -> Self {
        Self {
            services: services.clone(),
        }
    }
}

#[async_trait]
impl View for FavoritesView {
    async fn render(&self, target: MountTarget) -> anyhow::Result<()> {
        target.mount(Loading::new("favorites", &self.services.theme))?;
        let Some(user) = self.services.store.current_user().await else {
            target.mount(SignInPrompt::new(&self.services))?;
            return Ok(());
        };

        let (bookmarks, forts) = tokio::join!(self.services.store.bookmarks(&user.id), self.services.store.forts());
        let listing = match bookmarks {
            Ok(bookmarks) => Listing::Loaded(favorite_forts(&forts, &bookmarks)),
            Err(err) => {
                warn!(user = %user.id, error = %err, "bookmarks unavailable");
                Listing::Failed
            }
        };
        target.mount(FavoritesPage::new(&self.services, user, listing))?;
        Ok(())
    }
}

/// Shown to anonymous visitors.
pub struct SignInPrompt {
    services: AppServices,
}

impl SignInPrompt {
    pub fn new(services: &AppServices) -> Self {
        Self {
            services: services.clone(),
        }
    }
}

impl Component for SignInPrompt {
    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context<Self>) {
        let palette = palette(&self.services.theme);
        let mut lines = hero("My Favorites", "Sign in to see the forts you have saved.", &palette);
        lines.push(Line::from(vec![
            Span::styled(" Enter ", Style::default().fg(palette.background).bg(palette.accent)),
            Span::styled(" Go to sign in", Style::default().fg(palette.text)),
        ]));
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), cx.area);
    }

    fn handle_event(&mut self, event: Event, _cx: &mut EventContext<Self>) -> Option<Action> {
        match event {
            Event::Key(key) if key.code == KeyCode::Enter => Some(Action::Navigate("/auth".to_string())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Listing {
    Loaded(Vec<Fort>),
    Failed,
}

struct FavoritesState {
    listing: Listing,
    selected: usize,
}

pub struct FavoritesPage {
    services: AppServices,
    user: Identity,
    state: Entity<FavoritesState>,
    tasks: TaskTracker,
}

impl FavoritesPage {
    pub fn new(services: &AppServices, user: Identity, listing: Listing) -> Self {
        Self {
            services: services.clone(),
            user,
            state: Entity::new(FavoritesState { listing, selected: 0 }),
            tasks: TaskTracker::new(),
        }
    }

    pub fn listing(&self) -> Listing {
        self.state.read(|state| state.listing.clone()).unwrap_or(Listing::Failed)
    }

    /// Remove the selected fort from favorites, optimistically.
    fn remove_selected(&mut self, cx: &Context<Self>) {
        let removed = self
            .state
            .update(|state| match &mut state.listing {
                Listing::Loaded(forts) if state.selected < forts.len() => {
                    let fort = forts.remove(state.selected);
                    state.selected = state.selected.min(forts.len().saturating_sub(1));
                    Some(fort)
                }
                _ => None,
            })
            .ok()
            .flatten();
        let Some(fort) = removed else {
            return;
        };

        let store = self.services.store.clone();
        let toasts = self.services.toasts.clone();
        let user_id = self.user.id.clone();
        self.tasks.track(cx.spawn_task(move |_| async move {
            match store.remove_bookmark(&user_id, fort.id).await {
                WriteOutcome::Failed(reason) => toasts.error(format!("Could not remove {}: {reason}", fort.name)),
                _ => toasts.success("Removed from favorites"),
            }
        }));
    }
}

impl Component for FavoritesPage {
    fn on_mount(&mut self, cx: &mut Context<Self>) {
        self.tasks.track(cx.subscribe(&self.state));
    }

    fn on_exit(&mut self, _cx: &mut Context<Self>) {
        self.tasks.abort_all();
    }

    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context<Self>) {
        let palette = palette(&self.services.theme);
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
            .split(cx.area);

        let subtitle = match &self.user.email {
            Some(email) => format!("Forts saved by {email}"),
            None => "Forts you have saved".to_string(),
        };
        frame.render_widget(Paragraph::new(hero("My Favorites", &subtitle, &palette)), layout[0]);

        let (listing, selected) = self
            .state
            .read(|state| (state.listing.clone(), state.selected))
            .unwrap_or((Listing::Failed, 0));

        match listing {
            Listing::Failed => {
                let text = Paragraph::new(LOAD_FAILED)
                    .style(Style::default().fg(palette.error))
                    .block(panel(" Favorites ", &palette));
                frame.render_widget(text, layout[1]);
            }
            Listing::Loaded(forts) if forts.is_empty() => {
                let text = Paragraph::new(vec![
                    Line::from("No favorites yet."),
                    Line::from("Press b on the Forts page to save a fort here."),
                ])
                .style(Style::default().fg(palette.muted))
                .block(panel(" Favorites ", &palette));
                frame.render_widget(text, layout[1]);
            }
            Listing::Loaded(forts) => {
                let body = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
                    .split(layout[1]);
                let items: Vec<ListItem> = forts
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
                    .collect();
                let list = List::new(items)
                    .block(panel(format!(" Favorites ({}) ", forts.len()), &palette))
                    .highlight_style(Style::default().fg(palette.accent).add_modifier(Modifier::BOLD))
                    .highlight_symbol("▶ ");
                let mut state = ListState::default().with_selected(Some(selected));
                frame.render_stateful_widget(list, body[0], &mut state);

                if let Some(fort) = forts.get(selected) {
                    let detail = Paragraph::new(vec![
                        Line::from(Span::styled(
                            format!("Best time: {}", fort.best_time),
                            Style::default().fg(palette.highlight),
                        )),
                        Line::from(""),
                        Line::from(fort.history.clone()),
                    ])
                    .style(Style::default().fg(palette.text))
                    .wrap(Wrap { trim: true })
                    .scroll((cx.scroll, 0))
                    .block(panel(format!(" {} ", fort.name), &palette));
                    frame.render_widget(detail, body[1]);
                }
            }
        }

        frame.render_widget(
            Paragraph::new(" ↑/↓ select · x remove ").style(Style::default().fg(palette.muted)),
            layout[2],
        );
    }

    fn handle_event(&mut self, event: Event, cx: &mut EventContext<Self>) -> Option<Action> {
        let Event::Key(key) = event else {
            return None;
        };
        match key.code {
            KeyCode::Up => {
                let _ = self.state.update(|state| state.selected = state.selected.saturating_sub(1));
            }
            KeyCode::Down => {
                let _ = self.state.update(|state| {
                    if let Listing::Loaded(forts) = &state.listing {
                        state.selected = (state.selected + 1).min(forts.len().saturating_sub(1));
                    }
                });
            }
            KeyCode::Char('x') | KeyCode::Delete => self.remove_selected(cx),
            _ => {}
        }
        None
    }
}
