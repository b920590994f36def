//! Fort catalogue with search, district filter and bookmarking.

use super::common::{height_label, hero, palette, panel, LineInput, Loading};
use crate::model::{Fort, Identity};
use crate::seed;
use crate::services::store::WriteOutcome;
use crate::services::AppServices;
use async_trait::async_trait;
use crossterm::event::KeyCode;
use fort_nexus::{Action, Component, Context, Event, EventContext, MountTarget, TaskTracker, View};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph, Wrap},
};

/// Forts whose name contains `query` (any case) and, when given, whose
/// district is exactly `district`.
pub fn filter_forts<'a>(forts: &'a [Fort], query: &str, district: Option<&str>) -> Vec<&'a Fort> {
    let query = query.trim().to_lowercase();
    forts
        .iter()
        .filter(|fort| fort.name.to_lowercase().contains(&query))
        .filter(|fort| district.map_or(true, |district| fort.district == district))
        .collect()
}

pub struct FortsView {
    services: AppServices,
}

impl FortsView {
    pub fn new(services: &AppServices) -> Self {
        Self {
            services: services.clone(),
        }
    }
}

#[async_trait]
impl View for FortsView {
    async fn render(&self, target: MountTarget) -> anyhow::Result<()> {
        target.mount(Loading::new("forts", &self.services.theme))?;
        let (forts, user) = tokio::join!(self.services.store.forts(), self.services.store.current_user());
        target.mount(FortsPage::new(&self.services, forts, user))?;
        Ok(())
    }
}

pub struct FortsPage {
    services: AppServices,
    forts: Vec<Fort>,
    districts: Vec<String>,
    user: Option<Identity>,
    search: LineInput,
    searching: bool,
    /// Index into `districts`; `None` shows all.
    district: Option<usize>,
    selected: usize,
    tasks: TaskTracker,
}

impl FortsPage {
    pub fn new(services: &AppServices, forts: Vec<Fort>, user: Option<Identity>) -> Self {
        Self {
            services: services.clone(),
            districts: seed::districts_of(&forts),
            forts,
            user,
            search: LineInput::default(),
            searching: false,
            district: None,
            selected: 0,
            tasks: TaskTracker::new(),
        }
    }

    fn district(&self) -> Option<&str> {
        self.district.and_then(|index| self.districts.get(index)).map(String::as_str)
    }

    fn visible(&self) -> Vec<&Fort> {
        filter_forts(&self.forts, self.search.value(), self.district())
    }

    /// Step through "All districts" and each district, wrapping around.
    fn cycle_district(&mut self, forward: bool) {
        let slots = self.districts.len() + 1;
        let current = self.district.map_or(0, |index| index + 1);
        let next = if forward { (current + 1) % slots } else { (current + slots - 1) % slots };
        self.district = next.checked_sub(1);
        self.selected = 0;
    }

    fn bookmark_selected(&mut self, cx: &Context<Self>) {
        let Some(fort) = self.visible().get(self.selected).map(|fort| (*fort).clone()) else {
            return;
        };
        let Some(user) = self.user.clone() else {
            self.services.toasts.error("Sign in to save favorites");
            return;
        };
        let store = self.services.store.clone();
        let toasts = self.services.toasts.clone();
        self.tasks.track(cx.spawn_task(move |_| async move {
            match store.add_bookmark(&user.id, fort.id).await {
                WriteOutcome::Saved => toasts.success(format!("{} added to favorites", fort.name)),
                WriteOutcome::SavedLocally => toasts.success(format!("{} saved locally", fort.name)),
                WriteOutcome::Failed(reason) => toasts.error(format!("Could not save favorite: {reason}")),
            }
        }));
    }
}

impl Component for FortsPage {
    fn on_exit(&mut self, _cx: &mut Context<Self>) {
        self.tasks.abort_all();
    }

    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context<Self>) {
        let palette = palette(&self.services.theme);
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
            .split(cx.area);

        frame.render_widget(
            Paragraph::new(hero(
                "Maharashtra Forts",
                "Explore the majestic forts that guard the Western Ghats and Konkan coast",
                &palette,
            )),
            layout[0],
        );

        let district = self.district().unwrap_or("All Districts").to_string();
        let filter = Line::from(vec![
            Span::styled(" Search: ", Style::default().fg(palette.muted)),
            Span::styled(self.search.display(self.searching), Style::default().fg(palette.text)),
            Span::styled("   District: ", Style::default().fg(palette.muted)),
            Span::styled(format!("◀ {district} ▶"), Style::default().fg(palette.accent)),
        ]);
        frame.render_widget(Paragraph::new(filter).block(panel(" Filter ", &palette)), layout[1]);

        let visible: Vec<Fort> = self.visible().into_iter().cloned().collect();
        self.selected = self.selected.min(visible.len().saturating_sub(1));

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(layout[2]);

        let info = format!(" Showing {} of {} forts ", visible.len(), self.forts.len());
        if visible.is_empty() {
            let empty = Paragraph::new("No forts found. Try a different search.")
                .style(Style::default().fg(palette.muted))
                .block(panel(info, &palette));
            frame.render_widget(empty, layout[2]);
        } else {
            let items: Vec<ListItem> = visible
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
                .block(panel(info, &palette))
                .highlight_style(Style::default().fg(palette.accent).add_modifier(Modifier::BOLD))
                .highlight_symbol("▶ ");
            let mut state = ListState::default().with_selected(Some(self.selected));
            frame.render_stateful_widget(list, body[0], &mut state);

            let fort = &visible[self.selected];
            let detail = vec![
                Line::from(Span::styled(
                    fort.name.clone(),
                    Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!("{} · {}", fort.district, height_label(fort.height)),
                    Style::default().fg(palette.muted),
                )),
                Line::from(Span::styled(
                    format!("Best time: {}", fort.best_time),
                    Style::default().fg(palette.highlight),
                )),
                Line::from(""),
                Line::from(fort.history.clone()),
            ];
            let detail = Paragraph::new(detail)
                .style(Style::default().fg(palette.text))
                .wrap(Wrap { trim: true })
                .scroll((cx.scroll, 0))
                .block(panel(" History ", &palette));
            frame.render_widget(detail, body[1]);
        }

        let hint = if self.searching {
            " type to search · Enter/Esc done "
        } else {
            " / search · ←/→ district · ↑/↓ select · b save to favorites "
        };
        frame.render_widget(
            Paragraph::new(hint).style(Style::default().fg(palette.muted)),
            layout[3],
        );
    }

    fn handle_event(&mut self, event: Event, cx: &mut EventContext<Self>) -> Option<Action> {
        match event {
            Event::Paste(text) if self.searching => {
                self.search.paste(&text);
                self.selected = 0;
                None
            }
            Event::Key(key) if self.searching => {
                match key.code {
                    KeyCode::Enter | KeyCode::Esc => self.searching = false,
                    _ => {
                        if self.search.handle_key(&key) {
                            self.selected = 0;
                        }
                    }
                }
                None
            }
            Event::Key(key) => {
                match key.code {
                    KeyCode::Char('/') => self.searching = true,
                    KeyCode::Left => self.cycle_district(false),
                    KeyCode::Right => self.cycle_district(true),
                    KeyCode::Up => self.selected = self.selected.saturating_sub(1),
                    KeyCode::Down => self.selected = self.selected.saturating_add(1),
                    KeyCode::Char('b') => self.bookmark_selected(cx),
                    _ => {}
                }
                None
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::LocalStorage;
    use crate::services::completion::Adviser;
    use crate::services::gateway::{Collection, Gateway};
    use crate::services::memory::MemoryGateway;
    use crate::services::store::Store;
    use crossterm::event::KeyEvent;
    use fort_nexus::AppContext;
    use std::sync::Arc;
    use std::time::Duration;

    fn names(forts: Vec<&Fort>) -> Vec<&str> {
        forts.into_iter().map(|fort| fort.name.as_str()).collect()
    }

    fn services(store: Store) -> (AppServices, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let services = AppServices::new(store, Adviser::offline(), LocalStorage::in_dir(dir.path()));
        (services, dir)
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::from(code))
    }

    #[test]
    fn test_filter_by_name_ignores_case() {
        let forts = seed::forts();
        assert_eq!(names(filter_forts(forts, "SINH", None)), ["Sinhagad Fort"]);
        assert_eq!(filter_forts(forts, "", None).len(), forts.len());
        assert!(filter_forts(forts, "atlantis", None).is_empty());
    }

    #[test]
    fn test_filter_by_district_is_exact() {
        let forts = seed::forts();
        let raigad = filter_forts(forts, "", Some("Raigad"));
        assert_eq!(names(raigad), ["Raigad Fort", "Murud-Janjira"]);
        assert_eq!(names(filter_forts(forts, "fort", Some("Raigad"))), ["Raigad Fort"]);
        assert!(filter_forts(forts, "", Some("Rai")).is_empty());
    }

    #[test]
    fn test_district_cycle_wraps_through_all() {
        let (services, _dir) = services(Store::offline());
        let mut page = FortsPage::new(&services, seed::forts().to_vec(), None);
        let count = page.districts.len();

        page.cycle_district(false);
        assert_eq!(page.district(), page.districts.last().map(String::as_str));
        page.cycle_district(true);
        assert_eq!(page.district(), None);

        page.cycle_district(true);
        assert_eq!(page.district(), page.districts.first().map(String::as_str));
        for _ in 0..count {
            page.cycle_district(true);
        }
        assert_eq!(page.district(), None);
    }

    #[tokio::test]
    async fn test_search_mode_captures_letters() {
        let (services, _dir) = services(Store::offline());
        let mut page = FortsPage::new(&services, seed::forts().to_vec(), None);
        let mut cx = Context::<FortsPage>::new(AppContext::headless(), Default::default());

        page.handle_event(key(KeyCode::Char('/')), &mut cx);
        for c in "lohagad".chars() {
            page.handle_event(key(KeyCode::Char(c)), &mut cx);
        }
        page.handle_event(key(KeyCode::Enter), &mut cx);
        assert_eq!(names(page.visible()), ["Lohagad Fort"]);

        // Out of search mode, 'b' is a command again.
        page.handle_event(key(KeyCode::Char('b')), &mut cx);
        assert_eq!(page.search.value(), "lohagad");
        assert_eq!(
            services.toasts.current().map(|toast| toast.message),
            Some("Sign in to save favorites".to_string())
        );
    }

    #[tokio::test]
    async fn test_bookmark_writes_through_gateway() {
        let gateway = Arc::new(MemoryGateway::new());
        let (services, _dir) = services(Store::with_gateway(Arc::clone(&gateway) as Arc<dyn Gateway>));
        let user = Identity {
            id: "u-9".to_string(),
            email: None,
        };
        let mut page = FortsPage::new(&services, seed::forts().to_vec(), Some(user));
        let mut cx = Context::<FortsPage>::new(AppContext::headless(), Default::default());

        page.handle_event(key(KeyCode::Down), &mut cx);
        page.handle_event(key(KeyCode::Char('b')), &mut cx);

        tokio::time::timeout(Duration::from_secs(5), async {
            while gateway.rows(Collection::Bookmarks).await.is_empty() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
        let rows = gateway.rows(Collection::Bookmarks).await;
        assert_eq!(rows[0]["fort_id"], seed::forts()[1].id);
        assert_eq!(rows[0]["user_id"], "u-9");
    }
}
