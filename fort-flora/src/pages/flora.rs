//! Plant catalogue.

use super::common::{hero, palette, panel, LineInput, Loading};
use crate::model::{Flora, Fort};
use crate::services::AppServices;
use async_trait::async_trait;
use crossterm::event::KeyCode;
use fort_nexus::{Action, Component, Context, Event, EventContext, MountTarget, View};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph, Wrap},
};

/// Plants whose common or scientific name contains `query`, any case.
pub fn filter_flora<'a>(flora: &'a [Flora], query: &str) -> Vec<&'a Flora> {
    let query = query.trim().to_lowercase();
    flora
        .iter()
        .filter(|plant| {
            plant.name.to_lowercase().contains(&query) || plant.scientific_name.to_lowercase().contains(&query)
        })
        .collect()
}

/// Name of the fort with `id` in `forts`, or "Unknown".
pub fn fort_name(forts: &[Fort], id: Option<i64>) -> &str {
    id.and_then(|id| forts.iter().find(|fort| fort.id == id))
        .map_or("Unknown", |fort| fort.name.as_str())
}

pub struct FloraView {
    services: AppServices,
}

impl FloraView {
    pub fn new(services: &AppServices) -> Self {
        Self {
            services: services.clone(),
        }
    }
}

#[async_trait]
impl View for FloraView {
    async fn render(&self, target: MountTarget) -> anyhow::Result<()> {
        target.mount(Loading::new("flora", &self.services.theme))?;
        let (flora, forts) = tokio::join!(self.services.store.flora(), self.services.store.forts());
        target.mount(FloraPage::new(&self.services, flora, forts))?;
        Ok(())
    }
}

pub struct FloraPage {
    services: AppServices,
    flora: Vec<Flora>,
    forts: Vec<Fort>,
    search: LineInput,
    searching: bool,
    selected: usize,
}

impl FloraPage {
    pub fn new(services: &AppServices, flora: Vec<Flora>, forts: Vec<Fort>) -> Self {
        Self {
            services: services.clone(),
            flora,
            forts,
            search: LineInput::default(),
            searching: false,
            selected: 0,
        }
    }
}

impl Component for FloraPage {
    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context<Self>) {
        let palette = palette(&self.services.theme);
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
            .split(cx.area);

        frame.render_widget(
            Paragraph::new(hero(
                "Flora of the Forts",
                "Medicinal plants and native trees that grow around Maharashtra's forts",
                &palette,
            )),
            layout[0],
        );
        let search = Line::from(vec![
            Span::styled(" Search: ", Style::default().fg(palette.muted)),
            Span::styled(self.search.display(self.searching), Style::default().fg(palette.text)),
        ]);
        frame.render_widget(Paragraph::new(search).block(panel(" Filter ", &palette)), layout[1]);

        let visible = filter_flora(&self.flora, self.search.value());
        self.selected = self.selected.min(visible.len().saturating_sub(1));
        let title = format!(" Showing {} of {} plants ", visible.len(), self.flora.len());

        if let Some(plant) = visible.get(self.selected) {
            let body = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
                .split(layout[2]);

            let items: Vec<ListItem> = visible
                .iter()
                .map(|plant| {
                    ListItem::new(vec![
                        Line::from(Span::styled(plant.name.clone(), Style::default().fg(palette.text))),
                        Line::from(Span::styled(
                            format!("  {} · {}", plant.scientific_name, fort_name(&self.forts, plant.fort_id)),
                            Style::default().fg(palette.muted).add_modifier(Modifier::ITALIC),
                        )),
                    ])
                })
                .collect();
            let list = List::new(items)
                .block(panel(title, &palette))
                .highlight_style(Style::default().fg(palette.accent).add_modifier(Modifier::BOLD))
                .highlight_symbol("▶ ");
            let mut state = ListState::default().with_selected(Some(self.selected));
            frame.render_stateful_widget(list, body[0], &mut state);

            let detail = vec![
                Line::from(Span::styled(
                    plant.name.clone(),
                    Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    plant.scientific_name.clone(),
                    Style::default().fg(palette.muted).add_modifier(Modifier::ITALIC),
                )),
                Line::from(format!("Found near: {}", fort_name(&self.forts, plant.fort_id))),
                Line::from(""),
                Line::from(Span::styled("Medicinal use", Style::default().fg(palette.highlight))),
                Line::from(plant.medicinal_use.clone()),
                Line::from(""),
                Line::from(plant.description.clone()),
            ];
            let detail = Paragraph::new(detail)
                .style(Style::default().fg(palette.text))
                .wrap(Wrap { trim: true })
                .scroll((cx.scroll, 0))
                .block(panel(" Details ", &palette));
            frame.render_widget(detail, body[1]);
        } else {
            let empty = Paragraph::new("No plants found. Try a different search.")
                .style(Style::default().fg(palette.muted))
                .block(panel(title, &palette));
            frame.render_widget(empty, layout[2]);
        }

        let hint = if self.searching {
            " type to search · Enter/Esc done "
        } else {
            " / search · ↑/↓ select "
        };
        frame.render_widget(Paragraph::new(hint).style(Style::default().fg(palette.muted)), layout[3]);
    }

    fn handle_event(&mut self, event: Event, _cx: &mut EventContext<Self>) -> Option<Action> {
        match event {
            Event::Paste(text) if self.searching => self.search.paste(&text),
            Event::Key(key) if self.searching => match key.code {
                KeyCode::Enter | KeyCode::Esc => self.searching = false,
                _ => {
                    if self.search.handle_key(&key) {
                        self.selected = 0;
                    }
                }
            },
            Event::Key(key) => match key.code {
                KeyCode::Char('/') => self.searching = true,
                KeyCode::Up => self.selected = self.selected.saturating_sub(1),
                KeyCode::Down => self.selected = self.selected.saturating_add(1),
                _ => {}
            },
            _ => {}
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    #[test]
    fn test_filter_matches_scientific_names() {
        let flora = seed::flora();
        let hits = filter_flora(flora, "terminalia");
        assert_eq!(hits.len(), 2);
        assert_eq!(filter_flora(flora, "KOKUM")[0].scientific_name, "Garcinia indica");
    }

    #[test]
    fn test_fort_name_uses_loaded_forts() {
        let forts = seed::forts();
        assert_eq!(fort_name(forts, Some(7)), "Sindhudurg Fort");
        assert_eq!(fort_name(&forts[..1], Some(7)), "Unknown");
        assert_eq!(fort_name(forts, None), "Unknown");
    }
}
