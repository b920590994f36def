//! Landing page.

use super::common::{height_label, hero, palette, panel};
use crate::model::{Fort, Theme};
use crate::seed;
use async_trait::async_trait;
use crossterm::event::KeyCode;
use fort_nexus::{Action, Component, Context, Entity, Event, EventContext, MountTarget, View};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph, Wrap},
};

const FEATURED: usize = 6;

/// Shortcuts listed on the landing page: (key, route, description).
const SHORTCUTS: [(char, &str, &str); 4] = [
    ('f', "/forts", "Explore forts"),
    ('p', "/flora", "Discover flora"),
    ('a', "/adviser", "Ask the AI adviser"),
    ('m', "/map", "Open the fort map"),
];

pub struct HomeView {
    theme: Entity<Theme>,
}

impl HomeView {
    pub fn new(theme: &Entity<Theme>) -> Self {
        Self { theme: theme.clone() }
    }
}

#[async_trait]
impl View for HomeView {
    async fn render(&self, target: MountTarget) -> anyhow::Result<()> {
        target.mount(HomePage::new(&self.theme))?;
        Ok(())
    }
}

pub struct HomePage {
    theme: Entity<Theme>,
    featured: Vec<Fort>,
    counts: [(usize, &'static str); 3],
}

impl HomePage {
    pub fn new(theme: &Entity<Theme>) -> Self {
        Self {
            theme: theme.clone(),
            featured: seed::forts().iter().take(FEATURED).cloned().collect(),
            counts: [
                (seed::forts().len(), "Forts"),
                (seed::flora().len(), "Plant species"),
                (seed::districts().len(), "Districts"),
            ],
        }
    }
}

impl Component for HomePage {
    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context<Self>) {
        let palette = palette(&self.theme);
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(7), Constraint::Length(3), Constraint::Min(0)])
            .split(cx.area);

        let mut intro = hero(
            "Discover the Forts & Flora of Maharashtra",
            "Explore majestic forts, ancient history, and the rich flora of the Western Ghats, all in one place.",
            &palette,
        );
        intro.push(Line::from(
            SHORTCUTS
                .iter()
                .flat_map(|(key, _, label)| {
                    [
                        Span::styled(format!(" {key} "), Style::default().fg(palette.background).bg(palette.accent)),
                        Span::styled(format!(" {label}   "), Style::default().fg(palette.text)),
                    ]
                })
                .collect::<Vec<_>>(),
        ));
        frame.render_widget(Paragraph::new(intro).wrap(Wrap { trim: true }), layout[0]);

        let stats: Vec<Span> = self
            .counts
            .iter()
            .flat_map(|(count, label)| {
                [
                    Span::styled(
                        format!(" {count} "),
                        Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(format!("{label}    "), Style::default().fg(palette.muted)),
                ]
            })
            .collect();
        frame.render_widget(Paragraph::new(Line::from(stats)).block(panel(" At a glance ", &palette)), layout[1]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(layout[2]);

        let items: Vec<ListItem> = self
            .featured
            .iter()
            .map(|fort| {
                ListItem::new(vec![
                    Line::from(Span::styled(
                        fort.name.as_str(),
                        Style::default().fg(palette.text).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        format!("  {} · {} · {}", fort.district, height_label(fort.height), fort.best_time),
                        Style::default().fg(palette.muted),
                    )),
                ])
            })
            .collect();
        frame.render_widget(List::new(items).block(panel(" Featured forts ", &palette)), body[0]);

        let about = vec![
            Line::from(
                "Maharashtra is home to over 350 forts built across centuries by the Maratha Empire, \
                 Mughals, British, Portuguese, and other dynasties.",
            ),
            Line::from(""),
            Line::from(
                "The Western Ghats, a UNESCO World Heritage biodiversity hotspot, surround many of these forts \
                 with lush forests, rare medicinal plants, and endemic species.",
            ),
            Line::from(""),
            Line::from(Span::styled("✓ Detailed fort histories", Style::default().fg(palette.success))),
            Line::from(Span::styled("✓ Flora & medicinal plants", Style::default().fg(palette.success))),
            Line::from(Span::styled("✓ AI-powered advice", Style::default().fg(palette.success))),
            Line::from(Span::styled("✓ Dark & light mode (Ctrl+T)", Style::default().fg(palette.success))),
        ];
        let about = Paragraph::new(about)
            .style(Style::default().fg(palette.text))
            .wrap(Wrap { trim: true })
            .scroll((cx.scroll, 0))
            .block(panel(" About Fort-Flora ", &palette));
        frame.render_widget(about, body[1]);
    }

    fn handle_event(&mut self, event: Event, _cx: &mut EventContext<Self>) -> Option<Action> {
        let Event::Key(key) = event else {
            return None;
        };
        let KeyCode::Char(pressed) = key.code else {
            return None;
        };
        SHORTCUTS
            .iter()
            .find(|(shortcut, _, _)| *shortcut == pressed)
            .map(|(_, route, _)| Action::Navigate(route.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;
    use fort_nexus::AppContext;

    #[test]
    fn test_shortcuts_navigate() {
        let theme = Entity::new(Theme::Dark);
        let mut page = HomePage::new(&theme);
        let mut cx = Context::<HomePage>::new(AppContext::headless(), Default::default());

        let action = page.handle_event(Event::Key(KeyEvent::from(KeyCode::Char('f'))), &mut cx);
        assert_eq!(action, Some(Action::Navigate("/forts".to_string())));
        assert_eq!(page.handle_event(Event::Key(KeyEvent::from(KeyCode::Char('z'))), &mut cx), None);
    }

    #[test]
    fn test_counts_come_from_seed() {
        let page = HomePage::new(&Entity::new(Theme::Dark));
        assert_eq!(page.counts[0].0, seed::forts().len());
        assert_eq!(page.featured.len(), FEATURED);
    }
}
