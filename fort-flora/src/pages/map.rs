//! Fort locations plotted over Maharashtra.

use super::common::{height_label, hero, palette, panel, truncate, Loading};
use crate::model::Fort;
use crate::services::AppServices;
use async_trait::async_trait;
use crossterm::event::KeyCode;
use fort_nexus::{Action, Component, Context, Event, EventContext, MountTarget, View};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Points},
        Paragraph, Wrap,
    },
};

/// Latitude range drawn on the map.
pub const LATITUDE: [f64; 2] = [15.6, 22.1];
/// Longitude range drawn on the map.
pub const LONGITUDE: [f64; 2] = [72.6, 80.9];

pub const POPUP_HISTORY_CHARS: usize = 150;

fn within(value: f64, [low, high]: [f64; 2]) -> bool {
    (low..=high).contains(&value)
}

/// Forts that can be drawn, west to east.
///
/// Forts without coordinates or outside the map are left out.
pub fn markers(forts: &[Fort]) -> Vec<Fort> {
    let mut plotted: Vec<Fort> = forts
        .iter()
        .filter(|fort| {
            fort.coordinates()
                .is_some_and(|(lat, lng)| within(lat, LATITUDE) && within(lng, LONGITUDE))
        })
        .cloned()
        .collect();
    plotted.sort_by(|a, b| {
        let (a, b) = (a.longitude.unwrap_or_default(), b.longitude.unwrap_or_default());
        a.total_cmp(&b)
    });
    plotted
}

/// Lines of the popup shown for the selected marker.
pub fn popup(fort: &Fort) -> Vec<String> {
    vec![
        fort.name.clone(),
        format!("{} · {}", fort.district, height_label(fort.height)),
        truncate(&fort.history, POPUP_HISTORY_CHARS),
    ]
}

pub struct MapView {
    services: AppServices,
}

impl MapView {
    pub fn new(services: &AppServices) -> Self {
        Self {
            services: services.clone(),
        }
    }
}

#[async_trait]
impl View for MapView {
    async fn render(&self, target: MountTarget) -> anyhow::Result<()> {
        target.mount(Loading::new("map", &self.services.theme))?;
        let forts = self.services.store.forts().await;
        target.mount(MapPage::new(&self.services, &forts))?;
        Ok(())
    }
}

pub struct MapPage {
    services: AppServices,
    markers: Vec<Fort>,
    selected: usize,
}

impl MapPage {
    pub fn new(services: &AppServices, forts: &[Fort]) -> Self {
        Self {
            services: services.clone(),
            markers: markers(forts),
            selected: 0,
        }
    }

    pub fn selected(&self) -> Option<&Fort> {
        self.markers.get(self.selected)
    }
}

impl Component for MapPage {
    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context<Self>) {
        let palette = palette(&self.services.theme);
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
            .split(cx.area);
        frame.render_widget(
            Paragraph::new(hero(
                "Interactive Fort Map",
                "Explore Maharashtra's forts on the map. Select a marker for details.",
                &palette,
            )),
            layout[0],
        );

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(layout[1]);

        let hill: Vec<(f64, f64)> = self
            .markers
            .iter()
            .filter(|fort| !fort.is_sea_fort())
            .filter_map(|fort| fort.coordinates().map(|(lat, lng)| (lng, lat)))
            .collect();
        let sea: Vec<(f64, f64)> = self
            .markers
            .iter()
            .filter(|fort| fort.is_sea_fort())
            .filter_map(|fort| fort.coordinates().map(|(lat, lng)| (lng, lat)))
            .collect();
        let selected = self.selected().cloned();

        let map = Canvas::default()
            .block(panel(" Maharashtra ", &palette))
            .background_color(palette.background)
            .marker(Marker::Braille)
            .x_bounds(LONGITUDE)
            .y_bounds(LATITUDE)
            .paint(|ctx| {
                ctx.draw(&Points {
                    coords: &hill,
                    color: palette.success,
                });
                ctx.draw(&Points {
                    coords: &sea,
                    color: palette.highlight,
                });
                if let Some(fort) = &selected {
                    if let Some((lat, lng)) = fort.coordinates() {
                        ctx.layer();
                        ctx.print(
                            lng,
                            lat,
                            Line::from(Span::styled(
                                format!("◆ {}", fort.name),
                                Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
                            )),
                        );
                    }
                }
            });
        frame.render_widget(map, body[0]);

        let details = match &selected {
            Some(fort) => {
                let mut lines = popup(fort).into_iter();
                let mut text = vec![Line::from(Span::styled(
                    lines.next().unwrap_or_default(),
                    Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
                ))];
                text.extend(lines.map(Line::from));
                text.push(Line::from(""));
                text.push(Line::from(Span::styled(
                    "Enter: view all forts",
                    Style::default().fg(palette.muted),
                )));
                text
            }
            None => vec![Line::from("No forts with coordinates to show.")],
        };
        let details = Paragraph::new(details)
            .style(Style::default().fg(palette.text))
            .wrap(Wrap { trim: true })
            .block(panel(format!(" {} of {} ", self.selected + 1, self.markers.len()), &palette));
        frame.render_widget(details, body[1]);

        let legend = Line::from(vec![
            Span::styled(" ● Hill fort ", Style::default().fg(palette.success)),
            Span::styled(" ● Sea fort ", Style::default().fg(palette.highlight)),
            Span::styled("  ←/→ select marker · Enter all forts ", Style::default().fg(palette.muted)),
        ]);
        frame.render_widget(Paragraph::new(legend), layout[2]);
    }

    fn handle_event(&mut self, event: Event, _cx: &mut EventContext<Self>) -> Option<Action> {
        let Event::Key(key) = event else {
            return None;
        };
        let count = self.markers.len();
        if count == 0 {
            return None;
        }
        match key.code {
            KeyCode::Right | KeyCode::Down => self.selected = (self.selected + 1) % count,
            KeyCode::Left | KeyCode::Up => self.selected = (self.selected + count - 1) % count,
            KeyCode::Enter => return Some(Action::Navigate("/forts".to_string())),
            _ => {}
        }
        None
    }
}
