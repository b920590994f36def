//! Biodiversity analytics over the loaded forts and flora.

use super::common::{hero, palette, panel, Loading};
use crate::model::{Flora, Fort};
use crate::seed;
use crate::services::AppServices;
use async_trait::async_trait;
use fort_nexus::{Component, Context, MountTarget, View};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Gauge, Paragraph},
};

/// Headline numbers shown above the charts.
#[derive(Debug, Clone, PartialEq)]
pub struct Totals {
    pub forts: usize,
    pub flora: usize,
    pub districts: usize,
    /// Flora per fort, rounded to two decimals.
    pub average: f64,
}

pub fn totals(forts: &[Fort], flora: &[Flora]) -> Totals {
    let average = if forts.is_empty() {
        0.0
    } else {
        (flora.len() as f64 / forts.len() as f64 * 100.0).round() / 100.0
    };
    Totals {
        forts: forts.len(),
        flora: flora.len(),
        districts: seed::districts_of(forts).len(),
        average,
    }
}

/// Fort count per district, districts sorted by name.
pub fn district_counts(forts: &[Fort]) -> Vec<(String, u64)> {
    seed::districts_of(forts)
        .into_iter()
        .map(|district| {
            let count = forts.iter().filter(|fort| fort.district == district).count() as u64;
            (district, count)
        })
        .collect()
}

/// Plant count per fort name, in order of first appearance. Plants whose
/// fort is not among `forts` count towards "Unknown".
pub fn flora_per_fort(forts: &[Fort], flora: &[Flora]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for plant in flora {
        let name = plant
            .fort_id
            .and_then(|id| forts.iter().find(|fort| fort.id == id))
            .map_or("Unknown", |fort| fort.name.as_str());
        match counts.iter_mut().find(|(seen, _)| seen == name) {
            Some((_, count)) => *count += 1,
            None => counts.push((name.to_string(), 1)),
        }
    }
    counts
}

pub struct DashboardView {
    services: AppServices,
}

impl DashboardView {
    pub fn new(services: &AppServices) -> Self {
        Self {
            services: services.clone(),
        }
    }
}

#[async_trait]
impl View for DashboardView {
    async fn render(&self, target: MountTarget) -> anyhow::Result<()> {
        target.mount(Loading::new("analytics", &self.services.theme))?;
        let (forts, flora) = tokio::join!(self.services.store.forts(), self.services.store.flora());
        target.mount(DashboardPage::new(&self.services, &forts, &flora))?;
        Ok(())
    }
}

pub struct DashboardPage {
    services: AppServices,
    totals: Totals,
    districts: Vec<(String, u64)>,
    flora_per_fort: Vec<(String, usize)>,
}

impl DashboardPage {
    pub fn new(services: &AppServices, forts: &[Fort], flora: &[Flora]) -> Self {
        Self {
            services: services.clone(),
            totals: totals(forts, flora),
            districts: district_counts(forts),
            flora_per_fort: flora_per_fort(forts, flora),
        }
    }
}

impl Component for DashboardPage {
    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context<Self>) {
        let palette = palette(&self.services.theme);
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Min(0)])
            .split(cx.area);

        frame.render_widget(
            Paragraph::new(hero(
                "Biodiversity Analytics",
                "Live statistics on Maharashtra's forts and their surrounding flora",
                &palette,
            )),
            layout[0],
        );

        let stats = [
            (self.totals.forts.to_string(), "Total Forts"),
            (self.totals.flora.to_string(), "Flora Species"),
            (self.totals.districts.to_string(), "Districts Covered"),
            (format!("{:.2}", self.totals.average), "Avg Flora/Fort"),
        ];
        let cards = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 4); 4])
            .split(layout[1]);
        for ((value, label), area) in stats.iter().zip(cards.iter()) {
            let card = Paragraph::new(Line::from(vec![
                Span::styled(
                    format!(" {value} "),
                    Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
                ),
                Span::styled(*label, Style::default().fg(palette.muted)),
            ]))
            .block(panel("", &palette));
            frame.render_widget(card, *area);
        }

        let charts = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(layout[2]);

        let bars: Vec<(&str, u64)> = self
            .districts
            .iter()
            .map(|(district, count)| (district.as_str(), *count))
            .collect();
        let chart = BarChart::default()
            .block(panel(" District-wise Fort Distribution ", &palette))
            .data(bars.as_slice())
            .bar_width(9)
            .bar_gap(2)
            .bar_style(Style::default().fg(palette.success))
            .value_style(Style::default().fg(palette.background).bg(palette.success))
            .label_style(Style::default().fg(palette.muted));
        frame.render_widget(chart, charts[0]);

        // One gauge row per fort, scaled against the largest count.
        let block = panel(" Flora per Fort ", &palette);
        let inner = block.inner(charts[1]);
        frame.render_widget(block, charts[1]);
        let most = self.flora_per_fort.iter().map(|(_, count)| *count).max().unwrap_or(1).max(1);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Length(1); self.flora_per_fort.len()])
            .split(inner);
        for ((name, count), row) in self.flora_per_fort.iter().zip(rows.iter()) {
            let gauge = Gauge::default()
                .gauge_style(Style::default().fg(palette.highlight).bg(palette.background))
                .ratio(*count as f64 / most as f64)
                .label(format!("{name}: {count}"));
            frame.render_widget(gauge, *row);
        }
    }
}
