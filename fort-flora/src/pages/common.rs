//! Pieces shared by several pages.

use crate::model::{Palette, Theme};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fort_nexus::{Component, Context, Entity};
use ratatui::{
    layout::Alignment,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};

pub fn palette(theme: &Entity<Theme>) -> Palette {
    theme.read(|theme| *theme).unwrap_or_default().palette()
}

/// Rounded, titled block in the accent color.
pub fn panel<'a>(title: impl Into<Line<'a>>, palette: &Palette) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.accent))
}

/// Heading lines every page starts with.
pub fn hero<'a>(title: &'a str, subtitle: &'a str, palette: &Palette) -> Vec<Line<'a>> {
    vec![
        Line::from(Span::styled(
            title,
            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(subtitle, Style::default().fg(palette.muted))),
        Line::from(""),
    ]
}

/// Cut `text` to at most `max_chars` characters, marking the cut with `…`.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.push('…');
    cut
}

/// "1312m" for hill forts, "Sea Fort" otherwise.
pub fn height_label(height: i32) -> String {
    if height > 0 {
        format!("{height}m")
    } else {
        "Sea Fort".to_string()
    }
}

/// Single-line text entry.
#[derive(Debug, Default, Clone)]
pub struct LineInput {
    value: String,
    masked: bool,
}

impl LineInput {
    pub fn masked() -> Self {
        Self {
            value: String::new(),
            masked: true,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    /// Take the value, leaving the input empty.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.value)
    }

    /// Apply an editing key. Returns false for keys that are not edits.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return false;
        }
        match key.code {
            KeyCode::Char(c) => {
                self.value.push(c);
                true
            }
            KeyCode::Backspace => self.value.pop().is_some(),
            _ => false,
        }
    }

    pub fn paste(&mut self, text: &str) {
        self.value.extend(text.chars().filter(|c| !c.is_control()));
    }

    /// What to draw: the value (or bullets) and a cursor when focused.
    pub fn display(&self, focused: bool) -> String {
        let mut shown = if self.masked {
            "•".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        };
        if focused {
            shown.push('▏');
        }
        shown
    }
}

/// Placeholder mounted while a page fetches its data.
pub struct Loading {
    what: &'static str,
    theme: Entity<Theme>,
}

impl Loading {
    pub fn new(what: &'static str, theme: &Entity<Theme>) -> Self {
        Self {
            what,
            theme: theme.clone(),
        }
    }
}

impl Component for Loading {
    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context<Self>) {
        let palette = palette(&self.theme);
        let text = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("Loading {}…", self.what),
                Style::default().fg(palette.muted),
            )),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
        frame.render_widget(text, cx.area);
    }
}
