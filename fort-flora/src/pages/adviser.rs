//! Chat with the fort and flora adviser.

use super::common::{hero, palette, panel, LineInput};
use crate::services::completion::{Role, Turn};
use crate::services::AppServices;
use async_trait::async_trait;
use crossterm::event::KeyCode;
use fort_nexus::{Action, Component, Context, Entity, Event, EventContext, MountTarget, TaskTracker, View};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};
use tracing::debug;

/// Offered until the first message is sent.
pub const STARTERS: [&str; 5] = [
    "What is the history of Raigad Fort?",
    "Which forts are best for monsoon trekking?",
    "Tell me about medicinal plants near Sinhagad.",
    "What are the top 5 forts for beginners?",
    "Which sea forts can I visit in Maharashtra?",
];

pub struct AdviserView {
    services: AppServices,
}

impl AdviserView {
    pub fn new(services: &AppServices) -> Self {
        Self {
            services: services.clone(),
        }
    }
}

#[async_trait]
impl View for AdviserView {
    async fn render(&self, target: MountTarget) -> anyhow::Result<()> {
        target.mount(AdviserPage::new(&self.services))?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct Chat {
    pub turns: Vec<Turn>,
    /// A reply is on its way.
    pub waiting: bool,
    starter: usize,
}

pub struct AdviserPage {
    services: AppServices,
    chat: Entity<Chat>,
    input: LineInput,
    tasks: TaskTracker,
}

impl AdviserPage {
    pub fn new(services: &AppServices) -> Self {
        Self {
            services: services.clone(),
            chat: Entity::new(Chat::default()),
            input: LineInput::default(),
            tasks: TaskTracker::new(),
        }
    }

    pub fn transcript(&self) -> Vec<Turn> {
        self.chat.read(|chat| chat.turns.clone()).unwrap_or_default()
    }

    pub fn is_waiting(&self) -> bool {
        self.chat.read(|chat| chat.waiting).unwrap_or(false)
    }

    /// Send `message` unless it is blank or a reply is still pending.
    /// Returns whether the message went out.
    pub fn send(&mut self, message: &str, cx: &Context<Self>) -> bool {
        let message = message.trim().to_string();
        if message.is_empty() {
            return false;
        }
        let prior = self
            .chat
            .update(|chat| {
                if chat.waiting {
                    return None;
                }
                let prior = chat.turns.clone();
                chat.turns.push(Turn::user(message.clone()));
                chat.waiting = true;
                Some(prior)
            })
            .ok()
            .flatten();
        let Some(prior) = prior else {
            return false;
        };

        debug!(turns = prior.len(), "asking the adviser");
        let adviser = self.services.adviser.clone();
        let chat = self.chat.clone();
        self.tasks.track(cx.spawn_task(move |_| async move {
            let reply = adviser.ask(&prior, &message).await;
            let _ = chat.update(|chat| {
                chat.turns.push(Turn::assistant(reply));
                chat.waiting = false;
            });
        }));
        true
    }

    fn transcript_lines(&self, chat: &Chat, palette: &crate::model::Palette) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        if chat.turns.is_empty() {
            lines.push(Line::from(Span::styled(
                "Ask about forts, trekking routes or the plants that grow around them.",
                Style::default().fg(palette.muted),
            )));
            lines.push(Line::from(""));
            for (index, question) in STARTERS.iter().enumerate() {
                let style = if index == chat.starter {
                    Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(palette.text)
                };
                lines.push(Line::from(Span::styled(format!(" {}. {question}", index + 1), style)));
            }
            return lines;
        }

        for turn in &chat.turns {
            let (who, style) = match turn.role {
                Role::User => ("You", Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)),
                _ => ("Adviser", Style::default().fg(palette.success).add_modifier(Modifier::BOLD)),
            };
            lines.push(Line::from(Span::styled(who, style)));
            lines.extend(
                turn.content
                    .lines()
                    .map(|line| Line::from(Span::styled(line.to_string(), Style::default().fg(palette.text)))),
            );
            lines.push(Line::from(""));
        }
        if chat.waiting {
            lines.push(Line::from(Span::styled(
                "Adviser is typing…",
                Style::default().fg(palette.muted).add_modifier(Modifier::ITALIC),
            )));
        }
        lines
    }
}

impl Component for AdviserPage {
    fn on_mount(&mut self, cx: &mut Context<Self>) {
        self.tasks.track(cx.subscribe(&self.chat));
    }

    fn on_exit(&mut self, _cx: &mut Context<Self>) {
        self.tasks.abort_all();
    }

    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context<Self>) {
        let palette = palette(&self.services.theme);
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(cx.area);

        let subtitle = if self.services.adviser.is_configured() {
            "Your guide to Maharashtra's forts and their flora"
        } else {
            "Your guide to Maharashtra's forts and their flora (completion service not configured)"
        };
        frame.render_widget(Paragraph::new(hero("AI Fort Adviser", subtitle, &palette)), layout[0]);

        let (lines, waiting, fresh) = self
            .chat
            .read(|chat| (self.transcript_lines(chat, &palette), chat.waiting, chat.turns.is_empty()))
            .unwrap_or_default();

        // Keep the newest lines in view.
        let visible = layout[1].height.saturating_sub(2);
        let overflow = (lines.len() as u16).saturating_sub(visible);
        let transcript = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((overflow, 0))
            .block(panel(" Conversation ", &palette));
        frame.render_widget(transcript, layout[1]);

        let input_title = if waiting { " Waiting for reply " } else { " Message " };
        let input = Paragraph::new(self.input.display(!waiting))
            .style(Style::default().fg(palette.text))
            .block(panel(input_title, &palette));
        frame.render_widget(input, layout[2]);

        let hint = if fresh {
            " ↑/↓ pick a question · 1-5 ask it · type your own · Enter send "
        } else {
            " Enter send "
        };
        frame.render_widget(Paragraph::new(hint).style(Style::default().fg(palette.muted)), layout[3]);
    }

    fn handle_event(&mut self, event: Event, cx: &mut EventContext<Self>) -> Option<Action> {
        let key = match event {
            Event::Paste(text) => {
                self.input.paste(&text);
                return None;
            }
            Event::Key(key) => key,
            _ => return None,
        };

        let fresh = self.chat.read(|chat| chat.turns.is_empty()).unwrap_or(false);
        let typing = !self.input.value().is_empty();
        match key.code {
            KeyCode::Enter if typing => {
                let message = self.input.value().to_string();
                if self.send(&message, cx) {
                    self.input.clear();
                }
            }
            KeyCode::Enter if fresh => {
                let starter = self.chat.read(|chat| chat.starter).unwrap_or(0);
                self.send(STARTERS[starter], cx);
            }
            KeyCode::Char(digit @ '1'..='5') if fresh && !typing => {
                let index = digit as usize - '1' as usize;
                self.send(STARTERS[index], cx);
            }
            KeyCode::Up | KeyCode::Down if fresh => {
                let _ = self.chat.update(|chat| {
                    chat.starter = match key.code {
                        KeyCode::Up => (chat.starter + STARTERS.len() - 1) % STARTERS.len(),
                        _ => (chat.starter + 1) % STARTERS.len(),
                    };
                });
            }
            _ => {
                self.input.handle_key(&key);
            }
        }
        None
    }
}
