use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use tokio::sync::mpsc;
use wayfinder::l10n;
use wayfinder::{Input, Outcome, Presentable};

use crate::app::AppEvent;

/// First screen of the application; offers nothing but the way in.
pub struct WelcomeScreen {
    events: mpsc::UnboundedSender<AppEvent>,
}

impl WelcomeScreen {
    pub fn new(events: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { events }
    }
}

impl Presentable for WelcomeScreen {
    fn render(&mut self, frame: &mut ratatui::Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(area);

        let body = Paragraph::new(vec![
            Line::from(""),
            Line::styled(
                l10n::tr("app", "welcome_title"),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Line::from(""),
            Line::styled(l10n::tr("app", "welcome_subtitle"), Style::default().fg(Color::DarkGray)),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded));
        frame.render_widget(body, chunks[0]);

        let footer = Paragraph::new(l10n::tr("app", "welcome_hint"))
            .style(Style::default().bg(Color::Cyan).fg(Color::Black))
            .alignment(Alignment::Center);
        frame.render_widget(footer, chunks[1]);
    }

    fn handle_input(&mut self, input: Input) -> Outcome {
        match input {
            Input::Key(key) => match key.code {
                KeyCode::Enter => {
                    let _ = self.events.send(AppEvent::SignInRequested);
                    Outcome::Consumed
                }
                KeyCode::Char('q') | KeyCode::Esc => Outcome::Quit,
                _ => Outcome::Ignored,
            },
            _ => Outcome::Ignored,
        }
    }
}
