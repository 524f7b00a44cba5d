use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use tokio::sync::mpsc;
use wayfinder::l10n;
use wayfinder::{Input, Outcome, Presentable};

use crate::auth::AuthEvent;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Clone, Copy, PartialEq)]
enum Field {
    Email,
    Password,
}

/// Sign-in form. Validation failures are a domain concern and stay on this
/// screen; only a valid submission reaches the auth coordinator.
pub struct LoginScreen {
    events: mpsc::UnboundedSender<AuthEvent>,
    email: String,
    password: String,
    field: Field,
    error: Option<String>,
    submitting: bool,
}

impl LoginScreen {
    pub fn new(events: mpsc::UnboundedSender<AuthEvent>) -> Self {
        Self {
            events,
            email: String::new(),
            password: String::new(),
            field: Field::Email,
            error: None,
            submitting: false,
        }
    }

    fn submit(&mut self) {
        if !self.email.contains('@') {
            self.error = Some(l10n::tr("app", "auth_error_invalid_email"));
            return;
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            self.error = Some(l10n::tr_args(
                "app",
                "auth_error_invalid_password",
                &[&MIN_PASSWORD_LEN],
            ));
            return;
        }
        self.error = None;
        self.submitting = true;
        let _ = self.events.send(AuthEvent::Credentials {
            email: self.email.clone(),
        });
    }

    fn active_mut(&mut self) -> &mut String {
        match self.field {
            Field::Email => &mut self.email,
            Field::Password => &mut self.password,
        }
    }

    fn field_line(&self, field: Field, label: String, value: String) -> Line<'static> {
        let marker = if self.field == field && !self.submitting { "▶ " } else { "  " };
        let style = if self.field == field {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::White)
        };
        Line::from(vec![
            Span::styled(marker.to_string(), style),
            Span::styled(format!("{label}: "), Style::default().fg(Color::DarkGray)),
            Span::styled(value, style),
        ])
    }
}

impl Presentable for LoginScreen {
    fn render(&mut self, frame: &mut ratatui::Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(area);

        let masked: String = self.password.chars().map(|_| '•').collect();
        let mut lines = vec![
            Line::from(""),
            Line::styled(
                l10n::tr("app", "auth_title"),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Line::from(""),
            self.field_line(Field::Email, l10n::tr("app", "auth_email_placeholder"), self.email.clone()),
            self.field_line(Field::Password, l10n::tr("app", "auth_password_placeholder"), masked),
            Line::from(""),
        ];
        if let Some(error) = &self.error {
            lines.push(Line::styled(error.clone(), Style::default().fg(Color::Red)));
        }
        if self.submitting {
            lines.push(Line::styled(
                l10n::tr("app", "auth_signing_in"),
                Style::default().fg(Color::Yellow),
            ));
        }

        let body = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded));
        frame.render_widget(body, chunks[0]);

        let footer = Paragraph::new(l10n::tr("app", "auth_hint"))
            .style(Style::default().bg(Color::Cyan).fg(Color::Black))
            .alignment(Alignment::Center);
        frame.render_widget(footer, chunks[1]);
    }

    fn handle_input(&mut self, input: Input) -> Outcome {
        if self.submitting {
            return Outcome::Ignored;
        }
        match input {
            Input::Key(key) => match key.code {
                KeyCode::Tab | KeyCode::Down | KeyCode::Up => {
                    self.field = match self.field {
                        Field::Email => Field::Password,
                        Field::Password => Field::Email,
                    };
                    Outcome::Consumed
                }
                KeyCode::Char(c) => {
                    self.active_mut().push(c);
                    Outcome::Consumed
                }
                KeyCode::Backspace => {
                    self.active_mut().pop();
                    Outcome::Consumed
                }
                KeyCode::Enter => {
                    self.submit();
                    Outcome::Consumed
                }
                _ => Outcome::Ignored,
            },
            Input::Paste(text) => {
                self.active_mut().push_str(&text);
                Outcome::Consumed
            }
            _ => Outcome::Ignored,
        }
    }
}
