use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, List, ListItem, Paragraph};
use wayfinder::l10n;
use wayfinder::{Input, Outcome, Presentable};

/// Conversation list shown after sign-in. Contents are placeholder data;
/// real messaging is outside the navigation core.
pub struct ConversationsScreen {
    selected: usize,
    conversations: Vec<&'static str>,
    invites: Vec<&'static str>,
}

impl ConversationsScreen {
    pub fn new() -> Self {
        Self {
            selected: 0,
            conversations: vec!["Ops weekly", "Design review", "Alice", "Release crew"],
            invites: vec!["Bob"],
        }
    }
}

impl Presentable for ConversationsScreen {
    fn render(&mut self, frame: &mut ratatui::Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(area);

        let mut items: Vec<ListItem> = Vec::new();
        items.push(ListItem::new(Line::styled(
            l10n::tr("app", "conversations_invites_section"),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD),
        )));
        for invite in &self.invites {
            items.push(ListItem::new(Line::from(vec![
                Span::raw("  "),
                Span::styled(*invite, Style::default().fg(Color::Yellow)),
            ])));
        }
        items.push(ListItem::new(Line::styled(
            l10n::tr("app", "conversations_section"),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD),
        )));
        for (i, name) in self.conversations.iter().enumerate() {
            let selected = i == self.selected;
            let marker = if selected { "▶ " } else { "  " };
            let style = if selected {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            items.push(ListItem::new(Line::from(vec![
                Span::raw(marker),
                Span::styled(*name, style),
            ])));
        }

        let list = List::new(items).block(
            Block::default()
                .title(format!(" {} ", l10n::tr("app", "conversations_title")))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        );
        frame.render_widget(list, chunks[0]);

        let footer = Paragraph::new(l10n::tr("app", "conversations_hint"))
            .style(Style::default().bg(Color::Cyan).fg(Color::Black))
            .alignment(Alignment::Center);
        frame.render_widget(footer, chunks[1]);
    }

    fn handle_input(&mut self, input: Input) -> Outcome {
        match input {
            Input::Key(key) => match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    if self.selected > 0 {
                        self.selected -= 1;
                    }
                    Outcome::Consumed
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    if self.selected + 1 < self.conversations.len() {
                        self.selected += 1;
                    }
                    Outcome::Consumed
                }
                KeyCode::Char('q') | KeyCode::Esc => Outcome::Quit,
                _ => Outcome::Ignored,
            },
            _ => Outcome::Ignored,
        }
    }
}
