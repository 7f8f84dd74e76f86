//! Error dialog for failed requests and blocked builds

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

#[derive(Default)]
pub struct ErrorDialog {
    pub message: String,
}

impl Component for ErrorDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => Some(Action::CloseModal),
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let width = area.width.saturating_sub(8).min(80);
        let height = (self.message.lines().count() as u16 + 6).min(area.height);
        let popup_area = centered_popup(area, width, height);
        frame.render_widget(Clear, popup_area);

        let mut content = vec![Line::from("")];
        content.extend(self.message.lines().map(|l| {
            Line::from(Span::styled(format!(" {}", l), Style::default().fg(Color::White)))
        }));
        content.push(Line::from(""));
        content.push(Line::from(vec![
            Span::styled(
                " Enter/Esc ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::raw("Close"),
        ]));

        let paragraph = Paragraph::new(content)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red))
                    .title(" Error ")
                    .title_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            )
            .wrap(Wrap { trim: false });

        frame.render_widget(paragraph, popup_area);
        Ok(())
    }
}
