use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{Toast, ToastLevel};
use crate::ui::helpers::truncate;

pub struct ToastWidget<'a> {
    toast: &'a Toast,
}

impl<'a> ToastWidget<'a> {
    pub fn new(toast: &'a Toast) -> Self {
        Self { toast }
    }

    pub fn render(self, frame: &mut Frame) {
        let area = toast_area(frame.area(), self.toast.message.chars().count());
        frame.render_widget(Clear, area);

        let (color, icon) = match self.toast.level {
            ToastLevel::Success => (Color::Green, "✓"),
            ToastLevel::Info => (Color::Cyan, "ℹ"),
            ToastLevel::Warning => (Color::Yellow, "⚠"),
            ToastLevel::Error => (Color::Red, "✗"),
        };
        let room = area.width.saturating_sub(6) as usize;

        let paragraph = Paragraph::new(Line::from(vec![
            Span::styled(
                format!(" {} ", icon),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                truncate(&self.toast.message, room),
                Style::default().fg(color),
            ),
        ]))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        );

        frame.render_widget(paragraph, area);
    }
}

/// Bottom-right corner, clear of the status bar.
fn toast_area(frame_area: Rect, message_len: usize) -> Rect {
    let height = 3u16.min(frame_area.height);
    let max_width = frame_area.width.saturating_sub(2);
    let width = (message_len as u16).saturating_add(6).clamp(20.min(max_width), max_width);

    Rect {
        x: frame_area.x + frame_area.width.saturating_sub(width + 1),
        y: frame_area.y + frame_area.height.saturating_sub(height + 2),
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_fits_small_terminal() {
        let area = toast_area(Rect::new(0, 0, 30, 10), 200);
        assert!(area.right() <= 30);
        assert!(area.bottom() <= 10);
        assert_eq!(area.width, 28);
    }
}
