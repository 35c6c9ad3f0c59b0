use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use crate::git::RepoStatus;

pub const STYLE_LABEL: Style = Style::new().fg(Color::White);
pub const STYLE_LABEL_SELECTED: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);
pub const STYLE_VALUE: Style = Style::new().fg(Color::Gray);
pub const STYLE_VALUE_SELECTED: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
pub const STYLE_TOGGLE: Style = Style::new().fg(Color::Green);
pub const STYLE_TOGGLE_SELECTED: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);
pub const STYLE_SEPARATOR: Style = Style::new().fg(Color::DarkGray);
pub const STYLE_INDENT: Style = Style::new();
pub const STYLE_CURSOR: Style = Style::new().fg(Color::White);
pub const STYLE_FOOTER: Style = Style::new().fg(Color::DarkGray);

/// Background of the highlighted row in tables and menus.
pub const SELECTED_BG: Color = Color::Rgb(40, 44, 52);

/// Braille spinner frames, indexed by the animation frame.
pub const SPINNER_FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub fn spinner(frame: usize) -> char {
    SPINNER_FRAMES[frame % SPINNER_FRAMES.len()]
}

#[derive(Debug, Clone, Copy, Default)]
pub enum CursorType {
    #[default]
    None,
    Arrow,
}

#[derive(Debug, Clone)]
pub struct FieldLineOptions {
    pub label_width: usize,
    pub cursor: CursorType,
    pub is_toggle: bool,
}

impl Default for FieldLineOptions {
    fn default() -> Self {
        Self {
            label_width: 12,
            cursor: CursorType::None,
            is_toggle: false,
        }
    }
}

impl FieldLineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label_width(mut self, width: usize) -> Self {
        self.label_width = width;
        self
    }

    pub fn cursor(mut self, cursor: CursorType) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn is_toggle(mut self, is_toggle: bool) -> Self {
        self.is_toggle = is_toggle;
        self
    }
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// `label: value` row for settings-style screens.
pub fn render_field_line(
    label: &str,
    value: &str,
    is_selected: bool,
    options: FieldLineOptions,
) -> Line<'static> {
    let label_style = if is_selected {
        STYLE_LABEL_SELECTED
    } else {
        STYLE_LABEL
    };

    let value_style = match (options.is_toggle, is_selected) {
        (true, true) => STYLE_TOGGLE_SELECTED,
        (true, false) => STYLE_TOGGLE,
        (false, true) => STYLE_VALUE_SELECTED,
        (false, false) => STYLE_VALUE,
    };

    let cursor = match options.cursor {
        CursorType::None => "",
        CursorType::Arrow => " ◀",
    };
    let display_cursor = if is_selected { cursor } else { "" };

    Line::from(vec![
        Span::styled("    ", STYLE_INDENT),
        Span::styled(
            format!("{:width$}", label, width = options.label_width),
            label_style,
        ),
        Span::styled(": ", STYLE_SEPARATOR),
        Span::styled(value.to_string(), value_style),
        Span::styled(display_cursor.to_string(), STYLE_CURSOR),
    ])
}

/// Short label and color for a repository's working tree state.
pub fn status_label(status: RepoStatus, text: &str, behind: u32) -> (String, Color) {
    match status {
        RepoStatus::Unknown => ("…".to_string(), Color::DarkGray),
        RepoStatus::Clean => ("✓ clean".to_string(), Color::Green),
        RepoStatus::CleanBehind => (format!("↓ {} behind", behind), Color::Yellow),
        RepoStatus::Dirty => (format!("● {}", text), Color::Red),
        RepoStatus::Error => ("✗ error".to_string(), Color::Red),
    }
}

/// Truncate to `max` characters, marking the cut with an ellipsis.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("héllo", 10), "héllo");
        assert_eq!(truncate("abcdefgh", 4), "abc…");
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(status_label(RepoStatus::CleanBehind, "", 3).0, "↓ 3 behind");
        assert_eq!(status_label(RepoStatus::Dirty, "2 changed", 0).0, "● 2 changed");
    }
}
