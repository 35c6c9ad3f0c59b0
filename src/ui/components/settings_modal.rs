use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::Config;
use crate::ui::helpers::{
    centered_rect, render_field_line, CursorType, FieldLineOptions, STYLE_FOOTER, STYLE_LABEL,
    STYLE_LABEL_SELECTED, STYLE_SEPARATOR,
};

pub struct SettingsModal<'a> {
    config: &'a Config,
    selected: usize,
    git_dir: &'a str,
}

impl<'a> SettingsModal<'a> {
    pub fn new(config: &'a Config, selected: usize, git_dir: &'a str) -> Self {
        Self {
            config,
            selected,
            git_dir,
        }
    }

    pub fn render(self, frame: &mut Frame) {
        let area = centered_rect(60, 50, frame.area());
        frame.render_widget(Clear, area);

        let block = Block::default()
            .title(" SETTINGS ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(8), Constraint::Length(2)])
            .split(inner);

        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Fetch mode",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
        ];

        for (i, mode) in crate::app::FetchMode::all().iter().enumerate() {
            let selected = i == self.selected;
            let radio = if *mode == self.config.fetch_mode {
                "(•)"
            } else {
                "( )"
            };
            let label_style = if selected {
                STYLE_LABEL_SELECTED
            } else {
                STYLE_LABEL
            };
            lines.push(Line::from(vec![
                Span::styled(if selected { "  ▶ " } else { "    " }, label_style),
                Span::styled(format!("{} ", radio), Style::default().fg(Color::Green)),
                Span::styled(format!("{:16}", mode.display_name()), label_style),
                Span::styled(mode.description(), STYLE_SEPARATOR),
            ]));
        }

        lines.push(Line::from(""));
        let show = if self.config.show_pull_results {
            "on"
        } else {
            "off"
        };
        lines.push(render_field_line(
            "Pull results",
            show,
            self.selected == crate::app::state::SETTINGS_SHOW_RESULTS_ROW,
            FieldLineOptions::new()
                .label_width(14)
                .cursor(CursorType::Arrow)
                .is_toggle(true),
        ));
        lines.push(render_field_line(
            "Directory",
            self.git_dir,
            false,
            FieldLineOptions::new().label_width(14),
        ));

        frame.render_widget(Paragraph::new(lines), chunks[0]);

        let footer = Paragraph::new(Line::from(Span::styled(
            "  [↑/↓] Move  [Enter] Apply  [Esc] Close  ('c' on the list changes directory)",
            STYLE_FOOTER,
        )));
        frame.render_widget(footer, chunks[1]);
    }
}
