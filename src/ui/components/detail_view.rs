use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::output_view::{Anchor, OutputViewWidget};
use crate::app::{DetailPane, DetailState};
use crate::git::BranchInfo;
use crate::ui::helpers::{spinner, SELECTED_BG};

/// Status text, branch list and command runner for one repository.
pub struct DetailViewWidget<'a> {
    detail: &'a DetailState,
    animation_frame: usize,
}

impl<'a> DetailViewWidget<'a> {
    pub fn new(detail: &'a DetailState, animation_frame: usize) -> Self {
        Self {
            detail,
            animation_frame,
        }
    }

    fn border(&self, pane: DetailPane) -> Color {
        if self.detail.pane == pane {
            Color::Cyan
        } else {
            Color::DarkGray
        }
    }

    pub fn render(self, frame: &mut Frame, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(columns[1]);

        let title = format!("STATUS: {}", self.detail.name);
        OutputViewWidget::new(&title, &self.detail.content)
            .with_scroll(self.detail.scroll)
            .border(self.border(DetailPane::Status))
            .render(frame, columns[0]);

        self.render_branches(frame, right[0]);
        self.render_command(frame, right[1]);
    }

    fn render_branches(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(format!(" BRANCHES ({}) ", self.detail.branches.len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.border(DetailPane::Branches)));

        if self.detail.branches.is_empty() {
            let empty = Paragraph::new(Line::from(Span::styled(
                " Loading branches...",
                Style::default().fg(Color::DarkGray),
            )))
            .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let visible = area.height.saturating_sub(2) as usize;
        let offset = if visible > 0 && self.detail.branch_index >= visible {
            self.detail.branch_index + 1 - visible
        } else {
            0
        };
        let focused = self.detail.pane == DetailPane::Branches;

        let lines: Vec<Line> = self
            .detail
            .branches
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible)
            .map(|(i, branch)| branch_line(branch, focused && i == self.detail.branch_index))
            .collect();

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_command(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(3)])
            .split(area);
        let border = self.border(DetailPane::Command);

        let mut input = vec![
            Span::styled("> ", Style::default().fg(Color::Cyan)),
            Span::styled(
                self.detail.command_input.as_str(),
                Style::default().fg(Color::White),
            ),
        ];
        if self.detail.command_running {
            input.push(Span::styled(
                format!(" {}", spinner(self.animation_frame)),
                Style::default().fg(Color::Yellow),
            ));
        } else if self.detail.pane == DetailPane::Command {
            input.push(Span::styled("█", Style::default().fg(Color::White)));
        }
        let prompt = Paragraph::new(Line::from(input)).block(
            Block::default()
                .title(" COMMAND ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border)),
        );
        frame.render_widget(prompt, chunks[0]);

        OutputViewWidget::new("OUTPUT", &self.detail.command_output)
            .anchored(Anchor::Bottom)
            .border(border)
            .render(frame, chunks[1]);
    }
}

fn branch_line(branch: &BranchInfo, selected: bool) -> Line<'static> {
    let marker = if branch.is_current { "● " } else { "  " };
    let (tag, tag_color) = match (branch.is_local, branch.is_remote) {
        (true, true) => ("local+remote", Color::Green),
        (true, false) => ("local", Color::Yellow),
        _ => ("remote", Color::Blue),
    };
    let name_style = if selected {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else if branch.is_current {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::White)
    };

    let line = Line::from(vec![
        Span::styled(
            if selected { "▶" } else { " " },
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(marker, Style::default().fg(Color::Green)),
        Span::styled(branch.name.clone(), name_style),
        Span::styled(format!("  [{}]", tag), Style::default().fg(tag_color)),
    ]);
    if selected {
        line.style(Style::default().bg(SELECTED_BG))
    } else {
        line
    }
}
