use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{ResultTree, TreeRow};
use crate::ui::helpers::{truncate, SELECTED_BG};

/// Repo → commit → file tree of what the last pull round brought in.
pub struct PullResultsWidget<'a> {
    tree: &'a ResultTree,
}

impl<'a> PullResultsWidget<'a> {
    pub fn new(tree: &'a ResultTree) -> Self {
        Self { tree }
    }

    pub fn render(self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(3)])
            .split(area);

        let (repos, commits, files) = self.tree.totals();
        let summary = Paragraph::new(Line::from(vec![
            Span::styled(
                format!(" {} repos updated", repos),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  ·  {} commits  ·  {} files changed", commits, files),
                Style::default().fg(Color::Gray),
            ),
        ]));
        frame.render_widget(summary, chunks[0]);

        let rows = self.tree.rows();
        let selected = rows.iter().position(is_selected).unwrap_or(0);
        let visible = chunks[1].height.saturating_sub(2) as usize;
        let offset = if visible > 0 && selected >= visible {
            selected + 1 - visible
        } else {
            0
        };

        let lines: Vec<Line> = rows
            .iter()
            .skip(offset)
            .take(visible)
            .map(render_row)
            .collect();

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .title(" PULL RESULTS ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Green)),
        );
        frame.render_widget(paragraph, chunks[1]);
    }
}

fn is_selected(row: &TreeRow<'_>) -> bool {
    match row {
        TreeRow::Repo { selected, .. }
        | TreeRow::Commit { selected, .. }
        | TreeRow::File { selected, .. } => *selected,
        TreeRow::Loading => false,
    }
}

fn render_row(row: &TreeRow<'_>) -> Line<'static> {
    let selected = is_selected(row);
    let pointer = Span::styled(
        if selected { "▶ " } else { "  " },
        Style::default().fg(Color::Cyan),
    );
    let highlight = |style: Style| {
        if selected {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    };

    let line = match row {
        TreeRow::Repo {
            result, expanded, ..
        } => Line::from(vec![
            pointer,
            Span::styled(
                if *expanded { "▼ " } else { "▶ " },
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                result.repo_name.clone(),
                highlight(Style::default().fg(Color::Cyan)),
            ),
            Span::styled(
                format!(
                    "  ({} commits, {} files)",
                    result.commits.len(),
                    result.files_changed
                ),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        TreeRow::Commit { commit, open, .. } => Line::from(vec![
            pointer,
            Span::raw("    "),
            Span::styled(
                if *open { "▾ " } else { "▸ " },
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                commit.hash.chars().take(7).collect::<String>(),
                Style::default().fg(Color::Yellow),
            ),
            Span::raw(" "),
            Span::styled(
                truncate(&commit.message, 72),
                highlight(Style::default().fg(Color::White)),
            ),
            Span::styled(
                format!("  {}, {}", commit.author, commit.time),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        TreeRow::File { file, .. } => Line::from(vec![
            pointer,
            Span::raw("        "),
            Span::styled(file.path.clone(), highlight(Style::default().fg(Color::Gray))),
            Span::styled(
                format!("  +{}", file.additions),
                Style::default().fg(Color::Green),
            ),
            Span::styled(
                format!(" -{}", file.deletions),
                Style::default().fg(Color::Red),
            ),
        ]),
        TreeRow::Loading => Line::from(vec![
            pointer,
            Span::styled(
                "        loading files...",
                Style::default().fg(Color::DarkGray),
            ),
        ]),
    };

    if selected {
        line.style(Style::default().bg(SELECTED_BG))
    } else {
        line
    }
}
