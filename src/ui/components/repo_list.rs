use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::app::{AppState, GroupSummary, ListItem, Repo};
use crate::ui::helpers::{status_label, truncate, SELECTED_BG};

pub struct RepoListWidget<'a> {
    state: &'a AppState,
}

impl<'a> RepoListWidget<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    fn title(&self) -> String {
        let mut title = match &self.state.current_group {
            Some(group) => format!(" {} ({}) ", group.to_uppercase(), self.state.items.len()),
            None => format!(" REPOSITORIES ({}) ", self.state.repos.len()),
        };
        let filter = &self.state.filter;
        let mut tags = Vec::new();
        if filter.dirty_only {
            tags.push("dirty".to_string());
        }
        if filter.behind_only {
            tags.push("behind".to_string());
        }
        if filter.has_text() && !filter.editing {
            tags.push(format!("\"{}\"", filter.text.trim()));
        }
        if !tags.is_empty() {
            title.push_str(&format!("[{}] ", tags.join(" + ")));
        }
        title
    }

    pub fn render(self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(self.title())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White));

        if self.state.items.is_empty() {
            let hint = if self.state.scanning {
                "  Scanning..."
            } else if self.state.repos.is_empty() {
                "  No repositories found. Press 'c' to choose a directory"
            } else {
                "  Nothing matches the current filters"
            };
            let empty = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))),
            ])
            .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let header = Row::new(
            ["", "", "Name", "Branch", "Status", "Last pull"]
                .iter()
                .map(|h| Cell::from(*h).style(Style::default().fg(Color::DarkGray))),
        )
        .height(1);

        // Keep the selection on screen
        let visible = area.height.saturating_sub(3) as usize;
        let offset = if visible > 0 && self.state.selected_index >= visible {
            self.state.selected_index + 1 - visible
        } else {
            0
        };

        let rows: Vec<Row> = self
            .state
            .items
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible.max(1))
            .filter_map(|(i, item)| {
                let selected = i == self.state.selected_index;
                let row = match item {
                    ListItem::Repository(path) => self.repo_row(self.state.repo(path)?, selected),
                    ListItem::GroupSummary(group) => self.group_row(group, selected),
                };
                Some(if selected {
                    row.style(Style::default().bg(SELECTED_BG))
                } else {
                    row
                })
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(2),  // Selector
                Constraint::Length(2),  // Favorite
                Constraint::Length(32), // Name
                Constraint::Length(24), // Branch
                Constraint::Length(16), // Status
                Constraint::Min(10),    // Last pull
            ],
        )
        .header(header)
        .block(block);

        frame.render_widget(table, area);
    }

    fn selector(selected: bool) -> Cell<'static> {
        Cell::from(if selected { "▶" } else { "" }).style(Style::default().fg(Color::Cyan))
    }

    fn repo_row(&self, repo: &Repo, selected: bool) -> Row<'static> {
        let favorite = if repo.is_favorite {
            Cell::from("★").style(Style::default().fg(Color::Yellow))
        } else {
            Cell::from("")
        };

        let name_style = if selected {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        let (status, color) = status_label(repo.status, &repo.status_text, repo.behind_count);
        let pull_color = match repo.pull_result.as_str() {
            "error" => Color::Red,
            "updated" => Color::Green,
            _ => Color::DarkGray,
        };

        Row::new(vec![
            Self::selector(selected),
            favorite,
            Cell::from(truncate(&repo.name, 31)).style(name_style),
            Cell::from(truncate(&repo.branch, 23)).style(Style::default().fg(Color::Magenta)),
            Cell::from(status).style(Style::default().fg(color)),
            Cell::from(repo.pull_result.clone()).style(Style::default().fg(pull_color)),
        ])
    }

    fn group_row(&self, group: &GroupSummary, selected: bool) -> Row<'static> {
        let icon = if group.built_in { "★" } else { "▸" };
        let mut summary = format!("{} repos", group.repo_count);
        if group.dirty_count > 0 {
            summary.push_str(&format!(", {} dirty", group.dirty_count));
        }
        let behind = if group.behind_count > 0 {
            format!("{} behind", group.behind_count)
        } else {
            String::new()
        };

        Row::new(vec![
            Self::selector(selected),
            Cell::from(icon).style(Style::default().fg(Color::Yellow)),
            Cell::from(truncate(&group.name, 31)).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Cell::from(summary).style(Style::default().fg(Color::Gray)),
            Cell::from(behind).style(Style::default().fg(Color::Yellow)),
            Cell::from(""),
        ])
    }
}
