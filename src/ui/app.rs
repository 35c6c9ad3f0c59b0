use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::state::SWITCH_CHOICES;
use crate::app::{AppState, GroupInputKind, LogLevel, ViewMode};

use super::components::{
    render_menu_modal, ConfirmModal, DetailViewWidget, InputBarWidget, InputModal,
    OutputViewWidget, PullResultsWidget, RepoListWidget, SettingsModal, StatusBarWidget,
    ToastWidget,
};

const LOG_PANEL_HEIGHT: u16 = 6;

pub struct AppWidget<'a> {
    state: &'a AppState,
    version: &'a str,
}

impl<'a> AppWidget<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state, version: "" }
    }

    pub fn with_version(mut self, version: &'a str) -> Self {
        self.version = version;
        self
    }

    pub fn render(self, frame: &mut Frame) {
        let size = frame.area();
        let show_logs = size.height > 20;

        let mut constraints = vec![Constraint::Length(1), Constraint::Min(6)];
        if show_logs {
            constraints.push(Constraint::Length(LOG_PANEL_HEIGHT));
        }
        constraints.push(Constraint::Length(1));

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(size);

        self.render_header(frame, chunks[0]);
        self.render_main(frame, chunks[1]);
        if show_logs {
            self.render_logs(frame, chunks[2]);
        }
        self.render_footer(frame, chunks[chunks.len() - 1]);

        self.render_overlay(frame);

        if let Some(toast) = &self.state.toast {
            ToastWidget::new(toast).render(frame);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled(
                " githerd ",
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" {} ", self.version),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(self.state.git_dir.as_str(), Style::default().fg(Color::White)),
        ];
        if let Some(group) = &self.state.current_group {
            spans.push(Span::styled(" › ", Style::default().fg(Color::DarkGray)));
            spans.push(Span::styled(
                group.as_str(),
                Style::default().fg(Color::Yellow),
            ));
        }
        spans.push(Span::styled(
            format!("  fetch: {}", self.state.config.fetch_mode.display_name()),
            Style::default().fg(Color::DarkGray),
        ));
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_main(&self, frame: &mut Frame, area: Rect) {
        match self.state.mode {
            ViewMode::Detail | ViewMode::ActionSelect => match &self.state.detail {
                Some(detail) => {
                    DetailViewWidget::new(detail, self.state.animation_frame).render(frame, area)
                }
                None => RepoListWidget::new(self.state).render(frame, area),
            },
            ViewMode::Error => {
                OutputViewWidget::new("ERROR", &self.state.error_message)
                    .with_scroll(self.state.error_scroll)
                    .border(Color::Red)
                    .render(frame, area);
            }
            ViewMode::PullResults => match &self.state.results {
                Some(tree) => PullResultsWidget::new(tree).render(frame, area),
                None => RepoListWidget::new(self.state).render(frame, area),
            },
            _ => RepoListWidget::new(self.state).render(frame, area),
        }
    }

    fn render_overlay(&self, frame: &mut Frame) {
        let state = self.state;
        match state.mode {
            ViewMode::Config => InputModal::new(
                "Repository Directory",
                "Scan repositories under:",
                &state.input_buffer,
            )
            .note("~/ expands to your home directory; Enter rescans")
            .render(frame),
            ViewMode::Settings => {
                SettingsModal::new(&state.config, state.menu_index, &state.git_dir).render(frame)
            }
            ViewMode::GroupInput => {
                let title = match &state.group_input {
                    Some(GroupInputKind::Rename { .. }) => "Rename Group",
                    _ => "New Group",
                };
                InputModal::new(title, "Group name:", &state.input_buffer)
                    .note("Names are unique; Favorites is reserved")
                    .render(frame);
            }
            ViewMode::GroupDelete => {
                let name = state.group_delete_target.as_deref().unwrap_or("group");
                ConfirmModal::new("Delete Group", format!("Delete group '{}'?", name))
                    .consequence("Its repositories move back to the home list.")
                    .verb("delete")
                    .render(frame);
            }
            ViewMode::GroupSelect => {
                let mut items = state.group_choices();
                items.push("Remove from group".to_string());
                let name = state
                    .move_target
                    .as_deref()
                    .map(|p| state.repo_name(p))
                    .unwrap_or_default();
                render_menu_modal(
                    frame,
                    "Move To Group",
                    &format!("Move {} to:", name),
                    &items,
                    state.menu_index,
                );
            }
            ViewMode::GroupAddRepos => {
                let items: Vec<String> = state
                    .addable_repos
                    .iter()
                    .map(|p| state.repo_name(p))
                    .collect();
                let group = state.current_group.as_deref().unwrap_or_default();
                render_menu_modal(
                    frame,
                    "Add Repositories",
                    &format!("Add to {}:", group),
                    &items,
                    state.menu_index,
                );
            }
            ViewMode::ActionSelect => {
                let items: Vec<String> = SWITCH_CHOICES.iter().map(|s| s.to_string()).collect();
                let target = state
                    .detail
                    .as_ref()
                    .and_then(|d| d.target_branch.as_deref())
                    .unwrap_or("branch");
                render_menu_modal(
                    frame,
                    "Uncommitted Changes",
                    &format!("Working tree has changes. Before switching to {}:", target),
                    &items,
                    state.menu_index,
                );
            }
            _ => {}
        }
    }

    fn render_logs(&self, frame: &mut Frame, area: Rect) {
        let visible_lines = (area.height.saturating_sub(2)) as usize;

        let lines: Vec<Line> = self
            .state
            .logs
            .iter()
            .rev()
            .take(visible_lines)
            .map(|entry| {
                let time = entry.timestamp.format("%H:%M:%S");
                let (level_str, level_color) = match entry.level {
                    LogLevel::Info => ("INFO", Color::Green),
                    LogLevel::Warn => ("WARN", Color::Yellow),
                    LogLevel::Error => ("ERR ", Color::Red),
                    LogLevel::Debug => ("DBG ", Color::DarkGray),
                };

                Line::from(vec![
                    Span::styled(format!("{} ", time), Style::default().fg(Color::DarkGray)),
                    Span::styled(
                        format!("[{}] ", level_str),
                        Style::default().fg(level_color),
                    ),
                    Span::raw(entry.message.clone()),
                ])
            })
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .title(" LOGS ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );

        frame.render_widget(paragraph, area);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        if self.state.mode == ViewMode::List && self.state.filter.editing {
            InputBarWidget::new("/", &self.state.filter.text).render(frame, area);
            return;
        }
        let busy = (self.state.scanning || self.state.pulling).then_some(self.state.animation_frame);
        StatusBarWidget::new(
            &self.state.status_message,
            self.state.mode,
            self.state.current_group.is_some(),
        )
        .busy(busy)
        .render(frame, area);
    }
}
