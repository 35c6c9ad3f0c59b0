use chrono::Utc;

use super::batch::BatchTracker;
use super::config::Config;
use super::results::ResultTree;
use crate::git::{BranchInfo, PullResultInfo, RepoStatus};
use crate::storage::{WorkspaceData, FAVORITES_GROUP};

/// A tracked working directory. Keyed by absolute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repo {
    pub path: String,
    pub name: String,
    pub branch: String,
    pub status: RepoStatus,
    pub status_text: String,
    pub is_favorite: bool,
    /// Short label from the most recent pull
    pub pull_result: String,
    pub behind_count: u32,
}

impl Repo {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            branch: String::new(),
            status: RepoStatus::Unknown,
            status_text: String::new(),
            is_favorite: false,
            pull_result: String::new(),
            behind_count: 0,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.status == RepoStatus::Dirty
    }

    pub fn is_behind(&self) -> bool {
        self.behind_count > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    pub name: String,
    pub repo_count: usize,
    pub dirty_count: usize,
    pub behind_count: usize,
    pub built_in: bool,
}

/// One row of the repository list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListItem {
    Repository(String),
    GroupSummary(GroupSummary),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    List,
    Detail,
    Config,
    ActionSelect,
    Error,
    Settings,
    GroupInput,
    GroupDelete,
    GroupSelect,
    GroupAddRepos,
    PullResults,
}

/// Row predicates for the repository list. All active predicates must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub text: String,
    /// Text is still being typed
    pub editing: bool,
    pub dirty_only: bool,
    pub behind_only: bool,
}

impl ListFilter {
    pub fn matches(&self, repo: &Repo) -> bool {
        if self.dirty_only && !repo.is_dirty() {
            return false;
        }
        if self.behind_only && !repo.is_behind() {
            return false;
        }
        let needle = self.text.trim();
        needle.is_empty() || repo.name.to_lowercase().contains(&needle.to_lowercase())
    }

    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailPane {
    #[default]
    Status,
    Branches,
    Command,
}

impl DetailPane {
    pub fn next(&self) -> Self {
        match self {
            DetailPane::Status => DetailPane::Branches,
            DetailPane::Branches => DetailPane::Command,
            DetailPane::Command => DetailPane::Status,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            DetailPane::Status => DetailPane::Command,
            DetailPane::Branches => DetailPane::Status,
            DetailPane::Command => DetailPane::Branches,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailState {
    pub path: String,
    pub name: String,
    pub content: String,
    pub scroll: usize,
    pub branches: Vec<BranchInfo>,
    pub branch_index: usize,
    pub pane: DetailPane,
    pub command_input: String,
    pub command_output: String,
    pub command_running: bool,
    /// Branch to switch to once uncommitted changes are dealt with
    pub target_branch: Option<String>,
}

impl DetailState {
    pub fn new(path: &str, name: &str) -> Self {
        Self {
            path: path.to_string(),
            name: name.to_string(),
            content: "Loading...".to_string(),
            ..Self::default()
        }
    }

    pub fn selected_branch(&self) -> Option<&BranchInfo> {
        self.branches.get(self.branch_index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupInputKind {
    New,
    Rename { old: String },
}

/// Choices offered while an uncommitted working tree blocks a branch switch.
pub const SWITCH_CHOICES: [&str; 3] = ["Stash changes", "Discard changes", "Cancel"];

/// Settings rows after the fetch modes.
pub const SETTINGS_SHOW_RESULTS_ROW: usize = 3;

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Debug,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
    pub created_at: std::time::Instant,
    pub duration_secs: u64,
}

impl Toast {
    pub fn new(message: String, level: ToastLevel) -> Self {
        let duration_secs = match level {
            ToastLevel::Success => 3,
            ToastLevel::Info => 3,
            ToastLevel::Warning => 4,
            ToastLevel::Error => 5,
        };
        Self {
            message,
            level,
            created_at: std::time::Instant::now(),
            duration_secs,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed().as_secs() >= self.duration_secs
    }
}

pub struct AppState {
    pub config: Config,
    pub workspace: WorkspaceData,
    /// Directory currently scanned
    pub git_dir: String,
    /// Directory being tried from the config view
    pub pending_root: Option<String>,
    pub running: bool,

    pub repos: Vec<Repo>,
    pub items: Vec<ListItem>,
    pub selected_index: usize,
    pub current_group: Option<String>,
    pub filter: ListFilter,

    pub mode: ViewMode,
    pub previous_mode: ViewMode,
    pub saved_filter: Option<String>,
    pub error_message: String,
    pub error_scroll: usize,

    pub detail: Option<DetailState>,

    pub batch: BatchTracker,
    pub round_results: Vec<PullResultInfo>,
    /// Results that finished while an error was on screen
    pub deferred_results: Option<Vec<PullResultInfo>>,
    pub results: Option<ResultTree>,

    pub scanning: bool,
    pub pulling: bool,
    pub force_full_refresh: bool,

    pub status_message: String,
    pub input_buffer: String,
    pub group_input: Option<GroupInputKind>,
    pub group_delete_target: Option<String>,
    pub menu_index: usize,
    pub move_target: Option<String>,
    pub addable_repos: Vec<String>,

    pub toast: Option<Toast>,
    pub logs: Vec<LogEntry>,
    pub animation_frame: usize,
}

impl AppState {
    pub fn new(config: Config, workspace: WorkspaceData, git_dir: String) -> Self {
        Self {
            config,
            workspace,
            git_dir,
            pending_root: None,
            running: true,
            repos: Vec::new(),
            items: Vec::new(),
            selected_index: 0,
            current_group: None,
            filter: ListFilter::default(),
            mode: ViewMode::List,
            previous_mode: ViewMode::List,
            saved_filter: None,
            error_message: String::new(),
            error_scroll: 0,
            detail: None,
            batch: BatchTracker::new(),
            round_results: Vec::new(),
            deferred_results: None,
            results: None,
            scanning: false,
            pulling: false,
            force_full_refresh: false,
            status_message: String::new(),
            input_buffer: String::new(),
            group_input: None,
            group_delete_target: None,
            menu_index: 0,
            move_target: None,
            addable_repos: Vec::new(),
            toast: None,
            logs: Vec::new(),
            animation_frame: 0,
        }
    }

    pub fn advance_animation(&mut self) {
        self.animation_frame = (self.animation_frame + 1) % 10;
    }

    pub fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        let entry = LogEntry {
            timestamp: Utc::now(),
            level,
            message: message.into(),
        };
        self.logs.push(entry);
        if self.logs.len() > 100 {
            self.logs.remove(0);
        }
    }

    pub fn log_info(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    pub fn log_warn(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    pub fn log_error(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    pub fn log_debug(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    pub fn show_error(&mut self, msg: impl Into<String>) {
        self.toast = Some(Toast::new(msg.into(), ToastLevel::Error));
    }

    pub fn show_success(&mut self, msg: impl Into<String>) {
        self.toast = Some(Toast::new(msg.into(), ToastLevel::Success));
    }

    pub fn show_warning(&mut self, msg: impl Into<String>) {
        self.toast = Some(Toast::new(msg.into(), ToastLevel::Warning));
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }

    pub fn repo(&self, path: &str) -> Option<&Repo> {
        self.repos.iter().find(|r| r.path == path)
    }

    pub fn repo_mut(&mut self, path: &str) -> Option<&mut Repo> {
        self.repos.iter_mut().find(|r| r.path == path)
    }

    /// Display name for a path, falling back to its last component.
    pub fn repo_name(&self, path: &str) -> String {
        self.repo(path).map(|r| r.name.clone()).unwrap_or_else(|| {
            std::path::Path::new(path)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.to_string())
        })
    }

    pub fn selected_item(&self) -> Option<&ListItem> {
        self.items.get(self.selected_index)
    }

    pub fn selected_repo(&self) -> Option<&Repo> {
        match self.selected_item()? {
            ListItem::Repository(path) => self.repo(path),
            ListItem::GroupSummary(_) => None,
        }
    }

    pub fn selected_group(&self) -> Option<&GroupSummary> {
        match self.selected_item()? {
            ListItem::GroupSummary(group) => Some(group),
            ListItem::Repository(_) => None,
        }
    }

    pub fn select_next(&mut self) {
        if !self.items.is_empty() {
            self.selected_index = (self.selected_index + 1) % self.items.len();
        }
    }

    pub fn select_previous(&mut self) {
        if !self.items.is_empty() {
            self.selected_index = if self.selected_index == 0 {
                self.items.len() - 1
            } else {
                self.selected_index - 1
            };
        }
    }

    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    pub fn select_last(&mut self) {
        self.selected_index = self.items.len().saturating_sub(1);
    }

    /// Mirror the workspace favorites onto the repository rows.
    pub fn apply_favorites(&mut self) {
        for repo in &mut self.repos {
            repo.is_favorite = self.workspace.is_favorite(&repo.path);
        }
    }

    /// Known repositories of a group, sorted by name.
    pub fn group_repos(&self, name: &str) -> Vec<&Repo> {
        let members = self.workspace.members(name);
        let mut repos: Vec<&Repo> = self
            .repos
            .iter()
            .filter(|r| members.contains(&r.path))
            .collect();
        repos.sort_by(|a, b| a.name.cmp(&b.name));
        repos
    }

    pub fn group_summary(&self, name: &str, built_in: bool) -> GroupSummary {
        let repos = self.group_repos(name);
        GroupSummary {
            name: name.to_string(),
            repo_count: repos.len(),
            dirty_count: repos.iter().filter(|r| r.is_dirty()).count(),
            behind_count: repos.iter().filter(|r| r.is_behind()).count(),
            built_in,
        }
    }

    /// Every repository passing the active filters, regardless of grouping.
    pub fn filtered_repos(&self) -> Vec<&Repo> {
        self.repos.iter().filter(|r| self.filter.matches(r)).collect()
    }

    pub fn favorite_paths(&self) -> Vec<String> {
        self.repos
            .iter()
            .filter(|r| r.is_favorite)
            .map(|r| r.path.clone())
            .collect()
    }

    /// Group names offered when moving a repository: favorites first, then user groups.
    pub fn group_choices(&self) -> Vec<String> {
        let mut names: Vec<String> = self.workspace.groups.iter().map(|g| g.name.clone()).collect();
        names.sort();
        names.insert(0, FAVORITES_GROUP.to_string());
        names
    }

    fn sorted_favorites_first(mut repos: Vec<&Repo>) -> Vec<&Repo> {
        repos.sort_by(|a, b| {
            b.is_favorite
                .cmp(&a.is_favorite)
                .then_with(|| a.name.cmp(&b.name))
        });
        repos
    }

    fn build_items(&self) -> Vec<ListItem> {
        let as_items = |repos: Vec<&Repo>| -> Vec<ListItem> {
            repos
                .into_iter()
                .filter(|r| self.filter.matches(r))
                .map(|r| ListItem::Repository(r.path.clone()))
                .collect()
        };

        if let Some(group) = &self.current_group {
            return as_items(self.group_repos(group));
        }

        if self.filter.has_text() {
            return as_items(Self::sorted_favorites_first(self.repos.iter().collect()));
        }

        let mut items: Vec<ListItem> = self
            .workspace
            .listed_groups()
            .into_iter()
            .map(|(name, built_in)| self.group_summary(&name, built_in))
            .filter(|summary| summary.repo_count > 0 || !summary.built_in)
            .map(ListItem::GroupSummary)
            .collect();

        let ungrouped: Vec<&Repo> = self
            .repos
            .iter()
            .filter(|r| self.workspace.is_ungrouped(&r.path))
            .collect();
        items.extend(as_items(Self::sorted_favorites_first(ungrouped)));
        items
    }

    /// Rebuild the visible rows, keeping the selection on the same row when it survives.
    pub fn refresh_list(&mut self) {
        let previous = self.selected_item().cloned();
        self.items = self.build_items();
        let key = |item: &ListItem| match item {
            ListItem::Repository(path) => path.clone(),
            ListItem::GroupSummary(group) => format!("group:{}", group.name),
        };
        let kept = previous.and_then(|prev| {
            let prev_key = key(&prev);
            self.items.iter().position(|item| key(item) == prev_key)
        });
        self.selected_index = match kept {
            Some(idx) => idx,
            None => self.selected_index.min(self.items.len().saturating_sub(1)),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(name: &str, status: RepoStatus, behind: u32) -> Repo {
        Repo {
            status,
            behind_count: behind,
            ..Repo::new(name, format!("/git/{}", name))
        }
    }

    fn state() -> AppState {
        let mut state = AppState::new(Config::default(), WorkspaceData::default(), "/git".into());
        state.repos = vec![
            repo("api", RepoStatus::Dirty, 2),
            repo("web", RepoStatus::Clean, 0),
            repo("cli", RepoStatus::CleanBehind, 4),
            repo("docs", RepoStatus::Dirty, 0),
        ];
        state
    }

    fn names(state: &AppState) -> Vec<String> {
        state
            .items
            .iter()
            .map(|item| match item {
                ListItem::Repository(path) => state.repo_name(path),
                ListItem::GroupSummary(g) => format!("[{}]", g.name),
            })
            .collect()
    }

    #[test]
    fn test_filters_combine_with_and() {
        let mut state = state();
        state.filter.dirty_only = true;
        state.filter.behind_only = true;
        let names: Vec<&str> = state.filtered_repos().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["api"]);
    }

    #[test]
    fn test_enabling_filters_never_grows_list() {
        let mut state = state();
        let all = state.filtered_repos().len();
        state.filter.dirty_only = true;
        let dirty = state.filtered_repos().len();
        state.filter.behind_only = true;
        let both = state.filtered_repos().len();
        state.filter.text = "a".to_string();
        let text = state.filtered_repos().len();
        assert!(all >= dirty && dirty >= both && both >= text);
    }

    #[test]
    fn test_text_filter_is_case_insensitive() {
        let mut state = state();
        state.filter.text = "WE".to_string();
        let names: Vec<&str> = state.filtered_repos().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["web"]);
    }

    #[test]
    fn test_home_list_groups_then_ungrouped() {
        let mut state = state();
        state.workspace.toggle_favorite("/git/web");
        state.workspace.create_group("backend").unwrap();
        state.workspace.move_to_group("/git/api", "backend").unwrap();
        state.workspace.create_group("empty").unwrap();
        state.apply_favorites();
        state.refresh_list();
        assert_eq!(
            names(&state),
            vec!["[Favorites]", "[backend]", "[empty]", "cli", "docs"]
        );
        let backend = match &state.items[1] {
            ListItem::GroupSummary(g) => g.clone(),
            other => panic!("unexpected row: {:?}", other),
        };
        assert_eq!((backend.repo_count, backend.dirty_count, backend.behind_count), (1, 1, 1));
    }

    #[test]
    fn test_text_filter_flattens_all_repos() {
        let mut state = state();
        state.workspace.create_group("backend").unwrap();
        state.workspace.move_to_group("/git/api", "backend").unwrap();
        state.workspace.toggle_favorite("/git/web");
        state.apply_favorites();
        state.filter.text = "e".to_string();
        state.refresh_list();
        assert_eq!(names(&state), vec!["web"]);
        state.filter.text = "i".to_string();
        state.refresh_list();
        assert_eq!(names(&state), vec!["api", "cli"]);
    }

    #[test]
    fn test_inside_group_lists_members() {
        let mut state = state();
        state.workspace.create_group("tools").unwrap();
        state.workspace.move_to_group("/git/web", "tools").unwrap();
        state.workspace.move_to_group("/git/cli", "tools").unwrap();
        state.current_group = Some("tools".to_string());
        state.refresh_list();
        assert_eq!(names(&state), vec!["cli", "web"]);
    }

    #[test]
    fn test_selection_follows_row() {
        let mut state = state();
        state.refresh_list();
        state.selected_index = 2;
        let selected = state.selected_repo().unwrap().path.clone();
        state.workspace.toggle_favorite(&state.repos[3].path.clone());
        state.apply_favorites();
        state.refresh_list();
        assert_eq!(state.selected_repo().unwrap().path, selected);
    }

    #[test]
    fn test_selection_clamped_when_rows_vanish() {
        let mut state = state();
        state.refresh_list();
        state.select_last();
        state.filter.dirty_only = true;
        state.refresh_list();
        assert!(state.selected_index < state.items.len());
    }
}
