use super::action::Action;
use super::config::{expand_home, FetchMode};
use super::results::ResultTree;
use super::state::{
    AppState, DetailPane, DetailState, GroupInputKind, Repo, ViewMode, SETTINGS_SHOW_RESULTS_ROW,
    SWITCH_CHOICES,
};
use super::task::Task;
use crate::git::{PullOutcome, PullResultInfo, StatusReport};
use crate::storage::FAVORITES_GROUP;

impl AppState {
    /// Apply one action and return the background work it calls for.
    ///
    /// This is the only place state changes. Nothing here blocks or touches the
    /// filesystem; every git call and every save is returned as a [`Task`].
    pub fn update(&mut self, action: Action) -> Vec<Task> {
        match action {
            Action::ReposScanned { root, result } => self.on_repos_scanned(root, result),
            Action::StatusUpdated(report) => {
                self.on_status_updated(report);
                Vec::new()
            }
            Action::HeadCaptured { path, head } => self.on_head_captured(path, head),
            Action::PullCompleted { path, outcome } => self.on_pull_completed(path, outcome),
            Action::BranchesLoaded { path, listing } => {
                if let Some(detail) = self.detail.as_mut().filter(|d| d.path == path) {
                    detail.branch_index = listing
                        .branches
                        .iter()
                        .position(|b| b.is_current)
                        .unwrap_or(0);
                    detail.branches = listing.branches;
                }
                Vec::new()
            }
            Action::BranchCreated {
                path,
                branch,
                result,
            } => match result {
                Ok(()) => {
                    self.set_status(format!("Created local branch: {}", branch));
                    self.log_info(format!("Created local branch {} in {}", branch, path));
                    vec![Task::LoadBranches { path }]
                }
                Err(e) => {
                    self.open_error(format!("Create failed:\n\n{}", e));
                    Vec::new()
                }
            },
            Action::BranchDeleted {
                path,
                branch,
                result,
            } => match result {
                Ok(()) => {
                    self.set_status(format!("Deleted branch: {}", branch));
                    self.log_info(format!("Deleted branch {} in {}", branch, path));
                    vec![Task::LoadBranches { path }]
                }
                Err(e) => {
                    self.open_error(format!("Delete failed:\n\n{}", e));
                    Vec::new()
                }
            },
            Action::BranchSwitched {
                path,
                branch,
                result,
            } => self.on_branch_switched(path, branch, result),
            Action::ChangesProbed {
                path,
                branch,
                dirty,
            } => {
                if !self.detail.as_ref().is_some_and(|d| d.path == path) {
                    return Vec::new();
                }
                if dirty {
                    if let Some(detail) = self.detail.as_mut() {
                        detail.target_branch = Some(branch);
                    }
                    self.menu_index = 0;
                    self.mode = ViewMode::ActionSelect;
                    Vec::new()
                } else {
                    self.set_status(format!("Switching to {}...", branch));
                    vec![Task::SwitchBranch { path, branch }]
                }
            }
            Action::StashCompleted { path, result } => match result {
                Ok(()) => {
                    let target = self
                        .detail
                        .as_ref()
                        .filter(|d| d.path == path)
                        .and_then(|d| d.target_branch.clone());
                    match target {
                        Some(branch) => {
                            self.mode = ViewMode::Detail;
                            self.set_status(format!("Switching to {}...", branch));
                            vec![Task::SwitchBranch { path, branch }]
                        }
                        None => Vec::new(),
                    }
                }
                Err(e) => {
                    self.open_error(format!("Operation failed:\n\n{}", e));
                    Vec::new()
                }
            },
            Action::DetailLoaded { path, content } => {
                if let Some(detail) = self.detail.as_mut().filter(|d| d.path == path) {
                    detail.content = content;
                }
                Vec::new()
            }
            Action::CommandOutput {
                path,
                command,
                output,
            } => self.on_command_output(path, command, output),
            Action::CommitFilesLoaded { path, hash, files } => {
                if let Some(tree) = self.results.as_mut() {
                    tree.files_loaded(&path, &hash, files);
                }
                Vec::new()
            }
            Action::BrowserOpened { result } => {
                match result {
                    Ok(url) => {
                        self.set_status(format!("Opened {}", url));
                        self.show_success("Opened in browser");
                    }
                    Err(e) => {
                        self.log_warn(e.clone());
                        self.show_warning(e.clone());
                        self.set_status(e);
                    }
                }
                Vec::new()
            }
            Action::Persisted { what, result } => {
                match result {
                    Ok(()) => self.log_debug(format!("Saved {}", what)),
                    Err(e) => {
                        tracing::error!("Failed to save {}: {}", what, e);
                        self.log_error(format!("Failed to save {}: {}", what, e));
                        self.show_error(format!("Failed to save {}", what));
                    }
                }
                Vec::new()
            }
            Action::Tick => {
                if self.toast.as_ref().is_some_and(|t| t.is_expired()) {
                    self.toast = None;
                }
                self.advance_animation();
                Vec::new()
            }
            Action::Quit => {
                self.running = false;
                Vec::new()
            }
            Action::Rescan => self.rescan("Scanning..."),
            Action::RefreshRepo { path } => {
                let name = self.repo_name(&path);
                self.set_status(format!("Refreshing {} (1 repo)...", name));
                vec![Task::Status { path }]
            }
            Action::PullPaths { paths } => {
                let message = format!("Pulling {} repos...", paths.len());
                self.start_pull(paths, message)
            }
            intent => match self.mode {
                ViewMode::List => self.list_intent(intent),
                ViewMode::Detail => self.detail_intent(intent),
                ViewMode::ActionSelect => self.action_select_intent(intent),
                ViewMode::Error => self.error_intent(intent),
                ViewMode::Settings => self.settings_intent(intent),
                ViewMode::Config => self.config_intent(intent),
                ViewMode::GroupInput => self.group_input_intent(intent),
                ViewMode::GroupDelete => self.group_delete_intent(intent),
                ViewMode::GroupSelect => self.group_select_intent(intent),
                ViewMode::GroupAddRepos => self.group_add_intent(intent),
                ViewMode::PullResults => self.results_intent(intent),
            },
        }
    }

    // ---- events ----

    fn on_repos_scanned(
        &mut self,
        root: String,
        result: Result<Vec<crate::git::DiscoveredRepo>, String>,
    ) -> Vec<Task> {
        let from_pending = self.pending_root.as_deref() == Some(root.as_str());
        if !from_pending && root != self.git_dir {
            self.log_debug(format!("Ignoring stale scan of {}", root));
            return Vec::new();
        }
        if from_pending {
            self.pending_root = None;
        }
        self.scanning = false;

        let found = match result {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!("scan of {} failed: {}", root, e);
                self.log_warn(format!("Scan of {} failed: {}", root, e));
                self.force_full_refresh = false;
                self.set_status("Invalid directory");
                return Vec::new();
            }
        };

        let mut tasks = Vec::new();
        if from_pending {
            self.git_dir = root.clone();
            self.config.git_dir = root.clone();
            self.current_group = None;
            self.mode = ViewMode::List;
            tasks.push(Task::SaveConfig(self.config.clone()));
        }

        self.repos = found
            .into_iter()
            .map(|r| Repo::new(r.name, r.path))
            .collect();
        self.apply_favorites();
        tracing::info!("found {} repositories under {}", self.repos.len(), root);
        self.log_info(format!("Found {} repositories in {}", self.repos.len(), root));
        self.set_status(format!("Found {} repositories", self.repos.len()));

        if self.mode == ViewMode::List {
            if let Some(text) = self.saved_filter.take() {
                self.filter.text = text;
            }
        }
        self.refresh_list();

        let targets: Vec<String> = if std::mem::take(&mut self.force_full_refresh) {
            self.repos.iter().map(|r| r.path.clone()).collect()
        } else {
            match self.config.fetch_mode {
                FetchMode::All => self.repos.iter().map(|r| r.path.clone()).collect(),
                FetchMode::OnDemand => Vec::new(),
                FetchMode::Favorites => self.favorite_paths(),
            }
        };
        tasks.extend(targets.into_iter().map(|path| Task::Status { path }));
        tasks
    }

    fn on_status_updated(&mut self, report: StatusReport) {
        let Some(repo) = self.repo_mut(&report.path) else {
            return;
        };
        repo.branch = report.branch;
        repo.status = report.status;
        repo.status_text = report.text;
        repo.behind_count = report.behind_count;
        if !self.filter.editing {
            self.refresh_list();
        }
    }

    fn on_head_captured(&mut self, path: String, head: Option<String>) -> Vec<Task> {
        if !self.batch.record_head(&path, head.clone()) {
            self.log_debug(format!("Head for {} arrived outside a pull round", path));
            return Vec::new();
        }
        let name = self.repo_name(&path);
        vec![Task::Pull {
            path,
            name,
            pre_pull_head: head,
            max_commits: self.config.max_commits_per_repo,
        }]
    }

    fn on_pull_completed(&mut self, path: String, outcome: PullOutcome) -> Vec<Task> {
        let name = self.repo_name(&path);
        if let Some(repo) = self.repo_mut(&path) {
            repo.pull_result = outcome.short.clone();
        }

        let tracked = self.batch.contains(&path);
        let finished = self.batch.complete(&path);
        if tracked {
            if let Some(summary) = outcome.summary {
                self.round_results.push(summary);
            }
        }

        if outcome.success {
            tracing::info!("pulled {}: {}", name, outcome.short);
            self.log_info(format!("Pulled {}: {}", name, outcome.short));
            self.set_status(format!("Pulled {}: {}", name, outcome.short));
            if !self.filter.editing {
                self.refresh_list();
            }
        } else {
            tracing::warn!("pull failed for {}", name);
            self.log_error(format!("Pull failed for {}", name));
            self.set_status("");
            self.open_error(format!("Pull failed for {}:\n\n{}", name, outcome.output));
        }

        if finished {
            self.pulling = false;
            self.finish_round();
        }
        vec![Task::Status { path }]
    }

    fn finish_round(&mut self) {
        let results = std::mem::take(&mut self.round_results);
        if results.is_empty() || !self.config.show_pull_results {
            return;
        }
        if self.mode == ViewMode::Error {
            self.deferred_results
                .get_or_insert_with(Vec::new)
                .extend(results);
        } else {
            self.show_results(results);
        }
    }

    fn show_results(&mut self, results: Vec<PullResultInfo>) {
        self.log_info(format!("{} repositories received new commits", results.len()));
        self.results = Some(ResultTree::new(results));
        self.mode = ViewMode::PullResults;
        self.set_status("");
    }

    fn on_branch_switched(
        &mut self,
        path: String,
        branch: String,
        result: crate::git::BranchOpResult,
    ) -> Vec<Task> {
        match result {
            Ok(()) => {
                self.set_status(format!("Switched to {}", branch));
                self.log_info(format!("Switched {} to {}", self.repo_name(&path), branch));
                if let Some(repo) = self.repo_mut(&path) {
                    repo.branch = branch;
                }
                if let Some(detail) = self.detail.as_mut() {
                    detail.target_branch = None;
                }
                if self.detail.is_some() {
                    self.mode = ViewMode::Detail;
                }
                vec![
                    Task::LoadDetail { path: path.clone() },
                    Task::LoadBranches { path: path.clone() },
                    Task::Status { path },
                ]
            }
            Err(e) => {
                self.open_error(format!("Branch switch failed:\n\n{}", e));
                Vec::new()
            }
        }
    }

    fn on_command_output(
        &mut self,
        path: String,
        command: String,
        output: crate::git::CommandOutput,
    ) -> Vec<Task> {
        let mut tasks = vec![Task::Status { path: path.clone() }];
        let Some(detail) = self.detail.as_mut().filter(|d| d.path == path) else {
            return tasks;
        };
        detail.command_running = false;
        let stdout = output.stdout.trim_end();
        let stderr = output.stderr.trim_end();
        if !output.success {
            let reason = if stderr.is_empty() { "command failed" } else { stderr };
            detail.command_output.push_str(&format!("Error: {}\n\n", reason));
        }
        if !stdout.is_empty() {
            detail.command_output.push_str(stdout);
            detail.command_output.push('\n');
        } else if output.success {
            if stderr.is_empty() {
                detail.command_output.push_str("(no output)\n");
            } else {
                detail.command_output.push_str(stderr);
                detail.command_output.push('\n');
            }
        }
        tracing::debug!("command `{}` in {} finished: {}", command, path, output.success);
        tasks.insert(0, Task::LoadDetail { path: path.clone() });
        tasks.insert(1, Task::LoadBranches { path });
        tasks
    }

    // ---- shared transitions ----

    /// Show diagnostic text. A second error while one is on screen is appended.
    pub fn open_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        if self.mode == ViewMode::Error {
            self.error_message.push_str("\n\n");
            self.error_message.push_str(&message);
            return;
        }
        self.previous_mode = self.mode;
        if self.filter.has_text() {
            self.saved_filter = Some(self.filter.text.clone());
        }
        self.filter.editing = false;
        self.error_message = message;
        self.error_scroll = 0;
        self.mode = ViewMode::Error;
    }

    fn dismiss_error(&mut self) -> Vec<Task> {
        self.error_message.clear();
        self.error_scroll = 0;

        if let Some(results) = self.deferred_results.take() {
            self.show_results(results);
            return Vec::new();
        }

        let back_to_detail = matches!(
            self.previous_mode,
            ViewMode::Detail | ViewMode::ActionSelect
        );
        if back_to_detail {
            if let Some(detail) = self.detail.as_ref() {
                let path = detail.path.clone();
                self.mode = ViewMode::Detail;
                return vec![Task::LoadDetail { path }];
            }
        }

        self.mode = ViewMode::List;
        self.detail = None;
        if let Some(text) = self.saved_filter.take() {
            self.filter.text = text;
        }
        self.refresh_list();
        Vec::new()
    }

    fn rescan(&mut self, message: &str) -> Vec<Task> {
        self.scanning = true;
        if self.filter.has_text() {
            self.saved_filter = Some(self.filter.text.clone());
        }
        self.set_status(message);
        vec![Task::Scan {
            root: self.git_dir.clone(),
        }]
    }

    /// Begin pulling `paths`. Paths already in flight are skipped; a new round
    /// started while one is running joins it.
    fn start_pull(&mut self, paths: Vec<String>, message: String) -> Vec<Task> {
        let fresh: Vec<String> = paths
            .into_iter()
            .filter(|p| !self.batch.contains(p))
            .collect();
        if fresh.is_empty() {
            self.set_status("Pull already in progress");
            return Vec::new();
        }
        if self.batch.is_empty() {
            self.round_results.clear();
        }
        self.batch.begin(fresh.iter().cloned());
        self.pulling = true;
        tracing::info!("pulling {} repositories", fresh.len());
        self.log_info(message.clone());
        self.set_status(message);
        fresh
            .into_iter()
            .map(|path| Task::CaptureHead { path })
            .collect()
    }

    fn status_tasks(paths: Vec<String>) -> Vec<Task> {
        paths.into_iter().map(|path| Task::Status { path }).collect()
    }

    fn group_paths(&self, group: &str) -> Vec<String> {
        self.group_repos(group)
            .iter()
            .map(|r| r.path.clone())
            .collect()
    }

    fn selected_repo_key(&self) -> Option<(String, String)> {
        self.selected_repo().map(|r| (r.path.clone(), r.name.clone()))
    }

    fn save_workspace(&self) -> Task {
        Task::SaveWorkspace(self.workspace.clone())
    }

    // ---- list ----

    fn list_intent(&mut self, action: Action) -> Vec<Task> {
        if self.filter.editing {
            return self.filter_input_intent(action);
        }

        match action {
            Action::SelectNext => self.select_next(),
            Action::SelectPrevious => self.select_previous(),
            Action::SelectFirst => self.select_first(),
            Action::SelectLast => self.select_last(),
            Action::StartTextFilter => {
                self.filter.editing = true;
                self.refresh_list();
            }
            Action::Cancel => {
                if self.filter.has_text() {
                    self.filter.text.clear();
                    self.refresh_list();
                } else if self.current_group.take().is_some() {
                    self.selected_index = 0;
                    self.refresh_list();
                    self.set_status("");
                }
            }
            Action::Activate | Action::Submit => {
                if let Some(group) = self.selected_group().map(|g| g.name.clone()) {
                    self.current_group = Some(group.clone());
                    self.selected_index = 0;
                    self.refresh_list();
                    self.set_status(format!("Entered group: {}", group));
                    return Vec::new();
                }
                return self.pull_selected();
            }
            Action::PullSelected => return self.pull_selected(),
            Action::PullBatch => return self.pull_batch(),
            Action::PullBehind => return self.pull_behind(),
            Action::Refresh => return self.refresh(),
            Action::RefreshAll => return self.refresh_all(),
            Action::ToggleFavorite => {
                if let Some((path, name)) = self.selected_repo_key() {
                    let now = self.workspace.toggle_favorite(&path);
                    self.apply_favorites();
                    self.refresh_list();
                    if now {
                        self.set_status(format!("Added to favorites: {}", name));
                    } else {
                        self.set_status(format!("Removed from favorites: {}", name));
                    }
                    return vec![self.save_workspace()];
                }
            }
            Action::ToggleDirtyFilter => {
                self.filter.dirty_only = !self.filter.dirty_only;
                self.refresh_list();
                self.set_status(self.filter_status());
            }
            Action::ToggleBehindFilter => {
                self.filter.behind_only = !self.filter.behind_only;
                self.refresh_list();
                self.set_status(self.filter_status());
            }
            Action::ClearFilters => {
                self.filter.dirty_only = false;
                self.filter.behind_only = false;
                self.refresh_list();
                self.set_status("Filters cleared");
            }
            Action::OpenDetail => {
                if let Some((path, name)) = self.selected_repo_key() {
                    self.detail = Some(DetailState::new(&path, &name));
                    self.mode = ViewMode::Detail;
                    return vec![
                        Task::LoadDetail { path: path.clone() },
                        Task::LoadBranches { path },
                    ];
                }
            }
            Action::OpenConfig => {
                self.input_buffer = self.git_dir.clone();
                self.mode = ViewMode::Config;
            }
            Action::OpenSettings => {
                self.menu_index = FetchMode::all()
                    .iter()
                    .position(|m| *m == self.config.fetch_mode)
                    .unwrap_or(0);
                self.mode = ViewMode::Settings;
            }
            Action::OpenInBrowser => {
                if let Some((path, _)) = self.selected_repo_key() {
                    return vec![Task::OpenBrowser { path }];
                }
            }
            Action::NewGroup => {
                if self.current_group.is_none() {
                    self.group_input = Some(GroupInputKind::New);
                    self.input_buffer.clear();
                    self.mode = ViewMode::GroupInput;
                }
            }
            Action::RenameGroup => {
                let target = self
                    .current_group
                    .clone()
                    .or_else(|| self.selected_group().map(|g| g.name.clone()));
                match target {
                    Some(name) if name == FAVORITES_GROUP => {
                        self.set_status("Cannot rename built-in group");
                    }
                    Some(name) => {
                        self.input_buffer = name.clone();
                        self.group_input = Some(GroupInputKind::Rename { old: name });
                        self.mode = ViewMode::GroupInput;
                    }
                    None => {}
                }
            }
            Action::RemoveSelected => return self.remove_selected(),
            Action::AddReposToGroup => {
                if let Some(group) = self.current_group.clone() {
                    self.addable_repos = self.ungrouped_paths();
                    if self.addable_repos.is_empty() {
                        self.set_status("No ungrouped repos to add");
                    } else {
                        self.menu_index = 0;
                        self.mode = ViewMode::GroupAddRepos;
                        self.log_debug(format!("Adding repositories to {}", group));
                    }
                }
            }
            Action::MoveToGroup => {
                if let Some((path, _)) = self.selected_repo_key() {
                    self.move_target = Some(path);
                    self.menu_index = 0;
                    self.mode = ViewMode::GroupSelect;
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn filter_input_intent(&mut self, action: Action) -> Vec<Task> {
        match action {
            Action::InputChar(c) => {
                self.filter.text.push(c);
                self.selected_index = 0;
                self.refresh_list();
            }
            Action::InputBackspace => {
                self.filter.text.pop();
                self.refresh_list();
            }
            Action::Submit => {
                self.filter.editing = false;
                self.refresh_list();
            }
            Action::Cancel => {
                self.filter.editing = false;
                self.filter.text.clear();
                self.refresh_list();
            }
            Action::SelectNext => self.select_next(),
            Action::SelectPrevious => self.select_previous(),
            _ => {}
        }
        Vec::new()
    }

    fn filter_status(&self) -> &'static str {
        match (self.filter.dirty_only, self.filter.behind_only) {
            (true, true) => "Filter: showing repos with local changes and behind remote",
            (true, false) => "Filter: showing repos with local changes",
            (false, true) => "Filter: showing repos behind remote",
            (false, false) => "Filter cleared",
        }
    }

    fn ungrouped_paths(&self) -> Vec<String> {
        let mut repos: Vec<&Repo> = self
            .repos
            .iter()
            .filter(|r| self.workspace.is_ungrouped(&r.path))
            .collect();
        repos.sort_by(|a, b| a.name.cmp(&b.name));
        repos.into_iter().map(|r| r.path.clone()).collect()
    }

    fn pull_selected(&mut self) -> Vec<Task> {
        match self.selected_repo_key() {
            Some((path, name)) => self.start_pull(vec![path], format!("Pulling {}...", name)),
            None => Vec::new(),
        }
    }

    fn pull_batch(&mut self) -> Vec<Task> {
        let group = self
            .current_group
            .clone()
            .or_else(|| self.selected_group().map(|g| g.name.clone()));
        if let Some(group) = group {
            let paths = self.group_paths(&group);
            if paths.is_empty() {
                self.set_status(format!("No repos to pull in {}", group));
                return Vec::new();
            }
            let message = format!("Pulling {} repos in {}...", paths.len(), group);
            return self.start_pull(paths, message);
        }

        let paths = self.favorite_paths();
        if paths.is_empty() {
            self.set_status("No favorites to pull");
            return Vec::new();
        }
        let message = format!("Pulling {} favorites...", paths.len());
        self.start_pull(paths, message)
    }

    fn pull_behind(&mut self) -> Vec<Task> {
        let paths: Vec<String> = self
            .filtered_repos()
            .into_iter()
            .filter(|r| r.is_behind())
            .map(|r| r.path.clone())
            .collect();
        if paths.is_empty() {
            self.set_status("No repos behind remote to pull");
            return Vec::new();
        }
        let message = format!("Pulling {} repos behind remote...", paths.len());
        self.start_pull(paths, message)
    }

    fn refresh(&mut self) -> Vec<Task> {
        let selected = self.selected_repo_key();

        if let Some(group) = self.current_group.clone() {
            return match self.config.fetch_mode {
                FetchMode::OnDemand => match selected {
                    Some((path, name)) => {
                        self.set_status(format!("Refreshing {} (1 repo)...", name));
                        vec![Task::Status { path }]
                    }
                    None => Vec::new(),
                },
                FetchMode::Favorites => {
                    let mut paths = self.favorite_paths();
                    for path in self.group_paths(&group) {
                        if !paths.contains(&path) {
                            paths.push(path);
                        }
                    }
                    if paths.is_empty() {
                        self.set_status("No repos to refresh");
                        return Vec::new();
                    }
                    self.set_status(format!(
                        "Refreshing favorites + {} ({} repos)...",
                        group,
                        paths.len()
                    ));
                    Self::status_tasks(paths)
                }
                FetchMode::All => self.refresh_group(&group, ""),
            };
        }

        if let Some(group) = self.selected_group().map(|g| g.name.clone()) {
            return self.refresh_group(&group, "");
        }

        match self.config.fetch_mode {
            FetchMode::OnDemand => match selected {
                Some((path, name)) => {
                    self.set_status(format!("Refreshing {} (1 repo)...", name));
                    vec![Task::Status { path }]
                }
                None => Vec::new(),
            },
            FetchMode::Favorites => {
                let mut paths = self.favorite_paths();
                if let Some((path, _)) = selected {
                    if !paths.contains(&path) {
                        paths.push(path);
                    }
                }
                if paths.is_empty() {
                    self.set_status("No repos to refresh");
                    return Vec::new();
                }
                self.set_status(format!(
                    "Refreshing favorites + selected ({} repos)...",
                    paths.len()
                ));
                Self::status_tasks(paths)
            }
            FetchMode::All => self.rescan("Scanning..."),
        }
    }

    fn refresh_all(&mut self) -> Vec<Task> {
        if let Some(group) = self.current_group.clone() {
            return self.refresh_group(&group, "all ");
        }
        self.force_full_refresh = true;
        self.rescan("Scanning all...")
    }

    fn refresh_group(&mut self, group: &str, qualifier: &str) -> Vec<Task> {
        let paths = self.group_paths(group);
        if paths.is_empty() {
            self.set_status(format!("No repos to refresh in {}", group));
            return Vec::new();
        }
        self.set_status(format!(
            "Refreshing {}{} repos in {}...",
            qualifier,
            paths.len(),
            group
        ));
        Self::status_tasks(paths)
    }

    fn remove_selected(&mut self) -> Vec<Task> {
        if let Some(group) = self.current_group.clone() {
            if let Some((path, name)) = self.selected_repo_key() {
                self.workspace.remove_from_group(&path, &group);
                self.apply_favorites();
                self.refresh_list();
                self.set_status(format!("Removed {} from {}", name, group));
                return vec![self.save_workspace()];
            }
            return Vec::new();
        }

        if let Some(group) = self.selected_group().cloned() {
            if group.built_in {
                self.set_status("Cannot delete built-in group");
            } else {
                self.group_delete_target = Some(group.name);
                self.mode = ViewMode::GroupDelete;
            }
        }
        Vec::new()
    }

    // ---- detail ----

    fn detail_intent(&mut self, action: Action) -> Vec<Task> {
        let Some(detail) = self.detail.as_mut() else {
            self.mode = ViewMode::List;
            return Vec::new();
        };

        match action {
            Action::Cancel => {
                if detail.pane == DetailPane::Command && !detail.command_input.is_empty() {
                    detail.command_input.clear();
                } else {
                    self.detail = None;
                    self.mode = ViewMode::List;
                }
                Vec::new()
            }
            Action::FocusNextPane => {
                detail.pane = detail.pane.next();
                Vec::new()
            }
            Action::FocusPrevPane => {
                detail.pane = detail.pane.prev();
                Vec::new()
            }
            Action::ReloadDetail if detail.pane != DetailPane::Command => {
                let path = detail.path.clone();
                vec![
                    Task::LoadDetail { path: path.clone() },
                    Task::LoadBranches { path },
                ]
            }
            Action::ScrollUp => {
                detail.scroll = detail.scroll.saturating_sub(1);
                Vec::new()
            }
            Action::ScrollDown => {
                detail.scroll += 1;
                Vec::new()
            }
            action => match detail.pane {
                DetailPane::Status => {
                    match action {
                        Action::SelectPrevious => detail.scroll = detail.scroll.saturating_sub(1),
                        Action::SelectNext => detail.scroll += 1,
                        Action::SelectFirst => detail.scroll = 0,
                        _ => {}
                    }
                    Vec::new()
                }
                DetailPane::Branches => self.branch_intent(action),
                DetailPane::Command => self.command_intent(action),
            },
        }
    }

    fn branch_intent(&mut self, action: Action) -> Vec<Task> {
        let Some(detail) = self.detail.as_mut() else {
            return Vec::new();
        };
        match action {
            Action::SelectPrevious => {
                detail.branch_index = detail.branch_index.saturating_sub(1);
                return Vec::new();
            }
            Action::SelectNext => {
                if detail.branch_index + 1 < detail.branches.len() {
                    detail.branch_index += 1;
                }
                return Vec::new();
            }
            _ => {}
        }

        let path = detail.path.clone();
        let Some(branch) = detail.selected_branch().cloned() else {
            return Vec::new();
        };

        match action {
            Action::Submit | Action::SwitchBranch => {
                if branch.is_current {
                    self.set_status(format!("Already on {}", branch.name));
                    return Vec::new();
                }
                if let Some(detail) = self.detail.as_mut() {
                    detail.target_branch = Some(branch.name.clone());
                }
                vec![Task::ProbeChanges {
                    path,
                    branch: branch.name,
                }]
            }
            Action::DeleteBranch { force } => {
                if branch.is_current {
                    self.set_status("Cannot delete current branch");
                    return Vec::new();
                }
                if !branch.is_local {
                    self.set_status(if force {
                        "Branch is remote-only"
                    } else {
                        "Branch is remote-only, nothing to delete locally"
                    });
                    return Vec::new();
                }
                if branch.is_remote && !force {
                    self.set_status("Branch exists on remote. Use 'X' to force delete.");
                    return Vec::new();
                }
                vec![Task::DeleteBranch {
                    path,
                    branch: branch.name,
                    force,
                }]
            }
            Action::CreateTrackingBranch => {
                if branch.is_local {
                    self.set_status("Branch already exists locally");
                    return Vec::new();
                }
                if !branch.is_remote {
                    self.set_status("Branch is not on remote");
                    return Vec::new();
                }
                self.set_status(format!("Creating local branch {}...", branch.name));
                vec![Task::CreateTrackingBranch {
                    path,
                    branch: branch.name,
                    remote: branch.remote_name,
                }]
            }
            _ => Vec::new(),
        }
    }

    fn command_intent(&mut self, action: Action) -> Vec<Task> {
        let Some(detail) = self.detail.as_mut() else {
            return Vec::new();
        };
        match action {
            Action::InputChar(c) => detail.command_input.push(c),
            Action::InputBackspace => {
                detail.command_input.pop();
            }
            Action::Submit => {
                let command = detail.command_input.trim().to_string();
                if command.is_empty() || detail.command_running {
                    return Vec::new();
                }
                detail.command_running = true;
                detail.command_output = format!("Running: {}\n\n", command);
                detail.command_input.clear();
                return vec![Task::RunCommand {
                    path: detail.path.clone(),
                    command,
                }];
            }
            _ => {}
        }
        Vec::new()
    }

    // ---- modal views ----

    fn action_select_intent(&mut self, action: Action) -> Vec<Task> {
        let back_to_branches = |state: &mut Self| {
            state.mode = ViewMode::Detail;
            if let Some(detail) = state.detail.as_mut() {
                detail.pane = DetailPane::Branches;
                detail.target_branch = None;
            }
        };

        match action {
            Action::SelectPrevious => self.menu_index = self.menu_index.saturating_sub(1),
            Action::SelectNext => {
                self.menu_index = (self.menu_index + 1).min(SWITCH_CHOICES.len() - 1);
            }
            Action::Cancel => back_to_branches(self),
            Action::Submit => {
                let Some(path) = self.detail.as_ref().map(|d| d.path.clone()) else {
                    self.mode = ViewMode::List;
                    return Vec::new();
                };
                match self.menu_index {
                    0 => {
                        self.set_status("Stashing changes...");
                        return vec![Task::Stash { path }];
                    }
                    1 => {
                        self.set_status("Discarding changes...");
                        return vec![Task::Discard { path }];
                    }
                    _ => back_to_branches(self),
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn error_intent(&mut self, action: Action) -> Vec<Task> {
        match action {
            Action::Cancel | Action::Submit => return self.dismiss_error(),
            Action::ScrollUp | Action::SelectPrevious => {
                self.error_scroll = self.error_scroll.saturating_sub(1);
            }
            Action::ScrollDown | Action::SelectNext => {
                let lines = self.error_message.lines().count();
                if self.error_scroll + 1 < lines {
                    self.error_scroll += 1;
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn settings_intent(&mut self, action: Action) -> Vec<Task> {
        match action {
            Action::Cancel => self.mode = ViewMode::List,
            Action::SelectPrevious => self.menu_index = self.menu_index.saturating_sub(1),
            Action::SelectNext => {
                self.menu_index = (self.menu_index + 1).min(SETTINGS_SHOW_RESULTS_ROW);
            }
            Action::Submit | Action::Activate => {
                if let Some(mode) = FetchMode::all().get(self.menu_index).copied() {
                    if mode == self.config.fetch_mode {
                        return Vec::new();
                    }
                    self.config.fetch_mode = mode;
                    self.set_status(format!("Fetch mode: {}", mode.display_name()));
                } else {
                    self.config.show_pull_results = !self.config.show_pull_results;
                    let state = if self.config.show_pull_results { "on" } else { "off" };
                    self.set_status(format!("Pull results screen: {}", state));
                }
                tracing::info!("settings changed: {:?}", self.config.fetch_mode);
                return vec![Task::SaveConfig(self.config.clone())];
            }
            _ => {}
        }
        Vec::new()
    }

    fn config_intent(&mut self, action: Action) -> Vec<Task> {
        match action {
            Action::Cancel => {
                self.input_buffer.clear();
                self.mode = ViewMode::List;
            }
            Action::InputChar(c) => self.input_buffer.push(c),
            Action::InputBackspace => {
                self.input_buffer.pop();
            }
            Action::Submit => {
                let root = expand_home(self.input_buffer.trim());
                if root.is_empty() {
                    self.set_status("Invalid directory");
                    return Vec::new();
                }
                self.pending_root = Some(root.clone());
                self.scanning = true;
                self.set_status("Scanning...");
                return vec![Task::Scan { root }];
            }
            _ => {}
        }
        Vec::new()
    }

    fn group_input_intent(&mut self, action: Action) -> Vec<Task> {
        match action {
            Action::Cancel => {
                self.input_buffer.clear();
                self.group_input = None;
                self.mode = ViewMode::List;
            }
            Action::InputChar(c) => self.input_buffer.push(c),
            Action::InputBackspace => {
                self.input_buffer.pop();
            }
            Action::Submit => {
                let name = self.input_buffer.trim().to_string();
                let result = match self.group_input.clone() {
                    Some(GroupInputKind::New) => self
                        .workspace
                        .create_group(&name)
                        .map(|_| Some(format!("Created group: {}", name))),
                    Some(GroupInputKind::Rename { old }) => {
                        self.workspace.rename_group(&old, &name).map(|_| {
                            if old == name {
                                return None;
                            }
                            if self.current_group.as_deref() == Some(old.as_str()) {
                                self.current_group = Some(name.clone());
                            }
                            Some(format!("Renamed group to: {}", name))
                        })
                    }
                    None => Ok(None),
                };
                match result {
                    Ok(message) => {
                        self.input_buffer.clear();
                        self.group_input = None;
                        self.mode = ViewMode::List;
                        self.refresh_list();
                        if let Some(message) = message {
                            self.log_info(message.clone());
                            self.set_status(message);
                            return vec![self.save_workspace()];
                        }
                    }
                    Err(e) => self.set_status(e),
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn group_delete_intent(&mut self, action: Action) -> Vec<Task> {
        match action {
            Action::Cancel => {
                self.group_delete_target = None;
                self.mode = ViewMode::List;
            }
            Action::Submit => {
                self.mode = ViewMode::List;
                let Some(name) = self.group_delete_target.take() else {
                    return Vec::new();
                };
                match self.workspace.delete_group(&name) {
                    Ok(()) => {
                        if self.current_group.as_deref() == Some(name.as_str()) {
                            self.current_group = None;
                        }
                        self.refresh_list();
                        self.set_status(format!("Deleted group: {}", name));
                        self.log_info(format!("Deleted group {}", name));
                        return vec![self.save_workspace()];
                    }
                    Err(e) => self.set_status(e),
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn group_select_intent(&mut self, action: Action) -> Vec<Task> {
        // The last row removes the repository from every group.
        let rows = self.group_choices().len() + 1;
        match action {
            Action::Cancel => {
                self.move_target = None;
                self.mode = ViewMode::List;
            }
            Action::SelectPrevious => self.menu_index = self.menu_index.saturating_sub(1),
            Action::SelectNext => self.menu_index = (self.menu_index + 1).min(rows - 1),
            Action::Submit => {
                self.mode = ViewMode::List;
                let Some(path) = self.move_target.take() else {
                    return Vec::new();
                };
                let name = self.repo_name(&path);
                match self.group_choices().get(self.menu_index).cloned() {
                    Some(group) => match self.workspace.move_to_group(&path, &group) {
                        Ok(()) => self.set_status(format!("Moved {} to {}", name, group)),
                        Err(e) => {
                            self.set_status(e);
                            return Vec::new();
                        }
                    },
                    None => {
                        self.workspace.detach(&path);
                        self.set_status(format!("Removed {} from group", name));
                    }
                }
                self.apply_favorites();
                self.refresh_list();
                return vec![self.save_workspace()];
            }
            _ => {}
        }
        Vec::new()
    }

    fn group_add_intent(&mut self, action: Action) -> Vec<Task> {
        match action {
            Action::Cancel => self.mode = ViewMode::List,
            Action::SelectPrevious => self.menu_index = self.menu_index.saturating_sub(1),
            Action::SelectNext => {
                if self.menu_index + 1 < self.addable_repos.len() {
                    self.menu_index += 1;
                }
            }
            Action::Submit | Action::Activate => {
                let (Some(group), Some(path)) = (
                    self.current_group.clone(),
                    self.addable_repos.get(self.menu_index).cloned(),
                ) else {
                    self.mode = ViewMode::List;
                    return Vec::new();
                };
                if let Err(e) = self.workspace.add_to_group(&path, &group) {
                    self.set_status(e);
                    return Vec::new();
                }
                let name = self.repo_name(&path);
                self.set_status(format!("Added {} to {}", name, group));
                self.apply_favorites();
                self.addable_repos = self.ungrouped_paths();
                self.menu_index = self
                    .menu_index
                    .min(self.addable_repos.len().saturating_sub(1));
                if self.addable_repos.is_empty() {
                    self.mode = ViewMode::List;
                }
                self.refresh_list();
                return vec![self.save_workspace()];
            }
            _ => {}
        }
        Vec::new()
    }

    fn results_intent(&mut self, action: Action) -> Vec<Task> {
        if matches!(action, Action::Cancel) {
            self.results = None;
            self.mode = ViewMode::List;
            self.refresh_list();
            return Vec::new();
        }
        let Some(tree) = self.results.as_mut() else {
            self.mode = ViewMode::List;
            return Vec::new();
        };
        match action {
            Action::SelectNext => tree.move_down(),
            Action::SelectPrevious => tree.move_up(),
            Action::ResultsDescend | Action::Submit => {
                if let Some(request) = tree.descend() {
                    return vec![Task::LoadCommitFiles {
                        path: request.path,
                        hash: request.hash,
                    }];
                }
            }
            Action::ResultsAscend => tree.ascend(),
            Action::ResultsToggleAll => tree.toggle_expand_all(),
            _ => {}
        }
        Vec::new()
    }
}
