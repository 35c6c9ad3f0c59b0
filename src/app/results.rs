use std::collections::{HashMap, HashSet};

use crate::git::{FileChange, PullResultInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeLevel {
    #[default]
    Repo,
    Commit,
    File,
}

/// Position in the repo → commit → file tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PullResultsCursor {
    pub level: TreeLevel,
    pub repo_idx: usize,
    pub commit_idx: usize,
    pub file_idx: usize,
}

/// A commit whose file list must be fetched before it can be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRequest {
    pub path: String,
    pub hash: String,
}

/// One rendered line of the results screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeRow<'a> {
    Repo {
        result: &'a PullResultInfo,
        expanded: bool,
        selected: bool,
    },
    Commit {
        commit: &'a crate::git::CommitInfo,
        selected: bool,
        open: bool,
    },
    File {
        file: &'a FileChange,
        selected: bool,
    },
    Loading,
}

/// Navigable summary of one pull round.
#[derive(Debug, Clone, Default)]
pub struct ResultTree {
    results: Vec<PullResultInfo>,
    cursor: PullResultsCursor,
    expanded: HashSet<String>,
    files: HashMap<(String, String), Vec<FileChange>>,
    loading: HashSet<(String, String)>,
}

impl ResultTree {
    /// Fresh tree at the first repository, which starts expanded.
    pub fn new(results: Vec<PullResultInfo>) -> Self {
        let mut expanded = HashSet::new();
        if let Some(first) = results.first() {
            expanded.insert(first.repo_path.clone());
        }
        Self {
            results,
            cursor: PullResultsCursor::default(),
            expanded,
            files: HashMap::new(),
            loading: HashSet::new(),
        }
    }

    pub fn results(&self) -> &[PullResultInfo] {
        &self.results
    }

    pub fn cursor(&self) -> PullResultsCursor {
        self.cursor
    }

    pub fn is_expanded(&self, idx: usize) -> bool {
        let Some(result) = self.results.get(idx) else {
            return false;
        };
        self.expanded.contains(&result.repo_path)
            || (self.cursor.level != TreeLevel::Repo && self.cursor.repo_idx == idx)
    }

    pub fn current_repo(&self) -> Option<&PullResultInfo> {
        self.results.get(self.cursor.repo_idx)
    }

    fn current_key(&self) -> Option<(String, String)> {
        let repo = self.current_repo()?;
        let commit = repo.commits.get(self.cursor.commit_idx)?;
        Some((repo.repo_path.clone(), commit.hash.clone()))
    }

    pub fn files_for(&self, path: &str, hash: &str) -> Option<&[FileChange]> {
        self.files
            .get(&(path.to_string(), hash.to_string()))
            .map(Vec::as_slice)
    }

    pub fn is_loading(&self, path: &str, hash: &str) -> bool {
        self.loading.contains(&(path.to_string(), hash.to_string()))
    }

    fn count_at_level(&self) -> usize {
        match self.cursor.level {
            TreeLevel::Repo => self.results.len(),
            TreeLevel::Commit => self.current_repo().map_or(0, |r| r.commits.len()),
            TreeLevel::File => self
                .current_key()
                .and_then(|key| self.files.get(&key))
                .map_or(0, Vec::len),
        }
    }

    fn index_mut(&mut self) -> &mut usize {
        match self.cursor.level {
            TreeLevel::Repo => &mut self.cursor.repo_idx,
            TreeLevel::Commit => &mut self.cursor.commit_idx,
            TreeLevel::File => &mut self.cursor.file_idx,
        }
    }

    pub fn move_down(&mut self) {
        let count = self.count_at_level();
        let idx = self.index_mut();
        if *idx + 1 < count {
            *idx += 1;
        }
    }

    pub fn move_up(&mut self) {
        let idx = self.index_mut();
        *idx = idx.saturating_sub(1);
    }

    /// Go one level deeper. Returns the file list to fetch when entering a
    /// commit whose files are neither cached nor already loading.
    pub fn descend(&mut self) -> Option<FileRequest> {
        match self.cursor.level {
            TreeLevel::Repo => {
                let repo = self.current_repo()?;
                if repo.commits.is_empty() {
                    return None;
                }
                let path = repo.repo_path.clone();
                self.expanded.insert(path);
                self.cursor.level = TreeLevel::Commit;
                self.cursor.commit_idx = 0;
                None
            }
            TreeLevel::Commit => {
                let key = self.current_key()?;
                self.cursor.level = TreeLevel::File;
                self.cursor.file_idx = 0;
                if self.files.contains_key(&key) || self.loading.contains(&key) {
                    return None;
                }
                self.loading.insert(key.clone());
                Some(FileRequest {
                    path: key.0,
                    hash: key.1,
                })
            }
            TreeLevel::File => None,
        }
    }

    /// Go one level up. Child indices are kept.
    pub fn ascend(&mut self) {
        self.cursor.level = match self.cursor.level {
            TreeLevel::Repo | TreeLevel::Commit => TreeLevel::Repo,
            TreeLevel::File => TreeLevel::Commit,
        };
    }

    /// Expand every repository if any is collapsed, otherwise collapse all.
    pub fn toggle_expand_all(&mut self) {
        let any_collapsed = self
            .results
            .iter()
            .any(|r| !self.expanded.contains(&r.repo_path));
        if any_collapsed {
            self.expanded = self.results.iter().map(|r| r.repo_path.clone()).collect();
        } else {
            self.expanded.clear();
            self.cursor.level = TreeLevel::Repo;
        }
    }

    /// Store a fetched file list. Later loads for the same key are ignored.
    pub fn files_loaded(&mut self, path: &str, hash: &str, files: Vec<FileChange>) {
        let key = (path.to_string(), hash.to_string());
        self.loading.remove(&key);
        self.files.entry(key).or_insert(files);
    }

    /// (repositories, commits, files changed) across the round.
    pub fn totals(&self) -> (usize, usize, usize) {
        self.results
            .iter()
            .filter(|r| r.updated)
            .fold((0, 0, 0), |(repos, commits, files), r| {
                (repos + 1, commits + r.commits.len(), files + r.files_changed)
            })
    }

    pub fn rows(&self) -> Vec<TreeRow<'_>> {
        let mut rows = Vec::new();
        let cursor = self.cursor;
        for (i, result) in self.results.iter().enumerate() {
            let expanded = self.is_expanded(i);
            rows.push(TreeRow::Repo {
                result,
                expanded,
                selected: cursor.level == TreeLevel::Repo && cursor.repo_idx == i,
            });
            if !expanded {
                continue;
            }
            let in_repo = cursor.repo_idx == i;
            for (j, commit) in result.commits.iter().enumerate() {
                let open = in_repo && cursor.level == TreeLevel::File && cursor.commit_idx == j;
                rows.push(TreeRow::Commit {
                    commit,
                    selected: in_repo && cursor.level == TreeLevel::Commit && cursor.commit_idx == j,
                    open,
                });
                if !open {
                    continue;
                }
                match self.files_for(&result.repo_path, &commit.hash) {
                    Some(files) => rows.extend(files.iter().enumerate().map(|(k, file)| {
                        TreeRow::File {
                            file,
                            selected: cursor.file_idx == k,
                        }
                    })),
                    None => rows.push(TreeRow::Loading),
                }
            }
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::CommitInfo;

    fn result(path: &str, commits: usize) -> PullResultInfo {
        PullResultInfo {
            repo_path: path.to_string(),
            repo_name: path.trim_start_matches("/git/").to_string(),
            commits: (0..commits)
                .map(|i| CommitInfo {
                    hash: format!("{}{}", &path[5..], i),
                    message: format!("commit {}", i),
                    author: "dev".to_string(),
                    time: "1 hour ago".to_string(),
                })
                .collect(),
            files_changed: commits * 2,
            updated: true,
        }
    }

    fn file(path: &str) -> FileChange {
        FileChange {
            path: path.to_string(),
            additions: 1,
            deletions: 1,
        }
    }

    fn tree() -> ResultTree {
        ResultTree::new(vec![result("/git/a", 3), result("/git/b", 2)])
    }

    #[test]
    fn test_initial_state() {
        let tree = tree();
        assert_eq!(tree.cursor(), PullResultsCursor::default());
        assert!(tree.is_expanded(0));
        assert!(!tree.is_expanded(1));
    }

    #[test]
    fn test_moves_are_clamped() {
        let mut tree = tree();
        tree.move_up();
        assert_eq!(tree.cursor().repo_idx, 0);
        tree.move_down();
        tree.move_down();
        tree.move_down();
        assert_eq!(tree.cursor().repo_idx, 1);
    }

    #[test]
    fn test_descend_resets_child_index() {
        let mut tree = tree();
        tree.descend();
        tree.move_down();
        tree.move_down();
        assert_eq!(tree.cursor().commit_idx, 2);
        tree.ascend();
        tree.move_down();
        tree.descend();
        assert_eq!(tree.cursor().level, TreeLevel::Commit);
        assert_eq!(tree.cursor().commit_idx, 0);
    }

    #[test]
    fn test_descend_then_ascend_restores_position() {
        let mut tree = tree();
        tree.move_down();
        let before = tree.cursor();
        tree.descend();
        tree.ascend();
        assert_eq!(tree.cursor().level, before.level);
        assert_eq!(tree.cursor().repo_idx, before.repo_idx);

        tree.descend();
        tree.move_down();
        let at_commit = tree.cursor();
        tree.descend();
        tree.ascend();
        assert_eq!(tree.cursor(), at_commit);
    }

    #[test]
    fn test_ascend_at_root_is_noop() {
        let mut tree = tree();
        tree.ascend();
        assert_eq!(tree.cursor(), PullResultsCursor::default());
    }

    #[test]
    fn test_file_level_requests_once() {
        let mut tree = tree();
        tree.descend();
        tree.move_down();
        let request = tree.descend().unwrap();
        assert_eq!(
            request,
            FileRequest {
                path: "/git/a".to_string(),
                hash: "a1".to_string()
            }
        );
        assert!(tree.is_loading("/git/a", "a1"));
        // no descent below files
        assert_eq!(tree.descend(), None);
        assert_eq!(tree.cursor().level, TreeLevel::File);

        // still loading: re-entering must not request again
        tree.ascend();
        assert_eq!(tree.descend(), None);

        tree.files_loaded("/git/a", "a1", vec![file("x.rs"), file("y.rs")]);
        tree.ascend();
        assert_eq!(tree.descend(), None);
        assert_eq!(tree.files_for("/git/a", "a1").map(<[FileChange]>::len), Some(2));
    }

    #[test]
    fn test_file_moves_clamped_to_loaded_files() {
        let mut tree = tree();
        tree.descend();
        tree.descend();
        tree.move_down();
        assert_eq!(tree.cursor().file_idx, 0);
        tree.files_loaded("/git/a", "a0", vec![file("x.rs"), file("y.rs")]);
        tree.move_down();
        tree.move_down();
        assert_eq!(tree.cursor().file_idx, 1);
    }

    #[test]
    fn test_cache_populated_once() {
        let mut tree = tree();
        tree.files_loaded("/git/a", "a0", vec![file("first.rs")]);
        tree.files_loaded("/git/a", "a0", vec![file("second.rs")]);
        assert_eq!(tree.files_for("/git/a", "a0").unwrap()[0].path, "first.rs");
    }

    #[test]
    fn test_toggle_expand_all() {
        let mut tree = tree();
        tree.toggle_expand_all();
        assert!(tree.is_expanded(0) && tree.is_expanded(1));
        tree.toggle_expand_all();
        assert!(!tree.is_expanded(0) && !tree.is_expanded(1));
        assert_eq!(tree.cursor().level, TreeLevel::Repo);
    }

    #[test]
    fn test_rows_show_expanded_commits_and_loading() {
        let mut tree = tree();
        assert_eq!(tree.rows().len(), 1 + 3 + 1);

        tree.descend();
        tree.descend();
        let rows = tree.rows();
        assert!(rows.contains(&TreeRow::Loading));

        tree.files_loaded("/git/a", "a0", vec![file("x.rs")]);
        let rows = tree.rows();
        assert!(!rows.contains(&TreeRow::Loading));
        assert!(matches!(rows[2], TreeRow::File { selected: true, .. }));
    }

    #[test]
    fn test_totals() {
        assert_eq!(tree().totals(), (2, 5, 10));
    }
}
