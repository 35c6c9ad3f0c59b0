use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::app::Config;

/// Name of the built-in group synthesized from the favorites set.
pub const FAVORITES_GROUP: &str = "Favorites";

/// A named collection of repository paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    #[serde(default)]
    pub repos: Vec<String>,
}

/// Persisted favorites and user groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceData {
    #[serde(default)]
    pub favorites: BTreeSet<String>,
    #[serde(default)]
    pub groups: Vec<Group>,
}

impl WorkspaceData {
    pub fn is_favorite(&self, path: &str) -> bool {
        self.favorites.contains(path)
    }

    /// Flip favorite status, returning the new state.
    pub fn toggle_favorite(&mut self, path: &str) -> bool {
        if self.favorites.remove(path) {
            false
        } else {
            self.favorites.insert(path.to_string());
            true
        }
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn group_exists(&self, name: &str) -> bool {
        name == FAVORITES_GROUP || self.group(name).is_some()
    }

    /// The user group a repository belongs to, if any.
    pub fn group_of(&self, path: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|g| g.repos.iter().any(|r| r == path))
            .map(|g| g.name.as_str())
    }

    /// Neither a favorite nor a member of any user group.
    pub fn is_ungrouped(&self, path: &str) -> bool {
        !self.is_favorite(path) && self.group_of(path).is_none()
    }

    /// Member paths of a group, the built-in favorites group included.
    pub fn members(&self, name: &str) -> Vec<String> {
        if name == FAVORITES_GROUP {
            return self.favorites.iter().cloned().collect();
        }
        self.group(name).map(|g| g.repos.clone()).unwrap_or_default()
    }

    /// Favorites first (only when non-empty), then user groups by name.
    pub fn listed_groups(&self) -> Vec<(String, bool)> {
        let mut names: Vec<&str> = self.groups.iter().map(|g| g.name.as_str()).collect();
        names.sort();
        let mut listed = Vec::with_capacity(names.len() + 1);
        if !self.favorites.is_empty() {
            listed.push((FAVORITES_GROUP.to_string(), true));
        }
        listed.extend(names.into_iter().map(|n| (n.to_string(), false)));
        listed
    }

    pub fn create_group(&mut self, name: &str) -> Result<(), String> {
        let name = name.trim();
        if name.is_empty() {
            return Err("Group name cannot be empty".to_string());
        }
        if self.group_exists(name) {
            return Err(format!("Group already exists: {}", name));
        }
        self.groups.push(Group {
            name: name.to_string(),
            repos: Vec::new(),
        });
        Ok(())
    }

    pub fn rename_group(&mut self, old: &str, new: &str) -> Result<(), String> {
        let new = new.trim();
        if old == FAVORITES_GROUP {
            return Err("Cannot rename built-in group".to_string());
        }
        if new.is_empty() {
            return Err("Group name cannot be empty".to_string());
        }
        if old == new {
            return Ok(());
        }
        if self.group_exists(new) {
            return Err(format!("Group already exists: {}", new));
        }
        let group = self
            .groups
            .iter_mut()
            .find(|g| g.name == old)
            .ok_or_else(|| format!("No such group: {}", old))?;
        group.name = new.to_string();
        Ok(())
    }

    pub fn delete_group(&mut self, name: &str) -> Result<(), String> {
        if name == FAVORITES_GROUP {
            return Err("Cannot delete built-in group".to_string());
        }
        let before = self.groups.len();
        self.groups.retain(|g| g.name != name);
        if self.groups.len() == before {
            return Err(format!("No such group: {}", name));
        }
        Ok(())
    }

    /// Take a repository out of every group, favorites included.
    pub fn detach(&mut self, path: &str) {
        for group in &mut self.groups {
            group.repos.retain(|r| r != path);
        }
        self.favorites.remove(path);
    }

    /// Move a repository into `target`, leaving every other group.
    pub fn move_to_group(&mut self, path: &str, target: &str) -> Result<(), String> {
        if !self.group_exists(target) {
            return Err(format!("No such group: {}", target));
        }
        self.detach(path);
        if target == FAVORITES_GROUP {
            self.favorites.insert(path.to_string());
        } else if let Some(group) = self.groups.iter_mut().find(|g| g.name == target) {
            group.repos.push(path.to_string());
        }
        Ok(())
    }

    /// Remove a repository from one group only.
    pub fn remove_from_group(&mut self, path: &str, name: &str) {
        if name == FAVORITES_GROUP {
            self.favorites.remove(path);
        } else if let Some(group) = self.groups.iter_mut().find(|g| g.name == name) {
            group.repos.retain(|r| r != path);
        }
    }

    /// Add an ungrouped repository to a group.
    pub fn add_to_group(&mut self, path: &str, name: &str) -> Result<(), String> {
        if !self.is_ungrouped(path) {
            return Err("Repository is already grouped".to_string());
        }
        self.move_to_group(path, name)
    }
}

/// Reads and writes `workspace.json` in the config directory.
pub struct WorkspaceStorage {
    path: PathBuf,
}

impl WorkspaceStorage {
    pub fn new() -> Result<Self> {
        let config_dir = Config::ensure_config_dir()?;
        Ok(Self {
            path: config_dir.join("workspace.json"),
        })
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load workspace data. A missing file is an empty workspace.
    pub fn load(&self) -> Result<WorkspaceData> {
        if !self.path.exists() {
            return Ok(WorkspaceData::default());
        }

        let content =
            std::fs::read_to_string(&self.path).context("Failed to read workspace file")?;

        serde_json::from_str(&content).context("Failed to parse workspace file")
    }

    pub fn save(&self, data: &WorkspaceData) -> Result<()> {
        let content =
            serde_json::to_string_pretty(data).context("Failed to serialize workspace")?;

        std::fs::write(&self.path, content).context("Failed to write workspace file")?;

        Ok(())
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace() -> WorkspaceData {
        let mut ws = WorkspaceData::default();
        ws.create_group("work").unwrap();
        ws.create_group("oss").unwrap();
        ws
    }

    #[test]
    fn test_missing_file_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = WorkspaceStorage::at(tmp.path().join("workspace.json"));
        assert_eq!(storage.load().unwrap(), WorkspaceData::default());
    }

    #[test]
    fn test_save_and_load() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = WorkspaceStorage::at(tmp.path().join("workspace.json"));
        let mut ws = workspace();
        ws.toggle_favorite("/git/a");
        ws.move_to_group("/git/b", "work").unwrap();
        storage.save(&ws).unwrap();
        assert_eq!(storage.load().unwrap(), ws);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = WorkspaceStorage::at(tmp.path().join("workspace.json"));
        std::fs::write(storage.path(), "{not json").unwrap();
        assert!(storage.load().is_err());
    }

    #[test]
    fn test_favorites_group_listed_first_when_non_empty() {
        let mut ws = workspace();
        let names: Vec<String> = ws.listed_groups().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["oss", "work"]);

        ws.toggle_favorite("/git/a");
        let listed = ws.listed_groups();
        assert_eq!(listed[0], (FAVORITES_GROUP.to_string(), true));
        assert_eq!(listed.len(), 3);
    }

    #[test]
    fn test_create_rejects_duplicates_and_reserved() {
        let mut ws = workspace();
        assert!(ws.create_group("work").is_err());
        assert!(ws.create_group(FAVORITES_GROUP).is_err());
        assert!(ws.create_group("   ").is_err());
    }

    #[test]
    fn test_builtin_group_is_protected() {
        let mut ws = workspace();
        assert!(ws.rename_group(FAVORITES_GROUP, "faves").is_err());
        assert!(ws.delete_group(FAVORITES_GROUP).is_err());
    }

    #[test]
    fn test_rename_keeps_members() {
        let mut ws = workspace();
        ws.move_to_group("/git/a", "work").unwrap();
        ws.rename_group("work", "job").unwrap();
        assert_eq!(ws.group_of("/git/a"), Some("job"));
        assert!(ws.rename_group("job", "oss").is_err());
    }

    #[test]
    fn test_move_keeps_single_membership() {
        let mut ws = workspace();
        ws.move_to_group("/git/a", "work").unwrap();
        ws.move_to_group("/git/a", "oss").unwrap();
        assert_eq!(ws.members("work"), Vec::<String>::new());
        assert_eq!(ws.members("oss"), vec!["/git/a".to_string()]);
    }

    #[test]
    fn test_move_to_user_group_drops_favorite() {
        let mut ws = workspace();
        ws.toggle_favorite("/git/a");
        ws.move_to_group("/git/a", "work").unwrap();
        assert!(!ws.is_favorite("/git/a"));

        ws.move_to_group("/git/a", FAVORITES_GROUP).unwrap();
        assert!(ws.is_favorite("/git/a"));
        assert_eq!(ws.group_of("/git/a"), None);
    }

    #[test]
    fn test_ungrouped_and_add() {
        let mut ws = workspace();
        assert!(ws.is_ungrouped("/git/a"));
        ws.add_to_group("/git/a", "work").unwrap();
        assert!(!ws.is_ungrouped("/git/a"));
        assert!(ws.add_to_group("/git/a", "oss").is_err());

        ws.toggle_favorite("/git/b");
        assert!(!ws.is_ungrouped("/git/b"));
    }

    #[test]
    fn test_delete_group_releases_members() {
        let mut ws = workspace();
        ws.move_to_group("/git/a", "work").unwrap();
        ws.delete_group("work").unwrap();
        assert!(ws.is_ungrouped("/git/a"));
        assert!(ws.delete_group("work").is_err());
    }

    #[test]
    fn test_remove_from_favorites_group() {
        let mut ws = workspace();
        ws.toggle_favorite("/git/a");
        ws.remove_from_group("/git/a", FAVORITES_GROUP);
        assert!(!ws.is_favorite("/git/a"));
    }
}
