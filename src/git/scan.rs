use anyhow::{Context, Result};
use git2::Repository;
use std::path::Path;

/// A working directory found directly under the scan root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredRepo {
    pub name: String,
    pub path: String,
}

/// List the immediate subdirectories of `root` that are git working directories.
///
/// Only one level deep. Entries that can't be read are skipped; an unreadable
/// root is an error.
pub fn scan_repos(root: &Path) -> Result<Vec<DiscoveredRepo>> {
    let entries = std::fs::read_dir(root)
        .with_context(|| format!("Failed to read directory {}", root.display()))?;

    let mut repos: Vec<DiscoveredRepo> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter(|entry| is_git_workdir(&entry.path()))
        .map(|entry| DiscoveredRepo {
            name: entry.file_name().to_string_lossy().to_string(),
            path: entry.path().to_string_lossy().to_string(),
        })
        .collect();

    repos.sort_by(|a, b| a.name.cmp(&b.name));
    tracing::info!("scanned {}: {} repositories", root.display(), repos.len());
    Ok(repos)
}

fn is_git_workdir(path: &Path) -> bool {
    // Cheap check first so plain directories never hit libgit2.
    if !path.join(".git").exists() {
        return false;
    }
    Repository::open(path)
        .map(|repo| !repo.is_bare())
        .unwrap_or(false)
}
