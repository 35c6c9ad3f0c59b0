use std::collections::{BTreeMap, HashSet};

use super::command::GitCommand;

/// One branch as seen from a repository, reconciled across local and remote refs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchInfo {
    pub name: String,
    pub is_local: bool,
    pub is_remote: bool,
    pub is_current: bool,
    /// Remote tracking ref, e.g. "origin/main". Empty when there is none.
    pub remote_name: String,
}

impl BranchInfo {
    fn rank(&self) -> u8 {
        if self.is_current {
            0
        } else if self.is_local && self.is_remote {
            1
        } else if self.is_local {
            2
        } else {
            3
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchListing {
    pub current: String,
    pub branches: Vec<BranchInfo>,
}

/// Outcome of a branch mutation. `Err` carries the trimmed tool output.
pub type BranchOpResult = Result<(), String>;

/// Load and reconcile every local and remote branch of a repository.
///
/// Never fails: a query that errors contributes nothing to the listing.
pub async fn load_branches(path: &str) -> BranchListing {
    let _ = GitCommand::git(path, ["fetch", "--all", "--prune", "--quiet"])
        .run()
        .await;

    let current = GitCommand::git(path, ["rev-parse", "--abbrev-ref", "HEAD"])
        .run()
        .await
        .ok_stdout()
        .unwrap_or_default()
        .to_string();

    let locals = GitCommand::git(
        path,
        [
            "for-each-ref",
            "--format=%(refname:short) %(upstream:short)",
            "refs/heads/",
        ],
    )
    .run()
    .await;

    let remotes = GitCommand::git(
        path,
        ["for-each-ref", "--format=%(refname:short)", "refs/remotes/"],
    )
    .run()
    .await;

    let branches = reconcile(
        &current,
        locals.ok_stdout().unwrap_or_default(),
        remotes.ok_stdout().unwrap_or_default(),
    );
    tracing::debug!("loaded {} branches for {}", branches.len(), path);

    BranchListing { current, branches }
}

/// Parse `<local> [<upstream>]` lines into an ordered map.
pub fn parse_local_branches(output: &str) -> BTreeMap<String, String> {
    output
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let local = parts.next()?;
            let upstream = parts.next().unwrap_or_default();
            Some((local.to_string(), upstream.to_string()))
        })
        .collect()
}

/// Parse remote ref names, dropping the symbolic `<remote>/HEAD` pointer.
pub fn parse_remote_branches(output: &str) -> Vec<String> {
    let mut remotes: Vec<String> = output
        .lines()
        .map(str::trim)
        .filter(|b| !b.is_empty() && !b.ends_with("/HEAD") && b.contains('/'))
        .map(String::from)
        .collect();
    remotes.sort();
    remotes.dedup();
    remotes
}

/// Reconcile local branches (with upstreams) against remote refs.
pub fn reconcile(current: &str, locals_output: &str, remotes_output: &str) -> Vec<BranchInfo> {
    let locals = parse_local_branches(locals_output);
    let remotes = parse_remote_branches(remotes_output);
    let remote_set: HashSet<&str> = remotes.iter().map(String::as_str).collect();

    let mut claimed: HashSet<String> = HashSet::new();
    let mut branches = Vec::with_capacity(locals.len() + remotes.len());

    for (local, upstream) in &locals {
        let (is_remote, remote_name) = if !upstream.is_empty() {
            claimed.insert(upstream.clone());
            (remote_set.contains(upstream.as_str()), upstream.clone())
        } else {
            let inferred = format!("origin/{}", local);
            if remote_set.contains(inferred.as_str()) {
                claimed.insert(inferred.clone());
                (true, inferred)
            } else {
                (false, String::new())
            }
        };

        branches.push(BranchInfo {
            name: local.clone(),
            is_local: true,
            is_remote,
            is_current: local == current,
            remote_name,
        });
    }

    for remote in &remotes {
        if claimed.contains(remote) {
            continue;
        }
        let name = remote
            .split_once('/')
            .map(|(_, rest)| rest)
            .unwrap_or(remote.as_str());
        branches.push(BranchInfo {
            name: name.to_string(),
            is_local: false,
            is_remote: true,
            is_current: false,
            remote_name: remote.clone(),
        });
    }

    sort_branches(&mut branches);
    branches
}

/// Current first, then local+remote, local-only, remote-only; alphabetical within a tier.
pub fn sort_branches(branches: &mut [BranchInfo]) {
    branches.sort_by(|a, b| a.rank().cmp(&b.rank()).then_with(|| a.name.cmp(&b.name)));
}

fn op_result(output: super::command::CommandOutput) -> BranchOpResult {
    if output.success {
        Ok(())
    } else {
        Err(output.combined())
    }
}

pub async fn switch_branch(path: &str, branch: &str) -> BranchOpResult {
    op_result(GitCommand::git(path, ["checkout", branch]).run().await)
}

pub async fn delete_branch(path: &str, branch: &str, force: bool) -> BranchOpResult {
    let flag = if force { "-D" } else { "-d" };
    op_result(GitCommand::git(path, ["branch", flag, branch]).run().await)
}

/// Create a local branch tracking `remote_name`.
pub async fn create_tracking_branch(path: &str, local: &str, remote_name: &str) -> BranchOpResult {
    op_result(
        GitCommand::git(path, ["branch", "--track", local, remote_name])
            .run()
            .await,
    )
}

pub async fn stash_changes(path: &str) -> BranchOpResult {
    op_result(
        GitCommand::git(
            path,
            ["stash", "push", "-m", "githerd: auto-stash before branch switch"],
        )
        .run()
        .await,
    )
}

/// Unstage everything, then throw away unstaged edits to tracked files.
pub async fn discard_changes(path: &str) -> BranchOpResult {
    let _ = GitCommand::git(path, ["reset", "HEAD"]).run().await;
    op_result(GitCommand::git(path, ["checkout", "--", "."]).run().await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find<'a>(branches: &'a [BranchInfo], name: &str) -> &'a BranchInfo {
        branches.iter().find(|b| b.name == name).unwrap()
    }

    #[test]
    fn test_upstream_tracked_branch() {
        let branches = reconcile(
            "main",
            "main origin/main\n",
            "origin/HEAD\norigin/main\n",
        );
        assert_eq!(branches.len(), 1);
        let main = &branches[0];
        assert!(main.is_local && main.is_remote && main.is_current);
        assert_eq!(main.remote_name, "origin/main");
    }

    #[test]
    fn test_inferred_origin_tracking() {
        let branches = reconcile("main", "main origin/main\nfeature\n", "origin/main\norigin/feature");
        let feature = find(&branches, "feature");
        assert!(feature.is_local);
        assert!(feature.is_remote);
        assert_eq!(feature.remote_name, "origin/feature");
        assert_eq!(branches.len(), 2);
    }

    #[test]
    fn test_upstream_gone_from_remote() {
        let branches = reconcile("main", "main origin/main\nold origin/old\n", "origin/main");
        let old = find(&branches, "old");
        assert!(old.is_local);
        assert!(!old.is_remote);
        assert_eq!(old.remote_name, "origin/old");
        // a claimed-but-missing upstream must not be resurrected as remote-only
        assert_eq!(branches.iter().filter(|b| b.name == "old").count(), 1);
    }

    #[test]
    fn test_remote_only_strips_prefix() {
        let branches = reconcile("main", "main origin/main", "origin/main\norigin/release/2.0\nupstream/docs");
        let release = find(&branches, "release/2.0");
        assert!(!release.is_local && release.is_remote);
        assert_eq!(release.remote_name, "origin/release/2.0");
        let docs = find(&branches, "docs");
        assert_eq!(docs.remote_name, "upstream/docs");
    }

    #[test]
    fn test_head_pointer_excluded() {
        let branches = reconcile("", "", "origin/HEAD\norigin/main");
        assert_eq!(branches.len(), 1);
        assert_eq!(branches[0].name, "main");
    }

    #[test]
    fn test_display_order() {
        let branches = reconcile(
            "work",
            "alpha origin/alpha\nwork\nzeta origin/zeta\nlocal-b\nlocal-a\n",
            "origin/alpha\norigin/zeta\norigin/remote-z\norigin/remote-a",
        );
        let names: Vec<&str> = branches.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["work", "alpha", "zeta", "local-a", "local-b", "remote-a", "remote-z"]
        );
    }

    #[test]
    fn test_invariants_hold() {
        let branches = reconcile(
            "dev",
            "dev origin/dev\nmain origin/main\nscratch\n",
            "origin/HEAD\norigin/dev\norigin/main\norigin/gh-pages\n",
        );
        assert!(branches.iter().all(|b| b.is_local || b.is_remote));
        assert!(branches.iter().filter(|b| b.is_current).all(|b| b.is_local));
        assert_eq!(branches.iter().filter(|b| b.is_current).count(), 1);
    }

    #[test]
    fn test_detached_head_has_no_current() {
        let branches = reconcile("HEAD", "main origin/main", "origin/main");
        assert_eq!(branches.iter().filter(|b| b.is_current).count(), 0);
    }

    #[test]
    fn test_failed_queries_yield_empty() {
        assert!(reconcile("", "", "").is_empty());
    }
}
