use serde::{Deserialize, Serialize};

use super::command::GitCommand;

/// Shown in place of a branch name when HEAD is detached or unreadable.
pub const UNKNOWN_BRANCH: &str = "?";

/// Lifecycle status of a repository's working tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RepoStatus {
    #[default]
    Unknown,
    Clean,
    /// Clean locally but behind its upstream
    CleanBehind,
    Dirty,
    Error,
}

/// Result of one status refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub path: String,
    pub branch: String,
    pub status: RepoStatus,
    pub text: String,
    pub behind_count: u32,
}

/// Refresh branch, behind count and working tree state for one repository.
///
/// Each query is best-effort: a failed behind count still reports the working
/// tree state, and a failed status query still reports the branch and behind count.
pub async fn refresh_status(path: &str) -> StatusReport {
    let branch_out = GitCommand::git(path, ["rev-parse", "--abbrev-ref", "HEAD"])
        .run()
        .await;
    let branch = normalize_branch(branch_out.ok_stdout());

    // Stale remote data is preferable to failing the refresh.
    let _ = GitCommand::git(path, ["fetch", "--quiet"]).run().await;

    let behind_out = GitCommand::git(path, ["rev-list", "--count", "HEAD..@{u}"])
        .run()
        .await;
    let behind_count = parse_behind_count(behind_out.ok_stdout());

    let porcelain = GitCommand::git(path, ["status", "--porcelain"]).run().await;
    let (status, text) = classify(porcelain.ok_stdout(), behind_count);

    tracing::debug!("status {}: {:?} {} behind={}", path, status, text, behind_count);

    StatusReport {
        path: path.to_string(),
        branch,
        status,
        text,
        behind_count,
    }
}

pub fn normalize_branch(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(name) if !name.is_empty() && name != "HEAD" => name.to_string(),
        _ => UNKNOWN_BRANCH.to_string(),
    }
}

pub fn parse_behind_count(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(0)
}

/// Classify `git status --porcelain` output. `None` means the query itself failed.
pub fn classify(porcelain: Option<&str>, behind_count: u32) -> (RepoStatus, String) {
    let Some(output) = porcelain else {
        return (RepoStatus::Error, "failed to get status".to_string());
    };

    let changed = output.lines().filter(|l| !l.trim().is_empty()).count();
    if changed > 0 {
        (RepoStatus::Dirty, format!("{} changed", changed))
    } else if behind_count > 0 {
        (RepoStatus::CleanBehind, String::new())
    } else {
        (RepoStatus::Clean, String::new())
    }
}

/// True when `git status --porcelain` reports anything.
pub async fn has_uncommitted_changes(path: &str) -> bool {
    GitCommand::git(path, ["status", "--porcelain"])
        .run()
        .await
        .ok_stdout()
        .is_some_and(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean() {
        assert_eq!(classify(Some(""), 0), (RepoStatus::Clean, String::new()));
    }

    #[test]
    fn test_clean_behind() {
        assert_eq!(
            classify(Some(""), 4),
            (RepoStatus::CleanBehind, String::new())
        );
    }

    #[test]
    fn test_dirty_counts_paths() {
        let out = " M src/main.rs\n?? notes.txt\nA  lib.rs";
        assert_eq!(
            classify(Some(out), 2),
            (RepoStatus::Dirty, "3 changed".to_string())
        );
    }

    #[test]
    fn test_failed_query_is_error_not_clean() {
        let (status, text) = classify(None, 0);
        assert_eq!(status, RepoStatus::Error);
        assert_eq!(text, "failed to get status");
    }

    #[test]
    fn test_behind_count_defaults_to_zero() {
        assert_eq!(parse_behind_count(None), 0);
        assert_eq!(parse_behind_count(Some("garbage")), 0);
        assert_eq!(parse_behind_count(Some("7\n")), 7);
    }

    #[test]
    fn test_branch_sentinel() {
        assert_eq!(normalize_branch(None), UNKNOWN_BRANCH);
        assert_eq!(normalize_branch(Some("  ")), UNKNOWN_BRANCH);
        assert_eq!(normalize_branch(Some("HEAD")), UNKNOWN_BRANCH);
        assert_eq!(normalize_branch(Some("main\n")), "main");
    }

    mod with_git {
        use super::super::*;
        use std::path::Path;
        use std::process::Command;

        fn git_available() -> bool {
            Command::new("git")
                .arg("--version")
                .output()
                .map(|o| o.status.success())
                .unwrap_or(false)
        }

        fn git(dir: &Path, args: &[&str]) {
            let out = Command::new("git")
                .args([
                    "-c",
                    "user.name=Test",
                    "-c",
                    "user.email=test@example.com",
                    "-c",
                    "init.defaultBranch=main",
                    "-c",
                    "commit.gpgsign=false",
                ])
                .args(args)
                .current_dir(dir)
                .output()
                .unwrap();
            assert!(
                out.status.success(),
                "git {:?} failed: {}",
                args,
                String::from_utf8_lossy(&out.stderr)
            );
        }

        fn push_commit(dir: &Path, name: &str, message: &str) {
            std::fs::write(dir.join(name), message).unwrap();
            git(dir, &["add", "-A"]);
            git(dir, &["commit", "-m", message]);
            git(dir, &["push", "origin", "HEAD:main"]);
        }

        #[tokio::test]
        async fn test_broken_status_keeps_behind_count() {
            if !git_available() {
                return;
            }
            let tmp = tempfile::tempdir().unwrap();
            let root = tmp.path();
            git(root, &["init", "--bare", "remote.git"]);
            git(root, &["clone", "remote.git", "upstream"]);
            let upstream = root.join("upstream");
            push_commit(&upstream, "a.txt", "initial");

            git(root, &["clone", "remote.git", "local"]);
            push_commit(&upstream, "b.txt", "second");
            push_commit(&upstream, "c.txt", "third");

            let local = root.join("local");
            std::fs::write(local.join(".git").join("index"), "not an index").unwrap();

            let report = refresh_status(&local.to_string_lossy()).await;
            assert_eq!(report.status, RepoStatus::Error);
            assert_eq!(report.behind_count, 2);
            assert_eq!(report.branch, "main");
        }

        #[tokio::test]
        async fn test_clean_clone_behind_upstream() {
            if !git_available() {
                return;
            }
            let tmp = tempfile::tempdir().unwrap();
            let root = tmp.path();
            git(root, &["init", "--bare", "remote.git"]);
            git(root, &["clone", "remote.git", "upstream"]);
            let upstream = root.join("upstream");
            push_commit(&upstream, "a.txt", "initial");

            git(root, &["clone", "remote.git", "local"]);
            push_commit(&upstream, "b.txt", "second");

            let report = refresh_status(&root.join("local").to_string_lossy()).await;
            assert_eq!(report.status, RepoStatus::CleanBehind);
            assert_eq!(report.behind_count, 1);
        }
    }
}
