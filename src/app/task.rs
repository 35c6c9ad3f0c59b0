use std::path::Path;

use super::action::Action;
use super::config::Config;
use crate::git::{branches, detail, pull, remote, scan, status, CommandOutput, GitCommand};
use crate::storage::{WorkspaceData, WorkspaceStorage};

/// One unit of background work. Running it always yields exactly one [`Action`].
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    Scan {
        root: String,
    },
    Status {
        path: String,
    },
    CaptureHead {
        path: String,
    },
    Pull {
        path: String,
        name: String,
        pre_pull_head: Option<String>,
        max_commits: Option<usize>,
    },
    LoadBranches {
        path: String,
    },
    LoadDetail {
        path: String,
    },
    SwitchBranch {
        path: String,
        branch: String,
    },
    DeleteBranch {
        path: String,
        branch: String,
        force: bool,
    },
    CreateTrackingBranch {
        path: String,
        branch: String,
        remote: String,
    },
    ProbeChanges {
        path: String,
        branch: String,
    },
    Stash {
        path: String,
    },
    Discard {
        path: String,
    },
    RunCommand {
        path: String,
        command: String,
    },
    LoadCommitFiles {
        path: String,
        hash: String,
    },
    OpenBrowser {
        path: String,
    },
    SaveConfig(Config),
    SaveWorkspace(WorkspaceData),
}

impl Task {
    pub async fn run(self) -> Action {
        match self {
            Task::Scan { root } => {
                let result = scan::scan_repos(Path::new(&root)).map_err(|e| format!("{:#}", e));
                Action::ReposScanned { root, result }
            }
            Task::Status { path } => Action::StatusUpdated(status::refresh_status(&path).await),
            Task::CaptureHead { path } => {
                let head = pull::head_commit(&path).await;
                Action::HeadCaptured { path, head }
            }
            Task::Pull {
                path,
                name,
                pre_pull_head,
                max_commits,
            } => {
                let outcome =
                    pull::pull_and_summarize(&path, &name, pre_pull_head.as_deref(), max_commits)
                        .await;
                Action::PullCompleted { path, outcome }
            }
            Task::LoadBranches { path } => {
                let listing = branches::load_branches(&path).await;
                Action::BranchesLoaded { path, listing }
            }
            Task::LoadDetail { path } => {
                let content = detail::load_detail(&path).await;
                Action::DetailLoaded { path, content }
            }
            Task::SwitchBranch { path, branch } => {
                let result = branches::switch_branch(&path, &branch).await;
                Action::BranchSwitched {
                    path,
                    branch,
                    result,
                }
            }
            Task::DeleteBranch {
                path,
                branch,
                force,
            } => {
                let result = branches::delete_branch(&path, &branch, force).await;
                Action::BranchDeleted {
                    path,
                    branch,
                    result,
                }
            }
            Task::CreateTrackingBranch {
                path,
                branch,
                remote,
            } => {
                let result = branches::create_tracking_branch(&path, &branch, &remote).await;
                Action::BranchCreated {
                    path,
                    branch,
                    result,
                }
            }
            Task::ProbeChanges { path, branch } => {
                let dirty = status::has_uncommitted_changes(&path).await;
                Action::ChangesProbed {
                    path,
                    branch,
                    dirty,
                }
            }
            Task::Stash { path } => {
                let result = branches::stash_changes(&path).await;
                Action::StashCompleted { path, result }
            }
            Task::Discard { path } => {
                let result = branches::discard_changes(&path).await;
                Action::StashCompleted { path, result }
            }
            Task::RunCommand { path, command } => {
                let output = run_user_command(&path, &command).await;
                Action::CommandOutput {
                    path,
                    command,
                    output,
                }
            }
            Task::LoadCommitFiles { path, hash } => {
                let files = pull::commit_files(&path, &hash).await;
                Action::CommitFilesLoaded { path, hash, files }
            }
            Task::OpenBrowser { path } => {
                let result = remote::browser_url(&path).and_then(|url| {
                    open::that(&url)
                        .map(|_| url)
                        .map_err(|e| format!("Failed to open browser: {}", e))
                });
                Action::BrowserOpened { result }
            }
            Task::SaveConfig(config) => Action::Persisted {
                what: "config",
                result: config.save().map_err(|e| format!("{:#}", e)),
            },
            Task::SaveWorkspace(data) => Action::Persisted {
                what: "workspace",
                result: WorkspaceStorage::new()
                    .and_then(|storage| storage.save(&data))
                    .map_err(|e| format!("{:#}", e)),
            },
        }
    }
}

/// Run a whitespace-split command line inside a repository. No shell is involved.
pub async fn run_user_command(path: &str, command: &str) -> CommandOutput {
    let mut parts = command.split_whitespace();
    let Some(program) = parts.next() else {
        return CommandOutput::failed("empty command");
    };
    GitCommand::program(program, parts)
        .current_dir(path)
        .run()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_command_fails() {
        let out = run_user_command("/", "   ").await;
        assert!(!out.success);
        assert_eq!(out.stderr, "empty command");
    }

    #[tokio::test]
    async fn test_command_runs_in_repository_dir() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("marker.txt"), "").unwrap();
        let out = run_user_command(&tmp.path().to_string_lossy(), "ls").await;
        assert!(out.success);
        assert!(out.stdout.contains("marker.txt"));
    }

    #[tokio::test]
    async fn test_scan_of_missing_root_reports_error() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("nope").to_string_lossy().to_string();
        match (Task::Scan { root: root.clone() }).run().await {
            Action::ReposScanned { root: r, result } => {
                assert_eq!(r, root);
                assert!(result.is_err());
            }
            other => panic!("unexpected action: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failing_task_still_yields_one_action() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().to_string_lossy().to_string();
        let action = (Task::Status { path: path.clone() }).run().await;
        match action {
            Action::StatusUpdated(report) => {
                assert_eq!(report.path, path);
                assert_eq!(report.status, crate::git::RepoStatus::Error);
            }
            other => panic!("unexpected action: {:?}", other),
        }
    }
}
