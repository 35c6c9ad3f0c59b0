use std::sync::OnceLock;

use regex::Regex;

use super::command::GitCommand;

/// Field separator for `git log --format` output.
const FIELD_SEP: char = '\u{1f}';

/// Width hint for `--stat` so long paths are not abbreviated.
const STAT_WIDTH: &str = "--stat=400,300";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub hash: String,
    pub message: String,
    pub author: String,
    /// Relative age, e.g. "2 hours ago"
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: String,
    pub additions: usize,
    pub deletions: usize,
}

/// New commits a pull brought into one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullResultInfo {
    pub repo_path: String,
    pub repo_name: String,
    /// Newest first
    pub commits: Vec<CommitInfo>,
    pub files_changed: usize,
    pub updated: bool,
}

/// Completion of a single pull.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullOutcome {
    pub success: bool,
    /// Full tool output, shown verbatim on failure
    pub output: String,
    /// Label for the repository list
    pub short: String,
    pub summary: Option<PullResultInfo>,
}

pub async fn head_commit(path: &str) -> Option<String> {
    GitCommand::git(path, ["rev-parse", "HEAD"])
        .run()
        .await
        .ok_stdout()
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// `git pull --ff-only`, then summarize what arrived relative to `pre_pull_head`.
pub async fn pull_and_summarize(
    path: &str,
    repo_name: &str,
    pre_pull_head: Option<&str>,
    max_commits: Option<usize>,
) -> PullOutcome {
    let out = GitCommand::git(path, ["pull", "--ff-only"]).run().await;
    let output = out.combined();
    let short = short_label(&output, out.success);

    let summary = match pre_pull_head {
        Some(old) if out.success && !is_up_to_date(&output) => {
            summarize(path, repo_name, old, max_commits).await
        }
        _ => None,
    };

    tracing::info!(
        "pull {}: success={} label={:?} commits={}",
        path,
        out.success,
        short,
        summary.as_ref().map(|s| s.commits.len()).unwrap_or(0)
    );

    PullOutcome {
        success: out.success,
        output,
        short,
        summary,
    }
}

/// Compute the commit list and file total between `old_head` and the current HEAD.
pub async fn summarize(
    path: &str,
    repo_name: &str,
    old_head: &str,
    max_commits: Option<usize>,
) -> Option<PullResultInfo> {
    let new_head = head_commit(path).await?;
    if new_head == old_head {
        return None;
    }
    let commits = commits_between(path, old_head, &new_head, max_commits).await;
    let files_changed = files_changed_count(path, old_head, &new_head).await;
    build_pull_result(path, repo_name, old_head, &new_head, commits, files_changed)
}

/// A pull is reportable only when HEAD moved and at least one commit is in range.
pub fn build_pull_result(
    path: &str,
    repo_name: &str,
    old_head: &str,
    new_head: &str,
    commits: Vec<CommitInfo>,
    files_changed: usize,
) -> Option<PullResultInfo> {
    if old_head == new_head || commits.is_empty() {
        return None;
    }
    Some(PullResultInfo {
        repo_path: path.to_string(),
        repo_name: repo_name.to_string(),
        commits,
        files_changed,
        updated: true,
    })
}

pub async fn commits_between(
    path: &str,
    old: &str,
    new: &str,
    max_commits: Option<usize>,
) -> Vec<CommitInfo> {
    let mut args = vec![
        "log".to_string(),
        format!("--format=%h{0}%s{0}%an{0}%cr", FIELD_SEP),
    ];
    if let Some(max) = max_commits {
        args.push(format!("--max-count={}", max));
    }
    args.push(format!("{}..{}", old, new));

    GitCommand::git(path, args)
        .run()
        .await
        .ok_stdout()
        .map(parse_log_output)
        .unwrap_or_default()
}

/// Sum of per-commit changed-file counts over `old..new`.
pub async fn files_changed_count(path: &str, old: &str, new: &str) -> usize {
    let range = format!("{}..{}", old, new);
    GitCommand::git(path, ["log", "--numstat", "--format=", range.as_str()])
        .run()
        .await
        .ok_stdout()
        .map(count_numstat_lines)
        .unwrap_or(0)
}

/// Per-file changes of one commit.
pub async fn commit_files(path: &str, hash: &str) -> Vec<FileChange> {
    GitCommand::git(path, ["show", STAT_WIDTH, "--format=", hash])
        .run()
        .await
        .ok_stdout()
        .map(parse_stat_output)
        .unwrap_or_default()
}

pub fn parse_log_output(output: &str) -> Vec<CommitInfo> {
    output
        .lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|line| {
            let mut fields = line.split(FIELD_SEP);
            let hash = fields.next()?.trim();
            if hash.is_empty() {
                return None;
            }
            Some(CommitInfo {
                hash: hash.to_string(),
                message: fields.next().unwrap_or_default().to_string(),
                author: fields.next().unwrap_or_default().to_string(),
                time: fields.next().unwrap_or_default().to_string(),
            })
        })
        .collect()
}

pub fn count_numstat_lines(output: &str) -> usize {
    output.lines().filter(|l| !l.trim().is_empty()).count()
}

fn stat_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(.+?)\s*\|\s*(\d+)?\s*(\+*)(-*)").expect("stat line pattern is valid")
    })
}

/// Parse `git show --stat` / `git diff --stat` output into per-file changes.
pub fn parse_stat_output(output: &str) -> Vec<FileChange> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| !line.contains("files changed") && !line.contains("file changed"))
        .filter_map(|line| {
            let caps = stat_line_regex().captures(line)?;
            let path = caps.get(1)?.as_str().trim().to_string();
            let count = caps.get(2).and_then(|m| m.as_str().parse::<usize>().ok());
            let plus = caps.get(3).map_or(0, |m| m.as_str().len());
            let minus = caps.get(4).map_or(0, |m| m.as_str().len());
            let (additions, deletions) = apportion(count, plus, minus);
            Some(FileChange {
                path,
                additions,
                deletions,
            })
        })
        .collect()
}

/// Split a stat line's change count into additions and deletions.
///
/// The `+`/`-` bar is scaled to the terminal width, so the count is split in the
/// bar's proportion (additions rounded down). A count with no bar is split
/// evenly with the odd line going to deletions; that split is a display
/// heuristic, not a real measurement.
pub fn apportion(count: Option<usize>, plus: usize, minus: usize) -> (usize, usize) {
    match count {
        Some(count) if plus + minus > 0 => {
            let additions = count * plus / (plus + minus);
            (additions, count - additions)
        }
        Some(count) => {
            let additions = count / 2;
            (additions, count - additions)
        }
        None => (plus, minus),
    }
}

pub fn is_up_to_date(output: &str) -> bool {
    output.contains("Already up to date") || output.contains("Already up-to-date")
}

/// Label shown next to a repository after a pull.
pub fn short_label(output: &str, success: bool) -> String {
    if !success {
        return "error".to_string();
    }
    if is_up_to_date(output) {
        "up to date".to_string()
    } else if output.contains("Fast-forward") {
        "updated".to_string()
    } else if output.chars().count() > 30 {
        format!("{}...", output.chars().take(30).collect::<String>())
    } else {
        output.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(hash: &str) -> CommitInfo {
        CommitInfo {
            hash: hash.to_string(),
            message: "msg".to_string(),
            author: "dev".to_string(),
            time: "1 hour ago".to_string(),
        }
    }

    #[test]
    fn test_stat_line_with_marks_floor_split() {
        let files = parse_stat_output(" src/app.go | 12 +++++-----");
        assert_eq!(
            files,
            vec![FileChange {
                path: "src/app.go".to_string(),
                additions: 6,
                deletions: 6,
            }]
        );
    }

    #[test]
    fn test_stat_line_scaled_bar() {
        let files = parse_stat_output(" big.rs | 100 ++++++++--");
        assert_eq!(files[0].additions, 80);
        assert_eq!(files[0].deletions, 20);
    }

    #[test]
    fn test_stat_count_without_marks_remainder_to_deletions() {
        assert_eq!(apportion(Some(7), 0, 0), (3, 4));
        assert_eq!(apportion(Some(0), 0, 0), (0, 0));
    }

    #[test]
    fn test_stat_binary_and_summary_lines() {
        let output = " assets/logo.png | Bin 0 -> 1234 bytes\n README.md | 3 +++\n 2 files changed, 3 insertions(+)\n";
        let files = parse_stat_output(output);
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, "assets/logo.png");
        assert_eq!((files[0].additions, files[0].deletions), (0, 0));
        assert_eq!((files[1].additions, files[1].deletions), (3, 0));
    }

    #[test]
    fn test_single_file_summary_skipped() {
        let files = parse_stat_output(" a.txt | 1 -\n 1 file changed, 1 deletion(-)");
        assert_eq!(files.len(), 1);
        assert_eq!((files[0].additions, files[0].deletions), (0, 1));
    }

    #[test]
    fn test_parse_log_output() {
        let sep = FIELD_SEP;
        let output = format!(
            "abc1234{sep}Fix parser{sep}Ada{sep}2 hours ago\ndef5678{sep}Add tests{sep}Linus{sep}3 days ago\n"
        );
        let commits = parse_log_output(&output);
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].hash, "abc1234");
        assert_eq!(commits[0].message, "Fix parser");
        assert_eq!(commits[1].author, "Linus");
        assert_eq!(commits[1].time, "3 days ago");
    }

    #[test]
    fn test_identical_heads_produce_no_result() {
        let result = build_pull_result("/r", "r", "abc", "abc", vec![commit("abc")], 3);
        assert!(result.is_none());
    }

    #[test]
    fn test_empty_range_produces_no_result() {
        assert!(build_pull_result("/r", "r", "abc", "def", Vec::new(), 0).is_none());
    }

    #[test]
    fn test_moved_head_produces_result() {
        let result = build_pull_result("/r", "r", "abc", "def", vec![commit("def")], 2).unwrap();
        assert!(result.updated);
        assert_eq!(result.files_changed, 2);
        assert_eq!(result.repo_name, "r");
    }

    #[test]
    fn test_short_labels() {
        assert_eq!(short_label("Already up to date.", true), "up to date");
        assert_eq!(
            short_label("Updating a..b\nFast-forward\n x | 1 +", true),
            "updated"
        );
        assert_eq!(short_label("fatal: no remote", false), "error");
        let long = "x".repeat(40);
        assert_eq!(short_label(&long, true), format!("{}...", "x".repeat(30)));
    }

    #[test]
    fn test_numstat_count() {
        assert_eq!(count_numstat_lines("1\t0\ta\n2\t2\tb\n\n3\t1\ta\n"), 3);
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

        fn commit_files(dir: &Path, files: &[(&str, &str)], message: &str) {
            for (name, content) in files {
                std::fs::write(dir.join(name), content).unwrap();
            }
            git(dir, &["add", "-A"]);
            git(dir, &["commit", "-m", message]);
            git(dir, &["push", "origin", "HEAD:main"]);
        }

        #[tokio::test]
        async fn test_pull_three_upstream_commits() {
            if !git_available() {
                return;
            }
            let tmp = tempfile::tempdir().unwrap();
            let root = tmp.path();
            git(root, &["init", "--bare", "remote.git"]);
            git(root, &["clone", "remote.git", "upstream"]);
            let upstream = root.join("upstream");
            commit_files(&upstream, &[("a.txt", "one\n")], "initial");

            git(root, &["clone", "remote.git", "local"]);
            let local = root.join("local");
            let local_path = local.to_string_lossy().to_string();

            commit_files(&upstream, &[("b.txt", "b\n")], "first");
            commit_files(&upstream, &[("c.txt", "c\n"), ("d.txt", "d\n")], "second");
            commit_files(&upstream, &[("a.txt", "one\ntwo\n")], "third");

            let before = head_commit(&local_path).await;
            assert!(before.is_some());

            let outcome = pull_and_summarize(&local_path, "local", before.as_deref(), None).await;
            assert!(outcome.success, "{}", outcome.output);
            assert_eq!(outcome.short, "updated");

            let summary = outcome.summary.expect("pull brought new commits");
            let messages: Vec<&str> = summary.commits.iter().map(|c| c.message.as_str()).collect();
            assert_eq!(messages, vec!["third", "second", "first"]);
            // 1 + 2 + 1 files across the three commits
            assert_eq!(summary.files_changed, 4);

            let files = super::super::commit_files(&local_path, &summary.commits[1].hash).await;
            let mut paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
            paths.sort();
            assert_eq!(paths, vec!["c.txt", "d.txt"]);

            // pulling again is a no-op and reports nothing
            let head = head_commit(&local_path).await;
            let again = pull_and_summarize(&local_path, "local", head.as_deref(), None).await;
            assert!(again.success);
            assert!(again.summary.is_none());
            assert_eq!(again.short, "up to date");
        }
    }
}
