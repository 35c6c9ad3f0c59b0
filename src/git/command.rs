use std::path::{Path, PathBuf};

use tokio::process::Command;

/// Captured result of one external invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

impl CommandOutput {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: message.into(),
            success: false,
        }
    }

    /// Trimmed stdout, only when the command succeeded.
    pub fn ok_stdout(&self) -> Option<&str> {
        if self.success {
            Some(self.stdout.trim())
        } else {
            None
        }
    }

    /// stdout followed by stderr, trimmed. This is what a terminal would show.
    pub fn combined(&self) -> String {
        let mut out = self.stdout.trim_end().to_string();
        let err = self.stderr.trim_end();
        if !err.is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(err);
        }
        out.trim().to_string()
    }
}

/// An external program invocation: program, arguments and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCommand {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
}

impl GitCommand {
    /// `git -C <repo> <args...>`
    pub fn git<I, S>(repo: impl AsRef<Path>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut all = vec!["-C".to_string(), repo.as_ref().to_string_lossy().to_string()];
        all.extend(args.into_iter().map(Into::into));
        Self {
            program: "git".to_string(),
            args: all,
            cwd: None,
        }
    }

    pub fn program<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
        }
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn display(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }

    /// Run to completion. Spawn failures are reported in the output, never returned as errors.
    pub async fn run(&self) -> CommandOutput {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).kill_on_drop(true);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        // Never block on a credential prompt; there is no terminal to answer it.
        cmd.env("GIT_TERMINAL_PROMPT", "0");

        match cmd.output().await {
            Ok(output) => {
                let result = CommandOutput {
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                    success: output.status.success(),
                };
                if !result.success {
                    tracing::debug!(
                        "command failed: {} ({})",
                        self.display(),
                        result.stderr.trim()
                    );
                }
                result
            }
            Err(e) => {
                tracing::warn!("failed to spawn {}: {}", self.display(), e);
                CommandOutput::failed(format!("failed to run {}: {}", self.program, e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_prefixes_repo_path() {
        let cmd = GitCommand::git("/tmp/repo", ["status", "--porcelain"]);
        assert_eq!(cmd.display(), "git -C /tmp/repo status --porcelain");
    }

    #[test]
    fn test_combined_joins_streams() {
        let out = CommandOutput {
            stdout: "Updating abc..def\n".to_string(),
            stderr: "From origin\n".to_string(),
            success: true,
        };
        assert_eq!(out.combined(), "Updating abc..def\nFrom origin");
    }

    #[test]
    fn test_ok_stdout_hidden_on_failure() {
        let out = CommandOutput {
            stdout: "3\n".to_string(),
            stderr: String::new(),
            success: false,
        };
        assert_eq!(out.ok_stdout(), None);
    }

    #[tokio::test]
    async fn test_missing_program_reports_failure() {
        let out = GitCommand::program("githerd-no-such-program", ["--version"])
            .run()
            .await;
        assert!(!out.success);
        assert!(out.stderr.contains("githerd-no-such-program"));
    }
}
