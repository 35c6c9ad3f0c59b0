use super::command::GitCommand;

const LOG_FORMAT: &str = "--pretty=format:%h %s (%cr)";

/// Human-readable overview of one repository for the detail view.
pub async fn load_detail(path: &str) -> String {
    let status = git_text(path, &["status", "--short", "--branch"]).await;
    let unstaged = git_text(path, &["diff", "--stat"]).await;
    let staged = git_text(path, &["diff", "--cached", "--stat"]).await;
    let recent = git_text(path, &["log", "-10", LOG_FORMAT]).await;
    let incoming = git_text(path, &["log", "-10", LOG_FORMAT, "HEAD..@{u}"]).await;

    compose_detail(&status, &unstaged, &staged, &recent, &incoming)
}

async fn git_text(path: &str, args: &[&str]) -> String {
    let out = GitCommand::git(path, args.iter().copied()).run().await;
    if out.success {
        out.stdout
    } else {
        String::new()
    }
}

/// Status always appears; every other section only when it has content.
pub fn compose_detail(
    status: &str,
    unstaged: &str,
    staged: &str,
    recent: &str,
    incoming: &str,
) -> String {
    let mut text = String::from("--- Status ---\n");
    text.push_str(status.trim_end());
    text.push('\n');

    for (title, body) in [
        ("Unstaged Changes", unstaged),
        ("Staged Changes", staged),
        ("Recent Commits", recent),
        ("Incoming from Remote", incoming),
    ] {
        let body = body.trim_end();
        if body.is_empty() {
            continue;
        }
        text.push_str(&format!("\n--- {} ---\n", title));
        text.push_str(body);
        text.push('\n');
    }
    text
}
