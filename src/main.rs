use std::io;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{
        DisableBracketedPaste, EnableBracketedPaste, Event, EventStream, KeyCode, KeyEvent,
        KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use githerd::app::{Action, AppState, Config, DetailPane, Task, ViewMode};
use githerd::storage::{WorkspaceData, WorkspaceStorage};
use githerd::ui::AppWidget;

const VERSION: &str = env!("BUILD_VERSION");

const ENV_HELP: &str = "Environment:
  GITHERD_GIT_DIR  Root directory when DIR is not given
  RUST_LOG         Log filter (default comes from log_level in config.toml)";

/// Track and pull every git repository directly under one directory.
#[derive(Parser, Debug)]
#[command(name = "githerd")]
#[command(version = VERSION)]
#[command(after_help = ENV_HELP)]
struct Cli {
    /// Root directory to scan (saved for next time)
    dir: Option<String>,
}

fn init_logging(config: &Config) {
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(format!(
                "githerd={}",
                config.log_level.directive()
            ))
        })
    };

    let log_file = Config::ensure_config_dir()
        .and_then(|_| Config::log_path())
        .ok()
        .and_then(|path| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
        });

    if let Some(file) = log_file {
        tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_ansi(false)
            .with_writer(std::sync::Arc::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_default();
    init_logging(&config);
    tracing::info!("=== githerd {} starting ===", VERSION);

    let git_dir = config.resolve_git_dir(cli.dir.as_deref());
    if cli.dir.is_some() && config.git_dir != git_dir {
        config.git_dir = git_dir.clone();
        if let Err(e) = config.save() {
            tracing::warn!("failed to save config: {:#}", e);
        }
    }

    let storage = WorkspaceStorage::new()?;
    let workspace = match storage.load() {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!("failed to load workspace, starting empty: {:#}", e);
            WorkspaceData::default()
        }
    };

    let tick_rate = Duration::from_millis(config.ui.tick_rate_ms.max(16));
    let mut state = AppState::new(config, workspace, git_dir.clone());
    state.log_info(format!("githerd started in {}", git_dir));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableBracketedPaste);
        default_hook(info);
    }));

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(tick_rate);

    let tasks = state.update(Action::Rescan);
    spawn_tasks(tasks, &action_tx);

    let result: Result<()> = loop {
        if let Err(e) = terminal.draw(|f| AppWidget::new(&state).with_version(VERSION).render(f)) {
            break Err(e.into());
        }

        let actions: Vec<Action> = tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    handle_key_event(key, &state).into_iter().collect()
                }
                Some(Ok(Event::Paste(text))) if accepts_text(&state) => {
                    text.chars()
                        .filter(|c| !c.is_control())
                        .map(Action::InputChar)
                        .collect()
                }
                Some(Ok(_)) => Vec::new(),
                Some(Err(e)) => {
                    tracing::warn!("terminal event error: {}", e);
                    Vec::new()
                }
                None => vec![Action::Quit],
            },
            Some(action) = action_rx.recv() => vec![action],
            _ = ticker.tick() => vec![Action::Tick],
        };

        for action in actions {
            if !matches!(action, Action::Tick) {
                tracing::trace!("action: {:?}", action);
            }
            let tasks = state.update(action);
            spawn_tasks(tasks, &action_tx);
        }

        if !state.running {
            break Ok(());
        }
    };

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    if let Err(e) = storage.save(&state.workspace) {
        tracing::error!("failed to save workspace on exit: {:#}", e);
    }
    tracing::info!("=== githerd exiting ===");

    result
}

/// Run every task in the background; each sends exactly one action back.
fn spawn_tasks(tasks: Vec<Task>, tx: &mpsc::UnboundedSender<Action>) {
    for task in tasks {
        let tx = tx.clone();
        tokio::spawn(async move {
            let action = task.run().await;
            let _ = tx.send(action);
        });
    }
}

/// True when the focused widget is a text field.
fn accepts_text(state: &AppState) -> bool {
    match state.mode {
        ViewMode::List => state.filter.editing,
        ViewMode::Config | ViewMode::GroupInput => true,
        ViewMode::Detail => state
            .detail
            .as_ref()
            .is_some_and(|d| d.pane == DetailPane::Command),
        _ => false,
    }
}

/// Convert key events to actions.
fn handle_key_event(key: KeyEvent, state: &AppState) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            KeyCode::Char('r') if state.mode == ViewMode::List && !state.filter.editing => {
                Some(Action::RefreshAll)
            }
            _ => None,
        };
    }

    if accepts_text(state) {
        return handle_text_key(key.code, state);
    }

    match state.mode {
        ViewMode::List => handle_list_key(key.code, state),
        ViewMode::Detail => handle_detail_key(key.code, state),
        ViewMode::PullResults => handle_results_key(key.code),
        ViewMode::Error => match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => Some(Action::Cancel),
            KeyCode::Up | KeyCode::Char('k') => Some(Action::ScrollUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::ScrollDown),
            _ => None,
        },
        ViewMode::GroupDelete => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(Action::Submit),
            KeyCode::Char('n') | KeyCode::Esc => Some(Action::Cancel),
            _ => None,
        },
        ViewMode::Settings
        | ViewMode::GroupSelect
        | ViewMode::GroupAddRepos
        | ViewMode::ActionSelect => handle_menu_key(key.code),
        ViewMode::Config | ViewMode::GroupInput => None,
    }
}

fn handle_text_key(code: KeyCode, state: &AppState) -> Option<Action> {
    match code {
        KeyCode::Esc => Some(Action::Cancel),
        KeyCode::Enter => Some(Action::Submit),
        KeyCode::Backspace => Some(Action::InputBackspace),
        KeyCode::Tab if state.mode == ViewMode::Detail => Some(Action::FocusNextPane),
        KeyCode::BackTab if state.mode == ViewMode::Detail => Some(Action::FocusPrevPane),
        KeyCode::Up if state.mode == ViewMode::List => Some(Action::SelectPrevious),
        KeyCode::Down if state.mode == ViewMode::List => Some(Action::SelectNext),
        KeyCode::Char(c) => Some(Action::InputChar(c)),
        _ => None,
    }
}

fn handle_list_key(code: KeyCode, state: &AppState) -> Option<Action> {
    let in_group = state.current_group.is_some();
    match code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Esc => Some(Action::Cancel),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::SelectPrevious),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::SelectNext),
        KeyCode::Home | KeyCode::Char('g') => Some(Action::SelectFirst),
        KeyCode::End | KeyCode::Char('G') => Some(Action::SelectLast),
        KeyCode::Enter => Some(Action::Activate),
        KeyCode::Char('p') => Some(Action::PullSelected),
        KeyCode::Char('P') => Some(Action::PullBatch),
        KeyCode::Char('A') => Some(Action::PullBehind),
        KeyCode::Char('r') => Some(Action::Refresh),
        KeyCode::Char('f') => Some(Action::ToggleFavorite),
        KeyCode::Char('1') => Some(Action::ToggleDirtyFilter),
        KeyCode::Char('2') => Some(Action::ToggleBehindFilter),
        KeyCode::Char('0') => Some(Action::ClearFilters),
        KeyCode::Char('/') => Some(Action::StartTextFilter),
        KeyCode::Char('d') => Some(Action::OpenDetail),
        KeyCode::Char('c') => Some(Action::OpenConfig),
        KeyCode::Char('S') => Some(Action::OpenSettings),
        KeyCode::Char('o') => Some(Action::OpenInBrowser),
        KeyCode::Char('n') => Some(Action::NewGroup),
        KeyCode::Char('e') => Some(Action::RenameGroup),
        KeyCode::Char('x') => Some(Action::RemoveSelected),
        KeyCode::Char('a') if in_group => Some(Action::AddReposToGroup),
        KeyCode::Char('m') => Some(Action::MoveToGroup),
        _ => None,
    }
}

fn handle_detail_key(code: KeyCode, state: &AppState) -> Option<Action> {
    let pane = state.detail.as_ref().map(|d| d.pane).unwrap_or_default();
    match code {
        KeyCode::Esc | KeyCode::Char('q') => Some(Action::Cancel),
        KeyCode::Tab => Some(Action::FocusNextPane),
        KeyCode::BackTab => Some(Action::FocusPrevPane),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::SelectPrevious),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::SelectNext),
        KeyCode::Home => Some(Action::SelectFirst),
        KeyCode::End => Some(Action::SelectLast),
        KeyCode::PageUp => Some(Action::ScrollUp),
        KeyCode::PageDown => Some(Action::ScrollDown),
        KeyCode::Char('r') => Some(Action::ReloadDetail),
        KeyCode::Enter => Some(Action::Submit),
        KeyCode::Char('x') if pane == DetailPane::Branches => {
            Some(Action::DeleteBranch { force: false })
        }
        KeyCode::Char('X') if pane == DetailPane::Branches => {
            Some(Action::DeleteBranch { force: true })
        }
        KeyCode::Char('p') if pane == DetailPane::Branches => Some(Action::CreateTrackingBranch),
        _ => None,
    }
}

fn handle_results_key(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Esc | KeyCode::Char('q') => Some(Action::Cancel),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::SelectPrevious),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::SelectNext),
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => Some(Action::ResultsDescend),
        KeyCode::Left | KeyCode::Char('h') => Some(Action::ResultsAscend),
        KeyCode::Char('a') => Some(Action::ResultsToggleAll),
        _ => None,
    }
}

fn handle_menu_key(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Esc | KeyCode::Char('q') => Some(Action::Cancel),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::SelectPrevious),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::SelectNext),
        KeyCode::Enter | KeyCode::Char(' ') => Some(Action::Submit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_argument_is_optional() {
        let cli = Cli::try_parse_from(["githerd"]).unwrap();
        assert_eq!(cli.dir, None);

        let cli = Cli::try_parse_from(["githerd", "~/work"]).unwrap();
        assert_eq!(cli.dir.as_deref(), Some("~/work"));
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!(Cli::try_parse_from(["githerd", "--bogus"]).is_err());
    }

    #[test]
    fn test_list_keys_map_to_pulls() {
        let state = AppState::new(Config::default(), WorkspaceData::default(), "/git".into());
        let key = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
        assert_eq!(handle_key_event(key('p'), &state), Some(Action::PullSelected));
        assert_eq!(handle_key_event(key('P'), &state), Some(Action::PullBatch));
        assert_eq!(handle_key_event(key('A'), &state), Some(Action::PullBehind));
    }

    #[test]
    fn test_filter_editing_captures_letters() {
        let mut state = AppState::new(Config::default(), WorkspaceData::default(), "/git".into());
        state.filter.editing = true;
        let key = KeyEvent::new(KeyCode::Char('p'), KeyModifiers::NONE);
        assert_eq!(handle_key_event(key, &state), Some(Action::InputChar('p')));
    }
}
