pub mod action;
pub mod batch;
pub mod config;
pub mod results;
pub mod state;
pub mod task;
mod update;

pub use action::Action;
pub use batch::BatchTracker;
pub use config::{Config, FetchMode, LogLevel as ConfigLogLevel, UiConfig};
pub use results::{PullResultsCursor, ResultTree, TreeLevel, TreeRow};
pub use state::{
    AppState, DetailPane, DetailState, GroupInputKind, GroupSummary, ListFilter, ListItem,
    LogEntry, LogLevel, Repo, Toast, ToastLevel, ViewMode,
};
pub use task::Task;
