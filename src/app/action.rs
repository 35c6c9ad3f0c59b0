use crate::git::{
    BranchListing, BranchOpResult, CommandOutput, DiscoveredRepo, FileChange, PullOutcome,
    StatusReport,
};

/// Everything the reducer reacts to: user intents mapped from keys, and the
/// single completion event each task sends back.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SelectNext,
    SelectPrevious,
    SelectFirst,
    SelectLast,
    Submit,
    Cancel,
    InputChar(char),
    InputBackspace,
    FocusNextPane,
    FocusPrevPane,
    ScrollUp,
    ScrollDown,
    Quit,

    // Repository list
    Activate,
    ToggleFavorite,
    ToggleDirtyFilter,
    ToggleBehindFilter,
    ClearFilters,
    StartTextFilter,

    // Engine entry points
    Rescan,
    Refresh,
    RefreshAll,
    RefreshRepo {
        path: String,
    },
    PullSelected,
    PullBatch,
    PullBehind,
    PullPaths {
        paths: Vec<String>,
    },

    // Screens
    OpenDetail,
    ReloadDetail,
    OpenConfig,
    OpenSettings,
    OpenInBrowser,

    // Groups
    NewGroup,
    RenameGroup,
    RemoveSelected,
    AddReposToGroup,
    MoveToGroup,

    // Detail branch pane
    SwitchBranch,
    DeleteBranch {
        force: bool,
    },
    CreateTrackingBranch,

    // Pull results
    ResultsDescend,
    ResultsAscend,
    ResultsToggleAll,

    // Task completions
    ReposScanned {
        root: String,
        result: Result<Vec<DiscoveredRepo>, String>,
    },
    StatusUpdated(StatusReport),
    HeadCaptured {
        path: String,
        head: Option<String>,
    },
    PullCompleted {
        path: String,
        outcome: PullOutcome,
    },
    BranchesLoaded {
        path: String,
        listing: BranchListing,
    },
    BranchCreated {
        path: String,
        branch: String,
        result: BranchOpResult,
    },
    BranchDeleted {
        path: String,
        branch: String,
        result: BranchOpResult,
    },
    BranchSwitched {
        path: String,
        branch: String,
        result: BranchOpResult,
    },
    ChangesProbed {
        path: String,
        branch: String,
        dirty: bool,
    },
    StashCompleted {
        path: String,
        result: BranchOpResult,
    },
    DetailLoaded {
        path: String,
        content: String,
    },
    CommandOutput {
        path: String,
        command: String,
        output: CommandOutput,
    },
    CommitFilesLoaded {
        path: String,
        hash: String,
        files: Vec<FileChange>,
    },
    BrowserOpened {
        result: Result<String, String>,
    },
    Persisted {
        what: &'static str,
        result: Result<(), String>,
    },

    Tick,
}
