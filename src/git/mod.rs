pub mod branches;
pub mod command;
pub mod detail;
pub mod pull;
pub mod remote;
pub mod scan;
pub mod status;

pub use branches::{BranchInfo, BranchListing, BranchOpResult};
pub use command::{CommandOutput, GitCommand};
pub use pull::{CommitInfo, FileChange, PullOutcome, PullResultInfo};
pub use scan::{scan_repos, DiscoveredRepo};
pub use status::{RepoStatus, StatusReport, UNKNOWN_BRANCH};
