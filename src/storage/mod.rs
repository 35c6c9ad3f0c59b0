pub mod workspace;

pub use workspace::{Group, WorkspaceData, WorkspaceStorage, FAVORITES_GROUP};
