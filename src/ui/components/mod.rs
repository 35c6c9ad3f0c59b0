pub mod detail_view;
pub mod modal;
pub mod output_view;
pub mod pull_results;
pub mod repo_list;
pub mod settings_modal;
pub mod status_bar;
pub mod toast;

pub use detail_view::DetailViewWidget;
pub use modal::{render_menu_modal, ConfirmModal, InputModal};
pub use output_view::{Anchor, OutputViewWidget};
pub use pull_results::PullResultsWidget;
pub use repo_list::RepoListWidget;
pub use settings_modal::SettingsModal;
pub use status_bar::{InputBarWidget, StatusBarWidget};
pub use toast::ToastWidget;
