pub mod app;
pub mod components;
pub mod helpers;

pub use app::AppWidget;
pub use helpers::{centered_rect, spinner, status_label, truncate};
