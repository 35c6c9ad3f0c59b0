pub mod app;
pub mod git;
pub mod storage;
pub mod ui;
