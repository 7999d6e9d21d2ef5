pub mod api;
pub mod error;
pub mod event;
pub mod manager;
pub mod ui;
pub mod vim;
pub mod wizard;
