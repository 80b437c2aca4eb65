//! Ratatui front-end split across logical submodules: the central `App` state
//! machine, form and confirm-dialog state, per-screen view state, and the
//! terminal lifecycle.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
