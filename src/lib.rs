//! Core library surface for the Contact Book Manager TUI application.
//!
//! The public modules exposed here provide an intentionally small API so the
//! `bin` target as well as potential external tooling can reuse the same
//! pieces.
pub mod db;
pub mod models;
pub mod ui;

/// Convenience re-exports for the persistence layer. These functions are
/// typically used by `main.rs` to initialize the embedded SQLite store and
/// preload data.
pub use db::{fetch_contacts, fetch_relations, open_store};

/// The row-shaped domain type and the form payload other layers manipulate.
pub use models::{Contact, ContactDraft};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
