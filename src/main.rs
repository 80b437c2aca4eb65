//! Binary entry point that glues the SQLite-backed contact store to the TUI:
//! bring up the database, hydrate the initial app state, and drive the Ratatui
//! event loop until the user exits.
use contact_book_manager::{fetch_contacts, fetch_relations, open_store, run_app, App};

/// Initialize persistence, load cached data, and launch the Ratatui event loop.
///
/// Returning a `Result` bubbles up fatal initialization problems (for example
/// the user removing the writable data directory) to the terminal instead of
/// crashing silently.
fn main() -> anyhow::Result<()> {
    // Logger first, while stdout/stderr still behave normally; silent unless
    // RUST_LOG is set.
    env_logger::init();

    let conn = open_store()?;
    let contacts = fetch_contacts(&conn)?;
    let relations = fetch_relations(&conn)?;

    let mut app = App::new(conn, contacts, relations);
    run_app(&mut app)
}
