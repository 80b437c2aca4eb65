use std::collections::HashSet;

use anyhow::{Context, Result};
use rand::Rng;
use rusqlite::Connection;
use thiserror::Error;

/// Upper bound (exclusive) of the contact id space. Ids are sampled uniformly
/// from `0..ID_SPACE`, which caps the book at 1000 contacts.
pub const ID_SPACE: i64 = 1000;

/// Allocation failures the UI distinguishes from plain query errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdError {
    /// Every id in `0..ID_SPACE` is already persisted. Rejection sampling
    /// would loop forever, so we refuse up front.
    #[error("no free contact ids left (the book holds at most {ID_SPACE} contacts)")]
    SpaceExhausted,
}

/// Pick an unused contact id by rejection sampling: draw uniformly from the id
/// space until the candidate collides with nothing currently persisted. The
/// collision check reads the ids straight from storage rather than trusting
/// whatever happens to be loaded in memory, so a stale in-memory list can
/// never hand out a duplicate.
pub fn allocate_contact_id(conn: &Connection) -> Result<i64> {
    let used = fetch_used_ids(conn)?;
    if used.len() as i64 >= ID_SPACE {
        return Err(IdError::SpaceExhausted.into());
    }

    let mut rng = rand::thread_rng();
    loop {
        let candidate = rng.gen_range(0..ID_SPACE);
        if !used.contains(&candidate) {
            return Ok(candidate);
        }
    }
}

/// Read the set of ids currently present in the table.
fn fetch_used_ids(conn: &Connection) -> Result<HashSet<i64>> {
    let mut stmt = conn
        .prepare("SELECT id FROM contacts")
        .context("failed to prepare id query")?;

    let mut rows = stmt.query([]).context("failed to execute id query")?;

    let mut used = HashSet::new();
    while let Some(row) = rows.next().context("failed to fetch id row")? {
        let id: i64 = row.get(0).context("failed to read id value")?;
        used.insert(id);
    }

    Ok(used)
}
