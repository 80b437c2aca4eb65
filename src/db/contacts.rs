use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, Error as SqlError, ErrorCode};

use crate::models::{Contact, ContactDraft};

/// Retrieve every stored contact. The query deliberately has no `ORDER BY`:
/// rows come back in storage's natural order (insertion order for a table that
/// has only seen appends), and the in-memory list is allowed to diverge from
/// it between reloads.
pub fn fetch_contacts(conn: &Connection) -> Result<Vec<Contact>> {
    let mut stmt = conn
        .prepare("SELECT id, name, phone, email, address, relation FROM contacts")
        .context("failed to prepare contact query")?;

    let contacts = stmt
        .query_map([], |row| {
            Ok(Contact {
                id: row.get(0)?,
                name: row.get(1)?,
                phone: row.get(2)?,
                email: row.get(3)?,
                address: row.get(4)?,
                relation: row.get(5)?,
            })
        })
        .context("failed to load contacts")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect contacts")?;

    log::debug!("fetched {} contact rows", contacts.len());
    Ok(contacts)
}

/// Insert a fully-populated contact row under an already-allocated id,
/// returning the hydrated struct so the caller can push it straight into the
/// in-memory list without re-querying.
pub fn insert_contact(conn: &Connection, id: i64, draft: &ContactDraft) -> Result<Contact> {
    conn.execute(
        "INSERT INTO contacts (id, name, phone, email, address, relation)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            id,
            draft.name,
            draft.phone,
            draft.email,
            draft.address,
            draft.relation
        ],
    )
    .map_err(|err| map_unique_constraint(err, id))
    .context("failed to insert contact")?;

    log::debug!("inserted contact id {id}");
    Ok(draft.clone().into_contact(id))
}

/// Overwrite the free-text fields of an existing contact. We surface a custom
/// error when nothing was updated so the UI can show a friendly message
/// instead of silently continuing.
pub fn update_contact(conn: &Connection, id: i64, draft: &ContactDraft) -> Result<()> {
    let updated = conn
        .execute(
            "UPDATE contacts
             SET name = ?1, phone = ?2, email = ?3, address = ?4, relation = ?5
             WHERE id = ?6",
            params![
                draft.name,
                draft.phone,
                draft.email,
                draft.address,
                draft.relation,
                id
            ],
        )
        .context("failed to update contact")?;

    if updated == 0 {
        Err(anyhow!("Contact not found"))
    } else {
        Ok(())
    }
}

/// Remove the row with the given id. Deleting an id that is not present is a
/// no-op, reported through the returned flag rather than an error.
pub fn delete_contact(conn: &Connection, id: i64) -> Result<bool> {
    let deleted = conn
        .execute("DELETE FROM contacts WHERE id = ?1", params![id])
        .context("failed to delete contact")?;

    log::debug!("delete of contact id {id} removed {deleted} rows");
    Ok(deleted > 0)
}

/// Destroy the entire contacts table. The next schema-ensuring call recreates
/// it empty, so callers that keep going after a clean must run
/// [`ensure_schema`] before touching the table again.
///
/// [`ensure_schema`]: crate::db::ensure_schema
pub fn clear_contacts(conn: &Connection) -> Result<()> {
    conn.execute("DROP TABLE IF EXISTS contacts", [])
        .context("failed to drop contacts table")?;
    Ok(())
}

/// Retrieve distinct relation values for the form's autocomplete. The ordering
/// sorts by lowercase first but falls back to the original text to keep
/// accents and capitalization intact.
pub fn fetch_relations(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare(
            "SELECT DISTINCT relation FROM contacts
             WHERE relation IS NOT NULL AND relation <> ''
             ORDER BY LOWER(relation), relation",
        )
        .context("failed to prepare relation query")?;

    let mut rows = stmt.query([]).context("failed to execute relation query")?;

    let mut relations = Vec::new();
    while let Some(row) = rows.next().context("failed to fetch relation row")? {
        let relation: String = row.get(0).context("failed to read relation value")?;
        relations.push(relation);
    }

    Ok(relations)
}

/// Coerce SQLite constraint errors into human-readable messages. The only
/// constraint on the table is the primary key, so a violation here always
/// means an id collision.
fn map_unique_constraint(err: SqlError, id: i64) -> anyhow::Error {
    if matches!(err.sqlite_error_code(), Some(ErrorCode::ConstraintViolation)) {
        anyhow!("Contact id {id} is already taken.")
    } else {
        err.into()
    }
}
