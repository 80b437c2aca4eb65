//! Domain models that mirror the SQLite schema and get passed throughout the
//! TUI. The intent is that these types stay light-weight data holders so other
//! layers can focus on presentation and persistence logic.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
/// In-memory representation of a single contact row. Every descriptive field
/// is optional on purpose: the form accepts blank input everywhere, and blanks
/// are stored as SQL `NULL` rather than empty strings.
pub struct Contact {
    /// Primary key from the SQLite store. Assigned once at creation time from
    /// the bounded id space and never changed afterwards; delete flows bubble
    /// it back to the persistence layer.
    pub id: i64,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    /// Relationship to the owner of the book ("sister", "coworker", ...).
    /// Feeds the form's autocomplete once a few contacts exist.
    pub relation: Option<String>,
}

impl Contact {
    /// Name to show in lists and titles. Falls back to a placeholder so a
    /// contact saved with every field blank still renders as a selectable row.
    pub fn display_name(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => "(unnamed)".to_string(),
        }
    }

    /// One-line summary used under the name on list cards. Joins whichever of
    /// phone and relation are present so cards stay compact.
    pub fn summary_line(&self) -> String {
        let mut parts = Vec::new();
        if let Some(phone) = self.phone.as_deref() {
            if !phone.trim().is_empty() {
                parts.push(phone.trim().to_string());
            }
        }
        if let Some(relation) = self.relation.as_deref() {
            if !relation.trim().is_empty() {
                parts.push(relation.trim().to_string());
            }
        }
        parts.join("  |  ")
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// The payload a submitted form hands to the list controller: a contact
/// without an id. The controller allocates the id and persists the draft in
/// one step, which keeps the form decoupled from the storage layer.
pub struct ContactDraft {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub relation: Option<String>,
}

impl ContactDraft {
    /// Attach a freshly allocated id, producing the row-shaped struct the rest
    /// of the app works with.
    pub fn into_contact(self, id: i64) -> Contact {
        Contact {
            id,
            name: self.name,
            phone: self.phone,
            email: self.email,
            address: self.address,
            relation: self.relation,
        }
    }
}
