use crate::models::Contact;

/// The list screen's view of the world: the in-memory mirror of the stored
/// contacts plus selection and filter state. The mirror is the authoritative
/// copy the UI renders from; reconciliation with storage happens wholesale
/// through [`set_contacts`].
///
/// [`set_contacts`]: ContactListScreen::set_contacts
pub(crate) struct ContactListScreen {
    pub(crate) contacts: Vec<Contact>,
    pub(crate) filtered: Vec<Contact>,
    pub(crate) filter: Option<String>,
    pub(crate) selected: usize,
}

impl ContactListScreen {
    pub(crate) fn new(contacts: Vec<Contact>) -> Self {
        let mut screen = Self {
            filtered: Vec::new(),
            contacts,
            filter: None,
            selected: 0,
        };
        screen.apply_filter();
        screen
    }

    /// Recompute the visible subset from the mirror and the current query,
    /// clamping the selection back into bounds afterwards.
    pub(crate) fn apply_filter(&mut self) {
        self.filtered = if let Some(query) = &self.filter {
            let needle = query.trim().to_lowercase();
            if needle.is_empty() {
                self.contacts.clone()
            } else {
                self.contacts
                    .iter()
                    .filter(|contact| contact_matches(contact, &needle))
                    .cloned()
                    .collect()
            }
        } else {
            self.contacts.clone()
        };

        if self.filtered.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.filtered.len() {
            self.selected = self.filtered.len() - 1;
        }
    }

    pub(crate) fn set_filter(&mut self, filter: Option<String>) {
        self.filter = filter;
        self.apply_filter();
    }

    /// Replace the mirror wholesale with rows fresh from storage. This is the
    /// one point where mirror order converges back to storage order.
    pub(crate) fn set_contacts(&mut self, contacts: Vec<Contact>) {
        self.contacts = contacts;
        self.apply_filter();
    }

    /// Put a newly created contact at the head of the mirror so the list runs
    /// newest-first, and move the selection onto it when visible.
    pub(crate) fn prepend_contact(&mut self, contact: Contact) {
        let id = contact.id;
        self.contacts.insert(0, contact);
        self.apply_filter();
        if let Some(idx) = self.filtered.iter().position(|c| c.id == id) {
            self.selected = idx;
        }
    }

    /// Empty the mirror directly, without consulting storage. Used by the
    /// clean flow, where both sides are forced to empty rather than
    /// reconciled.
    pub(crate) fn clear(&mut self) {
        self.contacts.clear();
        self.apply_filter();
    }

    /// Move the selection onto the contact with the given id, if visible.
    pub(crate) fn focus_id(&mut self, id: i64) {
        if let Some(idx) = self.filtered.iter().position(|c| c.id == id) {
            self.selected = idx;
        }
    }

    pub(crate) fn current_contact(&self) -> Option<&Contact> {
        self.filtered.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.filtered.is_empty() {
            return;
        }
        let len = self.filtered.len() as isize;
        let mut new = self.selected as isize + offset;
        if new < 0 {
            new = 0;
        }
        if new >= len {
            new = len - 1;
        }
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        if !self.filtered.is_empty() {
            self.selected = 0;
        }
    }

    pub(crate) fn select_last(&mut self) {
        if !self.filtered.is_empty() {
            self.selected = self.filtered.len() - 1;
        }
    }
}

/// Case-insensitive match across every descriptive field.
fn contact_matches(contact: &Contact, needle: &str) -> bool {
    [
        &contact.name,
        &contact.phone,
        &contact.email,
        &contact.address,
        &contact.relation,
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(needle))
}

/// Pure display of one contact handed over from the list screen as a full
/// payload. Holds no other state and performs no mutation.
pub(crate) struct DetailScreen {
    pub(crate) contact: Contact,
}

impl DetailScreen {
    pub(crate) fn new(contact: Contact) -> Self {
        Self { contact }
    }

    /// The `mailto:` target for the open-mail shortcut, when the contact has
    /// an email address.
    pub(crate) fn mailto_link(&self) -> Option<String> {
        let email = self.contact.email.as_deref()?.trim();
        if email.is_empty() {
            None
        } else {
            Some(format!("mailto:{email}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContactDraft;

    fn contact(id: i64, name: &str, relation: Option<&str>) -> Contact {
        ContactDraft {
            name: Some(name.to_string()),
            relation: relation.map(str::to_string),
            ..Default::default()
        }
        .into_contact(id)
    }

    #[test]
    fn prepend_puts_newest_first_and_selects_it() {
        let mut screen = ContactListScreen::new(vec![contact(1, "Alice", None)]);
        screen.prepend_contact(contact(2, "Bob", None));

        let ids: Vec<_> = screen.filtered.iter().map(|c| c.id).collect();
        assert_eq!(ids, [2, 1]);
        assert_eq!(screen.selected, 0);
    }

    #[test]
    fn filter_matches_any_field_case_insensitively() {
        let mut screen = ContactListScreen::new(vec![
            contact(1, "Alice", Some("sister")),
            contact(2, "Bob", Some("coworker")),
        ]);

        screen.set_filter(Some("SIS".to_string()));
        assert_eq!(screen.filtered.len(), 1);
        assert_eq!(screen.filtered[0].id, 1);

        screen.set_filter(None);
        assert_eq!(screen.filtered.len(), 2);
    }

    #[test]
    fn selection_clamps_when_the_visible_list_shrinks() {
        let mut screen = ContactListScreen::new(vec![
            contact(1, "Alice", None),
            contact(2, "Bob", None),
            contact(3, "Cara", None),
        ]);
        screen.select_last();
        assert_eq!(screen.selected, 2);

        screen.set_contacts(vec![contact(1, "Alice", None)]);
        assert_eq!(screen.selected, 0);

        screen.clear();
        assert!(screen.current_contact().is_none());
        assert_eq!(screen.selected, 0);
    }

    #[test]
    fn mailto_link_requires_a_nonblank_email() {
        let with_email = Contact {
            email: Some("alice@example.com".to_string()),
            ..contact(1, "Alice", None)
        };
        assert_eq!(
            DetailScreen::new(with_email).mailto_link().as_deref(),
            Some("mailto:alice@example.com")
        );

        let blank = Contact {
            email: Some("   ".to_string()),
            ..contact(2, "Bob", None)
        };
        assert_eq!(DetailScreen::new(blank).mailto_link(), None);
    }
}
