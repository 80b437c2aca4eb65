use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Contact, ContactDraft};

/// Form state for contact creation/editing, including autocomplete tracking
/// for the relation field.
#[derive(Default, Clone)]
pub(crate) struct ContactForm {
    pub(crate) name: String,
    pub(crate) phone: String,
    pub(crate) email: String,
    pub(crate) address: String,
    pub(crate) relation: String,
    pub(crate) active: ContactField,
    pub(crate) error: Option<String>,
    pub(crate) suggestion: Option<String>,
    pub(crate) autocomplete_disabled: bool,
}

/// Enumerates the fields within the contact form to drive focus management.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub(crate) enum ContactField {
    #[default]
    Name,
    Phone,
    Email,
    Address,
    Relation,
}

impl ContactForm {
    /// Populate the form from an existing contact when entering edit mode.
    pub(crate) fn from_contact(contact: &Contact) -> Self {
        Self {
            name: contact.name.clone().unwrap_or_default(),
            phone: contact.phone.clone().unwrap_or_default(),
            email: contact.email.clone().unwrap_or_default(),
            address: contact.address.clone().unwrap_or_default(),
            relation: contact.relation.clone().unwrap_or_default(),
            ..Self::default()
        }
    }

    /// Cycle focus forward across the five fields.
    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            ContactField::Name => ContactField::Phone,
            ContactField::Phone => ContactField::Email,
            ContactField::Email => ContactField::Address,
            ContactField::Address => ContactField::Relation,
            ContactField::Relation => ContactField::Name,
        };
        if self.active != ContactField::Relation {
            self.clear_suggestion();
        }
    }

    /// Cycle focus backward across the five fields.
    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            ContactField::Name => ContactField::Relation,
            ContactField::Phone => ContactField::Name,
            ContactField::Email => ContactField::Phone,
            ContactField::Address => ContactField::Email,
            ContactField::Relation => ContactField::Address,
        };
        if self.active != ContactField::Relation {
            self.clear_suggestion();
        }
    }

    /// Insert a character into the active field. Every field is free text, so
    /// the only rejected input is control characters.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            ContactField::Name => self.name.push(ch),
            ContactField::Phone => self.phone.push(ch),
            ContactField::Email => self.email.push(ch),
            ContactField::Address => self.address.push(ch),
            ContactField::Relation => {
                self.autocomplete_disabled = false;
                self.relation.push(ch);
            }
        }
        true
    }

    /// Remove a character from the active field.
    pub(crate) fn backspace(&mut self) {
        match self.active {
            ContactField::Name => {
                self.name.pop();
            }
            ContactField::Phone => {
                self.phone.pop();
            }
            ContactField::Email => {
                self.email.pop();
            }
            ContactField::Address => {
                self.address.pop();
            }
            ContactField::Relation => {
                self.relation.pop();
                self.autocomplete_disabled = false;
            }
        }
    }

    /// Package the fields into a draft payload. There is no cross-field
    /// validation and nothing is required: each field is trimmed, and blank
    /// input becomes an absent value rather than an empty string.
    pub(crate) fn to_draft(&self) -> ContactDraft {
        ContactDraft {
            name: normalize(&self.name),
            phone: normalize(&self.phone),
            email: normalize(&self.email),
            address: normalize(&self.address),
            relation: normalize(&self.relation),
        }
    }

    /// Update the relation autocomplete suggestion based on current input.
    pub(crate) fn update_suggestion(&mut self, relations: &[String]) {
        if self.active != ContactField::Relation {
            self.clear_suggestion();
            return;
        }

        if self.autocomplete_disabled || self.relation.chars().count() < 2 {
            self.clear_suggestion();
            return;
        }

        let current_lower = self.relation.to_lowercase();
        let maybe_match = relations
            .iter()
            .find(|candidate| candidate.to_lowercase().starts_with(&current_lower));

        if let Some(candidate) = maybe_match {
            if candidate.chars().count() == self.relation.chars().count()
                && candidate.to_lowercase() == current_lower
            {
                self.suggestion = None;
            } else {
                self.suggestion = Some(candidate.clone());
            }
        } else {
            self.suggestion = None;
        }
    }

    /// Apply the suggested relation, marking autocomplete as satisfied.
    pub(crate) fn accept_suggestion(&mut self) -> bool {
        if self.suggestion_suffix().is_some() {
            if let Some(candidate) = self.suggestion.clone() {
                self.relation = candidate;
                self.autocomplete_disabled = true;
                self.suggestion = None;
                return true;
            }
        }
        false
    }

    /// Explicitly disable autocomplete for the rest of this interaction.
    pub(crate) fn cancel_autocomplete(&mut self) -> bool {
        if self.active == ContactField::Relation && self.suggestion.is_some() {
            self.autocomplete_disabled = true;
            self.suggestion = None;
            return true;
        }
        false
    }

    /// Drop the current suggestion.
    fn clear_suggestion(&mut self) {
        self.suggestion = None;
    }

    /// Return the remaining characters to display as a ghosted autocomplete
    /// hint.
    pub(crate) fn suggestion_suffix(&self) -> Option<String> {
        let candidate = self.suggestion.as_ref()?;
        let current_len = self.relation.chars().count();
        let mut chars = candidate.chars();
        for _ in 0..current_len {
            chars.next()?;
        }
        let suffix: String = chars.collect();
        if suffix.is_empty() {
            None
        } else {
            Some(suffix)
        }
    }

    /// Whether we currently have a suggestion to show for the relation field.
    pub(crate) fn has_active_suggestion(&self) -> bool {
        self.active == ContactField::Relation && self.suggestion.is_some()
    }

    fn value(&self, field: ContactField) -> &String {
        match field {
            ContactField::Name => &self.name,
            ContactField::Phone => &self.phone,
            ContactField::Email => &self.email,
            ContactField::Address => &self.address,
            ContactField::Relation => &self.relation,
        }
    }

    /// Render a styled line for the modal form, optionally appending the
    /// autocomplete suffix on the relation field.
    pub(crate) fn build_line(&self, field_name: &str, field: ContactField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let display = if value.is_empty() {
            "<optional>".to_string()
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        let mut spans = vec![Span::raw(format!("{field_name}: "))];

        if field == ContactField::Relation && is_active && !value.is_empty() {
            spans.push(Span::styled(value.clone(), style));
            if let Some(suffix) = self.suggestion_suffix() {
                spans.push(Span::styled(suffix, Style::default().fg(Color::DarkGray)));
            }
        } else {
            spans.push(Span::styled(display, style));
        }

        Line::from(spans)
    }

    /// Character length of the requested field, used for cursor placement.
    pub(crate) fn value_len(&self, field: ContactField) -> usize {
        self.value(field).chars().count()
    }
}

/// Trim a field and collapse blank input to an absent value.
fn normalize(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// State for confirming the permanent deletion of a contact.
#[derive(Clone)]
pub(crate) struct ConfirmContactDelete {
    pub(crate) id: i64,
    pub(crate) name: String,
}

impl ConfirmContactDelete {
    /// Build the confirmation state from the contact being considered.
    pub(crate) fn from(contact: &Contact) -> Self {
        Self {
            id: contact.id,
            name: contact.display_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relations() -> Vec<String> {
        vec!["coworker".to_string(), "sister".to_string()]
    }

    #[test]
    fn blank_fields_become_absent_values() {
        let mut form = ContactForm::default();
        for ch in "Alice".chars() {
            assert!(form.push_char(ch));
        }
        form.next_field();
        for ch in "  ".chars() {
            form.push_char(ch);
        }

        let draft = form.to_draft();
        assert_eq!(draft.name.as_deref(), Some("Alice"));
        assert_eq!(draft.phone, None);
        assert_eq!(draft.email, None);
        assert_eq!(draft.address, None);
        assert_eq!(draft.relation, None);
    }

    #[test]
    fn every_field_accepts_free_text_and_rejects_control_chars() {
        let mut form = ContactForm::default();
        assert!(form.push_char('5'));
        assert!(form.push_char(' '));
        assert!(!form.push_char('\u{7}'));
        assert_eq!(form.name, "5 ");
    }

    #[test]
    fn focus_cycles_through_all_five_fields() {
        let mut form = ContactForm::default();
        let mut seen = vec![form.active];
        for _ in 0..4 {
            form.next_field();
            seen.push(form.active);
        }
        assert_eq!(
            seen,
            [
                ContactField::Name,
                ContactField::Phone,
                ContactField::Email,
                ContactField::Address,
                ContactField::Relation,
            ]
        );
        form.next_field();
        assert_eq!(form.active, ContactField::Name);
        form.previous_field();
        assert_eq!(form.active, ContactField::Relation);
    }

    #[test]
    fn suggestion_requires_two_characters_and_a_prefix_match() {
        let mut form = ContactForm::default();
        form.active = ContactField::Relation;

        form.relation = "s".to_string();
        form.update_suggestion(&relations());
        assert_eq!(form.suggestion, None);

        form.relation = "si".to_string();
        form.update_suggestion(&relations());
        assert_eq!(form.suggestion.as_deref(), Some("sister"));
        assert_eq!(form.suggestion_suffix().as_deref(), Some("ster"));

        assert!(form.accept_suggestion());
        assert_eq!(form.relation, "sister");
        assert_eq!(form.suggestion, None);
    }

    #[test]
    fn exact_match_offers_no_suggestion() {
        let mut form = ContactForm::default();
        form.active = ContactField::Relation;
        form.relation = "sister".to_string();
        form.update_suggestion(&relations());
        assert_eq!(form.suggestion, None);
    }

    #[test]
    fn edit_form_round_trips_contact_fields() {
        let contact = ContactDraft {
            name: Some("Alice".to_string()),
            email: Some("alice@example.com".to_string()),
            ..Default::default()
        }
        .into_contact(7);

        let form = ContactForm::from_contact(&contact);
        assert_eq!(form.name, "Alice");
        assert_eq!(form.email, "alice@example.com");
        assert_eq!(form.phone, "");

        let draft = form.to_draft();
        assert_eq!(draft.email.as_deref(), Some("alice@example.com"));
        assert_eq!(draft.phone, None);
    }
}
