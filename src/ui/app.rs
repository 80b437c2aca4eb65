use std::cmp::min;
use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use open::that as open_link;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;
use rusqlite::Connection;

use crate::db::{
    allocate_contact_id, clear_contacts, delete_contact, ensure_schema, fetch_contacts,
    fetch_relations, insert_contact, update_contact,
};
use crate::models::Contact;

use super::forms::{ConfirmContactDelete, ContactField, ContactForm};
use super::helpers::{centered_rect, detail_line, surface_error};
use super::screens::{ContactListScreen, DetailScreen};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Height allocation per contact card in the list view.
const CONTACT_CARD_HEIGHT: u16 = 5;

/// High-level navigation states. Keeping this explicit makes it easy to reason
/// about which rendering path runs and what keyboard shortcuts should do.
enum Screen {
    List,
    Detail(DetailScreen),
}

/// Fine-grained modes scoped to the current screen. The add/edit form and the
/// confirm dialogs are modal: while one is open, list navigation is parked and
/// the form owns the keyboard.
enum Mode {
    Normal,
    AddingContact(ContactForm),
    EditingContact { id: i64, form: ContactForm },
    ConfirmDelete(ConfirmContactDelete),
    ConfirmClean,
    Searching(SearchState),
}

/// State for an active inline search.
struct SearchState {
    query: String,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI: the injected database
/// connection, the list screen's contact mirror, and the navigation machine.
pub struct App {
    conn: Connection,
    list: ContactListScreen,
    relations: Vec<String>,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(conn: Connection, contacts: Vec<Contact>, relations: Vec<String>) -> Self {
        Self {
            conn,
            list: ContactListScreen::new(contacts),
            relations,
            screen: Screen::List,
            mode: Mode::Normal,
            status: None,
        }
    }

    /// Dispatch one key press through the current mode. Returns `true` when
    /// the app should exit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::AddingContact(form) => self.handle_add_contact(code, form)?,
            Mode::EditingContact { id, form } => self.handle_edit_contact(code, id, form)?,
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
            Mode::ConfirmClean => self.handle_confirm_clean(code)?,
            Mode::Searching(state) => self.handle_search(code, state)?,
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match self.screen {
            Screen::List => {
                match code {
                    KeyCode::Char('q') => {
                        *exit = true;
                    }
                    KeyCode::Esc => {
                        // Esc first drops an active filter; a second press
                        // quits from a clean list.
                        if self.list.filter.is_some() {
                            self.list.set_filter(None);
                            self.clear_status();
                        } else {
                            *exit = true;
                        }
                    }
                    KeyCode::Up => self.list.move_selection(-1),
                    KeyCode::Down => self.list.move_selection(1),
                    KeyCode::PageUp => self.list.move_selection(-5),
                    KeyCode::PageDown => self.list.move_selection(5),
                    KeyCode::Home => self.list.select_first(),
                    KeyCode::End => self.list.select_last(),
                    KeyCode::Enter => {
                        if let Some(contact) = self.list.current_contact().cloned() {
                            self.clear_status();
                            self.screen = Screen::Detail(DetailScreen::new(contact));
                        } else {
                            self.set_status("No contact selected.", StatusKind::Error);
                        }
                    }
                    KeyCode::Char('f') => {
                        self.clear_status();
                        return Ok(Mode::Searching(SearchState {
                            query: String::new(),
                        }));
                    }
                    KeyCode::Char('+') | KeyCode::Char('a') | KeyCode::Char('A') => {
                        self.clear_status();
                        return Ok(Mode::AddingContact(ContactForm::default()));
                    }
                    KeyCode::Char('-') | KeyCode::Char('d') | KeyCode::Char('D') => {
                        let confirm = self.list.current_contact().map(ConfirmContactDelete::from);
                        if let Some(confirm) = confirm {
                            self.clear_status();
                            return Ok(Mode::ConfirmDelete(confirm));
                        } else {
                            // Nothing selectable; deleting from an empty book
                            // is a no-op rather than an error path.
                            self.set_status("No contacts to delete.", StatusKind::Info);
                        }
                    }
                    KeyCode::Char('e') | KeyCode::Char('E') => {
                        if let Some(contact) = self.list.current_contact().cloned() {
                            self.clear_status();
                            return Ok(Mode::EditingContact {
                                id: contact.id,
                                form: ContactForm::from_contact(&contact),
                            });
                        } else {
                            self.set_status("No contact selected to edit.", StatusKind::Error);
                        }
                    }
                    KeyCode::Char('c') | KeyCode::Char('C') => {
                        self.clear_status();
                        return Ok(Mode::ConfirmClean);
                    }
                    _ => {}
                }
                Ok(Mode::Normal)
            }
            Screen::Detail(_) => {
                match code {
                    KeyCode::Char('q') => {
                        *exit = true;
                    }
                    KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace => {
                        self.clear_status();
                        self.screen = Screen::List;
                    }
                    KeyCode::Char('m') | KeyCode::Char('M') => {
                        self.open_mail_client();
                    }
                    _ => {}
                }
                Ok(Mode::Normal)
            }
        }
    }

    fn handle_add_contact(&mut self, code: KeyCode, mut form: ContactForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                if !form.cancel_autocomplete() {
                    self.set_status("Add contact cancelled.", StatusKind::Info);
                    keep_open = false;
                }
            }
            KeyCode::Tab => {
                let consumed = form.has_active_suggestion() && form.accept_suggestion();
                if !consumed {
                    form.next_field();
                }
                form.update_suggestion(&self.relations);
            }
            KeyCode::BackTab => {
                form.previous_field();
                form.update_suggestion(&self.relations);
            }
            KeyCode::Backspace => {
                form.backspace();
                form.update_suggestion(&self.relations);
            }
            KeyCode::Enter => match self.submit_new_contact(&form) {
                Ok(_) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                    form.update_suggestion(&self.relations);
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::AddingContact(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_edit_contact(
        &mut self,
        code: KeyCode,
        id: i64,
        mut form: ContactForm,
    ) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                if !form.cancel_autocomplete() {
                    self.set_status("Edit cancelled.", StatusKind::Info);
                    keep_open = false;
                }
            }
            KeyCode::Tab => {
                let consumed = form.has_active_suggestion() && form.accept_suggestion();
                if !consumed {
                    form.next_field();
                }
                form.update_suggestion(&self.relations);
            }
            KeyCode::BackTab => {
                form.previous_field();
                form.update_suggestion(&self.relations);
            }
            KeyCode::Backspace => {
                form.backspace();
                form.update_suggestion(&self.relations);
            }
            KeyCode::Enter => match self.save_edited_contact(id, &form) {
                Ok(_) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                    form.update_suggestion(&self.relations);
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::EditingContact { id, form })
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_confirm_delete(
        &mut self,
        code: KeyCode,
        confirm: ConfirmContactDelete,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.perform_delete(&confirm) {
                    Ok(_) => Ok(Mode::Normal),
                    Err(err) => {
                        let message = surface_error(&err);
                        self.set_status(message, StatusKind::Error);
                        Ok(Mode::ConfirmDelete(confirm))
                    }
                }
            }
            _ => Ok(Mode::ConfirmDelete(confirm)),
        }
    }

    fn handle_confirm_clean(&mut self, code: KeyCode) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Clean cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.perform_clean() {
                    Ok(_) => Ok(Mode::Normal),
                    Err(err) => {
                        let message = surface_error(&err);
                        self.set_status(message, StatusKind::Error);
                        Ok(Mode::ConfirmClean)
                    }
                }
            }
            _ => Ok(Mode::ConfirmClean),
        }
    }

    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.list.set_filter(None);
                return Ok(Mode::Normal);
            }
            KeyCode::Enter => {
                // Keep whatever the filter currently shows and return to
                // normal navigation.
                return Ok(Mode::Normal);
            }
            KeyCode::Up => {
                self.list.move_selection(-1);
                return Ok(Mode::Searching(state));
            }
            KeyCode::Down => {
                self.list.move_selection(1);
                return Ok(Mode::Searching(state));
            }
            KeyCode::Backspace => {
                state.query.pop();
            }
            KeyCode::Char(ch) => {
                if !ch.is_control() {
                    state.query.push(ch);
                }
            }
            _ => {}
        }

        if state.query.trim().is_empty() {
            self.list.set_filter(None);
        } else {
            self.list.set_filter(Some(state.query.clone()));
        }

        Ok(Mode::Searching(state))
    }

    /// Allocate an id, persist the draft, and prepend the stored contact to
    /// the mirror. The mirror is only touched after the insert succeeded, so a
    /// storage failure never leaves a phantom entry on screen.
    fn submit_new_contact(&mut self, form: &ContactForm) -> Result<()> {
        let draft = form.to_draft();

        // The table must exist if adding to it; after a clean this is what
        // brings it back.
        ensure_schema(&self.conn)?;
        let id = allocate_contact_id(&self.conn)?;
        let contact = insert_contact(&self.conn, id, &draft)?;

        let name = contact.display_name();
        self.list.prepend_contact(contact);
        self.reload_relations()?;
        self.set_status(format!("Added {name}."), StatusKind::Info);
        Ok(())
    }

    fn save_edited_contact(&mut self, id: i64, form: &ContactForm) -> Result<()> {
        let draft = form.to_draft();
        update_contact(&self.conn, id, &draft)?;
        self.reload_contacts(Some(id))?;
        self.reload_relations()?;

        let name = draft.name.unwrap_or_else(|| "(unnamed)".to_string());
        self.set_status(format!("Updated {name}."), StatusKind::Info);
        Ok(())
    }

    /// Delete the confirmed contact, then reconcile the mirror against
    /// storage wholesale. This re-fetch is the one point where the mirror is
    /// guaranteed consistent with storage again.
    fn perform_delete(&mut self, confirm: &ConfirmContactDelete) -> Result<()> {
        let removed = delete_contact(&self.conn, confirm.id)?;
        self.reload_contacts(None)?;
        self.reload_relations()?;

        if removed {
            self.set_status(format!("Deleted {}.", confirm.name), StatusKind::Info);
        } else {
            self.set_status(
                format!("{} was already gone.", confirm.name),
                StatusKind::Info,
            );
        }
        Ok(())
    }

    /// Drop the table and force both storage and the mirror to empty. No
    /// re-query happens here: the table does not exist until the next
    /// schema-ensuring call, and both sides are empty by construction.
    fn perform_clean(&mut self) -> Result<()> {
        clear_contacts(&self.conn)?;
        self.list.clear();
        self.relations.clear();
        self.set_status("All contacts cleared.", StatusKind::Info);
        Ok(())
    }

    /// Replace the mirror with rows fresh from storage, optionally keeping
    /// focus on a particular contact.
    fn reload_contacts(&mut self, focus_id: Option<i64>) -> Result<()> {
        ensure_schema(&self.conn)?;
        let contacts = fetch_contacts(&self.conn)?;
        self.list.set_contacts(contacts);
        if let Some(id) = focus_id {
            self.list.focus_id(id);
        }
        Ok(())
    }

    fn reload_relations(&mut self) -> Result<()> {
        self.relations = fetch_relations(&self.conn)?;
        Ok(())
    }

    fn open_mail_client(&mut self) {
        let (link, name) = match &self.screen {
            Screen::Detail(detail) => (
                detail.mailto_link(),
                detail.contact.display_name(),
            ),
            Screen::List => return,
        };

        match link {
            None => self.set_status(
                "This contact does not have an email address.",
                StatusKind::Error,
            ),
            Some(link) => {
                if let Err(err) = open_link(&link) {
                    self.set_status(
                        format!("Failed to open mail client: {err}"),
                        StatusKind::Error,
                    );
                } else {
                    self.set_status(format!("Composing mail to {name}."), StatusKind::Info);
                }
            }
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::List => self.draw_contact_list(frame, content_area),
            Screen::Detail(detail) => self.draw_detail(frame, content_area, detail),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::AddingContact(form) => self.draw_contact_form(frame, area, "Add Contact", form),
            Mode::EditingContact { form, .. } => {
                self.draw_contact_form(frame, area, "Edit Contact", form)
            }
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::ConfirmClean => self.draw_confirm_clean(frame, area),
            Mode::Searching(state) => self.draw_search_bar(frame, area, state),
            Mode::Normal => {}
        }
    }

    fn draw_contact_list(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(1)])
            .split(area);

        let mut header_spans = vec![
            Span::styled("Contacts", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("  -  {} stored", self.list.contacts.len())),
        ];
        if let Some(filter) = &self.list.filter {
            if !filter.trim().is_empty() {
                header_spans.push(Span::styled(
                    format!("  -  filter: '{}'", filter.trim()),
                    Style::default().fg(Color::Yellow),
                ));
            }
        }
        let header = Paragraph::new(Line::from(header_spans))
            .alignment(Alignment::Left)
            .block(Block::default().borders(Borders::ALL).title("Contact Book"));
        frame.render_widget(header, chunks[0]);

        if self.list.contacts.is_empty() {
            let message = Paragraph::new("No contacts yet. Press '+' to add one.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(message, chunks[1]);
            return;
        }

        if self.list.filtered.is_empty() {
            let message = Paragraph::new("No contacts match the current search.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(message, chunks[1]);
            return;
        }

        self.render_contact_cards(frame, chunks[1], &self.list.filtered, self.list.selected);
    }

    fn render_contact_cards(
        &self,
        frame: &mut Frame,
        area: Rect,
        contacts: &[Contact],
        selected: usize,
    ) {
        if contacts.is_empty() || area.height == 0 {
            return;
        }

        let card_height = CONTACT_CARD_HEIGHT as usize;
        let capacity = ((area.height as usize) / card_height).max(1);
        let len = contacts.len();
        let mut start = if selected >= capacity {
            selected + 1 - capacity
        } else {
            0
        };
        if start + capacity > len {
            start = len.saturating_sub(capacity);
        }
        let end = min(start + capacity, len);
        let visible_len = end.saturating_sub(start);
        if visible_len == 0 {
            return;
        }

        let constraints: Vec<Constraint> = (0..visible_len)
            .map(|_| Constraint::Length(CONTACT_CARD_HEIGHT))
            .collect();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (idx, chunk) in rows.iter().enumerate() {
            if chunk.height == 0 {
                continue;
            }

            let contact_index = start + idx;
            if contact_index >= len {
                break;
            }

            let contact = &contacts[contact_index];
            let mut block = Block::default()
                .borders(Borders::ALL)
                .title(format!("ID {:03}", contact.id));
            let mut paragraph_style = Style::default();
            if contact_index == selected {
                block = block.style(Style::default().fg(Color::Yellow));
                paragraph_style = Style::default().fg(Color::Yellow);
            }

            let mut lines = Vec::new();
            let name = if contact_index == selected {
                format!("> {}", contact.display_name())
            } else {
                contact.display_name()
            };
            lines.push(Line::from(Span::styled(
                name,
                Style::default().add_modifier(Modifier::BOLD),
            )));

            let summary = contact.summary_line();
            if !summary.is_empty() {
                lines.push(Line::from(Span::styled(
                    summary,
                    Style::default().fg(Color::Gray),
                )));
            }

            if let Some(email) = contact.email.as_deref() {
                if !email.trim().is_empty() {
                    lines.push(Line::from(Span::styled(
                        email.trim().to_string(),
                        Style::default().fg(Color::Cyan),
                    )));
                }
            }

            let paragraph = Paragraph::new(lines)
                .block(block)
                .wrap(Wrap { trim: true })
                .alignment(Alignment::Left)
                .style(paragraph_style);

            frame.render_widget(paragraph, *chunk);
        }
    }

    fn draw_detail(&self, frame: &mut Frame, area: Rect, detail: &DetailScreen) {
        let contact = &detail.contact;
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Contact Info - ID {:03}", contact.id));

        let lines = vec![
            detail_line("Name", contact.name.as_deref()),
            detail_line("Phone", contact.phone.as_deref()),
            detail_line("Email", contact.email.as_deref()),
            detail_line("Address", contact.address.as_deref()),
            detail_line("Relationship", contact.relation.as_deref()),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        match (&self.screen, &self.mode) {
            (_, Mode::Searching(_)) => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Select   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Keep Filter   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Clear"),
            ]),
            (Screen::Detail(_), _) => Line::from(vec![
                Span::styled("[m]", key_style),
                Span::raw(" Email   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Back   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
            _ => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Select   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Details   "),
                Span::styled("[f]", key_style),
                Span::raw(" Search   "),
                Span::styled("[+]", key_style),
                Span::raw(" Add   "),
                Span::styled("[-]", key_style),
                Span::raw(" Delete   "),
                Span::styled("[e]", key_style),
                Span::raw(" Edit   "),
                Span::styled("[c]", key_style),
                Span::raw(" Clean   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
        }
    }

    fn draw_contact_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &ContactForm) {
        let popup_area = centered_rect(70, 60, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            form.build_line("Name", ContactField::Name),
            form.build_line("Phone", ContactField::Phone),
            form.build_line("Email", ContactField::Email),
            form.build_line("Address", ContactField::Address),
            form.build_line("Relation", ContactField::Relation),
            Line::from(""),
        ];

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save - Tab to accept/switch - Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let (prefix, row) = match form.active {
            ContactField::Name => ("Name: ", 0),
            ContactField::Phone => ("Phone: ", 1),
            ContactField::Email => ("Email: ", 2),
            ContactField::Address => ("Address: ", 3),
            ContactField::Relation => ("Relation: ", 4),
        };
        let cursor_x = inner.x + prefix.len() as u16 + form.value_len(form.active) as u16;
        let cursor_y = inner.y + row;
        frame.set_cursor_position((cursor_x, cursor_y));
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmContactDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Deletion")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!(
                "Delete '{}' (id {:03}) permanently?",
                confirm.name, confirm.id
            )),
            Line::from("This cannot be undone."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_confirm_clean(&self, frame: &mut Frame, area: Rect) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Clean Contact Book")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from("Remove every contact and reset the book?"),
            Line::from("The table is dropped and comes back empty on the next write."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Search");
        let paragraph = Paragraph::new(Span::raw(format!("Search: {}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Search: ".len() as u16 + state.query.chars().count() as u16;
        let cursor_y = inner.y;
        frame.set_cursor_position((cursor_x, cursor_y));
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rusqlite::Connection;

    use super::*;
    use crate::db::{ensure_schema, fetch_contacts, insert_contact, ID_SPACE};
    use crate::models::ContactDraft;

    fn test_app() -> App {
        let conn = Connection::open_in_memory().expect("in-memory db should open");
        ensure_schema(&conn).expect("schema should ensure");
        App::new(conn, Vec::new(), Vec::new())
    }

    fn form(name: &str, phone: &str) -> ContactForm {
        ContactForm {
            name: name.to_string(),
            phone: phone.to_string(),
            ..ContactForm::default()
        }
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(code).expect("key handling should not fail");
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
    }

    #[test]
    fn adding_persists_one_row_and_prepends_to_the_mirror() {
        let mut app = test_app();

        app.submit_new_contact(&form("Alice", "555-0100"))
            .expect("submission should succeed");

        assert_eq!(app.list.contacts.len(), 1);
        let head = &app.list.contacts[0];
        assert!((0..ID_SPACE).contains(&head.id));
        assert_eq!(head.name.as_deref(), Some("Alice"));
        assert_eq!(head.phone.as_deref(), Some("555-0100"));
        assert_eq!(head.email, None);
        assert_eq!(head.address, None);
        assert_eq!(head.relation, None);

        let stored = fetch_contacts(&app.conn).expect("fetch should succeed");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0], *head);
    }

    #[test]
    fn repeated_additions_yield_distinct_ids_newest_first() {
        let mut app = test_app();

        for i in 0..5 {
            app.submit_new_contact(&form(&format!("Contact {i}"), "555-0000"))
                .expect("submission should succeed");
        }

        assert_eq!(app.list.contacts.len(), 5);
        let ids: HashSet<i64> = app.list.contacts.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), 5, "ids must be unique");

        let names: Vec<_> = app
            .list
            .contacts
            .iter()
            .map(|c| c.display_name())
            .collect();
        assert_eq!(
            names,
            ["Contact 4", "Contact 3", "Contact 2", "Contact 1", "Contact 0"]
        );
    }

    #[test]
    fn add_form_flow_through_key_events() {
        let mut app = test_app();

        press(&mut app, KeyCode::Char('+'));
        assert!(matches!(app.mode, Mode::AddingContact(_)));

        type_text(&mut app, "Bob");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "555-0101");
        press(&mut app, KeyCode::Enter);

        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.list.contacts.len(), 1);
        assert_eq!(app.list.contacts[0].name.as_deref(), Some("Bob"));
        assert_eq!(app.list.contacts[0].phone.as_deref(), Some("555-0101"));
    }

    #[test]
    fn deleting_the_selected_contact_reconciles_with_storage() {
        let mut app = test_app();
        for name in ["Ann", "Ben", "Cat"] {
            app.submit_new_contact(&form(name, "555-0000"))
                .expect("submission should succeed");
        }

        // Mirror runs newest-first: [Cat, Ben, Ann]. Select Ben.
        press(&mut app, KeyCode::Down);
        let ben_id = app.list.current_contact().expect("selection exists").id;

        press(&mut app, KeyCode::Char('-'));
        assert!(matches!(app.mode, Mode::ConfirmDelete(_)));
        press(&mut app, KeyCode::Char('y'));

        assert_eq!(app.list.contacts.len(), 2);
        assert!(app.list.contacts.iter().all(|c| c.id != ben_id));

        let stored = fetch_contacts(&app.conn).expect("fetch should succeed");
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|c| c.id != ben_id));
    }

    #[test]
    fn delete_request_with_no_contacts_is_a_noop() {
        let mut app = test_app();

        press(&mut app, KeyCode::Char('-'));
        assert!(matches!(app.mode, Mode::Normal));
        press(&mut app, KeyCode::Char('y'));

        assert!(app.list.contacts.is_empty());
        assert!(fetch_contacts(&app.conn)
            .expect("fetch should succeed")
            .is_empty());
    }

    #[test]
    fn clean_forces_mirror_and_storage_to_empty() {
        let mut app = test_app();
        for name in ["Ann", "Ben"] {
            app.submit_new_contact(&form(name, "555-0000"))
                .expect("submission should succeed");
        }
        app.relations = vec!["sister".to_string()];

        press(&mut app, KeyCode::Char('c'));
        assert!(matches!(app.mode, Mode::ConfirmClean));
        press(&mut app, KeyCode::Char('y'));

        assert!(app.list.contacts.is_empty());
        assert!(app.relations.is_empty());

        // The next schema-ensure brings back an empty table.
        app.reload_contacts(None).expect("reload should succeed");
        assert!(app.list.contacts.is_empty());
        assert!(fetch_contacts(&app.conn)
            .expect("fetch should succeed")
            .is_empty());
    }

    #[test]
    fn enter_opens_the_detail_screen_with_the_full_payload() {
        let mut app = test_app();
        app.submit_new_contact(&form("Alice", "555-0100"))
            .expect("submission should succeed");

        let expected = app.list.contacts[0].clone();
        press(&mut app, KeyCode::Enter);
        match &app.screen {
            Screen::Detail(detail) => assert_eq!(detail.contact, expected),
            Screen::List => panic!("expected detail screen"),
        }

        press(&mut app, KeyCode::Esc);
        assert!(matches!(app.screen, Screen::List));
    }

    #[test]
    fn search_filters_and_escape_restores_the_full_list() {
        let mut app = test_app();
        for name in ["Alice", "Bob"] {
            app.submit_new_contact(&form(name, "555-0000"))
                .expect("submission should succeed");
        }

        press(&mut app, KeyCode::Char('f'));
        type_text(&mut app, "ali");
        assert_eq!(app.list.filtered.len(), 1);
        assert_eq!(app.list.filtered[0].name.as_deref(), Some("Alice"));

        press(&mut app, KeyCode::Esc);
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.list.filtered.len(), 2);
    }

    #[test]
    fn editing_updates_storage_and_keeps_focus() {
        let mut app = test_app();
        app.submit_new_contact(&form("Alice", "555-0100"))
            .expect("submission should succeed");
        let id = app.list.contacts[0].id;

        let mut edited = form("Alicia", "555-0199");
        edited.relation = "sister".to_string();
        app.save_edited_contact(id, &edited)
            .expect("edit should succeed");

        let current = app.list.current_contact().expect("selection exists");
        assert_eq!(current.id, id);
        assert_eq!(current.name.as_deref(), Some("Alicia"));
        assert_eq!(current.relation.as_deref(), Some("sister"));
        assert_eq!(app.relations, ["sister"]);
    }

    #[test]
    fn failed_insert_leaves_the_mirror_untouched() {
        let mut app = test_app();
        for id in 0..ID_SPACE {
            insert_contact(&app.conn, id, &ContactDraft::default())
                .expect("seeding insert should succeed");
        }
        app.reload_contacts(None).expect("reload should succeed");

        let err = app
            .submit_new_contact(&form("Overflow", "555-0000"))
            .expect_err("a full id space should fail the submission");
        assert!(format!("{err:#}").contains("no free contact ids"));

        assert_eq!(app.list.contacts.len(), ID_SPACE as usize);
        let stored = fetch_contacts(&app.conn).expect("fetch should succeed");
        assert_eq!(stored.len(), ID_SPACE as usize);
    }
}
