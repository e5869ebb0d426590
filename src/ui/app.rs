use std::mem;

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::event::KeyCode;
use log::{info, warn};
use open::that as open_link;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap};
use ratatui::Frame;
use rusqlite::Connection;

use crate::db::{add_person, delete_person, list_persons, update_person};

use super::forms::{ConfirmPersonDelete, PersonField, PersonForm};
use super::helpers::{centered_rect, format_birth_date, person_detail_lines, surface_error};
use super::screens::{HomeScreen, PersonListScreen};
use super::shell::{Shell, Template, WINDOW_TITLE};

/// Rows reserved for the title bar and view tabs.
const HEADER_HEIGHT: u16 = 3;
/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows skipped by PgUp/PgDn in the contact list.
const PAGE_SIZE: isize = 10;
/// Longest query or view name the search and command bars accept.
const INPUT_MAX_LEN: usize = 64;

/// Per-view state for whatever currently owns the central region.
enum Screen {
    Empty,
    Home(HomeScreen),
    Persons(PersonListScreen),
}

/// Fine-grained modes layered over the current screen.
enum Mode {
    Normal,
    AddingPerson(PersonForm),
    EditingPerson { id: i64, form: PersonForm },
    ConfirmDelete(ConfirmPersonDelete),
    Searching(String),
    Command(String),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
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

/// Application state owned by the run loop: the store connection, the shell
/// describing what the window shows, and the state behind that view.
pub struct App {
    conn: Connection,
    shell: Shell,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            shell: Shell::new(),
            screen: Screen::Empty,
            mode: Mode::Normal,
            status: None,
        }
    }

    /// Load the first template into the window. Any failure here is fatal for
    /// the caller.
    pub fn show_initial(&mut self, name: &str) -> Result<()> {
        let template = self
            .shell
            .show_initial(name)
            .with_context(|| format!("failed to load initial view `{name}`"))?;
        info!("window content set to {template}");
        self.hydrate(template)
            .with_context(|| format!("failed to populate view `{template}`"))
    }

    /// Swap the central region to another template. Failures are reported on
    /// the status line and leave the current view in place.
    pub fn show_view(&mut self, name: &str) {
        if let Err(err) = self.try_show_view(name) {
            let message = surface_error(&err);
            warn!("view swap to `{}` failed: {message}", name.trim());
            self.set_status(message, StatusKind::Error);
        }
    }

    fn try_show_view(&mut self, name: &str) -> Result<()> {
        let template = Template::load(name)?;
        let screen = self.load_screen(template)?;
        self.shell.show_view(name)?;
        self.screen = screen;
        info!("showing {template}");
        Ok(())
    }

    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    /// Text currently on the footer status line.
    pub fn status_text(&self) -> Option<&str> {
        self.status.as_ref().map(|status| status.text.as_str())
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mut mode = mem::replace(&mut self.mode, Mode::Normal);

        mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::AddingPerson(form) => self.handle_add_person(code, form)?,
            Mode::EditingPerson { id, form } => self.handle_edit_person(code, id, form)?,
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
            Mode::Searching(query) => self.handle_search(code, query),
            Mode::Command(input) => self.handle_command(code, input),
        };

        self.mode = mode;
        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') => {
                *exit = true;
                return Ok(Mode::Normal);
            }
            KeyCode::Char(':') => {
                self.clear_status();
                return Ok(Mode::Command(String::new()));
            }
            KeyCode::Char('1') => {
                self.clear_status();
                self.show_view(Template::HomeScreen.name());
                return Ok(Mode::Normal);
            }
            KeyCode::Char('2') => {
                self.clear_status();
                self.show_view(Template::PersonList.name());
                return Ok(Mode::Normal);
            }
            KeyCode::Char('+') => {
                self.clear_status();
                return Ok(Mode::AddingPerson(PersonForm::default()));
            }
            _ => {}
        }

        match self.screen {
            Screen::Empty | Screen::Home(_) => {
                match code {
                    KeyCode::Esc => *exit = true,
                    KeyCode::Enter | KeyCode::Char('c') | KeyCode::Char('C') => {
                        self.clear_status();
                        self.show_view(Template::PersonList.name());
                    }
                    _ => {}
                }
                Ok(Mode::Normal)
            }
            Screen::Persons(ref mut persons) => {
                let mut status_to_set: Option<(String, StatusKind)> = None;
                let mut go_home = false;

                match code {
                    KeyCode::Esc => go_home = true,
                    KeyCode::Up => persons.move_selection(-1),
                    KeyCode::Down => persons.move_selection(1),
                    KeyCode::PageUp => persons.move_selection(-PAGE_SIZE),
                    KeyCode::PageDown => persons.move_selection(PAGE_SIZE),
                    KeyCode::Home => persons.select_first(),
                    KeyCode::End => persons.select_last(),
                    KeyCode::Char('f') | KeyCode::Char('/') => {
                        let query = persons.filter.clone().unwrap_or_default();
                        return Ok(Mode::Searching(query));
                    }
                    KeyCode::Char('e') | KeyCode::Char('E') => {
                        match persons.current_person() {
                            Some(person) => {
                                if let Some(id) = person.id {
                                    return Ok(Mode::EditingPerson {
                                        id,
                                        form: PersonForm::from_person(person),
                                    });
                                }
                            }
                            None => {
                                status_to_set = Some((
                                    "No contact selected to edit.".to_string(),
                                    StatusKind::Error,
                                ));
                            }
                        }
                    }
                    KeyCode::Char('-') | KeyCode::Delete => {
                        match persons.current_person().and_then(ConfirmPersonDelete::from_person) {
                            Some(confirm) => return Ok(Mode::ConfirmDelete(confirm)),
                            None => {
                                status_to_set = Some((
                                    "No contact selected to delete.".to_string(),
                                    StatusKind::Error,
                                ));
                            }
                        }
                    }
                    KeyCode::Enter => {
                        if let Some(person) = persons.current_person() {
                            status_to_set = Some(match person.mailto_link() {
                                None => (
                                    format!("{} has no email address.", person.display_name()),
                                    StatusKind::Error,
                                ),
                                Some(link) => match open_link(&link) {
                                    Ok(()) => (format!("Opened {link}."), StatusKind::Info),
                                    Err(err) => (
                                        format!("Failed to open {link}: {err}"),
                                        StatusKind::Error,
                                    ),
                                },
                            });
                        }
                    }
                    _ => {}
                }

                if go_home {
                    self.clear_status();
                    self.show_view(Template::HomeScreen.name());
                } else if let Some((text, kind)) = status_to_set {
                    self.set_status(text, kind);
                }

                Ok(Mode::Normal)
            }
        }
    }

    fn handle_add_person(&mut self, code: KeyCode, mut form: PersonForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Add contact cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_new_person(&form) {
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
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::AddingPerson(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_edit_person(&mut self, code: KeyCode, id: i64, mut form: PersonForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_existing_person(id, &form) {
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
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::EditingPerson { id, form })
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_confirm_delete(
        &mut self,
        code: KeyCode,
        confirm: ConfirmPersonDelete,
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

    /// Live filtering: every keystroke narrows the list. Enter keeps the
    /// filter, Esc drops it.
    fn handle_search(&mut self, code: KeyCode, mut query: String) -> Mode {
        let Screen::Persons(ref mut persons) = self.screen else {
            return Mode::Normal;
        };

        match code {
            KeyCode::Esc => {
                persons.set_filter(None);
                return Mode::Normal;
            }
            KeyCode::Enter => {
                let shown = persons.filtered.len();
                self.set_status(
                    format!("{shown} contact(s) match \"{}\".", query.trim()),
                    StatusKind::Info,
                );
                return Mode::Normal;
            }
            KeyCode::Up => persons.move_selection(-1),
            KeyCode::Down => persons.move_selection(1),
            KeyCode::Backspace => {
                query.pop();
                persons.set_filter(Some(query.clone()));
            }
            KeyCode::Char(ch) if accepts_input(&query, ch) => {
                query.push(ch);
                persons.set_filter(Some(query.clone()));
            }
            _ => {}
        }
        Mode::Searching(query)
    }

    fn handle_command(&mut self, code: KeyCode, mut input: String) -> Mode {
        match code {
            KeyCode::Esc => Mode::Normal,
            KeyCode::Enter => {
                if !input.trim().is_empty() {
                    self.show_view(&input);
                }
                Mode::Normal
            }
            KeyCode::Backspace => {
                input.pop();
                Mode::Command(input)
            }
            KeyCode::Char(ch) if accepts_input(&input, ch) => {
                input.push(ch);
                Mode::Command(input)
            }
            _ => Mode::Command(input),
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let header_height = if self.shell.is_framed() {
            HEADER_HEIGHT.min(area.height)
        } else {
            0
        };
        let footer_height = FOOTER_HEIGHT.min(area.height.saturating_sub(header_height));

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(header_height),
                Constraint::Min(0),
                Constraint::Length(footer_height),
            ])
            .split(area);

        if header_height > 0 {
            self.draw_header(frame, chunks[0]);
        }

        match &self.screen {
            Screen::Empty => {}
            Screen::Home(home) => self.draw_home(frame, chunks[1], home),
            Screen::Persons(persons) => self.draw_person_list(frame, chunks[1], persons),
        }

        if footer_height > 0 {
            self.draw_footer(frame, chunks[2]);
        }

        match &self.mode {
            Mode::AddingPerson(form) => self.draw_person_form(frame, area, "Add Contact", form),
            Mode::EditingPerson { form, .. } => {
                self.draw_person_form(frame, area, "Edit Contact", form)
            }
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Searching(query) => self.draw_input_bar(frame, area, "Search", query),
            Mode::Command(input) => self.draw_input_bar(frame, area, "Show view", input),
            Mode::Normal => {}
        }
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let titles = [Template::HomeScreen, Template::PersonList]
            .iter()
            .enumerate()
            .map(|(idx, template)| {
                let label = match template {
                    Template::PersonList => "Contacts",
                    _ => "Home",
                };
                Line::from(format!("[{}] {label}", idx + 1))
            })
            .collect::<Vec<_>>();
        let selected = match self.shell.active() {
            Some(Template::PersonList) => 1,
            _ => 0,
        };

        let tabs = Tabs::new(titles)
            .block(Block::default().borders(Borders::ALL).title(WINDOW_TITLE))
            .select(selected)
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, area);
    }

    fn draw_home(&self, frame: &mut Frame, area: Rect, home: &HomeScreen) {
        let mut lines = vec![
            Line::from(Span::styled(
                WINDOW_TITLE,
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(format!("{} contact(s) on file.", home.contact_count)),
        ];
        if let Some((name, date)) = &home.next_birthday {
            lines.push(Line::from(format!(
                "Next birthday: {name} on {}.",
                format_birth_date(Some(*date))
            )));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Press Enter to browse contacts or '+' to add one.",
            Style::default().fg(Color::Gray),
        )));

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Home"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn draw_person_list(&self, frame: &mut Frame, area: Rect, persons: &PersonListScreen) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(area);

        let title = match &persons.filter {
            Some(query) => format!(
                "Contacts ({} of {}, filter: {query})",
                persons.filtered.len(),
                persons.persons.len()
            ),
            None => format!("Contacts ({})", persons.persons.len()),
        };
        let list_block = Block::default().borders(Borders::ALL).title(title);

        if persons.filtered.is_empty() {
            let message = if persons.persons.is_empty() {
                "No contacts yet. Press '+' to add one."
            } else {
                "No contacts match the current filter."
            };
            let paragraph = Paragraph::new(message)
                .alignment(Alignment::Center)
                .block(list_block)
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, columns[0]);
        } else {
            let items = persons
                .filtered
                .iter()
                .map(|person| ListItem::new(person.display_name()))
                .collect::<Vec<_>>();
            let list = List::new(items)
                .block(list_block)
                .highlight_style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol("> ");
            let mut state = ListState::default();
            state.select(Some(persons.selected));
            frame.render_stateful_widget(list, columns[0], &mut state);
        }

        let detail_block = Block::default().borders(Borders::ALL).title("Details");
        let detail = match persons.current_person() {
            Some(person) => Paragraph::new(person_detail_lines(person)),
            None => Paragraph::new(Span::styled(
                "Select a contact to see its details.",
                Style::default().fg(Color::DarkGray),
            )),
        };
        frame.render_widget(detail.block(detail_block).wrap(Wrap { trim: false }), columns[1]);
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

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let hints: &[(&str, &str)] = match (&self.screen, &self.mode) {
            (_, Mode::AddingPerson(_)) | (_, Mode::EditingPerson { .. }) => &[
                ("[Tab/↑↓]", "Next/Prev Field"),
                ("[Enter]", "Save"),
                ("[Esc]", "Cancel"),
            ],
            (_, Mode::ConfirmDelete(_)) => &[("[y]", "Delete"), ("[n]", "Keep")],
            (_, Mode::Searching(_)) => &[
                ("[↑↓]", "Select"),
                ("[Enter]", "Keep Filter"),
                ("[Esc]", "Clear"),
            ],
            (_, Mode::Command(_)) => &[("[Enter]", "Show"), ("[Esc]", "Cancel")],
            (Screen::Persons(_), _) => &[
                ("[↑↓]", "Select"),
                ("[Enter]", "Email"),
                ("[f]", "Search"),
                ("[+]", "Add"),
                ("[e]", "Edit"),
                ("[-]", "Delete"),
                ("[Esc]", "Home"),
                ("[:]", "View"),
                ("[q]", "Quit"),
            ],
            _ => &[
                ("[Enter]", "Contacts"),
                ("[+]", "Add"),
                ("[1/2]", "Switch View"),
                ("[:]", "View"),
                ("[q]", "Quit"),
            ],
        };

        let mut spans = Vec::with_capacity(hints.len() * 2);
        for (idx, (key, action)) in hints.iter().enumerate() {
            spans.push(Span::styled(key.to_string(), key_style));
            let separator = if idx + 1 == hints.len() { "" } else { "   " };
            spans.push(Span::raw(format!(" {action}{separator}")));
        }
        Line::from(spans)
    }

    fn draw_input_bar(&self, frame: &mut Frame, area: Rect, title: &str, value: &str) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let prefix = format!("{title}: ");
        let block = Block::default().borders(Borders::ALL).title(title.to_string());
        let paragraph = Paragraph::new(Span::raw(format!("{prefix}{value}")))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let typed = prefix.chars().count() + value.chars().count();
        let cursor_x = cursor_column(inner, typed);
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_person_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &PersonForm) {
        let popup_area = centered_rect(70, 60, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = PersonField::ALL
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines);
        frame.render_widget(paragraph, inner);

        let field = form.active;
        let typed = field.label().chars().count() + 2 + form.value_len(field);
        let cursor_x = cursor_column(inner, typed);
        let cursor_y = inner.y.saturating_add(field.row() as u16);
        frame.set_cursor_position((cursor_x, cursor_y));
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmPersonDelete) {
        let popup_area = centered_rect(50, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Delete Contact")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red));
        let lines = vec![
            Line::from(format!("Delete {}?", confirm.name)),
            Line::from(""),
            Line::from(Span::styled(
                "y to delete • n or Esc to keep",
                Style::default().fg(Color::Gray),
            )),
        ];
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);
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

    fn save_new_person(&mut self, form: &PersonForm) -> Result<()> {
        let person = form.parse_inputs(None)?;
        let saved = add_person(&self.conn, &person).context("failed to add contact")?;
        self.reload_persons(saved.id)?;
        self.set_status(format!("Added {}.", saved.display_name()), StatusKind::Info);
        Ok(())
    }

    fn save_existing_person(&mut self, id: i64, form: &PersonForm) -> Result<()> {
        let person = form.parse_inputs(Some(id))?;
        update_person(&self.conn, &person).context("failed to update contact")?;
        self.reload_persons(Some(id))?;
        self.set_status(
            format!("Updated {}.", person.display_name()),
            StatusKind::Info,
        );
        Ok(())
    }

    fn perform_delete(&mut self, confirm: &ConfirmPersonDelete) -> Result<()> {
        delete_person(&self.conn, confirm.id).context("failed to delete contact")?;
        self.reload_persons(None)?;
        self.set_status(format!("Deleted {}.", confirm.name), StatusKind::Info);
        Ok(())
    }

    /// Refresh whichever view is showing after a write.
    fn reload_persons(&mut self, focus_id: Option<i64>) -> Result<()> {
        let persons = list_persons(&self.conn).context("failed to reload contacts")?;
        if let Screen::Persons(screen) = &mut self.screen {
            screen.set_persons(persons, focus_id);
        } else if matches!(self.screen, Screen::Home(_)) {
            self.screen = Screen::Home(HomeScreen::new(&persons, Local::now().date_naive()));
        }
        Ok(())
    }

    fn load_screen(&self, template: Template) -> Result<Screen> {
        let screen = match template {
            Template::MainLayout => Screen::Empty,
            Template::HomeScreen => {
                let persons = list_persons(&self.conn).context("failed to load contacts")?;
                Screen::Home(HomeScreen::new(&persons, Local::now().date_naive()))
            }
            Template::PersonList => {
                let persons = list_persons(&self.conn).context("failed to load contacts")?;
                Screen::Persons(PersonListScreen::new(persons))
            }
        };
        Ok(screen)
    }

    fn hydrate(&mut self, template: Template) -> Result<()> {
        self.screen = self.load_screen(template)?;
        self.mode = Mode::Normal;
        Ok(())
    }
}

/// Printable characters only, up to `INPUT_MAX_LEN` of them.
fn accepts_input(buffer: &str, ch: char) -> bool {
    !ch.is_control() && buffer.chars().count() < INPUT_MAX_LEN
}

/// Column for a cursor placed after `typed` characters, kept on the last
/// cell of `inner` when the text runs past it.
fn cursor_column(inner: Rect, typed: usize) -> u16 {
    let last = inner.width.saturating_sub(1);
    let offset = u16::try_from(typed).unwrap_or(u16::MAX).min(last);
    inner.x.saturating_add(offset)
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use super::*;
    use crate::db::{ensure_schema, get_person};
    use crate::models::Person;

    fn app() -> App {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        let mut app = App::new(conn);
        app.show_initial(Template::MainLayout.name()).unwrap();
        app.show_view(Template::HomeScreen.name());
        app
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
    }

    #[test]
    fn unknown_initial_view_is_fatal() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        let mut app = App::new(conn);
        assert!(app.show_initial("Nowhere").is_err());
    }

    #[test]
    fn unknown_view_is_reported_and_keeps_current_content() {
        let mut app = app();
        app.handle_key(KeyCode::Char(':')).unwrap();
        type_text(&mut app, "Nowhere");
        app.handle_key(KeyCode::Enter).unwrap();

        assert_eq!(app.status_text(), Some("No view named `Nowhere`"));
        assert_eq!(app.shell().active(), Some(Template::HomeScreen));
    }

    #[test]
    fn command_bar_swaps_the_center() {
        let mut app = app();
        app.handle_key(KeyCode::Char(':')).unwrap();
        type_text(&mut app, "personlist");
        app.handle_key(KeyCode::Enter).unwrap();

        assert_eq!(app.shell().root(), Some(Template::MainLayout));
        assert_eq!(app.shell().active(), Some(Template::PersonList));
        assert!(matches!(app.screen, Screen::Persons(_)));
    }

    #[test]
    fn nested_layout_is_refused() {
        let mut app = app();
        app.show_view("MainLayout");
        assert_eq!(
            app.status_text(),
            Some("`MainLayout` is a layout and cannot be shown inside another view")
        );
        assert!(matches!(app.screen, Screen::Home(_)));
    }

    #[test]
    fn add_form_saves_a_new_contact() {
        let mut app = app();
        app.handle_key(KeyCode::Char('2')).unwrap();
        app.handle_key(KeyCode::Char('+')).unwrap();
        type_text(&mut app, "Boon");
        app.handle_key(KeyCode::Tab).unwrap();
        type_text(&mut app, "Daniel");
        app.handle_key(KeyCode::Tab).unwrap();
        type_text(&mut app, "Dany");
        app.handle_key(KeyCode::Enter).unwrap();

        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.status_text(), Some("Added Daniel Boon (Dany)."));
        let stored = get_person(&app.conn, 1).unwrap();
        assert_eq!(stored, Person::new("Boon", "Daniel", "Dany").with_id(1));
        let Screen::Persons(ref persons) = app.screen else {
            panic!("expected the contact list");
        };
        assert_eq!(persons.current_person(), Some(&stored));
    }

    #[test]
    fn invalid_form_stays_open_with_an_error() {
        let mut app = app();
        app.handle_key(KeyCode::Char('+')).unwrap();
        app.handle_key(KeyCode::Enter).unwrap();

        let Mode::AddingPerson(ref form) = app.mode else {
            panic!("form should stay open");
        };
        assert_eq!(form.error.as_deref(), Some("Last name is required."));
        assert!(list_persons(&app.conn).unwrap().is_empty());
    }

    #[test]
    fn edit_and_delete_flow_through_the_store() {
        let mut app = app();
        add_person(&app.conn, &Person::new("Tom", "King", "Tommy")).unwrap();
        app.handle_key(KeyCode::Char('2')).unwrap();

        app.handle_key(KeyCode::Char('e')).unwrap();
        app.handle_key(KeyCode::Tab).unwrap();
        app.handle_key(KeyCode::Tab).unwrap();
        for _ in 0.."Tommy".len() {
            app.handle_key(KeyCode::Backspace).unwrap();
        }
        type_text(&mut app, "Big Tom");
        app.handle_key(KeyCode::Enter).unwrap();
        assert_eq!(get_person(&app.conn, 1).unwrap().nickname, "Big Tom");

        app.handle_key(KeyCode::Char('-')).unwrap();
        assert!(matches!(app.mode, Mode::ConfirmDelete(_)));
        app.handle_key(KeyCode::Char('y')).unwrap();
        assert!(get_person(&app.conn, 1).unwrap_err().is_not_found());
        assert_eq!(app.status_text(), Some("Deleted King Tom (Big Tom)."));
    }

    #[test]
    fn search_filters_until_cleared() {
        let mut app = app();
        add_person(&app.conn, &Person::new("Tom", "King", "Tommy")).unwrap();
        add_person(&app.conn, &Person::new("Bob", "Dylan", "Bobby")).unwrap();
        app.handle_key(KeyCode::Char('2')).unwrap();

        app.handle_key(KeyCode::Char('f')).unwrap();
        type_text(&mut app, "dyl");
        {
            let Screen::Persons(ref persons) = app.screen else {
                panic!("expected the contact list");
            };
            assert_eq!(persons.filtered.len(), 1);
        }

        app.handle_key(KeyCode::Esc).unwrap();
        let Screen::Persons(ref persons) = app.screen else {
            panic!("expected the contact list");
        };
        assert_eq!(persons.filtered.len(), 2);
    }

    #[test]
    fn command_bar_caps_long_pastes_and_still_draws() {
        let mut app = app();
        app.handle_key(KeyCode::Char(':')).unwrap();
        type_text(&mut app, &"x".repeat(1_000));

        let Mode::Command(ref input) = app.mode else {
            panic!("command bar should stay open");
        };
        assert_eq!(input.chars().count(), INPUT_MAX_LEN);

        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
    }

    #[test]
    fn search_query_is_capped_too() {
        let mut app = app();
        app.handle_key(KeyCode::Char('2')).unwrap();
        app.handle_key(KeyCode::Char('f')).unwrap();
        type_text(&mut app, &"y".repeat(INPUT_MAX_LEN + 10));

        let Mode::Searching(ref query) = app.mode else {
            panic!("search bar should stay open");
        };
        assert_eq!(query.len(), INPUT_MAX_LEN);
    }

    #[test]
    fn cursor_column_stays_inside_the_bar() {
        let inner = Rect::new(1, 1, 38, 1);
        assert_eq!(cursor_column(inner, 5), 6);
        assert_eq!(cursor_column(inner, 70_000), 38);
        assert_eq!(cursor_column(Rect::new(u16::MAX - 2, 0, 2, 1), 10), u16::MAX - 1);
        assert_eq!(cursor_column(Rect::new(3, 0, 0, 1), 10), 3);
    }

    #[test]
    fn quitting_from_any_view() {
        let mut app = app();
        assert!(app.handle_key(KeyCode::Char('q')).unwrap());
    }
}
