use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;
use tracing::{info, warn};

use crate::db::StudentStore;
use crate::models::Student;

use super::forms::{ConfirmDelete, FormMode, StudentForm};
use super::helpers::{centered_rect, key_hint, surface_error};
use super::screens::StudentTable;

/// Height of the menu line at the top of the window.
const MENU_HEIGHT: u16 = 1;
/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows skipped by PageUp/PageDown.
const PAGE_STEP: isize = 10;
const APP_NAME: &str = "Student Management System";

/// Modal state layered over the main table.
enum Mode {
    Normal,
    Form(StudentForm),
    ConfirmDelete(ConfirmDelete),
    /// A failed operation. Dismissing it goes back to `resume` so the user can
    /// fix the input and resubmit.
    Error {
        message: String,
        resume: Box<Mode>,
    },
    About,
}

/// A mutation the store accepted. The table still has to be refreshed.
struct Applied {
    focus_id: Option<i64>,
    message: String,
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

/// Central application state shared across the TUI.
pub struct App {
    store: StudentStore,
    table: StudentTable,
    grades: Vec<String>,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(store: StudentStore, students: Vec<Student>, grades: Vec<String>) -> Self {
        Self {
            store,
            table: StudentTable::new(students),
            grades,
            mode: Mode::Normal,
            status: None,
        }
    }

    /// Feed one key press through the active mode. Returns `true` when the
    /// user asked to quit. Store failures never bubble out of here; they end up
    /// in an error dialog instead.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::Form(form) => self.handle_form(code, form),
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm),
            Mode::Error { message, resume } => match code {
                KeyCode::Enter | KeyCode::Esc => *resume,
                _ => Mode::Error { message, resume },
            },
            Mode::About => Mode::Normal,
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Esc => {
                if self.table.filter.is_some() {
                    return self.clear_search();
                }
                *exit = true;
            }
            KeyCode::Up => self.table.move_selection(-1),
            KeyCode::Down => self.table.move_selection(1),
            KeyCode::PageUp => self.table.move_selection(-PAGE_STEP),
            KeyCode::PageDown => self.table.move_selection(PAGE_STEP),
            KeyCode::Home => self.table.select_first(),
            KeyCode::End => self.table.select_last(),
            KeyCode::Char('a') => {
                self.clear_status();
                return Mode::Form(StudentForm::new(FormMode::Add));
            }
            KeyCode::Char('/') | KeyCode::Char('s') => {
                self.clear_status();
                return Mode::Form(StudentForm::new(FormMode::Search));
            }
            KeyCode::Char('e') | KeyCode::Enter => match self.table.current() {
                Some(student) => return Mode::Form(StudentForm::edit(student)),
                None => self.set_status("No student selected.", StatusKind::Error),
            },
            KeyCode::Char('d') | KeyCode::Delete => match self.table.current() {
                Some(student) => return Mode::ConfirmDelete(ConfirmDelete::from(student)),
                None => self.set_status("No student selected.", StatusKind::Error),
            },
            KeyCode::Char('?') => return Mode::About,
            _ => {}
        }
        Mode::Normal
    }

    fn handle_form(&mut self, code: KeyCode, mut form: StudentForm) -> Mode {
        match code {
            KeyCode::Esc => {
                if !form.cancel_autocomplete() {
                    let action = match form.mode {
                        FormMode::Add => "Add",
                        FormMode::Edit(_) => "Edit",
                        FormMode::Search => "Search",
                    };
                    self.set_status(format!("{action} cancelled."), StatusKind::Info);
                    return Mode::Normal;
                }
            }
            KeyCode::Tab => {
                let consumed = form.has_active_suggestion() && form.accept_suggestion();
                if !consumed {
                    form.next_field();
                }
                form.update_suggestion(&self.grades);
            }
            KeyCode::BackTab => {
                form.previous_field();
                form.update_suggestion(&self.grades);
            }
            KeyCode::Backspace => {
                form.backspace();
                form.update_suggestion(&self.grades);
            }
            KeyCode::Enter => {
                return match self.submit_form(&form) {
                    Ok(Some(applied)) => self.refresh_after(applied),
                    Ok(None) => Mode::Normal,
                    Err(err) => self.error_dialog(&err, Mode::Form(form)),
                };
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.update_suggestion(&self.grades);
                }
            }
            _ => {}
        }
        Mode::Form(form)
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmDelete) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.store.delete(confirm.id) {
                    Ok(()) => {
                        info!(id = confirm.id, "deleted student");
                        self.table.remove(confirm.id);
                        self.refresh_after(Applied {
                            focus_id: None,
                            message: format!("Deleted student #{} ({}).", confirm.id, confirm.name),
                        })
                    }
                    Err(err) => self.error_dialog(&anyhow::Error::from(err), Mode::Normal),
                }
            }
            _ => Mode::ConfirmDelete(confirm),
        }
    }

    /// Run the single store call that matches the form's mode. An error here
    /// means nothing was written, so the form can be resubmitted as is.
    fn submit_form(&mut self, form: &StudentForm) -> Result<Option<Applied>> {
        match form.mode {
            FormMode::Add => {
                let input = form.parse_inputs()?;
                let id = self.store.create(&input.name, input.age, &input.grade)?;
                info!(id, "added student");
                Ok(Some(Applied {
                    focus_id: Some(id),
                    message: format!("Added student #{id}."),
                }))
            }
            FormMode::Edit(id) => {
                let input = form.parse_inputs()?;
                self.store.update(id, &input.name, input.age, &input.grade)?;
                info!(id, "updated student");
                Ok(Some(Applied {
                    focus_id: Some(id),
                    message: format!("Updated student #{id}."),
                }))
            }
            FormMode::Search => {
                self.run_search(form.search_query())?;
                Ok(None)
            }
        }
    }

    /// Re-read the table after a saved mutation. The change is already on
    /// disk, so a failed refresh never sends the user back to the form.
    fn refresh_after(&mut self, applied: Applied) -> Mode {
        match self.reload(applied.focus_id) {
            Ok(()) => {
                self.set_status(applied.message, StatusKind::Info);
                Mode::Normal
            }
            Err(err) => {
                let message = format!(
                    "{} The table could not be refreshed: {}",
                    applied.message,
                    surface_error(&err)
                );
                self.message_dialog(message, Mode::Normal)
            }
        }
    }

    fn run_search(&mut self, query: &str) -> Result<()> {
        let matches = self.store.search(query)?;
        if query.is_empty() {
            self.table.replace(matches, None);
            self.clear_status();
        } else if matches.is_empty() {
            if self.table.filter.is_some() {
                let students = self.store.read_all()?;
                self.table.replace(students, None);
            }
            self.set_status(format!("No students match \"{query}\"."), StatusKind::Info);
        } else {
            let count = matches.len();
            self.table.show_matches(matches, query);
            let noun = if count == 1 { "student" } else { "students" };
            self.set_status(
                format!("Found {count} {noun} matching \"{query}\"."),
                StatusKind::Info,
            );
        }
        Ok(())
    }

    fn clear_search(&mut self) -> Mode {
        match self.reload(None) {
            Ok(()) => {
                self.set_status("Showing all students.", StatusKind::Info);
                Mode::Normal
            }
            Err(err) => self.error_dialog(&err, Mode::Normal),
        }
    }

    /// Re-read the whole table after a mutation so the view never drifts from
    /// what is on disk.
    fn reload(&mut self, focus_id: Option<i64>) -> Result<()> {
        let students = self.store.read_all()?;
        self.grades = self.store.grades()?;
        self.table.replace(students, focus_id);
        Ok(())
    }

    fn error_dialog(&mut self, err: &anyhow::Error, resume: Mode) -> Mode {
        self.message_dialog(surface_error(err), resume)
    }

    fn message_dialog(&mut self, message: String, resume: Mode) -> Mode {
        warn!(error = %message, "operation failed");
        self.set_status(message.clone(), StatusKind::Error);
        Mode::Error {
            message,
            resume: Box::new(resume),
        }
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

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(MENU_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_menu(frame, chunks[0]);
        self.draw_table(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::Normal => {}
            Mode::Form(form) => self.draw_form(frame, area, form),
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Error { message, .. } => self.draw_error(frame, area, message),
            Mode::About => self.draw_about(frame, area),
        }
    }

    fn draw_menu(&self, frame: &mut Frame, area: Rect) {
        let section = Style::default().add_modifier(Modifier::BOLD);
        let mut spans = vec![Span::styled("File ", section)];
        spans.extend(key_hint("[a]", " Add Student   "));
        spans.push(Span::styled("Edit ", section));
        spans.extend(key_hint("[e]", " Edit  "));
        spans.extend(key_hint("[d]", " Delete  "));
        spans.extend(key_hint("[/]", " Search   "));
        spans.push(Span::styled("Help ", section));
        spans.extend(key_hint("[?]", " About"));
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn draw_table(&self, frame: &mut Frame, area: Rect) {
        let title = match &self.table.filter {
            Some(query) => format!(
                " {APP_NAME} ({} matching \"{query}\") ",
                self.table.students.len()
            ),
            None => format!(" {APP_NAME} ({} students) ", self.table.students.len()),
        };
        let block = Block::default().title(title).borders(Borders::ALL);

        if self.table.students.is_empty() {
            let empty = Paragraph::new(Line::from(Span::styled(
                "No students yet. Press [a] to add one.",
                Style::default().fg(Color::DarkGray),
            )))
            .alignment(Alignment::Center)
            .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let header = Row::new(["Id", "Name", "Age", "Grade"])
            .style(Style::default().add_modifier(Modifier::BOLD));
        let rows = self.table.students.iter().map(|student| {
            Row::new([
                Cell::from(student.id.to_string()),
                Cell::from(student.name.clone()),
                Cell::from(student.age.to_string()),
                Cell::from(student.grade.clone()),
            ])
        });
        let widths = [
            Constraint::Length(6),
            Constraint::Min(16),
            Constraint::Length(5),
            Constraint::Min(10),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .highlight_symbol("> ");

        let mut state = TableState::default().with_selected(Some(self.table.selected));
        frame.render_stateful_widget(table, area, &mut state);
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
        let mut spans = Vec::new();
        match &self.mode {
            Mode::Form(_) => {
                spans.extend(key_hint("[Enter]", " Submit   "));
                spans.extend(key_hint("[Tab]", " Accept/Switch   "));
                spans.extend(key_hint("[Esc]", " Cancel"));
            }
            Mode::ConfirmDelete(_) => {
                spans.extend(key_hint("[Y]", " Delete   "));
                spans.extend(key_hint("[N/Esc]", " Keep"));
            }
            Mode::Error { .. } | Mode::About => {
                spans.extend(key_hint("[Enter/Esc]", " Close"));
            }
            Mode::Normal => {
                spans.extend(key_hint("[↑↓]", " Navigate   "));
                if self.table.filter.is_some() {
                    spans.extend(key_hint("[Esc]", " Show All   "));
                }
                spans.extend(key_hint("[q]", " Quit"));
            }
        }
        Line::from(spans)
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect, form: &StudentForm) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(form.title()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let fields = form.fields();
        let mut lines: Vec<Line> = fields.iter().map(|field| form.build_line(*field)).collect();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Enter to submit • Tab to accept/switch • Esc to cancel",
            Style::default().fg(Color::Gray),
        )));

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        if let Some(row) = fields.iter().position(|field| *field == form.active) {
            let offset = StudentForm::label(form.active).len() + 2 + form.value_len(form.active);
            let offset = u16::try_from(offset)
                .unwrap_or(u16::MAX)
                .min(inner.width.saturating_sub(1));
            let row = u16::try_from(row).unwrap_or(u16::MAX);
            frame.set_cursor_position((inner.x + offset, inner.y.saturating_add(row)));
        }
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Deletion")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!(
                "Delete student #{} ({})?",
                confirm.id, confirm.name
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

    fn draw_error(&self, frame: &mut Frame, area: Rect, message: &str) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Error")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red));
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(Span::styled(
                message.to_string(),
                Style::default().fg(Color::Red),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press Enter or Esc to go back.",
                Style::default().fg(Color::Gray),
            )),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
    }

    fn draw_about(&self, frame: &mut Frame, area: Rect) {
        let popup_area = centered_rect(50, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("About").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(Span::styled(
                APP_NAME,
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(format!("Version {}", env!("CARGO_PKG_VERSION"))),
            Line::from(""),
            Line::from("Add, edit, search and delete student records."),
        ];
        frame.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            inner,
        );
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use rusqlite::Connection;
    use tempfile::TempDir;

    use super::*;

    /// File-backed app plus a second connection for writing rows the store
    /// itself would never produce.
    fn app_on_disk(dir: &TempDir, students: &[(&str, i64, &str)]) -> (App, Connection) {
        let path = dir.path().join("database.db");
        fs::File::create(&path).unwrap();
        let store = StudentStore::open(&path).unwrap();
        for (name, age, grade) in students {
            store.create(name, *age, grade).unwrap();
        }
        let rows = store.read_all().unwrap();
        let raw = Connection::open(&path).unwrap();
        (App::new(store, rows, Vec::new()), raw)
    }

    /// A row whose age is text, so every later full read fails.
    fn insert_unreadable_row(raw: &Connection) {
        raw.execute(
            "INSERT INTO students (name, age, grade) VALUES ('Broken', 'abc', '')",
            [],
        )
        .unwrap();
    }

    fn count_named(raw: &Connection, name: &str) -> i64 {
        raw.query_row(
            "SELECT COUNT(*) FROM students WHERE name = ?1",
            [name],
            |row| row.get(0),
        )
        .unwrap()
    }

    fn app_with(students: &[(&str, i64, &str)]) -> App {
        let store = StudentStore::open_in_memory().unwrap();
        for (name, age, grade) in students {
            store.create(name, *age, grade).unwrap();
        }
        let rows = store.read_all().unwrap();
        let grades = store.grades().unwrap();
        App::new(store, rows, grades)
    }

    fn press(app: &mut App, keys: &[KeyCode]) {
        for key in keys {
            app.handle_key(*key).unwrap();
        }
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn add_form_creates_student_and_refreshes_table() {
        let mut app = app_with(&[]);
        press(&mut app, &[KeyCode::Char('a')]);
        type_text(&mut app, "Alice");
        press(&mut app, &[KeyCode::Tab]);
        type_text(&mut app, "20");
        press(&mut app, &[KeyCode::Tab]);
        type_text(&mut app, "A");
        press(&mut app, &[KeyCode::Enter]);

        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.table.students.len(), 1);
        let alice = &app.table.students[0];
        assert_eq!((alice.name.as_str(), alice.age, alice.grade.as_str()), ("Alice", 20, "A"));
        assert_eq!(app.grades, vec!["A".to_string()]);
    }

    #[test]
    fn validation_error_opens_dialog_and_returns_to_form() {
        let mut app = app_with(&[]);
        press(&mut app, &[KeyCode::Char('a'), KeyCode::Tab]);
        type_text(&mut app, "20");
        press(&mut app, &[KeyCode::Enter]);

        match &app.mode {
            Mode::Error { message, .. } => assert_eq!(message, "Name is required."),
            _ => panic!("expected error dialog"),
        }

        press(&mut app, &[KeyCode::Esc]);
        match &app.mode {
            Mode::Form(form) => assert_eq!(form.age, "20"),
            _ => panic!("expected the add form to come back"),
        }
        assert!(app.store.read_all().unwrap().is_empty());
    }

    #[test]
    fn out_of_range_age_is_rejected() {
        let mut app = app_with(&[]);
        press(&mut app, &[KeyCode::Char('a')]);
        type_text(&mut app, "Old");
        press(&mut app, &[KeyCode::Tab]);
        type_text(&mut app, "151");
        press(&mut app, &[KeyCode::Enter]);

        assert!(matches!(app.mode, Mode::Error { .. }));
        assert!(app.store.read_all().unwrap().is_empty());
    }

    #[test]
    fn edit_form_updates_selected_student() {
        let mut app = app_with(&[("Alice", 20, "A"), ("Bob", 21, "B")]);
        press(&mut app, &[KeyCode::Down, KeyCode::Char('e')]);
        // Clear the prefilled name and retype it.
        press(&mut app, &[KeyCode::Backspace; 3]);
        type_text(&mut app, "Robert");
        press(&mut app, &[KeyCode::Enter]);

        assert!(matches!(app.mode, Mode::Normal));
        let bob = app.table.current().unwrap();
        assert_eq!((bob.id, bob.name.as_str()), (2, "Robert"));
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut app = app_with(&[("Alice", 20, "A"), ("Bob", 21, "B")]);
        press(&mut app, &[KeyCode::Char('d'), KeyCode::Char('n')]);
        assert_eq!(app.table.students.len(), 2);

        press(&mut app, &[KeyCode::Char('d'), KeyCode::Char('y')]);
        assert!(matches!(app.mode, Mode::Normal));
        let ids: Vec<i64> = app.table.students.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn deleting_a_vanished_student_shows_not_found() {
        let mut app = app_with(&[("Alice", 20, "A")]);
        app.store.delete(1).unwrap();
        press(&mut app, &[KeyCode::Char('d'), KeyCode::Char('y')]);

        match &app.mode {
            Mode::Error { message, .. } => assert_eq!(message, "Student #1 not found."),
            _ => panic!("expected error dialog"),
        }
        press(&mut app, &[KeyCode::Enter]);
        assert!(matches!(app.mode, Mode::Normal));
    }

    #[test]
    fn search_filters_table_and_escape_restores_it() {
        let mut app = app_with(&[("Alice", 20, "A"), ("Bob", 21, "B"), ("Malik", 22, "A")]);
        press(&mut app, &[KeyCode::Char('/')]);
        type_text(&mut app, "ALI");
        press(&mut app, &[KeyCode::Enter]);

        let names: Vec<&str> = app.table.students.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Malik"]);
        assert_eq!(app.table.filter.as_deref(), Some("ALI"));

        assert!(!app.handle_key(KeyCode::Esc).unwrap());
        assert!(app.table.filter.is_none());
        assert_eq!(app.table.students.len(), 3);
    }

    #[test]
    fn search_without_matches_keeps_full_list() {
        let mut app = app_with(&[("Alice", 20, "A")]);
        press(&mut app, &[KeyCode::Char('/')]);
        type_text(&mut app, "zed");
        press(&mut app, &[KeyCode::Enter]);

        assert!(matches!(app.mode, Mode::Normal));
        assert!(app.table.filter.is_none());
        assert_eq!(app.table.students.len(), 1);
        assert_eq!(
            app.status.as_ref().map(|s| s.text.as_str()),
            Some("No students match \"zed\".")
        );
    }

    #[test]
    fn grade_autocomplete_accepts_with_tab() {
        let mut app = app_with(&[("Alice", 20, "Physics")]);
        press(&mut app, &[KeyCode::Char('a')]);
        type_text(&mut app, "Bob");
        press(&mut app, &[KeyCode::Tab]);
        type_text(&mut app, "30");
        press(&mut app, &[KeyCode::Tab]);
        type_text(&mut app, "ph");
        press(&mut app, &[KeyCode::Tab, KeyCode::Enter]);

        let bob = app.table.current().unwrap();
        assert_eq!(bob.grade, "Physics");
    }

    #[test]
    fn quit_keys_exit() {
        let mut app = app_with(&[]);
        assert!(app.handle_key(KeyCode::Char('q')).unwrap());
        assert!(app.handle_key(KeyCode::Esc).unwrap());
    }

    #[test]
    fn saved_student_is_not_resubmitted_when_refresh_fails() {
        let dir = TempDir::new().unwrap();
        let (mut app, raw) = app_on_disk(&dir, &[]);
        insert_unreadable_row(&raw);

        press(&mut app, &[KeyCode::Char('a')]);
        type_text(&mut app, "Alice");
        press(&mut app, &[KeyCode::Tab]);
        type_text(&mut app, "20");
        press(&mut app, &[KeyCode::Enter]);

        match &app.mode {
            Mode::Error { message, resume } => {
                assert!(message.starts_with("Added student #"));
                assert!(matches!(**resume, Mode::Normal));
            }
            _ => panic!("expected refresh error dialog"),
        }

        press(&mut app, &[KeyCode::Enter, KeyCode::Enter]);
        assert!(!matches!(app.mode, Mode::Form(_)));
        assert_eq!(count_named(&raw, "Alice"), 1);
    }

    #[test]
    fn deleted_row_leaves_table_when_refresh_fails() {
        let dir = TempDir::new().unwrap();
        let (mut app, raw) = app_on_disk(&dir, &[("Alice", 20, "A")]);
        insert_unreadable_row(&raw);

        press(&mut app, &[KeyCode::Char('d'), KeyCode::Char('y')]);
        assert!(matches!(app.mode, Mode::Error { .. }));
        assert!(app.table.students.is_empty());
        assert_eq!(count_named(&raw, "Alice"), 0);

        press(&mut app, &[KeyCode::Esc]);
        assert!(matches!(app.mode, Mode::Normal));
    }

    #[test]
    fn storage_error_opens_dialog_without_exiting() {
        let dir = TempDir::new().unwrap();
        let (mut app, raw) = app_on_disk(&dir, &[("Alice", 20, "A")]);
        insert_unreadable_row(&raw);

        press(&mut app, &[KeyCode::Char('/')]);
        type_text(&mut app, "ali");
        assert!(!app.handle_key(KeyCode::Enter).unwrap());

        match &app.mode {
            Mode::Error { message, .. } => assert!(message.starts_with("Storage error:")),
            _ => panic!("expected storage error dialog"),
        }
        assert!(!app.handle_key(KeyCode::Enter).unwrap());
        assert!(matches!(app.mode, Mode::Form(_)));
    }

    #[test]
    fn unmatched_search_after_filter_restores_full_list() {
        let mut app = app_with(&[("Alice", 20, "A"), ("Bob", 21, "B")]);
        press(&mut app, &[KeyCode::Char('/')]);
        type_text(&mut app, "bo");
        press(&mut app, &[KeyCode::Enter]);
        assert_eq!(app.table.students.len(), 1);

        press(&mut app, &[KeyCode::Char('/')]);
        type_text(&mut app, "zed");
        press(&mut app, &[KeyCode::Enter]);
        assert!(app.table.filter.is_none());
        assert_eq!(app.table.students.len(), 2);
    }

    #[test]
    fn form_cursor_stays_inside_popup_for_long_names() {
        let mut app = app_with(&[]);
        let mut form = StudentForm::new(FormMode::Add);
        form.name = "x".repeat(300);
        app.mode = Mode::Form(form);

        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        let cursor = terminal.get_cursor_position().unwrap();
        assert!(cursor.x < 80);
    }

    #[test]
    fn renders_table_rows_and_menu() {
        let app = app_with(&[("Alice", 20, "A"), ("Bob", 21, "B")]);
        let screen = render(&app);
        assert!(screen.contains("Add Student"));
        assert!(screen.contains("Grade"));
        assert!(screen.contains("Alice"));
        assert!(screen.contains("Bob"));
    }

    #[test]
    fn renders_error_dialog() {
        let mut app = app_with(&[]);
        press(&mut app, &[KeyCode::Char('a'), KeyCode::Enter]);
        let screen = render(&app);
        assert!(screen.contains("Age is required."));
    }
}
