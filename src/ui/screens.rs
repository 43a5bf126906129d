use crate::models::Student;

/// Rows currently shown in the main table plus the selection cursor. The rows
/// are a display copy; they are replaced wholesale whenever the store is
/// re-read.
#[derive(Default)]
pub(crate) struct StudentTable {
    pub(crate) students: Vec<Student>,
    /// Name fragment of the search whose results are on screen, if any.
    pub(crate) filter: Option<String>,
    pub(crate) selected: usize,
}

impl StudentTable {
    pub(crate) fn new(students: Vec<Student>) -> Self {
        Self {
            students,
            filter: None,
            selected: 0,
        }
    }

    /// Swap in a fresh full listing, keeping `focus_id` selected if it is
    /// still present.
    pub(crate) fn replace(&mut self, students: Vec<Student>, focus_id: Option<i64>) {
        self.students = students;
        self.filter = None;
        self.focus(focus_id);
    }

    /// Show search results for `query`, selecting the first match.
    pub(crate) fn show_matches(&mut self, students: Vec<Student>, query: &str) {
        self.students = students;
        self.filter = Some(query.to_string());
        self.selected = 0;
    }

    /// Drop a deleted row from the display copy so it disappears even if the
    /// follow-up refresh fails.
    pub(crate) fn remove(&mut self, id: i64) {
        self.students.retain(|student| student.id != id);
        self.ensure_in_bounds();
    }

    fn focus(&mut self, focus_id: Option<i64>) {
        if let Some(idx) =
            focus_id.and_then(|id| self.students.iter().position(|student| student.id == id))
        {
            self.selected = idx;
            return;
        }
        self.ensure_in_bounds();
    }

    pub(crate) fn current(&self) -> Option<&Student> {
        self.students.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.students.is_empty() {
            self.selected = 0;
            return;
        }
        let last = self.students.len() - 1;
        self.selected = self.selected.saturating_add_signed(offset).min(last);
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.students.len().saturating_sub(1);
    }

    fn ensure_in_bounds(&mut self) {
        if self.selected >= self.students.len() {
            self.selected = self.students.len().saturating_sub(1);
        }
    }
}
