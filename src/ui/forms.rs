use anyhow::{anyhow, Context, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::Student;

/// What a form submission does. One form component covers all three dialogs;
/// the mode decides which fields are shown and which store call runs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum FormMode {
    Add,
    Edit(i64),
    Search,
}

/// Fields available within the student form.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub(crate) enum FormField {
    #[default]
    Name,
    Age,
    Grade,
}

const RECORD_FIELDS: &[FormField] = &[FormField::Name, FormField::Age, FormField::Grade];
const SEARCH_FIELDS: &[FormField] = &[FormField::Name];

/// Typed values pulled out of an add/edit form, ready for the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StudentInput {
    pub(crate) name: String,
    pub(crate) age: i64,
    pub(crate) grade: String,
}

/// Form state for adding, editing and searching students, including the
/// grade auto-complete tracking.
#[derive(Clone, Debug)]
pub(crate) struct StudentForm {
    pub(crate) mode: FormMode,
    pub(crate) name: String,
    pub(crate) age: String,
    pub(crate) grade: String,
    pub(crate) active: FormField,
    pub(crate) suggestion: Option<String>,
    pub(crate) autocomplete_disabled: bool,
}

impl StudentForm {
    pub(crate) fn new(mode: FormMode) -> Self {
        Self {
            mode,
            name: String::new(),
            age: String::new(),
            grade: String::new(),
            active: FormField::Name,
            suggestion: None,
            autocomplete_disabled: false,
        }
    }

    /// Populate the form from an existing student when entering edit mode.
    pub(crate) fn edit(student: &Student) -> Self {
        Self {
            name: student.name.clone(),
            age: student.age.to_string(),
            grade: student.grade.clone(),
            ..Self::new(FormMode::Edit(student.id))
        }
    }

    pub(crate) fn title(&self) -> String {
        match self.mode {
            FormMode::Add => "Add Student".to_string(),
            FormMode::Edit(id) => format!("Edit Student #{id}"),
            FormMode::Search => "Search Student".to_string(),
        }
    }

    /// Fields shown for the current mode, in focus order.
    pub(crate) fn fields(&self) -> &'static [FormField] {
        match self.mode {
            FormMode::Search => SEARCH_FIELDS,
            FormMode::Add | FormMode::Edit(_) => RECORD_FIELDS,
        }
    }

    /// Move focus to the next visible field, wrapping around.
    pub(crate) fn next_field(&mut self) {
        self.shift_focus(1);
    }

    /// Move focus to the previous visible field, wrapping around.
    pub(crate) fn previous_field(&mut self) {
        let len = self.fields().len();
        self.shift_focus(len.saturating_sub(1));
    }

    fn shift_focus(&mut self, step: usize) {
        let fields = self.fields();
        let current = fields
            .iter()
            .position(|field| *field == self.active)
            .unwrap_or(0);
        self.active = fields[(current + step) % fields.len()];
        if self.active != FormField::Grade {
            self.suggestion = None;
        }
    }

    /// Append a character to the active field. Age only takes digits.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            FormField::Name => self.name.push(ch),
            FormField::Age => {
                if !ch.is_ascii_digit() {
                    return false;
                }
                self.age.push(ch);
            }
            FormField::Grade => {
                self.autocomplete_disabled = false;
                self.grade.push(ch);
            }
        }
        true
    }

    /// Remove the last character from the active field.
    pub(crate) fn backspace(&mut self) {
        match self.active {
            FormField::Name => {
                self.name.pop();
            }
            FormField::Age => {
                self.age.pop();
            }
            FormField::Grade => {
                self.grade.pop();
                self.autocomplete_disabled = false;
            }
        }
    }

    /// Turn the raw text into typed values. Name and age bounds are left to the
    /// store, which owns those rules; this only rejects what cannot be parsed.
    pub(crate) fn parse_inputs(&self) -> Result<StudentInput> {
        let age_raw = self.age.trim();
        if age_raw.is_empty() {
            return Err(anyhow!("Age is required."));
        }
        let age = age_raw
            .parse::<i64>()
            .context("Age must be a whole number.")?;
        Ok(StudentInput {
            name: self.name.clone(),
            age,
            grade: self.grade.clone(),
        })
    }

    /// The name fragment typed into a search form.
    pub(crate) fn search_query(&self) -> &str {
        self.name.trim()
    }

    /// Update the grade suggestion based on current input.
    pub(crate) fn update_suggestion(&mut self, grades: &[String]) {
        if self.active != FormField::Grade
            || self.autocomplete_disabled
            || self.grade.is_empty()
        {
            self.suggestion = None;
            return;
        }

        let current_lower = self.grade.to_lowercase();
        self.suggestion = grades
            .iter()
            .find(|candidate| candidate.to_lowercase().starts_with(&current_lower))
            .filter(|candidate| candidate.to_lowercase() != current_lower)
            .cloned();
    }

    /// Apply the suggested grade, marking autocomplete as satisfied.
    pub(crate) fn accept_suggestion(&mut self) -> bool {
        if self.suggestion_suffix().is_none() {
            return false;
        }
        match self.suggestion.take() {
            Some(candidate) => {
                self.grade = candidate;
                self.autocomplete_disabled = true;
                true
            }
            None => false,
        }
    }

    /// Dismiss the current suggestion for the rest of this edit.
    pub(crate) fn cancel_autocomplete(&mut self) -> bool {
        if self.has_active_suggestion() {
            self.autocomplete_disabled = true;
            self.suggestion = None;
            return true;
        }
        false
    }

    pub(crate) fn has_active_suggestion(&self) -> bool {
        self.active == FormField::Grade && self.suggestion.is_some()
    }

    /// Remaining characters to show as a ghosted hint after the typed grade.
    pub(crate) fn suggestion_suffix(&self) -> Option<String> {
        let candidate = self.suggestion.as_ref()?;
        let suffix: String = candidate.chars().skip(self.grade.chars().count()).collect();
        if suffix.is_empty() {
            None
        } else {
            Some(suffix)
        }
    }

    pub(crate) fn label(field: FormField) -> &'static str {
        match field {
            FormField::Name => "Name",
            FormField::Age => "Age",
            FormField::Grade => "Grade",
        }
    }

    fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Age => &self.age,
            FormField::Grade => &self.grade,
        }
    }

    /// Render a single line for the form widget, appending the grade hint.
    pub(crate) fn build_line(&self, field: FormField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let placeholder = match (self.mode, field) {
            (FormMode::Search, _) => "<any>",
            (_, FormField::Grade) => "<optional>",
            _ => "<required>",
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        let mut spans = vec![Span::raw(format!("{}: ", Self::label(field)))];
        if value.is_empty() && !is_active {
            spans.push(Span::styled(placeholder, style));
        } else {
            spans.push(Span::styled(value.to_string(), style));
        }
        if field == FormField::Grade && is_active {
            if let Some(suffix) = self.suggestion_suffix() {
                spans.push(Span::styled(suffix, Style::default().fg(Color::DarkGray)));
            }
        }

        Line::from(spans)
    }

    /// Character count for the requested field, used to place the cursor.
    pub(crate) fn value_len(&self, field: FormField) -> usize {
        self.value(field).chars().count()
    }
}

/// State for confirming permanent deletion of a student.
#[derive(Clone, Debug)]
pub(crate) struct ConfirmDelete {
    pub(crate) id: i64,
    pub(crate) name: String,
}

impl From<&Student> for ConfirmDelete {
    fn from(student: &Student) -> Self {
        Self {
            id: student.id,
            name: student.name.clone(),
        }
    }
}
