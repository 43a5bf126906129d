//! Domain model that mirrors the `students` table and gets passed throughout
//! the TUI. The type stays a light-weight data holder so the store can focus on
//! persistence and the UI on presentation.

use std::fmt;

use crate::error::{Result, StoreError};

/// Youngest age accepted for a student record.
pub const MIN_AGE: i64 = 1;
/// Oldest age accepted for a student record.
pub const MAX_AGE: i64 = 150;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A single student row. The UI only ever holds copies of these; the store is
/// the source of truth and the table is re-read after every mutation.
pub struct Student {
    /// Primary key assigned by SQLite. Never reused, never edited.
    pub id: i64,
    pub name: String,
    pub age: i64,
    /// Grade or class label. Free text, may be blank.
    pub grade: String,
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.id, self.name)
    }
}

/// Validated, normalized attributes for an insert or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StudentFields {
    pub(crate) name: String,
    pub(crate) age: i64,
    pub(crate) grade: String,
}

impl StudentFields {
    /// Trim the text inputs and check the name and age constraints.
    pub(crate) fn validate(name: &str, age: i64, grade: &str) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::Validation("Name is required.".to_string()));
        }
        if !(MIN_AGE..=MAX_AGE).contains(&age) {
            return Err(StoreError::Validation(format!(
                "Age must be between {MIN_AGE} and {MAX_AGE}."
            )));
        }
        Ok(Self {
            name: name.to_string(),
            age,
            grade: grade.trim().to_string(),
        })
    }
}
