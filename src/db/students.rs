use rusqlite::{params, Row};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::models::{Student, StudentFields};

use super::connection::StudentStore;

/// Shared column list so every query hydrates `Student` the same way.
const STUDENT_COLUMNS: &str = "id, name, age, grade";

fn student_from_row(row: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: row.get(0)?,
        name: row.get(1)?,
        age: row.get(2)?,
        grade: row.get(3)?,
    })
}

impl StudentStore {
    /// Insert a new student and return the id SQLite assigned to it.
    pub fn create(&self, name: &str, age: i64, grade: &str) -> Result<i64> {
        let fields = StudentFields::validate(name, age, grade)?;
        self.conn.execute(
            "INSERT INTO students (name, age, grade) VALUES (?1, ?2, ?3)",
            params![fields.name, fields.age, fields.grade],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!(id, "student created");
        Ok(id)
    }

    /// Every student, oldest id first.
    pub fn read_all(&self) -> Result<Vec<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {STUDENT_COLUMNS} FROM students ORDER BY id"))?;
        let students = stmt
            .query_map([], student_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(students)
    }

    /// Students whose name contains `fragment`, ignoring case. Matching happens
    /// on Unicode-lowercased text because SQLite's `LIKE` only folds ASCII. A
    /// blank fragment matches everyone.
    pub fn search(&self, fragment: &str) -> Result<Vec<Student>> {
        let needle = fragment.trim().to_lowercase();
        let students = self.read_all()?;
        if needle.is_empty() {
            return Ok(students);
        }

        Ok(students
            .into_iter()
            .filter(|student| student.name.to_lowercase().contains(&needle))
            .collect())
    }

    /// Replace every mutable attribute of an existing student in one statement.
    pub fn update(&self, id: i64, name: &str, age: i64, grade: &str) -> Result<()> {
        let fields = StudentFields::validate(name, age, grade)?;
        let updated = self.conn.execute(
            "UPDATE students SET name = ?1, age = ?2, grade = ?3 WHERE id = ?4",
            params![fields.name, fields.age, fields.grade, id],
        )?;

        if updated == 0 {
            Err(StoreError::NotFound(id))
        } else {
            debug!(id, "student updated");
            Ok(())
        }
    }

    /// Permanently remove a student.
    pub fn delete(&self, id: i64) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM students WHERE id = ?1", params![id])?;

        if deleted == 0 {
            Err(StoreError::NotFound(id))
        } else {
            debug!(id, "student deleted");
            Ok(())
        }
    }

    /// Distinct non-blank grade labels for the form's auto-complete. Sorted by
    /// lowercase first, then by the original text so capitalization survives.
    pub fn grades(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT grade FROM students
             WHERE grade <> ''
             ORDER BY LOWER(grade), grade",
        )?;
        let grades = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(grades)
    }
}
