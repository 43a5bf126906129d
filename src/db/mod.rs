//! Persistence layer split across logical submodules: connection bootstrap and
//! the student CRUD queries.

mod connection;
mod students;

pub use connection::StudentStore;
