//! Core library surface for the Student Records TUI application.
//!
//! The `bin` target glues these pieces together; the integration tests use the
//! same store API directly.
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod ui;

pub use config::Config;
pub use db::StudentStore;
pub use error::StoreError;
pub use models::{Student, MAX_AGE, MIN_AGE};
pub use ui::{run_app, App};
