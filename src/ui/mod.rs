//! Ratatui front-end: the student table, the menu line, and the modal dialogs
//! layered on top of it.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
