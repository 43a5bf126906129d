//! Binary entry point: resolve paths, start logging, open the student database
//! and drive the Ratatui event loop until the user exits.
use anyhow::Context;
use student_records::{logging, run_app, App, Config, StudentStore};
use tracing::{error, info};

/// Returning a `Result` surfaces startup problems (a missing, unreadable or
/// corrupt database file, for instance) on stderr with a non-zero exit code.
fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    if let Some(log_path) = &config.log_path {
        if let Err(err) = logging::init_logging(log_path) {
            eprintln!("warning: logging disabled: {err:#}");
        }
    }
    info!(database = %config.database_path.display(), "starting student records");

    let store = StudentStore::open(&config.database_path)
        .inspect_err(|err| error!(%err, "startup failed"))
        .with_context(|| {
            format!(
                "cannot open student database {}",
                config.database_path.display()
            )
        })?;
    let students = store.read_all()?;
    let grades = store.grades()?;

    let mut app = App::new(store, students, grades);
    run_app(&mut app)
}
