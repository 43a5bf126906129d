use std::env;
use std::path::PathBuf;

use directories::BaseDirs;

/// SQLite file name, relative to the working directory the app starts in.
const DB_FILE_NAME: &str = "database.db";
/// Environment variable that points the app at a different database file.
const DB_PATH_ENV: &str = "STUDENT_RECORDS_DB";
/// Folder name used beneath the user's home directory for the log file.
const DATA_DIR_NAME: &str = ".student-records";
const LOG_FILE_NAME: &str = "student-records.log";

/// Paths resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_path: PathBuf,
    /// `None` when no home directory can be located; logging is then skipped.
    pub log_path: Option<PathBuf>,
}

impl Config {
    /// Resolve paths from the process environment.
    pub fn from_env() -> Self {
        Self::resolve(env::var_os(DB_PATH_ENV).map(PathBuf::from))
    }

    fn resolve(database_override: Option<PathBuf>) -> Self {
        let database_path = database_override
            .filter(|path| !path.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from(DB_FILE_NAME));
        let log_path = BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(DATA_DIR_NAME).join(LOG_FILE_NAME));

        Self {
            database_path,
            log_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_database_file_in_working_directory() {
        let config = Config::resolve(None);
        assert_eq!(config.database_path, PathBuf::from("database.db"));
    }

    #[test]
    fn override_replaces_database_path() {
        let config = Config::resolve(Some(PathBuf::from("/tmp/school.db")));
        assert_eq!(config.database_path, PathBuf::from("/tmp/school.db"));
    }

    #[test]
    fn empty_override_is_ignored() {
        let config = Config::resolve(Some(PathBuf::new()));
        assert_eq!(config.database_path, PathBuf::from("database.db"));
    }

    #[test]
    fn log_file_lives_in_data_directory() {
        if let Some(path) = Config::resolve(None).log_path {
            assert!(path.ends_with(".student-records/student-records.log"));
        }
    }
}
