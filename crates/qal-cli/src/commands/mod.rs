pub mod history;
pub mod init_db;
pub mod seed;
pub mod serve;

use qal_config::QalConfig;

use crate::cli::GlobalFlags;

/// Resolve the database path with precedence: `--db` flag over config.
pub fn db_path<'a>(flags: &'a GlobalFlags, config: &'a QalConfig) -> &'a str {
    flags.db.as_deref().unwrap_or(&config.database.path)
}
