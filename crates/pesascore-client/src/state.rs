//! Where the ledger lives and how connections to it are opened.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{Connection, Error as SqliteError, ffi::ErrorCode};
use tracing::debug;

use crate::{ClientError, ClientResult};

/// Overrides the ledger directory when set.
pub const HOME_ENV_VAR: &str = "PESASCORE_HOME";

const DEFAULT_DIR_NAME: &str = ".pesascore";
const LEDGER_FILE_NAME: &str = "ledger.db";
const BUSY_TIMEOUT: Duration = Duration::from_millis(250);

/// Resolves the ledger directory: explicit override, then `PESASCORE_HOME`,
/// then `~/.pesascore`. Relative paths are anchored at the working directory.
pub fn resolve_ledger_home(home_override: Option<&Path>) -> ClientResult<PathBuf> {
    let chosen = match home_override {
        Some(path) => path.to_path_buf(),
        None => home_from_env(std::env::var_os(HOME_ENV_VAR))?,
    };
    if chosen.is_absolute() {
        return Ok(chosen);
    }

    let cwd = std::env::current_dir()
        .map_err(|error| ClientError::ledger_init_failed(&chosen, &error.to_string()))?;
    Ok(cwd.join(chosen))
}

fn home_from_env(env_value: Option<OsString>) -> ClientResult<PathBuf> {
    if let Some(value) = env_value.filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(value));
    }
    home::home_dir()
        .map(|home_dir| home_dir.join(DEFAULT_DIR_NAME))
        .ok_or_else(|| {
            ClientError::ledger_init_failed(
                Path::new("."),
                "No home directory found. Set PESASCORE_HOME to choose where the ledger lives.",
            )
        })
}

pub fn ensure_ledger_directory(path: &Path) -> ClientResult<()> {
    fs::create_dir_all(path).map_err(|error| map_io_error(path, &error))?;
    restrict_to_owner(path);
    Ok(())
}

pub fn ledger_db_path(home: &Path) -> PathBuf {
    home.join(LEDGER_FILE_NAME)
}

pub fn open_connection(db_path: &Path) -> ClientResult<Connection> {
    debug!(path = %db_path.display(), "opening ledger connection");
    Connection::open(db_path)
        .and_then(|connection| {
            connection.busy_timeout(BUSY_TIMEOUT)?;
            Ok(connection)
        })
        .map_err(|error| map_sqlite_error(db_path, &error))
}

pub fn map_io_error(path: &Path, error: &io::Error) -> ClientError {
    match error.kind() {
        io::ErrorKind::PermissionDenied => {
            ClientError::ledger_init_permission_denied(path, &error.to_string())
        }
        _ => ClientError::ledger_init_failed(path, &error.to_string()),
    }
}

/// Maps SQLite failures onto the ledger error codes callers branch on.
pub fn map_sqlite_error(path: &Path, error: &SqliteError) -> ClientError {
    match error.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) => ClientError::ledger_locked(path),
        Some(ErrorCode::NotADatabase | ErrorCode::DatabaseCorrupt) => {
            ClientError::ledger_corrupt(path)
        }
        Some(ErrorCode::CannotOpen | ErrorCode::ReadOnly | ErrorCode::PermissionDenied) => {
            ClientError::ledger_init_permission_denied(path, &error.to_string())
        }
        _ => ClientError::ledger_init_failed(path, &error.to_string()),
    }
}

#[cfg(unix)]
fn restrict_to_owner(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    // Best effort: a shared or read-only mount keeps its own mode.
    if let Err(error) = fs::set_permissions(path, fs::Permissions::from_mode(0o700)) {
        debug!(path = %path.display(), %error, "could not restrict ledger directory");
    }
}

#[cfg(not(unix))]
fn restrict_to_owner(_path: &Path) {}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;
    use std::io;
    use std::path::Path;

    use super::{home_from_env, ledger_db_path, map_io_error, resolve_ledger_home};

    #[test]
    fn explicit_override_wins_and_is_absolute() {
        let resolved = resolve_ledger_home(Some(Path::new("relative-home")));
        assert!(resolved.is_ok());
        if let Ok(path) = resolved {
            assert!(path.is_absolute());
            assert!(path.ends_with("relative-home"));
            assert!(ledger_db_path(&path).ends_with("relative-home/ledger.db"));
        }
    }

    #[test]
    fn env_value_is_used_unless_blank() {
        let from_env = home_from_env(Some(OsString::from("/tmp/pesa-env-home")));
        assert!(from_env.is_ok());
        if let Ok(path) = from_env {
            assert_eq!(path, Path::new("/tmp/pesa-env-home"));
        }

        let blank = home_from_env(Some(OsString::new()));
        if let Ok(path) = blank {
            assert!(path.ends_with(".pesascore"));
        }
    }

    #[test]
    fn permission_errors_keep_their_own_code() {
        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        assert_eq!(
            map_io_error(Path::new("/ledger"), &denied).code,
            "ledger_init_permission_denied"
        );

        let other = io::Error::other("disk full");
        assert_eq!(map_io_error(Path::new("/ledger"), &other).code, "ledger_init_failed");
    }
}
