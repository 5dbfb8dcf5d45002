//! Path resolution for VlogForge data files.
//!
//! Follows the XDG base directory layout: `$XDG_DATA_HOME/vlogforge`, or
//! `$HOME/.local/share/vlogforge` when `XDG_DATA_HOME` is unset.

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "vlogforge";
const DB_FILE: &str = "vlogforge.db";

/// Data directory for VlogForge.
///
/// Falls back to a relative `.vlogforge` directory when neither
/// `XDG_DATA_HOME` nor `HOME` is set.
pub fn data_dir() -> PathBuf {
    let data_home = env::var_os("XDG_DATA_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            env::var_os("HOME")
                .filter(|v| !v.is_empty())
                .map(|home| PathBuf::from(home).join(".local/share"))
        });

    match data_home {
        Some(base) => base.join(APP_DIR),
        None => PathBuf::from(format!(".{}", APP_DIR)),
    }
}

/// Default database file path (`data_dir/vlogforge.db`).
pub fn default_db_path() -> PathBuf {
    data_dir().join(DB_FILE)
}
