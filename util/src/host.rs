//! Host platform utility functions

use std::env;
use std::path::PathBuf;

/// Name of the environment variable pointing at the tools root directory.
pub const TOOLS_ROOT_ENV: &str = "TRAJ_TOOLS_ROOT";

/// Get the root directory of the tools, which holds the `params` and `sessions` directories.
///
/// This is the value of `TRAJ_TOOLS_ROOT` if it is set, otherwise the current working
/// directory.
pub fn get_tools_root() -> std::io::Result<PathBuf> {
    match env::var_os(TOOLS_ROOT_ENV) {
        Some(root) if !root.is_empty() => Ok(PathBuf::from(root)),
        _ => env::current_dir(),
    }
}
