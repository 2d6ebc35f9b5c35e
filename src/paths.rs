//! Default locations for the board database.

use std::path::Path;

use anyhow::{Context, Result};

/// Resolve the board database path.
/// An explicit path wins; otherwise `$HOME/.zenkanban/zenkanban.db`.
pub fn db_path(explicit: Option<String>) -> Result<String> {
    if let Some(p) = explicit {
        return Ok(p);
    }
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(format!("{home}/.zenkanban/zenkanban.db"))
}

pub fn ensure_parent_dir(path: &str) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }
    Ok(())
}
