//! Moving artifacts between session directories.

use std::fs;
use std::io;
use std::path::Path;

/// Move `src` to `dst`, replacing any stale file at `dst`.
///
/// Falls back to copy + remove when a rename is not possible
/// (e.g. the results root is on another filesystem).
pub fn relocate_file(src: &Path, dst: &Path) -> io::Result<()> {
    prepare_destination(dst)?;

    if fs::rename(src, dst).is_ok() {
        return Ok(());
    }

    fs::copy(src, dst)?;
    fs::remove_file(src)?;
    Ok(())
}

/// Copy `src` to `dst`, replacing any stale file at `dst`.
///
/// Used for caller-owned inputs that must stay where they are.
pub fn replace_copy(src: &Path, dst: &Path) -> io::Result<()> {
    prepare_destination(dst)?;
    fs::copy(src, dst)?;
    Ok(())
}

fn prepare_destination(dst: &Path) -> io::Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }
    if dst.is_file() {
        fs::remove_file(dst)?;
    }
    Ok(())
}
