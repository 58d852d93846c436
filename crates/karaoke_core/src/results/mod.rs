//! Result archiving.
//!
//! A finished session's results directory is handed out as a single
//! zip archive containing every file in it, named relative to the
//! directory.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Failure while building a results archive.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Results directory not found: {0}")]
    NotFound(PathBuf),

    #[error("I/O error while archiving {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl ArchiveError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Archive file name for a session.
pub fn archive_name(session_id: &str) -> String {
    format!("{}_karaoke.zip", session_id)
}

/// Zip every file under `results_dir` into `zip_path`.
///
/// Entries are stored Deflate-compressed under their path relative to
/// `results_dir`, sorted by name. An existing archive is replaced.
pub fn archive_results(results_dir: &Path, zip_path: &Path) -> Result<PathBuf, ArchiveError> {
    if !results_dir.is_dir() {
        return Err(ArchiveError::NotFound(results_dir.to_path_buf()));
    }

    let mut files = Vec::new();
    collect_files(results_dir, &mut files)?;
    files.sort();

    if let Some(parent) = zip_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| ArchiveError::io(parent, e))?;
        }
    }
    if zip_path.exists() {
        fs::remove_file(zip_path).map_err(|e| ArchiveError::io(zip_path, e))?;
    }

    let file = File::create(zip_path).map_err(|e| ArchiveError::io(zip_path, e))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in &files {
        // The archive may live inside the directory being zipped
        if path == zip_path {
            continue;
        }
        let name = entry_name(results_dir, path);
        let data = fs::read(path).map_err(|e| ArchiveError::io(path, e))?;
        zip.start_file(name, options)?;
        zip.write_all(&data).map_err(|e| ArchiveError::io(zip_path, e))?;
    }

    zip.finish()?;
    tracing::debug!("Archived {} files into {}", files.len(), zip_path.display());
    Ok(zip_path.to_path_buf())
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), ArchiveError> {
    let entries = fs::read_dir(dir).map_err(|e| ArchiveError::io(dir, e))?;
    for entry in entries {
        let path = entry.map_err(|e| ArchiveError::io(dir, e))?.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

/// Forward-slash relative name, as zip readers expect.
fn entry_name(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
