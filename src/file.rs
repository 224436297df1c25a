//! Reading and writing STAR/CIF files.
//!
//! Reads load the whole file and parse it; the handle is closed before
//! parsing starts, so a parse failure never leaks it. Writes serialize the
//! whole document first, then write to a temporary file in the target
//! directory and rename it into place. A failed write leaves any existing
//! file untouched.
//!
//! ```rust,no_run
//! use starcif::{read_file, write_file};
//!
//! let doc = read_file("run_data.star")?;
//! write_file(&doc, "run_data_copy.star", true)?;
//! # Ok::<(), starcif::Error>(())
//! ```

use crate::{from_str_with_options, to_string_with_options};
use crate::{Document, Error, ParseOptions, Result, WriteOptions};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Reads and parses a STAR/CIF file with default options.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read, or any parse error.
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    read_file_with_options(path, &ParseOptions::default())
}

/// Reads and parses a STAR/CIF file.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read, or any parse error.
pub fn read_file_with_options<P: AsRef<Path>>(path: P, options: &ParseOptions) -> Result<Document> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|e| Error::io(&format!("{}: {}", path.display(), e)))?;
    debug!(path = %path.display(), bytes = text.len(), "read STAR file");
    from_str_with_options(&text, options)
}

/// Writes a document to `path` with default options.
///
/// When `overwrite` is `false` and `path` already exists, nothing is written
/// and [`Error::FileExists`] is returned.
///
/// # Errors
///
/// Returns [`Error::FileExists`], [`Error::Unwritable`], or [`Error::Io`].
pub fn write_file<P: AsRef<Path>>(doc: &Document, path: P, overwrite: bool) -> Result<()> {
    write_file_with_options(doc, path, overwrite, &WriteOptions::default())
}

/// Writes a document to `path`.
///
/// # Errors
///
/// Returns [`Error::FileExists`], [`Error::Unwritable`], or [`Error::Io`].
pub fn write_file_with_options<P: AsRef<Path>>(
    doc: &Document,
    path: P,
    overwrite: bool,
    options: &WriteOptions,
) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        if !overwrite {
            return Err(Error::FileExists(path.to_path_buf()));
        }
        warn!(path = %path.display(), "replacing existing STAR file");
    }

    let text = to_string_with_options(doc, options)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(text.as_bytes())?;
    tmp.as_file().sync_all()?;

    let persisted = if overwrite {
        tmp.persist(path)
    } else {
        tmp.persist_noclobber(path)
    };
    persisted.map_err(|e| match e.error.kind() {
        ErrorKind::AlreadyExists => Error::FileExists(path.to_path_buf()),
        _ => Error::io(&format!("{}: {}", path.display(), e.error)),
    })?;

    debug!(path = %path.display(), bytes = text.len(), "wrote STAR file");
    Ok(())
}
