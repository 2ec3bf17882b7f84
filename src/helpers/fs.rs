//! Write-then-rename file replacement for schema files.

use std::fs;
use std::fs::File;
use std::io;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

#[derive(Debug)]
pub enum AtomicWriteError<E> {
    Io(io::Error),
    Writer(E),
}

impl<E> From<io::Error> for AtomicWriteError<E> {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}

fn parent_dir_or_dot(path: &Path) -> &Path {
    // `Path::parent` is `Some("")` for bare file names like `schema.json`
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

/// Writes `dest` by filling a temp file in the same directory, syncing it and
/// renaming it over `dest`. If `write_fn` fails, `dest` is left untouched and
/// the temp file is removed.
pub(crate) fn atomic_write<T, E>(
    dest: impl AsRef<Path>,
    write_fn: impl FnOnce(&mut File) -> Result<T, E>,
) -> Result<T, AtomicWriteError<E>> {
    let dest = dest.as_ref();
    let dir = parent_dir_or_dot(dest);
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    let out = write_fn(tmp.as_file_mut()).map_err(AtomicWriteError::Writer)?;
    tmp.as_file_mut().flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(dest).map_err(|error| AtomicWriteError::Io(error.error))?;
    Ok(out)
}
