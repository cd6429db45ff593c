//!
//! # Staged Output Files
//!
//! Generated files are first written in full beside their destination,
//! and only renamed into place once every sibling output is ready.
//! Dropping a [StagedFile] without committing it removes the temporary.
//!

// Std-Lib Imports
use std::io::{self, Write};
use std::path::{Path, PathBuf};

// Crates.io Imports
use tempfile::{Builder, NamedTempFile};

/// # Staged File
/// Fully-written temporary file, awaiting a rename to `dest`.
#[derive(Debug)]
pub struct StagedFile {
    tmp: NamedTempFile,
    dest: PathBuf,
}
impl StagedFile {
    /// Final destination path
    pub fn dest(&self) -> &Path {
        &self.dest
    }
    /// Path of the temporary, while staged
    pub fn tmp_path(&self) -> &Path {
        self.tmp.path()
    }
    /// Rename the temporary into place, returning the destination path.
    pub fn commit(self) -> io::Result<PathBuf> {
        let StagedFile { tmp, dest } = self;
        tmp.persist(&dest).map_err(|e| e.error)?;
        Ok(dest)
    }
}

/// Write `contents` to a temporary file in the same directory as `dest`.
/// Nothing appears at `dest` until [StagedFile::commit].
pub fn stage(dest: impl AsRef<Path>, contents: &[u8]) -> io::Result<StagedFile> {
    let dest = dest.as_ref().to_path_buf();
    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut tmp = Builder::new().prefix(".regif21-").tempfile_in(dir)?;
    tmp.write_all(contents)?;
    tmp.flush()?;
    Ok(StagedFile { tmp, dest })
}

/// Stage and immediately commit a single file.
pub fn write_atomic(dest: impl AsRef<Path>, contents: &[u8]) -> io::Result<PathBuf> {
    stage(dest, contents)?.commit()
}
