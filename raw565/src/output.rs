//! All-or-nothing output files.
//!
//! [`AtomicFile`] writes into a hidden temporary file next to the destination and only moves it
//! into place on [`AtomicFile::commit`]. Dropping it without committing removes the temporary file,
//! so an error anywhere in the pipeline never leaves a truncated frame buffer behind.

use log::{trace, warn};
use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

#[derive(Debug)]
pub struct AtomicFile {
    temp_path: PathBuf,
    path: PathBuf,
    // `None` only while committing
    file: Option<BufWriter<File>>,
    committed: bool,
}

impl AtomicFile {
    /// Creates the temporary file for `path`. The destination itself is not touched yet.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let temp_path = temp_path_for(&path)?;

        trace!("staging `{}` in `{}`", path.display(), temp_path.display());
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;

        Ok(Self {
            temp_path,
            path,
            file: Some(BufWriter::new(file)),
            committed: false,
        })
    }

    /// Flushes and syncs the temporary file, then renames it over the destination.
    pub fn commit(mut self) -> io::Result<()> {
        let Some(writer) = self.file.take() else {
            return Ok(());
        };

        let file = writer.into_inner().map_err(io::IntoInnerError::into_error)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&self.temp_path, &self.path)?;
        self.committed = true;
        trace!("committed `{}`", self.path.display());

        Ok(())
    }

    fn writer(&mut self) -> io::Result<&mut BufWriter<File>> {
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "file already committed"))
    }
}

impl Write for AtomicFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer()?.write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.writer()?.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer()?.flush()
    }
}

impl Drop for AtomicFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }

        // close the handle before unlinking
        drop(self.file.take());

        trace!("discarding `{}`", self.temp_path.display());
        if let Err(e) = fs::remove_file(&self.temp_path) {
            warn!(
                "failed to remove temporary file `{}`: {e}",
                self.temp_path.display()
            );
        }
    }
}

/// `dir/name` -> `dir/.name.<pid>.tmp`, on the same filesystem so the final rename is atomic.
fn temp_path_for(path: &Path) -> io::Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("`{}` is not a file path", path.display()),
        )
    })?;

    let mut temp_name = std::ffi::OsString::from(".");
    temp_name.push(name);
    temp_name.push(format!(".{}.tmp", std::process::id()));

    Ok(path.with_file_name(temp_name))
}
