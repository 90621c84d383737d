//! File-delivery collaborators.
//!
//! The exporter hands a finished [`ExportFile`] to a [`FileDelivery`], which
//! decides where the bytes go.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::export::ExportFile;

/// Errors raised while delivering an export.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The target directory could not be created.
    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file could not be written.
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The output stream rejected the body.
    #[error("failed to write calendar to output: {0}")]
    Stream(#[from] io::Error),
}

/// Receives a finished export.
pub trait FileDelivery {
    /// Delivers the file and returns where it went, if that has a name.
    fn deliver(&mut self, file: &ExportFile) -> Result<Option<String>, DeliveryError>;
}

/// Writes exports into a directory, creating it when missing.
#[derive(Debug, Clone)]
pub struct DirectoryDelivery {
    dir: PathBuf,
}

impl DirectoryDelivery {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileDelivery for DirectoryDelivery {
    fn deliver(&mut self, file: &ExportFile) -> Result<Option<String>, DeliveryError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| DeliveryError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.dir.join(&file.filename);
        std::fs::write(&path, file.body.as_bytes()).map_err(|source| DeliveryError::Write {
            path: path.clone(),
            source,
        })?;

        info!(path = %path.display(), bytes = file.body.len(), "Wrote calendar file");
        Ok(Some(path.display().to_string()))
    }
}

/// Writes the export body to a stream, stdout by default.
#[derive(Debug)]
pub struct StdoutDelivery<W = io::Stdout> {
    writer: W,
}

impl StdoutDelivery<io::Stdout> {
    pub fn stdout() -> Self {
        Self {
            writer: io::stdout(),
        }
    }
}

impl<W: Write> StdoutDelivery<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> FileDelivery for StdoutDelivery<W> {
    fn deliver(&mut self, file: &ExportFile) -> Result<Option<String>, DeliveryError> {
        self.writer.write_all(file.body.as_bytes())?;
        self.writer.flush()?;
        debug!(filename = %file.filename, bytes = file.body.len(), "Streamed calendar");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ICS_MIME_TYPE;

    fn sample_file() -> ExportFile {
        ExportFile {
            filename: "tutorcal-calendar-2024-03-01.ics".to_string(),
            mime_type: ICS_MIME_TYPE,
            body: "BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n".to_string(),
        }
    }

    mod directory {
        use super::*;

        #[test]
        fn writes_file_into_directory() {
            let dir = tempfile::tempdir().unwrap();
            let mut delivery = DirectoryDelivery::new(dir.path());

            let location = delivery.deliver(&sample_file()).unwrap();

            let path = dir.path().join("tutorcal-calendar-2024-03-01.ics");
            assert_eq!(location, Some(path.display().to_string()));
            assert_eq!(
                std::fs::read_to_string(&path).unwrap(),
                "BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n"
            );
        }

        #[test]
        fn creates_missing_directories() {
            let dir = tempfile::tempdir().unwrap();
            let nested = dir.path().join("exports").join("2024");
            let mut delivery = DirectoryDelivery::new(&nested);

            delivery.deliver(&sample_file()).unwrap();

            assert!(nested.join("tutorcal-calendar-2024-03-01.ics").is_file());
        }

        #[test]
        fn directory_blocked_by_file_errors() {
            let blocker = tempfile::NamedTempFile::new().unwrap();
            let mut delivery = DirectoryDelivery::new(blocker.path());

            let err = delivery.deliver(&sample_file()).unwrap_err();
            assert!(matches!(err, DeliveryError::CreateDir { .. }));
            assert!(err.to_string().starts_with("failed to create directory"));
        }
    }

    mod stream {
        use super::*;

        #[test]
        fn writes_body_verbatim() {
            let mut delivery = StdoutDelivery::new(Vec::new());

            let location = delivery.deliver(&sample_file()).unwrap();

            assert_eq!(location, None);
            assert_eq!(
                delivery.into_inner(),
                b"BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n".to_vec()
            );
        }
    }
}
