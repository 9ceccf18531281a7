use super::LibraryError;
use super::outgoing::{LibraryRow, OutgoingKinematics};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Defines the interface for reading pre-generated dark brem vertices.
///
/// A source turns some on-disk representation into a flat list of
/// [`OutgoingKinematics`]; grouping and sampling are left to
/// [`EventLibrary`](super::EventLibrary).
pub trait LibrarySource {
    /// Reads every record from `reader`.
    ///
    /// # Arguments
    ///
    /// * `reader` - The reader to parse records from.
    /// * `origin` - A label for the data, used in error messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the data cannot be parsed or contains a
    /// non-finite value.
    fn read_from(
        &self,
        reader: impl Read,
        origin: &str,
    ) -> Result<Vec<OutgoingKinematics>, LibraryError>;

    /// Returns `true` if `path` is a file this source understands.
    fn accepts(&self, path: &Path) -> bool;

    /// Reads every record from a file, or from every accepted file inside a
    /// directory (non-recursive, in lexicographic order of file name).
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be read or any file fails to parse.
    fn read_from_path(&self, path: &Path) -> Result<Vec<OutgoingKinematics>, LibraryError> {
        let io_error = |source| LibraryError::Io {
            path: path.display().to_string(),
            source,
        };

        if !path.is_dir() {
            let file = File::open(path).map_err(io_error)?;
            return self.read_from(BufReader::new(file), &path.display().to_string());
        }

        let mut files: Vec<PathBuf> = std::fs::read_dir(path)
            .map_err(io_error)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && self.accepts(p))
            .collect();
        files.sort();
        debug!(directory = %path.display(), files = files.len(), "Reading event library directory.");

        let mut records = Vec::new();
        for file_path in &files {
            let file = File::open(file_path).map_err(|source| LibraryError::Io {
                path: file_path.display().to_string(),
                source,
            })?;
            let mut chunk = self.read_from(BufReader::new(file), &file_path.display().to_string())?;
            trace!(file = %file_path.display(), records = chunk.len(), "Read library file.");
            records.append(&mut chunk);
        }
        Ok(records)
    }
}

/// Comma-separated library files with a header row naming the
/// [`LibraryRow`] fields. All values are in GeV.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvLibrary;

impl LibrarySource for CsvLibrary {
    fn read_from(
        &self,
        reader: impl Read,
        origin: &str,
    ) -> Result<Vec<OutgoingKinematics>, LibraryError> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut records = Vec::new();
        for (index, row) in csv_reader.deserialize::<LibraryRow>().enumerate() {
            let row = row.map_err(|source| LibraryError::Csv {
                path: origin.to_string(),
                source,
            })?;
            let kinematics = row.into_kinematics().ok_or_else(|| LibraryError::InvalidRecord {
                path: origin.to_string(),
                line: index + 2,
                reason: "non-finite value".to_string(),
            })?;
            records.push(kinematics);
        }
        Ok(records)
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
    }
}

/// Writes records in the format read back by [`CsvLibrary`].
///
/// # Errors
///
/// Returns [`LibraryError::Csv`] if serialization or the underlying writer
/// fails.
pub fn write_library_csv<'a>(
    records: impl IntoIterator<Item = &'a OutgoingKinematics>,
    writer: impl Write,
) -> Result<(), LibraryError> {
    let csv_error = |source| LibraryError::Csv {
        path: String::from("<output>"),
        source,
    };
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(LibraryRow::from(record)).map_err(csv_error)?;
    }
    csv_writer.flush().map_err(|source| LibraryError::Io {
        path: String::from("<output>"),
        source,
    })
}
