use crate::core::models::system::StructureModel;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing structure file formats.
///
/// Implementors handle format-specific parsing and serialization; the
/// path-based methods are provided in terms of the stream-based ones.
pub trait StructureFile {
    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads a structure from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_from(reader: &mut impl BufRead) -> Result<StructureModel, Self::Error>;

    /// Writes a structure to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails or I/O operations encounter issues.
    fn write_to(model: &StructureModel, writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Reads a structure from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<StructureModel, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Writes a structure to a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(model: &StructureModel, path: P) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(model, &mut writer)
    }

    /// Renders a structure to an owned string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn write_to_string(model: &StructureModel) -> Result<String, Self::Error> {
        let mut buffer = Vec::new();
        Self::write_to(model, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
