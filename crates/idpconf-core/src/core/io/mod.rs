pub mod cif;
pub mod pdb;
pub mod traits;

use crate::core::models::system::StructureModel;
use cif::{CifError, CifFile};
use pdb::{PdbError, PdbFile};
use std::io;
use std::path::Path;
use thiserror::Error;
use traits::StructureFile;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Cif(#[from] CifError),
    #[error(transparent)]
    Pdb(#[from] PdbError),
    #[error("Data is neither mmCIF nor PDB format v3")]
    UnknownFormat,
}

/// Detects whether `data` looks like an mmCIF file.
pub fn looks_like_cif(data: &str) -> bool {
    data.to_ascii_lowercase().contains("loop_")
}

/// Detects whether `data` looks like a PDB format v3 file.
pub fn looks_like_pdb(data: &str) -> bool {
    data.starts_with("ATOM ") || data.contains("\nATOM ") || data.contains("\nHETATM")
}

/// Parses structure data, detecting the format.
///
/// mmCIF detection runs first because CIF data blocks may embed PDB-looking
/// tokens, while the reverse cannot happen.
///
/// # Errors
///
/// Returns [`ReadError::UnknownFormat`] when neither format is recognized,
/// otherwise the underlying parser error.
pub fn read_structure(data: &str) -> Result<StructureModel, ReadError> {
    if looks_like_cif(data) {
        Ok(CifFile::read_str(data)?)
    } else if looks_like_pdb(data) {
        Ok(PdbFile::read_from(&mut data.as_bytes())?)
    } else {
        Err(ReadError::UnknownFormat)
    }
}

/// Reads and parses a structure file, detecting the format.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn read_structure_from_path<P: AsRef<Path>>(path: P) -> Result<StructureModel, ReadError> {
    let data = std::fs::read_to_string(path)?;
    read_structure(&data)
}
