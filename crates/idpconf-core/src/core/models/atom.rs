use super::ids::ResidueId;
use nalgebra::Point3;
use std::str::FromStr;

/// The record name an atom was read from in a structure file.
///
/// PDB format v3 distinguishes polymer atoms (`ATOM`) from heteroatoms
/// (`HETATM`, e.g. ligands, ions, water). The distinction is preserved so
/// that curation filters can keep or discard either class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecordKind {
    /// A polymer atom (`ATOM` record).
    #[default]
    Atom,
    /// A heteroatom (`HETATM` record).
    Hetatm,
}

impl RecordKind {
    /// Returns the PDB record name for this kind.
    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::Atom => "ATOM",
            RecordKind::Hetatm => "HETATM",
        }
    }
}

impl FromStr for RecordKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ATOM" => Ok(RecordKind::Atom),
            "HETATM" => Ok(RecordKind::Hetatm),
            _ => Err(()),
        }
    }
}

/// Represents an atom in a molecular structure.
///
/// This struct carries the per-atom fields of the PDB format v3 `ATOM` and
/// `HETATM` records, plus the ID of the residue that owns the atom. Fields
/// that curation operations never interpret (occupancy, temperature factor,
/// formal charge) are preserved verbatim so structures survive a read/write
/// round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The name of the atom (e.g., "CA", "N", "OXT").
    pub name: String,
    /// The atom serial number from the source file.
    pub serial: usize,
    /// Whether this atom came from an `ATOM` or a `HETATM` record.
    pub record: RecordKind,
    /// Alternate-location indicator (`' '` when absent).
    pub alt_loc: char,
    /// The ID of the parent residue this atom belongs to.
    pub residue_id: ResidueId,
    /// The element symbol (e.g., "C", "N", "S").
    pub element: String,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
    /// Occupancy of this atom position.
    pub occupancy: f64,
    /// Isotropic temperature factor (B-factor).
    pub temp_factor: f64,
    /// Formal charge, verbatim from the source file (e.g., "2-", "1+").
    pub charge: String,
}

impl Atom {
    /// Creates a new `Atom` with default values for most fields.
    ///
    /// The element symbol is derived from the first alphabetic character of
    /// the atom name; parsers overwrite it when the source file carries an
    /// explicit element column.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the atom.
    /// * `serial` - The atom serial number.
    /// * `residue_id` - The ID of the residue this atom belongs to.
    /// * `position` - The 3D coordinates of the atom.
    pub fn new(name: &str, serial: usize, residue_id: ResidueId, position: Point3<f64>) -> Self {
        Self {
            name: name.to_string(),
            serial,
            record: RecordKind::default(),
            alt_loc: ' ',
            residue_id,
            element: element_from_name(name),
            position,
            occupancy: 1.0,
            temp_factor: 0.0,
            charge: String::new(),
        }
    }
}

/// Derives an element symbol from an atom name.
///
/// Falls back to the first alphabetic character of the name, which is correct
/// for the organic elements found in protein structures. Files carrying an
/// explicit element column take precedence over this guess.
pub fn element_from_name(name: &str) -> String {
    name.chars()
        .find(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase().to_string())
        .unwrap_or_default()
}
