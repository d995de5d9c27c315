use super::ids::{AtomId, ChainId};
use std::collections::HashMap;
use std::str::FromStr;

/// Classification of a residue by its three-letter name.
///
/// Covers the twenty standard amino acids plus the common histidine
/// protonation-state aliases, water, and a catch-all for everything else
/// (ligands, modified residues, ions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResidueKind {
    Alanine,
    Arginine,
    Asparagine,
    AsparticAcid,
    Cysteine,
    Glutamine,
    GlutamicAcid,
    Glycine,
    Histidine,
    Isoleucine,
    Leucine,
    Lysine,
    Methionine,
    Phenylalanine,
    Proline,
    Serine,
    Threonine,
    Tryptophan,
    Tyrosine,
    Valine,
    Water,
    Other,
}

impl ResidueKind {
    /// Classifies a residue by its three-letter name (case-insensitive).
    ///
    /// Histidine aliases (`HIE`, `HID`, `HIP`, `HSD`, `HSE`, `HSP`) all map
    /// to [`ResidueKind::Histidine`]. Unknown names map to
    /// [`ResidueKind::Other`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "ALA" => ResidueKind::Alanine,
            "ARG" => ResidueKind::Arginine,
            "ASN" => ResidueKind::Asparagine,
            "ASP" => ResidueKind::AsparticAcid,
            "CYS" => ResidueKind::Cysteine,
            "GLN" => ResidueKind::Glutamine,
            "GLU" => ResidueKind::GlutamicAcid,
            "GLY" => ResidueKind::Glycine,
            "HIS" | "HIE" | "HID" | "HIP" | "HSD" | "HSE" | "HSP" => ResidueKind::Histidine,
            "ILE" => ResidueKind::Isoleucine,
            "LEU" => ResidueKind::Leucine,
            "LYS" => ResidueKind::Lysine,
            "MET" => ResidueKind::Methionine,
            "PHE" => ResidueKind::Phenylalanine,
            "PRO" => ResidueKind::Proline,
            "SER" => ResidueKind::Serine,
            "THR" => ResidueKind::Threonine,
            "TRP" => ResidueKind::Tryptophan,
            "TYR" => ResidueKind::Tyrosine,
            "VAL" => ResidueKind::Valine,
            "HOH" | "WAT" => ResidueKind::Water,
            _ => ResidueKind::Other,
        }
    }

    /// Returns the one-letter code for standard amino acids.
    ///
    /// Water and unclassified residues return `None`; FASTA generation
    /// renders them as `X`.
    pub fn one_letter(&self) -> Option<char> {
        let c = match self {
            ResidueKind::Alanine => 'A',
            ResidueKind::Arginine => 'R',
            ResidueKind::Asparagine => 'N',
            ResidueKind::AsparticAcid => 'D',
            ResidueKind::Cysteine => 'C',
            ResidueKind::Glutamine => 'Q',
            ResidueKind::GlutamicAcid => 'E',
            ResidueKind::Glycine => 'G',
            ResidueKind::Histidine => 'H',
            ResidueKind::Isoleucine => 'I',
            ResidueKind::Leucine => 'L',
            ResidueKind::Lysine => 'K',
            ResidueKind::Methionine => 'M',
            ResidueKind::Phenylalanine => 'F',
            ResidueKind::Proline => 'P',
            ResidueKind::Serine => 'S',
            ResidueKind::Threonine => 'T',
            ResidueKind::Tryptophan => 'W',
            ResidueKind::Tyrosine => 'Y',
            ResidueKind::Valine => 'V',
            ResidueKind::Water | ResidueKind::Other => return None,
        };
        Some(c)
    }

    /// Whether this kind is one of the twenty standard amino acids.
    pub fn is_amino_acid(&self) -> bool {
        !matches!(self, ResidueKind::Water | ResidueKind::Other)
    }
}

impl FromStr for ResidueKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ResidueKind::from_name(s))
    }
}

/// A residue within a chain: a sequence number, a name, and its atoms.
#[derive(Debug, Clone, PartialEq)]
pub struct Residue {
    /// Residue sequence number from the source file.
    pub number: isize,
    /// Name of the residue (e.g., "ALA", "GLY", "HOH").
    pub name: String,
    /// Insertion code (`' '` when absent).
    pub icode: char,
    /// ID of the parent chain.
    pub chain_id: ChainId,
    /// Ordered atom IDs belonging to this residue.
    pub(crate) atoms: Vec<AtomId>,
    /// Map from atom name to the IDs carrying that name.
    atom_name_map: HashMap<String, Vec<AtomId>>,
}

impl Residue {
    pub(crate) fn new(number: isize, name: &str, icode: char, chain_id: ChainId) -> Self {
        Self {
            number,
            name: name.to_string(),
            icode,
            chain_id,
            atoms: Vec::new(),
            atom_name_map: HashMap::new(),
        }
    }

    pub(crate) fn add_atom(&mut self, atom_name: &str, atom_id: AtomId) {
        self.atoms.push(atom_id);
        self.atom_name_map
            .entry(atom_name.to_string())
            .or_default()
            .push(atom_id);
    }

    pub(crate) fn remove_atom(&mut self, atom_name: &str, atom_id: AtomId) {
        self.atoms.retain(|&id| id != atom_id);
        if let Some(ids) = self.atom_name_map.get_mut(atom_name) {
            ids.retain(|&id| id != atom_id);
            if ids.is_empty() {
                self.atom_name_map.remove(atom_name);
            }
        }
    }

    /// Ordered atom IDs of this residue.
    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }

    /// The first atom carrying `name`, if any.
    pub fn atom_by_name(&self, name: &str) -> Option<AtomId> {
        self.atom_name_map
            .get(name)
            .and_then(|ids| ids.first())
            .copied()
    }

    /// The classification of this residue derived from its name.
    pub fn kind(&self) -> ResidueKind {
        ResidueKind::from_name(&self.name)
    }
}
