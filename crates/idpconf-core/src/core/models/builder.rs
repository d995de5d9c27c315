use super::atom::{Atom, RecordKind, element_from_name};
use super::ids::{ChainId, ResidueId};
use super::system::StructureModel;
use nalgebra::Point3;

/// Per-atom fields handed from a parser to the builder.
///
/// Optional columns default to the conventions of the PDB format: full
/// occupancy, zero temperature factor, no alternate location, element
/// derived from the atom name.
#[derive(Debug, Clone)]
pub struct AtomSpec<'a> {
    pub serial: usize,
    pub name: &'a str,
    pub record: RecordKind,
    pub alt_loc: char,
    pub element: Option<&'a str>,
    pub position: Point3<f64>,
    pub occupancy: Option<f64>,
    pub temp_factor: Option<f64>,
    pub charge: &'a str,
}

/// Incrementally assembles a [`StructureModel`] while a file is parsed.
///
/// Parsers drive the builder in file order: `start_chain` and
/// `start_residue` switch the insertion cursor, `add_atom` appends to the
/// current residue. The builder panics when driven out of order; parsers
/// guarantee the sequence.
pub struct StructureBuilder {
    model: StructureModel,
    current_chain: Option<ChainId>,
    current_residue: Option<ResidueId>,
}

impl Default for StructureBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StructureBuilder {
    pub fn new() -> Self {
        Self {
            model: StructureModel::new(),
            current_chain: None,
            current_residue: None,
        }
    }

    pub fn start_chain(&mut self, id: char) -> &mut Self {
        let chain_id = self.model.add_chain(id);
        self.current_chain = Some(chain_id);
        self.current_residue = None;
        self
    }

    pub fn start_residue(&mut self, number: isize, name: &str, icode: char) -> &mut Self {
        let chain_id = self
            .current_chain
            .expect("must start a chain before starting a residue");
        let residue_id = self
            .model
            .add_residue(chain_id, number, name, icode)
            .expect("current chain disappeared from the model");
        self.current_residue = Some(residue_id);
        self
    }

    pub fn add_atom(&mut self, spec: AtomSpec<'_>) -> &mut Self {
        let residue_id = self
            .current_residue
            .expect("cannot add an atom without a current residue");

        let mut atom = Atom::new(spec.name, spec.serial, residue_id, spec.position);
        atom.record = spec.record;
        atom.alt_loc = spec.alt_loc;
        atom.element = match spec.element {
            Some(e) if !e.trim().is_empty() => e.trim().to_ascii_uppercase(),
            _ => element_from_name(spec.name),
        };
        if let Some(occupancy) = spec.occupancy {
            atom.occupancy = occupancy;
        }
        if let Some(temp_factor) = spec.temp_factor {
            atom.temp_factor = temp_factor;
        }
        atom.charge = spec.charge.trim().to_string();

        self.model
            .add_atom_to_residue(residue_id, atom)
            .expect("current residue disappeared from the model");
        self
    }

    pub fn build(self) -> StructureModel {
        self.model
    }
}
