use super::atom::Atom;
use super::chain::Chain;
use super::ids::{AtomId, ChainId, ResidueId};
use super::residue::Residue;
use slotmap::SlotMap;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Represents a complete molecular structure with atoms, residues, and chains.
///
/// This struct is the central data structure for curation operations. Atoms,
/// residues, and chains live in slot-map arenas addressed by stable IDs, with
/// lookup maps for identifier-based access. Chains and the residues within
/// them preserve source-file order, so traversal through
/// [`StructureModel::atoms_ordered`] reproduces the original atom sequence.
#[derive(Debug, Clone, Default)]
pub struct StructureModel {
    /// Primary storage for atoms.
    atoms: SlotMap<AtomId, Atom>,
    /// Primary storage for residues.
    residues: SlotMap<ResidueId, Residue>,
    /// Primary storage for chains.
    chains: SlotMap<ChainId, Chain>,
    /// Chain IDs in source-file order.
    chain_order: Vec<ChainId>,
    /// Lookup map for finding residues by chain, number, and insertion code.
    residue_id_map: HashMap<(ChainId, isize, char), ResidueId>,
    /// Lookup map for finding chains by their single-character identifier.
    chain_id_map: HashMap<char, ChainId>,
}

impl StructureModel {
    /// Creates a new, empty structure model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieves an immutable reference to an atom by its ID.
    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    /// Retrieves a mutable reference to an atom by its ID.
    pub fn atom_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.atoms.get_mut(id)
    }

    /// Returns an iterator over all atoms in arena order.
    ///
    /// Arena order equals insertion order for freshly parsed structures; use
    /// [`StructureModel::atoms_ordered`] when file order must be reproduced
    /// after removals.
    pub fn atoms_iter(&self) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.atoms.iter()
    }

    /// Returns a mutable iterator over all atoms.
    pub fn atoms_iter_mut(&mut self) -> impl Iterator<Item = (AtomId, &mut Atom)> {
        self.atoms.iter_mut()
    }

    /// Retrieves an immutable reference to a residue by its ID.
    pub fn residue(&self, id: ResidueId) -> Option<&Residue> {
        self.residues.get(id)
    }

    /// Retrieves a mutable reference to a residue by its ID.
    pub fn residue_mut(&mut self, id: ResidueId) -> Option<&mut Residue> {
        self.residues.get_mut(id)
    }

    /// Retrieves an immutable reference to a chain by its ID.
    pub fn chain(&self, id: ChainId) -> Option<&Chain> {
        self.chains.get(id)
    }

    /// Returns the chains in source-file order.
    pub fn chains_ordered(&self) -> impl Iterator<Item = (ChainId, &Chain)> {
        self.chain_order
            .iter()
            .filter_map(move |&id| self.chains.get(id).map(|c| (id, c)))
    }

    /// Returns the residues of the whole structure in file order.
    pub fn residues_ordered(&self) -> impl Iterator<Item = (ResidueId, &Residue)> {
        self.chains_ordered().flat_map(move |(_, chain)| {
            chain
                .residues()
                .iter()
                .filter_map(move |&rid| self.residues.get(rid).map(|r| (rid, r)))
        })
    }

    /// Returns the atom IDs of the whole structure in file order.
    pub fn atoms_ordered(&self) -> Vec<AtomId> {
        self.residues_ordered()
            .flat_map(|(_, residue)| residue.atoms().iter().copied())
            .collect()
    }

    /// The number of atoms in the structure.
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    /// The number of residues in the structure.
    pub fn residue_count(&self) -> usize {
        self.residues.len()
    }

    /// Finds a chain ID by its single-character identifier.
    pub fn find_chain_by_id(&self, id: char) -> Option<ChainId> {
        self.chain_id_map.get(&id).copied()
    }

    /// Finds a residue ID by chain, residue number, and insertion code.
    pub fn find_residue_by_id(
        &self,
        chain_id: ChainId,
        residue_number: isize,
        icode: char,
    ) -> Option<ResidueId> {
        self.residue_id_map
            .get(&(chain_id, residue_number, icode))
            .copied()
    }

    /// The first residue of the structure in file order.
    pub fn first_residue(&self) -> Option<ResidueId> {
        self.residues_ordered().next().map(|(id, _)| id)
    }

    /// The last residue of the structure in file order.
    pub fn last_residue(&self) -> Option<ResidueId> {
        self.residues_ordered().last().map(|(id, _)| id)
    }

    /// Adds a new chain or returns the existing one.
    ///
    /// This method is idempotent; if a chain with the given ID already
    /// exists, it returns the existing chain ID without creating a duplicate.
    pub fn add_chain(&mut self, id: char) -> ChainId {
        if let Some(&existing) = self.chain_id_map.get(&id) {
            return existing;
        }
        let chain_id = self.chains.insert(Chain::new(id));
        self.chain_id_map.insert(id, chain_id);
        self.chain_order.push(chain_id);
        chain_id
    }

    /// Adds a new residue to a chain or returns the existing one.
    ///
    /// Residue identity within a chain is the pair (number, insertion code).
    ///
    /// # Return
    ///
    /// Returns `Some(ResidueId)` if successful, otherwise `None` (e.g., if
    /// the chain does not exist).
    pub fn add_residue(
        &mut self,
        chain_id: ChainId,
        number: isize,
        name: &str,
        icode: char,
    ) -> Option<ResidueId> {
        let chain = self.chains.get_mut(chain_id)?;
        let key = (chain_id, number, icode);

        let residue_id = *self.residue_id_map.entry(key).or_insert_with(|| {
            let residue = Residue::new(number, name, icode, chain_id);
            self.residues.insert(residue)
        });

        if !chain.residues.contains(&residue_id) {
            chain.residues.push(residue_id);
        }

        Some(residue_id)
    }

    /// Adds an atom to a specific residue.
    ///
    /// # Return
    ///
    /// Returns `Some(AtomId)` if successful, otherwise `None` (e.g., if the
    /// residue does not exist).
    pub fn add_atom_to_residue(&mut self, residue_id: ResidueId, atom: Atom) -> Option<AtomId> {
        if !self.residues.contains_key(residue_id) {
            return None;
        }

        let name = atom.name.clone();
        let atom_id = self.atoms.insert(atom);
        let residue = self.residues.get_mut(residue_id)?;
        residue.add_atom(&name, atom_id);

        Some(atom_id)
    }

    /// Removes an atom from the structure, updating its parent residue.
    ///
    /// # Return
    ///
    /// Returns `Some(Atom)` if the atom existed and was removed.
    pub fn remove_atom(&mut self, atom_id: AtomId) -> Option<Atom> {
        let atom = self.atoms.remove(atom_id)?;
        if let Some(residue) = self.residues.get_mut(atom.residue_id) {
            residue.remove_atom(&atom.name, atom_id);
        }
        Some(atom)
    }

    /// Removes a residue and all its atoms from the structure.
    ///
    /// # Return
    ///
    /// Returns `Some(Residue)` if the residue existed and was removed.
    pub fn remove_residue(&mut self, residue_id: ResidueId) -> Option<Residue> {
        let residue = self.residues.get(residue_id)?.clone();

        for atom_id in residue.atoms().to_vec() {
            self.remove_atom(atom_id);
        }

        if let Some(chain) = self.chains.get_mut(residue.chain_id) {
            chain.residues.retain(|&id| id != residue_id);
        }

        self.residue_id_map
            .remove(&(residue.chain_id, residue.number, residue.icode));

        self.residues.remove(residue_id)
    }

    /// All chain identifiers present in the structure.
    pub fn chain_ids(&self) -> BTreeSet<char> {
        self.chains.values().map(|c| c.id).collect()
    }

    /// Per-chain one-letter amino acid sequences.
    ///
    /// Residues without a one-letter code (water, ligands, modified
    /// residues) render as `X`. Chains without any residues yield empty
    /// strings.
    pub fn fasta(&self) -> BTreeMap<char, String> {
        self.chains_ordered()
            .map(|(_, chain)| {
                let seq: String = chain
                    .residues()
                    .iter()
                    .filter_map(|&rid| self.residues.get(rid))
                    .map(|r| r.kind().one_letter().unwrap_or('X'))
                    .collect();
                (chain.id, seq)
            })
            .collect()
    }
}
