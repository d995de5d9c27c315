use crate::core::models::atom::{Atom, RecordKind};
use crate::core::models::ids::AtomId;
use crate::core::models::residue::Residue;
use crate::core::models::system::StructureModel;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Selection matched no atoms")]
pub struct EmptySelection;

/// Which backbone atoms a backbone selection keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackboneSpec {
    /// N, CA, C — the atoms continuity analysis works on.
    Minimal,
    /// N, CA, C, O.
    Full,
}

impl BackboneSpec {
    pub fn atom_names(&self) -> &'static [&'static str] {
        match self {
            BackboneSpec::Minimal => &["N", "CA", "C"],
            BackboneSpec::Full => &["N", "CA", "C", "O"],
        }
    }
}

/// A conjunctive atom selection over a [`StructureModel`].
///
/// Criteria compose with AND semantics: an atom is selected when it passes
/// every configured criterion. An empty selection matches everything.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    records: Option<Vec<RecordKind>>,
    chain: Option<char>,
    atom_names: Option<BTreeSet<String>>,
    residue_numbers: Option<BTreeSet<isize>>,
    backbone: Option<BackboneSpec>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only atoms read from the given record kinds.
    pub fn with_records(mut self, records: &[RecordKind]) -> Self {
        self.records = Some(records.to_vec());
        self
    }

    /// Keep only atoms of the given chain.
    pub fn with_chain(mut self, chain: char) -> Self {
        self.chain = Some(chain);
        self
    }

    /// Keep only atoms whose name is in `names`.
    pub fn with_atom_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.atom_names = Some(names.into_iter().map(|s| s.as_ref().to_string()).collect());
        self
    }

    /// Keep only atoms of residues with the given sequence numbers.
    pub fn with_residue_numbers<I: IntoIterator<Item = isize>>(mut self, numbers: I) -> Self {
        self.residue_numbers = Some(numbers.into_iter().collect());
        self
    }

    /// Keep only backbone atoms.
    pub fn with_backbone(mut self, spec: BackboneSpec) -> Self {
        self.backbone = Some(spec);
        self
    }

    fn matches(&self, atom: &Atom, residue: &Residue, chain_id: char) -> bool {
        if let Some(records) = &self.records {
            if !records.contains(&atom.record) {
                return false;
            }
        }
        if let Some(chain) = self.chain {
            if chain_id != chain {
                return false;
            }
        }
        if let Some(names) = &self.atom_names {
            if !names.contains(atom.name.as_str()) {
                return false;
            }
        }
        if let Some(numbers) = &self.residue_numbers {
            if !numbers.contains(&residue.number) {
                return false;
            }
        }
        if let Some(backbone) = self.backbone {
            if !backbone.atom_names().contains(&atom.name.as_str()) {
                return false;
            }
        }
        true
    }

    /// The IDs of matching atoms in file order.
    pub fn apply(&self, model: &StructureModel) -> Vec<AtomId> {
        let mut selected = Vec::new();
        for (_, chain) in model.chains_ordered() {
            for &residue_id in chain.residues() {
                let Some(residue) = model.residue(residue_id) else {
                    continue;
                };
                for &atom_id in residue.atoms() {
                    let Some(atom) = model.atom(atom_id) else {
                        continue;
                    };
                    if self.matches(atom, residue, chain.id) {
                        selected.push(atom_id);
                    }
                }
            }
        }
        selected
    }

    /// Builds a new structure containing only the matching atoms.
    ///
    /// Residues and chains left without atoms are dropped from the result.
    ///
    /// # Errors
    ///
    /// Returns [`EmptySelection`] when nothing matches.
    pub fn extract(&self, model: &StructureModel) -> Result<StructureModel, EmptySelection> {
        let mut out = StructureModel::new();
        let mut any = false;

        for (_, chain) in model.chains_ordered() {
            for &residue_id in chain.residues() {
                let Some(residue) = model.residue(residue_id) else {
                    continue;
                };
                for &atom_id in residue.atoms() {
                    let Some(atom) = model.atom(atom_id) else {
                        continue;
                    };
                    if !self.matches(atom, residue, chain.id) {
                        continue;
                    }
                    let out_chain = out.add_chain(chain.id);
                    let out_residue = out
                        .add_residue(out_chain, residue.number, &residue.name, residue.icode)
                        .expect("chain was just inserted");
                    let mut copy = atom.clone();
                    copy.residue_id = out_residue;
                    out.add_atom_to_residue(out_residue, copy);
                    any = true;
                }
            }
        }

        if !any {
            return Err(EmptySelection);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn two_chain_model() -> StructureModel {
        let mut model = StructureModel::new();
        let chain_a = model.add_chain('A');

        let gly = model.add_residue(chain_a, 1, "GLY", ' ').unwrap();
        for (i, name) in ["N", "CA", "C", "O"].iter().enumerate() {
            model.add_atom_to_residue(
                gly,
                Atom::new(name, i + 1, gly, Point3::new(i as f64, 0.0, 0.0)),
            );
        }

        let ala = model.add_residue(chain_a, 2, "ALA", ' ').unwrap();
        for (i, name) in ["N", "CA", "C", "CB"].iter().enumerate() {
            model.add_atom_to_residue(
                ala,
                Atom::new(name, i + 5, ala, Point3::new(i as f64, 1.0, 0.0)),
            );
        }

        let chain_b = model.add_chain('B');
        let hoh = model.add_residue(chain_b, 101, "HOH", ' ').unwrap();
        let mut o = Atom::new("O", 9, hoh, Point3::new(5.0, 5.0, 5.0));
        o.record = RecordKind::Hetatm;
        model.add_atom_to_residue(hoh, o);

        model
    }

    #[test]
    fn empty_selection_matches_everything() {
        let model = two_chain_model();
        assert_eq!(Selection::new().apply(&model).len(), model.atom_count());
    }

    #[test]
    fn record_kind_filter_drops_heteroatoms() {
        let model = two_chain_model();
        let selected = Selection::new()
            .with_records(&[RecordKind::Atom])
            .apply(&model);
        assert_eq!(selected.len(), 8);
    }

    #[test]
    fn chain_filter_selects_single_chain() {
        let model = two_chain_model();
        let selected = Selection::new().with_chain('B').apply(&model);
        assert_eq!(selected.len(), 1);
        assert_eq!(model.atom(selected[0]).unwrap().name, "O");
    }

    #[test]
    fn minimal_backbone_keeps_n_ca_c() {
        let model = two_chain_model();
        let selected = Selection::new()
            .with_chain('A')
            .with_backbone(BackboneSpec::Minimal)
            .apply(&model);
        assert_eq!(selected.len(), 6);
        for id in selected {
            let name = &model.atom(id).unwrap().name;
            assert!(["N", "CA", "C"].contains(&name.as_str()));
        }
    }

    #[test]
    fn residue_number_filter_keeps_listed_residues() {
        let model = two_chain_model();
        let selected = Selection::new()
            .with_chain('A')
            .with_residue_numbers([2])
            .apply(&model);
        assert_eq!(selected.len(), 4);
    }

    #[test]
    fn criteria_combine_with_and_semantics() {
        let model = two_chain_model();
        let selected = Selection::new()
            .with_chain('A')
            .with_residue_numbers([2])
            .with_atom_names(["CB"])
            .apply(&model);
        assert_eq!(selected.len(), 1);
        assert_eq!(model.atom(selected[0]).unwrap().name, "CB");
    }

    #[test]
    fn extract_builds_reduced_model() {
        let model = two_chain_model();
        let reduced = Selection::new()
            .with_chain('A')
            .with_backbone(BackboneSpec::Minimal)
            .extract(&model)
            .unwrap();

        assert_eq!(reduced.atom_count(), 6);
        assert_eq!(reduced.residue_count(), 2);
        assert_eq!(reduced.chains_ordered().count(), 1);
        assert!(reduced.find_chain_by_id('B').is_none());
    }

    #[test]
    fn extract_with_no_matches_is_an_error() {
        let model = two_chain_model();
        let result = Selection::new().with_chain('Z').extract(&model);
        assert_eq!(result.unwrap_err(), EmptySelection);
    }
}
