use crate::core::dssp::DsspEntry;
use crate::core::models::system::StructureModel;
use crate::core::selection::Selection;
use crate::engine::error::EngineError;
use crate::engine::segments::group_by;
use std::collections::BTreeSet;

/// Which secondary-structure classes to isolate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SsSelection {
    /// Every class present in the entry.
    #[default]
    All,
    /// Only the listed class characters.
    Subset(BTreeSet<char>),
}

/// Which atoms to keep in the isolated elements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AtomFilter {
    #[default]
    All,
    Names(BTreeSet<String>),
}

/// Parameters for secondary-structure element extraction.
#[derive(Debug, Clone, Default)]
pub struct ExtractConfig {
    pub structures: SsSelection,
    pub atoms: AtomFilter,
    /// Minimum element length, in residues.
    pub minimum: usize,
}

/// Isolates maximal runs of secondary structure from a curated entry.
///
/// For every requested class, each run of at least `minimum` residues is
/// cut out of `model` as its own structure, named
/// `<stem>_<class>_<counter>.pdb`. Residue matching goes through the
/// entry's residue-number list, never through positional indexing, so
/// entries with chain breaks stay correct.
///
/// # Errors
///
/// Returns [`EngineError::DataMismatch`] when the entry's strings and
/// residue list disagree, and propagates selection errors when the model
/// lacks residues the entry names.
pub fn extract_elements(
    stem: &str,
    model: &StructureModel,
    entry: &DsspEntry,
    config: &ExtractConfig,
) -> Result<Vec<(String, StructureModel)>, EngineError> {
    let resids = entry.resid_numbers()?;
    if resids.len() != entry.dssp.chars().count() {
        return Err(EngineError::DataMismatch(format!(
            "entry '{stem}' has {} residue ids for {} codes",
            resids.len(),
            entry.dssp.chars().count()
        )));
    }

    let present: BTreeSet<char> = entry.dssp.chars().collect();
    let to_isolate: Vec<char> = match &config.structures {
        SsSelection::All => present.into_iter().collect(),
        SsSelection::Subset(wanted) => present.intersection(wanted).copied().collect(),
    };

    let runs = group_by(&entry.dssp);
    let mut elements = Vec::new();

    for ss in to_isolate {
        let mut counter = 0usize;
        for (code, range) in &runs {
            if *code != ss || range.len() < config.minimum {
                continue;
            }
            let numbers = resids[range.clone()].to_vec();

            let mut selection = Selection::new().with_residue_numbers(numbers);
            if let AtomFilter::Names(names) = &config.atoms {
                selection = selection.with_atom_names(names.iter());
            }

            let element = selection.extract(model)?;
            elements.push((format!("{stem}_{ss}_{counter}.pdb"), element));
            counter += 1;
        }
    }

    Ok(elements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use nalgebra::Point3;

    fn model_with_numbers(numbers: &[isize]) -> StructureModel {
        let mut model = StructureModel::new();
        let chain = model.add_chain('A');
        let mut serial = 1;
        for &number in numbers {
            let res = model.add_residue(chain, number, "ALA", ' ').unwrap();
            for name in ["N", "CA", "C"] {
                model.add_atom_to_residue(
                    res,
                    Atom::new(name, serial, res, Point3::new(serial as f64, 0.0, 0.0)),
                );
                serial += 1;
            }
        }
        model
    }

    fn entry(dssp: &str, resids: &[isize]) -> DsspEntry {
        DsspEntry {
            dssp: dssp.to_string(),
            fasta: "A".repeat(dssp.len()),
            resids: resids
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    #[test]
    fn isolates_runs_per_class() {
        let model = model_with_numbers(&[1, 2, 3, 4, 5]);
        let entry = entry("HHLEE", &[1, 2, 3, 4, 5]);

        let elements =
            extract_elements("12AS_A", &model, &entry, &ExtractConfig::default()).unwrap();

        let names: Vec<&str> = elements.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["12AS_A_E_0.pdb", "12AS_A_H_0.pdb", "12AS_A_L_0.pdb"]);

        let (_, helix) = &elements[1];
        assert_eq!(helix.residue_count(), 2);
        assert_eq!(helix.atom_count(), 6);
    }

    #[test]
    fn subset_selection_limits_classes() {
        let model = model_with_numbers(&[1, 2, 3, 4, 5]);
        let entry = entry("HHLEE", &[1, 2, 3, 4, 5]);
        let config = ExtractConfig {
            structures: SsSelection::Subset(BTreeSet::from(['E'])),
            ..Default::default()
        };

        let elements = extract_elements("x", &model, &entry, &config).unwrap();
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].0, "x_E_0.pdb");
    }

    #[test]
    fn minimum_length_drops_short_runs() {
        let model = model_with_numbers(&[1, 2, 3, 4, 5, 6]);
        let entry = entry("HLHHHL", &[1, 2, 3, 4, 5, 6]);
        let config = ExtractConfig {
            structures: SsSelection::Subset(BTreeSet::from(['H'])),
            minimum: 2,
            ..Default::default()
        };

        let elements = extract_elements("x", &model, &entry, &config).unwrap();
        assert_eq!(elements.len(), 1);
        let (_, run) = &elements[0];
        assert_eq!(run.residue_count(), 3);
    }

    #[test]
    fn repeated_runs_of_a_class_are_counted() {
        let model = model_with_numbers(&[1, 2, 3, 4]);
        let entry = entry("HLHL", &[1, 2, 3, 4]);
        let config = ExtractConfig {
            structures: SsSelection::Subset(BTreeSet::from(['H'])),
            ..Default::default()
        };

        let elements = extract_elements("x", &model, &entry, &config).unwrap();
        let names: Vec<&str> = elements.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["x_H_0.pdb", "x_H_1.pdb"]);
    }

    #[test]
    fn atom_filter_reduces_elements_to_named_atoms() {
        let model = model_with_numbers(&[1, 2]);
        let entry = entry("HH", &[1, 2]);
        let config = ExtractConfig {
            atoms: AtomFilter::Names(BTreeSet::from(["CA".to_string()])),
            ..Default::default()
        };

        let elements = extract_elements("x", &model, &entry, &config).unwrap();
        assert_eq!(elements.len(), 1);
        let (_, element) = &elements[0];
        assert_eq!(element.atom_count(), 2);
    }

    #[test]
    fn residue_matching_uses_the_entry_numbers() {
        // Residue numbering starts at 40; positional indexing would fail.
        let model = model_with_numbers(&[40, 41, 42]);
        let entry = entry("HHH", &[40, 41, 42]);

        let elements =
            extract_elements("x", &model, &entry, &ExtractConfig::default()).unwrap();
        assert_eq!(elements[0].1.residue_count(), 3);
    }

    #[test]
    fn mismatched_entry_is_a_data_error() {
        let model = model_with_numbers(&[1, 2]);
        let entry = entry("HH", &[1]);
        let err =
            extract_elements("x", &model, &entry, &ExtractConfig::default()).unwrap_err();
        assert!(matches!(err, EngineError::DataMismatch(_)));
    }
}
