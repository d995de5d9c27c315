use crate::core::models::system::StructureModel;
use crate::engine::error::EngineError;
use nalgebra::Point3;
use std::ops::Range;

/// Consecutive backbone atoms further apart than this are a chain break.
///
/// Peptide-bond C-N distances sit near 1.33 A and covalent backbone
/// distances below 1.6 A, so 2.1 A separates bonded from broken with a wide
/// margin on both sides.
pub const BACKBONE_GAP_ANGSTROMS: f64 = 2.1;

/// Groups consecutive integers into inclusive (first, last) bounds.
pub fn group_runs(values: &[isize]) -> Vec<(isize, isize)> {
    let mut runs = Vec::new();
    let mut iter = values.iter().copied();
    let Some(first) = iter.next() else {
        return runs;
    };

    let mut start = first;
    let mut prev = first;
    for v in iter {
        if v != prev + 1 {
            runs.push((start, prev));
            start = v;
        }
        prev = v;
    }
    runs.push((start, prev));
    runs
}

/// Run-length encodes a string into (char, index range) slices.
pub fn group_by(s: &str) -> Vec<(char, Range<usize>)> {
    let mut groups = Vec::new();
    let mut chars = s.chars().enumerate();
    let Some((_, first)) = chars.next() else {
        return groups;
    };

    let mut current = first;
    let mut start = 0;
    let mut end = 1;
    for (i, c) in chars {
        if c != current {
            groups.push((current, start..i));
            current = c;
            start = i;
        }
        end = i + 1;
    }
    groups.push((current, start..end));
    groups
}

/// Splits a structure into backbone-continuous segments of residue numbers.
///
/// Amino acid residues are walked in file order; their N, CA, and C atoms
/// must all be present. A segment boundary is placed wherever the peptide
/// C-N distance between consecutive residues exceeds
/// [`BACKBONE_GAP_ANGSTROMS`]. Non-amino-acid residues (waters, ligands)
/// are ignored.
///
/// # Errors
///
/// Returns [`EngineError::IncompleteBackbone`] naming the first residue
/// with a missing backbone atom, or [`EngineError::EmptyStructure`] when no
/// amino acid residues exist.
pub fn backbone_segments(model: &StructureModel) -> Result<Vec<Vec<isize>>, EngineError> {
    let backbone = collect_backbone(model)?;

    let mut segments = Vec::new();
    let mut current = vec![backbone[0].0];
    for window in backbone.windows(2) {
        let (_, [_, _, c_prev]) = window[0];
        let (number, [n_next, _, _]) = window[1];
        if (c_prev - n_next).norm() > BACKBONE_GAP_ANGSTROMS {
            segments.push(std::mem::take(&mut current));
        }
        current.push(number);
    }
    segments.push(current);
    Ok(segments)
}

/// The one-letter sequences of the backbone-continuous segments.
///
/// # Errors
///
/// Propagates the errors of [`backbone_segments`].
pub fn folded_sequences(model: &StructureModel) -> Result<Vec<String>, EngineError> {
    let segments = backbone_segments(model)?;

    let mut sequences = Vec::with_capacity(segments.len());
    for segment in &segments {
        let seq: String = model
            .residues_ordered()
            .filter(|(_, r)| segment.contains(&r.number))
            .map(|(_, r)| r.kind().one_letter().unwrap_or('X'))
            .collect();
        sequences.push(seq);
    }
    Ok(sequences)
}

type ResidueBackbone = (isize, [Point3<f64>; 3]);

fn collect_backbone(model: &StructureModel) -> Result<Vec<ResidueBackbone>, EngineError> {
    let mut backbone = Vec::new();
    for (_, residue) in model.residues_ordered() {
        if !residue.kind().is_amino_acid() {
            continue;
        }
        let mut positions = [Point3::origin(); 3];
        for (slot, name) in ["N", "CA", "C"].into_iter().enumerate() {
            let atom_id =
                residue
                    .atom_by_name(name)
                    .ok_or(EngineError::IncompleteBackbone {
                        residue: residue.number,
                        atom: name,
                    })?;
            positions[slot] = model
                .atom(atom_id)
                .ok_or_else(|| EngineError::Internal("residue names a missing atom".into()))?
                .position;
        }
        backbone.push((residue.number, positions));
    }

    if backbone.is_empty() {
        return Err(EngineError::EmptyStructure);
    }
    Ok(backbone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;

    // Two continuous residues, a 10 A gap, then two more.
    fn gapped_model() -> StructureModel {
        let mut model = StructureModel::new();
        let chain = model.add_chain('A');

        let mut serial = 1;
        let mut place = |model: &mut StructureModel, number: isize, x0: f64| {
            let res = model.add_residue(chain, number, "GLY", ' ').unwrap();
            for (i, name) in ["N", "CA", "C"].iter().enumerate() {
                let atom = Atom::new(
                    name,
                    serial,
                    res,
                    Point3::new(x0 + i as f64 * 1.4, 0.0, 0.0),
                );
                model.add_atom_to_residue(res, atom);
                serial += 1;
            }
        };

        place(&mut model, 1, 0.0);
        place(&mut model, 2, 4.2); // C(1) at 2.8, N(2) at 4.2 -> 1.4 A, bonded
        place(&mut model, 10, 17.0); // C(2) at 7.0, N(10) at 17.0 -> 10 A, break
        place(&mut model, 11, 21.2);

        model
    }

    #[test]
    fn group_runs_splits_on_gaps() {
        assert_eq!(group_runs(&[1, 2, 3, 7, 8, 12]), vec![(1, 3), (7, 8), (12, 12)]);
        assert_eq!(group_runs(&[5]), vec![(5, 5)]);
        assert!(group_runs(&[]).is_empty());
    }

    #[test]
    fn group_by_run_length_encodes() {
        let groups = group_by("HHEELLL");
        assert_eq!(
            groups,
            vec![('H', 0..2), ('E', 2..4), ('L', 4..7)]
        );
        assert!(group_by("").is_empty());
        assert_eq!(group_by("H"), vec![('H', 0..1)]);
    }

    #[test]
    fn continuous_backbone_is_one_segment() {
        let mut model = StructureModel::new();
        let chain = model.add_chain('A');
        let mut serial = 1;
        for number in 1..=3 {
            let res = model.add_residue(chain, number, "ALA", ' ').unwrap();
            let x0 = (number - 1) as f64 * 4.2;
            for (i, name) in ["N", "CA", "C"].iter().enumerate() {
                model.add_atom_to_residue(
                    res,
                    Atom::new(name, serial, res, Point3::new(x0 + i as f64 * 1.4, 0.0, 0.0)),
                );
                serial += 1;
            }
        }

        let segments = backbone_segments(&model).unwrap();
        assert_eq!(segments, vec![vec![1, 2, 3]]);
    }

    #[test]
    fn gap_splits_into_two_segments() {
        let segments = backbone_segments(&gapped_model()).unwrap();
        assert_eq!(segments, vec![vec![1, 2], vec![10, 11]]);
    }

    #[test]
    fn waters_do_not_participate() {
        let mut model = gapped_model();
        let chain = model.find_chain_by_id('A').unwrap();
        let hoh = model.add_residue(chain, 200, "HOH", ' ').unwrap();
        model.add_atom_to_residue(hoh, Atom::new("O", 99, hoh, Point3::new(50.0, 0.0, 0.0)));

        let segments = backbone_segments(&model).unwrap();
        assert_eq!(segments.len(), 2);
    }

    #[test]
    fn missing_backbone_atom_is_reported() {
        let mut model = StructureModel::new();
        let chain = model.add_chain('A');
        let res = model.add_residue(chain, 7, "ALA", ' ').unwrap();
        model.add_atom_to_residue(res, Atom::new("N", 1, res, Point3::origin()));
        model.add_atom_to_residue(res, Atom::new("CA", 2, res, Point3::new(1.4, 0.0, 0.0)));

        let err = backbone_segments(&model).unwrap_err();
        match err {
            EngineError::IncompleteBackbone { residue, atom } => {
                assert_eq!(residue, 7);
                assert_eq!(atom, "C");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_structure_is_an_error() {
        let model = StructureModel::new();
        assert!(matches!(
            backbone_segments(&model),
            Err(EngineError::EmptyStructure)
        ));
    }

    #[test]
    fn folded_sequences_follow_segments() {
        let seqs = folded_sequences(&gapped_model()).unwrap();
        assert_eq!(seqs, vec!["GG".to_string(), "GG".to_string()]);
    }
}
