use crate::core::dssp::DsspEntry;
use crate::core::io::pdb::PdbFile;
use crate::core::io::traits::StructureFile;
use crate::core::models::system::StructureModel;
use crate::core::selection::Selection;
use crate::engine::error::EngineError;
use crate::engine::segments::backbone_segments;
use std::collections::BTreeSet;
use tracing::debug;

/// One backbone-continuous piece of a curated entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentedEntry {
    /// Database key, `<stem>_seg<i>`.
    pub key: String,
    /// The secondary-structure record reduced to this segment.
    pub entry: DsspEntry,
    /// PDB text holding only this segment's residues.
    pub pdb: String,
}

/// Splits a curated entry into backbone-continuous segments.
///
/// The structure decides the segment boundaries; the secondary-structure
/// entry is then reduced segment by segment so its strings stay
/// index-aligned with each segment's residue list. Residues DSSP reported
/// but the segment lacks (and vice versa) are dropped on both sides, the
/// way two mismatched lists are reconciled by intersection.
///
/// Segments shorter than `minimum` residues are discarded; emitted segments
/// are numbered consecutively.
///
/// # Errors
///
/// Propagates continuity-analysis, selection, and serialization errors, and
/// reports [`EngineError::DataMismatch`] when the entry's parallel strings
/// disagree in length.
pub fn split_entry(
    stem: &str,
    model: &StructureModel,
    entry: &DsspEntry,
    minimum: usize,
) -> Result<Vec<SegmentedEntry>, EngineError> {
    let segments = backbone_segments(model)?;
    let resids = entry.resid_numbers()?;
    let dssp_chars: Vec<char> = entry.dssp.chars().collect();
    let fasta_chars: Vec<char> = entry.fasta.chars().collect();

    if dssp_chars.len() != resids.len() || fasta_chars.len() != resids.len() {
        return Err(EngineError::DataMismatch(format!(
            "entry '{stem}' has {} residue ids, {} codes, {} residues",
            resids.len(),
            dssp_chars.len(),
            fasta_chars.len()
        )));
    }

    let mut out = Vec::new();
    let mut counter = 0usize;

    for segment in segments {
        if segment.len() < minimum {
            debug!(
                "dropping segment of {} residues below minimum {minimum}",
                segment.len()
            );
            continue;
        }
        let in_segment: BTreeSet<isize> = segment.iter().copied().collect();

        // Indices of the DSSP rows this segment covers.
        let indices: Vec<usize> = resids
            .iter()
            .enumerate()
            .filter(|(_, r)| in_segment.contains(r))
            .map(|(i, _)| i)
            .collect();
        if indices.is_empty() {
            debug!("segment of '{stem}' has no secondary-structure rows, skipping");
            continue;
        }

        let reduction: Vec<isize> = indices.iter().map(|&i| resids[i]).collect();
        let sub_entry = DsspEntry {
            dssp: indices.iter().map(|&i| dssp_chars[i]).collect(),
            fasta: indices.iter().map(|&i| fasta_chars[i]).collect(),
            resids: reduction
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join(","),
        };

        let sub_model = Selection::new()
            .with_residue_numbers(reduction.iter().copied())
            .extract(model)?;
        let pdb = PdbFile::write_to_string(&sub_model)?;

        out.push(SegmentedEntry {
            key: format!("{stem}_seg{counter}"),
            entry: sub_entry,
            pdb,
        });
        counter += 1;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use nalgebra::Point3;

    fn gapped_model() -> StructureModel {
        let mut model = StructureModel::new();
        let chain = model.add_chain('A');
        let mut serial = 1;
        let mut place = |model: &mut StructureModel, number: isize, x0: f64| {
            let res = model.add_residue(chain, number, "ALA", ' ').unwrap();
            for (i, name) in ["N", "CA", "C"].into_iter().enumerate() {
                model.add_atom_to_residue(
                    res,
                    Atom::new(name, serial, res, Point3::new(x0 + i as f64 * 1.4, 0.0, 0.0)),
                );
                serial += 1;
            }
        };
        place(&mut model, 1, 0.0);
        place(&mut model, 2, 4.2);
        place(&mut model, 10, 30.0);
        place(&mut model, 11, 34.2);
        place(&mut model, 12, 38.4);
        model
    }

    fn full_entry() -> DsspEntry {
        DsspEntry {
            dssp: "HHEEE".into(),
            fasta: "AAAAA".into(),
            resids: "1,2,10,11,12".into(),
        }
    }

    #[test]
    fn splits_into_aligned_segments() {
        let model = gapped_model();
        let segments = split_entry("12AS_A", &model, &full_entry(), 2).unwrap();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].key, "12AS_A_seg0");
        assert_eq!(segments[0].entry.dssp, "HH");
        assert_eq!(segments[0].entry.fasta, "AA");
        assert_eq!(segments[0].entry.resids, "1,2");

        assert_eq!(segments[1].key, "12AS_A_seg1");
        assert_eq!(segments[1].entry.dssp, "EEE");
        assert_eq!(segments[1].entry.resids, "10,11,12");
    }

    #[test]
    fn segment_pdbs_parse_back_to_the_right_residues() {
        let model = gapped_model();
        let segments = split_entry("x", &model, &full_entry(), 2).unwrap();

        let first = PdbFile::read_from(&mut segments[0].pdb.as_bytes()).unwrap();
        assert_eq!(first.residue_count(), 2);

        let second = PdbFile::read_from(&mut segments[1].pdb.as_bytes()).unwrap();
        assert_eq!(second.residue_count(), 3);
        let numbers: Vec<isize> = second.residues_ordered().map(|(_, r)| r.number).collect();
        assert_eq!(numbers, vec![10, 11, 12]);
    }

    #[test]
    fn minimum_drops_short_segments_and_renumbers_keys() {
        let model = gapped_model();
        let segments = split_entry("x", &model, &full_entry(), 3).unwrap();

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].key, "x_seg0");
        assert_eq!(segments[0].entry.dssp, "EEE");
    }

    #[test]
    fn dssp_rows_missing_from_a_segment_are_dropped_on_both_sides() {
        let model = gapped_model();
        // DSSP only reported residues 1, 2, 11, 12 (10 missing).
        let entry = DsspEntry {
            dssp: "HHEE".into(),
            fasta: "AAAA".into(),
            resids: "1,2,11,12".into(),
        };

        let segments = split_entry("x", &model, &entry, 2).unwrap();
        assert_eq!(segments[1].entry.resids, "11,12");
        assert_eq!(segments[1].entry.dssp, "EE");

        // The PDB side keeps only residues present in the reduction.
        let second = PdbFile::read_from(&mut segments[1].pdb.as_bytes()).unwrap();
        assert_eq!(second.residue_count(), 2);
    }

    #[test]
    fn mismatched_strings_are_a_data_error() {
        let model = gapped_model();
        let entry = DsspEntry {
            dssp: "HH".into(),
            fasta: "AAAAA".into(),
            resids: "1,2,10,11,12".into(),
        };
        assert!(matches!(
            split_entry("x", &model, &entry, 2),
            Err(EngineError::DataMismatch(_))
        ));
    }
}
