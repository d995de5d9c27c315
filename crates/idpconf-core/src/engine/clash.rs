use crate::core::models::ids::ResidueId;
use crate::core::models::system::StructureModel;
use crate::core::radii::RadiiSet;
use crate::core::utils::geometry::distance;
use crate::engine::error::EngineError;
use crate::engine::graft::DisorderCase;

/// Budgets for a steric clash check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClashParams {
    /// Counting aborts once this many clashes are seen.
    pub max_clash: usize,
    /// Slack added to the sum of van der Waals radii, in Angstroms.
    pub dist_tolerance: f64,
}

impl Default for ClashParams {
    fn default() -> Self {
        Self {
            max_clash: 55,
            dist_tolerance: 0.4,
        }
    }
}

/// Derives rotation and clash budgets from a single tolerance knob.
///
/// The tolerance is clamped to [0, 1]. Low tolerance buys many rotation
/// attempts and a strict clash ceiling; high tolerance inverts both. Above
/// 0.9 the rotation budget floors at 32 attempts.
pub fn derive_budgets(tolerance: f64) -> (usize, ClashParams) {
    let tolerance = tolerance.clamp(0.0, 1.0);

    let mut max_rotation = (256.0 - tolerance * 256.0) as usize;
    if tolerance > 0.9 {
        max_rotation = 32;
    }

    let params = ClashParams {
        max_clash: (tolerance * 80.0) as usize,
        dist_tolerance: tolerance,
    };
    (max_rotation, params)
}

/// The result of counting steric clashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClashOutcome {
    /// Fewer clashes than the budget; the exact count.
    Count(usize),
    /// The budget was reached and counting aborted.
    Exceeded,
}

impl ClashOutcome {
    pub fn is_acceptable(&self) -> bool {
        matches!(self, ClashOutcome::Count(_))
    }
}

/// Counts van der Waals clashes between a static parent and a placed
/// fragment.
///
/// Two atoms clash when their distance undercuts the sum of their van der
/// Waals radii plus the tolerance. The fragment residue overlapping the
/// parent is excluded: the last residue for [`DisorderCase::NTail`], the
/// first for [`DisorderCase::CTail`]. Counting aborts early with
/// [`ClashOutcome::Exceeded`] once `params.max_clash` is reached.
///
/// # Errors
///
/// Returns an error when an element has no radius in `radii`.
pub fn count_clashes(
    parent: &StructureModel,
    fragment: &StructureModel,
    case: Option<DisorderCase>,
    params: &ClashParams,
    radii: &RadiiSet,
) -> Result<ClashOutcome, EngineError> {
    let excluded: Option<ResidueId> = match case {
        Some(DisorderCase::NTail) => fragment.last_residue(),
        Some(DisorderCase::CTail) => fragment.first_residue(),
        _ => None,
    };

    let parent_atoms: Vec<(f64, nalgebra::Point3<f64>)> = parent
        .atoms_ordered()
        .iter()
        .filter_map(|&id| parent.atom(id))
        .map(|a| Ok((radii.get(&a.element)?, a.position)))
        .collect::<Result<_, EngineError>>()?;

    let mut clashes = 0usize;
    for (_, residue) in fragment.residues_ordered() {
        for &atom_id in residue.atoms() {
            let Some(atom) = fragment.atom(atom_id) else {
                continue;
            };
            if Some(atom.residue_id) == excluded {
                continue;
            }
            let fragment_radius = radii.get(&atom.element)?;
            for (parent_radius, parent_pos) in &parent_atoms {
                if clashes >= params.max_clash {
                    return Ok(ClashOutcome::Exceeded);
                }
                if distance(parent_pos, &atom.position)
                    < parent_radius + fragment_radius + params.dist_tolerance
                {
                    clashes += 1;
                }
            }
        }
    }

    Ok(ClashOutcome::Count(clashes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use nalgebra::Point3;

    fn single_atom_model(element_name: &'static str, position: Point3<f64>) -> StructureModel {
        let mut model = StructureModel::new();
        let chain = model.add_chain('A');
        let res = model.add_residue(chain, 1, "GLY", ' ').unwrap();
        model.add_atom_to_residue(res, Atom::new(element_name, 1, res, position));
        model
    }

    fn two_residue_fragment(x0: f64) -> StructureModel {
        let mut model = StructureModel::new();
        let chain = model.add_chain('A');
        for number in 1..=2 {
            let res = model.add_residue(chain, number, "GLY", ' ').unwrap();
            let x = x0 + (number - 1) as f64 * 4.0;
            model.add_atom_to_residue(
                res,
                Atom::new("CA", number as usize, res, Point3::new(x, 0.0, 0.0)),
            );
        }
        model
    }

    #[test]
    fn budgets_follow_the_tolerance_knob() {
        let (rotations, params) = derive_budgets(0.4);
        assert_eq!(rotations, 153);
        assert_eq!(params.max_clash, 32);
        assert!((params.dist_tolerance - 0.4).abs() < 1e-12);

        let (rotations, _) = derive_budgets(0.95);
        assert_eq!(rotations, 32);

        let (rotations, params) = derive_budgets(-3.0);
        assert_eq!(rotations, 256);
        assert_eq!(params.max_clash, 0);
        assert_eq!(params.dist_tolerance, 0.0);

        let (rotations, params) = derive_budgets(7.0);
        assert_eq!(rotations, 32);
        assert_eq!(params.max_clash, 80);
        assert_eq!(params.dist_tolerance, 1.0);
    }

    #[test]
    fn touching_carbons_clash_and_distant_ones_do_not() {
        let parent = single_atom_model("C", Point3::origin());
        let params = ClashParams::default();
        let radii = RadiiSet::tsai_1999();

        // 3.0 A < 1.7 + 1.7 + 0.4
        let close = single_atom_model("C", Point3::new(3.0, 0.0, 0.0));
        assert_eq!(
            count_clashes(&parent, &close, None, &params, &radii).unwrap(),
            ClashOutcome::Count(1)
        );

        let far = single_atom_model("C", Point3::new(5.0, 0.0, 0.0));
        assert_eq!(
            count_clashes(&parent, &far, None, &params, &radii).unwrap(),
            ClashOutcome::Count(0)
        );
    }

    #[test]
    fn counting_aborts_at_the_budget() {
        let parent = two_residue_fragment(0.0);
        let fragment = two_residue_fragment(0.5);
        let params = ClashParams {
            max_clash: 1,
            dist_tolerance: 0.4,
        };
        let radii = RadiiSet::tsai_1999();

        assert_eq!(
            count_clashes(&parent, &fragment, None, &params, &radii).unwrap(),
            ClashOutcome::Exceeded
        );
    }

    #[test]
    fn overlap_residue_is_excluded_per_case() {
        let parent = single_atom_model("C", Point3::origin());
        let radii = RadiiSet::tsai_1999();
        let params = ClashParams::default();

        // Fragment residue 1 sits right on the parent atom.
        let fragment = two_residue_fragment(0.0);

        // As a C-tail, residue 1 is the overlap and is skipped.
        let ctail =
            count_clashes(&parent, &fragment, Some(DisorderCase::CTail), &params, &radii).unwrap();
        assert_eq!(ctail, ClashOutcome::Count(0));

        // As an N-tail, residue 2 is skipped instead; residue 1 clashes.
        let ntail =
            count_clashes(&parent, &fragment, Some(DisorderCase::NTail), &params, &radii).unwrap();
        assert_eq!(ntail, ClashOutcome::Count(1));
    }

    #[test]
    fn unknown_element_surfaces_radii_error() {
        let parent = single_atom_model("C", Point3::origin());
        let fragment = single_atom_model("XE", Point3::new(1.0, 0.0, 0.0));
        let radii = RadiiSet::tsai_1999();

        let err = count_clashes(&parent, &fragment, None, &ClashParams::default(), &radii)
            .unwrap_err();
        assert!(matches!(err, EngineError::Radii(_)));
    }

    #[test]
    fn outcome_acceptability() {
        assert!(ClashOutcome::Count(3).is_acceptable());
        assert!(!ClashOutcome::Exceeded.is_acceptable());
    }
}
