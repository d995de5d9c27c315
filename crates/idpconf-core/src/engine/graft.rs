use crate::core::models::ids::{AtomId, ResidueId};
use crate::core::models::system::StructureModel;
use crate::core::utils::geometry::{rotate_about_point, rotation_about_z};
use crate::engine::error::EngineError;
use nalgebra::{Point3, Vector3};
use std::fmt;
use std::str::FromStr;

/// The placement of a disordered region relative to a folded domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisorderCase {
    /// Disordered tail preceding the folded N-terminus.
    NTail,
    /// Disordered linker between two folded regions.
    Linker,
    /// Disordered tail following the folded C-terminus.
    CTail,
}

impl fmt::Display for DisorderCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                DisorderCase::NTail => "N-IDR",
                DisorderCase::Linker => "Break-IDR",
                DisorderCase::CTail => "C-IDR",
            }
        )
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid disorder case '{0}' (expected n-idr, break-idr, or c-idr)")]
pub struct ParseDisorderCaseError(String);

impl FromStr for DisorderCase {
    type Err = ParseDisorderCaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "n-idr" | "nidr" | "n" => Ok(DisorderCase::NTail),
            "break-idr" | "break" | "linker" => Ok(DisorderCase::Linker),
            "c-idr" | "cidr" | "c" => Ok(DisorderCase::CTail),
            _ => Err(ParseDisorderCaseError(s.to_string())),
        }
    }
}

/// The atom a fragment pivots and translates on.
///
/// For an N-tail the fragment is built backwards, so its anchor is the
/// *last* backbone nitrogen; for a C-tail it is the *first*. The anchor
/// residue overlaps the folded structure's terminal residue and is removed
/// again during [`graft`].
///
/// # Errors
///
/// Returns [`EngineError::MissingAnchor`] when no nitrogen exists, or
/// [`EngineError::UnsupportedCase`] for linkers.
pub fn anchor_atom(model: &StructureModel, case: DisorderCase) -> Result<AtomId, EngineError> {
    let ordered = model.atoms_ordered();
    let mut nitrogens = ordered
        .iter()
        .filter(|&&id| model.atom(id).map(|a| a.name == "N").unwrap_or(false));

    let found = match case {
        DisorderCase::NTail => nitrogens.next_back(),
        DisorderCase::CTail => nitrogens.next(),
        DisorderCase::Linker => return Err(EngineError::UnsupportedCase { case }),
    };
    found
        .copied()
        .ok_or(EngineError::MissingAnchor { case, atom: "N" })
}

/// Rigidly translates the whole fragment so its anchor lands on `target`.
///
/// # Errors
///
/// Propagates anchor resolution failures.
pub fn translate_to(
    model: &mut StructureModel,
    case: DisorderCase,
    target: &Point3<f64>,
) -> Result<(), EngineError> {
    let anchor = anchor_atom(model, case)?;
    let anchor_pos = model
        .atom(anchor)
        .ok_or_else(|| EngineError::Internal("anchor atom disappeared".into()))?
        .position;
    let shift: Vector3<f64> = target - anchor_pos;

    for (_, atom) in model.atoms_iter_mut() {
        atom.position += shift;
    }
    Ok(())
}

/// Rigidly rotates the fragment about the Z axis through its anchor atom.
///
/// # Errors
///
/// Propagates anchor resolution failures.
pub fn spin(model: &mut StructureModel, case: DisorderCase, angle: f64) -> Result<(), EngineError> {
    let anchor = anchor_atom(model, case)?;
    let pivot = model
        .atom(anchor)
        .ok_or_else(|| EngineError::Internal("anchor atom disappeared".into()))?
        .position;
    let rotation = rotation_about_z(angle);

    for (_, atom) in model.atoms_iter_mut() {
        atom.position = rotate_about_point(&atom.position, &pivot, &rotation);
    }
    Ok(())
}

/// Grafts a disordered fragment onto a folded structure.
///
/// The overlap residue is dropped (the fragment's last residue for an
/// N-tail, the folded structure's last residue for a C-tail), the C-tail
/// fragment is renumbered to continue the folded numbering, and the result
/// is rebuilt on a single chain `A` with serials restarting from 1.
///
/// Residue numbers of the two inputs must not collide after the overlap
/// removal; colliding residues would merge.
///
/// # Errors
///
/// Returns [`EngineError::UnsupportedCase`] for linkers and
/// [`EngineError::EmptyStructure`] when either input has no residues.
pub fn graft(
    folded: &StructureModel,
    fragment: &StructureModel,
    case: DisorderCase,
) -> Result<StructureModel, EngineError> {
    let mut out = StructureModel::new();
    let mut serial = 1;

    match case {
        DisorderCase::Linker => return Err(EngineError::UnsupportedCase { case }),
        DisorderCase::NTail => {
            let overlap = fragment.last_residue().ok_or(EngineError::EmptyStructure)?;
            copy_residues(&mut out, fragment, Some(overlap), None, &mut serial);
            copy_residues(&mut out, folded, None, None, &mut serial);
        }
        DisorderCase::CTail => {
            let overlap = folded.last_residue().ok_or(EngineError::EmptyStructure)?;
            copy_residues(&mut out, folded, Some(overlap), None, &mut serial);
            let next_number = out
                .residues_ordered()
                .last()
                .map(|(_, r)| r.number + 1)
                .ok_or(EngineError::EmptyStructure)?;
            copy_residues(&mut out, fragment, None, Some(next_number), &mut serial);
        }
    }

    if out.atom_count() == 0 {
        return Err(EngineError::EmptyStructure);
    }
    Ok(out)
}

fn copy_residues(
    out: &mut StructureModel,
    src: &StructureModel,
    skip: Option<ResidueId>,
    renumber_from: Option<isize>,
    serial: &mut usize,
) {
    let chain = out.add_chain('A');
    let mut next_number = renumber_from;

    for (residue_id, residue) in src.residues_ordered() {
        if Some(residue_id) == skip {
            continue;
        }
        let (number, icode) = match &mut next_number {
            Some(n) => {
                let number = *n;
                *n += 1;
                (number, ' ')
            }
            None => (residue.number, residue.icode),
        };
        let Some(out_residue) = out.add_residue(chain, number, &residue.name, icode) else {
            continue;
        };
        for &atom_id in residue.atoms() {
            let Some(atom) = src.atom(atom_id) else {
                continue;
            };
            let mut copy = atom.clone();
            copy.serial = *serial;
            *serial += 1;
            copy.residue_id = out_residue;
            out.add_atom_to_residue(out_residue, copy);
        }
    }
}
