use crate::core::models::system::StructureModel;
use crate::core::radii::RadiiSet;
use crate::engine::clash::{ClashOutcome, count_clashes};
use crate::engine::config::AttachConfig;
use crate::engine::error::EngineError;
use crate::engine::graft::{self, DisorderCase};
use crate::engine::progress::ProgressReporter;
use nalgebra::Point3;
use rand::Rng;
use tracing::{debug, info, instrument};

/// The result of attaching a fragment onto a folded domain.
#[derive(Debug, Clone)]
pub struct Attachment {
    /// The grafted structure, on a single chain with fresh serials.
    pub structure: StructureModel,
    /// Clashes counted for the accepted orientation.
    pub clashes: usize,
    /// How many random rotations were spent before acceptance.
    pub rotations: usize,
}

/// Attaches a disordered fragment conformer onto a folded structure.
///
/// The fragment is tethered so its anchor nitrogen sits on the folded
/// structure's terminal overlap residue, then spun about the tether in
/// random orientations until one passes the clash check, and finally
/// grafted. Folded-region atoms are never moved and never clash-checked
/// against each other; only fragment-against-folded contacts count.
///
/// # Errors
///
/// Returns [`EngineError::TooManyClashes`] when the rotation budget is
/// exhausted, and propagates tethering, clash-counting, and grafting
/// failures.
#[instrument(skip_all, name = "attach_workflow")]
pub fn run(
    folded: &StructureModel,
    fragment: &StructureModel,
    config: &AttachConfig,
    radii: &RadiiSet,
    reporter: &ProgressReporter,
) -> Result<Attachment, EngineError> {
    reporter.phase("Tethering");
    info!(
        "tethering {} fragment of {} residues onto folded structure of {} residues",
        config.case,
        fragment.residue_count(),
        folded.residue_count()
    );

    let target = tether_point(folded, config.case)?;
    let mut candidate = fragment.clone();
    graft::translate_to(&mut candidate, config.case, &target)?;
    reporter.phase_done();

    reporter.phase("Sampling orientations");
    reporter.task(config.max_rotation as u64 + 1);

    let mut rng = rand::thread_rng();
    for attempt in 0..=config.max_rotation {
        reporter.tick();
        match count_clashes(folded, &candidate, Some(config.case), &config.clash, radii)? {
            ClashOutcome::Count(clashes) => {
                reporter.task_done();
                reporter.phase_done();
                info!("accepted orientation after {attempt} rotations ({clashes} clashes)");

                let structure = graft::graft(folded, &candidate, config.case)?;
                return Ok(Attachment {
                    structure,
                    clashes,
                    rotations: attempt,
                });
            }
            ClashOutcome::Exceeded => {
                debug!("orientation {attempt} exceeded the clash budget, respinning");
                let angle = rng.gen_range(0.0..std::f64::consts::TAU);
                graft::spin(&mut candidate, config.case, angle)?;
            }
        }
    }

    reporter.task_done();
    reporter.phase_done();
    Err(EngineError::TooManyClashes {
        rotations: config.max_rotation,
    })
}

// The fragment's anchor lands on the folded overlap residue's nitrogen:
// the first residue for an N-tail, the last for a C-tail.
fn tether_point(folded: &StructureModel, case: DisorderCase) -> Result<Point3<f64>, EngineError> {
    let residue_id = match case {
        DisorderCase::NTail => folded.first_residue(),
        DisorderCase::CTail => folded.last_residue(),
        DisorderCase::Linker => return Err(EngineError::UnsupportedCase { case }),
    }
    .ok_or(EngineError::EmptyStructure)?;

    let residue = folded
        .residue(residue_id)
        .ok_or_else(|| EngineError::Internal("terminal residue disappeared".into()))?;
    let nitrogen = residue
        .atom_by_name("N")
        .ok_or(EngineError::MissingAnchor { case, atom: "N" })?;
    Ok(folded
        .atom(nitrogen)
        .ok_or_else(|| EngineError::Internal("anchor atom disappeared".into()))?
        .position)
}
