use thiserror::Error;

use super::graft::DisorderCase;
use crate::core::dssp::DsspError;
use crate::core::io::ReadError;
use crate::core::io::pdb::PdbError;
use crate::core::radii::RadiiError;
use crate::core::selection::EmptySelection;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Pdb(#[from] PdbError),

    #[error(transparent)]
    Dssp(#[from] DsspError),

    #[error(transparent)]
    Radii(#[from] RadiiError),

    #[error(transparent)]
    EmptySelection(#[from] EmptySelection),

    #[error("Structure has no residues")]
    EmptyStructure,

    #[error("Residue {residue} is missing backbone atom {atom}")]
    IncompleteBackbone { residue: isize, atom: &'static str },

    #[error("Missing anchor atom '{atom}' for {case}")]
    MissingAnchor {
        case: DisorderCase,
        atom: &'static str,
    },

    #[error("Disorder case {case} is not supported for this operation")]
    UnsupportedCase { case: DisorderCase },

    #[error("No clash-free orientation found after {rotations} rotations")]
    TooManyClashes { rotations: usize },

    #[error("Structure and secondary-structure data disagree: {0}")]
    DataMismatch(String),

    #[error("Internal logic error: {0}")]
    Internal(String),
}
