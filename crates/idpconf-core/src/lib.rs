//! # IDPConfGen Core Library
//!
//! A library for curating structural databases of folded proteins and for
//! grafting disordered regions onto folded domains, supporting conformer
//! generation pipelines for intrinsically disordered proteins (IDPs).
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a
//! clear separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless data models
//!   (`StructureModel`), file-format parsers and writers (PDB v3, mmCIF,
//!   DSSP), typed identifiers, atom selections, and geometry utilities.
//!
//! - **[`engine`]: The Logic Core.** This stateful layer implements the
//!   operations that transform structures: backbone continuity analysis,
//!   secondary-structure element extraction, steric clash detection, and
//!   disordered-region grafting.
//!
//! - **[`workflows`]: The Public API.** The highest-level, user-facing layer.
//!   It ties `engine` and `core` together to execute complete procedures,
//!   such as segmenting a curated database entry or attaching a disordered
//!   tail conformer onto a folded structure.

pub mod core;
pub mod engine;
pub mod workflows;
