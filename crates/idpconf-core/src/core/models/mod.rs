pub mod atom;
pub mod builder;
pub mod chain;
pub mod ids;
pub mod residue;
pub mod system;
