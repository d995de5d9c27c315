pub mod attach;
pub mod extract;
pub mod fasta;
pub mod fetch;
pub mod sscalc;
