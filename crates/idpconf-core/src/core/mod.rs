pub mod dssp;
pub mod identifiers;
pub mod io;
pub mod models;
pub mod radii;
pub mod selection;
pub mod utils;
