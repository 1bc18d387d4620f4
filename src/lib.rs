//! bondrot: bond inference and dihedral rotation for small molecules
//!
//! This library models a molecule as atoms connected by bonds, infers
//! connectivity from interatomic distance, and rotates the part of the bond
//! graph on one side of a bond about that bond's axis.

pub mod atom;
pub mod bonding;
pub mod config;
pub mod io;
pub mod math;
pub mod molecule;
pub mod rotation;
pub mod script;
pub mod traversal;

// Re-export commonly used types and functions
pub use atom::{Atom, AtomName};
pub use bonding::infer_bonds;
pub use config::Config;
pub use molecule::{BondPolicy, Molecule};
pub use rotation::{rotate_about, RotationReport};
pub use script::Session;

use thiserror::Error;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Any error produced by this crate
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::IoError),

    #[error(transparent)]
    Molecule(#[from] molecule::MoleculeError),

    #[error(transparent)]
    Bonding(#[from] bonding::BondingError),

    #[error(transparent)]
    Rotation(#[from] rotation::RotationError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Session(#[from] script::SessionError),
}

/// Result type for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let err: Error = molecule::MoleculeError::SelfBond(3).into();
        assert_eq!(err.to_string(), "Cannot bond atom 3 to itself");
    }
}
