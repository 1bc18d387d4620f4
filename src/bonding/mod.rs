//! Bond inference from interatomic distance

use crate::math;
use crate::molecule::{BondPolicy, Molecule, MoleculeError};
use log::debug;
use thiserror::Error;

/// Errors that can occur while inferring bonds
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BondingError {
    #[error("Bond threshold must be a finite positive length, got {0}")]
    InvalidThreshold(f64),

    #[error(transparent)]
    Molecule(#[from] MoleculeError),
}

/// Summary of one [`infer_bonds`] pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InferenceReport {
    /// Number of unordered atom pairs whose distance was measured
    pub pairs_examined: usize,
    /// Bonds added to the molecule
    pub bonds_added: usize,
    /// Pairs within the threshold that were already bonded
    pub already_bonded: usize,
}

/// Bond every pair of distinct atoms closer than `threshold`.
///
/// Each unordered pair `(i, j)` with `i < j` is measured once; a bond is
/// added when the distance is strictly less than `threshold`. Under the
/// strict policy, pairs that are already bonded are counted and skipped.
pub fn infer_bonds(molecule: &mut Molecule, threshold: f64) -> Result<InferenceReport, BondingError> {
    if !threshold.is_finite() || threshold <= 0.0 {
        return Err(BondingError::InvalidThreshold(threshold));
    }

    let mut report = InferenceReport::default();
    let n = molecule.len();
    let strict = molecule.policy() == BondPolicy::Strict;

    for i in 0..n {
        for j in (i + 1)..n {
            report.pairs_examined += 1;

            let pi = molecule.atoms()[i].position;
            let pj = molecule.atoms()[j].position;
            let distance = math::magnitude(&math::sub(&pi, &pj));

            if distance >= threshold {
                continue;
            }
            if strict && molecule.is_bonded(i, j) {
                report.already_bonded += 1;
                continue;
            }

            molecule.add_bond(i, j)?;
            report.bonds_added += 1;
        }
    }

    debug!(
        "Inferred {} bonds over {} pairs (threshold {} Å, {} already bonded)",
        report.bonds_added, report.pairs_examined, threshold, report.already_bonded
    );

    Ok(report)
}
