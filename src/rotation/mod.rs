//! Dihedral-style rotation about a bond axis
//!
//! [`rotate_about`] holds one atom fixed and rigidly rotates everything
//! reachable from a pivot atom, without passing back through the fixed atom,
//! about the `fixed -> pivot` axis.

use crate::math::{self, Normalized};
use crate::molecule::{Molecule, MoleculeError};
use crate::traversal::{self, VisitSet};
use log::{debug, warn};
use nalgebra::Vector3;
use thiserror::Error;

/// Errors that can occur when rotating part of a molecule
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RotationError {
    #[error("Rotation angle must be finite, got {0}")]
    InvalidAngle(f64),

    #[error(transparent)]
    Molecule(#[from] MoleculeError),
}

/// What a call to [`rotate_about`] did
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RotationReport {
    /// Atoms whose positions were rewritten, in visit order
    pub moved: Vec<usize>,

    /// The fixed and pivot atoms share a position, so no axis exists and no
    /// atom was moved
    pub degenerate_axis: bool,

    /// A moved atom other than the pivot is bonded to the fixed atom. The
    /// bond lies in a ring and only part of the ring was rotated.
    pub ring_closure: bool,
}

/// Atoms that [`rotate_about`] would move, in visit order
pub fn moving_atoms(molecule: &Molecule, fixed: usize, pivot: usize) -> Result<Vec<usize>, MoleculeError> {
    molecule.check_index(fixed)?;
    molecule.check_index(pivot)?;

    let mut visits = VisitSet::for_molecule(molecule);
    visits.mark(fixed);

    let mut moving = Vec::new();
    traversal::walk_from(molecule, &mut visits, pivot, |v| moving.push(v.index))?;
    Ok(moving)
}

/// Rotate the pivot side of the `fixed`-`pivot` axis by `theta` radians.
///
/// `fixed` never moves. `pivot` and every atom reachable from it without
/// crossing `fixed` are rotated about the axis through `fixed` pointing at
/// `pivot`. Positive angles follow the right-hand rule about that axis.
pub fn rotate_about(
    molecule: &mut Molecule,
    fixed: usize,
    pivot: usize,
    theta: f64,
) -> Result<RotationReport, RotationError> {
    if !theta.is_finite() {
        return Err(RotationError::InvalidAngle(theta));
    }

    let offset = molecule.position(fixed)?;
    let pivot_position = molecule.position(pivot)?;

    let axis = match math::normalize(&math::sub(&pivot_position, &offset)) {
        Normalized::Unit(axis) => axis,
        Normalized::Degenerate(_) => {
            warn!(
                "Atoms {} and {} share a position; rotation axis is undefined, nothing moved",
                fixed, pivot
            );
            return Ok(RotationReport {
                degenerate_axis: true,
                ..RotationReport::default()
            });
        }
    };

    let moved = moving_atoms(molecule, fixed, pivot)?;
    apply(molecule, &moved, &axis, &offset, theta);

    let ring_closure = closes_ring(molecule, fixed, pivot, &moved)?;
    if ring_closure {
        warn!(
            "Bond {}-{} lies in a ring; rotated {} atoms up to the ring closure",
            fixed,
            pivot,
            moved.len()
        );
    }

    debug!(
        "Rotated {} atoms about {}->{} by {:.6} rad",
        moved.len(),
        fixed,
        pivot,
        theta
    );

    Ok(RotationReport {
        moved,
        degenerate_axis: false,
        ring_closure,
    })
}

/// [`rotate_about`] with the angle given in degrees
pub fn rotate_about_degrees(
    molecule: &mut Molecule,
    fixed: usize,
    pivot: usize,
    degrees: f64,
) -> Result<RotationReport, RotationError> {
    rotate_about(molecule, fixed, pivot, degrees.to_radians())
}

fn apply(molecule: &mut Molecule, moved: &[usize], axis: &Vector3<f64>, offset: &Vector3<f64>, theta: f64) {
    let rotation = math::rodrigues_matrix(axis, theta);
    let atoms = molecule.atoms_mut();
    for &index in moved {
        let local = math::sub(&atoms[index].position, offset);
        atoms[index].position = math::add(&math::rotate_by(&rotation, &local), offset);
    }
}

fn closes_ring(molecule: &Molecule, fixed: usize, pivot: usize, moved: &[usize]) -> Result<bool, MoleculeError> {
    for &index in moved {
        if index != pivot && molecule.neighbors(index)?.contains(&fixed) {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Atom;
    use std::f64::consts::{FRAC_PI_2, PI};

    const TOLERANCE: f64 = 1e-4;

    fn build(points: &[(f64, f64, f64)], bonds: &[(usize, usize)]) -> Molecule {
        let mut mol = Molecule::new("test");
        for &(x, y, z) in points {
            mol.add_atom(Atom::new("C", Vector3::new(x, y, z)));
        }
        for &(a, b) in bonds {
            mol.add_bond(a, b).unwrap();
        }
        mol
    }

    /// A0=(0,0,0), A1=(1,1,0), A2=(1,2,0), A3=(2,2,0) bonded in a chain
    fn bent_chain() -> Molecule {
        build(
            &[(0.0, 0.0, 0.0), (1.0, 1.0, 0.0), (1.0, 2.0, 0.0), (2.0, 2.0, 0.0)],
            &[(0, 1), (1, 2), (2, 3)],
        )
    }

    fn assert_close(actual: Vector3<f64>, expected: Vector3<f64>) {
        assert!(
            (actual - expected).norm() < TOLERANCE,
            "expected {:?}, got {:?}",
            expected,
            actual
        );
    }

    #[test]
    fn test_half_turn_of_bent_chain() {
        let mut mol = bent_chain();
        let report = rotate_about(&mut mol, 1, 2, PI).unwrap();

        assert_eq!(report.moved, vec![2, 3]);
        assert!(!report.degenerate_axis);
        assert!(!report.ring_closure);
        assert_close(mol.position(0).unwrap(), Vector3::new(0.0, 0.0, 0.0));
        assert_close(mol.position(1).unwrap(), Vector3::new(1.0, 1.0, 0.0));
        assert_close(mol.position(2).unwrap(), Vector3::new(1.0, 2.0, 0.0));
        assert_close(mol.position(3).unwrap(), Vector3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_quarter_turn_direction() {
        // Axis 1->2 is +y; rotating (1,0,0) offset by +90° about +y gives (0,0,-1).
        let mut mol = bent_chain();
        rotate_about(&mut mol, 1, 2, FRAC_PI_2).unwrap();
        assert_close(mol.position(3).unwrap(), Vector3::new(1.0, 2.0, -1.0));
    }

    #[test]
    fn test_zero_angle_is_identity() {
        let mut mol = bent_chain();
        let before: Vec<_> = mol.atoms().iter().map(|a| a.position).collect();
        rotate_about(&mut mol, 1, 2, 0.0).unwrap();
        for (atom, p) in mol.atoms().iter().zip(before) {
            assert_close(atom.position, p);
        }
    }

    #[test]
    fn test_inverse_rotation_restores() {
        let mut mol = bent_chain();
        let before: Vec<_> = mol.atoms().iter().map(|a| a.position).collect();
        rotate_about(&mut mol, 0, 1, 0.7).unwrap();
        rotate_about(&mut mol, 0, 1, -0.7).unwrap();
        for (atom, p) in mol.atoms().iter().zip(before) {
            assert_close(atom.position, p);
        }
    }

    #[test]
    fn test_fixed_side_does_not_move() {
        let mut mol = bent_chain();
        let report = rotate_about(&mut mol, 2, 1, 1.0).unwrap();
        assert_eq!(report.moved, vec![1, 0]);
        assert_close(mol.position(2).unwrap(), Vector3::new(1.0, 2.0, 0.0));
        assert_close(mol.position(3).unwrap(), Vector3::new(2.0, 2.0, 0.0));
    }

    #[test]
    fn test_degenerate_axis_moves_nothing() {
        let mut mol = build(
            &[(1.0, 1.0, 1.0), (1.0, 1.0, 1.0), (2.0, 1.0, 1.0)],
            &[(0, 1), (1, 2)],
        );
        let report = rotate_about(&mut mol, 0, 1, 1.0).unwrap();
        assert!(report.degenerate_axis);
        assert!(report.moved.is_empty());
        assert_close(mol.position(2).unwrap(), Vector3::new(2.0, 1.0, 1.0));
    }

    #[test]
    fn test_same_atom_is_degenerate() {
        let mut mol = bent_chain();
        assert!(rotate_about(&mut mol, 1, 1, 1.0).unwrap().degenerate_axis);
    }

    #[test]
    fn test_index_out_of_range() {
        let mut mol = bent_chain();
        assert_eq!(
            rotate_about(&mut mol, 1, 9, 1.0),
            Err(RotationError::Molecule(MoleculeError::InvalidAtomIndex {
                index: 9,
                len: 4
            }))
        );
        assert!(rotate_about(&mut mol, 4, 1, 1.0).is_err());
    }

    #[test]
    fn test_non_finite_angle() {
        let mut mol = bent_chain();
        assert_eq!(
            rotate_about(&mut mol, 1, 2, f64::INFINITY),
            Err(RotationError::InvalidAngle(f64::INFINITY))
        );
    }

    #[test]
    fn test_ring_closure_reported() {
        // Square ring 0-1-2-3-0.
        let mut mol = build(
            &[(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (1.0, 1.0, 0.0), (0.0, 1.0, 0.0)],
            &[(0, 1), (1, 2), (2, 3), (3, 0)],
        );
        let report = rotate_about(&mut mol, 0, 1, 0.5).unwrap();
        assert!(report.ring_closure);
        assert_eq!(report.moved, vec![1, 2, 3]);
        assert_close(mol.position(0).unwrap(), Vector3::zeros());
    }

    #[test]
    fn test_rotation_preserves_distance_to_fixed() {
        let mut mol = build(
            &[
                (0.0, 0.0, 0.0),
                (1.5, 0.0, 0.0),
                (2.0, 1.4, 0.0),
                (3.5, 1.4, 0.3),
                (1.8, 2.2, 1.1),
            ],
            &[(0, 1), (1, 2), (2, 3), (2, 4)],
        );
        let fixed = mol.position(1).unwrap();
        let before: Vec<f64> = mol.atoms().iter().map(|a| (a.position - fixed).norm()).collect();
        let report = rotate_about(&mut mol, 1, 2, 2.3).unwrap();
        for &i in &report.moved {
            let after = (mol.position(i).unwrap() - fixed).norm();
            assert!((after - before[i]).abs() < TOLERANCE);
        }
    }

    #[test]
    fn test_moving_atoms_does_not_mutate() {
        let mol = bent_chain();
        assert_eq!(moving_atoms(&mol, 1, 2).unwrap(), vec![2, 3]);
        assert_eq!(moving_atoms(&mol, 2, 1).unwrap(), vec![1, 0]);
        assert_close(mol.position(3).unwrap(), Vector3::new(2.0, 2.0, 0.0));
    }

    #[test]
    fn test_degrees_matches_radians() {
        let mut a = bent_chain();
        let mut b = bent_chain();
        rotate_about_degrees(&mut a, 1, 2, 180.0).unwrap();
        rotate_about(&mut b, 1, 2, PI).unwrap();
        assert_close(a.position(3).unwrap(), b.position(3).unwrap());
    }
}
