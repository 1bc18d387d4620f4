//! Molecule representation: atom storage and the symmetric bond relation

use crate::atom::Atom;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Starting capacity of each atom's neighbor list
pub const INITIAL_BONDS: usize = 5;

/// Errors that can occur when working with molecules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoleculeError {
    #[error("Invalid atom index {index} (molecule has {len} atoms)")]
    InvalidAtomIndex { index: usize, len: usize },

    #[error("Cannot bond atom {0} to itself")]
    SelfBond(usize),

    #[error("Atoms {0} and {1} are already bonded")]
    DuplicateBond(usize, usize),

    #[error("No atoms in molecule")]
    EmptyMolecule,
}

/// How [`Molecule::add_bond`] treats self bonds and repeated bonds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BondPolicy {
    /// Reject self bonds and bonds that already exist
    #[default]
    Strict,
    /// Record every requested edge, including duplicates and self edges
    Permissive,
}

/// Atoms stored in a single arena with one neighbor list per atom
#[derive(Debug, Clone, Default)]
pub struct Molecule {
    /// Name of the molecule
    pub name: String,

    atoms: Vec<Atom>,

    /// `neighbors[i]` lists bonded atom indices in bond-creation order
    neighbors: Vec<Vec<usize>>,

    policy: BondPolicy,
}

impl Molecule {
    /// Create a new empty molecule
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Create an empty molecule with room for `n` atoms
    pub fn with_capacity(name: &str, n: usize) -> Self {
        Self {
            name: name.to_string(),
            atoms: Vec::with_capacity(n),
            neighbors: Vec::with_capacity(n),
            policy: BondPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: BondPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> BondPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: BondPolicy) {
        self.policy = policy;
    }

    /// Add an atom to the molecule
    pub fn add_atom(&mut self, atom: Atom) -> usize {
        let idx = self.atoms.len();
        self.atoms.push(atom);
        self.neighbors.push(Vec::with_capacity(INITIAL_BONDS));
        idx
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Bounds-checked index validation
    pub fn check_index(&self, index: usize) -> Result<(), MoleculeError> {
        if index < self.atoms.len() {
            Ok(())
        } else {
            Err(MoleculeError::InvalidAtomIndex {
                index,
                len: self.atoms.len(),
            })
        }
    }

    pub fn atom(&self, index: usize) -> Result<&Atom, MoleculeError> {
        self.check_index(index)?;
        Ok(&self.atoms[index])
    }

    pub fn position(&self, index: usize) -> Result<Vector3<f64>, MoleculeError> {
        Ok(self.atom(index)?.position)
    }

    /// Overwrite the position of one atom
    pub fn set_position(&mut self, index: usize, position: Vector3<f64>) -> Result<(), MoleculeError> {
        self.check_index(index)?;
        self.atoms[index].position = position;
        Ok(())
    }

    /// Neighbors of `index` in bond-creation order
    pub fn neighbors(&self, index: usize) -> Result<&[usize], MoleculeError> {
        self.check_index(index)?;
        Ok(&self.neighbors[index])
    }

    pub fn is_bonded(&self, a: usize, b: usize) -> bool {
        self.neighbors
            .get(a)
            .map(|list| list.contains(&b))
            .unwrap_or(false)
    }

    /// Add a bond between two atoms.
    ///
    /// Both neighbor lists grow by doubling their capacity once full. Under
    /// [`BondPolicy::Strict`] a self bond or an existing bond is rejected.
    pub fn add_bond(&mut self, a: usize, b: usize) -> Result<(), MoleculeError> {
        self.check_index(a)?;
        self.check_index(b)?;

        if self.policy == BondPolicy::Strict {
            if a == b {
                return Err(MoleculeError::SelfBond(a));
            }
            if self.is_bonded(a, b) {
                return Err(MoleculeError::DuplicateBond(a, b));
            }
        }

        push_neighbor(&mut self.neighbors[a], b);
        push_neighbor(&mut self.neighbors[b], a);
        Ok(())
    }

    /// Remove every bond, keeping the atoms
    pub fn clear_bonds(&mut self) {
        for list in &mut self.neighbors {
            list.clear();
        }
    }

    /// Every bond once, as `(i, j)` with `i <= j`, ordered by `i` then by
    /// position in `i`'s neighbor list
    pub fn bonds(&self) -> Vec<(usize, usize)> {
        let mut bonds = Vec::new();
        for (i, list) in self.neighbors.iter().enumerate() {
            let mut self_edges = 0;
            for &j in list {
                if j > i {
                    bonds.push((i, j));
                } else if j == i {
                    // A self edge appears twice in its own list.
                    self_edges += 1;
                    if self_edges % 2 == 1 {
                        bonds.push((i, i));
                    }
                }
            }
        }
        bonds
    }

    pub fn bond_count(&self) -> usize {
        self.bonds().len()
    }

    /// Get the center of the molecule
    pub fn center(&self) -> Result<Vector3<f64>, MoleculeError> {
        if self.atoms.is_empty() {
            return Err(MoleculeError::EmptyMolecule);
        }

        let sum = self
            .atoms
            .iter()
            .fold(Vector3::zeros(), |acc, atom| acc + atom.position);

        Ok(sum / self.atoms.len() as f64)
    }

    /// Get the bounding box of the molecule
    pub fn bounding_box(&self) -> Result<(Vector3<f64>, Vector3<f64>), MoleculeError> {
        if self.atoms.is_empty() {
            return Err(MoleculeError::EmptyMolecule);
        }

        let mut min = Vector3::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Vector3::new(f64::MIN, f64::MIN, f64::MIN);

        for atom in &self.atoms {
            min = min.inf(&atom.position);
            max = max.sup(&atom.position);
        }

        Ok((min, max))
    }

    pub(crate) fn atoms_mut(&mut self) -> &mut [Atom] {
        &mut self.atoms
    }
}

fn push_neighbor(list: &mut Vec<usize>, index: usize) {
    if list.len() == list.capacity() {
        let grow = list.capacity().max(INITIAL_BONDS);
        list.reserve_exact(grow);
    }
    list.push(index);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(n: usize) -> Molecule {
        let mut mol = Molecule::new("chain");
        for i in 0..n {
            mol.add_atom(Atom::new("C", Vector3::new(i as f64, 0.0, 0.0)));
        }
        mol
    }

    #[test]
    fn test_add_atom_returns_index() {
        let mut mol = Molecule::new("m");
        assert_eq!(mol.add_atom(Atom::new("C", Vector3::zeros())), 0);
        assert_eq!(mol.add_atom(Atom::new("H", Vector3::x())), 1);
        assert_eq!(mol.len(), 2);
        assert!(mol.neighbors(1).unwrap().is_empty());
    }

    #[test]
    fn test_bond_is_symmetric() {
        let mut mol = chain(3);
        mol.add_bond(0, 1).unwrap();
        mol.add_bond(2, 1).unwrap();
        assert_eq!(mol.neighbors(0).unwrap(), &[1]);
        assert_eq!(mol.neighbors(1).unwrap(), &[0, 2]);
        assert_eq!(mol.neighbors(2).unwrap(), &[1]);
        assert!(mol.is_bonded(1, 2) && mol.is_bonded(2, 1));
    }

    #[test]
    fn test_bond_out_of_range() {
        let mut mol = chain(2);
        assert_eq!(
            mol.add_bond(0, 5),
            Err(MoleculeError::InvalidAtomIndex { index: 5, len: 2 })
        );
        assert!(mol.neighbors(0).unwrap().is_empty());
    }

    #[test]
    fn test_strict_rejects_self_and_duplicate() {
        let mut mol = chain(2);
        assert_eq!(mol.add_bond(1, 1), Err(MoleculeError::SelfBond(1)));
        mol.add_bond(0, 1).unwrap();
        assert_eq!(mol.add_bond(1, 0), Err(MoleculeError::DuplicateBond(1, 0)));
        assert_eq!(mol.bond_count(), 1);
    }

    #[test]
    fn test_permissive_keeps_duplicate_edges() {
        let mut mol = chain(2).with_policy(BondPolicy::Permissive);
        mol.add_bond(0, 1).unwrap();
        mol.add_bond(0, 1).unwrap();
        mol.add_bond(1, 1).unwrap();
        assert_eq!(mol.neighbors(0).unwrap(), &[1, 1]);
        assert_eq!(mol.neighbors(1).unwrap(), &[0, 0, 1, 1]);
        assert_eq!(mol.bonds(), vec![(0, 1), (0, 1), (1, 1)]);
    }

    #[test]
    fn test_neighbor_list_grows_past_initial_capacity() {
        let mut mol = chain(12);
        for j in 1..12 {
            mol.add_bond(0, j).unwrap();
        }
        let list = mol.neighbors(0).unwrap();
        assert_eq!(list.len(), 11);
        assert_eq!(list, (1..12).collect::<Vec<_>>().as_slice());
    }

    #[test]
    fn test_clear_bonds() {
        let mut mol = chain(3);
        mol.add_bond(0, 1).unwrap();
        mol.add_bond(1, 2).unwrap();
        mol.clear_bonds();
        assert_eq!(mol.bond_count(), 0);
        assert_eq!(mol.len(), 3);
    }

    #[test]
    fn test_center_and_bounding_box() {
        let mol = chain(3);
        assert_eq!(mol.center().unwrap(), Vector3::new(1.0, 0.0, 0.0));
        let (min, max) = mol.bounding_box().unwrap();
        assert_eq!(min, Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(max, Vector3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_empty_molecule_center() {
        let mol = Molecule::new("empty");
        assert_eq!(mol.center(), Err(MoleculeError::EmptyMolecule));
    }
}
