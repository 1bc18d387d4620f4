//! Cycle-safe depth-first walks over the bond graph
//!
//! Every walk owns its own [`VisitSet`], so no traversal can observe marks
//! left behind by an earlier one. The walk uses an explicit stack rather
//! than call recursion; neighbors are pushed in reverse so atoms are visited
//! in the same pre-order a recursive descent would produce.

use crate::molecule::{Molecule, MoleculeError};
use std::fmt::Write;

/// Per-walk record of which atoms have been reached
#[derive(Debug, Clone)]
pub struct VisitSet {
    marks: Vec<bool>,
}

impl VisitSet {
    /// A set with every atom unvisited
    pub fn new(atom_count: usize) -> Self {
        Self {
            marks: vec![false; atom_count],
        }
    }

    /// Sized for `molecule`, every atom unvisited
    pub fn for_molecule(molecule: &Molecule) -> Self {
        Self::new(molecule.len())
    }

    /// Mark `index` as visited. Returns `false` if it was already marked.
    pub fn mark(&mut self, index: usize) -> bool {
        match self.marks.get_mut(index) {
            Some(seen) if !*seen => {
                *seen = true;
                true
            }
            _ => false,
        }
    }

    pub fn is_visited(&self, index: usize) -> bool {
        self.marks.get(index).copied().unwrap_or(false)
    }

    /// Clear every mark
    pub fn reset(&mut self) {
        self.marks.iter_mut().for_each(|m| *m = false);
    }

    pub fn visited_count(&self) -> usize {
        self.marks.iter().filter(|m| **m).count()
    }
}

/// One atom reached during a walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visit {
    pub index: usize,
    /// Number of bonds followed from the start atom along the walk
    pub depth: usize,
}

/// Walk from `start` with a fresh visit set, calling `action` once per
/// reachable atom in pre-order.
pub fn walk<F>(molecule: &Molecule, start: usize, action: F) -> Result<VisitSet, MoleculeError>
where
    F: FnMut(Visit),
{
    let mut visits = VisitSet::for_molecule(molecule);
    walk_from(molecule, &mut visits, start, action)?;
    Ok(visits)
}

/// Walk from `start` using a caller-prepared visit set.
///
/// Atoms already marked in `visits` act as barriers: they are neither
/// reported nor passed through.
pub fn walk_from<F>(
    molecule: &Molecule,
    visits: &mut VisitSet,
    start: usize,
    mut action: F,
) -> Result<(), MoleculeError>
where
    F: FnMut(Visit),
{
    molecule.check_index(start)?;

    let mut stack = vec![Visit {
        index: start,
        depth: 0,
    }];

    while let Some(visit) = stack.pop() {
        if !visits.mark(visit.index) {
            continue;
        }
        action(visit);

        let neighbors = molecule.neighbors(visit.index)?;
        for &next in neighbors.iter().rev() {
            if !visits.is_visited(next) {
                stack.push(Visit {
                    index: next,
                    depth: visit.depth + 1,
                });
            }
        }
    }

    Ok(())
}

/// Collect the pre-order visit sequence from `start`
pub fn depth_first_order(molecule: &Molecule, start: usize) -> Result<Vec<Visit>, MoleculeError> {
    let mut order = Vec::new();
    walk(molecule, start, |v| order.push(v))?;
    Ok(order)
}

/// Indented depth-first listing of the atoms reachable from `start`.
///
/// Each line is `"> "` repeated `depth + 1` times, then
/// `index name [x, y, z] n_bonds` with six decimals.
pub fn render_tree(molecule: &Molecule, start: usize) -> Result<String, MoleculeError> {
    let mut out = String::new();
    for visit in depth_first_order(molecule, start)? {
        let atom = molecule.atom(visit.index)?;
        let bonds = molecule.neighbors(visit.index)?.len();
        for _ in 0..=visit.depth {
            out.push_str("> ");
        }
        // Writing to a String cannot fail.
        let _ = writeln!(
            out,
            "{} {} [{:.6}, {:.6}, {:.6}] {}",
            visit.index, atom.name, atom.position.x, atom.position.y, atom.position.z, bonds
        );
    }
    Ok(out)
}
