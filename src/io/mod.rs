//! Reading and writing molecules in XYZ format, plus JSON snapshots

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

use crate::atom::{Atom, AtomName};
use crate::math::Vec3;
use crate::molecule::Molecule;

/// Errors that can occur during file I/O operations
#[derive(Error, Debug)]
pub enum IoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Too many fields at line {line}: expected 4, found {found}")]
    TooManyFields { line: usize, found: usize },

    #[error("Atom count mismatch: header declares {declared}, file contains {found}")]
    AtomCountMismatch { declared: usize, found: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse an XYZ file into a Molecule named after the file stem
pub fn parse_xyz<P: AsRef<Path>>(path: P) -> Result<Molecule, IoError> {
    let file = File::open(path.as_ref())?;
    let name = path
        .as_ref()
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown");
    read_xyz(BufReader::new(file), name)
}

/// Parse XYZ text from any buffered reader.
///
/// Line 1 holds the atom count, line 2 a comment that is ignored. Every
/// following non-blank line is `name x y z`. Nothing is returned unless the
/// whole input parses and the record count matches the header.
pub fn read_xyz<R: BufRead>(reader: R, name: &str) -> Result<Molecule, IoError> {
    let mut lines = reader.lines();

    let header = match lines.next() {
        Some(line) => line?,
        None => {
            return Err(IoError::Parse {
                line: 1,
                message: "Missing atom count".to_string(),
            })
        }
    };
    let declared = header.trim().parse::<usize>().map_err(|_| IoError::Parse {
        line: 1,
        message: format!("Invalid atom count: {}", header.trim()),
    })?;

    // Comment line; its content is ignored.
    if let Some(line) = lines.next() {
        line?;
    }

    // The header is untrusted, so it never sizes an allocation.
    let mut atoms = Vec::new();
    for (offset, line) in lines.enumerate() {
        let line = line?;
        let line_number = offset + 3;

        if line.trim().is_empty() {
            continue;
        }

        atoms.push(parse_xyz_atom(&line, line_number)?);
    }

    if atoms.len() != declared {
        return Err(IoError::AtomCountMismatch {
            declared,
            found: atoms.len(),
        });
    }

    let mut molecule = Molecule::with_capacity(name, declared);
    for atom in atoms {
        molecule.add_atom(atom);
    }

    Ok(molecule)
}

/// Parse one `name x y z` record
fn parse_xyz_atom(line: &str, line_number: usize) -> Result<Atom, IoError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() > 4 {
        return Err(IoError::TooManyFields {
            line: line_number,
            found: parts.len(),
        });
    }
    if parts.len() < 4 {
        return Err(IoError::Parse {
            line: line_number,
            message: format!("Expected name and three coordinates: {}", line),
        });
    }

    let coordinate = |field: &str, axis: &str| {
        field.parse::<f64>().map_err(|_| IoError::Parse {
            line: line_number,
            message: format!("Invalid {} coordinate: {}", axis, field),
        })
    };

    let x = coordinate(parts[1], "x")?;
    let y = coordinate(parts[2], "y")?;
    let z = coordinate(parts[3], "z")?;

    Ok(Atom::new(AtomName::new(parts[0]), Vector3::new(x, y, z)))
}

/// Write a molecule to an XYZ file
pub fn write_xyz<P: AsRef<Path>>(molecule: &Molecule, path: P) -> Result<(), IoError> {
    let mut writer = BufWriter::new(File::create(path)?);
    format_xyz(molecule, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Serialize a molecule as XYZ text: count, blank comment, then one
/// tab-separated record per atom with six decimal places
pub fn format_xyz<W: Write>(molecule: &Molecule, out: &mut W) -> Result<(), IoError> {
    writeln!(out, "{}", molecule.len())?;
    writeln!(out)?;

    for atom in molecule.atoms() {
        writeln!(
            out,
            "{:<2}\t{:.6}\t{:.6}\t{:.6}",
            atom.name, atom.position.x, atom.position.y, atom.position.z
        )?;
    }

    Ok(())
}

/// One atom in a JSON snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomRecord {
    pub index: usize,
    pub name: AtomName,
    pub position: Vec3,
}

/// Serializable view of a molecule's atoms and bonds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoleculeSnapshot {
    pub name: String,
    pub atoms: Vec<AtomRecord>,
    pub bonds: Vec<(usize, usize)>,
}

impl MoleculeSnapshot {
    pub fn capture(molecule: &Molecule) -> Self {
        Self {
            name: molecule.name.clone(),
            atoms: molecule
                .atoms()
                .iter()
                .enumerate()
                .map(|(index, atom)| AtomRecord {
                    index,
                    name: atom.name,
                    position: Vec3::from_vector3(&atom.position),
                })
                .collect(),
            bonds: molecule.bonds(),
        }
    }
}

/// Write a JSON snapshot of the molecule
pub fn write_json<P: AsRef<Path>>(molecule: &Molecule, path: P) -> Result<(), IoError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &MoleculeSnapshot::capture(molecule))?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
