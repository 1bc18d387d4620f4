//! Command interpreter shared by script files and the interactive shell

pub mod command;

pub use command::{Angle, Command, CommandError, HELP};

use crate::bonding::{self, BondingError};
use crate::config::Config;
use crate::io::{self, IoError};
use crate::molecule::{Molecule, MoleculeError};
use crate::rotation::{self, RotationError};
use crate::traversal;
use log::{debug, error, info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while executing commands
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("No molecule loaded")]
    NoMolecule,

    #[error(transparent)]
    File(#[from] IoError),

    #[error(transparent)]
    Molecule(#[from] MoleculeError),

    #[error(transparent)]
    Bonding(#[from] BondingError),

    #[error(transparent)]
    Rotation(#[from] RotationError),

    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),

    #[error("Unreadable input: {0}")]
    Input(#[source] std::io::Error),

    #[error("Line {line}: {source}")]
    Script {
        line: usize,
        #[source]
        source: Box<SessionError>,
    },
}

/// Whether the caller should keep reading commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Outcome of running a script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScriptSummary {
    pub executed: usize,
    pub failed: usize,
}

/// Interpreter state: configuration plus the currently loaded molecule
#[derive(Debug, Default)]
pub struct Session {
    config: Config,
    molecule: Option<Molecule>,
    base_dir: Option<PathBuf>,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            molecule: None,
            base_dir: None,
        }
    }

    pub fn with_molecule(mut self, mut molecule: Molecule) -> Self {
        molecule.set_policy(self.config.bond_policy);
        self.molecule = Some(molecule);
        self
    }

    /// Resolve relative paths in `load`/`save`/`json` against `dir`
    pub fn with_base_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn molecule(&self) -> Option<&Molecule> {
        self.molecule.as_ref()
    }

    pub fn into_molecule(self) -> Option<Molecule> {
        self.molecule
    }

    fn loaded(&mut self) -> Result<&mut Molecule, SessionError> {
        self.molecule.as_mut().ok_or(SessionError::NoMolecule)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Parse and execute one line
    pub fn execute_line<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Flow, SessionError> {
        Ok(self.step(line, out)?.unwrap_or(Flow::Continue))
    }

    /// `None` when the line holds no command
    fn step<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Option<Flow>, SessionError> {
        match Command::parse(line)? {
            Some(command) => self.execute(&command, out).map(Some),
            None => Ok(None),
        }
    }

    /// Execute one command, writing any report to `out`
    pub fn execute<W: Write>(&mut self, command: &Command, out: &mut W) -> Result<Flow, SessionError> {
        debug!("Executing: {}", command);

        match command {
            Command::Load(path) => {
                let path = self.resolve(path);
                info!("Loading molecule: {}", path.display());
                let mut molecule = io::parse_xyz(&path)?;
                molecule.set_policy(self.config.bond_policy);
                writeln!(out, "loaded {} atoms from {}", molecule.len(), path.display())?;
                self.molecule = Some(molecule);
            }
            Command::Save(path) => {
                let path = self.resolve(path);
                io::write_xyz(self.loaded()?, &path)?;
                info!("Wrote XYZ: {}", path.display());
                writeln!(out, "saved {}", path.display())?;
            }
            Command::Json(path) => {
                let path = self.resolve(path);
                io::write_json(self.loaded()?, &path)?;
                info!("Wrote JSON snapshot: {}", path.display());
                writeln!(out, "saved {}", path.display())?;
            }
            Command::Bonds(threshold) => {
                let threshold = threshold.unwrap_or(self.config.bond_threshold);
                let report = bonding::infer_bonds(self.loaded()?, threshold)?;
                writeln!(
                    out,
                    "added {} bonds (threshold {} Å)",
                    report.bonds_added, threshold
                )?;
            }
            Command::Bond(a, b) => {
                self.loaded()?.add_bond(*a, *b)?;
                writeln!(out, "bonded {} {}", a, b)?;
            }
            Command::UnbondAll => {
                self.loaded()?.clear_bonds();
                writeln!(out, "removed all bonds")?;
            }
            Command::Rotate { fixed, pivot, angle } => {
                let theta = angle.to_radians(self.config.angle_unit);
                let report = rotation::rotate_about(self.loaded()?, *fixed, *pivot, theta)?;
                if report.degenerate_axis {
                    writeln!(out, "warning: atoms {} and {} coincide, nothing rotated", fixed, pivot)?;
                } else {
                    if report.ring_closure {
                        writeln!(out, "warning: bond {}-{} is in a ring, rotation truncated", fixed, pivot)?;
                    }
                    writeln!(out, "rotated {} atoms", report.moved.len())?;
                }
            }
            Command::Side { fixed, pivot } => {
                let moving = rotation::moving_atoms(self.loaded()?, *fixed, *pivot)?;
                let listed: Vec<String> = moving.iter().map(|i| i.to_string()).collect();
                writeln!(out, "{}", listed.join(" "))?;
            }
            Command::Print(start) => {
                let tree = traversal::render_tree(self.loaded()?, *start)?;
                write!(out, "{}", tree)?;
            }
            Command::List => {
                let molecule = self.loaded()?;
                for (i, atom) in molecule.atoms().iter().enumerate() {
                    writeln!(
                        out,
                        "{:>4} {:<2} {:>12.6} {:>12.6} {:>12.6}",
                        i, atom.name, atom.position.x, atom.position.y, atom.position.z
                    )?;
                }
            }
            Command::Info => {
                let molecule = self.loaded()?;
                writeln!(out, "name:   {}", molecule.name)?;
                writeln!(out, "atoms:  {}", molecule.len())?;
                writeln!(out, "bonds:  {}", molecule.bond_count())?;
                if let (Ok(c), Ok((min, max))) = (molecule.center(), molecule.bounding_box()) {
                    writeln!(out, "center: [{:.6}, {:.6}, {:.6}]", c.x, c.y, c.z)?;
                    writeln!(
                        out,
                        "bounds: [{:.6}, {:.6}, {:.6}] .. [{:.6}, {:.6}, {:.6}]",
                        min.x, min.y, min.z, max.x, max.y, max.z
                    )?;
                }
            }
            Command::Reset => {
                // Walks own their visit sets, so there is nothing to clear.
                debug!("reset: no persistent traversal marks");
            }
            Command::Help => write!(out, "{}", HELP)?,
            Command::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    /// Run every line of a script.
    ///
    /// A failing line is logged and skipped unless `fail_fast` is set, in
    /// which case the first failure is returned with its line number.
    pub fn run_script<R: BufRead, W: Write>(
        &mut self,
        reader: R,
        out: &mut W,
        fail_fast: bool,
    ) -> Result<ScriptSummary, SessionError> {
        let mut summary = ScriptSummary::default();

        for (offset, line) in reader.lines().enumerate() {
            let line_number = offset + 1;

            // Undecodable bytes are consumed up to the newline, so the next
            // line can still be read.
            let result = match line {
                Ok(line) => self.step(&line, out),
                Err(e) if e.kind() == ErrorKind::InvalidData => Err(SessionError::Input(e)),
                Err(e) => return Err(SessionError::Input(e)),
            };

            match result {
                Ok(None) => {}
                Ok(Some(Flow::Continue)) => summary.executed += 1,
                Ok(Some(Flow::Quit)) => {
                    summary.executed += 1;
                    break;
                }
                Err(e) => {
                    summary.failed += 1;
                    if fail_fast {
                        return Err(SessionError::Script {
                            line: line_number,
                            source: Box::new(e),
                        });
                    }
                    error!("line {}: {}", line_number, e);
                }
            }
        }

        if summary.failed > 0 {
            warn!("{} of {} commands failed", summary.failed, summary.executed + summary.failed);
        }
        Ok(summary)
    }

    /// Run a script file; relative paths inside it resolve against the
    /// script's directory
    pub fn run_script_file<P: AsRef<Path>, W: Write>(
        &mut self,
        path: P,
        out: &mut W,
        fail_fast: bool,
    ) -> Result<ScriptSummary, SessionError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(IoError::from)?;
        if self.base_dir.is_none() {
            if let Some(dir) = path.parent() {
                self.base_dir = Some(dir.to_path_buf());
            }
        }
        info!("Running script: {}", path.display());
        self.run_script(BufReader::new(file), out, fail_fast)
    }

    /// Interactive loop: prompt, read, execute, report errors, repeat
    pub fn repl<R: BufRead, W: Write>(&mut self, mut input: R, out: &mut W) -> Result<(), SessionError> {
        let mut line = String::new();
        loop {
            write!(out, "{}", self.config.prompt)?;
            out.flush()?;

            line.clear();
            let result = match input.read_line(&mut line) {
                Ok(0) => {
                    writeln!(out)?;
                    break;
                }
                Ok(_) => self.execute_line(&line, out),
                Err(e) if e.kind() == ErrorKind::InvalidData => Err(SessionError::Input(e)),
                Err(e) => return Err(SessionError::Input(e)),
            };

            match result {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(e) => {
                    warn!("{}", e);
                    writeln!(out, "error: {}", e)?;
                }
            }
        }
        Ok(())
    }
}
