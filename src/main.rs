//! Main executable for bondrot

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use log::{debug, info, warn};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use bondrot::bonding::infer_bonds;
use bondrot::config::{AngleUnit, Config};
use bondrot::io::{format_xyz, parse_xyz, write_xyz};
use bondrot::molecule::Molecule;
use bondrot::rotation::rotate_about;
use bondrot::script::{Angle, Session};
use bondrot::traversal::render_tree;

/// Command-line arguments for the application
#[derive(Parser, Debug)]
#[clap(
    name = "bondrot",
    version = bondrot::VERSION,
    about = "Infer bonds from geometry and rotate molecules about a bond"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[clap(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// TOML configuration file
    #[clap(long, short, value_parser, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rotate the pivot side of a bond and write the new geometry
    Rotate {
        /// XYZ file containing the molecule
        #[clap(value_parser)]
        input: PathBuf,

        /// Index of the atom held fixed
        fixed: usize,

        /// Index of the atom whose side rotates
        pivot: usize,

        /// Rotation angle (suffix with deg or rad to override the unit)
        #[clap(allow_hyphen_values = true)]
        angle: String,

        /// Bond length threshold in Angstroms
        #[clap(long)]
        threshold: Option<f64>,

        /// Interpret a bare angle in degrees
        #[clap(long)]
        degrees: bool,

        /// Output XYZ file (stdout if omitted)
        #[clap(long, short, value_parser)]
        out: Option<PathBuf>,
    },

    /// Print the depth-first bond tree from one atom
    Show {
        /// XYZ file containing the molecule
        #[clap(value_parser)]
        input: PathBuf,

        /// Index of the atom to start from
        #[clap(long, default_value_t = 0)]
        start: usize,

        /// Bond length threshold in Angstroms
        #[clap(long)]
        threshold: Option<f64>,
    },

    /// Execute a command script
    Run {
        /// Script file, one command per line
        #[clap(value_parser)]
        script: PathBuf,

        /// Stop at the first failing command
        #[clap(long)]
        fail_fast: bool,
    },

    /// Start an interactive shell
    Repl {
        /// XYZ file to load before the first prompt
        #[clap(value_parser)]
        input: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logger; RUST_LOG still takes precedence
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = load_config(cli.config.as_deref())?;
    debug!("Configuration: {:?}", config);

    match cli.command {
        Commands::Rotate {
            input,
            fixed,
            pivot,
            angle,
            threshold,
            degrees,
            out,
        } => {
            let mut config = config;
            if degrees {
                config.angle_unit = AngleUnit::Degrees;
            }
            let threshold = threshold.unwrap_or(config.bond_threshold);
            let angle: Angle = angle
                .parse()
                .with_context(|| format!("Invalid rotation angle: {}", angle))?;
            let theta = angle.to_radians(config.angle_unit);

            let mut molecule = load_bonded(&input, &config, threshold)?;

            let report = rotate_about(&mut molecule, fixed, pivot, theta)
                .with_context(|| format!("Failed to rotate about atoms {} and {}", fixed, pivot))?;
            if report.degenerate_axis {
                warn!("Nothing rotated: atoms {} and {} coincide", fixed, pivot);
            } else {
                info!("Rotated {} atoms by {:.6} rad", report.moved.len(), theta);
            }

            match out {
                Some(path) => {
                    write_xyz(&molecule, &path)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!("Wrote {}", path.display());
                }
                None => {
                    let stdout = io::stdout();
                    let mut handle = stdout.lock();
                    format_xyz(&molecule, &mut handle).context("Failed to write to stdout")?;
                    handle.flush()?;
                }
            }
        }

        Commands::Show {
            input,
            start,
            threshold,
        } => {
            let threshold = threshold.unwrap_or(config.bond_threshold);
            let molecule = load_bonded(&input, &config, threshold)?;
            let tree = render_tree(&molecule, start)
                .with_context(|| format!("Cannot start traversal at atom {}", start))?;
            print!("{}", tree);
        }

        Commands::Run { script, fail_fast } => {
            let mut session = Session::new(config);
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            let summary = session
                .run_script_file(&script, &mut handle, fail_fast)
                .with_context(|| format!("Script failed: {}", script.display()))?;
            info!(
                "Script finished: {} commands executed, {} failed",
                summary.executed, summary.failed
            );
        }

        Commands::Repl { input } => {
            let mut session = Session::new(config);
            if let Some(path) = input {
                let molecule = parse_xyz(&path)
                    .with_context(|| format!("Failed to parse XYZ file: {}", path.display()))?;
                session = session.with_molecule(molecule);
            }
            let stdin = io::stdin();
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            session.repl(stdin.lock(), &mut handle)?;
        }

        Commands::Config => {
            let text = config
                .to_toml_string()
                .context("Failed to serialize configuration")?;
            print!("{}", text);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to read config file: {}", path.display())),
        None => Ok(Config::default()),
    }
}

/// Load an XYZ file and infer its bonds
fn load_bonded(path: &Path, config: &Config, threshold: f64) -> Result<Molecule> {
    info!("Loading molecule: {}", path.display());
    let mut molecule = parse_xyz(path)
        .with_context(|| format!("Failed to parse XYZ file: {}", path.display()))?
        .with_policy(config.bond_policy);

    let report = infer_bonds(&mut molecule, threshold)
        .with_context(|| format!("Failed to infer bonds with threshold {}", threshold))?;
    info!(
        "{} atoms, {} bonds (threshold {} Å)",
        molecule.len(),
        report.bonds_added,
        threshold
    );

    Ok(molecule)
}
