//! Parsing of the line-oriented command language

use crate::config::AngleUnit;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur while parsing a command line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Wrong number of arguments for '{command}', usage: {usage}")]
    Arity {
        command: &'static str,
        usage: &'static str,
    },

    #[error("Invalid {what}: {value}")]
    InvalidNumber { what: &'static str, value: String },
}

/// A rotation angle as written in a command
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Angle {
    /// No unit suffix; interpreted with the configured [`AngleUnit`]
    Bare(f64),
    Radians(f64),
    Degrees(f64),
}

impl Angle {
    pub fn to_radians(self, default_unit: AngleUnit) -> f64 {
        match self {
            Angle::Bare(v) => default_unit.to_radians(v),
            Angle::Radians(v) => v,
            Angle::Degrees(v) => v.to_radians(),
        }
    }
}

impl FromStr for Angle {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CommandError::InvalidNumber {
            what: "angle",
            value: s.to_string(),
        };
        let parse = |n: &str| n.parse::<f64>().map_err(|_| invalid());

        if let Some(n) = s.strip_suffix("deg") {
            parse(n).map(Angle::Degrees)
        } else if let Some(n) = s.strip_suffix("rad") {
            parse(n).map(Angle::Radians)
        } else {
            parse(s).map(Angle::Bare)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Load(PathBuf),
    Save(PathBuf),
    Json(PathBuf),
    /// Infer bonds, with an optional threshold override
    Bonds(Option<f64>),
    Bond(usize, usize),
    UnbondAll,
    Rotate {
        fixed: usize,
        pivot: usize,
        angle: Angle,
    },
    Side {
        fixed: usize,
        pivot: usize,
    },
    Print(usize),
    List,
    Info,
    Reset,
    Help,
    Quit,
}

pub const HELP: &str = "\
load <file.xyz>           load a molecule, replacing the current one
save <file.xyz>           write the current molecule as XYZ
json <file.json>          write a JSON snapshot of atoms and bonds
bonds [threshold]         bond every pair closer than threshold (Å)
bond <a> <b>              bond atoms a and b
unbond-all                remove every bond
rotate <a> <b> <angle>    hold a fixed, rotate b's side about a->b
                          (angle suffix: deg or rad)
side <a> <b>              list atoms that 'rotate a b' would move
print <start>             depth-first listing from atom start
list                      list all atoms
info                      counts, centroid and bounding box
reset                     clear traversal marks
help                      show this text
quit                      leave the shell
";

impl Command {
    /// Parse one line. Blank lines and `#` comments yield `Ok(None)`.
    ///
    /// A `#` opens a comment only at the start of the line or after
    /// whitespace, so `run#2.xyz` stays one word.
    pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        let line = strip_comment(line);
        let mut words = line.split_whitespace();
        let Some(keyword) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let command = match keyword.to_lowercase().as_str() {
            "load" => Command::Load(single_path(&args, "load", "load <file.xyz>")?),
            "save" => Command::Save(single_path(&args, "save", "save <file.xyz>")?),
            "json" => Command::Json(single_path(&args, "json", "json <file.json>")?),
            "bonds" => match args.as_slice() {
                [] => Command::Bonds(None),
                [t] => Command::Bonds(Some(number(t, "threshold")?)),
                _ => return Err(arity("bonds", "bonds [threshold]")),
            },
            "bond" => {
                let (a, b) = index_pair(&args, "bond", "bond <a> <b>")?;
                Command::Bond(a, b)
            }
            "unbond-all" => {
                no_args(&args, "unbond-all", "unbond-all")?;
                Command::UnbondAll
            }
            "rotate" => match args.as_slice() {
                [a, b, angle] => Command::Rotate {
                    fixed: index(a)?,
                    pivot: index(b)?,
                    angle: angle.parse()?,
                },
                _ => return Err(arity("rotate", "rotate <a> <b> <angle>")),
            },
            "side" => {
                let (fixed, pivot) = index_pair(&args, "side", "side <a> <b>")?;
                Command::Side { fixed, pivot }
            }
            "print" => match args.as_slice() {
                [start] => Command::Print(index(start)?),
                _ => return Err(arity("print", "print <start>")),
            },
            "list" => {
                no_args(&args, "list", "list")?;
                Command::List
            }
            "info" => {
                no_args(&args, "info", "info")?;
                Command::Info
            }
            "reset" => {
                no_args(&args, "reset", "reset")?;
                Command::Reset
            }
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        Ok(Some(command))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Load(p) => write!(f, "load {}", p.display()),
            Command::Save(p) => write!(f, "save {}", p.display()),
            Command::Json(p) => write!(f, "json {}", p.display()),
            Command::Bonds(None) => write!(f, "bonds"),
            Command::Bonds(Some(t)) => write!(f, "bonds {}", t),
            Command::Bond(a, b) => write!(f, "bond {} {}", a, b),
            Command::UnbondAll => write!(f, "unbond-all"),
            Command::Rotate { fixed, pivot, angle } => match angle {
                Angle::Bare(v) => write!(f, "rotate {} {} {}", fixed, pivot, v),
                Angle::Radians(v) => write!(f, "rotate {} {} {}rad", fixed, pivot, v),
                Angle::Degrees(v) => write!(f, "rotate {} {} {}deg", fixed, pivot, v),
            },
            Command::Side { fixed, pivot } => write!(f, "side {} {}", fixed, pivot),
            Command::Print(start) => write!(f, "print {}", start),
            Command::List => write!(f, "list"),
            Command::Info => write!(f, "info"),
            Command::Reset => write!(f, "reset"),
            Command::Help => write!(f, "help"),
            Command::Quit => write!(f, "quit"),
        }
    }
}

fn strip_comment(line: &str) -> &str {
    let mut previous = None;
    for (pos, c) in line.char_indices() {
        if c == '#' && previous.map_or(true, char::is_whitespace) {
            return &line[..pos];
        }
        previous = Some(c);
    }
    line
}

fn arity(command: &'static str, usage: &'static str) -> CommandError {
    CommandError::Arity { command, usage }
}

fn no_args(args: &[&str], command: &'static str, usage: &'static str) -> Result<(), CommandError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(arity(command, usage))
    }
}

fn single_path(args: &[&str], command: &'static str, usage: &'static str) -> Result<PathBuf, CommandError> {
    match args {
        [path] => Ok(PathBuf::from(path)),
        _ => Err(arity(command, usage)),
    }
}

fn index(value: &str) -> Result<usize, CommandError> {
    value.parse::<usize>().map_err(|_| CommandError::InvalidNumber {
        what: "atom index",
        value: value.to_string(),
    })
}

fn index_pair(args: &[&str], command: &'static str, usage: &'static str) -> Result<(usize, usize), CommandError> {
    match args {
        [a, b] => Ok((index(a)?, index(b)?)),
        _ => Err(arity(command, usage)),
    }
}

fn number(value: &str, what: &'static str) -> Result<f64, CommandError> {
    value.parse::<f64>().map_err(|_| CommandError::InvalidNumber {
        what,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        Command::parse(line).unwrap().unwrap()
    }

    #[test]
    fn test_blank_and_comment_lines() {
        assert_eq!(Command::parse("").unwrap(), None);
        assert_eq!(Command::parse("   \t").unwrap(), None);
        assert_eq!(Command::parse("# just a note").unwrap(), None);
        assert_eq!(Command::parse("  #indented").unwrap(), None);
    }

    #[test]
    fn test_hash_inside_word_is_kept() {
        assert_eq!(parse("load run#2.xyz"), Command::Load(PathBuf::from("run#2.xyz")));
        assert_eq!(
            parse("save out#1.xyz #backup"),
            Command::Save(PathBuf::from("out#1.xyz"))
        );
    }

    #[test]
    fn test_parse_rotate() {
        assert_eq!(
            parse("rotate 1 2 3.14159"),
            Command::Rotate {
                fixed: 1,
                pivot: 2,
                angle: Angle::Bare(3.14159)
            }
        );
        assert_eq!(
            parse("ROTATE 0 4 90deg  # trailing comment"),
            Command::Rotate {
                fixed: 0,
                pivot: 4,
                angle: Angle::Degrees(90.0)
            }
        );
        assert_eq!(
            parse("rotate 0 4 -0.5rad"),
            Command::Rotate {
                fixed: 0,
                pivot: 4,
                angle: Angle::Radians(-0.5)
            }
        );
    }

    #[test]
    fn test_parse_bonds() {
        assert_eq!(parse("bonds"), Command::Bonds(None));
        assert_eq!(parse("bonds 1.75"), Command::Bonds(Some(1.75)));
        assert_eq!(parse("bond 3 4"), Command::Bond(3, 4));
    }

    #[test]
    fn test_parse_misc() {
        assert_eq!(parse("load mol.xyz"), Command::Load(PathBuf::from("mol.xyz")));
        assert_eq!(parse("print 0"), Command::Print(0));
        assert_eq!(parse("side 2 1"), Command::Side { fixed: 2, pivot: 1 });
        assert_eq!(parse("reset"), Command::Reset);
        assert_eq!(parse("exit"), Command::Quit);
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            Command::parse("twist 1 2"),
            Err(CommandError::Unknown("twist".to_string()))
        );
    }

    #[test]
    fn test_wrong_arity() {
        assert!(matches!(
            Command::parse("rotate 1 2"),
            Err(CommandError::Arity { command: "rotate", .. })
        ));
        assert!(matches!(
            Command::parse("list everything"),
            Err(CommandError::Arity { command: "list", .. })
        ));
    }

    #[test]
    fn test_negative_index_rejected() {
        assert!(matches!(
            Command::parse("print -1"),
            Err(CommandError::InvalidNumber { what: "atom index", .. })
        ));
    }

    #[test]
    fn test_bad_angle() {
        assert!(matches!(
            Command::parse("rotate 0 1 ninety"),
            Err(CommandError::InvalidNumber { what: "angle", .. })
        ));
    }

    #[test]
    fn test_display_round_trips() {
        for line in ["rotate 1 2 90deg", "bonds 1.5", "bond 0 1", "print 3", "unbond-all"] {
            assert_eq!(parse(line).to_string(), line);
        }
    }

    #[test]
    fn test_angle_conversion() {
        assert_eq!(Angle::Bare(2.0).to_radians(AngleUnit::Radians), 2.0);
        assert!((Angle::Bare(90.0).to_radians(AngleUnit::Degrees) - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!((Angle::Degrees(180.0).to_radians(AngleUnit::Radians) - std::f64::consts::PI).abs() < 1e-12);
    }
}
