//! Parse command line arguments

use std::env;

use anyhow::{anyhow, bail, Result};

pub enum EmitTarget {
  Listing,
  Json,
}

/// Configuration options for this run.
pub struct Config {
  pub verbose: bool,
  pub dump_intervals: bool,

  pub emit: EmitTarget,
  pub target: String,
  pub config_file: Option<String>,
  pub file: String,
}

const USAGE: &str = "usage: lsra <file.ir> [-t x86_64|i386|target.toml] [-c regalloc.toml] \
                     [--emit listing|json] [--dump-intervals] [-v]";

/// Parses command line input into a configuration.
pub fn parse_args() -> Result<Config> {
  parse_from(env::args().skip(1))
}

fn parse_from(args: impl IntoIterator<Item = String>) -> Result<Config> {
  let mut verbose = false;
  let mut dump_intervals = false;
  let mut emit = EmitTarget::Listing;
  let mut target = String::from("x86_64");
  let mut config_file = None;
  let mut file = None;

  let mut args = args.into_iter();
  while let Some(arg) = args.next() {
    let mut value = |flag: &str| {
      args
        .next()
        .ok_or_else(|| anyhow!("{} expects a value\n{}", flag, USAGE))
    };
    match arg.as_str() {
      "-v" | "--verbose" => verbose = true,
      "--dump-intervals" => dump_intervals = true,
      "-t" | "--target" => target = value(&arg)?,
      "-c" | "--config" => config_file = Some(value(&arg)?),
      "-e" | "--emit" => {
        emit = match value(&arg)?.as_str() {
          "listing" => EmitTarget::Listing,
          "json" => EmitTarget::Json,
          other => bail!("Unknown emit type : {}", other),
        }
      }
      "-h" | "--help" => bail!("{}", USAGE),
      flag if flag.starts_with('-') => bail!("Unknown flag {}\n{}", flag, USAGE),
      path => file = Some(path.to_string()),
    }
  }

  Ok(Config {
    verbose,
    dump_intervals,
    emit,
    target,
    config_file,
    file: file.ok_or_else(|| anyhow!("Expected file input\n{}", USAGE))?,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(args: &[&str]) -> Result<Config> {
    parse_from(args.iter().map(|s| s.to_string()))
  }

  #[test]
  fn test_defaults() {
    let cfg = parse(&["f.ir"]).unwrap();
    assert_eq!(cfg.file, "f.ir");
    assert_eq!(cfg.target, "x86_64");
    assert!(matches!(cfg.emit, EmitTarget::Listing));
    assert!(cfg.config_file.is_none());
    assert!(!cfg.verbose && !cfg.dump_intervals);
  }

  #[test]
  fn test_flags() {
    let cfg = parse(&["-t", "i386", "--emit", "json", "-c", "ra.toml", "-v", "f.ir"]).unwrap();
    assert_eq!(cfg.target, "i386");
    assert!(matches!(cfg.emit, EmitTarget::Json));
    assert_eq!(cfg.config_file.as_deref(), Some("ra.toml"));
    assert!(cfg.verbose);
  }

  #[test]
  fn test_bad_args() {
    assert!(parse(&[]).is_err());
    assert!(parse(&["f.ir", "-t"]).is_err());
    assert!(parse(&["f.ir", "--emit", "asm"]).is_err());
    assert!(parse(&["f.ir", "--coalesce"]).is_err());
  }
}
