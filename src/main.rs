//! Top Level Environment

mod args;
mod emit;

use std::io;
use std::time;

use anyhow::{Context, Result};

use args::{Config, EmitTarget};
use lsra::{
  catalog_for,
  ir::{parse_file, Instr},
  regalloc::Liveness,
  AllocatorConfig, Allocator, TargetDescription,
};

// Helper macro to time evaluating an expression (like a function call.)
macro_rules! time {
  ( $x:expr ) => {{
    let t1 = time::Instant::now();
    let result = $x;
    (result, t1.elapsed())
  }};
}

fn run(cfg: Config) -> Result<()> {
  let target = TargetDescription::load(&cfg.target)?;
  let options = AllocatorConfig::discover(cfg.config_file.as_deref())?;
  let catalog = catalog_for(&target).with_context(|| format!("target {}", target.name()))?;

  let (instrs, parse_time) = time!(parse_file(&cfg.file));
  let instrs: Vec<Instr> = instrs?;

  let mut stdout = io::stdout().lock();
  if cfg.dump_intervals {
    emit::emit_intervals(&mut stdout, Liveness::from_ops(&instrs).intervals())?;
  }

  let mut allocator = Allocator::new(&catalog, options);
  let (result, ra_time) = time!(allocator.run(&instrs));
  if result.is_empty() {
    log::warn!("{} defines no temps", cfg.file);
  }

  match cfg.emit {
    EmitTarget::Listing => emit::emit_listing(&mut stdout, &catalog, &result)?,
    EmitTarget::Json => emit::emit_json(&mut stdout, &catalog, &result)?,
  }

  if cfg.verbose {
    println!("Parse time: {} us", parse_time.as_micros());
    println!("Regalloc: {} us", ra_time.as_micros());
  }
  Ok(())
}

fn init_logger(verbose: bool) {
  // make envlogger stdout
  let mut builder = env_logger::builder();
  builder
    .target(env_logger::Target::Stdout)
    .format_timestamp(None);
  if verbose {
    builder.filter_level(log::LevelFilter::Debug);
  }
  builder.init();
}

fn main() {
  let code = match args::parse_args().and_then(|cfg| {
    init_logger(cfg.verbose);
    run(cfg)
  }) {
    Ok(()) => 0,
    Err(e) => {
      eprintln!("{:#}", e);
      1
    }
  };
  std::process::exit(code);
}
