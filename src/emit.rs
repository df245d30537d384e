//! Output of allocation results

use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use lsra::{
  bank::BankCatalog,
  regalloc::{AllocationRecord, AllocationResult, Interval},
};

#[derive(Serialize)]
struct JsonReport<'a> {
  target: &'a str,
  frame_size: u32,
  spills: usize,
  evictions: usize,
  callee_saved: Vec<&'a str>,
  diagnostics: Vec<String>,
  allocations: Vec<AllocationRecord>,
}

pub fn emit_listing(
  out: &mut impl Write,
  catalog: &BankCatalog,
  result: &AllocationResult,
) -> Result<()> {
  let regs = catalog.registers();
  writeln!(out, "{}", result.listing(regs))?;
  writeln!(
    out,
    "spills: {} (evictions: {})",
    result.num_spills(),
    result.num_evictions()
  )?;
  if !result.used_callee_saved().is_empty() {
    let saved = result
      .used_callee_saved()
      .iter()
      .map(|&r| regs.name(r))
      .collect::<Vec<_>>();
    writeln!(out, "callee-saved: {}", saved.join(" "))?;
  }
  for diagnostic in result.diagnostics() {
    writeln!(out, "warning: {}", diagnostic)?;
  }
  Ok(())
}

pub fn emit_json(
  out: &mut impl Write,
  catalog: &BankCatalog,
  result: &AllocationResult,
) -> Result<()> {
  let regs = catalog.registers();
  let report = JsonReport {
    target: catalog.name(),
    frame_size: result.frame_size(),
    spills: result.num_spills(),
    evictions: result.num_evictions(),
    callee_saved: result
      .used_callee_saved()
      .iter()
      .map(|&r| regs.name(r))
      .collect(),
    diagnostics: result.diagnostics().iter().map(|d| d.to_string()).collect(),
    allocations: result.records(regs),
  };
  serde_json::to_writer_pretty(&mut *out, &report)?;
  writeln!(out)?;
  Ok(())
}

pub fn emit_intervals(out: &mut impl Write, intervals: &[Interval]) -> Result<()> {
  for interval in intervals {
    writeln!(out, "{}", interval)?;
  }
  Ok(())
}
