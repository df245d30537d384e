use std::collections::BTreeMap;
use std::fmt;

use enum_as_inner::EnumAsInner;
use serde::Serialize;

use crate::{
  ir::TempId,
  registers::{RegisterFile, RegisterId},
};

/// Where a temp lives for its whole lifetime.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, EnumAsInner)]
pub enum Allocation {
  Register(RegisterId),
  /// Byte offset into the spill area of the frame.
  Stack(u32),
}

/// Anomalies recovered from during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
  /// Temps without a free marker, closed at the last position.
  UnfreedTemps(Vec<TempId>),
}

impl fmt::Display for Diagnostic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Diagnostic::UnfreedTemps(temps) => {
        write!(
          f,
          "{} unfreed registers encountered, this indicates a defect in IR generation (",
          temps.len()
        )?;
        for (i, temp) in temps.iter().enumerate() {
          if i > 0 {
            write!(f, " ")?;
          }
          write!(f, "{}", temp)?;
        }
        write!(f, ")")
      }
    }
  }
}

/// Outcome of one allocation run, consumed by code emission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationResult {
  pub(super) allocations: BTreeMap<TempId, Allocation>,
  pub(super) stack_base: u32,
  pub(super) frame_size: u32,
  pub(super) num_spills: usize,
  pub(super) num_evictions: usize,
  pub(super) used_callee_saved: Vec<RegisterId>,
  pub(super) diagnostics: Vec<Diagnostic>,
}

impl AllocationResult {
  pub fn allocation_for(&self, temp: TempId) -> Option<Allocation> {
    self.allocations.get(&temp).copied()
  }

  /// All temps in id order.
  pub fn iter(&self) -> impl Iterator<Item = (TempId, Allocation)> + '_ {
    self.allocations.iter().map(|(&t, &a)| (t, a))
  }

  pub fn len(&self) -> usize {
    self.allocations.len()
  }

  pub fn is_empty(&self) -> bool {
    self.allocations.is_empty()
  }

  /// Stack cursor after the last spill, i.e. the frame size to reserve.
  pub fn frame_size(&self) -> u32 {
    self.frame_size
  }

  pub fn stack_base(&self) -> u32 {
    self.stack_base
  }

  /// Temps that ended up on the stack, evicted ones included.
  pub fn num_spills(&self) -> usize {
    self.num_spills
  }

  pub fn num_evictions(&self) -> usize {
    self.num_evictions
  }

  /// Callee-saved registers handed to at least one temp, for the prologue.
  pub fn used_callee_saved(&self) -> &[RegisterId] {
    &self.used_callee_saved
  }

  pub fn diagnostics(&self) -> &[Diagnostic] {
    &self.diagnostics
  }

  /// Human readable listing with register names resolved.
  pub fn listing<'a>(&'a self, regs: &'a RegisterFile) -> Listing<'a> {
    Listing { result: self, regs }
  }

  /// Serializable view with register names resolved.
  pub fn records(&self, regs: &RegisterFile) -> Vec<AllocationRecord> {
    self
      .iter()
      .map(|(temp, alloc)| AllocationRecord {
        temp: temp.to_string(),
        location: match alloc {
          Allocation::Register(r) => Location::Register(regs.name(r).to_string()),
          Allocation::Stack(offset) => Location::Stack(offset),
        },
      })
      .collect()
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
  Register(String),
  Stack(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationRecord {
  pub temp: String,
  pub location: Location,
}

pub struct Listing<'a> {
  result: &'a AllocationResult,
  regs: &'a RegisterFile,
}

impl fmt::Display for Listing<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (temp, alloc) in self.result.iter() {
      let temp = temp.to_string();
      match alloc {
        Allocation::Register(r) => writeln!(f, "{:>6} -> {}", temp, self.regs.name(r))?,
        Allocation::Stack(offset) => writeln!(f, "{:>6} -> stack+{}", temp, offset)?,
      }
    }
    write!(f, "frame size: {}", self.result.frame_size)
  }
}
