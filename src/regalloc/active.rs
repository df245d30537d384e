use std::collections::BTreeMap;

use crate::registers::{RegisterFile, RegisterId};

use super::liveness::Interval;

/// Which bank, by position in the catalog, a register was taken from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct BankRef {
  pub size_index: usize,
  pub bank_index: usize,
}

/// An interval currently holding a register.
#[derive(Debug, Clone)]
pub(crate) struct ActiveInterval {
  pub interval: Interval,
  pub reg: RegisterId,
  pub bank: BankRef,
}

/// Intervals holding a register, ordered by end position. The second key is
/// the interval's position in start order, which keeps ties deterministic.
#[derive(Debug, Default)]
pub(crate) struct ActiveSet {
  by_end: BTreeMap<(usize, usize), ActiveInterval>,
}

impl ActiveSet {
  pub fn insert(&mut self, seq: usize, active: ActiveInterval) {
    self.by_end.insert((active.interval.end, seq), active);
  }

  /// Remove and return every interval ending strictly before `pos`.
  pub fn expire_before(&mut self, pos: usize) -> Vec<ActiveInterval> {
    let mut expired = vec![];
    while let Some(entry) = self.by_end.first_entry() {
      if entry.key().0 >= pos {
        break;
      }
      expired.push(entry.remove());
    }
    expired
  }

  /// The interval that expires last.
  pub fn last(&self) -> Option<&ActiveInterval> {
    self.by_end.values().next_back()
  }

  pub fn pop_last(&mut self) -> Option<ActiveInterval> {
    self.by_end.pop_last().map(|(_, active)| active)
  }

  /// Whether `candidate` shares storage with any register held right now.
  pub fn conflicts(&self, regs: &RegisterFile, candidate: RegisterId) -> bool {
    self
      .by_end
      .values()
      .any(|active| regs.intersects(active.reg, candidate))
  }

  pub fn len(&self) -> usize {
    self.by_end.len()
  }

  pub fn clear(&mut self) {
    self.by_end.clear();
  }
}
