use std::collections::BTreeSet;

use crate::{
  bank::{BankCatalog, Supplier},
  config::AllocatorConfig,
  ir::IrOperation,
  regalloc::{
    active::{ActiveInterval, ActiveSet, BankRef},
    liveness::{Interval, Liveness},
    result::{Allocation, AllocationResult, Diagnostic},
  },
  registers::RegisterId,
};

/// Linear scan allocator over one target's bank catalog.
///
/// The catalog is shared and never touched; everything that changes during a
/// run (free pools, active set, stack cursor) lives here and is reset at the
/// start of each run, so one allocator can serve every function of a
/// translation unit.
pub struct Allocator<'a> {
  pub(super) catalog: &'a BankCatalog,
  pub(super) config: AllocatorConfig,
  /// Free pools, laid out like the catalog's banks.
  pub(super) suppliers: Vec<Vec<Supplier<'a>>>,
  pub(super) active: ActiveSet,
  pub(super) stack_cursor: u32,
  pub(super) result: AllocationResult,
}

impl<'a> Allocator<'a> {
  pub fn new(catalog: &'a BankCatalog, config: AllocatorConfig) -> Self {
    let suppliers = (0..catalog.num_size_classes())
      .map(|i| catalog.banks_at(i).iter().map(Supplier::new).collect())
      .collect();
    Allocator {
      catalog,
      stack_cursor: config.stack_base,
      config,
      suppliers,
      active: ActiveSet::default(),
      result: AllocationResult::default(),
    }
  }

  pub fn catalog(&self) -> &'a BankCatalog {
    self.catalog
  }

  /// Allocate every temp of `ops`, with spill slots starting at the
  /// configured stack base.
  pub fn run<O: IrOperation>(&mut self, ops: &[O]) -> AllocationResult {
    let base = self.config.stack_base;
    self.run_from(ops, base)
  }

  /// Like [`Allocator::run`], continuing a frame of which `stack_base` bytes
  /// are already reserved.
  pub fn run_from<O: IrOperation>(&mut self, ops: &[O], stack_base: u32) -> AllocationResult {
    let (intervals, unfreed) = Liveness::from_ops(ops).into_parts();
    let mut result = self.run_intervals(&intervals, stack_base);
    if !unfreed.is_empty() {
      result.diagnostics.push(Diagnostic::UnfreedTemps(unfreed));
    }
    result
  }

  /// Allocate already built intervals. They must be sorted by start.
  pub fn run_intervals(&mut self, intervals: &[Interval], stack_base: u32) -> AllocationResult {
    debug_assert!(intervals.windows(2).all(|w| w[0].start <= w[1].start));
    self.reset(stack_base);

    for (seq, interval) in intervals.iter().enumerate() {
      if self.config.all_stack {
        self.assign_stack(interval);
        continue;
      }

      self.expire_old_intervals(interval.start);
      match self.find_register(interval) {
        Some((reg, bank)) => self.activate(seq, interval, reg, bank),
        None => self.spill_at_interval(seq, interval),
      }
    }

    self.finish()
  }

  fn reset(&mut self, stack_base: u32) {
    for supplier in self.suppliers.iter_mut().flatten() {
      supplier.reset();
    }
    self.active.clear();
    self.stack_cursor = stack_base;
    self.result = AllocationResult {
      stack_base,
      ..AllocationResult::default()
    };
  }

  /// Retire intervals that ended before `pos`, handing their registers back.
  fn expire_old_intervals(&mut self, pos: usize) {
    for expired in self.active.expire_before(pos) {
      let BankRef {
        size_index,
        bank_index,
      } = expired.bank;
      self.suppliers[size_index][bank_index].give_back(expired.reg);
    }
  }

  /// First free register that can hold `interval` and shares no storage with
  /// an active register. Size classes are scanned upward from the closest
  /// class at or below the interval's size.
  fn find_register(&mut self, interval: &Interval) -> Option<(RegisterId, BankRef)> {
    let first = self.catalog.closest_size_index(interval.size).unwrap_or(0);
    let regs = self.catalog.registers();
    let active = &self.active;

    for (size_index, suppliers) in self.suppliers.iter_mut().enumerate().skip(first) {
      for (bank_index, supplier) in suppliers.iter_mut().enumerate() {
        let bank = supplier.bank();
        if bank.size() < interval.size || !bank.accepts(interval.ty) {
          continue;
        }
        if let Some(reg) = supplier.next_available(|r| !active.conflicts(regs, r)) {
          return Some((
            reg,
            BankRef {
              size_index,
              bank_index,
            },
          ));
        }
      }
    }
    None
  }

  /// Bind `interval` to `reg` and make it active.
  pub(super) fn activate(&mut self, seq: usize, interval: &Interval, reg: RegisterId, bank: BankRef) {
    log::debug!(
      "{} -> {}",
      interval,
      self.catalog.registers().name(reg)
    );
    self
      .result
      .allocations
      .insert(interval.temp, Allocation::Register(reg));
    self.active.insert(
      seq,
      ActiveInterval {
        interval: *interval,
        reg,
        bank,
      },
    );
  }

  fn finish(&mut self) -> AllocationResult {
    let regs = self.catalog.registers();
    self.result.frame_size = self.stack_cursor;
    self.result.used_callee_saved = self
      .result
      .allocations
      .values()
      .filter_map(|alloc| alloc.as_register().copied())
      .filter(|&r| regs.get(r).is_callee_saved())
      .collect::<BTreeSet<_>>()
      .into_iter()
      .collect();
    log::debug!(
      "Allocated {} temps, {} spilled ({} evicted), {} live at exit, frame size {}",
      self.result.allocations.len(),
      self.result.num_spills,
      self.result.num_evictions,
      self.active.len(),
      self.result.frame_size
    );
    std::mem::take(&mut self.result)
  }
}

/// Run one allocation of `ops` against `catalog`.
pub fn allocate<O: IrOperation>(
  catalog: &BankCatalog,
  ops: &[O],
  config: &AllocatorConfig,
) -> AllocationResult {
  Allocator::new(catalog, config.clone()).run(ops)
}
