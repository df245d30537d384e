//! Spill policy for when no register is free.
use super::{liveness::Interval, result::Allocation, Allocator};

impl<'a> Allocator<'a> {
  /// Either evict the active interval that expires last, if it outlives
  /// `interval` and its register can hold `interval`, or put `interval` on
  /// the stack.
  pub(super) fn spill_at_interval(&mut self, seq: usize, interval: &Interval) {
    if self.config.eviction {
      if let Some(victim) = self.active.last() {
        let bank = self.suppliers[victim.bank.size_index][victim.bank.bank_index].bank();
        if victim.interval.end > interval.end
          && bank.accepts(interval.ty)
          && bank.size() >= interval.size
        {
          if let Some(victim) = self.active.pop_last() {
            log::debug!(
              "{} evicted from {} by {}",
              victim.interval,
              self.catalog.registers().name(victim.reg),
              interval
            );
            self.assign_stack(&victim.interval);
            self.result.num_evictions += 1;
            self.activate(seq, interval, victim.reg, victim.bank);
            return;
          }
        }
      }
    }

    self.assign_stack(interval);
  }

  /// Give `interval` the next slot of the spill area. Always succeeds.
  pub(super) fn assign_stack(&mut self, interval: &Interval) -> u32 {
    let offset = self.stack_cursor;
    self.stack_cursor += interval.size;
    log::debug!("{} -> stack+{}", interval, offset);
    self
      .result
      .allocations
      .insert(interval.temp, Allocation::Stack(offset));
    self.result.num_spills += 1;
    offset
  }
}
