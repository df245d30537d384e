//! Register banks: same-size pools of registers a value type may use.
mod catalog;

use crate::registers::RegisterId;
use crate::target::{TypePredicate, ValueType};

pub use catalog::{catalog_for, BankCatalog};

/// An ordered pool of registers serving one value size. Immutable once the
/// catalog is built; the runtime free state lives in [`Supplier`].
#[derive(Debug, Clone)]
pub struct Bank {
  size: u32,
  accepts: TypePredicate,
  registers: Vec<RegisterId>,
}

impl Bank {
  pub fn new(size: u32, accepts: TypePredicate) -> Self {
    Bank {
      size,
      accepts,
      registers: vec![],
    }
  }

  pub(crate) fn push(&mut self, reg: RegisterId) {
    if !self.registers.contains(&reg) {
      self.registers.push(reg);
    }
  }

  /// Value size in bytes this bank serves.
  pub fn size(&self) -> u32 {
    self.size
  }

  /// Registers in preference order.
  pub fn registers(&self) -> &[RegisterId] {
    &self.registers
  }

  pub fn predicate(&self) -> TypePredicate {
    self.accepts
  }

  #[inline]
  pub fn accepts(&self, ty: ValueType) -> bool {
    self.accepts.accepts(ty)
  }

  pub fn contains(&self, reg: RegisterId) -> bool {
    self.registers.contains(&reg)
  }

  pub fn is_empty(&self) -> bool {
    self.registers.is_empty()
  }
}

/// Which registers of a [`Bank`] are free during one allocation run.
#[derive(Debug)]
pub struct Supplier<'a> {
  bank: &'a Bank,
  free: Vec<bool>,
}

impl<'a> Supplier<'a> {
  pub fn new(bank: &'a Bank) -> Self {
    Supplier {
      bank,
      free: vec![true; bank.registers.len()],
    }
  }

  pub fn bank(&self) -> &'a Bank {
    self.bank
  }

  /// Mark every register free again.
  pub fn reset(&mut self) {
    self.free.iter_mut().for_each(|f| *f = true);
  }

  /// Take the first free register, in preference order, for which
  /// `admissible` holds.
  pub fn next_available(&mut self, admissible: impl Fn(RegisterId) -> bool) -> Option<RegisterId> {
    let regs = &self.bank.registers;
    let slot = (0..regs.len()).find(|&slot| self.free[slot] && admissible(regs[slot]))?;
    self.free[slot] = false;
    Some(self.bank.registers[slot])
  }

  /// Return a register to the pool. Registers of other banks are ignored.
  pub fn give_back(&mut self, reg: RegisterId) {
    if let Some(slot) = self.slot_of(reg) {
      debug_assert!(!self.is_free(reg), "{:?} returned twice", reg);
      self.free[slot] = true;
    }
  }

  pub fn is_free(&self, reg: RegisterId) -> bool {
    self.slot_of(reg).map_or(false, |slot| self.free[slot])
  }

  #[cfg(test)]
  pub(crate) fn num_free(&self) -> usize {
    self.free.iter().filter(|&&f| f).count()
  }

  fn slot_of(&self, reg: RegisterId) -> Option<usize> {
    self.bank.registers.iter().position(|&r| r == reg)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn bank() -> Bank {
    let mut bank = Bank::new(4, TypePredicate::INTEGER);
    for i in 0..3 {
      bank.push(RegisterId(i));
    }
    bank
  }

  #[test]
  fn test_supplier_order_and_return() {
    let bank = bank();
    let mut supplier = Supplier::new(&bank);
    assert_eq!(supplier.next_available(|_| true), Some(RegisterId(0)));
    assert_eq!(supplier.next_available(|_| true), Some(RegisterId(1)));
    supplier.give_back(RegisterId(0));
    assert!(supplier.is_free(RegisterId(0)));
    assert_eq!(supplier.next_available(|_| true), Some(RegisterId(0)));
    assert_eq!(supplier.next_available(|_| true), Some(RegisterId(2)));
    assert_eq!(supplier.next_available(|_| true), None);
    assert_eq!(supplier.num_free(), 0);

    supplier.reset();
    assert_eq!(supplier.num_free(), 3);
  }

  #[test]
  fn test_supplier_skips_inadmissible() {
    let bank = bank();
    let mut supplier = Supplier::new(&bank);
    assert_eq!(
      supplier.next_available(|r| r != RegisterId(0)),
      Some(RegisterId(1))
    );
    // the skipped register stays free
    assert!(supplier.is_free(RegisterId(0)));
    assert!(!supplier.is_free(RegisterId(7)));
  }

  #[test]
  fn test_bank_predicate() {
    let bank = bank();
    assert!(bank.accepts(ValueType::I32));
    assert!(!bank.accepts(ValueType::F32));
    assert!(bank.contains(RegisterId(2)));
    assert!(!bank.is_empty());
  }
}
