//! Linear scan register allocation for a compiler backend.
//!
//! A [`target::TargetDescription`] lists the registers of a machine, which of
//! them alias, and which value types each may hold. It is grouped once into a
//! [`bank::BankCatalog`] (cached per target), against which an
//! [`regalloc::Allocator`] assigns every temp of a function either a register
//! or a stack slot.

pub mod bank;
pub mod config;
pub mod ir;
pub mod regalloc;
pub mod registers;
pub mod target;

pub use bank::catalog_for;
pub use config::AllocatorConfig;
pub use regalloc::{allocate, Allocation, AllocationResult, Allocator};
pub use target::TargetDescription;

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ir::{parse_program, TempId};

  #[test]
  fn test_one_catalog_many_functions() {
    let target = TargetDescription::load("x86_64").unwrap();
    let catalog = catalog_for(&target).unwrap();
    let mut allocator = Allocator::new(&catalog, AllocatorConfig::default());

    let f = parse_program("param t0:ptr\nt1:i32 = load t0\nfree t0\nret t1\nfree t1").unwrap();
    let g = parse_program("param t0:f64\nparam t1:i64\nfree t1\nfree t0").unwrap();

    let rf = allocator.run(&f);
    let rg = allocator.run_from(&g, 16);
    let regs = catalog.registers();

    assert_eq!(
      rf.allocation_for(TempId(0)),
      Some(Allocation::Register(regs.lookup("%rax").unwrap()))
    );
    assert_eq!(
      rf.allocation_for(TempId(1)),
      Some(Allocation::Register(regs.lookup("%edi").unwrap()))
    );
    assert_eq!(
      rg.allocation_for(TempId(0)),
      Some(Allocation::Register(regs.lookup("%xmm0").unwrap()))
    );
    assert_eq!(
      rg.allocation_for(TempId(1)),
      Some(Allocation::Register(regs.lookup("%rax").unwrap()))
    );
    assert_eq!(rg.frame_size(), 16);
    assert_eq!(rf.allocation_for(TempId(7)), None);
  }
}
