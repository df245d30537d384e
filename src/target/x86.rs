// Built-in x86 descriptions.

use crate::registers::{
  consts::{
    ALLOC_POOL_I386, ALLOC_POOL_X86_64, I386_BYTE_ADDRESSABLE, NUM_X87, NUM_XMM_I386,
    NUM_XMM_X86_64, RESERVED_I386, RESERVED_X86_64,
  },
  reg::{X86_64Register, X87Register, XmmRegister},
  RegisterFile, RegisterFileBuilder, RegisterId, StorageClass,
};

use super::{RegisterEntry, TargetDescription, TypePredicate};

/// Declares the given views of one general purpose family and aliases them.
fn declare_family(
  builder: &mut RegisterFileBuilder,
  views: &[X86_64Register],
  callee_saved: bool,
) -> Vec<RegisterId> {
  let ids = views
    .iter()
    .map(|view| {
      builder
        .declare(
          &view.to_string(),
          view.byte_size(),
          StorageClass::Integer,
          callee_saved,
        )
        .expect("x86 register names are unique")
    })
    .collect::<Vec<_>>();
  builder.alias_group(&ids);
  ids
}

fn declare_vector_units(
  builder: &mut RegisterFileBuilder,
  entries: &mut Vec<RegisterEntry>,
  num_xmm: u8,
  xmm_usable: bool,
) {
  for i in 0..num_xmm {
    let xmm = XmmRegister(i);
    let id = builder
      .declare(&xmm.to_string(), XmmRegister::BYTE_SIZE, StorageClass::Sse, false)
      .expect("x86 register names are unique");
    builder.set_usable(id, xmm_usable);
    entries.push(RegisterEntry::new(id, vec![4, 8, 16], TypePredicate::SSE));
  }

  for i in 0..NUM_X87 {
    let st = X87Register(i);
    let id = builder
      .declare(&st.to_string(), X87Register::BYTE_SIZE, StorageClass::X87, false)
      .expect("x86 register names are unique");
    entries.push(RegisterEntry::new(
      id,
      vec![X87Register::BYTE_SIZE],
      TypePredicate::EXTENDED,
    ));
  }
}

/// x86_64 under the System V ABI.
pub fn x86_64() -> TargetDescription {
  let mut builder = RegisterFile::builder();
  let mut entries = vec![];

  for family in ALLOC_POOL_X86_64 {
    let views = family.views();
    let ids = declare_family(&mut builder, &views, family.is_callee_saved());
    for (view, id) in views.iter().zip(ids) {
      entries.push(RegisterEntry::new(
        id,
        vec![view.byte_size()],
        TypePredicate::INTEGER,
      ));
    }
  }

  for family in RESERVED_X86_64 {
    for id in declare_family(&mut builder, &family.views(), true) {
      builder.set_usable(id, false);
    }
  }

  declare_vector_units(&mut builder, &mut entries, NUM_XMM_X86_64, true);

  TargetDescription::new("x86_64", builder.build(), entries)
    .expect("built-in x86_64 description is well formed")
}

/// 32-bit protected mode. SSE registers exist but are not used for values,
/// so `f32`/`f64` temps always live on the stack.
pub fn i386() -> TargetDescription {
  let mut builder = RegisterFile::builder();
  let mut entries = vec![];

  for family in ALLOC_POOL_I386 {
    let callee_saved = matches!(
      family,
      X86_64Register::RBX(_) | X86_64Register::RSI(_) | X86_64Register::RDI(_)
    );
    let mut views = vec![family.as_16bit(), family.as_32bit()];
    if I386_BYTE_ADDRESSABLE.contains(&family.as_8bit()) {
      views.insert(0, family.as_8bit());
    }
    let ids = declare_family(&mut builder, &views, callee_saved);
    for (view, id) in views.iter().zip(ids) {
      entries.push(RegisterEntry::new(
        id,
        vec![view.byte_size()],
        TypePredicate::INTEGER,
      ));
    }
  }

  for family in RESERVED_I386 {
    let views = [family.as_16bit(), family.as_32bit()];
    for id in declare_family(&mut builder, &views, true) {
      builder.set_usable(id, false);
    }
  }

  declare_vector_units(&mut builder, &mut entries, NUM_XMM_I386, false);

  TargetDescription::new("i386", builder.build(), entries)
    .expect("built-in i386 description is well formed")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn x86_64_aliases_every_view() {
    let target = x86_64();
    let regs = target.registers();
    let rax = regs.lookup("%rax").unwrap();
    let eax = regs.lookup("%eax").unwrap();
    let al = regs.lookup("%al").unwrap();
    let rbx = regs.lookup("%rbx").unwrap();
    let xmm0 = regs.lookup("%xmm0").unwrap();
    assert!(regs.intersects(rax, al));
    assert!(regs.intersects(al, eax));
    assert!(!regs.intersects(rax, rbx));
    assert!(!regs.intersects(rax, xmm0));
    assert!(regs.get(rbx).is_callee_saved());
    assert!(!regs.get(rax).is_callee_saved());
  }

  #[test]
  fn x86_64_reserves_stack_and_frame_pointer() {
    let target = x86_64();
    let regs = target.registers();
    for name in ["%rsp", "%esp", "%rbp", "%bpl"] {
      assert!(!regs.is_usable(regs.lookup(name).unwrap()), "{}", name);
    }
    assert!(regs.is_usable(regs.lookup("%r15").unwrap()));
    // reserved registers have no entries
    let rsp = regs.lookup("%rsp").unwrap();
    assert!(target.entries().iter().all(|e| e.register != rsp));
  }

  #[test]
  fn i386_has_no_usable_sse() {
    let target = i386();
    let regs = target.registers();
    assert!(regs.lookup("%xmm7").is_some());
    assert!(regs.lookup("%xmm8").is_none());
    assert!(!regs.is_usable(regs.lookup("%xmm0").unwrap()));
    assert!(regs.lookup("%sil").is_none());
    assert!(regs.lookup("%r8d").is_none());
    assert!(regs.get(regs.lookup("%esi").unwrap()).is_callee_saved());
  }
}
