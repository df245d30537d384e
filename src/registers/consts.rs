use crate::registers::reg::X86_64Register;

// IMPORTANT: The ordering of ALLOC_POOL_X86_64 is the allocation preference.
//
// ====================
// Caller-saved registers come first so that short-lived temps never force a
// callee-saved register into the prologue. Keep it that way upon change!
// ====================
pub const X86_64_POOL_SIZE: usize = 14;
pub const ALLOC_POOL_X86_64: [X86_64Register; X86_64_POOL_SIZE] = [
  X86_64Register::RAX(64),
  X86_64Register::RDI(64),
  X86_64Register::RSI(64),
  X86_64Register::RDX(64),
  X86_64Register::RCX(64),
  X86_64Register::R8(64),
  X86_64Register::R9(64),
  X86_64Register::R10(64),
  X86_64Register::R11(64),
  X86_64Register::RBX(64),
  X86_64Register::R12(64),
  X86_64Register::R13(64),
  X86_64Register::R14(64),
  X86_64Register::R15(64),
];

/// Stack and frame pointer, never handed out.
pub const RESERVED_X86_64: [X86_64Register; 2] = [X86_64Register::RSP(64), X86_64Register::RBP(64)];

/// The six families with a 32-bit name in protected mode, in preference order.
pub const I386_POOL_SIZE: usize = 6;
pub const ALLOC_POOL_I386: [X86_64Register; I386_POOL_SIZE] = [
  X86_64Register::RAX(32),
  X86_64Register::RCX(32),
  X86_64Register::RDX(32),
  X86_64Register::RBX(32),
  X86_64Register::RSI(32),
  X86_64Register::RDI(32),
];

/// Only these have a byte view outside of long mode.
pub const I386_BYTE_ADDRESSABLE: [X86_64Register; 4] = [
  X86_64Register::RAX(8),
  X86_64Register::RCX(8),
  X86_64Register::RDX(8),
  X86_64Register::RBX(8),
];

pub const RESERVED_I386: [X86_64Register; 2] = [X86_64Register::RSP(32), X86_64Register::RBP(32)];

pub const NUM_XMM_X86_64: u8 = 16;
pub const NUM_XMM_I386: u8 = 8;
pub const NUM_X87: u8 = 8;
