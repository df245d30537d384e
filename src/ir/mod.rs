//! The slice of the IR the allocator looks at.
//!
//! Lowering hands over a linear sequence of operations. Each one may define a
//! temp, reads some temps, and explicit `free` markers end a temp's lifetime.
mod lex;
mod parse;

use std::fmt;

use enum_as_inner::EnumAsInner;
use serde::Serialize;

use crate::target::ValueType;

pub use parse::{parse_file, parse_program};

/// Identity of a compiler temporary.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TempId(pub u32);

impl fmt::Display for TempId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "t{}", self.0)
  }
}

/// A temp together with what the allocator needs to know about its value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Temp {
  pub id: TempId,
  /// Size in bytes.
  pub size: u32,
  pub ty: ValueType,
}

impl Temp {
  pub fn new(id: u32, ty: ValueType) -> Self {
    Temp {
      id: TempId(id),
      size: ty.size(),
      ty,
    }
  }

  /// A temp whose size differs from its type's natural size, e.g. a
  /// pointer on a 32-bit target.
  pub fn with_size(mut self, size: u32) -> Self {
    self.size = size;
    self
  }
}

impl fmt::Display for Temp {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.id, self.ty)
  }
}

/// What the interval builder needs from an IR operation.
pub trait IrOperation {
  /// The temp this operation defines, if any.
  fn defined(&self) -> Option<Temp>;
  /// The temps this operation reads.
  fn used(&self) -> Vec<Temp>;
  /// The temp whose lifetime this operation ends, for free markers.
  fn freed(&self) -> Option<Temp> {
    None
  }
}

/// Instruction operand.
#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumAsInner)]
pub enum Operand {
  Const(i64),
  Temp(Temp),
}

impl fmt::Display for Operand {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Operand::Const(c) => write!(f, "{}", c),
      Operand::Temp(t) => write!(f, "{}", t.id),
    }
  }
}

/// A small reference IR, enough to drive the allocator from text.
#[derive(Debug, Clone, PartialEq, Eq, EnumAsInner)]
pub enum Instr {
  /// Incoming value, defined at function entry.
  Param { dest: Temp },
  Op {
    name: String,
    dest: Option<Temp>,
    srcs: Vec<Operand>,
  },
  Free(Temp),
}

impl IrOperation for Instr {
  fn defined(&self) -> Option<Temp> {
    match self {
      Instr::Param { dest } => Some(*dest),
      Instr::Op { dest, .. } => *dest,
      Instr::Free(_) => None,
    }
  }

  fn used(&self) -> Vec<Temp> {
    match self {
      Instr::Op { srcs, .. } => srcs.iter().filter_map(|op| op.as_temp().copied()).collect(),
      _ => vec![],
    }
  }

  fn freed(&self) -> Option<Temp> {
    match self {
      Instr::Free(t) => Some(*t),
      _ => None,
    }
  }
}

impl fmt::Display for Instr {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Instr::Param { dest } => write!(f, "param {}", dest),
      Instr::Op { name, dest, srcs } => {
        if let Some(dest) = dest {
          write!(f, "{} = ", dest)?;
        }
        write!(f, "{}", name)?;
        for (i, src) in srcs.iter().enumerate() {
          let sep = if i == 0 { " " } else { ", " };
          write!(f, "{}{}", sep, src)?;
        }
        Ok(())
      }
      Instr::Free(t) => write!(f, "free {}", t.id),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_instr_liveness_view() {
    let t0 = Temp::new(0, ValueType::I64);
    let t1 = Temp::new(1, ValueType::I32);
    let add = Instr::Op {
      name: "add".to_string(),
      dest: Some(t1),
      srcs: vec![Operand::Temp(t0), Operand::Const(4)],
    };
    assert_eq!(add.defined(), Some(t1));
    assert_eq!(add.used(), vec![t0]);
    assert_eq!(add.freed(), None);
    assert_eq!(add.to_string(), "t1:i32 = add t0, 4");

    let free = Instr::Free(t0);
    assert_eq!(free.freed(), Some(t0));
    assert!(free.used().is_empty());
    assert_eq!(free.to_string(), "free t0");
  }

  #[test]
  fn test_temp_size() {
    assert_eq!(Temp::new(3, ValueType::F80).size, 10);
    assert_eq!(Temp::new(3, ValueType::Ptr).with_size(4).size, 4);
  }
}
