//! Target register descriptions: which registers exist, which value types
//! each may hold, and at which sizes.
mod config;
mod x86;

use std::fmt;
use std::path::Path;

use anyhow::{anyhow, bail, Result};
use serde::Serialize;
use strum_macros::AsRefStr;

use crate::registers::{RegisterFile, RegisterId};

pub use x86::{i386, x86_64};

/// Classification of IR values, as produced by lowering.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ValueType {
  I8,
  I16,
  I32,
  I64,
  Ptr,
  F32,
  F64,
  F80,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ValueClass {
  /// Integers and pointers.
  Integer,
  Floating,
  /// x87 long double.
  Extended,
}

impl ValueType {
  pub const ALL: [ValueType; 8] = [
    ValueType::I8,
    ValueType::I16,
    ValueType::I32,
    ValueType::I64,
    ValueType::Ptr,
    ValueType::F32,
    ValueType::F64,
    ValueType::F80,
  ];

  /// Natural size in bytes.
  pub const fn size(&self) -> u32 {
    match self {
      ValueType::I8 => 1,
      ValueType::I16 => 2,
      ValueType::I32 | ValueType::F32 => 4,
      ValueType::I64 | ValueType::Ptr | ValueType::F64 => 8,
      ValueType::F80 => 10,
    }
  }

  pub const fn class(&self) -> ValueClass {
    match self {
      ValueType::I8 | ValueType::I16 | ValueType::I32 | ValueType::I64 | ValueType::Ptr => {
        ValueClass::Integer
      }
      ValueType::F32 | ValueType::F64 => ValueClass::Floating,
      ValueType::F80 => ValueClass::Extended,
    }
  }

  pub fn from_name(name: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|ty| ty.as_ref() == name)
  }
}

impl fmt::Display for ValueType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_ref())
  }
}

fn is_integer(ty: ValueType) -> bool {
  ty.class() == ValueClass::Integer
}

fn is_floating(ty: ValueType) -> bool {
  ty.class() != ValueClass::Integer
}

fn is_sse(ty: ValueType) -> bool {
  ty.class() == ValueClass::Floating
}

fn is_extended(ty: ValueType) -> bool {
  ty.class() == ValueClass::Extended
}

fn is_any(_: ValueType) -> bool {
  true
}

/// Decides whether a value type may live in a bank. Stored by value next to
/// each bank; the name is what target files refer to.
#[derive(Clone, Copy)]
pub struct TypePredicate {
  name: &'static str,
  test: fn(ValueType) -> bool,
}

impl TypePredicate {
  pub const INTEGER: TypePredicate = TypePredicate::new("integer", is_integer);
  /// Any floating type, extended precision included.
  pub const FLOATING: TypePredicate = TypePredicate::new("floating", is_floating);
  /// Floating types that fit an SSE lane, i.e. not extended precision.
  pub const SSE: TypePredicate = TypePredicate::new("sse", is_sse);
  pub const EXTENDED: TypePredicate = TypePredicate::new("extended", is_extended);
  pub const ANY: TypePredicate = TypePredicate::new("any", is_any);

  const BUILTIN: [TypePredicate; 5] = [
    Self::INTEGER,
    Self::FLOATING,
    Self::SSE,
    Self::EXTENDED,
    Self::ANY,
  ];

  pub const fn new(name: &'static str, test: fn(ValueType) -> bool) -> Self {
    TypePredicate { name, test }
  }

  pub fn from_name(name: &str) -> Option<Self> {
    Self::BUILTIN.into_iter().find(|p| p.name == name)
  }

  #[inline]
  pub fn accepts(&self, ty: ValueType) -> bool {
    (self.test)(ty)
  }

  pub fn name(&self) -> &'static str {
    self.name
  }
}

impl fmt::Debug for TypePredicate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "TypePredicate({})", self.name)
  }
}

impl PartialEq for TypePredicate {
  fn eq(&self, other: &Self) -> bool {
    self.name == other.name
  }
}

impl Eq for TypePredicate {}

/// One allocatable register: the value sizes it serves and which value types
/// it takes.
#[derive(Debug, Clone)]
pub struct RegisterEntry {
  pub register: RegisterId,
  pub sizes: Vec<u32>,
  pub accepts: TypePredicate,
}

impl RegisterEntry {
  pub fn new(register: RegisterId, sizes: Vec<u32>, accepts: TypePredicate) -> Self {
    RegisterEntry {
      register,
      sizes,
      accepts,
    }
  }
}

/// The register description of one target. Entry order is allocation
/// preference order.
#[derive(Debug, Clone)]
pub struct TargetDescription {
  name: String,
  registers: RegisterFile,
  entries: Vec<RegisterEntry>,
}

impl TargetDescription {
  pub fn new(name: &str, registers: RegisterFile, entries: Vec<RegisterEntry>) -> Result<Self> {
    for entry in &entries {
      if entry.register.index() >= registers.len() {
        bail!("target {}: entry names unknown register {:?}", name, entry.register);
      }
      let reg = registers.get(entry.register);
      if entry.sizes.is_empty() {
        bail!("target {}: register {} serves no size", name, reg);
      }
      if let Some(size) = entry
        .sizes
        .iter()
        .find(|&&size| size == 0 || size > reg.size())
      {
        bail!(
          "target {}: register {} ({} bytes) cannot serve size {}",
          name,
          reg,
          reg.size(),
          size
        );
      }
    }

    Ok(TargetDescription {
      name: name.to_string(),
      registers,
      entries,
    })
  }

  /// Resolve a built-in target by name, or load a target file.
  pub fn load(name_or_path: &str) -> Result<Self> {
    match name_or_path {
      "x86_64" | "x86-64" | "amd64" => Ok(x86_64()),
      "i386" | "x86" => Ok(i386()),
      path if Path::new(path).exists() => Self::from_file(path),
      other => Err(anyhow!("unknown target {}", other)),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn registers(&self) -> &RegisterFile {
    &self.registers
  }

  pub fn entries(&self) -> &[RegisterEntry] {
    &self.entries
  }

  /// Take a register, and everything sharing its storage, out of
  /// allocation for good. Must happen before the catalog is built.
  pub fn disable(&mut self, register: &str) -> Result<()> {
    self.registers.disable(register)
  }

  /// Cache key for the bank catalog. Covers every register and entry, so
  /// two descriptions share a key only if they build the same catalog.
  pub fn identity(&self) -> String {
    let regs = &self.registers;
    let mut id = self.name.clone();
    for reg in regs.iter() {
      let mut overlaps = reg
        .overlaps()
        .iter()
        .map(|&other| regs.name(other))
        .collect::<Vec<_>>();
      overlaps.sort_unstable();
      id.push_str(&format!(
        "|{}:{}:{}:{}:{}:{}",
        reg.name(),
        reg.size(),
        reg.class().as_ref(),
        if reg.is_usable() { "u" } else { "-" },
        if reg.is_callee_saved() { "s" } else { "-" },
        overlaps.join(",")
      ));
    }
    for entry in &self.entries {
      id.push_str(&format!(
        "|{}{:?}{}",
        regs.name(entry.register),
        entry.sizes,
        entry.accepts.name()
      ));
    }
    id
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::registers::StorageClass;

  #[test]
  fn test_value_types() {
    assert_eq!(ValueType::from_name("ptr"), Some(ValueType::Ptr));
    assert_eq!(ValueType::from_name("f80"), Some(ValueType::F80));
    assert_eq!(ValueType::from_name("i128"), None);
    assert_eq!(ValueType::F80.size(), 10);
    assert_eq!(ValueType::Ptr.class(), ValueClass::Integer);
    assert_eq!(ValueType::I16.to_string(), "i16");
  }

  #[test]
  fn test_predicates() {
    assert!(TypePredicate::INTEGER.accepts(ValueType::Ptr));
    assert!(!TypePredicate::INTEGER.accepts(ValueType::F32));
    assert!(TypePredicate::SSE.accepts(ValueType::F64));
    assert!(!TypePredicate::SSE.accepts(ValueType::F80));
    assert!(TypePredicate::FLOATING.accepts(ValueType::F80));
    assert!(TypePredicate::EXTENDED.accepts(ValueType::F80));
    assert!(!TypePredicate::EXTENDED.accepts(ValueType::F64));
    assert!(ValueType::ALL.iter().all(|&ty| TypePredicate::ANY.accepts(ty)));
    assert_eq!(TypePredicate::from_name("sse"), Some(TypePredicate::SSE));
    assert_eq!(TypePredicate::from_name("vector"), None);
  }

  #[test]
  fn oversized_entry_is_rejected() {
    let mut builder = RegisterFile::builder();
    let r0 = builder.declare("r0", 4, StorageClass::Integer, false).unwrap();
    let file = builder.build();
    let entries = vec![RegisterEntry::new(r0, vec![8], TypePredicate::INTEGER)];
    assert!(TargetDescription::new("bad", file.clone(), entries).is_err());
    let entries = vec![RegisterEntry::new(r0, vec![], TypePredicate::INTEGER)];
    assert!(TargetDescription::new("bad", file.clone(), entries).is_err());
    let entries = vec![RegisterEntry::new(r0, vec![1, 2, 4], TypePredicate::INTEGER)];
    assert!(TargetDescription::new("ok", file, entries).is_ok());
  }

  #[test]
  fn identity_tracks_disabled_registers() {
    let mut target = x86_64();
    let pristine = target.identity();
    assert_eq!(pristine, x86_64().identity());
    assert!(pristine.starts_with("x86_64|"));

    target.disable("%r11").unwrap();
    let narrowed = target.identity();
    assert_ne!(narrowed, pristine);
    target.disable("%r11").unwrap();
    assert_eq!(target.identity(), narrowed);
    assert!(target.disable("%r99").is_err());
  }

  #[test]
  fn identity_covers_register_content() {
    fn single(class: StorageClass, accepts: TypePredicate) -> TargetDescription {
      let mut builder = RegisterFile::builder();
      let r0 = builder.declare("r0", 8, class, false).unwrap();
      let entries = vec![RegisterEntry::new(r0, vec![8], accepts)];
      TargetDescription::new("same", builder.build(), entries).unwrap()
    }

    let int = single(StorageClass::Integer, TypePredicate::INTEGER);
    let sse = single(StorageClass::Sse, TypePredicate::SSE);
    assert_eq!(int.name(), sse.name());
    assert_ne!(int.identity(), sse.identity());
    assert_eq!(
      int.identity(),
      single(StorageClass::Integer, TypePredicate::INTEGER).identity()
    );
  }
}
