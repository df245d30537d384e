//! Physical register identity.
//!
//! Every name a target can hand out (`%rax`, `%eax`, `%xmm0`, ...) is its own
//! [`Register`]. Names that share physical storage are linked through an
//! overlap set computed once when the [`RegisterFile`] is built, so a
//! conflict check never needs to reason about bit ranges.
pub(crate) mod consts;
mod macros;
pub mod reg;

use std::collections::{HashMap, HashSet};
use std::fmt;

use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};
use strum_macros::AsRefStr;

/// Index of a register inside its [`RegisterFile`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RegisterId(pub u16);

impl RegisterId {
  #[inline]
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

/// Which kind of physical storage a register lives in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deserialize, Serialize, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StorageClass {
  Integer,
  Sse,
  X87,
}

#[derive(Debug, Clone)]
pub struct Register {
  id: RegisterId,
  name: String,
  size: u32,
  class: StorageClass,
  callee_saved: bool,
  usable: bool,
  /// Every register sharing storage with this one, itself included.
  overlaps: HashSet<RegisterId>,
}

impl Register {
  pub fn id(&self) -> RegisterId {
    self.id
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// Size in bytes.
  pub fn size(&self) -> u32 {
    self.size
  }

  pub fn class(&self) -> StorageClass {
    self.class
  }

  pub fn is_callee_saved(&self) -> bool {
    self.callee_saved
  }

  pub fn is_usable(&self) -> bool {
    self.usable
  }

  pub fn overlaps(&self) -> &HashSet<RegisterId> {
    &self.overlaps
  }
}

impl fmt::Display for Register {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name)
  }
}

/// The full register set of one target.
#[derive(Debug, Clone)]
pub struct RegisterFile {
  regs: Vec<Register>,
  by_name: HashMap<String, RegisterId>,
}

impl RegisterFile {
  pub fn builder() -> RegisterFileBuilder {
    RegisterFileBuilder::default()
  }

  pub fn get(&self, id: RegisterId) -> &Register {
    &self.regs[id.index()]
  }

  pub fn lookup(&self, name: &str) -> Option<RegisterId> {
    self.by_name.get(name).copied()
  }

  pub fn name(&self, id: RegisterId) -> &str {
    self.get(id).name()
  }

  /// Whether `a` and `b` share any physical storage. Symmetric and reflexive.
  #[inline]
  pub fn intersects(&self, a: RegisterId, b: RegisterId) -> bool {
    a == b || self.regs[a.index()].overlaps.contains(&b)
  }

  #[inline]
  pub fn is_usable(&self, id: RegisterId) -> bool {
    self.regs[id.index()].usable
  }

  /// Permanently take a register out of allocation, together with every
  /// register sharing its storage.
  pub fn disable(&mut self, name: &str) -> Result<()> {
    let id = self
      .lookup(name)
      .ok_or_else(|| anyhow!("cannot disable unknown register {}", name))?;
    let overlaps = self.regs[id.index()].overlaps.clone();
    for other in overlaps {
      self.regs[other.index()].usable = false;
    }
    Ok(())
  }

  pub fn iter(&self) -> impl Iterator<Item = &Register> {
    self.regs.iter()
  }

  pub fn len(&self) -> usize {
    self.regs.len()
  }

  pub fn is_empty(&self) -> bool {
    self.regs.is_empty()
  }
}

/// Collects register declarations and aliasing pairs, then freezes them into a
/// [`RegisterFile`].
#[derive(Debug, Default)]
pub struct RegisterFileBuilder {
  regs: Vec<Register>,
  by_name: HashMap<String, RegisterId>,
}

impl RegisterFileBuilder {
  pub fn declare(
    &mut self,
    name: &str,
    size: u32,
    class: StorageClass,
    callee_saved: bool,
  ) -> Result<RegisterId> {
    if size == 0 {
      bail!("register {} declared with zero size", name);
    }
    if self.by_name.contains_key(name) {
      bail!("register {} declared twice", name);
    }
    let id = RegisterId(
      u16::try_from(self.regs.len()).map_err(|_| anyhow!("too many registers declared"))?,
    );
    self.regs.push(Register {
      id,
      name: name.to_string(),
      size,
      class,
      callee_saved,
      usable: true,
      overlaps: HashSet::from([id]),
    });
    self.by_name.insert(name.to_string(), id);
    Ok(id)
  }

  pub fn lookup(&self, name: &str) -> Option<RegisterId> {
    self.by_name.get(name).copied()
  }

  /// Record that `a` and `b` share storage.
  pub fn alias(&mut self, a: RegisterId, b: RegisterId) {
    self.regs[a.index()].overlaps.insert(b);
    self.regs[b.index()].overlaps.insert(a);
  }

  /// Alias every pair in `group`, e.g. all width views of one family.
  pub fn alias_group(&mut self, group: &[RegisterId]) {
    for (i, &a) in group.iter().enumerate() {
      for &b in &group[i + 1..] {
        self.alias(a, b);
      }
    }
  }

  pub fn set_usable(&mut self, id: RegisterId, usable: bool) {
    self.regs[id.index()].usable = usable;
  }

  /// Freeze the declarations. An unusable register makes everything that
  /// shares its storage unusable as well.
  pub fn build(mut self) -> RegisterFile {
    let reserved = self
      .regs
      .iter()
      .filter(|r| !r.usable)
      .flat_map(|r| r.overlaps.iter().copied())
      .collect::<Vec<_>>();
    for id in reserved {
      self.regs[id.index()].usable = false;
    }
    RegisterFile {
      regs: self.regs,
      by_name: self.by_name,
    }
  }
}
