// Target descriptions loaded from TOML.
//
// name = "toy"
//
// [[register]]
// name = "r0"
// size = 8
// class = "integer"
// accepts = "integer"
// sizes = [4, 8]          # defaults to [size]
// overlaps = ["w0"]
// callee_saved = false
// usable = true

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::registers::{RegisterFile, StorageClass};

use super::{RegisterEntry, TargetDescription, TypePredicate};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TargetFile {
  name: String,
  #[serde(rename = "register", default)]
  registers: Vec<RegisterDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegisterDecl {
  name: String,
  size: u32,
  class: StorageClass,
  /// Predicate name; registers without one are never allocated.
  accepts: Option<String>,
  sizes: Option<Vec<u32>>,
  #[serde(default)]
  overlaps: Vec<String>,
  #[serde(default)]
  callee_saved: bool,
  #[serde(default = "default_usable")]
  usable: bool,
}

fn default_usable() -> bool {
  true
}

impl TargetDescription {
  pub fn from_toml_str(src: &str) -> Result<Self> {
    let file: TargetFile = toml::from_str(src)?;

    let mut builder = RegisterFile::builder();
    for decl in &file.registers {
      let id = builder
        .declare(&decl.name, decl.size, decl.class, decl.callee_saved)
        .with_context(|| format!("target {}", file.name))?;
      builder.set_usable(id, decl.usable);
    }

    let mut entries = vec![];
    for decl in &file.registers {
      let id = builder
        .lookup(&decl.name)
        .ok_or_else(|| anyhow!("register {} vanished", decl.name))?;
      for other in &decl.overlaps {
        let other_id = builder.lookup(other).ok_or_else(|| {
          anyhow!(
            "target {}: register {} overlaps unknown register {}",
            file.name,
            decl.name,
            other
          )
        })?;
        builder.alias(id, other_id);
      }

      if let Some(accepts) = &decl.accepts {
        let predicate = TypePredicate::from_name(accepts).ok_or_else(|| {
          anyhow!(
            "target {}: register {} accepts unknown value class {}",
            file.name,
            decl.name,
            accepts
          )
        })?;
        let sizes = decl.sizes.clone().unwrap_or_else(|| vec![decl.size]);
        entries.push(RegisterEntry::new(id, sizes, predicate));
      }
    }

    TargetDescription::new(&file.name, builder.build(), entries)
  }

  pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let src = fs::read_to_string(path)
      .with_context(|| format!("couldn't read target file {}", path.display()))?;
    Self::from_toml_str(&src).with_context(|| format!("invalid target file {}", path.display()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::target::ValueType;

  const TOY: &str = r#"
name = "toy"

[[register]]
name = "x0"
size = 8
class = "integer"
accepts = "integer"
overlaps = ["w0"]

[[register]]
name = "w0"
size = 4
class = "integer"
accepts = "integer"

[[register]]
name = "d0"
size = 8
class = "sse"
accepts = "sse"
sizes = [4, 8]
callee_saved = true

[[register]]
name = "sp"
size = 8
class = "integer"
usable = false
"#;

  #[test]
  fn test_load_toy_target() {
    let target = TargetDescription::from_toml_str(TOY).unwrap();
    assert_eq!(target.name(), "toy");
    let regs = target.registers();
    let x0 = regs.lookup("x0").unwrap();
    let w0 = regs.lookup("w0").unwrap();
    let d0 = regs.lookup("d0").unwrap();
    assert!(regs.intersects(w0, x0));
    assert!(!regs.intersects(d0, x0));
    assert!(regs.get(d0).is_callee_saved());
    assert!(!regs.is_usable(regs.lookup("sp").unwrap()));

    assert_eq!(target.entries().len(), 3);
    let d0_entry = &target.entries()[2];
    assert_eq!(d0_entry.sizes, vec![4, 8]);
    assert!(d0_entry.accepts.accepts(ValueType::F32));
  }

  #[test]
  fn test_load_target_file() {
    let target = TargetDescription::load("demos/toy.toml").unwrap();
    assert_eq!(target.name(), "toy");
    let catalog = crate::bank::BankCatalog::build(&target).unwrap();
    assert_eq!(catalog.sizes(), &[4, 8]);
    assert_eq!(catalog.banks_for(4)[0].registers().len(), 2);
    assert!(TargetDescription::load("demos/missing.toml").is_err());
  }

  #[test]
  fn test_bad_targets() {
    let unknown_overlap = r#"
name = "bad"
[[register]]
name = "r0"
size = 4
class = "integer"
overlaps = ["r9"]
"#;
    assert!(TargetDescription::from_toml_str(unknown_overlap).is_err());

    let unknown_predicate = r#"
name = "bad"
[[register]]
name = "r0"
size = 4
class = "integer"
accepts = "vector"
"#;
    assert!(TargetDescription::from_toml_str(unknown_predicate).is_err());

    let too_wide = r#"
name = "bad"
[[register]]
name = "r0"
size = 4
class = "integer"
accepts = "integer"
sizes = [8]
"#;
    assert!(TargetDescription::from_toml_str(too_wide).is_err());

    let unknown_field = r#"
name = "bad"
[[register]]
name = "r0"
size = 4
class = "integer"
colour = "red"
"#;
    assert!(TargetDescription::from_toml_str(unknown_field).is_err());
  }
}
