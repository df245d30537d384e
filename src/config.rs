//! Allocator options, read from `regalloc.toml` when present.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "regalloc.toml";

/// Configuration options for one allocation run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AllocatorConfig {
  /// Bytes of the frame already reserved before the first spill slot.
  pub stack_base: u32,
  /// Let an incoming interval take the register of an active one that
  /// lives longer. When off, the incoming interval always spills.
  pub eviction: bool,
  /// Put every temp on the stack.
  pub all_stack: bool,
}

impl Default for AllocatorConfig {
  fn default() -> Self {
    AllocatorConfig {
      stack_base: 0,
      eviction: true,
      all_stack: false,
    }
  }
}

impl AllocatorConfig {
  pub fn from_toml_str(src: &str) -> Result<Self> {
    Ok(toml::from_str(src)?)
  }

  pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let src = fs::read_to_string(path)
      .with_context(|| format!("couldn't read config {}", path.display()))?;
    Self::from_toml_str(&src).with_context(|| format!("invalid config {}", path.display()))
  }

  /// The explicit file if given, else `regalloc.toml` in the working
  /// directory if it exists, else defaults.
  pub fn discover(explicit: Option<&str>) -> Result<Self> {
    match explicit {
      Some(path) => Self::from_file(path),
      None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE),
      None => Ok(Self::default()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_partial_config_keeps_defaults() {
    let cfg = AllocatorConfig::from_toml_str("stack_base = 16").unwrap();
    assert_eq!(cfg.stack_base, 16);
    assert!(cfg.eviction);
    assert!(!cfg.all_stack);

    let cfg = AllocatorConfig::from_toml_str("").unwrap();
    assert_eq!(cfg, AllocatorConfig::default());
  }

  #[test]
  fn test_bad_config() {
    assert!(AllocatorConfig::from_toml_str("eviction = 3").is_err());
    assert!(AllocatorConfig::from_toml_str("coalesce = true").is_err());
    assert!(AllocatorConfig::discover(Some("/nonexistent/regalloc.toml")).is_err());
  }
}
