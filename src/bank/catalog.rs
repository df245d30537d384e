use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Result};
use lazy_static::lazy_static;

use crate::registers::RegisterFile;
use crate::target::TargetDescription;

use super::Bank;

lazy_static! {
  /// Catalogs already built, keyed by [`TargetDescription::identity`].
  static ref CATALOG_CACHE: Mutex<HashMap<String, Arc<BankCatalog>>> = Mutex::new(HashMap::new());
}

/// Every bank of a target, grouped by the value size it serves.
///
/// Immutable after [`BankCatalog::build`], and shared between allocation runs.
#[derive(Debug)]
pub struct BankCatalog {
  name: String,
  identity: String,
  registers: RegisterFile,
  /// Distinct bank sizes, ascending.
  sizes: Vec<u32>,
  /// `banks[i]` are the banks of size `sizes[i]`, in preference order.
  banks: Vec<Vec<Bank>>,
}

impl BankCatalog {
  /// Group the target's entries into banks.
  ///
  /// Unusable registers are left out. A bank whose registers are all
  /// unusable is still recorded, it just never supplies anything.
  pub fn build(target: &TargetDescription) -> Result<Self> {
    let registers = target.registers().clone();
    let mut by_size: HashMap<u32, Vec<Bank>> = HashMap::new();

    for entry in target.entries() {
      let usable = registers.is_usable(entry.register);
      for &size in &entry.sizes {
        let banks = by_size.entry(size).or_default();
        let i = match banks.iter().position(|b| b.predicate() == entry.accepts) {
          Some(i) => i,
          None => {
            banks.push(Bank::new(size, entry.accepts));
            banks.len() - 1
          }
        };
        if usable {
          banks[i].push(entry.register);
        }
      }
    }

    if by_size.values().flatten().all(Bank::is_empty) {
      bail!("target {} has no allocatable register", target.name());
    }

    let mut sizes = by_size.keys().copied().collect::<Vec<_>>();
    sizes.sort_unstable();
    let banks = sizes
      .iter()
      .map(|size| by_size.remove(size).unwrap_or_default())
      .collect::<Vec<_>>();

    log::debug!(
      "Built bank catalog for {}: sizes {:?}, {} banks",
      target.name(),
      sizes,
      banks.iter().map(Vec::len).sum::<usize>()
    );

    Ok(BankCatalog {
      name: target.name().to_string(),
      identity: target.identity(),
      registers,
      sizes,
      banks,
    })
  }

  /// Name of the target this catalog was built from.
  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn identity(&self) -> &str {
    &self.identity
  }

  pub fn registers(&self) -> &RegisterFile {
    &self.registers
  }

  pub fn sizes(&self) -> &[u32] {
    &self.sizes
  }

  /// Banks of exactly `size`, in preference order.
  pub fn banks_for(&self, size: u32) -> &[Bank] {
    match self.sizes.binary_search(&size) {
      Ok(i) => &self.banks[i],
      Err(_) => &[],
    }
  }

  /// Banks of the size class at `index` into [`BankCatalog::sizes`].
  pub fn banks_at(&self, index: usize) -> &[Bank] {
    &self.banks[index]
  }

  pub fn num_size_classes(&self) -> usize {
    self.sizes.len()
  }

  /// Index of the size class for `size`, rounding down to the next smaller
  /// class when there is no exact match. `None` when `size` is smaller than
  /// every class.
  pub fn closest_size_index(&self, size: u32) -> Option<usize> {
    match self.sizes.binary_search(&size) {
      Ok(i) => Some(i),
      Err(0) => None,
      Err(i) => Some(i - 1),
    }
  }

  /// Every bank, smallest size first.
  pub fn iter(&self) -> impl Iterator<Item = &Bank> {
    self.banks.iter().flatten()
  }
}

/// The catalog for `target`, built on first use and shared afterwards.
pub fn catalog_for(target: &TargetDescription) -> Result<Arc<BankCatalog>> {
  let identity = target.identity();
  let mut cache = CATALOG_CACHE
    .lock()
    .map_err(|_| anyhow!("bank catalog cache is poisoned"))?;
  if let Some(catalog) = cache.get(&identity) {
    return Ok(Arc::clone(catalog));
  }

  let catalog = Arc::new(BankCatalog::build(target)?);
  cache.insert(identity, Arc::clone(&catalog));
  Ok(catalog)
}
