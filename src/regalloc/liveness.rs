// Vec<IrOperation> -> live intervals, one per temp

use std::collections::HashMap;
use std::fmt;

use crate::{
  ir::{IrOperation, Temp, TempId},
  target::ValueType,
};

/// The closed range of positions over which a temp is live.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Interval {
  pub temp: TempId,
  pub start: usize,
  pub end: usize,
  /// Size in bytes of the value.
  pub size: u32,
  pub ty: ValueType,
}

impl Interval {
  pub fn new(temp: TempId, start: usize, end: usize, size: u32, ty: ValueType) -> Self {
    debug_assert!(start <= end, "{} ends before it starts", temp);
    Interval {
      temp,
      start,
      end,
      size,
      ty,
    }
  }

  pub fn overlaps(&self, other: &Interval) -> bool {
    self.start <= other.end && other.start <= self.end
  }
}

impl fmt::Display for Interval {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{}:{} [{}, {}]",
      self.temp, self.ty, self.start, self.end
    )
  }
}

/// Live intervals of one function.
#[derive(Debug, Clone, Default)]
pub struct Liveness {
  /// Sorted by start; ties keep the order temps were first seen in.
  intervals: Vec<Interval>,
  /// Temps that never met a free marker.
  unfreed: Vec<TempId>,
}

impl Liveness {
  /// Scan the operations once, opening an interval when a temp is first seen
  /// and closing it at its free marker.
  pub fn from_ops<O: IrOperation>(ops: &[O]) -> Self {
    let mut intervals: Vec<Interval> = vec![];
    // temp -> (index into intervals, closed yet)
    let mut seen: HashMap<TempId, (usize, bool)> = HashMap::new();

    for (pos, op) in ops.iter().enumerate() {
      let touched = op
        .used()
        .into_iter()
        .chain(op.defined())
        .chain(op.freed());
      for temp in touched {
        Self::touch(&mut intervals, &mut seen, temp, pos);
      }

      if let Some(temp) = op.freed() {
        match seen.get_mut(&temp.id) {
          Some((idx, closed)) if !*closed => {
            intervals[*idx].end = pos;
            *closed = true;
          }
          _ => log::warn!("{} freed twice, second free at {} ignored", temp.id, pos),
        }
      }
    }

    let last_pos = ops.len().saturating_sub(1);
    let mut unfreed = vec![];
    for interval in intervals.iter_mut() {
      if !seen[&interval.temp].1 {
        interval.end = last_pos;
        unfreed.push(interval.temp);
      }
    }

    if !unfreed.is_empty() {
      log::warn!(
        "{} unfreed registers encountered, this indicates a defect in IR generation: {:?}",
        unfreed.len(),
        unfreed
      );
    }

    // stable, so equal starts stay in encounter order
    intervals.sort_by_key(|interval| interval.start);

    Liveness { intervals, unfreed }
  }

  fn touch(
    intervals: &mut Vec<Interval>,
    seen: &mut HashMap<TempId, (usize, bool)>,
    temp: Temp,
    pos: usize,
  ) {
    match seen.get(&temp.id).copied() {
      None => {
        seen.insert(temp.id, (intervals.len(), false));
        intervals.push(Interval::new(temp.id, pos, pos, temp.size, temp.ty));
      }
      Some((idx, true)) if intervals[idx].end < pos => {
        log::warn!("{} referenced at {} after being freed", temp.id, pos)
      }
      Some(_) => {}
    }
  }

  pub fn intervals(&self) -> &[Interval] {
    &self.intervals
  }

  pub fn unfreed(&self) -> &[TempId] {
    &self.unfreed
  }

  pub fn into_parts(self) -> (Vec<Interval>, Vec<TempId>) {
    (self.intervals, self.unfreed)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ir::parse_program;

  fn liveness(src: &str) -> Liveness {
    Liveness::from_ops(&parse_program(src).unwrap())
  }

  fn span(l: &Liveness, temp: u32) -> (usize, usize) {
    let i = l
      .intervals()
      .iter()
      .find(|i| i.temp == TempId(temp))
      .unwrap();
    (i.start, i.end)
  }

  #[test]
  fn test_intervals_from_free_markers() {
    let l = liveness(
      "\
param t0:i64
t1:i32 = load t0
free t0
t2:i32 = add t1, 1
free t1
ret t2
free t2",
    );
    assert_eq!(span(&l, 0), (0, 2));
    assert_eq!(span(&l, 1), (1, 4));
    assert_eq!(span(&l, 2), (3, 6));
    assert!(l.unfreed().is_empty());
    assert_eq!(l.intervals()[1].size, 4);
    assert_eq!(l.intervals()[0].ty, ValueType::I64);
  }

  #[test]
  fn test_sorted_by_start_then_encounter() {
    let l = liveness(
      "\
param t5:i32
t3:i32 = add t5, t5
t4:i32 = sub t5, t5
free t5
free t4
free t3",
    );
    let order = l.intervals().iter().map(|i| i.temp.0).collect::<Vec<_>>();
    assert_eq!(order, vec![5, 3, 4]);
    assert!(l
      .intervals()
      .windows(2)
      .all(|w| w[0].start <= w[1].start));
  }

  #[test]
  fn test_unfreed_closed_at_last_position() {
    let l = liveness(
      "\
param t0:i64
param t1:i64
free t0
ret t1",
    );
    assert_eq!(l.unfreed(), &[TempId(1)]);
    assert_eq!(span(&l, 1), (1, 3));
    assert_eq!(span(&l, 0), (0, 2));
  }

  #[test]
  fn test_unused_definition_is_a_point() {
    let l = liveness("param t0:i8\nfree t0");
    assert_eq!(span(&l, 0), (0, 1));
    let l = liveness("param t0:i8");
    assert_eq!(span(&l, 0), (0, 0));
    assert_eq!(l.unfreed().len(), 1);
  }

  #[test]
  fn test_empty_program() {
    let l = Liveness::from_ops::<crate::ir::Instr>(&[]);
    assert!(l.intervals().is_empty());
    assert!(l.unfreed().is_empty());
  }

  #[test]
  fn test_overlap() {
    let a = Interval::new(TempId(0), 0, 2, 4, ValueType::I32);
    let b = Interval::new(TempId(1), 2, 4, 4, ValueType::I32);
    let c = Interval::new(TempId(2), 3, 4, 4, ValueType::I32);
    assert!(a.overlaps(&b));
    assert!(!a.overlaps(&c));
    assert!(c.overlaps(&b));
  }
}
