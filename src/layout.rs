//! Slot arithmetic for the 3x3 binder pages and the rule that turns a
//! relocation request into one of the three remote slot operations.

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{BinderError, Result};
use crate::model::Slot;

pub const PAGE_SIZE: usize = 9;

pub fn to_global(page: usize, local: usize) -> usize {
  page * PAGE_SIZE + local
}

pub fn page_of(global: usize) -> usize {
  global / PAGE_SIZE
}

pub fn local_of(global: usize) -> usize {
  global % PAGE_SIZE
}

/// One past the last occupied slot. Trailing empties do not count.
pub fn effective_length(slots: &[Slot]) -> usize {
  slots
    .iter()
    .rposition(|slot| slot.is_some())
    .map(|index| index + 1)
    .unwrap_or(0)
}

pub fn max_page(effective_len: usize) -> usize {
  effective_len.div_ceil(PAGE_SIZE).saturating_sub(1)
}

pub fn total_pages(effective_len: usize) -> usize {
  effective_len.div_ceil(PAGE_SIZE).max(1)
}

pub fn clamp_page(page: usize, effective_len: usize) -> usize {
  page.min(max_page(effective_len))
}

fn is_occupied(slots: &[Slot], index: usize) -> bool {
  matches!(slots.get(index), Some(Some(_)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MoveIntent {
  /// Remove at `from`, insert at `to`; the server shifts what follows.
  Move { from: usize, to: usize },
  /// Exchange two occupied slots.
  Swap { a: usize, b: usize },
  /// Fill an empty slot; the origin becomes empty.
  Place { from: usize, to: usize },
}

impl MoveIntent {
  pub fn endpoint(&self) -> &'static str {
    match self {
      MoveIntent::Move { .. } => "/collection/move",
      MoveIntent::Swap { .. } => "/collection/swap",
      MoveIntent::Place { .. } => "/collection/place",
    }
  }

  pub fn payload(&self) -> Value {
    match *self {
      MoveIntent::Move { from, to } | MoveIntent::Place { from, to } => {
        json!({ "from_index": from, "to_index": to })
      }
      MoveIntent::Swap { a, b } => json!({ "a_index": a, "b_index": b }),
    }
  }

  pub fn source(&self) -> usize {
    match *self {
      MoveIntent::Move { from, .. } | MoveIntent::Place { from, .. } => from,
      MoveIntent::Swap { a, .. } => a,
    }
  }

  pub fn destination(&self) -> usize {
    match *self {
      MoveIntent::Move { to, .. } | MoveIntent::Place { to, .. } => to,
      MoveIntent::Swap { b, .. } => b,
    }
  }

  pub fn crosses_pages(&self) -> bool {
    page_of(self.source()) != page_of(self.destination())
  }
}

/// Cross-page requests shift, same-page requests never disturb neighbours.
pub fn resolve_move(slots: &[Slot], from: usize, to: usize) -> MoveIntent {
  if page_of(from) != page_of(to) {
    return MoveIntent::Move { from, to };
  }

  if is_occupied(slots, to) {
    MoveIntent::Swap { a: from, b: to }
  } else {
    MoveIntent::Place { from, to }
  }
}

/// Parses a 1-based page number typed by the user into the first global
/// slot of that page.
pub fn page_start_from_input(input: &str) -> Result<usize> {
  let input = input.trim();
  let invalid = || BinderError::invalid(format!("Invalid page: {}", input));
  let page: usize = input.parse().map_err(|_| invalid())?;
  page
    .checked_sub(1)
    .and_then(|page| page.checked_mul(PAGE_SIZE))
    .ok_or_else(invalid)
}
