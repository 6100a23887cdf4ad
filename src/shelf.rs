//! The binder shelf: every binder with a preview of its first page, one of
//! them in focus. Activating the focused, opened binder enters it.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{BinderSnapshot, BinderSummary};
use crate::remote::BinderRemote;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShelfAction {
  Opened(usize),
  Enter(String),
}

/// Focus and open state carried between invocations. Focus is kept by
/// binder id so it survives binders being added or deleted.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ShelfCursor {
  #[serde(default)]
  pub focus_id: Option<String>,
  #[serde(default)]
  pub opened: bool,
}

#[derive(Clone, Debug, Default)]
pub struct Shelf {
  entries: Vec<BinderSnapshot>,
  focus: usize,
  opened: bool,
}

impl Shelf {
  pub fn load<R: BinderRemote>(remote: &R, preview_limit: usize) -> Result<Shelf> {
    let binders = remote.binders()?;
    let active = remote.active_binder()?.active;

    let entries = binders
      .iter()
      .map(|binder| match remote.snapshot(&binder.id, preview_limit) {
        Ok(snapshot) => snapshot,
        Err(error) => {
          warn!("no preview for binder {}: {}", binder.id, error);
          BinderSnapshot::empty_for(binder)
        }
      })
      .collect();

    Ok(Shelf::new(entries, &binders, active.as_deref()))
  }

  /// Focus starts on the favorite, then the active binder, then the first.
  pub fn new(entries: Vec<BinderSnapshot>, binders: &[BinderSummary], active: Option<&str>) -> Shelf {
    let favorite = binders.iter().position(|binder| binder.favorite);
    let active = active.and_then(|id| binders.iter().position(|binder| binder.id == id));
    Shelf {
      entries,
      focus: favorite.or(active).unwrap_or(0),
      opened: false,
    }
  }

  pub fn cursor(&self) -> ShelfCursor {
    ShelfCursor {
      focus_id: self.focused().map(|entry| entry.id.clone()),
      opened: self.opened,
    }
  }

  /// A cursor naming a binder that is gone leaves the initial focus alone.
  pub fn restore(&mut self, cursor: &ShelfCursor) {
    let Some(id) = cursor.focus_id.as_deref() else {
      return;
    };
    if let Some(index) = self.entries.iter().position(|entry| entry.id == id) {
      self.focus = index;
      self.opened = cursor.opened;
    }
  }

  pub fn entries(&self) -> &[BinderSnapshot] {
    &self.entries
  }

  pub fn focus(&self) -> usize {
    self.focus
  }

  pub fn focused(&self) -> Option<&BinderSnapshot> {
    self.entries.get(self.focus)
  }

  pub fn is_opened(&self) -> bool {
    self.opened
  }

  pub fn close(&mut self) {
    self.opened = false;
  }

  pub fn next(&mut self) {
    if self.entries.is_empty() {
      return;
    }
    self.focus = (self.focus + 1) % self.entries.len();
    self.opened = false;
  }

  pub fn prev(&mut self) {
    if self.entries.is_empty() {
      return;
    }
    self.focus = (self.focus + self.entries.len() - 1) % self.entries.len();
    self.opened = false;
  }

  /// First activation focuses and opens; a second one on the same opened
  /// binder enters it. Out-of-range indices do nothing.
  pub fn activate(&mut self, index: usize) -> Option<ShelfAction> {
    let entry = self.entries.get(index)?;
    if self.focus == index && self.opened {
      return Some(ShelfAction::Enter(entry.id.clone()));
    }
    self.focus = index;
    self.opened = true;
    Some(ShelfAction::Opened(index))
  }
}
