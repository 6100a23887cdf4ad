//! Per-binder view state: current page, layout-edit mode, the open card
//! overlay and the pending tap-to-move source. Event adapters return what
//! the session should do; they never talk to the remote themselves.

use serde::{Deserialize, Serialize};

use crate::layout;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
  #[default]
  Normal,
  LayoutEdit,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewState {
  pub page: usize,
  pub mode: ViewMode,
  pub open_overlay: Option<usize>,
  pub move_source: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveRequest {
  pub from: usize,
  pub to: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TapOutcome {
  Ignored,
  OverlayOpened(usize),
  OverlaysClosed,
  SourceSelected(usize),
  SelectionCleared,
  Move(MoveRequest),
}

impl ViewState {
  pub fn is_editing(&self) -> bool {
    self.mode == ViewMode::LayoutEdit
  }

  pub fn close_overlays(&mut self) {
    self.open_overlay = None;
  }

  pub fn clear_selection(&mut self) {
    self.move_source = None;
  }

  /// Returns false when the binder is read-only and the mode stays put.
  pub fn toggle_layout_mode(&mut self, readonly: bool) -> bool {
    if readonly {
      return false;
    }
    self.mode = match self.mode {
      ViewMode::Normal => ViewMode::LayoutEdit,
      ViewMode::LayoutEdit => ViewMode::Normal,
    };
    self.clear_selection();
    self.close_overlays();
    true
  }

  /// Tap adapter. `global` is the tapped slot.
  pub fn tap(&mut self, global: usize, occupied: bool, readonly: bool) -> TapOutcome {
    if !self.is_editing() {
      if !occupied {
        self.close_overlays();
        return TapOutcome::OverlaysClosed;
      }
      let was_open = self.open_overlay == Some(global);
      self.close_overlays();
      if was_open {
        return TapOutcome::OverlaysClosed;
      }
      self.open_overlay = Some(global);
      return TapOutcome::OverlayOpened(global);
    }

    if readonly {
      return TapOutcome::Ignored;
    }
    self.close_overlays();

    match self.move_source {
      None if occupied => {
        self.move_source = Some(global);
        TapOutcome::SourceSelected(global)
      }
      None => TapOutcome::Ignored,
      Some(source) if source == global => {
        self.clear_selection();
        TapOutcome::SelectionCleared
      }
      Some(source) => {
        self.clear_selection();
        TapOutcome::Move(MoveRequest {
          from: source,
          to: global,
        })
      }
    }
  }

  /// Drag-and-drop adapter.
  pub fn drop_on(&mut self, from: usize, to: usize, readonly: bool) -> Option<MoveRequest> {
    if !self.is_editing() || readonly || from == to {
      return None;
    }
    Some(MoveRequest { from, to })
  }

  pub fn next_page(&mut self, effective_len: usize) -> bool {
    if (self.page + 1) * layout::PAGE_SIZE < effective_len {
      self.page += 1;
      return true;
    }
    false
  }

  pub fn prev_page(&mut self) -> bool {
    if self.page > 0 {
      self.page -= 1;
      return true;
    }
    false
  }

  pub fn goto_page(&mut self, page: usize, effective_len: usize) {
    self.page = layout::clamp_page(page, effective_len);
  }

  pub fn clamp(&mut self, effective_len: usize) {
    self.page = layout::clamp_page(self.page, effective_len);
  }
}
