use std::fs;
use std::path::Path;

use log::{info, warn};

use crate::cache::CollectionCache;
use crate::error::{BinderError, Result};
use crate::layout::{self, MoveIntent, PAGE_SIZE};
use crate::model::{
  BinderSnapshot, BinderSummary, CardBrief, StatusReply, STATUS_ALREADY_ADDED, STATUS_LAST_BINDER,
};
use crate::remote::{BinderRemote, ExportFormat};
use crate::view::{TapOutcome, ViewMode, ViewState};

pub const DEFAULT_SNAPSHOT_LIMIT: usize = 9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddOutcome {
  Added,
  AlreadyAdded,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SearchHit {
  pub card: CardBrief,
  pub owned: bool,
}

fn expect_success(reply: StatusReply) -> Result<StatusReply> {
  if reply.status == STATUS_LAST_BINDER {
    return Err(BinderError::LastBinder);
  }
  if !reply.is_success() {
    return Err(BinderError::Rejected(reply.status));
  }
  Ok(reply)
}

fn required_name(name: &str, what: &str) -> Result<String> {
  let trimmed = name.trim();
  if trimmed.is_empty() {
    return Err(BinderError::invalid(format!("{} name is required.", what)));
  }
  Ok(trimmed.to_string())
}

/// Client-side state for the active binder. Every mutation goes to the
/// remote first and, on success, the collection is fetched again in full.
pub struct BinderSession<R: BinderRemote> {
  remote: R,
  cache: CollectionCache,
  view: ViewState,
  binders: Vec<BinderSummary>,
  active: Option<BinderSummary>,
}

impl<R: BinderRemote> BinderSession<R> {
  pub fn new(remote: R) -> Self {
    BinderSession {
      remote,
      cache: CollectionCache::default(),
      view: ViewState::default(),
      binders: Vec::new(),
      active: None,
    }
  }

  pub fn remote(&self) -> &R {
    &self.remote
  }

  pub fn cache(&self) -> &CollectionCache {
    &self.cache
  }

  pub fn view(&self) -> &ViewState {
    &self.view
  }

  /// Restores a persisted view; the page is clamped on the next load.
  pub fn restore_view(&mut self, view: ViewState) {
    self.view = view;
    self.view.clamp(self.cache.effective_length());
    self.sync_view_with_policy();
  }

  pub fn binders(&self) -> &[BinderSummary] {
    &self.binders
  }

  pub fn active_binder(&self) -> Option<&BinderSummary> {
    self.active.as_ref()
  }

  pub fn is_readonly(&self) -> bool {
    self.active.as_ref().map(|binder| binder.readonly).unwrap_or(false)
  }

  pub fn load_binders(&mut self) -> Result<()> {
    let binders = self.remote.binders()?;
    let active_id = self.remote.active_binder()?.active;
    self.active = active_id
      .as_deref()
      .and_then(|id| binders.iter().find(|binder| binder.id == id))
      .cloned();
    self.binders = binders;
    self.sync_view_with_policy();
    Ok(())
  }

  pub fn load_collection(&mut self) -> Result<()> {
    let slots = self.remote.collection()?;
    self.cache.replace(slots);
    self.view.clamp(self.cache.effective_length());
    Ok(())
  }

  pub fn load_owned_ids(&mut self) -> Result<()> {
    let ids = self.remote.collection_ids()?;
    self.cache.replace_owned_ids(ids);
    Ok(())
  }

  pub fn refresh(&mut self) -> Result<()> {
    self.load_binders()?;
    self.load_collection()
  }

  fn sync_view_with_policy(&mut self) {
    if self.is_readonly() && self.view.is_editing() {
      self.view.mode = ViewMode::Normal;
      self.view.clear_selection();
      self.view.close_overlays();
    }
  }

  fn ensure_writable(&self, action: &str) -> Result<()> {
    if self.is_readonly() {
      warn!("refusing to {} in a read-only binder", action);
      return Err(BinderError::ReadOnly);
    }
    Ok(())
  }

  // ---- collection ----

  /// Relocates the card at `from` to `to` using whichever slot operation
  /// the layout rules pick.
  pub fn move_card(&mut self, from: usize, to: usize) -> Result<MoveIntent> {
    self.ensure_writable("move a card")?;
    if from == to {
      return Err(BinderError::invalid("Source and destination are the same slot."));
    }
    if !self.cache.is_occupied(from) {
      return Err(BinderError::invalid(format!("Slot {} is empty.", from)));
    }

    let intent = layout::resolve_move(self.cache.slots(), from, to);
    info!("{:?} via {}", intent, intent.endpoint());
    expect_success(self.remote.apply_move(&intent)?)?;

    if intent.crosses_pages() {
      self.view.page = layout::page_of(to);
    }
    self.load_collection()?;
    Ok(intent)
  }

  /// Moves the card to the first slot of a 1-based page typed by the user.
  pub fn move_to_page(&mut self, from: usize, page_input: &str) -> Result<MoveIntent> {
    self.ensure_writable("move a card")?;
    let to = layout::page_start_from_input(page_input)?;
    self.move_card(from, to)
  }

  /// Tap adapter over the current page's slot `local`.
  pub fn tap(&mut self, local: usize) -> Result<TapOutcome> {
    if local >= PAGE_SIZE {
      return Err(BinderError::invalid(format!(
        "Slot must be between 1 and {}.",
        PAGE_SIZE
      )));
    }
    let global = layout::to_global(self.view.page, local);
    let occupied = self.cache.is_occupied(global);
    let outcome = self.view.tap(global, occupied, self.is_readonly());
    if let TapOutcome::Move(request) = outcome {
      self.move_card(request.from, request.to)?;
    }
    Ok(outcome)
  }

  /// Drag-and-drop adapter; both indices are global.
  pub fn drop_card(&mut self, from: usize, to: usize) -> Result<Option<MoveIntent>> {
    match self.view.drop_on(from, to, self.is_readonly()) {
      Some(request) => self.move_card(request.from, request.to).map(Some),
      None => Ok(None),
    }
  }

  pub fn toggle_layout_mode(&mut self) -> Result<ViewMode> {
    if !self.view.toggle_layout_mode(self.is_readonly()) {
      return Err(BinderError::ReadOnly);
    }
    Ok(self.view.mode)
  }

  pub fn next_page(&mut self) -> bool {
    self.view.next_page(self.cache.effective_length())
  }

  pub fn prev_page(&mut self) -> bool {
    self.view.prev_page()
  }

  pub fn goto_page(&mut self, page: usize) {
    self.view.goto_page(page, self.cache.effective_length());
  }

  pub fn remove_card(&mut self, index: usize) -> Result<()> {
    self.ensure_writable("remove a card")?;
    expect_success(self.remote.remove_card(index)?)?;
    info!("removed slot {}", index);
    self.view.close_overlays();
    self.load_collection()
  }

  pub fn add_card(&mut self, card_id: &str, lang: &str) -> Result<AddOutcome> {
    self.ensure_writable("add a card")?;
    let card_id = card_id.trim();
    if card_id.is_empty() {
      return Err(BinderError::invalid("Card id is required."));
    }

    let reply = self.remote.add_card(card_id, lang)?;
    let outcome = if reply.status == STATUS_ALREADY_ADDED {
      AddOutcome::AlreadyAdded
    } else {
      expect_success(reply)?;
      AddOutcome::Added
    };
    info!("add {} ({}): {:?}", card_id, lang, outcome);
    self.cache.mark_owned(card_id);
    self.load_collection()?;
    Ok(outcome)
  }

  /// A selected set lists the whole set even when a name is typed.
  pub fn search(&mut self, query: &str, set_id: Option<&str>, lang: &str) -> Result<Vec<SearchHit>> {
    let query = query.trim();
    let set_id = set_id.map(str::trim).filter(|id| !id.is_empty());
    if query.is_empty() && set_id.is_none() {
      return Ok(Vec::new());
    }

    self.load_owned_ids()?;
    let cards = match set_id {
      Some(set_id) => self.remote.set_detail(set_id, lang)?.cards,
      None => self.remote.search_cards(query, lang)?,
    };

    Ok(
      cards
        .into_iter()
        .map(|card| SearchHit {
          owned: self.cache.is_owned(&card.id),
          card,
        })
        .collect(),
    )
  }

  // ---- binders ----

  fn after_active_change(&mut self) -> Result<()> {
    self.view = ViewState::default();
    self.refresh()
  }

  pub fn select_binder(&mut self, binder_id: &str) -> Result<()> {
    expect_success(self.remote.select_binder(binder_id)?)?;
    info!("selected binder {}", binder_id);
    self.after_active_change()
  }

  pub fn create_binder(&mut self, name: &str) -> Result<Option<String>> {
    let name = required_name(name, "Binder")?;
    let reply = self.remote.create_binder(&name)?;
    info!("created binder {:?} ({})", reply.id, name);
    self.after_active_change()?;
    Ok(reply.id)
  }

  pub fn rename_binder(&mut self, binder_id: &str, name: &str) -> Result<()> {
    let name = required_name(name, "Binder")?;
    expect_success(self.remote.rename_binder(binder_id, &name)?)?;
    self.load_binders()
  }

  pub fn duplicate_binder(&mut self, binder_id: &str, name: Option<&str>) -> Result<Option<String>> {
    let reply = expect_success(self.remote.duplicate_binder(binder_id, name)?)?;
    info!("duplicated binder {} into {:?}", binder_id, reply.id);
    self.after_active_change()?;
    Ok(reply.id)
  }

  fn find_binder(&mut self, binder_id: &str) -> Result<BinderSummary> {
    if self.binders.is_empty() {
      self.load_binders()?;
    }
    self
      .binders
      .iter()
      .find(|binder| binder.id == binder_id)
      .cloned()
      .ok_or_else(|| BinderError::invalid(format!("Unknown binder: {}", binder_id)))
  }

  /// Flips the read-only flag and returns the new value.
  pub fn toggle_readonly(&mut self, binder_id: &str) -> Result<bool> {
    let next = !self.find_binder(binder_id)?.readonly;
    expect_success(self.remote.set_readonly(binder_id, next)?)?;
    info!("binder {} readonly = {}", binder_id, next);
    self.load_binders()?;
    Ok(next)
  }

  pub fn set_favorite(&mut self, binder_id: &str) -> Result<()> {
    expect_success(self.remote.set_favorite(binder_id)?)?;
    self.load_binders()
  }

  pub fn delete_binder(&mut self, binder_id: &str) -> Result<()> {
    if let Err(error) = expect_success(self.remote.delete_binder(binder_id)?) {
      warn!("delete of binder {} refused: {}", binder_id, error);
      return Err(error);
    }
    info!("deleted binder {}", binder_id);
    self.after_active_change()
  }

  pub fn snapshot(&self, binder_id: &str, limit: usize) -> Result<BinderSnapshot> {
    self.remote.snapshot(binder_id, limit)
  }

  /// Downloads a server-generated export and writes it to `path`.
  pub fn export(&self, binder_id: &str, format: ExportFormat, path: &Path) -> Result<usize> {
    let bytes = self.remote.export(binder_id, format)?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
      fs::create_dir_all(parent)?;
    }
    fs::write(path, &bytes)?;
    info!("exported binder {} to {}", binder_id, path.display());
    Ok(bytes.len())
  }
}
