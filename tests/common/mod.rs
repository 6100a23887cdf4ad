#![allow(dead_code)]

use std::cell::RefCell;

use binderdex_lib::error::{BinderError, Result};
use binderdex_lib::layout::MoveIntent;
use binderdex_lib::model::{
  ActiveBinder, BinderSnapshot, BinderSummary, Card, CardBrief, CardDetail, NamedRef, SetBrief,
  SetDetail, Slot, StatusReply,
};
use binderdex_lib::remote::{BinderRemote, ExportFormat};
use binderdex_lib::store::LocalStore;
use tempfile::TempDir;

struct FakeBinder {
  id: String,
  name: String,
  cards: Vec<Slot>,
  readonly: bool,
  favorite: bool,
}

#[derive(Default)]
struct FakeState {
  binders: Vec<FakeBinder>,
  active: usize,
  calls: Vec<String>,
}

/// In-memory binder service with the same slot rules as the real one.
pub struct FakeRemote {
  state: RefCell<FakeState>,
}

fn status(value: &str) -> Result<StatusReply> {
  Ok(StatusReply {
    status: value.to_string(),
    id: None,
  })
}

fn read_only() -> BinderError {
  BinderError::Http {
    status: 403,
    message: "Binder is read-only".to_string(),
  }
}

fn bad_request(message: &str) -> BinderError {
  BinderError::Http {
    status: 400,
    message: message.to_string(),
  }
}

pub fn card(id: &str) -> Card {
  Card {
    name: Some(format!("Card {}", id)),
    set: Some("Test Set".to_string()),
    number: id.split_once('-').map(|(_, n)| n.to_string()),
    lang: Some("en".to_string()),
    ..Card::with_id(id)
  }
}

/// Builds slots from ids; `None` leaves a gap.
pub fn slots(ids: &[Option<&str>]) -> Vec<Slot> {
  ids.iter().map(|id| id.map(card)).collect()
}

fn new_id() -> String {
  uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

impl FakeRemote {
  pub fn new() -> Self {
    FakeRemote::with_cards(Vec::new())
  }

  pub fn with_cards(cards: Vec<Slot>) -> Self {
    let state = FakeState {
      binders: vec![FakeBinder {
        id: "default".to_string(),
        name: "Main".to_string(),
        cards,
        readonly: false,
        favorite: true,
      }],
      active: 0,
      calls: Vec::new(),
    };
    FakeRemote {
      state: RefCell::new(state),
    }
  }

  pub fn add_binder(&self, id: &str, name: &str, cards: Vec<Slot>, readonly: bool) {
    self.state.borrow_mut().binders.push(FakeBinder {
      id: id.to_string(),
      name: name.to_string(),
      cards,
      readonly,
      favorite: false,
    });
  }

  pub fn lock_active(&self, readonly: bool) {
    let mut state = self.state.borrow_mut();
    let active = state.active;
    state.binders[active].readonly = readonly;
  }

  /// Ids per slot of the active binder.
  pub fn layout(&self) -> Vec<Option<String>> {
    let state = self.state.borrow();
    state.binders[state.active]
      .cards
      .iter()
      .map(|slot| slot.as_ref().map(|card| card.id.clone()))
      .collect()
  }

  pub fn active_id(&self) -> String {
    let state = self.state.borrow();
    state.binders[state.active].id.clone()
  }

  pub fn calls(&self) -> Vec<String> {
    self.state.borrow().calls.clone()
  }

  pub fn mutation_count(&self) -> usize {
    self
      .state
      .borrow()
      .calls
      .iter()
      .filter(|call| call.starts_with("POST"))
      .count()
  }

  fn record(&self, call: &str) {
    self.state.borrow_mut().calls.push(call.to_string());
  }

  fn position(&self, binder_id: &str) -> Option<usize> {
    self
      .state
      .borrow()
      .binders
      .iter()
      .position(|binder| binder.id == binder_id)
  }

  fn with_writable<T>(&self, f: impl FnOnce(&mut Vec<Slot>) -> Result<T>) -> Result<T> {
    let mut state = self.state.borrow_mut();
    let active = state.active;
    let binder = &mut state.binders[active];
    if binder.readonly {
      return Err(read_only());
    }
    f(&mut binder.cards)
  }
}

fn grow(cards: &mut Vec<Slot>, index: usize) {
  if index >= cards.len() {
    cards.resize(index + 1, None);
  }
}

impl BinderRemote for FakeRemote {
  fn collection(&self) -> Result<Vec<Slot>> {
    self.record("GET /collection");
    let state = self.state.borrow();
    Ok(state.binders[state.active].cards.clone())
  }

  fn collection_ids(&self) -> Result<Vec<String>> {
    self.record("GET /collection/ids");
    Ok(self.layout().into_iter().flatten().collect())
  }

  fn apply_move(&self, intent: &MoveIntent) -> Result<StatusReply> {
    self.record(&format!("POST {}", intent.endpoint()));
    self.with_writable(|cards| match *intent {
      MoveIntent::Move { from, to } => {
        if !matches!(cards.get(from), Some(Some(_))) {
          return status("invalid_from");
        }
        grow(cards, to);
        let mut carry = cards[from].take();
        let mut pos = to;
        loop {
          if pos == from {
            pos += 1;
            continue;
          }
          grow(cards, pos);
          if cards[pos].is_none() {
            cards[pos] = carry;
            break;
          }
          std::mem::swap(&mut carry, &mut cards[pos]);
          pos += 1;
        }
        status("ok")
      }
      MoveIntent::Swap { a, b } => {
        grow(cards, a.max(b));
        cards.swap(a, b);
        status("ok")
      }
      MoveIntent::Place { from, to } => {
        grow(cards, from.max(to));
        if cards[from].is_none() {
          return Err(bad_request("Source slot is empty"));
        }
        if cards[to].is_some() {
          return Err(bad_request("Destination slot is not empty"));
        }
        cards[to] = cards[from].take();
        status("ok")
      }
    })
  }

  fn remove_card(&self, index: usize) -> Result<StatusReply> {
    self.record("POST /collection/remove");
    self.with_writable(|cards| {
      if index >= cards.len() {
        return status("invalid_index");
      }
      cards[index] = None;
      status("removed")
    })
  }

  fn add_card(&self, card_id: &str, lang: &str) -> Result<StatusReply> {
    self.record("POST /collection/add");
    self.with_writable(|cards| {
      if cards.iter().flatten().any(|card| card.id == card_id) {
        return status("already_added");
      }
      let entry = Card {
        lang: Some(lang.to_string()),
        ..card(card_id)
      };
      match cards.iter().position(Option::is_none) {
        Some(index) => cards[index] = Some(entry),
        None => cards.push(Some(entry)),
      }
      status("added")
    })
  }

  fn binders(&self) -> Result<Vec<BinderSummary>> {
    self.record("GET /binders");
    Ok(
      self
        .state
        .borrow()
        .binders
        .iter()
        .map(|binder| BinderSummary {
          id: binder.id.clone(),
          name: binder.name.clone(),
          readonly: binder.readonly,
          favorite: binder.favorite,
          count: binder.cards.len(),
        })
        .collect(),
    )
  }

  fn active_binder(&self) -> Result<ActiveBinder> {
    self.record("GET /binders/active");
    Ok(ActiveBinder {
      active: Some(self.active_id()),
    })
  }

  fn select_binder(&self, binder_id: &str) -> Result<StatusReply> {
    self.record("POST /binders/select");
    match self.position(binder_id) {
      Some(index) => {
        self.state.borrow_mut().active = index;
        status("ok")
      }
      None => status("invalid"),
    }
  }

  fn create_binder(&self, name: &str) -> Result<StatusReply> {
    self.record("POST /binders/create");
    let id = new_id();
    let mut state = self.state.borrow_mut();
    state.binders.push(FakeBinder {
      id: id.clone(),
      name: name.to_string(),
      cards: Vec::new(),
      readonly: false,
      favorite: false,
    });
    state.active = state.binders.len() - 1;
    Ok(StatusReply {
      status: String::new(),
      id: Some(id),
    })
  }

  fn rename_binder(&self, binder_id: &str, name: &str) -> Result<StatusReply> {
    self.record("POST /binders/rename");
    let Some(index) = self.position(binder_id) else {
      return status("invalid");
    };
    self.state.borrow_mut().binders[index].name = name.to_string();
    status("ok")
  }

  fn duplicate_binder(&self, binder_id: &str, name: Option<&str>) -> Result<StatusReply> {
    self.record("POST /binders/duplicate");
    let Some(index) = self.position(binder_id) else {
      return status("invalid");
    };
    let id = new_id();
    let mut state = self.state.borrow_mut();
    let original = &state.binders[index];
    let copy = FakeBinder {
      id: id.clone(),
      name: name
        .map(str::to_string)
        .unwrap_or_else(|| format!("{} (copy)", original.name)),
      cards: original.cards.clone(),
      readonly: false,
      favorite: false,
    };
    state.binders.push(copy);
    state.active = state.binders.len() - 1;
    Ok(StatusReply {
      status: "ok".to_string(),
      id: Some(id),
    })
  }

  fn set_readonly(&self, binder_id: &str, readonly: bool) -> Result<StatusReply> {
    self.record("POST /binders/readonly");
    let Some(index) = self.position(binder_id) else {
      return status("invalid");
    };
    self.state.borrow_mut().binders[index].readonly = readonly;
    status("ok")
  }

  fn set_favorite(&self, binder_id: &str) -> Result<StatusReply> {
    self.record("POST /binders/favorite");
    if self.position(binder_id).is_none() {
      return status("invalid");
    }
    for binder in self.state.borrow_mut().binders.iter_mut() {
      binder.favorite = binder.id == binder_id;
    }
    status("ok")
  }

  fn delete_binder(&self, binder_id: &str) -> Result<StatusReply> {
    self.record("POST /binders/delete");
    let Some(index) = self.position(binder_id) else {
      return status("not_found");
    };
    let mut state = self.state.borrow_mut();
    if state.binders.len() == 1 {
      return status("last_binder");
    }
    let active_id = state.binders[state.active].id.clone();
    state.binders.remove(index);
    state.active = state
      .binders
      .iter()
      .position(|binder| binder.id == active_id)
      .unwrap_or(0);
    if !state.binders.iter().any(|binder| binder.favorite) {
      let active = state.active;
      state.binders[active].favorite = true;
    }
    status("deleted")
  }

  fn snapshot(&self, binder_id: &str, limit: usize) -> Result<BinderSnapshot> {
    self.record("GET /binders/snapshot");
    let state = self.state.borrow();
    let binder = state
      .binders
      .iter()
      .find(|binder| binder.id == binder_id)
      .ok_or(BinderError::Http {
        status: 404,
        message: "Binder not found".to_string(),
      })?;
    Ok(BinderSnapshot {
      id: binder.id.clone(),
      name: binder.name.clone(),
      readonly: binder.readonly,
      favorite: binder.favorite,
      count: binder.cards.len(),
      preview: binder.cards.iter().flatten().take(limit.min(27)).cloned().collect(),
    })
  }

  fn export(&self, binder_id: &str, format: ExportFormat) -> Result<Vec<u8>> {
    self.record(&format!("GET /binders/export/{}", format.extension()));
    let snapshot = self.snapshot(binder_id, usize::MAX)?;
    match format {
      ExportFormat::Json => Ok(serde_json::to_vec(&snapshot)?),
      ExportFormat::Pdf => Ok(b"%PDF-1.4 fake".to_vec()),
    }
  }

  fn sets(&self, _lang: &str) -> Result<Vec<SetBrief>> {
    self.record("GET /sets");
    Ok(vec![set_brief("swsh8", "Fusion Strike"), set_brief("base1", "base set")])
  }

  fn set_detail(&self, set_id: &str, _lang: &str) -> Result<SetDetail> {
    self.record(&format!("GET /sets/{}", set_id));
    if set_id != "swsh8" && set_id != "base1" {
      return Err(BinderError::Http {
        status: 404,
        message: "Set not found".to_string(),
      });
    }
    Ok(SetDetail {
      brief: SetBrief {
        logo: Some(format!("https://assets.example/{}/logo", set_id)),
        ..set_brief(set_id, "Set")
      },
      cards: (1..=3).map(|n| card_brief(&format!("{}-{}", set_id, n))).collect(),
    })
  }

  fn card_detail(&self, card_id: &str, _lang: &str) -> Result<CardDetail> {
    self.record(&format!("GET /cards/{}", card_id));
    Ok(CardDetail {
      id: card_id.to_string(),
      name: Some(format!("Card {}", card_id)),
      set: Some(NamedRef {
        id: card_id.split_once('-').map(|(set, _)| set.to_string()),
        name: Some("Test Set".to_string()),
        logo: None,
      }),
      ..CardDetail::default()
    })
  }

  fn search_cards(&self, name: &str, _lang: &str) -> Result<Vec<CardBrief>> {
    self.record("GET /cards/search");
    Ok(
      ["swsh8-1", "swsh8-2", "base1-58"]
        .iter()
        .map(|id| card_brief(id))
        .filter(|card| {
          card
            .name
            .as_deref()
            .unwrap_or("")
            .to_lowercase()
            .contains(&name.to_lowercase())
        })
        .collect(),
    )
  }
}

fn set_brief(id: &str, name: &str) -> SetBrief {
  SetBrief {
    id: id.to_string(),
    name: Some(name.to_string()),
    logo: None,
    symbol: None,
    card_count: None,
  }
}

fn card_brief(id: &str) -> CardBrief {
  CardBrief {
    id: id.to_string(),
    name: Some(format!("Card {}", id)),
    local_id: id.split_once('-').map(|(_, n)| n.to_string()),
    image: None,
  }
}

pub fn temp_store() -> (TempDir, LocalStore) {
  let dir = TempDir::new().unwrap();
  let store = LocalStore::open(&dir.path().join("binderdex.db")).unwrap();
  (dir, store)
}
