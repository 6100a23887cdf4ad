use std::collections::BTreeSet;

use chrono::Utc;

use crate::layout::{self, PAGE_SIZE};
use crate::model::{Card, Slot};

/// Mirror of the active binder's slots. Only ever replaced wholesale.
#[derive(Debug, Default, Clone)]
pub struct CollectionCache {
  slots: Vec<Slot>,
  owned_ids: BTreeSet<String>,
  generation: u64,
  loaded_at: Option<String>,
}

impl CollectionCache {
  pub fn replace(&mut self, slots: Vec<Slot>) {
    self.slots = slots;
    self.generation += 1;
    self.loaded_at = Some(Utc::now().to_rfc3339());
  }

  pub fn replace_owned_ids(&mut self, ids: Vec<String>) {
    self.owned_ids = ids.into_iter().filter(|id| !id.is_empty()).collect();
  }

  pub fn mark_owned(&mut self, card_id: &str) {
    self.owned_ids.insert(card_id.to_string());
  }

  pub fn is_owned(&self, card_id: &str) -> bool {
    self.owned_ids.contains(card_id)
  }

  pub fn owned_ids(&self) -> impl Iterator<Item = &str> {
    self.owned_ids.iter().map(String::as_str)
  }

  pub fn slots(&self) -> &[Slot] {
    &self.slots
  }

  pub fn card_at(&self, global: usize) -> Option<&Card> {
    self.slots.get(global).and_then(Option::as_ref)
  }

  pub fn is_occupied(&self, global: usize) -> bool {
    self.card_at(global).is_some()
  }

  pub fn effective_length(&self) -> usize {
    layout::effective_length(&self.slots)
  }

  pub fn card_count(&self) -> usize {
    self.slots.iter().filter(|slot| slot.is_some()).count()
  }

  /// The nine positions of `page`, past-the-end positions reported empty.
  pub fn page_slots(&self, page: usize) -> [Option<&Card>; PAGE_SIZE] {
    std::array::from_fn(|local| self.card_at(layout::to_global(page, local)))
  }

  pub fn generation(&self) -> u64 {
    self.generation
  }

  pub fn loaded_at(&self) -> Option<&str> {
    self.loaded_at.as_deref()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn replace_bumps_generation() {
    let mut cache = CollectionCache::default();
    assert_eq!(cache.generation(), 0);
    assert!(cache.loaded_at().is_none());
    cache.replace(vec![Some(Card::with_id("a-1")), None]);
    assert_eq!(cache.generation(), 1);
    assert!(cache.loaded_at().is_some());
    assert_eq!(cache.card_count(), 1);
    assert_eq!(cache.effective_length(), 1);
  }

  #[test]
  fn page_slots_pads_past_the_end() {
    let mut cache = CollectionCache::default();
    let mut slots: Vec<Slot> = vec![None; 10];
    slots[9] = Some(Card::with_id("b-2"));
    cache.replace(slots);

    let first = cache.page_slots(0);
    assert!(first.iter().all(Option::is_none));
    let second = cache.page_slots(1);
    assert_eq!(second[0].map(|c| c.id.as_str()), Some("b-2"));
    assert!(second[1..].iter().all(Option::is_none));
  }

  #[test]
  fn owned_ids_skip_blanks() {
    let mut cache = CollectionCache::default();
    cache.replace_owned_ids(vec!["a".into(), "".into()]);
    cache.mark_owned("b");
    assert!(cache.is_owned("a"));
    assert!(cache.is_owned("b"));
    assert_eq!(cache.owned_ids().count(), 2);
  }
}
