//! Local SQLite store: preferences that the web client kept in
//! localStorage, the persisted view state, and lookup caches.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension};

use crate::config::{normalize_lang, DEFAULT_LANG};
use crate::error::Result;
use crate::model::CardDetail;
use crate::shelf::ShelfCursor;
use crate::view::ViewState;

const MIGRATION_SQL_0001: &str = include_str!("../migrations/0001_initial.sql");
const CARD_CACHE_MAX_AGE_SECONDS: i64 = 60 * 60 * 12;

const PREF_LANG: &str = "lang";
const PREF_API_BASE: &str = "api_base";

fn now_iso() -> String {
  Utc::now().to_rfc3339()
}

fn is_fresh(fetched_at: &str, max_age_seconds: i64) -> bool {
  let Ok(fetched) = DateTime::parse_from_rfc3339(fetched_at) else {
    return false;
  };
  Utc::now().signed_duration_since(fetched.with_timezone(&Utc)) <= Duration::seconds(max_age_seconds)
}

pub fn init_database(db_path: &Path) -> Result<()> {
  if let Some(parent) = db_path.parent() {
    fs::create_dir_all(parent)?;
  }

  let connection = Connection::open(db_path)?;
  connection.execute_batch(MIGRATION_SQL_0001)?;
  Ok(())
}

pub struct LocalStore {
  connection: Connection,
}

impl LocalStore {
  pub fn open(db_path: &Path) -> Result<Self> {
    init_database(db_path)?;
    let connection = Connection::open(db_path)?;
    Ok(LocalStore { connection })
  }

  pub fn preference(&self, key: &str) -> Result<Option<String>> {
    let value = self
      .connection
      .query_row(
        "SELECT value FROM preferences WHERE key = ?1 LIMIT 1",
        params![key],
        |row| row.get(0),
      )
      .optional()?;
    Ok(value)
  }

  pub fn set_preference(&self, key: &str, value: &str) -> Result<()> {
    self.connection.execute(
      "INSERT INTO preferences (key, value, updated_at)
       VALUES (?1, ?2, ?3)
       ON CONFLICT(key) DO UPDATE SET
         value = excluded.value,
         updated_at = excluded.updated_at",
      params![key, value, now_iso()],
    )?;
    Ok(())
  }

  pub fn clear_preference(&self, key: &str) -> Result<()> {
    self
      .connection
      .execute("DELETE FROM preferences WHERE key = ?1", params![key])?;
    Ok(())
  }

  /// Stored language, falling back to the default when unset or no longer
  /// valid.
  pub fn language(&self) -> Result<String> {
    let stored = self.preference(PREF_LANG)?;
    Ok(match stored.as_deref().map(normalize_lang) {
      Some(Ok(lang)) => lang,
      Some(Err(_)) => {
        warn!("ignoring stored language {:?}", stored);
        DEFAULT_LANG.to_string()
      }
      None => DEFAULT_LANG.to_string(),
    })
  }

  pub fn set_language(&self, lang: &str) -> Result<String> {
    let normalized = normalize_lang(lang)?;
    self.set_preference(PREF_LANG, &normalized)?;
    Ok(normalized)
  }

  pub fn api_base(&self) -> Result<Option<String>> {
    self.preference(PREF_API_BASE)
  }

  pub fn set_api_base(&self, api_base: &str) -> Result<()> {
    self.set_preference(PREF_API_BASE, api_base.trim().trim_end_matches('/'))
  }

  pub fn selected_set(&self, lang: &str) -> Result<Option<String>> {
    Ok(
      self
        .preference(&format!("set:{}", lang))?
        .filter(|set_id| !set_id.is_empty()),
    )
  }

  pub fn set_selected_set(&self, lang: &str, set_id: Option<&str>) -> Result<()> {
    let key = format!("set:{}", lang);
    match set_id.map(str::trim).filter(|id| !id.is_empty()) {
      Some(set_id) => self.set_preference(&key, set_id),
      None => self.clear_preference(&key),
    }
  }

  /// View state is kept per binder; each one reopens where it was left.
  pub fn view_state(&self, binder_id: &str) -> Result<ViewState> {
    let Some(raw) = self.preference(&format!("view:{}", binder_id))? else {
      return Ok(ViewState::default());
    };
    match serde_json::from_str(&raw) {
      Ok(view) => Ok(view),
      Err(error) => {
        warn!("discarding unreadable view state for {}: {}", binder_id, error);
        Ok(ViewState::default())
      }
    }
  }

  pub fn save_view_state(&self, binder_id: &str, view: &ViewState) -> Result<()> {
    let raw = serde_json::to_string(view)?;
    self.set_preference(&format!("view:{}", binder_id), &raw)
  }

  pub fn shelf_cursor(&self) -> Result<ShelfCursor> {
    let Some(raw) = self.preference("shelf")? else {
      return Ok(ShelfCursor::default());
    };
    Ok(serde_json::from_str(&raw).unwrap_or_else(|error| {
      warn!("discarding unreadable shelf cursor: {}", error);
      ShelfCursor::default()
    }))
  }

  pub fn save_shelf_cursor(&self, cursor: &ShelfCursor) -> Result<()> {
    self.set_preference("shelf", &serde_json::to_string(cursor)?)
  }

  pub fn cached_card_detail(&self, lang: &str, card_id: &str) -> Result<Option<CardDetail>> {
    let row: Option<(String, String)> = self
      .connection
      .query_row(
        "SELECT body, fetched_at FROM card_detail_cache
         WHERE lang = ?1 AND card_id = ?2
         LIMIT 1",
        params![lang, card_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .optional()?;

    let Some((body, fetched_at)) = row else {
      return Ok(None);
    };
    if !is_fresh(&fetched_at, CARD_CACHE_MAX_AGE_SECONDS) {
      return Ok(None);
    }
    Ok(serde_json::from_str(&body).ok())
  }

  pub fn store_card_detail(&self, lang: &str, card: &CardDetail) -> Result<()> {
    let body = serde_json::to_string(card)?;
    self.connection.execute(
      "INSERT INTO card_detail_cache (lang, card_id, body, fetched_at)
       VALUES (?1, ?2, ?3, ?4)
       ON CONFLICT(lang, card_id) DO UPDATE SET
         body = excluded.body,
         fetched_at = excluded.fetched_at",
      params![lang, card.id, body, now_iso()],
    )?;
    Ok(())
  }

  /// `Some(None)` records that the set has no logo.
  pub fn cached_set_logo(&self, lang: &str, set_id: &str) -> Result<Option<Option<String>>> {
    let logo = self
      .connection
      .query_row(
        "SELECT logo_url FROM set_logo_cache WHERE lang = ?1 AND set_id = ?2 LIMIT 1",
        params![lang, set_id],
        |row| row.get::<usize, Option<String>>(0),
      )
      .optional()?;
    Ok(logo)
  }

  pub fn store_set_logo(&self, lang: &str, set_id: &str, logo_url: Option<&str>) -> Result<()> {
    self.connection.execute(
      "INSERT INTO set_logo_cache (lang, set_id, logo_url, fetched_at)
       VALUES (?1, ?2, ?3, ?4)
       ON CONFLICT(lang, set_id) DO UPDATE SET
         logo_url = excluded.logo_url,
         fetched_at = excluded.fetched_at",
      params![lang, set_id, logo_url, now_iso()],
    )?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::view::ViewMode;
  use tempfile::TempDir;

  fn store() -> (TempDir, LocalStore) {
    let dir = TempDir::new().unwrap();
    let store = LocalStore::open(&dir.path().join("nested").join("binderdex.db")).unwrap();
    (dir, store)
  }

  #[test]
  fn language_defaults_and_validates() {
    let (_dir, store) = store();
    assert_eq!(store.language().unwrap(), "pt");
    assert_eq!(store.set_language(" EN ").unwrap(), "en");
    assert_eq!(store.language().unwrap(), "en");
    assert!(store.set_language("xx").is_err());
    assert_eq!(store.language().unwrap(), "en");
  }

  #[test]
  fn selected_set_is_per_language() {
    let (_dir, store) = store();
    store.set_selected_set("en", Some("sv1")).unwrap();
    assert_eq!(store.selected_set("en").unwrap().as_deref(), Some("sv1"));
    assert_eq!(store.selected_set("pt").unwrap(), None);
    store.set_selected_set("en", Some("")).unwrap();
    assert_eq!(store.selected_set("en").unwrap(), None);
  }

  #[test]
  fn view_state_round_trips_per_binder() {
    let (_dir, store) = store();
    let view = ViewState {
      page: 2,
      mode: ViewMode::LayoutEdit,
      open_overlay: None,
      move_source: Some(19),
    };
    store.save_view_state("b1", &view).unwrap();
    assert_eq!(store.view_state("b1").unwrap(), view);
    assert_eq!(store.view_state("b2").unwrap(), ViewState::default());
  }

  #[test]
  fn shelf_cursor_survives_reopen() {
    let (_dir, store) = store();
    assert_eq!(store.shelf_cursor().unwrap(), ShelfCursor::default());
    let cursor = ShelfCursor {
      focus_id: Some("b2".into()),
      opened: true,
    };
    store.save_shelf_cursor(&cursor).unwrap();
    assert_eq!(store.shelf_cursor().unwrap(), cursor);

    store.set_preference("shelf", "not json").unwrap();
    assert_eq!(store.shelf_cursor().unwrap(), ShelfCursor::default());
  }

  #[test]
  fn card_cache_hits_until_stale() {
    let (_dir, store) = store();
    let card = CardDetail {
      id: "sv1-1".into(),
      name: Some("Sprigatito".into()),
      ..CardDetail::default()
    };
    store.store_card_detail("en", &card).unwrap();
    assert_eq!(store.cached_card_detail("en", "sv1-1").unwrap(), Some(card));
    assert_eq!(store.cached_card_detail("pt", "sv1-1").unwrap(), None);

    store
      .connection
      .execute(
        "UPDATE card_detail_cache SET fetched_at = ?1",
        params!["2000-01-01T00:00:00+00:00"],
      )
      .unwrap();
    assert_eq!(store.cached_card_detail("en", "sv1-1").unwrap(), None);
  }

  #[test]
  fn set_logo_cache_remembers_missing_logos() {
    let (_dir, store) = store();
    assert_eq!(store.cached_set_logo("en", "sv1").unwrap(), None);
    store.store_set_logo("en", "sv1", None).unwrap();
    assert_eq!(store.cached_set_logo("en", "sv1").unwrap(), Some(None));
    store.store_set_logo("en", "sv1", Some("https://x/sv1.png")).unwrap();
    assert_eq!(
      store.cached_set_logo("en", "sv1").unwrap(),
      Some(Some("https://x/sv1.png".to_string()))
    );
  }
}
