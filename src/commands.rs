//! Command handlers behind the CLI. Each returns the text to print, or the
//! message to show the user when the operation fails.

use std::fmt::Write as _;
use std::path::PathBuf;

use log::debug;
use serde_json::Value;

use crate::catalog;
use crate::cli::{BinderAction, Cli, Command, SetAction, ShelfStep};
use crate::config::{normalize_api_base, AppConfig};
use crate::error::BinderError;
use crate::layout::{self, PAGE_SIZE};
use crate::model::{BinderSnapshot, CardDetail, SetBrief};
use crate::remote::{BinderRemote, ExportFormat, HttpRemote};
use crate::session::{AddOutcome, BinderSession, SearchHit};
use crate::shelf::{Shelf, ShelfAction};
use crate::store::LocalStore;
use crate::view::{TapOutcome, ViewMode};

pub struct Context<R: BinderRemote> {
  pub store: LocalStore,
  pub session: BinderSession<R>,
  pub lang: String,
}

impl Context<HttpRemote> {
  pub fn open(config: &AppConfig) -> Result<Self, String> {
    let store = LocalStore::open(&config.state.db_path).map_err(|e| e.to_string())?;
    let api_base = config.api_base(store.api_base().map_err(|e| e.to_string())?);
    debug!("using binder service at {}", api_base);
    let remote = HttpRemote::new(&api_base, config.timeout).map_err(|e| e.to_string())?;
    let lang = match config.lang_override.clone() {
      Some(lang) => lang,
      None => store.language().map_err(|e| e.to_string())?,
    };
    Ok(Context::new(store, remote, lang))
  }
}

impl<R: BinderRemote> Context<R> {
  pub fn new(store: LocalStore, remote: R, lang: String) -> Self {
    Context {
      store,
      session: BinderSession::new(remote),
      lang,
    }
  }

  /// Loads binders and the active collection, then the stored view.
  pub fn load(&mut self) -> Result<(), String> {
    self.session.refresh().map_err(|e| e.to_string())?;
    self.restore_view()
  }

  /// Puts back the active binder's stored view over already loaded state.
  pub fn restore_view(&mut self) -> Result<(), String> {
    if let Some(active) = self.session.active_binder() {
      let view = self.store.view_state(&active.id).map_err(|e| e.to_string())?;
      self.session.restore_view(view);
    }
    Ok(())
  }

  pub fn save_view(&self) -> Result<(), String> {
    if let Some(active) = self.session.active_binder() {
      self
        .store
        .save_view_state(&active.id, self.session.view())
        .map_err(|e| e.to_string())?;
    }
    Ok(())
  }

  fn binder_or_active(&self, id: Option<String>) -> Result<String, String> {
    id.or_else(|| self.session.active_binder().map(|binder| binder.id.clone()))
      .ok_or_else(|| "No active binder.".to_string())
  }
}

fn user_message(error: BinderError) -> String {
  match error {
    BinderError::LastBinder => {
      "Cannot delete the last binder. Create another binder first.".to_string()
    }
    BinderError::ReadOnly => {
      "This binder is read-only. Unlock it with `binder lock` to edit it.".to_string()
    }
    other => other.to_string(),
  }
}

// ---- binder page ----

pub fn show_page<R: BinderRemote>(ctx: &mut Context<R>, page: Option<usize>) -> Result<String, String> {
  if let Some(page) = page {
    ctx.session.goto_page(page.saturating_sub(1));
  }
  Ok(render_page(ctx))
}

pub fn render_page<R: BinderRemote>(ctx: &Context<R>) -> String {
  let session = &ctx.session;
  let view = session.view();
  let cache = session.cache();
  let readonly = session.is_readonly();
  let mut out = String::new();

  let title = session
    .active_binder()
    .map(|binder| binder.name.clone())
    .unwrap_or_else(|| "(no binder)".to_string());
  let _ = write!(out, "{}", title);
  if readonly {
    let _ = write!(out, "  [READ-ONLY]");
  }
  if view.mode == ViewMode::LayoutEdit {
    let _ = write!(out, "  [layout edit]");
  }
  let _ = writeln!(
    out,
    "\nPage {} / {}  ({} cards)",
    view.page + 1,
    layout::total_pages(cache.effective_length()),
    cache.card_count()
  );

  for (local, slot) in cache.page_slots(view.page).iter().enumerate() {
    let global = layout::to_global(view.page, local);
    let marker = if view.move_source == Some(global) { '*' } else { ' ' };
    match slot {
      Some(card) => {
        let _ = writeln!(
          out,
          "{}{}. [{:>3}] {}  {}",
          marker,
          local + 1,
          global,
          card.display_name(),
          card.subtitle()
        );
        if view.open_overlay == Some(global) {
          let state = if readonly { "disabled" } else { "enabled" };
          let _ = writeln!(
            out,
            "      id: {}  set: {}  lang: {}",
            card.id,
            card.set_id().unwrap_or_else(|| "-".to_string()),
            card.lang.as_deref().unwrap_or("-")
          );
          if let Some(image) = card.binder_image() {
            let _ = writeln!(out, "      image: {}", image);
          }
          let _ = writeln!(out, "      actions ({}): remove {}, move-to-page {} <page>", state, global, global);
        }
      }
      None => {
        let _ = writeln!(out, "{}{}. [{:>3}] (empty)", marker, local + 1, global);
      }
    }
  }
  out
}

pub fn turn_page<R: BinderRemote>(ctx: &mut Context<R>, forward: bool) -> Result<String, String> {
  let moved = if forward {
    ctx.session.next_page()
  } else {
    ctx.session.prev_page()
  };
  if !moved {
    debug!("already at the {} page", if forward { "last" } else { "first" });
  }
  Ok(render_page(ctx))
}

pub fn toggle_edit<R: BinderRemote>(ctx: &mut Context<R>) -> Result<String, String> {
  let mode = ctx.session.toggle_layout_mode().map_err(user_message)?;
  let label = match mode {
    ViewMode::LayoutEdit => "Layout edit mode on. Tap a card, then a destination slot.",
    ViewMode::Normal => "Layout edit mode off.",
  };
  Ok(format!("{}\n{}", label, render_page(ctx)))
}

pub fn tap_slot<R: BinderRemote>(ctx: &mut Context<R>, slot: usize) -> Result<String, String> {
  if slot == 0 || slot > PAGE_SIZE {
    return Err(format!("Slot must be between 1 and {}.", PAGE_SIZE));
  }
  let outcome = ctx.session.tap(slot - 1).map_err(user_message)?;
  let note = match outcome {
    TapOutcome::Ignored => "Nothing to do.".to_string(),
    TapOutcome::OverlayOpened(index) => format!("Opened card {}.", index),
    TapOutcome::OverlaysClosed => "Closed.".to_string(),
    TapOutcome::SourceSelected(index) => format!("Selected slot {}. Tap a destination.", index),
    TapOutcome::SelectionCleared => "Selection cleared.".to_string(),
    TapOutcome::Move(request) => format!("Moved {} -> {}.", request.from, request.to),
  };
  Ok(format!("{}\n{}", note, render_page(ctx)))
}

pub fn drag_card<R: BinderRemote>(ctx: &mut Context<R>, from: usize, to: usize) -> Result<String, String> {
  match ctx.session.drop_card(from, to).map_err(user_message)? {
    Some(intent) => Ok(format!("{:?}\n{}", intent, render_page(ctx))),
    None if ctx.session.is_readonly() => Err(user_message(BinderError::ReadOnly)),
    None if !ctx.session.view().is_editing() => {
      Err("Dragging needs layout edit mode; run `edit` first.".to_string())
    }
    None => Ok(render_page(ctx)),
  }
}

pub fn move_to_page<R: BinderRemote>(ctx: &mut Context<R>, from: usize, page: &str) -> Result<String, String> {
  let intent = ctx.session.move_to_page(from, page).map_err(user_message)?;
  Ok(format!("{:?}\n{}", intent, render_page(ctx)))
}

pub fn remove_card<R: BinderRemote>(ctx: &mut Context<R>, index: usize) -> Result<String, String> {
  ctx.session.remove_card(index).map_err(user_message)?;
  Ok(format!("Removed slot {}.\n{}", index, render_page(ctx)))
}

pub fn add_card<R: BinderRemote>(ctx: &mut Context<R>, card_id: &str) -> Result<String, String> {
  let lang = ctx.lang.clone();
  match ctx.session.add_card(card_id, &lang).map_err(user_message)? {
    AddOutcome::Added => Ok(format!("Added {}.", card_id.trim())),
    AddOutcome::AlreadyAdded => Ok(format!("{} is already in this binder.", card_id.trim())),
  }
}

pub fn owned_ids<R: BinderRemote>(ctx: &mut Context<R>) -> Result<String, String> {
  ctx.session.load_owned_ids().map_err(user_message)?;
  let mut out = String::new();
  for id in ctx.session.cache().owned_ids() {
    let _ = writeln!(out, "{}", id);
  }
  Ok(out)
}

// ---- binders ----

fn render_binders<R: BinderRemote>(ctx: &Context<R>) -> String {
  let active = ctx.session.active_binder().map(|binder| binder.id.as_str());
  let mut out = String::new();
  for binder in ctx.session.binders() {
    let marker = if Some(binder.id.as_str()) == active { '>' } else { ' ' };
    let _ = writeln!(out, "{} {}  {}", marker, binder.id, binder.label());
  }
  out
}

fn render_snapshot(snapshot: &BinderSnapshot) -> String {
  let mut out = format!("{} ({} cards)\n", snapshot.name, snapshot.count);
  for (i, card) in snapshot.preview.iter().enumerate() {
    let _ = writeln!(out, "  {}. {}  {}", i + 1, card.display_name(), card.subtitle());
  }
  out
}

pub fn binder_command<R: BinderRemote>(ctx: &mut Context<R>, action: BinderAction) -> Result<String, String> {
  match action {
    BinderAction::List => Ok(render_binders(ctx)),
    BinderAction::Select { binder_id } => {
      ctx.session.select_binder(&binder_id).map_err(user_message)?;
      ctx.restore_view()?;
      Ok(render_page(ctx))
    }
    BinderAction::Create { name } => {
      let id = ctx.session.create_binder(&name).map_err(user_message)?;
      ctx.restore_view()?;
      Ok(format!("Created binder {}.\n{}", id.unwrap_or_default(), render_binders(ctx)))
    }
    BinderAction::Rename { name, id } => {
      let id = ctx.binder_or_active(id)?;
      ctx.session.rename_binder(&id, &name).map_err(user_message)?;
      Ok(render_binders(ctx))
    }
    BinderAction::Duplicate { id, name } => {
      let id = ctx.binder_or_active(id)?;
      let copy = ctx
        .session
        .duplicate_binder(&id, name.as_deref())
        .map_err(user_message)?;
      ctx.restore_view()?;
      Ok(format!("Duplicated into {}.\n{}", copy.unwrap_or_default(), render_binders(ctx)))
    }
    BinderAction::Lock { id } => {
      let id = ctx.binder_or_active(id)?;
      let readonly = ctx.session.toggle_readonly(&id).map_err(user_message)?;
      let message = if readonly {
        "Binder is now read-only."
      } else {
        "Binder is now editable."
      };
      Ok(message.to_string())
    }
    BinderAction::Favorite { id } => {
      let id = ctx.binder_or_active(id)?;
      ctx.session.set_favorite(&id).map_err(user_message)?;
      Ok(render_binders(ctx))
    }
    BinderAction::Delete { binder_id } => {
      ctx.session.delete_binder(&binder_id).map_err(user_message)?;
      ctx.restore_view()?;
      Ok(format!("Deleted binder {}.\n{}", binder_id, render_binders(ctx)))
    }
    BinderAction::Snapshot { id, limit } => {
      let id = ctx.binder_or_active(id)?;
      let snapshot = ctx.session.snapshot(&id, limit).map_err(user_message)?;
      Ok(render_snapshot(&snapshot))
    }
    BinderAction::Export { id, format, output } => {
      let id = ctx.binder_or_active(id)?;
      let format = ExportFormat::from(format);
      let path = output.unwrap_or_else(|| PathBuf::from(format!("binder_{}.{}", id, format.extension())));
      let bytes = ctx.session.export(&id, format, &path).map_err(user_message)?;
      Ok(format!("Wrote {} bytes to {}.", bytes, path.display()))
    }
  }
}

fn render_shelf(shelf: &Shelf) -> String {
  if shelf.entries().is_empty() {
    return "No binders yet. Create one with `binder create <name>`.\n".to_string();
  }
  let mut out = String::new();
  for (i, entry) in shelf.entries().iter().enumerate() {
    let focus = if i == shelf.focus() { '>' } else { ' ' };
    let star = if entry.favorite { "⭐ " } else { "" };
    let lock = if entry.readonly { "🔒 " } else { "" };
    let _ = writeln!(
      out,
      "{}{}. {}{}{} ({} cards)",
      focus,
      i + 1,
      star,
      lock,
      entry.name,
      entry.count
    );
  }
  if let Some(entry) = shelf.focused().filter(|_| shelf.is_opened()) {
    let _ = write!(out, "\nOpened: {}", render_snapshot(entry));
    let _ = writeln!(out, "Run `shelf open {}` again to enter it.", shelf.focus() + 1);
  }
  out
}

/// Shelf focus and open state persist between runs, so opening the same
/// position twice enters that binder.
pub fn shelf<R: BinderRemote>(ctx: &mut Context<R>, step: Option<ShelfStep>) -> Result<String, String> {
  let mut shelf = Shelf::load(ctx.session.remote(), crate::session::DEFAULT_SNAPSHOT_LIMIT)
    .map_err(user_message)?;
  shelf.restore(&ctx.store.shelf_cursor().map_err(user_message)?);

  let mut entered = false;
  match step.unwrap_or(ShelfStep::Show) {
    ShelfStep::Show => {}
    ShelfStep::Next => shelf.next(),
    ShelfStep::Prev => shelf.prev(),
    ShelfStep::Close => shelf.close(),
    ShelfStep::Open { position } => {
      let index = position.checked_sub(1).ok_or("Shelf positions start at 1.")?;
      if let ShelfAction::Enter(binder_id) = shelf.activate(index).ok_or("No binder at that position.")? {
        ctx.session.select_binder(&binder_id).map_err(user_message)?;
        ctx.restore_view()?;
        shelf.close();
        entered = true;
      }
    }
  }

  ctx.store.save_shelf_cursor(&shelf.cursor()).map_err(user_message)?;
  Ok(if entered { render_page(ctx) } else { render_shelf(&shelf) })
}

// ---- catalog ----

fn render_sets(sets: &[SetBrief], selected: Option<&str>) -> String {
  let mut out = String::new();
  for set in sets {
    let marker = if Some(set.id.as_str()) == selected { '>' } else { ' ' };
    let _ = writeln!(out, "{} {:<12} {}", marker, set.id, set.display_name());
  }
  out
}

pub fn set_command<R: BinderRemote>(ctx: &mut Context<R>, action: SetAction) -> Result<String, String> {
  match action {
    SetAction::List => {
      let sets = catalog::list_sets(ctx.session.remote(), &ctx.lang).map_err(user_message)?;
      let selected = ctx.store.selected_set(&ctx.lang).map_err(|e| e.to_string())?;
      Ok(render_sets(&sets, selected.as_deref()))
    }
    SetAction::Select { set_id } => {
      ctx
        .store
        .set_selected_set(&ctx.lang, set_id.as_deref())
        .map_err(|e| e.to_string())?;
      Ok(match set_id {
        Some(id) => format!("Searches in '{}' now list set {}.", ctx.lang, id),
        None => format!("Cleared the selected set for '{}'.", ctx.lang),
      })
    }
    SetAction::Logo { set_id } => {
      let logo = catalog::set_logo(ctx.session.remote(), &ctx.store, &set_id, &ctx.lang)
        .map_err(user_message)?;
      Ok(logo.unwrap_or_else(|| "(no logo)".to_string()))
    }
  }
}

fn render_hits(hits: &[SearchHit], readonly: bool) -> String {
  if hits.is_empty() {
    return "No cards found.\n".to_string();
  }
  let mut out = String::new();
  for hit in hits {
    let status = if hit.owned {
      "in binder"
    } else if readonly {
      "read-only"
    } else {
      "add"
    };
    let number = hit.card.local_id.as_deref().map(|n| format!(" #{}", n)).unwrap_or_default();
    let _ = writeln!(
      out,
      "{:<14} {}{}  [{}]",
      hit.card.id,
      hit.card.name.as_deref().unwrap_or("(no name)"),
      number,
      status
    );
  }
  out
}

pub fn search<R: BinderRemote>(
  ctx: &mut Context<R>,
  query: Option<String>,
  set: Option<String>,
) -> Result<String, String> {
  let set = match set {
    Some(set) => Some(set),
    None => ctx.store.selected_set(&ctx.lang).map_err(|e| e.to_string())?,
  };
  let lang = ctx.lang.clone();
  let hits = ctx
    .session
    .search(query.as_deref().unwrap_or(""), set.as_deref(), &lang)
    .map_err(user_message)?;
  Ok(render_hits(&hits, ctx.session.is_readonly()))
}

/// Numbers and strings from the service print without JSON quoting.
fn plain(value: &Value) -> String {
  value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string())
}

fn render_prices(out: &mut String, market: &str, fields: &[(&str, Option<&Value>)]) {
  let present: Vec<String> = fields
    .iter()
    .filter_map(|(label, value)| match value {
      Some(Value::Null) | None => None,
      Some(value) => Some(format!("{} {}", label, plain(value))),
    })
    .collect();
  if !present.is_empty() {
    let _ = writeln!(out, "  {}: {}", market, present.join(", "));
  }
}

fn render_card(card: &CardDetail) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "{}", card.name.as_deref().unwrap_or("(no name)"));
  let set_name = card.set.as_ref().and_then(|set| set.name.clone());
  let number = card.local_id.as_deref().map(|n| format!("#{}", n));
  let meta: Vec<String> = [set_name.clone(), number].into_iter().flatten().collect();
  if !meta.is_empty() {
    let _ = writeln!(out, "{}", meta.join(" • "));
  }
  let mut pills: Vec<String> = Vec::new();
  pills.extend(card.rarity.clone());
  if let Some(hp) = &card.hp {
    pills.push(format!("HP {}", plain(hp)));
  }
  pills.extend(card.types.iter().cloned());
  pills.extend(card.category.clone());
  if !pills.is_empty() {
    let _ = writeln!(out, "{}", pills.join(" | "));
  }

  let serie = card.serie.as_ref().and_then(|serie| serie.name.clone());
  let set_label = match (set_name, card.set_id()) {
    (Some(name), Some(id)) => Some(format!("{} ({})", name, id)),
    (name, id) => name.or(id),
  };
  let fields = [
    ("ID", Some(card.id.clone())),
    ("Serie", serie),
    ("Set", set_label),
    ("Number", card.local_id.clone()),
    ("Illustrator", card.illustrator.clone()),
    ("Regulation", card.regulation_mark.clone()),
    ("Retreat", card.retreat.as_ref().map(plain)),
    ("Stage", card.stage.clone()),
    ("Suffix", card.suffix.clone()),
    ("Image", card.detail_image()),
  ];
  for (label, value) in fields {
    if let Some(value) = value {
      let _ = writeln!(out, "{}: {}", label, value);
    }
  }

  if !card.abilities.is_empty() {
    let _ = writeln!(out, "\nAbilities");
    for ability in &card.abilities {
      let _ = writeln!(
        out,
        "  {}: {}",
        ability.name.as_deref().unwrap_or("Ability"),
        ability.description().unwrap_or("")
      );
    }
  }
  if !card.attacks.is_empty() {
    let _ = writeln!(out, "\nAttacks");
    for attack in &card.attacks {
      let cost = if attack.cost.is_empty() {
        String::new()
      } else {
        format!(" ({})", attack.cost.join(", "))
      };
      let damage = attack
        .damage
        .as_ref()
        .map(|d| format!(" • {}", plain(d)))
        .unwrap_or_default();
      let _ = writeln!(
        out,
        "  {}{}{}: {}",
        attack.name.as_deref().unwrap_or("Attack"),
        cost,
        damage,
        attack.description().unwrap_or("")
      );
    }
  }
  for (title, list) in [("Weaknesses", &card.weaknesses), ("Resistances", &card.resistances)] {
    if list.is_empty() {
      continue;
    }
    let entries: Vec<String> = list
      .iter()
      .map(|entry| {
        format!(
          "{} {}",
          entry.kind.as_deref().unwrap_or(""),
          entry.value.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
      })
      .collect();
    let _ = writeln!(out, "{}: {}", title, entries.join(", "));
  }

  if let Some(pricing) = &card.pricing {
    let mut prices = String::new();
    if let Some(cm) = &pricing.cardmarket {
      let average = cm.average.as_ref().or(cm.avg.as_ref());
      render_prices(
        &mut prices,
        "Cardmarket",
        &[("avg", average), ("low", cm.low.as_ref()), ("trend", cm.trend.as_ref())],
      );
    }
    if let Some(tcg) = &pricing.tcgplayer {
      render_prices(
        &mut prices,
        "TCGplayer",
        &[("market", tcg.market.as_ref()), ("low", tcg.low.as_ref()), ("mid", tcg.mid.as_ref())],
      );
    }
    if !prices.is_empty() {
      let _ = write!(out, "\nPrices\n{}", prices);
    }
  }
  out
}

pub fn card_details<R: BinderRemote>(ctx: &mut Context<R>, card_id: &str) -> Result<String, String> {
  let card = catalog::card_details(ctx.session.remote(), &ctx.store, card_id, &ctx.lang)
    .map_err(user_message)?;
  Ok(render_card(&card))
}

// ---- preferences ----

pub fn language<R: BinderRemote>(ctx: &mut Context<R>, lang: Option<String>) -> Result<String, String> {
  match lang {
    Some(lang) => {
      ctx.lang = ctx.store.set_language(&lang).map_err(user_message)?;
      Ok(format!("Language set to {}.", ctx.lang))
    }
    None => Ok(ctx.lang.clone()),
  }
}

fn remote_setting(store: &LocalStore, config: &AppConfig, url: Option<String>) -> Result<String, String> {
  match url {
    Some(url) => {
      let normalized = normalize_api_base(&url).map_err(user_message)?;
      store.set_api_base(&normalized).map_err(|e| e.to_string())?;
      Ok(format!("Binder service set to {}.", normalized))
    }
    None => Ok(config.api_base(store.api_base().map_err(|e| e.to_string())?)),
  }
}

fn needs_binder_state(command: &Command) -> bool {
  !matches!(
    command,
    Command::Lang { .. } | Command::Remote { .. } | Command::Card { .. } | Command::Sets { .. }
  )
}

pub fn dispatch(cli: Cli) -> Result<String, String> {
  let config = AppConfig::resolve(cli.overrides()).map_err(user_message)?;

  let mut ctx = Context::open(&config)?;
  if needs_binder_state(&cli.command) {
    ctx.load()?;
  }

  let output = match cli.command {
    Command::Show { page } => show_page(&mut ctx, page),
    Command::Next => turn_page(&mut ctx, true),
    Command::Prev => turn_page(&mut ctx, false),
    Command::Edit => toggle_edit(&mut ctx),
    Command::Tap { slot } => tap_slot(&mut ctx, slot),
    Command::Drag { from, to } => drag_card(&mut ctx, from, to),
    Command::MoveToPage { from, page } => move_to_page(&mut ctx, from, &page),
    Command::Remove { index } => remove_card(&mut ctx, index),
    Command::Add { card_id } => add_card(&mut ctx, &card_id),
    Command::Ids => owned_ids(&mut ctx),
    Command::Binder { action } => binder_command(&mut ctx, action),
    Command::Shelf { action } => shelf(&mut ctx, action),
    Command::Sets { action } => set_command(&mut ctx, action),
    Command::Search { query, set } => search(&mut ctx, query, set),
    Command::Card { card_id } => card_details(&mut ctx, &card_id),
    Command::Lang { lang } => language(&mut ctx, lang),
    Command::Remote { url } => remote_setting(&ctx.store, &config, url),
  };

  // saved even when the command failed
  let saved = ctx.save_view();
  let output = output?;
  saved?;
  Ok(output)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn card_view_lists_details_and_prices() {
    let card: CardDetail = serde_json::from_value(json!({
      "id": "sv1-25",
      "name": "Pikachu",
      "localId": "25",
      "set": { "id": "sv1", "name": "Scarlet & Violet" },
      "serie": { "id": "sv", "name": "Scarlet & Violet Series" },
      "hp": 60,
      "regulationMark": "G",
      "retreat": 1,
      "stage": "Basic",
      "suffix": "ex",
      "abilities": [{ "name": "Static", "text": "May paralyze." }],
      "attacks": [{ "name": "Gnaw", "cost": ["Lightning"], "damage": 20, "effect": null }],
      "pricing": {
        "cardmarket": { "avg": 1.5, "low": 0.2, "trend": null },
        "tcgplayer": { "market": 2.1, "mid": "1.80", "unit": "USD" }
      }
    }))
    .unwrap();

    let text = render_card(&card);
    let lines: Vec<&str> = text.lines().collect();
    for expected in [
      "HP 60",
      "Serie: Scarlet & Violet Series",
      "Set: Scarlet & Violet (sv1)",
      "Number: 25",
      "Regulation: G",
      "Retreat: 1",
      "Stage: Basic",
      "Suffix: ex",
      "  Static: May paralyze.",
      "  Gnaw (Lightning) • 20: ",
      "Prices",
      "  Cardmarket: avg 1.5, low 0.2",
      "  TCGplayer: market 2.1, mid 1.80",
    ] {
      assert!(lines.contains(&expected), "missing {:?} in\n{}", expected, text);
    }
    assert!(!text.contains("Illustrator"));
  }

  #[test]
  fn cardmarket_average_wins_over_avg() {
    let mut card = CardDetail {
      id: "a-1".into(),
      ..CardDetail::default()
    };
    card.pricing = serde_json::from_value(json!({
      "cardmarket": { "average": 3, "avg": 9 }
    }))
    .unwrap();
    assert!(render_card(&card).contains("  Cardmarket: avg 3\n"));

    card.pricing = serde_json::from_value(json!({ "cardmarket": { "trend": null } })).unwrap();
    assert!(!render_card(&card).contains("Prices"));
  }
}
