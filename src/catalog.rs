use log::{debug, warn};

use crate::error::Result;
use crate::model::{resolve_logo_url, CardDetail, SetBrief};
use crate::remote::BinderRemote;
use crate::store::LocalStore;

pub fn list_sets<R: BinderRemote>(remote: &R, lang: &str) -> Result<Vec<SetBrief>> {
  let mut sets = remote.sets(lang)?;
  sets.sort_by(|a, b| {
    a.display_name()
      .to_lowercase()
      .cmp(&b.display_name().to_lowercase())
  });
  Ok(sets)
}

pub fn card_details<R: BinderRemote>(
  remote: &R,
  store: &LocalStore,
  card_id: &str,
  lang: &str,
) -> Result<CardDetail> {
  if let Some(card) = store.cached_card_detail(lang, card_id)? {
    debug!("card {} ({}) served from cache", card_id, lang);
    return Ok(card);
  }

  let card = remote.card_detail(card_id, lang)?;
  store.store_card_detail(lang, &card)?;
  Ok(card)
}

/// Logo URL for a set, remembered per language. Lookup failures yield no
/// logo and are not cached.
pub fn set_logo<R: BinderRemote>(
  remote: &R,
  store: &LocalStore,
  set_id: &str,
  lang: &str,
) -> Result<Option<String>> {
  if let Some(cached) = store.cached_set_logo(lang, set_id)? {
    return Ok(cached);
  }

  let set = match remote.set_detail(set_id, lang) {
    Ok(set) => set,
    Err(error) => {
      warn!("set {} ({}) logo lookup failed: {}", set_id, lang, error);
      return Ok(None);
    }
  };
  let logo = set.brief.logo.as_deref().and_then(resolve_logo_url);
  store.store_set_logo(lang, set_id, logo.as_deref())?;
  Ok(logo)
}
