//! The binder service owns every durable piece of state. `BinderRemote` is
//! the seam the session talks through; `HttpRemote` is the real transport.

use std::time::Duration;

use log::debug;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::ACCEPT;
use reqwest::{IntoUrl, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{BinderError, Result};
use crate::layout::MoveIntent;
use crate::model::{
  ActiveBinder, BinderSnapshot, BinderSummary, CardBrief, CardDetail, SetBrief, SetDetail, Slot,
  StatusReply,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
  Json,
  Pdf,
}

impl ExportFormat {
  pub fn extension(&self) -> &'static str {
    match self {
      ExportFormat::Json => "json",
      ExportFormat::Pdf => "pdf",
    }
  }
}

pub trait BinderRemote {
  fn collection(&self) -> Result<Vec<Slot>>;
  fn collection_ids(&self) -> Result<Vec<String>>;
  fn apply_move(&self, intent: &MoveIntent) -> Result<StatusReply>;
  fn remove_card(&self, index: usize) -> Result<StatusReply>;
  fn add_card(&self, card_id: &str, lang: &str) -> Result<StatusReply>;

  fn binders(&self) -> Result<Vec<BinderSummary>>;
  fn active_binder(&self) -> Result<ActiveBinder>;
  fn select_binder(&self, binder_id: &str) -> Result<StatusReply>;
  fn create_binder(&self, name: &str) -> Result<StatusReply>;
  fn rename_binder(&self, binder_id: &str, name: &str) -> Result<StatusReply>;
  fn duplicate_binder(&self, binder_id: &str, name: Option<&str>) -> Result<StatusReply>;
  fn set_readonly(&self, binder_id: &str, readonly: bool) -> Result<StatusReply>;
  fn set_favorite(&self, binder_id: &str) -> Result<StatusReply>;
  fn delete_binder(&self, binder_id: &str) -> Result<StatusReply>;
  fn snapshot(&self, binder_id: &str, limit: usize) -> Result<BinderSnapshot>;
  fn export(&self, binder_id: &str, format: ExportFormat) -> Result<Vec<u8>>;

  fn sets(&self, lang: &str) -> Result<Vec<SetBrief>>;
  fn set_detail(&self, set_id: &str, lang: &str) -> Result<SetDetail>;
  fn card_detail(&self, card_id: &str, lang: &str) -> Result<CardDetail>;
  fn search_cards(&self, name: &str, lang: &str) -> Result<Vec<CardBrief>>;
}

#[derive(Deserialize)]
struct ErrorBody {
  detail: Option<serde_json::Value>,
}

pub struct HttpRemote {
  base_url: String,
  client: Client,
}

impl HttpRemote {
  pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
    // blocking clients default to 30s; `None` lifts the limit entirely
    let client = Client::builder().timeout(timeout).build()?;
    Ok(HttpRemote {
      base_url: base_url.trim_end_matches('/').to_string(),
      client,
    })
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url, path)
  }

  fn send(&self, request: RequestBuilder, what: &str) -> Result<Response> {
    debug!("remote call: {}", what);
    let response = request.header(ACCEPT, "application/json").send()?;
    let status = response.status();
    if status.is_success() {
      return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    Err(BinderError::Http {
      status: status.as_u16(),
      message: failure_message(status.as_u16(), &body),
    })
  }

  /// `{base}/{collection}/{id}` with `id` escaped as a single segment.
  fn item_url(&self, collection: &str, id: &str) -> Result<Url> {
    let invalid = || BinderError::invalid(format!("Invalid service URL: {}", self.base_url));
    let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
    url
      .path_segments_mut()
      .map_err(|_| invalid())?
      .pop_if_empty()
      .push(collection)
      .push(id);
    Ok(url)
  }

  fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
    self.get_json_at(self.url(path), path, query)
  }

  fn get_json_at<T: DeserializeOwned, U: IntoUrl>(
    &self,
    url: U,
    what: &str,
    query: &[(&str, String)],
  ) -> Result<T> {
    let request = self.client.get(url).query(query);
    let body = self.send(request, what)?.text()?;
    Ok(serde_json::from_str(&body)?)
  }

  fn post_query(&self, path: &str, query: &[(&str, String)]) -> Result<StatusReply> {
    let request = self.client.post(self.url(path)).query(query);
    let body = self.send(request, path)?.text()?;
    Ok(serde_json::from_str(&body)?)
  }
}

/// `detail` from a JSON error body, then the raw text, then the status.
fn failure_message(status: u16, body: &str) -> String {
  if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
    match parsed.detail {
      Some(serde_json::Value::String(detail)) => return detail,
      Some(other) if !other.is_null() => return other.to_string(),
      _ => {}
    }
  }
  let trimmed = body.trim();
  if !trimmed.is_empty() {
    return trimmed.to_string();
  }
  format!("Request failed with status {}", status)
}

fn with_lang(lang: &str) -> Vec<(&'static str, String)> {
  vec![("lang", lang.to_string())]
}

fn binder_query(binder_id: &str) -> Vec<(&'static str, String)> {
  vec![("binder_id", binder_id.to_string())]
}

impl BinderRemote for HttpRemote {
  fn collection(&self) -> Result<Vec<Slot>> {
    self.get_json("/collection", &[])
  }

  fn collection_ids(&self) -> Result<Vec<String>> {
    self.get_json("/collection/ids", &[])
  }

  fn apply_move(&self, intent: &MoveIntent) -> Result<StatusReply> {
    let request = self
      .client
      .post(self.url(intent.endpoint()))
      .json(&intent.payload());
    let body = self.send(request, intent.endpoint())?.text()?;
    Ok(serde_json::from_str(&body)?)
  }

  fn remove_card(&self, index: usize) -> Result<StatusReply> {
    self.post_query("/collection/remove", &[("index", index.to_string())])
  }

  fn add_card(&self, card_id: &str, lang: &str) -> Result<StatusReply> {
    self.post_query(
      "/collection/add",
      &[("card_id", card_id.to_string()), ("lang", lang.to_string())],
    )
  }

  fn binders(&self) -> Result<Vec<BinderSummary>> {
    self.get_json("/binders", &[])
  }

  fn active_binder(&self) -> Result<ActiveBinder> {
    self.get_json("/binders/active", &[])
  }

  fn select_binder(&self, binder_id: &str) -> Result<StatusReply> {
    self.post_query("/binders/select", &binder_query(binder_id))
  }

  fn create_binder(&self, name: &str) -> Result<StatusReply> {
    self.post_query("/binders/create", &[("name", name.to_string())])
  }

  fn rename_binder(&self, binder_id: &str, name: &str) -> Result<StatusReply> {
    let mut query = binder_query(binder_id);
    query.push(("name", name.to_string()));
    self.post_query("/binders/rename", &query)
  }

  fn duplicate_binder(&self, binder_id: &str, name: Option<&str>) -> Result<StatusReply> {
    let mut query = binder_query(binder_id);
    if let Some(name) = name.map(str::trim).filter(|name| !name.is_empty()) {
      query.push(("name", name.to_string()));
    }
    self.post_query("/binders/duplicate", &query)
  }

  fn set_readonly(&self, binder_id: &str, readonly: bool) -> Result<StatusReply> {
    let mut query = binder_query(binder_id);
    query.push(("readonly", readonly.to_string()));
    self.post_query("/binders/readonly", &query)
  }

  fn set_favorite(&self, binder_id: &str) -> Result<StatusReply> {
    self.post_query("/binders/favorite", &binder_query(binder_id))
  }

  fn delete_binder(&self, binder_id: &str) -> Result<StatusReply> {
    self.post_query("/binders/delete", &binder_query(binder_id))
  }

  fn snapshot(&self, binder_id: &str, limit: usize) -> Result<BinderSnapshot> {
    let mut query = binder_query(binder_id);
    query.push(("limit", limit.to_string()));
    self.get_json("/binders/snapshot", &query)
  }

  fn export(&self, binder_id: &str, format: ExportFormat) -> Result<Vec<u8>> {
    let path = format!("/binders/export/{}", format.extension());
    let request = self.client.get(self.url(&path)).query(&binder_query(binder_id));
    let bytes = self.send(request, &path)?.bytes()?;
    Ok(bytes.to_vec())
  }

  fn sets(&self, lang: &str) -> Result<Vec<SetBrief>> {
    self.get_json("/sets", &with_lang(lang))
  }

  fn set_detail(&self, set_id: &str, lang: &str) -> Result<SetDetail> {
    let url = self.item_url("sets", set_id)?;
    self.get_json_at(url, "/sets/{id}", &with_lang(lang))
  }

  fn card_detail(&self, card_id: &str, lang: &str) -> Result<CardDetail> {
    let url = self.item_url("cards", card_id)?;
    self.get_json_at(url, "/cards/{id}", &with_lang(lang))
  }

  fn search_cards(&self, name: &str, lang: &str) -> Result<Vec<CardBrief>> {
    self.get_json(
      "/cards/search",
      &[("name", name.to_string()), ("lang", lang.to_string())],
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn failure_message_prefers_detail() {
    assert_eq!(
      failure_message(403, r#"{"detail":"Binder is read-only"}"#),
      "Binder is read-only"
    );
    assert_eq!(failure_message(502, "upstream down"), "upstream down");
    assert_eq!(failure_message(500, ""), "Request failed with status 500");
    assert_eq!(
      failure_message(422, r#"{"detail":[{"loc":["query"]}]}"#),
      r#"[{"loc":["query"]}]"#
    );
  }

  #[test]
  fn item_ids_stay_one_path_segment() {
    let remote = HttpRemote::new("http://127.0.0.1:8000", None).unwrap();
    assert_eq!(
      remote.item_url("cards", "swsh8-86").unwrap().as_str(),
      "http://127.0.0.1:8000/cards/swsh8-86"
    );
    assert_eq!(
      remote.item_url("cards", "a b/c").unwrap().as_str(),
      "http://127.0.0.1:8000/cards/a%20b%2Fc"
    );

    let nested = HttpRemote::new("http://127.0.0.1:8000/api/", None).unwrap();
    assert_eq!(
      nested.item_url("sets", "sv1").unwrap().as_str(),
      "http://127.0.0.1:8000/api/sets/sv1"
    );
  }

  #[test]
  fn base_url_loses_trailing_slash() {
    let remote = HttpRemote::new("http://127.0.0.1:8000/", None).unwrap();
    assert_eq!(remote.base_url(), "http://127.0.0.1:8000");
  }
}
