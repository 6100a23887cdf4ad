use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A binder position; `None` is an empty slot.
pub type Slot = Option<Card>;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct CardImages {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub small: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub large: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub high: Option<String>,
}

/// Card as stored in a binder slot. Fields the client does not read are
/// kept in `extra` and never altered.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Card {
  pub id: String,
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub image: Option<String>,
  #[serde(default)]
  pub images: Option<CardImages>,
  #[serde(default)]
  pub set: Option<String>,
  #[serde(default)]
  pub set_id: Option<String>,
  #[serde(default)]
  pub number: Option<String>,
  #[serde(default)]
  pub lang: Option<String>,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl Card {
  pub fn with_id(id: &str) -> Self {
    Card {
      id: id.to_string(),
      ..Card::default()
    }
  }

  pub fn display_name(&self) -> &str {
    self.name.as_deref().unwrap_or("")
  }

  /// `setId` when present, otherwise the `<set>-<number>` id prefix.
  pub fn set_id(&self) -> Option<String> {
    if let Some(set_id) = self.set_id.as_deref().filter(|value| !value.is_empty()) {
      return Some(set_id.to_string());
    }
    set_prefix(&self.id)
  }

  pub fn binder_image(&self) -> Option<String> {
    if let Some(base) = self.image.as_deref() {
      return Some(format!("{}/low.png", base));
    }
    let images = self.images.as_ref()?;
    images
      .high
      .clone()
      .or_else(|| images.large.clone())
      .or_else(|| images.small.clone())
  }

  pub fn subtitle(&self) -> String {
    let number = self.number.as_deref().map(|n| format!("#{}", n));
    [self.set.clone(), number]
      .into_iter()
      .flatten()
      .filter(|part| !part.is_empty())
      .collect::<Vec<_>>()
      .join(" • ")
  }
}

fn set_prefix(card_id: &str) -> Option<String> {
  card_id
    .split_once('-')
    .map(|(prefix, _)| prefix.to_string())
    .filter(|prefix| !prefix.is_empty())
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BinderSummary {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub readonly: bool,
  #[serde(default)]
  pub favorite: bool,
  #[serde(default)]
  pub count: usize,
}

impl BinderSummary {
  pub fn label(&self) -> String {
    let star = if self.favorite { "⭐ " } else { "" };
    let lock = if self.readonly { "🔒 " } else { "" };
    format!("{}{}{} ({})", star, lock, self.name, self.count)
  }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ActiveBinder {
  pub active: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BinderSnapshot {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub readonly: bool,
  #[serde(default)]
  pub favorite: bool,
  #[serde(default)]
  pub count: usize,
  #[serde(default)]
  pub preview: Vec<Card>,
}

impl BinderSnapshot {
  pub fn empty_for(binder: &BinderSummary) -> Self {
    BinderSnapshot {
      id: binder.id.clone(),
      name: binder.name.clone(),
      readonly: binder.readonly,
      favorite: binder.favorite,
      count: binder.count,
      preview: Vec::new(),
    }
  }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StatusReply {
  // `create` answers with only an id
  #[serde(default)]
  pub status: String,
  #[serde(default)]
  pub id: Option<String>,
}

pub const STATUS_LAST_BINDER: &str = "last_binder";
pub const STATUS_ALREADY_ADDED: &str = "already_added";
const SUCCESS_STATUSES: [&str; 5] = ["ok", "added", STATUS_ALREADY_ADDED, "removed", "deleted"];

impl StatusReply {
  pub fn is_success(&self) -> bool {
    SUCCESS_STATUSES.contains(&self.status.as_str())
  }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SetBrief {
  pub id: String,
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub logo: Option<String>,
  #[serde(default)]
  pub symbol: Option<String>,
  #[serde(default)]
  pub card_count: Option<Value>,
}

impl SetBrief {
  pub fn display_name(&self) -> &str {
    self.name.as_deref().unwrap_or(&self.id)
  }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SetDetail {
  #[serde(flatten)]
  pub brief: SetBrief,
  #[serde(default)]
  pub cards: Vec<CardBrief>,
}

/// Search result or set listing entry.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardBrief {
  pub id: String,
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub local_id: Option<String>,
  #[serde(default)]
  pub image: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct NamedRef {
  #[serde(default)]
  pub id: Option<String>,
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub logo: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Ability {
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub effect: Option<String>,
  #[serde(default)]
  pub text: Option<String>,
}

impl Ability {
  pub fn description(&self) -> Option<&str> {
    self.effect.as_deref().or(self.text.as_deref())
  }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Attack {
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub cost: Vec<String>,
  #[serde(default)]
  pub damage: Option<Value>,
  #[serde(default)]
  pub effect: Option<String>,
  #[serde(default)]
  pub text: Option<String>,
}

impl Attack {
  pub fn description(&self) -> Option<&str> {
    self.effect.as_deref().or(self.text.as_deref())
  }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct TypedValue {
  #[serde(default, rename = "type")]
  pub kind: Option<String>,
  #[serde(default)]
  pub value: Option<String>,
}

/// One marketplace's price block. Cardmarket and TCGplayer fill different
/// fields; anything else is kept in `extra`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct MarketPrices {
  #[serde(default)]
  pub average: Option<Value>,
  #[serde(default)]
  pub avg: Option<Value>,
  #[serde(default)]
  pub low: Option<Value>,
  #[serde(default)]
  pub trend: Option<Value>,
  #[serde(default)]
  pub market: Option<Value>,
  #[serde(default)]
  pub mid: Option<Value>,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Pricing {
  #[serde(default)]
  pub cardmarket: Option<MarketPrices>,
  #[serde(default)]
  pub tcgplayer: Option<MarketPrices>,
}

/// Full card record used by the details view.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardDetail {
  pub id: String,
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub local_id: Option<String>,
  #[serde(default)]
  pub image: Option<String>,
  #[serde(default)]
  pub set: Option<NamedRef>,
  #[serde(default)]
  pub serie: Option<NamedRef>,
  #[serde(default)]
  pub rarity: Option<String>,
  #[serde(default)]
  pub hp: Option<Value>,
  #[serde(default)]
  pub types: Vec<String>,
  #[serde(default)]
  pub category: Option<String>,
  #[serde(default)]
  pub illustrator: Option<String>,
  #[serde(default)]
  pub regulation_mark: Option<String>,
  #[serde(default)]
  pub retreat: Option<Value>,
  #[serde(default)]
  pub stage: Option<String>,
  #[serde(default)]
  pub suffix: Option<String>,
  #[serde(default)]
  pub abilities: Vec<Ability>,
  #[serde(default)]
  pub attacks: Vec<Attack>,
  #[serde(default)]
  pub weaknesses: Vec<TypedValue>,
  #[serde(default)]
  pub resistances: Vec<TypedValue>,
  #[serde(default)]
  pub pricing: Option<Pricing>,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl CardDetail {
  pub fn detail_image(&self) -> Option<String> {
    self.image.as_deref().map(|base| format!("{}/high.png", base))
  }

  pub fn set_id(&self) -> Option<String> {
    self
      .set
      .as_ref()
      .and_then(|set| set.id.clone())
      .or_else(|| set_prefix(&self.id))
  }
}

/// Appends `.png` to logo asset bases that carry no extension.
pub fn resolve_logo_url(logo: &str) -> Option<String> {
  let trimmed = logo.trim();
  if trimmed.is_empty() {
    return None;
  }
  let lower = trimmed.to_lowercase();
  if [".png", ".webp", ".jpg"].iter().any(|ext| lower.ends_with(ext)) {
    return Some(trimmed.to_string());
  }
  Some(format!("{}.png", trimmed.trim_end_matches('/')))
}
