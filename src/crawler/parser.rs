//! Detail response parsing
//!
//! The detail endpoint answers with a JSON object keyed by the decimal appid:
//!
//! ```json
//! { "730": { "success": true, "data": { "type": "game", "name": "...", ... } } }
//! ```
//!
//! This module turns that payload into a [`DetailRecord`], a tagged union over the
//! three shapes the crawl routes (`game`, `dlc`, `demo`) plus everything else.

use crate::{AppId, HarvestError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Result of interpreting one detail response
#[derive(Debug, Clone, PartialEq)]
pub enum DetailLookup {
    /// The store answered with a payload for the identifier
    Found(DetailRecord),

    /// The store answered, but without a successful entry for the identifier
    NoData,
}

/// The per-identifier payload, discriminated by its `type` field
#[derive(Debug, Clone, PartialEq)]
pub enum DetailRecord {
    Game(GameDetails),
    Dlc(LinkDetails),
    Demo(LinkDetails),
    /// Any other type tag (lowercased); empty when the tag is missing
    Unknown(String),
}

impl DetailRecord {
    /// Lowercase type tag as reported by the store
    pub fn kind(&self) -> &str {
        match self {
            Self::Game(_) => "game",
            Self::Dlc(_) => "dlc",
            Self::Demo(_) => "demo",
            Self::Unknown(kind) => kind,
        }
    }
}

/// Base game attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameDetails {
    pub steam_appid: Option<AppId>,
    pub name: Option<String>,
    pub windows: bool,
    pub mac: bool,
    pub linux: bool,
    pub metacritic: Option<u32>,
    /// Trimmed category descriptions
    pub categories: Vec<String>,
    /// Trimmed genre descriptions
    pub genres: Vec<String>,
    pub achievements_total: Option<u32>,
    pub release_date: Option<String>,
    /// Identifiers of the DLC the store lists for this game
    pub dlc: Vec<AppId>,
}

impl GameDetails {
    pub fn has_category(&self, description: &str) -> bool {
        self.categories.iter().any(|c| c == description)
    }
}

/// A DLC or demo entry and the full game it belongs to
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkDetails {
    pub steam_appid: Option<AppId>,
    /// `fullgame.appid`, present only when it resolves to a non-zero identifier
    pub parent_appid: Option<AppId>,
    pub name: Option<String>,
}

/// Decodes one field, falling back to its default when the store sent a value
/// of an unexpected type
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDetails {
    #[serde(rename = "type", deserialize_with = "lenient")]
    kind: Option<String>,
    #[serde(deserialize_with = "lenient")]
    steam_appid: Option<AppId>,
    #[serde(deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    platforms: Option<RawPlatforms>,
    #[serde(deserialize_with = "lenient")]
    metacritic: Option<RawMetacritic>,
    #[serde(deserialize_with = "lenient")]
    categories: Option<Vec<RawDescription>>,
    #[serde(deserialize_with = "lenient")]
    genres: Option<Vec<RawDescription>>,
    #[serde(deserialize_with = "lenient")]
    achievements: Option<RawAchievements>,
    #[serde(deserialize_with = "lenient")]
    release_date: Option<RawReleaseDate>,
    #[serde(deserialize_with = "lenient")]
    fullgame: Option<RawFullGame>,
    #[serde(deserialize_with = "lenient")]
    dlc: Option<Vec<AppId>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPlatforms {
    #[serde(deserialize_with = "lenient")]
    windows: bool,
    #[serde(deserialize_with = "lenient")]
    mac: bool,
    #[serde(deserialize_with = "lenient")]
    linux: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawMetacritic {
    #[serde(deserialize_with = "lenient")]
    score: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDescription {
    #[serde(deserialize_with = "lenient")]
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAchievements {
    #[serde(deserialize_with = "lenient")]
    total: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawReleaseDate {
    #[serde(deserialize_with = "lenient")]
    date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFullGame {
    /// The store sends this as a string, but numbers show up too
    #[serde(deserialize_with = "lenient")]
    appid: Option<Value>,
}

/// Resolves a `fullgame.appid` value to a non-zero identifier
fn resolve_parent(value: &Value) -> Option<AppId> {
    let id = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    id.filter(|id| *id != 0)
}

fn descriptions(raw: Option<Vec<RawDescription>>) -> Vec<String> {
    raw.unwrap_or_default()
        .into_iter()
        .map(|d| d.description.unwrap_or_default().trim().to_string())
        .collect()
}

impl From<RawDetails> for DetailRecord {
    fn from(raw: RawDetails) -> Self {
        let kind = raw.kind.as_deref().unwrap_or("").trim().to_lowercase();

        match kind.as_str() {
            "game" => {
                let platforms = raw.platforms.unwrap_or_default();
                Self::Game(GameDetails {
                    steam_appid: raw.steam_appid,
                    name: raw.name,
                    windows: platforms.windows,
                    mac: platforms.mac,
                    linux: platforms.linux,
                    metacritic: raw.metacritic.and_then(|m| m.score),
                    categories: descriptions(raw.categories),
                    genres: descriptions(raw.genres),
                    achievements_total: raw.achievements.and_then(|a| a.total),
                    release_date: raw.release_date.and_then(|r| r.date),
                    dlc: raw.dlc.unwrap_or_default(),
                })
            }
            "dlc" | "demo" => {
                let link = LinkDetails {
                    steam_appid: raw.steam_appid,
                    parent_appid: raw
                        .fullgame
                        .and_then(|f| f.appid)
                        .as_ref()
                        .and_then(resolve_parent),
                    name: raw.name,
                };
                if kind == "dlc" {
                    Self::Dlc(link)
                } else {
                    Self::Demo(link)
                }
            }
            _ => Self::Unknown(kind),
        }
    }
}

/// Interprets a detail response body for `appid`
///
/// # Returns
///
/// * `Ok(DetailLookup::Found(_))` - A successful entry with a payload
/// * `Ok(DetailLookup::NoData)` - A well-formed answer without a successful entry
/// * `Err(HarvestError::Decode)` - The body is not the expected JSON (retryable)
pub fn parse_detail_response(body: &str, appid: AppId) -> Result<DetailLookup, HarvestError> {
    let decode = |message: String| HarvestError::Decode { appid, message };

    let root: Value = serde_json::from_str(body).map_err(|e| decode(e.to_string()))?;

    // The store answers `null` when it is throttling us.
    let root = match root {
        Value::Object(map) => map,
        Value::Null => return Err(decode("null response body".to_string())),
        other => return Err(decode(format!("expected an object, got {}", other))),
    };

    let Some(entry) = root.get(&appid.to_string()) else {
        return Ok(DetailLookup::NoData);
    };

    let success = entry.get("success").and_then(Value::as_bool).unwrap_or(false);
    let data = match entry.get("data") {
        Some(data) if success && data.is_object() => data.clone(),
        _ => return Ok(DetailLookup::NoData),
    };

    let raw: RawDetails = serde_json::from_value(data).map_err(|e| decode(e.to_string()))?;
    Ok(DetailLookup::Found(raw.into()))
}
