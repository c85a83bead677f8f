//! Row types for the three output tables
//!
//! Field names double as the table headers. Missing values are written as `N/A`
//! and booleans as `True`/`False`, matching tables produced by earlier crawls.

use crate::crawler::{GameDetails, LinkDetails};
use crate::AppId;
use serde::{Serialize, Serializer};
use std::fmt::Display;

/// Value written in place of a missing optional field
pub const PLACEHOLDER: &str = "N/A";

fn or_placeholder<T: Display, S: Serializer>(
    value: &Option<T>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.collect_str(v),
        None => serializer.serialize_str(PLACEHOLDER),
    }
}

fn title_case_bool<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *value { "True" } else { "False" })
}

/// Row of the base game table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseGameRow {
    #[serde(serialize_with = "or_placeholder")]
    pub steam_appid: Option<AppId>,
    #[serde(serialize_with = "or_placeholder")]
    pub name: Option<String>,
    #[serde(serialize_with = "title_case_bool")]
    pub windows: bool,
    #[serde(serialize_with = "title_case_bool")]
    pub mac: bool,
    #[serde(serialize_with = "title_case_bool")]
    pub linux: bool,
    #[serde(serialize_with = "or_placeholder")]
    pub metacritic: Option<u32>,
    #[serde(serialize_with = "title_case_bool")]
    pub steam_achievements: bool,
    #[serde(serialize_with = "title_case_bool")]
    pub steam_trading_cards: bool,
    #[serde(serialize_with = "title_case_bool")]
    pub workshop_support: bool,
    #[serde(serialize_with = "or_placeholder")]
    pub genres: Option<String>,
    #[serde(serialize_with = "or_placeholder")]
    pub achievements_total: Option<u32>,
    #[serde(serialize_with = "or_placeholder")]
    pub release_date: Option<String>,
    /// Number of DLC the store lists for the game
    pub dlcs: usize,
}

impl From<&GameDetails> for BaseGameRow {
    fn from(game: &GameDetails) -> Self {
        Self {
            steam_appid: game.steam_appid,
            name: game.name.clone(),
            windows: game.windows,
            mac: game.mac,
            linux: game.linux,
            metacritic: game.metacritic,
            steam_achievements: game.has_category("Steam Achievements"),
            steam_trading_cards: game.has_category("Steam Trading Cards"),
            workshop_support: game.has_category("Steam Workshop"),
            genres: (!game.genres.is_empty()).then(|| game.genres.join(", ")),
            achievements_total: game.achievements_total,
            release_date: game.release_date.clone(),
            dlcs: game.dlc.len(),
        }
    }
}

/// Row of the DLC link table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DlcRow {
    #[serde(serialize_with = "or_placeholder")]
    pub dlc_appid: Option<AppId>,
    pub base_appid: AppId,
    #[serde(serialize_with = "or_placeholder")]
    pub name: Option<String>,
}

impl DlcRow {
    /// Builds the row, or None when the DLC has no resolvable base game
    pub fn from_link(link: &LinkDetails) -> Option<Self> {
        Some(Self {
            dlc_appid: link.steam_appid,
            base_appid: link.parent_appid?,
            name: link.name.clone(),
        })
    }
}

/// Row of the demo link table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemoRow {
    #[serde(serialize_with = "or_placeholder")]
    pub demo_appid: Option<AppId>,
    pub full_game_appid: AppId,
    #[serde(serialize_with = "or_placeholder")]
    pub name: Option<String>,
}

impl DemoRow {
    /// Builds the row, or None when the demo has no resolvable full game
    pub fn from_link(link: &LinkDetails) -> Option<Self> {
        Some(Self {
            demo_appid: link.steam_appid,
            full_game_appid: link.parent_appid?,
            name: link.name.clone(),
        })
    }
}
