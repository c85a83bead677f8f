//! Catalog listing job
//!
//! Downloads the full app list (`applist.apps[]`) and rewrites it as an
//! `appid,name` table, which is a ready-made input for the detail crawl.

use crate::{AppId, HarvestError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppListEntry {
    pub appid: AppId,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AppListResponse {
    applist: AppList,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AppList {
    apps: Vec<AppListEntry>,
}

/// Fetches the full catalog from `url`
///
/// A reply without `applist.apps` yields an empty list.
pub async fn fetch_app_list(client: &Client, url: &str) -> Result<Vec<AppListEntry>, HarvestError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| HarvestError::Http {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(HarvestError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body: AppListResponse = response.json().await.map_err(|source| HarvestError::Http {
        url: url.to_string(),
        source,
    })?;

    Ok(body.applist.apps)
}

/// Writes `entries` to `path`, replacing any previous listing
pub fn write_app_list(path: &Path, entries: &[AppListEntry]) -> Result<(), HarvestError> {
    let mut writer = csv::Writer::from_path(path)?;
    if entries.is_empty() {
        writer.write_record(["appid", "name"])?;
    }
    for entry in entries {
        writer.serialize(entry)?;
    }
    writer.flush()?;
    Ok(())
}
