//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the store API and run full
//! crawls against temporary output directories.

use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use steam_harvest::config::{Config, OutputConfig};
use steam_harvest::crawler::{harvest_app_list, run_crawl, RunOptions, RunSummary};
use steam_harvest::input::read_identifiers;
use steam_harvest::output::AppendLog;
use steam_harvest::state::ItemState;
use steam_harvest::storage::{SqliteStorage, Storage};
use steam_harvest::AppId;
use tempfile::tempdir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DETAIL_PATH: &str = "/api/appdetails/";
const APP_LIST_PATH: &str = "/ISteamApps/GetAppList/v2/";

/// Creates a test configuration pointed at the mock server, with no waits
fn create_test_config(server: &MockServer, dir: &Path) -> Config {
    let mut config = Config::default();
    config.api.detail_url = format!("{}{}", server.uri(), DETAIL_PATH);
    config.api.app_list_url = format!("{}{}", server.uri(), APP_LIST_PATH);
    config.api.request_timeout_ms = 200;
    config.crawler.max_retries = 3;
    config.crawler.retry_delay_ms = 0;
    config.crawler.pacing_delay_ms = 0;
    config.output = OutputConfig::in_dir(dir);
    config
}

/// Wraps `data` in a successful detail answer for `appid`
fn detail_body(appid: AppId, data: Value) -> Value {
    let mut root = serde_json::Map::new();
    root.insert(appid.to_string(), json!({ "success": true, "data": data }));
    Value::Object(root)
}

fn game_data(appid: AppId, name: &str) -> Value {
    json!({
        "type": "game",
        "steam_appid": appid,
        "name": name,
        "platforms": { "windows": true, "mac": false, "linux": true },
        "metacritic": { "score": 88 },
        "categories": [{ "id": 22, "description": "Steam Achievements" }],
        "genres": [{ "id": "1", "description": "Action" }],
        "achievements": { "total": 12 },
        "release_date": { "coming_soon": false, "date": "1 Nov, 2000" },
        "dlc": [20]
    })
}

fn detail_mock(appid: AppId) -> wiremock::MockBuilder {
    Mock::given(method("GET"))
        .and(path(DETAIL_PATH))
        .and(query_param("appids", appid.to_string()))
}

async fn mount_detail(server: &MockServer, appid: AppId, data: Value) {
    detail_mock(appid)
        .respond_with(ResponseTemplate::new(200).set_body_json(detail_body(appid, data)))
        .mount(server)
        .await;
}

fn read(path: &str) -> String {
    std::fs::read_to_string(path).unwrap_or_default()
}

fn item_state(config: &Config, appid: AppId) -> Option<ItemState> {
    let storage = SqliteStorage::new(Path::new(&config.output.checkpoint_path))
        .expect("Failed to open checkpoint store");
    storage
        .get_item(appid)
        .expect("Failed to read item")
        .map(|item| item.state)
}

#[tokio::test]
async fn test_full_crawl_routes_records() {
    let mock_server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let mut config = create_test_config(&mock_server, dir.path());
    config.crawler.max_retries = 2;

    mount_detail(&mock_server, 10, game_data(10, "Counter-Strike")).await;
    mount_detail(
        &mock_server,
        20,
        json!({
            "type": "dlc",
            "steam_appid": 20,
            "name": "Soundtrack",
            "fullgame": { "appid": "10", "name": "Counter-Strike" }
        }),
    )
    .await;
    mount_detail(
        &mock_server,
        40,
        json!({
            "type": "demo",
            "steam_appid": 40,
            "name": "Counter-Strike Demo",
            "fullgame": { "appid": 10 }
        }),
    )
    .await;

    // Slower than the client timeout on every attempt
    detail_mock(30)
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(detail_body(30, game_data(30, "Slow")))
                .set_delay(Duration::from_secs(1)),
        )
        .mount(&mock_server)
        .await;

    let summary = run_crawl(config.clone(), "test", RunOptions::default(), &[10, 20, 30, 40])
        .await
        .expect("Crawl failed");

    assert_eq!(
        summary,
        RunSummary {
            routed: 3,
            exhausted: 1,
            ..RunSummary::default()
        }
    );

    assert_eq!(
        read(&config.output.base_games_path),
        "steam_appid,name,windows,mac,linux,metacritic,steam_achievements,\
         steam_trading_cards,workshop_support,genres,achievements_total,release_date,dlcs\n\
         10,Counter-Strike,True,False,True,88,True,False,False,Action,12,\"1 Nov, 2000\",1\n"
    );
    assert_eq!(
        read(&config.output.dlcs_path),
        "dlc_appid,base_appid,name\n20,10,Soundtrack\n"
    );
    assert_eq!(
        read(&config.output.demos_path),
        "demo_appid,full_game_appid,name\n40,10,Counter-Strike Demo\n"
    );

    assert_eq!(read(&config.output.processed_log_path), "10,\n20,\n40,\n");
    assert_eq!(read(&config.output.errored_log_path), "30,\n");

    assert_eq!(item_state(&config, 10), Some(ItemState::Routed));
    assert_eq!(item_state(&config, 30), Some(ItemState::ExhaustedRetries));
}

#[tokio::test]
async fn test_retries_stop_at_max() {
    let mock_server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let config = create_test_config(&mock_server, dir.path());

    detail_mock(50)
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let summary = run_crawl(config.clone(), "test", RunOptions::default(), &[50])
        .await
        .expect("Crawl failed");

    assert_eq!(summary.exhausted, 1);
    assert_eq!(
        AppendLog::new(&config.output.errored_log_path).read_ids().unwrap(),
        vec![50]
    );
    assert!(read(&config.output.processed_log_path).is_empty());
    assert!(!Path::new(&config.output.base_games_path).exists());
}

#[tokio::test]
async fn test_recovers_after_transient_failures() {
    let mock_server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let config = create_test_config(&mock_server, dir.path());

    // Throttled twice, then answered
    detail_mock(10)
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;
    mount_detail(&mock_server, 10, game_data(10, "Counter-Strike")).await;

    let summary = run_crawl(config.clone(), "test", RunOptions::default(), &[10])
        .await
        .expect("Crawl failed");

    assert_eq!(summary.routed, 1);
    assert!(read(&config.output.errored_log_path).is_empty());

    let storage = SqliteStorage::new(Path::new(&config.output.checkpoint_path)).unwrap();
    let item = storage.get_item(10).unwrap().expect("item missing");
    assert_eq!(item.state, ItemState::Routed);
    assert_eq!(item.attempts, 3);
    assert_eq!(item.kind.as_deref(), Some("game"));
}

#[tokio::test]
async fn test_no_data_is_not_retried() {
    let mock_server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let config = create_test_config(&mock_server, dir.path());

    detail_mock(60)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "60": { "success": false } })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let summary = run_crawl(config.clone(), "test", RunOptions::default(), &[60])
        .await
        .expect("Crawl failed");

    assert_eq!(summary.skipped, 1);
    assert!(read(&config.output.errored_log_path).is_empty());
    assert!(read(&config.output.processed_log_path).is_empty());
    assert_eq!(item_state(&config, 60), Some(ItemState::Skipped));
}

#[tokio::test]
async fn test_orphan_dlc_writes_nothing() {
    let mock_server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let config = create_test_config(&mock_server, dir.path());

    mount_detail(
        &mock_server,
        20,
        json!({ "type": "DLC", "steam_appid": 20, "name": "Lost Pack", "fullgame": { "appid": "" } }),
    )
    .await;
    mount_detail(&mock_server, 80, json!({ "type": "music", "steam_appid": 80 })).await;

    let summary = run_crawl(config.clone(), "test", RunOptions::default(), &[20, 80])
        .await
        .expect("Crawl failed");

    assert_eq!(summary.skipped, 2);
    assert!(!Path::new(&config.output.dlcs_path).exists());
    assert!(!Path::new(&config.output.base_games_path).exists());
    assert!(read(&config.output.processed_log_path).is_empty());
    assert!(read(&config.output.errored_log_path).is_empty());
}

#[tokio::test]
async fn test_resume_skips_finished_ids() {
    let mock_server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let config = create_test_config(&mock_server, dir.path());

    detail_mock(10)
        .respond_with(
            ResponseTemplate::new(200).set_body_json(detail_body(10, game_data(10, "Counter-Strike"))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let first = run_crawl(config.clone(), "test", RunOptions::default(), &[10, 10])
        .await
        .expect("First crawl failed");
    assert_eq!(first.routed, 1);
    assert_eq!(first.already_done, 1);
    assert_eq!(first.fetched(), 1);

    let second = run_crawl(config.clone(), "test", RunOptions::default(), &[10])
        .await
        .expect("Second crawl failed");
    assert_eq!(second.routed, 0);
    assert_eq!(second.already_done, 1);
    assert_eq!(second.fetched(), 0);

    assert_eq!(read(&config.output.base_games_path).lines().count(), 2);
    assert_eq!(read(&config.output.processed_log_path), "10,\n");

    let storage = SqliteStorage::new(Path::new(&config.output.checkpoint_path)).unwrap();
    let latest = storage.get_latest_run().unwrap().expect("no run recorded");
    assert_eq!(latest.config_hash, "test");
    assert!(latest.finished_at.is_some());
}

#[tokio::test]
async fn test_retry_failed_refetches_exhausted_ids() {
    let mock_server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let mut config = create_test_config(&mock_server, dir.path());
    config.crawler.max_retries = 2;

    detail_mock(70)
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;
    mount_detail(&mock_server, 70, game_data(70, "Eventually")).await;

    let first = run_crawl(config.clone(), "test", RunOptions::default(), &[70])
        .await
        .expect("First crawl failed");
    assert_eq!(first.exhausted, 1);

    let resumed = run_crawl(config.clone(), "test", RunOptions::default(), &[70])
        .await
        .expect("Resumed crawl failed");
    assert_eq!(resumed.already_done, 1);

    let options = RunOptions {
        retry_failed: true,
        ..RunOptions::default()
    };
    let retried = run_crawl(config.clone(), "test", options, &[70])
        .await
        .expect("Retry crawl failed");
    assert_eq!(retried.routed, 1);

    assert_eq!(item_state(&config, 70), Some(ItemState::Routed));
    assert_eq!(read(&config.output.errored_log_path), "70,\n");
    assert_eq!(read(&config.output.processed_log_path), "70,\n");
}

#[tokio::test]
async fn test_fresh_run_fetches_again() {
    let mock_server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let config = create_test_config(&mock_server, dir.path());

    detail_mock(10)
        .respond_with(
            ResponseTemplate::new(200).set_body_json(detail_body(10, game_data(10, "Counter-Strike"))),
        )
        .expect(2)
        .mount(&mock_server)
        .await;

    run_crawl(config.clone(), "test", RunOptions::default(), &[10])
        .await
        .expect("First crawl failed");

    let options = RunOptions {
        fresh: true,
        ..RunOptions::default()
    };
    let summary = run_crawl(config.clone(), "test", options, &[10])
        .await
        .expect("Fresh crawl failed");

    assert_eq!(summary.routed, 1);
    // Tables are append-only; the header is still written once
    assert_eq!(read(&config.output.base_games_path).lines().count(), 3);
}

#[tokio::test]
async fn test_app_list_job() {
    let mock_server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let config = create_test_config(&mock_server, dir.path());

    Mock::given(method("GET"))
        .and(path(APP_LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "applist": {
                "apps": [
                    { "appid": 10, "name": "Counter-Strike" },
                    { "appid": 20, "name": "Team Fortress Classic" },
                    { "appid": 30, "name": "Day of Defeat" }
                ]
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let count = harvest_app_list(&config).await.expect("App list job failed");
    assert_eq!(count, 3);

    let ids = read_identifiers(Path::new(&config.output.app_list_path), "appid").unwrap();
    assert_eq!(ids, vec![10, 20, 30]);
}

#[tokio::test]
async fn test_app_list_job_reports_http_errors() {
    let mock_server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let config = create_test_config(&mock_server, dir.path());

    Mock::given(method("GET"))
        .and(path(APP_LIST_PATH))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    assert!(harvest_app_list(&config).await.is_err());
    assert!(!Path::new(&config.output.app_list_path).exists());
}

#[tokio::test]
async fn test_mistyped_field_is_still_routed() {
    let mock_server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let config = create_test_config(&mock_server, dir.path());

    detail_mock(10)
        .respond_with(ResponseTemplate::new(200).set_body_json(detail_body(
            10,
            json!({
                "type": "game",
                "steam_appid": 10,
                "name": "Counter-Strike",
                "metacritic": { "score": "88" }
            }),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let summary = run_crawl(config.clone(), "test", RunOptions::default(), &[10])
        .await
        .expect("Crawl failed");

    assert_eq!(summary.routed, 1);
    assert_eq!(summary.exhausted, 0);
    assert!(read(&config.output.errored_log_path).is_empty());
    assert_eq!(
        read(&config.output.base_games_path).lines().nth(1),
        Some("10,Counter-Strike,False,False,False,N/A,False,False,False,N/A,N/A,N/A,0")
    );
}

#[tokio::test]
async fn test_delays_between_attempts_and_ids() {
    let mock_server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let mut config = create_test_config(&mock_server, dir.path());
    config.crawler.retry_delay_ms = 50;
    config.crawler.pacing_delay_ms = 40;

    detail_mock(50)
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;
    detail_mock(10)
        .respond_with(
            ResponseTemplate::new(200).set_body_json(detail_body(10, game_data(10, "Counter-Strike"))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let start = std::time::Instant::now();
    let summary = run_crawl(config.clone(), "test", RunOptions::default(), &[50, 10])
        .await
        .expect("Crawl failed");
    let elapsed = start.elapsed();

    assert_eq!(summary.exhausted, 1);
    assert_eq!(summary.routed, 1);

    // Two waits between the three attempts on 50, plus a pause after each id
    let minimum = Duration::from_millis(2 * 50 + 2 * 40);
    assert!(elapsed >= minimum, "crawl took {:?}, expected at least {:?}", elapsed, minimum);
}

#[tokio::test]
async fn test_output_write_fault_leaves_id_pending() {
    let mock_server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let mut config = create_test_config(&mock_server, dir.path());
    let good_path = config.output.base_games_path.clone();
    config.output.base_games_path = dir
        .path()
        .join("missing")
        .join("base_games.csv")
        .to_string_lossy()
        .into_owned();

    detail_mock(10)
        .respond_with(
            ResponseTemplate::new(200).set_body_json(detail_body(10, game_data(10, "Counter-Strike"))),
        )
        .expect(2)
        .mount(&mock_server)
        .await;
    mount_detail(
        &mock_server,
        20,
        json!({ "type": "dlc", "steam_appid": 20, "name": "Soundtrack", "fullgame": { "appid": "10" } }),
    )
    .await;

    let first = run_crawl(config.clone(), "test", RunOptions::default(), &[10, 20])
        .await
        .expect("Crawl failed");

    assert_eq!(first.write_failed, 1);
    assert_eq!(first.routed, 1);
    assert_eq!(item_state(&config, 10), Some(ItemState::Pending));
    assert_eq!(item_state(&config, 20), Some(ItemState::Routed));
    assert_eq!(read(&config.output.processed_log_path), "20,\n");
    assert!(read(&config.output.errored_log_path).is_empty());

    // Once the table is writable, a plain re-run picks the id up again
    config.output.base_games_path = good_path;
    let second = run_crawl(config.clone(), "test", RunOptions::default(), &[10, 20])
        .await
        .expect("Second crawl failed");

    assert_eq!(second.routed, 1);
    assert_eq!(second.already_done, 1);
    assert_eq!(item_state(&config, 10), Some(ItemState::Routed));
    assert_eq!(read(&config.output.processed_log_path), "20,\n10,\n");
}

#[tokio::test]
async fn test_retry_failed_refetches_no_data_ids() {
    let mock_server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let config = create_test_config(&mock_server, dir.path());

    detail_mock(60)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "60": { "success": false } })))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    mount_detail(&mock_server, 60, game_data(60, "Released Later")).await;

    let first = run_crawl(config.clone(), "test", RunOptions::default(), &[60])
        .await
        .expect("First crawl failed");
    assert_eq!(first.skipped, 1);

    let resumed = run_crawl(config.clone(), "test", RunOptions::default(), &[60])
        .await
        .expect("Resumed crawl failed");
    assert_eq!(resumed.already_done, 1);
    assert_eq!(resumed.fetched(), 0);

    let options = RunOptions {
        retry_failed: true,
        ..RunOptions::default()
    };
    let retried = run_crawl(config.clone(), "test", options, &[60])
        .await
        .expect("Retry crawl failed");

    assert_eq!(retried.routed, 1);
    assert_eq!(item_state(&config, 60), Some(ItemState::Routed));
}
