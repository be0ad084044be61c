//! Match config singleton and leaderboard ordering.

use squad_arena_server::{
    db::{
        models::{ConfigPatch, MatchConfig, Standing},
        MemoryStore,
    },
    match_config::{self, leaderboard_view},
    ArenaError,
};

fn row(team: &str, points: i32) -> Standing {
    Standing {
        team_name: team.into(),
        points,
    }
}

fn config_with(standings: Vec<Standing>) -> MatchConfig {
    MatchConfig {
        standings,
        ..MatchConfig::default()
    }
}

#[tokio::test]
async fn repeated_teams_are_not_merged() {
    let store = MemoryStore::new();
    match_config::add_standing(&store, "Alpha", 10).await.unwrap();
    match_config::add_standing(&store, "Beta", 25).await.unwrap();
    match_config::add_standing(&store, "Alpha", 5).await.unwrap();

    let cfg = match_config::get_or_create(&store).await.unwrap();
    assert_eq!(cfg.standings.len(), 3);
    assert_eq!(
        leaderboard_view(&cfg, false),
        vec![row("Beta", 25), row("Alpha", 10), row("Alpha", 5)]
    );
}

#[test]
fn ties_keep_insertion_order() {
    let cfg = config_with(vec![
        row("A", 5),
        row("B", 9),
        row("C", 5),
        row("D", 9),
        row("E", 5),
    ]);
    assert_eq!(
        leaderboard_view(&cfg, false),
        vec![row("B", 9), row("D", 9), row("A", 5), row("C", 5), row("E", 5)]
    );
}

#[test]
fn merge_flag_sums_rows_per_team() {
    let cfg = config_with(vec![row("Alpha", 10), row("Beta", 12), row("Alpha", 5)]);
    assert_eq!(
        leaderboard_view(&cfg, true),
        vec![row("Alpha", 15), row("Beta", 12)]
    );
    // storage is untouched
    assert_eq!(cfg.standings.len(), 3);
}

#[tokio::test]
async fn reset_clears_standings() {
    let store = MemoryStore::new();
    match_config::add_standing(&store, "Alpha", 10).await.unwrap();
    match_config::reset_standings(&store).await.unwrap();

    let cfg = match_config::get_or_create(&store).await.unwrap();
    assert!(cfg.standings.is_empty());
    assert!(leaderboard_view(&cfg, false).is_empty());
}

#[tokio::test]
async fn get_or_create_returns_the_same_singleton() {
    let store = MemoryStore::new();
    let first = match_config::get_or_create(&store).await.unwrap();
    let second = match_config::get_or_create(&store).await.unwrap();

    assert_eq!(first.announcement, "Welcome to the tournament!");
    assert_eq!(first.room_id, "TBA");
    assert_eq!(first.live_stream_url, None);
    // reads never bump the version
    assert_eq!(first.version, second.version);
}

#[tokio::test]
async fn update_only_touches_supplied_fields() {
    let store = MemoryStore::new();
    let before = match_config::get_or_create(&store).await.unwrap();

    let after = match_config::update(
        &store,
        &ConfigPatch {
            room_id: Some("1234567".into()),
            live_stream_url: Some(Some("https://youtu.be/live".into())),
            ..ConfigPatch::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(after.room_id, "1234567");
    assert_eq!(after.room_pass, before.room_pass);
    assert_eq!(after.announcement, before.announcement);
    assert_eq!(after.live_stream_url.as_deref(), Some("https://youtu.be/live"));
    assert!(after.version > before.version);

    let cleared = match_config::update(
        &store,
        &ConfigPatch {
            live_stream_url: Some(None),
            ..ConfigPatch::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(cleared.live_stream_url, None);
    assert_eq!(cleared.room_id, "1234567");
}

#[tokio::test]
async fn blank_team_name_is_invalid() {
    let store = MemoryStore::new();
    let res = match_config::add_standing(&store, " ", 3).await;
    assert!(matches!(res, Err(ArenaError::Invalid(_))));
}
