//! Match configuration singleton and the leaderboard built from it.

use crate::db::models::{ConfigPatch, MatchConfig, Standing};
use crate::db::Store;
use crate::error::{ArenaError, Result};

/// Return the singleton, creating it with defaults if it does not exist yet.
pub async fn get_or_create(store: &dyn Store) -> Result<MatchConfig> {
    Ok(store.ensure_config().await?)
}

/// Overwrite only the supplied fields.
pub async fn update(store: &dyn Store, patch: &ConfigPatch) -> Result<MatchConfig> {
    let cfg = store.update_config(patch).await?;
    log::info!("match config updated (version {})", cfg.version);
    Ok(cfg)
}

/// Append a standings row. Rows are never merged in storage.
pub async fn add_standing(store: &dyn Store, team_name: &str, points: i32) -> Result<()> {
    let team_name = team_name.trim();
    if team_name.is_empty() {
        return Err(ArenaError::invalid("team name is required"));
    }
    store
        .push_standing(Standing {
            team_name: team_name.to_string(),
            points,
        })
        .await?;
    Ok(())
}

pub async fn reset_standings(store: &dyn Store) -> Result<()> {
    store.clear_standings().await?;
    log::info!("standings reset");
    Ok(())
}

/// Standings ordered by points descending; equal points keep insertion order.
///
/// With `merge_teams`, rows sharing a team name are summed first (keeping the
/// position of the team's first row for tie-breaks).
pub fn leaderboard_view(config: &MatchConfig, merge_teams: bool) -> Vec<Standing> {
    let mut rows: Vec<Standing> = if merge_teams {
        let mut merged: Vec<Standing> = Vec::new();
        for s in &config.standings {
            match merged.iter_mut().find(|m| m.team_name == s.team_name) {
                Some(m) => m.points = m.points.saturating_add(s.points),
                None => merged.push(s.clone()),
            }
        }
        merged
    } else {
        config.standings.clone()
    };

    // `sort_by` is stable.
    rows.sort_by(|a, b| b.points.cmp(&a.points));
    rows
}
