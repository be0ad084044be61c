//! Runtime configuration for the Squad Arena server.

use once_cell::sync::Lazy;
use std::env;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Bootstrap password that promotes whoever logs in with it to admin.
    /// `None` disables the bootstrap path entirely.
    pub admin_secret: Option<String>,
    /// External ids that receive the admin role when they register.
    pub admin_ids: Vec<String>,
    /// New squads start out approved instead of pending.
    pub auto_approve_squads: bool,
    /// Only approved members may post to their squad chat.
    pub chat_requires_approval: bool,
    /// How many chat messages the dashboard shows.
    pub chat_display_limit: usize,
    /// Session TTL (seconds).
    pub session_ttl: u64,
    /// Sum rows of the same team when rendering the leaderboard.
    pub merge_standings: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            admin_secret: None,
            admin_ids: Vec::new(),
            auto_approve_squads: false,
            chat_requires_approval: true,
            chat_display_limit: 15,
            session_ttl: 24 * 3_600,
            merge_standings: false,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let defaults = Settings::default();

        let admin_secret = env::var("ADMIN_SECRET").ok().filter(|s| !s.is_empty());

        let admin_ids = env::var("ADMIN_IDS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let chat_display_limit = env::var("CHAT_DISPLAY_LIMIT")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults.chat_display_limit);

        let session_ttl = env::var("SESSION_TTL")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.session_ttl);

        Settings {
            admin_secret,
            admin_ids,
            auto_approve_squads: flag("AUTO_APPROVE_SQUADS", defaults.auto_approve_squads),
            chat_requires_approval: flag("CHAT_REQUIRES_APPROVAL", defaults.chat_requires_approval),
            chat_display_limit,
            session_ttl,
            merge_standings: flag("LEADERBOARD_MERGE_TEAMS", defaults.merge_standings),
        }
    }

    /// Whether `external_id` is pre-authorised as an admin.
    pub fn is_admin_id(&self, external_id: &str) -> bool {
        self.admin_ids.iter().any(|id| id == external_id)
    }
}

fn flag(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

static SETTINGS: Lazy<Settings> = Lazy::new(Settings::from_env);

pub fn settings() -> &'static Settings {
    &SETTINGS
}
