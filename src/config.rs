//! Run configuration.
//!
//! Configuration is read once at startup and passed explicitly into every
//! component that needs it; nothing performs ambient lookups mid-run. All
//! options come from `VERSEBOT_*` environment variables with defaults.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Duration as ChronoDuration;

use crate::types::UserId;

/// Default pacing delay between remote calls, in seconds.
const DEFAULT_SLEEP_SECS: f64 = 0.4;

/// Default auto-reply delay gating fan-out to authors, in seconds (one day).
const DEFAULT_AUTO_REPLY_DELAY_SECS: i64 = 86_400;

/// Default compose worker count (sequential).
const DEFAULT_PROCESSES: usize = 1;

/// Default cache store location.
const DEFAULT_CACHE_PATH: &str = "used_cache.json";

/// Default API endpoint.
const DEFAULT_API_BASE: &str = "https://api.vk.com/method";

/// Immutable run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Composition style override. `None`, `"random"`, or an unrecognized
    /// name all mean "pick uniformly at random per message".
    pub style: Option<String>,

    /// Enables fan-out to the authors whose fragments a composition reuses.
    pub spam_mode: bool,

    /// Minimum idle time since an author's last cache mutation before they
    /// qualify for fan-out.
    pub auto_reply_delay: ChronoDuration,

    /// Admin/test user ids. Testers always receive fan-out deliveries and may
    /// issue cache-reset commands.
    pub tester_ids: BTreeSet<UserId>,

    /// Compose worker pool size. `1` runs the compose phase sequentially.
    pub processes: usize,

    /// Fixed pacing delay between successive remote calls.
    pub sleep: Duration,

    /// Where the uniqueness cache persists between runs.
    pub cache_path: PathBuf,

    /// The community whose followers and dialogs this bot serves.
    pub community_id: i64,

    /// Platform API token.
    pub access_token: String,

    /// Platform API endpoint.
    pub api_base: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            style: None,
            spam_mode: false,
            auto_reply_delay: ChronoDuration::seconds(DEFAULT_AUTO_REPLY_DELAY_SECS),
            tester_ids: BTreeSet::new(),
            processes: DEFAULT_PROCESSES,
            sleep: Duration::from_secs_f64(DEFAULT_SLEEP_SECS),
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            community_id: 0,
            access_token: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl Config {
    /// Builds a `Config` from `VERSEBOT_*` environment variables.
    ///
    /// Recognized variables:
    /// - `VERSEBOT_STYLE` — style name or `random`
    /// - `VERSEBOT_SPAM_MODE` — `1`/`true` enables author fan-out
    /// - `VERSEBOT_AUTO_REPLY_DELAY_SECS`
    /// - `VERSEBOT_TESTER_IDS` — comma-separated user ids
    /// - `VERSEBOT_PROCESSES`
    /// - `VERSEBOT_SLEEP_SECS` — fractional seconds
    /// - `VERSEBOT_CACHE_PATH`
    /// - `VERSEBOT_COMMUNITY_ID`
    /// - `VERSEBOT_ACCESS_TOKEN`
    /// - `VERSEBOT_API_BASE`
    ///
    /// Unset or unparseable values fall back to defaults.
    pub fn from_env() -> Self {
        let defaults = Config::default();

        Config {
            style: std::env::var("VERSEBOT_STYLE").ok(),
            spam_mode: std::env::var("VERSEBOT_SPAM_MODE")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.spam_mode),
            auto_reply_delay: std::env::var("VERSEBOT_AUTO_REPLY_DELAY_SECS")
                .ok()
                .and_then(|s| s.parse::<i64>().ok())
                .map(ChronoDuration::seconds)
                .unwrap_or(defaults.auto_reply_delay),
            tester_ids: std::env::var("VERSEBOT_TESTER_IDS")
                .map(|s| parse_id_list(&s))
                .unwrap_or(defaults.tester_ids),
            processes: std::env::var("VERSEBOT_PROCESSES")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .filter(|&n| n > 0)
                .unwrap_or(defaults.processes),
            sleep: std::env::var("VERSEBOT_SLEEP_SECS")
                .ok()
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|s| s.is_finite() && *s >= 0.0)
                .map(Duration::from_secs_f64)
                .unwrap_or(defaults.sleep),
            cache_path: std::env::var("VERSEBOT_CACHE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_path),
            community_id: std::env::var("VERSEBOT_COMMUNITY_ID")
                .ok()
                .and_then(|s| s.parse::<i64>().ok())
                .unwrap_or(defaults.community_id),
            access_token: std::env::var("VERSEBOT_ACCESS_TOKEN").unwrap_or(defaults.access_token),
            api_base: std::env::var("VERSEBOT_API_BASE").unwrap_or(defaults.api_base),
        }
    }
}

/// Parses a comma-separated id list, skipping malformed entries.
fn parse_id_list(raw: &str) -> BTreeSet<UserId> {
    raw.split(',')
        .filter_map(|part| part.trim().parse::<i64>().ok())
        .map(UserId)
        .collect()
}
