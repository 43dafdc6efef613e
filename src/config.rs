use crate::error::{AppError, Result};
use crate::types::RosterEntry;

pub const PROFILE_URL_BASE: &str = "https://csstats.gg/pt-BR/player";

/// Query string pinning the profile page to the current Premier season.
pub const PROFILE_URL_SUFFIX: &str = "?modes=Premier%20-%20Season%203#/";

/// Realistic desktop Chrome user-agent set on every page to avoid the
/// headless default giving the session away.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fixed wait after navigation for the interstitial bot challenge to
/// resolve client-side (seconds). A heuristic, not a confirmation — the
/// extractor must tolerate still-blocked markup.
pub const CHALLENGE_WAIT_SECS: u64 = 12;

/// Delay between sequential roster acquisitions (seconds), to stay under
/// the upstream site's abuse-detection threshold.
pub const REFRESH_DELAY_SECS: u64 = 3;

/// Browser navigation timeout (seconds).
pub const NAV_TIMEOUT_SECS: u64 = 60;

/// Number of synthetic daily history points per player.
pub const HISTORY_POINTS: usize = 20;

/// Squad roster, fixed at deploy time. Changing it means redeploying.
pub const DEFAULT_ROSTER: &[(&str, &str)] = &[
    ("76561199526211781", "JohnGOD"),
    ("76561199553832372", "Bielzin da ZL"),
    ("76561198396424299", "Caga Tronco"),
    ("76561198143046972", "OREIA SECA"),
    ("76561198117500081", "Silos Malafaio"),
];

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    /// Path of the persisted squad JSON document (DATA_PATH).
    pub data_path: String,
    pub api_port: u16,
    pub profile_url_base: String,
    pub challenge_wait_secs: u64,
    pub refresh_delay_secs: u64,
    pub nav_timeout_secs: u64,
    pub roster: Vec<RosterEntry>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            data_path: std::env::var("DATA_PATH").unwrap_or_else(|_| "squad.json".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            profile_url_base: std::env::var("PROFILE_URL_BASE")
                .unwrap_or_else(|_| PROFILE_URL_BASE.to_string()),
            challenge_wait_secs: std::env::var("CHALLENGE_WAIT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(CHALLENGE_WAIT_SECS),
            refresh_delay_secs: std::env::var("REFRESH_DELAY_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(REFRESH_DELAY_SECS),
            nav_timeout_secs: std::env::var("NAV_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(NAV_TIMEOUT_SECS),
            roster: DEFAULT_ROSTER
                .iter()
                .map(|&(steam_id, label)| RosterEntry {
                    steam_id: steam_id.to_string(),
                    label: label.to_string(),
                })
                .collect(),
        })
    }

    pub fn profile_url(&self, steam_id: &str) -> String {
        format!("{}/{steam_id}{PROFILE_URL_SUFFIX}", self.profile_url_base)
    }
}
