use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// One tracked squad member. The roster is fixed at deploy time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub steam_id: String,
    pub label: String,
}

// ---------------------------------------------------------------------------
// Rank
// ---------------------------------------------------------------------------

/// CS2 rating tier. Color tiers come from marker classes on the rating
/// badge; a positive numeric Premier rating supersedes any of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankTier {
    #[default]
    Unranked,
    Blue,
    Purple,
    Pink,
    Red,
    Gold,
    Premier,
}

impl std::fmt::Display for RankTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RankTier::Unranked => "Unranked",
            RankTier::Blue => "Blue",
            RankTier::Purple => "Purple",
            RankTier::Pink => "Pink",
            RankTier::Red => "Red",
            RankTier::Gold => "Gold",
            RankTier::Premier => "Premier",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankInfo {
    /// Premier-style numeric rating, e.g. 15000. Zero means the value was
    /// never positively determined and was replaced by a synthetic one.
    pub current: u32,
    pub tier: RankTier,
    pub icon_url: String,
}

// ---------------------------------------------------------------------------
// PlayerStats — the canonical persisted/served record
// ---------------------------------------------------------------------------

/// Aggregate performance snapshot. Every field is always populated —
/// the dashboard assumes completeness and renders all of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub kd_ratio: f64,
    /// Percentage, 0-100.
    pub win_rate: f64,
    /// Percentage, 0-100.
    pub headshot_percentage: f64,
    pub total_matches: u32,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub damage_per_round: f64,
    /// Mirrors `damage_per_round` in the persisted document.
    pub adr: f64,
    /// Composite performance rating, correlated with K/D when synthesized.
    pub hltv_rating: f64,
    /// Kill/Assist/Survive/Trade percentage, 0-100.
    pub kast: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchResult {
    W,
    L,
    T,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub kd_ratio: f64,
    pub result: MatchResult,
    pub map: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapStats {
    pub name: String,
    pub matches: u32,
    pub win_rate: f64,
    pub kd_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub id: String,
    pub steam_id: String,
    pub username: String,
    pub avatar_url: String,
    pub rank: RankInfo,
    pub overall: OverallStats,
    /// Oldest first, one synthetic point per day, fixed length.
    pub history: Vec<HistoryPoint>,
    pub top_maps: Vec<MapStats>,
}

// ---------------------------------------------------------------------------
// PartialStats — extractor output
// ---------------------------------------------------------------------------

/// Whatever the extractor could locate on the rendered profile page.
/// Absent fields stay `None` — defaulting is the synthesizer's job.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialStats {
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub tier: RankTier,
    /// Zero when no numeric rating was found.
    pub rank_value: u32,
    pub kd_ratio: Option<f64>,
    pub headshot_percentage: Option<f64>,
    pub win_rate: Option<f64>,
    pub damage_per_round: Option<f64>,
    pub hltv_rating: Option<f64>,
}
