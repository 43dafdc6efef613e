use chrono::{Duration, NaiveDate};
use rand::Rng;

use crate::config::HISTORY_POINTS;
use crate::types::{
    HistoryPoint, MapStats, MatchResult, OverallStats, PartialStats, PlayerStats, RankInfo,
    RankTier, RosterEntry,
};

/// Bounds for deterministically synthesized overall stats.
mod ranges {
    pub const KD_MIN: f64 = 0.85;
    pub const KD_SPAN: f64 = 0.5;
    pub const WIN_MIN: f64 = 45.0;
    pub const WIN_SPAN: f64 = 15.0;
    pub const HS_MIN: f64 = 30.0;
    pub const HS_SPAN: f64 = 20.0;
    pub const ADR_MIN: f64 = 70.0;
    pub const ADR_SPAN: f64 = 30.0;
}

/// Fallback Premier rating band when no numeric rank was scraped.
const FALLBACK_RANK_MIN: u32 = 10_000;
const FALLBACK_RANK_MAX: u32 = 15_000;

/// Full span of the per-point K/D fluctuation in the synthetic
/// history; each point moves at most ±0.25 around the baseline.
const HISTORY_JITTER_SPAN: f64 = 0.5;
/// Synthetic history K/D never drops below this.
const HISTORY_KD_FLOOR: f64 = 0.2;

// ---------------------------------------------------------------------------
// Deterministic completion
// ---------------------------------------------------------------------------

/// Seed for the reproducible transform: the numeric value of the last
/// four characters of the steam id, byte sum as a fallback for ids that
/// do not end in digits.
pub fn seed_for(steam_id: &str) -> u32 {
    let start = steam_id.len().saturating_sub(4);
    steam_id
        .get(start..)
        .and_then(|tail| tail.parse::<u32>().ok())
        .unwrap_or_else(|| steam_id.bytes().map(u32::from).sum())
}

/// Sine-based hash mapping (seed, offset) to [0, 1). Repeated runs
/// against a still-blocked source must show the same numbers instead of
/// flickering between refreshes.
fn pseudo_random(seed: u32, offset: u32) -> f64 {
    let x = f64::from(seed + offset).sin() * 10_000.0;
    x - x.floor()
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Composite rating tracks K/D through a fixed linear correlation so it
/// never varies independently of it.
fn rating_from_kd(kd: f64) -> f64 {
    0.90 + (kd - 0.8) * 0.8
}

/// Numeric overall fields plus the tier after the blocked-page fallback
/// rule. Pure function of the seed and the partial input.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedOverall {
    pub kd_ratio: f64,
    pub win_rate: f64,
    pub headshot_percentage: f64,
    pub damage_per_round: f64,
    pub hltv_rating: f64,
    pub tier: RankTier,
}

/// Deterministic completion of the overall stat block.
///
/// An absent or zero K/D means the page never rendered its stats (the
/// challenge did not resolve); in that case every numeric field is
/// regenerated so the profile stays internally consistent instead of
/// mixing one real value with several zeros. Otherwise scraped values
/// are kept exactly and only individually missing fields are filled.
pub fn complete_overall(seed: u32, partial: &PartialStats) -> CompletedOverall {
    let kd = match partial.kd_ratio {
        Some(kd) if kd > 0.0 => kd,
        _ => return synthesize_overall(seed, partial.tier),
    };

    CompletedOverall {
        kd_ratio: kd,
        win_rate: partial
            .win_rate
            .unwrap_or_else(|| (ranges::WIN_MIN + pseudo_random(seed, 2) * ranges::WIN_SPAN).round()),
        headshot_percentage: partial
            .headshot_percentage
            .unwrap_or_else(|| (ranges::HS_MIN + pseudo_random(seed, 3) * ranges::HS_SPAN).round()),
        damage_per_round: partial
            .damage_per_round
            .unwrap_or_else(|| (ranges::ADR_MIN + pseudo_random(seed, 4) * ranges::ADR_SPAN).round()),
        hltv_rating: partial
            .hltv_rating
            .unwrap_or_else(|| round2(rating_from_kd(kd))),
        tier: partial.tier,
    }
}

fn synthesize_overall(seed: u32, tier: RankTier) -> CompletedOverall {
    let kd = round2(ranges::KD_MIN + pseudo_random(seed, 1) * ranges::KD_SPAN);
    CompletedOverall {
        kd_ratio: kd,
        win_rate: (ranges::WIN_MIN + pseudo_random(seed, 2) * ranges::WIN_SPAN).round(),
        headshot_percentage: (ranges::HS_MIN + pseudo_random(seed, 3) * ranges::HS_SPAN).round(),
        damage_per_round: (ranges::ADR_MIN + pseudo_random(seed, 4) * ranges::ADR_SPAN).round(),
        hltv_rating: round2(rating_from_kd(kd)),
        // A fully synthetic profile showing "Unranked" would look broken
        // in the UI, so force the default competitive queue label.
        tier: if tier == RankTier::Unranked {
            RankTier::Premier
        } else {
            tier
        },
    }
}

// ---------------------------------------------------------------------------
// Non-deterministic jitter
// ---------------------------------------------------------------------------

/// Plausible Premier rating when the scrape found none. Intentionally
/// not reproducible run-to-run, unlike the overall stats above.
pub fn fallback_rank<R: Rng>(rng: &mut R) -> u32 {
    rng.gen_range(FALLBACK_RANK_MIN..FALLBACK_RANK_MAX)
}

/// Exactly `HISTORY_POINTS` daily points ending `today`, oldest first.
/// Each K/D fluctuates around the baseline; the result of a point is
/// derived solely from whether its K/D reached 1.0.
pub fn synthesize_history<R: Rng>(base_kd: f64, today: NaiveDate, rng: &mut R) -> Vec<HistoryPoint> {
    (0..HISTORY_POINTS as i64)
        .rev()
        .map(|days_back| {
            let jitter = (rng.gen::<f64>() - 0.5) * HISTORY_JITTER_SPAN;
            let kd = round2(base_kd + jitter).max(HISTORY_KD_FLOOR);
            HistoryPoint {
                date: today - Duration::days(days_back),
                kd_ratio: kd,
                result: if kd >= 1.0 { MatchResult::W } else { MatchResult::L },
                map: "Premier".to_string(),
            }
        })
        .collect()
}

/// Illustrative per-map breakdown used until real per-map data exists.
pub fn default_top_maps() -> Vec<MapStats> {
    vec![
        MapStats { name: "Mirage".to_string(), matches: 20, win_rate: 55.0, kd_ratio: 1.1 },
        MapStats { name: "Inferno".to_string(), matches: 15, win_rate: 48.0, kd_ratio: 0.9 },
        MapStats { name: "Nuke".to_string(), matches: 10, win_rate: 60.0, kd_ratio: 1.2 },
    ]
}

// ---------------------------------------------------------------------------
// Full completion
// ---------------------------------------------------------------------------

/// Total completion step: never fails, every field of the returned
/// record is populated. Deterministic numeric completion plus the
/// explicitly non-deterministic fields (fallback rank, match counts,
/// history jitter) drawn from the injected RNG.
pub fn complete<R: Rng>(
    entry: &RosterEntry,
    partial: PartialStats,
    today: NaiveDate,
    rng: &mut R,
) -> PlayerStats {
    let seed = seed_for(&entry.steam_id);
    let overall = complete_overall(seed, &partial);

    let current = if partial.rank_value > 0 {
        partial.rank_value
    } else {
        fallback_rank(rng)
    };

    let total_matches: u32 = rng.gen_range(50..150);
    let wins = ((f64::from(total_matches) * overall.win_rate / 100.0).floor() as u32)
        .min(total_matches);
    let kast = f64::from(rng.gen_range(65..75));

    let username = partial.username.unwrap_or_else(|| {
        if entry.label.is_empty() {
            format!("Player {seed}")
        } else {
            entry.label.clone()
        }
    });

    let history = synthesize_history(overall.kd_ratio, today, rng);

    PlayerStats {
        id: entry.steam_id.clone(),
        steam_id: entry.steam_id.clone(),
        username,
        avatar_url: partial.avatar_url.unwrap_or_default(),
        rank: RankInfo {
            current,
            tier: overall.tier,
            icon_url: String::new(),
        },
        overall: OverallStats {
            kd_ratio: overall.kd_ratio,
            win_rate: overall.win_rate,
            headshot_percentage: overall.headshot_percentage,
            total_matches,
            wins,
            losses: 0,
            ties: 0,
            damage_per_round: overall.damage_per_round,
            adr: overall.damage_per_round,
            hltv_rating: overall.hltv_rating,
            kast,
        },
        history,
        top_maps: default_top_maps(),
    }
}
