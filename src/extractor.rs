use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::types::{PartialStats, RankTier};

/// Marker substrings on the rating badge's class attribute, lowest tier
/// first so a later, higher-precedence match overwrites an earlier one.
const TIER_MARKERS: &[(&str, RankTier)] = &[
    ("rare", RankTier::Blue),
    ("mythical", RankTier::Purple),
    ("legendary", RankTier::Pink),
    ("ancient", RankTier::Red),
    ("golden", RankTier::Gold),
];

/// Best-effort extraction of known stat fields from rendered markup.
/// Absent fields are omitted, never defaulted — the synthesizer decides
/// what to do about them. No retries, no blocked-page judgment here.
pub trait Extract {
    fn extract(&self, markup: &str) -> Result<PartialStats>;
}

/// Parses csstats.gg profile markup. The label-proximity heuristics are
/// coupled to that site's markup and live only behind this type.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsPageExtractor;

impl Extract for StatsPageExtractor {
    fn extract(&self, markup: &str) -> Result<PartialStats> {
        let document = Html::parse_document(markup);
        let mut partial = PartialStats::default();

        let name_sel = sel("#player-name")?;
        partial.username = document
            .select(&name_sel)
            .next()
            .map(|el| collect_text(&el))
            .filter(|t| !t.is_empty());

        let avatar_sel = sel("#player-avatar img")?;
        partial.avatar_url = document
            .select(&avatar_sel)
            .next()
            .and_then(|el| el.value().attr("src"))
            .map(str::to_string);

        let rank_sel = sel(".rank .cs2rating span")?;
        partial.rank_value = document
            .select(&rank_sel)
            .next()
            .map(|el| collect_text(&el).replace(',', ""))
            .and_then(|t| t.parse::<u32>().ok())
            .unwrap_or(0);

        let badge_sel = sel(".cs2rating")?;
        if let Some(badge) = document.select(&badge_sel).next() {
            let classes = badge.value().attr("class").unwrap_or("");
            for &(marker, tier) in TIER_MARKERS {
                if classes.contains(marker) {
                    partial.tier = tier;
                }
            }
        }
        // The site's convention: a positive numeric Premier rating
        // supersedes whatever tier badge is shown.
        if partial.rank_value > 0 {
            partial.tier = RankTier::Premier;
        }

        partial.kd_ratio = stat_by_label(&document, "K/D")?;
        partial.headshot_percentage = stat_by_label(&document, "HS %")?;
        partial.win_rate = stat_by_label(&document, "Win Rate")?;
        partial.damage_per_round = stat_by_label(&document, "ADR")?;
        partial.hltv_rating = stat_by_label(&document, "Rating")?;

        Ok(partial)
    }
}

/// Locate a numeric stat by label proximity: take the *last* div whose
/// text contains the label (earlier occurrences are decorative/legend
/// markup), then read the next sibling element's text. A trailing
/// percent sign is stripped; any parse failure leaves the field absent.
fn stat_by_label(document: &Html, label: &str) -> Result<Option<f64>> {
    let div_sel = sel("div")?;
    let Some(label_el) = document
        .select(&div_sel)
        .filter(|el| el.text().any(|t| t.contains(label)))
        .last()
    else {
        return Ok(None);
    };

    Ok(label_el
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .next()
        .map(|el| collect_text(&el))
        .map(|t| t.trim_end_matches('%').trim().to_string())
        .filter(|t| !t.is_empty())
        .and_then(|t| t.parse::<f64>().ok()))
}

/// All selectors are literals; a parse failure is a programming error
/// but is propagated rather than panicking in the request path.
fn sel(css: &'static str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| AppError::Extract(format!("bad selector `{css}`: {e}")))
}

fn collect_text(el: &ElementRef) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const RENDERED_PROFILE: &str = r#"
        <html><body>
          <div id="player-name"> JohnGOD </div>
          <div id="player-avatar"><img src="https://avatars.example/a.jpg"></div>
          <div class="rank"><div class="cs2rating golden"><span>15,342</span></div></div>
          <div class="legend">
            <div>K/D</div><div>kills per death</div>
          </div>
          <div class="stats">
            <div>K/D</div><div>1.24</div>
            <div>HS %</div><div>47%</div>
            <div>Win Rate</div><div>54%</div>
            <div>ADR</div><div>83.5</div>
            <div>Rating</div><div>1.12</div>
          </div>
        </body></html>"#;

    /// What the page looks like when the interstitial never resolved.
    const BLOCKED_PAGE: &str = r#"
        <html><head><title>Just a moment...</title></head>
        <body><div class="challenge">Checking your browser</div></body></html>"#;

    #[test]
    fn extracts_identity_and_stats() {
        let partial = StatsPageExtractor.extract(RENDERED_PROFILE).unwrap();
        assert_eq!(partial.username.as_deref(), Some("JohnGOD"));
        assert_eq!(
            partial.avatar_url.as_deref(),
            Some("https://avatars.example/a.jpg")
        );
        assert_eq!(partial.rank_value, 15342);
        assert_eq!(partial.kd_ratio, Some(1.24));
        assert_eq!(partial.headshot_percentage, Some(47.0));
        assert_eq!(partial.win_rate, Some(54.0));
        assert_eq!(partial.damage_per_round, Some(83.5));
        assert_eq!(partial.hltv_rating, Some(1.12));
    }

    #[test]
    fn numeric_rank_overrides_tier_marker() {
        // The fixture carries a "golden" marker AND a numeric rating — the
        // rating wins.
        let partial = StatsPageExtractor.extract(RENDERED_PROFILE).unwrap();
        assert_eq!(partial.tier, RankTier::Premier);
    }

    #[test]
    fn tier_marker_without_numeric_rank() {
        let markup = r#"<div class="rank">
            <div class="cs2rating mythical"><span>—</span></div></div>"#;
        let partial = StatsPageExtractor.extract(markup).unwrap();
        assert_eq!(partial.rank_value, 0);
        assert_eq!(partial.tier, RankTier::Purple);
    }

    #[test]
    fn later_marker_takes_precedence() {
        let markup = r#"<div class="rank">
            <div class="cs2rating rare golden"><span>n/a</span></div></div>"#;
        let partial = StatsPageExtractor.extract(markup).unwrap();
        assert_eq!(partial.tier, RankTier::Gold);
    }

    #[test]
    fn last_label_occurrence_wins() {
        // The legend block earlier in the document carries the same label
        // with a non-numeric sibling; the real stat block must win.
        let partial = StatsPageExtractor.extract(RENDERED_PROFILE).unwrap();
        assert_eq!(partial.kd_ratio, Some(1.24));
    }

    #[test]
    fn blocked_page_yields_absent_fields() {
        let partial = StatsPageExtractor.extract(BLOCKED_PAGE).unwrap();
        assert_eq!(partial.username, None);
        assert_eq!(partial.avatar_url, None);
        assert_eq!(partial.rank_value, 0);
        assert_eq!(partial.tier, RankTier::Unranked);
        assert_eq!(partial.kd_ratio, None);
        assert_eq!(partial.headshot_percentage, None);
        assert_eq!(partial.win_rate, None);
        assert_eq!(partial.damage_per_round, None);
        assert_eq!(partial.hltv_rating, None);
    }

    #[test]
    fn non_numeric_sibling_leaves_field_absent() {
        let markup = "<div><div>K/D</div><div>—</div></div>";
        let partial = StatsPageExtractor.extract(markup).unwrap();
        assert_eq!(partial.kd_ratio, None);
    }

    #[test]
    fn missing_sibling_leaves_field_absent() {
        let markup = "<div><div>Win Rate</div></div>";
        let partial = StatsPageExtractor.extract(markup).unwrap();
        assert_eq!(partial.win_rate, None);
    }
}
