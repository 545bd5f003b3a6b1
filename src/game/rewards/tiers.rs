use serde::Serialize;

/// Rating tier. Higher tiers shrink rewards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tier {
    pub name: &'static str,
    pub min_rating: i64,
    pub multiplier: f64,
}

/// Ordered highest threshold first
pub const TIERS: [Tier; 5] = [
    Tier { name: "Legend", min_rating: 3900, multiplier: 0.40 },
    Tier { name: "Grandmaster", min_rating: 2800, multiplier: 0.50 },
    Tier { name: "Master", min_rating: 1600, multiplier: 0.60 },
    Tier { name: "Elite", min_rating: 900, multiplier: 0.70 },
    Tier { name: "Challenger", min_rating: 0, multiplier: 0.80 },
];

/// Highest tier whose threshold `rating` meets. Negative ratings are unranked.
pub fn tier_for(rating: i64) -> Option<&'static Tier> {
    TIERS.iter().find(|tier| rating >= tier.min_rating)
}

pub fn tier_multiplier(rating: i64) -> f64 {
    tier_for(rating).map_or(1.0, |tier| tier.multiplier)
}

/// The tier entered when moving from `before` to `after`, if it is a promotion.
pub fn tier_crossed(before: i64, after: i64) -> Option<&'static Tier> {
    let new = tier_for(after)?;
    match tier_for(before) {
        Some(old) if new.min_rating <= old.min_rating => None,
        _ => Some(new),
    }
}

/// XP cost of one level inside each band, keyed by the last level of the band
const LEVEL_BANDS: [(u32, i64); 3] = [(10, 100), (30, 200), (60, 350)];
const LEVEL_COST_AFTER_BANDS: i64 = 500;

/// `(level, xp_into_level, xp_needed_for_next)` for a lifetime XP total.
pub fn level_progress(total_xp: i64) -> (u32, i64, i64) {
    let mut level = 1;
    let mut remaining = total_xp.max(0);

    for (last_level, cost) in LEVEL_BANDS {
        let band_levels = last_level + 1 - level;
        let band_xp = i64::from(band_levels) * cost;
        if remaining < band_xp {
            return (level + (remaining / cost) as u32, remaining % cost, cost);
        }
        level += band_levels;
        remaining -= band_xp;
    }

    let cost = LEVEL_COST_AFTER_BANDS;
    (level + (remaining / cost) as u32, remaining % cost, cost)
}

pub fn level_for_xp(total_xp: i64) -> u32 {
    level_progress(total_xp).0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_match_highest_threshold_first() {
        assert_eq!(tier_for(5000).map(|t| t.name), Some("Legend"));
        assert_eq!(tier_for(2800).map(|t| t.name), Some("Grandmaster"));
        assert_eq!(tier_for(899).map(|t| t.name), Some("Challenger"));
        assert_eq!(tier_for(0).map(|t| t.name), Some("Challenger"));
        assert!(tier_for(-1).is_none());
        assert_eq!(tier_multiplier(-40), 1.0);
    }

    #[test]
    fn crossing_only_reports_promotions() {
        assert_eq!(tier_crossed(880, 910).map(|t| t.name), Some("Elite"));
        assert_eq!(tier_crossed(-5, 3).map(|t| t.name), Some("Challenger"));
        assert!(tier_crossed(910, 880).is_none());
        assert!(tier_crossed(100, 200).is_none());
    }

    #[test]
    fn level_bands_follow_the_cost_table() {
        assert_eq!(level_progress(0), (1, 0, 100));
        assert_eq!(level_progress(99), (1, 99, 100));
        assert_eq!(level_progress(100), (2, 0, 100));
        assert_eq!(level_progress(1000), (11, 0, 200));
        assert_eq!(level_progress(5000), (31, 0, 350));
        assert_eq!(level_progress(15_500), (61, 0, 500));
        assert_eq!(level_progress(16_250), (62, 250, 500));
        assert_eq!(level_for_xp(-20), 1);
    }
}
