use std::collections::BTreeMap;

use crate::config::AgeMultiplier;
use crate::models::{scale, AgeBand, WageStats};

/// Age-band wages estimated from the national median with a fixed
/// lifecycle curve. Not sourced data.
pub fn age_distribution(median: i64, curve: &[AgeMultiplier]) -> BTreeMap<AgeBand, WageStats> {
    curve
        .iter()
        .map(|m| {
            (
                m.band,
                WageStats {
                    median: scale(median as f64, m.median),
                    mean: scale(median as f64, m.mean),
                },
            )
        })
        .collect()
}
