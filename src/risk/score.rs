use serde::{Deserialize, Serialize};

use crate::config::RiskConfig;
use crate::models::{round1, RiskRecord};

use super::exposure::ExposureTable;

/// The fields of a wage-file occupation that risk scoring needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupationRef {
    pub soc_code: String,
    pub title: String,
    pub category: String,
}

/// Weighted combination of both dimensions, capped.
///
/// With the default weights: `min(100, round1(0.6·ai + 0.4·robotics))`.
pub fn combined_risk(ai_risk: f64, robotics_risk: f64, cfg: &RiskConfig) -> f64 {
    round1(ai_risk * cfg.ai_weight + robotics_risk * cfg.robotics_weight).min(cfg.cap)
}

/// AI risk: SOC-level exposure when the table covers the code, then the
/// category table, then the default.
pub fn ai_risk(occ: &OccupationRef, cfg: &RiskConfig, exposure: Option<&ExposureTable>) -> f64 {
    exposure
        .and_then(|table| table.get(&occ.soc_code))
        .or_else(|| cfg.ai_by_category.get(&occ.category))
        .copied()
        .unwrap_or(cfg.default_score)
}

pub fn robotics_risk(occ: &OccupationRef, cfg: &RiskConfig) -> f64 {
    cfg.robotics_by_category
        .get(&occ.category)
        .copied()
        .unwrap_or(cfg.default_score)
}

pub fn score(occ: &OccupationRef, cfg: &RiskConfig, exposure: Option<&ExposureTable>) -> RiskRecord {
    // Combine the stored one-decimal values so overall_risk is reproducible from the record
    let ai = round1(ai_risk(occ, cfg, exposure));
    let robotics = round1(robotics_risk(occ, cfg));

    RiskRecord {
        soc_code: occ.soc_code.clone(),
        title: occ.title.clone(),
        category: occ.category.clone(),
        ai_risk: ai,
        robotics_risk: robotics,
        overall_risk: combined_risk(ai, robotics, cfg),
    }
}

/// Diagnostic coverage counts; not part of the persisted output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Coverage {
    pub total: usize,
    /// Occupations whose category has an AI table entry.
    pub category: usize,
    /// Occupations found in the SOC-level exposure table, when one was selected.
    pub soc: Option<usize>,
}

pub fn coverage(occupations: &[OccupationRef], cfg: &RiskConfig, exposure: Option<&ExposureTable>) -> Coverage {
    Coverage {
        total: occupations.len(),
        category: occupations
            .iter()
            .filter(|o| cfg.ai_by_category.contains_key(&o.category))
            .count(),
        soc: exposure.map(|table| {
            occupations
                .iter()
                .filter(|o| table.contains_key(&o.soc_code))
                .count()
        }),
    }
}
