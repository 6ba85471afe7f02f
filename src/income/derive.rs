use std::collections::BTreeMap;

use crate::config::{EarningsBands, IncomeConfig, MaritalMultiplier};
use crate::geo::StateResolver;
use crate::models::{scale, AgeBand, Gender, MaritalStatus, StateIncome, WageStats};

use super::parse::StateEarnings;

fn midpoint(a: i64, b: i64) -> f64 {
    (a as f64 + b as f64) / 2.0
}

fn estimate(base: f64, median_factor: f64, cfg: &IncomeConfig) -> WageStats {
    WageStats {
        median: scale(base, median_factor),
        mean: scale(base, cfg.mean_multiplier),
    }
}

/// Six age bands from the four Census earnings bands. 25-44 feeds both
/// 25-34 (discounted) and 35-44; 45-64 feeds 45-54 and 55-64 (discounted).
pub fn age_breakdown(earnings: &StateEarnings, cfg: &IncomeConfig) -> BTreeMap<AgeBand, WageStats> {
    let (m, f) = (&earnings.male, &earnings.female);
    let young = midpoint(m.young, f.young);
    let mid = midpoint(m.mid, f.mid);
    let senior = midpoint(m.senior, f.senior);
    let elderly = midpoint(m.elderly, f.elderly);

    BTreeMap::from([
        (AgeBand::Age18To24, estimate(young, 1.0, cfg)),
        (AgeBand::Age25To34, estimate(mid, cfg.early_career_discount, cfg)),
        (AgeBand::Age35To44, estimate(mid, 1.0, cfg)),
        (AgeBand::Age45To54, estimate(senior, 1.0, cfg)),
        (AgeBand::Age55To64, estimate(senior, cfg.late_career_discount, cfg)),
        (AgeBand::Age65Plus, estimate(elderly, 1.0, cfg)),
    ])
}

/// Working-age average (16-64) per sex.
pub fn gender_breakdown(earnings: &StateEarnings, cfg: &IncomeConfig) -> BTreeMap<Gender, WageStats> {
    let working_age = |b: &EarningsBands| (b.young as f64 + b.mid as f64 + b.senior as f64) / 3.0;
    BTreeMap::from([
        (Gender::Male, estimate(working_age(&earnings.male), 1.0, cfg)),
        (Gender::Female, estimate(working_age(&earnings.female), 1.0, cfg)),
    ])
}

/// Marital-status estimates: fixed multiples of the state's overall figures.
pub fn marital_breakdown(
    overall: WageStats,
    multipliers: &[MaritalMultiplier],
) -> BTreeMap<MaritalStatus, WageStats> {
    multipliers
        .iter()
        .map(|m| {
            (
                m.status,
                WageStats {
                    median: scale(overall.median as f64, m.factor),
                    mean: scale(overall.mean as f64, m.factor),
                },
            )
        })
        .collect()
}

fn state_entry<'a>(
    states: &'a mut BTreeMap<String, StateIncome>,
    resolver: &StateResolver,
    code: String,
) -> &'a mut StateIncome {
    let name = resolver.name(&code).unwrap_or_default().to_string();
    states.entry(code.clone()).or_insert_with(|| StateIncome {
        code,
        name,
        overall: None,
        by_age: None,
        by_gender: None,
        by_marital_status: None,
    })
}

/// Merge both fetches by state code. A state seen in only one fetch keeps
/// just that fetch's sections; marital estimates need an overall figure.
pub fn merge_states(
    resolver: &StateResolver,
    overall: Vec<(String, WageStats)>,
    earnings: Vec<(String, StateEarnings)>,
    cfg: &IncomeConfig,
) -> Vec<StateIncome> {
    let mut states: BTreeMap<String, StateIncome> = BTreeMap::new();

    for (code, stats) in overall {
        let state = state_entry(&mut states, resolver, code);
        state.overall = Some(stats);
        state.by_marital_status = Some(marital_breakdown(stats, &cfg.marital));
    }

    for (code, e) in earnings {
        let state = state_entry(&mut states, resolver, code);
        state.by_age = Some(age_breakdown(&e, cfg));
        state.by_gender = Some(gender_breakdown(&e, cfg));
    }

    states.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn earnings() -> StateEarnings {
        StateEarnings {
            male: EarningsBands { young: 30_000, mid: 70_000, senior: 80_000, elderly: 50_000 },
            female: EarningsBands { young: 26_000, mid: 56_000, senior: 62_000, elderly: 40_000 },
        }
    }

    #[test]
    fn test_age_breakdown() {
        let cfg = IncomeConfig::default();
        let by_age = age_breakdown(&earnings(), &cfg);

        assert_eq!(by_age[&AgeBand::Age18To24], WageStats { median: 28_000, mean: 33_040 });
        assert_eq!(by_age[&AgeBand::Age25To34], WageStats { median: 53_550, mean: 74_340 });
        assert_eq!(by_age[&AgeBand::Age35To44], WageStats { median: 63_000, mean: 74_340 });
        assert_eq!(by_age[&AgeBand::Age45To54], WageStats { median: 71_000, mean: 83_780 });
        assert_eq!(by_age[&AgeBand::Age55To64], WageStats { median: 67_450, mean: 83_780 });
        assert_eq!(by_age[&AgeBand::Age65Plus], WageStats { median: 45_000, mean: 53_100 });
    }

    #[test]
    fn test_gender_breakdown() {
        let cfg = IncomeConfig::default();
        let by_gender = gender_breakdown(&earnings(), &cfg);
        assert_eq!(by_gender[&Gender::Male], WageStats { median: 60_000, mean: 70_800 });
        assert_eq!(by_gender[&Gender::Female], WageStats { median: 48_000, mean: 56_640 });
    }

    #[test]
    fn test_huge_census_figures_do_not_overflow() {
        let cfg = IncomeConfig::default();
        let huge = EarningsBands { young: i64::MAX, mid: i64::MAX, senior: i64::MAX, elderly: i64::MAX };
        let e = StateEarnings { male: huge, female: huge };

        let by_age = age_breakdown(&e, &cfg);
        assert_eq!(by_age.len(), 6);
        assert!(by_age[&AgeBand::Age18To24].median > 0);

        let by_gender = gender_breakdown(&e, &cfg);
        assert!(by_gender[&Gender::Male].median > 0);
    }

    #[test]
    fn test_married_is_rounded_multiple_of_overall() {
        let cfg = IncomeConfig::default();
        for (median, mean) in [(91_905, 126_093), (70_000, 91_000), (52_719, 71_101)] {
            let marital = marital_breakdown(WageStats { median, mean }, &cfg.marital);
            assert_eq!(
                marital[&MaritalStatus::Married].median,
                (median as f64 * 1.25).round() as i64
            );
            assert_eq!(marital.len(), 4);
        }
        let marital = marital_breakdown(WageStats { median: 100_000, mean: 120_000 }, &cfg.marital);
        assert_eq!(marital[&MaritalStatus::Single], WageStats { median: 55_000, mean: 66_000 });
        assert_eq!(marital[&MaritalStatus::Widowed], WageStats { median: 53_000, mean: 63_600 });
    }

    #[test]
    fn test_merge_keeps_partial_states() {
        let cfg = IncomeConfig::default();
        let resolver = StateResolver::new(&Config::default().states);
        let overall = vec![
            ("CA".to_string(), WageStats { median: 91_905, mean: 126_093 }),
            ("TX".to_string(), WageStats { median: 73_035, mean: 100_000 }),
        ];
        let earnings = vec![
            ("CA".to_string(), earnings()),
            ("WY".to_string(), earnings()),
        ];

        let states = merge_states(&resolver, overall, earnings, &cfg);
        let codes: Vec<&str> = states.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["CA", "TX", "WY"]);

        let ca = &states[0];
        assert_eq!(ca.name, "California");
        assert!(ca.overall.is_some() && ca.by_age.is_some() && ca.by_marital_status.is_some());

        let tx = &states[1];
        assert!(tx.by_age.is_none() && tx.by_gender.is_none());
        assert!(tx.by_marital_status.is_some());

        let wy = &states[2];
        assert!(wy.overall.is_none() && wy.by_marital_status.is_none());
        assert!(wy.by_age.is_some());
    }
}
