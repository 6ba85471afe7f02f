use crate::config::{EarningsBands, IncomeConfig};
use crate::geo::StateResolver;
use crate::models::{scale, WageStats};
use crate::parsed::{Parsed, SkipReason};
use crate::source::census::{
    AGGREGATE_HOUSEHOLD_INCOME, FEMALE_EARNINGS, MALE_EARNINGS, MEDIAN_HOUSEHOLD_INCOME,
    STATE_COLUMN, TOTAL_HOUSEHOLDS,
};
use crate::table::{Row, Table};

/// Census median earnings by sex for one state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateEarnings {
    pub male: EarningsBands,
    pub female: EarningsBands,
}

/// A Census figure, or `None` when missing, the literal `null`, or one of the
/// negative "not available" sentinels such as `-666666666`.
pub fn census_value(row: &Row<'_>, column: &str) -> Option<i64> {
    let text = row.text(column)?;
    if text.eq_ignore_ascii_case("null") {
        return None;
    }
    let value: f64 = text.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some(value.trunc() as i64)
}

fn state_code(row: &Row<'_>, resolver: &StateResolver) -> Result<String, SkipReason> {
    row.text(STATE_COLUMN)
        .and_then(|fips| resolver.from_fips(&fips).map(str::to_string))
        .ok_or(SkipReason::UnknownGeography)
}

/// Overall median and mean household income per state.
pub fn parse_overall(
    table: &Table,
    resolver: &StateResolver,
    cfg: &IncomeConfig,
) -> Parsed<(String, WageStats)> {
    let mut parsed = Parsed::default();
    for (i, row) in table.rows().enumerate() {
        let outcome = state_code(&row, resolver).map(|code| (code, overall(&row, cfg)));
        parsed.push(i, outcome);
    }
    parsed
}

fn overall(row: &Row<'_>, cfg: &IncomeConfig) -> WageStats {
    let median = census_value(row, MEDIAN_HOUSEHOLD_INCOME).unwrap_or(cfg.default_median);
    let aggregate = census_value(row, AGGREGATE_HOUSEHOLD_INCOME);
    let households = census_value(row, TOTAL_HOUSEHOLDS);

    let mean = match (aggregate, households) {
        (Some(aggregate), Some(households)) if households > 0 => {
            scale(aggregate as f64 / households as f64, 1.0)
        }
        _ => scale(median as f64, cfg.mean_fallback_multiplier),
    };

    WageStats { median, mean }
}

/// Male and female median earnings by age band per state.
pub fn parse_age_gender(
    table: &Table,
    resolver: &StateResolver,
    cfg: &IncomeConfig,
) -> Parsed<(String, StateEarnings)> {
    let mut parsed = Parsed::default();
    for (i, row) in table.rows().enumerate() {
        let outcome = state_code(&row, resolver).map(|code| {
            let earnings = StateEarnings {
                male: bands(&row, &MALE_EARNINGS, cfg.male_defaults),
                female: bands(&row, &FEMALE_EARNINGS, cfg.female_defaults),
            };
            (code, earnings)
        });
        parsed.push(i, outcome);
    }
    parsed
}

fn bands(row: &Row<'_>, columns: &[&str; 4], defaults: EarningsBands) -> EarningsBands {
    EarningsBands {
        young: census_value(row, columns[0]).unwrap_or(defaults.young),
        mid: census_value(row, columns[1]).unwrap_or(defaults.mid),
        senior: census_value(row, columns[2]).unwrap_or(defaults.senior),
        elderly: census_value(row, columns[3]).unwrap_or(defaults.elderly),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn resolver() -> StateResolver {
        StateResolver::new(&Config::default().states)
    }

    #[test]
    fn test_overall_mean_and_fallbacks() {
        let cfg = IncomeConfig::default();
        let table = Table::from_json_rows(&serde_json::json!([
            ["NAME", "B19013_001E", "B19025_001E", "B19001_001E", "state"],
            ["California", "91905", "1500000000", "13000", "06"],
            ["Texas", "null", "900", "0", "48"],
            ["Ohio", "-666666666", null, "4000", "39"],
            ["Puerto Rico", "24002", "10", "1", "72"]
        ]))
        .unwrap();

        let parsed = parse_overall(&table, &resolver(), &cfg);
        assert_eq!(parsed.accepted.len(), 3);
        assert_eq!(parsed.rejected_for(SkipReason::UnknownGeography), 1);

        let (ca, ca_stats) = &parsed.accepted[0];
        assert_eq!(ca, "CA");
        assert_eq!(ca_stats.median, 91_905);
        assert_eq!(ca_stats.mean, 115_385);

        let (_, tx_stats) = &parsed.accepted[1];
        assert_eq!(tx_stats.median, 70_000);
        assert_eq!(tx_stats.mean, 91_000);

        let (_, oh_stats) = &parsed.accepted[2];
        assert_eq!(oh_stats.median, 70_000);
        assert_eq!(oh_stats.mean, 91_000);
    }

    #[test]
    fn test_age_gender_defaults_fill_gaps() {
        let cfg = IncomeConfig::default();
        let table = Table::from_json_rows(&serde_json::json!([
            ["NAME", "B20004_002E", "B20004_003E", "B20004_004E", "B20004_005E",
             "B20004_007E", "B20004_008E", "B20004_009E", "B20004_010E", "state"],
            ["Alaska", "20000", "60000", null, "null", "18000", "50000", "55000", "30000", "02"]
        ]))
        .unwrap();

        let parsed = parse_age_gender(&table, &resolver(), &cfg);
        let (code, earnings) = &parsed.accepted[0];
        assert_eq!(code, "AK");
        assert_eq!(earnings.male.young, 20_000);
        assert_eq!(earnings.male.senior, 75_000);
        assert_eq!(earnings.male.elderly, 50_000);
        assert_eq!(earnings.female.elderly, 30_000);
    }
}
