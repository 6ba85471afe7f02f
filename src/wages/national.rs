use std::collections::HashSet;

use anyhow::Result;
use regex::Regex;

use crate::config::Config;
use crate::models::{scale, Occupation};
use crate::parsed::{Parsed, SkipReason};
use crate::table::{Row, Table};

use super::wage_pair;

/// Reject anything that is not a detailed `NN-NNNN` occupation code.
pub fn check_code(re: &Regex, code: &str) -> Result<(), SkipReason> {
    if !re.is_match(code) {
        return Err(SkipReason::InvalidCode);
    }
    if code.ends_with("-0000") || code.starts_with("00-") {
        return Err(SkipReason::AggregateCode);
    }
    Ok(())
}

pub fn soc_code_regex() -> Result<Regex> {
    Ok(Regex::new(r"^[0-9]{2}-[0-9]{4}$")?)
}

/// Parse the national OEWS table into occupations with empty state and age
/// maps. The first row for a code wins.
pub fn parse_national(table: &Table, cfg: &Config) -> Result<Parsed<Occupation>> {
    let re = soc_code_regex()?;
    let mut seen = HashSet::new();
    let mut parsed = Parsed::default();

    for (i, row) in table.rows().enumerate() {
        let outcome = parse_row(&row, &re, cfg, &seen);
        if let Ok(occ) = &outcome {
            seen.insert(occ.soc_code.clone());
        }
        parsed.push(i, outcome);
    }

    Ok(parsed)
}

fn parse_row(
    row: &Row<'_>,
    re: &Regex,
    cfg: &Config,
    seen: &HashSet<String>,
) -> Result<Occupation, SkipReason> {
    let soc_code = row.text("OCC_CODE").ok_or(SkipReason::NoSocCode)?;
    check_code(re, &soc_code)?;

    // Newer OEWS files label each row's level; only detailed rows are occupations
    if let Some(group) = row.text("O_GROUP") {
        if !group.eq_ignore_ascii_case("detailed") {
            return Err(SkipReason::AggregateCode);
        }
    }

    if seen.contains(&soc_code) {
        return Err(SkipReason::DuplicateCode);
    }

    let (median, mean) = wage_pair(row, &cfg.wages)?;
    let major_group = soc_code.split('-').next().unwrap_or_default();
    let category = cfg.category_for(major_group).to_string();

    Ok(Occupation {
        title: row.text("OCC_TITLE").unwrap_or_default(),
        category,
        national_median: median,
        national_mean: mean,
        top_10_percent: scale(median as f64, cfg.wages.top_decile_multiplier),
        by_state: Default::default(),
        age_distribution: Default::default(),
        soc_code,
    })
}
