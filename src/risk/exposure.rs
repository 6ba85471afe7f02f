use std::collections::BTreeMap;

use anyhow::{bail, Result};
use regex::Regex;

use crate::parsed::{Parsed, SkipReason};
use crate::table::{Row, Table};

pub const CODE_COLUMNS: &[&str] = &["O*NET-SOC Code", "SOC Code", "soc_code"];
pub const EXPOSURE_COLUMNS: &[&str] = &["Exposure", "ai_exposure"];

/// SOC code → AI exposure on the 0-100 scale.
pub type ExposureTable = BTreeMap<String, f64>;

/// Reduce an O*NET-SOC code to its SOC code: `15-1252.00` → `15-1252`.
pub fn onet_to_soc(re: &Regex, code: &str) -> Option<String> {
    let soc = code.trim().split('.').next()?;
    re.is_match(soc).then(|| soc.to_string())
}

/// Parse a published exposure table. Exposure is a 0-1 share scaled to
/// 0-100; the first row for a SOC code wins (the `.00` O*NET code is listed
/// before its specialisations).
pub fn parse_exposure(table: &Table) -> Result<Parsed<(String, f64)>> {
    let re = Regex::new(r"^[0-9]{2}-[0-9]{4}$")?;
    let mut parsed = Parsed::default();
    let mut seen = ExposureTable::new();

    for (i, row) in table.rows().enumerate() {
        let outcome = parse_row(&row, &re).and_then(|(soc, exposure)| {
            if seen.contains_key(&soc) {
                Err(SkipReason::DuplicateCode)
            } else {
                seen.insert(soc.clone(), exposure);
                Ok((soc, exposure))
            }
        });
        parsed.push(i, outcome);
    }

    Ok(parsed)
}

fn parse_row(row: &Row<'_>, re: &Regex) -> Result<(String, f64), SkipReason> {
    let code = row.first_text(CODE_COLUMNS).ok_or(SkipReason::NoSocCode)?;
    let soc = onet_to_soc(re, &code).ok_or(SkipReason::InvalidCode)?;
    let exposure = row
        .first_text(EXPOSURE_COLUMNS)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .ok_or(SkipReason::MissingExposure)?;
    Ok((soc, (exposure * 100.0).clamp(0.0, 100.0)))
}

/// Load an exposure table, refusing one with no usable rows.
pub fn exposure_from_table(table: &Table) -> Result<ExposureTable> {
    let has_any = |columns: &[&str]| columns.iter().any(|c| table.has_column(c));
    if !has_any(CODE_COLUMNS) || !has_any(EXPOSURE_COLUMNS) {
        bail!(
            "not an exposure table; expected columns {:?} and {:?}, found {:?}",
            CODE_COLUMNS,
            EXPOSURE_COLUMNS,
            table.headers()
        );
    }
    let parsed = parse_exposure(table)?;
    if parsed.accepted.is_empty() {
        bail!(
            "no usable exposure rows ({} rejected); expected columns {:?} and {:?}",
            parsed.rejected.len(),
            CODE_COLUMNS,
            EXPOSURE_COLUMNS
        );
    }
    Ok(parsed.accepted.into_iter().collect())
}
