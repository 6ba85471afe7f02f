use std::collections::BTreeMap;

use crate::config::WageConfig;
use crate::geo::StateResolver;
use crate::models::{Occupation, StateWage};
use crate::parsed::{Parsed, SkipReason};
use crate::table::{Row, Table};

use super::{parse_wage, wage_pair};

/// Geography columns, in the order they are consulted.
pub const AREA_COLUMNS: &[&str] = &["AREA", "ST", "STATE", "AREA_NAME", "ST_NAME", "STATE_NAME"];
pub const CODE_COLUMNS: &[&str] = &["OCC_CODE", "OCCCODE", "SOC_CODE"];

#[derive(Debug, Clone, PartialEq)]
pub struct StateWageRow {
    pub soc_code: String,
    pub state: String,
    pub wage: StateWage,
}

/// Parse the state OEWS table. Rows for codes outside `occupations` are
/// rejected: state data never introduces occupations.
pub fn parse_state(
    table: &Table,
    resolver: &StateResolver,
    occupations: &BTreeMap<String, Occupation>,
    cfg: &WageConfig,
) -> Parsed<StateWageRow> {
    let mut parsed = Parsed::default();
    for (i, row) in table.rows().enumerate() {
        parsed.push(i, parse_row(&row, resolver, occupations, cfg));
    }
    parsed
}

fn parse_row(
    row: &Row<'_>,
    resolver: &StateResolver,
    occupations: &BTreeMap<String, Occupation>,
    cfg: &WageConfig,
) -> Result<StateWageRow, SkipReason> {
    let area = row.first_text(AREA_COLUMNS).ok_or(SkipReason::NoArea)?;
    let state = resolver.resolve(&area).ok_or(SkipReason::NoStateMatch)?;

    let soc_code = row.first_text(CODE_COLUMNS).ok_or(SkipReason::NoSocCode)?;
    if !occupations.contains_key(&soc_code) {
        return Err(SkipReason::SocNotInOccupations);
    }

    let (median, mean) = wage_pair(row, cfg)?;
    let employment = parse_wage(row.get("TOT_EMP")).unwrap_or(0);

    Ok(StateWageRow {
        soc_code,
        state: state.to_string(),
        wage: StateWage {
            median,
            mean,
            employment,
        },
    })
}

/// Attach state rows to their occupations; returns matched rows per state.
pub fn attach(
    occupations: &mut BTreeMap<String, Occupation>,
    rows: Vec<StateWageRow>,
) -> BTreeMap<String, usize> {
    let mut per_state = BTreeMap::new();
    for row in rows {
        if let Some(occ) = occupations.get_mut(&row.soc_code) {
            occ.by_state.insert(row.state.clone(), row.wage);
            *per_state.entry(row.state).or_insert(0) += 1;
        }
    }
    per_state
}
