//! Wage Fetcher: BLS OEWS national and state tables → occupation records.

pub mod age;
pub mod national;
pub mod state;

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};

use crate::cli::WagesArgs;
use crate::config::{Config, WageConfig};
use crate::geo::StateResolver;
use crate::models::{Job, Metadata, Occupation, OccupationFile, RunSummary};
use crate::output::write_json;
use crate::parsed::SkipReason;
use crate::report::console::Console;
use crate::report::terminal;
use crate::source::build_client;
use crate::source::chain::{select_first, with_override};
use crate::table::{Cell, Row, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WageIssue {
    Missing,
    /// Present but not a number, e.g. the BLS suppression markers `*` and `#`.
    Special,
}

/// Parse an annual wage cell, truncating toward zero. Thousands separators
/// are accepted.
pub fn parse_wage(cell: Option<&Cell>) -> Result<i64, WageIssue> {
    match cell {
        None | Some(Cell::Empty) => Err(WageIssue::Missing),
        Some(Cell::Number(n)) if n.is_finite() => Ok(n.trunc() as i64),
        Some(Cell::Number(_)) => Err(WageIssue::Special),
        Some(Cell::Text(s)) => {
            let cleaned = s.trim().replace(',', "");
            if cleaned.is_empty() || cleaned.eq_ignore_ascii_case("nan") {
                return Err(WageIssue::Missing);
            }
            cleaned
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(|v| v.trunc() as i64)
                .ok_or(WageIssue::Special)
        }
    }
}

/// Validated `(median, mean)` annual wages of a row.
pub fn wage_pair(row: &Row<'_>, cfg: &WageConfig) -> Result<(i64, i64), SkipReason> {
    let median = parse_wage(row.get("A_MEDIAN"));
    let mean = parse_wage(row.get("A_MEAN"));

    let (median, mean) = match (median, mean) {
        (Err(WageIssue::Missing), _) | (_, Err(WageIssue::Missing)) => {
            return Err(SkipReason::MissingWageData)
        }
        (Err(WageIssue::Special), _) => return Err(SkipReason::SpecialMedianCode),
        (_, Err(WageIssue::Special)) => return Err(SkipReason::SpecialMeanCode),
        (Ok(median), Ok(mean)) => (median, mean),
    };

    if median < cfg.min_median || median > cfg.max_median {
        return Err(SkipReason::WageOutOfRange);
    }

    Ok((median, mean))
}

/// Everything the wage job derives from its two input tables.
#[derive(Debug, Clone)]
pub struct WageBuild {
    /// Sorted by SOC code.
    pub occupations: Vec<Occupation>,
    pub national_skips: BTreeMap<SkipReason, usize>,
    pub state_skips: BTreeMap<SkipReason, usize>,
    pub state_counts: BTreeMap<String, usize>,
}

/// Parse, merge and derive: national rows anchor the set, state rows attach
/// to existing codes, and every occupation gets its age curve.
pub fn build_occupations(national: &Table, state: Option<&Table>, cfg: &Config) -> Result<WageBuild> {
    let parsed = national::parse_national(national, cfg)?;
    let national_skips = parsed.reason_counts();

    let mut occupations: BTreeMap<String, Occupation> = parsed
        .accepted
        .into_iter()
        .map(|occ| (occ.soc_code.clone(), occ))
        .collect();

    let mut state_skips = BTreeMap::new();
    let mut state_counts = BTreeMap::new();
    if let Some(table) = state {
        let resolver = StateResolver::new(&cfg.states);
        let rows = state::parse_state(table, &resolver, &occupations, &cfg.wages);
        state_skips = rows.reason_counts();
        state_counts = state::attach(&mut occupations, rows.accepted);
    }

    for occ in occupations.values_mut() {
        occ.age_distribution = age::age_distribution(occ.national_median, &cfg.wages.age_curve);
    }

    Ok(WageBuild {
        occupations: occupations.into_values().collect(),
        national_skips,
        state_skips,
        state_counts,
    })
}

pub async fn run(cfg: &Config, args: &WagesArgs, console: &Console) -> Result<RunSummary> {
    let output = args.output.clone().unwrap_or_else(|| cfg.output.wages.clone());
    let mut summary = RunSummary::new(Job::Wages, output.clone());
    let client = build_client(&cfg.http, cfg.wages.timeout_secs)?;

    // National table anchors every occupation; failure aborts the run
    console.step("Fetching national occupation data");
    let national_sources = with_override("--national", args.national.as_deref(), &cfg.wages.national);
    let national = select_first(&client, &national_sources, console.quiet, |source, bytes| {
        Table::from_bytes(&source.location, bytes)
    })
    .await
    .context("National wage table unavailable")?;
    for failure in &national.failures {
        console.warn(&format!("Skipped source {}", failure));
    }
    console.ok(&format!("{} rows from {}", national.value.len(), national.source.name));
    summary
        .selected
        .insert("national".to_string(), national.source.location.clone());

    console.step("Fetching state occupation data");
    let state_sources = with_override("--state", args.state.as_deref(), &cfg.wages.state);
    let state = match select_first(&client, &state_sources, console.quiet, |source, bytes| {
        Table::from_bytes(&source.location, bytes)
    })
    .await
    {
        Ok(selection) => {
            for failure in &selection.failures {
                console.warn(&format!("Skipped source {}", failure));
            }
            console.ok(&format!("{} rows from {}", selection.value.len(), selection.source.name));
            console.detail(&format!("State columns: {}", selection.value.headers().join(", ")));
            summary
                .selected
                .insert("state".to_string(), selection.source.location.clone());
            Some(selection.value)
        }
        Err(e) => {
            let warning = format!("State wage table unavailable, occupations keep empty state maps: {}", e);
            console.warn(&warning);
            summary.degrade(warning);
            None
        }
    };

    let build = build_occupations(&national.value, state.as_ref(), cfg)?;
    if build.occupations.is_empty() {
        bail!("No occupations parsed from {}", national.source.location);
    }
    if state.is_some() && build.state_counts.is_empty() {
        summary.degrade("State wage table matched no occupations");
    }

    console.ok(&format!("Processed {} occupations", build.occupations.len()));
    console.ok(&format!("Added state data for {} states", build.state_counts.len()));
    terminal::render_skips(console, "National rows skipped", &build.national_skips);
    terminal::render_skips(console, "State rows skipped", &build.state_skips);
    terminal::render_state_counts(console, &build.state_counts);
    if let Some(sample) = build.occupations.first() {
        terminal::render_occupation_sample(console, sample);
    }

    for (reason, count) in build.national_skips.iter().chain(build.state_skips.iter()) {
        *summary.skipped.entry(reason.to_string()).or_insert(0) += count;
    }
    summary.records = build.occupations.len();

    let mut metadata = Metadata::today(&cfg.wages.version);
    metadata.source = Some(cfg.wages.source.clone());
    metadata.source_url = Some(cfg.wages.source_url.clone());

    let document = OccupationFile {
        occupations: build.occupations,
        metadata,
    };
    write_json(&output, &document)?;
    console.ok(&format!("Saved data to {}", output.display()));

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AgeBand;
    use crate::table::tests::zip_bytes;
    use std::path::{Path, PathBuf};

    const NATIONAL_CSV: &str = "OCC_CODE,OCC_TITLE,A_MEDIAN,A_MEAN\n\
                                15-1252,Software Developers,120000,125000\n\
                                29-1141,Registered Nurses,86070,94480\n";

    /// Config with no built-in download locations, so only CLI paths are tried.
    fn offline_config() -> Config {
        let mut cfg = Config::default();
        cfg.wages.national.clear();
        cfg.wages.state.clear();
        cfg
    }

    fn args(national: &Path, state: &Path, output: PathBuf) -> WagesArgs {
        WagesArgs {
            national: Some(national.to_string_lossy().into_owned()),
            state: Some(state.to_string_lossy().into_owned()),
            output: Some(output),
        }
    }

    fn write_national_zip(dir: &Path) -> PathBuf {
        let path = dir.join("oesm23nat.zip");
        std::fs::write(&path, zip_bytes(&[("oesm23nat/national.csv", NATIONAL_CSV)])).unwrap();
        path
    }

    #[tokio::test]
    async fn test_run_with_both_tables() {
        let dir = tempfile::tempdir().unwrap();
        let national = write_national_zip(dir.path());
        let state = dir.path().join("state.csv");
        std::fs::write(&state, "AREA,OCC_CODE,A_MEDIAN,A_MEAN,TOT_EMP\n6,15-1252,170000,175000,150000\n").unwrap();
        let output = dir.path().join("out/occupations.json");

        let summary = run(&offline_config(), &args(&national, &state, output.clone()), &Console::new(true, false))
            .await
            .unwrap();

        assert!(!summary.degraded);
        assert_eq!(summary.records, 2);
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written["occupations"][0]["by_state"]["CA"]["median"], 170_000);
        assert!(written["metadata"]["last_updated"].is_string());
    }

    #[tokio::test]
    async fn test_missing_state_table_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let national = write_national_zip(dir.path());
        let output = dir.path().join("occupations.json");

        let summary = run(
            &offline_config(),
            &args(&national, &dir.path().join("missing.zip"), output.clone()),
            &Console::new(true, false),
        )
        .await
        .unwrap();

        assert!(summary.degraded);
        assert_eq!(summary.records, 2);
        assert!(output.exists());
    }

    #[tokio::test]
    async fn test_state_table_matching_nothing_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let national = write_national_zip(dir.path());
        let state = dir.path().join("state.csv");
        std::fs::write(&state, "AREA,OCC_CODE,A_MEDIAN,A_MEAN\n6,47-2061,60000,62000\n").unwrap();

        let summary = run(
            &offline_config(),
            &args(&national, &state, dir.path().join("occupations.json")),
            &Console::new(true, false),
        )
        .await
        .unwrap();

        assert!(summary.degraded);
        assert_eq!(summary.skipped["soc_not_in_occupations"], 1);
    }

    #[tokio::test]
    async fn test_missing_national_table_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("occupations.json");

        let result = run(
            &offline_config(),
            &args(&dir.path().join("missing.zip"), &dir.path().join("state.csv"), output.clone()),
            &Console::new(true, false),
        )
        .await;

        assert!(result.is_err());
        assert!(!output.exists());
    }

    #[test]
    fn test_parse_wage() {
        assert_eq!(parse_wage(None), Err(WageIssue::Missing));
        assert_eq!(parse_wage(Some(&Cell::Empty)), Err(WageIssue::Missing));
        assert_eq!(parse_wage(Some(&Cell::Number(52_340.9))), Ok(52_340));
        assert_eq!(parse_wage(Some(&Cell::Text("52,340".into()))), Ok(52_340));
        assert_eq!(parse_wage(Some(&Cell::Text("*".into()))), Err(WageIssue::Special));
        assert_eq!(parse_wage(Some(&Cell::Text("#".into()))), Err(WageIssue::Special));
        assert_eq!(parse_wage(Some(&Cell::Text("NaN".into()))), Err(WageIssue::Missing));
    }

    #[test]
    fn test_software_developer_end_to_end() {
        let national = Table::from_csv(
            b"OCC_CODE,OCC_TITLE,A_MEDIAN,A_MEAN\n15-1252,Software Developers,120000,125000\n",
        )
        .unwrap();

        let build = build_occupations(&national, None, &Config::default()).unwrap();

        assert_eq!(build.occupations.len(), 1);
        let occ = &build.occupations[0];
        assert_eq!(occ.category, "Computer and Mathematical");
        assert_eq!(occ.top_10_percent, 264_000);
        assert_eq!(occ.age_distribution.len(), 6);
        for band in AgeBand::ALL {
            assert!(occ.age_distribution.contains_key(&band));
        }
        assert_eq!(occ.age_distribution[&AgeBand::Age35To44].median, 120_000);
        assert!(occ.by_state.is_empty());
    }

    #[test]
    fn test_state_rows_never_add_occupations() {
        let national = Table::from_csv(
            b"OCC_CODE,OCC_TITLE,A_MEDIAN,A_MEAN\n\
              15-1252,Software Developers,120000,125000\n\
              29-1141,Registered Nurses,86070,94480\n",
        )
        .unwrap();
        let state = Table::from_csv(
            b"AREA,OCC_CODE,A_MEDIAN,A_MEAN,TOT_EMP\n\
              6,15-1252,170000,175000,150000\n\
              48,29-1141,81000,84000,220000\n\
              36,47-2061,60000,62000,30000\n\
              72,15-1252,60000,62000,300\n",
        )
        .unwrap();

        let build = build_occupations(&national, Some(&state), &Config::default()).unwrap();

        let codes: Vec<&str> = build.occupations.iter().map(|o| o.soc_code.as_str()).collect();
        assert_eq!(codes, vec!["15-1252", "29-1141"]);
        assert_eq!(build.occupations[0].by_state["CA"].employment, 150_000);
        assert_eq!(build.occupations[1].by_state["TX"].median, 81_000);
        assert_eq!(build.state_skips[&SkipReason::SocNotInOccupations], 1);
        assert_eq!(build.state_skips[&SkipReason::NoStateMatch], 1);
        assert_eq!(build.state_counts.len(), 2);
    }

    #[test]
    fn test_top_decile_matches_rounded_multiplier() {
        let national = Table::from_csv(
            b"OCC_CODE,OCC_TITLE,A_MEDIAN,A_MEAN\n\
              11-1011,Chief Executives,206680,258900\n\
              35-2014,Cooks,33333,35000\n\
              43-4051,Customer Service Representatives,39680,43010\n",
        )
        .unwrap();
        let build = build_occupations(&national, None, &Config::default()).unwrap();
        for occ in &build.occupations {
            assert_eq!(occ.top_10_percent, (occ.national_median as f64 * 2.2).round() as i64);
        }
    }
}
