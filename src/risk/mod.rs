//! Risk Estimator: wage-file occupations → automation risk records.
//!
//! Scores come from fixed category tables, optionally refined per SOC code by
//! an AI exposure table. A missing exposure table never degrades the run.

pub mod exposure;
pub mod score;

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::cli::RiskArgs;
use crate::config::Config;
use crate::models::{Job, Metadata, RiskFile, RiskRecord, RunSummary};
use crate::output::write_json;
use crate::report::console::Console;
use crate::report::terminal;
use crate::source::build_client;
use crate::source::chain::{select_first, with_override};
use crate::table::Table;

use exposure::ExposureTable;
use score::OccupationRef;

const BUILT_IN: &str = "built-in category table";

#[derive(Debug, Deserialize)]
struct OccupationsInput {
    occupations: Vec<OccupationRef>,
}

/// Read the occupation list written by the wage job.
pub fn read_occupations(path: &Path) -> Result<Vec<OccupationRef>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read occupations file {}", path.display()))?;
    let input: OccupationsInput = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse occupations file {}", path.display()))?;
    Ok(input.occupations)
}

/// Score every occupation, keeping input order.
pub fn build_risks(
    occupations: &[OccupationRef],
    cfg: &Config,
    exposure: Option<&ExposureTable>,
) -> Vec<RiskRecord> {
    occupations
        .iter()
        .map(|occ| score::score(occ, &cfg.risk, exposure))
        .collect()
}

/// Highest and lowest `n` records by overall risk.
pub fn extremes(records: &[RiskRecord], n: usize) -> (Vec<&RiskRecord>, Vec<&RiskRecord>) {
    let mut sorted: Vec<&RiskRecord> = records.iter().collect();
    sorted.sort_by(|a, b| {
        b.overall_risk
            .total_cmp(&a.overall_risk)
            .then_with(|| a.soc_code.cmp(&b.soc_code))
    });
    let highest = sorted.iter().take(n).copied().collect();
    let lowest = sorted.iter().rev().take(n).copied().collect();
    (highest, lowest)
}

pub async fn run(cfg: &Config, args: &RiskArgs, console: &Console) -> Result<RunSummary> {
    let output = args.output.clone().unwrap_or_else(|| cfg.output.risk.clone());
    let mut summary = RunSummary::new(Job::Risk, output.clone());

    let input = args
        .occupations
        .clone()
        .unwrap_or_else(|| cfg.output.wages.clone());
    console.step(&format!("Loading occupations from {}", input.display()));
    let occupations = read_occupations(&input)?;
    console.ok(&format!("Loaded {} occupations", occupations.len()));

    let sources = with_override("--exposure", args.exposure.as_deref(), &cfg.risk.exposure);
    let exposure = if sources.is_empty() {
        None
    } else {
        console.step("Loading AI exposure table");
        let client = build_client(&cfg.http, cfg.risk.timeout_secs)?;
        match select_first(&client, &sources, console.quiet, |source, bytes| {
            let table = Table::from_bytes(&source.location, bytes)?;
            exposure::exposure_from_table(&table)
        })
        .await
        {
            Ok(selection) => {
                for failure in &selection.failures {
                    console.warn(&format!("Skipped source {}", failure));
                }
                console.ok(&format!(
                    "{} SOC codes from {}",
                    selection.value.len(),
                    selection.source.name
                ));
                summary
                    .selected
                    .insert("exposure".to_string(), selection.source.location.clone());
                Some(selection.value)
            }
            Err(e) => {
                // Category scoring is the designed fallback, not a degradation
                console.warn(&format!("No exposure table loaded, using category scores: {}", e));
                None
            }
        }
    };
    if exposure.is_none() {
        summary.selected.insert("exposure".to_string(), BUILT_IN.to_string());
    }

    let records = build_risks(&occupations, cfg, exposure.as_ref());
    let coverage = score::coverage(&occupations, &cfg.risk, exposure.as_ref());
    console.ok(&format!("Calculated risk for {} occupations", records.len()));
    terminal::render_coverage(console, &coverage);
    let (highest, lowest) = extremes(&records, 5);
    terminal::render_risk_extremes(console, &highest, &lowest);

    summary.records = records.len();

    let mut metadata = Metadata::today(&cfg.risk.version);
    metadata.sources = cfg.risk.sources.clone();
    if let Some(location) = summary.selected.get("exposure").filter(|l| *l != BUILT_IN) {
        metadata.sources.push(location.clone());
    }
    metadata.note = Some(cfg.risk.note.clone());

    let document = RiskFile {
        automation_risks: records,
        metadata,
    };
    write_json(&output, &document)?;
    console.ok(&format!("Saved data to {}", output.display()));

    Ok(summary)
}
