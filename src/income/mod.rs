//! Income Fetcher: Census ACS state income → state income records.
//!
//! Only the overall median and the aggregate/household counts are sourced.
//! Age, gender and marital breakdowns are multiplier estimates.

pub mod derive;
pub mod parse;

use std::collections::BTreeMap;

use anyhow::Result;

use crate::cli::IncomeArgs;
use crate::config::{Config, IncomeConfig};
use crate::geo::StateResolver;
use crate::models::{Job, Metadata, RunSummary, StateIncome, StateIncomeFile};
use crate::output::write_json;
use crate::parsed::SkipReason;
use crate::report::console::Console;
use crate::report::terminal;
use crate::source::{build_client, census};
use crate::table::Table;

#[derive(Debug, Clone)]
pub struct IncomeBuild {
    /// Sorted by state code.
    pub states: Vec<StateIncome>,
    pub skips: BTreeMap<SkipReason, usize>,
}

/// Parse whichever fetches succeeded and merge them per state.
pub fn build_states(
    overall: Option<&Table>,
    age_gender: Option<&Table>,
    resolver: &StateResolver,
    cfg: &IncomeConfig,
) -> IncomeBuild {
    let mut skips = BTreeMap::new();

    let overall = match overall {
        Some(table) => {
            let parsed = parse::parse_overall(table, resolver, cfg);
            merge_counts(&mut skips, parsed.reason_counts());
            parsed.accepted
        }
        None => Vec::new(),
    };

    let earnings = match age_gender {
        Some(table) => {
            let parsed = parse::parse_age_gender(table, resolver, cfg);
            merge_counts(&mut skips, parsed.reason_counts());
            parsed.accepted
        }
        None => Vec::new(),
    };

    IncomeBuild {
        states: derive::merge_states(resolver, overall, earnings, cfg),
        skips,
    }
}

fn merge_counts(into: &mut BTreeMap<SkipReason, usize>, from: BTreeMap<SkipReason, usize>) {
    for (reason, count) in from {
        *into.entry(reason).or_insert(0) += count;
    }
}

pub async fn run(cfg: &Config, args: &IncomeArgs, console: &Console) -> Result<RunSummary> {
    let output = args.output.clone().unwrap_or_else(|| cfg.output.income.clone());
    let mut summary = RunSummary::new(Job::Income, output.clone());

    let mut income_cfg = cfg.income.clone();
    if let Some(key) = &args.api_key {
        income_cfg.api_key = Some(key.clone());
    }
    let client = build_client(&cfg.http, income_cfg.timeout_secs)?;

    console.step("Fetching overall state income data");
    let overall = match census::fetch_table(&client, &income_cfg, &census::overall_variables()).await {
        Ok(table) => {
            console.ok(&format!("Fetched {} rows", table.len()));
            summary.selected.insert("overall".to_string(), income_cfg.base_url.clone());
            Some(table)
        }
        Err(e) => {
            let warning = format!("Overall income fetch failed: {:#}", e);
            console.warn(&warning);
            summary.degrade(warning);
            None
        }
    };

    console.step("Fetching age/gender income data");
    let age_gender =
        match census::fetch_table(&client, &income_cfg, &census::age_gender_variables()).await {
            Ok(table) => {
                console.ok(&format!("Fetched {} rows", table.len()));
                summary
                    .selected
                    .insert("age_gender".to_string(), income_cfg.base_url.clone());
                Some(table)
            }
            Err(e) => {
                let warning = format!("Age/gender income fetch failed: {:#}", e);
                console.warn(&warning);
                summary.degrade(warning);
                None
            }
        };

    let resolver = StateResolver::new(&cfg.states);
    let build = build_states(overall.as_ref(), age_gender.as_ref(), &resolver, &income_cfg);

    if build.states.is_empty() {
        summary.degrade("No states resolved from the Census responses");
    }

    console.ok(&format!("Merged income data for {} states", build.states.len()));
    // Unresolved geographies (territories, Puerto Rico) are routine; only shown on request
    if console.verbose {
        terminal::render_skips(console, "Census rows skipped", &build.skips);
    }
    if let Some(sample) = build.states.iter().find(|s| s.code == "CA").or(build.states.first()) {
        terminal::render_income_sample(console, sample);
    }

    for (reason, count) in &build.skips {
        summary.skipped.insert(reason.to_string(), *count);
    }
    summary.records = build.states.len();

    let mut metadata = Metadata::today(&income_cfg.version);
    metadata.source = Some(income_cfg.source.clone());
    metadata.source_url = Some(income_cfg.source_url.clone());
    metadata.note = Some(income_cfg.note.clone());

    let document = StateIncomeFile {
        states: build.states,
        metadata,
    };
    write_json(&output, &document)?;
    console.ok(&format!("Saved data to {}", output.display()));

    Ok(summary)
}
