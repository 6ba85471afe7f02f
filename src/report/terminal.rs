use std::collections::BTreeMap;

use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::models::{Occupation, RiskRecord, RunSummary, StateIncome, WageStats};
use crate::parsed::{ranked, SkipReason};
use crate::risk::score::Coverage;

use super::console::Console;

/// Skip reasons shown without `--verbose`.
const TOP_REASONS: usize = 10;

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
                .collect::<Vec<_>>(),
        );
    table
}

fn money(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if value < 0 {
        format!("-${}", out)
    } else {
        format!("${}", out)
    }
}

fn risk_color(risk: f64) -> Color {
    if risk >= 60.0 {
        Color::Red
    } else if risk >= 40.0 {
        Color::Yellow
    } else {
        Color::Green
    }
}

/// Rejection counts, largest first.
pub fn render_skips(console: &Console, title: &str, counts: &BTreeMap<SkipReason, usize>) {
    if !console.shows_tables() || counts.is_empty() {
        return;
    }

    let rows = ranked(counts);
    let total: usize = rows.iter().map(|(_, n)| n).sum();
    let limit = if console.verbose { rows.len() } else { TOP_REASONS };

    let mut table = new_table(&["Reason", "Rows"]);
    for (reason, count) in rows.iter().take(limit) {
        table.add_row(vec![
            Cell::new(reason.to_string()),
            Cell::new(count).set_alignment(CellAlignment::Right),
        ]);
    }

    eprintln!("\n {} ({} rows)\n", title.bold(), total);
    eprintln!("{}", table);
    if rows.len() > limit {
        eprintln!("   … {} more reasons (use --verbose)", rows.len() - limit);
    }
}

pub fn render_state_counts(console: &Console, counts: &BTreeMap<String, usize>) {
    if !console.verbose || !console.shows_tables() || counts.is_empty() {
        return;
    }

    let mut table = new_table(&["State", "Occupations"]);
    for (state, count) in counts {
        table.add_row(vec![
            Cell::new(state),
            Cell::new(count).set_alignment(CellAlignment::Right),
        ]);
    }
    eprintln!("\n {}\n", "Occupations per state".bold());
    eprintln!("{}", table);
}

pub fn render_occupation_sample(console: &Console, occ: &Occupation) {
    if !console.shows_tables() {
        return;
    }

    eprintln!(
        "\n {} {} {}\n",
        "Sample:".bold(),
        occ.soc_code,
        occ.title
    );
    eprintln!("   Category       : {}", occ.category);
    eprintln!("   National median: {}", money(occ.national_median));
    eprintln!("   National mean  : {}", money(occ.national_mean));
    eprintln!("   Top 10%        : {}", money(occ.top_10_percent));
    eprintln!("   States         : {}", occ.by_state.len());

    let mut table = new_table(&["Age", "Median", "Mean"]);
    for (band, stats) in &occ.age_distribution {
        table.add_row(stat_row(band.to_string(), stats));
    }
    eprintln!("{}", table);
}

pub fn render_income_sample(console: &Console, state: &StateIncome) {
    if !console.shows_tables() {
        return;
    }

    eprintln!("\n {} {} ({})\n", "Sample:".bold(), state.name, state.code);

    let mut table = new_table(&["Group", "Median", "Mean"]);
    if let Some(overall) = &state.overall {
        table.add_row(stat_row("Overall".to_string(), overall));
    }
    for (band, stats) in state.by_age.iter().flatten() {
        table.add_row(stat_row(format!("Age {}", band), stats));
    }
    for (gender, stats) in state.by_gender.iter().flatten() {
        table.add_row(stat_row(format!("{:?}", gender), stats));
    }
    for (status, stats) in state.by_marital_status.iter().flatten() {
        table.add_row(stat_row(format!("{:?}", status), stats));
    }
    eprintln!("{}", table);
}

fn stat_row(label: String, stats: &WageStats) -> Vec<Cell> {
    vec![
        Cell::new(label),
        Cell::new(money(stats.median)).set_alignment(CellAlignment::Right),
        Cell::new(money(stats.mean)).set_alignment(CellAlignment::Right),
    ]
}

pub fn render_coverage(console: &Console, coverage: &Coverage) {
    console.ok(&format!(
        "Category coverage: {}/{} occupations",
        coverage.category, coverage.total
    ));
    if let Some(soc) = coverage.soc {
        console.ok(&format!(
            "SOC exposure coverage: {}/{} occupations",
            soc, coverage.total
        ));
    }
}

pub fn render_risk_extremes(console: &Console, highest: &[&RiskRecord], lowest: &[&RiskRecord]) {
    if !console.shows_tables() {
        return;
    }

    for (title, records) in [("Highest overall risk", highest), ("Lowest overall risk", lowest)] {
        if records.is_empty() {
            continue;
        }
        let mut table = new_table(&["SOC", "Title", "AI", "Robotics", "Overall"]);
        for record in records {
            table.add_row(vec![
                Cell::new(&record.soc_code),
                Cell::new(&record.title),
                Cell::new(format!("{:.1}", record.ai_risk)).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.1}", record.robotics_risk))
                    .set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.1}", record.overall_risk))
                    .fg(risk_color(record.overall_risk))
                    .set_alignment(CellAlignment::Right),
            ]);
        }
        eprintln!("\n {}\n", title.bold());
        eprintln!("{}", table);
    }
}

/// Final run summary on stdout. Quiet mode prints a single line.
pub fn render_summary(summary: &RunSummary, quiet: bool) {
    let status = if summary.degraded {
        "degraded".yellow()
    } else {
        "ok".green()
    };
    let skipped: usize = summary.skipped.values().sum();

    if quiet {
        println!(
            "{}: {} records  skipped: {}  status: {}  → {}",
            summary.job,
            summary.records,
            skipped,
            status,
            summary.output.display()
        );
        return;
    }

    println!("\n {} v{}", "labor-etl".bold(), env!("CARGO_PKG_VERSION"));
    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", format!("SUMMARY ({})", summary.job).bold());
    println!(" │  {:<48} │", format!("Records written : {}", summary.records));
    println!(" │  {:<48} │", format!("Rows skipped    : {}", skipped));
    for (input, location) in &summary.selected {
        println!(" │  {:<48} │", format!("{:<16}: {}", input, location));
    }
    println!(" │  {:<48} │", format!("Status          : {}", status));
    println!(" └────────────────────────────────────────────────────┘");
    println!(" Output: {}", summary.output.display());

    for warning in &summary.warnings {
        println!(" {} {}", "⚠".yellow(), warning);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money() {
        assert_eq!(money(0), "$0");
        assert_eq!(money(999), "$999");
        assert_eq!(money(1_000), "$1,000");
        assert_eq!(money(264_000), "$264,000");
        assert_eq!(money(1_234_567), "$1,234,567");
        assert_eq!(money(-5_000), "-$5,000");
    }

    #[test]
    fn test_risk_color_bands() {
        assert_eq!(risk_color(55.0), Color::Yellow);
        assert_eq!(risk_color(72.5), Color::Red);
        assert_eq!(risk_color(27.0), Color::Green);
    }
}
