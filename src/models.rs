use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Category assigned to SOC codes whose major group is not in the category table.
pub const OTHER_CATEGORY: &str = "Other";

/// `value × factor`, rounded to the nearest whole dollar.
pub fn scale(value: f64, factor: f64) -> i64 {
    (value * factor).round() as i64
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// A detailed occupation, keyed by SOC code (`NN-NNNN`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occupation {
    pub soc_code: String,
    pub title: String,
    pub category: String,
    pub national_median: i64,
    pub national_mean: i64,
    pub top_10_percent: i64,
    #[serde(default)]
    pub by_state: BTreeMap<String, StateWage>,
    #[serde(default)]
    pub age_distribution: BTreeMap<AgeBand, WageStats>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateWage {
    pub median: i64,
    pub mean: i64,
    pub employment: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WageStats {
    pub median: i64,
    pub mean: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeBand {
    #[serde(rename = "18-24")]
    Age18To24,
    #[serde(rename = "25-34")]
    Age25To34,
    #[serde(rename = "35-44")]
    Age35To44,
    #[serde(rename = "45-54")]
    Age45To54,
    #[serde(rename = "55-64")]
    Age55To64,
    #[serde(rename = "65+")]
    Age65Plus,
}

impl AgeBand {
    pub const ALL: [AgeBand; 6] = [
        AgeBand::Age18To24,
        AgeBand::Age25To34,
        AgeBand::Age35To44,
        AgeBand::Age45To54,
        AgeBand::Age55To64,
        AgeBand::Age65Plus,
    ];
}

impl std::fmt::Display for AgeBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgeBand::Age18To24 => write!(f, "18-24"),
            AgeBand::Age25To34 => write!(f, "25-34"),
            AgeBand::Age35To44 => write!(f, "35-44"),
            AgeBand::Age45To54 => write!(f, "45-54"),
            AgeBand::Age55To64 => write!(f, "55-64"),
            AgeBand::Age65Plus => write!(f, "65+"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MaritalStatus {
    Single,
    Married,
    Divorced,
    Widowed,
}

/// Household income for one state. Sections absent upstream stay `None`
/// and are omitted from the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateIncome {
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall: Option<WageStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_age: Option<BTreeMap<AgeBand, WageStats>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_gender: Option<BTreeMap<Gender, WageStats>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_marital_status: Option<BTreeMap<MaritalStatus, WageStats>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskRecord {
    pub soc_code: String,
    pub title: String,
    pub category: String,
    pub ai_risk: f64,
    pub robotics_risk: f64,
    pub overall_risk: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub version: String,
    pub last_updated: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Metadata {
    /// Metadata stamped with today's date.
    pub fn today(version: &str) -> Self {
        Metadata {
            version: version.to_string(),
            last_updated: chrono::Local::now().format("%Y-%m-%d").to_string(),
            source: None,
            source_url: None,
            sources: Vec::new(),
            note: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OccupationFile {
    pub occupations: Vec<Occupation>,
    pub metadata: Metadata,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StateIncomeFile {
    pub states: Vec<StateIncome>,
    pub metadata: Metadata,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RiskFile {
    pub automation_risks: Vec<RiskRecord>,
    pub metadata: Metadata,
}

/// What a job did, printed as JSON with `--report json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub job: Job,
    pub output: PathBuf,
    pub records: usize,
    /// Input name → location that was selected for it.
    pub selected: BTreeMap<String, String>,
    /// Rejection reason → count, across every parse step of the run.
    pub skipped: BTreeMap<String, usize>,
    pub degraded: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl RunSummary {
    pub fn new(job: Job, output: PathBuf) -> Self {
        RunSummary {
            job,
            output,
            records: 0,
            selected: BTreeMap::new(),
            skipped: BTreeMap::new(),
            degraded: false,
            warnings: Vec::new(),
        }
    }

    /// Record a non-fatal failure; the run still writes its output.
    pub fn degrade(&mut self, warning: impl Into<String>) {
        self.degraded = true;
        self.warnings.push(warning.into());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Job {
    Wages,
    Income,
    Risk,
}

impl std::fmt::Display for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Job::Wages => write!(f, "wages"),
            Job::Income => write!(f, "income"),
            Job::Risk => write!(f, "risk"),
        }
    }
}
