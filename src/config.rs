use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::models::{AgeBand, MaritalStatus, OTHER_CATEGORY};

const BLS_NATIONAL_URL: &str = "https://www.bls.gov/oes/special.requests/oesm23nat.zip";
const BLS_STATE_URL: &str = "https://www.bls.gov/oes/special.requests/oesm23st.zip";
const CENSUS_ACS5_URL: &str = "https://api.census.gov/data/2022/acs/acs5";

/// Root configuration, deserialized from `.labor-etl/config.toml`.
///
/// Every section falls back to its built-in default, so a file only needs the
/// keys it overrides. Lookup tables replace their default wholesale.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub output: OutputConfig,
    pub wages: WageConfig,
    pub income: IncomeConfig,
    pub risk: RiskConfig,
    /// SOC major group (first two digits) → category name.
    pub categories: BTreeMap<String, String>,
    pub states: Vec<StateEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// BLS rejects requests without a browser-like agent.
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub wages: PathBuf,
    pub income: PathBuf,
    pub risk: PathBuf,
}

/// A named input location: an `http(s)://` URL or a local file path.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceSpec {
    pub name: String,
    pub location: String,
}

impl SourceSpec {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        SourceSpec {
            name: name.into(),
            location: location.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WageConfig {
    pub national: Vec<SourceSpec>,
    pub state: Vec<SourceSpec>,
    pub timeout_secs: u64,
    /// Inclusive bounds on an accepted annual median.
    pub min_median: i64,
    pub max_median: i64,
    pub top_decile_multiplier: f64,
    pub age_curve: Vec<AgeMultiplier>,
    pub version: String,
    pub source: String,
    pub source_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct AgeMultiplier {
    pub band: AgeBand,
    pub median: f64,
    pub mean: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IncomeConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    /// Median used when the API reports none.
    pub default_median: i64,
    /// Mean as a multiple of median when it cannot be computed.
    pub mean_fallback_multiplier: f64,
    /// Mean as a multiple of every age and gender midpoint.
    pub mean_multiplier: f64,
    pub early_career_discount: f64,
    pub late_career_discount: f64,
    pub male_defaults: EarningsBands,
    pub female_defaults: EarningsBands,
    pub marital: Vec<MaritalMultiplier>,
    pub version: String,
    pub source: String,
    pub source_url: String,
    pub note: String,
}

/// Census B20004 earnings bands: 16-24, 25-44, 45-64, 65+.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct EarningsBands {
    pub young: i64,
    pub mid: i64,
    pub senior: i64,
    pub elderly: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MaritalMultiplier {
    pub status: MaritalStatus,
    pub factor: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub ai_weight: f64,
    pub robotics_weight: f64,
    pub cap: f64,
    /// Score for a category missing from a table.
    pub default_score: f64,
    pub ai_by_category: BTreeMap<String, f64>,
    pub robotics_by_category: BTreeMap<String, f64>,
    /// SOC-level AI exposure tables, tried in order before the category table.
    pub exposure: Vec<SourceSpec>,
    pub timeout_secs: u64,
    pub version: String,
    pub sources: Vec<String>,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StateEntry {
    pub code: String,
    pub fips: String,
    pub name: String,
}

impl Config {
    /// Category name for a SOC code's major group, or `"Other"`.
    pub fn category_for(&self, major_group: &str) -> &str {
        self.categories
            .get(major_group)
            .map(String::as_str)
            .unwrap_or(OTHER_CATEGORY)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            http: HttpConfig::default(),
            output: OutputConfig::default(),
            wages: WageConfig::default(),
            income: IncomeConfig::default(),
            risk: RiskConfig::default(),
            categories: default_categories(),
            states: default_states(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            wages: PathBuf::from("data/bls_oews_occupations.json"),
            income: PathBuf::from("data/state_income_data.json"),
            risk: PathBuf::from("data/automation_risk_data.json"),
        }
    }
}

impl Default for WageConfig {
    fn default() -> Self {
        let curve = [
            (AgeBand::Age18To24, 0.55),
            (AgeBand::Age25To34, 0.85),
            (AgeBand::Age35To44, 1.00),
            (AgeBand::Age45To54, 1.10),
            (AgeBand::Age55To64, 1.05),
            (AgeBand::Age65Plus, 0.95),
        ];

        WageConfig {
            national: vec![SourceSpec::new("BLS OEWS national", BLS_NATIONAL_URL)],
            state: vec![SourceSpec::new("BLS OEWS state", BLS_STATE_URL)],
            timeout_secs: 60,
            min_median: 10_000,
            max_median: 500_000,
            top_decile_multiplier: 2.2,
            age_curve: curve
                .into_iter()
                .map(|(band, median)| AgeMultiplier {
                    band,
                    median,
                    mean: median + 0.05,
                })
                .collect(),
            version: "2024.1".to_string(),
            source: "U.S. Bureau of Labor Statistics OEWS May 2023".to_string(),
            source_url: "https://www.bls.gov/oes/".to_string(),
        }
    }
}

impl Default for IncomeConfig {
    fn default() -> Self {
        IncomeConfig {
            base_url: CENSUS_ACS5_URL.to_string(),
            api_key: None,
            timeout_secs: 30,
            default_median: 70_000,
            mean_fallback_multiplier: 1.3,
            mean_multiplier: 1.18,
            early_career_discount: 0.85,
            late_career_discount: 0.95,
            male_defaults: EarningsBands {
                young: 35_000,
                mid: 70_000,
                senior: 75_000,
                elderly: 50_000,
            },
            female_defaults: EarningsBands {
                young: 30_000,
                mid: 55_000,
                senior: 60_000,
                elderly: 40_000,
            },
            marital: vec![
                MaritalMultiplier { status: MaritalStatus::Single, factor: 0.55 },
                MaritalMultiplier { status: MaritalStatus::Married, factor: 1.25 },
                MaritalMultiplier { status: MaritalStatus::Divorced, factor: 0.61 },
                MaritalMultiplier { status: MaritalStatus::Widowed, factor: 0.53 },
            ],
            version: "2024.1".to_string(),
            source: "U.S. Census Bureau ACS 5-Year Estimates 2022".to_string(),
            source_url: "https://www.census.gov/data/developers/data-sets/acs-5year.html"
                .to_string(),
            note: "Age, gender, and marital-status breakdowns are multiplier estimates \
                   derived from the sourced state figures"
                .to_string(),
        }
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        let ai = [
            ("Computer and Mathematical", 85.0),
            ("Business and Financial Operations", 75.0),
            ("Legal", 80.0),
            ("Life, Physical, and Social Science", 65.0),
            ("Management", 55.0),
            ("Architecture and Engineering", 50.0),
            ("Arts, Design, Entertainment, Sports, and Media", 45.0),
            ("Office and Administrative Support", 60.0),
            ("Educational Instruction and Library", 40.0),
            ("Healthcare Practitioners and Technical", 25.0),
            ("Healthcare Support", 15.0),
            ("Protective Service", 20.0),
            ("Food Preparation and Serving", 10.0),
            ("Building and Grounds Cleaning and Maintenance", 5.0),
            ("Personal Care and Service", 12.0),
            ("Sales and Related", 35.0),
            ("Farming, Fishing, and Forestry", 8.0),
            ("Construction and Extraction", 15.0),
            ("Installation, Maintenance, and Repair", 18.0),
            ("Production", 25.0),
            ("Transportation and Material Moving", 20.0),
            ("Community and Social Service", 30.0),
        ];
        let robotics = [
            ("Transportation and Material Moving", 75.0),
            ("Food Preparation and Serving", 70.0),
            ("Office and Administrative Support", 65.0),
            ("Production", 80.0),
            ("Sales and Related", 55.0),
            ("Farming, Fishing, and Forestry", 50.0),
            ("Construction and Extraction", 45.0),
            ("Installation, Maintenance, and Repair", 40.0),
            ("Building and Grounds Cleaning and Maintenance", 60.0),
            ("Healthcare Practitioners and Technical", 15.0),
            ("Healthcare Support", 20.0),
            ("Educational Instruction and Library", 10.0),
            ("Arts, Design, Entertainment, Sports, and Media", 25.0),
            ("Community and Social Service", 15.0),
            ("Legal", 20.0),
            ("Management", 25.0),
            ("Business and Financial Operations", 35.0),
            ("Computer and Mathematical", 10.0),
            ("Architecture and Engineering", 20.0),
            ("Life, Physical, and Social Science", 18.0),
            ("Protective Service", 30.0),
            ("Personal Care and Service", 25.0),
        ];

        RiskConfig {
            ai_weight: 0.6,
            robotics_weight: 0.4,
            cap: 100.0,
            default_score: 30.0,
            ai_by_category: ai.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            robotics_by_category: robotics.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            exposure: Vec::new(),
            timeout_secs: 30,
            version: "2024.1".to_string(),
            sources: vec![
                "OpenAI GPT Impact on Labor Study (2023)".to_string(),
                "Frey & Osborne Automation Study (2013-2017)".to_string(),
                "Category-level estimates based on published research".to_string(),
            ],
            note: "Scores are 0-100, where higher = greater risk of automation".to_string(),
        }
    }
}

fn default_categories() -> BTreeMap<String, String> {
    [
        ("11", "Management"),
        ("13", "Business and Financial Operations"),
        ("15", "Computer and Mathematical"),
        ("17", "Architecture and Engineering"),
        ("19", "Life, Physical, and Social Science"),
        ("21", "Community and Social Service"),
        ("23", "Legal"),
        ("25", "Educational Instruction and Library"),
        ("27", "Arts, Design, Entertainment, Sports, and Media"),
        ("29", "Healthcare Practitioners and Technical"),
        ("31", "Healthcare Support"),
        ("33", "Protective Service"),
        ("35", "Food Preparation and Serving"),
        ("37", "Building and Grounds Cleaning and Maintenance"),
        ("39", "Personal Care and Service"),
        ("41", "Sales and Related"),
        ("43", "Office and Administrative Support"),
        ("45", "Farming, Fishing, and Forestry"),
        ("47", "Construction and Extraction"),
        ("49", "Installation, Maintenance, and Repair"),
        ("51", "Production"),
        ("53", "Transportation and Material Moving"),
    ]
    .iter()
    .map(|(group, name)| (group.to_string(), name.to_string()))
    .collect()
}

fn default_states() -> Vec<StateEntry> {
    [
        ("AL", "01", "Alabama"),
        ("AK", "02", "Alaska"),
        ("AZ", "04", "Arizona"),
        ("AR", "05", "Arkansas"),
        ("CA", "06", "California"),
        ("CO", "08", "Colorado"),
        ("CT", "09", "Connecticut"),
        ("DE", "10", "Delaware"),
        ("DC", "11", "District of Columbia"),
        ("FL", "12", "Florida"),
        ("GA", "13", "Georgia"),
        ("HI", "15", "Hawaii"),
        ("ID", "16", "Idaho"),
        ("IL", "17", "Illinois"),
        ("IN", "18", "Indiana"),
        ("IA", "19", "Iowa"),
        ("KS", "20", "Kansas"),
        ("KY", "21", "Kentucky"),
        ("LA", "22", "Louisiana"),
        ("ME", "23", "Maine"),
        ("MD", "24", "Maryland"),
        ("MA", "25", "Massachusetts"),
        ("MI", "26", "Michigan"),
        ("MN", "27", "Minnesota"),
        ("MS", "28", "Mississippi"),
        ("MO", "29", "Missouri"),
        ("MT", "30", "Montana"),
        ("NE", "31", "Nebraska"),
        ("NV", "32", "Nevada"),
        ("NH", "33", "New Hampshire"),
        ("NJ", "34", "New Jersey"),
        ("NM", "35", "New Mexico"),
        ("NY", "36", "New York"),
        ("NC", "37", "North Carolina"),
        ("ND", "38", "North Dakota"),
        ("OH", "39", "Ohio"),
        ("OK", "40", "Oklahoma"),
        ("OR", "41", "Oregon"),
        ("PA", "42", "Pennsylvania"),
        ("RI", "44", "Rhode Island"),
        ("SC", "45", "South Carolina"),
        ("SD", "46", "South Dakota"),
        ("TN", "47", "Tennessee"),
        ("TX", "48", "Texas"),
        ("UT", "49", "Utah"),
        ("VT", "50", "Vermont"),
        ("VA", "51", "Virginia"),
        ("WA", "53", "Washington"),
        ("WV", "54", "West Virginia"),
        ("WI", "55", "Wisconsin"),
        ("WY", "56", "Wyoming"),
    ]
    .iter()
    .map(|(code, fips, name)| StateEntry {
        code: code.to_string(),
        fips: fips.to_string(),
        name: name.to_string(),
    })
    .collect()
}

/// Load the configuration, searching in order:
///
/// 1. `config_override`: path passed via `--config`
/// 2. `<base_dir>/.labor-etl/config.toml`
/// 3. `~/.config/labor-etl/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(base_dir: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let local_config = base_dir.join(".labor-etl").join("config.toml");
    if local_config.exists() {
        return read_config(&local_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".config").join("labor-etl").join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Invalid config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_cover_every_category() {
        let cfg = Config::default();
        assert_eq!(cfg.categories.len(), 22);
        for name in cfg.categories.values() {
            assert!(cfg.risk.ai_by_category.contains_key(name), "{name}");
            assert!(cfg.risk.robotics_by_category.contains_key(name), "{name}");
        }
        assert_eq!(cfg.states.len(), 51);
    }

    #[test]
    fn test_category_for() {
        let cfg = Config::default();
        assert_eq!(cfg.category_for("15"), "Computer and Mathematical");
        assert_eq!(cfg.category_for("55"), "Other");
    }

    #[test]
    fn test_age_curve_means_run_higher() {
        let cfg = Config::default();
        let anchor = cfg
            .wages
            .age_curve
            .iter()
            .find(|m| m.band == AgeBand::Age35To44)
            .unwrap();
        assert_eq!(anchor.median, 1.0);
        assert!((anchor.mean - 1.05).abs() < 1e-9);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let cfg: Config = toml::from_str(
            r#"
[risk]
default_score = 42.0

[income]
api_key = "secret"
"#,
        )
        .unwrap();
        assert_eq!(cfg.risk.default_score, 42.0);
        assert_eq!(cfg.risk.ai_weight, 0.6);
        assert_eq!(cfg.income.api_key.as_deref(), Some("secret"));
        assert_eq!(cfg.income.default_median, 70_000);
        assert_eq!(cfg.categories.len(), 22);
    }

    #[test]
    fn test_sources_and_tables_from_toml() {
        let cfg: Config = toml::from_str(
            r#"
[[wages.national]]
name = "mirror"
location = "/tmp/oesm23nat.zip"

[categories]
"15" = "Computing"

[[income.marital]]
status = "Married"
factor = 2.0
"#,
        )
        .unwrap();
        assert_eq!(cfg.wages.national, vec![SourceSpec::new("mirror", "/tmp/oesm23nat.zip")]);
        assert_eq!(cfg.category_for("15"), "Computing");
        assert_eq!(cfg.category_for("11"), "Other");
        assert_eq!(cfg.income.marital.len(), 1);
    }

    #[test]
    fn test_load_config_from_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".labor-etl")).unwrap();
        std::fs::write(
            dir.path().join(".labor-etl").join("config.toml"),
            "[wages]\nmin_median = 20000\n",
        )
        .unwrap();

        let cfg = load_config(dir.path(), None).unwrap();
        assert_eq!(cfg.wages.min_median, 20_000);
        assert_eq!(cfg.wages.max_median, 500_000);
    }

    #[test]
    fn test_load_config_override_missing_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(load_config(dir.path(), Some(&missing)).is_err());
    }
}
