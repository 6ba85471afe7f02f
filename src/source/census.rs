use anyhow::{bail, Context, Result};
use reqwest::Client;

use crate::config::IncomeConfig;
use crate::table::Table;

/// Column holding the state FIPS code in `for=state:*` responses.
pub const STATE_COLUMN: &str = "state";

pub const MEDIAN_HOUSEHOLD_INCOME: &str = "B19013_001E";
pub const AGGREGATE_HOUSEHOLD_INCOME: &str = "B19025_001E";
pub const TOTAL_HOUSEHOLDS: &str = "B19001_001E";

/// B20004 median earnings: male 16-24, 25-44, 45-64, 65+.
pub const MALE_EARNINGS: [&str; 4] = ["B20004_002E", "B20004_003E", "B20004_004E", "B20004_005E"];
/// B20004 median earnings: female 16-24, 25-44, 45-64, 65+.
pub const FEMALE_EARNINGS: [&str; 4] = ["B20004_007E", "B20004_008E", "B20004_009E", "B20004_010E"];

pub fn overall_variables() -> Vec<&'static str> {
    vec![
        "NAME",
        MEDIAN_HOUSEHOLD_INCOME,
        AGGREGATE_HOUSEHOLD_INCOME,
        TOTAL_HOUSEHOLDS,
    ]
}

pub fn age_gender_variables() -> Vec<&'static str> {
    let mut variables = vec!["NAME"];
    variables.extend(MALE_EARNINGS);
    variables.extend(FEMALE_EARNINGS);
    variables
}

/// Query the ACS API for `variables` across every state.
pub async fn fetch_table(client: &Client, cfg: &IncomeConfig, variables: &[&str]) -> Result<Table> {
    let mut query = vec![
        ("get", variables.join(",")),
        ("for", "state:*".to_string()),
    ];
    if let Some(key) = &cfg.api_key {
        query.push(("key", key.clone()));
    }

    let response = client
        .get(&cfg.base_url)
        .query(&query)
        .send()
        .await
        .with_context(|| format!("Request to {} failed", cfg.base_url))?;

    if !response.status().is_success() {
        bail!("Census API returned {}", response.status());
    }

    let data: serde_json::Value = response
        .json()
        .await
        .context("Census API response is not JSON")?;
    Table::from_json_rows(&data)
}
