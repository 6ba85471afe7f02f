use anyhow::Result;
use reqwest::Client;

use crate::config::SourceSpec;

/// The source that supplied a value, and the ones tried before it.
#[derive(Debug, Clone)]
pub struct Selection<T> {
    pub value: T,
    pub source: SourceSpec,
    pub failures: Vec<SourceFailure>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceFailure {
    pub source: SourceSpec,
    pub reason: String,
}

impl std::fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.source.name, self.source.location, self.reason)
    }
}

/// Every source in the chain failed.
#[derive(Debug, Clone)]
pub struct Exhausted {
    pub failures: Vec<SourceFailure>,
}

impl std::fmt::Display for Exhausted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.failures.is_empty() {
            return write!(f, "no sources configured");
        }
        let attempts: Vec<String> = self.failures.iter().map(ToString::to_string).collect();
        write!(f, "all sources failed: {}", attempts.join("; "))
    }
}

impl std::error::Error for Exhausted {}

/// Load each source in order and return the first that `parse` accepts.
pub async fn select_first<T, F>(
    client: &Client,
    sources: &[SourceSpec],
    quiet: bool,
    parse: F,
) -> Result<Selection<T>, Exhausted>
where
    F: Fn(&SourceSpec, &[u8]) -> Result<T>,
{
    let mut failures = Vec::new();

    for source in sources {
        let outcome = match super::load(client, &source.location, quiet).await {
            Ok(bytes) => parse(source, &bytes),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(value) => {
                return Ok(Selection {
                    value,
                    source: source.clone(),
                    failures,
                })
            }
            Err(e) => failures.push(SourceFailure {
                source: source.clone(),
                reason: format!("{:#}", e),
            }),
        }
    }

    Err(Exhausted { failures })
}

/// Prepend an ad-hoc location given on the command line.
pub fn with_override(name: &str, location: Option<&str>, configured: &[SourceSpec]) -> Vec<SourceSpec> {
    let mut sources = Vec::with_capacity(configured.len() + 1);
    if let Some(location) = location {
        sources.push(SourceSpec::new(name, location));
    }
    sources.extend_from_slice(configured);
    sources
}
