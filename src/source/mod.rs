//! Fetching upstream data.
//!
//! - [`chain`]: ordered lists of named sources; the first one that loads and
//!   parses is selected and every failed attempt is kept.
//! - [`census`]: Census ACS API queries returning row tables.
//!
//! Every network call is a single attempt bounded by the client's timeout.

pub mod census;
pub mod chain;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;

use crate::config::HttpConfig;

/// Build the HTTP client used for one job's requests.
pub fn build_client(http: &HttpConfig, timeout_secs: u64) -> Result<Client> {
    let client = Client::builder()
        .user_agent(http.user_agent.as_str())
        .timeout(Duration::from_secs(timeout_secs))
        .build()?;
    Ok(client)
}

pub fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Read a location's raw bytes: download a URL or read a local file.
pub async fn load(client: &Client, location: &str, quiet: bool) -> Result<Vec<u8>> {
    if is_url(location) {
        download(client, location, quiet).await
    } else {
        std::fs::read(Path::new(location)).with_context(|| format!("Failed to read {}", location))
    }
}

async fn download(client: &Client, url: &str, quiet: bool) -> Result<Vec<u8>> {
    let mut response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Request to {} failed", url))?
        .error_for_status()?;

    let pb = if quiet {
        None
    } else {
        Some(progress_bar(response.content_length(), url)?)
    };

    let mut bytes = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if let Some(pb) = &pb {
            pb.inc(chunk.len() as u64);
        }
        bytes.extend_from_slice(&chunk);
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    Ok(bytes)
}

fn progress_bar(length: Option<u64>, url: &str) -> Result<ProgressBar> {
    let name = url.rsplit('/').next().unwrap_or(url).to_string();
    let pb = match length {
        Some(len) => {
            let pb = ProgressBar::new(len);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}",
                    )?
                    .progress_chars("#>-"),
            );
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {bytes} {msg}")?);
            pb
        }
    };
    pb.set_message(name);
    Ok(pb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://www.bls.gov/oes/special.requests/oesm23nat.zip"));
        assert!(is_url("http://localhost:8080/x.csv"));
        assert!(!is_url("data/oesm23nat.zip"));
        assert!(!is_url("/tmp/exposure.csv"));
    }

    #[tokio::test]
    async fn test_load_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.csv");
        std::fs::write(&path, "A\n1\n").unwrap();

        let client = build_client(&HttpConfig::default(), 5).unwrap();
        let bytes = load(&client, path.to_str().unwrap(), true).await.unwrap();
        assert_eq!(bytes, b"A\n1\n");
    }

    #[tokio::test]
    async fn test_load_missing_file_is_error() {
        let client = build_client(&HttpConfig::default(), 5).unwrap();
        let err = load(&client, "/definitely/not/here.zip", true).await.unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.zip"));
    }
}
