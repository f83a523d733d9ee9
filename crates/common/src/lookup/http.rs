//! HTTP case registry client

use super::CaseLookup;
use crate::errors::{CiteError, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

/// Registry response for one case number
#[derive(Deserialize)]
struct RegistryResponse {
    ecli: Option<String>,
}

/// Case lookup against a registry exposing `GET {base_url}/cases?number=<case number>`
pub struct HttpCaseLookup {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl HttpCaseLookup {
    /// Create a new registry client
    pub fn new(base_url: String, timeout: Duration, max_retries: u32) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries: max_retries.max(1),
        })
    }

    /// Make request with retry
    async fn request_with_retry(&self, case_number: &str) -> Result<Option<String>> {
        let mut last_error = None;

        for attempt in 0..self.max_retries {
            if attempt > 0 {
                // Exponential backoff
                let delay = Duration::from_millis(100 * (2_u64.pow(attempt)));
                tokio::time::sleep(delay).await;
            }

            match self.make_request(case_number).await {
                Ok(identifier) => return Ok(identifier),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        case_number = case_number,
                        error = %e,
                        "Registry request failed, retrying"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CiteError::LookupFailed {
            token: case_number.to_string(),
            message: "Unknown error after retries".to_string(),
        }))
    }

    async fn make_request(&self, case_number: &str) -> Result<Option<String>> {
        let url = format!("{}/cases", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("number", case_number)])
            .send()
            .await
            .map_err(|e| CiteError::LookupFailed {
                token: case_number.to_string(),
                message: format!("Request failed: {}", e),
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CiteError::LookupFailed {
                token: case_number.to_string(),
                message: format!("Registry error {}: {}", status, body),
            });
        }

        let result: RegistryResponse = response.json().await.map_err(|e| {
            CiteError::LookupFailed {
                token: case_number.to_string(),
                message: format!("Failed to parse response: {}", e),
            }
        })?;

        Ok(result.ecli.filter(|ecli| !ecli.is_empty()))
    }
}

#[async_trait]
impl CaseLookup for HttpCaseLookup {
    async fn lookup(&self, case_number: &str) -> Result<Option<String>> {
        self.request_with_retry(case_number).await
    }

    fn name(&self) -> &str {
        "http"
    }
}
