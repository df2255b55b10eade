//! Gamma API client for market data
//!
//! Returns raw JSON records; turning them into opportunities is the scanner's job.

use crate::config::GammaConfig;
use crate::error::{Result, ScannerError};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Gamma API client for market data
#[derive(Clone)]
pub struct GammaClient {
    http: Client,
    base_url: String,
    page_size: usize,
}

impl GammaClient {
    /// Create a new Gamma client
    pub fn new(config: &GammaConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            page_size: config.page_size.max(1),
        })
    }

    /// Active, open markets ordered by 24h volume, paged until `max` records,
    /// a short page, or the first failed request
    pub async fn fetch_active_markets(&self, max: usize) -> Result<Vec<Value>> {
        let url = format!("{}/markets", self.base_url);
        let mut markets: Vec<Value> = Vec::new();
        let mut offset = 0;

        while markets.len() < max {
            let limit = self.page_size.to_string();
            let offset_str = offset.to_string();
            let resp = self
                .http
                .get(&url)
                .query(&[
                    ("limit", limit.as_str()),
                    ("offset", offset_str.as_str()),
                    ("active", "true"),
                    ("closed", "false"),
                    ("order", "volume24hr"),
                    ("ascending", "false"),
                ])
                .send()
                .await;

            let page = match resp {
                Ok(r) if r.status().is_success() => match r.json::<Vec<Value>>().await {
                    Ok(page) => page,
                    Err(e) => {
                        warn!("Failed to parse markets page at offset {}: {}", offset, e);
                        break;
                    }
                },
                Ok(r) => {
                    warn!("Markets request at offset {} returned {}", offset, r.status());
                    break;
                }
                Err(e) => {
                    // Keep what we already have
                    if markets.is_empty() {
                        return Err(e.into());
                    }
                    warn!("Markets request at offset {} failed: {}", offset, e);
                    break;
                }
            };

            let count = page.len();
            debug!("Fetched {} markets at offset {}", count, offset);
            markets.extend(page);
            offset += self.page_size;

            if count < self.page_size {
                break;
            }
        }

        markets.truncate(max);
        Ok(markets)
    }

    /// Active events with their nested markets
    pub async fn fetch_events(&self, limit: usize) -> Result<Vec<Value>> {
        let url = format!("{}/events", self.base_url);
        let limit = limit.to_string();
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("active", "true"),
                ("closed", "false"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ScannerError::Api(format!(
                "events request returned {}",
                resp.status()
            )));
        }

        let events: Vec<Value> = resp.json().await?;
        debug!("Fetched {} events", events.len());
        Ok(events)
    }

    /// One event or market by slug or id.
    ///
    /// Tries `/events?slug=`, `/events/{id}`, `/markets/{id}`, `/markets?slug=` in
    /// that order; a failed or empty lookup moves on to the next. `Ok(None)` when
    /// nothing matched.
    pub async fn fetch_market(&self, id_or_slug: &str) -> Result<Option<Value>> {
        let id = id_or_slug.trim();
        if id.is_empty() {
            return Ok(None);
        }

        let lookups = [
            (format!("{}/events", self.base_url), true),
            (format!("{}/events/{}", self.base_url, id), false),
            (format!("{}/markets/{}", self.base_url, id), false),
            (format!("{}/markets", self.base_url), true),
        ];

        for (url, by_slug) in lookups {
            let mut req = self.http.get(&url);
            if by_slug {
                req = req.query(&[("slug", id)]);
            }

            let body = match req.send().await {
                Ok(r) if r.status().is_success() => r.json::<Value>().await,
                Ok(r) => {
                    debug!("Lookup {} returned {}", url, r.status());
                    continue;
                }
                Err(e) => {
                    debug!("Lookup {} failed: {}", url, e);
                    continue;
                }
            };

            match body {
                Ok(body) => {
                    if let Some(found) = single_record(body) {
                        return Ok(Some(found));
                    }
                }
                Err(e) => warn!("Unparseable response from {}: {}", url, e),
            }
        }

        Ok(None)
    }
}

/// First element of a list response, or the object itself
fn single_record(body: Value) -> Option<Value> {
    match body {
        Value::Array(items) => items.into_iter().find(Value::is_object),
        Value::Object(_) => Some(body),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_record_shapes() {
        assert_eq!(single_record(json!([{"id": "1"}, {"id": "2"}])), Some(json!({"id": "1"})));
        assert_eq!(single_record(json!({"id": "3"})), Some(json!({"id": "3"})));
        assert_eq!(single_record(json!([])), None);
        assert_eq!(single_record(json!(null)), None);
    }

    #[test]
    fn test_client_trims_base_url() {
        let config = GammaConfig {
            base_url: "https://example.test/".to_string(),
            ..GammaConfig::default()
        };
        let client = GammaClient::new(&config).unwrap();
        assert_eq!(client.base_url, "https://example.test");
    }
}
