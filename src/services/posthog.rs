//! PostHog event fetcher.
//!
//! One call per inbound request: fetch every event for one property inside a
//! `[start, end)` window, newest first, following pagination. No retries and
//! no caching here; if either is ever wanted it belongs in front of this
//! client, keyed by (property_id, window).

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::RawEvent;

/// Upper bound on pagination follow-ups for one fetch. 10 pages x 500 events
/// is far beyond what a single property accrues in a 365-day window.
const MAX_PAGES: usize = 10;
const PAGE_LIMIT: &str = "500";

#[derive(Debug, Error)]
pub enum FetchError {
    /// POSTHOG_PROJECT_ID / POSTHOG_API_KEY not set. Distinct from upstream
    /// failure so the caller can answer 503 ("configuration pending") instead
    /// of 502.
    #[error("PostHog credentials are not configured")]
    ConfigMissing,
    #[error("PostHog returned status {0}")]
    UpstreamStatus(u16),
    #[error("PostHog request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Clone)]
struct Credentials {
    project_id: String,
    api_key: String,
}

#[derive(Clone)]
pub struct PostHogClient {
    http: reqwest::Client,
    host: String,
    credentials: Option<Credentials>,
}

#[derive(Deserialize)]
struct EventsPage {
    #[serde(default)]
    results: Vec<serde_json::Value>,
    #[serde(default)]
    next: Option<String>,
}

impl PostHogClient {
    pub fn from_config(config: &Config) -> Self {
        let credentials = match (&config.posthog_project_id, &config.posthog_api_key) {
            (Some(project_id), Some(api_key)) => Some(Credentials {
                project_id: project_id.clone(),
                api_key: api_key.clone(),
            }),
            _ => None,
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            host: config.posthog_host.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    /// Fetch all events for one property in `[start, end)`, ordered newest
    /// first by PostHog. Events that fail to deserialize (unparseable
    /// timestamps, wrong envelope) are skipped with a warning; a noisy
    /// tracker must not take the dashboard down.
    pub async fn fetch_property_events(
        &self,
        property_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RawEvent>, FetchError> {
        let credentials = self.credentials.as_ref().ok_or(FetchError::ConfigMissing)?;

        let property_filter = serde_json::json!([{
            "key": "property_id",
            "value": property_id,
            "operator": "exact",
        }]);

        let first_page = format!(
            "{}/api/projects/{}/events/",
            self.host, credentials.project_id
        );

        let mut events = Vec::new();
        let mut next_url: Option<String> = None;

        for page in 0..MAX_PAGES {
            let request = match &next_url {
                // `next` links already carry the query string.
                Some(url) => self.http.get(url),
                None => self.http.get(&first_page).query(&[
                    ("after", start.to_rfc3339()),
                    ("before", end.to_rfc3339()),
                    ("properties", property_filter.to_string()),
                    ("limit", PAGE_LIMIT.to_string()),
                ]),
            };

            let response = request.bearer_auth(&credentials.api_key).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::UpstreamStatus(status.as_u16()));
            }

            let body: EventsPage = response.json().await?;
            for value in body.results {
                match serde_json::from_value::<RawEvent>(value) {
                    Ok(event) => events.push(event),
                    Err(e) => warn!("Skipping malformed PostHog event: {}", e),
                }
            }

            match body.next {
                Some(url) => next_url = Some(url),
                None => break,
            }

            if page + 1 == MAX_PAGES {
                warn!(
                    "PostHog pagination cap reached for property {} ({} events fetched)",
                    property_id,
                    events.len()
                );
            }
        }

        debug!(
            "Fetched {} PostHog events for property {}",
            events.len(),
            property_id
        );
        Ok(events)
    }
}
