//! Raw analytics events as returned by the PostHog events API.
//!
//! Events are read-only inputs: the fetcher deserializes them once and the
//! aggregator never mutates them. Every attribute the aggregator consumes has
//! an explicit typed field; anything else lands in the flattened `extra` map
//! so new client-side attributes never break deserialization.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::utils::serde_num::{lenient_f64, lenient_string};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawEvent {
    /// Event discriminator; PostHog serializes this as "event" ("$pageview",
    /// "session_start", "scroll_milestone", ...).
    #[serde(rename = "event")]
    pub name: String,
    /// Offset is preserved so hour-of-day and weekday breakdowns follow the
    /// event's own local clock.
    pub timestamp: DateTime<FixedOffset>,
    #[serde(default)]
    pub properties: EventProperties,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EventProperties {
    #[serde(default, deserialize_with = "lenient_string")]
    pub property_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub session_id: Option<String>,
    /// Total session duration in seconds (session_end events).
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_time: Option<f64>,
    /// Seconds of foreground activity within the session.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub active_time: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub scroll_depth: Option<f64>,
    /// Scroll checkpoint label, e.g. "25%".
    #[serde(default, deserialize_with = "lenient_string")]
    pub milestone: Option<String>,
    /// "high" | "medium" | "low" (purchase_intent events).
    #[serde(default, deserialize_with = "lenient_string")]
    pub intent_level: Option<String>,
    /// "mobile" | "tablet" | "desktop" (engagement events).
    #[serde(default, deserialize_with = "lenient_string")]
    pub device_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub time_before_engagement: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub user_id: Option<String>,
    /// "buyer" | "agent"; absent for anonymous visitors.
    #[serde(default, deserialize_with = "lenient_string")]
    pub user_role: Option<String>,
    /// Attributes the aggregator does not consume, kept for includeEvents.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl RawEvent {
    /// Pageview-class events: bare "pageview" from our tracker, "$pageview"
    /// from PostHog autocapture.
    pub fn is_pageview(&self) -> bool {
        self.name == "pageview" || self.name == "$pageview"
    }

    /// Session lifecycle events, which carry the session_id that defines
    /// distinct sessions.
    pub fn is_session_lifecycle(&self) -> bool {
        matches!(
            self.name.as_str(),
            "session_start" | "session_end" | "session_heartbeat"
        )
    }

    pub fn is_scroll(&self) -> bool {
        self.name == "scroll_milestone" || self.name == "scroll_complete"
    }

    /// Conversion events signal contact intent: visit requests, favorites,
    /// and any contact-agent interaction.
    pub fn is_conversion(&self) -> bool {
        self.name.contains("visit_request")
            || self.name.contains("favorite")
            || self.name.contains("contact")
    }

    pub fn session_id(&self) -> Option<&str> {
        self.properties.session_id.as_deref()
    }

    /// total_time when present and positive; zero and negative durations are
    /// tracker noise and treated as absent.
    pub fn positive_total_time(&self) -> Option<f64> {
        self.properties.total_time.filter(|t| *t > 0.0)
    }
}
