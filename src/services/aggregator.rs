//! Pure aggregation over raw analytics events.
//!
//! Every function here is a stateless transform: same event slice in, same
//! metrics out, no I/O, no mutation of the input. Aggregation never fails.
//! Missing or malformed fields are treated as absent, so a bad tracker
//! payload cannot break the dashboard.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, Timelike, Utc, Weekday};
use serde::Serialize;

use crate::models::RawEvent;
use crate::utils::serde_num::parse_milestone;

/// Sessions shorter than this many seconds count as bounces.
const BOUNCE_THRESHOLD_SECS: f64 = 30.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicMetrics {
    pub total_views: u64,
    pub total_sessions: u64,
    /// Mean total_time over session_end events with a positive duration, in
    /// seconds. 0 when none qualify.
    pub average_session_time: f64,
    /// Share of qualifying session_end events under the bounce threshold, as
    /// a percentage of the qualifying set.
    pub bounce_rate: f64,
    /// Share of distinct sessions that produced at least one conversion
    /// event, as a percentage of total sessions.
    pub conversion_rate: f64,
    pub daily_trends: Vec<DailyTrend>,
    pub user_types: UserTypeBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTrend {
    /// UTC calendar date, "YYYY-MM-DD".
    pub date: String,
    pub sessions: u64,
    /// Mean total_time of the date's qualifying session_end events; 0 when
    /// the date has none.
    pub average_time: f64,
}

/// Pageview counts by visitor role. Anonymous visitors carry no user_role;
/// unrecognized roles are dropped rather than defaulted into a bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTypeBreakdown {
    pub buyers: u64,
    pub agents: u64,
    pub anonymous: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyInsights {
    #[serde(flatten)]
    pub basic: BasicMetrics,
    pub scroll_analytics: ScrollAnalytics,
    pub engagement_metrics: EngagementMetrics,
    pub intent_signals: IntentSignals,
    pub funnel_analysis: FunnelAnalysis,
    pub time_analysis: TimeAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollAnalytics {
    pub milestones: MilestoneCounts,
    /// Mean numeric milestone value over scroll_milestone events.
    pub average_scroll_depth: f64,
    /// scroll_complete count over total sessions, as a percentage.
    pub completion_rate: f64,
}

/// The 90% bucket is derived from scroll_complete events; the tracker emits
/// those instead of a "90%" milestone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MilestoneCounts {
    #[serde(rename = "25%")]
    pub p25: u64,
    #[serde(rename = "50%")]
    pub p50: u64,
    #[serde(rename = "75%")]
    pub p75: u64,
    #[serde(rename = "90%")]
    pub p90: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementMetrics {
    pub total_engagements: u64,
    /// Mean seconds on page before the first engagement interaction.
    pub average_time_to_engagement: f64,
    pub device_breakdown: DeviceBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceBreakdown {
    pub mobile: u64,
    pub tablet: u64,
    pub desktop: u64,
}

/// purchase_intent events by heuristic intent level. Unrecognized levels
/// count toward total but no bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentSignals {
    pub total: u64,
    pub high: u64,
    pub medium: u64,
    pub low: u64,
}

/// Sequential drop-off between the view, scroll, engagement, and contact
/// stages. Each rate is a distinct-session ratio in [0, 100]; an empty
/// denominator yields 0, never a division error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelAnalysis {
    pub view_to_scroll: f64,
    pub scroll_to_engagement: f64,
    pub engagement_to_contact: f64,
    pub overall_conversion: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeAnalysis {
    /// All 24 hours, in order. Hour-of-day follows the event's own offset.
    pub hourly: Vec<HourlyBucket>,
    /// Monday through Sunday, in order.
    pub weekdays: Vec<WeekdayBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyBucket {
    pub hour: u32,
    pub sessions: u64,
    /// Mean total_time of session_end events in this hour; 0 when none.
    pub average_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekdayBucket {
    pub weekday: String,
    pub sessions: u64,
    pub engagements: u64,
}

/// Basic metrics for the analytics endpoint.
pub fn aggregate_basic(events: &[RawEvent]) -> BasicMetrics {
    let lifecycle = distinct_lifecycle_sessions(events);
    let total_sessions = lifecycle.len() as u64;

    let qualifying_durations: Vec<f64> = events
        .iter()
        .filter(|e| e.name == "session_end")
        .filter_map(|e| e.positive_total_time())
        .collect();

    let average_session_time = round2(mean(&qualifying_durations));

    let bounces = qualifying_durations
        .iter()
        .filter(|t| **t < BOUNCE_THRESHOLD_SECS)
        .count() as u64;
    let bounce_rate = percentage(bounces, qualifying_durations.len() as u64);

    // Conversion events from sessions outside the lifecycle set are tracker
    // noise; only sessions in the denominator can convert.
    let converted = conversion_sessions(events)
        .intersection(&lifecycle)
        .count() as u64;
    let conversion_rate = percentage(converted, total_sessions);

    BasicMetrics {
        total_views: events.iter().filter(|e| e.is_pageview()).count() as u64,
        total_sessions,
        average_session_time,
        bounce_rate,
        conversion_rate,
        daily_trends: daily_trends(events),
        user_types: user_types(events),
    }
}

/// Full metrics for the insights endpoint; includes everything the analytics
/// endpoint reports.
pub fn aggregate_insights(events: &[RawEvent]) -> PropertyInsights {
    let basic = aggregate_basic(events);
    PropertyInsights {
        scroll_analytics: scroll_analytics(events, basic.total_sessions),
        engagement_metrics: engagement_metrics(events),
        intent_signals: intent_signals(events),
        funnel_analysis: funnel_analysis(events),
        time_analysis: time_analysis(events),
        basic,
    }
}

/// Distinct session ids across session lifecycle events. Events without a
/// session_id cannot be attributed and are excluded.
fn distinct_lifecycle_sessions(events: &[RawEvent]) -> HashSet<&str> {
    events
        .iter()
        .filter(|e| e.is_session_lifecycle())
        .filter_map(RawEvent::session_id)
        .collect()
}

fn conversion_sessions(events: &[RawEvent]) -> HashSet<&str> {
    events
        .iter()
        .filter(|e| e.is_conversion())
        .filter_map(RawEvent::session_id)
        .collect()
}

fn daily_trends(events: &[RawEvent]) -> Vec<DailyTrend> {
    struct DayAccum<'a> {
        sessions: HashSet<&'a str>,
        durations: Vec<f64>,
    }

    // BTreeMap keeps dates ascending and deduplicated.
    let mut days: BTreeMap<String, DayAccum> = BTreeMap::new();

    for event in events {
        if event.name != "session_start" && event.name != "session_end" {
            continue;
        }
        let date = event
            .timestamp
            .with_timezone(&Utc)
            .format("%Y-%m-%d")
            .to_string();
        let day = days.entry(date).or_insert_with(|| DayAccum {
            sessions: HashSet::new(),
            durations: Vec::new(),
        });
        if let Some(session_id) = event.session_id() {
            day.sessions.insert(session_id);
        }
        if event.name == "session_end" {
            if let Some(duration) = event.positive_total_time() {
                day.durations.push(duration);
            }
        }
    }

    days.into_iter()
        .map(|(date, day)| DailyTrend {
            date,
            sessions: day.sessions.len() as u64,
            average_time: round2(mean(&day.durations)),
        })
        .collect()
}

fn user_types(events: &[RawEvent]) -> UserTypeBreakdown {
    let mut breakdown = UserTypeBreakdown {
        buyers: 0,
        agents: 0,
        anonymous: 0,
    };
    for event in events.iter().filter(|e| e.is_pageview()) {
        match event.properties.user_role.as_deref() {
            Some("buyer") => breakdown.buyers += 1,
            Some("agent") => breakdown.agents += 1,
            None => breakdown.anonymous += 1,
            Some(_) => {}
        }
    }
    breakdown
}

fn scroll_analytics(events: &[RawEvent], total_sessions: u64) -> ScrollAnalytics {
    let mut milestones = MilestoneCounts {
        p25: 0,
        p50: 0,
        p75: 0,
        p90: 0,
    };
    let mut depths = Vec::new();

    for event in events {
        if event.name == "scroll_milestone" {
            let label = event.properties.milestone.as_deref().unwrap_or("");
            match label.trim() {
                "25%" => milestones.p25 += 1,
                "50%" => milestones.p50 += 1,
                "75%" => milestones.p75 += 1,
                _ => {}
            }
            if let Some(depth) = parse_milestone(label) {
                depths.push(depth);
            }
        } else if event.name == "scroll_complete" {
            milestones.p90 += 1;
        }
    }

    ScrollAnalytics {
        completion_rate: percentage(milestones.p90, total_sessions),
        average_scroll_depth: round2(mean(&depths)),
        milestones,
    }
}

fn engagement_metrics(events: &[RawEvent]) -> EngagementMetrics {
    let mut breakdown = DeviceBreakdown {
        mobile: 0,
        tablet: 0,
        desktop: 0,
    };
    let mut total = 0u64;
    let mut times = Vec::new();

    for event in events.iter().filter(|e| e.name == "engagement") {
        total += 1;
        if let Some(t) = event.properties.time_before_engagement {
            times.push(t);
        }
        match event.properties.device_type.as_deref() {
            Some("mobile") => breakdown.mobile += 1,
            Some("tablet") => breakdown.tablet += 1,
            Some("desktop") => breakdown.desktop += 1,
            _ => {}
        }
    }

    EngagementMetrics {
        total_engagements: total,
        average_time_to_engagement: round2(mean(&times)),
        device_breakdown: breakdown,
    }
}

fn intent_signals(events: &[RawEvent]) -> IntentSignals {
    let mut signals = IntentSignals {
        total: 0,
        high: 0,
        medium: 0,
        low: 0,
    };
    for event in events.iter().filter(|e| e.name == "purchase_intent") {
        signals.total += 1;
        match event.properties.intent_level.as_deref() {
            Some("high") => signals.high += 1,
            Some("medium") => signals.medium += 1,
            Some("low") => signals.low += 1,
            _ => {}
        }
    }
    signals
}

fn funnel_analysis(events: &[RawEvent]) -> FunnelAnalysis {
    let lifecycle = distinct_lifecycle_sessions(events);
    let started: HashSet<&str> = events
        .iter()
        .filter(|e| e.name == "session_start")
        .filter_map(RawEvent::session_id)
        .collect();
    let scrolled: HashSet<&str> = events
        .iter()
        .filter(|e| e.is_scroll())
        .filter_map(RawEvent::session_id)
        .collect();
    let engaged: HashSet<&str> = events
        .iter()
        .filter(|e| e.name == "engagement")
        .filter_map(RawEvent::session_id)
        .collect();
    let converted = conversion_sessions(events);

    // Each numerator is restricted to its denominator set: a session that
    // skipped a stage (missing lifecycle or scroll events on noisy input)
    // cannot count toward the next stage's rate.
    let scrolled_after_start = scrolled.intersection(&started).count() as u64;
    let engaged_after_scroll = engaged.intersection(&scrolled).count() as u64;
    let converted_after_engage = converted.intersection(&engaged).count() as u64;
    let converted_overall = converted.intersection(&lifecycle).count() as u64;

    FunnelAnalysis {
        view_to_scroll: percentage(scrolled_after_start, started.len() as u64),
        scroll_to_engagement: percentage(engaged_after_scroll, scrolled.len() as u64),
        engagement_to_contact: percentage(converted_after_engage, engaged.len() as u64),
        overall_conversion: percentage(converted_overall, lifecycle.len() as u64),
    }
}

fn time_analysis(events: &[RawEvent]) -> TimeAnalysis {
    let mut hourly_sessions = [0u64; 24];
    let mut hourly_durations: HashMap<usize, Vec<f64>> = HashMap::new();
    let mut weekday_sessions = [0u64; 7];
    let mut weekday_engagements = [0u64; 7];

    for event in events {
        let hour = event.timestamp.hour() as usize;
        let weekday = event.timestamp.weekday().num_days_from_monday() as usize;
        match event.name.as_str() {
            "session_start" => {
                hourly_sessions[hour] += 1;
                weekday_sessions[weekday] += 1;
            }
            "session_end" => {
                if let Some(duration) = event.positive_total_time() {
                    hourly_durations.entry(hour).or_default().push(duration);
                }
            }
            "engagement" => weekday_engagements[weekday] += 1,
            _ => {}
        }
    }

    let hourly = (0..24)
        .map(|hour| HourlyBucket {
            hour: hour as u32,
            sessions: hourly_sessions[hour],
            average_time: round2(mean(
                hourly_durations.get(&hour).map(Vec::as_slice).unwrap_or(&[]),
            )),
        })
        .collect();

    let weekdays = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ]
    .iter()
    .enumerate()
    .map(|(i, day)| WeekdayBucket {
        weekday: weekday_name(*day).to_string(),
        sessions: weekday_sessions[i],
        engagements: weekday_engagements[i],
    })
    .collect();

    TimeAnalysis { hourly, weekdays }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// numerator / denominator as a percentage, rounded to 2 decimals. Empty
/// denominator yields 0 so funnel and rate math never divides by zero.
fn percentage(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    round2(numerator as f64 / denominator as f64 * 100.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
