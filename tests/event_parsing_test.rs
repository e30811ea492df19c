// Event deserialization tests: client-side tracking is noisy, so every
// property field must parse leniently and never fail the whole event.

use listing_insights_api::models::RawEvent;

fn parse(value: serde_json::Value) -> RawEvent {
    serde_json::from_value(value).expect("event should deserialize")
}

#[test]
fn test_numeric_fields_accept_strings() {
    let event = parse(serde_json::json!({
        "event": "session_end",
        "timestamp": "2024-05-06T10:00:00+00:00",
        "properties": { "session_id": "a", "total_time": "45" }
    }));

    assert_eq!(event.properties.total_time, Some(45.0));
}

#[test]
fn test_malformed_numeric_fields_become_absent() {
    let event = parse(serde_json::json!({
        "event": "session_end",
        "timestamp": "2024-05-06T10:00:00+00:00",
        "properties": {
            "session_id": "a",
            "total_time": "not-a-number",
            "scroll_depth": { "nested": true },
            "time_before_engagement": [1, 2, 3]
        }
    }));

    assert_eq!(event.properties.total_time, None);
    assert_eq!(event.properties.scroll_depth, None);
    assert_eq!(event.properties.time_before_engagement, None);
}

#[test]
fn test_numeric_session_ids_are_stringified() {
    // Some tracker versions send session_id as a number
    let event = parse(serde_json::json!({
        "event": "session_start",
        "timestamp": "2024-05-06T10:00:00+00:00",
        "properties": { "session_id": 12345 }
    }));

    assert_eq!(event.session_id(), Some("12345"));
}

#[test]
fn test_missing_properties_default_to_empty() {
    let event = parse(serde_json::json!({
        "event": "pageview",
        "timestamp": "2024-05-06T10:00:00+00:00"
    }));

    assert_eq!(event.session_id(), None);
    assert!(event.properties.extra.is_empty());
}

#[test]
fn test_unconsumed_attributes_land_in_extra() {
    let event = parse(serde_json::json!({
        "event": "pageview",
        "timestamp": "2024-05-06T10:00:00+00:00",
        "properties": {
            "session_id": "a",
            "$browser": "Firefox",
            "referrer": "https://example.com"
        }
    }));

    assert_eq!(event.session_id(), Some("a"));
    assert_eq!(
        event.properties.extra.get("$browser"),
        Some(&serde_json::json!("Firefox"))
    );
    assert_eq!(
        event.properties.extra.get("referrer"),
        Some(&serde_json::json!("https://example.com"))
    );
}

#[test]
fn test_timestamp_offset_is_preserved() {
    let event = parse(serde_json::json!({
        "event": "session_start",
        "timestamp": "2024-05-06T09:30:00+02:00",
        "properties": { "session_id": "a" }
    }));

    assert_eq!(event.timestamp.to_rfc3339(), "2024-05-06T09:30:00+02:00");
}

#[test]
fn test_zero_and_negative_durations_are_noise() {
    let zero = parse(serde_json::json!({
        "event": "session_end",
        "timestamp": "2024-05-06T10:00:00+00:00",
        "properties": { "session_id": "a", "total_time": 0 }
    }));
    let negative = parse(serde_json::json!({
        "event": "session_end",
        "timestamp": "2024-05-06T10:00:00+00:00",
        "properties": { "session_id": "a", "total_time": -5 }
    }));

    assert_eq!(zero.positive_total_time(), None);
    assert_eq!(negative.positive_total_time(), None);
}
