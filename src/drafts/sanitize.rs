//! Repair of draft payloads read back from storage.
//!
//! Stored drafts may come from older builds or have been edited by hand, so
//! they are cleaned as raw JSON before typed deserialization: anything that
//! cannot be salvaged is dropped or reset to a neutral value instead of
//! failing the whole draft.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::models::{
    CustomerType, IssueType, Priority, ReportFormData, RoofType, Severity, Urgency,
};
use super::ReportDraft;

const COST_FIELDS: &[&str] = &["laborCost", "materialCost", "travelCost", "overheadCost"];
const TEXT_FIELDS: &[&str] = &["customerName", "customerAddress", "conditionNotes"];
const OPTIONAL_TEXT_FIELDS: &[&str] = &[
    "customerId",
    "customerPhone",
    "customerEmail",
    "buildingId",
    "buildingAddress",
];

/// Sanitize a whole stored draft. Returns `None` when the envelope itself is
/// unusable (no data object, or no readable save time).
pub fn sanitize_draft(raw: Value) -> Option<ReportDraft> {
    let Value::Object(mut envelope) = raw else {
        return None;
    };

    let saved_at = envelope.get("savedAt").and_then(parse_timestamp)?;
    let user_id = envelope.get("userId").and_then(Value::as_str)?.to_string();
    let step = envelope
        .get("step")
        .and_then(as_number)
        .map(|n| n.round().clamp(1.0, 4.0) as u8)
        .unwrap_or(1);
    let data = sanitize_form(envelope.remove("data")?)?;

    Some(ReportDraft { user_id, step, data, saved_at })
}

/// Sanitize form data on its own.
pub fn sanitize_form(raw: Value) -> Option<ReportFormData> {
    let Value::Object(mut form) = raw else {
        return None;
    };

    for field in TEXT_FIELDS {
        if !form.get(*field).is_some_and(Value::is_string) {
            form.insert((*field).to_string(), Value::String(String::new()));
        }
    }
    for field in OPTIONAL_TEXT_FIELDS {
        if !form.get(*field).is_some_and(Value::is_string) {
            form.remove(*field);
        }
    }

    normalize_date(&mut form, "inspectionDate");
    keep_if_parses::<RoofType>(&mut form, "roofType");
    keep_if_parses::<CustomerType>(&mut form, "customerType");

    match form.get("roofAge").and_then(as_number) {
        Some(age) if (0.0..=100.0).contains(&age) => {
            form.insert("roofAge".into(), Value::from(age.round() as i64));
        }
        _ => {
            form.remove("roofAge");
        }
    }

    match form.get("roofSizeM2").and_then(as_number) {
        Some(size) if size >= 0.0 => {
            form.insert("roofSizeM2".into(), Value::from(size));
        }
        _ => {
            form.remove("roofSizeM2");
        }
    }

    for field in COST_FIELDS {
        let cost = form.get(*field).and_then(as_number).filter(|c| *c >= 0.0).unwrap_or(0.0);
        form.insert((*field).to_string(), Value::from(cost));
    }

    let outline = take_array(&mut form, "roofOutline")
        .into_iter()
        .filter_map(sanitize_point)
        .collect();
    form.insert("roofOutline".into(), Value::Array(outline));

    let issues = take_array(&mut form, "issuesFound")
        .into_iter()
        .filter_map(|v| match v {
            Value::Object(issue) => Some(Value::Object(sanitize_issue(issue))),
            _ => None,
        })
        .collect();
    form.insert("issuesFound".into(), Value::Array(issues));

    let actions = take_array(&mut form, "recommendedActions")
        .into_iter()
        .filter_map(|v| match v {
            Value::Object(action) => Some(Value::Object(sanitize_action(action))),
            _ => None,
        })
        .collect();
    form.insert("recommendedActions".into(), Value::Array(actions));

    match serde_json::from_value(Value::Object(form)) {
        Ok(data) => Some(data),
        Err(e) => {
            debug!(error = %e, "Draft data still unreadable after sanitizing");
            None
        }
    }
}

fn sanitize_issue(mut issue: Map<String, Value>) -> Map<String, Value> {
    ensure_id(&mut issue);
    if !issue.get("description").is_some_and(Value::is_string) {
        issue.insert("description".into(), Value::String(String::new()));
    }
    if !issue.get("location").is_some_and(Value::is_string) {
        issue.remove("location");
    }
    keep_if_parses::<IssueType>(&mut issue, "type");
    keep_if_parses::<Severity>(&mut issue, "severity");

    let images = take_array(&mut issue, "images")
        .into_iter()
        .filter(Value::is_string)
        .collect();
    issue.insert("images".into(), Value::Array(images));

    if let Some(pin) = issue.remove("mapPin").and_then(sanitize_point) {
        issue.insert("mapPin".into(), pin);
    }
    let image_pin = issue.remove("imagePin").and_then(|pin| {
        let x = pin.get("x").and_then(as_number)?;
        let y = pin.get("y").and_then(as_number)?;
        Some(serde_json::json!({ "x": x.clamp(0.0, 100.0), "y": y.clamp(0.0, 100.0) }))
    });
    if let Some(pin) = image_pin {
        issue.insert("imagePin".into(), pin);
    }
    issue
}

fn sanitize_action(mut action: Map<String, Value>) -> Map<String, Value> {
    ensure_id(&mut action);
    if !action.get("description").is_some_and(Value::is_string) {
        action.insert("description".into(), Value::String(String::new()));
    }
    keep_if_parses::<Priority>(&mut action, "priority");
    keep_if_parses::<Urgency>(&mut action, "urgency");
    match action.get("estimatedCost").and_then(as_number) {
        Some(cost) if cost >= 0.0 => {
            action.insert("estimatedCost".into(), Value::from(cost));
        }
        _ => {
            action.remove("estimatedCost");
        }
    }
    action
}

fn sanitize_point(value: Value) -> Option<Value> {
    let lat = value.get("lat").and_then(as_number)?;
    let lon = value.get("lon").or_else(|| value.get("lng")).and_then(as_number)?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return None;
    }
    Some(serde_json::json!({ "lat": lat, "lon": lon }))
}

fn ensure_id(map: &mut Map<String, Value>) {
    let has_id = map.get("id").and_then(Value::as_str).is_some_and(|s| !s.is_empty());
    if !has_id {
        map.insert("id".into(), Value::String(uuid::Uuid::new_v4().to_string()));
    }
}

fn take_array(map: &mut Map<String, Value>, key: &str) -> Vec<Value> {
    match map.remove(key) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

/// Drop `key` unless its value deserializes as `T`, letting the serde default apply.
fn keep_if_parses<T: DeserializeOwned>(map: &mut Map<String, Value>, key: &str) {
    let parses = map
        .get(key)
        .is_some_and(|v| serde_json::from_value::<T>(v.clone()).is_ok());
    if !parses {
        map.remove(key);
    }
}

/// Accept `YYYY-MM-DD` or a full RFC 3339 timestamp; store the date part only.
fn normalize_date(map: &mut Map<String, Value>, key: &str) {
    let parsed = map.get(key).and_then(Value::as_str).and_then(|s| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
    });
    match parsed {
        Some(date) => {
            map.insert(key.to_string(), Value::String(date.format("%Y-%m-%d").to_string()));
        }
        None => {
            map.remove(key);
        }
    }
}

/// Numbers, or strings holding a number. Non-finite values are rejected.
fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// RFC 3339 strings or epoch milliseconds.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(data: Value) -> Value {
        json!({
            "userId": "u-1",
            "step": 2,
            "savedAt": "2026-06-01T10:00:00Z",
            "data": data,
        })
    }

    #[test]
    fn test_malformed_date_dropped() {
        let form = sanitize_form(json!({ "customerName": "A", "inspectionDate": "31/02/2026" })).unwrap();
        assert!(form.inspection_date.is_none());

        let form = sanitize_form(json!({ "inspectionDate": "2026-02-30" })).unwrap();
        assert!(form.inspection_date.is_none());
    }

    #[test]
    fn test_rfc3339_date_normalized() {
        let form = sanitize_form(json!({ "inspectionDate": "2026-04-12T08:30:00+02:00" })).unwrap();
        assert_eq!(form.inspection_date, NaiveDate::from_ymd_opt(2026, 4, 12));
    }

    #[test]
    fn test_non_array_issues_become_empty() {
        let form = sanitize_form(json!({ "issuesFound": "leak on north side" })).unwrap();
        assert!(form.issues_found.is_empty());

        let form = sanitize_form(json!({ "issuesFound": { "0": { "description": "x" } } })).unwrap();
        assert!(form.issues_found.is_empty());
    }

    #[test]
    fn test_non_object_issue_entries_dropped() {
        let form = sanitize_form(json!({
            "issuesFound": [null, 3, { "description": "Cracked tiles", "type": "damage", "severity": "urgent" }]
        }))
        .unwrap();
        assert_eq!(form.issues_found.len(), 1);
        let issue = &form.issues_found[0];
        assert_eq!(issue.issue_type, IssueType::Damage);
        assert_eq!(issue.severity, Severity::Medium);
        assert!(!issue.id.is_empty());
    }

    #[test]
    fn test_roof_age_out_of_range_cleared() {
        assert!(sanitize_form(json!({ "roofAge": 150 })).unwrap().roof_age.is_none());
        assert!(sanitize_form(json!({ "roofAge": -1 })).unwrap().roof_age.is_none());
        assert!(sanitize_form(json!({ "roofAge": "old" })).unwrap().roof_age.is_none());
        assert_eq!(sanitize_form(json!({ "roofAge": "40" })).unwrap().roof_age, Some(40));
        assert_eq!(sanitize_form(json!({ "roofAge": 100 })).unwrap().roof_age, Some(100));
    }

    #[test]
    fn test_negative_costs_reset() {
        let form = sanitize_form(json!({ "laborCost": -200, "materialCost": "350.5", "travelCost": null })).unwrap();
        assert_eq!(form.costs.labor_cost, 0.0);
        assert_eq!(form.costs.material_cost, 350.5);
        assert_eq!(form.costs.travel_cost, 0.0);
    }

    #[test]
    fn test_unknown_roof_type_cleared() {
        let form = sanitize_form(json!({ "roofType": "thatch", "customerType": "company" })).unwrap();
        assert!(form.roof_type.is_none());
        assert_eq!(form.customer_type, CustomerType::Company);
    }

    #[test]
    fn test_wrong_type_text_fields_reset() {
        let form = sanitize_form(json!({ "customerName": 42, "customerEmail": false })).unwrap();
        assert_eq!(form.customer_name, "");
        assert!(form.customer_email.is_none());
    }

    #[test]
    fn test_outline_points_filtered() {
        let form = sanitize_form(json!({
            "roofOutline": [{ "lat": 55.1, "lng": 12.2 }, { "lat": "x", "lon": 1 }, { "lat": 95, "lon": 1 }]
        }))
        .unwrap();
        assert_eq!(form.roof_outline.len(), 1);
        assert_eq!(form.roof_outline[0].lon, 12.2);
    }

    #[test]
    fn test_action_cost_cleaned() {
        let form = sanitize_form(json!({
            "recommendedActions": [{ "description": "Clean gutters", "estimatedCost": -10, "urgency": "soon" }]
        }))
        .unwrap();
        let action = &form.recommended_actions[0];
        assert!(action.estimated_cost.is_none());
        assert_eq!(action.urgency, Urgency::ShortTerm);
    }

    #[test]
    fn test_draft_envelope() {
        let draft = sanitize_draft(envelope(json!({ "customerName": "Birthe" }))).unwrap();
        assert_eq!(draft.user_id, "u-1");
        assert_eq!(draft.step, 2);
        assert_eq!(draft.data.customer_name, "Birthe");
    }

    #[test]
    fn test_draft_epoch_millis_timestamp() {
        let raw = json!({ "userId": "u-1", "savedAt": 1_780_000_000_000i64, "data": {} });
        let draft = sanitize_draft(raw).unwrap();
        assert_eq!(draft.saved_at.timestamp_millis(), 1_780_000_000_000);
        assert_eq!(draft.step, 1);
    }

    #[test]
    fn test_draft_without_timestamp_rejected() {
        let raw = json!({ "userId": "u-1", "data": {} });
        assert!(sanitize_draft(raw).is_none());
    }

    #[test]
    fn test_draft_with_non_object_data_rejected() {
        let mut raw = envelope(json!([]));
        assert!(sanitize_draft(raw.clone()).is_none());
        raw["data"] = json!("oops");
        assert!(sanitize_draft(raw).is_none());
    }

    #[test]
    fn test_step_clamped() {
        let mut raw = envelope(json!({}));
        raw["step"] = json!(12);
        assert_eq!(sanitize_draft(raw).unwrap().step, 4);
    }
}
