use crate::event_time::{
    derive_default_date_time, normalize_instant, normalize_recurrence_end, Role, TimeFieldError,
};
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use chrono::Local;
use serde_json::{json, Map, Value};

fn time_field_err(id: &str, e: TimeFieldError) -> Value {
    let value = match &e {
        TimeFieldError::InvalidDate(s)
        | TimeFieldError::InvalidTime(s)
        | TimeFieldError::InvalidInstant(s) => s.clone(),
    };
    err(id, "invalid_format", e.to_string(), Some(json!({ "value": value })))
}

/// Blank strings from the form count as absent, like the form's own
/// truthiness checks did in the predecessor.
fn opt_str_param<'a>(params: &'a Value, field: &str) -> Option<&'a str> {
    params
        .get(field)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Merges the normalized `start`/`end` instants and the recurrence end into
/// the submitted form snapshot. The raw date/time fields stay in the payload
/// alongside the instants; the backend ignores what it does not know.
fn handle_build_payload(req: &Request) -> Value {
    let Some(form) = req.params.as_object() else {
        return err(
            &req.id,
            "bad_params",
            "params must be the event form object",
            None,
        );
    };

    let Some(date) = opt_str_param(&req.params, "date") else {
        return err(&req.id, "bad_params", "missing date", None);
    };
    let all_day = req
        .params
        .get("allDay")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    let start_time = opt_str_param(&req.params, "startTime");
    let end_time = opt_str_param(&req.params, "endTime");

    let start = match normalize_instant(date, start_time, all_day, Role::Start) {
        Ok(v) => v,
        Err(e) => return time_field_err(&req.id, e),
    };
    let end = match normalize_instant(date, end_time, all_day, Role::End) {
        Ok(v) => v,
        Err(e) => return time_field_err(&req.id, e),
    };

    // The form may hold the recurrence end nested or flat; the payload always
    // nests it under `recurring`.
    let end_recurring_raw = req
        .params
        .get("recurring")
        .and_then(|r| r.get("endRecurring"))
        .or_else(|| req.params.get("endRecurring"))
        .and_then(|v| v.as_str());
    let end_recurring = match normalize_recurrence_end(end_recurring_raw) {
        Ok(v) => v,
        Err(e) => return time_field_err(&req.id, e),
    };

    let mut payload = form.clone();
    payload.remove("endRecurring");
    let mut recurring = match payload.remove("recurring") {
        Some(Value::Object(m)) => m,
        _ => Map::new(),
    };
    recurring.remove("endRecurring");
    if let Some(instant) = end_recurring {
        recurring.insert("endRecurring".to_string(), json!(instant));
    }
    payload.insert("recurring".to_string(), Value::Object(recurring));
    payload.insert("start".to_string(), json!(start));
    payload.insert("end".to_string(), json!(end));
    payload.insert("allDay".to_string(), json!(all_day));

    ok(&req.id, json!({ "payload": Value::Object(payload) }))
}

/// Seeds the event edit form from a stored event, or from the current wall
/// clock in create mode. The event's single calendar date comes from its
/// start instant.
fn handle_seed_form(req: &Request) -> Value {
    let event = req.params.get("event").filter(|v| !v.is_null());
    let all_day = event
        .and_then(|e| e.get("allDay"))
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    let start_instant = event.and_then(|e| e.get("start")).and_then(|v| v.as_str());
    let end_instant = event.and_then(|e| e.get("end")).and_then(|v| v.as_str());

    let now = Local::now().naive_local();
    let start_seed = match derive_default_date_time(start_instant, all_day, now) {
        Ok(v) => v,
        Err(e) => return time_field_err(&req.id, e),
    };
    let end_seed = match derive_default_date_time(end_instant, all_day, now) {
        Ok(v) => v,
        Err(e) => return time_field_err(&req.id, e),
    };

    ok(
        &req.id,
        json!({
            "date": start_seed.date,
            "startTime": start_seed.time,
            "endTime": end_seed.time,
            "allDay": all_day,
        }),
    )
}

pub fn try_handle(_state: &mut AppState, req: &Request) -> Option<Value> {
    match req.method.as_str() {
        "events.buildPayload" => Some(handle_build_payload(req)),
        "events.seedForm" => Some(handle_seed_form(req)),
        _ => None,
    }
}
