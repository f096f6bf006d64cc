//! Export-file parser — turns a chat-export JSON document into job records.
//!
//! Accepts either a Telegram-style `{"messages": [...]}` document or a bare
//! array of items. Items with `"type": "message"` become job records;
//! rich-text bodies (strings, lists, nested objects carrying `text` keys)
//! are flattened to plain text. Missing ids are assigned positionally and
//! unparseable dates are tolerated as `None`.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

use crate::errors::AppError;
use crate::models::job::JobRecord;

pub fn parse_export(bytes: &[u8]) -> Result<Vec<JobRecord>, AppError> {
    let document: Value = serde_json::from_slice(bytes)
        .map_err(|e| AppError::UnprocessableEntity(format!("invalid export JSON: {e}")))?;

    let empty: &[Value] = &[];
    let candidates: &[Value] = match &document {
        Value::Object(map) => match map.get("messages") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => empty,
        },
        Value::Array(items) => items.as_slice(),
        _ => empty,
    };

    let mut jobs = Vec::new();
    for item in candidates {
        let Value::Object(message) = item else {
            continue;
        };
        if message.get("type").and_then(Value::as_str) != Some("message") {
            continue;
        }

        let description = flatten_text(message.get("text").unwrap_or(&Value::Null));
        let job_id = match message.get("id") {
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::String(s)) => s.clone(),
            _ => jobs.len().to_string(),
        };
        let date = message
            .get("date")
            .and_then(Value::as_str)
            .and_then(parse_export_date);

        jobs.push(JobRecord {
            job_id,
            description,
            date,
        });
    }

    Ok(jobs)
}

/// Flattens a rich-text body: strings pass through with normalized
/// newlines, lists concatenate, objects contribute their `text` key when
/// present and all values otherwise.
fn flatten_text(value: &Value) -> String {
    match value {
        Value::String(s) => s
            .replace("\r\n", "\n")
            .replace('\r', "\n")
            .replace('\n', " \n "),
        Value::Array(items) => items.iter().map(flatten_text).collect(),
        Value::Object(map) => match map.get("text") {
            Some(text) => flatten_text(text),
            None => map.values().map(flatten_text).collect(),
        },
        _ => String::new(),
    }
}

/// Telegram exports carry naive timestamps like `2024-01-15T10:00:00`;
/// RFC 3339 is accepted too.
fn parse_export_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_telegram_document() {
        let raw = br#"{
            "name": "jobs channel",
            "messages": [
                {"id": 101, "type": "message", "date": "2024-01-15T10:00:00",
                 "text": "Senior Rust Engineer, remote"},
                {"id": 102, "type": "service", "text": "channel created"},
                {"id": 103, "type": "message", "text": "Data Analyst, Berlin"}
            ]
        }"#;

        let jobs = parse_export(raw).unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].job_id, "101");
        assert_eq!(jobs[0].description, "Senior Rust Engineer, remote");
        assert!(jobs[0].date.is_some());
        assert_eq!(jobs[1].job_id, "103");
    }

    #[test]
    fn test_parses_bare_array() {
        let raw = br#"[
            {"type": "message", "id": 1, "text": "Backend role"},
            {"type": "message", "id": 2, "text": "Frontend role"}
        ]"#;

        let jobs = parse_export(raw).unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[1].description, "Frontend role");
    }

    #[test]
    fn test_missing_id_assigned_positionally() {
        let raw = br#"[
            {"type": "message", "text": "first"},
            {"type": "message", "text": "second"}
        ]"#;

        let jobs = parse_export(raw).unwrap();
        assert_eq!(jobs[0].job_id, "0");
        assert_eq!(jobs[1].job_id, "1");
    }

    #[test]
    fn test_flattens_rich_text_segments() {
        let raw = br#"[
            {"type": "message", "id": 5, "text": [
                "Looking for a ",
                {"type": "bold", "text": "Rust developer"},
                " in Tokyo"
            ]}
        ]"#;

        let jobs = parse_export(raw).unwrap();
        assert_eq!(jobs[0].description, "Looking for a Rust developer in Tokyo");
    }

    #[test]
    fn test_newlines_normalized_with_padding() {
        let raw = br#"[{"type": "message", "id": 1, "text": "line one\nline two"}]"#;
        let jobs = parse_export(raw).unwrap();
        assert_eq!(jobs[0].description, "line one \n line two");
    }

    #[test]
    fn test_unparseable_date_tolerated() {
        let raw = br#"[{"type": "message", "id": 1, "date": "yesterday", "text": "x"}]"#;
        let jobs = parse_export(raw).unwrap();
        assert!(jobs[0].date.is_none());
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        let err = parse_export(b"not json").unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
    }

    #[test]
    fn test_unrecognized_document_shape_yields_no_jobs() {
        let jobs = parse_export(br#"{"foo": "bar"}"#).unwrap();
        assert!(jobs.is_empty());
    }
}
