//! Normalization of the backend's response envelopes.
//!
//! The backend wraps payloads as `{ success, data, message? }`, but `data`
//! is sometimes the array itself, sometimes an object with `items` or a named
//! key, and some endpoints skip the envelope entirely. This module is the only
//! place that knows about those variants.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use tracing::debug;

const TOKEN_KEYS: &[&str] = &["token", "accessToken", "access_token"];
const EXPIRY_KEYS: &[&str] = &["expiresAt", "expires_at", "expiry", "tokenExpiry"];

/// The array of records in `value`, or an empty slice when no known shape matches.
pub fn extract_list<'a>(value: &'a Value, keys: &[&str]) -> &'a [Value] {
    if let Some(items) = value.as_array() {
        debug!(shape = "array", "Unwrapped list response");
        return items;
    }

    if let Some(data) = value.get("data") {
        if let Some(items) = data.as_array() {
            debug!(shape = "data", "Unwrapped list response");
            return items;
        }
        if let Some(items) = data.get("items").and_then(Value::as_array) {
            debug!(shape = "data.items", "Unwrapped list response");
            return items;
        }
        for key in keys {
            if let Some(items) = data.get(*key).and_then(Value::as_array) {
                debug!(shape = "data.<key>", key, "Unwrapped list response");
                return items;
            }
        }
    }

    for key in keys.iter().copied().chain(std::iter::once("items")) {
        if let Some(items) = value.get(key).and_then(Value::as_array) {
            debug!(shape = "<key>", key, "Unwrapped list response");
            return items;
        }
    }

    debug!("List response matched no known shape");
    &[]
}

/// The single record in `value`: `data.<key>`, `data`, `<key>`, or the value itself.
pub fn extract_object<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    if let Some(data) = value.get("data") {
        for key in keys {
            if let Some(record) = data.get(*key).filter(|v| v.is_object()) {
                return Some(record);
            }
        }
        if data.is_object() {
            return Some(data);
        }
    }

    for key in keys {
        if let Some(record) = value.get(*key).filter(|v| v.is_object()) {
            return Some(record);
        }
    }

    value.is_object().then_some(value)
}

/// `success: false` in a 2xx body. Absent means success.
pub fn is_declined(value: &Value) -> bool {
    value.get("success").and_then(Value::as_bool) == Some(false)
}

/// Token from a login response, at the top level or under `data`.
pub fn extract_token(value: &Value) -> Option<String> {
    find_in_levels(value, |level| {
        TOKEN_KEYS
            .iter()
            .filter_map(|key| level.get(*key).and_then(Value::as_str))
            .find(|token| !token.trim().is_empty())
            .map(str::to_string)
    })
}

/// Role from `role`, `user.role`, `data.role` or `data.user.role`.
pub fn extract_role(value: &Value) -> Option<String> {
    find_in_levels(value, |level| {
        level
            .get("role")
            .or_else(|| level.get("user").and_then(|u| u.get("role")))
            .and_then(Value::as_str)
            .filter(|role| !role.is_empty())
            .map(str::to_string)
    })
}

/// Token expiry as RFC 3339 text or a unix timestamp (seconds or milliseconds).
pub fn extract_expiry(value: &Value) -> Option<DateTime<Utc>> {
    find_in_levels(value, |level| {
        EXPIRY_KEYS
            .iter()
            .filter_map(|key| level.get(*key))
            .find_map(parse_timestamp)
    })
}

/// Human-readable error message from an error body.
pub fn extract_message(value: &Value) -> Option<String> {
    let candidates = [
        value.get("message"),
        value.get("error"),
        value.get("error").and_then(|e| e.get("message")),
        value.get("data").and_then(|d| d.get("message")),
        value.get("msg"),
    ];

    candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|msg| !msg.is_empty())
        .map(str::to_string)
}

/// Like `extract_message`, for a raw body that may not be JSON at all.
pub fn message_from_body(body: &str) -> Option<String> {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => extract_message(&value),
        Err(_) => {
            let text = body.trim();
            // HTML error pages are noise.
            if text.is_empty() || text.starts_with('<') {
                None
            } else {
                Some(text.chars().take(200).collect())
            }
        }
    }
}

fn find_in_levels<T>(value: &Value, f: impl Fn(&Value) -> Option<T>) -> Option<T> {
    f(value).or_else(|| value.get("data").and_then(|data| f(data)))
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => {
            let raw = n.as_i64()?;
            if raw > 1_000_000_000_000 {
                Utc.timestamp_millis_opt(raw).single()
            } else {
                Utc.timestamp_opt(raw, 0).single()
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(items: &[Value]) -> Vec<String> {
        items.iter().map(|v| v["id"].to_string()).collect()
    }

    #[test]
    fn test_list_shapes_yield_same_records() {
        let records = json!([{ "id": 1 }, { "id": 2 }]);
        let shapes = [
            records.clone(),
            json!({ "success": true, "data": records.clone() }),
            json!({ "success": true, "data": { "items": records.clone() } }),
            json!({ "success": true, "data": { "books": records.clone(), "total": 2 } }),
            json!({ "books": records.clone() }),
        ];

        for shape in &shapes {
            assert_eq!(ids(extract_list(shape, &["books"])), vec!["1", "2"], "{}", shape);
        }
    }

    #[test]
    fn test_list_unknown_shape_is_empty() {
        assert!(extract_list(&json!({ "data": { "count": 3 } }), &["books"]).is_empty());
        assert!(extract_list(&json!("oops"), &["books"]).is_empty());
        assert!(extract_list(&json!({ "data": null }), &["books"]).is_empty());
    }

    #[test]
    fn test_extract_object_shapes() {
        let user = json!({ "id": "u1", "name": "Esi" });
        for shape in [
            json!({ "data": { "user": user.clone() } }),
            json!({ "data": user.clone() }),
            json!({ "user": user.clone() }),
            user.clone(),
        ] {
            assert_eq!(extract_object(&shape, &["user"]), Some(&user));
        }
        assert_eq!(extract_object(&json!([1, 2]), &["user"]), None);
    }

    #[test]
    fn test_token_top_level_and_nested_match() {
        let top = json!({ "success": true, "token": "tok-1" });
        let nested = json!({ "success": true, "data": { "token": "tok-1" } });
        let camel = json!({ "data": { "accessToken": "tok-1" } });
        assert_eq!(extract_token(&top), extract_token(&nested));
        assert_eq!(extract_token(&camel).as_deref(), Some("tok-1"));
        assert_eq!(extract_token(&json!({ "token": "" })), None);
        assert_eq!(extract_token(&json!({ "token": "  " })), None);
        assert_eq!(
            extract_token(&json!({ "data": { "token": " padded " } })).as_deref(),
            Some(" padded ")
        );
    }

    #[test]
    fn test_role_and_expiry() {
        let body = json!({
            "data": {
                "token": "t",
                "user": { "role": "admin" },
                "expiresAt": "2030-01-01T00:00:00Z"
            }
        });
        assert_eq!(extract_role(&body).as_deref(), Some("admin"));
        assert_eq!(
            extract_expiry(&body),
            Some(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            extract_expiry(&json!({ "expiry": 1_893_456_000 })),
            extract_expiry(&json!({ "expiry": 1_893_456_000_000i64 }))
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            extract_message(&json!({ "success": false, "message": "Invalid credentials" })).as_deref(),
            Some("Invalid credentials")
        );
        assert_eq!(
            extract_message(&json!({ "error": { "message": "Nope" } })).as_deref(),
            Some("Nope")
        );
        assert_eq!(message_from_body("plain failure").as_deref(), Some("plain failure"));
        assert_eq!(message_from_body("<html>502</html>"), None);
        assert_eq!(message_from_body(""), None);
        assert!(is_declined(&json!({ "success": false })));
        assert!(!is_declined(&json!({ "data": [] })));
    }
}
