use serde_json::Value;

/// Substrings matched case-insensitively against a field's key. Any key
/// containing one of these is sensitive, regardless of what else it's
/// named.
const SENSITIVE_KEY_SUBSTRINGS: &[&str] = &[
    "password",
    "secret",
    "token",
    "authorization",
    "api key",
    "apikey",
    "webhook signature",
    "proxy_credential",
    "credential",
];

pub const REDACTED_SENTINEL: &str = "[REDACTED]";

fn is_sensitive_key(key: &str) -> bool {
    let lower = key.to_lowercase();
    SENSITIVE_KEY_SUBSTRINGS.iter().any(|needle| lower.contains(needle))
}

/// Recursively replaces the value of any sensitive key in a JSON object
/// (at any depth, including inside arrays) with a fixed sentinel. Usable
/// standalone on any `serde_json::Value` — not just log records — so
/// callers redacting a webhook's raw payload before debug-logging it get
/// the same guarantee as a `tracing::event!` call site.
pub fn redact_value(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, inner) in map.iter_mut() {
                if is_sensitive_key(key) {
                    *inner = Value::String(REDACTED_SENTINEL.to_string());
                } else {
                    redact_value(inner);
                }
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                redact_value(item);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn redacts_a_top_level_sensitive_key() {
        let mut value = json!({ "password": "hunter2", "email": "a@b.com" });
        redact_value(&mut value);
        assert_eq!(value["password"], REDACTED_SENTINEL);
        assert_eq!(value["email"], "a@b.com");
    }

    #[test]
    fn redacts_case_insensitively_and_by_substring() {
        let mut value = json!({ "Authorization": "Bearer xyz", "apiKeyId": "abc" });
        redact_value(&mut value);
        assert_eq!(value["Authorization"], REDACTED_SENTINEL);
        assert_eq!(value["apiKeyId"], REDACTED_SENTINEL);
    }

    #[test]
    fn descends_into_nested_objects_and_arrays() {
        let mut value = json!({
            "user": { "id": 1, "password_digest": "abc" },
            "events": [ { "webhook_signature": "sig" }, { "ok": true } ]
        });
        redact_value(&mut value);
        assert_eq!(value["user"]["password_digest"], REDACTED_SENTINEL);
        assert_eq!(value["user"]["id"], 1);
        assert_eq!(value["events"][0]["webhook_signature"], REDACTED_SENTINEL);
        assert_eq!(value["events"][1]["ok"], true);
    }

    #[test]
    fn leaves_non_sensitive_values_untouched() {
        let mut value = json!({ "workspace_name": "demo", "cpu_quota": 1.5 });
        redact_value(&mut value);
        assert_eq!(value["workspace_name"], "demo");
        assert_eq!(value["cpu_quota"], 1.5);
    }
}
