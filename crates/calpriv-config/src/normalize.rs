//! Lenient conversion of parsed JSON into [`PrivacyConfig`].
//!
//! Partial correctness beats rejection: wrong-typed fields and entries are
//! dropped one by one and the rest of the document still applies.

use serde_json::Value;

use crate::PrivacyConfig;

/// Normalize an arbitrary JSON value.
///
/// - Non-objects yield the default config.
/// - `version` applies only if numeric (fractions truncate toward zero).
/// - `emailMappings` applies only if an object; keys are lowercased and
///   non-string values dropped. On a lowercase collision the key visited last
///   (in `serde_json::Map` order) wins.
/// - `defaultCalendarId` applies only if a non-empty string.
/// - Unknown fields are ignored.
pub fn normalize(value: &Value) -> PrivacyConfig {
    let mut config = PrivacyConfig::default();

    let Some(obj) = value.as_object() else {
        return config;
    };

    if let Some(version) = obj.get("version").and_then(numeric_version) {
        config.version = Some(version);
    }

    if let Some(Value::Object(mappings)) = obj.get("emailMappings") {
        config.email_mappings = mappings
            .iter()
            .filter_map(|(email, name)| {
                name.as_str()
                    .map(|name| (email.to_lowercase(), name.to_string()))
            })
            .collect();
    }

    if let Some(Value::String(id)) = obj.get("defaultCalendarId") {
        if !id.is_empty() {
            config.default_calendar_id = Some(id.clone());
        }
    }

    config
}

fn numeric_version(value: &Value) -> Option<i64> {
    let Value::Number(n) = value else {
        return None;
    };
    n.as_i64()
        .or_else(|| n.as_u64().map(|v| i64::try_from(v).unwrap_or(i64::MAX)))
        .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
}
