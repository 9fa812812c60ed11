//! The privacy config document.

use std::collections::BTreeMap;

use calpriv_mask::EmailMappings;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::CONFIG_SCHEMA_VERSION;

/// Known contacts and calendar defaults.
///
/// Keys of `email_mappings` are always lowercase. Deserialization goes
/// through [`crate::normalize`], so serde callers get the same lenient,
/// lowercased result as the loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Value")]
pub struct PrivacyConfig {
    /// Schema version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,

    /// Lowercase email → display name.
    #[serde(default)]
    pub email_mappings: BTreeMap<String, String>,

    /// Calendar used when the caller names none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_calendar_id: Option<String>,
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self {
            version: Some(CONFIG_SCHEMA_VERSION),
            email_mappings: BTreeMap::new(),
            default_calendar_id: None,
        }
    }
}

impl From<Value> for PrivacyConfig {
    fn from(value: Value) -> Self {
        crate::normalize(&value)
    }
}

impl PrivacyConfig {
    /// Whether `email` is a known contact, ignoring case.
    pub fn is_known(&self, email: &str) -> bool {
        self.email_mappings.contains_key(&email.to_lowercase())
    }

    /// Number of known contacts.
    pub fn mapping_count(&self) -> usize {
        self.email_mappings.len()
    }
}

impl EmailMappings for PrivacyConfig {
    fn display_name_for(&self, lowercase_email: &str) -> Option<&str> {
        self.email_mappings.get(lowercase_email).map(String::as_str)
    }
}
