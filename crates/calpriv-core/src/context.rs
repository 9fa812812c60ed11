//! Loader-to-masker hand-off for calendar output.
//!
//! A [`PrivacyContext`] owns a handle to the config loader and turns the raw
//! attendee data an upstream calendar API returns into what may be shown.

use std::sync::Arc;

use calpriv_config::{init_shared_loader, ConfigLoader, LoaderOptions, PrivacyConfig};
use calpriv_mask::{apply_email_privacy, MaskedEmail};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::logging::LogConfig;

/// Calendar id used when the config names none.
pub const PRIMARY_CALENDAR_ID: &str = "primary";

/// A contact as reported by the upstream calendar API.
///
/// `display_name` is informational only; configured names override it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl Attendee {
    pub fn new(email: impl Into<String>) -> Self {
        Attendee {
            email: Some(email.into()),
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// Applies the configured privacy rules to calendar contacts.
#[derive(Debug, Clone)]
pub struct PrivacyContext {
    loader: Arc<ConfigLoader>,
}

impl PrivacyContext {
    pub fn new(loader: Arc<ConfigLoader>) -> Self {
        PrivacyContext { loader }
    }

    /// Context over the process-wide loader, with diagnostics following the
    /// log level from the environment.
    pub fn shared() -> Self {
        Self::shared_with(&LogConfig::from_env())
    }

    /// Context over the process-wide loader.
    ///
    /// `log` decides the loader's diagnostics only if this call creates the
    /// shared loader; an existing one is reused as is.
    pub fn shared_with(log: &LogConfig) -> Self {
        let options = LoaderOptions::default().with_diagnostics(log.diagnostics());
        Self::new(init_shared_loader(options))
    }

    /// The underlying loader.
    pub fn loader(&self) -> &Arc<ConfigLoader> {
        &self.loader
    }

    /// Current config (cached per the loader's TTL).
    pub fn config(&self) -> Arc<PrivacyConfig> {
        self.loader.load()
    }

    /// Present a single contact.
    pub fn present(&self, email: Option<&str>, external_display_name: Option<&str>) -> MaskedEmail {
        let config = self.config();
        apply_email_privacy(email, external_display_name, config.as_ref())
    }

    /// Present a batch of attendees against one config load, preserving order.
    pub fn present_attendees(&self, attendees: &[Attendee]) -> Vec<MaskedEmail> {
        let config = self.config();
        let shown: Vec<MaskedEmail> = attendees
            .iter()
            .map(|a| {
                apply_email_privacy(
                    a.email.as_deref(),
                    a.display_name.as_deref(),
                    config.as_ref(),
                )
            })
            .collect();
        trace!(
            attendees = shown.len(),
            masked = shown.iter().filter(|m| m.is_masked()).count(),
            "attendees presented"
        );
        shown
    }

    /// Configured default calendar, or `"primary"`.
    pub fn default_calendar_id(&self) -> String {
        self.config()
            .default_calendar_id
            .clone()
            .unwrap_or_else(|| PRIMARY_CALENDAR_ID.to_string())
    }
}
