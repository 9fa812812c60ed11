//! The reveal-or-mask decision.

use crate::{mask_email, EmailMappings};
use serde::{Deserialize, Serialize};

/// An email address as it should be shown to the reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaskedEmail {
    /// The real address for known contacts, the masked form otherwise.
    pub email: String,

    /// Configured name for known contacts, the external name otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Set by [`apply_email_privacy`] when the address was not a known
    /// contact. Not part of the wire shape.
    #[serde(skip)]
    pub masked: bool,
}

impl MaskedEmail {
    /// Whether the address went through [`mask_email`], including input
    /// without an `@` that `mask_email` returns unchanged.
    pub fn is_masked(&self) -> bool {
        self.masked
    }
}

impl std::fmt::Display for MaskedEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.display_name {
            Some(name) if !name.is_empty() => write!(f, "{} <{}>", name, self.email),
            _ => write!(f, "{}", self.email),
        }
    }
}

/// Decide how to present `email`.
///
/// Lookup is case-insensitive; the returned address keeps the caller's
/// casing. A configured display name always beats `external_display_name`,
/// which is treated as informational only.
pub fn apply_email_privacy<M: EmailMappings + ?Sized>(
    email: Option<&str>,
    external_display_name: Option<&str>,
    mappings: &M,
) -> MaskedEmail {
    let external = external_display_name.map(str::to_string);

    let email = match email {
        Some(e) if !e.is_empty() => e,
        _ => {
            return MaskedEmail {
                email: String::new(),
                display_name: external,
                masked: false,
            }
        }
    };

    let lookup_key = email.to_lowercase();
    if let Some(name) = mappings.display_name_for(&lookup_key) {
        return MaskedEmail {
            email: email.to_string(),
            display_name: Some(name.to_string()),
            masked: false,
        };
    }

    MaskedEmail {
        email: mask_email(email),
        display_name: external,
        masked: true,
    }
}
