//! Known-contact lookup.
//!
//! The masker only needs "lowercase email → display name". Config crates
//! implement [`EmailMappings`] for their own types instead of converting.

use std::collections::{BTreeMap, HashMap};

/// A table of known contacts keyed by lowercase email address.
pub trait EmailMappings {
    /// Return the display name registered for `lowercase_email`, if any.
    ///
    /// Callers lowercase before asking; implementations store lowercase keys.
    fn display_name_for(&self, lowercase_email: &str) -> Option<&str>;
}

impl EmailMappings for BTreeMap<String, String> {
    fn display_name_for(&self, lowercase_email: &str) -> Option<&str> {
        self.get(lowercase_email).map(String::as_str)
    }
}

impl<S: std::hash::BuildHasher> EmailMappings for HashMap<String, String, S> {
    fn display_name_for(&self, lowercase_email: &str) -> Option<&str> {
        self.get(lowercase_email).map(String::as_str)
    }
}

impl<M: EmailMappings + ?Sized> EmailMappings for &M {
    fn display_name_for(&self, lowercase_email: &str) -> Option<&str> {
        (**self).display_name_for(lowercase_email)
    }
}

/// An absent table behaves as an empty one.
impl<M: EmailMappings> EmailMappings for Option<M> {
    fn display_name_for(&self, lowercase_email: &str) -> Option<&str> {
        self.as_ref()
            .and_then(|m| m.display_name_for(lowercase_email))
    }
}

/// Empty table: every address is unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoMappings;

impl EmailMappings for NoMappings {
    fn display_name_for(&self, _lowercase_email: &str) -> Option<&str> {
        None
    }
}
