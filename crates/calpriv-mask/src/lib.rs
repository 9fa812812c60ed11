//! Email masking for calendar attendee output.
//!
//! This crate decides how an email address is presented to a reader:
//!
//! - **Known contacts**: addresses registered in a mapping table are shown
//!   verbatim, labelled with the configured display name.
//! - **Everyone else**: the address is masked down to its first local-part
//!   character and its domain (`a***@example.com`), and any display name
//!   supplied by the upstream calendar API is passed through untouched.
//!
//! Nothing here performs I/O. The mapping table is reached through the
//! [`EmailMappings`] trait so callers can plug in whatever config type they load.
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use calpriv_mask::{apply_email_privacy, mask_email};
//!
//! assert_eq!(mask_email("alice@example.com"), "a***@example.com");
//!
//! let mut known = BTreeMap::new();
//! known.insert("bob@example.com".to_string(), "Bob".to_string());
//!
//! let shown = apply_email_privacy(Some("Bob@Example.com"), Some("bobby"), &known);
//! assert_eq!(shown.email, "Bob@Example.com");
//! assert_eq!(shown.display_name.as_deref(), Some("Bob"));
//! ```

pub mod mappings;
pub mod mask;
pub mod privacy;

pub use mappings::{EmailMappings, NoMappings};
pub use mask::{mask_email, MASK};
pub use privacy::{apply_email_privacy, MaskedEmail};
