//! Calendar privacy: privacy-adjusted attendee presentation.
//!
//! Wires the cached config loader (`calpriv-config`) to the masker
//! (`calpriv-mask`) and provides the logging setup used by embedding
//! applications.

pub mod context;
pub mod logging;

pub use calpriv_config as config;
pub use calpriv_mask as mask;

pub use context::{Attendee, PrivacyContext, PRIMARY_CALENDAR_ID};
pub use calpriv_mask::{apply_email_privacy, mask_email, MaskedEmail};
