//! Low-information rendering of email addresses.

/// Replacement for the hidden part of the local-part.
pub const MASK: &str = "***";

/// Mask an email address down to its first character and domain.
///
/// - `""` stays `""`.
/// - Input without `@` is returned unchanged.
/// - Otherwise the input is split at the first `@`; `local@domain` becomes
///   `l***@domain` and `@domain` becomes `***@domain`.
///
/// The first character is taken as a whole `char`, so multi-byte local-parts
/// are never cut mid-sequence.
pub fn mask_email(email: &str) -> String {
    let Some((local, domain)) = email.split_once('@') else {
        return email.to_string();
    };

    match local.chars().next() {
        Some(first) => format!("{}{}@{}", first, MASK, domain),
        None => format!("{}@{}", MASK, domain),
    }
}
