//! Status normalization.
//!
//! # Responsibilities
//! - Map raw platform status codes onto canonical HTTP statuses
//! - Recover the meaning of status 0, which platforms report for local files
//!   and for some cached responses
//!
//! # Design Decisions
//! - Pure function, no I/O: every quirk is testable without a network
//! - 1223 is rewritten before the status-0 check; the two rules never interact

use url::Url;

/// Status some platforms report in place of 204 No Content.
pub const LEGACY_NO_CONTENT: i32 = 1223;

/// Normalize a raw status reported by the native primitive.
///
/// - `1223` becomes `204`
/// - `0` with a body present becomes `200`
/// - `0` without a body on a `file:` URL becomes `404`
/// - `0` otherwise stays `0`
pub fn normalize_status(raw: i32, body_present: bool, url: &str) -> i32 {
    let status = if raw == LEGACY_NO_CONTENT { 204 } else { raw };

    if status != 0 {
        return status;
    }

    if body_present {
        200
    } else if is_file_url(url) {
        404
    } else {
        0
    }
}

/// Whether the URL uses the `file` scheme.
pub fn is_file_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => parsed.scheme() == "file",
        Err(_) => false,
    }
}
