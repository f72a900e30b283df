//! Classification of advisory-service failure text.
//!
//! The advisory CLI reports problems only as human-readable text. Matching is
//! confined to this module; text nothing here recognizes is `Unknown`.

use std::sync::LazyLock;

use regex::Regex;

/// Externally detectable advisory failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvisoryFailureKind {
    /// The executable is not installed or not on `PATH`.
    Missing,
    /// The user has not logged in, or the token expired.
    Unauthenticated,
    /// The account lacks a subscription or seat for the service.
    NotEntitled,
    Unknown,
}

const MISSING_MARKERS: &[&str] = &[
    "command not found",
    "no such file or directory",
    "is not recognized as an internal or external command",
    "enoent",
];

const AUTH_MARKERS: &[&str] = &[
    "not authenticated",
    "authentication failed",
    "authentication required",
    "not logged in",
    "please log in",
    "please login",
    "copilot login",
    "unauthorized",
];

const ENTITLEMENT_MARKERS: &[&str] = &[
    "subscription",
    "not entitled",
    "entitlement",
    "no access to github copilot",
    "copilot is not enabled",
    "copilot seat",
    "no seat",
    "seat assignment",
    "403 forbidden",
];

/// An HTTP status code only counts when labelled as one.
static STATUS_CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:http|status(?: code)?|error|code)\s*:?\s*(40[13])\b")
        .expect("status code regex must compile")
});

fn status_code(lowered: &str) -> Option<&str> {
    STATUS_CODE_RE
        .captures(lowered)
        .and_then(|caps| caps.get(1))
        .map(|code| code.as_str())
}

/// Classify failure text from the advisory service.
///
/// Entitlement markers win over authentication markers, since entitlement
/// errors often also mention the login state.
pub fn classify_advisory_failure(text: &str) -> AdvisoryFailureKind {
    let lowered = text.to_lowercase();
    let has = |markers: &[&str]| markers.iter().any(|marker| lowered.contains(marker));
    let status = status_code(&lowered);
    if has(MISSING_MARKERS) {
        AdvisoryFailureKind::Missing
    } else if has(ENTITLEMENT_MARKERS) || status == Some("403") {
        AdvisoryFailureKind::NotEntitled
    } else if has(AUTH_MARKERS) || status == Some("401") {
        AdvisoryFailureKind::Unauthenticated
    } else {
        AdvisoryFailureKind::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_executable() {
        assert_eq!(
            classify_advisory_failure("sh: copilot: command not found"),
            AdvisoryFailureKind::Missing
        );
    }

    #[test]
    fn authentication() {
        assert_eq!(
            classify_advisory_failure("Error: Not authenticated. Run `copilot login`."),
            AdvisoryFailureKind::Unauthenticated
        );
    }

    #[test]
    fn entitlement_beats_authentication() {
        assert_eq!(
            classify_advisory_failure(
                "You are logged in, but your account has no active Copilot subscription. Please log in with another account."
            ),
            AdvisoryFailureKind::NotEntitled
        );
    }

    #[test]
    fn labelled_status_codes() {
        assert_eq!(
            classify_advisory_failure("request failed: HTTP 401"),
            AdvisoryFailureKind::Unauthenticated
        );
        assert_eq!(
            classify_advisory_failure("Error: status code 403 from api.github.com"),
            AdvisoryFailureKind::NotEntitled
        );
    }

    #[test]
    fn bare_numbers_and_words_do_not_match() {
        assert_eq!(
            classify_advisory_failure("rate limited, retry in 403 ms"),
            AdvisoryFailureKind::Unknown
        );
        assert_eq!(
            classify_advisory_failure("connection to seattle-1 reset after 401 bytes"),
            AdvisoryFailureKind::Unknown
        );
    }

    #[test]
    fn unrecognized_text_is_unknown() {
        assert_eq!(
            classify_advisory_failure("model overloaded, try again"),
            AdvisoryFailureKind::Unknown
        );
        assert_eq!(classify_advisory_failure(""), AdvisoryFailureKind::Unknown);
    }
}
