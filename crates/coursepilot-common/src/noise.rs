//! Classification of host-page noise.
//!
//! Course players ship third-party trackers and SCORM shims that throw
//! constantly. Those errors must not be mistaken for engine failures, so
//! anything matching a known signature is demoted to debug logging at the
//! boundary where it surfaces.

/// Script sources whose errors are never ours.
const NOISY_SOURCES: &[&str] = &["scorm", "pipwerks", "trackjs"];

/// Error messages known to come from host-page scripts.
const NOISY_MESSAGES: &[&str] = &[
    "invalid regular expression",
    "cannot read properties of undefined",
];

/// True when an error originating from the host page should be suppressed
/// rather than reported as an engine-level problem.
pub fn is_host_noise(source: Option<&str>, message: &str) -> bool {
    let message = message.to_lowercase();
    if let Some(source) = source {
        let source = source.to_lowercase();
        if NOISY_SOURCES.iter().any(|s| source.contains(s)) {
            return true;
        }
    }
    NOISY_SOURCES.iter().any(|s| message.contains(s))
        || NOISY_MESSAGES.iter().any(|m| message.contains(m))
}
