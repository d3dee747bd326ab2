//! Selector spec parsing.
//!
//! A spec entry is either a structural selector, passed verbatim to the
//! DOM layer, or a text-containment pattern of the form
//! `base:contains("needle")`. Parsing never fails resolution: a malformed
//! entry is reported as unparseable and the caller moves on to the next
//! spec in the list.

use regex::Regex;
use std::sync::LazyLock;

/// An ordered list of selector spec strings; resolution tries each in
/// order and the first hit wins.
pub type SelectorSpecs<'a> = &'a [&'a str];

#[derive(Debug, Clone, PartialEq)]
pub enum SelectorKind<'a> {
    Structural(&'a str),
    TextMatch {
        base: &'a str,
        /// Lower-cased containment target.
        needle: String,
    },
}

static CONTAINS_RE: LazyLock<Regex> = LazyLock::new(|| {
    // base:contains("needle") with optional quotes around the needle.
    Regex::new(r#"^(.+?):contains\(['"]?([^'"()]+?)['"]?\)$"#).expect("contains pattern")
});

/// Parse one spec entry. Returns `None` for entries that are neither a
/// plausible structural selector nor a well-formed text pattern.
pub fn parse(spec: &str) -> Option<SelectorKind<'_>> {
    let spec = spec.trim();
    if spec.is_empty() {
        return None;
    }

    if !spec.contains(":contains(") {
        return Some(SelectorKind::Structural(spec));
    }

    if let Some(caps) = CONTAINS_RE.captures(spec) {
        let base = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
        let needle = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
        if !needle.is_empty() {
            return Some(SelectorKind::TextMatch {
                base: if base.is_empty() { "*" } else { base },
                needle: needle.to_lowercase(),
            });
        }
    }

    // Manual split fallback for patterns the regex rejects (stray quotes,
    // unbalanced parentheses).
    let idx = spec.find(":contains(")?;
    let base = spec[..idx].trim();
    let raw = &spec[idx + ":contains(".len()..];
    let needle: String = raw
        .chars()
        .filter(|c| !matches!(c, '\'' | '"' | '(' | ')'))
        .collect();
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    Some(SelectorKind::TextMatch {
        base: if base.is_empty() { "*" } else { base },
        needle,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_passthrough() {
        assert_eq!(
            parse("button.carousel-control-next"),
            Some(SelectorKind::Structural("button.carousel-control-next"))
        );
    }

    #[test]
    fn contains_double_quoted() {
        assert_eq!(
            parse(r#"button:contains("Submit Answer")"#),
            Some(SelectorKind::TextMatch {
                base: "button",
                needle: "submit answer".into(),
            })
        );
    }

    #[test]
    fn contains_single_quoted_and_bare() {
        assert_eq!(
            parse("span:contains('Continue')"),
            Some(SelectorKind::TextMatch {
                base: "span",
                needle: "continue".into(),
            })
        );
        assert_eq!(
            parse("div:contains(I agree)"),
            Some(SelectorKind::TextMatch {
                base: "div",
                needle: "i agree".into(),
            })
        );
    }

    #[test]
    fn contains_with_compound_base() {
        assert_eq!(
            parse(r#"div.u-text-center span:contains("Continue")"#),
            Some(SelectorKind::TextMatch {
                base: "div.u-text-center span",
                needle: "continue".into(),
            })
        );
    }

    #[test]
    fn empty_base_defaults_to_universal() {
        assert_eq!(
            parse(r#":contains("anything")"#),
            Some(SelectorKind::TextMatch {
                base: "*",
                needle: "anything".into(),
            })
        );
    }

    #[test]
    fn malformed_entries_are_rejected_not_fatal() {
        assert_eq!(parse(""), None);
        assert_eq!(parse(":contains()"), None);
        assert_eq!(parse("button:contains(\"\")"), None);
    }

    #[test]
    fn fallback_strips_stray_quoting() {
        // Unbalanced quoting falls through to the manual split.
        let parsed = parse(r#"button:contains("Next"#).unwrap();
        assert_eq!(
            parsed,
            SelectorKind::TextMatch {
                base: "button",
                needle: "next".into(),
            }
        );
    }
}
