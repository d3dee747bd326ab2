//! Structural selector subset for the simulated page.
//!
//! Covers exactly what the engine's selector catalog uses: tag, `*`,
//! `#id`, `.class`, attribute tests (`[a]`, `[a="v"]`, `[a^="v"]`,
//! `[a*="v"]`), `:not(...)`, `:nth-of-type(n)`, descendant and child
//! combinators, and comma-separated lists. Anything else is a
//! `SelectorSyntax` error, which the resolver swallows per its contract.

use coursepilot_common::error::DomError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum AttrOp {
    Exists,
    Equals,
    Prefix,
    Contains,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Simple {
    Tag(String),
    Universal,
    Id(String),
    Class(String),
    Attr {
        name: String,
        op: AttrOp,
        value: String,
    },
    Not(Compound),
    NthOfType(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(super) struct Compound {
    pub simples: Vec<Simple>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Combinator {
    Descendant,
    Child,
}

/// One complex selector: compounds joined by combinators, subject last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Complex {
    pub compounds: Vec<Compound>,
    pub combinators: Vec<Combinator>,
}

/// Parse a comma-separated selector list.
pub(super) fn parse_list(input: &str) -> Result<Vec<Complex>, DomError> {
    let mut out = Vec::new();
    for part in split_top_level_commas(input) {
        let part = part.trim();
        if part.is_empty() {
            return Err(DomError::SelectorSyntax(input.to_string()));
        }
        out.push(parse_complex(part)?);
    }
    if out.is_empty() {
        return Err(DomError::SelectorSyntax(input.to_string()));
    }
    Ok(out)
}

/// Commas inside `:not(...)` or quoted attribute values do not separate
/// selectors.
fn split_top_level_commas(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_quote: Option<char> = None;
    let mut current = String::new();

    for c in input.chars() {
        match c {
            '"' | '\'' => {
                match in_quote {
                    Some(q) if q == c => in_quote = None,
                    None => in_quote = Some(c),
                    _ => {}
                }
                current.push(c);
            }
            '(' if in_quote.is_none() => {
                depth += 1;
                current.push(c);
            }
            ')' if in_quote.is_none() => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 && in_quote.is_none() => {
                parts.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    parts.push(current);
    parts
}

fn parse_complex(input: &str) -> Result<Complex, DomError> {
    let mut compounds = Vec::new();
    let mut combinators = Vec::new();
    let mut rest = input.trim();

    loop {
        let (compound, remainder) = parse_compound(rest, input)?;
        compounds.push(compound);
        rest = remainder.trim_start();
        if rest.is_empty() {
            break;
        }
        if let Some(stripped) = rest.strip_prefix('>') {
            combinators.push(Combinator::Child);
            rest = stripped.trim_start();
        } else {
            combinators.push(Combinator::Descendant);
        }
        if rest.is_empty() {
            return Err(DomError::SelectorSyntax(input.to_string()));
        }
    }

    Ok(Complex {
        compounds,
        combinators,
    })
}

/// Parse one compound selector, returning the remainder of the input
/// (starting at whitespace or a combinator).
fn parse_compound<'a>(input: &'a str, whole: &str) -> Result<(Compound, &'a str), DomError> {
    let mut chars = input.char_indices().peekable();
    let mut simples = Vec::new();
    let mut end = input.len();

    while let Some(&(i, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() || c == '>' => {
                end = i;
                break;
            }
            '*' => {
                chars.next();
                simples.push(Simple::Universal);
            }
            '#' => {
                chars.next();
                let ident = take_ident(&mut chars);
                if ident.is_empty() {
                    return Err(DomError::SelectorSyntax(whole.to_string()));
                }
                simples.push(Simple::Id(ident));
            }
            '.' => {
                chars.next();
                let ident = take_ident(&mut chars);
                if ident.is_empty() {
                    return Err(DomError::SelectorSyntax(whole.to_string()));
                }
                simples.push(Simple::Class(ident));
            }
            '[' => {
                chars.next();
                simples.push(parse_attr(&mut chars, whole)?);
            }
            ':' => {
                chars.next();
                simples.push(parse_pseudo(&mut chars, whole)?);
            }
            c if c.is_ascii_alphabetic() => {
                let ident = take_ident(&mut chars);
                simples.push(Simple::Tag(ident.to_lowercase()));
            }
            _ => return Err(DomError::SelectorSyntax(whole.to_string())),
        }
    }

    if simples.is_empty() {
        return Err(DomError::SelectorSyntax(whole.to_string()));
    }
    Ok((Compound { simples }, &input[end.min(input.len())..]))
}

fn take_ident(chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>) -> String {
    let mut ident = String::new();
    while let Some(&(_, c)) = chars.peek() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            ident.push(c);
            chars.next();
        } else {
            break;
        }
    }
    ident
}

fn parse_attr(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    whole: &str,
) -> Result<Simple, DomError> {
    let name = take_ident(chars);
    if name.is_empty() {
        return Err(DomError::SelectorSyntax(whole.to_string()));
    }

    let op = match chars.peek().map(|&(_, c)| c) {
        Some(']') => {
            chars.next();
            return Ok(Simple::Attr {
                name,
                op: AttrOp::Exists,
                value: String::new(),
            });
        }
        Some('=') => {
            chars.next();
            AttrOp::Equals
        }
        Some('^') => {
            chars.next();
            expect_char(chars, '=', whole)?;
            AttrOp::Prefix
        }
        Some('*') => {
            chars.next();
            expect_char(chars, '=', whole)?;
            AttrOp::Contains
        }
        _ => return Err(DomError::SelectorSyntax(whole.to_string())),
    };

    let quote = match chars.peek().map(|&(_, c)| c) {
        Some(q @ ('"' | '\'')) => {
            chars.next();
            Some(q)
        }
        _ => None,
    };

    let mut value = String::new();
    loop {
        match chars.next().map(|(_, c)| c) {
            Some(c) if Some(c) == quote => {
                expect_char(chars, ']', whole)?;
                break;
            }
            Some(']') if quote.is_none() => break,
            Some(c) => value.push(c),
            None => return Err(DomError::SelectorSyntax(whole.to_string())),
        }
    }

    Ok(Simple::Attr { name, op, value })
}

fn parse_pseudo(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    whole: &str,
) -> Result<Simple, DomError> {
    let name = take_ident(chars);
    match name.as_str() {
        "not" => {
            expect_char(chars, '(', whole)?;
            let inner = take_until_close(chars, whole)?;
            let (compound, rest) = parse_compound(inner.trim(), whole)?;
            if !rest.trim().is_empty() {
                return Err(DomError::SelectorSyntax(whole.to_string()));
            }
            Ok(Simple::Not(compound))
        }
        "nth-of-type" => {
            expect_char(chars, '(', whole)?;
            let inner = take_until_close(chars, whole)?;
            let n: u32 = inner
                .trim()
                .parse()
                .map_err(|_| DomError::SelectorSyntax(whole.to_string()))?;
            Ok(Simple::NthOfType(n))
        }
        _ => Err(DomError::SelectorSyntax(whole.to_string())),
    }
}

fn expect_char(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    expected: char,
    whole: &str,
) -> Result<(), DomError> {
    match chars.next() {
        Some((_, c)) if c == expected => Ok(()),
        _ => Err(DomError::SelectorSyntax(whole.to_string())),
    }
}

/// Consume a balanced `(...)` body; the opening paren is already eaten.
fn take_until_close(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    whole: &str,
) -> Result<String, DomError> {
    let mut depth = 1usize;
    let mut inner = String::new();
    for (_, c) in chars.by_ref() {
        match c {
            '(' => {
                depth += 1;
                inner.push(c);
            }
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(inner);
                }
                inner.push(c);
            }
            _ => inner.push(c),
        }
    }
    Err(DomError::SelectorSyntax(whole.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_compound_with_classes_and_id() {
        let list = parse_list("button.carousel-control-next.accessibility-enabled").unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].compounds[0].simples.len(), 3);
    }

    #[test]
    fn parses_attribute_operators() {
        for sel in [
            "[data-acknowledgment]",
            r#"[aria-label="Next"]"#,
            r#"[id^="btn_tab"]"#,
            r#"[class*="acknowledge"]"#,
            "input[value='Next']",
        ] {
            assert!(parse_list(sel).is_ok(), "failed: {sel}");
        }
    }

    #[test]
    fn parses_pseudo_classes() {
        assert!(parse_list(r#"[role="tab"]:not([aria-selected="true"])"#).is_ok());
        assert!(parse_list("td:nth-of-type(4) span").is_ok());
        assert!(parse_list("video:not([data-played])").is_ok());
    }

    #[test]
    fn parses_combinators_and_lists() {
        let list = parse_list(r#"[id^="li-"] > a, .interactive-link"#).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].combinators, vec![Combinator::Child]);

        let nested = parse_list("#container000 div.modal-footer > button").unwrap();
        assert_eq!(
            nested[0].combinators,
            vec![Combinator::Descendant, Combinator::Child]
        );
    }

    #[test]
    fn rejects_unsupported_syntax() {
        assert!(parse_list("").is_err());
        assert!(parse_list("div::before").is_err());
        assert!(parse_list("a:hover").is_err());
        assert!(parse_list("[unclosed").is_err());
    }
}
