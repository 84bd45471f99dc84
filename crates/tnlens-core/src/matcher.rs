//! Prefix-tagged match modes for field and table criteria.
//!
//! Assertion callers pass patterns like `CONTAIN:pending` or `REGEX:^A\d+$`;
//! a pattern with no recognized prefix is an exact match. The core honors
//! this contract verbatim wherever labels or cell values are compared.

use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Exact,
    Regex,
    Contain,
    ContainAnyCase,
    Start,
    StartAnyCase,
    End,
    EndAnyCase,
    Length,
    Empty,
    Blank,
}

/// Split a pattern into its match mode and the remaining text.
///
/// Longer prefixes are tried before their shorter variants so that
/// `CONTAIN_ANY_CASE:` is never read as `CONTAIN:` with a stray argument.
pub fn parse(pattern: &str) -> (MatchMode, &str) {
    const PREFIXES: [(&str, MatchMode); 11] = [
        ("REGEX:", MatchMode::Regex),
        ("CONTAIN_ANY_CASE:", MatchMode::ContainAnyCase),
        ("CONTAIN:", MatchMode::Contain),
        ("START_ANY_CASE:", MatchMode::StartAnyCase),
        ("START:", MatchMode::Start),
        ("END_ANY_CASE:", MatchMode::EndAnyCase),
        ("END:", MatchMode::End),
        ("EXACT:", MatchMode::Exact),
        ("LENGTH:", MatchMode::Length),
        ("EMPTY:", MatchMode::Empty),
        ("BLANK:", MatchMode::Blank),
    ];

    for (prefix, mode) in PREFIXES {
        if let Some(rest) = pattern.strip_prefix(prefix) {
            return (mode, rest);
        }
    }
    (MatchMode::Exact, pattern)
}

/// Test `value` against a possibly prefix-tagged `pattern`.
pub fn matches(pattern: &str, value: &str) -> bool {
    let (mode, arg) = parse(pattern);
    match mode {
        MatchMode::Exact => value == arg,
        MatchMode::Contain => value.contains(arg),
        MatchMode::ContainAnyCase => value.to_lowercase().contains(&arg.to_lowercase()),
        MatchMode::Start => value.starts_with(arg),
        MatchMode::StartAnyCase => value.to_lowercase().starts_with(&arg.to_lowercase()),
        MatchMode::End => value.ends_with(arg),
        MatchMode::EndAnyCase => value.to_lowercase().ends_with(&arg.to_lowercase()),
        MatchMode::Empty => value.is_empty(),
        MatchMode::Blank => value.trim().is_empty(),
        MatchMode::Length => match arg.trim().parse::<usize>() {
            Ok(n) => value.chars().count() == n,
            Err(_) => {
                warn!(pattern, "LENGTH: match needs a numeric argument");
                false
            }
        },
        MatchMode::Regex => match regex::Regex::new(arg) {
            Ok(re) => re.is_match(value),
            Err(e) => {
                warn!(pattern, error = %e, "invalid REGEX: pattern matches nothing");
                false
            }
        },
    }
}
