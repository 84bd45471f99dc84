//! Display-field extraction: "label: value" and "label . . . value"
//! patterns with no input field involved.

use std::sync::OnceLock;

use regex::Regex;

use crate::scan::runs::clean_label;
use crate::scan::runs::runs;

/// One read-only label/value pair found on a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DisplayPair {
    pub label: String,
    pub value: String,
}

#[derive(Debug)]
enum Token {
    Label(String),
    Value { col: usize, end: usize, text: String },
}

/// Dot leader between a label and its value: two or more dots, optionally
/// space-separated (`". . . ."` or `"...."`).
fn leader_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*\.(\s*\.)+\s*").expect("leader pattern"))
}

/// Extract display fields from an already color-filtered line.
///
/// The line is split into `panes` equal slices scanned independently.
/// `field_spans` are the editable-field column ranges on this row; a value
/// that overlaps one belongs to the label/field associator, not here.
pub(crate) fn extract_display_fields(
    line: &[char],
    panes: usize,
    field_spans: &[(usize, usize)],
) -> Vec<DisplayPair> {
    let mut out = Vec::new();
    let width = line.len();
    if width == 0 {
        return out;
    }

    let panes = panes.max(1);
    for p in 0..panes {
        let start = width * p / panes;
        let end = width * (p + 1) / panes;
        pane_pairs(&line[start..end], start, field_spans, &mut out);
    }
    out
}

fn pane_pairs(
    pane: &[char],
    base: usize,
    field_spans: &[(usize, usize)],
    out: &mut Vec<DisplayPair>,
) {
    let mut tokens = Vec::new();

    for run in runs(pane) {
        tokenize_run(run.start + base, run.trimmed(), &mut tokens);
    }

    // drop values that sit inside an editable field's span
    tokens.retain(|t| match t {
        Token::Value { col, end, .. } => !field_spans
            .iter()
            .any(|&(fs, fe)| *col < fe && *end > fs),
        Token::Label(_) => true,
    });

    let mut pending: Option<String> = None;
    let mut values: Vec<String> = Vec::new();

    for token in tokens {
        match token {
            Token::Label(text) => {
                if let Some(label) = pending.take() {
                    flush(&label, &values, out);
                    values.clear();
                }
                pending = Some(text);
            }
            Token::Value { text, .. } => {
                // a value before any label is plain text, not a field
                if pending.is_some() {
                    values.push(text);
                }
            }
        }
    }
    if let Some(label) = pending {
        flush(&label, &values, out);
    }
}

/// Split one run into label/value tokens using the three surface patterns,
/// in priority order: colon, dot leader, trailing dot before NUL padding.
fn tokenize_run(col: usize, text: &str, tokens: &mut Vec<Token>) {
    if text.is_empty() {
        return;
    }

    if let Some(ci) = colon_split(text) {
        let (label, value) = text.split_at(ci + 1);
        if !clean_label(label).is_empty() {
            tokens.push(Token::Label(label.to_string()));
            let value = value.trim();
            if !value.is_empty() {
                let vcol = col + ci + 1 + 1;
                tokens.push(Token::Value {
                    col: vcol,
                    end: vcol + value.len(),
                    text: value.to_string(),
                });
            }
            return;
        }
    }

    if let Some(m) = leader_re().find(text) {
        let label = &text[..m.start()];
        let value = text[m.end()..].trim();
        if !clean_label(label).is_empty() {
            tokens.push(Token::Label(label.to_string()));
            if !value.is_empty() {
                let vcol = col + m.end();
                tokens.push(Token::Value {
                    col: vcol,
                    end: vcol + value.len(),
                    text: value.to_string(),
                });
            }
            return;
        }
    }

    if text.ends_with('.') && clean_label(text).len() >= 2 {
        tokens.push(Token::Label(text.to_string()));
        return;
    }

    tokens.push(Token::Value {
        col,
        end: col + text.len(),
        text: text.to_string(),
    });
}

/// First colon that terminates a label: followed by a space or the end of
/// the run, so embedded colons in values ("10:30") stay untouched.
fn colon_split(text: &str) -> Option<usize> {
    for (i, c) in text.char_indices() {
        if c == ':' {
            let next = text[i + 1..].chars().next();
            if next.is_none() || next == Some(' ') {
                return Some(i);
            }
            return None;
        }
    }
    None
}

fn flush(raw_label: &str, values: &[String], out: &mut Vec<DisplayPair>) {
    let label = clean_label(raw_label);
    if label.is_empty() {
        return;
    }

    let parts: Vec<&str> = label
        .split('/')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    if parts.len() <= 1 {
        out.push(DisplayPair {
            label,
            value: values.join(" ").trim().to_string(),
        });
        return;
    }

    let joined = values.join(" ");
    let segments: Vec<&str> = joined.split('/').map(str::trim).collect();
    if segments.len() == parts.len() {
        for (part, seg) in parts.iter().zip(segments.iter()) {
            out.push(DisplayPair {
                label: (*part).to_string(),
                value: (*seg).to_string(),
            });
        }
        return;
    }

    // each sub-label consumes one value run; the last takes the leftovers
    for (i, part) in parts.iter().enumerate() {
        let value = if i + 1 < parts.len() {
            values.get(i).cloned().unwrap_or_default()
        } else {
            values[i.min(values.len())..].join(" ")
        };
        out.push(DisplayPair {
            label: (*part).to_string(),
            value: value.trim().to_string(),
        });
    }
}
