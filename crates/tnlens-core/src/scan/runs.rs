//! NUL-delimited text runs within a filtered row.

use crate::screen::NUL;

/// A maximal run of non-NUL characters in a filtered line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TextRun {
    /// Column of the first character, relative to the filtered slice.
    pub start: usize,
    /// One past the last character.
    pub end: usize,
    pub text: String,
}

impl TextRun {
    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }
}

/// Split a filtered line into its non-NUL runs. Spaces are content and
/// stay inside a run; only NUL separates.
pub(crate) fn runs(line: &[char]) -> Vec<TextRun> {
    let mut out = Vec::new();
    let mut start = None;

    for (i, &c) in line.iter().enumerate() {
        if c == NUL {
            if let Some(s) = start.take() {
                out.push(make_run(line, s, i));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        out.push(make_run(line, s, line.len()));
    }

    // drop runs that are all blanks
    out.retain(|r| !r.trimmed().is_empty());
    out
}

fn make_run(line: &[char], start: usize, end: usize) -> TextRun {
    TextRun {
        start,
        end,
        text: line[start..end].iter().collect(),
    }
}

/// A line is blank when every cell is NUL or whitespace.
pub(crate) fn is_blank(line: &[char]) -> bool {
    line.iter().all(|&c| c == NUL || c.is_whitespace())
}

/// Normalize a raw label fragment: keep only the part after any embedded
/// NUL run, trim, and strip trailing colon/filler-dot leaders.
///
/// Idempotent: cleaning a cleaned label is a no-op.
pub(crate) fn clean_label(raw: &str) -> String {
    let tail = raw.rsplit(NUL).next().unwrap_or(raw);
    tail.trim()
        .trim_end_matches([':', '.', ' '])
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(s: &str) -> Vec<char> {
        s.chars().map(|c| if c == '_' { NUL } else { c }).collect()
    }

    #[test]
    fn test_runs_split_on_nul_only() {
        let l = line("__Name: John__Qty 3_");
        let r = runs(&l);
        assert_eq!(r.len(), 2);
        assert_eq!(r[0].text, "Name: John");
        assert_eq!(r[0].start, 2);
        assert_eq!(r[0].end, 12);
        assert_eq!(r[1].text, "Qty 3");
    }

    #[test]
    fn test_blank_runs_dropped() {
        let l = line("__   __ab_");
        let r = runs(&l);
        assert_eq!(r.len(), 1);
        assert_eq!(r[0].text, "ab");
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(&line("___  __")));
        assert!(is_blank(&[]));
        assert!(!is_blank(&line("_x_")));
    }

    #[test]
    fn test_clean_label_strips_colon_and_dots() {
        assert_eq!(clean_label("Name:"), "Name");
        assert_eq!(clean_label("Name . . . ."), "Name");
        assert_eq!(clean_label("  Qty on hand. "), "Qty on hand");
    }

    #[test]
    fn test_clean_label_drops_text_before_nul_run() {
        let raw = format!("junk{}{}Real label:", NUL, NUL);
        assert_eq!(clean_label(&raw), "Real label");
    }

    #[test]
    fn test_clean_label_idempotent() {
        for raw in ["Name:", "Name . . .", "  A/B :", "plain"] {
            let once = clean_label(raw);
            assert_eq!(clean_label(&once), once);
        }
    }
}
