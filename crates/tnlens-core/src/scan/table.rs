//! Table detection, parsing, querying, and multi-page CSV harvesting.
//!
//! A table header region is identified by attribute (not color): header
//! cells carry a column-heading attribute while data rows do not. Column
//! boundaries are derived from the header once and then self-correct as
//! data rows are parsed.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;
use tracing::warn;

use tnlens_common::csv_escape;
use tnlens_session::SessionControl;
use tnlens_session::keys;

use crate::matcher;
use crate::scan::ScanConfig;
use crate::scan::color_filter::filter_row;
use crate::scan::color_filter::filter_row_by_attribute;
use crate::scan::runs::is_blank;
use crate::scan::runs::runs;
use crate::scan::scan;
use crate::screen::CodePlane;
use crate::screen::NUL;
use crate::screen::ScreenSnapshot;

/// Consecutive identical pages tolerated before a sentinel-less harvest
/// gives up (guards against sessions with degraded "more" indicators).
const SAME_PAGE_TOLERANCE: usize = 10;

/// Half-open column range of one table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    pub start: usize,
    pub end: usize,
}

/// One parsed data row: cell text aligned 1:1 with the column specs, plus
/// the snapshot field index behind each cell where the cell overlaps an
/// editable field (for keystroke automation against a specific cell).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub cells: Vec<String>,
    #[serde(skip)]
    pub field_refs: Vec<Option<usize>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableModel {
    headers: Vec<String>,
    specs: Vec<ColumnSpec>,
    rows: Vec<TableRow>,
}

impl TableModel {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn specs(&self) -> &[ColumnSpec] {
        &self.specs
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// Index of the first column whose header matches `name` (match modes
    /// honored).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| matcher::matches(name, h))
    }

    /// Rows matching every criterion. A criterion key of `"*"` means "any
    /// column"; values use the match-mode mini-language.
    pub fn filter(&self, criteria: &HashMap<String, String>) -> Vec<&TableRow> {
        self.rows
            .iter()
            .filter(|row| self.row_matches(row, criteria))
            .collect()
    }

    pub fn first(&self, criteria: &HashMap<String, String>) -> Option<&TableRow> {
        self.rows.iter().find(|row| self.row_matches(row, criteria))
    }

    pub fn find_row(&self, field: &str, pattern: &str) -> Option<&TableRow> {
        self.first(&single(field, pattern))
    }

    pub fn row_count(&self, field: &str, pattern: &str) -> usize {
        self.filter(&single(field, pattern)).len()
    }

    pub fn matches(&self, field: &str, pattern: &str) -> bool {
        self.find_row(field, pattern).is_some()
    }

    fn row_matches(&self, row: &TableRow, criteria: &HashMap<String, String>) -> bool {
        criteria.iter().all(|(column, pattern)| {
            if column == "*" {
                row.cells.iter().any(|cell| matcher::matches(pattern, cell))
            } else {
                match self.column_index(column) {
                    Some(i) => row
                        .cells
                        .get(i)
                        .map(|cell| matcher::matches(pattern, cell))
                        .unwrap_or(false),
                    None => false,
                }
            }
        })
    }

    /// Serialize header and all buffered rows. Every line, including the
    /// last, is terminated by `row_sep`.
    pub fn to_csv(&self, field_sep: char, row_sep: &str) -> String {
        let mut out = csv_line(&self.headers, field_sep);
        out.push_str(row_sep);
        out.push_str(&self.body_csv(field_sep, row_sep));
        out
    }

    fn body_csv(&self, field_sep: char, row_sep: &str) -> String {
        let mut out = String::new();
        for row in &self.rows {
            out.push_str(&csv_line(&row.cells, field_sep));
            out.push_str(row_sep);
        }
        out
    }
}

fn csv_line(cells: &[String], sep: char) -> String {
    cells
        .iter()
        .map(|c| csv_escape(c, sep))
        .collect::<Vec<_>>()
        .join(&sep.to_string())
}

fn single(field: &str, pattern: &str) -> HashMap<String, String> {
    let mut m = HashMap::new();
    m.insert(field.to_string(), pattern.to_string());
    m
}

/// Attribute-filtered header text for `row`, if the row qualifies as a
/// table header line.
///
/// A row is a candidate when its content-color text is blank, or its first
/// five columns hold at most one character with real content following.
/// The attribute-filtered text must then be non-blank and not a paging
/// sentinel.
pub(crate) fn header_line(
    snapshot: &dyn ScreenSnapshot,
    row: usize,
    config: &ScanConfig,
) -> Option<Vec<char>> {
    let width = snapshot.cols();
    let mut content = filter_row(snapshot, row as isize, 0..width, &config.text_colors);
    // header-attributed cells are not content, whatever their color
    for (col, c) in content.iter_mut().enumerate() {
        let is_header_cell = snapshot
            .code_at(CodePlane::Attribute, row, col)
            .map(|a| config.header_attrs.contains(&a))
            .unwrap_or(false);
        if is_header_cell {
            *c = NUL;
        }
    }
    if !(is_blank(&content) || sparse_leading(&content)) {
        return None;
    }

    let header = filter_row_by_attribute(snapshot, row as isize, 0..width, &config.header_attrs);
    if is_blank(&header) {
        return None;
    }

    let text = visible_text(&header);
    if config.is_marker_line(&text) {
        return None;
    }
    Some(header)
}

/// First five columns contain at most one non-NUL character, with content
/// somewhere from that character onward.
fn sparse_leading(content: &[char]) -> bool {
    let lead = &content[..content.len().min(5)];
    let mut non_nul = lead.iter().enumerate().filter(|(_, &c)| c != NUL);
    let first = non_nul.next().map(|(i, _)| i);
    if non_nul.next().is_some() {
        return false;
    }
    let start = first.unwrap_or(lead.len());
    content[start..].iter().any(|&c| c != NUL)
}

pub(crate) fn visible_text(line: &[char]) -> String {
    line.iter()
        .map(|&c| if c == NUL { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Accumulates header lines, derives column specs, and parses data rows.
/// Sealed into an immutable [`TableModel`] when the table region closes.
#[derive(Debug, Default)]
pub(crate) struct TableBuilder {
    header_lines: Vec<Vec<char>>,
    specs: Vec<ColumnSpec>,
    headers: Vec<String>,
    favor_spaces: bool,
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_header_line(&mut self, line: Vec<char>) {
        self.header_lines.push(line);
    }

    /// Derive column specs and header text from the collected header
    /// lines. Returns false when the header resolves to fewer than two
    /// columns, in which case the region is not a table.
    pub fn finish_header(&mut self) -> bool {
        let width = self
            .header_lines
            .iter()
            .map(|l| l.len())
            .max()
            .unwrap_or(0);
        if width == 0 {
            return false;
        }

        self.favor_spaces = self.header_lines.iter().any(|l| has_interior_space_run(l));

        let mut sep: Vec<bool> = (0..width)
            .map(|col| self.header_lines.iter().all(|l| at(l, col) == NUL))
            .collect();

        if self.favor_spaces {
            // runs of >= 2 soft (NUL-or-space) columns also separate
            let soft: Vec<bool> = (0..width)
                .map(|col| {
                    self.header_lines
                        .iter()
                        .all(|l| at(l, col) == NUL || at(l, col) == ' ')
                })
                .collect();
            let mut col = 0;
            while col < width {
                if soft[col] {
                    let mut end = col;
                    while end < width && soft[end] {
                        end += 1;
                    }
                    if end - col >= 2 {
                        for s in sep.iter_mut().take(end).skip(col) {
                            *s = true;
                        }
                    }
                    col = end;
                } else {
                    col += 1;
                }
            }
        }

        self.specs.clear();
        let mut col = 0;
        while col < width {
            if !sep[col] {
                let start = col;
                while col < width && !sep[col] {
                    col += 1;
                }
                self.specs.push(ColumnSpec { start, end: col });
            } else {
                col += 1;
            }
        }

        if self.specs.len() < 2 {
            debug!(columns = self.specs.len(), "header region is not a table");
            return false;
        }
        self.recompute_headers();
        debug!(columns = self.specs.len(), favor_spaces = self.favor_spaces, "table header derived");
        true
    }

    fn recompute_headers(&mut self) {
        self.headers = self
            .specs
            .iter()
            .map(|spec| {
                let parts: Vec<String> = self
                    .header_lines
                    .iter()
                    .map(|line| slice_text(line, spec.start, spec.end))
                    .filter(|s| !s.is_empty())
                    .collect();
                if self.favor_spaces {
                    parts.join(" ")
                } else {
                    parts.concat()
                }
            })
            .collect();
    }

    /// Raw header text of the region, for re-emission as plain text when
    /// the region turns out not to be a table.
    pub fn header_text_lines(&self) -> Vec<String> {
        self.header_lines.iter().map(|l| visible_text(l)).collect()
    }

    pub fn parse_data_row(&mut self, snapshot: &dyn ScreenSnapshot, row: usize, config: &ScanConfig) {
        let width = snapshot.cols();
        let line = filter_row(snapshot, row as isize, 0..width, &config.text_colors);

        let cells = if self.favor_spaces {
            self.parse_spaced(&line)
        } else {
            self.parse_dense(&line)
        };

        let field_refs = self
            .specs
            .iter()
            .map(|spec| {
                snapshot
                    .fields()
                    .iter()
                    .position(|f| f.row == row && f.col < spec.end && f.end() > spec.start)
            })
            .collect();

        self.rows.push(TableRow { cells, field_refs });
    }

    /// Favor-spaces rows slice directly by spec; a cell whose content runs
    /// past its spec's right edge widens the spec (and narrows the next),
    /// after which headers are rederived.
    fn parse_spaced(&mut self, line: &[char]) -> Vec<String> {
        let mut corrected = false;
        for i in 0..self.specs.len() {
            let end = self.specs[i].end;
            if end > 0 && end < line.len() && !soft_char(at(line, end - 1)) && !soft_char(at(line, end)) {
                let mut e = end;
                while e < line.len() && !soft_char(at(line, e)) {
                    e += 1;
                }
                self.specs[i].end = e;
                if i + 1 < self.specs.len() {
                    let next = &mut self.specs[i + 1];
                    next.start = (e + 1).clamp(next.start, next.end);
                }
                corrected = true;
            }
        }
        if corrected {
            self.recompute_headers();
        }

        self.specs
            .iter()
            .map(|spec| slice_text(line, spec.start, spec.end))
            .collect()
    }

    /// Dense rows have NUL-delimited cells reconciled against the specs:
    /// a run in the gap before a spec merges backward, a run crossing a
    /// spec's right edge moves that boundary, and runs past the last spec
    /// dangle until folded into the final column.
    fn parse_dense(&mut self, line: &[char]) -> Vec<String> {
        let mut cells: Vec<String> = vec![String::new(); self.specs.len()];
        let mut extras: Vec<String> = Vec::new();
        let mut corrected = false;

        for run in runs(line) {
            let text = run.trimmed().to_string();
            let last_end = self.specs.last().map(|s| s.end).unwrap_or(0);
            if run.start >= last_end {
                extras.push(text);
                continue;
            }

            let i = self
                .specs
                .iter()
                .position(|s| run.start < s.end)
                .unwrap_or(self.specs.len() - 1);

            if run.end <= self.specs[i].start {
                // wholly inside the gap before spec i: merge backward
                if i > 0 {
                    append_cell(&mut cells[i - 1], &text);
                } else {
                    self.specs[0].start = run.start;
                    append_cell(&mut cells[0], &text);
                    corrected = true;
                }
                continue;
            }

            if run.start < self.specs[i].start {
                self.specs[i].start = run.start;
                corrected = true;
            }
            if run.end > self.specs[i].end {
                // straddles the boundary: move it to the run's end
                self.specs[i].end = run.end;
                if i + 1 < self.specs.len() {
                    let next = &mut self.specs[i + 1];
                    next.start = run.end.clamp(next.start, next.end);
                }
                corrected = true;
            }
            append_cell(&mut cells[i], &text);
        }

        // over-long rows coalesce into the last column, by policy
        if let Some(last) = cells.last_mut() {
            for extra in extras {
                append_cell(last, &extra);
            }
        }

        if corrected {
            self.recompute_headers();
        }
        cells
    }

    pub fn has_rows(&self) -> bool {
        !self.rows.is_empty()
    }

    pub fn seal(self) -> Option<TableModel> {
        if self.specs.len() < 2 {
            return None;
        }
        Some(TableModel {
            headers: self.headers,
            specs: self.specs,
            rows: self.rows,
        })
    }
}

fn at(line: &[char], col: usize) -> char {
    line.get(col).copied().unwrap_or(NUL)
}

fn soft_char(c: char) -> bool {
    c == NUL || c == ' '
}

fn slice_text(line: &[char], start: usize, end: usize) -> String {
    let end = end.min(line.len());
    if start >= end {
        return String::new();
    }
    visible_text(&line[start..end])
}

fn append_cell(cell: &mut String, text: &str) {
    if text.is_empty() {
        return;
    }
    if !cell.is_empty() {
        cell.push(' ');
    }
    cell.push_str(text);
}

/// Header lines whose text holds a run of two or more literal spaces
/// between real words use space-separated column layout; NUL gaps alone
/// mean a dense layout.
fn has_interior_space_run(line: &[char]) -> bool {
    let first = line.iter().position(|&c| !soft_char(c));
    let last = line.iter().rposition(|&c| !soft_char(c));
    match (first, last) {
        (Some(f), Some(l)) if l > f => line[f..=l].windows(2).any(|w| w[0] == ' ' && w[1] == ' '),
        _ => false,
    }
}

/// Harvest a table across pages into CSV.
///
/// Refreshes the session, scans, and emits the header plus each page's
/// rows, turning pages until the bottom sentinel appears (forward scans),
/// `max_pages` is exhausted, a page turn fails, or the content stops
/// changing for [`SAME_PAGE_TOLERANCE`] turns. The view is then rolled
/// back to the original page. Session failures terminate the loop with
/// whatever was harvested; this function never fails.
pub fn harvest_csv<S: SessionControl + ?Sized>(session: &mut S, config: &ScanConfig) -> String {
    let field_sep = config.field_separator;
    let row_sep = config.row_separator.clone();

    let mut snapshot = match session.refresh() {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "initial refresh failed; nothing harvested");
            return String::new();
        }
    };
    let model = scan(&snapshot, config);
    let Some(table) = model.table else {
        warn!("no table on screen; nothing to harvest");
        return String::new();
    };

    let forward = config.max_pages >= 0;
    let max_pages = (config.max_pages.unsigned_abs() as usize).max(1);
    let key = if forward { keys::PAGE_DOWN } else { keys::PAGE_UP };

    let mut out = csv_line(&table.headers, field_sep);
    out.push_str(&row_sep);
    let mut prev_body = table.body_csv(field_sep, &row_sep);
    out.push_str(&prev_body);

    let mut pages_turned = 0usize;
    let mut same_count = 0usize;

    for _ in 1..max_pages {
        let last_line = last_line_text(&snapshot);
        if forward && config.has_bottom_marker(&last_line) {
            debug!("bottom of data reached");
            break;
        }

        if let Err(e) = session.send_keys(key) {
            warn!(error = %e, "page turn failed");
            break;
        }
        snapshot = match session.refresh() {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "refresh after page turn failed");
                break;
            }
        };
        if session.is_keyboard_locked() {
            warn!("keyboard locked after page turn; stopping harvest");
            break;
        }
        pages_turned += 1;

        let model = scan(&snapshot, config);
        let Some(page_table) = model.table else {
            debug!("table vanished after page turn");
            break;
        };
        let body = page_table.body_csv(field_sep, &row_sep);
        if body == prev_body {
            same_count += 1;
            if same_count >= SAME_PAGE_TOLERANCE {
                warn!(tolerance = SAME_PAGE_TOLERANCE, "page content unchanged; stopping harvest");
                break;
            }
        } else {
            same_count = 0;
            out.push_str(&body);
            prev_body = body;
        }
    }

    // return the view to the original page
    let inverse = keys::inverse(key);
    for _ in 0..pages_turned {
        if session.send_keys(inverse).is_err() || session.refresh().is_err() {
            warn!("rollback page turn failed");
            break;
        }
    }

    out
}

fn last_line_text(snapshot: &dyn ScreenSnapshot) -> String {
    let rows = snapshot.rows();
    if rows == 0 {
        return String::new();
    }
    (0..snapshot.cols())
        .map(|col| snapshot.char_at(rows - 1, col).unwrap_or(' '))
        .map(|c| if c < ' ' { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}
