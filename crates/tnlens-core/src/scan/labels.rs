//! Label/field association for rows carrying editable fields, including
//! dual-pane (side-by-side column) layouts.

use tracing::warn;

use tnlens_session::EditableField;

use crate::model::ScreenModel;
use crate::model::SemanticField;
use crate::model::unique_key;
use crate::scan::ScanConfig;
use crate::scan::color_filter::filter_row;
use crate::scan::runs::clean_label;
use crate::scan::runs::is_blank;
use crate::scan::runs::runs;
use crate::screen::NUL;
use crate::screen::ScreenSnapshot;

/// Minimum cleaned length for a text run to count as a label.
const MIN_LABEL_LEN: usize = 2;

/// One positional entry on a row: either a text label or an editable
/// field, ordered by column.
#[derive(Debug, Clone)]
enum RowEntry {
    Label { col: usize, end: usize, text: String },
    Field { index: usize, col: usize, end: usize },
}

impl RowEntry {
    fn col(&self) -> usize {
        match self {
            RowEntry::Label { col, .. } | RowEntry::Field { col, .. } => *col,
        }
    }
}

/// Decide whether the screen lays fields out in one or two logical panes.
///
/// A text line is pane-like when its first four columns and the four
/// columns at its midpoint both match "NUL then alphanumerics/spaces".
/// Two panes when at least `dual_pane_ratio` of non-blank lines qualify.
pub(crate) fn detect_pane_count(snapshot: &dyn ScreenSnapshot, config: &ScanConfig) -> usize {
    let rows = snapshot.rows();
    let width = snapshot.cols();
    if rows == 0 || width < 8 {
        return 1;
    }

    let mut text_lines = 0usize;
    let mut pane_like = 0usize;
    for row in config.title_rows..rows.saturating_sub(1) {
        let line = filter_row(snapshot, row as isize, 0..width, &config.text_colors);
        if is_blank(&line) {
            continue;
        }
        text_lines += 1;
        if is_pane_like(&line) {
            pane_like += 1;
        }
    }

    if text_lines > 0 && (pane_like as f64) >= config.dual_pane_ratio * text_lines as f64 {
        2
    } else {
        1
    }
}

fn is_pane_like(line: &[char]) -> bool {
    let mid = line.len() / 2;
    mid >= 4 && line.len() >= mid + 4 && pane_edge(&line[0..4]) && pane_edge(&line[mid..mid + 4])
}

fn pane_edge(window: &[char]) -> bool {
    window.len() == 4
        && window[0] == NUL
        && window[1..]
            .iter()
            .all(|&c| c.is_ascii_alphanumeric() || c == ' ')
        && window[1..].iter().any(|c| c.is_ascii_alphanumeric())
}

/// Walks field-bearing rows and populates `ScreenModel::input_fields`.
///
/// Carries two pieces of cross-row state: the label left "open" by the
/// immediately preceding field row (continuation rows attach to it) and
/// the last label ever associated (fallback for orphaned fields).
pub(crate) struct LabelAssociator<'a> {
    config: &'a ScanConfig,
    panes: usize,
    open_label: Option<String>,
    last_label: Option<String>,
}

impl<'a> LabelAssociator<'a> {
    pub fn new(config: &'a ScanConfig, panes: usize) -> Self {
        Self {
            config,
            panes: panes.max(1),
            open_label: None,
            last_label: None,
        }
    }

    /// Called by the orchestrator for rows with no editable fields, so an
    /// open label does not leak past its continuation block.
    pub fn note_row_without_fields(&mut self) {
        self.open_label = None;
    }

    pub fn scan_row(&mut self, snapshot: &dyn ScreenSnapshot, row: usize, model: &mut ScreenModel) {
        let row_fields: Vec<(usize, &EditableField)> = snapshot
            .fields()
            .iter()
            .enumerate()
            .filter(|(_, f)| f.row == row)
            .collect();
        if row_fields.is_empty() {
            self.note_row_without_fields();
            return;
        }

        let width = snapshot.cols();
        let line = filter_row(snapshot, row as isize, 0..width, &self.config.text_colors);

        let mut pairs: Vec<(String, usize)> = Vec::new();
        let mut new_open: Option<String> = None;

        for pane in 0..self.panes {
            let pane_start = width * pane / self.panes;
            let pane_end = width * (pane + 1) / self.panes;
            self.scan_pane(
                snapshot,
                row,
                &line,
                pane_start,
                pane_end,
                &row_fields,
                &mut pairs,
                &mut new_open,
            );
        }

        for (label, index) in pairs {
            let field = &snapshot.fields()[index];
            let semantic = SemanticField {
                label: label.clone(),
                value: snapshot.field_text(field),
                read_only: field.bypass,
                source: Some(index),
            };
            let key = unique_key(&model.input_fields, &label);
            model.input_fields.insert(key, semantic);
            self.last_label = Some(label);
        }

        self.open_label = new_open.or_else(|| self.open_label.take());
    }

    #[allow(clippy::too_many_arguments)]
    fn scan_pane(
        &self,
        snapshot: &dyn ScreenSnapshot,
        row: usize,
        line: &[char],
        pane_start: usize,
        pane_end: usize,
        row_fields: &[(usize, &EditableField)],
        pairs: &mut Vec<(String, usize)>,
        new_open: &mut Option<String>,
    ) {
        let mut entries: Vec<RowEntry> = Vec::new();

        if pane_end > pane_start && pane_end <= line.len() {
            for run in runs(&line[pane_start..pane_end]) {
                if clean_label(run.trimmed()).len() >= MIN_LABEL_LEN {
                    entries.push(RowEntry::Label {
                        col: pane_start + run.start,
                        end: pane_start + run.end,
                        text: run.text.clone(),
                    });
                }
            }
        }
        for (index, field) in row_fields {
            if field.col >= pane_start && field.col < pane_end {
                entries.push(RowEntry::Field {
                    index: *index,
                    col: field.col,
                    end: field.end(),
                });
            }
        }
        entries.sort_by_key(RowEntry::col);

        // a pane of labels with no field is dangling text, not input
        if !entries.iter().any(|e| matches!(e, RowEntry::Field { .. })) {
            return;
        }

        // trailing labels after the last field never describe anything
        while matches!(entries.last(), Some(RowEntry::Label { .. })) {
            entries.pop();
        }

        // labels swallowed by a field's span are filler inside the field
        let field_spans: Vec<(usize, usize)> = entries
            .iter()
            .filter_map(|e| match e {
                RowEntry::Field { col, end, .. } => Some((*col, *end)),
                RowEntry::Label { .. } => None,
            })
            .collect();
        entries.retain(|e| match e {
            RowEntry::Label { col, end, .. } => !field_spans
                .iter()
                .any(|&(fs, fe)| *col >= fs && *end <= fe),
            RowEntry::Field { .. } => true,
        });

        let mut i = 0;
        while i < entries.len() {
            let mut label_parts: Vec<String> = Vec::new();
            while let Some(RowEntry::Label { text, .. }) = entries.get(i) {
                label_parts.push(text.clone());
                i += 1;
            }

            let mut group: Vec<usize> = Vec::new();
            while let Some(RowEntry::Field { index, .. }) = entries.get(i) {
                group.push(*index);
                i += 1;
            }
            if group.is_empty() {
                break;
            }

            let combined = clean_label(&label_parts.join(" "));
            if combined.is_empty() {
                self.attach_unlabeled(snapshot, row, &group, pairs);
            } else {
                associate(&combined, &group, pairs);
                let last_part = combined
                    .rsplit('/')
                    .next()
                    .map(|p| clean_label(p))
                    .filter(|p| !p.is_empty());
                *new_open = last_part.or_else(|| Some(combined));
            }
        }
    }

    /// Fields with no label on their own row: continuation of the previous
    /// row's label set, the last-known label as fallback, or dropped.
    fn attach_unlabeled(
        &self,
        snapshot: &dyn ScreenSnapshot,
        row: usize,
        group: &[usize],
        pairs: &mut Vec<(String, usize)>,
    ) {
        let first_col = snapshot.fields()[group[0]].col;

        if let Some(open) = &self.open_label {
            if !self.next_row_opens_label(snapshot, row + 1, first_col) {
                for index in group {
                    pairs.push((open.clone(), *index));
                }
                return;
            }
        }

        match self.open_label.as_ref().or(self.last_label.as_ref()) {
            Some(last) => {
                warn!(row, label = %last, "fields without a label; reusing last label");
                for index in group {
                    pairs.push((last.clone(), *index));
                }
            }
            None => {
                warn!(row, count = group.len(), "unmapped fields dropped");
            }
        }
    }

    /// Lookahead: does the next row's leading text end at or before
    /// `field_col`, i.e. start a label set of its own? If so the previous
    /// label does not continue onto this row.
    fn next_row_opens_label(
        &self,
        snapshot: &dyn ScreenSnapshot,
        row: usize,
        field_col: usize,
    ) -> bool {
        let line = filter_row(
            snapshot,
            row as isize,
            0..snapshot.cols(),
            &self.config.text_colors,
        );
        match runs(&line).first() {
            Some(first) => first.end <= field_col && clean_label(first.trimmed()).len() >= MIN_LABEL_LEN,
            None => false,
        }
    }
}

/// Map one (possibly composite) label onto a group of fields.
fn associate(label: &str, group: &[usize], pairs: &mut Vec<(String, usize)>) {
    let parts: Vec<String> = label
        .split('/')
        .map(|p| clean_label(p))
        .filter(|p| !p.is_empty())
        .collect();
    let n = group.len();

    if parts.len() <= 1 {
        // one label; N > 1 fields share it and pick up @N suffixes later
        for index in group {
            pairs.push((label.to_string(), *index));
        }
        return;
    }

    let m = parts.len();
    if m <= n {
        // positional; extra fields land under the last part
        for (i, index) in group.iter().enumerate() {
            pairs.push((parts[i.min(m - 1)].clone(), *index));
        }
    } else {
        // more parts than fields: each part points at the nearest field
        for (i, part) in parts.iter().enumerate() {
            pairs.push((part.clone(), group[i.min(n - 1)]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::color;
    use tnlens_session::SnapshotBuffer;

    fn config() -> ScanConfig {
        ScanConfig::default()
    }

    fn scan_one(buf: &SnapshotBuffer, panes: usize) -> ScreenModel {
        let cfg = config();
        let mut model = ScreenModel::new();
        let mut assoc = LabelAssociator::new(&cfg, panes);
        for row in 0..buf.rows() {
            assoc.scan_row(buf, row, &mut model);
        }
        model
    }

    #[test]
    fn test_single_label_single_field() {
        let mut buf = SnapshotBuffer::new(3, 40);
        buf.put_text(1, 1, "Name  . . . .", color::GREEN);
        buf.put_text(1, 18, "John", color::GREEN);
        buf.add_field(tnlens_session::EditableField::new(1, 18, 12));

        let model = scan_one(&buf, 1);
        assert_eq!(model.input_fields.len(), 1);
        let f = model.input_fields.get("Name").expect("Name field");
        assert_eq!(f.value, "John");
        assert!(!f.read_only);
    }

    #[test]
    fn test_composite_label_single_field() {
        let mut buf = SnapshotBuffer::new(3, 50);
        buf.put_text(1, 1, "IRS/Security number . . .", color::GREEN);
        buf.put_text(1, 30, "123456", color::GREEN);
        buf.add_field(tnlens_session::EditableField::new(1, 30, 10));

        let model = scan_one(&buf, 1);
        assert_eq!(model.input_fields.len(), 2);
        assert_eq!(model.input_value("IRS"), Some("123456"));
        assert_eq!(model.input_value("Security number"), Some("123456"));
    }

    #[test]
    fn test_composite_label_matching_fields() {
        let mut buf = SnapshotBuffer::new(3, 60);
        buf.put_text(1, 1, "From/To", color::GREEN);
        buf.put_text(1, 12, "0101", color::GREEN);
        buf.put_text(1, 20, "1231", color::GREEN);
        buf.add_field(tnlens_session::EditableField::new(1, 12, 4));
        buf.add_field(tnlens_session::EditableField::new(1, 20, 4));

        let model = scan_one(&buf, 1);
        assert_eq!(model.input_value("From"), Some("0101"));
        assert_eq!(model.input_value("To"), Some("1231"));
    }

    #[test]
    fn test_single_label_many_fields_suffixed() {
        let mut buf = SnapshotBuffer::new(3, 60);
        buf.put_text(1, 1, "Phone", color::GREEN);
        buf.put_text(1, 10, "555", color::GREEN);
        buf.put_text(1, 20, "0100", color::GREEN);
        buf.add_field(tnlens_session::EditableField::new(1, 10, 3));
        buf.add_field(tnlens_session::EditableField::new(1, 20, 4));

        let model = scan_one(&buf, 1);
        assert_eq!(model.input_fields.len(), 2);
        assert_eq!(model.input_value("Phone"), Some("555"));
        assert_eq!(model.input_value("Phone@1"), Some("0100"));
    }

    #[test]
    fn test_label_inside_field_span_ignored() {
        let mut buf = SnapshotBuffer::new(3, 40);
        buf.put_text(1, 1, "City", color::GREEN);
        // placeholder text sitting inside the field's area
        buf.put_text(1, 10, "xx", color::GREEN);
        buf.add_field(tnlens_session::EditableField::new(1, 8, 10));

        let model = scan_one(&buf, 1);
        assert_eq!(model.input_fields.len(), 1);
        assert!(model.input_fields.contains_key("City"));
    }

    #[test]
    fn test_continuation_row_attaches_to_open_label() {
        let mut buf = SnapshotBuffer::new(4, 40);
        buf.put_text(1, 1, "Address", color::GREEN);
        buf.put_text(1, 12, "1 Main St", color::GREEN);
        buf.add_field(tnlens_session::EditableField::new(1, 12, 20));
        // next row: field only, no label
        buf.put_text(2, 12, "Suite 5", color::GREEN);
        buf.add_field(tnlens_session::EditableField::new(2, 12, 20));

        let model = scan_one(&buf, 1);
        assert_eq!(model.input_fields.len(), 2);
        assert_eq!(model.input_value("Address"), Some("1 Main St"));
        assert_eq!(model.input_value("Address@1"), Some("Suite 5"));
    }

    #[test]
    fn test_orphan_fields_without_any_label_dropped() {
        let mut buf = SnapshotBuffer::new(3, 40);
        buf.put_text(1, 10, "loose", color::GREEN);
        buf.add_field(tnlens_session::EditableField::new(1, 10, 8));

        let model = scan_one(&buf, 1);
        assert!(model.input_fields.is_empty());
    }

    #[test]
    fn test_dual_pane_no_cross_matching() {
        let mut buf = SnapshotBuffer::new(3, 40);
        // left pane: dangling label with no field; right pane: label+field
        buf.put_text(1, 1, "Left", color::GREEN);
        buf.put_text(1, 21, "Right", color::GREEN);
        buf.put_text(1, 28, "val", color::GREEN);
        buf.add_field(tnlens_session::EditableField::new(1, 28, 6));

        let model = scan_one(&buf, 2);
        assert_eq!(model.input_fields.len(), 1);
        assert_eq!(model.input_value("Right"), Some("val"));
        assert!(model.input_value("Left").is_none());
    }

    #[test]
    fn test_pane_detection_threshold() {
        let cfg = config();
        let mut buf = SnapshotBuffer::new(8, 40);
        // four pane-like rows out of four non-blank content rows
        for row in 2..6 {
            buf.put_text(row, 1, "abc", color::GREEN);
            buf.put_text(row, 21, "def", color::GREEN);
        }
        assert_eq!(detect_pane_count(&buf, &cfg), 2);

        let mut single = SnapshotBuffer::new(8, 40);
        for row in 2..6 {
            single.put_text(row, 1, "only left side here", color::GREEN);
        }
        assert_eq!(detect_pane_count(&single, &cfg), 1);
    }

    #[test]
    fn test_pane_detection_empty_screen() {
        let cfg = config();
        let buf = SnapshotBuffer::new(0, 0);
        assert_eq!(detect_pane_count(&buf, &cfg), 1);
    }
}
