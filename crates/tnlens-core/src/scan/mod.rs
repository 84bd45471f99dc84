//! The scan pipeline: one snapshot in, one [`ScreenModel`] out.
//!
//! Scanning is pure with respect to the session. Every heuristic reads the
//! already-captured planes; nothing here sends keys or waits on I/O, so a
//! scan can be repeated on the same snapshot and must produce the same
//! model (scan id aside).

pub mod color_filter;
pub(crate) mod labels;
pub(crate) mod readonly;
pub(crate) mod runs;
pub mod table;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::debug_span;
use tracing::warn;
use uuid::Uuid;

use crate::model::ScreenModel;
use crate::model::unique_key;
use crate::scan::runs::is_blank;
use crate::scan::table::TableBuilder;
use crate::scan::table::visible_text;
use crate::screen::ScreenSnapshot;
use crate::screen::attr;
use crate::screen::color;

/// Tunables for a scan, resolved once up front. The defaults cover the
/// common green-screen palette; hosts with unusual color usage override
/// the color lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Rows at the top of the screen that hold title text.
    pub title_rows: usize,
    /// Color codes accepted as title text.
    pub title_colors: Vec<u8>,
    /// Color codes accepted as content text.
    pub text_colors: Vec<u8>,
    /// Attribute codes that mark table-header cells.
    pub header_attrs: Vec<u8>,
    /// Sentinels meaning more pages of data follow.
    pub more_markers: Vec<String>,
    /// Sentinels meaning the last page has been reached.
    pub bottom_markers: Vec<String>,
    /// Silently keep the first table on a screen and drop later ones;
    /// `false` reports the extra header region at warn level instead.
    pub favor_first_table: bool,
    /// Fraction of content lines that must look two-column before the
    /// screen is treated as dual-pane.
    pub dual_pane_ratio: f64,
    /// CSV field separator for harvested tables.
    pub field_separator: char,
    /// CSV row separator for harvested tables.
    pub row_separator: String,
    /// Page budget for harvesting; negative means page backwards.
    pub max_pages: i32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            title_rows: 2,
            title_colors: vec![color::WHITE],
            text_colors: vec![color::GREEN, color::WHITE, color::TURQUOISE, color::YELLOW],
            header_attrs: vec![attr::COLUMN_HEAD],
            more_markers: vec!["More...".to_string(), "+".to_string()],
            bottom_markers: vec!["Bottom".to_string(), "End".to_string()],
            favor_first_table: true,
            dual_pane_ratio: 0.3,
            field_separator: ',',
            row_separator: "\n".to_string(),
            max_pages: 10,
        }
    }
}

impl ScanConfig {
    /// Whether a trimmed line consists solely of a paging sentinel.
    pub fn is_marker_line(&self, text: &str) -> bool {
        let t = text.trim();
        self.more_markers
            .iter()
            .chain(self.bottom_markers.iter())
            .any(|m| t.eq_ignore_ascii_case(m))
    }

    pub fn has_more_marker(&self, text: &str) -> bool {
        contains_any(text, &self.more_markers)
    }

    pub fn has_bottom_marker(&self, text: &str) -> bool {
        contains_any(text, &self.bottom_markers)
    }
}

fn contains_any(text: &str, markers: &[String]) -> bool {
    let lower = text.to_ascii_lowercase();
    markers
        .iter()
        .any(|m| !m.is_empty() && lower.contains(&m.to_ascii_lowercase()))
}

enum TableState {
    Idle,
    Header(TableBuilder),
    Body(TableBuilder),
}

/// Scan one snapshot into its semantic model.
///
/// Walks the content area (below the title rows, above the message line)
/// once, classifying each row as table header, table data, labeled input,
/// display pair, or free text. An empty snapshot yields an empty model.
pub fn scan(snapshot: &dyn ScreenSnapshot, config: &ScanConfig) -> ScreenModel {
    // the scan id tags diagnostics only; the model itself is a pure
    // function of the snapshot and config
    let _span = debug_span!("scan", scan_id = %Uuid::new_v4()).entered();

    let mut model = ScreenModel::new();
    let rows = snapshot.rows();
    let width = snapshot.cols();
    if rows == 0 || width == 0 {
        return model;
    }

    for row in 0..config.title_rows.min(rows) {
        let line = color_filter::filter_row(snapshot, row as isize, 0..width, &config.title_colors);
        let text = visible_text(&line);
        if !text.is_empty() {
            model.title_lines.push(text);
        }
    }

    let panes = labels::detect_pane_count(snapshot, config);
    debug!(rows, width, panes, "scan start");

    let mut associator = labels::LabelAssociator::new(config, panes);
    let mut free_text: Vec<String> = Vec::new();
    let mut state = TableState::Idle;

    let content_end = rows.saturating_sub(1);
    for row in config.title_rows.min(rows)..content_end {
        let header = table::header_line(snapshot, row, config);

        state = match (state, header) {
            (TableState::Idle, Some(line)) => {
                if model.table.is_some() {
                    if config.favor_first_table {
                        debug!(row, "additional table header dropped; first table kept");
                    } else {
                        warn!(row, "multiple tables on screen; only the first was extracted");
                    }
                    TableState::Idle
                } else {
                    let mut builder = TableBuilder::new();
                    builder.push_header_line(line);
                    TableState::Header(builder)
                }
            }
            (TableState::Header(mut builder), Some(line)) => {
                builder.push_header_line(line);
                TableState::Header(builder)
            }
            (TableState::Header(mut builder), None) => {
                if builder.finish_header() {
                    data_row(
                        &mut builder, snapshot, row, config, &mut associator,
                    );
                    TableState::Body(builder)
                } else {
                    // too few columns for a table; the text is plain content
                    free_text.extend(
                        builder
                            .header_text_lines()
                            .into_iter()
                            .filter(|t| !t.is_empty()),
                    );
                    plain_row(
                        snapshot, row, width, panes, config, &mut associator, &mut model,
                        &mut free_text,
                    );
                    TableState::Idle
                }
            }
            (TableState::Body(builder), Some(_)) => {
                warn!(row, "table header inside table body ignored");
                TableState::Body(builder)
            }
            (TableState::Body(mut builder), None) => {
                let line =
                    color_filter::filter_row(snapshot, row as isize, 0..width, &config.text_colors);
                if is_blank(&line) && builder.has_rows() {
                    model.table = builder.seal();
                    TableState::Idle
                } else {
                    data_row(&mut builder, snapshot, row, config, &mut associator);
                    TableState::Body(builder)
                }
            }
            (TableState::Idle, None) => {
                plain_row(
                    snapshot, row, width, panes, config, &mut associator, &mut model,
                    &mut free_text,
                );
                TableState::Idle
            }
        };
    }

    match state {
        TableState::Body(builder) => {
            if model.table.is_none() {
                model.table = builder.seal();
            }
        }
        TableState::Header(mut builder) => {
            if builder.finish_header() && model.table.is_none() {
                model.table = builder.seal();
            } else {
                free_text.extend(
                    builder
                        .header_text_lines()
                        .into_iter()
                        .filter(|t| !t.is_empty()),
                );
            }
        }
        TableState::Idle => {}
    }

    // the last row is the message line; keep it as free text
    if rows > config.title_rows {
        let line = color_filter::filter_row(
            snapshot,
            (rows - 1) as isize,
            0..width,
            &config.text_colors,
        );
        let text = visible_text(&line);
        if !text.is_empty() {
            free_text.push(text);
        }
    }

    model.text = free_text.join("\n");
    model
}

fn data_row(
    builder: &mut TableBuilder,
    snapshot: &dyn ScreenSnapshot,
    row: usize,
    config: &ScanConfig,
    associator: &mut labels::LabelAssociator<'_>,
) {
    // table rows never continue a label block
    associator.note_row_without_fields();

    let width = snapshot.cols();
    let line = color_filter::filter_row(snapshot, row as isize, 0..width, &config.text_colors);
    if is_blank(&line) || config.is_marker_line(&visible_text(&line)) {
        return;
    }
    builder.parse_data_row(snapshot, row, config);
}

#[allow(clippy::too_many_arguments)]
fn plain_row(
    snapshot: &dyn ScreenSnapshot,
    row: usize,
    width: usize,
    panes: usize,
    config: &ScanConfig,
    associator: &mut labels::LabelAssociator<'_>,
    model: &mut ScreenModel,
    free_text: &mut Vec<String>,
) {
    let line = color_filter::filter_row(snapshot, row as isize, 0..width, &config.text_colors);

    let spans: Vec<(usize, usize)> = snapshot
        .fields()
        .iter()
        .filter(|f| f.row == row)
        .map(|f| (f.col, f.end()))
        .collect();

    let mut pairs = readonly::extract_display_fields(&line, panes, &spans);
    // on a field-bearing row, an empty-valued pair is a field label, not
    // a display field
    if !spans.is_empty() {
        pairs.retain(|p| !p.value.is_empty());
    }
    let found_pairs = !pairs.is_empty();
    for pair in pairs {
        let key = unique_key(&model.display_fields, &pair.label);
        model.display_fields.insert(key, pair.value);
    }

    if spans.is_empty() {
        associator.note_row_without_fields();
        if !found_pairs && !is_blank(&line) {
            free_text.push(visible_text(&line));
        }
    } else {
        associator.scan_row(snapshot, row, model);
    }
}
