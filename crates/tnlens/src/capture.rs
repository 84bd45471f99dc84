//! Screen-capture files: one JSON document per terminal frame.
//!
//! ```json
//! {
//!   "cols": 80,
//!   "text": ["  Customer Maintenance", "", "  Name . . .   John"],
//!   "color": [[0, 0, 34, ...], ...],
//!   "attr": [[0, ...], ...],
//!   "graphic": [[0, ...], ...],
//!   "fields": [{"row": 2, "col": 15, "length": 20}]
//! }
//! ```
//!
//! The plane arrays are optional; a missing plane is all zeroes. `fields`
//! uses the same shape the session layer serializes.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use tnlens_core::ScanConfig;
use tnlens_session::EditableField;
use tnlens_session::SnapshotBuffer;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("cannot read capture file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("capture file {path} is not valid JSON: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("capture file {path} is malformed: {reason}")]
    Shape { path: String, reason: String },
}

impl CaptureError {
    pub fn suggestion(&self) -> &'static str {
        match self {
            CaptureError::Io { .. } => "Check the path; captures are JSON files recorded from a session",
            CaptureError::Parse { .. } => {
                "A capture is a JSON object with cols, text rows, optional planes, and fields"
            }
            CaptureError::Shape { .. } => {
                "Every plane must be rows x cols and no text row may be wider than cols"
            }
        }
    }

    /// sysexits-style code for the process exit.
    pub fn exit_code(&self) -> i32 {
        match self {
            CaptureError::Io { .. } => 66,    // EX_NOINPUT
            CaptureError::Parse { .. } | CaptureError::Shape { .. } => 65, // EX_DATAERR
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Capture {
    pub cols: usize,
    pub text: Vec<String>,
    #[serde(default)]
    pub color: Vec<Vec<u8>>,
    #[serde(default)]
    pub attr: Vec<Vec<u8>>,
    #[serde(default)]
    pub graphic: Vec<Vec<u8>>,
    #[serde(default)]
    pub fields: Vec<EditableField>,
}

impl Capture {
    pub fn load(path: &Path) -> Result<SnapshotBuffer, CaptureError> {
        let shown = path.display().to_string();
        let data = std::fs::read_to_string(path).map_err(|source| CaptureError::Io {
            path: shown.clone(),
            source,
        })?;
        let capture: Capture = serde_json::from_str(&data).map_err(|source| CaptureError::Parse {
            path: shown.clone(),
            source,
        })?;
        capture.into_snapshot(&shown)
    }

    fn into_snapshot(self, path: &str) -> Result<SnapshotBuffer, CaptureError> {
        let rows = self.text.len();
        let cols = self.cols;

        for (name, plane) in [
            ("color", &self.color),
            ("attr", &self.attr),
            ("graphic", &self.graphic),
        ] {
            if plane.is_empty() {
                continue;
            }
            if plane.len() != rows || plane.iter().any(|r| r.len() != cols) {
                return Err(CaptureError::Shape {
                    path: path.to_string(),
                    reason: format!("{name} plane is not {rows}x{cols}"),
                });
            }
        }

        let mut buf = SnapshotBuffer::new(rows, cols);
        for (row, line) in self.text.iter().enumerate() {
            if line.chars().count() > cols {
                return Err(CaptureError::Shape {
                    path: path.to_string(),
                    reason: format!("text row {row} is wider than {cols} columns"),
                });
            }
            for (col, ch) in line.chars().enumerate() {
                let code = plane_code(&self.color, row, col);
                buf.put_text(row, col, ch.encode_utf8(&mut [0u8; 4]), code);
            }
        }
        for (row, line) in self.attr.iter().enumerate() {
            for (col, &code) in line.iter().enumerate() {
                if code != 0 {
                    buf.put_attr(row, col, 1, code);
                }
            }
        }
        for (row, line) in self.graphic.iter().enumerate() {
            for (col, &code) in line.iter().enumerate() {
                if code != 0 {
                    buf.put_graphic(row, col, 1, code);
                }
            }
        }
        for field in self.fields {
            if field.row >= rows || field.end() > cols {
                return Err(CaptureError::Shape {
                    path: path.to_string(),
                    reason: format!(
                        "field at ({}, {}) length {} falls outside the screen",
                        field.row, field.col, field.length
                    ),
                });
            }
            buf.add_field(field);
        }

        debug!(path, rows, cols, fields = buf.fields().len(), "capture loaded");
        Ok(buf)
    }
}

/// Load a scan configuration file. Missing keys fall back to the stock
/// palette via the config's serde defaults.
pub fn load_config(path: &Path) -> Result<ScanConfig, CaptureError> {
    let shown = path.display().to_string();
    let data = std::fs::read_to_string(path).map_err(|source| CaptureError::Io {
        path: shown.clone(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| CaptureError::Parse {
        path: shown,
        source,
    })
}

fn plane_code(plane: &[Vec<u8>], row: usize, col: usize) -> u8 {
    plane
        .get(row)
        .and_then(|r| r.get(col))
        .copied()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().expect("temp file");
        f.write_all(content.as_bytes()).expect("write");
        f
    }

    #[test]
    fn test_load_minimal_capture() {
        let f = write_file(r#"{"cols": 10, "text": ["hello", "world"]}"#);
        let buf = Capture::load(f.path()).expect("load");
        assert_eq!(buf.rows(), 2);
        assert_eq!(buf.cols(), 10);
        assert_eq!(buf.char_at(0, 0), Some('h'));
        assert_eq!(buf.color_at(0, 0), Some(0));
    }

    #[test]
    fn test_load_with_planes_and_fields() {
        let f = write_file(
            r#"{
                "cols": 4,
                "text": ["abcd"],
                "color": [[32, 32, 0, 0]],
                "attr": [[0, 52, 0, 0]],
                "fields": [{"row": 0, "col": 2, "length": 2}]
            }"#,
        );
        let buf = Capture::load(f.path()).expect("load");
        assert_eq!(buf.color_at(0, 1), Some(32));
        assert_eq!(buf.attr_at(0, 1), Some(52));
        assert_eq!(buf.fields().len(), 1);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Capture::load(Path::new("/nonexistent/cap.json")).unwrap_err();
        assert!(matches!(err, CaptureError::Io { .. }));
        assert_eq!(err.exit_code(), 66);
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let f = write_file("not json");
        let err = Capture::load(f.path()).unwrap_err();
        assert!(matches!(err, CaptureError::Parse { .. }));
        assert_eq!(err.exit_code(), 65);
    }

    #[test]
    fn test_mismatched_plane_is_shape_error() {
        let f = write_file(r#"{"cols": 4, "text": ["abcd"], "color": [[1, 2]]}"#);
        let err = Capture::load(f.path()).unwrap_err();
        assert!(matches!(err, CaptureError::Shape { .. }));
    }

    #[test]
    fn test_field_outside_screen_is_shape_error() {
        let f = write_file(
            r#"{"cols": 4, "text": ["abcd"], "fields": [{"row": 0, "col": 3, "length": 5}]}"#,
        );
        let err = Capture::load(f.path()).unwrap_err();
        assert!(matches!(err, CaptureError::Shape { .. }));
    }

    #[test]
    fn test_load_partial_config() {
        let f = write_file(r#"{"title_rows": 3, "max_pages": -4}"#);
        let cfg = load_config(f.path()).expect("config");
        assert_eq!(cfg.title_rows, 3);
        assert_eq!(cfg.max_pages, -4);
        // untouched keys keep their defaults
        assert!(!cfg.text_colors.is_empty());
    }
}
