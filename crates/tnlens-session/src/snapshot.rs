use serde::Deserialize;
use serde::Serialize;

/// One editable (input-capable) region reported by the terminal session.
///
/// Fields are single-row spans; `bypass` marks fields the host declared
/// protected (read-only) even though they carry an input buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditableField {
    pub row: usize,
    pub col: usize,
    pub length: usize,
    #[serde(default)]
    pub bypass: bool,
}

impl EditableField {
    pub fn new(row: usize, col: usize, length: usize) -> Self {
        Self {
            row,
            col,
            length,
            bypass: false,
        }
    }

    /// One past the last column covered by this field.
    pub fn end(&self) -> usize {
        self.col + self.length
    }

    pub fn contains_col(&self, col: usize) -> bool {
        col >= self.col && col < self.end()
    }
}

/// An immutable view of one terminal frame: the character grid plus three
/// parallel code planes (color, attribute, graphic) and the editable-field
/// list for that frame.
///
/// Owned by the session layer; the extraction core borrows it for the
/// duration of one scan and keeps no reference afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotBuffer {
    rows: usize,
    cols: usize,
    text: Vec<Vec<char>>,
    color: Vec<Vec<u8>>,
    attr: Vec<Vec<u8>>,
    graphic: Vec<Vec<u8>>,
    fields: Vec<EditableField>,
}

impl SnapshotBuffer {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            text: vec![vec![' '; cols]; rows],
            color: vec![vec![0; cols]; rows],
            attr: vec![vec![0; cols]; rows],
            graphic: vec![vec![0; cols]; rows],
            fields: Vec::new(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn char_at(&self, row: usize, col: usize) -> Option<char> {
        self.text.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn color_at(&self, row: usize, col: usize) -> Option<u8> {
        self.color.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn attr_at(&self, row: usize, col: usize) -> Option<u8> {
        self.attr.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn graphic_at(&self, row: usize, col: usize) -> Option<u8> {
        self.graphic.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn fields(&self) -> &[EditableField] {
        &self.fields
    }

    /// Write `text` at the given position, tagging every covered cell
    /// (including embedded spaces) with `color`. Text past the right edge
    /// is clipped.
    pub fn put_text(&mut self, row: usize, col: usize, text: &str, color: u8) {
        if row >= self.rows {
            return;
        }
        for (i, c) in text.chars().enumerate() {
            let col = col + i;
            if col >= self.cols {
                break;
            }
            self.text[row][col] = c;
            self.color[row][col] = color;
        }
    }

    /// Tag a cell range with an attribute code without touching the text.
    pub fn put_attr(&mut self, row: usize, col: usize, length: usize, attr: u8) {
        if row >= self.rows {
            return;
        }
        for c in col..(col + length).min(self.cols) {
            self.attr[row][c] = attr;
        }
    }

    pub fn put_graphic(&mut self, row: usize, col: usize, length: usize, code: u8) {
        if row >= self.rows {
            return;
        }
        for c in col..(col + length).min(self.cols) {
            self.graphic[row][c] = code;
        }
    }

    pub fn add_field(&mut self, field: EditableField) {
        self.fields.push(field);
    }

    /// The text content of an editable field's span, trimmed.
    pub fn field_text(&self, field: &EditableField) -> String {
        let mut s = String::with_capacity(field.length);
        for col in field.col..field.end() {
            if let Some(c) = self.char_at(field.row, col) {
                s.push(if c == '\0' { ' ' } else { c });
            }
        }
        s.trim().to_string()
    }

    /// The raw text of one row, with control characters mapped to spaces.
    pub fn row_text(&self, row: usize) -> String {
        match self.text.get(row) {
            Some(r) => r.iter().map(|&c| if c < ' ' { ' ' } else { c }).collect(),
            None => String::new(),
        }
    }
}
