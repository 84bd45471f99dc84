use tnlens_session::EditableField;
use tnlens_session::SnapshotBuffer;

/// Sentinel for a cell rejected by plane filtering.
pub const NUL: char = '\0';

/// Selector for the three parallel code planes of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodePlane {
    Color,
    Attribute,
    Graphic,
}

/// 5250 field color codes as they appear in the color plane.
pub mod color {
    pub const GREEN: u8 = 0x20;
    pub const WHITE: u8 = 0x22;
    pub const RED: u8 = 0x28;
    pub const TURQUOISE: u8 = 0x30;
    pub const YELLOW: u8 = 0x32;
    pub const PINK: u8 = 0x38;
    pub const BLUE: u8 = 0x3A;
}

/// Attribute plane codes.
pub mod attr {
    /// Column-heading attribute carried by table header cells.
    pub const COLUMN_HEAD: u8 = 0x34;
    pub const UNDERLINE: u8 = 0x24;
    pub const INTENSE: u8 = 0x22;
}

/// Read-only access to one terminal frame.
///
/// The extraction core consumes snapshots exclusively through this trait;
/// out-of-range access returns `None` and is treated as blank by callers.
pub trait ScreenSnapshot {
    fn rows(&self) -> usize;
    fn cols(&self) -> usize;
    fn char_at(&self, row: usize, col: usize) -> Option<char>;
    fn code_at(&self, plane: CodePlane, row: usize, col: usize) -> Option<u8>;
    fn fields(&self) -> &[EditableField];

    /// The text content of an editable field's span, trimmed.
    fn field_text(&self, field: &EditableField) -> String {
        let mut s = String::with_capacity(field.length);
        for col in field.col..field.end() {
            match self.char_at(field.row, col) {
                Some(c) if c >= ' ' => s.push(c),
                Some(_) => s.push(' '),
                None => {}
            }
        }
        s.trim().to_string()
    }
}

impl ScreenSnapshot for SnapshotBuffer {
    fn rows(&self) -> usize {
        SnapshotBuffer::rows(self)
    }

    fn cols(&self) -> usize {
        SnapshotBuffer::cols(self)
    }

    fn char_at(&self, row: usize, col: usize) -> Option<char> {
        SnapshotBuffer::char_at(self, row, col)
    }

    fn code_at(&self, plane: CodePlane, row: usize, col: usize) -> Option<u8> {
        match plane {
            CodePlane::Color => self.color_at(row, col),
            CodePlane::Attribute => self.attr_at(row, col),
            CodePlane::Graphic => self.graphic_at(row, col),
        }
    }

    fn fields(&self) -> &[EditableField] {
        SnapshotBuffer::fields(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_buffer_implements_trait() {
        let mut buf = SnapshotBuffer::new(2, 10);
        buf.put_text(0, 0, "Hi", color::GREEN);
        buf.put_attr(1, 0, 3, attr::COLUMN_HEAD);

        let snap: &dyn ScreenSnapshot = &buf;
        assert_eq!(snap.rows(), 2);
        assert_eq!(snap.char_at(0, 1), Some('i'));
        assert_eq!(snap.code_at(CodePlane::Color, 0, 0), Some(color::GREEN));
        assert_eq!(snap.code_at(CodePlane::Attribute, 1, 2), Some(attr::COLUMN_HEAD));
        assert_eq!(snap.code_at(CodePlane::Graphic, 0, 0), Some(0));
        assert_eq!(snap.char_at(5, 0), None);
    }

    #[test]
    fn test_field_text_via_trait() {
        let mut buf = SnapshotBuffer::new(1, 20);
        buf.put_text(0, 4, " ACME ", color::GREEN);
        buf.add_field(EditableField::new(0, 4, 6));

        let snap: &dyn ScreenSnapshot = &buf;
        assert_eq!(snap.field_text(&snap.fields()[0].clone()), "ACME");
    }
}
