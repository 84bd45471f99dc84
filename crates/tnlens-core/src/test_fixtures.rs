//! Shared snapshot builders and proptest strategies for the extraction
//! tests.

use proptest::prelude::*;

use tnlens_session::EditableField;
use tnlens_session::SnapshotBuffer;

use crate::screen::color;

/// A plausible labeled-form screen used by hand-written tests.
pub fn form_screen(rows: usize, cols: usize, entries: &[(usize, &str, &str)]) -> SnapshotBuffer {
    let mut buf = SnapshotBuffer::new(rows, cols);
    for &(row, label, value) in entries {
        buf.put_text(row, 1, label, color::GREEN);
        let field_col = label.len() + 4;
        let length = (cols - field_col).min(20);
        buf.put_text(row, field_col, value, color::GREEN);
        buf.add_field(EditableField::new(row, field_col, length));
    }
    buf
}

fn arb_cell() -> impl Strategy<Value = char> {
    prop_oneof![
        3 => Just(' '),
        4 => proptest::char::range('a', 'z'),
        2 => proptest::char::range('A', 'Z'),
        2 => proptest::char::range('0', '9'),
        1 => Just(':'),
        1 => Just('.'),
        1 => Just('/'),
    ]
}

fn arb_color() -> impl Strategy<Value = u8> {
    prop::sample::select(vec![0x00, color::GREEN, color::WHITE, color::TURQUOISE, color::BLUE])
}

/// Random screens: arbitrary text/color cells plus a handful of editable
/// fields. Not guaranteed to look like any sane host screen, which is the
/// point; extraction must stay total over garbage.
pub fn arb_snapshot() -> impl Strategy<Value = SnapshotBuffer> {
    (2usize..10, 10usize..50).prop_flat_map(|(rows, cols)| {
        let grid = prop::collection::vec(
            prop::collection::vec((arb_cell(), arb_color()), cols),
            rows,
        );
        let fields = prop::collection::vec(
            (0..rows, 0..cols.saturating_sub(2), 1usize..10),
            0..4,
        );
        (grid, fields).prop_map(move |(grid, fields)| {
            let mut buf = SnapshotBuffer::new(rows, cols);
            for (row, line) in grid.iter().enumerate() {
                for (col, &(ch, code)) in line.iter().enumerate() {
                    buf.put_text(row, col, &ch.to_string(), code);
                }
            }
            for (row, col, length) in fields {
                buf.add_field(EditableField::new(row, col, length.min(cols - col)));
            }
            buf
        })
    })
}
