use std::ops::Range;

use crate::screen::CodePlane;
use crate::screen::NUL;
use crate::screen::ScreenSnapshot;

/// Extract one row's characters, keeping only cells whose color-plane code
/// is in `accepted`; every other cell becomes the NUL sentinel.
///
/// An out-of-range row (negative or past the bottom) yields an empty
/// vector. Pure function of the snapshot.
pub fn filter_row(
    snapshot: &dyn ScreenSnapshot,
    row: isize,
    cols: Range<usize>,
    accepted: &[u8],
) -> Vec<char> {
    filter_by_plane(snapshot, row, cols, accepted, CodePlane::Color)
}

/// Same as [`filter_row`] but tested against the attribute plane; used for
/// table-header detection where header cells carry a distinct attribute
/// rather than a distinct color.
pub fn filter_row_by_attribute(
    snapshot: &dyn ScreenSnapshot,
    row: isize,
    cols: Range<usize>,
    accepted: &[u8],
) -> Vec<char> {
    filter_by_plane(snapshot, row, cols, accepted, CodePlane::Attribute)
}

fn filter_by_plane(
    snapshot: &dyn ScreenSnapshot,
    row: isize,
    cols: Range<usize>,
    accepted: &[u8],
    plane: CodePlane,
) -> Vec<char> {
    if row < 0 || row as usize >= snapshot.rows() {
        return Vec::new();
    }
    let row = row as usize;

    cols.map(|col| {
        let keep = snapshot
            .code_at(plane, row, col)
            .map(|code| accepted.contains(&code))
            .unwrap_or(false);
        if keep {
            snapshot.char_at(row, col).unwrap_or(NUL)
        } else {
            NUL
        }
    })
    .collect()
}
