//! Screen semantic-extraction engine for tnlens.
//!
//! This crate reconstructs a structured model (titles, free text, display
//! fields, input fields with labels, and an optional table) from a raw
//! fixed-width 5250 screen snapshot, using positional and color/attribute
//! heuristics only. There is no schema in the protocol to validate
//! against, so extraction always degrades to best effort and never fails.

#![deny(clippy::all)]

pub mod matcher;
pub mod model;
pub mod scan;
pub mod screen;

#[cfg(test)]
pub mod test_fixtures;

pub use model::ScreenModel;
pub use model::SemanticField;
pub use scan::ScanConfig;
pub use scan::scan;
pub use scan::table::ColumnSpec;
pub use scan::table::TableModel;
pub use scan::table::TableRow;
pub use scan::table::harvest_csv;
pub use screen::CodePlane;
pub use screen::NUL;
pub use screen::ScreenSnapshot;
