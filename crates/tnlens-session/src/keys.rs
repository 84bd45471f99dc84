//! Key mnemonics for page navigation.
//!
//! Only the keys the table harvester issues live here; the full mnemonic
//! translation table belongs to the session implementation.

pub const PAGE_DOWN: &str = "[pagedn]";
pub const PAGE_UP: &str = "[pageup]";
pub const ENTER: &str = "[enter]";
pub const RESET: &str = "[reset]";

/// The inverse navigation key, used to roll the view back after a harvest.
pub fn inverse(key: &str) -> &'static str {
    if key == PAGE_DOWN { PAGE_UP } else { PAGE_DOWN }
}
