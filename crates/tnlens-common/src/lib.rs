#![deny(clippy::all)]

mod color;
mod strings;

pub use color::Colors;
pub use color::init as color_init;
pub use color::is_disabled as color_is_disabled;
pub use strings::collapse_whitespace;
pub use strings::csv_escape;
