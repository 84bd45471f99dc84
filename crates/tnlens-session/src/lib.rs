#![deny(clippy::all)]

pub mod keys;
mod script;
mod session;
mod snapshot;

pub use script::ScriptedSession;
pub use session::SessionControl;
pub use session::SessionError;
pub use snapshot::EditableField;
pub use snapshot::SnapshotBuffer;

pub type Result<T> = std::result::Result<T, SessionError>;
