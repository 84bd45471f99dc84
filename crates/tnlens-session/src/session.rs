use thiserror::Error;

use crate::snapshot::SnapshotBuffer;

/// Session operation errors.
///
/// These cover the keystroke/refresh boundary only; the extraction core
/// never raises them itself and treats any of them as "page turn failed".
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to send keys to session: {0}")]
    Send(String),
    #[error("Failed to refresh screen: {0}")]
    Refresh(String),
    #[error("Session disconnected: {0}")]
    Disconnected(String),
}

impl SessionError {
    /// Returns a helpful suggestion for resolving the error.
    pub fn suggestion(&self) -> &'static str {
        match self {
            SessionError::Send(_) => {
                "Keystrokes were not accepted. The keyboard may be locked; send a reset and retry."
            }
            SessionError::Refresh(_) => {
                "The screen did not stabilize. Increase the stabilization wait and retry."
            }
            SessionError::Disconnected(_) => {
                "The host connection dropped. Reconnect the session before scanning."
            }
        }
    }

    /// Returns whether this error is potentially transient and may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SessionError::Send(_) | SessionError::Refresh(_))
    }
}

/// Control surface of a live terminal session.
///
/// `refresh` blocks until the screen has stabilized and returns the
/// resulting frame; all wait logic lives behind this trait, never in the
/// extraction core.
pub trait SessionControl {
    fn send_keys(&mut self, keys: &str) -> Result<(), SessionError>;

    fn refresh(&mut self) -> Result<SnapshotBuffer, SessionError>;

    /// Whether the host has locked the keyboard (input inhibited). A page
    /// turn that leaves the keyboard locked did not take effect.
    fn is_keyboard_locked(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_and_refresh_are_retryable() {
        assert!(SessionError::Send("locked".into()).is_retryable());
        assert!(SessionError::Refresh("timeout".into()).is_retryable());
        assert!(!SessionError::Disconnected("gone".into()).is_retryable());
    }

    #[test]
    fn test_suggestions_are_actionable() {
        assert!(SessionError::Send("x".into()).suggestion().contains("reset"));
        assert!(
            SessionError::Disconnected("x".into())
                .suggestion()
                .contains("Reconnect")
        );
    }
}
