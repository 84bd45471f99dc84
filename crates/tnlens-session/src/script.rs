use crate::keys;
use crate::session::SessionControl;
use crate::session::SessionError;
use crate::snapshot::SnapshotBuffer;

/// A scripted session that replays a fixed sequence of screen frames.
///
/// Page-down advances through the sequence, page-up walks back; past either
/// end the current frame repeats, which is exactly how a host behaves when
/// there is no further data. Used by tests in this workspace and exported
/// for downstream test suites.
#[derive(Debug)]
pub struct ScriptedSession {
    pages: Vec<SnapshotBuffer>,
    index: usize,
    turns: usize,
    lock_after: Option<usize>,
    keys_sent: Vec<String>,
}

impl ScriptedSession {
    pub fn new(pages: Vec<SnapshotBuffer>) -> Self {
        assert!(!pages.is_empty(), "scripted session needs at least one page");
        Self {
            pages,
            index: 0,
            turns: 0,
            lock_after: None,
            keys_sent: Vec::new(),
        }
    }

    /// Lock the keyboard after `turns` page turns have been accepted.
    pub fn lock_keyboard_after(mut self, turns: usize) -> Self {
        self.lock_after = Some(turns);
        self
    }

    /// Every key string passed to `send_keys`, in order.
    pub fn keys_sent(&self) -> &[String] {
        &self.keys_sent
    }

    pub fn current_page(&self) -> usize {
        self.index
    }
}

impl SessionControl for ScriptedSession {
    fn send_keys(&mut self, k: &str) -> Result<(), SessionError> {
        self.keys_sent.push(k.to_string());
        if self.is_keyboard_locked() {
            return Ok(());
        }
        match k {
            keys::PAGE_DOWN => {
                self.index = (self.index + 1).min(self.pages.len() - 1);
                self.turns += 1;
            }
            keys::PAGE_UP => {
                self.index = self.index.saturating_sub(1);
                self.turns += 1;
            }
            _ => {}
        }
        Ok(())
    }

    fn refresh(&mut self) -> Result<SnapshotBuffer, SessionError> {
        Ok(self.pages[self.index].clone())
    }

    fn is_keyboard_locked(&self) -> bool {
        self.lock_after.map(|n| self.turns >= n).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(marker: &str) -> SnapshotBuffer {
        let mut buf = SnapshotBuffer::new(4, 20);
        buf.put_text(0, 0, marker, 0x20);
        buf
    }

    #[test]
    fn test_page_down_advances_and_clamps() {
        let mut s = ScriptedSession::new(vec![page("one"), page("two")]);
        assert_eq!(s.current_page(), 0);
        s.send_keys(keys::PAGE_DOWN).unwrap();
        assert_eq!(s.current_page(), 1);
        s.send_keys(keys::PAGE_DOWN).unwrap();
        assert_eq!(s.current_page(), 1);
    }

    #[test]
    fn test_page_up_walks_back() {
        let mut s = ScriptedSession::new(vec![page("one"), page("two")]);
        s.send_keys(keys::PAGE_DOWN).unwrap();
        s.send_keys(keys::PAGE_UP).unwrap();
        assert_eq!(s.current_page(), 0);
        s.send_keys(keys::PAGE_UP).unwrap();
        assert_eq!(s.current_page(), 0);
    }

    #[test]
    fn test_keyboard_lock_freezes_navigation() {
        let mut s = ScriptedSession::new(vec![page("one"), page("two"), page("three")])
            .lock_keyboard_after(1);
        s.send_keys(keys::PAGE_DOWN).unwrap();
        assert!(s.is_keyboard_locked());
        s.send_keys(keys::PAGE_DOWN).unwrap();
        assert_eq!(s.current_page(), 1);
    }

    #[test]
    fn test_refresh_returns_current_frame() {
        let mut s = ScriptedSession::new(vec![page("one"), page("two")]);
        let frame = s.refresh().unwrap();
        assert!(frame.row_text(0).starts_with("one"));
        s.send_keys(keys::PAGE_DOWN).unwrap();
        let frame = s.refresh().unwrap();
        assert!(frame.row_text(0).starts_with("two"));
    }
}
