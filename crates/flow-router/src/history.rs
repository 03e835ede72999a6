//! Session history
//!
//! Push, replace and traversal over visited paths. Traversal returns the new
//! current entry; the router answers it with a route load, like a `popstate`.

/// History entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub path: String,
}

/// History manager
#[derive(Debug)]
pub struct History {
    entries: Vec<HistoryEntry>,
    current: usize,
}

impl History {
    pub fn new(initial_path: &str) -> Self {
        Self {
            entries: vec![HistoryEntry {
                path: initial_path.to_string(),
            }],
            current: 0,
        }
    }

    /// Push a new history entry
    pub fn push_state(&mut self, path: &str) {
        // Remove forward history
        self.entries.truncate(self.current + 1);

        self.entries.push(HistoryEntry { path: path.to_string() });
        self.current = self.entries.len() - 1;
    }

    /// Replace current entry
    pub fn replace_state(&mut self, path: &str) {
        if let Some(entry) = self.entries.get_mut(self.current) {
            entry.path = path.to_string();
        }
    }

    /// Go back
    pub fn back(&mut self) -> Option<&HistoryEntry> {
        self.go(-1)
    }

    /// Go forward
    pub fn forward(&mut self) -> Option<&HistoryEntry> {
        self.go(1)
    }

    /// Go to specific offset; out-of-range offsets leave history untouched
    pub fn go(&mut self, delta: isize) -> Option<&HistoryEntry> {
        if delta == 0 {
            return None;
        }
        let new_index = self.current.checked_add_signed(delta)?;
        if new_index < self.entries.len() {
            self.current = new_index;
            Some(&self.entries[self.current])
        } else {
            None
        }
    }

    /// Get current entry
    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.current]
    }

    /// Get history length
    pub fn length(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_push() {
        let mut history = History::new("/");

        history.push_state("/page2");
        assert_eq!(history.length(), 2);
        assert_eq!(history.current().path, "/page2");
    }

    #[test]
    fn test_history_navigation() {
        let mut history = History::new("/");
        history.push_state("/page1");
        history.push_state("/page2");

        history.back();
        assert_eq!(history.current().path, "/page1");

        history.back();
        assert_eq!(history.current().path, "/");
        assert!(history.back().is_none());

        history.forward();
        assert_eq!(history.current().path, "/page1");
    }

    #[test]
    fn test_push_drops_forward_entries() {
        let mut history = History::new("/");
        history.push_state("/a");
        history.push_state("/b");
        history.back();
        history.push_state("/c");

        assert_eq!(history.length(), 3);
        assert!(history.forward().is_none());
        assert_eq!(history.current().path, "/c");
    }

    #[test]
    fn test_go_out_of_range() {
        let mut history = History::new("/");
        history.push_state("/a");
        assert!(history.go(-5).is_none());
        assert!(history.go(3).is_none());
        assert_eq!(history.current().path, "/a");
        assert_eq!(history.go(-1).map(|e| e.path.as_str()), Some("/"));
    }

    #[test]
    fn test_history_replace() {
        let mut history = History::new("/");
        history.replace_state("/new");

        assert_eq!(history.length(), 1);
        assert_eq!(history.current().path, "/new");
    }
}
