//! Version history used for undo/redo and command recall.
//!
//! `VersionedStack` keeps every committed state with a pointer to the
//! current one. Moving the pointer back and forth is undo/redo; committing
//! while the pointer is not at the newest state throws away the states after
//! it. `InputHistory` reuses the same structure to walk through previously
//! entered command lines.

/// A list of states with a movable pointer to the current one.
#[derive(Debug, Clone)]
pub struct VersionedStack<T: Clone> {
    states: Vec<T>,
    pointer: usize,
    limit: Option<usize>,
}

impl<T: Clone> VersionedStack<T> {
    pub fn new(initial: T) -> Self {
        VersionedStack { states: vec![initial], pointer: 0, limit: None }
    }

    /// Keep at most `limit` undoable steps. Older states are evicted on commit.
    pub fn with_capacity_limit(initial: T, limit: usize) -> Self {
        VersionedStack { states: vec![initial], pointer: 0, limit: Some(limit) }
    }

    pub fn current(&self) -> &T {
        &self.states[self.pointer]
    }

    /// Record `state` as the newest version, discarding any redoable states.
    pub fn commit(&mut self, state: T) {
        self.states.truncate(self.pointer + 1);
        self.states.push(state);
        if let Some(limit) = self.limit {
            let excess = self.states.len().saturating_sub(limit + 1);
            if excess > 0 {
                self.states.drain(..excess);
            }
        }
        self.pointer = self.states.len() - 1;
    }

    pub fn undo(&mut self) -> Option<&T> {
        if !self.can_undo() {
            return None;
        }
        self.pointer -= 1;
        Some(&self.states[self.pointer])
    }

    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.pointer += 1;
        Some(&self.states[self.pointer])
    }

    pub fn can_undo(&self) -> bool {
        self.pointer > 0
    }

    pub fn can_redo(&self) -> bool {
        self.pointer + 1 < self.states.len()
    }

    /// Index of the current state, 0 being the oldest kept.
    pub fn position(&self) -> usize {
        self.pointer
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn states(&self) -> &[T] {
        &self.states
    }

    /// Move to the newest state without discarding anything.
    pub fn jump_to_latest(&mut self) {
        self.pointer = self.states.len() - 1;
    }
}

/// Previously entered command lines, browsable with previous/next.
///
/// Backed by a `VersionedStack<String>` whose first state is the blank
/// prompt. Recording always jumps to the newest entry first, so recalling an
/// old command never truncates what came after it.
#[derive(Debug, Clone)]
pub struct InputHistory {
    stack: VersionedStack<String>,
    browsing: bool,
}

impl Default for InputHistory {
    fn default() -> Self {
        InputHistory { stack: VersionedStack::new(String::new()), browsing: false }
    }
}

impl InputHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, line: &str) {
        let line = line.trim();
        self.browsing = false;
        if line.is_empty() {
            return;
        }
        self.stack.jump_to_latest();
        self.stack.commit(line.to_string());
    }

    /// Step towards older entries. The first call yields the newest entry.
    pub fn previous(&mut self) -> Option<&str> {
        if self.stack.len() <= 1 {
            return None;
        }
        if !self.browsing {
            self.browsing = true;
            self.stack.jump_to_latest();
        } else if self.stack.position() > 1 {
            self.stack.undo();
        }
        Some(self.stack.current().as_str())
    }

    /// Step towards newer entries. Past the newest, yields the blank prompt.
    pub fn next(&mut self) -> Option<&str> {
        if !self.browsing {
            return None;
        }
        if self.stack.redo().is_none() {
            self.browsing = false;
            return Some("");
        }
        Some(self.stack.current().as_str())
    }

    /// Entered lines, oldest first.
    pub fn entries(&self) -> &[String] {
        &self.stack.states()[1..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo_walks_states() {
        let mut stack = VersionedStack::new(0);
        stack.commit(1);
        stack.commit(2);
        assert_eq!(*stack.current(), 2);
        assert_eq!(stack.undo(), Some(&1));
        assert_eq!(stack.undo(), Some(&0));
        assert_eq!(stack.undo(), None);
        assert_eq!(stack.redo(), Some(&1));
        assert_eq!(stack.redo(), Some(&2));
        assert_eq!(stack.redo(), None);
    }

    #[test]
    fn test_commit_truncates_redo_branch() {
        let mut stack = VersionedStack::new("a");
        stack.commit("b");
        stack.commit("c");
        stack.undo();
        stack.undo();
        stack.commit("d");
        assert_eq!(stack.states(), &["a", "d"]);
        assert!(!stack.can_redo());
        assert!(stack.can_undo());
    }

    #[test]
    fn test_capacity_limit_evicts_oldest() {
        let mut stack = VersionedStack::with_capacity_limit(0, 2);
        for i in 1..=5 {
            stack.commit(i);
        }
        assert_eq!(stack.states(), &[3, 4, 5]);
        assert_eq!(stack.position(), 2);
        stack.undo();
        stack.undo();
        assert!(!stack.can_undo());
        assert_eq!(*stack.current(), 3);
    }

    #[test]
    fn test_fresh_stack_has_nothing_to_undo_or_redo() {
        let mut stack = VersionedStack::new(String::from("init"));
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
        assert!(stack.undo().is_none());
        assert!(stack.redo().is_none());
        assert_eq!(stack.current(), "init");
    }

    #[test]
    fn test_input_history_empty() {
        let mut history = InputHistory::new();
        assert_eq!(history.previous(), None);
        assert_eq!(history.next(), None);
        assert!(history.entries().is_empty());
    }

    #[test]
    fn test_input_history_recall() {
        let mut history = InputHistory::new();
        history.record("list");
        history.record("delete 1");
        history.record("   ");

        assert_eq!(history.previous(), Some("delete 1"));
        assert_eq!(history.previous(), Some("list"));
        assert_eq!(history.previous(), Some("list"));
        assert_eq!(history.next(), Some("delete 1"));
        assert_eq!(history.next(), Some(""));
        assert_eq!(history.next(), None);
    }

    #[test]
    fn test_recording_after_recall_keeps_everything() {
        let mut history = InputHistory::new();
        history.record("list");
        history.record("delete 1");
        history.previous();
        history.previous();
        history.record("find alex");
        assert_eq!(history.entries(), &["list", "delete 1", "find alex"]);
        assert_eq!(history.previous(), Some("find alex"));
    }
}
