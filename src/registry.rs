// Window registry - the ordered set of open chat windows
//
// Owns the pane sequence and the active-window pointer. The invariant is
// that the active pointer, when set, always names a window present in the
// sequence; set_active with an unknown id is a silent no-op because window
// open/close races are expected, not faults.

use crate::window::{ChatWindow, WindowId};

/// Comparators for keeping pane order consistent with user activity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderStrategy {
    /// Most recently activated panes first; never-activated panes keep
    /// their relative order at the end
    MostRecentlyActive,
    /// Case-insensitive by window title
    Alphabetical,
}

/// Ordered chat windows plus the active-window pointer
#[derive(Debug, Default)]
pub struct WindowRegistry {
    windows: Vec<ChatWindow>,
    active: Option<WindowId>,
    /// Monotonic counter stamped onto windows as they are activated
    activation_seq: u64,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatWindow> {
        self.windows.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ChatWindow> {
        self.windows.iter_mut()
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut ChatWindow> {
        self.windows.iter_mut().find(|w| w.id == id)
    }

    /// Add a window opened by the application layer. Ignored if the id is
    /// already present (duplicate open from a reconnect).
    pub fn insert(&mut self, window: ChatWindow) {
        if self.windows.iter().any(|w| w.id == window.id) {
            tracing::debug!(id = window.id.0, "ignoring duplicate window open");
            return;
        }
        self.windows.push(window);
    }

    /// Remove a closed window. If it was active, the most recently active
    /// survivor takes over so the active pointer stays valid.
    pub fn remove(&mut self, id: WindowId) {
        self.windows.retain(|w| w.id != id);
        if self.active == Some(id) {
            self.active = self
                .windows
                .iter()
                .max_by_key(|w| w.last_active)
                .map(|w| w.id);
        }
    }

    pub fn active_id(&self) -> Option<WindowId> {
        self.active
    }

    /// The window currently designated for keyboard input, if any
    pub fn active_window(&self) -> Option<&ChatWindow> {
        let id = self.active?;
        self.windows.iter().find(|w| w.id == id)
    }

    pub fn active_window_mut(&mut self) -> Option<&mut ChatWindow> {
        let id = self.active?;
        self.windows.iter_mut().find(|w| w.id == id)
    }

    /// Mark the given window active. Silent no-op when the id is not in the
    /// sequence - absence is a transient condition during open/close races.
    pub fn set_active(&mut self, id: WindowId) {
        self.activation_seq += 1;
        let seq = self.activation_seq;
        if let Some(window) = self.windows.iter_mut().find(|w| w.id == id) {
            window.last_active = seq;
            self.active = Some(id);
        }
    }

    /// Cycle the active window forward (Tab)
    pub fn activate_next(&mut self) {
        if let Some(id) = self.neighbor_id(1) {
            self.set_active(id);
        }
    }

    /// Cycle the active window backward (Shift+Tab)
    pub fn activate_prev(&mut self) {
        if let Some(id) = self.neighbor_id(-1) {
            self.set_active(id);
        }
    }

    fn neighbor_id(&self, step: isize) -> Option<WindowId> {
        if self.windows.is_empty() {
            return None;
        }
        let len = self.windows.len() as isize;
        let current = self
            .active
            .and_then(|id| self.windows.iter().position(|w| w.id == id))
            .map(|p| p as isize)
            .unwrap_or(-step);
        let next = (current + step).rem_euclid(len) as usize;
        Some(self.windows[next].id)
    }

    /// Re-sort the pane sequence. The sort is stable, so windows that
    /// compare equal keep their previous relative order.
    pub fn reorder(&mut self, strategy: ReorderStrategy) {
        match strategy {
            ReorderStrategy::MostRecentlyActive => {
                self.windows
                    .sort_by_key(|w| std::cmp::Reverse(w.last_active));
            }
            ReorderStrategy::Alphabetical => {
                self.windows.sort_by_key(|w| w.title.to_lowercase());
            }
        }
    }

    /// Send input focus to the active window, blurring every other input.
    /// No-op when nothing is active.
    pub fn focus_active_input(&mut self) {
        let Some(active) = self.active else {
            return;
        };
        for window in &mut self.windows {
            if window.id == active {
                window.input.focus();
            } else {
                window.input.blur();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(id: u32, title: &str) -> ChatWindow {
        ChatWindow::new(WindowId(id), title, "")
    }

    fn registry_with(titles: &[(u32, &str)]) -> WindowRegistry {
        let mut registry = WindowRegistry::new();
        for (id, title) in titles {
            registry.insert(window(*id, title));
        }
        registry
    }

    #[test]
    fn test_set_active_unknown_id_is_noop() {
        let mut registry = registry_with(&[(1, "a"), (2, "b")]);
        registry.set_active(WindowId(1));
        registry.set_active(WindowId(99));
        assert_eq!(registry.active_id(), Some(WindowId(1)));
    }

    #[test]
    fn test_active_window_none_when_empty() {
        let registry = WindowRegistry::new();
        assert!(registry.active_window().is_none());
    }

    #[test]
    fn test_remove_active_promotes_most_recent() {
        let mut registry = registry_with(&[(1, "a"), (2, "b"), (3, "c")]);
        registry.set_active(WindowId(2));
        registry.set_active(WindowId(3));
        registry.set_active(WindowId(1));

        registry.remove(WindowId(1));
        // Window 3 was activated more recently than window 2
        assert_eq!(registry.active_id(), Some(WindowId(3)));

        registry.remove(WindowId(3));
        registry.remove(WindowId(2));
        assert_eq!(registry.active_id(), None);
    }

    #[test]
    fn test_reorder_most_recently_active_is_stable() {
        let mut registry = registry_with(&[(1, "a"), (2, "b"), (3, "c")]);
        registry.set_active(WindowId(2));
        registry.reorder(ReorderStrategy::MostRecentlyActive);

        let order: Vec<u32> = registry.iter().map(|w| w.id.0).collect();
        // 2 was activated; 1 and 3 were not and keep their relative order
        assert_eq!(order, vec![2, 1, 3]);
    }

    #[test]
    fn test_reorder_alphabetical() {
        let mut registry = registry_with(&[(1, "zeta"), (2, "Alpha"), (3, "midway")]);
        registry.reorder(ReorderStrategy::Alphabetical);
        let order: Vec<u32> = registry.iter().map(|w| w.id.0).collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn test_focus_active_input_is_exclusive() {
        let mut registry = registry_with(&[(1, "a"), (2, "b")]);
        registry.set_active(WindowId(2));
        registry.focus_active_input();

        let focused: Vec<bool> = registry.iter().map(|w| w.input.is_focused()).collect();
        assert_eq!(focused, vec![false, true]);

        registry.set_active(WindowId(1));
        registry.focus_active_input();
        let focused: Vec<bool> = registry.iter().map(|w| w.input.is_focused()).collect();
        assert_eq!(focused, vec![true, false]);
    }

    #[test]
    fn test_cycling_wraps() {
        let mut registry = registry_with(&[(1, "a"), (2, "b"), (3, "c")]);
        registry.activate_next();
        assert_eq!(registry.active_id(), Some(WindowId(1)));
        registry.activate_next();
        registry.activate_next();
        registry.activate_next();
        assert_eq!(registry.active_id(), Some(WindowId(1)));
        registry.activate_prev();
        assert_eq!(registry.active_id(), Some(WindowId(3)));
    }

    #[test]
    fn test_duplicate_insert_ignored() {
        let mut registry = registry_with(&[(1, "a")]);
        registry.insert(window(1, "again"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.iter().next().unwrap().title, "a");
    }
}
