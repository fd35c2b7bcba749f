// Focus routing - the window focus & input routing coordinator
//
// Single dispatcher translating four host-level signals (key-down, resize,
// focus gained, focus lost) plus the one-shot bootstrap retry into registry
// actions. Every unavailability condition (no active window, overlay open,
// unroutable key) degrades to a silent no-op; nothing in here can fail.

use crate::keys;
use crate::registry::WindowRegistry;
use crossterm::event::KeyEvent;
use std::time::{Duration, Instant};

/// Shared UI state the router reads and the shell owns the transitions of.
///
/// Explicitly constructed and passed by reference - there is no ambient
/// singleton. OverlayState and FocusState live here next to the registry.
#[derive(Debug)]
pub struct Coordinator {
    pub registry: WindowRegistry,
    /// Settings overlay open? While true, key routing must not steal focus
    /// into a chat window (the user is typing into the overlay).
    overlay_open: bool,
    /// Whether the terminal itself has focus
    focused: bool,
}

impl Coordinator {
    pub fn new() -> Self {
        Self {
            registry: WindowRegistry::new(),
            overlay_open: false,
            // Assume focus at startup; the host corrects us via focus events
            focused: true,
        }
    }

    pub fn overlay_open(&self) -> bool {
        self.overlay_open
    }

    pub fn toggle_overlay(&mut self) {
        self.overlay_open = !self.overlay_open;
        tracing::debug!(open = self.overlay_open, "settings overlay toggled");
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }
}

/// A delayed action scheduled exactly once, with explicit fired state.
/// Replaces fire-and-forget timer semantics: it cannot repeat and can be
/// cancelled before the deadline.
#[derive(Debug)]
struct RetryOnce {
    deadline: Instant,
    fired: bool,
    cancelled: bool,
}

impl RetryOnce {
    fn new(deadline: Instant) -> Self {
        Self {
            deadline,
            fired: false,
            cancelled: false,
        }
    }

    fn pending(&self) -> bool {
        !self.fired && !self.cancelled
    }

    fn due(&self, now: Instant) -> bool {
        self.pending() && now >= self.deadline
    }

    /// Consume the single shot. Returns true only the first time.
    fn fire(&mut self) -> bool {
        if !self.pending() {
            return false;
        }
        self.fired = true;
        true
    }

    fn cancel(&mut self) {
        self.cancelled = true;
    }
}

/// Routes host signals to the active chat window
#[derive(Debug)]
pub struct FocusRouter {
    retry_delay: Duration,
    retry: Option<RetryOnce>,
}

impl FocusRouter {
    pub fn new(retry_delay: Duration) -> Self {
        Self {
            retry_delay,
            retry: None,
        }
    }

    /// Bootstrap signal, delivered once when the shell is up.
    ///
    /// Focuses the active window's input unless the overlay is open. When no
    /// window exists yet (the connection layer has not opened one), schedules
    /// a single re-check instead of polling.
    pub fn on_ready(&mut self, coord: &mut Coordinator, now: Instant) {
        if coord.registry.active_window().is_some() {
            if !coord.overlay_open() {
                coord.registry.focus_active_input();
            }
        } else if coord.registry.is_empty() {
            let deadline = now + self.retry_delay;
            self.retry = Some(RetryOnce::new(deadline));
            tracing::debug!(
                delay_ms = self.retry_delay.as_millis() as u64,
                "no window open yet, scheduling one focus retry"
            );
        }
    }

    /// Deadline of the pending bootstrap retry, if one is still armed
    pub fn retry_deadline(&self) -> Option<Instant> {
        self.retry
            .as_ref()
            .filter(|r| r.pending())
            .map(|r| r.deadline)
    }

    /// The retry timer elapsed. Fires at most once for the whole session;
    /// if there is still no window, nothing further is scheduled.
    pub fn on_retry_elapsed(&mut self, coord: &mut Coordinator, now: Instant) {
        let Some(retry) = self.retry.as_mut() else {
            return;
        };
        if !retry.due(now) || !retry.fire() {
            return;
        }
        if coord.registry.active_window().is_some() {
            if !coord.overlay_open() {
                coord.registry.focus_active_input();
            }
        } else {
            tracing::debug!("focus retry elapsed with no window open, giving up");
        }
    }

    /// Drop the pending retry, typically because a window opened and was
    /// focused through the normal path before the deadline.
    pub fn cancel_retry(&mut self) {
        if let Some(retry) = self.retry.as_mut() {
            retry.cancel();
        }
    }

    /// Global key-down. Returns true when the key was routed to the active
    /// window's input (the shell then feeds the keystroke into it). Special
    /// keys are never consumed here so host shortcuts keep working.
    pub fn on_key_down(&mut self, coord: &mut Coordinator, key: &KeyEvent) -> bool {
        if keys::is_special(key) {
            return false;
        }
        if coord.overlay_open() {
            return false;
        }
        if coord.registry.active_window().is_none() {
            return false;
        }
        coord.registry.focus_active_input();
        true
    }

    /// Terminal resized: keep the latest message visible in the active
    /// window. Deliberately independent of the overlay state.
    pub fn on_resize(&mut self, coord: &mut Coordinator) {
        if let Some(window) = coord.registry.active_window_mut() {
            window.scroll.scroll_to_bottom();
        }
    }

    /// Terminal regained focus: restore input focus to the active window.
    /// Like resize, this does not consult the overlay state.
    pub fn on_focus_gained(&mut self, coord: &mut Coordinator) {
        coord.focused = true;
        if coord.registry.active_window().is_some() {
            coord.registry.focus_active_input();
        }
    }

    /// Terminal lost focus: record it, touch nothing else
    pub fn on_focus_lost(&mut self, coord: &mut Coordinator) {
        coord.focused = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::{ChatWindow, WindowId};
    use crossterm::event::{KeyCode, KeyModifiers};

    const DELAY: Duration = Duration::from_millis(2000);

    fn coord_with_windows(n: u32) -> Coordinator {
        let mut coord = Coordinator::new();
        for id in 1..=n {
            coord
                .registry
                .insert(ChatWindow::new(WindowId(id), format!("w{id}"), ""));
        }
        coord
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_ready_focuses_active_window() {
        let mut coord = coord_with_windows(2);
        coord.registry.set_active(WindowId(1));
        let mut router = FocusRouter::new(DELAY);

        router.on_ready(&mut coord, Instant::now());
        assert!(coord.registry.active_window().unwrap().input.is_focused());
        assert!(router.retry_deadline().is_none());
    }

    #[test]
    fn test_ready_with_overlay_open_does_not_focus() {
        let mut coord = coord_with_windows(1);
        coord.registry.set_active(WindowId(1));
        coord.toggle_overlay();
        let mut router = FocusRouter::new(DELAY);

        router.on_ready(&mut coord, Instant::now());
        assert!(!coord.registry.active_window().unwrap().input.is_focused());
    }

    #[test]
    fn test_ready_with_no_windows_schedules_single_retry() {
        let mut coord = Coordinator::new();
        let mut router = FocusRouter::new(DELAY);
        let start = Instant::now();

        router.on_ready(&mut coord, start);
        assert_eq!(router.retry_deadline(), Some(start + DELAY));

        // Elapse with still no window: fires once, nothing rescheduled
        router.on_retry_elapsed(&mut coord, start + DELAY);
        assert!(router.retry_deadline().is_none());

        // A later call must not fire again
        router.on_retry_elapsed(&mut coord, start + DELAY * 10);
        assert!(router.retry_deadline().is_none());
    }

    #[test]
    fn test_retry_focuses_window_that_appeared() {
        let mut coord = Coordinator::new();
        let mut router = FocusRouter::new(DELAY);
        let start = Instant::now();
        router.on_ready(&mut coord, start);

        coord
            .registry
            .insert(ChatWindow::new(WindowId(7), "late", ""));
        coord.registry.set_active(WindowId(7));

        router.on_retry_elapsed(&mut coord, start + DELAY);
        assert!(coord.registry.active_window().unwrap().input.is_focused());
    }

    #[test]
    fn test_retry_not_due_before_deadline() {
        let mut coord = Coordinator::new();
        let mut router = FocusRouter::new(DELAY);
        let start = Instant::now();
        router.on_ready(&mut coord, start);

        router.on_retry_elapsed(&mut coord, start + Duration::from_millis(1));
        // Still armed - the deadline has not passed
        assert!(router.retry_deadline().is_some());
    }

    #[test]
    fn test_cancelled_retry_never_fires() {
        let mut coord = Coordinator::new();
        let mut router = FocusRouter::new(DELAY);
        let start = Instant::now();
        router.on_ready(&mut coord, start);

        router.cancel_retry();
        assert!(router.retry_deadline().is_none());

        coord.registry.insert(ChatWindow::new(WindowId(1), "w", ""));
        coord.registry.set_active(WindowId(1));
        router.on_retry_elapsed(&mut coord, start + DELAY);
        assert!(!coord.registry.active_window().unwrap().input.is_focused());
    }

    #[test]
    fn test_special_key_never_moves_focus() {
        let mut coord = coord_with_windows(1);
        coord.registry.set_active(WindowId(1));
        let mut router = FocusRouter::new(DELAY);

        for code in [KeyCode::F(1), KeyCode::Tab, KeyCode::Up, KeyCode::Esc] {
            assert!(!router.on_key_down(&mut coord, &key(code)));
            assert!(!coord.registry.active_window().unwrap().input.is_focused());
        }
    }

    #[test]
    fn test_content_key_routes_to_active_input() {
        let mut coord = coord_with_windows(2);
        coord.registry.set_active(WindowId(2));
        let mut router = FocusRouter::new(DELAY);

        assert!(router.on_key_down(&mut coord, &key(KeyCode::Char('h'))));
        let focused: Vec<bool> = coord
            .registry
            .iter()
            .map(|w| w.input.is_focused())
            .collect();
        assert_eq!(focused, vec![false, true]);
    }

    #[test]
    fn test_content_key_with_overlay_open_is_not_routed() {
        let mut coord = coord_with_windows(1);
        coord.registry.set_active(WindowId(1));
        coord.toggle_overlay();
        let mut router = FocusRouter::new(DELAY);

        assert!(!router.on_key_down(&mut coord, &key(KeyCode::Char('h'))));
        assert!(!coord.registry.active_window().unwrap().input.is_focused());
    }

    #[test]
    fn test_content_key_with_no_active_window_is_not_routed() {
        let mut coord = coord_with_windows(1);
        let mut router = FocusRouter::new(DELAY);
        assert!(!router.on_key_down(&mut coord, &key(KeyCode::Char('h'))));
    }

    #[test]
    fn test_resize_anchors_only_active_window() {
        let mut coord = coord_with_windows(2);
        coord.registry.set_active(WindowId(1));
        // Scroll both windows away from the bottom
        for id in [1, 2] {
            let w = coord.registry.get_mut(WindowId(id)).unwrap();
            w.scroll.update_dimensions(20, 5);
            w.scroll.scroll_up();
            assert!(!w.scroll.is_following());
        }

        let mut router = FocusRouter::new(DELAY);
        router.on_resize(&mut coord);

        assert!(coord
            .registry
            .get_mut(WindowId(1))
            .unwrap()
            .scroll
            .is_following());
        assert!(!coord
            .registry
            .get_mut(WindowId(2))
            .unwrap()
            .scroll
            .is_following());
    }

    #[test]
    fn test_resize_with_no_active_window_is_noop() {
        let mut coord = Coordinator::new();
        let mut router = FocusRouter::new(DELAY);
        router.on_resize(&mut coord);
        assert!(coord.registry.is_empty());
    }

    #[test]
    fn test_focus_gained_restores_input_even_with_overlay() {
        let mut coord = coord_with_windows(1);
        coord.registry.set_active(WindowId(1));
        coord.toggle_overlay();
        let mut router = FocusRouter::new(DELAY);
        router.on_focus_lost(&mut coord);
        assert!(!coord.is_focused());

        // Focus-gained intentionally ignores the overlay; only key routing
        // is suppressed while it is open
        router.on_focus_gained(&mut coord);
        assert!(coord.is_focused());
        assert!(coord.registry.active_window().unwrap().input.is_focused());
    }

    #[test]
    fn test_focus_lost_changes_nothing_but_the_flag() {
        let mut coord = coord_with_windows(1);
        coord.registry.set_active(WindowId(1));
        coord.registry.focus_active_input();
        let mut router = FocusRouter::new(DELAY);

        router.on_focus_lost(&mut coord);
        assert!(!coord.is_focused());
        assert_eq!(coord.registry.active_id(), Some(WindowId(1)));
        assert!(coord.registry.active_window().unwrap().input.is_focused());
    }
}
