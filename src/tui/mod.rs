// TUI shell - terminal lifecycle and event loop
//
// Owns the terminal (raw mode, alternate screen, focus-change reporting) and
// runs the event loop that translates crossterm events into focus-router
// calls. The shell is the "surrounding application" the routing core
// collaborates with: it feeds routed keystrokes into the active input box,
// applies connection-layer events to the registry, and toggles the overlay.

pub mod ui;

use crate::bootstrap::bootstrap;
use crate::config::Config;
use crate::events::ChatEvent;
use crate::linkify::LinkRewriter;
use crate::logging::LogBuffer;
use crate::registry::ReorderStrategy;
use crate::router::{Coordinator, FocusRouter};
use crate::window::{ChatWindow, Message};
use anyhow::{Context, Result};
use chrono::Utc;
use crossterm::{
    event::{
        self, DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Shell state: the coordinator plus everything the renderer needs
pub struct Shell {
    pub coord: Coordinator,
    pub router: FocusRouter,
    rewriter: Option<LinkRewriter>,
    mru_reorder: bool,
    pub log_buffer: LogBuffer,
    pub should_quit: bool,
}

impl Shell {
    pub fn new(config: &Config, log_buffer: LogBuffer) -> Self {
        Self {
            coord: Coordinator::new(),
            router: FocusRouter::new(config.retry_delay()),
            rewriter: config.features.linkify.then(LinkRewriter::new),
            mru_reorder: config.features.mru_reorder,
            log_buffer,
            should_quit: false,
        }
    }

    fn rewrite(&self, fragment: &str) -> String {
        match &self.rewriter {
            Some(rewriter) => rewriter.rewrite(fragment),
            None => fragment.to_string(),
        }
    }

    /// Apply one connection-layer event to the registry
    pub fn apply_chat_event(&mut self, event: ChatEvent) {
        match event {
            ChatEvent::WindowOpened { id, title, topic } => {
                let topic = self.rewrite(&topic);
                tracing::info!(window = %title, "window opened");
                self.coord.registry.insert(ChatWindow::new(id, title, topic));
                if self.coord.registry.active_id().is_none() {
                    self.coord.registry.set_active(id);
                    if !self.coord.overlay_open() {
                        self.coord.registry.focus_active_input();
                        // The normal path focused a window; the bootstrap
                        // retry has nothing left to do
                        self.router.cancel_retry();
                    }
                }
                self.reorder_panes();
            }
            ChatEvent::WindowClosed { id } => {
                tracing::info!(id = id.0, "window closed");
                self.coord.registry.remove(id);
                if !self.coord.overlay_open() {
                    self.coord.registry.focus_active_input();
                }
            }
            ChatEvent::Message {
                window,
                timestamp,
                from,
                body,
            } => {
                let body = self.rewrite(&body);
                match self.coord.registry.get_mut(window) {
                    Some(w) => w.push_message(Message {
                        timestamp,
                        from,
                        body,
                    }),
                    // Expected during open/close races; drop, don't fail
                    None => tracing::debug!(id = window.0, "message for unknown window dropped"),
                }
            }
        }
    }

    fn reorder_panes(&mut self) {
        if self.mru_reorder {
            self.coord.registry.reorder(ReorderStrategy::MostRecentlyActive);
        }
    }

    /// Activate the neighboring window and keep pane order in sync
    fn cycle_window(&mut self, forward: bool) {
        if forward {
            self.coord.registry.activate_next();
        } else {
            self.coord.registry.activate_prev();
        }
        if !self.coord.overlay_open() {
            self.coord.registry.focus_active_input();
        }
        self.reorder_panes();
    }

    /// Layered key dispatch: quit chord, overlay, shell shortcuts, then the
    /// focus router for content keys
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
            return;
        }

        // Quit chord works everywhere
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
        {
            self.should_quit = true;
            return;
        }

        // Overlay captures the keyboard while open
        if self.coord.overlay_open() {
            if matches!(key.code, KeyCode::Esc | KeyCode::F(2)) {
                self.coord.toggle_overlay();
                self.coord.registry.focus_active_input();
            }
            return;
        }

        // Shell-level special keys
        match key.code {
            KeyCode::F(2) => {
                self.coord.toggle_overlay();
                return;
            }
            KeyCode::Tab => {
                self.cycle_window(true);
                return;
            }
            KeyCode::BackTab => {
                self.cycle_window(false);
                return;
            }
            KeyCode::Up => {
                if let Some(w) = self.coord.registry.active_window_mut() {
                    w.scroll.scroll_up();
                }
                return;
            }
            KeyCode::Down => {
                if let Some(w) = self.coord.registry.active_window_mut() {
                    w.scroll.scroll_down();
                }
                return;
            }
            KeyCode::PageUp => {
                if let Some(w) = self.coord.registry.active_window_mut() {
                    w.scroll.page_up();
                }
                return;
            }
            KeyCode::PageDown => {
                if let Some(w) = self.coord.registry.active_window_mut() {
                    w.scroll.page_down();
                }
                return;
            }
            _ => {}
        }

        // Content keys go through the router; when routed, feed the
        // keystroke into the now-focused input box
        if self.router.on_key_down(&mut self.coord, &key) {
            self.feed_routed_key(&key);
        }
    }

    fn feed_routed_key(&mut self, key: &KeyEvent) {
        let posted = {
            let Some(window) = self.coord.registry.active_window_mut() else {
                return;
            };
            match key.code {
                KeyCode::Char(c) => {
                    window.input.insert(c);
                    None
                }
                KeyCode::Backspace => {
                    window.input.backspace();
                    None
                }
                KeyCode::Enter => window.input.take_line(),
                _ => None,
            }
        };

        // Enter posts the drafted line as a local message
        if let Some(line) = posted {
            let body = self.rewrite(&line);
            if let Some(window) = self.coord.registry.active_window_mut() {
                window.push_message(Message {
                    timestamp: Utc::now(),
                    from: "you".to_string(),
                    body,
                });
                window.scroll.scroll_to_bottom();
            }
        }
    }
}

/// Set up the terminal, run the event loop, restore the terminal
pub async fn run_tui(
    config: Config,
    log_buffer: LogBuffer,
    mut chat_rx: mpsc::Receiver<ChatEvent>,
) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)
        .context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut shell = Shell::new(&config, log_buffer);

    // One-shot init: anchor topics, order panes, focus or arm the retry
    bootstrap(
        &mut shell.coord,
        &mut shell.router,
        shell.rewriter.as_ref(),
        Instant::now(),
    );

    let result = run_event_loop(&mut terminal, &mut shell, &mut chat_rx).await;

    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableFocusChange)
        .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// Main event loop: keyboard/resize/focus input, chat events, the one-shot
/// retry deadline, and a periodic redraw tick
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    shell: &mut Shell,
    chat_rx: &mut mpsc::Receiver<ChatEvent>,
) -> Result<()> {
    let mut tick_interval = tokio::time::interval(Duration::from_millis(200));

    loop {
        terminal
            .draw(|f| ui::draw(f, shell))
            .context("Failed to draw terminal")?;

        let retry_at = shell.router.retry_deadline();
        // Placeholder deadline keeps the disabled branch's future harmless
        let retry_sleep = tokio::time::Instant::from_std(
            retry_at.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600)),
        );

        tokio::select! {
            // Keyboard, resize, and focus-change input
            _ = async {
                if event::poll(Duration::from_millis(10)).unwrap_or(false) {
                    match event::read() {
                        Ok(Event::Key(key)) => shell.handle_key_event(key),
                        Ok(Event::Resize(_, _)) => shell.router.on_resize(&mut shell.coord),
                        Ok(Event::FocusGained) => shell.router.on_focus_gained(&mut shell.coord),
                        Ok(Event::FocusLost) => shell.router.on_focus_lost(&mut shell.coord),
                        _ => {}
                    }
                }
            } => {}

            // Periodic tick so the clock and log line stay fresh
            _ = tick_interval.tick() => {}

            // Connection-layer events
            Some(chat_event) = chat_rx.recv() => {
                shell.apply_chat_event(chat_event);
            }

            // The single bootstrap focus retry
            _ = tokio::time::sleep_until(retry_sleep), if retry_at.is_some() => {
                shell.router.on_retry_elapsed(&mut shell.coord, Instant::now());
            }
        }

        if shell.should_quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::WindowId;

    fn shell() -> Shell {
        Shell::new(&Config::default(), LogBuffer::new())
    }

    fn opened(id: u32, title: &str, topic: &str) -> ChatEvent {
        ChatEvent::WindowOpened {
            id: WindowId(id),
            title: title.to_string(),
            topic: topic.to_string(),
        }
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_first_window_becomes_active_and_focused() {
        let mut shell = shell();
        shell.apply_chat_event(opened(1, "lobby", ""));

        assert_eq!(shell.coord.registry.active_id(), Some(WindowId(1)));
        assert!(shell.coord.registry.active_window().unwrap().input.is_focused());
    }

    #[test]
    fn test_second_window_does_not_steal_activation() {
        let mut shell = shell();
        shell.apply_chat_event(opened(1, "lobby", ""));
        shell.apply_chat_event(opened(2, "dev", ""));
        assert_eq!(shell.coord.registry.active_id(), Some(WindowId(1)));
    }

    #[test]
    fn test_window_open_cancels_bootstrap_retry() {
        let mut shell = shell();
        bootstrap(&mut shell.coord, &mut shell.router, None, Instant::now());
        assert!(shell.router.retry_deadline().is_some());

        shell.apply_chat_event(opened(1, "lobby", ""));
        assert!(shell.router.retry_deadline().is_none());
    }

    #[test]
    fn test_topic_is_anchored_on_open() {
        let mut shell = shell();
        shell.apply_chat_event(opened(1, "lobby", "see http://x.test"));
        let topic = &shell.coord.registry.iter().next().unwrap().topic;
        assert_eq!(topic, "see <a href=\"http://x.test\">http://x.test</a>");
    }

    #[test]
    fn test_message_for_unknown_window_is_dropped() {
        let mut shell = shell();
        shell.apply_chat_event(ChatEvent::Message {
            window: WindowId(9),
            timestamp: Utc::now(),
            from: "ghost".to_string(),
            body: "hello?".to_string(),
        });
        assert!(shell.coord.registry.is_empty());
    }

    #[test]
    fn test_closing_active_window_refocuses_survivor() {
        let mut shell = shell();
        shell.apply_chat_event(opened(1, "lobby", ""));
        shell.apply_chat_event(opened(2, "dev", ""));

        shell.apply_chat_event(ChatEvent::WindowClosed { id: WindowId(1) });
        assert_eq!(shell.coord.registry.active_id(), Some(WindowId(2)));
        assert!(shell.coord.registry.active_window().unwrap().input.is_focused());
    }

    #[test]
    fn test_typing_lands_in_active_input() {
        let mut shell = shell();
        shell.apply_chat_event(opened(1, "lobby", ""));

        for c in "hi".chars() {
            shell.handle_key_event(press(KeyCode::Char(c)));
        }
        assert_eq!(shell.coord.registry.active_window().unwrap().input.text(), "hi");
    }

    #[test]
    fn test_enter_posts_local_message() {
        let mut shell = shell();
        shell.apply_chat_event(opened(1, "lobby", ""));

        for c in "ship it: http://x.test".chars() {
            shell.handle_key_event(press(KeyCode::Char(c)));
        }
        shell.handle_key_event(press(KeyCode::Enter));

        let window = shell.coord.registry.active_window().unwrap();
        assert_eq!(window.input.text(), "");
        assert_eq!(window.messages.len(), 1);
        assert_eq!(window.messages[0].from, "you");
        // Posted line went through the link rewriter
        assert!(window.messages[0].body.contains("<a href=\"http://x.test\">"));
    }

    #[test]
    fn test_overlay_blocks_typing_until_closed() {
        let mut shell = shell();
        shell.apply_chat_event(opened(1, "lobby", ""));

        shell.handle_key_event(press(KeyCode::F(2)));
        assert!(shell.coord.overlay_open());

        shell.handle_key_event(press(KeyCode::Char('x')));
        assert_eq!(shell.coord.registry.active_window().unwrap().input.text(), "");

        shell.handle_key_event(press(KeyCode::Esc));
        assert!(!shell.coord.overlay_open());
        shell.handle_key_event(press(KeyCode::Char('x')));
        assert_eq!(shell.coord.registry.active_window().unwrap().input.text(), "x");
    }

    #[test]
    fn test_tab_cycles_and_reorders_mru() {
        let mut shell = shell();
        shell.apply_chat_event(opened(1, "lobby", ""));
        shell.apply_chat_event(opened(2, "dev", ""));
        shell.apply_chat_event(opened(3, "status", ""));

        shell.handle_key_event(press(KeyCode::Tab));
        // Tab moved activation to the next pane, then MRU reorder put the
        // newly active window first
        let first = shell.coord.registry.iter().next().unwrap();
        assert_eq!(first.id, shell.coord.registry.active_id().unwrap());
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut shell = shell();
        shell.handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(shell.should_quit);
    }
}
