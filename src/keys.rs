// Key classification for input routing
//
// The focus router must never intercept keys the terminal or the shell
// already handles meaningfully (chords, navigation, function keys). Anything
// else is a content key and belongs in the active window's input box.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Modifier chords the router must leave alone.
/// Shift is deliberately absent: shifted characters are still content.
const SPECIAL_MODIFIERS: KeyModifiers = KeyModifiers::CONTROL
    .union(KeyModifiers::ALT)
    .union(KeyModifiers::SUPER)
    .union(KeyModifiers::META)
    .union(KeyModifiers::HYPER);

/// Returns true for keys the router must pass through untouched.
///
/// Total over every key event: unknown or future key codes classify as
/// content, matching the "else route to input" bias of the client.
pub fn is_special(key: &KeyEvent) -> bool {
    if key.modifiers.intersects(SPECIAL_MODIFIERS) {
        return true;
    }

    match key.code {
        // Function keys and escape
        KeyCode::F(_) | KeyCode::Esc => true,
        // Focus cycling
        KeyCode::Tab | KeyCode::BackTab => true,
        // Navigation
        KeyCode::Up
        | KeyCode::Down
        | KeyCode::Left
        | KeyCode::Right
        | KeyCode::Home
        | KeyCode::End
        | KeyCode::PageUp
        | KeyCode::PageDown => true,
        // Keys with host-level meaning
        KeyCode::Insert
        | KeyCode::CapsLock
        | KeyCode::ScrollLock
        | KeyCode::NumLock
        | KeyCode::PrintScreen
        | KeyCode::Pause
        | KeyCode::Menu
        | KeyCode::KeypadBegin
        | KeyCode::Media(_)
        | KeyCode::Modifier(_) => true,
        // Everything else types into the conversation
        _ => false,
    }
}
