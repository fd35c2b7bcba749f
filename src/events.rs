// Events that flow from the connection layer to the shell
//
// The shell never opens or closes windows on its own; the connection
// collaborator (here: the demo feed) drives the window lifecycle and message
// delivery through this enum over an mpsc channel.

use crate::window::WindowId;
use chrono::{DateTime, Utc};

/// One event from the connection/application layer
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// A conversation was opened server- or user-side
    WindowOpened {
        id: WindowId,
        title: String,
        /// Topic fragment; bare URLs are anchored before display
        topic: String,
    },

    /// A conversation was closed by the user or the server
    WindowClosed { id: WindowId },

    /// A message arrived for a window
    Message {
        window: WindowId,
        timestamp: DateTime<Utc>,
        from: String,
        body: String,
    },
}
