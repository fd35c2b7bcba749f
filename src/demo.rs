// Demo feed: a mock connection layer
//
// Stands in for the real chat backend by opening windows and delivering
// messages on a script. The first window deliberately opens after the
// bootstrap retry delay has passed, so the fire-once focus retry path is
// exercised on every demo run.

use crate::events::ChatEvent;
use crate::window::WindowId;
use chrono::Utc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;

const LOBBY: WindowId = WindowId(1);
const DEV: WindowId = WindowId(2);
const STATUS: WindowId = WindowId(3);

fn message(window: WindowId, from: &str, body: &str) -> ChatEvent {
    ChatEvent::Message {
        window,
        timestamp: Utc::now(),
        from: from.to_string(),
        body: body.to_string(),
    }
}

/// Scripted opening sequence, then a rotating trickle of messages
pub async fn run_demo(tx: mpsc::Sender<ChatEvent>) {
    let script: Vec<(ChatEvent, u64)> = vec![
        (
            ChatEvent::WindowOpened {
                id: LOBBY,
                title: "lobby".to_string(),
                topic: "welcome - house rules at https://parlor.example/rules".to_string(),
            },
            3000,
        ),
        (message(LOBBY, "hoyt", "afternoon, everyone"), 900),
        (
            ChatEvent::WindowOpened {
                id: DEV,
                title: "dev".to_string(),
                topic: "patch queue: http://paste.example/42".to_string(),
            },
            1600,
        ),
        (
            message(
                DEV,
                "ada",
                "new build at https://ci.example/run/817, looks green",
            ),
            1200,
        ),
        (message(LOBBY, "mira", "anyone around for lunch?"), 2100),
        (
            ChatEvent::WindowOpened {
                id: STATUS,
                title: "status".to_string(),
                topic: "incident feed".to_string(),
            },
            1400,
        ),
        (message(STATUS, "pager", "all systems nominal"), 800),
        (ChatEvent::WindowClosed { id: STATUS }, 4000),
        (
            message(DEV, "ada", "merged. changelog: https://parlor.example/v12."),
            1700,
        ),
    ];

    for (event, delay_ms) in script {
        sleep(Duration::from_millis(delay_ms)).await;
        if tx.send(event).await.is_err() {
            return;
        }
    }

    // Keep a slow trickle going so the panes stay alive
    let chatter = [
        (LOBBY, "hoyt", "still here"),
        (DEV, "ada", "rebasing again"),
        (LOBBY, "mira", "see http://news.example for the writeup"),
        (DEV, "nat", "tests pass locally"),
    ];
    for (window, from, body) in chatter.iter().cycle() {
        sleep(Duration::from_millis(2500)).await;
        if tx.send(message(*window, from, body)).await.is_err() {
            return;
        }
    }
}
