// One-shot initialization sequence
//
// Runs exactly once, after the terminal is up and before the event loop:
// anchors URLs in any pre-existing topics, applies the initial pane order,
// and hands off to the router's ready signal (which either focuses the
// active window or arms the single bootstrap retry).

use crate::linkify::LinkRewriter;
use crate::registry::ReorderStrategy;
use crate::router::{Coordinator, FocusRouter};
use std::time::Instant;

pub fn bootstrap(
    coord: &mut Coordinator,
    router: &mut FocusRouter,
    rewriter: Option<&LinkRewriter>,
    now: Instant,
) {
    if let Some(rewriter) = rewriter {
        for window in coord.registry.iter_mut() {
            window.topic = rewriter.rewrite(&window.topic);
        }
    }

    coord.registry.reorder(ReorderStrategy::MostRecentlyActive);
    router.on_ready(coord, now);
    tracing::info!(windows = coord.registry.len(), "bootstrap complete");
}
