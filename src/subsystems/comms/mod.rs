//! Comms subsystem — where chat lines come in and replies go out.
//!
//! Channels implement [`runtime::Component`](crate::subsystems::runtime::Component)
//! and are built by [`channels`]. Each channel captures an `Arc<CommsState>`
//! and sends through an [`Outbox`], so every reply passes the before-send
//! hooks (picture mode) regardless of which channel produced it.

mod outbox;
pub mod pty;
mod state;

pub use outbox::{BeforeSend, BoxFuture, OutboundMessage, Outbox, RenderedImage, Session};
pub use state::CommsState;

#[cfg(test)]
pub(crate) use outbox::testing;

use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::subsystems::chat::SharedChatCommand;
use crate::subsystems::runtime::Component;

/// Build the configured channels, ready for
/// [`spawn_components`](crate::subsystems::runtime::spawn_components).
pub fn channels(
    config: &Config,
    command: SharedChatCommand,
    hooks: Vec<Arc<dyn BeforeSend>>,
) -> Vec<Box<dyn Component>> {
    let state = Arc::new(CommsState::new(command, hooks));

    info!(trigger = %config.chat.trigger_word, "loading pty channel");
    let pty: Box<dyn Component> =
        Box::new(pty::PtyChannel::new("pty0", config.render.output_dir.clone(), state));
    vec![pty]
}
