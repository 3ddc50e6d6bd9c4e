//! Shared state for the comms subsystem — capability boundary for channels.
//!
//! Channels receive an `Arc<CommsState>` and only get two things from it:
//! an [`Outbox`] wired with the registered before-send hooks, and a way to
//! hand an inbound line to the chat command.

use std::sync::Arc;

use tracing::debug;

use crate::subsystems::chat::SharedChatCommand;

use super::outbox::{BeforeSend, Outbox, Session};

pub struct CommsState {
    command: SharedChatCommand,
    hooks: Arc<[Arc<dyn BeforeSend>]>,
}

impl CommsState {
    pub fn new(command: SharedChatCommand, hooks: Vec<Arc<dyn BeforeSend>>) -> Self {
        Self { command, hooks: Arc::from(hooks) }
    }

    /// Outbox for `session`; every send runs the hook chain.
    pub fn outbox(&self, session: Arc<dyn Session>) -> Outbox {
        Outbox::new(session, self.hooks.clone())
    }

    /// Route one inbound line. Lines that are not the chat command are
    /// ignored, as a bot framework ignores unknown messages. Never fails:
    /// the command recovers its own errors.
    pub async fn handle_inbound(&self, outbox: &Outbox, line: &str) {
        if !self.command.dispatch(line, outbox).await {
            debug!(
                channel_id = outbox.channel_id(),
                trigger = self.command.trigger_word(),
                "ignoring non-command line"
            );
        }
    }
}
