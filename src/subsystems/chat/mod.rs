//! Chat command — `<trigger_word> <message text>` → completion → reply.
//!
//! Lifecycle of one invocation:
//!
//! ```text
//! IDLE ──match──▶ AWAITING_COMPLETION ──ok──▶ SUCCESS ──▶ IDLE
//!                   │ (ack spawned)    └─err─▶ FAILURE ──▶ IDLE
//! ```
//!
//! The acknowledgement is spawned as its own task and never awaited by the
//! completion path. Failures are logged and answered with the configured
//! error message; nothing escapes [`ChatCommand::handle`]. No retries.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{ChatConfig, LlmConfig};
use crate::llm::{LlmProvider, ProviderError, build_request};
use crate::subsystems::comms::Outbox;

/// How an invocation ended.
#[derive(Debug)]
pub enum ReplyOutcome {
    Completed,
    Failed(ProviderError),
}

/// Text to send back plus the outcome it came from.
#[derive(Debug)]
pub struct ChatReply {
    pub text: String,
    pub outcome: ReplyOutcome,
}

impl ChatReply {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ReplyOutcome::Completed)
    }
}

/// Split `input` into the argument of `<trigger> <argument>`.
///
/// The trigger must be followed by whitespace or end the line; the
/// separating whitespace is dropped and the rest is returned untouched.
/// A bare trigger yields `""`.
pub fn parse_command<'a>(trigger: &str, input: &'a str) -> Option<&'a str> {
    let rest = input.strip_prefix(trigger)?;
    match rest.chars().next() {
        None => Some(rest),
        Some(c) if c.is_whitespace() => Some(rest.trim_start()),
        Some(_) => None,
    }
}

/// The command, bound to its configuration and provider at startup.
pub struct ChatCommand {
    chat: ChatConfig,
    llm: LlmConfig,
    provider: LlmProvider,
}

impl ChatCommand {
    pub fn new(chat: ChatConfig, llm: LlmConfig, provider: LlmProvider) -> Self {
        Self { chat, llm, provider }
    }

    pub fn trigger_word(&self) -> &str {
        &self.chat.trigger_word
    }

    pub fn parse<'a>(&self, input: &'a str) -> Option<&'a str> {
        parse_command(&self.chat.trigger_word, input)
    }

    /// Build the request, call the provider, map the result to a reply.
    pub async fn complete(&self, argument: &str) -> ChatReply {
        let request = build_request(&self.llm, argument);

        match self.provider.complete(&request).await {
            Ok(text) => {
                debug!(reply_len = text.len(), "completion succeeded");
                ChatReply { text, outcome: ReplyOutcome::Completed }
            }
            Err(e) => {
                // Detail (status, body, url) is logged where the call failed.
                warn!(kind = e.kind(), "completion failed, replying with error message");
                ChatReply {
                    text: self.chat.error_message.clone(),
                    outcome: ReplyOutcome::Failed(e),
                }
            }
        }
    }

    /// Acknowledge on `outbox` (spawned, not awaited), then complete.
    pub async fn handle(&self, argument: &str, outbox: &Outbox) -> ChatReply {
        let ack_outbox = outbox.clone();
        let ack = self.chat.ack_message.clone();
        tokio::spawn(async move {
            if let Err(e) = ack_outbox.send_text(ack).await {
                warn!(error = %e, "failed to send acknowledgement");
            }
        });

        self.complete(argument).await
    }

    /// Entry point for channels: handle `input` if it is this command and
    /// send the reply. Returns `false` for lines that are not commands.
    ///
    /// A reply that cannot be delivered is logged and dropped, like the ack.
    pub async fn dispatch(&self, input: &str, outbox: &Outbox) -> bool {
        let Some(argument) = self.parse(input) else {
            return false;
        };

        info!(channel_id = outbox.channel_id(), arg_len = argument.len(), "chat command received");
        let reply = self.handle(argument, outbox).await;
        info!(success = reply.is_success(), "chat command finished");

        if let Err(e) = outbox.send_text(reply.text).await {
            warn!(channel_id = outbox.channel_id(), error = %e, "failed to deliver reply");
        }
        true
    }
}

/// Shared handle used by channels.
pub type SharedChatCommand = Arc<ChatCommand>;
