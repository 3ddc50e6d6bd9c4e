//! Outbound message pipeline.
//!
//! Everything a session sends goes through [`Outbox::send`]: registered
//! [`BeforeSend`] hooks run in order and may rewrite the message (picture
//! mode swaps text for an image), then the [`Session`] delivers it.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::debug;

use crate::error::AppError;

/// Boxed, borrowed future used at the trait seams below.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// An image produced by the rendering collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub bytes: Vec<u8>,
    pub mime: String,
}

/// What a session actually sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    Text(String),
    Image(RenderedImage),
}

impl OutboundMessage {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t),
            Self::Image(_) => None,
        }
    }
}

/// Transport end of a conversation (console, chat network, test recorder).
pub trait Session: Send + Sync + 'static {
    fn channel_id(&self) -> &str;

    fn deliver(&self, message: OutboundMessage) -> BoxFuture<'_, Result<(), AppError>>;
}

/// Hook run on every outbound message before delivery.
///
/// Hooks cannot fail the send: a hook that cannot do its job returns the
/// message unchanged.
pub trait BeforeSend: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn before_send(&self, message: OutboundMessage) -> BoxFuture<'_, OutboundMessage>;
}

/// Cloneable handle bundling a session with the hook chain.
#[derive(Clone)]
pub struct Outbox {
    session: Arc<dyn Session>,
    hooks: Arc<[Arc<dyn BeforeSend>]>,
}

impl Outbox {
    pub fn new(session: Arc<dyn Session>, hooks: Arc<[Arc<dyn BeforeSend>]>) -> Self {
        Self { session, hooks }
    }

    pub fn channel_id(&self) -> &str {
        self.session.channel_id()
    }

    pub async fn send(&self, message: OutboundMessage) -> Result<(), AppError> {
        let mut message = message;
        for hook in self.hooks.iter() {
            message = hook.before_send(message).await;
            debug!(hook = hook.name(), channel_id = self.channel_id(), "before-send hook applied");
        }
        self.session.deliver(message).await
    }

    pub async fn send_text(&self, text: impl Into<String>) -> Result<(), AppError> {
        self.send(OutboundMessage::Text(text.into())).await
    }
}
