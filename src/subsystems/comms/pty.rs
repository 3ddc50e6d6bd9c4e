//! PTY (console) comms channel — reads lines from stdin, routes them to the
//! chat command, prints what the bot sends to stdout.
//!
//! The terminal cannot show pictures, so rendered images are written to the
//! configured output directory and their path is printed instead.
//!
//! Runs until the `shutdown` token is cancelled (Ctrl-C) or stdin closes.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::subsystems::runtime::{Component, ComponentFuture};

use super::outbox::{BoxFuture, OutboundMessage, RenderedImage, Session};
use super::state::CommsState;

// ── PtySession ───────────────────────────────────────────────────────────────

/// Delivery end of the console.
pub struct PtySession {
    channel_id: String,
    image_dir: PathBuf,
}

impl PtySession {
    pub fn new(channel_id: impl Into<String>, image_dir: PathBuf) -> Self {
        Self { channel_id: channel_id.into(), image_dir }
    }

    async fn write_image(&self, image: RenderedImage) -> Result<PathBuf, AppError> {
        tokio::fs::create_dir_all(&self.image_dir).await?;
        let ext = image_extension(&image.mime);
        let path = self.image_dir.join(format!("{}.{ext}", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, &image.bytes).await?;
        Ok(path)
    }

    async fn print(&self, message: OutboundMessage) -> Result<(), AppError> {
        match message {
            OutboundMessage::Text(text) => println!("{text}"),
            OutboundMessage::Image(image) => {
                let path = self.write_image(image).await?;
                println!("[image] {}", path.display());
            }
        }
        Ok(())
    }
}

fn image_extension(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        _ => "png",
    }
}

impl Session for PtySession {
    fn channel_id(&self) -> &str {
        &self.channel_id
    }

    fn deliver(&self, message: OutboundMessage) -> BoxFuture<'_, Result<(), AppError>> {
        Box::pin(self.print(message))
    }
}

// ── PtyChannel ───────────────────────────────────────────────────────────────

pub struct PtyChannel {
    channel_id: String,
    image_dir: PathBuf,
    state: Arc<CommsState>,
}

impl PtyChannel {
    pub fn new(channel_id: impl Into<String>, image_dir: PathBuf, state: Arc<CommsState>) -> Self {
        Self { channel_id: channel_id.into(), image_dir, state }
    }
}

impl Component for PtyChannel {
    fn id(&self) -> &str {
        &self.channel_id
    }

    fn run(self: Box<Self>, shutdown: CancellationToken) -> ComponentFuture {
        Box::pin(run_pty(*self, shutdown))
    }
}

async fn run_pty(channel: PtyChannel, shutdown: CancellationToken) -> Result<(), AppError> {
    let PtyChannel { channel_id, image_dir, state } = channel;
    let session: Arc<dyn Session> = Arc::new(PtySession::new(channel_id.clone(), image_dir));
    let outbox = state.outbox(session);

    info!(%channel_id, "pty channel started");
    eprintln!("chatgpt-relay console (Ctrl-C to quit)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                info!("pty channel shutting down");
                break;
            }

            line = lines.next_line() => {
                match line {
                    Err(e) => {
                        warn!("pty read error: {e}");
                        break;
                    }
                    Ok(None) => {
                        info!("pty stdin closed");
                        break;
                    }
                    Ok(Some(input)) => {
                        if input.trim().is_empty() { continue; }
                        debug!(input = %input, "pty received line");
                        state.handle_inbound(&outbox, &input).await;
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_follows_mime() {
        assert_eq!(image_extension("image/png"), "png");
        assert_eq!(image_extension("image/jpeg"), "jpg");
        assert_eq!(image_extension("application/octet-stream"), "png");
    }

    #[tokio::test]
    async fn images_are_written_to_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let session = PtySession::new("pty0", dir.path().join("renders"));
        let image = RenderedImage { bytes: vec![1, 2, 3], mime: "image/png".into() };

        let path = session.write_image(image).await.unwrap();
        assert!(path.starts_with(dir.path().join("renders")));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn text_delivery_succeeds() {
        let dir = tempfile::TempDir::new().unwrap();
        let session = PtySession::new("pty0", dir.path().to_path_buf());
        session.deliver(OutboundMessage::Text("hello".into())).await.unwrap();
        assert_eq!(session.channel_id(), "pty0");
    }
}
