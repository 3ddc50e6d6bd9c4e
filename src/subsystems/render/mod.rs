//! Picture mode — turns outbound text into an image before it is sent.
//!
//! The HTML is produced by the pure [`render_html`]; turning HTML into
//! pixels is delegated to an [`HtmlRenderer`] (a headless-browser
//! screenshot service in production, see [`screenshot`]). [`PictureMode`]
//! is the before-send hook that ties them together.

pub mod screenshot;

use std::sync::{Arc, LazyLock};

use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::RenderConfig;
use crate::subsystems::comms::{BeforeSend, BoxFuture, OutboundMessage, RenderedImage};

pub use screenshot::ScreenshotRenderer;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("renderer unreachable: {0}")]
    Network(String),
    #[error("renderer returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("renderer returned an empty image")]
    EmptyImage,
}

/// Converts a complete HTML document into an image.
pub trait HtmlRenderer: Send + Sync + 'static {
    fn render(&self, html: String) -> BoxFuture<'_, Result<RenderedImage, RenderError>>;
}

// ── Template ────────────────────────────────────────────────────────────────

/// Fixed parts of the message-card template.
#[derive(Debug, Clone)]
pub struct CardStyle {
    pub title: String,
    pub avatar_url: String,
    pub stylesheet_url: String,
}

impl From<&RenderConfig> for CardStyle {
    fn from(cfg: &RenderConfig) -> Self {
        Self {
            title: cfg.title.clone(),
            avatar_url: cfg.avatar_url.clone(),
            stylesheet_url: cfg.stylesheet_url.clone(),
        }
    }
}

/// `<template>`, `</template>`, `<//template>`, …
static TEMPLATE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</*template>").expect("template tag pattern is valid"));

/// Remove every template tag. Repeats until stable because removing one tag
/// can join its neighbours into a new one (`<temp<template>late>`).
pub fn strip_template_tags(text: &str) -> String {
    let mut out = text.to_string();
    while TEMPLATE_TAG.is_match(&out) {
        out = TEMPLATE_TAG.replace_all(&out, "").into_owned();
    }
    out
}

/// Wrap message text in the card template. Newlines become `<br>`;
/// template tags are stripped so the text cannot close the host template.
pub fn render_html(content: &str, style: &CardStyle) -> String {
    let body = strip_template_tags(&content.replace('\n', "<br>"));
    let avatar = if style.avatar_url.is_empty() {
        String::new()
    } else {
        format!(
            r#"<span class="avatar avatar-xs me-2" style="background-image: url({})"></span>"#,
            style.avatar_url
        )
    };
    format!(
        r#"<html>
<link rel="stylesheet" href="{stylesheet}">
<style> body {{ background-color: white; }} </style>
<div class="toast show" id="message">
  <div class="toast-header">
    {avatar}
    <strong class="me-auto">{title}</strong>
  </div>
  <div class="toast-body">
    {body}
  </div>
</div>
<script>
  const message = document.getElementById('message');
  document.getElementsByTagName('html')[0].style.height = message.offsetHeight;
  document.getElementsByTagName('html')[0].style.width = message.offsetWidth;
</script>
</html>"#,
        stylesheet = style.stylesheet_url,
        title = style.title,
    )
}

// ── Hook ────────────────────────────────────────────────────────────────────

/// Before-send hook. Disabled → passthrough. Enabled → text is rendered
/// and replaced by the image; if rendering fails the text goes out as is.
pub struct PictureMode {
    enabled: bool,
    style: CardStyle,
    renderer: Arc<dyn HtmlRenderer>,
}

impl PictureMode {
    pub fn new(enabled: bool, style: CardStyle, renderer: Arc<dyn HtmlRenderer>) -> Self {
        Self { enabled, style, renderer }
    }

    async fn apply(&self, message: OutboundMessage) -> OutboundMessage {
        if !self.enabled {
            return message;
        }
        let text = match message {
            OutboundMessage::Text(text) => text,
            image => return image,
        };

        let html = render_html(&text, &self.style);
        match self.renderer.render(html).await {
            Ok(image) => {
                debug!(bytes = image.bytes.len(), mime = %image.mime, "message rendered to image");
                OutboundMessage::Image(image)
            }
            Err(e) => {
                warn!(error = %e, "picture mode render failed, sending text");
                OutboundMessage::Text(text)
            }
        }
    }
}

impl BeforeSend for PictureMode {
    fn name(&self) -> &str {
        "picture_mode"
    }

    fn before_send(&self, message: OutboundMessage) -> BoxFuture<'_, OutboundMessage> {
        Box::pin(self.apply(message))
    }
}
