//! HTML → PNG via a headless-browser screenshot service.
//!
//! POSTs `{"html": …, "options": {"type": "png", "fullPage": true}}` to the
//! configured endpoint (the browserless `/screenshot` shape) and returns the
//! response body as the image.

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use tracing::debug;

use super::{HtmlRenderer, RenderError};
use crate::subsystems::comms::{BoxFuture, RenderedImage};

#[derive(Debug, Clone)]
pub struct ScreenshotRenderer {
    client: Client,
    endpoint: String,
}

#[derive(Serialize)]
struct ScreenshotRequest<'a> {
    html: &'a str,
    options: ScreenshotOptions,
}

#[derive(Serialize)]
struct ScreenshotOptions {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(rename = "fullPage")]
    full_page: bool,
}

impl ScreenshotRenderer {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self { client, endpoint: endpoint.into() }
    }

    async fn screenshot(&self, html: String) -> Result<RenderedImage, RenderError> {
        let payload = ScreenshotRequest {
            html: &html,
            options: ScreenshotOptions { kind: "png", full_page: true },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| RenderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RenderError::Status { status: status.as_u16(), body });
        }

        let mime = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/png")
            .to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| RenderError::Network(e.to_string()))?;
        if bytes.is_empty() {
            return Err(RenderError::EmptyImage);
        }

        debug!(endpoint = %self.endpoint, bytes = bytes.len(), "screenshot received");
        Ok(RenderedImage { bytes: bytes.to_vec(), mime })
    }
}

impl HtmlRenderer for ScreenshotRenderer {
    fn render(&self, html: String) -> BoxFuture<'_, Result<RenderedImage, RenderError>> {
        Box::pin(self.screenshot(html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn posts_html_and_returns_png() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/screenshot"))
            .and(body_partial_json(serde_json::json!({
                "html": "<html>hi</html>",
                "options": {"type": "png", "fullPage": true}
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/png")
                    .set_body_bytes(vec![0x89, b'P', b'N', b'G']),
            )
            .expect(1)
            .mount(&server)
            .await;

        let renderer = ScreenshotRenderer::new(Client::new(), format!("{}/screenshot", server.uri()));
        let image = renderer.render("<html>hi</html>".into()).await.unwrap();
        assert_eq!(image.mime, "image/png");
        assert_eq!(image.bytes, vec![0x89, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("chrome crashed"))
            .mount(&server)
            .await;

        let renderer = ScreenshotRenderer::new(Client::new(), server.uri());
        match renderer.render("<html/>".into()).await {
            Err(RenderError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "chrome crashed");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let renderer = ScreenshotRenderer::new(Client::new(), server.uri());
        assert!(matches!(renderer.render("<html/>".into()).await, Err(RenderError::EmptyImage)));
    }
}
