//! OpenAI-compatible chat completion provider (`{api_address}/chat/completions`).
//!
//! Covers api.openai.com, OpenRouter and local servers speaking the same
//! wire format. Response wire types are private to this module. The
//! provider is stateless and one round-trip only: no retries.

use std::collections::BTreeMap;

use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use tracing::{debug, error, trace};

use crate::llm::{ChatRequest, ProviderError};

// ── Public provider ───────────────────────────────────────────────────────────

/// Constructed once at startup, then cheaply cloned because
/// `reqwest::Client` is an `Arc` internally.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleProvider {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl OpenAiCompatibleProvider {
    /// `default_headers` are attached to every request (OpenRouter uses
    /// `HTTP-Referer` and `X-Title`). When `api_key` is present it goes out
    /// as `Authorization: Bearer <key>`. No timeout unless one is given.
    pub fn new(
        api_address: &str,
        api_key: Option<String>,
        default_headers: &BTreeMap<String, String>,
        timeout_seconds: Option<u64>,
    ) -> Result<Self, ProviderError> {
        let mut builder = Client::builder().default_headers(header_map(default_headers)?);
        if let Some(secs) = timeout_seconds {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ProviderError::Setup(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, endpoint: completions_url(api_address), api_key })
    }

    /// Send `request` and return the first choice's content verbatim.
    pub async fn complete(&self, request: &ChatRequest) -> Result<String, ProviderError> {
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            max_tokens = request.max_tokens,
            "sending completion request"
        );
        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string_pretty(request)
                .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
            trace!(payload = %json, "full completion request payload");
        }

        let mut req = self.client.post(&self.endpoint).json(request);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await.map_err(|e| {
            error!(url = %self.endpoint, error = %e, "completion request failed (transport)");
            ProviderError::Network(e.to_string())
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            error!(%status, detail = %error_detail(&body), "completion returned HTTP error");
            return Err(ProviderError::UpstreamStatus { status: status.as_u16(), body });
        }

        trace!(response = %body, "full completion response payload");
        extract_content(&body)
    }
}

/// `https://api.openai.com/v1` → `https://api.openai.com/v1/chat/completions`.
pub fn completions_url(api_address: &str) -> String {
    format!("{}/chat/completions", api_address.trim_end_matches('/'))
}

fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, ProviderError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ProviderError::Setup(format!("invalid header name '{name}': {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ProviderError::Setup(format!("invalid value for header '{name}': {e}")))?;
        map.insert(name, value);
    }
    Ok(map)
}

/// Parse a 2xx body and pull out `choices[0].message.content`.
fn extract_content(body: &str) -> Result<String, ProviderError> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body).map_err(|e| {
        error!(error = %e, "failed to deserialize completion response");
        ProviderError::Parse(e.to_string())
    })?;

    if let Some(u) = &parsed.usage {
        debug!(
            prompt_tokens = u.prompt_tokens,
            completion_tokens = u.completion_tokens,
            "received completion"
        );
    }

    let Some(first) = parsed.choices.into_iter().next() else {
        error!("completion response has no choices");
        return Err(ProviderError::EmptyChoices);
    };
    first.message.content.ok_or_else(|| {
        error!("first choice has no message content");
        ProviderError::MissingContent
    })
}

/// Best-effort one-line summary of an error body for the log.
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) => match env.error.code {
            Some(serde_json::Value::String(code)) => format!("[code={code}] {}", env.error.message),
            Some(code) => format!("[code={code}] {}", env.error.message),
            None => env.error.message,
        },
        Err(_) => body.to_string(),
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<UsageData>,
}

#[derive(Debug, Deserialize)]
struct UsageData {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

// Error envelope used by OpenAI and compatible APIs.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completions_url_appends_path_once() {
        assert_eq!(
            completions_url("https://api.openai.com/v1"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            completions_url("https://openrouter.ai/api/v1/"),
            "https://openrouter.ai/api/v1/chat/completions"
        );
    }

    #[test]
    fn extracts_first_choice_verbatim() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"  hello\n"}},{"message":{"content":"second"}}]}"#;
        assert_eq!(extract_content(body).unwrap(), "  hello\n");
    }

    #[test]
    fn empty_choices_is_an_error() {
        assert!(matches!(extract_content(r#"{"choices":[]}"#), Err(ProviderError::EmptyChoices)));
    }

    #[test]
    fn null_content_is_an_error() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        assert!(matches!(extract_content(body), Err(ProviderError::MissingContent)));
    }

    #[test]
    fn non_json_body_is_a_parse_error() {
        assert!(matches!(extract_content("<html>bad gateway</html>"), Err(ProviderError::Parse(_))));
        assert!(matches!(extract_content(r#"{"id":"x"}"#), Err(ProviderError::Parse(_))));
    }

    #[test]
    fn error_detail_reads_envelope() {
        let body = r#"{"error":{"message":"Incorrect API key","type":"invalid_request_error","code":"invalid_api_key"}}"#;
        assert_eq!(error_detail(body), "[code=invalid_api_key] Incorrect API key");
        assert_eq!(error_detail("plain text"), "plain text");
    }

    #[test]
    fn invalid_header_name_rejected() {
        let headers = BTreeMap::from([("bad header".to_string(), "v".to_string())]);
        let result = OpenAiCompatibleProvider::new("http://localhost/v1", None, &headers, None);
        assert!(matches!(result, Err(ProviderError::Setup(_))));
    }
}
