//! Dummy LLM provider — echoes the user message back prefixed with `[echo]`.
//! Lets the console run end to end without an API key.

use crate::llm::{ChatRequest, ProviderError};

#[derive(Debug, Clone)]
pub struct DummyProvider;

impl DummyProvider {
    pub async fn complete(&self, request: &ChatRequest) -> Result<String, ProviderError> {
        let content = request.user_content().ok_or(ProviderError::MissingContent)?;
        Ok(format!("[echo] {content}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::llm::build_request;

    #[tokio::test]
    async fn complete_prefixes_echo() {
        let cfg = Config::test_default(std::path::Path::new("/tmp")).llm;
        let req = build_request(&cfg, "hello");
        assert_eq!(DummyProvider.complete(&req).await.unwrap(), "[echo] hello");
    }

    #[tokio::test]
    async fn complete_empty_input() {
        let cfg = Config::test_default(std::path::Path::new("/tmp")).llm;
        let req = build_request(&cfg, "");
        assert_eq!(DummyProvider.complete(&req).await.unwrap(), "[echo] ");
    }
}
