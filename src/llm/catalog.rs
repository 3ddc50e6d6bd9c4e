//! Model catalog resolver.
//!
//! Fetched once at startup from an OpenRouter-style listing
//! (`GET …/models` → `{"data": [{"id": …}, …]}`). Any failure degrades to
//! the profile's fixed fallback list; the catalog is never empty.

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::ProviderError;

/// Where the catalog's entries came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    Remote,
    Fallback,
}

/// Ordered list of selectable model identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCatalog {
    models: Vec<String>,
    source: CatalogSource,
}

impl ModelCatalog {
    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn source(&self) -> CatalogSource {
        self.source
    }

    pub fn contains(&self, model: &str) -> bool {
        self.models.iter().any(|m| m == model)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[derive(Deserialize)]
struct ModelListing {
    data: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    id: String,
}

/// Fetch every model id from `url`, preserving server order, or return
/// `fallback` after logging why the fetch failed.
pub async fn fetch_available_models(client: &Client, url: &str, fallback: &[String]) -> ModelCatalog {
    match try_fetch(client, url).await {
        Ok(models) => {
            info!(%url, count = models.len(), "model catalog fetched");
            ModelCatalog { models, source: CatalogSource::Remote }
        }
        Err(e) => {
            warn!(%url, kind = e.kind(), error = %e, "model catalog fetch failed, using fallback list");
            ModelCatalog { models: fallback.to_vec(), source: CatalogSource::Fallback }
        }
    }
}

async fn try_fetch(client: &Client, url: &str) -> Result<Vec<String>, ProviderError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ProviderError::Network(e.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ProviderError::Network(e.to_string()))?;

    if !status.is_success() {
        return Err(ProviderError::UpstreamStatus { status: status.as_u16(), body });
    }

    let listing: ModelListing =
        serde_json::from_str(&body).map_err(|e| ProviderError::Parse(e.to_string()))?;

    let models: Vec<String> = listing.data.into_iter().map(|m| m.id).collect();
    debug!(count = models.len(), "parsed model listing");
    if models.is_empty() {
        return Err(ProviderError::Parse("empty model listing".into()));
    }
    Ok(models)
}
