// src/github/api.rs
// =============================================================================
// Repository metadata from the GitHub REST API.
//
// GET {api_url}/repos/{owner}/{name} returns a large JSON object. We do not
// model it: it is passed through as a serde_json map so callers see every
// field GitHub sends, today and tomorrow.
//
// Headers:
//   User-Agent     required by the API, configurable
//   Accept         application/vnd.github.v3+json
//   Authorization  "token <value>", only when a token was configured
//
// Failures stay distinct: a non-2xx status is Error::Http, a body that is
// not a JSON object is Error::Decode.
// =============================================================================

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::config::ScraperConfig;
use crate::error::{Error, Result};
use crate::http::{HttpRequest, HttpTransport};
use crate::scrape::RepositorySlug;

pub const ACCEPT_V3: &str = "application/vnd.github.v3+json";

/// A repository as returned by the REST API, field for field.
pub type Repository = Map<String, Value>;

/// Thin client for the repository-by-slug endpoint.
#[derive(Clone)]
pub struct DetailClient {
    transport: Arc<dyn HttpTransport>,
    api_url: String,
    user_agent: String,
    token: Option<String>,
}

impl DetailClient {
    pub fn new(config: &ScraperConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            api_url: config.api_url.clone(),
            user_agent: config.user_agent.clone(),
            token: config.token.clone(),
        }
    }

    pub fn repository_url(&self, slug: &RepositorySlug) -> String {
        format!("{}/repos/{}/{}", self.api_url, slug.owner, slug.name)
    }

    /// Fetch the full API record for `slug`.
    pub async fn get_repository(&self, slug: &RepositorySlug) -> Result<Repository> {
        let url = self.repository_url(slug);

        let mut request = HttpRequest::get(&url)
            .header("User-Agent", &self.user_agent)
            .header("Accept", ACCEPT_V3);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("token {}", token));
        }

        let response = self.transport.send(request).await?;
        debug!(%slug, status = response.status, "fetched repository details");

        if !response.is_success() {
            return Err(Error::Http {
                url,
                status: response.status,
            });
        }

        // The API occasionally sends truncated JSON; that must not look like
        // a transport problem
        match serde_json::from_slice::<Value>(&response.body) {
            Ok(Value::Object(repo)) => Ok(repo),
            Ok(other) => Err(Error::decode(
                &url,
                format!("expected a JSON object, got {}", json_kind(&other)),
            )),
            Err(e) => Err(Error::decode(&url, e)),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
