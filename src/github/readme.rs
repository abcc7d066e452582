// src/github/readme.rs
// =============================================================================
// README probe.
//
// For an API record we HEAD {html_url}/blob/{default_branch}/README.md (a
// HEAD request downloads no body). If it answers 2xx the URL is recorded
// under "readme_url".
//
// This is the one place where failures are swallowed: a missing field, a
// dead connection or a 404 all just leave the record as it was.
// =============================================================================

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::api::Repository;
use crate::http::{HttpRequest, HttpTransport};

pub const README_URL_KEY: &str = "readme_url";

#[derive(Clone)]
pub struct ReadmeProbe {
    transport: Arc<dyn HttpTransport>,
}

impl ReadmeProbe {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// `repo` with `readme_url` added when the README exists.
    pub async fn with_readme(&self, mut repo: Repository) -> Repository {
        let Some(url) = readme_url(&repo) else {
            debug!("record lacks html_url or default_branch; skipping README probe");
            return repo;
        };

        match self.transport.send(HttpRequest::head(&url)).await {
            Ok(response) if response.is_success() => {
                repo.insert(README_URL_KEY.to_string(), Value::String(url));
            }
            Ok(response) => {
                debug!(%url, status = response.status, "no README found");
            }
            Err(e) => {
                debug!(%url, error = %e, "README probe failed");
            }
        }
        repo
    }
}

fn readme_url(repo: &Repository) -> Option<String> {
    let html_url = repo.get("html_url")?.as_str()?;
    let branch = repo.get("default_branch")?.as_str()?;
    Some(format!("{}/blob/{}/README.md", html_url, branch))
}
