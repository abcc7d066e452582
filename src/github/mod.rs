// src/github/mod.rs
// =============================================================================
// Talking to GitHub beyond the trending page.
//
// - api: repository metadata from the REST API (DetailClient)
// - readme: HEAD probe that adds "readme_url" to an API record
// =============================================================================

mod api;
mod readme;

pub use api::{DetailClient, Repository, ACCEPT_V3};
pub use readme::{ReadmeProbe, README_URL_KEY};
