// src/lib.rs
// =============================================================================
// gh_trending: GitHub trending repositories as data.
//
// Layers, bottom up:
// - http: transport trait (reqwest or mock) and the text page fetcher
// - scrape: trending page HTML -> slugs / full scraped records
// - languages: linguist languages.yml, fetched once per loader
// - github: REST API repository details and the README probe
// - client: the aggregator that combines all of the above per language
//
// Quick start:
//
//   let client = Client::new(&ScraperConfig::default())?;
//   let repos = client.trendings(&["rust", "go"]).await?;
// =============================================================================

mod client;
mod config;
mod error;
mod github;
mod http;
mod languages;
mod scrape;

pub use client::{Client, LangsRepositories};
pub use config::{
    ScraperConfig, DEFAULT_API_URL, DEFAULT_BASE_URL, DEFAULT_LANGUAGES_URL,
    DEFAULT_MAX_CONCURRENCY, DEFAULT_USER_AGENT,
};
pub use error::{Error, Result};
pub use github::{DetailClient, ReadmeProbe, Repository, ACCEPT_V3, README_URL_KEY};
pub use http::{
    header_get, HttpHeaders, HttpMethod, HttpRequest, HttpResponse, HttpTransport, PageFetcher,
    ReqwestTransport,
};
pub use languages::{Language, LanguageCatalog, LanguageCatalogLoader};
pub use scrape::{
    parse_background_color, parse_full_records, parse_slugs, RepositorySlug,
    ScrapedRepositoryRecord, Scraper,
};
