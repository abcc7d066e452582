// src/scrape/mod.rs
// =============================================================================
// Scraping the trending page.
//
// Submodules:
// - slug: RepositorySlug and the "/owner/name" link pattern
// - listing: HTML -> slugs or full ScrapedRepositoryRecords
//
// This file holds Scraper, which ties the page fetcher to the listing parser
// and owns the (cached) language catalog loader.
// =============================================================================

mod listing;
mod slug;

use std::sync::Arc;

use url::Url;

pub use listing::{
    parse_background_color, parse_full_records, parse_slugs, ScrapedRepositoryRecord,
};
pub use slug::RepositorySlug;

use crate::config::ScraperConfig;
use crate::error::{Error, Result};
use crate::http::{HttpTransport, PageFetcher, ReqwestTransport};
use crate::languages::LanguageCatalogLoader;

/// Fetches and parses github.com/trending.
#[derive(Clone)]
pub struct Scraper {
    fetcher: PageFetcher,
    base_url: String,
    languages: Arc<LanguageCatalogLoader>,
}

impl Scraper {
    /// Scraper talking to the network through reqwest.
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(config)?);
        Ok(Self::with_transport(config, transport))
    }

    /// Scraper over any transport (tests use an in-memory one).
    pub fn with_transport(config: &ScraperConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let fetcher = PageFetcher::new(transport, config.use_compression);
        let languages = LanguageCatalogLoader::new(fetcher.clone(), &config.languages_url);
        Self {
            fetcher,
            base_url: config.base_url.clone(),
            languages: Arc::new(languages),
        }
    }

    /// The language catalog loader owned by this scraper.
    ///
    /// Clones of a Scraper share one loader and therefore one cache.
    pub fn languages(&self) -> &LanguageCatalogLoader {
        &self.languages
    }

    /// The trending page URL for `lang`; an empty key means all languages.
    pub fn trending_url(&self, lang: &str) -> Result<String> {
        let mut url = Url::parse(&format!("{}/trending", self.base_url))
            .map_err(|e| Error::Config(format!("invalid base URL {}: {}", self.base_url, e)))?;
        if !lang.is_empty() {
            url.query_pairs_mut().append_pair("l", lang);
        }
        Ok(url.into())
    }

    /// Raw HTML of the trending page for `lang`.
    pub async fn fetch_trend_page(&self, lang: &str) -> Result<String> {
        let url = self.trending_url(lang)?;
        self.fetcher.fetch(&url).await
    }

    /// Owner/name of every trending repository, in page order.
    pub async fn trending_slugs(&self, lang: &str) -> Result<Vec<RepositorySlug>> {
        let html = self.fetch_trend_page(lang).await?;
        Ok(parse_slugs(&html))
    }

    /// Full scraped records (description, language, stars, forks).
    pub async fn trending_full(&self, lang: &str) -> Result<Vec<ScrapedRepositoryRecord>> {
        let html = self.fetch_trend_page(lang).await?;
        Ok(parse_full_records(&html))
    }
}
