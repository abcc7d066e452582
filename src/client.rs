// src/client.rs
// =============================================================================
// The aggregator: trending slugs -> API records -> README-enriched records,
// for one language or many.
//
// Fan-out strategy:
// - per repository (details, README probes): a stream of futures driven with
//   .buffered(max_concurrency). Unlike buffer_unordered, buffered yields
//   results in input order, so the output matches the trending page order.
// - per language: try_join_all over the single-language call; the first
//   failure fails the whole request, there are no partial results.
//
// Nothing is retried. The only timeout is the optional per-request one the
// transport applies (ScraperConfig::timeout).
// =============================================================================

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::try_join_all;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{debug, info};

use crate::config::ScraperConfig;
use crate::error::Result;
use crate::github::{DetailClient, ReadmeProbe, Repository};
use crate::http::{HttpTransport, ReqwestTransport};
use crate::scrape::{RepositorySlug, ScrapedRepositoryRecord, Scraper};

/// Results per requested language, in the order the languages were given.
///
/// Serializes as a JSON object whose keys keep that order.
#[derive(Debug, Clone, PartialEq)]
pub struct LangsRepositories<T> {
    entries: Vec<(String, Vec<T>)>,
}

impl<T> LangsRepositories<T> {
    pub fn get(&self, lang: &str) -> Option<&[T]> {
        self.entries
            .iter()
            .find(|(l, _)| l == lang)
            .map(|(_, repos)| repos.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[T])> {
        self.entries
            .iter()
            .map(|(l, repos)| (l.as_str(), repos.as_slice()))
    }
}

impl<T: Serialize> Serialize for LangsRepositories<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (lang, repos) in &self.entries {
            map.serialize_entry(lang, repos)?;
        }
        map.end()
    }
}

/// Trending repositories, optionally enriched through the REST API.
#[derive(Clone)]
pub struct Client {
    scraper: Scraper,
    details: DetailClient,
    readme: ReadmeProbe,
    max_concurrency: usize,
}

impl Client {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(config)?);
        Ok(Self::with_transport(config, transport))
    }

    pub fn with_transport(config: &ScraperConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            scraper: Scraper::with_transport(config, Arc::clone(&transport)),
            details: DetailClient::new(config, Arc::clone(&transport)),
            readme: ReadmeProbe::new(transport),
            max_concurrency: config.max_concurrency.max(1),
        }
    }

    /// The scraper (and through it the language catalog) this client uses.
    pub fn scraper(&self) -> &Scraper {
        &self.scraper
    }

    /// Slugs from the trending page; no API calls.
    pub async fn trending_slugs(&self, lang: &str) -> Result<Vec<RepositorySlug>> {
        self.scraper.trending_slugs(lang).await
    }

    /// Scraped records from the trending page; no API calls.
    pub async fn trending_full(&self, lang: &str) -> Result<Vec<ScrapedRepositoryRecord>> {
        self.scraper.trending_full(lang).await
    }

    /// Full API record for every trending repository, in page order.
    pub async fn trending(&self, lang: &str) -> Result<Vec<Repository>> {
        let slugs = self.scraper.trending_slugs(lang).await?;
        debug!(lang, repositories = slugs.len(), "fetching repository details");

        let details = &self.details;
        stream::iter(slugs)
            .map(|slug| async move { details.get_repository(&slug).await })
            .buffered(self.max_concurrency)
            .try_collect()
            .await
    }

    /// Like `trending`, with `readme_url` added wherever a README exists.
    pub async fn trending_with_readme(&self, lang: &str) -> Result<Vec<Repository>> {
        let repos = self.trending(lang).await?;

        let readme = &self.readme;
        let repos: Vec<Repository> = stream::iter(repos)
            .map(|repo| readme.with_readme(repo))
            .buffered(self.max_concurrency)
            .collect()
            .await;
        Ok(repos)
    }

    pub async fn trendings_slugs(
        &self,
        langs: &[impl AsRef<str>],
    ) -> Result<LangsRepositories<RepositorySlug>> {
        self.per_language(langs, |lang| self.trending_slugs(lang)).await
    }

    pub async fn trendings(&self, langs: &[impl AsRef<str>]) -> Result<LangsRepositories<Repository>> {
        self.per_language(langs, |lang| self.trending(lang)).await
    }

    pub async fn trendings_with_readme(
        &self,
        langs: &[impl AsRef<str>],
    ) -> Result<LangsRepositories<Repository>> {
        self.per_language(langs, |lang| self.trending_with_readme(lang))
            .await
    }

    // Run `fetch` for every language concurrently and key the results by the
    // caller's strings. A language listed twice is fetched once per listing
    // but keeps only its first slot in the result.
    async fn per_language<'a, L, T, F, Fut>(
        &'a self,
        langs: &'a [L],
        fetch: F,
    ) -> Result<LangsRepositories<T>>
    where
        L: AsRef<str>,
        F: Fn(&'a str) -> Fut,
        Fut: std::future::Future<Output = Result<Vec<T>>>,
    {
        info!(languages = langs.len(), "fetching trending repositories");
        let results = try_join_all(langs.iter().map(|lang| fetch(lang.as_ref()))).await?;

        let mut seen = HashSet::new();
        let entries = langs
            .iter()
            .map(|lang| lang.as_ref().to_string())
            .zip(results)
            .filter(|(lang, _)| seen.insert(lang.clone()))
            .collect();
        Ok(LangsRepositories { entries })
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. buffered vs buffer_unordered
//    - Both keep at most N futures in flight
//    - buffer_unordered yields whichever finishes first
//    - buffered yields in the order the futures were created, holding back
//      finished results until the earlier ones are done
//
// 2. try_collect / try_join_all
//    - Stop at the first Err and return it
//    - Futures still in flight are dropped, which cancels their requests
// -----------------------------------------------------------------------------
