// src/languages.rs
// =============================================================================
// Language metadata from linguist's languages.yml.
//
// The document maps each language name to its attributes, e.g.
//
//   Rust:
//     type: programming
//     color: "#dea584"
//     aliases:
//     - rs
//
// Only `color` and `aliases` matter here. The document is fetched once per
// loader and kept for the loader's lifetime; there is no expiry. Concurrent
// first callers share a single fetch (tokio OnceCell), and a failed fetch is
// not cached, so the next call tries again.
// =============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::http::PageFetcher;

/// Attributes of one linguist language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// All languages in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageCatalog {
    entries: Vec<(String, Language)>,
}

impl LanguageCatalog {
    /// Parse a languages.yml document.
    ///
    /// `source` only labels the error.
    pub fn from_yaml(source: &str, yaml: &str) -> Result<Self> {
        // Parse into a Mapping first: unlike a HashMap it keeps document order
        let mapping: serde_yaml::Mapping =
            serde_yaml::from_str(yaml).map_err(|e| Error::decode(source, e))?;

        let mut entries = Vec::with_capacity(mapping.len());
        for (key, value) in mapping {
            // YAML allows non-string keys; languages.yml never uses them
            let name = key
                .as_str()
                .ok_or_else(|| Error::decode(source, "language name is not a string"))?
                .to_string();
            // Unknown attributes (type, extensions, ...) are ignored by serde
            let language: Language = serde_yaml::from_value(value)
                .map_err(|e| Error::decode(source, format!("language {}: {}", name, e)))?;
            entries.push((name, language));
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Language> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, lang)| lang)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Language)> {
        self.entries.iter().map(|(n, lang)| (n.as_str(), lang))
    }

    /// Lowercased name and alias -> colour, skipping colourless languages.
    ///
    /// When two languages claim the same key the later one wins.
    pub fn colors_by_name(&self) -> BTreeMap<String, String> {
        let mut colors = BTreeMap::new();
        for (name, lang) in self.iter() {
            // Prose and data languages usually have no colour
            let Some(color) = &lang.color else { continue };
            colors.insert(name.to_lowercase(), color.clone());
            for alias in &lang.aliases {
                colors.insert(alias.to_lowercase(), color.clone());
            }
        }
        colors
    }

    /// Every canonical name, each followed by its aliases.
    ///
    /// Aliases are listed only for languages that have a colour. This mirrors
    /// the long-standing behaviour of the trending tools and is kept as is.
    pub fn all_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for (name, lang) in self.iter() {
            names.push(name.to_string());

            // Aliases ride along only with coloured languages
            if lang.color.is_some() {
                names.extend(lang.aliases.iter().cloned());
            }
        }
        names
    }
}

/// Fetches the catalog on first use and caches it for its own lifetime.
pub struct LanguageCatalogLoader {
    fetcher: PageFetcher,
    url: String,
    cache: OnceCell<Arc<LanguageCatalog>>,
}

impl LanguageCatalogLoader {
    pub fn new(fetcher: PageFetcher, url: &str) -> Self {
        Self {
            fetcher,
            url: url.to_string(),
            cache: OnceCell::new(),
        }
    }

    /// The catalog, fetched on the first call only.
    ///
    /// Every later call returns the same `Arc`.
    pub async fn load(&self) -> Result<Arc<LanguageCatalog>> {
        // Fast path: already loaded, no locking involved
        if let Some(catalog) = self.cache.get() {
            trace!("language catalog cache hit");
            return Ok(Arc::clone(catalog));
        }

        // OnceCell lets exactly one caller run the init; the others wait
        // for it. If the init fails the cell stays empty.
        let catalog = self
            .cache
            .get_or_try_init(|| async {
                let yaml = self.fetcher.fetch(&self.url).await?;
                let catalog = LanguageCatalog::from_yaml(&self.url, &yaml)?;
                debug!(url = %self.url, languages = catalog.len(), "loaded language catalog");
                Ok::<_, Error>(Arc::new(catalog))
            })
            .await?;
        Ok(Arc::clone(catalog))
    }

    pub async fn colors_by_name(&self) -> Result<BTreeMap<String, String>> {
        Ok(self.load().await?.colors_by_name())
    }

    pub async fn all_names(&self) -> Result<Vec<String>> {
        Ok(self.load().await?.all_names())
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why Arc<LanguageCatalog>?
//    - load() hands out the cached value without cloning the whole catalog
//    - Arc::ptr_eq lets tests check that a second load returned the cache
//
// 2. Why tokio's OnceCell and not std's?
//    - the initializer is async (it fetches over HTTP)
//    - std::sync::OnceLock cannot await inside its init closure
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_LANGUAGES_URL;
    use crate::http::{HttpMethod, MockTransport};

    const YAML: &str = r##"
---
Rust:
  type: programming
  color: "#dea584"
  aliases:
  - rs
  extensions:
  - ".rs"
Text:
  type: prose
  aliases:
  - fundamental
  - plain text
C++:
  type: programming
  color: "#f34b7d"
  aliases:
  - cpp
Go:
  type: programming
  color: "#00ADD8"
  aliases:
  - golang
"##;

    fn loader(transport: &MockTransport) -> LanguageCatalogLoader {
        let fetcher = PageFetcher::new(Arc::new(transport.clone()), true);
        LanguageCatalogLoader::new(fetcher, DEFAULT_LANGUAGES_URL)
    }

    #[test]
    fn test_catalog_keeps_document_order() {
        let catalog = LanguageCatalog::from_yaml("test", YAML).unwrap();
        let names: Vec<&str> = catalog.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Rust", "Text", "C++", "Go"]);
        assert_eq!(catalog.get("Text").unwrap().color, None);
    }

    #[test]
    fn test_colors_by_name_lowercases_and_skips_colourless() {
        let colors = LanguageCatalog::from_yaml("test", YAML).unwrap().colors_by_name();
        assert_eq!(colors.get("rust").map(String::as_str), Some("#dea584"));
        assert_eq!(colors.get("rs").map(String::as_str), Some("#dea584"));
        assert_eq!(colors.get("go").map(String::as_str), Some("#00ADD8"));
        assert_eq!(colors.get("golang").map(String::as_str), Some("#00ADD8"));
        assert_eq!(colors.get("c++").map(String::as_str), Some("#f34b7d"));
        assert!(!colors.contains_key("text"));
        assert!(!colors.contains_key("fundamental"));
        assert_eq!(colors.len(), 6);
    }

    #[test]
    fn test_all_names_lists_aliases_only_for_coloured_languages() {
        let names = LanguageCatalog::from_yaml("test", YAML).unwrap().all_names();
        assert_eq!(
            names,
            vec!["Rust", "rs", "Text", "C++", "cpp", "Go", "golang"]
        );
    }

    #[test]
    fn test_malformed_yaml_is_decode_error() {
        let err = LanguageCatalog::from_yaml("test", "Rust: [unclosed").unwrap_err();
        assert!(matches!(err, Error::Decode { .. }), "{err:?}");

        let err = LanguageCatalog::from_yaml("test", "Rust:\n  aliases: 3\n").unwrap_err();
        assert!(err.to_string().contains("language Rust"), "{err}");
    }

    #[tokio::test]
    async fn test_load_is_memoized() {
        let transport = MockTransport::new();
        transport.respond(HttpMethod::Get, DEFAULT_LANGUAGES_URL, 200, YAML);

        let loader = loader(&transport);
        let first = loader.load().await.unwrap();
        let second = loader.load().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
        assert_eq!(transport.requests().len(), 1);

        // derived views come from the cache too
        assert_eq!(loader.all_names().await.unwrap().len(), 7);
        assert_eq!(loader.colors_by_name().await.unwrap().len(), 6);
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_loads_share_one_fetch() {
        let transport = MockTransport::new();
        transport.respond(HttpMethod::Get, DEFAULT_LANGUAGES_URL, 200, YAML);

        let loader = loader(&transport);
        let (a, b) = tokio::join!(loader.load(), loader.load());
        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let transport = MockTransport::new();
        transport.respond(HttpMethod::Get, DEFAULT_LANGUAGES_URL, 503, "");
        transport.respond(HttpMethod::Get, DEFAULT_LANGUAGES_URL, 200, YAML);

        let loader = loader(&transport);
        assert_eq!(loader.load().await.unwrap_err().status(), Some(503));
        assert_eq!(loader.load().await.unwrap().len(), 4);
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_separate_loaders_have_separate_caches() {
        let transport = MockTransport::new();
        transport.respond(HttpMethod::Get, DEFAULT_LANGUAGES_URL, 200, YAML);
        transport.respond(HttpMethod::Get, DEFAULT_LANGUAGES_URL, 200, YAML);

        let a = loader(&transport).load().await.unwrap();
        let b = loader(&transport).load().await.unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(transport.requests().len(), 2);
    }
}
