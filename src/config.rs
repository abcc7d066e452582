// src/config.rs
// =============================================================================
// Constructor-level configuration shared by the scraper and the client.
//
// There is no config file: the CLI fills this struct from flags and
// environment variables, library users build it in code.
// =============================================================================

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://github.com";
pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_LANGUAGES_URL: &str =
    "https://raw.githubusercontent.com/github/linguist/master/lib/linguist/languages.yml";
pub const DEFAULT_USER_AGENT: &str = concat!("gh-trending/", env!("CARGO_PKG_VERSION"));

// Same fan-out width link-guardian used for its link checks
pub const DEFAULT_MAX_CONCURRENCY: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScraperConfig {
    /// Upstream proxy every request is routed through
    pub proxy: Option<String>,
    /// Ask for gzip/deflate on page fetches and decode it ourselves
    pub use_compression: bool,
    /// Token sent as `Authorization: token <value>` to the REST API
    pub token: Option<String>,
    pub user_agent: String,
    /// Web host serving /trending and the README blobs
    pub base_url: String,
    pub api_url: String,
    pub languages_url: String,
    /// Upper bound on in-flight requests per fan-out
    pub max_concurrency: usize,
    /// Per-request timeout enforced by the transport; `None` keeps reqwest's
    /// default of no timeout
    pub timeout: Option<Duration>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            use_compression: true,
            token: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            languages_url: DEFAULT_LANGUAGES_URL.to_string(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            timeout: None,
        }
    }
}

impl ScraperConfig {
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.use_compression = enabled;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_languages_url(mut self, url: impl Into<String>) -> Self {
        self.languages_url = url.into();
        self
    }

    /// Zero is treated as one so fan-outs always make progress
    pub fn with_max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = n.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
