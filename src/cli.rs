// src/cli.rs
// =============================================================================
// Command-line interface, defined with clap's derive API.
//
// Global options map one-to-one onto ScraperConfig; each subcommand maps
// onto one family of library calls.
// =============================================================================

use std::time::Duration;

use clap::{Parser, Subcommand};

use gh_trending::ScraperConfig;

#[derive(Parser, Debug)]
#[command(
    name = "gh-trending",
    version,
    about = "Show GitHub trending repositories and language metadata",
    long_about = "gh-trending scrapes github.com/trending, optionally enriches every entry \
                  through the GitHub REST API, and prints a table or JSON."
)]
pub struct Cli {
    /// Route every request through this proxy (e.g. http://127.0.0.1:3128)
    #[arg(long, global = true, env = "HTTPS_PROXY")]
    pub proxy: Option<String>,

    /// Do not ask the server for gzip/deflate compressed pages
    #[arg(long, global = true)]
    pub no_compression: bool,

    /// Give up on any single request after this many seconds
    #[arg(long, global = true, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Log debug output to stderr (RUST_LOG overrides this)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scrape the trending page only (no API calls)
    ///
    /// Example: gh-trending repos rust --full
    Repos {
        /// Language to filter by; omit for all languages
        lang: Option<String>,

        /// Include description, language, stars and forks
        #[arg(long)]
        full: bool,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Fetch full API records for trending repositories, per language
    ///
    /// Example: gh-trending trending go rust --readme --json
    Trending {
        /// Languages to fetch (default: all)
        #[arg(default_value = "all")]
        langs: Vec<String>,

        /// Probe each repository for a README.md and add readme_url
        #[arg(long)]
        readme: bool,

        /// GitHub token for the REST API
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List the languages GitHub knows about (from linguist)
    Languages {
        /// Show the name -> colour map instead of plain names
        #[arg(long)]
        colors: bool,

        /// Output JSON instead of plain text
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// The library configuration these flags describe.
    pub fn config(&self) -> ScraperConfig {
        let mut config = ScraperConfig::default().with_compression(!self.no_compression);
        if let Some(proxy) = &self.proxy {
            config = config.with_proxy(proxy.clone());
        }
        if let Some(secs) = self.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Commands::Trending {
            token: Some(token), ..
        } = &self.command
        {
            config = config.with_token(token.clone());
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trending_defaults_to_all_languages() {
        let cli = Cli::try_parse_from(["gh-trending", "trending", "--token", "t"]).unwrap();
        match &cli.command {
            Commands::Trending { langs, readme, .. } => {
                assert_eq!(langs, &vec!["all".to_string()]);
                assert!(!readme);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.config().token.as_deref(), Some("t"));
        assert!(cli.config().timeout.is_none());
    }

    #[test]
    fn test_global_flags_build_config() {
        let cli = Cli::try_parse_from([
            "gh-trending",
            "repos",
            "rust",
            "--full",
            "--no-compression",
            "--proxy",
            "http://proxy.local:8080",
            "--timeout",
            "15",
        ])
        .unwrap();
        let config = cli.config();
        assert_eq!(config.timeout, Some(Duration::from_secs(15)));
        assert!(!config.use_compression);
        assert_eq!(config.proxy.as_deref(), Some("http://proxy.local:8080"));
        assert!(matches!(
            cli.command,
            Commands::Repos { full: true, json: false, .. }
        ));
    }
}
