// src/main.rs
// =============================================================================
// Entry point of the gh-trending CLI.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up tracing (stderr, RUST_LOG or --verbose)
// 3. Build the library Client from the flags and dispatch the subcommand
// 4. Print a table or JSON, exit 0 on success and 2 on error
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use gh_trending::{Client, RepositorySlug, Repository, ScrapedRepositoryRecord};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so --json output on stdout stays machine readable
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "gh_trending=debug"
    } else {
        "gh_trending=info"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let client = Client::new(&cli.config()).context("could not set up the HTTP client")?;

    match cli.command {
        Commands::Repos { lang, full, json } => {
            let lang = lang.unwrap_or_default();
            if full {
                let records = client
                    .trending_full(&lang)
                    .await
                    .with_context(|| format!("scraping trending page for '{}'", lang))?;
                output(&records, json, print_records)
            } else {
                let slugs = client
                    .trending_slugs(&lang)
                    .await
                    .with_context(|| format!("scraping trending page for '{}'", lang))?;
                output(&slugs, json, print_slugs)
            }
        }
        Commands::Trending {
            langs, readme, json, ..
        } => {
            let result = if readme {
                client.trendings_with_readme(&langs).await
            } else {
                client.trendings(&langs).await
            }
            .context("fetching trending repositories")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                for (lang, repos) in result.iter() {
                    println!("== {} ({} repositories)", lang, repos.len());
                    print_api_repos(repos);
                    println!();
                }
            }
            Ok(())
        }
        Commands::Languages { colors, json } => {
            let languages = client.scraper().languages();
            if colors {
                let colors = languages
                    .colors_by_name()
                    .await
                    .context("loading language catalog")?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&colors)?);
                } else {
                    for (name, color) in &colors {
                        println!("{:<40} {}", name, color);
                    }
                }
            } else {
                let names = languages
                    .all_names()
                    .await
                    .context("loading language catalog")?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&names)?);
                } else {
                    names.iter().for_each(|name| println!("{}", name));
                }
            }
            Ok(())
        }
    }
}

fn output<T: Serialize>(items: &[T], json: bool, table: fn(&[T])) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
    } else {
        table(items);
    }
    Ok(())
}

fn print_slugs(slugs: &[RepositorySlug]) {
    for slug in slugs {
        println!("{}", slug);
    }
}

fn print_records(records: &[ScrapedRepositoryRecord]) {
    println!(
        "{:<4} {:<45} {:<15} {:>9} {:>8} {:>7}",
        "#", "REPOSITORY", "LANGUAGE", "STARS", "FORKS", "TODAY"
    );
    println!("{}", "=".repeat(93));

    for record in records {
        println!(
            "{:<4} {:<45} {:<15} {:>9} {:>8} {:>7}",
            record.index,
            truncate(&record.slug().to_string(), 45),
            truncate(record.language.as_deref().unwrap_or("-"), 15),
            count(record.all_stars),
            count(record.forks),
            count(record.todays_stars),
        );
    }
}

fn print_api_repos(repos: &[Repository]) {
    println!("{:<45} {:>9} {:<60}", "REPOSITORY", "STARS", "README");
    println!("{}", "=".repeat(116));

    for repo in repos {
        let name = repo
            .get("full_name")
            .and_then(|v| v.as_str())
            .unwrap_or("?");
        let stars = repo.get("stargazers_count").and_then(|v| v.as_u64());
        let readme = repo
            .get(gh_trending::README_URL_KEY)
            .and_then(|v| v.as_str())
            .unwrap_or("");
        println!("{:<45} {:>9} {:<60}", truncate(name, 45), count(stars), readme);
    }
}

fn count(n: Option<u64>) -> String {
    n.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string())
}

// Truncate long cells so the table stays aligned
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let cut: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        s.to_string()
    }
}
