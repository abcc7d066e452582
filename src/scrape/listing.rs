// src/scrape/listing.rs
// =============================================================================
// Turns the trending page HTML into repository records.
//
// The page is a list of repository entries. Two generations of markup are
// understood:
// - legacy:  <ol class="repo-list"><li> ... <h3><a href="/o/n"> ...
// - current: <article class="Box-row"> ... <h2><a href="/o/n"> ...
//
// Every field is optional and extracted on its own: a missing element only
// empties that field. The one thing an entry cannot do without is its link.
// Entries whose link is missing or is not "/owner/name" are skipped with a
// warning, in both the slug and the full-record mode, and `index` counts
// only the entries that were kept.
// =============================================================================

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::slug::RepositorySlug;

// Selectors are constants, so failing to parse one is a programmer error
fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid CSS selector")
}

static ITEM: LazyLock<Selector> = LazyLock::new(|| selector(".repo-list li, article.Box-row"));
static LINK: LazyLock<Selector> = LazyLock::new(|| selector("h1 a[href], h2 a[href], h3 a[href]"));
static DESCRIPTION: LazyLock<Selector> = LazyLock::new(|| selector("p"));
static LANGUAGE: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"[itemprop="programmingLanguage"]"#));
static LANG_COLOR: LazyLock<Selector> = LazyLock::new(|| selector(".repo-language-color"));
static COUNTS: LazyLock<Selector> = LazyLock::new(|| {
    selector(".muted-link.d-inline-block.mr-3, .Link--muted.d-inline-block.mr-3")
});
static TODAYS_STARS: LazyLock<Selector> = LazyLock::new(|| {
    selector(".f6.text-gray.mt-2 > span:last-child, .f6.color-fg-muted.mt-2 > span:last-child")
});

static RE_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));
static RE_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#(?:[0-9A-Fa-f]{6}|[0-9A-Fa-f]{3})$").expect("valid regex")
});

const BACKGROUND_COLOR: &str = "background-color";

/// One entry of the trending page with everything the markup tells us.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedRepositoryRecord {
    /// Position among the records returned by one parse, starting at 0
    pub index: usize,
    pub owner: String,
    pub name: String,
    pub description: Option<String>,
    /// Display name, e.g. "Rust"
    pub language: Option<String>,
    /// "#rgb" or "#rrggbb"
    pub lang_color: Option<String>,
    pub all_stars: Option<u64>,
    pub todays_stars: Option<u64>,
    pub forks: Option<u64>,
}

impl ScrapedRepositoryRecord {
    pub fn slug(&self) -> RepositorySlug {
        RepositorySlug::new(&self.owner, &self.name)
    }
}

/// Extract just the owner/name of every entry, in page order.
pub fn parse_slugs(html: &str) -> Vec<RepositorySlug> {
    let document = Html::parse_document(html);

    // The element itself is not needed in this mode, only its slug
    entries(&document).map(|(_, slug)| slug).collect()
}

/// Extract full records for every entry, in page order.
pub fn parse_full_records(html: &str) -> Vec<ScrapedRepositoryRecord> {
    let document = Html::parse_document(html);
    entries(&document)
        .enumerate()
        // enumerate() runs after invalid entries were dropped, so indices
        // have no gaps
        .map(|(index, (item, slug))| {
            // Stars come first, forks second; either may be missing
            let counts: Vec<ElementRef> = item.select(&COUNTS).collect();

            ScrapedRepositoryRecord {
                index,
                owner: slug.owner,
                name: slug.name,
                description: item.select(&DESCRIPTION).next().and_then(leading_text),
                language: item.select(&LANGUAGE).next().and_then(leading_text),
                lang_color: item
                    .select(&LANG_COLOR)
                    .next()
                    .and_then(|el| el.value().attr("style"))
                    .and_then(parse_background_color),
                all_stars: counts.first().copied().and_then(count_value),
                forks: counts.get(1).copied().and_then(count_value),
                todays_stars: item
                    .select(&TODAYS_STARS)
                    .next()
                    .and_then(|el| first_number(&el.text().collect::<String>())),
            }
        })
        .collect()
}

// Every list entry whose primary link is a valid slug; the rest are logged
// and dropped here so both parse modes share one skip policy.
fn entries(document: &Html) -> impl Iterator<Item = (ElementRef<'_>, RepositorySlug)> {
    document.select(&ITEM).filter_map(|item| {
        // The first heading link is the repository; the "Star" button and
        // sponsor links sit outside the heading
        let Some(href) = item
            .select(&LINK)
            .next()
            .and_then(|a| a.value().attr("href"))
        else {
            warn!("skipping trending entry without a repository link");
            return None;
        };

        // Links such as /sponsors/explore/x are not repositories
        match RepositorySlug::from_href(href) {
            Some(slug) => Some((item, slug)),
            None => {
                warn!(href, "skipping trending entry with invalid repository link");
                None
            }
        }
    })
}

// First non-blank text node directly under `el`, trimmed
fn leading_text(el: ElementRef<'_>) -> Option<String> {
    // Only direct text children: nested elements (emoji, links) are skipped
    el.children()
        .filter_map(|node| node.value().as_text())
        .map(|text| text.trim())
        .find(|text| !text.is_empty())
        .map(str::to_string)
}

// Star and fork links look like <a><svg/> 1,234 </a>: the count is the last
// text node (the third child in the legacy markup)
fn count_value(el: ElementRef<'_>) -> Option<u64> {
    let text = el
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|text| text.trim())
        .filter(|text| !text.is_empty())
        .last()?;

    // "12,345" -> 12345; anything non-numeric (e.g. "1.2k") is None
    text.replace(',', "").parse().ok()
}

// "1,234 stars today" -> 1234
fn first_number(text: &str) -> Option<u64> {
    // Drop thousands separators first so "1,234" is one digit run
    let text = text.replace(',', "");
    RE_DIGITS.find(&text)?.as_str().parse().ok()
}

/// Pull the colour out of an inline style such as `background-color:#dea584;`.
///
/// Only well-formed hex colours are accepted; anything else is `None`.
pub fn parse_background_color(style: &str) -> Option<String> {
    // Look at whole declarations only, so "--background-color" or
    // "my-background-color" never match
    let value = style.split(';').find_map(|declaration| {
        let (property, value) = declaration.split_once(':')?;
        property
            .trim()
            .eq_ignore_ascii_case(BACKGROUND_COLOR)
            .then(|| value.trim())
    })?;

    // "red", "rgb(...)" and half-typed hex values are all rejected
    RE_COLOR.is_match(value).then(|| value.to_string())
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why LazyLock statics for selectors?
//    - Selector::parse does real work (it compiles the CSS)
//    - parsing once per process instead of once per page keeps it cheap
//
// 2. Why Option everywhere?
//    - GitHub changes this markup without notice
//    - a field we can't find is None, the rest of the record still parses
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // Shape of the page when the listing was an <ol class="repo-list">
    const LEGACY_PAGE: &str = r##"
<html><body>
<ol class="repo-list">
  <li class="col-12 d-block width-full py-4 border-bottom" id="pa-deno">
    <div class="d-inline-block col-9 mb-1">
      <h3><a href="/denoland/deno"><span class="text-normal">denoland / </span>deno</a></h3>
    </div>
    <div class="py-1">
      <p class="col-9 d-inline-block text-gray m-0 pr-4">
        A secure JavaScript and TypeScript runtime
      </p>
    </div>
    <div class="f6 text-gray mt-2">
      <span class="d-inline-block mr-3">
        <span class="repo-language-color ml-0" style="background-color:#2b7489;"></span>
        <span itemprop="programmingLanguage">TypeScript</span>
      </span>
      <a class="muted-link d-inline-block mr-3" href="/denoland/deno/stargazers">
        <svg class="octicon octicon-star"></svg>
        12,345
      </a>
      <a class="muted-link d-inline-block mr-3" href="/denoland/deno/network">
        <svg class="octicon octicon-repo-forked"></svg>
        678
      </a>
      <span class="d-inline-block mr-3">Built by</span>
      <span class="d-inline-block float-sm-right">
        <svg class="octicon octicon-star"></svg>
        1,024 stars today
      </span>
    </div>
  </li>
  <li class="col-12 d-block width-full py-4 border-bottom">
    <div class="d-inline-block col-9 mb-1">
      <h3><a href="/sponsors/explore/awesome">not a repository</a></h3>
    </div>
  </li>
  <li class="col-12 d-block width-full py-4 border-bottom" id="pa-bare">
    <div class="d-inline-block col-9 mb-1">
      <h3><a href="/someone/bare">someone / bare</a></h3>
    </div>
    <div class="f6 text-gray mt-2">
      <span class="d-inline-block mr-3">
        <span class="repo-language-color ml-0" style="color: red"></span>
      </span>
    </div>
  </li>
</ol>
</body></html>
"##;

    // Shape of the page with <article class="Box-row"> entries
    const CURRENT_PAGE: &str = r##"
<html><body>
<div data-hpc>
  <article class="Box-row">
    <div class="float-right d-flex">
      <a href="/login?return_to=%2Frust-lang%2Frust" class="btn btn-sm">Star</a>
    </div>
    <h2 class="h3 lh-condensed">
      <a href="/rust-lang/rust" data-view-component="true" class="Link">
        <span class="text-normal">rust-lang /</span>
        rust
      </a>
    </h2>
    <p class="col-9 color-fg-muted my-1 pr-4">
      Empowering everyone to build reliable and efficient software.
    </p>
    <div class="f6 color-fg-muted mt-2">
      <span class="d-inline-block ml-0 mr-3">
        <span class="repo-language-color" style="background-color: #dea584"></span>
        <span itemprop="programmingLanguage">Rust</span>
      </span>
      <a href="/rust-lang/rust/stargazers" class="Link Link--muted d-inline-block mr-3">
        <svg aria-label="star" class="octicon octicon-star"></svg>
        101,202
      </a>
      <a href="/rust-lang/rust/forks" class="Link Link--muted d-inline-block mr-3">
        <svg aria-label="fork" class="octicon octicon-repo-forked"></svg>
        13,001
      </a>
      <span class="d-inline-block float-sm-right">
        <svg aria-hidden="true" class="octicon octicon-star"></svg>
        87 stars today
      </span>
    </div>
  </article>
  <article class="Box-row">
    <h2 class="h3 lh-condensed">
      <a href="/tiny/c0de" class="Link">tiny / c0de</a>
    </h2>
    <p class="col-9 color-fg-muted my-1 pr-4">   </p>
    <div class="f6 color-fg-muted mt-2">
      <span class="d-inline-block ml-0 mr-3">
        <span class="repo-language-color" style="background-color:#fff;"></span>
        <span itemprop="programmingLanguage">  C  </span>
      </span>
      <a href="/tiny/c0de/stargazers" class="Link Link--muted d-inline-block mr-3">
        <svg class="octicon octicon-star"></svg>
        9
      </a>
      <span class="d-inline-block float-sm-right">
        <svg class="octicon octicon-star"></svg>
        no stars yet
      </span>
    </div>
  </article>
</div>
</body></html>
"##;

    #[test]
    fn test_legacy_full_record() {
        let records = parse_full_records(LEGACY_PAGE);
        assert_eq!(records.len(), 2);

        let deno = &records[0];
        assert_eq!(deno.index, 0);
        assert_eq!(deno.owner, "denoland");
        assert_eq!(deno.name, "deno");
        assert_eq!(
            deno.description.as_deref(),
            Some("A secure JavaScript and TypeScript runtime")
        );
        assert_eq!(deno.language.as_deref(), Some("TypeScript"));
        assert_eq!(deno.lang_color.as_deref(), Some("#2b7489"));
        assert_eq!(deno.all_stars, Some(12_345));
        assert_eq!(deno.forks, Some(678));
        assert_eq!(deno.todays_stars, Some(1_024));
    }

    #[test]
    fn test_missing_fields_degrade_to_none() {
        let records = parse_full_records(LEGACY_PAGE);
        let bare = &records[1];
        assert_eq!(bare.index, 1);
        assert_eq!(bare.slug(), RepositorySlug::new("someone", "bare"));
        assert_eq!(bare.description, None);
        assert_eq!(bare.language, None);
        assert_eq!(bare.lang_color, None);
        assert_eq!(bare.all_stars, None);
        assert_eq!(bare.forks, None);
        assert_eq!(bare.todays_stars, None);
    }

    #[test]
    fn test_current_markup_full_records() {
        let records = parse_full_records(CURRENT_PAGE);
        assert_eq!(records.len(), 2);

        let rust = &records[0];
        assert_eq!(rust.slug().to_string(), "rust-lang/rust");
        assert_eq!(
            rust.description.as_deref(),
            Some("Empowering everyone to build reliable and efficient software.")
        );
        assert_eq!(rust.language.as_deref(), Some("Rust"));
        assert_eq!(rust.lang_color.as_deref(), Some("#dea584"));
        assert_eq!(rust.all_stars, Some(101_202));
        assert_eq!(rust.forks, Some(13_001));
        assert_eq!(rust.todays_stars, Some(87));

        let tiny = &records[1];
        assert_eq!(tiny.description, None);
        assert_eq!(tiny.language.as_deref(), Some("C"));
        assert_eq!(tiny.lang_color.as_deref(), Some("#fff"));
        assert_eq!(tiny.all_stars, Some(9));
        // only one count link: forks must not borrow the star count
        assert_eq!(tiny.forks, None);
        assert_eq!(tiny.todays_stars, None);
    }

    #[test]
    fn test_indices_are_contiguous_and_colors_well_formed() {
        for page in [LEGACY_PAGE, CURRENT_PAGE] {
            let records = parse_full_records(page);
            for (i, record) in records.iter().enumerate() {
                assert_eq!(record.index, i);
                if let Some(color) = &record.lang_color {
                    assert!(RE_COLOR.is_match(color), "{color}");
                }
            }
        }
    }

    #[test]
    fn test_slugs_follow_the_same_skip_policy() {
        let slugs = parse_slugs(LEGACY_PAGE);
        assert_eq!(
            slugs,
            vec![
                RepositorySlug::new("denoland", "deno"),
                RepositorySlug::new("someone", "bare"),
            ]
        );

        let full: Vec<_> = parse_full_records(LEGACY_PAGE)
            .iter()
            .map(ScrapedRepositoryRecord::slug)
            .collect();
        assert_eq!(slugs, full);
    }

    #[test]
    fn test_page_without_listing_is_empty() {
        assert!(parse_slugs("<html><body><p>Nothing here</p></body></html>").is_empty());
        assert!(parse_full_records("").is_empty());
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = &parse_full_records(CURRENT_PAGE)[0];
        let json = serde_json::to_value(record).unwrap();
        assert_eq!(json["langColor"], "#dea584");
        assert_eq!(json["allStars"], 101_202);
        assert_eq!(json["todaysStars"], 87);
        assert_eq!(json["index"], 0);
    }

    #[rstest]
    #[case("background-color:#dea584;", Some("#dea584"))]
    #[case("background-color: #ABC", Some("#ABC"))]
    #[case("width: 3px; background-color:#123456; height: 3px", Some("#123456"))]
    #[case("background-color:#12345;", None)]
    #[case("background-color:red;", None)]
    #[case("background-color:;", None)]
    #[case("color:#fff", None)]
    #[case("--background-color:#fff;", None)]
    #[case("my-background-color: #fff", None)]
    #[case("Background-Color:#fff;", Some("#fff"))]
    #[case("  BACKGROUND-COLOR : #a1B2c3 ;", Some("#a1B2c3"))]
    #[case("--background-color:#000; background-color:#fff", Some("#fff"))]
    #[case("", None)]
    fn test_parse_background_color(#[case] style: &str, #[case] expected: Option<&str>) {
        assert_eq!(parse_background_color(style).as_deref(), expected);
    }

    #[rstest]
    #[case("1,024 stars today", Some(1024))]
    #[case("\n   7 stars this week  ", Some(7))]
    #[case("stars today", None)]
    fn test_first_number(#[case] text: &str, #[case] expected: Option<u64>) {
        assert_eq!(first_number(text), expected);
    }
}
