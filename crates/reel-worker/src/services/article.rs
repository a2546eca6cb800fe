//! Article scraping: HTTP fetch plus HTML to readable text.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};
use url::Url;

use super::ArticleScraper;
use crate::error::{WorkerError, WorkerResult};

const USER_AGENT: &str = concat!("Mozilla/5.0 (compatible; reelgen/", env!("CARGO_PKG_VERSION"), ")");

/// Elements whose text never belongs to the story.
const NON_CONTENT: &[&str] = &["nav", "footer", "aside", "form", "script", "style", "noscript"];

static ARTICLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("article").unwrap());
static BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());
static BLOCKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, p, blockquote").unwrap());

/// Convert an HTML page to plain text, one block per line.
///
/// Only the first `<article>` is read when the page has one with text;
/// otherwise headings and paragraphs of the whole body are used.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let from_article = document
        .select(&ARTICLE)
        .next()
        .map(block_lines)
        .filter(|lines| !lines.is_empty());

    let lines = from_article.unwrap_or_else(|| {
        document
            .select(&BODY)
            .next()
            .map(block_lines)
            .unwrap_or_default()
    });
    lines.join("\n")
}

fn block_lines(root: ElementRef<'_>) -> Vec<String> {
    root.select(&BLOCKS)
        .filter(|block| !inside_non_content(block))
        .map(|block| {
            let text: String = block.text().collect();
            text.split_whitespace().collect::<Vec<_>>().join(" ")
        })
        .filter(|line| !line.is_empty())
        .collect()
}

fn inside_non_content(block: &ElementRef<'_>) -> bool {
    block
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|el| NON_CONTENT.contains(&el.value().name()))
}

/// Scraper that downloads the page and extracts its text.
#[derive(Debug, Clone)]
pub struct HttpArticleScraper {
    client: Client,
}

impl HttpArticleScraper {
    pub fn new(timeout: Duration) -> WorkerResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ArticleScraper for HttpArticleScraper {
    async fn scrape(&self, url: &str) -> WorkerResult<String> {
        let parsed = Url::parse(url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(WorkerError::scrape(format!(
                "unsupported URL scheme '{}'",
                parsed.scheme()
            )));
        }

        info!("Scraping article {}", parsed);
        let response = self.client.get(parsed.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WorkerError::scrape(format!("{} returned HTTP {}", parsed, status)));
        }

        let html = response.text().await?;
        let text = html_to_text(&html);
        debug!(html_bytes = html.len(), text_chars = text.len(), "Extracted article text");

        if text.is_empty() {
            return Err(WorkerError::scrape(format!("no readable text at {}", parsed)));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_scripts_and_navigation() {
        let html = r#"<html><head><style>p{color:red}</style><script>var x = "<p>";</script></head>
            <body><nav><p><a href="/">Home</a></p></nav>
            <h1>Storm hits coast</h1><p>Residents were <b>evacuated</b> overnight.</p>
            <footer><p>Copyright</p></footer></body></html>"#;

        assert_eq!(html_to_text(html), "Storm hits coast\nResidents were evacuated overnight.");
    }

    #[test]
    fn test_prefers_first_article() {
        let html = r#"<div><p>Sidebar promo</p></div>
            <article><h1>Storm</h1><p>Main story.</p></article>
            <aside><article><p>Related: last year's flood</p></article></aside>
            <article><p>Teaser for another story</p></article>"#;
        assert_eq!(html_to_text(html), "Storm\nMain story.");
    }

    #[test]
    fn test_attribute_with_angle_bracket() {
        let html = r#"<article><p data-note="a > b">Rates rose <span title="x>y">again</span>.</p></article>"#;
        assert_eq!(html_to_text(html), "Rates rose again.");
    }

    #[test]
    fn test_empty_article_falls_back_to_body() {
        let html = "<article><img src=\"a.png\"></article><p>Caption text.</p>";
        assert_eq!(html_to_text(html), "Caption text.");
    }

    #[test]
    fn test_decodes_entities() {
        assert_eq!(
            html_to_text("<p>Tom &amp; Jerry&#39;s &lt;show&gt; &#x2013; live&nbsp;now</p>"),
            "Tom & Jerry's <show> \u{2013} live now"
        );
        assert_eq!(html_to_text("<p>&amp;lt;</p>"), "&lt;");
    }

    #[test]
    fn test_whitespace_collapsed() {
        let html = "<p>one   two</p><p>\n\n</p><p>three\n   four</p>";
        assert_eq!(html_to_text(html), "one two\nthree four");
    }
}
