use std::collections::HashSet;
use std::time::Duration;

use anyhow::Context;
use fake_user_agent::get_chrome_rua;
use reqwest::StatusCode;
use scraper::{Html, Selector};
use url::Url;

// Fragments at or below this length are navigation/boilerplate noise.
const MIN_FRAGMENT_LEN: usize = 20;

/// What one successful fetch yields: the condensed text body and the
/// deduplicated set of same-prefix outbound links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    pub text: String,
    pub links: HashSet<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(StatusCode),
}

/// Fetches and parses a single page. One GET per call, 10 second budget by
/// default, no retries: a failure is final for that call.
pub struct PageExtractor {
    client: reqwest::Client,
}

impl PageExtractor {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        // Some servers reject the default reqwest agent outright.
        let client = reqwest::Client::builder()
            .user_agent(get_chrome_rua())
            .timeout(timeout)
            .build()
            .context("Failed to build the HTTP client")?;

        Ok(PageExtractor { client })
    }

    pub async fn extract(&self, url: &str) -> Result<PageContent, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.text().await?;
        Ok(parse_page(&body, url))
    }
}

/// Pulls the text body and outbound links out of raw markup. Pure so the
/// parsing rules are testable without a network.
pub fn parse_page(html: &str, page_url: &str) -> PageContent {
    let content_selector = Selector::parse("p, h1, h2, h3, article").unwrap();
    let a_tag_selector = Selector::parse("a[href]").unwrap();

    let document = Html::parse_document(html);

    let fragments: Vec<String> = document
        .select(&content_selector)
        .map(|tag| {
            tag.text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<&str>>()
                .join(" ")
        })
        .filter(|fragment| fragment.chars().count() > MIN_FRAGMENT_LEN)
        .collect();
    let text = fragments.join("\n");

    let mut links = HashSet::new();
    if let Ok(base) = Url::parse(page_url) {
        for tag in document.select(&a_tag_selector) {
            let href = match tag.value().attr("href") {
                Some(href) => href,
                None => continue,
            };
            let resolved = match base.join(href) {
                Ok(resolved) => resolved.to_string(),
                Err(_) => continue,
            };
            // Same-origin heuristic: a plain string-prefix check against the
            // page URL, fragments excluded.
            if resolved.starts_with(page_url) && !resolved.contains('#') {
                links.insert(resolved);
            }
        }
    }

    PageContent { text, links }
}
