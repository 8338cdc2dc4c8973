pub mod pdf;

use anyhow::{Context, Result};
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{info, warn};
use url::Url;

use crate::fetch;

/// Returned in place of transcript text when the page has no transcript
/// link. Never an error: the pipeline continues with this sentinel.
pub const TRANSCRIPT_UNAVAILABLE: &str = "Transcript not available";

/// Base against which relative document links resolve.
pub const SITE_BASE: &str = "https://www.screener.in";

/// Extracted transcript text is capped before prompting.
const TRANSCRIPT_CHAR_CAP: usize = 5000;

/// Fetch the company page, locate the most recent raw-transcript document,
/// download it, and return its extracted text capped at 5000 characters.
pub async fn fetch_latest_transcript(
    client: &Client,
    company_url: &str,
    base: &str,
) -> Result<String> {
    let html = fetch::get_text(client, company_url).await?;

    let Some(href) = find_transcript_link(&html) else {
        info!("no raw transcript link in documents section");
        return Ok(TRANSCRIPT_UNAVAILABLE.to_string());
    };

    let full = resolve_link(base, &href)?;
    info!(url = %full, "transcript link");

    let bytes = fetch::get_bytes(client, &full).await?;
    let extracted = pdf::extract_text(&bytes).context("extracting transcript text")?;
    if extracted.pages_skipped > 0 {
        warn!(
            pages_skipped = extracted.pages_skipped,
            "some transcript pages yielded no text"
        );
    }

    Ok(fetch::truncate_chars(&extracted.text, TRANSCRIPT_CHAR_CAP))
}

/// First `Raw Transcript` link in the documents section, if any.
fn find_transcript_link(html: &str) -> Option<String> {
    let selector = Selector::parse(r#"#documents ul.list-links li a[title="Raw Transcript"]"#)
        .expect("valid CSS selector");
    let doc = Html::parse_document(html);
    doc.select(&selector)
        .find_map(|a| a.value().attr("href").map(str::to_string))
}

fn resolve_link(base: &str, href: &str) -> Result<String> {
    if href.starts_with("http") {
        return Ok(href.to_string());
    }
    let base = Url::parse(base).with_context(|| format!("invalid base URL {base:?}"))?;
    Ok(base
        .join(href)
        .with_context(|| format!("resolving link {href:?}"))?
        .to_string())
}
