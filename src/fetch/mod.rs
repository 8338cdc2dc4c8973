pub mod snapshot;

use anyhow::{Context, Result};
use reqwest::Client;

/// The source site serves different markup to obvious bots.
pub(crate) const USER_AGENT: &str = "Mozilla/5.0";

/// GET a page and return its body text.
pub async fn get_text(client: &Client, url: &str) -> Result<String> {
    client
        .get(url)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .send()
        .await
        .with_context(|| format!("GET {url} failed"))?
        .error_for_status()
        .with_context(|| format!("non-success status from {url}"))?
        .text()
        .await
        .with_context(|| format!("reading body from {url}"))
}

/// GET a binary document and return its bytes.
pub async fn get_bytes(client: &Client, url: &str) -> Result<Vec<u8>> {
    let resp = client
        .get(url)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .send()
        .await
        .with_context(|| format!("GET {url} failed"))?
        .error_for_status()
        .with_context(|| format!("non-success status from {url}"))?;
    Ok(resp
        .bytes()
        .await
        .with_context(|| format!("reading bytes from {url}"))?
        .to_vec())
}

/// Truncate to at most `max` characters, respecting char boundaries.
pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_chars_respects_multibyte_boundaries() {
        assert_eq!(truncate_chars("₹₹₹₹", 2), "₹₹");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 5), "");
    }
}
