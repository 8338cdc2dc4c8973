use reqwest::Client;
use scraper::{Html, Selector};
use thiserror::Error;
use tracing::{debug, info};

use super::truncate_chars;

/// Company descriptions are truncated to bound downstream prompt size.
const ABOUT_CHAR_CAP: usize = 2000;

/// One quarter's published figures. Order within a snapshot is the source
/// table's column order (chronological ascending).
#[derive(Debug, Clone, PartialEq)]
pub struct QuarterObservation {
    /// Label as published, e.g. `"Mar 2023"`.
    pub quarter: String,
    pub sales: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompanySnapshot {
    pub symbol: String,
    pub about: String,
    pub quarters: Vec<QuarterObservation>,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("company URL {0:?} has no symbol path segment")]
    BadUrl(String),
    #[error("no row matching \"sales\" or \"net profit\" in the quarterly table")]
    RowsNotFound,
    #[error("fetching company page: {0}")]
    Fetch(anyhow::Error),
}

/// Scrape the quarterly results table from a company profile page.
pub async fn fetch_snapshot(
    client: &Client,
    company_url: &str,
) -> Result<CompanySnapshot, SnapshotError> {
    let symbol = symbol_from_url(company_url)
        .ok_or_else(|| SnapshotError::BadUrl(company_url.to_string()))?;

    let html = super::get_text(client, company_url)
        .await
        .map_err(SnapshotError::Fetch)?;

    let (about, quarters) = parse_company_page(&html)?;
    info!(symbol = %symbol, quarters = quarters.len(), "scraped quarterly data");

    Ok(CompanySnapshot {
        symbol,
        about,
        quarters,
    })
}

/// Symbol by positional convention: 5th `/`-separated segment of the raw
/// URL, uppercased (`https://host/company/ZAGGLE/...`).
fn symbol_from_url(url: &str) -> Option<String> {
    url.split('/')
        .nth(4)
        .filter(|s| !s.is_empty())
        .map(str::to_uppercase)
}

fn parse_company_page(html: &str) -> Result<(String, Vec<QuarterObservation>), SnapshotError> {
    let profile_selector = Selector::parse(".company-profile").expect("valid CSS selector");
    let row_selector = Selector::parse("table.data-table tr").expect("valid CSS selector");
    let cell_selector = Selector::parse("th, td").expect("valid CSS selector");

    let doc = Html::parse_document(html);

    let about = doc
        .select(&profile_selector)
        .next()
        .map(|el| el.text().collect::<String>())
        .unwrap_or_default();
    let about = about.trim();
    let about = if about.is_empty() {
        "No company profile.".to_string()
    } else {
        truncate_chars(about, ABOUT_CHAR_CAP)
    };

    let mut rows: Vec<Vec<String>> = Vec::new();
    for tr in doc.select(&row_selector) {
        let cells: Vec<String> = tr
            .select(&cell_selector)
            .map(|cell| cell.text().collect::<String>().trim().to_string())
            .collect();
        if !cells.is_empty() {
            rows.push(cells);
        }
    }

    let labels = match rows.first() {
        Some(header) => &header[1..],
        None => return Err(SnapshotError::RowsNotFound),
    };

    let sales_row = find_row(&rows, "sales").ok_or(SnapshotError::RowsNotFound)?;
    let profit_row = find_row(&rows, "net profit").ok_or(SnapshotError::RowsNotFound)?;

    let sales: Vec<f64> = sales_row[1..].iter().map(|v| parse_number(v)).collect();
    let profit: Vec<f64> = profit_row[1..].iter().map(|v| parse_number(v)).collect();
    debug!(quarters = labels.len(), "parsed quarterly table");

    let quarters = labels
        .iter()
        .enumerate()
        .map(|(i, label)| QuarterObservation {
            quarter: label.clone(),
            sales: sales.get(i).copied().unwrap_or(0.0),
            profit: profit.get(i).copied().unwrap_or(0.0),
        })
        .collect();

    Ok((about, quarters))
}

/// First row whose label cell contains `needle`, case-insensitively.
fn find_row<'a>(rows: &'a [Vec<String>], needle: &str) -> Option<&'a Vec<String>> {
    rows.iter()
        .find(|row| row[0].to_lowercase().contains(needle))
}

/// Numeric cell parse: strip thousands separators, then take the longest
/// leading numeric prefix. Anything non-numeric coerces to 0 rather than
/// failing, so a stray footnote marker never aborts the scrape. The word
/// "Infinity" also coerces to 0; only digit-based cells are recognized.
fn parse_number(raw: &str) -> f64 {
    let cleaned = raw.replace(',', "");
    let s = cleaned.trim();
    let bytes = s.as_bytes();

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let mantissa_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    if !bytes[mantissa_start..end].iter().any(u8::is_ascii_digit) {
        return 0.0;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }

    s[..end].parse().unwrap_or(0.0)
}
