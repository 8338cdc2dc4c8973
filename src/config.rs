use anyhow::{Context, Result};
use std::path::PathBuf;

/// Process configuration, read once at startup. All keys are required;
/// `.env` is loaded by `main` before this runs.
#[derive(Debug, Clone)]
pub struct Config {
    /// Target spreadsheet id.
    pub sheet_id: String,
    /// Target tab name within the spreadsheet.
    pub sheet_tab: String,
    /// API key for the chat-completions service.
    pub openai_api_key: String,
    /// Path to the spreadsheet-service credential JSON file.
    pub sheets_credentials: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            sheet_id: require("SHEET_ID")?,
            sheet_tab: require("SHEET_TAB")?,
            openai_api_key: require("OPENAI_API_KEY")?,
            sheets_credentials: require("SHEETS_CREDENTIALS")?.into(),
        })
    }
}

fn require(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("missing required environment variable {key}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_names_the_missing_key() {
        let err = require("YOYSCRAPER_TEST_KEY_THAT_IS_NOT_SET").unwrap_err();
        assert!(err.to_string().contains("YOYSCRAPER_TEST_KEY_THAT_IS_NOT_SET"));
    }
}
