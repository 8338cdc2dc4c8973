use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

/// Production chat-completions endpoint base.
pub const OPENAI_BASE: &str = "https://api.openai.com";

const MODEL: &str = "gpt-4.1-mini";
const FALLBACK: &str = "N/A";

/// Qualitative company insight. Always fully populated: fields the model
/// omits deserialize to `"N/A"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Insight {
    #[serde(default = "na")]
    pub sector: String,
    #[serde(default = "na", rename = "subSector")]
    pub sub_sector: String,
    #[serde(default = "na", rename = "concallSummary")]
    pub concall_summary: String,
    #[serde(default = "na")]
    pub guidance: String,
}

fn na() -> String {
    FALLBACK.to_string()
}

impl Insight {
    /// All-`"N/A"` insight, substituted whenever the model response cannot
    /// be obtained or parsed.
    pub fn fallback() -> Self {
        Self {
            sector: na(),
            sub_sector: na(),
            concall_summary: na(),
            guidance: na(),
        }
    }
}

/// Chat-completions client. Use [`InsightClient::new`] for production or
/// [`InsightClient::with_base_url`] to point at a mock server in tests.
pub struct InsightClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl InsightClient {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, OPENAI_BASE)
    }

    pub fn with_base_url(
        client: Client,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Ask the model for a structured insight. Never fails the pipeline:
    /// transport errors and malformed responses log a warning and return
    /// the all-`"N/A"` fallback.
    pub async fn generate(&self, symbol: &str, about: &str, transcript: &str) -> Insight {
        let prompt = build_prompt(symbol, about, transcript);
        match self.request(&prompt).await {
            Ok(insight) => insight,
            Err(err) => {
                warn!(error = %err, "insight generation failed; using fallback");
                Insight::fallback()
            }
        }
    }

    async fn request(&self, prompt: &str) -> Result<Insight> {
        let body = json!({
            "model": MODEL,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": 0,
        });

        let resp: ChatResponse = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("chat completion request failed")?
            .error_for_status()
            .context("chat completion returned non-success status")?
            .json()
            .await
            .context("reading chat completion body")?;

        let content = resp
            .choices
            .first()
            .map(|c| c.message.content.trim())
            .context("chat completion had no choices")?;
        debug!(bytes = content.len(), "model response received");

        serde_json::from_str(content).context("model response was not the expected JSON shape")
    }
}

fn build_prompt(symbol: &str, about: &str, transcript: &str) -> String {
    format!(
        r#"
You are a financial research assistant. Extract:
1. Sector (short)
2. Sub-sector (short)
3. Detailed summary of the conference call with focus on financial performance, margin guidance, how different business segments are doing, management guidance for the future along with numbers, and key risks.

Return JSON: {{ "sector": "", "subSector": "", "concallSummary": "", "guidance": "" }}

Company: {symbol}
About: {about}
Transcript: {transcript}
"#
    )
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: String,
}
