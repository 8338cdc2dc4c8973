use anyhow::Result;
use reqwest::Client;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use yoyscraper::{
    config::Config,
    fetch, growth,
    insight::InsightClient,
    sheets::{self, SheetsClient},
    transcript,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let Some(url) = std::env::args().nth(1) else {
        eprintln!("Usage: yoyscraper <company_url>");
        std::process::exit(1);
    };

    let config = Config::from_env()?;
    let client = Client::new();

    info!(url = %url, "scraping quarterly data");
    let snapshot = fetch::snapshot::fetch_snapshot(&client, &url).await?;
    let yoy = growth::compute_yoy(&snapshot.quarters);

    info!("fetching latest transcript");
    let transcript_text =
        match transcript::fetch_latest_transcript(&client, &url, transcript::SITE_BASE).await {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "transcript fetch failed; continuing without it");
                transcript::TRANSCRIPT_UNAVAILABLE.to_string()
            }
        };

    info!("generating company insight");
    let insight = InsightClient::new(client.clone(), config.openai_api_key.clone())
        .generate(&snapshot.symbol, &snapshot.about, &transcript_text)
        .await;

    let row = sheets::build_output_row(&snapshot.symbol, &insight, &yoy);
    info!(symbol = %snapshot.symbol, cells = row.len(), "appending row");

    let token = sheets::load_token(&config.sheets_credentials)?;
    SheetsClient::new(client, token)
        .append_row(&config.sheet_id, &config.sheet_tab, &row, &yoy)
        .await?;

    info!("done");
    Ok(())
}
