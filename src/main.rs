use anyhow::{Context, Result, bail};
use mapscrape::{Config, Parser};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let Some(url) = std::env::args().nth(1) else {
        bail!("usage: mapscrape <naver-or-kakao-map-url>");
    };

    let config = Config::from_env()?;
    let parser = Parser::new(config).context("failed to build http client")?;

    let record = parser
        .parse_url(&url)
        .await
        .with_context(|| format!("failed to parse {url}"))?;

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
