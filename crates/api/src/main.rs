use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use screener_api::AppState;
use screener_core::config::Settings;
use screener_core::ingest::{normalize_ticker, ScreenerClient};
use screener_core::screen::screen_all;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    // Tickers on the command line are screened before the server starts.
    let mut tickers = Vec::new();
    for raw in std::env::args().skip(1) {
        match normalize_ticker(&raw) {
            Ok(t) if !tickers.contains(&t) => tickers.push(t),
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "ignoring argument"),
        }
    }

    let client = ScreenerClient::from_settings(&settings)?;
    let stocks = screen_all(&client, &tickers, true, settings.req_delay()).await;
    if stocks.len() < tickers.len() {
        tracing::warn!(
            requested = tickers.len(),
            loaded = stocks.len(),
            "some tickers could not be preloaded"
        );
    }

    let state = AppState::new(Arc::new(client), stocks);
    screener_api::serve(state, settings.port).await
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
