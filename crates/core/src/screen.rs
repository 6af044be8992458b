use std::time::Duration;

use anyhow::Result;

use crate::domain::ScreenedStock;
use crate::ingest::CompanyDataSource;
use crate::render::build_chart_set;
use crate::scoring::analyze;

pub async fn screen_ticker(
    source: &dyn CompanyDataSource,
    ticker: &str,
    consolidated: bool,
) -> Result<ScreenedStock> {
    let record = source.fetch_company(ticker, consolidated).await?;
    let analysis = analyze(&record);

    let prices = match source.fetch_price_history(&record.ticker).await {
        Ok(prices) => prices,
        Err(err) => {
            tracing::warn!(ticker = %record.ticker, error = %err, "price history unavailable");
            Default::default()
        }
    };
    let charts = build_chart_set(&record, &prices);

    tracing::info!(
        ticker = %record.ticker,
        grade = %analysis.scorecard.grade,
        overall = analysis.scorecard.overall,
        charts = charts.fragments.len(),
        "screened"
    );
    Ok(ScreenedStock {
        record,
        analysis,
        charts,
    })
}

/// Screens tickers in order with `delay` between fetches. Failures are
/// logged and skipped.
pub async fn screen_all(
    source: &dyn CompanyDataSource,
    tickers: &[String],
    consolidated: bool,
    delay: Duration,
) -> Vec<ScreenedStock> {
    let mut stocks = Vec::with_capacity(tickers.len());
    for (idx, ticker) in tickers.iter().enumerate() {
        if idx > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        tracing::info!(%ticker, n = idx + 1, total = tickers.len(), "screening");
        match screen_ticker(source, ticker, consolidated).await {
            Ok(stock) => stocks.push(stock),
            Err(err) => tracing::error!(%ticker, error = %format!("{err:#}"), "skipping ticker"),
        }
    }
    stocks
}
