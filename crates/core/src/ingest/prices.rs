use chrono::DateTime;
use serde::Deserialize;

use crate::ingest::error::ScrapeError;
use crate::ingest::types::{PriceBar, PriceHistory};

pub const EXCHANGE_SUFFIXES: [&str; 2] = [".NS", ".BO"];

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Turns a chart API body into bars. Bars without a close are dropped.
pub fn parse_chart(symbol: &str, body: &str) -> Result<PriceHistory, ScrapeError> {
    let resp: ChartResponse =
        serde_json::from_str(body).map_err(|e| ScrapeError::Malformed(format!("chart JSON: {e}")))?;

    let Some(result) = resp.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(PriceHistory {
            symbol: symbol.to_string(),
            bars: Vec::new(),
        });
    };
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let mut bars = Vec::with_capacity(result.timestamp.len());
    for (i, ts) in result.timestamp.iter().enumerate() {
        let (Some(close), Some(dt)) = (at(&quote.close, i), DateTime::from_timestamp(*ts, 0)) else {
            continue;
        };
        bars.push(PriceBar {
            date: dt.date_naive(),
            open: at(&quote.open, i).unwrap_or(close),
            high: at(&quote.high, i).unwrap_or(close),
            low: at(&quote.low, i).unwrap_or(close),
            close,
            volume: at(&quote.volume, i).unwrap_or(0.0),
        });
    }

    Ok(PriceHistory {
        symbol: symbol.to_string(),
        bars,
    })
}

fn at(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}
