use crate::config::Settings;
use crate::domain::record::{CompanyRecord, ExpenseShare};
use crate::ingest::error::ScrapeError;
use crate::ingest::parse;
use crate::ingest::prices::{self, EXCHANGE_SUFFIXES};
use crate::ingest::types::{PriceHistory, SearchHit};
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const SIDE_API_TIMEOUT: Duration = Duration::from_secs(10);
const SEARCH_TIMEOUT: Duration = Duration::from_secs(5);
const MIN_SEARCH_LEN: usize = 2;

const TICKER_ALIASES: [(&str, &str); 2] = [("INFOSYS", "INFY"), ("LTIM", "MINDTREE")];

#[async_trait::async_trait]
pub trait CompanyDataSource: Send + Sync {
    async fn fetch_company(&self, ticker: &str, consolidated: bool) -> Result<CompanyRecord>;

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;

    async fn fetch_price_history(&self, ticker: &str) -> Result<PriceHistory>;
}

pub fn normalize_ticker(raw: &str) -> std::result::Result<String, ScrapeError> {
    let ticker = raw.trim().to_uppercase();
    let valid = !ticker.is_empty()
        && ticker
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '&' || c == '-');
    if valid {
        Ok(ticker)
    } else {
        Err(ScrapeError::InvalidTicker(raw.to_string()))
    }
}

pub fn site_symbol(ticker: &str) -> &str {
    TICKER_ALIASES
        .iter()
        .find(|(from, _)| *from == ticker)
        .map(|(_, to)| *to)
        .unwrap_or(ticker)
}

#[derive(Debug, Clone)]
pub struct ScreenerClient {
    http: reqwest::Client,
    base_url: String,
    price_base_url: String,
    retries: u32,
    rate_limit_wait: Duration,
}

impl ScreenerClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let http = reqwest::Client::builder()
            .timeout(settings.timeout())
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .context("failed to build screener http client")?;

        Ok(Self {
            http,
            base_url: settings.screener_base_url.trim_end_matches('/').to_string(),
            price_base_url: settings.price_base_url.trim_end_matches('/').to_string(),
            retries: settings.retries.max(1),
            rate_limit_wait: Duration::from_secs(3),
        })
    }

    /// Base wait between rate-limited attempts; attempt `n` waits `n` times this.
    pub fn with_rate_limit_wait(mut self, wait: Duration) -> Self {
        self.rate_limit_wait = wait;
        self
    }

    fn company_url(&self, symbol: &str, consolidated: bool) -> String {
        if consolidated {
            format!("{}/company/{symbol}/consolidated/", self.base_url)
        } else {
            format!("{}/company/{symbol}/", self.base_url)
        }
    }

    async fn get_page(&self, url: &str) -> std::result::Result<(String, String), ScrapeError> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let res = self.http.get(url).send().await?;
            let status = res.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                if attempt >= self.retries {
                    return Err(ScrapeError::RateLimited {
                        url: url.to_string(),
                        attempts: attempt,
                    });
                }
                let wait = self.rate_limit_wait * attempt;
                tracing::warn!(attempt, ?wait, %url, "rate limited; retrying");
                tokio::time::sleep(wait).await;
                continue;
            }

            if !status.is_success() {
                return Err(ScrapeError::Status {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }

            let final_url = res.url().to_string();
            let body = res.text().await?;
            return Ok((final_url, body));
        }
    }

    async fn get_side_api(&self, url: &str) -> std::result::Result<String, ScrapeError> {
        let res = self
            .http
            .get(url)
            .header("X-Requested-With", "XMLHttpRequest")
            .timeout(SIDE_API_TIMEOUT)
            .send()
            .await?;
        let status = res.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(res.text().await?)
    }

    async fn fetch_segments(&self, company_id: &str, consolidated: bool) -> Vec<String> {
        let params = if consolidated { "?consolidated=true" } else { "" };
        let url = format!(
            "{}/api/segments/{company_id}/profit-loss/1/{params}",
            self.base_url
        );
        match self.get_side_api(&url).await {
            Ok(html) => parse::parse_segments(&html),
            Err(err) => {
                tracing::debug!(%company_id, error = %err, "segments unavailable");
                Vec::new()
            }
        }
    }

    async fn fetch_expense_breakdown(&self, company_id: &str, consolidated: bool) -> Vec<ExpenseShare> {
        let mut url = format!(
            "{}/api/company/{company_id}/schedules/?parent=Expenses&section=profit-loss",
            self.base_url
        );
        if consolidated {
            url.push_str("&consolidated");
        }
        let body = match self.get_side_api(&url).await {
            Ok(body) => body,
            Err(err) => {
                tracing::debug!(%company_id, error = %err, "expense schedule unavailable");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Value>(&body) {
            Ok(json) => parse::parse_expense_breakdown(&json),
            Err(err) => {
                tracing::debug!(%company_id, error = %err, "expense schedule is not JSON");
                Vec::new()
            }
        }
    }

    async fn fetch_price_symbol(&self, symbol: &str) -> Result<PriceHistory> {
        let url = format!("{}/v8/finance/chart/{symbol}", self.price_base_url);
        let res = self
            .http
            .get(&url)
            .query(&[("range", "max"), ("interval", "1d")])
            .send()
            .await
            .context("price history request failed")?;
        let status = res.status();
        let body = res.text().await.context("failed to read price history")?;
        if status == StatusCode::NOT_FOUND {
            return Ok(PriceHistory {
                symbol: symbol.to_string(),
                bars: Vec::new(),
            });
        }
        anyhow::ensure!(status.is_success(), "price history HTTP {status} for {symbol}");
        Ok(prices::parse_chart(symbol, &body)?)
    }
}

#[async_trait::async_trait]
impl CompanyDataSource for ScreenerClient {
    async fn fetch_company(&self, ticker: &str, consolidated: bool) -> Result<CompanyRecord> {
        let ticker = normalize_ticker(ticker)?;
        let symbol = site_symbol(&ticker);
        let url = self.company_url(symbol, consolidated);

        let (mut final_url, mut html) = match self.get_page(&url).await {
            Ok(page) => page,
            Err(err) if err.is_not_found() && consolidated => {
                tracing::info!(%ticker, "no consolidated page; trying standalone");
                self.get_page(&self.company_url(&ticker, false))
                    .await
                    .with_context(|| format!("failed to fetch data for {ticker}"))?
            }
            Err(err) => {
                return Err(anyhow::Error::new(err).context(format!("failed to fetch data for {ticker}")))
            }
        };

        if consolidated && final_url.contains("consolidated") && !parse::has_profit_loss(&html) {
            match self.get_page(&self.company_url(&ticker, false)).await {
                Ok(page) => {
                    tracing::info!(%ticker, "consolidated figures empty; using standalone");
                    (final_url, html) = page;
                }
                Err(err) => {
                    tracing::debug!(%ticker, error = %err, "standalone fallback failed");
                }
            }
        }

        let mut record = parse::parse_company_page(&html, &ticker, &final_url, chrono::Utc::now());

        if let Some(id) = record.company_id.clone() {
            record.segments = self.fetch_segments(&id, record.is_consolidated).await;
            record.expense_breakdown = self
                .fetch_expense_breakdown(&id, record.is_consolidated)
                .await;
        }

        tracing::info!(
            %ticker,
            name = %record.company_name,
            consolidated = record.is_consolidated,
            periods = record.profit_loss.periods.len(),
            "fetched company page"
        );
        Ok(record)
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_LEN {
            return Ok(Vec::new());
        }

        let url = format!("{}/api/company/search/", self.base_url);
        let res = self
            .http
            .get(&url)
            .query(&[("q", query)])
            .timeout(SEARCH_TIMEOUT)
            .send()
            .await
            .context("search request failed")?;
        let status = res.status();
        anyhow::ensure!(status.is_success(), "search HTTP {status}");

        let json: Value = res.json().await.context("search response is not valid JSON")?;
        Ok(parse::parse_search_results(&json))
    }

    async fn fetch_price_history(&self, ticker: &str) -> Result<PriceHistory> {
        let ticker = normalize_ticker(ticker)?;
        let mut empty = None;
        let mut last_err = None;
        for suffix in EXCHANGE_SUFFIXES {
            let symbol = format!("{ticker}{suffix}");
            match self.fetch_price_symbol(&symbol).await {
                Ok(history) if !history.is_empty() => return Ok(history),
                Ok(history) => {
                    tracing::debug!(%symbol, "no price history");
                    empty = Some(history);
                }
                Err(err) => {
                    tracing::warn!(%symbol, error = %format!("{err:#}"), "price history fetch failed");
                    last_err = Some(err);
                }
            }
        }
        match (empty, last_err) {
            (Some(history), _) => Ok(history),
            (None, Some(err)) => Err(err),
            (None, None) => Ok(PriceHistory::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<html><body><h1>Acme Ltd</h1>
        <section id="profit-loss"><table>
          <tr><th></th><th>Mar 2024</th></tr>
          <tr><td>Sales</td><td>100</td></tr>
        </table></section></body></html>"#;

    const EMPTY_PAGE: &str = "<html><body><h1>Acme Ltd</h1></body></html>";

    fn client(server: &MockServer) -> ScreenerClient {
        let settings = Settings {
            screener_base_url: server.uri(),
            price_base_url: server.uri(),
            retries: 3,
            ..Default::default()
        };
        ScreenerClient::from_settings(&settings)
            .unwrap()
            .with_rate_limit_wait(Duration::from_millis(1))
    }

    #[test]
    fn normalizes_and_validates_tickers() {
        assert_eq!(normalize_ticker(" m&m ").unwrap(), "M&M");
        assert_eq!(normalize_ticker("bajaj-auto").unwrap(), "BAJAJ-AUTO");
        assert!(normalize_ticker("").is_err());
        assert!(normalize_ticker("../etc").is_err());
        assert_eq!(site_symbol("INFOSYS"), "INFY");
        assert_eq!(site_symbol("TCS"), "TCS");
    }

    #[tokio::test]
    async fn fetches_consolidated_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/company/ACME/consolidated/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;

        let record = client(&server).fetch_company("acme", true).await.unwrap();
        assert_eq!(record.ticker, "ACME");
        assert_eq!(record.company_name, "Acme Ltd");
        assert!(record.is_consolidated);
        assert_eq!(record.profit_loss.periods, vec!["Mar 2024"]);
    }

    #[tokio::test]
    async fn falls_back_to_standalone_on_404() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/company/ACME/consolidated/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/company/ACME/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;

        let record = client(&server).fetch_company("ACME", true).await.unwrap();
        assert!(!record.is_consolidated);
        assert_eq!(record.profit_loss.rows[0].label, "Sales");
    }

    #[tokio::test]
    async fn empty_consolidated_figures_use_standalone() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/company/ACME/consolidated/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_PAGE))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/company/ACME/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;

        let record = client(&server).fetch_company("ACME", true).await.unwrap();
        assert!(!record.is_consolidated);
        assert!(!record.profit_loss.is_empty());
    }

    #[tokio::test]
    async fn gives_up_after_repeated_rate_limits() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/company/ACME/"))
            .respond_with(ResponseTemplate::new(429))
            .expect(3)
            .mount(&server)
            .await;

        let err = client(&server).fetch_company("ACME", false).await.unwrap_err();
        let scrape = err.downcast_ref::<ScrapeError>().unwrap();
        assert!(matches!(scrape, ScrapeError::RateLimited { attempts: 3, .. }));
    }

    #[tokio::test]
    async fn side_apis_fill_segments_and_expenses() {
        let server = MockServer::start().await;
        let page = PAGE.replace("<h1>", r#"<a href="/api/company/42/quick_ratios/">q</a><h1>"#);
        Mock::given(method("GET"))
            .and(path("/company/ACME/consolidated/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/segments/42/profit-loss/1/"))
            .and(header("X-Requested-With", "XMLHttpRequest"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<table><tbody data-segment-line="Sales"><tr><td><table>
                   <tr><td>Chemicals</td></tr></table></td></tr></tbody></table>"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/company/42/schedules/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let record = client(&server).fetch_company("ACME", true).await.unwrap();
        assert_eq!(record.company_id.as_deref(), Some("42"));
        assert_eq!(record.segments, vec!["Chemicals"]);
        assert!(record.expense_breakdown.is_empty());
    }

    #[tokio::test]
    async fn short_search_skips_network() {
        let server = MockServer::start().await;
        let hits = client(&server).search("a").await.unwrap();
        assert!(hits.is_empty());
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn search_maps_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/company/search/"))
            .and(query_param("q", "tata"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"name": "Tata Steel Ltd", "url": "/company/TATASTEEL/consolidated/"}
            ])))
            .mount(&server)
            .await;

        let hits = client(&server).search("tata").await.unwrap();
        assert_eq!(hits, vec![SearchHit { ticker: "TATASTEEL".into(), name: "Tata Steel Ltd".into() }]);
    }

    #[tokio::test]
    async fn price_history_falls_back_to_bse() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/ACME.NS"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/ACME.BO"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "chart": {"result": [{
                    "timestamp": [1704153600],
                    "indicators": {"quote": [{"close": [50.0]}]}
                }]}
            })))
            .mount(&server)
            .await;

        let history = client(&server).fetch_price_history("acme").await.unwrap();
        assert_eq!(history.symbol, "ACME.BO");
        assert_eq!(history.bars.len(), 1);
    }

    #[tokio::test]
    async fn nse_server_error_still_tries_bse() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/ACME.NS"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/ACME.BO"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "chart": {"result": [{
                    "timestamp": [1704153600, 1704240000],
                    "indicators": {"quote": [{"close": [50.0, 51.0]}]}
                }]}
            })))
            .mount(&server)
            .await;

        let history = client(&server).fetch_price_history("ACME").await.unwrap();
        assert_eq!(history.symbol, "ACME.BO");
        assert_eq!(history.bars.len(), 2);
    }

    #[tokio::test]
    async fn price_history_error_surfaces_when_no_exchange_answers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        assert!(client(&server).fetch_price_history("ACME").await.is_err());
    }
}
