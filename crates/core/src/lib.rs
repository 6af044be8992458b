pub mod domain;
pub mod ingest;
pub mod render;
pub mod scoring;
pub mod screen;
pub mod watchlist;

pub mod config {
    use anyhow::Context;
    use std::time::Duration;

    pub const DEFAULT_SCREENER_BASE_URL: &str = "https://www.screener.in";
    pub const DEFAULT_PRICE_BASE_URL: &str = "https://query1.finance.yahoo.com";
    pub const DEFAULT_PORT: u16 = 9000;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub screener_base_url: String,
        pub price_base_url: String,
        pub timeout_secs: u64,
        pub retries: u32,
        pub req_delay_ms: u64,
        pub reports_dir: String,
        pub port: u16,
        pub sentry_dsn: Option<String>,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                screener_base_url: DEFAULT_SCREENER_BASE_URL.to_string(),
                price_base_url: DEFAULT_PRICE_BASE_URL.to_string(),
                timeout_secs: 30,
                retries: 3,
                req_delay_ms: 1500,
                reports_dir: "reports".to_string(),
                port: DEFAULT_PORT,
                sentry_dsn: None,
            }
        }
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let mut out = Self::default();

            if let Some(v) = non_empty_var("SCREENER_BASE_URL") {
                out.screener_base_url = v;
            }
            if let Some(v) = non_empty_var("PRICE_BASE_URL") {
                out.price_base_url = v;
            }
            if let Some(v) = non_empty_var("SCREENER_TIMEOUT_SECS") {
                out.timeout_secs = v
                    .parse()
                    .with_context(|| format!("SCREENER_TIMEOUT_SECS must be an integer (got {v})"))?;
            }
            if let Some(v) = non_empty_var("SCREENER_RETRIES") {
                out.retries = v
                    .parse()
                    .with_context(|| format!("SCREENER_RETRIES must be an integer (got {v})"))?;
            }
            if let Some(v) = non_empty_var("SCREENER_REQ_DELAY_MS") {
                out.req_delay_ms = v
                    .parse()
                    .with_context(|| format!("SCREENER_REQ_DELAY_MS must be an integer (got {v})"))?;
            }
            if let Some(v) = non_empty_var("SCREENER_REPORTS_DIR") {
                out.reports_dir = v;
            }
            if let Some(v) = non_empty_var("PORT") {
                out.port = v
                    .parse()
                    .with_context(|| format!("PORT must be a port number (got {v})"))?;
            }
            out.sentry_dsn = non_empty_var("SENTRY_DSN");

            anyhow::ensure!(out.retries >= 1, "SCREENER_RETRIES must be >= 1");
            Ok(out)
        }

        pub fn timeout(&self) -> Duration {
            Duration::from_secs(self.timeout_secs)
        }

        pub fn req_delay(&self) -> Duration {
            Duration::from_millis(self.req_delay_ms)
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}
