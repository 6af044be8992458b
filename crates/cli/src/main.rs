use std::path::PathBuf;
use std::sync::Arc;

use anyhow::bail;
use clap::Parser;
use console::style;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use screener_api::AppState;
use screener_core::config::Settings;
use screener_core::ingest::ScreenerClient;
use screener_core::render::{render_report, write_site, ReportMode};
use screener_core::screen::screen_all;
use screener_core::watchlist::{load_watchlist, merge_tickers, Section, SectionSpec};

mod output;

#[derive(Debug, Parser)]
#[command(name = "screener", about = "Fundamental screener for NSE/BSE listed companies")]
struct Args {
    /// Tickers to screen, e.g. TCS INFY HDFCBANK.
    tickers: Vec<String>,

    /// File with one ticker per line (`#` starts a comment).
    #[arg(short, long)]
    watchlist: Option<PathBuf>,

    /// Named sidebar groups as NAME:FILE; their tickers are screened too.
    #[arg(long, num_args = 1..)]
    sections: Vec<SectionSpec>,

    /// Print the short scorecard instead of the full report.
    #[arg(short, long)]
    brief: bool,

    /// Write reports/screener_<T>.json per ticker and skip the terminal report.
    #[arg(long)]
    json: bool,

    /// Write a single-file HTML dashboard.
    #[arg(long)]
    html: bool,

    /// Write a split-file site (index.html plus one pane per ticker).
    #[arg(long)]
    site: bool,

    /// Serve a live dashboard that can add and remove tickers.
    #[arg(long)]
    serve: bool,

    /// Port for --serve. Defaults to PORT or 9000.
    #[arg(long)]
    port: Option<u16>,

    /// Use standalone instead of consolidated financials.
    #[arg(short, long)]
    standalone: bool,

    /// Output file for --html, output directory for --site.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pause between tickers in milliseconds. Defaults to SCREENER_REQ_DELAY_MS or 1500.
    #[arg(long)]
    delay_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    if let Some(port) = args.port {
        settings.port = port;
    }
    if let Some(ms) = args.delay_ms {
        settings.req_delay_ms = ms;
    }

    let result = run(args, settings).await;
    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
    }
    result
}

async fn run(args: Args, settings: Settings) -> anyhow::Result<()> {
    let watchlist = match &args.watchlist {
        Some(path) => {
            let tickers = load_watchlist(path)?;
            tracing::info!(path = %path.display(), count = tickers.len(), "watchlist loaded");
            tickers
        }
        None => Vec::new(),
    };
    let sections = args
        .sections
        .iter()
        .map(SectionSpec::load)
        .collect::<anyhow::Result<Vec<Section>>>()?;
    for s in &sections {
        tracing::info!(section = %s.name, count = s.tickers.len(), "section loaded");
    }

    let tickers = merge_tickers(
        [args.tickers.as_slice(), watchlist.as_slice()]
            .into_iter()
            .chain(sections.iter().map(|s| s.tickers.as_slice())),
    );
    if tickers.is_empty() && !args.serve {
        bail!("no tickers given; pass them as arguments or with --watchlist");
    }

    let consolidated = !args.standalone;
    let client = ScreenerClient::from_settings(&settings)?;
    let stocks = screen_all(&client, &tickers, consolidated, settings.req_delay()).await;

    if args.serve {
        let state = AppState::new(Arc::new(client), stocks)
            .with_sections(sections)
            .with_consolidated(consolidated);
        return screener_api::serve(state, settings.port).await;
    }

    if stocks.is_empty() {
        bail!("none of the {} ticker(s) could be fetched", tickers.len());
    }

    let reports_dir = PathBuf::from(&settings.reports_dir);

    if args.json {
        for stock in &stocks {
            let path = output::write_json(&reports_dir, stock)?;
            println!("{} {}", style("JSON:").green(), path.display());
        }
        return Ok(());
    }

    let mode = if args.brief { ReportMode::Brief } else { ReportMode::Full };
    for stock in &stocks {
        print!("{}", render_report(&stock.record, &stock.analysis, mode));
    }

    if args.html {
        let path = args
            .output
            .clone()
            .unwrap_or_else(|| output::dashboard_path(&reports_dir, &stocks));
        output::write_dashboard(&path, &stocks, &sections)?;
        println!("{} {}", style("Dashboard saved:").green().bold(), path.display());
    }

    if args.site {
        let dir = args.output.clone().unwrap_or_else(|| reports_dir.join("site"));
        let index = write_site(&dir, &stocks, &sections)?;
        println!("{} {}", style("Site saved:").green().bold(), index.display());
    }

    Ok(())
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
