use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;

use screener_core::domain::analysis::Analysis;
use screener_core::domain::record::CompanyRecord;
use screener_core::domain::ScreenedStock;
use screener_core::render::{render_dashboard, DashboardMode};
use screener_core::watchlist::Section;

#[derive(Debug, Serialize)]
struct JsonExport<'a> {
    data: &'a CompanyRecord,
    analysis: &'a Analysis,
}

pub fn json_path(dir: &Path, ticker: &str) -> PathBuf {
    dir.join(format!("screener_{ticker}.json"))
}

pub fn dashboard_path(dir: &Path, stocks: &[ScreenedStock]) -> PathBuf {
    match stocks {
        [only] => dir.join(format!("screener_{}.html", only.ticker())),
        _ => dir.join("screener_dashboard.html"),
    }
}

pub fn write_json(dir: &Path, stock: &ScreenedStock) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let path = json_path(dir, stock.ticker());
    let body = serde_json::to_string_pretty(&JsonExport {
        data: &stock.record,
        analysis: &stock.analysis,
    })
    .context("serialize JSON export")?;
    std::fs::write(&path, body).with_context(|| format!("write {}", path.display()))?;
    tracing::info!(ticker = %stock.ticker(), path = %path.display(), "JSON written");
    Ok(path)
}

pub fn write_dashboard(path: &Path, stocks: &[ScreenedStock], sections: &[Section]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let html = render_dashboard(stocks, sections, DashboardMode::Static);
    std::fs::write(path, html).with_context(|| format!("write {}", path.display()))?;
    tracing::info!(path = %path.display(), stocks = stocks.len(), "dashboard written");
    Ok(())
}
