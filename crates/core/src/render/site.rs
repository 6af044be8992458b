//! Split-file static site: an `index.html` shell whose sidebar loads
//! `panes/<TICKER>.html` into a frame. Works straight from disk.

use std::path::{Path, PathBuf};

use anyhow::Context;
use html_escape::encode_text as text;

use crate::domain::ScreenedStock;
use crate::render::assets::{PANE_SCRIPT, SITE_SCRIPT, STYLE};
use crate::render::dashboard::{count_label, page_title, tab_list, tab_markup};
use crate::render::pane::pane_html;
use crate::watchlist::Section;

pub const PANES_DIR: &str = "panes";

/// Relative path of a stock's pane file. `&` is not URL-safe, so it is
/// spelled out.
pub fn pane_path(ticker: &str) -> String {
    format!("{PANES_DIR}/{}.html", ticker.replace('&', "_and_"))
}

fn pane_document(stock: &ScreenedStock) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body>
<div class="main-container" style="margin-left:0">
{pane}
</div>
<script>{PANE_SCRIPT}</script>
</body>
</html>
"#,
        title = text(&format!("{} ({})", stock.record.display_name(), stock.ticker())),
        pane = pane_html(stock, true),
    )
}

fn index_document(stocks: &[ScreenedStock], sections: &[Section]) -> String {
    let tabs = tab_list(stocks, sections, |s, active| {
        tab_markup(s, active, Some(&pane_path(s.ticker())))
    });
    let first = stocks
        .first()
        .map(|s| pane_path(s.ticker()))
        .unwrap_or_else(|| "about:blank".to_string());
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body>
<nav class="sidebar">
<div class="sidebar-header"><h3>Stock Screener</h3><div class="subtitle">{count}</div></div>
<div class="tab-list">{tabs}</div>
</nav>
<iframe class="site-frame" name="pane" src="{first}" title="Stock pane"></iframe>
<script>{SITE_SCRIPT}</script>
</body>
</html>
"#,
        title = text(&page_title(stocks)),
        count = count_label(stocks.len()),
        first = html_escape::encode_double_quoted_attribute(&first),
    )
}

pub fn render_site(stocks: &[ScreenedStock], sections: &[Section]) -> Vec<(String, String)> {
    let mut files = vec![("index.html".to_string(), index_document(stocks, sections))];
    files.extend(
        stocks
            .iter()
            .map(|s| (pane_path(s.ticker()), pane_document(s))),
    );
    files
}

pub fn write_site(dir: &Path, stocks: &[ScreenedStock], sections: &[Section]) -> anyhow::Result<PathBuf> {
    let panes = dir.join(PANES_DIR);
    std::fs::create_dir_all(&panes).with_context(|| format!("create {}", panes.display()))?;
    for (rel, body) in render_site(stocks, sections) {
        let path = dir.join(&rel);
        std::fs::write(&path, body).with_context(|| format!("write {}", path.display()))?;
    }
    tracing::info!(dir = %dir.display(), panes = stocks.len(), "static site written");
    Ok(dir.join("index.html"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::Analysis;
    use crate::domain::charts::ChartSet;
    use crate::domain::record::CompanyRecord;

    fn stock(ticker: &str) -> ScreenedStock {
        ScreenedStock {
            record: CompanyRecord::new(ticker),
            analysis: Analysis::default(),
            charts: ChartSet::default(),
        }
    }

    #[test]
    fn pane_paths_are_url_safe() {
        assert_eq!(pane_path("TCS"), "panes/TCS.html");
        assert_eq!(pane_path("M&M"), "panes/M_and_M.html");
    }

    #[test]
    fn shell_links_every_pane_into_the_frame() {
        let files = render_site(&[stock("TCS"), stock("M&M")], &[]);
        let names: Vec<&str> = files.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["index.html", "panes/TCS.html", "panes/M_and_M.html"]);
        let index = &files[0].1;
        assert!(index.contains(r#"src="panes/TCS.html""#));
        assert!(index.contains(r#"href="panes/M_and_M.html" target="pane""#));
        assert!(files[2].1.contains(r#"data-ticker="M&amp;M" style="display:block""#));
    }

    #[test]
    fn writes_files_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let index = write_site(dir.path(), &[stock("ITC")], &[]).unwrap();
        assert_eq!(index, dir.path().join("index.html"));
        assert!(dir.path().join("panes/ITC.html").is_file());
        let shell = std::fs::read_to_string(index).unwrap();
        assert!(shell.contains("1 stock<"));
    }
}
