use std::collections::HashSet;
use std::fmt::Write as _;

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

use crate::domain::ScreenedStock;
use crate::render::assets::{DASHBOARD_SCRIPT, PANE_SCRIPT, STYLE};
use crate::render::format::fmt_price;
use crate::render::pane::pane_html;
use crate::watchlist::Section;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardMode {
    Static,
    Server,
}

pub fn tab_html(stock: &ScreenedStock, active: bool) -> String {
    tab_markup(stock, active, None)
}

pub(crate) fn tab_markup(stock: &ScreenedStock, active: bool, href: Option<&str>) -> String {
    let grade = stock.analysis.scorecard.grade;
    let price = stock
        .analysis
        .key_metrics
        .current_price
        .map(|p| format!(r#"<span class="price-sm">{}</span>"#, fmt_price(p)))
        .unwrap_or_default();
    let class = if active { "tab-btn active" } else { "tab-btn" };
    let inner = format!(
        r#"<span class="ticker-name">{}</span>{price}<span class="grade-badge" style="background:{}">{}</span>"#,
        text(stock.ticker()),
        grade.color(),
        grade.as_str(),
    );
    match href {
        Some(href) => format!(
            r#"<a class="{class}" data-ticker="{}" href="{}" target="pane">{inner}</a>"#,
            attr(stock.ticker()),
            attr(href)
        ),
        None => format!(
            r#"<button class="{class}" data-ticker="{}">{inner}<span class="del-btn" title="Remove">&times;</span></button>"#,
            attr(stock.ticker())
        ),
    }
}

fn group_id(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Tab list contents. With sections, tabs are grouped under collapsible
/// headers and stocks outside every section land in "Other".
pub(crate) fn tab_list<F>(stocks: &[ScreenedStock], sections: &[Section], tab: F) -> String
where
    F: Fn(&ScreenedStock, bool) -> String,
{
    let first = stocks.first().map(ScreenedStock::ticker);
    let is_first = |s: &ScreenedStock| Some(s.ticker()) == first;
    let mut out = String::new();
    if sections.is_empty() {
        for s in stocks {
            out.push_str(&tab(s, is_first(s)));
        }
        return out;
    }

    let mut assigned = HashSet::new();
    let group = |out: &mut String, name: &str, members: Vec<&ScreenedStock>| {
        let _ = write!(
            out,
            r#"<div class="group-header" data-group="{}"><span class="chevron">▼</span>{}<span class="count">{}</span></div><div class="group-body">"#,
            attr(&group_id(name)),
            text(name),
            members.len()
        );
        for s in members {
            out.push_str(&tab(s, is_first(s)));
        }
        out.push_str("</div>");
    };
    for section in sections {
        let members: Vec<&ScreenedStock> = section
            .tickers
            .iter()
            .filter_map(|t| stocks.iter().find(|s| s.ticker() == t.as_str()))
            .filter(|s| assigned.insert(s.ticker().to_string()))
            .collect();
        group(&mut out, &section.name, members);
    }
    let rest: Vec<&ScreenedStock> = stocks
        .iter()
        .filter(|s| !assigned.contains(s.ticker()))
        .collect();
    if !rest.is_empty() {
        group(&mut out, "Other", rest);
    }
    out
}

pub fn sidebar_html(stocks: &[ScreenedStock], sections: &[Section]) -> String {
    tab_list(stocks, sections, tab_html)
}

pub(crate) fn page_title(stocks: &[ScreenedStock]) -> String {
    match stocks {
        [only] => format!(
            "{} ({}) · Screener Dashboard",
            only.record.display_name(),
            only.ticker()
        ),
        _ => {
            let tickers: Vec<&str> = stocks.iter().map(ScreenedStock::ticker).collect();
            format!("{} · Screener Dashboard", tickers.join(" | "))
        }
    }
}

pub(crate) fn count_label(n: usize) -> String {
    format!("{n} stock{}", if n == 1 { "" } else { "s" })
}

pub fn render_dashboard(stocks: &[ScreenedStock], sections: &[Section], mode: DashboardMode) -> String {
    let tabs = sidebar_html(stocks, sections);
    let panes: String = stocks
        .iter()
        .enumerate()
        .map(|(i, s)| pane_html(s, i == 0))
        .collect();
    let hint = match mode {
        DashboardMode::Server => "Type a ticker or name, paste a list, ↑↓ to browse",
        DashboardMode::Static => "Static report: adding needs --serve",
    };
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
<div class="add-symbol">
<input type="text" id="add-symbol-input" placeholder="Add symbol..." autocomplete="off">
<div id="ac-dropdown" class="ac-dropdown"></div>
<div class="hint">{hint}</div>
</div>
</nav>
<div class="main-container">
{panes}
</div>
<script>var SERVER_MODE = {server};</script>
<script>{PANE_SCRIPT}</script>
<script>{DASHBOARD_SCRIPT}</script>
</body>
</html>
"#,
        title = text(&page_title(stocks)),
        count = count_label(stocks.len()),
        server = mode == DashboardMode::Server,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::{Analysis, Grade};
    use crate::domain::charts::ChartSet;
    use crate::domain::record::CompanyRecord;

    fn stock(ticker: &str, grade: Grade) -> ScreenedStock {
        let mut analysis = Analysis::default();
        analysis.scorecard.grade = grade;
        analysis.key_metrics.current_price = Some(1520.0);
        ScreenedStock {
            record: CompanyRecord::new(ticker),
            analysis,
            charts: ChartSet::default(),
        }
    }

    #[test]
    fn deleting_a_background_tab_keeps_the_visible_one_selected() {
        let script = &DASHBOARD_SCRIPT[DASHBOARD_SCRIPT.find("function deleteStock").unwrap()..];
        let body = &script[..script.find("function showAC").unwrap()];
        let remembered = body.find("current.dataset.ticker !== ticker").unwrap();
        let replaced = body.find(".tab-list').innerHTML = html").unwrap();
        let restore = body.find("switchTab(keep)").unwrap();
        assert!(remembered < restore && remembered < replaced);
        assert!(body[replaced..].contains("done();"));
    }

    #[test]
    fn tab_carries_price_and_grade() {
        let html = tab_html(&stock("TCS", Grade::APlus), true);
        assert!(html.starts_with(r#"<button class="tab-btn active" data-ticker="TCS">"#));
        assert!(html.contains("₹1,520"));
        assert!(html.contains(r#"style="background:#10B981">A+</span>"#));
        assert!(html.contains("del-btn"));
    }

    #[test]
    fn sections_group_tabs_and_collect_the_rest() {
        let stocks = vec![
            stock("TCS", Grade::A),
            stock("HDFCBANK", Grade::B),
            stock("ITC", Grade::C),
        ];
        let sections = vec![
            Section {
                name: "Nifty IT".into(),
                tickers: vec!["TCS".into(), "INFY".into()],
            },
            Section {
                name: "Banks".into(),
                tickers: vec!["HDFCBANK".into()],
            },
        ];
        let html = sidebar_html(&stocks, &sections);
        assert!(html.contains(r#"data-group="niftyit""#));
        assert!(html.contains(r#"<span class="count">1</span>"#));
        let other = html.find("Other").unwrap();
        assert!(html[other..].contains(r#"data-ticker="ITC""#));
        assert!(!html[other..].contains(r#"data-ticker="TCS""#));
    }

    #[test]
    fn mode_is_embedded_for_the_script() {
        let stocks = vec![stock("TCS", Grade::A)];
        let served = render_dashboard(&stocks, &[], DashboardMode::Server);
        assert!(served.contains("var SERVER_MODE = true;"));
        let written = render_dashboard(&stocks, &[], DashboardMode::Static);
        assert!(written.contains("var SERVER_MODE = false;"));
        assert!(written.contains("<title>TCS (TCS) · Screener Dashboard</title>"));
    }

    #[test]
    fn empty_dashboard_still_renders() {
        let html = render_dashboard(&[], &[], DashboardMode::Server);
        assert!(html.contains("0 stocks"));
        assert!(html.contains(r#"<div class="tab-list"></div>"#));
    }
}
