//! HTML and JSON parsing for the company page and its side APIs.
//!
//! Parsing never fails: a missing element yields an empty section.

use chrono::{DateTime, Utc};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::domain::record::{
    CompanyRecord, DocumentLink, Documents, ExpenseShare, FinancialTable, GrowthTable, PeerRow,
    PeerTable, ProsCons, TableRow,
};
use crate::ingest::types::SearchHit;
use crate::scoring::metrics::parse_number;

const DOCUMENT_TEXT_LIMIT: usize = 200;
const FILINGS_LIMIT: usize = 10;
pub const SEARCH_LIMIT: usize = 10;

static COMPANY_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/company/([^/]+)/").expect("company link pattern"));
static COMPANY_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/api/company/(\d+)/").expect("company id pattern"));

const SEGMENT_SKIP: [&str; 5] = [
    "Sales",
    "Less: Intersegment",
    "Unallocated",
    "Reconciling Items",
    "Reconciline Items",
];

fn select_all<'a>(root: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(sel) => root.select(&sel).collect(),
        Err(_) => Vec::new(),
    }
}

fn select_first<'a>(root: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let sel = Selector::parse(css).ok()?;
    root.select(&sel).next()
}

/// Text nodes trimmed and concatenated, as the site's markup splits numbers
/// and units across nodes.
fn text_of(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("")
}

fn prose_of(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn cells_of(row: ElementRef<'_>) -> Vec<String> {
    select_all(row, "th, td").into_iter().map(text_of).collect()
}

fn ticker_from_href(href: &str) -> Option<String> {
    COMPANY_LINK
        .captures(href)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn extract_company_id(html: &str) -> Option<String> {
    COMPANY_ID
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn parse_company_page(
    html: &str,
    ticker: &str,
    url: &str,
    fetched_at: DateTime<Utc>,
) -> CompanyRecord {
    let doc = Html::parse_document(html);
    let root = doc.root_element();

    CompanyRecord {
        ticker: ticker.to_uppercase(),
        company_name: select_first(root, "h1").map(text_of).unwrap_or_default(),
        is_consolidated: url.contains("consolidated"),
        company_id: extract_company_id(html),
        url: url.to_string(),
        fetched_at,
        about: parse_about(root),
        top_ratios: parse_top_ratios(root),
        pros_cons: parse_pros_cons(root),
        compounded_growth: parse_compounded_growth(root),
        profit_loss: parse_table_section(root, "profit-loss"),
        quarterly: parse_table_section(root, "quarters"),
        balance_sheet: parse_table_section(root, "balance-sheet"),
        cash_flow: parse_table_section(root, "cash-flow"),
        ratios: parse_table_section(root, "ratios"),
        shareholding: parse_table_section(root, "shareholding"),
        peers: parse_peers(root),
        documents: parse_documents(root),
        segments: Vec::new(),
        expense_breakdown: Vec::new(),
    }
}

pub fn has_profit_loss(html: &str) -> bool {
    let doc = Html::parse_document(html);
    !parse_table_section(doc.root_element(), "profit-loss").is_empty()
}

fn parse_about(root: ElementRef<'_>) -> String {
    let Some(about) = select_first(root, "div.about") else {
        return String::new();
    };
    select_all(about, "p, div")
        .into_iter()
        .map(prose_of)
        .find(|t| t.chars().count() > 40 && !t.contains("Key Points") && !t.contains("Market Cap"))
        .unwrap_or_default()
}

fn parse_top_ratios(root: ElementRef<'_>) -> BTreeMap<String, String> {
    let mut ratios = BTreeMap::new();

    for li in select_all(root, ".company-ratios li") {
        let spans = select_all(li, "span");
        let name = match select_first(li, "span.name") {
            Some(el) => text_of(el),
            None => spans.first().map(|s| text_of(*s)).unwrap_or_default(),
        };
        if name.is_empty() {
            continue;
        }
        let numbers = select_all(li, "span.number");
        let value = if numbers.is_empty() {
            spans.get(1).map(|s| text_of(*s)).unwrap_or_default()
        } else {
            numbers.into_iter().map(text_of).collect::<Vec<_>>().join("/")
        };
        ratios.insert(name, value);
    }

    if ratios.is_empty() {
        for li in select_all(root, "#top-ratios li") {
            let numbers = select_all(li, "span.number");
            if let (Some(name), false) = (select_first(li, "span.name"), numbers.is_empty()) {
                let value = numbers.into_iter().map(text_of).collect::<Vec<_>>().join("/");
                ratios.insert(text_of(name), value);
            }
        }
    }

    ratios
}

fn parse_pros_cons(root: ElementRef<'_>) -> ProsCons {
    let list = |css: &str| -> Vec<String> {
        select_first(root, css)
            .map(|div| {
                select_all(div, "li")
                    .into_iter()
                    .map(prose_of)
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    };
    ProsCons {
        pros: list("div.pros"),
        cons: list("div.cons"),
    }
}

fn parse_compounded_growth(root: ElementRef<'_>) -> Vec<GrowthTable> {
    let mut out = Vec::new();
    for table in select_all(root, "table.ranges-table") {
        let rows = select_all(table, "tr");
        let Some(first) = rows.first() else { continue };
        let Some(category) = cells_of(*first).into_iter().next() else {
            continue;
        };

        let entries: Vec<(String, String)> = rows[1..]
            .iter()
            .map(|r| cells_of(*r))
            .filter(|cells| cells.len() >= 2)
            .map(|cells| (cells[0].trim_end_matches(':').to_string(), cells[1].clone()))
            .collect();

        if !entries.is_empty() {
            out.push(GrowthTable { category, entries });
        }
    }
    out
}

fn parse_table_section(root: ElementRef<'_>, section_id: &str) -> FinancialTable {
    let Some(table) = select_first(root, &format!("section#{section_id} table")) else {
        return FinancialTable::default();
    };
    let rows = select_all(table, "tr");
    let Some(header) = rows.first() else {
        return FinancialTable::default();
    };

    let periods = cells_of(*header)
        .into_iter()
        .skip(1)
        .filter(|p| !p.is_empty())
        .collect();

    let rows = rows[1..]
        .iter()
        .filter_map(|r| {
            let mut cells = cells_of(*r).into_iter();
            let label = cells.next()?.trim_end_matches('+').trim().to_string();
            if label.is_empty() {
                return None;
            }
            Some(TableRow {
                label,
                values: cells.collect(),
            })
        })
        .collect();

    FinancialTable { periods, rows }
}

fn parse_peers(root: ElementRef<'_>) -> PeerTable {
    let Some(table) = select_first(root, "section#peers table") else {
        return PeerTable::default();
    };
    let rows = select_all(table, "tr");
    let Some(header) = rows.first() else {
        return PeerTable::default();
    };

    let headers = cells_of(*header);
    let rows = rows[1..]
        .iter()
        .filter_map(|r| {
            let cells = cells_of(*r);
            if cells.len() < 2 {
                return None;
            }
            let ticker = select_first(*r, "a[href]")
                .and_then(|a| a.value().attr("href"))
                .and_then(ticker_from_href);
            Some(PeerRow { ticker, cells })
        })
        .collect();

    PeerTable { headers, rows }
}

fn parse_documents(root: ElementRef<'_>) -> Documents {
    let Some(section) = select_first(root, "section#documents") else {
        return Documents::default();
    };

    let mut docs = Documents::default();
    for li in select_all(section, "li") {
        let text = prose_of(li);
        let url = select_first(li, "a[href]")
            .and_then(|a| a.value().attr("href"))
            .unwrap_or_default()
            .to_string();
        let lower = text.to_lowercase();
        let link = DocumentLink {
            text: text.chars().take(DOCUMENT_TEXT_LIMIT).collect(),
            url,
        };

        if lower.contains("financial year") || lower.contains("annual report") {
            docs.annual_reports.push(link);
        } else if ["concall", "conference call", "transcript", "investor", "analyst"]
            .iter()
            .any(|k| lower.contains(k))
        {
            docs.concalls.push(link);
        } else if docs.filings.len() < FILINGS_LIMIT {
            docs.filings.push(link);
        }
    }
    docs
}

pub fn parse_segments(html: &str) -> Vec<String> {
    let doc = Html::parse_fragment(html);
    let root = doc.root_element();
    let Some(table) = select_first(root, r#"tbody[data-segment-line="Sales"] table"#) else {
        return Vec::new();
    };

    select_all(table, "tr")
        .into_iter()
        .filter_map(|tr| select_all(tr, "td").into_iter().next().map(text_of))
        .filter(|name| !name.is_empty() && !SEGMENT_SKIP.contains(&name.as_str()))
        .collect()
}

pub fn parse_expense_breakdown(json: &Value) -> Vec<ExpenseShare> {
    let Some(obj) = json.as_object() else {
        return Vec::new();
    };

    obj.iter()
        .filter_map(|(key, val)| {
            let series = val.as_object()?;
            let (_, latest) = series.iter().filter(|(k, _)| *k != "isExpandable").last()?;
            let pct = match latest {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => parse_number(s),
                _ => None,
            }?;
            (pct > 0.0).then(|| ExpenseShare {
                name: key.replace(" %", "").trim().to_string(),
                pct,
            })
        })
        .collect()
}

#[derive(Debug, serde::Deserialize)]
struct RawSearchHit {
    #[serde(default)]
    name: String,
    #[serde(default)]
    url: String,
}

pub fn parse_search_results(json: &Value) -> Vec<SearchHit> {
    let hits: Vec<RawSearchHit> = serde_json::from_value(json.clone()).unwrap_or_default();
    hits.into_iter()
        .filter(|h| !h.name.trim().is_empty())
        .take(SEARCH_LIMIT)
        .map(|h| {
            let ticker = ticker_from_href(&h.url)
                .unwrap_or_else(|| h.name.clone())
                .to_uppercase();
            SearchHit {
                ticker,
                name: h.name.trim().to_string(),
            }
        })
        .collect()
}
