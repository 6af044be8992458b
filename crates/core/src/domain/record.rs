use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw company data as scraped from one company page plus its side APIs.
///
/// Every field defaults when absent, so partially populated records are valid
/// scoring input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyRecord {
    pub ticker: String,
    pub company_name: String,
    pub is_consolidated: bool,
    pub company_id: Option<String>,
    pub url: String,
    pub fetched_at: DateTime<Utc>,
    pub about: String,
    pub top_ratios: BTreeMap<String, String>,
    pub pros_cons: ProsCons,
    pub compounded_growth: Vec<GrowthTable>,
    pub profit_loss: FinancialTable,
    pub quarterly: FinancialTable,
    pub balance_sheet: FinancialTable,
    pub cash_flow: FinancialTable,
    pub ratios: FinancialTable,
    pub shareholding: FinancialTable,
    pub peers: PeerTable,
    pub documents: Documents,
    pub segments: Vec<String>,
    pub expense_breakdown: Vec<ExpenseShare>,
}

impl CompanyRecord {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            ..Default::default()
        }
    }

    pub fn ratio(&self, name: &str) -> Option<&str> {
        self.top_ratios.get(name).map(String::as_str)
    }

    pub fn display_name(&self) -> &str {
        if self.company_name.trim().is_empty() {
            &self.ticker
        } else {
            &self.company_name
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProsCons {
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthTable {
    pub category: String,
    pub entries: Vec<(String, String)>,
}

impl GrowthTable {
    pub fn get(&self, period: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == period)
            .map(|(_, v)| v.as_str())
    }
}

/// A period-by-row table such as the annual P&L. Cells stay as scraped text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialTable {
    pub periods: Vec<String>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableRow {
    pub label: String,
    pub values: Vec<String>,
}

impl FinancialTable {
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// First row whose label contains `needle`, ignoring case.
    pub fn find_row(&self, needle: &str) -> Option<&TableRow> {
        let needle = needle.to_lowercase();
        self.rows
            .iter()
            .find(|r| r.label.to_lowercase().contains(&needle))
    }

    pub fn find_row_exact(&self, label: &str) -> Option<&TableRow> {
        let label = label.trim().to_lowercase();
        self.rows
            .iter()
            .find(|r| r.label.trim().to_lowercase() == label)
    }

    pub fn last_periods(&self, n: usize) -> &[String] {
        let start = self.periods.len().saturating_sub(n);
        &self.periods[start..]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeerTable {
    pub headers: Vec<String>,
    pub rows: Vec<PeerRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeerRow {
    pub ticker: Option<String>,
    pub cells: Vec<String>,
}

impl PeerTable {
    pub fn column(&self, header_contains: &str) -> Option<usize> {
        let needle = header_contains.to_lowercase();
        self.headers
            .iter()
            .position(|h| h.to_lowercase().contains(&needle))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Documents {
    pub annual_reports: Vec<DocumentLink>,
    pub concalls: Vec<DocumentLink>,
    pub filings: Vec<DocumentLink>,
}

impl Documents {
    pub fn is_empty(&self) -> bool {
        self.annual_reports.is_empty() && self.concalls.is_empty() && self.filings.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentLink {
    pub text: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpenseShare {
    pub name: String,
    pub pct: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table() -> FinancialTable {
        FinancialTable {
            periods: vec!["Mar 2023".into(), "Mar 2024".into()],
            rows: vec![
                TableRow {
                    label: "Sales".into(),
                    values: vec!["100".into(), "120".into()],
                },
                TableRow {
                    label: "Net Profit".into(),
                    values: vec!["10".into(), "12".into()],
                },
                TableRow {
                    label: "Interest".into(),
                    values: vec!["1".into(), "2".into()],
                },
            ],
        }
    }

    #[test]
    fn find_row_matches_substring_case_insensitively() {
        let t = table();
        assert_eq!(t.find_row("net profit").map(|r| r.label.as_str()), Some("Net Profit"));
        assert_eq!(t.find_row("PROFIT").map(|r| r.label.as_str()), Some("Net Profit"));
        assert!(t.find_row("Borrowings").is_none());
    }

    #[test]
    fn find_row_exact_ignores_partial_matches() {
        let t = table();
        assert!(t.find_row_exact("Inter").is_none());
        assert_eq!(t.find_row_exact(" interest ").map(|r| r.values.len()), Some(2));
    }

    #[test]
    fn deserializes_partial_record_with_defaults() {
        let v = json!({
            "ticker": "TCS",
            "top_ratios": {"Stock P/E": "28.1"}
        });
        let record: CompanyRecord = serde_json::from_value(v).unwrap();
        assert_eq!(record.ticker, "TCS");
        assert_eq!(record.ratio("Stock P/E"), Some("28.1"));
        assert!(record.profit_loss.is_empty());
        assert_eq!(record.display_name(), "TCS");
    }

    #[test]
    fn last_periods_saturates() {
        let t = table();
        assert_eq!(t.last_periods(8).len(), 2);
        assert_eq!(t.last_periods(1), &["Mar 2024".to_string()]);
    }
}
