use std::fmt::Write as _;

use serde::Serialize;

use crate::domain::record::FinancialTable;
use crate::render::format::fmt_indian;
use crate::scoring::metrics::parse_number;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IncomeStatement {
    pub period: String,
    pub is_bank: bool,
    pub sales: f64,
    pub expenses: f64,
    pub operating_profit: f64,
    pub other_income: f64,
    pub interest: f64,
    pub depreciation: f64,
    pub pbt: f64,
    pub tax_amount: f64,
    pub net_profit: f64,
    pub minority_interest: f64,
    pub opm: f64,
    pub npm: f64,
}

struct Column<'a> {
    table: &'a FinancialTable,
    idx: usize,
}

impl Column<'_> {
    fn value(&self, needle: &str) -> f64 {
        self.table
            .find_row(needle)
            .and_then(|r| r.values.get(self.idx))
            .and_then(|v| parse_number(v))
            .unwrap_or(0.0)
    }

    fn exact(&self, label: &str) -> f64 {
        self.table
            .find_row_exact(label)
            .and_then(|r| r.values.get(self.idx))
            .and_then(|v| parse_number(v))
            .unwrap_or(0.0)
    }

    fn has(&self, pred: impl Fn(&str) -> bool) -> bool {
        self.table.rows.iter().any(|r| pred(&r.label.to_lowercase()))
    }
}

fn share(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// Latest column of an annual P&L table. `None` without periods.
///
/// Banks and NBFCs report revenue and financing profit instead of sales and
/// operating profit; their operating line is net interest income plus other
/// income less operating expenses.
pub fn latest_income(table: &FinancialTable) -> Option<IncomeStatement> {
    let idx = table.periods.len().checked_sub(1)?;
    let col = Column { table, idx };

    let has_sales = col.has(|l| l.contains("sales"));
    let has_revenue = col.has(|l| l.contains("revenue") && !l.contains("sales"));
    let has_financing = col.has(|l| l.contains("financing"));
    let is_bank = (has_revenue && !has_sales) || has_financing;

    let other_income = col.value("Other Income");
    let depreciation = col.value("Depreciation");
    let pbt = col.value("Profit before tax");
    let tax_pct = col.exact("Tax %");
    let net_profit = col.value("Net Profit");
    let interest = col.exact("Interest");
    let mut expenses = col.value("Expenses");

    let (sales, operating_profit) = if is_bank {
        let revenue = col.value("Revenue");
        let nii = revenue - interest;
        (revenue + other_income, nii + other_income - expenses)
    } else {
        let sales = col.value("Sales");
        let mut op = col.value("Operating Profit");
        if op == 0.0 && sales > 0.0 && expenses > 0.0 {
            op = sales - expenses;
        }
        if expenses == 0.0 && sales > 0.0 && op > 0.0 {
            expenses = sales - op;
        }
        (sales, op)
    };

    let tax_amount = if pbt > 0.0 && tax_pct > 0.0 {
        pbt * tax_pct / 100.0
    } else if pbt > 0.0 && net_profit > 0.0 {
        pbt - net_profit
    } else {
        0.0
    };

    let mut minority_interest = 0.0;
    if pbt > 0.0 && net_profit > 0.0 {
        let implied = pbt - tax_amount;
        if (implied - net_profit).abs() > 1.0 {
            minority_interest = implied - net_profit;
        }
    }

    Some(IncomeStatement {
        period: table.periods[idx].clone(),
        is_bank,
        sales,
        expenses,
        operating_profit,
        other_income,
        interest,
        depreciation,
        pbt,
        tax_amount,
        net_profit,
        minority_interest,
        opm: share(operating_profit, sales),
        npm: share(net_profit, sales),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaterfallStep {
    pub label: &'static str,
    /// Signed: deductions are negative.
    pub value: f64,
    pub subtotal: bool,
}

pub fn waterfall(s: &IncomeStatement) -> Vec<WaterfallStep> {
    let step = |label, value, subtotal| WaterfallStep {
        label,
        value,
        subtotal,
    };
    let mut steps = vec![
        step("Revenue", s.sales, false),
        step("Operating Expenses", -s.expenses, false),
        step("Operating Profit (EBITDA)", s.operating_profit, true),
        step("Depreciation", -s.depreciation, false),
        step("Interest", -s.interest, false),
        step("Other Income", s.other_income, false),
        step("Profit Before Tax", s.pbt, true),
        step("Tax", -s.tax_amount, false),
    ];
    if s.minority_interest.abs() > 1.0 {
        steps.push(step("Minority Interest", -s.minority_interest, false));
    }
    steps.push(step("Net Profit (PAT)", s.net_profit, true));
    steps
}

pub fn waterfall_html(s: &IncomeStatement) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<div class="waterfall"><div class="waterfall-head">Income flow · {}</div>"#,
        html_escape::encode_text(&s.period)
    );
    for step in waterfall(s) {
        let pct = share(step.value.abs(), s.sales);
        let width = (pct * 2.0).min(100.0);
        let (color, sign) = if step.value >= 0.0 {
            ("#16A34A", "")
        } else {
            ("#DC2626", "-")
        };
        let class = if step.subtotal {
            "waterfall-row total"
        } else {
            "waterfall-row"
        };
        let _ = write!(
            out,
            r#"<div class="{class}"><span class="wf-label">{label}</span><span class="wf-value" style="color:{color}">{sign}₹{amount} Cr</span><span class="wf-pct">{pct:.1}%</span><span class="wf-bar"><div style="width:{width:.1}%;background:{color}"></div></span></div>"#,
            label = step.label,
            amount = fmt_indian(step.value.abs()),
        );
    }
    out.push_str("</div>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::TableRow;

    fn table(rows: &[(&str, &str)]) -> FinancialTable {
        FinancialTable {
            periods: vec!["Mar 2023".into(), "Mar 2024".into()],
            rows: rows
                .iter()
                .map(|(label, v)| TableRow {
                    label: label.to_string(),
                    values: vec!["0".into(), v.to_string()],
                })
                .collect(),
        }
    }

    #[test]
    fn manufacturer_income_statement() {
        let t = table(&[
            ("Sales", "1,000"),
            ("Expenses", "800"),
            ("Operating Profit", "200"),
            ("OPM %", "20%"),
            ("Other Income", "20"),
            ("Interest", "10"),
            ("Depreciation", "30"),
            ("Profit before tax", "180"),
            ("Tax %", "25%"),
            ("Net Profit", "135"),
        ]);
        let s = latest_income(&t).unwrap();
        assert_eq!(s.period, "Mar 2024");
        assert!(!s.is_bank);
        assert_eq!(s.tax_amount, 45.0);
        assert_eq!(s.minority_interest, 0.0);
        assert_eq!(s.opm, 20.0);

        let labels: Vec<_> = waterfall(&s).iter().map(|w| w.label).collect();
        assert_eq!(labels.first(), Some(&"Revenue"));
        assert_eq!(labels.last(), Some(&"Net Profit (PAT)"));
        assert!(!labels.contains(&"Minority Interest"));
    }

    #[test]
    fn missing_operating_profit_is_derived() {
        let t = table(&[("Sales", "500"), ("Expenses", "400")]);
        let s = latest_income(&t).unwrap();
        assert_eq!(s.operating_profit, 100.0);
    }

    #[test]
    fn minority_interest_shows_up_in_the_waterfall() {
        let t = table(&[
            ("Sales", "1000"),
            ("Profit before tax", "200"),
            ("Tax %", "25%"),
            ("Net Profit", "140"),
        ]);
        let s = latest_income(&t).unwrap();
        assert_eq!(s.minority_interest, 10.0);
        assert!(waterfall(&s).iter().any(|w| w.label == "Minority Interest" && w.value == -10.0));
    }

    #[test]
    fn bank_uses_revenue_and_interest_paid() {
        let t = table(&[
            ("Revenue", "1000"),
            ("Interest", "600"),
            ("Expenses", "200"),
            ("Financing Profit", "200"),
            ("Other Income", "100"),
            ("Net Profit", "150"),
        ]);
        let s = latest_income(&t).unwrap();
        assert!(s.is_bank);
        assert_eq!(s.sales, 1100.0);
        assert_eq!(s.operating_profit, 300.0);
    }

    #[test]
    fn html_lists_every_step() {
        let t = table(&[("Sales", "1000"), ("Expenses", "700"), ("Net Profit", "200")]);
        let html = waterfall_html(&latest_income(&t).unwrap());
        assert!(html.contains("Income flow · Mar 2024"));
        assert!(html.contains("-₹700 Cr"));
        assert!(html.contains("waterfall-row total"));
        assert!(latest_income(&FinancialTable::default()).is_none());
    }
}
