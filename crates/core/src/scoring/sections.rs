use crate::domain::analysis::{
    BalanceSheetHealth, CashFlowQuality, GrowthRates, KeyMetrics, MarginTrend, ProfitLossTrend,
    QuarterlyTrend, ShareholdingTrend, Trend,
};
use crate::domain::record::{CompanyRecord, FinancialTable};
use crate::scoring::metrics::{
    changes, exact_row_values, history_cagr, last, mean, parse_number, pct_change, row_values,
};

const ANNUAL_YEARS: usize = 12;
const QUARTERS: usize = 8;
const BALANCE_YEARS: usize = 5;

pub fn key_metrics(record: &CompanyRecord) -> KeyMetrics {
    let ratio = |name: &str| record.ratio(name).and_then(parse_number);

    let (high_52w, low_52w) = record
        .ratio("High / Low")
        .map(split_high_low)
        .unwrap_or((None, None));

    let current_price = ratio("Current Price");
    let book_value = ratio("Book Value");
    let pb = match (current_price, book_value) {
        (Some(p), Some(b)) if p > 0.0 && b > 0.0 => Some(p / b),
        _ => None,
    };

    KeyMetrics {
        market_cap: ratio("Market Cap"),
        current_price,
        pe: ratio("Stock P/E"),
        pb,
        book_value,
        div_yield: ratio("Dividend Yield"),
        roce: ratio("ROCE"),
        roe: ratio("ROE"),
        face_value: ratio("Face Value"),
        high_52w,
        low_52w,
    }
}

fn split_high_low(value: &str) -> (Option<f64>, Option<f64>) {
    let mut parts = value.split('/');
    let high = parts.next().and_then(parse_number);
    let low = parts.next().and_then(parse_number);
    (high, low)
}

pub fn growth_rates(record: &CompanyRecord) -> Vec<GrowthRates> {
    record
        .compounded_growth
        .iter()
        .map(|t| GrowthRates {
            category: t.category.clone(),
            rates: t
                .entries
                .iter()
                .map(|(period, value)| (period.clone(), parse_number(value)))
                .collect(),
        })
        .collect()
}

pub fn compounded(growth: &[GrowthRates], category: &str, period: &str) -> Option<f64> {
    let needle = format!("{} growth", category.to_lowercase());
    growth
        .iter()
        .find(|g| g.category.to_lowercase().contains(&needle))
        .and_then(|g| g.get(period))
}

pub fn profit_loss(table: &FinancialTable) -> Option<ProfitLossTrend> {
    if table.is_empty() {
        return None;
    }

    let mut is_bank = false;
    let mut sales = row_values(table, "Sales", ANNUAL_YEARS);
    if is_blank(&sales) {
        sales = exact_row_values(table, "Revenue", ANNUAL_YEARS);
        is_bank = !sales.is_empty();
    }
    if is_blank(&sales) {
        sales = row_values(table, "Total Income", ANNUAL_YEARS);
    }

    let profit = row_values(table, "Net Profit", ANNUAL_YEARS);
    let mut opm = row_values(table, "OPM", ANNUAL_YEARS);
    if is_blank(&opm) {
        opm = row_values(table, "Financing Margin", ANNUAL_YEARS);
    }
    let eps = row_values(table, "EPS", ANNUAL_YEARS);
    let interest = exact_row_values(table, "Interest", ANNUAL_YEARS);
    let depreciation = row_values(table, "Depreciation", ANNUAL_YEARS);
    let dividend_payout = row_values(table, "Dividend Payout", ANNUAL_YEARS);

    let sales_latest = last(&sales);
    let net_profit_latest = last(&profit);
    let npm_latest = if sales_latest > 0.0 {
        net_profit_latest / sales_latest * 100.0
    } else {
        0.0
    };

    let profit_yoy = changes(&profit);
    let profit_consistency = if profit_yoy.is_empty() {
        None
    } else {
        let positive = profit_yoy.iter().filter(|g| **g > 0.0).count();
        Some(positive as f64 / profit_yoy.len() as f64)
    };

    Some(ProfitLossTrend {
        is_bank,
        sales_latest,
        net_profit_latest,
        opm_latest: last(&opm),
        npm_latest,
        eps_latest: last(&eps),
        interest_latest: last(&interest),
        depreciation_latest: last(&depreciation),
        sales_yoy: changes(&sales),
        profit_yoy,
        sales_cagr_3y: history_cagr(&sales, 3),
        sales_cagr_5y: history_cagr(&sales, 5),
        profit_cagr_3y: history_cagr(&profit, 3),
        profit_cagr_5y: history_cagr(&profit, 5),
        margin_trend: margin_trend(&opm),
        profit_consistency,
        periods: table.last_periods(ANNUAL_YEARS).to_vec(),
        sales_history: sales,
        profit_history: profit,
        opm_history: opm,
        eps_history: eps,
        dividend_payout_history: dividend_payout,
    })
}

/// A missing row or one that is all zeros; the site fills absent cells with 0.
fn is_blank(values: &[f64]) -> bool {
    values.iter().all(|v| *v == 0.0)
}

/// Element-wise sum, or nothing when the rows cover different periods.
fn sum_aligned(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.len() != b.len() {
        return Vec::new();
    }
    a.iter().zip(b).map(|(x, y)| x + y).collect()
}

fn margin_trend(opm: &[f64]) -> MarginTrend {
    let n = opm.len();
    if n < 3 {
        return MarginTrend::Stable;
    }
    let recent = mean(&opm[n - 2..]).unwrap_or(0.0);
    let older = if n >= 4 {
        mean(&opm[n - 4..n - 2]).unwrap_or(0.0)
    } else {
        opm[0]
    };

    if recent > older + 2.0 {
        MarginTrend::Expanding
    } else if recent < older - 2.0 {
        MarginTrend::Contracting
    } else {
        MarginTrend::Stable
    }
}

pub fn quarterly(table: &FinancialTable) -> Option<QuarterlyTrend> {
    if table.is_empty() {
        return None;
    }

    let mut sales = row_values(table, "Sales", QUARTERS);
    if is_blank(&sales) {
        sales = exact_row_values(table, "Revenue", QUARTERS);
    }
    if is_blank(&sales) {
        sales = row_values(table, "Total Income", QUARTERS);
    }
    let profit = row_values(table, "Net Profit", QUARTERS);
    let mut opm = row_values(table, "OPM", QUARTERS);
    if is_blank(&opm) {
        opm = row_values(table, "Financing Margin", QUARTERS);
    }

    let n = opm.len();
    let improving_margins = n >= 4
        && mean(&opm[n - 2..]).unwrap_or(0.0) > mean(&opm[n - 4..n - 2]).unwrap_or(0.0);

    Some(QuarterlyTrend {
        sales_latest: last(&sales),
        profit_latest: last(&profit),
        opm_latest: last(&opm),
        sales_yoy: same_quarter_last_year(&sales),
        profit_yoy: same_quarter_last_year(&profit),
        sales_qoq: changes(&sales),
        profit_qoq: changes(&profit),
        improving_margins,
        periods: table.last_periods(QUARTERS).to_vec(),
        sales_history: sales,
        profit_history: profit,
        opm_history: opm,
    })
}

pub fn balance_sheet(table: &FinancialTable) -> Option<BalanceSheetHealth> {
    if table.is_empty() {
        return None;
    }

    let equity_capital = row_values(table, "Equity Capital", BALANCE_YEARS);
    let reserves = row_values(table, "Reserves", BALANCE_YEARS);
    let borrowings = row_values(table, "Borrowing", BALANCE_YEARS);
    let total_assets = row_values(table, "Total Assets", BALANCE_YEARS);
    let cwip = row_values(table, "CWIP", BALANCE_YEARS);
    let investments = row_values(table, "Investments", BALANCE_YEARS);

    let equity_history = if reserves.is_empty() {
        equity_capital.clone()
    } else if equity_capital.is_empty() {
        reserves.clone()
    } else {
        sum_aligned(&equity_capital, &reserves)
    };

    let shareholder_equity = last(&equity_capital) + last(&reserves);
    let borrowings_latest = last(&borrowings);
    let debt_to_equity = (shareholder_equity > 0.0).then(|| borrowings_latest / shareholder_equity);

    Some(BalanceSheetHealth {
        shareholder_equity,
        borrowings: borrowings_latest,
        total_assets: last(&total_assets),
        debt_to_equity,
        debt_trend: debt_trend(&borrowings),
        borrowings_history: borrowings,
        equity_history,
        cwip: last(&cwip),
        investments: last(&investments),
    })
}

fn same_quarter_last_year(values: &[f64]) -> Option<f64> {
    let n = values.len();
    (n >= 5).then(|| pct_change(values[n - 5], values[n - 1]))
}

/// Latest borrowing against the one two years earlier, with a 20% band.
fn debt_trend(borrowings: &[f64]) -> Trend {
    let n = borrowings.len();
    if n < 3 {
        return Trend::Stable;
    }
    let latest = borrowings[n - 1];
    let base = borrowings[n - 3];
    if latest > base * 1.2 {
        Trend::Increasing
    } else if latest < base * 0.8 {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

pub fn cash_flow(table: &FinancialTable) -> Option<CashFlowQuality> {
    if table.is_empty() {
        return None;
    }

    let cfo = row_values(table, "Operating Activity", BALANCE_YEARS);
    let cfi = row_values(table, "Investing Activity", BALANCE_YEARS);
    let cff = row_values(table, "Financing Activity", BALANCE_YEARS);

    let fcf = sum_aligned(&cfo, &cfi);
    let cfo_consistency = if cfo.is_empty() {
        0.0
    } else {
        cfo.iter().filter(|v| **v > 0.0).count() as f64 / cfo.len() as f64
    };

    Some(CashFlowQuality {
        cfo_latest: last(&cfo),
        cfi_latest: last(&cfi),
        cff_latest: last(&cff),
        fcf_latest: last(&fcf),
        cfo_consistency,
        fcf_positive_years: fcf.iter().filter(|v| **v > 0.0).count(),
        total_years: fcf.len(),
        cfo_history: cfo,
        fcf_history: fcf,
    })
}

pub fn shareholding(table: &FinancialTable) -> Option<ShareholdingTrend> {
    if table.is_empty() {
        return None;
    }

    let promoter = row_values(table, "Promoter", QUARTERS);
    let fii = row_values(table, "FII", QUARTERS);
    let dii = row_values(table, "DII", QUARTERS);
    let public = row_values(table, "Public", QUARTERS);
    let holders = row_values(table, "No. of Shareholders", QUARTERS);

    Some(ShareholdingTrend {
        promoter: last(&promoter),
        fii: last(&fii),
        dii: last(&dii),
        public: last(&public),
        promoter_trend: holding_trend(&promoter),
        fii_trend: holding_trend(&fii),
        dii_trend: holding_trend(&dii),
        num_shareholders: last(&holders),
        promoter_history: promoter,
        fii_history: fii,
        dii_history: dii,
        public_history: public,
        periods: table.last_periods(QUARTERS).to_vec(),
    })
}

/// Direction over the last four quarters; moves within half a point are flat.
fn holding_trend(values: &[f64]) -> Trend {
    if values.len() < 4 {
        return Trend::InsufficientData;
    }
    let window = &values[values.len() - 4..];
    let (first, latest) = (window[0], window[3]);
    if latest > first + 0.5 {
        Trend::Increasing
    } else if latest < first - 0.5 {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::{GrowthTable, TableRow};

    fn table(periods: usize, rows: &[(&str, &[f64])]) -> FinancialTable {
        FinancialTable {
            periods: (0..periods).map(|i| format!("P{i}")).collect(),
            rows: rows
                .iter()
                .map(|(label, values)| TableRow {
                    label: label.to_string(),
                    values: values.iter().map(|v| v.to_string()).collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn key_metrics_split_high_low_and_derive_pb() {
        let mut record = CompanyRecord::new("X");
        record.top_ratios.insert("High / Low".into(), "2,000/1,200".into());
        record.top_ratios.insert("Current Price".into(), "1,800".into());
        record.top_ratios.insert("Book Value".into(), "400".into());
        let m = key_metrics(&record);
        assert_eq!(m.high_52w, Some(2000.0));
        assert_eq!(m.low_52w, Some(1200.0));
        assert_eq!(m.pb, Some(4.5));
        assert_eq!(m.pe, None);
    }

    #[test]
    fn bank_revenue_fallback_marks_bank() {
        let t = table(3, &[("Revenue", &[10.0, 20.0, 30.0]), ("Financing Margin %", &[5.0, 6.0, 7.0])]);
        let pl = profit_loss(&t).unwrap();
        assert!(pl.is_bank);
        assert_eq!(pl.sales_latest, 30.0);
        assert_eq!(pl.opm_latest, 7.0);
    }

    #[test]
    fn blank_sales_row_falls_back_to_revenue() {
        let mut t = table(4, &[("Revenue", &[100.0, 120.0, 140.0, 160.0]), ("OPM %", &[0.0; 4]), ("Financing Margin %", &[30.0; 4])]);
        t.rows.insert(
            0,
            TableRow {
                label: "Sales".into(),
                values: vec![String::new(); 4],
            },
        );
        let pl = profit_loss(&t).unwrap();
        assert!(pl.is_bank);
        assert_eq!(pl.sales_latest, 160.0);
        assert!(pl.sales_cagr_3y.unwrap() > 16.0);
        assert_eq!(pl.opm_latest, 30.0);
    }

    #[test]
    fn quarterly_bank_layouts_find_their_top_line() {
        let revenue = table(5, &[("Gross Revenue", &[1.0; 5]), ("Revenue", &[200.0, 1.0, 1.0, 1.0, 300.0])]);
        assert_eq!(quarterly(&revenue).unwrap().sales_yoy, Some(50.0));

        let total_income = table(5, &[("Sales", &[0.0; 5]), ("Total Income", &[100.0, 100.0, 100.0, 100.0, 150.0])]);
        let q = quarterly(&total_income).unwrap();
        assert_eq!(q.sales_latest, 150.0);
        assert_eq!(q.sales_yoy, Some(50.0));
    }

    #[test]
    fn rows_of_different_lengths_are_not_paired() {
        let cf = table(
            5,
            &[("Cash from Operating Activity", &[100.0, 100.0, 100.0, 100.0, -500.0]), ("Cash from Investing Activity", &[-50.0, -50.0, -50.0])],
        );
        let cf = cash_flow(&cf).unwrap();
        assert!(cf.fcf_history.is_empty());
        assert_eq!(cf.fcf_latest, 0.0);
        assert_eq!(cf.fcf_positive_years, 0);

        let bs = table(5, &[("Equity Capital", &[10.0; 5]), ("Reserves", &[-40.0, -40.0])]);
        let bs = balance_sheet(&bs).unwrap();
        assert!(bs.equity_history.is_empty());
        assert_eq!(bs.shareholder_equity, -30.0);
        assert_eq!(bs.debt_to_equity, None);
    }

    #[test]
    fn margin_trend_uses_two_year_windows() {
        assert_eq!(margin_trend(&[10.0, 10.0, 14.0, 14.0]), MarginTrend::Expanding);
        assert_eq!(margin_trend(&[14.0, 14.0, 10.0, 10.0]), MarginTrend::Contracting);
        assert_eq!(margin_trend(&[10.0, 11.0, 11.0]), MarginTrend::Stable);
        assert_eq!(margin_trend(&[10.0, 30.0]), MarginTrend::Stable);
    }

    #[test]
    fn profit_consistency_counts_positive_years() {
        let t = table(5, &[("Sales", &[1.0; 5]), ("Net Profit", &[10.0, 12.0, 11.0, 13.0, 14.0])]);
        let pl = profit_loss(&t).unwrap();
        assert_eq!(pl.profit_consistency, Some(0.75));
    }

    #[test]
    fn quarterly_yoy_compares_same_quarter() {
        let t = table(
            5,
            &[("Sales", &[100.0, 1.0, 1.0, 1.0, 150.0]), ("Net Profit", &[10.0, 1.0, 1.0, 1.0, 5.0])],
        );
        let q = quarterly(&t).unwrap();
        assert_eq!(q.sales_yoy, Some(50.0));
        assert_eq!(q.profit_yoy, Some(-50.0));
        assert!(!q.improving_margins);
    }

    #[test]
    fn negative_equity_leaves_debt_to_equity_missing() {
        let t = table(
            3,
            &[("Equity Capital", &[10.0; 3]), ("Reserves", &[-50.0; 3]), ("Borrowings", &[100.0, 150.0, 200.0])],
        );
        let bs = balance_sheet(&t).unwrap();
        assert_eq!(bs.debt_to_equity, None);
        assert_eq!(bs.debt_trend, Trend::Increasing);
    }

    #[test]
    fn cash_flow_derives_free_cash_flow() {
        let t = table(
            3,
            &[("Cash from Operating Activity", &[100.0, -10.0, 120.0]), ("Cash from Investing Activity", &[-50.0, -20.0, -200.0])],
        );
        let cf = cash_flow(&t).unwrap();
        assert_eq!(cf.fcf_history, vec![50.0, -30.0, -80.0]);
        assert_eq!(cf.fcf_positive_years, 1);
        assert!((cf.cfo_consistency - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn holding_trend_needs_four_quarters() {
        assert_eq!(holding_trend(&[1.0, 2.0, 3.0]), Trend::InsufficientData);
        assert_eq!(holding_trend(&[50.0, 50.0, 50.2, 50.4]), Trend::Stable);
        assert_eq!(holding_trend(&[9.0, 40.0, 41.0, 41.0, 42.0]), Trend::Increasing);
        assert_eq!(holding_trend(&[45.0, 44.0, 43.0, 44.4]), Trend::Decreasing);
    }

    #[test]
    fn compounded_lookup_matches_category() {
        let mut record = CompanyRecord::new("X");
        record.compounded_growth.push(GrowthTable {
            category: "Compounded Sales Growth".into(),
            entries: vec![("3 Years".into(), "14%".into()), ("TTM".into(), "".into())],
        });
        let growth = growth_rates(&record);
        assert_eq!(compounded(&growth, "Sales", "3 Years"), Some(14.0));
        assert_eq!(compounded(&growth, "Sales", "TTM"), None);
        assert_eq!(compounded(&growth, "Profit", "3 Years"), None);
    }
}
