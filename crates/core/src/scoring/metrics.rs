use crate::domain::record::FinancialTable;

/// Parses a scraped cell such as `"1,23,456"`, `"18.4 %"` or `"₹ 2,110"`.
///
/// Blank cells, dashes and `N/A` are missing rather than zero.
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, ',' | '%' | '₹') && !c.is_whitespace())
        .collect();

    match cleaned.as_str() {
        "" | "-" | "—" | "N/A" | "NA" => None,
        s => s.parse::<f64>().ok().filter(|v| v.is_finite()),
    }
}

/// Last `n` numeric values of the first row whose label contains `label`.
/// Missing cells count as zero, matching how the site renders them.
pub fn row_values(table: &FinancialTable, label: &str, n: usize) -> Vec<f64> {
    table
        .find_row(label)
        .map(|row| tail_numbers(&row.values, n))
        .unwrap_or_default()
}

pub fn exact_row_values(table: &FinancialTable, label: &str, n: usize) -> Vec<f64> {
    table
        .find_row_exact(label)
        .map(|row| tail_numbers(&row.values, n))
        .unwrap_or_default()
}

fn tail_numbers(values: &[String], n: usize) -> Vec<f64> {
    let start = values.len().saturating_sub(n);
    values[start..]
        .iter()
        .map(|v| parse_number(v).unwrap_or(0.0))
        .collect()
}

/// Compound annual growth in percent. `None` unless both ends and the span are positive.
pub fn cagr(start: f64, end: f64, years: f64) -> Option<f64> {
    if start <= 0.0 || end <= 0.0 || years <= 0.0 {
        return None;
    }
    Some(((end / start).powf(1.0 / years) - 1.0) * 100.0)
}

/// Period-over-period change in percent; zero when the base is not positive.
pub fn pct_change(prev: f64, cur: f64) -> f64 {
    if prev <= 0.0 {
        return 0.0;
    }
    (cur - prev) / prev * 100.0
}

pub fn changes(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| pct_change(w[0], w[1])).collect()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

pub fn last(values: &[f64]) -> f64 {
    values.last().copied().unwrap_or(0.0)
}

/// CAGR over `years` using the tail of a history; needs `years + 1` points.
pub fn history_cagr(values: &[f64], years: usize) -> Option<f64> {
    if values.len() < years + 1 {
        return None;
    }
    let start = values[values.len() - years - 1];
    cagr(start, last(values), years as f64)
}

pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::TableRow;

    #[test]
    fn parse_number_strips_formatting() {
        assert_eq!(parse_number("1,23,456"), Some(123456.0));
        assert_eq!(parse_number("18.4 %"), Some(18.4));
        assert_eq!(parse_number("₹ 2,110"), Some(2110.0));
        assert_eq!(parse_number("-12"), Some(-12.0));
    }

    #[test]
    fn parse_number_treats_placeholders_as_missing() {
        for s in ["", "  ", "-", "—", "N/A", "abc"] {
            assert_eq!(parse_number(s), None, "{s:?}");
        }
    }

    #[test]
    fn cagr_requires_positive_inputs() {
        assert_eq!(cagr(0.0, 10.0, 3.0), None);
        assert_eq!(cagr(10.0, -1.0, 3.0), None);
        assert_eq!(cagr(10.0, 20.0, 0.0), None);
        let v = cagr(100.0, 200.0, 1.0).unwrap();
        assert!((v - 100.0).abs() < 1e-9);
    }

    #[test]
    fn history_cagr_needs_enough_points() {
        assert_eq!(history_cagr(&[1.0, 2.0, 3.0], 3), None);
        let v = history_cagr(&[100.0, 1.0, 1.0, 121.0], 3).unwrap();
        assert!((v - 6.56).abs() < 0.01);
    }

    #[test]
    fn pct_change_ignores_non_positive_base() {
        assert_eq!(pct_change(0.0, 10.0), 0.0);
        assert_eq!(pct_change(-5.0, 10.0), 0.0);
        assert_eq!(pct_change(50.0, 75.0), 50.0);
        assert_eq!(changes(&[10.0, 20.0, 10.0]), vec![100.0, -50.0]);
    }

    #[test]
    fn row_values_takes_tail_and_zero_fills() {
        let table = FinancialTable {
            periods: vec!["a".into(), "b".into(), "c".into()],
            rows: vec![TableRow {
                label: "Net Profit".into(),
                values: vec!["1".into(), "".into(), "3".into()],
            }],
        };
        assert_eq!(row_values(&table, "profit", 2), vec![0.0, 3.0]);
        assert_eq!(row_values(&table, "profit", 10), vec![1.0, 0.0, 3.0]);
        assert!(exact_row_values(&table, "profit", 2).is_empty());
    }
}
