use chrono::{Days, NaiveDate, TimeZone, Utc};
use screener_core::domain::record::{CompanyRecord, FinancialTable, TableRow};
use screener_core::domain::ScreenedStock;
use screener_core::ingest::types::{PriceBar, PriceHistory};
use screener_core::render::{
    build_chart_set, pane_html, render_dashboard, render_report, render_site, DashboardMode,
    ReportMode,
};
use screener_core::scoring::analyze;
use screener_core::watchlist::Section;

fn table(periods: &[&str], rows: &[(&str, &[f64])]) -> FinancialTable {
    FinancialTable {
        periods: periods.iter().map(|p| p.to_string()).collect(),
        rows: rows
            .iter()
            .map(|(label, values)| TableRow {
                label: label.to_string(),
                values: values.iter().map(|v| v.to_string()).collect(),
            })
            .collect(),
    }
}

fn prices() -> PriceHistory {
    let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
    let bars = (0..900u64)
        .map(|i| {
            let close = 500.0 + (i % 40) as f64 * 3.0 + i as f64 * 0.5;
            PriceBar {
                date: start + Days::new(i),
                open: close - 2.0,
                high: close + 5.0,
                low: close - 5.0,
                close,
                volume: 10_000.0 + (i % 7) as f64 * 1_000.0,
            }
        })
        .collect();
    PriceHistory {
        symbol: "ACME.NS".into(),
        bars,
    }
}

fn stock() -> ScreenedStock {
    let mut record = CompanyRecord::new("ACME");
    record.company_name = "Acme Industries Ltd".into();
    record.is_consolidated = true;
    record.url = "https://www.screener.in/company/ACME/consolidated/".into();
    record.fetched_at = Utc.with_ymd_and_hms(2024, 11, 5, 16, 45, 0).unwrap();
    for (k, v) in [
        ("Market Cap", "12,400"),
        ("Current Price", "742"),
        ("High / Low", "810 / 560"),
        ("Stock P/E", "24.5"),
        ("Book Value", "180"),
        ("ROCE", "19.5"),
        ("ROE", "17.2"),
    ] {
        record.top_ratios.insert(k.into(), v.into());
    }
    let years = ["Mar 2020", "Mar 2021", "Mar 2022", "Mar 2023", "Mar 2024"];
    record.profit_loss = table(
        &years,
        &[
            ("Sales", &[800.0, 900.0, 1010.0, 1150.0, 1300.0]),
            ("Expenses", &[640.0, 715.0, 800.0, 905.0, 1020.0]),
            ("Operating Profit", &[160.0, 185.0, 210.0, 245.0, 280.0]),
            ("OPM %", &[20.0, 21.0, 21.0, 21.0, 22.0]),
            ("Depreciation", &[30.0, 32.0, 35.0, 38.0, 40.0]),
            ("Profit before tax", &[120.0, 140.0, 165.0, 195.0, 225.0]),
            ("Tax %", &[25.0, 25.0, 25.0, 25.0, 25.0]),
            ("Net Profit", &[90.0, 105.0, 124.0, 146.0, 169.0]),
        ],
    );
    record.cash_flow = table(
        &years,
        &[
            ("Cash from Operating Activity", &[110.0, 130.0, 150.0, 170.0, 200.0]),
            ("Cash from Investing Activity", &[-60.0, -70.0, -80.0, -85.0, -90.0]),
        ],
    );
    let analysis = analyze(&record);
    let charts = build_chart_set(&record, &prices());
    ScreenedStock {
        record,
        analysis,
        charts,
    }
}

#[test]
fn identical_inputs_render_identical_bytes() {
    let a = stock();
    let b = stock();
    let sections = vec![Section {
        name: "Industrials".into(),
        tickers: vec!["ACME".into()],
    }];

    for mode in [DashboardMode::Static, DashboardMode::Server] {
        assert_eq!(
            render_dashboard(std::slice::from_ref(&a), &sections, mode),
            render_dashboard(std::slice::from_ref(&b), &sections, mode)
        );
    }
    assert_eq!(pane_html(&a, true), pane_html(&b, true));
    assert_eq!(render_site(&[a.clone()], &[]), render_site(&[b.clone()], &[]));
    assert_eq!(
        render_report(&a.record, &a.analysis, ReportMode::Full),
        render_report(&b.record, &b.analysis, ReportMode::Full)
    );
}

#[test]
fn rendering_survives_a_json_round_trip() {
    let original = stock();
    let json = serde_json::to_string(&original).unwrap();
    let restored: ScreenedStock = serde_json::from_str(&json).unwrap();
    assert_eq!(pane_html(&original, false), pane_html(&restored, false));
}

#[test]
fn pane_shows_every_chart_and_the_fetch_time() {
    let s = stock();
    let html = pane_html(&s, true);
    for key in ["price_1y", "price_max", "annual_pl", "margins", "cashflow"] {
        assert!(html.contains(&format!(r#"data-chart="{key}""#)), "{key}");
    }
    assert!(html.contains("Income Flow"));
    assert!(html.contains("Generated 05 Nov 2024 16:45"));
}
