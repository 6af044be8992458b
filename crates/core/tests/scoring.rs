use screener_core::domain::analysis::Grade;
use screener_core::domain::record::{CompanyRecord, FinancialTable, GrowthTable, TableRow};
use screener_core::scoring::analyze;

fn table(periods: usize, rows: &[(&str, Vec<f64>)]) -> FinancialTable {
    FinancialTable {
        periods: (0..periods).map(|i| format!("Mar {}", 2018 + i)).collect(),
        rows: rows
            .iter()
            .map(|(label, values)| TableRow {
                label: label.to_string(),
                values: values.iter().map(|v| v.to_string()).collect(),
            })
            .collect(),
    }
}

fn growth(category: &str, three: &str, five: &str) -> GrowthTable {
    GrowthTable {
        category: category.to_string(),
        entries: vec![
            ("10 Years".into(), "".into()),
            ("5 Years".into(), five.into()),
            ("3 Years".into(), three.into()),
            ("TTM".into(), "".into()),
        ],
    }
}

/// Steady compounder: ~12% growth, almost no debt, PE 28.
fn quality_compounder() -> CompanyRecord {
    let mut r = CompanyRecord::new("QUALITY");
    r.company_name = "Quality Compounders Ltd".into();
    for (k, v) in [
        ("Market Cap", "50,000"),
        ("Current Price", "1,800"),
        ("High / Low", "2,000 / 1,200"),
        ("Stock P/E", "28"),
        ("Book Value", "400"),
        ("Dividend Yield", "1.2"),
        ("ROCE", "24"),
        ("ROE", "22"),
        ("Face Value", "1"),
    ] {
        r.top_ratios.insert(k.into(), v.into());
    }
    r.compounded_growth = vec![
        growth("Compounded Sales Growth", "14%", "12%"),
        growth("Compounded Profit Growth", "16%", "12%"),
    ];
    r.profit_loss = table(
        7,
        &[
            ("Sales", vec![1000.0, 1120.0, 1254.0, 1405.0, 1574.0, 1762.0, 1974.0]),
            ("Net Profit", vec![100.0, 112.0, 125.0, 140.0, 157.0, 176.0, 197.0]),
            ("OPM %", vec![20.0; 7]),
        ],
    );
    r.balance_sheet = table(
        5,
        &[
            ("Equity Capital", vec![10.0; 5]),
            ("Reserves", vec![800.0, 950.0, 1100.0, 1300.0, 1500.0]),
            ("Borrowings", vec![100.0, 90.0, 80.0, 70.0, 60.0]),
        ],
    );
    r.cash_flow = table(
        5,
        &[
            ("Cash from Operating Activity", vec![300.0, 350.0, 400.0, 450.0, 500.0]),
            ("Cash from Investing Activity", vec![-100.0, -120.0, -130.0, -150.0, -160.0]),
        ],
    );
    r.shareholding = table(
        4,
        &[
            ("Promoters", vec![55.0; 4]),
            ("FIIs", vec![20.0; 4]),
            ("DIIs", vec![10.0; 4]),
        ],
    );
    r.quarterly = table(
        8,
        &[
            ("Sales", vec![600.0, 620.0, 640.0, 660.0, 660.0, 680.0, 700.0, 720.0]),
            ("Net Profit", vec![90.0, 93.0, 96.0, 99.0, 100.0, 103.0, 106.0, 108.0]),
            ("OPM %", vec![22.0, 22.0, 23.0, 23.0, 24.0, 24.0, 25.0, 25.0]),
        ],
    );
    r
}

#[test]
fn quality_compounder_grades_a_without_red_flags() {
    let a = analyze(&quality_compounder());
    let s = &a.scorecard;

    assert_eq!(s.growth.score, 80);
    assert_eq!(s.profitability.score, 85);
    assert_eq!(s.financial_health.score, 95);
    assert_eq!(s.valuation.score, 58);
    assert_eq!(s.momentum.score, 65);
    assert!((s.overall - 78.7).abs() < 1e-9);
    assert_eq!(s.grade, Grade::A);
    assert_eq!(a.valuation.verdict, "Fairly Valued");

    assert!(a.flags.red.is_empty(), "unexpected red flags: {:?}", a.flags.red);
    assert!(a.flags.amber.is_empty(), "unexpected amber flags: {:?}", a.flags.amber);
    assert_eq!(
        a.flags.green,
        vec![
            "High ROE (22.0%)",
            "High ROCE (24.0%)",
            "Virtually debt-free",
            "Debt reducing",
            "Positive operating cash flow every year",
            "Positive free cash flow",
            "Quarterly margins improving",
        ]
    );
}

#[test]
fn scoring_is_deterministic_and_idempotent() {
    let record = quality_compounder();
    let first = analyze(&record);
    let second = analyze(&record);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn empty_record_scores_neutral() {
    let a = analyze(&CompanyRecord::new("EMPTY"));
    for (name, d) in a.scorecard.dimensions() {
        assert_eq!(d.score, 50, "{name}");
    }
    assert_eq!(a.scorecard.overall, 50.0);
    assert_eq!(a.scorecard.grade, Grade::B);
    assert!(a.flags.is_empty());
    assert!(a.profit_loss.is_none());
}

#[test]
fn dropping_any_section_never_fails() {
    let full = quality_compounder();
    let variants: Vec<fn(&mut CompanyRecord)> = vec![
        |r: &mut CompanyRecord| r.top_ratios.clear(),
        |r: &mut CompanyRecord| r.compounded_growth.clear(),
        |r: &mut CompanyRecord| r.profit_loss = FinancialTable::default(),
        |r: &mut CompanyRecord| r.quarterly = FinancialTable::default(),
        |r: &mut CompanyRecord| r.balance_sheet = FinancialTable::default(),
        |r: &mut CompanyRecord| r.cash_flow = FinancialTable::default(),
        |r: &mut CompanyRecord| r.shareholding = FinancialTable::default(),
        |r: &mut CompanyRecord| {
            r.top_ratios.remove("ROE");
        },
    ];

    for strip in variants {
        let mut r = full.clone();
        strip(&mut r);
        let a = analyze(&r);
        for (name, d) in a.scorecard.dimensions() {
            assert!((0..=100).contains(&d.score), "{name} out of range");
        }
    }
}

#[test]
fn missing_roe_takes_neutral_contribution() {
    let mut r = CompanyRecord::new("X");
    r.top_ratios.insert("ROCE".into(), "12".into());
    let with_roce_only = analyze(&r);
    assert_eq!(with_roce_only.scorecard.profitability.score, 55);

    r.top_ratios.insert("ROE".into(), "".into());
    assert_eq!(analyze(&r).scorecard.profitability.score, 55);
}

#[test]
fn grade_is_monotonic_in_roe() {
    let mut previous = Grade::D;
    let mut previous_overall = 0.0;
    for roe in [-5, 0, 5, 8, 9, 10, 12, 15, 18, 20, 25, 40] {
        let mut r = quality_compounder();
        r.top_ratios.insert("ROE".into(), roe.to_string());
        let s = analyze(&r).scorecard;
        assert!(s.grade >= previous, "grade fell at ROE {roe}");
        assert!(s.overall >= previous_overall, "score fell at ROE {roe}");
        previous = s.grade;
        previous_overall = s.overall;
    }
}

#[test]
fn grade_is_monotonic_in_profit_growth() {
    let mut previous_overall = 0.0;
    for g in ["-20", "-1", "0", "3", "10", "14", "20", "21", "40", "80"] {
        let mut r = quality_compounder();
        r.compounded_growth[1] = growth("Compounded Profit Growth", &format!("{g}%"), "12%");
        let overall = analyze(&r).scorecard.overall;
        assert!(overall >= previous_overall, "score fell at profit growth {g}");
        previous_overall = overall;
    }
}

#[test]
fn grade_is_monotonic_in_cash_generation() {
    let mut previous_overall = 0.0;
    for positive_years in 0..=5usize {
        let mut r = quality_compounder();
        let cfo: Vec<f64> = (0..5)
            .map(|i| if i >= 5 - positive_years { 500.0 } else { -50.0 })
            .collect();
        r.cash_flow = table(
            5,
            &[
                ("Cash from Operating Activity", cfo),
                ("Cash from Investing Activity", vec![-100.0; 5]),
            ],
        );
        let overall = analyze(&r).scorecard.overall;
        assert!(overall >= previous_overall, "score fell at {positive_years} positive years");
        previous_overall = overall;
    }
}
