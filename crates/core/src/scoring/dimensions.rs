//! Threshold rules for the five scorecard dimensions.
//!
//! Every dimension starts at [`BASELINE`]; a rule only fires when its input is
//! present, so missing data leaves a dimension at the neutral midpoint.

use crate::domain::analysis::{
    Analysis, DimensionScore, MarginTrend, MomentumView, Sentiment, Signal, Trend, ValuationView,
};
use crate::scoring::sections::compounded;

pub const BASELINE: i32 = 50;

struct Tally {
    score: i32,
    notes: Vec<String>,
}

impl Tally {
    fn new() -> Self {
        Self {
            score: BASELINE,
            notes: Vec::new(),
        }
    }

    fn add(&mut self, points: i32, note: impl AsRef<str>) {
        self.score += points;
        self.notes.push(format!("{} ({points:+})", note.as_ref()));
    }

    fn finish(self) -> DimensionScore {
        DimensionScore {
            score: self.score.clamp(0, 100),
            notes: self.notes,
        }
    }
}

fn sales_cagr_5y(a: &Analysis) -> Option<f64> {
    a.profit_loss
        .as_ref()
        .and_then(|pl| pl.sales_cagr_5y)
        .or_else(|| compounded(&a.growth, "Sales", "5 Years"))
}

fn profit_cagr_5y(a: &Analysis) -> Option<f64> {
    a.profit_loss
        .as_ref()
        .and_then(|pl| pl.profit_cagr_5y)
        .or_else(|| compounded(&a.growth, "Profit", "5 Years"))
}

/// 3Y growth as reported by the site, falling back to the P&L history.
pub fn sales_growth_3y(a: &Analysis) -> Option<f64> {
    compounded(&a.growth, "Sales", "3 Years")
        .or_else(|| a.profit_loss.as_ref().and_then(|pl| pl.sales_cagr_3y))
}

pub fn profit_growth_3y(a: &Analysis) -> Option<f64> {
    compounded(&a.growth, "Profit", "3 Years")
        .or_else(|| a.profit_loss.as_ref().and_then(|pl| pl.profit_cagr_3y))
}

fn five_year_rule(t: &mut Tally, what: &str, value: Option<f64>) {
    let Some(v) = value else { return };
    if v > 15.0 {
        t.add(15, format!("Strong 5Y {what} CAGR {v:.1}%"));
    } else if v > 10.0 {
        t.add(10, format!("Healthy 5Y {what} CAGR {v:.1}%"));
    } else if v > 5.0 {
        t.add(3, format!("Modest 5Y {what} CAGR {v:.1}%"));
    } else if v < 0.0 {
        t.add(-10, format!("5Y {what} shrinking ({v:.1}%)"));
    }
}

fn three_year_rule(t: &mut Tally, what: &str, value: Option<f64>) {
    let Some(v) = value else { return };
    if v > 20.0 {
        t.add(10, format!("3Y {what} growth above 20% ({v:.1}%)"));
    } else if v < 0.0 {
        t.add(-10, format!("3Y {what} declining ({v:.1}%)"));
    }
}

pub fn growth(a: &Analysis) -> DimensionScore {
    let mut t = Tally::new();

    five_year_rule(&mut t, "sales", sales_cagr_5y(a));
    five_year_rule(&mut t, "profit", profit_cagr_5y(a));
    three_year_rule(&mut t, "sales", compounded(&a.growth, "Sales", "3 Years"));
    three_year_rule(&mut t, "profit", compounded(&a.growth, "Profit", "3 Years"));

    if let Some(c) = a.profit_loss.as_ref().and_then(|pl| pl.profit_consistency) {
        if c > 0.8 {
            t.add(10, "Highly consistent profit growth");
        } else if c > 0.6 {
            t.add(5, "Mostly consistent profit growth");
        }
    }

    t.finish()
}

fn return_rule(t: &mut Tally, what: &str, value: Option<f64>) {
    let Some(v) = value else { return };
    if v > 20.0 {
        t.add(15, format!("Excellent {what} ({v:.1}%)"));
    } else if v > 15.0 {
        t.add(10, format!("Good {what} ({v:.1}%)"));
    } else if v > 10.0 {
        t.add(5, format!("Moderate {what} ({v:.1}%)"));
    } else if v < 8.0 {
        t.add(-10, format!("Low {what} ({v:.1}%)"));
    }
}

pub fn profitability(a: &Analysis) -> DimensionScore {
    let mut t = Tally::new();

    return_rule(&mut t, "ROE", a.key_metrics.roe);
    return_rule(&mut t, "ROCE", a.key_metrics.roce);

    if let Some(pl) = &a.profit_loss {
        if !pl.opm_history.is_empty() {
            let opm = pl.opm_latest;
            if opm > 25.0 {
                t.add(10, format!("High operating margin ({opm:.1}%)"));
            } else if opm > 15.0 {
                t.add(5, format!("Healthy operating margin ({opm:.1}%)"));
            } else if opm < 8.0 {
                t.add(-5, format!("Thin operating margin ({opm:.1}%)"));
            }
        }

        match pl.margin_trend {
            MarginTrend::Expanding => t.add(8, "Margins expanding"),
            MarginTrend::Contracting => t.add(-5, "Margins contracting"),
            MarginTrend::Stable => {}
        }

        if pl.sales_latest > 0.0 {
            let npm = pl.npm_latest;
            if npm > 15.0 {
                t.add(5, format!("High net margin ({npm:.1}%)"));
            } else if npm < 5.0 {
                t.add(-5, format!("Low net margin ({npm:.1}%)"));
            }
        }
    }

    t.finish()
}

pub fn financial_health(a: &Analysis) -> DimensionScore {
    let mut t = Tally::new();

    if let Some(bs) = &a.balance_sheet {
        match bs.debt_to_equity {
            Some(de) if de < 0.3 => t.add(15, format!("Very low debt (D/E {de:.2})")),
            Some(de) if de < 1.0 => t.add(8, format!("Moderate debt (D/E {de:.2})")),
            Some(de) if de > 2.0 => t.add(-15, format!("High debt (D/E {de:.2})")),
            Some(_) => {}
            None if bs.equity_history.is_empty() && bs.shareholder_equity == 0.0 => {}
            None => t.add(-15, "Negative shareholder equity"),
        }

        match bs.debt_trend {
            Trend::Decreasing => t.add(5, "Debt reducing"),
            Trend::Increasing => t.add(-5, "Debt rising"),
            _ => {}
        }
    }

    if let Some(cf) = &a.cash_flow {
        if !cf.cfo_history.is_empty() {
            let c = cf.cfo_consistency;
            if c >= 1.0 {
                t.add(15, "Operating cash flow positive every year");
            } else if c >= 0.8 {
                t.add(8, "Operating cash flow mostly positive");
            } else if c < 0.6 {
                t.add(-10, "Inconsistent operating cash flow");
            }
        }

        if cf.total_years > 0 {
            if cf.fcf_positive_years as f64 / cf.total_years as f64 >= 0.8 {
                t.add(10, "Strong free cash flow generator");
            }
            if cf.fcf_latest < 0.0 {
                t.add(-5, "Negative free cash flow in latest year");
            }
        }
    }

    t.finish()
}

pub fn valuation(a: &Analysis) -> ValuationView {
    let m = &a.key_metrics;
    let mut score = BASELINE;
    let mut signals = Vec::new();
    let mut push = |points: i32, text: String, sentiment: Sentiment| {
        score += points;
        signals.push(Signal::new(text, sentiment));
    };

    if let Some(pe) = m.pe.filter(|pe| *pe > 0.0) {
        if pe < 10.0 {
            push(15, "PE < 10: deep value".into(), Sentiment::Bullish);
        } else if pe < 20.0 {
            push(8, "PE 10-20: reasonably valued".into(), Sentiment::Bullish);
        } else if pe < 35.0 {
            push(0, "PE 20-35: growth premium".into(), Sentiment::Neutral);
        } else if pe < 60.0 {
            push(-10, "PE 35-60: expensive".into(), Sentiment::Bearish);
        } else {
            push(-15, "PE > 60: very expensive".into(), Sentiment::Bearish);
        }
    }

    if let Some(pb) = m.pb.filter(|pb| *pb > 0.0) {
        if pb < 1.0 {
            push(10, "P/B < 1: below book value".into(), Sentiment::Bullish);
        } else if pb < 3.0 {
            push(0, "P/B 1-3: fair".into(), Sentiment::Neutral);
        } else if pb > 6.0 {
            push(-5, "P/B > 6: premium valuation".into(), Sentiment::Bearish);
        }
    }

    if let Some(dy) = m.div_yield {
        if dy > 3.0 {
            push(5, format!("Div Yield {dy:.1}%: income stock"), Sentiment::Bullish);
        } else if dy > 1.0 {
            push(0, format!("Div Yield {dy:.1}%"), Sentiment::Neutral);
        }
    }

    if let (Some(pe), Some(g)) = (m.pe.filter(|pe| *pe > 0.0), profit_growth_3y(a)) {
        if g > 0.0 {
            let peg = pe / g;
            if peg < 1.0 {
                push(10, format!("PEG {peg:.1}: growth at reasonable price"), Sentiment::Bullish);
            } else if peg < 2.0 {
                push(0, format!("PEG {peg:.1}: fairly priced for growth"), Sentiment::Neutral);
            } else {
                push(-5, format!("PEG {peg:.1}: overpriced for growth"), Sentiment::Bearish);
            }
        } else {
            push(-5, "Profits not growing: PEG not meaningful".into(), Sentiment::Bearish);
        }
    }

    if let Some(roe) = m.roe {
        if roe > 20.0 {
            push(8, format!("ROE {roe:.1}%: excellent capital efficiency"), Sentiment::Bullish);
        } else if roe > 15.0 {
            push(4, format!("ROE {roe:.1}%: good"), Sentiment::Bullish);
        } else if roe < 8.0 {
            push(-8, format!("ROE {roe:.1}%: below cost of equity"), Sentiment::Bearish);
        }
    }

    let score = score.clamp(0, 100);
    ValuationView {
        score,
        verdict: verdict(score).to_string(),
        signals,
    }
}

pub fn verdict(score: i32) -> &'static str {
    if score >= 70 {
        "Undervalued"
    } else if score >= 60 {
        "Attractively Valued"
    } else if score <= 30 {
        "Overvalued"
    } else if score <= 40 {
        "Expensive"
    } else {
        "Fairly Valued"
    }
}

pub fn valuation_score(view: &ValuationView) -> DimensionScore {
    DimensionScore {
        score: view.score,
        notes: view.signals.iter().map(|s| s.text.clone()).collect(),
    }
}

pub fn momentum_view(a: &Analysis) -> MomentumView {
    let m = &a.key_metrics;
    let mut view = MomentumView::default();

    if let (Some(price), Some(high), Some(low)) = (m.current_price, m.high_52w, m.low_52w) {
        if high > 0.0 && low > 0.0 {
            let range = high - low;
            let pos = if range > 0.0 { (price - low) / range } else { 0.5 };
            let from_high = (price - high) / high * 100.0;
            let from_low = (price - low) / low * 100.0;

            if pos > 0.9 {
                view.signals.push(Signal::new("Near 52W High: momentum strong", Sentiment::Bullish));
            } else if pos > 0.7 {
                view.signals.push(Signal::new("Upper 52W range: positive trend", Sentiment::Bullish));
            } else if pos < 0.2 {
                view.signals.push(Signal::new(
                    "Near 52W Low: potential value or distress",
                    Sentiment::Caution,
                ));
            } else if pos < 0.35 {
                view.signals.push(Signal::new("Lower 52W range: watch for reversal", Sentiment::Neutral));
            }
            view.signals.push(Signal::new(
                format!("{from_high:+.1}% from 52W High, {from_low:+.1}% from 52W Low"),
                Sentiment::Info,
            ));

            view.pos_in_52w = Some(pos);
            view.pct_from_high = Some(from_high);
            view.pct_from_low = Some(from_low);
        }
    }

    if let Some(sh) = &a.shareholding {
        match sh.fii_trend {
            Trend::Increasing => view.signals.push(Signal::new(
                "FII increasing: institutional confidence",
                Sentiment::Bullish,
            )),
            Trend::Decreasing => view.signals.push(Signal::new(
                "FII decreasing: institutional selling",
                Sentiment::Bearish,
            )),
            _ => {}
        }
        if sh.dii_trend == Trend::Increasing {
            view.signals.push(Signal::new(
                "DII increasing: domestic institutional buying",
                Sentiment::Bullish,
            ));
        }
        match sh.promoter_trend {
            Trend::Decreasing => view
                .signals
                .push(Signal::new("Promoter stake declining: watch", Sentiment::Caution)),
            Trend::Increasing => view.signals.push(Signal::new(
                "Promoter stake increasing: confidence signal",
                Sentiment::Bullish,
            )),
            _ => {}
        }
    }

    view
}

pub fn momentum(a: &Analysis) -> DimensionScore {
    let mut t = Tally::new();

    if let Some(pos) = a.momentum.pos_in_52w {
        if pos > 0.9 {
            t.add(15, "Trading near 52-week high");
        } else if pos > 0.7 {
            t.add(10, "Upper part of 52-week range");
        } else if pos < 0.2 {
            t.add(-10, "Trading near 52-week low");
        } else if pos < 0.35 {
            t.add(-5, "Lower part of 52-week range");
        }
    }

    if let Some(sh) = &a.shareholding {
        match sh.fii_trend {
            Trend::Increasing => t.add(5, "FIIs adding"),
            Trend::Decreasing => t.add(-5, "FIIs selling"),
            _ => {}
        }
        if sh.dii_trend == Trend::Increasing {
            t.add(5, "DIIs adding");
        }
        match sh.promoter_trend {
            Trend::Increasing => t.add(5, "Promoters adding"),
            Trend::Decreasing => t.add(-10, "Promoters selling"),
            _ => {}
        }
    }

    if let Some(q) = &a.quarterly {
        if let Some(g) = q.profit_yoy {
            if g > 20.0 {
                t.add(10, format!("Latest quarter profit up {g:.0}% YoY"));
            } else if g < -15.0 {
                t.add(-10, format!("Latest quarter profit down {:.0}% YoY", g.abs()));
            }
        }
        if let Some(g) = q.sales_yoy {
            if g > 15.0 {
                t.add(5, format!("Latest quarter sales up {g:.0}% YoY"));
            } else if g < 0.0 {
                t.add(-5, format!("Latest quarter sales down {:.0}% YoY", g.abs()));
            }
        }
        if q.improving_margins {
            t.add(5, "Quarterly margins improving");
        }
    }

    t.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::{BalanceSheetHealth, KeyMetrics, ShareholdingTrend};

    fn with_metrics(m: KeyMetrics) -> Analysis {
        Analysis {
            key_metrics: m,
            ..Default::default()
        }
    }

    #[test]
    fn empty_analysis_is_neutral_everywhere() {
        let a = Analysis::default();
        assert_eq!(growth(&a).score, BASELINE);
        assert_eq!(profitability(&a).score, BASELINE);
        assert_eq!(financial_health(&a).score, BASELINE);
        assert_eq!(valuation(&a).score, BASELINE);
        assert_eq!(momentum(&a).score, BASELINE);
        assert!(growth(&a).notes.is_empty());
    }

    #[test]
    fn valuation_verdict_bands() {
        assert_eq!(verdict(75), "Undervalued");
        assert_eq!(verdict(60), "Attractively Valued");
        assert_eq!(verdict(50), "Fairly Valued");
        assert_eq!(verdict(40), "Expensive");
        assert_eq!(verdict(30), "Overvalued");
    }

    #[test]
    fn deep_value_stock_scores_high_on_valuation() {
        let a = with_metrics(KeyMetrics {
            pe: Some(8.0),
            pb: Some(0.9),
            div_yield: Some(4.0),
            roe: Some(22.0),
            ..Default::default()
        });
        let v = valuation(&a);
        assert_eq!(v.score, 88);
        assert_eq!(v.verdict, "Undervalued");
        assert_eq!(v.signals.len(), 4);
    }

    #[test]
    fn expensive_stock_is_overvalued() {
        let a = with_metrics(KeyMetrics {
            pe: Some(120.0),
            pb: Some(15.0),
            roe: Some(2.0),
            ..Default::default()
        });
        let v = valuation(&a);
        assert_eq!(v.score, 22);
        assert_eq!(v.verdict, "Overvalued");
    }

    #[test]
    fn negative_equity_is_penalised() {
        let a = Analysis {
            balance_sheet: Some(BalanceSheetHealth {
                equity_history: vec![-10.0],
                debt_to_equity: None,
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(financial_health(&a).score, 35);
    }

    #[test]
    fn momentum_reads_ownership_trends() {
        let mut a = Analysis {
            shareholding: Some(ShareholdingTrend {
                fii_trend: Trend::Increasing,
                dii_trend: Trend::Increasing,
                promoter_trend: Trend::Decreasing,
                ..Default::default()
            }),
            ..Default::default()
        };
        a.momentum = momentum_view(&a);
        assert_eq!(momentum(&a).score, 50);
        assert_eq!(a.momentum.signals.len(), 3);
        assert!(a.momentum.pos_in_52w.is_none());
    }

    #[test]
    fn flat_range_sits_mid_band() {
        let mut a = with_metrics(KeyMetrics {
            current_price: Some(100.0),
            high_52w: Some(100.0),
            low_52w: Some(100.0),
            ..Default::default()
        });
        a.momentum = momentum_view(&a);
        assert_eq!(a.momentum.pos_in_52w, Some(0.5));
        assert_eq!(momentum(&a).score, BASELINE);
    }
}
