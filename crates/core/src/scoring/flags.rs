use crate::domain::analysis::{Analysis, Flags, MarginTrend, Trend};
use crate::scoring::dimensions::{profit_growth_3y, sales_growth_3y};

/// Green, amber and red call-outs. A flag whose input is missing never fires.
pub fn generate(a: &Analysis) -> Flags {
    let mut f = Flags::default();
    let m = &a.key_metrics;

    if let Some(pe) = m.pe {
        if pe > 0.0 && pe < 15.0 {
            f.green.push(format!("Low PE ({pe:.1})"));
        } else if pe > 50.0 {
            f.red.push(format!("Very high PE ({pe:.1})"));
        }
    }

    if let Some(pb) = m.pb {
        if pb > 0.0 && pb < 1.5 {
            f.green.push(format!("Low P/B ({pb:.1})"));
        } else if pb > 8.0 {
            f.red.push(format!("Very high P/B ({pb:.1})"));
        }
    }

    for (name, value) in [("ROE", m.roe), ("ROCE", m.roce)] {
        let Some(v) = value else { continue };
        if v > 20.0 {
            f.green.push(format!("High {name} ({v:.1}%)"));
        } else if v > 0.0 && v < 8.0 {
            f.red.push(format!("Low {name} ({v:.1}%)"));
        }
    }

    if let Some(g) = sales_growth_3y(a) {
        if g > 20.0 {
            f.green.push(format!("Strong 3Y sales CAGR ({g:.0}%)"));
        } else if (0.0..5.0).contains(&g) {
            f.amber.push(format!("Slow sales growth ({g:.0}%)"));
        } else if g < 0.0 {
            f.red.push(format!("Sales declining ({g:.0}%)"));
        }
    }

    if let Some(g) = profit_growth_3y(a) {
        if g > 20.0 {
            f.green.push(format!("Strong 3Y profit CAGR ({g:.0}%)"));
        } else if g < 0.0 {
            f.red.push(format!("Profits declining ({g:.0}%)"));
        }
    }

    if let Some(pl) = &a.profit_loss {
        match pl.margin_trend {
            MarginTrend::Expanding => f.green.push("Operating margins expanding".into()),
            MarginTrend::Contracting => f.red.push("Operating margins contracting".into()),
            MarginTrend::Stable => {}
        }

        let opm = pl.opm_latest;
        if opm > 25.0 {
            f.green.push(format!("High operating margin ({opm:.0}%)"));
        } else if opm > 0.0 && opm < 8.0 {
            f.amber.push(format!("Thin operating margin ({opm:.0}%)"));
        }
    }

    if let Some(bs) = &a.balance_sheet {
        if let Some(de) = bs.debt_to_equity {
            if de < 0.1 {
                f.green.push("Virtually debt-free".into());
            } else if de < 0.5 {
                f.green.push(format!("Low debt (D/E {de:.2})"));
            } else if de > 2.0 {
                f.red.push(format!("High debt (D/E {de:.2})"));
            }
        }

        match bs.debt_trend {
            Trend::Increasing => f.amber.push("Debt increasing over time".into()),
            Trend::Decreasing => f.green.push("Debt reducing".into()),
            _ => {}
        }
    }

    if let Some(cf) = &a.cash_flow {
        if !cf.cfo_history.is_empty() {
            if cf.cfo_consistency >= 1.0 {
                f.green.push("Positive operating cash flow every year".into());
            } else if cf.cfo_consistency < 0.6 {
                f.red.push("Inconsistent operating cash flow".into());
            }
        }

        if cf.fcf_latest > 0.0 {
            f.green.push("Positive free cash flow".into());
        } else if cf.fcf_latest < 0.0 {
            f.amber.push("Negative free cash flow".into());
        }
    }

    if let Some(dy) = m.div_yield.filter(|dy| *dy > 3.0) {
        f.green.push(format!("Attractive dividend yield ({dy:.1}%)"));
    }

    if let Some(sh) = &a.shareholding {
        if !sh.promoter_history.is_empty() {
            if sh.promoter > 60.0 {
                f.green.push(format!("High promoter holding ({:.1}%)", sh.promoter));
            } else if sh.promoter < 25.0 {
                f.amber.push(format!("Low promoter holding ({:.1}%)", sh.promoter));
            }
        }

        match sh.fii_trend {
            Trend::Increasing => f.green.push("FIIs increasing stake".into()),
            Trend::Decreasing => f.amber.push("FIIs reducing stake".into()),
            _ => {}
        }

        if sh.promoter_trend == Trend::Decreasing {
            f.red.push("Promoter stake declining".into());
        }
    }

    if let Some(q) = &a.quarterly {
        if q.improving_margins {
            f.green.push("Quarterly margins improving".into());
        }
        if let Some(g) = q.profit_yoy {
            if g > 20.0 {
                f.green.push(format!("Latest quarter profit up {g:.0}% YoY"));
            } else if g < -15.0 {
                f.red.push(format!("Latest quarter profit down {g:.0}% YoY"));
            }
        }
    }

    f
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::{BalanceSheetHealth, KeyMetrics, ShareholdingTrend};

    #[test]
    fn no_data_no_flags() {
        assert!(generate(&Analysis::default()).is_empty());
    }

    #[test]
    fn valuation_and_return_flags() {
        let a = Analysis {
            key_metrics: KeyMetrics {
                pe: Some(62.0),
                pb: Some(1.2),
                roe: Some(5.0),
                roce: Some(25.0),
                div_yield: Some(3.5),
                ..Default::default()
            },
            ..Default::default()
        };
        let f = generate(&a);
        assert_eq!(
            f.green,
            vec![
                "Low P/B (1.2)".to_string(),
                "High ROCE (25.0%)".to_string(),
                "Attractive dividend yield (3.5%)".to_string(),
            ]
        );
        assert_eq!(f.red, vec!["Very high PE (62.0)".to_string(), "Low ROE (5.0%)".to_string()]);
        assert!(f.amber.is_empty());
    }

    #[test]
    fn balance_sheet_and_holding_flags() {
        let a = Analysis {
            balance_sheet: Some(BalanceSheetHealth {
                debt_to_equity: Some(2.5),
                debt_trend: Trend::Increasing,
                ..Default::default()
            }),
            shareholding: Some(ShareholdingTrend {
                promoter: 20.0,
                promoter_history: vec![21.0, 20.0],
                promoter_trend: Trend::Decreasing,
                fii_trend: Trend::Decreasing,
                ..Default::default()
            }),
            ..Default::default()
        };
        let f = generate(&a);
        assert_eq!(f.red, vec!["High debt (D/E 2.50)".to_string(), "Promoter stake declining".to_string()]);
        assert_eq!(
            f.amber,
            vec![
                "Debt increasing over time".to_string(),
                "Low promoter holding (20.0%)".to_string(),
                "FIIs reducing stake".to_string(),
            ]
        );
    }
}
