//! Deterministic scoring: raw company record in, analysis record out.
//!
//! Nothing here performs I/O or reads the clock, so the same record always
//! yields the same [`Analysis`].

pub mod dimensions;
pub mod flags;
pub mod metrics;
pub mod sections;

use crate::domain::analysis::{Analysis, Grade, Scorecard};
use crate::domain::record::CompanyRecord;

const GROWTH_WEIGHT: f64 = 0.25;
const PROFITABILITY_WEIGHT: f64 = 0.25;
const HEALTH_WEIGHT: f64 = 0.20;
const VALUATION_WEIGHT: f64 = 0.15;
const MOMENTUM_WEIGHT: f64 = 0.15;

pub fn analyze(record: &CompanyRecord) -> Analysis {
    let mut a = Analysis {
        key_metrics: sections::key_metrics(record),
        profit_loss: sections::profit_loss(&record.profit_loss),
        quarterly: sections::quarterly(&record.quarterly),
        balance_sheet: sections::balance_sheet(&record.balance_sheet),
        cash_flow: sections::cash_flow(&record.cash_flow),
        shareholding: sections::shareholding(&record.shareholding),
        growth: sections::growth_rates(record),
        ..Default::default()
    };

    a.valuation = dimensions::valuation(&a);
    a.momentum = dimensions::momentum_view(&a);
    a.scorecard = scorecard(&a);
    a.flags = flags::generate(&a);
    a
}

fn scorecard(a: &Analysis) -> Scorecard {
    let growth = dimensions::growth(a);
    let profitability = dimensions::profitability(a);
    let financial_health = dimensions::financial_health(a);
    let valuation = dimensions::valuation_score(&a.valuation);
    let momentum = dimensions::momentum(a);

    let overall = metrics::round1(
        GROWTH_WEIGHT * growth.score as f64
            + PROFITABILITY_WEIGHT * profitability.score as f64
            + HEALTH_WEIGHT * financial_health.score as f64
            + VALUATION_WEIGHT * valuation.score as f64
            + MOMENTUM_WEIGHT * momentum.score as f64,
    );

    Scorecard {
        growth,
        profitability,
        financial_health,
        valuation,
        momentum,
        overall,
        grade: Grade::from_score(overall),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overall_is_the_weighted_dimension_sum() {
        let total = GROWTH_WEIGHT + PROFITABILITY_WEIGHT + HEALTH_WEIGHT + VALUATION_WEIGHT + MOMENTUM_WEIGHT;
        assert!((total - 1.0).abs() < 1e-12);

        let mut record = CompanyRecord::new("X");
        record.top_ratios.insert("ROE".into(), "25".into());
        record.top_ratios.insert("Stock P/E".into(), "8".into());
        let card = analyze(&record).scorecard;

        let expected = 0.25 * card.growth.score as f64
            + 0.25 * card.profitability.score as f64
            + 0.20 * card.financial_health.score as f64
            + 0.15 * card.valuation.score as f64
            + 0.15 * card.momentum.score as f64;
        assert!(card.profitability.score > 50);
        assert!((card.overall - expected).abs() <= 0.05 + 1e-9);
        assert_eq!(card.grade, Grade::from_score(card.overall));
    }
}
