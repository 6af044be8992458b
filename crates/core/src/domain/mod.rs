pub mod analysis;
pub mod charts;
pub mod record;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenedStock {
    pub record: record::CompanyRecord,
    pub analysis: analysis::Analysis,
    #[serde(default)]
    pub charts: charts::ChartSet,
}

impl ScreenedStock {
    pub fn ticker(&self) -> &str {
        &self.record.ticker
    }
}
