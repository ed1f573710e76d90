//! Один проход дашборда: фильтр -> сводка -> графики

use serde::{Deserialize, Serialize};

use crate::models::age_bands::{synthesize_age_bands, AgeBandTable};
use crate::models::charts::ChartBuilder;
use crate::models::filtering::{filter, FilterCriteria};
use crate::models::summary::SummaryCalculator;
use crate::types::{ChartSet, Record, SummaryMetrics, Table};

pub const NO_DATA_NOTICE: &str = "No data matches the selected filters.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub criteria: FilterCriteria,
    pub summary: SummaryMetrics,
    /// Заполнено только для пустой выборки
    pub notice: Option<String>,
    pub charts: Option<ChartSet>,
    pub age_bands: Option<AgeBandTable>,
    pub records: Vec<Record>,
}

impl DashboardView {
    pub fn render(table: &Table, criteria: &FilterCriteria) -> Self {
        let view = filter(table, criteria);
        let summary = SummaryCalculator::compute(&view);

        if view.is_empty() {
            tracing::debug!("Filter {:?} matched no rows", criteria);
            return Self {
                criteria: criteria.clone(),
                summary,
                notice: Some(NO_DATA_NOTICE.to_string()),
                charts: None,
                age_bands: None,
                records: Vec::new(),
            };
        }

        let split = ChartBuilder::population_split(&view);
        let age_bands = synthesize_age_bands(summary.total_population, split.male, split.female)
            .filter_group(criteria.age_band_group);

        Self {
            criteria: criteria.clone(),
            summary,
            notice: None,
            charts: ChartBuilder::build(&view),
            age_bands: Some(age_bands),
            records: view.records,
        }
    }
}
