/// Сводные показатели по выборке

use crate::types::{SummaryMetrics, Table};

/// Сумма счётчиков с насыщением: значения ячеек не ограничены сверху
pub(crate) fn saturating_total(values: impl Iterator<Item = u64>) -> u64 {
    values.fold(0u64, u64::saturating_add)
}

pub struct SummaryCalculator;

impl SummaryCalculator {
    /// На пустой выборке средние и отношения равны `None`, деления на ноль нет
    pub fn compute(table: &Table) -> SummaryMetrics {
        let records = &table.records;

        let total_population = saturating_total(records.iter().map(|r| r.total_population));
        let total_households = saturating_total(records.iter().map(|r| r.household_count));
        let male = saturating_total(records.iter().map(|r| r.male_population));
        let female = saturating_total(records.iter().map(|r| r.female_population));

        let mean_population_per_household = if records.is_empty() {
            None
        } else {
            Some(
                records.iter().map(|r| r.population_per_household).sum::<f64>()
                    / records.len() as f64,
            )
        };

        // Отношение по суммам, а не среднее поля `male_to_female_ratio`
        let male_to_female_ratio = if female > 0 {
            Some(male as f64 / female as f64)
        } else {
            None
        };

        SummaryMetrics {
            region_count: records.len(),
            total_population,
            total_households,
            mean_population_per_household,
            male_to_female_ratio,
        }
    }
}
