//! Фильтрация по уровням региона и каскадные варианты фильтров

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::age_bands::AgeBandGroup;
use crate::types::{FilterOptions, Record, Table};

/// Условия фильтра. Отсутствующий ключ ничего не отсекает.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub city: Option<String>,
    pub district: Option<String>,
    pub subdivision: Option<String>,
    /// Применяется к синтетическим возрастным группам, не к строкам региона
    pub age_band_group: Option<AgeBandGroup>,
}

impl FilterCriteria {
    pub fn matches(&self, record: &Record) -> bool {
        key_matches(&self.city, &record.region.city)
            && key_matches(&self.district, &record.region.district)
            && key_matches(&self.subdivision, &record.region.subdivision)
    }
}

fn key_matches(wanted: &Option<String>, actual: &Option<String>) -> bool {
    match wanted {
        Some(w) => actual.as_deref() == Some(w.as_str()),
        None => true,
    }
}

/// Отсортированные уникальные непустые значения
fn distinct<'a>(values: impl Iterator<Item = &'a Option<String>>) -> Vec<String> {
    values
        .flatten()
        .filter(|v| !v.is_empty())
        .cloned()
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}

/// Подмножество строк с сохранением порядка. Пустой результат допустим.
pub fn filter(table: &Table, criteria: &FilterCriteria) -> Table {
    let records = table
        .records
        .iter()
        .filter(|r| criteria.matches(r))
        .cloned()
        .collect();
    table.with_records(records)
}

impl FilterOptions {
    /// Варианты следующего уровня сужаются выбранным значением предыдущего
    pub fn cascade(table: &Table, criteria: &FilterCriteria) -> Self {
        let records = &table.records;

        let cities = distinct(records.iter().map(|r| &r.region.city));
        let districts = distinct(
            records
                .iter()
                .filter(|r| key_matches(&criteria.city, &r.region.city))
                .map(|r| &r.region.district),
        );
        let subdivisions = distinct(
            records
                .iter()
                .filter(|r| key_matches(&criteria.district, &r.region.district))
                .map(|r| &r.region.subdivision),
        );

        FilterOptions {
            cities,
            districts,
            subdivisions,
            age_band_groups: AgeBandGroup::ALL
                .iter()
                .map(|g| g.as_str().to_string())
                .collect(),
        }
    }
}
