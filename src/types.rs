/// Типы данных для дашборда переписи

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Уровни административной иерархии, извлечённые из `region_label`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionLevels {
    pub city: Option<String>,
    pub district: Option<String>,
    pub subdivision: Option<String>,
}

/// Одна строка выгрузки (одна административная единица)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub region_label: String,
    pub total_population: u64,
    pub household_count: u64,
    pub population_per_household: f64,
    pub male_population: u64,
    pub female_population: u64,
    pub male_to_female_ratio: f64,
    #[serde(flatten)]
    pub region: RegionLevels,
    /// Значения нераспознанных колонок, в порядке `Table::extra_columns`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<String>,
}

/// Очищенная таблица. Порядок колонок и строк совпадает с источником.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Заголовки источника в исходном порядке
    pub columns: Vec<String>,
    /// Заголовки колонок, которые не входят в схему выгрузки
    pub extra_columns: Vec<String>,
    pub records: Vec<Record>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Таблица с той же схемой и другим набором строк
    pub fn with_records(&self, records: Vec<Record>) -> Table {
        Table {
            columns: self.columns.clone(),
            extra_columns: self.extra_columns.clone(),
            records,
        }
    }
}

/// Сведения о загруженном источнике
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetMeta {
    pub source: String,
    pub encoding: String,
    /// Префикс заголовков вида `2025년08월`, если он есть
    pub reference_period: Option<String>,
    pub rows: usize,
    /// SHA-256 содержимого источника, hex
    pub fingerprint: String,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub region_count: usize,
    pub total_population: u64,
    pub total_households: u64,
    pub mean_population_per_household: Option<f64>,
    pub male_to_female_ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationSplit {
    pub male: u64,
    pub female: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SexRatioChart {
    pub bars: Vec<BarPoint>,
    pub reference_line: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSet {
    pub population_split: PopulationSplit,
    pub region_comparison: Vec<BarPoint>,
    pub household_histogram: Vec<HistogramBin>,
    pub sex_ratio: SexRatioChart,
}

/// Варианты для каскадных фильтров
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub cities: Vec<String>,
    pub districts: Vec<String>,
    pub subdivisions: Vec<String>,
    pub age_band_groups: Vec<String>,
}

/// Очищенная таблица вместе со сведениями об источнике
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub meta: DatasetMeta,
    pub table: Table,
}
