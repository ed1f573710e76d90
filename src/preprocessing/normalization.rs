//! Нормализация выгрузки: схема заголовков, очистка чисел, производные колонки

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use encoding_rs::Encoding;
use sha2::{Digest, Sha256};

use crate::error::{DatasetError, LoadError, NumericKind, ParseError};
use crate::preprocessing::decoding::{self, DEFAULT_ENCODINGS};
use crate::preprocessing::hierarchy::{RegionExtractor, SuffixPatternExtractor};
use crate::types::{Dataset, DatasetMeta, Record, Table};

/// Колонки выгрузки. В источнике заголовки имеют префикс периода:
/// `2025년08월_총인구수`, поэтому сопоставление идёт по части после `_`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    RegionLabel,
    TotalPopulation,
    HouseholdCount,
    PopulationPerHousehold,
    MalePopulation,
    FemalePopulation,
    MaleToFemaleRatio,
}

impl Field {
    const ALL: [Field; 7] = [
        Field::RegionLabel,
        Field::TotalPopulation,
        Field::HouseholdCount,
        Field::PopulationPerHousehold,
        Field::MalePopulation,
        Field::FemalePopulation,
        Field::MaleToFemaleRatio,
    ];

    fn header(self) -> &'static str {
        match self {
            Field::RegionLabel => "행정구역",
            Field::TotalPopulation => "총인구수",
            Field::HouseholdCount => "세대수",
            Field::PopulationPerHousehold => "세대당 인구",
            Field::MalePopulation => "남자 인구수",
            Field::FemalePopulation => "여자 인구수",
            Field::MaleToFemaleRatio => "남여 비율",
        }
    }
}

/// Позиции колонок в заголовке
#[derive(Debug)]
struct Schema {
    columns: Vec<String>,
    positions: [usize; 7],
    extras: Vec<usize>,
    reference_period: Option<String>,
}

impl Schema {
    fn resolve<'a, I>(headers: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let columns: Vec<String> = headers.into_iter().map(|h| h.trim().to_string()).collect();

        let mut found: [Option<usize>; 7] = [None; 7];
        let mut extras = Vec::new();
        let mut reference_period = None;

        for (idx, name) in columns.iter().enumerate() {
            let (prefix, base) = match name.rsplit_once('_') {
                Some((prefix, base)) => (Some(prefix.trim()), base.trim()),
                None => (None, name.as_str()),
            };

            match Field::ALL.iter().position(|f| f.header() == base) {
                Some(slot) if found[slot].is_none() => {
                    found[slot] = Some(idx);
                    if reference_period.is_none() {
                        reference_period = prefix.filter(|p| !p.is_empty()).map(str::to_string);
                    }
                }
                _ => extras.push(idx),
            }
        }

        let mut positions = [0usize; 7];
        for (slot, field) in Field::ALL.iter().enumerate() {
            positions[slot] = found[slot].ok_or(LoadError::MissingColumn(field.header()))?;
        }

        Ok(Self {
            columns,
            positions,
            extras,
            reference_period,
        })
    }

    fn position(&self, field: Field) -> usize {
        self.positions[field as usize]
    }
}

/// Убирает разделители тысяч и приводит к целому. `"1,093,639"` -> `1093639`.
pub fn clean_integer(raw: &str) -> Option<u64> {
    raw.trim().replace(',', "").parse::<u64>().ok()
}

/// То же для дробных значений; отрицательные и не-конечные отклоняются
pub fn clean_decimal(raw: &str) -> Option<f64> {
    raw.trim()
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// Загрузчик выгрузки: перебор кодировок, очистка чисел, разбор иерархии
#[derive(Clone)]
pub struct DataNormalizer {
    encodings: Vec<&'static Encoding>,
    extractor: Arc<dyn RegionExtractor>,
}

impl DataNormalizer {
    pub fn new() -> Self {
        Self {
            encodings: DEFAULT_ENCODINGS.to_vec(),
            extractor: Arc::new(SuffixPatternExtractor),
        }
    }

    pub fn with_encodings(mut self, encodings: Vec<&'static Encoding>) -> Self {
        self.encodings = encodings;
        self
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn RegionExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<Dataset, DatasetError> {
        let path = path.as_ref();
        let bytes = read_source(path)?;
        self.load_bytes(&bytes, &path.display().to_string())
    }

    pub fn load_bytes(&self, bytes: &[u8], source: &str) -> Result<Dataset, DatasetError> {
        let decoded = decoding::decode(bytes, &self.encodings)?;
        let (table, reference_period) = self.clean_text(&decoded.text)?;

        tracing::info!(
            "Loaded {} rows from {} ({})",
            table.len(),
            source,
            decoded.encoding.name()
        );

        Ok(Dataset {
            meta: DatasetMeta {
                source: source.to_string(),
                encoding: decoded.encoding.name().to_string(),
                reference_period,
                rows: table.len(),
                fingerprint: fingerprint(bytes),
                loaded_at: Utc::now(),
            },
            table,
        })
    }

    /// Разбор уже декодированного CSV
    pub fn clean(&self, text: &str) -> Result<Table, DatasetError> {
        self.clean_text(text).map(|(table, _)| table)
    }

    fn clean_text(&self, text: &str) -> Result<(Table, Option<String>), DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(text.as_bytes());

        let headers = reader.headers().map_err(LoadError::from)?.clone();
        let schema = Schema::resolve(headers.iter())?;

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(LoadError::from)?;
            records.push(self.parse_row(&schema, &row)?);
        }

        let table = Table {
            extra_columns: schema.extras.iter().map(|&i| schema.columns[i].clone()).collect(),
            columns: schema.columns,
            records,
        };
        Ok((table, schema.reference_period))
    }

    fn parse_row(&self, schema: &Schema, row: &csv::StringRecord) -> Result<Record, ParseError> {
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        let cell = |field: Field| row.get(schema.position(field)).unwrap_or("");
        let error = |field: Field, expected: NumericKind| ParseError {
            line,
            column: schema.columns[schema.position(field)].clone(),
            value: cell(field).to_string(),
            expected,
        };
        let integer = |field: Field| {
            clean_integer(cell(field)).ok_or_else(|| error(field, NumericKind::Integer))
        };
        let decimal = |field: Field| {
            clean_decimal(cell(field)).ok_or_else(|| error(field, NumericKind::Decimal))
        };

        let region_label = cell(Field::RegionLabel).to_string();
        Ok(Record {
            region: self.extractor.extract(&region_label),
            total_population: integer(Field::TotalPopulation)?,
            household_count: integer(Field::HouseholdCount)?,
            population_per_household: decimal(Field::PopulationPerHousehold)?,
            male_population: integer(Field::MalePopulation)?,
            female_population: integer(Field::FemalePopulation)?,
            male_to_female_ratio: decimal(Field::MaleToFemaleRatio)?,
            extra: schema
                .extras
                .iter()
                .map(|&i| row.get(i).unwrap_or("").to_string())
                .collect(),
            region_label,
        })
    }

    /// Пересчитывает производные колонки текущим экстрактором
    pub fn rederive(&self, table: &Table) -> Table {
        let records = table
            .records
            .iter()
            .map(|r| Record {
                region: self.extractor.extract(&r.region_label),
                ..r.clone()
            })
            .collect();
        table.with_records(records)
    }
}

impl Default for DataNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Загрузка с настройками по умолчанию
pub fn load_and_clean(path: impl AsRef<Path>) -> Result<Dataset, DatasetError> {
    DataNormalizer::new().load_path(path)
}

pub(crate) fn read_source(path: &Path) -> Result<Vec<u8>, LoadError> {
    std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            LoadError::SourceMissing(path.to_path_buf())
        } else {
            LoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

pub(crate) fn fingerprint(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Пишет очищенную таблицу в UTF-8 CSV с исходными заголовками.
/// Повторная загрузка результата даёт те же записи.
pub fn write_csv<W: Write>(table: &Table, writer: W) -> Result<(), LoadError> {
    let schema = Schema::resolve(table.columns.iter().map(String::as_str))?;
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(&table.columns)?;

    let mut slots: Vec<Option<Field>> = vec![None; table.columns.len()];
    for field in Field::ALL {
        slots[schema.position(field)] = Some(field);
    }

    for record in &table.records {
        let mut extras = record.extra.iter();
        let row: Vec<String> = slots
            .iter()
            .map(|slot| match slot {
                Some(Field::RegionLabel) => record.region_label.clone(),
                Some(Field::TotalPopulation) => record.total_population.to_string(),
                Some(Field::HouseholdCount) => record.household_count.to_string(),
                Some(Field::PopulationPerHousehold) => record.population_per_household.to_string(),
                Some(Field::MalePopulation) => record.male_population.to_string(),
                Some(Field::FemalePopulation) => record.female_population.to_string(),
                Some(Field::MaleToFemaleRatio) => record.male_to_female_ratio.to_string(),
                None => extras.next().cloned().unwrap_or_default(),
            })
            .collect();
        out.write_record(&row)?;
    }

    out.flush().map_err(|e| LoadError::Csv(e.into()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "행정구역,2025년08월_총인구수,2025년08월_세대수,2025년08월_세대당 인구,2025년08월_남자 인구수,2025년08월_여자 인구수,2025년08월_남여 비율";

    fn sample_csv() -> String {
        format!(
            "{HEADER}\n\
             경기도 용인시 (4146000000),\"1,093,639\",\"449,693\",2.43,\"541,919\",\"551,720\",0.98\n\
             경기도 용인시 기흥구 (4146300000),\"434,629\",\"180,111\",2.41,\"214,022\",\"220,607\",0.97\n\
             경기도 용인시 처인구 포곡읍(4146125000),\"40,123\",\"18,002\",2.23,\"20,500\",\"19,623\",1.04\n"
        )
    }

    #[test]
    fn thousands_separated_cells_parse() {
        assert_eq!(clean_integer("1,093,639"), Some(1_093_639));
        assert_eq!(clean_integer(" 42 "), Some(42));
        assert_eq!(clean_decimal("1,234.5"), Some(1234.5));
    }

    #[test]
    fn non_numeric_cells_are_rejected() {
        assert_eq!(clean_integer(""), None);
        assert_eq!(clean_integer("-5"), None);
        assert_eq!(clean_integer("n/a"), None);
        assert_eq!(clean_decimal("NaN"), None);
        assert_eq!(clean_decimal("-0.5"), None);
    }

    #[test]
    fn cleaning_is_idempotent_per_cell() {
        let once = clean_integer("1,093,639").unwrap();
        assert_eq!(clean_integer(&once.to_string()), Some(once));

        let once = clean_decimal("2.43").unwrap();
        assert_eq!(clean_decimal(&once.to_string()), Some(once));
    }

    #[test]
    fn clean_preserves_rows_and_derives_hierarchy() {
        let table = DataNormalizer::new().clean(&sample_csv()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.columns.len(), 7);
        assert!(table.extra_columns.is_empty());

        let first = &table.records[0];
        assert_eq!(first.total_population, 1_093_639);
        assert_eq!(first.region.city.as_deref(), Some("용인시"));
        assert_eq!(first.region.district, None);

        let giheung = &table.records[1];
        assert_eq!(giheung.region_label, "경기도 용인시 기흥구 (4146300000)");
        assert_eq!(giheung.total_population, 434_629);
        assert_eq!(giheung.male_population, 214_022);
        assert_eq!(giheung.female_population, 220_607);
        assert_eq!(giheung.region.district.as_deref(), Some("기흥구"));
        assert_eq!(giheung.region.subdivision, None);

        assert_eq!(table.records[2].region.subdivision.as_deref(), Some("포곡읍"));
    }

    #[test]
    fn parse_error_points_at_line_and_column() {
        let csv = format!("{HEADER}\n경기도 용인시 (4146000000),\"1,093,639\",없음,2.43,1,1,0.98\n");
        let err = DataNormalizer::new().clean(&csv).unwrap_err();
        match err {
            DatasetError::Parse(e) => {
                assert_eq!(e.line, 2);
                assert_eq!(e.column, "2025년08월_세대수");
                assert_eq!(e.value, "없음");
                assert_eq!(e.expected, NumericKind::Integer);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_column_is_a_load_error() {
        let csv = "행정구역,2025년08월_총인구수\n경기도 용인시,1\n";
        let err = DataNormalizer::new().clean(csv).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::Load(LoadError::MissingColumn("세대수"))
        ));
    }

    #[test]
    fn unknown_columns_are_kept_in_order() {
        let csv = format!(
            "비고,{HEADER}\n메모,경기도 용인시 (4146000000),10,5,2.0,5,5,1.0\n"
        );
        let table = DataNormalizer::new().clean(&csv).unwrap();
        assert_eq!(table.columns[0], "비고");
        assert_eq!(table.extra_columns, vec!["비고".to_string()]);
        assert_eq!(table.records[0].extra, vec!["메모".to_string()]);
    }

    #[test]
    fn written_table_reloads_to_the_same_records() {
        let normalizer = DataNormalizer::new();
        let table = normalizer.clean(&sample_csv()).unwrap();

        let mut buf = Vec::new();
        write_csv(&table, &mut buf).unwrap();
        let reloaded = normalizer.clean(std::str::from_utf8(&buf).unwrap()).unwrap();

        assert_eq!(reloaded, table);
    }

    #[test]
    fn rederive_is_idempotent() {
        let normalizer = DataNormalizer::new();
        let table = normalizer.clean(&sample_csv()).unwrap();
        let again = normalizer.rederive(&table);
        assert_eq!(again, table);
        assert_eq!(normalizer.rederive(&again), again);
    }

    #[test]
    fn load_bytes_records_meta() {
        let dataset = DataNormalizer::new()
            .load_bytes(sample_csv().as_bytes(), "memory")
            .unwrap();
        assert_eq!(dataset.meta.rows, 3);
        assert_eq!(dataset.meta.encoding, "UTF-8");
        assert_eq!(dataset.meta.reference_period.as_deref(), Some("2025년08월"));
        assert_eq!(dataset.meta.fingerprint.len(), 64);
    }
}
