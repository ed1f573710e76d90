use std::io::Write;

use census_dashboard::{
    filter, load_and_clean, synthesize_age_bands, write_csv, DataNormalizer, DatasetError,
    FilterCriteria, LoadError, SummaryCalculator,
};
use encoding_rs::{EUC_KR, UTF_8};

const EXTRACT: &str = "행정구역,2025년08월_총인구수,2025년08월_세대수,2025년08월_세대당 인구,2025년08월_남자 인구수,2025년08월_여자 인구수,2025년08월_남여 비율
경기도 용인시 (4146000000),\"1,093,639\",\"449,693\",2.43,\"541,919\",\"551,720\",0.98
경기도 용인시 처인구 (4146100000),\"290,312\",\"135,447\",2.14,\"149,551\",\"140,761\",1.06
경기도 용인시 처인구 포곡읍(4146125000),\"40,012\",\"18,994\",2.11,\"20,760\",\"19,252\",1.08
경기도 용인시 기흥구 (4146300000),\"434,629\",\"180,111\",2.41,\"214,022\",\"220,607\",0.97
경기도 용인시 기흥구 구갈동(4146352000),\"23,581\",\"10,214\",2.31,\"11,512\",\"12,069\",0.95
경기도 용인시 수지구 (4146500000),\"368,698\",\"134,135\",2.75,\"178,346\",\"190,352\",0.94
";

fn write_temp(bytes: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn loads_legacy_korean_encoded_extract() {
    let (bytes, _, had_errors) = EUC_KR.encode(EXTRACT);
    assert!(!had_errors);
    let file = write_temp(&bytes);

    let dataset = load_and_clean(file.path()).unwrap();
    assert_eq!(dataset.meta.encoding, "EUC-KR");
    assert_eq!(dataset.table.len(), 6);

    let giheung = &dataset.table.records[3];
    assert_eq!(giheung.region.city.as_deref(), Some("용인시"));
    assert_eq!(giheung.region.district.as_deref(), Some("기흥구"));
    assert_eq!(giheung.region.subdivision, None);
    let ratio = giheung.male_population as f64 / giheung.female_population as f64;
    assert!((ratio - 0.970).abs() < 0.001);
}

#[test]
fn loads_utf8_with_bom() {
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(EXTRACT.as_bytes());
    let file = write_temp(&bytes);

    let dataset = DataNormalizer::new()
        .with_encodings(vec![EUC_KR])
        .load_path(file.path())
        .unwrap();
    assert_eq!(dataset.meta.encoding, UTF_8.name());
    assert_eq!(dataset.table.columns[0], "행정구역");
}

#[test]
fn undecodable_source_fails_with_load_error() {
    let (bytes, _, _) = EUC_KR.encode(EXTRACT);
    let file = write_temp(&bytes);

    let err = DataNormalizer::new()
        .with_encodings(vec![UTF_8])
        .load_path(file.path())
        .unwrap_err();
    assert!(matches!(err, DatasetError::Load(LoadError::Undecodable { .. })));
}

#[test]
fn absent_source_fails_with_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_and_clean(dir.path().join("missing.csv")).unwrap_err();
    assert!(matches!(err, DatasetError::Load(LoadError::SourceMissing(_))));
}

#[test]
fn cleaned_export_reloads_identically() {
    let file = write_temp(EXTRACT.as_bytes());
    let first = load_and_clean(file.path()).unwrap();

    let mut exported = Vec::new();
    write_csv(&first.table, &mut exported).unwrap();
    let second = load_and_clean(write_temp(&exported).path()).unwrap();

    assert_eq!(second.table, first.table);
}

#[test]
fn filtered_view_feeds_summary_and_age_bands() {
    let dataset = load_and_clean(write_temp(EXTRACT.as_bytes()).path()).unwrap();
    let criteria = FilterCriteria {
        district: Some("처인구".into()),
        ..Default::default()
    };
    let view = filter(&dataset.table, &criteria);
    assert_eq!(view.len(), 2);

    let summary = SummaryCalculator::compute(&view);
    assert_eq!(summary.total_population, 330_324);

    let male: u64 = view.records.iter().map(|r| r.male_population).sum();
    let female: u64 = view.records.iter().map(|r| r.female_population).sum();
    let bands = synthesize_age_bands(summary.total_population, male, female);
    assert!(bands.synthetic);
    assert!(bands.total() + 18 >= summary.total_population);
    assert!(bands.total() <= summary.total_population);

    // Базовая таблица не меняется
    assert_eq!(dataset.table.len(), 6);
}
