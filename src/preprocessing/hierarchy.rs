//! Извлечение иерархии региона (시 > 구/군 > 읍/면/동) из текстовой метки

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::RegionLevels;

/// Стратегия разбора метки региона. Разбор свободного текста неоднозначен,
/// поэтому правила можно заменить, не трогая загрузчик и фильтры.
pub trait RegionExtractor: Send + Sync {
    fn extract(&self, label: &str) -> RegionLevels;
}

static CITY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+시").expect("valid city pattern"));
static DISTRICT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\w+구|\w+군").expect("valid district pattern"));
static SUBDIVISION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\w+읍|\w+면|\w+동").expect("valid subdivision pattern"));

/// Поиск по суффиксу: первое совпадение слева для каждого уровня независимо
#[derive(Debug, Clone, Copy, Default)]
pub struct SuffixPatternExtractor;

impl RegionExtractor for SuffixPatternExtractor {
    fn extract(&self, label: &str) -> RegionLevels {
        let first = |re: &Regex| re.find(label).map(|m| m.as_str().to_string());
        RegionLevels {
            city: first(&CITY_RE),
            district: first(&DISTRICT_RE),
            subdivision: first(&SUBDIVISION_RE),
        }
    }
}
