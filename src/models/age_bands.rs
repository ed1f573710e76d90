//! Синтетическое распределение по возрасту.
//!
//! В выгрузке нет данных по возрастам. Полосы ниже получаются делением общей
//! численности по фиксированной таблице долей и служат только иллюстрацией:
//! результат всегда помечен `synthetic = true`.

use serde::{Deserialize, Serialize};

use crate::models::summary::saturating_total;

pub const SYNTHETIC_NOTICE: &str =
    "Illustrative only: age bands are apportioned from a fixed proportion table, not measured data.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeBandGroup {
    Youth,
    WorkingAge,
    Senior,
}

impl AgeBandGroup {
    pub const ALL: [AgeBandGroup; 3] = [
        AgeBandGroup::Youth,
        AgeBandGroup::WorkingAge,
        AgeBandGroup::Senior,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AgeBandGroup::Youth => "youth",
            AgeBandGroup::WorkingAge => "working_age",
            AgeBandGroup::Senior => "senior",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.as_str() == value)
    }

    fn for_lower_bound(lower: u32) -> Self {
        match lower {
            0..=14 => AgeBandGroup::Youth,
            15..=64 => AgeBandGroup::WorkingAge,
            _ => AgeBandGroup::Senior,
        }
    }
}

/// (метка, нижняя граница, доля). Доли в сумме дают 1.0; во время
/// выполнения это не проверяется.
const AGE_PROPORTIONS: [(&str, u32, f64); 18] = [
    ("0-4", 0, 0.030),
    ("5-9", 5, 0.038),
    ("10-14", 10, 0.045),
    ("15-19", 15, 0.046),
    ("20-24", 20, 0.055),
    ("25-29", 25, 0.062),
    ("30-34", 30, 0.060),
    ("35-39", 35, 0.064),
    ("40-44", 40, 0.075),
    ("45-49", 45, 0.082),
    ("50-54", 50, 0.085),
    ("55-59", 55, 0.080),
    ("60-64", 60, 0.078),
    ("65-69", 65, 0.065),
    ("70-74", 70, 0.045),
    ("75-79", 75, 0.035),
    ("80-84", 80, 0.030),
    ("85+", 85, 0.025),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeBand {
    pub label: String,
    pub group: AgeBandGroup,
    pub total: u64,
    pub male: u64,
    pub female: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeBandTable {
    pub synthetic: bool,
    pub notice: String,
    pub bands: Vec<AgeBand>,
}

impl AgeBandTable {
    /// Оставляет полосы одной группы; `None` ничего не отсекает
    pub fn filter_group(&self, group: Option<AgeBandGroup>) -> AgeBandTable {
        AgeBandTable {
            synthetic: self.synthetic,
            notice: self.notice.clone(),
            bands: self
                .bands
                .iter()
                .filter(|b| group.map_or(true, |g| b.group == g))
                .cloned()
                .collect(),
        }
    }

    pub fn total(&self) -> u64 {
        saturating_total(self.bands.iter().map(|b| b.total))
    }
}

/// Делит `total` на 18 пятилетних полос и каждую полосу между полами
/// по общей доле мужчин. Округление вниз: теряется не более единицы на полосу.
pub fn synthesize_age_bands(total: u64, male: u64, female: u64) -> AgeBandTable {
    // Доля считается в f64: сумма счётчиков может не поместиться в u64
    let sexed = male as f64 + female as f64;
    let male_share = if sexed > 0.0 {
        male as f64 / sexed
    } else {
        0.5
    };

    let bands = AGE_PROPORTIONS
        .iter()
        .map(|&(label, lower, proportion)| {
            let band_total = (total as f64 * proportion).floor() as u64;
            let band_male = ((band_total as f64 * male_share).floor() as u64).min(band_total);
            AgeBand {
                label: label.to_string(),
                group: AgeBandGroup::for_lower_bound(lower),
                total: band_total,
                male: band_male,
                female: band_total - band_male,
            }
        })
        .collect();

    AgeBandTable {
        synthetic: true,
        notice: SYNTHETIC_NOTICE.to_string(),
        bands,
    }
}
