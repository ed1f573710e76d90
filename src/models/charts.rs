//! Данные для графиков дашборда. Отрисовка на стороне клиента.

use std::collections::HashMap;

use crate::models::summary::saturating_total;
use crate::types::{BarPoint, ChartSet, HistogramBin, PopulationSplit, SexRatioChart, Table};

pub const HOUSEHOLD_BINS: usize = 20;
pub const PARITY: f64 = 1.0;

pub struct ChartBuilder;

impl ChartBuilder {
    /// `None` для пустой выборки: графики не строятся
    pub fn build(table: &Table) -> Option<ChartSet> {
        if table.is_empty() {
            return None;
        }

        Some(ChartSet {
            population_split: Self::population_split(table),
            region_comparison: Self::region_comparison(table),
            household_histogram: Self::household_histogram(table, HOUSEHOLD_BINS),
            sex_ratio: Self::sex_ratio(table),
        })
    }

    pub fn population_split(table: &Table) -> PopulationSplit {
        PopulationSplit {
            male: saturating_total(table.records.iter().map(|r| r.male_population)),
            female: saturating_total(table.records.iter().map(|r| r.female_population)),
        }
    }

    /// Население по 구/군 в порядке первого появления; строки без района пропускаются
    pub fn region_comparison(table: &Table) -> Vec<BarPoint> {
        let mut bars: Vec<BarPoint> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for record in &table.records {
            let Some(district) = record.region.district.as_deref() else {
                continue;
            };
            let value = record.total_population as f64;
            match index.get(district) {
                Some(&i) => bars[i].value += value,
                None => {
                    index.insert(district, bars.len());
                    bars.push(BarPoint {
                        label: district.to_string(),
                        value,
                    });
                }
            }
        }
        bars
    }

    /// Гистограмма равной ширины по `population_per_household`
    pub fn household_histogram(table: &Table, bins: usize) -> Vec<HistogramBin> {
        let values: Vec<f64> = table
            .records
            .iter()
            .map(|r| r.population_per_household)
            .collect();
        if values.is_empty() || bins == 0 {
            return Vec::new();
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        if max <= min {
            return vec![HistogramBin {
                lower: min,
                upper: max,
                count: values.len(),
            }];
        }

        let width = (max - min) / bins as f64;
        let mut histogram: Vec<HistogramBin> = (0..bins)
            .map(|i| HistogramBin {
                lower: min + width * i as f64,
                upper: if i + 1 == bins {
                    max
                } else {
                    min + width * (i + 1) as f64
                },
                count: 0,
            })
            .collect();

        for v in values {
            // Максимум попадает в последний интервал
            let idx = (((v - min) / width) as usize).min(bins - 1);
            histogram[idx].count += 1;
        }

        histogram
    }

    /// Соотношение полов по регионам, по возрастанию; линия паритета на 1.0
    pub fn sex_ratio(table: &Table) -> SexRatioChart {
        let mut bars: Vec<BarPoint> = table
            .records
            .iter()
            .map(|r| BarPoint {
                label: r.region_label.clone(),
                value: r.male_to_female_ratio,
            })
            .collect();
        bars.sort_by(|a, b| a.value.total_cmp(&b.value));

        SexRatioChart {
            bars,
            reference_line: PARITY,
        }
    }
}
