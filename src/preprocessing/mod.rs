/// Модуль предобработки выгрузки

pub mod decoding;
pub mod hierarchy;
pub mod normalization;

pub use hierarchy::{RegionExtractor, SuffixPatternExtractor};
pub use normalization::{clean_decimal, clean_integer, load_and_clean, write_csv, DataNormalizer};
