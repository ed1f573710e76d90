//! Ошибки загрузки и разбора выгрузки

use std::path::PathBuf;

use thiserror::Error;

/// Источник не удалось прочитать или привести к таблице
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("source file not found: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("source is not valid in any of the tried encodings: {}", .tried.join(", "))]
    Undecodable { tried: Vec<&'static str> },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("required column '{0}' is missing from the header")]
    MissingColumn(&'static str),
}

/// Какой тип ожидался в ячейке
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericKind {
    Integer,
    Decimal,
}

impl std::fmt::Display for NumericKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NumericKind::Integer => f.write_str("non-negative integer"),
            NumericKind::Decimal => f.write_str("non-negative decimal"),
        }
    }
}

/// Ячейка не является числом после удаления разделителей
#[derive(Debug, Clone, Error, PartialEq)]
#[error("line {line}, column '{column}': expected {expected}, got '{value}'")]
pub struct ParseError {
    pub line: u64,
    pub column: String,
    pub value: String,
    pub expected: NumericKind,
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown text encoding label '{0}'")]
    UnknownEncoding(String),

    #[error("invalid value for {name}: '{value}'")]
    InvalidValue { name: &'static str, value: String },

    #[error("cannot resolve host '{host}': {source}")]
    UnresolvableHost {
        host: String,
        #[source]
        source: std::io::Error,
    },
}
