//! Настройки процесса из переменных окружения

use std::net::SocketAddr;
use std::path::PathBuf;

use encoding_rs::Encoding;

use crate::error::ConfigError;
use crate::preprocessing::decoding::DEFAULT_ENCODINGS;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub encodings: Vec<&'static Encoding>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data.csv"),
            host: "0.0.0.0".to_string(),
            port: 8000,
            encodings: DEFAULT_ENCODINGS.to_vec(),
        }
    }
}

impl AppConfig {
    /// `CENSUS_DATA_PATH`, `HOST`, `PORT`, `CENSUS_ENCODINGS`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup("CENSUS_DATA_PATH") {
            config.data_path = PathBuf::from(path);
        }
        if let Some(host) = lookup("HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: "PORT",
                value: port.clone(),
            })?;
        }
        if let Some(labels) = lookup("CENSUS_ENCODINGS") {
            config.encodings = parse_encodings(&labels)?;
        }

        Ok(config)
    }

    /// `HOST` может быть IP-адресом или именем (`localhost`); берётся первый адрес
    pub async fn resolve_addr(&self) -> Result<SocketAddr, ConfigError> {
        let mut addrs = tokio::net::lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(|source| ConfigError::UnresolvableHost {
                host: self.host.clone(),
                source,
            })?;

        addrs.next().ok_or_else(|| ConfigError::InvalidValue {
            name: "HOST",
            value: self.host.clone(),
        })
    }
}

/// Список меток через запятую, например `utf-8,windows-949`
pub fn parse_encodings(labels: &str) -> Result<Vec<&'static Encoding>, ConfigError> {
    let encodings = labels
        .split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| {
            Encoding::for_label(l.as_bytes()).ok_or_else(|| ConfigError::UnknownEncoding(l.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if encodings.is_empty() {
        return Err(ConfigError::InvalidValue {
            name: "CENSUS_ENCODINGS",
            value: labels.to_string(),
        });
    }
    Ok(encodings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{EUC_KR, UTF_8};
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.data_path, PathBuf::from("data.csv"));
        assert_eq!(config.port, 8000);
        assert_eq!(config.encodings, vec![UTF_8, EUC_KR]);
    }

    #[tokio::test]
    async fn resolves_ip_literals_and_host_names() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        let addr = config.resolve_addr().await.unwrap();
        assert_eq!(addr.port(), 8000);
        assert!(addr.ip().is_unspecified());

        let config = AppConfig::from_lookup(lookup(&[("HOST", "localhost"), ("PORT", "9100")])).unwrap();
        let addr = config.resolve_addr().await.unwrap();
        assert_eq!(addr.port(), 9100);
        assert!(addr.ip().is_loopback());
    }

    #[tokio::test]
    async fn malformed_host_is_rejected() {
        let config = AppConfig::from_lookup(lookup(&[("HOST", "not a host")])).unwrap();
        assert!(matches!(
            config.resolve_addr().await,
            Err(ConfigError::UnresolvableHost { .. }) | Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn reads_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("CENSUS_DATA_PATH", "/srv/yongin.csv"),
            ("HOST", "127.0.0.1"),
            ("PORT", "9100"),
            ("CENSUS_ENCODINGS", "windows-949, utf-8"),
        ]))
        .unwrap();
        assert_eq!(config.data_path, PathBuf::from("/srv/yongin.csv"));
        assert_eq!(config.port, 9100);
        assert_eq!(config.encodings, vec![EUC_KR, UTF_8]);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("PORT", "eighty")])),
            Err(ConfigError::InvalidValue { name: "PORT", .. })
        ));
        assert!(matches!(
            parse_encodings("utf-8,klingon"),
            Err(ConfigError::UnknownEncoding(label)) if label == "klingon"
        ));
        assert!(parse_encodings(" , ").is_err());
    }
}
