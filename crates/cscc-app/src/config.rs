//! Loader configuration: dataset layout, country lists and aggregate membership.
//!
//! The configuration is an immutable value handed to the loader at
//! construction; nothing here is global.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cscc_core::{CountryCode, Scenario, WORLD_CODE};
use cscc_data::{CsvSource, scenario_path};
use cscc_metrics::{AggregateSpec, MetricOptions};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// G20 member countries, the default published subset.
const MAJOR_ECONOMIES: [&str; 19] = [
    "USA", "CHN", "IND", "RUS", "BRA", "JPN", "DEU", "SAU", "GBR", "FRA", "ITA", "CAN", "AUS",
    "KOR", "IDN", "MEX", "ZAF", "TUR", "ARG",
];

const EU28: [&str; 28] = [
    "AUT", "BEL", "BGR", "HRV", "CYP", "CZE", "DNK", "EST", "FIN", "FRA", "DEU", "GRC", "HUN",
    "IRL", "ITA", "LVA", "LTU", "LUX", "MLT", "NLD", "POL", "PRT", "ROU", "SVK", "SVN", "ESP",
    "SWE", "GBR",
];

fn codes(raw: &[&str]) -> Vec<CountryCode> {
    raw.iter().filter_map(|c| CountryCode::parse(c).ok()).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Directory holding the per-scenario files.
    pub data_dir: PathBuf,
    pub reference_file: PathBuf,
    /// Full unsplit dataset, used for country ranges and splitting.
    pub dataset_file: PathBuf,
    pub world_code: CountryCode,
    /// `prtp` value that marks the fixed discounting parameterization.
    pub fixed_prtp: String,
    /// Countries published in the metric list; `None` publishes all.
    pub allow_list: Option<Vec<CountryCode>>,
    pub aggregate: Option<AggregateSpec>,
    /// Give up on a fetch whose sources have not both completed by then.
    pub fetch_timeout_ms: Option<u64>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("sourcedata/filtered"),
            reference_file: PathBuf::from("sourcedata/country_reference.csv"),
            dataset_file: PathBuf::from("sourcedata/cscc_v1.csv"),
            world_code: WORLD_CODE,
            fixed_prtp: cscc_data::filter::DEFAULT_FIXED_PRTP.to_string(),
            allow_list: Some(codes(&MAJOR_ECONOMIES)),
            aggregate: CountryCode::parse("EUU").ok().map(|code| AggregateSpec {
                code,
                label: "European Union".to_string(),
                members: codes(&EU28),
            }),
            fetch_timeout_ms: Some(30_000),
        }
    }
}

impl LoaderConfig {
    pub fn scenario_source(&self, scenario: &Scenario) -> CsvSource {
        CsvSource::Path(scenario_path(&self.data_dir, scenario))
    }

    pub fn reference_source(&self) -> CsvSource {
        CsvSource::Path(self.reference_file.clone())
    }

    pub fn dataset_source(&self) -> CsvSource {
        CsvSource::Path(self.dataset_file.clone())
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }

    pub fn metric_options(&self) -> MetricOptions {
        MetricOptions {
            world_code: self.world_code,
            allow_list: self.allow_list.clone(),
            aggregate: self.aggregate.clone(),
        }
    }
}

/// Load configuration from a YAML file.
pub fn load_config(path: &Path) -> AppResult<LoaderConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ConfigFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: LoaderConfig = serde_yaml::from_str(&content)
        .map_err(|e| AppError::Config(format!("Failed to parse config YAML: {}", e)))?;

    validate_config(&config)?;
    Ok(config)
}

/// Save configuration to a YAML file.
pub fn save_config(path: &Path, config: &LoaderConfig) -> AppResult<()> {
    let content = serde_yaml::to_string(config)
        .map_err(|e| AppError::Config(format!("Failed to serialize config: {}", e)))?;

    std::fs::write(path, content).map_err(|e| AppError::ConfigFileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

pub fn default_config_yaml() -> AppResult<String> {
    serde_yaml::to_string(&LoaderConfig::default())
        .map_err(|e| AppError::Config(format!("Failed to serialize config: {}", e)))
}

pub fn validate_config(config: &LoaderConfig) -> AppResult<()> {
    if config.fixed_prtp.trim().is_empty() {
        return Err(AppError::Validation("fixed_prtp must not be empty".to_string()));
    }

    if config.fetch_timeout_ms == Some(0) {
        return Err(AppError::Validation(
            "fetch_timeout_ms must be positive when set".to_string(),
        ));
    }

    if let Some(allow_list) = &config.allow_list {
        if allow_list.is_empty() {
            return Err(AppError::Validation(
                "allow_list must name at least one country; omit it to publish all".to_string(),
            ));
        }
    }

    if let Some(aggregate) = &config.aggregate {
        if aggregate.members.is_empty() {
            return Err(AppError::Validation(format!(
                "Aggregate '{}' must have at least one member",
                aggregate.code
            )));
        }
        if aggregate.code == config.world_code {
            return Err(AppError::Validation(format!(
                "Aggregate code '{}' collides with the world code",
                aggregate.code
            )));
        }
        let mut seen = HashSet::new();
        for member in &aggregate.members {
            if !seen.insert(*member) {
                return Err(AppError::Validation(format!(
                    "Aggregate '{}' lists member '{}' twice",
                    aggregate.code, member
                )));
            }
        }
    }

    Ok(())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn yaml_roundtrip_keeps_user_values(
            raw_codes in prop::collection::vec("[A-Z]{3}", 1..12),
            fixed_prtp in "[1-9]p[0-9]",
            timeout in prop::option::of(1u64..3_600_000),
        ) {
            let allow_list: Vec<CountryCode> = raw_codes
                .iter()
                .map(|c| CountryCode::parse(c).unwrap())
                .collect();
            let config = LoaderConfig {
                allow_list: Some(allow_list),
                fixed_prtp,
                fetch_timeout_ms: timeout,
                ..LoaderConfig::default()
            };
            prop_assert!(validate_config(&config).is_ok());

            let yaml = serde_yaml::to_string(&config).unwrap();
            let parsed: LoaderConfig = serde_yaml::from_str(&yaml).unwrap();
            prop_assert_eq!(parsed, config);
        }
    }
}
