//! Split the full dataset into per-scenario and per-country files.
//!
//! Every (RCP, damage model, SSP) combination gets a file named the way the
//! loader resolves it, even when no row matches. Each country code present in
//! the dataset gets an `iso3_{CODE}.csv`. A `manifest.json` next to the files
//! records row counts and the SHA-256 of the source.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use cscc_core::{CountryCode, DamageModel, Rcp, Ssp};
use cscc_data::{
    CsvSource, DataError, NumericColumns, Record, RowParser, columns, country_file_name,
    scenario_file_name,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::error::AppResult;

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq)]
pub struct SplitOptions {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub scenarios: bool,
    pub countries: bool,
}

impl SplitOptions {
    pub fn new(source: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
            scenarios: true,
            countries: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitFile {
    pub file_name: String,
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitManifest {
    pub source: String,
    pub source_sha256: String,
    pub timestamp: String,
    pub rows_read: usize,
    pub scenario_files: Vec<SplitFile>,
    pub country_files: Vec<SplitFile>,
}

pub fn source_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Short rows are padded with empty cells so every output file stays
/// rectangular; the parser already drops cells past the header width.
fn padded_row(record: &Record, width: usize) -> Vec<String> {
    let mut cells: Vec<String> = record.values().iter().map(|field| field.to_raw()).collect();
    cells.resize(width, String::new());
    cells
}

fn write_group(
    dest: &Path,
    file_name: String,
    headers: &[String],
    rows: &[&Record],
) -> AppResult<SplitFile> {
    let mut writer = csv::Writer::from_path(dest.join(&file_name))?;
    writer.write_record(headers)?;
    for record in rows {
        writer.write_record(padded_row(record, headers.len()))?;
    }
    writer.flush()?;
    Ok(SplitFile {
        file_name,
        rows: rows.len(),
    })
}

fn require_column(headers: &[String], column: &'static str) -> AppResult<()> {
    if headers.iter().any(|h| h == column) {
        Ok(())
    } else {
        Err(DataError::MissingColumn {
            column,
            context: "dataset",
        }
        .into())
    }
}

fn scenario_groups<'a>(records: &'a [Record]) -> Vec<(String, Vec<&'a Record>)> {
    let mut groups = Vec::new();
    for ssp in Ssp::ALL {
        for damage_model in DamageModel::ALL {
            for rcp in Rcp::ALL {
                let rows = records
                    .iter()
                    .filter(|r| {
                        r.text_eq(columns::RCP, rcp.as_str())
                            && r.text_eq(columns::RUN, damage_model.as_str())
                            && r.text_eq(columns::SSP, ssp.as_str())
                    })
                    .collect();
                groups.push((scenario_file_name(rcp, damage_model, ssp), rows));
            }
        }
    }
    groups
}

fn country_groups<'a>(records: &'a [Record]) -> Vec<(String, Vec<&'a Record>)> {
    let mut by_code: BTreeMap<CountryCode, Vec<&'a Record>> = BTreeMap::new();
    for record in records {
        let Some(raw) = record.text(columns::ISO3) else {
            continue;
        };
        match CountryCode::parse(raw) {
            Ok(code) => by_code.entry(code).or_default().push(record),
            Err(err) => warn!(line = record.line, %err, "skipping row with invalid country code"),
        }
    }
    by_code
        .into_iter()
        .map(|(code, rows)| (country_file_name(code), rows))
        .collect()
}

/// Split `options.source` into `options.dest` and write the manifest.
pub fn split_dataset(options: &SplitOptions) -> AppResult<SplitManifest> {
    let bytes = fs::read(&options.source)?;
    let source_sha256 = source_digest(&bytes);

    let mut stream = RowParser::new(CsvSource::Path(options.source.clone()))
        .numeric_columns(NumericColumns::None)
        .rows()?;
    let headers = stream.headers().to_vec();
    for column in [columns::ISO3, columns::SSP, columns::RCP, columns::RUN] {
        require_column(&headers, column)?;
    }
    let records: Vec<Record> = stream.by_ref().filter_map(Result::ok).collect();
    let rows_read = stream.summary().rows_read;

    fs::create_dir_all(&options.dest)?;

    let mut groups = Vec::new();
    if options.scenarios {
        groups.extend(scenario_groups(&records).into_iter().map(|g| (true, g)));
    }
    if options.countries {
        groups.extend(country_groups(&records).into_iter().map(|g| (false, g)));
    }
    info!(files = groups.len(), rows = records.len(), "writing split files");

    let written: Vec<(bool, SplitFile)> = groups
        .into_par_iter()
        .map(|(is_scenario, (file_name, rows))| {
            write_group(&options.dest, file_name, &headers, &rows).map(|file| (is_scenario, file))
        })
        .collect::<AppResult<_>>()?;

    let (scenario_files, country_files): (Vec<_>, Vec<_>) =
        written.into_iter().partition(|(is_scenario, _)| *is_scenario);

    let manifest = SplitManifest {
        source: options.source.display().to_string(),
        source_sha256,
        timestamp: chrono::Utc::now().to_rfc3339(),
        rows_read,
        scenario_files: scenario_files.into_iter().map(|(_, f)| f).collect(),
        country_files: country_files.into_iter().map(|(_, f)| f).collect(),
    };

    let manifest_json = serde_json::to_string_pretty(&manifest)?;
    fs::write(options.dest.join(MANIFEST_FILE), manifest_json)?;

    Ok(manifest)
}

/// Read a manifest written by [`split_dataset`].
pub fn load_manifest(dest: &Path) -> AppResult<SplitManifest> {
    let content = fs::read_to_string(dest.join(MANIFEST_FILE))?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_stable_hex() {
        let a = source_digest(b"ISO3,SSP\n");
        let b = source_digest(b"ISO3,SSP\n");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, source_digest(b"ISO3,RCP\n"));
    }

    #[test]
    fn ragged_rows_are_padded_and_split_completes() {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("cscc_split_ragged_{nanos}"));
        fs::create_dir_all(&dir).unwrap();
        let source = dir.join("dataset.csv");
        fs::write(
            &source,
            "run,SSP,RCP,ISO3,50%\n\
             bhm_sr,SSP2,rcp60,USA,48\n\
             bhm_sr,SSP2,rcp60,DEU\n\
             bhm_sr,SSP2,rcp60,FRA,4,extra\n",
        )
        .unwrap();

        let dest = dir.join("out");
        let manifest = split_dataset(&SplitOptions::new(&source, &dest)).unwrap();
        assert_eq!(manifest.rows_read, 3);
        assert!(dest.join(MANIFEST_FILE).exists());

        let sr = manifest
            .scenario_files
            .iter()
            .find(|f| f.file_name == "rcp_rcp60_dmg_bhm_sr_ssp_SSP2.csv")
            .unwrap();
        assert_eq!(sr.rows, 3);
        let written = fs::read_to_string(dest.join(&sr.file_name)).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(
            lines,
            vec![
                "run,SSP,RCP,ISO3,50%",
                "bhm_sr,SSP2,rcp60,USA,48",
                "bhm_sr,SSP2,rcp60,DEU,",
                "bhm_sr,SSP2,rcp60,FRA,4",
            ]
        );

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn every_scenario_combination_gets_a_group() {
        let groups = scenario_groups(&[]);
        assert_eq!(
            groups.len(),
            Ssp::ALL.len() * DamageModel::ALL.len() * Rcp::ALL.len()
        );
        assert!(groups.iter().any(|(name, _)| name == "rcp_rcp60_dmg_bhm_sr_ssp_SSP2.csv"));
        assert!(groups.iter().all(|(_, rows)| rows.is_empty()));
    }
}
