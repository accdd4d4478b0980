//! Typed scenario and reference rows.

use std::collections::HashMap;

use cscc_core::{CountryCode, DamageModel, Discounting, Rcp, Ssp};
use tracing::{debug, warn};

use crate::columns;
use crate::error::{DataResult, RowError};
use crate::filter::{DiscountFilter, ScenarioFilter, filter_stream};
use crate::parser::{CsvSource, NumericColumns, ParseSummary, RowParser};
use crate::record::Record;

/// One damage-model / pathway estimate for one country.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioRow {
    pub country_code: CountryCode,
    pub ssp: Ssp,
    pub rcp: Rcp,
    pub damage_model: DamageModel,
    pub discounting: Discounting,
    pub percentile17: f64,
    pub median: f64,
    pub percentile83: f64,
}

impl ScenarioRow {
    pub fn from_record(record: &Record, fixed_prtp: &str) -> Result<Self, RowError> {
        let text = |column: &'static str| {
            record
                .text(column)
                .ok_or_else(|| RowError::new(record.line, format!("missing {column}")))
        };
        let number = |column: &'static str| {
            record.number(column).ok_or_else(|| {
                RowError::new(record.line, format!("column {column} is not numeric"))
            })
        };
        let parse_err = |e: cscc_core::CoreError| RowError::new(record.line, e.to_string());

        Ok(Self {
            country_code: CountryCode::parse(text(columns::ISO3)?).map_err(parse_err)?,
            ssp: text(columns::SSP)?.parse().map_err(parse_err)?,
            rcp: text(columns::RCP)?.parse().map_err(parse_err)?,
            damage_model: text(columns::RUN)?.parse().map_err(parse_err)?,
            discounting: DiscountFilter::classify(record, fixed_prtp),
            percentile17: number(columns::P17)?,
            median: number(columns::P50)?,
            percentile83: number(columns::P83)?,
        })
    }

    pub fn percentiles_ordered(&self) -> bool {
        self.percentile17 <= self.median && self.median <= self.percentile83
    }
}

/// Non-fatal data problems found while loading a scenario.
#[derive(Debug, Clone, PartialEq)]
pub enum DataQualityWarning {
    PercentileOrder {
        country_code: CountryCode,
        percentile17: f64,
        median: f64,
        percentile83: f64,
    },
    DuplicateCountry {
        country_code: CountryCode,
        line: u64,
    },
}

/// Filtered rows of one scenario load.
#[derive(Debug, Clone, Default)]
pub struct ScenarioBatch {
    pub rows: Vec<ScenarioRow>,
    pub warnings: Vec<DataQualityWarning>,
    /// Rows that passed the filter but could not be typed.
    pub rejected: Vec<RowError>,
    pub summary: ParseSummary,
}

impl ScenarioBatch {
    pub fn get(&self, code: CountryCode) -> Option<&ScenarioRow> {
        self.rows.iter().find(|row| row.country_code == code)
    }
}

/// Stream a scenario file through `filter` and keep the typed rows.
///
/// Country codes stay unique: the first row for a code wins and later ones are
/// reported as [`DataQualityWarning::DuplicateCountry`].
pub fn load_scenario_rows(
    source: CsvSource,
    filter: &ScenarioFilter,
    fixed_prtp: &str,
) -> DataResult<ScenarioBatch> {
    let description = source.describe();
    let mut stream = RowParser::new(source)
        .numeric_columns(NumericColumns::named(columns::PERCENTILE_COLUMNS))
        .rows()?;

    let mut batch = ScenarioBatch::default();
    let mut seen: HashMap<CountryCode, usize> = HashMap::new();

    for item in filter_stream(stream.by_ref(), filter) {
        let record = match item {
            Ok(record) => record,
            Err(_) => continue, // recorded in the stream summary
        };
        let row = match ScenarioRow::from_record(&record, fixed_prtp) {
            Ok(row) => row,
            Err(err) => {
                warn!(%err, "skipping scenario row");
                batch.rejected.push(err);
                continue;
            }
        };
        if seen.contains_key(&row.country_code) {
            warn!(country = %row.country_code, line = record.line, "duplicate country in scenario");
            batch.warnings.push(DataQualityWarning::DuplicateCountry {
                country_code: row.country_code,
                line: record.line,
            });
            continue;
        }
        if !row.percentiles_ordered() {
            warn!(country = %row.country_code, "percentiles out of order");
            batch.warnings.push(DataQualityWarning::PercentileOrder {
                country_code: row.country_code,
                percentile17: row.percentile17,
                median: row.median,
                percentile83: row.percentile83,
            });
        }
        seen.insert(row.country_code, batch.rows.len());
        batch.rows.push(row);
    }

    batch.summary = stream.into_summary();
    debug!(
        source = %description,
        rows_read = batch.summary.rows_read,
        rows_kept = batch.rows.len(),
        "scenario rows loaded"
    );
    Ok(batch)
}

/// Static per-country economic indicators.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceRow {
    pub country_code: CountryCode,
    pub country_name: String,
    pub population: Option<f64>,
    pub gdp: Option<f64>,
    pub emissions: Option<f64>,
    pub emissions_share: Option<f64>,
}

impl ReferenceRow {
    pub fn from_record(record: &Record) -> Result<Self, RowError> {
        let code = record
            .text(columns::COUNTRY_CODE)
            .ok_or_else(|| RowError::new(record.line, "missing Country Code"))?;
        let country_code =
            CountryCode::parse(code).map_err(|e| RowError::new(record.line, e.to_string()))?;
        Ok(Self {
            country_code,
            country_name: record
                .text(columns::COUNTRY_NAME)
                .map(|s| s.trim().to_string())
                .unwrap_or_default(),
            population: record.number(columns::POPULATION_2017),
            gdp: record.number(columns::GDP_2017),
            emissions: record.number(columns::EMISSIONS_2014),
            emissions_share: record.number(columns::EMISSIONS_SHARE),
        })
    }
}

/// Reference rows indexed by country code. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    rows: Vec<ReferenceRow>,
    index: HashMap<CountryCode, usize>,
    pub rejected: Vec<RowError>,
    pub summary: ParseSummary,
}

impl ReferenceTable {
    /// First row per code wins.
    pub fn from_rows(rows: impl IntoIterator<Item = ReferenceRow>) -> Self {
        let mut table = Self::default();
        for row in rows {
            table.insert(row);
        }
        table
    }

    fn insert(&mut self, row: ReferenceRow) -> bool {
        if self.index.contains_key(&row.country_code) {
            return false;
        }
        self.index.insert(row.country_code, self.rows.len());
        self.rows.push(row);
        true
    }

    pub fn get(&self, code: CountryCode) -> Option<&ReferenceRow> {
        self.index.get(&code).map(|&idx| &self.rows[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceRow> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Load the reference table; non-`Country*` columns are numeric.
pub fn load_reference_table(source: CsvSource) -> DataResult<ReferenceTable> {
    let mut stream = RowParser::new(source)
        .numeric_columns(NumericColumns::AllExceptPrefix(
            columns::REFERENCE_TEXT_PREFIX.to_string(),
        ))
        .rows()?;

    let mut table = ReferenceTable::default();
    for item in stream.by_ref() {
        let Ok(record) = item else { continue };
        match ReferenceRow::from_record(&record) {
            Ok(row) => {
                let code = row.country_code;
                if !table.insert(row) {
                    warn!(country = %code, line = record.line, "duplicate reference row ignored");
                }
            }
            Err(err) => {
                debug!(%err, "skipping reference row");
                table.rejected.push(err);
            }
        }
    }
    table.summary = stream.into_summary();
    Ok(table)
}
