//! Emissions share from a wide, one-column-per-year emissions table.

use std::io::Write;

use cscc_core::WORLD_CODE;
use cscc_data::{CsvSource, NumericColumns, Record, RowParser, columns};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{MetricsError, MetricsResult};

const CONTEXT: &str = "emissions table";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmissionsShareRow {
    pub country_name: String,
    pub country_code: String,
    /// Emissions in the selected year; `None` when the cell is empty.
    pub emissions: Option<f64>,
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmissionsShareTable {
    pub year: u16,
    pub world_total: f64,
    pub rows: Vec<EmissionsShareRow>,
}

impl EmissionsShareTable {
    /// Write the cleaned table in the reference-table column layout.
    pub fn to_csv<W: Write>(&self, writer: W) -> MetricsResult<()> {
        let mut out = csv::Writer::from_writer(writer);
        let year = self.year.to_string();
        out.write_record([
            columns::COUNTRY_NAME,
            columns::COUNTRY_CODE,
            year.as_str(),
            columns::EMISSIONS_SHARE,
        ])?;
        for row in &self.rows {
            let emissions = row.emissions.map(|v| v.to_string()).unwrap_or_default();
            let share = row.share.to_string();
            out.write_record([
                row.country_name.as_str(),
                row.country_code.as_str(),
                emissions.as_str(),
                share.as_str(),
            ])?;
        }
        out.flush()?;
        Ok(())
    }
}

fn year_columns(headers: &[String]) -> Vec<u16> {
    let mut years: Vec<u16> = headers
        .iter()
        .filter(|h| h.len() == 4 && h.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|h| h.parse().ok())
        .collect();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years
}

fn value_in(record: &Record, year: u16) -> Option<f64> {
    let raw = record.text(&year.to_string())?.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn world_total(records: &[Record], year: u16) -> f64 {
    records
        .iter()
        .filter(|r| r.text_eq(columns::COUNTRY_CODE, WORLD_CODE.as_str()))
        .find_map(|r| value_in(r, year))
        .unwrap_or(0.0)
}

/// Pick the latest year with a positive world total and compute every
/// country's share of it. Empty cells give a share of 0.
pub fn derive_emissions_share(source: CsvSource) -> MetricsResult<EmissionsShareTable> {
    let stream = RowParser::new(source)
        .numeric_columns(NumericColumns::None)
        .rows()?;
    let headers = stream.headers().to_vec();
    for column in [columns::COUNTRY_NAME, columns::COUNTRY_CODE] {
        if !headers.iter().any(|h| h == column) {
            return Err(MetricsError::MissingColumn {
                column,
                context: CONTEXT,
            });
        }
    }

    let records: Vec<Record> = stream.filter_map(Result::ok).collect();
    let years = year_columns(&headers);
    debug!(candidates = years.len(), rows = records.len(), "scanning emissions years");

    let (year, total) = years
        .iter()
        .map(|&year| (year, world_total(&records, year)))
        .find(|&(_, total)| total > 0.0)
        .ok_or(MetricsError::NoEmissionsYear)?;
    info!(year, world_total = total, "selected emissions year");

    let rows = records
        .iter()
        .map(|record| {
            let emissions = value_in(record, year);
            EmissionsShareRow {
                country_name: record.text(columns::COUNTRY_NAME).unwrap_or_default().to_string(),
                country_code: record.text(columns::COUNTRY_CODE).unwrap_or_default().to_string(),
                emissions,
                share: emissions.map(|v| v / total).unwrap_or(0.0),
            }
        })
        .collect();

    Ok(EmissionsShareTable {
        year,
        world_total: total,
        rows,
    })
}
