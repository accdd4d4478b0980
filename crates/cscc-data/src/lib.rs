//! cscc-data: CSV ingestion for the CSCC dataset.
//!
//! Rows are parsed lazily, filtered while streaming, and converted into typed
//! scenario and reference rows.

pub mod columns;
pub mod error;
pub mod filter;
pub mod parser;
pub mod paths;
pub mod record;
pub mod rows;

pub use error::{DataError, DataResult, RowError};
pub use filter::{DiscountFilter, RowFilter, ScenarioFilter, ScenarioFilterBuilder, filter_stream};
pub use parser::{CsvSource, NumericColumns, ParseSummary, RowParser, RowStream};
pub use paths::{country_file_name, scenario_file_name, scenario_path};
pub use record::{Field, Record};
pub use rows::{
    DataQualityWarning, ReferenceRow, ReferenceTable, ScenarioBatch, ScenarioRow,
    load_reference_table, load_scenario_rows,
};
