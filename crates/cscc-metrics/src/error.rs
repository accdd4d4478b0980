use cscc_data::DataError;

pub type MetricsResult<T> = Result<T, MetricsError>;

#[derive(thiserror::Error, Debug)]
pub enum MetricsError {
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No year column has a positive world total")]
    NoEmissionsYear,

    #[error("Missing column {column:?} in {context}")]
    MissingColumn {
        column: &'static str,
        context: &'static str,
    },
}
