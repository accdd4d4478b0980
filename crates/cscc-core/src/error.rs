use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid country code: {value:?}")]
    InvalidCountryCode { value: String },

    #[error("Unknown {dimension}: {value:?}")]
    UnknownScenarioValue {
        dimension: &'static str,
        value: String,
    },
}
