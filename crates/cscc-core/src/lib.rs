//! cscc-core: shared vocabulary for the CSCC explorer.
//!
//! Contains:
//! - ids (ISO3 country codes)
//! - scenario (SSP / RCP / damage model / discounting dimensions)
//! - countries (display label catalog)
//! - numeric (tolerances + guarded float helpers)
//! - error (shared error types)

pub mod countries;
pub mod error;
pub mod ids;
pub mod numeric;
pub mod scenario;

// Re-exports: nice ergonomics for downstream crates
pub use countries::{CountryEntry, country_label, search_countries};
pub use error::{CoreError, CoreResult};
pub use ids::{CountryCode, WORLD_CODE};
pub use numeric::*;
pub use scenario::{DamageModel, Discounting, Rcp, Scenario, Ssp};
