//! Column names of the published CSV files.

pub const ISO3: &str = "ISO3";
pub const SSP: &str = "SSP";
pub const RCP: &str = "RCP";
pub const RUN: &str = "run";
pub const PRTP: &str = "prtp";
pub const ETA: &str = "eta";
pub const DR: &str = "dr";
pub const DMGFUNCPAR: &str = "dmgfuncpar";
pub const CLIMATE: &str = "climate";
pub const P17: &str = "16.7%";
pub const P50: &str = "50%";
pub const P83: &str = "83.3%";

/// Only the percentile columns of a scenario file are numeric.
pub const PERCENTILE_COLUMNS: [&str; 3] = [P17, P50, P83];

pub const COUNTRY_NAME: &str = "Country Name";
pub const COUNTRY_CODE: &str = "Country Code";
pub const GDP_2017: &str = "2017 GDP";
pub const POPULATION_2017: &str = "2017 Population";
pub const EMISSIONS_2014: &str = "2014 Emissions";
pub const EMISSIONS_SHARE: &str = "Emissions Share";

/// Reference columns starting with this prefix stay textual.
pub const REFERENCE_TEXT_PREFIX: &str = "Country";
