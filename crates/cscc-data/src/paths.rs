//! File naming of the per-scenario and per-country extracts.

use std::path::{Path, PathBuf};

use cscc_core::{CountryCode, DamageModel, Rcp, Scenario, Ssp};

/// `rcp_{RCP}_dmg_{DMG}_ssp_{SSP}.csv`
pub fn scenario_file_name(rcp: Rcp, damage_model: DamageModel, ssp: Ssp) -> String {
    format!("rcp_{rcp}_dmg_{damage_model}_ssp_{ssp}.csv")
}

/// Scenario file for a selection, resolved under the data directory. The
/// discount treatment is not part of the name: both live in the same file.
pub fn scenario_path(data_dir: &Path, scenario: &Scenario) -> PathBuf {
    data_dir.join(scenario_file_name(
        scenario.rcp,
        scenario.damage_model,
        scenario.ssp,
    ))
}

/// `iso3_{CODE}.csv`
pub fn country_file_name(code: CountryCode) -> String {
    format!("iso3_{code}.csv")
}
