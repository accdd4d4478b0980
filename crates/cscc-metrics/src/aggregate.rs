//! One synthetic row summed over a fixed member list.

use std::collections::HashMap;

use cscc_core::{CountryCode, log10_or_zero, ratio_or_zero};
use cscc_data::{ReferenceTable, ScenarioRow};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::join::WorldMedian;

/// Which countries make up an aggregate, and how it is labelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSpec {
    pub code: CountryCode,
    pub label: String,
    pub members: Vec<CountryCode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateMetric {
    pub country_code: CountryCode,
    pub label: String,
    pub population: f64,
    pub gdp: f64,
    pub total_cost: f64,
    pub scc_per_capita: f64,
    pub log_gdp: f64,
    pub share_emissions: f64,
    pub share_of_global_cost: f64,
    pub members_found: Vec<CountryCode>,
    /// Members lacking a scenario row or a reference row.
    pub members_missing: Vec<CountryCode>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AggregateUnavailable {
    #[error("world-total row {world_code} missing from scenario")]
    MissingWorldRow { world_code: CountryCode },

    #[error("no member of {code} has both scenario and reference data")]
    NoMembers { code: CountryCode },
}

impl Serialize for AggregateUnavailable {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Sum member quantities into one [`AggregateMetric`].
///
/// `rows` must be the unfiltered scenario rows: the allow-list applied to the
/// published metrics has no effect on membership.
pub fn aggregate(
    rows: &[ScenarioRow],
    reference: &ReferenceTable,
    group: &AggregateSpec,
    world_code: CountryCode,
) -> Result<AggregateMetric, AggregateUnavailable> {
    let world_median = match WorldMedian::find(rows, world_code) {
        WorldMedian::Found(v) => v,
        WorldMedian::Fallback => {
            warn!(aggregate = %group.code, world = %world_code, "aggregate unavailable without world row");
            return Err(AggregateUnavailable::MissingWorldRow { world_code });
        }
    };

    let by_code: HashMap<CountryCode, &ScenarioRow> =
        rows.iter().map(|row| (row.country_code, row)).collect();

    let mut population = 0.0;
    let mut gdp = 0.0;
    let mut emissions_share = 0.0;
    let mut total_cost = 0.0;
    let mut members_found = Vec::new();
    let mut members_missing = Vec::new();

    for &member in &group.members {
        match (by_code.get(&member), reference.get(member)) {
            (Some(row), Some(reference_row)) => {
                population += reference_row.population.unwrap_or(0.0);
                gdp += reference_row.gdp.unwrap_or(0.0);
                emissions_share += reference_row.emissions_share.unwrap_or(0.0);
                total_cost += row.median;
                members_found.push(member);
            }
            _ => members_missing.push(member),
        }
    }

    if members_found.is_empty() {
        return Err(AggregateUnavailable::NoMembers { code: group.code });
    }
    if !members_missing.is_empty() {
        debug!(aggregate = %group.code, missing = members_missing.len(), "aggregate members skipped");
    }

    Ok(AggregateMetric {
        country_code: group.code,
        label: group.label.clone(),
        population,
        gdp,
        total_cost,
        scc_per_capita: ratio_or_zero(1_000_000.0 * total_cost, population),
        log_gdp: log10_or_zero(gdp),
        share_emissions: 100.0 * emissions_share,
        share_of_global_cost: ratio_or_zero(100.0 * total_cost, world_median),
        members_found,
        members_missing,
    })
}
