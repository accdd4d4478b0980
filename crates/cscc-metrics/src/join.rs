//! Scenario rows joined against the reference table.

use cscc_core::{CountryCode, country_label, log10_or_zero, ratio_or_zero};
use cscc_data::{ReferenceRow, ReferenceTable, ScenarioRow};
use serde::Serialize;
use tracing::warn;

/// Whether a metric was computed from a reference row or is a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceMatch {
    Matched,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedCountryMetric {
    pub country_code: CountryCode,
    pub label: String,
    pub median: f64,
    pub scc_per_capita: f64,
    pub log_gdp: f64,
    pub share_emissions: f64,
    pub share_of_global_cost: f64,
    pub reference: ReferenceMatch,
}

/// Median of the world-total row, or the fallback divisor when that row is
/// absent from the scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum WorldMedian {
    Found(f64),
    Fallback,
}

impl WorldMedian {
    pub const FALLBACK_DIVISOR: f64 = 1.0;

    pub fn find(rows: &[ScenarioRow], world_code: CountryCode) -> Self {
        rows.iter()
            .find(|row| row.country_code == world_code)
            .map(|row| WorldMedian::Found(row.median))
            .unwrap_or(WorldMedian::Fallback)
    }

    pub fn divisor(self) -> f64 {
        match self {
            WorldMedian::Found(v) => v,
            WorldMedian::Fallback => Self::FALLBACK_DIVISOR,
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            WorldMedian::Found(v) => Some(v),
            WorldMedian::Fallback => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinedMetrics {
    /// One metric per input row, in input order.
    pub metrics: Vec<DerivedCountryMetric>,
    pub world_median: WorldMedian,
    pub missing_reference: Vec<CountryCode>,
}

pub(crate) fn label_for(code: CountryCode, reference: Option<&ReferenceRow>) -> String {
    reference
        .map(|r| r.country_name.as_str())
        .filter(|name| !name.is_empty())
        .or_else(|| country_label(code))
        .map(str::to_string)
        .unwrap_or_else(|| code.to_string())
}

/// Metric for one scenario row. Without a reference row every derived value
/// is zero and the metric is tagged [`ReferenceMatch::Missing`].
pub fn derive_metric(
    row: &ScenarioRow,
    reference: Option<&ReferenceRow>,
    world_median: WorldMedian,
) -> DerivedCountryMetric {
    let label = label_for(row.country_code, reference);
    match reference {
        Some(reference) => {
            let population = reference.population.unwrap_or(0.0);
            DerivedCountryMetric {
                country_code: row.country_code,
                label,
                median: row.median,
                scc_per_capita: ratio_or_zero(1_000_000.0 * row.median, population),
                log_gdp: log10_or_zero(reference.gdp.unwrap_or(0.0)),
                share_emissions: 100.0 * reference.emissions_share.unwrap_or(0.0),
                share_of_global_cost: ratio_or_zero(100.0 * row.median, world_median.divisor()),
                reference: ReferenceMatch::Matched,
            }
        }
        None => DerivedCountryMetric {
            country_code: row.country_code,
            label,
            median: row.median,
            scc_per_capita: 0.0,
            log_gdp: 0.0,
            share_emissions: 0.0,
            share_of_global_cost: 0.0,
            reference: ReferenceMatch::Missing,
        },
    }
}

/// Join every scenario row with its reference row. Pure: the same inputs
/// always produce the same output.
pub fn join_reference(
    rows: &[ScenarioRow],
    reference: &ReferenceTable,
    world_code: CountryCode,
) -> JoinedMetrics {
    let world_median = WorldMedian::find(rows, world_code);
    if world_median == WorldMedian::Fallback {
        warn!(world = %world_code, "world-total row missing, shares use fallback divisor");
    }

    let mut missing_reference = Vec::new();
    let metrics = rows
        .iter()
        .map(|row| {
            let reference_row = reference.get(row.country_code);
            // The world total has no reference row of its own.
            if reference_row.is_none() && row.country_code != world_code {
                warn!(country = %row.country_code, "no reference row for country");
                missing_reference.push(row.country_code);
            }
            derive_metric(row, reference_row, world_median)
        })
        .collect();

    JoinedMetrics {
        metrics,
        world_median,
        missing_reference,
    }
}

/// Keep only metrics whose code is in `allow_list`, preserving order.
pub fn restrict_to(
    metrics: &[DerivedCountryMetric],
    allow_list: &[CountryCode],
) -> Vec<DerivedCountryMetric> {
    metrics
        .iter()
        .filter(|m| allow_list.contains(&m.country_code))
        .cloned()
        .collect()
}
