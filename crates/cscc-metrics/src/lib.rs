//! cscc-metrics: derived per-country metrics for the CSCC charts.
//!
//! - join: scenario rows x reference table -> per-country metrics
//! - aggregate: one synthetic row for a fixed member list (e.g. the EU)
//! - metric_set: join + allow-list + aggregate, as published to views
//! - range: percentile bands, extents and linear scales for one country
//! - emissions: emissions-share derivation from a wide emissions table

pub mod aggregate;
pub mod emissions;
pub mod error;
pub mod join;
pub mod metric_set;
pub mod range;

pub use aggregate::{AggregateMetric, AggregateSpec, AggregateUnavailable, aggregate};
pub use emissions::{EmissionsShareRow, EmissionsShareTable, derive_emissions_share};
pub use error::{MetricsError, MetricsResult};
pub use join::{
    DerivedCountryMetric, JoinedMetrics, ReferenceMatch, WorldMedian, join_reference, restrict_to,
};
pub use metric_set::{MetricOptions, MetricSet, build_metric_set};
pub use range::{
    DistributionRange, Extent, LinearScale, PathwayGrid, PercentileBand, country_range_filter,
    load_country_range, tick_values,
};
