//! Join, allow-list and aggregate combined into the list handed to views.

use cscc_core::{CountryCode, WORLD_CODE};
use cscc_data::{ReferenceTable, ScenarioRow};
use serde::Serialize;

use crate::aggregate::{AggregateMetric, AggregateSpec, AggregateUnavailable, aggregate};
use crate::join::{DerivedCountryMetric, JoinedMetrics, WorldMedian, join_reference, restrict_to};

#[derive(Debug, Clone, PartialEq)]
pub struct MetricOptions {
    pub world_code: CountryCode,
    /// `None` publishes every joined row.
    pub allow_list: Option<Vec<CountryCode>>,
    pub aggregate: Option<AggregateSpec>,
}

impl Default for MetricOptions {
    fn default() -> Self {
        Self {
            world_code: WORLD_CODE,
            allow_list: None,
            aggregate: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSet {
    pub metrics: Vec<DerivedCountryMetric>,
    pub aggregate: Option<AggregateMetric>,
    /// Why the configured aggregate is absent, if it is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregate_unavailable: Option<AggregateUnavailable>,
    pub world_median: WorldMedian,
    pub missing_reference: Vec<CountryCode>,
}

impl MetricSet {
    /// Assemble a set from an already computed join and aggregate result.
    pub fn from_parts(
        joined: JoinedMetrics,
        allow_list: Option<&[CountryCode]>,
        aggregate: Option<Result<AggregateMetric, AggregateUnavailable>>,
    ) -> Self {
        let metrics = match allow_list {
            Some(allow_list) => restrict_to(&joined.metrics, allow_list),
            None => joined.metrics,
        };
        let (aggregate, aggregate_unavailable) = match aggregate {
            Some(Ok(metric)) => (Some(metric), None),
            Some(Err(reason)) => (None, Some(reason)),
            None => (None, None),
        };
        MetricSet {
            metrics,
            aggregate,
            aggregate_unavailable,
            world_median: joined.world_median,
            missing_reference: joined.missing_reference,
        }
    }

    pub fn get(&self, code: CountryCode) -> Option<&DerivedCountryMetric> {
        self.metrics.iter().find(|m| m.country_code == code)
    }
}

pub fn build_metric_set(
    rows: &[ScenarioRow],
    reference: &ReferenceTable,
    options: &MetricOptions,
) -> MetricSet {
    let joined = join_reference(rows, reference, options.world_code);
    let aggregate = options
        .aggregate
        .as_ref()
        .map(|group| aggregate(rows, reference, group, options.world_code));
    MetricSet::from_parts(joined, options.allow_list.as_deref(), aggregate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cscc_core::{DamageModel, Discounting, Rcp, Ssp};
    use cscc_data::ReferenceRow;

    fn code(s: &str) -> CountryCode {
        CountryCode::parse(s).unwrap()
    }

    fn row(c: &str, median: f64) -> ScenarioRow {
        ScenarioRow {
            country_code: code(c),
            ssp: Ssp::Ssp2,
            rcp: Rcp::Rcp60,
            damage_model: DamageModel::BhmSr,
            discounting: Discounting::Fixed,
            percentile17: median,
            median,
            percentile83: median,
        }
    }

    fn reference(c: &str) -> ReferenceRow {
        ReferenceRow {
            country_code: code(c),
            country_name: c.to_string(),
            population: Some(10.0),
            gdp: Some(100.0),
            emissions: None,
            emissions_share: Some(0.1),
        }
    }

    #[test]
    fn aggregate_uses_rows_outside_allow_list() {
        let rows = vec![row("WLD", 100.0), row("DEU", 5.0), row("FRA", 7.0), row("USA", 9.0)];
        let table = ReferenceTable::from_rows([reference("DEU"), reference("FRA"), reference("USA")]);
        let options = MetricOptions {
            allow_list: Some(vec![code("USA")]),
            aggregate: Some(AggregateSpec {
                code: code("EUU"),
                label: "European Union".to_string(),
                members: vec![code("DEU"), code("FRA")],
            }),
            ..MetricOptions::default()
        };

        let set = build_metric_set(&rows, &table, &options);
        assert_eq!(set.metrics.len(), 1);
        assert_eq!(set.metrics[0].country_code, code("USA"));
        let agg = set.aggregate.expect("aggregate should be available");
        assert_eq!(agg.total_cost, 12.0);
        assert!(set.aggregate_unavailable.is_none());
    }

    #[test]
    fn unavailable_aggregate_reports_reason() {
        let rows = vec![row("DEU", 5.0)];
        let table = ReferenceTable::from_rows([reference("DEU")]);
        let options = MetricOptions {
            aggregate: Some(AggregateSpec {
                code: code("EUU"),
                label: "European Union".to_string(),
                members: vec![code("DEU")],
            }),
            ..MetricOptions::default()
        };
        let set = build_metric_set(&rows, &table, &options);
        assert!(set.aggregate.is_none());
        assert!(matches!(
            set.aggregate_unavailable,
            Some(AggregateUnavailable::MissingWorldRow { .. })
        ));
        assert_eq!(set.world_median, WorldMedian::Fallback);
    }
}
