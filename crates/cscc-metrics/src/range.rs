//! Percentile bands of one country across every pathway and damage model.
//!
//! Rows come from the full dataset restricted to one country and one
//! discounting parameterization (`prtp = 2`, `eta = 1p5` by default). The
//! bands are grouped per (SSP, RCP) and damage model, and the axis extent is
//! clamped to a multiple of the reference scenario's spread so one extreme
//! model does not flatten the rest.

use std::collections::BTreeMap;

use cscc_core::{CountryCode, DamageModel, Rcp, Ssp};
use cscc_data::{CsvSource, ScenarioFilter, ScenarioRow, columns, filter_stream};
use cscc_data::{NumericColumns, Record, RowParser};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::MetricsResult;

/// Axis maximum when the reference scenario is absent or ambiguous.
pub const DEFAULT_CLAMP: f64 = 10_000.0;
/// Reference spread multiplier for the inferred clamp.
pub const CLAMP_SPREAD_FACTOR: f64 = 20.0;
pub const DEFAULT_RANGE_PRTP: &str = "2";
pub const DEFAULT_RANGE_ETA: &str = "1p5";

/// Filter selecting one country's rows at a fixed `prtp`/`eta` pair.
pub fn country_range_filter(
    country: CountryCode,
    prtp: &str,
    eta: &str,
) -> MetricsResult<ScenarioFilter> {
    let prtp = prtp.to_string();
    let eta = eta.to_string();
    let filter = ScenarioFilter::builder()
        .country(country)
        .custom(move |record: &Record| {
            record.text_eq(columns::ETA, &eta) && record.text_eq(columns::PRTP, &prtp)
        })
        .build()?;
    Ok(filter)
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PercentileBand {
    pub percentile17: f64,
    pub median: f64,
    pub percentile83: f64,
}

impl PercentileBand {
    /// A band with no spread is drawn without its median marker.
    pub fn has_spread(&self) -> bool {
        self.percentile83 - self.percentile17 != 0.0
    }
}

impl From<&ScenarioRow> for PercentileBand {
    fn from(row: &ScenarioRow) -> Self {
        Self {
            percentile17: row.percentile17,
            median: row.median,
            percentile83: row.percentile83,
        }
    }
}

/// Bands keyed by (SSP, RCP), then damage model. Later rows overwrite
/// earlier ones for the same key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathwayGrid {
    cells: BTreeMap<(Ssp, Rcp), BTreeMap<DamageModel, PercentileBand>>,
}

impl PathwayGrid {
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a ScenarioRow>) -> Self {
        let mut grid = Self::default();
        for row in rows {
            grid.cells
                .entry((row.ssp, row.rcp))
                .or_default()
                .insert(row.damage_model, PercentileBand::from(row));
        }
        grid
    }

    pub fn get(&self, ssp: Ssp, rcp: Rcp, damage_model: DamageModel) -> Option<&PercentileBand> {
        self.cells.get(&(ssp, rcp))?.get(&damage_model)
    }

    /// Band for a cell; missing cells render as an all-zero band.
    pub fn band(&self, ssp: Ssp, rcp: Rcp, damage_model: DamageModel) -> PercentileBand {
        self.get(ssp, rcp, damage_model).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.cells.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extent {
    pub min: f64,
    pub max: f64,
}

impl Extent {
    /// Smallest and largest outer percentile over all rows.
    pub fn of<'a>(rows: impl IntoIterator<Item = &'a ScenarioRow>) -> Option<Self> {
        rows.into_iter()
            .flat_map(|row| [row.percentile17, row.percentile83])
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<Extent>, v| match acc {
                None => Some(Extent { min: v, max: v }),
                Some(e) => Some(Extent {
                    min: e.min.min(v),
                    max: e.max.max(v),
                }),
            })
    }
}

/// `(p83 - p17) * 20` of the single rcp60/SSP2/bhm_sr row, or
/// [`DEFAULT_CLAMP`] when there is not exactly one such row.
pub fn inferred_clamp(rows: &[ScenarioRow]) -> f64 {
    let mut reference = rows.iter().filter(|row| {
        row.rcp == Rcp::Rcp60 && row.ssp == Ssp::Ssp2 && row.damage_model == DamageModel::BhmSr
    });
    match (reference.next(), reference.next()) {
        (Some(row), None) => (row.percentile83 - row.percentile17) * CLAMP_SPREAD_FACTOR,
        _ => DEFAULT_CLAMP,
    }
}

/// Linear map from a domain onto an output range, optionally clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
    pub clamp: bool,
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            domain,
            range,
            clamp: false,
        }
    }

    pub fn clamped(mut self) -> Self {
        self.clamp = true;
        self
    }

    pub fn apply(&self, v: f64) -> f64 {
        let (d0, d1) = self.domain;
        let span = d1 - d0;
        // Degenerate domains map to the middle of the range.
        let mut t = if span == 0.0 { 0.5 } else { (v - d0) / span };
        if self.clamp {
            t = t.clamp(0.0, 1.0);
        }
        let (r0, r1) = self.range;
        r0 + t * (r1 - r0)
    }
}

/// Evenly spaced integer ticks from `floor(min)` up to (excluding)
/// `ceil(max)`, with a step of `floor((max - min) / slices)`.
pub fn tick_values(min: f64, max: f64, slices: u32) -> Vec<f64> {
    if slices == 0 || !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }
    let step = ((max - min) / f64::from(slices)).floor();
    if step <= 0.0 {
        return Vec::new();
    }
    let end = max.ceil();
    let mut ticks = Vec::new();
    let mut t = min.floor();
    while t < end {
        ticks.push(t);
        t += step;
    }
    ticks
}

/// Everything the distribution chart needs for one country.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionRange {
    pub country: CountryCode,
    pub rows: Vec<ScenarioRow>,
    pub grid: PathwayGrid,
    pub extent: Option<Extent>,
    pub inferred_clamp: f64,
    /// Upper end of the axis: the override, else `min(inferred_clamp, max)`.
    pub axis_max: f64,
}

impl DistributionRange {
    pub fn from_rows(
        country: CountryCode,
        rows: Vec<ScenarioRow>,
        clamp_override: Option<f64>,
    ) -> Self {
        let grid = PathwayGrid::from_rows(&rows);
        let extent = Extent::of(&rows);
        let inferred = inferred_clamp(&rows);
        let axis_max = match (clamp_override, extent) {
            (Some(clamp), _) => clamp,
            (None, Some(extent)) => inferred.min(extent.max),
            (None, None) => inferred,
        };
        Self {
            country,
            rows,
            grid,
            extent,
            inferred_clamp: inferred,
            axis_max,
        }
    }

    pub fn axis_min(&self) -> f64 {
        self.extent.map(|e| e.min).unwrap_or(0.0)
    }

    /// Clamped scale onto `[10, width - 20]`, since values may be negative
    /// or beyond the clamp.
    pub fn scale(&self, width: f64) -> LinearScale {
        LinearScale::new((self.axis_min(), self.axis_max), (10.0, width - 20.0)).clamped()
    }

    pub fn ticks(&self, slices: u32) -> Vec<f64> {
        tick_values(self.axis_min(), self.axis_max, slices)
    }
}

/// Stream the full dataset and build one country's distribution range.
pub fn load_country_range(
    source: CsvSource,
    filter: &ScenarioFilter,
    country: CountryCode,
    fixed_prtp: &str,
    clamp_override: Option<f64>,
) -> MetricsResult<DistributionRange> {
    let mut stream = RowParser::new(source)
        .numeric_columns(NumericColumns::named(columns::PERCENTILE_COLUMNS))
        .rows()?;

    let mut rows = Vec::new();
    for item in filter_stream(stream.by_ref(), filter) {
        let Ok(record) = item else { continue };
        match ScenarioRow::from_record(&record, fixed_prtp) {
            Ok(row) => rows.push(row),
            Err(err) => warn!(%err, "skipping range row"),
        }
    }
    debug!(
        country = %country,
        rows_read = stream.summary().rows_read,
        rows_kept = rows.len(),
        "country range rows loaded"
    );
    Ok(DistributionRange::from_rows(country, rows, clamp_override))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cscc_core::Discounting;

    fn row(ssp: Ssp, rcp: Rcp, dmg: DamageModel, p17: f64, p50: f64, p83: f64) -> ScenarioRow {
        ScenarioRow {
            country_code: CountryCode::parse("USA").unwrap(),
            ssp,
            rcp,
            damage_model: dmg,
            discounting: Discounting::Fixed,
            percentile17: p17,
            median: p50,
            percentile83: p83,
        }
    }

    #[test]
    fn extent_spans_outer_percentiles() {
        let rows = vec![
            row(Ssp::Ssp1, Rcp::Rcp45, DamageModel::BhmSr, -5.0, 1.0, 10.0),
            row(Ssp::Ssp2, Rcp::Rcp60, DamageModel::BhmLr, 2.0, 50.0, 300.0),
        ];
        assert_eq!(Extent::of(&rows), Some(Extent { min: -5.0, max: 300.0 }));
        assert_eq!(Extent::of(&[]), None);
    }

    #[test]
    fn inferred_clamp_uses_reference_scenario() {
        let rows = vec![
            row(Ssp::Ssp2, Rcp::Rcp60, DamageModel::BhmSr, 10.0, 40.0, 110.0),
            row(Ssp::Ssp5, Rcp::Rcp85, DamageModel::BhmRichpoorLr, 0.0, 1.0e4, 1.0e6),
        ];
        assert_eq!(inferred_clamp(&rows), 2000.0);

        let range = DistributionRange::from_rows(CountryCode::parse("USA").unwrap(), rows, None);
        assert_eq!(range.axis_max, 2000.0);
    }

    #[test]
    fn inferred_clamp_defaults_without_single_reference_row() {
        assert_eq!(inferred_clamp(&[]), DEFAULT_CLAMP);
        let twice = vec![
            row(Ssp::Ssp2, Rcp::Rcp60, DamageModel::BhmSr, 1.0, 2.0, 3.0),
            row(Ssp::Ssp2, Rcp::Rcp60, DamageModel::BhmSr, 1.0, 2.0, 3.0),
        ];
        assert_eq!(inferred_clamp(&twice), DEFAULT_CLAMP);
    }

    #[test]
    fn clamp_override_wins() {
        let rows = vec![row(Ssp::Ssp2, Rcp::Rcp60, DamageModel::BhmSr, 1.0, 2.0, 3.0)];
        let range = DistributionRange::from_rows(CountryCode::parse("USA").unwrap(), rows, Some(50.0));
        assert_eq!(range.axis_max, 50.0);
    }

    #[test]
    fn grid_missing_cells_are_zero_bands() {
        let rows = vec![row(Ssp::Ssp3, Rcp::Rcp85, DamageModel::Djo, 1.0, 2.0, 3.0)];
        let grid = PathwayGrid::from_rows(&rows);
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.band(Ssp::Ssp3, Rcp::Rcp85, DamageModel::Djo).median, 2.0);
        let empty = grid.band(Ssp::Ssp1, Rcp::Rcp45, DamageModel::BhmSr);
        assert_eq!(empty, PercentileBand::default());
        assert!(!empty.has_spread());
    }

    #[test]
    fn clamped_scale_pins_out_of_domain_values() {
        let scale = LinearScale::new((0.0, 100.0), (10.0, 380.0)).clamped();
        assert_eq!(scale.apply(0.0), 10.0);
        assert_eq!(scale.apply(50.0), 195.0);
        assert_eq!(scale.apply(-20.0), 10.0);
        assert_eq!(scale.apply(1000.0), 380.0);

        let free = LinearScale::new((0.0, 100.0), (0.0, 100.0));
        assert_eq!(free.apply(150.0), 150.0);
    }

    #[test]
    fn range_scale_spans_axis_inside_margins() {
        let rows = vec![
            row(Ssp::Ssp2, Rcp::Rcp60, DamageModel::BhmSr, -5.0, 20.0, 60.0),
            row(Ssp::Ssp5, Rcp::Rcp85, DamageModel::BhmLr, 10.0, 400.0, 900.0),
        ];
        let range = DistributionRange::from_rows(CountryCode::parse("USA").unwrap(), rows, Some(95.0));
        assert_eq!((range.axis_min(), range.axis_max), (-5.0, 95.0));

        let scale = range.scale(400.0);
        assert_eq!(scale.apply(-5.0), 10.0);
        assert_eq!(scale.apply(45.0), 195.0);
        assert_eq!(scale.apply(900.0), 380.0);
    }

    #[test]
    fn degenerate_domain_maps_to_midpoint() {
        let scale = LinearScale::new((5.0, 5.0), (0.0, 10.0));
        assert_eq!(scale.apply(5.0), 5.0);
    }

    #[test]
    fn ticks_step_by_floored_slice_width() {
        assert_eq!(tick_values(0.0, 100.0, 5), vec![0.0, 20.0, 40.0, 60.0, 80.0]);
        assert_eq!(tick_values(-3.5, 7.2, 5), vec![-4.0, -2.0, 0.0, 2.0, 4.0, 6.0]);
        assert!(tick_values(0.0, 3.0, 5).is_empty());
    }
}
