//! Row predicates applied while streaming.

use cscc_core::{CountryCode, DamageModel, Discounting, Rcp, Scenario, Ssp};

use crate::columns;
use crate::error::{DataError, DataResult, RowError};
use crate::record::Record;

/// Pure rate of time preference of the fixed-discounting runs.
pub const DEFAULT_FIXED_PRTP: &str = "2";
pub const BOOTSTRAP: &str = "bootstrap";
pub const UNCERTAIN: &str = "uncertain";

pub trait RowFilter {
    fn accept(&self, record: &Record) -> bool;
}

impl<F> RowFilter for F
where
    F: Fn(&Record) -> bool,
{
    fn accept(&self, record: &Record) -> bool {
        self(record)
    }
}

/// Discount predicate over the `prtp` / `dmgfuncpar` / `climate` columns.
///
/// Both variants require the bootstrap damage-function parameterization and
/// uncertain climate. `Fixed` then requires `prtp == fixed_prtp`;
/// `GrowthAdjusted` requires any other `prtp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscountFilter {
    pub kind: Discounting,
    pub fixed_prtp: String,
}

impl DiscountFilter {
    pub fn new(kind: Discounting) -> Self {
        Self {
            kind,
            fixed_prtp: DEFAULT_FIXED_PRTP.to_string(),
        }
    }

    pub fn with_fixed_prtp(mut self, prtp: impl Into<String>) -> Self {
        self.fixed_prtp = prtp.into();
        self
    }

    /// Which discount treatment a row belongs to, ignoring the bootstrap and
    /// climate constraints.
    pub fn classify(record: &Record, fixed_prtp: &str) -> Discounting {
        if record.text_eq(columns::PRTP, fixed_prtp) {
            Discounting::Fixed
        } else {
            Discounting::GrowthAdjusted
        }
    }
}

impl RowFilter for DiscountFilter {
    fn accept(&self, record: &Record) -> bool {
        if !record.text_eq(columns::DMGFUNCPAR, BOOTSTRAP)
            || !record.text_eq(columns::CLIMATE, UNCERTAIN)
        {
            return false;
        }
        // A missing prtp cell is neither fixed nor a known growth rate.
        if record.text(columns::PRTP).is_none() {
            return false;
        }
        Self::classify(record, &self.fixed_prtp) == self.kind
    }
}

type BoxedFilter = Box<dyn RowFilter + Send + Sync>;

/// Scenario-dimension match plus exactly one discount predicate.
pub struct ScenarioFilter {
    ssp: Option<Ssp>,
    rcp: Option<Rcp>,
    damage_model: Option<DamageModel>,
    country: Option<CountryCode>,
    predicate: BoxedFilter,
    discounting: Option<Discounting>,
}

impl std::fmt::Debug for ScenarioFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioFilter")
            .field("ssp", &self.ssp)
            .field("rcp", &self.rcp)
            .field("damage_model", &self.damage_model)
            .field("country", &self.country)
            .field("discounting", &self.discounting)
            .finish_non_exhaustive()
    }
}

impl ScenarioFilter {
    pub fn builder() -> ScenarioFilterBuilder {
        ScenarioFilterBuilder::default()
    }

    /// Filter for one scenario file: the file already fixes SSP/RCP/damage
    /// model, so only the discount predicate (and an optional country) apply.
    pub fn for_scenario_file(
        discounting: Discounting,
        fixed_prtp: &str,
        country: Option<CountryCode>,
    ) -> DataResult<Self> {
        let mut builder = Self::builder()
            .discounting(DiscountFilter::new(discounting).with_fixed_prtp(fixed_prtp));
        if let Some(code) = country {
            builder = builder.country(code);
        }
        builder.build()
    }

    /// Discount treatment selected by a built-in predicate; `None` for custom
    /// predicates.
    pub fn discounting(&self) -> Option<Discounting> {
        self.discounting
    }

    fn dimension_matches(record: &Record, column: &str, expected: Option<&str>) -> bool {
        match expected {
            Some(expected) => record
                .text(column)
                .is_some_and(|v| v.trim().eq_ignore_ascii_case(expected)),
            None => true,
        }
    }
}

impl RowFilter for ScenarioFilter {
    fn accept(&self, record: &Record) -> bool {
        Self::dimension_matches(record, columns::SSP, self.ssp.map(Ssp::as_str))
            && Self::dimension_matches(record, columns::RCP, self.rcp.map(Rcp::as_str))
            && Self::dimension_matches(
                record,
                columns::RUN,
                self.damage_model.map(DamageModel::as_str),
            )
            && Self::dimension_matches(
                record,
                columns::ISO3,
                self.country.as_ref().map(CountryCode::as_str),
            )
            && self.predicate.accept(record)
    }
}

#[derive(Default)]
pub struct ScenarioFilterBuilder {
    ssp: Option<Ssp>,
    rcp: Option<Rcp>,
    damage_model: Option<DamageModel>,
    country: Option<CountryCode>,
    predicates: Vec<(BoxedFilter, Option<Discounting>)>,
}

impl ScenarioFilterBuilder {
    /// Match SSP/RCP/damage model and use the scenario's discount predicate.
    pub fn scenario(self, scenario: &Scenario, fixed_prtp: &str) -> Self {
        self.dimensions(scenario.ssp, scenario.rcp, scenario.damage_model)
            .discounting(DiscountFilter::new(scenario.discounting).with_fixed_prtp(fixed_prtp))
    }

    pub fn dimensions(mut self, ssp: Ssp, rcp: Rcp, damage_model: DamageModel) -> Self {
        self.ssp = Some(ssp);
        self.rcp = Some(rcp);
        self.damage_model = Some(damage_model);
        self
    }

    pub fn country(mut self, code: CountryCode) -> Self {
        self.country = Some(code);
        self
    }

    pub fn discounting(mut self, filter: DiscountFilter) -> Self {
        let kind = filter.kind;
        self.predicates.push((Box::new(filter), Some(kind)));
        self
    }

    pub fn custom<F>(mut self, predicate: F) -> Self
    where
        F: RowFilter + Send + Sync + 'static,
    {
        self.predicates.push((Box::new(predicate), None));
        self
    }

    pub fn build(mut self) -> DataResult<ScenarioFilter> {
        if self.predicates.len() != 1 {
            return Err(DataError::FilterConfig {
                what: if self.predicates.is_empty() {
                    "no discount predicate selected"
                } else {
                    "more than one discount predicate selected"
                },
            });
        }
        let (predicate, discounting) = self
            .predicates
            .pop()
            .ok_or(DataError::FilterConfig {
                what: "no discount predicate selected",
            })?;
        Ok(ScenarioFilter {
            ssp: self.ssp,
            rcp: self.rcp,
            damage_model: self.damage_model,
            country: self.country,
            predicate,
            discounting,
        })
    }
}

/// Drop rejected rows as they stream past; errors pass through untouched.
pub fn filter_stream<'a, I, F>(
    rows: I,
    filter: &'a F,
) -> impl Iterator<Item = Result<Record, RowError>> + 'a
where
    I: Iterator<Item = Result<Record, RowError>> + 'a,
    F: RowFilter + ?Sized,
{
    rows.filter(move |item| match item {
        Ok(record) => filter.accept(record),
        Err(_) => true,
    })
}
