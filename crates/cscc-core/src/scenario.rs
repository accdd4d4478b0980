//! Scenario dimensions of the CSCC dataset.
//!
//! Each dimension keeps the exact spelling used in the dataset columns
//! (`SSP`, `RCP`, `run`) plus a human readable label for pickers.

use core::fmt;
use core::str::FromStr;

use crate::CoreError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Shared Socioeconomic Pathway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Ssp {
    #[cfg_attr(feature = "serde", serde(rename = "SSP1"))]
    Ssp1,
    #[cfg_attr(feature = "serde", serde(rename = "SSP2"))]
    Ssp2,
    #[cfg_attr(feature = "serde", serde(rename = "SSP3"))]
    Ssp3,
    #[cfg_attr(feature = "serde", serde(rename = "SSP4"))]
    Ssp4,
    #[cfg_attr(feature = "serde", serde(rename = "SSP5"))]
    Ssp5,
}

impl Ssp {
    pub const ALL: [Ssp; 5] = [Ssp::Ssp1, Ssp::Ssp2, Ssp::Ssp3, Ssp::Ssp4, Ssp::Ssp5];

    pub fn as_str(self) -> &'static str {
        match self {
            Ssp::Ssp1 => "SSP1",
            Ssp::Ssp2 => "SSP2",
            Ssp::Ssp3 => "SSP3",
            Ssp::Ssp4 => "SSP4",
            Ssp::Ssp5 => "SSP5",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Ssp::Ssp1 => "Sustainability",
            Ssp::Ssp2 => "Middle of the Road",
            Ssp::Ssp3 => "Regional Rivalry",
            Ssp::Ssp4 => "Inequality",
            Ssp::Ssp5 => "Fossil-fueled Development",
        }
    }
}

/// Representative Concentration Pathway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Rcp {
    Rcp45,
    Rcp60,
    Rcp85,
}

impl Rcp {
    pub const ALL: [Rcp; 3] = [Rcp::Rcp45, Rcp::Rcp60, Rcp::Rcp85];

    pub fn as_str(self) -> &'static str {
        match self {
            Rcp::Rcp45 => "rcp45",
            Rcp::Rcp60 => "rcp60",
            Rcp::Rcp85 => "rcp85",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Rcp::Rcp45 => "RCP 4.5",
            Rcp::Rcp60 => "RCP 6",
            Rcp::Rcp85 => "RCP 8.5",
        }
    }
}

/// Empirical damage function (`run` column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DamageModel {
    BhmSr,
    BhmRichpoorSr,
    BhmLr,
    BhmRichpoorLr,
    Djo,
}

impl DamageModel {
    pub const ALL: [DamageModel; 5] = [
        DamageModel::BhmSr,
        DamageModel::BhmRichpoorSr,
        DamageModel::BhmLr,
        DamageModel::BhmRichpoorLr,
        DamageModel::Djo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DamageModel::BhmSr => "bhm_sr",
            DamageModel::BhmRichpoorSr => "bhm_richpoor_sr",
            DamageModel::BhmLr => "bhm_lr",
            DamageModel::BhmRichpoorLr => "bhm_richpoor_lr",
            DamageModel::Djo => "djo",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DamageModel::BhmSr => "bhm short run",
            DamageModel::BhmRichpoorSr => "bhm rich/poor short run",
            DamageModel::BhmLr => "bhm long run",
            DamageModel::BhmRichpoorLr => "bhm rich/poor long run",
            DamageModel::Djo => "DJO",
        }
    }
}

/// Discount treatment applied to future damages.
///
/// `Fixed` selects the fixed pure rate of time preference; `GrowthAdjusted`
/// selects every other rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Discounting {
    #[default]
    Fixed,
    GrowthAdjusted,
}

impl Discounting {
    pub const ALL: [Discounting; 2] = [Discounting::Fixed, Discounting::GrowthAdjusted];

    pub fn as_str(self) -> &'static str {
        match self {
            Discounting::Fixed => "fixed",
            Discounting::GrowthAdjusted => "growth-adjusted",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Discounting::Fixed => "fixed",
            Discounting::GrowthAdjusted => "growth adjusted",
        }
    }
}

/// One full scenario selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Scenario {
    pub ssp: Ssp,
    pub rcp: Rcp,
    pub damage_model: DamageModel,
    pub discounting: Discounting,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            ssp: Ssp::Ssp2,
            rcp: Rcp::Rcp60,
            damage_model: DamageModel::BhmSr,
            discounting: Discounting::Fixed,
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.ssp, self.rcp, self.damage_model, self.discounting
        )
    }
}

fn unknown(dimension: &'static str, value: &str) -> CoreError {
    CoreError::UnknownScenarioValue {
        dimension,
        value: value.to_string(),
    }
}

impl FromStr for Ssp {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Ssp::ALL
            .into_iter()
            .find(|ssp| ssp.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| unknown("SSP", s))
    }
}

impl FromStr for Rcp {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Rcp::ALL
            .into_iter()
            .find(|rcp| rcp.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| unknown("RCP", s))
    }
}

impl FromStr for DamageModel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        DamageModel::ALL
            .into_iter()
            .find(|dmg| dmg.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| unknown("damage model", s))
    }
}

impl FromStr for Discounting {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(Discounting::Fixed),
            "growth-adjusted" | "growth adjusted" | "growth_adjusted" => {
                Ok(Discounting::GrowthAdjusted)
            }
            _ => Err(unknown("discounting", s)),
        }
    }
}

impl fmt::Display for Ssp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Rcp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for DamageModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Discounting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_spelling_round_trips() {
        for ssp in Ssp::ALL {
            assert_eq!(ssp.as_str().parse::<Ssp>().unwrap(), ssp);
        }
        for rcp in Rcp::ALL {
            assert_eq!(rcp.as_str().parse::<Rcp>().unwrap(), rcp);
        }
        for dmg in DamageModel::ALL {
            assert_eq!(dmg.as_str().parse::<DamageModel>().unwrap(), dmg);
        }
    }

    #[test]
    fn discounting_accepts_picker_labels() {
        assert_eq!(
            "growth adjusted".parse::<Discounting>().unwrap(),
            Discounting::GrowthAdjusted
        );
        assert_eq!("Fixed".parse::<Discounting>().unwrap(), Discounting::Fixed);
        assert!("hyperbolic".parse::<Discounting>().is_err());
    }

    #[test]
    fn unknown_value_names_dimension() {
        let err = "rcp26".parse::<Rcp>().unwrap_err();
        assert_eq!(
            err,
            CoreError::UnknownScenarioValue {
                dimension: "RCP",
                value: "rcp26".to_string()
            }
        );
    }

    #[test]
    fn default_scenario_matches_picker_defaults() {
        let scenario = Scenario::default();
        assert_eq!(scenario.to_string(), "SSP2/rcp60/bhm_sr/fixed");
    }
}
