//! The fixed set of statistical dimensions scored per country

use crate::RankerError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of metrics in the closed set
pub const METRIC_COUNT: usize = 10;

/// A statistical dimension with one column in the input dataset.
///
/// The set is closed. Declaration order is display order and carries no
/// other meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    GdpPerCapita,
    IqAverage,
    GiniCoefficient,
    LifeExpectancy,
    Hdi,
    UnemploymentRate,
    PublicDebtToGdp,
    Cpi,
    RuleOfLawIndex,
    DemocracyIndex,
}

impl Metric {
    /// All metrics in display order
    pub const ALL: [Metric; METRIC_COUNT] = [
        Metric::GdpPerCapita,
        Metric::IqAverage,
        Metric::GiniCoefficient,
        Metric::LifeExpectancy,
        Metric::Hdi,
        Metric::UnemploymentRate,
        Metric::PublicDebtToGdp,
        Metric::Cpi,
        Metric::RuleOfLawIndex,
        Metric::DemocracyIndex,
    ];

    /// Header text of this metric's column. Matching is exact.
    pub fn column(&self) -> &'static str {
        match self {
            Metric::GdpPerCapita => "GDP per capita",
            Metric::IqAverage => "IQ average",
            Metric::GiniCoefficient => "Gini Coefficient",
            Metric::LifeExpectancy => "Life expectancy",
            Metric::Hdi => "HDI",
            Metric::UnemploymentRate => "Unemployment rate",
            Metric::PublicDebtToGdp => "Public debt to GDP ratio",
            Metric::Cpi => "CPI",
            Metric::RuleOfLawIndex => "Rule of Law Index",
            Metric::DemocracyIndex => "Democracy Index",
        }
    }

    /// Position in [`Metric::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Look up a metric by its exact column name
    pub fn from_column(name: &str) -> Option<Metric> {
        Metric::ALL.iter().copied().find(|m| m.column() == name)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Metric {
    type Err = RankerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::from_column(s).ok_or_else(|| RankerError::UnknownMetric(s.to_string()))
    }
}

// Metrics travel as their column names in JSON (weights files, API bodies).
impl Serialize for Metric {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.column())
    }
}

impl<'de> Deserialize<'de> for Metric {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
