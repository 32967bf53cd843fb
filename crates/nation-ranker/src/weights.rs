//! Weight vector and the mutable weight store behind the UI controls
//!
//! Weights are raw multipliers in `[0.0, 1.0]`. They are never normalized
//! and need not sum to 1.

use crate::metric::{Metric, METRIC_COUNT};
use crate::{RankerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Lower bound of a weight (inclusive)
pub const MIN_WEIGHT: f64 = 0.0;
/// Upper bound of a weight (inclusive)
pub const MAX_WEIGHT: f64 = 1.0;
/// Initial weight of every metric
pub const DEFAULT_WEIGHT: f64 = 0.5;
/// Granularity of the weight controls
pub const WEIGHT_STEP: f64 = 0.01;

/// Check a weight against `[MIN_WEIGHT, MAX_WEIGHT]`. NaN is rejected.
pub fn validate_weight(metric: Metric, weight: f64) -> Result<f64> {
    if (MIN_WEIGHT..=MAX_WEIGHT).contains(&weight) {
        Ok(weight)
    } else {
        Err(RankerError::OutOfRange { metric, weight })
    }
}

/// One weight per metric.
///
/// Indexed by [`Metric::index`], so a vector always covers the full set.
/// Partial mappings are rejected when converted in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightVector {
    weights: [f64; METRIC_COUNT],
}

impl Default for WeightVector {
    fn default() -> Self {
        Self::uniform(DEFAULT_WEIGHT)
    }
}

impl WeightVector {
    /// Same weight for every metric. Used for defaults and tests.
    pub fn uniform(weight: f64) -> Self {
        Self {
            weights: [weight; METRIC_COUNT],
        }
    }

    /// All zero except `metric`, which gets `weight`
    pub fn only(metric: Metric, weight: f64) -> Self {
        let mut v = Self::uniform(0.0);
        v.weights[metric.index()] = weight;
        v
    }

    pub fn get(&self, metric: Metric) -> f64 {
        self.weights[metric.index()]
    }

    /// `(metric, weight)` pairs in display order
    pub fn iter(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        Metric::ALL.iter().map(|m| (*m, self.weights[m.index()]))
    }

    /// Build from a name-keyed mapping.
    ///
    /// Every metric must be present, unknown names are rejected and each
    /// weight must be in range.
    pub fn from_named(named: &HashMap<String, f64>) -> Result<Self> {
        if let Some(unknown) = named.keys().find(|k| Metric::from_column(k).is_none()) {
            return Err(RankerError::UnknownMetric(unknown.clone()));
        }

        let mut weights = [0.0; METRIC_COUNT];
        for metric in Metric::ALL {
            let weight = named
                .get(metric.column())
                .copied()
                .ok_or(RankerError::MissingMetric(metric))?;
            weights[metric.index()] = validate_weight(metric, weight)?;
        }

        Ok(Self { weights })
    }

    /// Name-keyed mapping in display order
    pub fn to_named(&self) -> BTreeMap<Metric, f64> {
        self.iter().collect()
    }
}

impl Serialize for WeightVector {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_named().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for WeightVector {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let named = HashMap::<String, f64>::deserialize(deserializer)?;
        WeightVector::from_named(&named).map_err(serde::de::Error::custom)
    }
}

/// Holds the current weights while a session mutates them.
///
/// Out-of-range writes are rejected, not clamped: the controls only emit
/// in-range values, so anything else is a caller bug.
#[derive(Debug, Clone, Default)]
pub struct WeightStore {
    current: WeightVector,
}

impl WeightStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing vector
    pub fn with_weights(weights: WeightVector) -> Self {
        Self { current: weights }
    }

    pub fn get(&self, metric: Metric) -> f64 {
        self.current.get(metric)
    }

    /// Set one weight. On error the stored value is unchanged.
    pub fn set(&mut self, metric: Metric, weight: f64) -> Result<()> {
        self.current.weights[metric.index()] = validate_weight(metric, weight)?;
        Ok(())
    }

    /// Set a weight addressed by column name
    pub fn set_named(&mut self, name: &str, weight: f64) -> Result<Metric> {
        let metric: Metric = name.parse()?;
        self.set(metric, weight)?;
        Ok(metric)
    }

    /// Snapshot of every weight
    pub fn all_weights(&self) -> WeightVector {
        self.current
    }

    /// Back to [`DEFAULT_WEIGHT`] everywhere
    pub fn reset(&mut self) {
        self.current = WeightVector::default();
    }

    /// Descriptors for one range control per metric
    pub fn controls(&self) -> Vec<WeightControl> {
        self.current
            .iter()
            .map(|(metric, value)| WeightControl::new(metric, value))
            .collect()
    }
}

/// What a range input needs to render one metric's weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightControl {
    pub metric: Metric,
    pub label: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
    pub value: f64,
}

impl WeightControl {
    pub fn new(metric: Metric, value: f64) -> Self {
        Self {
            metric,
            label: control_label(metric, value),
            min: MIN_WEIGHT,
            max: MAX_WEIGHT,
            step: WEIGHT_STEP,
            default: DEFAULT_WEIGHT,
            value,
        }
    }
}

/// Label shown next to a control, e.g. `HDI: 0.50`
pub fn control_label(metric: Metric, weight: f64) -> String {
    format!("{}: {:.2}", metric, weight)
}
