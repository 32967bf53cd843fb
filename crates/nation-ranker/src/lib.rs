//! Nation Ranker
//!
//! Scores countries on ten statistical metrics under user-chosen weights
//! and orders them into a ranking for list and choropleth display.
//!
//! # Scoring Model
//!
//! ```text
//! Score(c) = w₁·GDP + w₂·IQ + w₃·Gini + w₄·LE + w₅·HDI
//!          + w₆·U + w₇·Debt + w₈·CPI + w₉·RoL + w₁₀·Dem
//! ```
//!
//! | Metric | Column | Default weight |
//! |--------|--------|----------------|
//! | GDP    | GDP per capita | 0.50 |
//! | IQ     | IQ average | 0.50 |
//! | Gini   | Gini Coefficient | 0.50 |
//! | LE     | Life expectancy | 0.50 |
//! | HDI    | HDI | 0.50 |
//! | U      | Unemployment rate | 0.50 |
//! | Debt   | Public debt to GDP ratio | 0.50 |
//! | CPI    | CPI | 0.50 |
//! | RoL    | Rule of Law Index | 0.50 |
//! | Dem    | Democracy Index | 0.50 |
//!
//! Weights are raw multipliers in `[0, 1]` and are not normalized.
//!
//! # Data Quality
//!
//! - A cell that does not parse as a finite number contributes 0.
//! - A row with an empty or missing `Nation Name` is not ranked.
//! - Equal scores keep their input order.

use thiserror::Error;

pub mod choropleth;
pub mod loader;
pub mod metric;
pub mod record;
pub mod scale;
pub mod scorer;
pub mod view;
pub mod weights;

pub use metric::{Metric, METRIC_COUNT};
pub use record::{CountryRecord, NATION_NAME_COLUMN};
pub use scale::{value_range, ColorScale, Rgb, ValueRange};
pub use scorer::{compute_ranking, score_breakdown, RankedNation, Ranking, ScoreBreakdown};
pub use view::{DisplayConfig, ListEntry, ListSize, RankingLists};
pub use weights::{WeightControl, WeightStore, WeightVector};

#[derive(Error, Debug)]
pub enum RankerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),
    #[error("Geometry must be a FeatureCollection")]
    NotFeatureCollection,
    #[error("Unknown metric: {0:?}")]
    UnknownMetric(String),
    #[error("No weight given for metric {0:?}")]
    MissingMetric(Metric),
    #[error("Weight {weight} for {metric:?} is outside [0, 1]")]
    OutOfRange { metric: Metric, weight: f64 },
    #[error("Invalid color: {0:?}")]
    InvalidColor(String),
    #[error("Color scale needs at least one stop")]
    EmptyColorScale,
}

pub type Result<T> = std::result::Result<T, RankerError>;
