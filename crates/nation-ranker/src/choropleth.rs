//! Choropleth binding: ranking values onto country boundary geometry

use crate::scale::{ColorScale, ValueRange};
use crate::scorer::Ranking;
use crate::{RankerError, Result};
use geojson::{FeatureCollection, GeoJson};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Feature property holding the country name in common world GeoJSON files
pub const DEFAULT_NAME_PROPERTY: &str = "name";

/// One `(name, value)` pair handed to the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDatum {
    pub name: String,
    pub value: f64,
}

/// Everything the map needs from a ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSeries {
    pub data: Vec<MapDatum>,
    pub range: ValueRange,
}

impl MapSeries {
    pub fn from_ranking(ranking: &Ranking) -> Self {
        Self {
            data: ranking
                .iter()
                .map(|n| MapDatum {
                    name: n.name.clone(),
                    value: n.score,
                })
                .collect(),
            range: ranking.value_range(),
        }
    }
}

/// Load boundary geometry once from a GeoJSON FeatureCollection file
pub fn load_geometry(path: impl AsRef<Path>) -> Result<FeatureCollection> {
    let path = path.as_ref();
    info!("Loading map geometry from {:?}", path);

    let text = fs::read_to_string(path)?;
    let collection = parse_geometry(&text)?;

    info!("Loaded {} map features", collection.features.len());
    Ok(collection)
}

pub fn parse_geometry(text: &str) -> Result<FeatureCollection> {
    match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        _ => Err(RankerError::NotFeatureCollection),
    }
}

/// Result of binding a series to geometry
#[derive(Debug, Clone)]
pub struct BoundMap {
    pub collection: FeatureCollection,
    /// Features that received a value
    pub matched: usize,
    /// Series names with no feature
    pub unmatched: Vec<String>,
}

/// Attach `value` and `fill` properties to every feature whose
/// `name_property` matches a series entry.
///
/// Features without data keep their geometry and get no value. When a name
/// appears more than once in the series, the first (highest ranked) wins.
pub fn bind_geometry(
    geometry: &FeatureCollection,
    series: &MapSeries,
    scale: &ColorScale,
    name_property: &str,
) -> BoundMap {
    let mut by_name: HashMap<&str, f64> = HashMap::new();
    for datum in &series.data {
        by_name.entry(datum.name.as_str()).or_insert(datum.value);
    }

    let mut collection = geometry.clone();
    let mut seen: HashMap<&str, bool> = by_name.keys().map(|k| (*k, false)).collect();
    let mut matched = 0;

    for feature in collection.features.iter_mut() {
        let Some(name) = feature
            .property(name_property)
            .and_then(|v| v.as_str())
            .map(str::to_string)
        else {
            continue;
        };

        if let Some((key, value)) = by_name.get_key_value(name.as_str()) {
            let fill = scale.color_for(*value, &series.range);
            feature.set_property("value", *value);
            feature.set_property("fill", fill.to_string());
            seen.insert(*key, true);
            matched += 1;
        }
    }

    let unmatched: Vec<String> = series
        .data
        .iter()
        .filter(|d| !seen.get(d.name.as_str()).copied().unwrap_or(false))
        .map(|d| d.name.clone())
        .collect();

    debug!(
        "Bound {} features, {} series names without geometry",
        matched,
        unmatched.len()
    );

    BoundMap {
        collection,
        matched,
        unmatched,
    }
}

/// Map report: series plus color stops and, if available, bound geometry
pub fn to_geojson(bound: &BoundMap, series: &MapSeries, scale: &ColorScale) -> serde_json::Value {
    serde_json::json!({
        "type": "FeatureCollection",
        "features": bound.collection.features,
        "metadata": {
            "range": series.range,
            "stops": scale.stops(),
            "matched": bound.matched,
            "unmatched": bound.unmatched,
            "generated_at": chrono::Utc::now().to_rfc3339(),
        }
    })
}
