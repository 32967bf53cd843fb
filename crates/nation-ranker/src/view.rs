//! Display-side views of a ranking: best/worst lists and list entries
//!
//! List size and the name of the score field are display parameters, not
//! part of the ranking contract.

use crate::scorer::{RankedNation, Ranking};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Default number of entries per list
pub const DEFAULT_LIST_SIZE: usize = 50;
/// Default JSON key carrying the raw score
pub const DEFAULT_SCORE_FIELD: &str = "score";

/// How many entries a list shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListSize {
    All,
    Count(usize),
}

impl ListSize {
    /// Number of entries to take from a ranking of length `len`
    pub fn resolve(&self, len: usize) -> usize {
        match self {
            ListSize::All => len,
            ListSize::Count(n) => (*n).min(len),
        }
    }
}

impl Default for ListSize {
    fn default() -> Self {
        ListSize::Count(DEFAULT_LIST_SIZE)
    }
}

impl fmt::Display for ListSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListSize::All => f.write_str("all"),
            ListSize::Count(n) => write!(f, "{}", n),
        }
    }
}

impl FromStr for ListSize {
    type Err = String;

    /// `all` or a count
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(ListSize::All);
        }
        s.parse::<usize>()
            .map(ListSize::Count)
            .map_err(|_| format!("expected `all` or a count, got `{}`", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub list_size: ListSize,
    pub score_field: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            list_size: ListSize::default(),
            score_field: DEFAULT_SCORE_FIELD.to_string(),
        }
    }
}

/// One row of a rendered list.
///
/// Serializes as `{rank, name, <score_field>: score, display_score}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ListEntry {
    /// 1-based position within its list
    pub rank: usize,
    pub name: String,
    pub score: f64,
    /// Score to two decimals
    pub display_score: String,
    /// JSON key carrying the raw score
    pub score_field: String,
}

impl ListEntry {
    pub fn new(rank: usize, nation: &RankedNation) -> Self {
        Self {
            rank,
            name: nation.name.clone(),
            score: nation.score,
            display_score: format!("{:.2}", nation.score),
            score_field: DEFAULT_SCORE_FIELD.to_string(),
        }
    }

    pub fn with_score_field(mut self, field: impl Into<String>) -> Self {
        self.score_field = field.into();
        self
    }

    /// `Name: 12.34`, the text shown next to the flag
    pub fn label(&self) -> String {
        format!("{}: {}", self.name, self.display_score)
    }
}

impl Serialize for ListEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("rank", &self.rank)?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry(&self.score_field, &self.score)?;
        map.serialize_entry("display_score", &self.display_score)?;
        map.end()
    }
}

/// Best and worst entries of one ranking
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankingLists {
    /// Highest score first
    pub best: Vec<ListEntry>,
    /// Lowest score first
    pub worst: Vec<ListEntry>,
}

impl DisplayConfig {
    /// Slice a ranking into its best and worst lists
    pub fn lists(&self, ranking: &Ranking) -> RankingLists {
        let n = self.list_size.resolve(ranking.len());
        RankingLists {
            best: self.numbered(ranking.top(n)),
            worst: self.numbered(&ranking.bottom(n)),
        }
    }

    /// The first `list_size` entries of a ranking
    pub fn truncate<'a>(&self, ranking: &'a Ranking) -> &'a [RankedNation] {
        ranking.top(self.list_size.resolve(ranking.len()))
    }

    /// JSON object for one nation with the configured score key
    pub fn entry_json(&self, nation: &RankedNation) -> Value {
        let mut obj = Map::new();
        obj.insert("name".to_string(), Value::String(nation.name.clone()));
        obj.insert(self.score_field.clone(), Value::from(nation.score));
        Value::Object(obj)
    }

    fn numbered(&self, nations: &[RankedNation]) -> Vec<ListEntry> {
        nations
            .iter()
            .enumerate()
            .map(|(i, n)| ListEntry::new(i + 1, n).with_score_field(self.score_field.as_str()))
            .collect()
    }

    /// The truncated ranking as JSON objects
    pub fn ranking_json(&self, ranking: &Ranking) -> Vec<Value> {
        self.truncate(ranking)
            .iter()
            .map(|n| self.entry_json(n))
            .collect()
    }
}
