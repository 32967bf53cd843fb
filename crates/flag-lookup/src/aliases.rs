//! Dataset name → directory name aliases

use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// Names in the dataset that the flag directory knows under another name
const BUILTIN_ALIASES: [(&str, &str); 10] = [
    ("Türkiye", "Turkey"),
    ("Czech Republic", "Czechia"),
    ("Swaziland", "Eswatini"),
    ("Macedonia", "North Macedonia"),
    ("East Timor", "Timor-Leste"),
    ("Burma", "Myanmar"),
    ("Cabo Verde", "Cape Verde"),
    ("Côte d'Ivoire", "Ivory Coast"),
    ("Democratic Republic of the Congo", "DR Congo"),
    ("Republic of the Congo", "Congo"),
];

/// Name rewrites applied before a directory lookup.
///
/// Pure data: extend it from a JSON object (`{"dataset name": "directory
/// name"}`) without touching scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasTable {
    aliases: HashMap<String, String>,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self {
            aliases: BUILTIN_ALIASES
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        }
    }
}

impl AliasTable {
    /// A table with no aliases at all
    pub fn empty() -> Self {
        Self {
            aliases: HashMap::new(),
        }
    }

    pub fn insert(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.aliases.insert(from.into(), to.into());
    }

    /// Name to query the directory with
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map(String::as_str).unwrap_or(name)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Merge entries from a JSON file; file entries override existing ones
    pub fn extend_from_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let extra: HashMap<String, String> = serde_json::from_reader(BufReader::new(file))?;
        let count = extra.len();
        self.aliases.extend(extra);

        info!("Loaded {} flag aliases from {:?}", count, path);
        Ok(count)
    }

    /// Built-in aliases plus those in `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut table = Self::default();
        table.extend_from_file(path)?;
        Ok(table)
    }
}
