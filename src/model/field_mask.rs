//! Field mask for partial updates

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Set of field paths an update should touch
///
/// Encoded on the wire as a single comma-separated string, both in JSON bodies
/// and in the `updateMask` query parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMask {
    /// Field paths, e.g. `filter` or `bigquery_options.use_partitioned_tables`
    pub paths: Vec<String>,
}

impl FieldMask {
    /// Create a mask from a list of paths
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether the mask names no field at all
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Comma-joined form used on the wire
    pub fn to_query_value(&self) -> String {
        self.paths.join(",")
    }
}

impl fmt::Display for FieldMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_value())
    }
}

impl FromStr for FieldMask {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(
            s.split(',').map(str::trim).filter(|p| !p.is_empty()),
        ))
    }
}

impl Serialize for FieldMask {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_query_value())
    }
}

impl<'de> Deserialize<'de> for FieldMask {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let Ok(mask) = raw.parse();
        Ok(mask)
    }
}
