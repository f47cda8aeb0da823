use serde::{Deserialize, Serialize};

/// The columns every feature row is bound to, in positional order.
pub const COLUMNS: [&str; 9] = [
    "longitude",
    "latitude",
    "housing_median_age",
    "total_rooms",
    "total_bedrooms",
    "population",
    "households",
    "median_income",
    "ocean_proximity",
];

/// Number of leading numeric columns in [`COLUMNS`].
pub const NUMERIC_COLUMNS: usize = 8;

/// A single scalar cell of a feature row.
///
/// On the wire this is either a JSON number or a JSON string; anything else
/// fails deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Text(String),
}

impl FeatureValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(x) => Some(*x),
            FeatureValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FeatureValue::Text(s) => Some(s),
            FeatureValue::Number(_) => None,
        }
    }
}

/// One record, positionally matching [`COLUMNS`].
pub type FeatureRow = Vec<FeatureValue>;
