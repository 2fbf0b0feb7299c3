use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A four-digit year between 1700 and 1999 standing on its own in a name.
static NAME_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(1[7-9]\d{2})\b").expect("year pattern is valid"));

/// Extract the signing year embedded in a boundary name.
///
/// This is a heuristic: the first standalone year in `[1700, 1999]` wins,
/// so `"Fort Laramie 1851 (amended 1868)"` yields 1851. Names without such
/// a year are undated.
///
/// ```
/// use windwalker::models::extract_year;
/// assert_eq!(extract_year("Fort Bridger Treaty, 1868"), Some(1868));
/// assert_eq!(extract_year("Treaty of 2001"), None);
/// assert_eq!(extract_year("Robinson Huron"), None);
/// ```
pub fn extract_year(name: &str) -> Option<i32> {
    NAME_YEAR
        .captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundaryProperties {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(default)]
    pub color: String,
    /// Link to the boundary's page on the upstream atlas.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One GeoJSON feature of the boundary layer. Geometry is passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryFeature {
    #[serde(rename = "type", default = "feature_type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub properties: BoundaryProperties,
    #[serde(default)]
    pub geometry: serde_json::Value,
}

impl BoundaryFeature {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            kind: feature_type(),
            id: None,
            properties: BoundaryProperties {
                name: name.into(),
                color: color.into(),
                ..Default::default()
            },
            geometry: serde_json::Value::Null,
        }
    }

    pub fn name(&self) -> &str {
        &self.properties.name
    }

    pub fn color(&self) -> &str {
        &self.properties.color
    }

    /// Year derived from the name, `None` when undated.
    pub fn year(&self) -> Option<i32> {
        extract_year(&self.properties.name)
    }
}

/// A GeoJSON `FeatureCollection` of boundaries.
///
/// Features are reference-counted so filtered views share geometry with the
/// cached source collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default = "collection_type")]
    pub kind: String,
    #[serde(default)]
    pub features: Vec<Arc<BoundaryFeature>>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Arc<BoundaryFeature>>) -> Self {
        Self {
            kind: collection_type(),
            features,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.features.iter().map(|f| f.name()).collect()
    }
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::empty()
    }
}

impl FromIterator<BoundaryFeature> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = BoundaryFeature>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Arc::new).collect())
    }
}

fn feature_type() -> String {
    "Feature".to_string()
}

fn collection_type() -> String {
    "FeatureCollection".to_string()
}
