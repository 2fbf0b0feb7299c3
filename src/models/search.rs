use serde::{Deserialize, Serialize};

/// Kind of entity a search hit points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "lowercase")]
pub enum EntityType {
    Treaty,
    Tribe,
    Other,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Treaty => "treaty",
            Self::Tribe => "tribe",
            Self::Other => "other",
        }
    }
}

impl From<String> for EntityType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "treaty" => Self::Treaty,
            "tribe" => Self::Tribe,
            _ => Self::Other,
        }
    }
}

/// A single free-text search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub entity_type: EntityType,
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl SearchResult {
    pub fn treaty(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(EntityType::Treaty, id, title)
    }

    pub fn tribe(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(EntityType::Tribe, id, title)
    }

    fn new(entity_type: EntityType, id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            entity_type,
            id: id.into(),
            title: title.into(),
            snippet: None,
            url: None,
            score: None,
        }
    }
}

/// Response of `GET /api/v1/search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default)]
    pub results: Vec<SearchResult>,
    #[serde(default)]
    pub total: usize,
}
