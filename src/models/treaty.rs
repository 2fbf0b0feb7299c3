use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

/// Legal standing of a treaty.
///
/// Any value the service sends that is not one of the known statuses is
/// read as `Unknown`, so a record is never rejected over its status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum TreatyStatus {
    Active,
    Violated,
    #[default]
    Unknown,
}

impl TreatyStatus {
    pub const ALL: [TreatyStatus; 3] = [Self::Active, Self::Violated, Self::Unknown];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Violated => "Violated",
            Self::Unknown => "Unknown",
        }
    }

    /// Parse a status name. Matching is case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Some(Self::Active),
            "violated" => Some(Self::Violated),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }

    /// Parse a filter value where the empty string means "all statuses".
    pub fn parse_filter(s: &str) -> Result<Option<Self>, String> {
        if s.trim().is_empty() {
            return Ok(None);
        }
        Self::parse(s)
            .map(Some)
            .ok_or_else(|| format!("unknown status filter: {}", s))
    }
}

impl From<String> for TreatyStatus {
    fn from(s: String) -> Self {
        Self::parse(&s).unwrap_or(Self::Unknown)
    }
}

/// How well a record (or its boundary) is attested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum Certainty {
    Verified,
    Reported,
    #[default]
    Uncertain,
}

impl Certainty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verified => "Verified",
            Self::Reported => "Reported",
            Self::Uncertain => "Uncertain",
        }
    }

    /// Badge glyph shown next to a name: `!` for verified, `~` otherwise.
    pub fn badge(&self) -> char {
        match self {
            Self::Verified => '!',
            Self::Reported | Self::Uncertain => '~',
        }
    }
}

impl From<String> for Certainty {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "verified" => Self::Verified,
            "reported" => Self::Reported,
            _ => Self::Uncertain,
        }
    }
}

/// A tribal nation party to a treaty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TribeRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub number: u32,
    pub text: String,
}

/// A documentary source backing a treaty record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    #[serde(default)]
    pub source_type: String,
    /// Reliability in `[0, 1]`.
    #[serde(default)]
    pub reliability: f64,
    #[serde(default)]
    pub url: Option<String>,
}

impl Source {
    /// Reliability as a whole percentage, clamped to `[0, 100]`.
    pub fn reliability_percent(&self) -> u8 {
        (self.reliability.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}

/// A treaty between the United States and one or more tribal nations.
///
/// The list endpoint returns a summary (id, name, dates, tribes, status,
/// certainty); the detail endpoint also fills articles, sources, parties
/// and citations. Every optional field defaults so either shape parses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Treaty {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "lenient_date")]
    pub signed_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_date_text: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub ratified_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: TreatyStatus,
    #[serde(default)]
    pub certainty: Certainty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary_certainty: Option<Certainty>,
    #[serde(default)]
    pub tribes: Vec<TribeRef>,
    #[serde(default)]
    pub articles: Vec<Article>,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preamble: Option<String>,
    #[serde(default)]
    pub us_commissioners: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kappler_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kappler_citation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statutes_at_large: Option<String>,
}

impl Treaty {
    /// Minimal record, mostly useful for fixtures.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            signed_date: None,
            signed_date_text: None,
            ratified_date: None,
            status: TreatyStatus::Unknown,
            certainty: Certainty::Uncertain,
            boundary_certainty: None,
            tribes: Vec::new(),
            articles: Vec::new(),
            sources: Vec::new(),
            preamble: None,
            us_commissioners: Vec::new(),
            kappler_ref: None,
            kappler_citation: None,
            statutes_at_large: None,
        }
    }

    pub fn signed_year(&self) -> Option<i32> {
        self.signed_date.map(|d| d.year())
    }

    /// Certainty of the boundary if the detail record has one, else the record certainty.
    pub fn display_certainty(&self) -> Certainty {
        self.boundary_certainty.unwrap_or(self.certainty)
    }
}

/// Response of `GET /api/v1/treaties`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreatyList {
    #[serde(default)]
    pub treaties: Vec<Treaty>,
    #[serde(default)]
    pub total: usize,
}

/// Parse an ISO calendar date, treating anything unparsable as absent.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        let s = s.trim();
        // Postgres `date::text` and ISO timestamps both start with YYYY-MM-DD
        let day = s.get(..10).unwrap_or(s);
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }))
}
