use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Top-level page of the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Map,
    Treaties,
    Tribes,
    About,
}

impl View {
    pub const ALL: [View; 4] = [Self::Map, Self::Treaties, Self::Tribes, Self::About];

    /// Canonical path for the view.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Map => "/",
            Self::Treaties => "/treaties",
            Self::Tribes => "/tribes",
            Self::About => "/about",
        }
    }

    /// Label used in the navigation bar.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Map => "Map",
            Self::Treaties => "Treaties",
            Self::Tribes => "Tribal Nations",
            Self::About => "About",
        }
    }
}

/// Tab of the treaty detail panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailTab {
    #[default]
    Overview,
    Parties,
    Text,
    Sources,
}

impl DetailTab {
    pub const ALL: [DetailTab; 4] = [Self::Overview, Self::Parties, Self::Text, Self::Sources];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Parties => "parties",
            Self::Text => "text",
            Self::Sources => "sources",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Parties => "Parties",
            Self::Text => "Text",
            Self::Sources => "Sources",
        }
    }
}

impl fmt::Display for DetailTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetailTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tab| tab.as_str() == s.to_ascii_lowercase())
            .ok_or_else(|| format!("unknown tab: {}", s))
    }
}
