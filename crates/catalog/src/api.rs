//! JSON endpoints of the biodiversity service, as the dashboard calls them.
//!
//! Map tile endpoints return image bytes and live with the tile code in the
//! `streaming` crate.

use serde::{Deserialize, Serialize};

use crate::species::{PopularSpecies, Species, SpeciesKey};

/// Shortest query the search endpoint accepts, in characters.
pub const MIN_QUERY_CHARS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    SearchSpecies { query: String },
    SpeciesTimeline { key: SpeciesKey, country: String },
    PopularSpecies,
}

impl Endpoint {
    /// Path relative to the service base URL, without the query string.
    pub fn path(&self) -> String {
        match self {
            Endpoint::SearchSpecies { .. } => "/species/search".to_string(),
            Endpoint::SpeciesTimeline { key, .. } => format!("/species/{key}/timeline"),
            Endpoint::PopularSpecies => "/popular-species".to_string(),
        }
    }

    /// Query parameters, unencoded.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            Endpoint::SearchSpecies { query } => vec![("q", query.clone())],
            Endpoint::SpeciesTimeline { country, .. } => vec![("country", country.clone())],
            Endpoint::PopularSpecies => Vec::new(),
        }
    }

    /// Message surfaced when the call fails.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Endpoint::SearchSpecies { .. } => "Search failed",
            Endpoint::SpeciesTimeline { .. } => "Failed to fetch timeline data",
            Endpoint::PopularSpecies => "Failed to fetch popular species",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())?;
        for (i, (k, v)) in self.query().iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{k}={v}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<Species>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularSpeciesResponse {
    #[serde(default)]
    pub species: Vec<PopularSpecies>,
}
