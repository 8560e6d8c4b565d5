use serde::{Deserialize, Deserializer, Serialize};

/// Reads an explicit `null` the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Stable identity of a taxon in the upstream service.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeciesKey(pub u64);

impl std::fmt::Display for SpeciesKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A taxon as returned by search and the popular list.
///
/// Immutable once fetched. Every field but `key` tolerates being absent on
/// the wire, since the service fills gaps with empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Species {
    pub key: SpeciesKey,
    #[serde(default, deserialize_with = "null_as_default")]
    pub scientific_name: String,
    #[serde(default)]
    pub vernacular_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub kingdom: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phylum: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub class: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub order: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub family: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genus: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub species: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rank: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub taxonomic_status: String,
    /// Opaque id of the source dataset. Empty means no map can be drawn.
    #[serde(default, deserialize_with = "null_as_default")]
    pub dataset_key: String,
}

impl Species {
    pub fn new(key: u64, scientific_name: impl Into<String>) -> Self {
        Self {
            key: SpeciesKey(key),
            scientific_name: scientific_name.into(),
            vernacular_name: None,
            kingdom: String::new(),
            phylum: String::new(),
            class: String::new(),
            order: String::new(),
            family: String::new(),
            genus: String::new(),
            species: String::new(),
            rank: String::new(),
            taxonomic_status: String::new(),
            dataset_key: String::new(),
        }
    }

    pub fn with_vernacular_name(mut self, name: impl Into<String>) -> Self {
        self.vernacular_name = Some(name.into());
        self
    }

    pub fn with_dataset_key(mut self, dataset_key: impl Into<String>) -> Self {
        self.dataset_key = dataset_key.into();
        self
    }

    /// Common name when there is one, otherwise the scientific name.
    pub fn display_name(&self) -> &str {
        match self.vernacular_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.scientific_name,
        }
    }

    pub fn has_dataset_key(&self) -> bool {
        !self.dataset_key.is_empty()
    }

    /// Abbreviated dataset key for badges, e.g. `50c9509d...`.
    pub fn short_dataset_key(&self) -> Option<String> {
        if self.dataset_key.is_empty() {
            return None;
        }
        let head: String = self.dataset_key.chars().take(8).collect();
        Some(format!("{head}..."))
    }

    /// Non-empty kingdom, phylum, class and family labels, in that order.
    pub fn taxonomy_badges(&self) -> Vec<&str> {
        [
            self.kingdom.as_str(),
            self.phylum.as_str(),
            self.class.as_str(),
            self.family.as_str(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect()
    }
}

/// A species from the default landing list, with its observation count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularSpecies {
    #[serde(flatten)]
    pub species: Species,
    #[serde(default, deserialize_with = "null_as_default")]
    pub observation_count: u64,
}
