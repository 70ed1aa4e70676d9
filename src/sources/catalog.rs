//! Static catalog of the veekun Pokedex CSV datasets

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{validate_table_name, LoadError};
use super::registry::REGISTRY_TABLE;

const VEEKUN_CSV_BASE: &str =
    "https://raw.githubusercontent.com/veekun/pokedex/refs/heads/master/pokedex/data/csv";

/// A named dataset and where it is fetched from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
    pub name: String,
    pub url: String,
}

impl DataSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// A dataset hosted alongside the builtin ones
    pub fn veekun(name: &str) -> Self {
        Self::new(name, format!("{}/{}.csv", VEEKUN_CSV_BASE, name))
    }
}

/// Builtin datasets in load order
pub fn builtin_sources() -> Vec<DataSource> {
    vec![
        DataSource::veekun("stats"),
        DataSource::veekun("types"),
        DataSource::veekun("type_efficacy"),
        DataSource::veekun("pokemon_species"),
        DataSource::veekun("pokemon_stats"),
        DataSource::veekun("pokemon_types"),
        DataSource::veekun("languages"),
        DataSource::veekun("type_names"),
        DataSource::veekun("moves"),
        DataSource::veekun("move_damage_classes"),
        DataSource::veekun("move_targets"),
        DataSource::veekun("natures"),
        DataSource::veekun("abilities"),
        DataSource::veekun("pokemon_abilities"),
    ]
}

/// JSON file that replaces the builtin catalog
///
/// ```json
/// { "sources": [ { "name": "types", "url": "https://..." } ] }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceManifest {
    pub sources: Vec<DataSource>,
}

impl SourceManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read source manifest: {:?}", path))?;
        let manifest: SourceManifest = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse source manifest: {:?}", path))?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        let mut seen = HashSet::new();
        for source in &self.sources {
            validate_table_name(&source.name)?;
            if source.name == REGISTRY_TABLE {
                return Err(LoadError::ReservedName(source.name.clone()));
            }
            if !seen.insert(source.name.as_str()) {
                return Err(LoadError::DuplicateSource(source.name.clone()));
            }
        }
        Ok(())
    }
}

/// The catalog in effect: the manifest if one was given, otherwise the builtins
pub fn load_catalog(manifest: Option<&Path>) -> Result<Vec<DataSource>> {
    match manifest {
        Some(path) => Ok(SourceManifest::load(path)?.sources),
        None => Ok(builtin_sources()),
    }
}

/// Find a source by name
pub fn get_source<'a>(catalog: &'a [DataSource], name: &str) -> Option<&'a DataSource> {
    catalog.iter().find(|s| s.name == name)
}

/// Get all source names
pub fn source_names(catalog: &[DataSource]) -> Vec<&str> {
    catalog.iter().map(|s| s.name.as_str()).collect()
}
