use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::{ClassificationSource, Platform, TitleProfile, Viewpoint};
use crate::ConfigError;

/// One curated title as written in the titles YAML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleEntry {
    pub name: String,
    pub platforms: BTreeMap<Platform, String>,
    pub primary_platform: Platform,
    pub genre: String,
    #[serde(default)]
    pub viewpoint: Viewpoint,
}

impl TitleEntry {
    /// URL-safe slug derived from the title name.
    #[must_use]
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }

    /// Curated entries are registry hits: confidence 100, always PC-available.
    #[must_use]
    pub fn to_profile(&self, viewer_count: u64) -> TitleProfile {
        TitleProfile {
            name: self.name.clone(),
            platforms: self.platforms.clone(),
            primary_platform: self.primary_platform,
            genre: self.genre.clone(),
            viewpoint: self.viewpoint,
            pc_available: true,
            confidence: 100,
            source: ClassificationSource::Registry,
            viewer_count,
        }
    }
}

/// Lowercase ASCII slug: spaces and punctuation collapse to single dashes.
#[must_use]
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

#[derive(Debug, Deserialize)]
pub struct TitlesFile {
    pub titles: Vec<TitleEntry>,
}

/// Load and validate extra curated titles from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_titles(path: &Path) -> Result<TitlesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::TitlesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let titles_file: TitlesFile = serde_yaml::from_str(&content)?;
    validate_titles(&titles_file)?;

    Ok(titles_file)
}

fn validate_titles(titles_file: &TitlesFile) -> Result<(), ConfigError> {
    let mut seen_slugs = HashSet::new();

    for title in &titles_file.titles {
        if title.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "title name must be non-empty".to_string(),
            ));
        }

        if title.platforms.is_empty() {
            return Err(ConfigError::Validation(format!(
                "title '{}' must list at least one platform",
                title.name
            )));
        }

        if title.platforms.contains_key(&Platform::Multi) {
            return Err(ConfigError::Validation(format!(
                "title '{}' lists 'multi' as a platform; it is only valid as primary_platform",
                title.name
            )));
        }

        let primary_ok = match title.primary_platform {
            Platform::Multi => title.platforms.len() >= 2,
            other => title.platforms.contains_key(&other),
        };
        if !primary_ok {
            return Err(ConfigError::Validation(format!(
                "title '{}' has primary platform '{}' that is not backed by its platform list",
                title.name, title.primary_platform
            )));
        }

        let slug = title.slug();
        if !seen_slugs.insert(slug.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate title: '{}' (slug '{slug}')",
                title.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "titles_test.rs"]
mod tests;
