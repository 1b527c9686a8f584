//! Store configuration
//!
//! Names the two storage keys and the columns a fresh board is seeded with.
//! Every field has a default, so an empty TOML document is a valid config:
//!
//! ```toml
//! author_key = "author"
//! columns_key = "columns"
//! default_columns = ["To Do", "In Progress", "Testing", "Done"]
//! ```

use crate::{
    domain::board::default_column_names,
    error::{KanbanError, Result},
    storage::validate_key,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Key holding the current author name
    pub author_key: String,
    /// Key holding the serialized column sequence
    pub columns_key: String,
    /// Columns created when the stored sequence is empty
    pub default_columns: Vec<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            author_key: "author".to_string(),
            columns_key: "columns".to_string(),
            default_columns: default_column_names(),
        }
    }
}

impl StoreConfig {
    /// Parses and validates a TOML config
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that both keys are valid storage keys and do not collide
    pub fn validate(&self) -> Result<()> {
        for key in [&self.author_key, &self.columns_key] {
            validate_key(key).map_err(|e| KanbanError::ConfigError(e.to_string()))?;
        }
        if self.author_key == self.columns_key {
            return Err(KanbanError::ConfigError(format!(
                "author_key and columns_key must differ, both are '{}'",
                self.author_key
            )));
        }
        Ok(())
    }

    /// Loads a config file, falling back to defaults if it does not exist
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        match tokio::fs::read_to_string(path).await {
            Ok(contents) => Self::from_toml_str(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no store config found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Replaces the columns a fresh board is seeded with
    pub fn with_default_columns<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_columns = names.into_iter().map(Into::into).collect();
        self
    }
}
