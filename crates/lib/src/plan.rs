//! Buildpack plan entries recorded during the build phase.

use serde::{Deserialize, Serialize};
use toml::Table;

/// The set of requirements a buildpack resolved while building.
///
/// Entries are append-only; a contribution adds exactly one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildpackPlan {
  #[serde(default)]
  pub entries: Vec<BuildpackPlanEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildpackPlanEntry {
  pub name: String,
  #[serde(default)]
  pub metadata: Table,
}

impl BuildpackPlanEntry {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      metadata: Table::new(),
    }
  }
}

impl BuildpackPlan {
  pub fn push(&mut self, entry: BuildpackPlanEntry) {
    self.entries.push(entry);
  }

  pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
    toml::to_string(self)
  }

  pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
    toml::from_str(content)
  }
}
