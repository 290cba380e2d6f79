use serde::{Deserialize, Serialize};

use crate::domain::request::Unit;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialId(pub String);

/// Immutable catalog entry. Requests copy the fields they need from it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub id: MaterialId,
    pub code: Option<String>,
    pub name: String,
    pub category: String,
    pub subcategory: String,
    pub unit: Unit,
}

impl Material {
    /// Case-insensitive substring match against name or code. `needle` must already be lowercase.
    pub fn matches_query(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }

        self.name.to_lowercase().contains(needle)
            || self.code.as_ref().map(|code| code.to_lowercase().contains(needle)).unwrap_or(false)
    }
}
