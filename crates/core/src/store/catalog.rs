use serde::{Deserialize, Serialize};

use crate::domain::material::{Material, MaterialId};
use crate::domain::request::Unit;

pub const DEFAULT_ITEMS_PER_SUBCATEGORY: u32 = 50;
pub const DEFAULT_QUICK_SEARCH_LIMIT: usize = 50;

const CATALOG_LAYOUT: &[(&str, &[&str])] = &[
    ("Office", &["Stationery", "Furniture", "Electronics"]),
    ("Lab", &["Chemicals", "Glassware", "Instruments"]),
    ("IT", &["Laptops", "Peripherals", "Network"]),
    ("Maintenance", &["Tools", "Consumables", "Safety"]),
];

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialFilter {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub query: Option<String>,
}

impl MaterialFilter {
    pub fn matches(&self, material: &Material) -> bool {
        let needle = normalized_query(self.query.as_deref());
        self.matches_with(material, &needle)
    }

    fn matches_with(&self, material: &Material, needle: &str) -> bool {
        let category_ok =
            constraint(self.category.as_deref()).map(|c| material.category == c).unwrap_or(true);
        let subcategory_ok = constraint(self.subcategory.as_deref())
            .map(|s| material.subcategory == s)
            .unwrap_or(true);

        category_ok && subcategory_ok && material.matches_query(needle)
    }

    pub fn is_empty(&self) -> bool {
        constraint(self.category.as_deref()).is_none()
            && constraint(self.subcategory.as_deref()).is_none()
            && normalized_query(self.query.as_deref()).is_empty()
    }
}

/// Merge-style update for the active filter; `None` keeps the current constraint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialFilterPatch {
    pub category: Option<Option<String>>,
    pub subcategory: Option<Option<String>>,
    pub query: Option<Option<String>>,
}

fn constraint(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

fn normalized_query(query: Option<&str>) -> String {
    query.map(|query| query.trim().to_lowercase()).unwrap_or_default()
}

/// Static material catalog plus the filter state of the selector.
#[derive(Clone, Debug)]
pub struct CatalogStore {
    materials: Vec<Material>,
    filter: MaterialFilter,
    quick_search_limit: usize,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::generate(DEFAULT_ITEMS_PER_SUBCATEGORY, DEFAULT_QUICK_SEARCH_LIMIT)
    }
}

impl CatalogStore {
    pub fn new(materials: Vec<Material>, quick_search_limit: usize) -> Self {
        Self { materials, filter: MaterialFilter::default(), quick_search_limit }
    }

    /// Builds the synthetic catalog: `items_per_subcategory` entries for every subcategory.
    pub fn generate(items_per_subcategory: u32, quick_search_limit: usize) -> Self {
        let store = Self::new(generate_materials(items_per_subcategory), quick_search_limit);
        tracing::debug!(
            event_name = "catalog.generated",
            materials = store.materials.len(),
            "material catalog generated"
        );
        store
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn find(&self, id: &MaterialId) -> Option<&Material> {
        self.materials.iter().find(|material| &material.id == id)
    }

    pub fn categories(&self) -> Vec<&'static str> {
        CATALOG_LAYOUT.iter().map(|(category, _)| *category).collect()
    }

    pub fn subcategories(&self, category: &str) -> &'static [&'static str] {
        CATALOG_LAYOUT
            .iter()
            .find(|(name, _)| *name == category)
            .map(|(_, subcategories)| *subcategories)
            .unwrap_or(&[])
    }

    pub fn filter(&self, filter: &MaterialFilter) -> Vec<&Material> {
        let needle = normalized_query(filter.query.as_deref());
        self.materials.iter().filter(|material| filter.matches_with(material, &needle)).collect()
    }

    pub fn active_filter(&self) -> &MaterialFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, patch: MaterialFilterPatch) {
        if let Some(category) = patch.category {
            self.filter.category = category;
        }
        if let Some(subcategory) = patch.subcategory {
            self.filter.subcategory = subcategory;
        }
        if let Some(query) = patch.query {
            self.filter.query = query;
        }
    }

    pub fn reset_filter(&mut self) {
        self.filter = MaterialFilter::default();
    }

    /// Materials matching the active filter, uncapped.
    pub fn filtered(&self) -> Vec<&Material> {
        self.filter(&self.filter)
    }

    /// Name/code search for inline pickers, capped at the configured limit.
    pub fn quick_search(&self, query: &str) -> Vec<&Material> {
        let needle = query.trim().to_lowercase();
        self.materials
            .iter()
            .filter(|material| material.matches_query(&needle))
            .take(self.quick_search_limit)
            .collect()
    }
}

fn generate_materials(items_per_subcategory: u32) -> Vec<Material> {
    let mut materials = Vec::new();
    for (category, subcategories) in CATALOG_LAYOUT {
        for (sub_index, subcategory) in subcategories.iter().enumerate() {
            for index in 1..=items_per_subcategory {
                materials.push(Material {
                    id: MaterialId(format!("{category}-{subcategory}-{index}")),
                    code: Some(format!(
                        "{}-{}-{index:03}",
                        code_prefix(category),
                        code_prefix(subcategory)
                    )),
                    name: format!("{subcategory} Item {index}"),
                    category: (*category).to_string(),
                    subcategory: (*subcategory).to_string(),
                    unit: Unit::cycle(index as usize + sub_index),
                });
            }
        }
    }
    materials
}

fn code_prefix(value: &str) -> String {
    value.chars().take(2).collect::<String>().to_uppercase()
}
