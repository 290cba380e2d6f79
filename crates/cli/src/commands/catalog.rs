use reqflow_core::config::AppConfig;
use reqflow_core::{Material, MaterialFilterPatch, Session};
use serde::Serialize;

use crate::commands::CommandResult;

#[derive(Debug, Default)]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub query: Option<String>,
    pub quick: bool,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct CatalogPage<'a> {
    total: usize,
    shown: usize,
    categories: Vec<&'static str>,
    subcategories: &'static [&'static str],
    materials: Vec<&'a Material>,
}

/// Browses the generated catalog.
///
/// `quick` uses the capped name/code search of the inline picker; otherwise the
/// category/subcategory/query filter of the full selector applies, uncapped unless
/// `limit` is set.
pub fn run(config: &AppConfig, query: CatalogQuery) -> CommandResult {
    let mut session = Session::from_config(config.clone());

    let matches = if query.quick {
        session.catalog.quick_search(query.query.as_deref().unwrap_or_default())
    } else {
        session.catalog.set_filter(MaterialFilterPatch {
            category: Some(query.category.clone()),
            subcategory: Some(query.subcategory.clone()),
            query: Some(query.query.clone()),
        });
        session.catalog.filtered()
    };

    let total = matches.len();
    let materials = match query.limit {
        Some(limit) => matches.into_iter().take(limit).collect::<Vec<_>>(),
        None => matches,
    };
    let subcategories = query
        .category
        .as_deref()
        .map(|category| session.catalog.subcategories(category))
        .unwrap_or(&[]);

    let page = CatalogPage {
        total,
        shown: materials.len(),
        categories: session.catalog.categories(),
        subcategories,
        materials,
    };
    CommandResult::success_with(
        "catalog",
        format!("{} of {total} material(s)", page.shown),
        page,
    )
}

#[cfg(test)]
mod tests {
    use reqflow_core::config::AppConfig;
    use serde_json::Value;

    use super::{run, CatalogQuery};

    fn payload(query: CatalogQuery) -> Value {
        serde_json::from_str(&run(&AppConfig::default(), query).output).expect("json")
    }

    #[test]
    fn category_filter_lists_subcategories() {
        let payload = payload(CatalogQuery {
            category: Some("Lab".to_string()),
            limit: Some(5),
            ..CatalogQuery::default()
        });

        assert_eq!(payload["data"]["total"], 150);
        assert_eq!(payload["data"]["shown"], 5);
        assert_eq!(payload["data"]["subcategories"][0], "Chemicals");
        assert_eq!(payload["message"], "5 of 150 material(s)");
    }

    #[test]
    fn code_search_is_case_insensitive() {
        let payload = payload(CatalogQuery {
            query: Some("it-la-007".to_string()),
            ..CatalogQuery::default()
        });

        assert_eq!(payload["data"]["total"], 1);
        assert_eq!(payload["data"]["materials"][0]["name"], "Laptops Item 7");
    }

    #[test]
    fn quick_search_is_capped() {
        let payload = payload(CatalogQuery { quick: true, ..CatalogQuery::default() });

        assert_eq!(payload["data"]["total"], 50);
    }
}
