//! Query bodies and locale-based index routing

use std::collections::HashMap;

use serde_json::json;
use serde_json::Value;

use crate::models::FilterSet;

/// Field the primary clause is matched against
pub const CONTENT_FIELD: &str = "content";

/// How the primary clause scores documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// `semantic` query backed by an inference endpoint
    Semantic,
    /// AND-combined term `match`
    Lexical,
}

/// Routes a request to an index based on its locale
#[derive(Debug, Clone)]
pub struct IndexResolver {
    default_index: String,
    overrides: HashMap<String, String>,
}

impl IndexResolver {
    /// Override keys are matched case-insensitively; empty index names are dropped
    pub fn new(default_index: impl Into<String>, overrides: &HashMap<String, String>) -> Self {
        let overrides = overrides
            .iter()
            .filter(|(_, index)| !index.is_empty())
            .map(|(locale, index)| (locale.to_lowercase(), index.clone()))
            .collect();
        Self {
            default_index: default_index.into(),
            overrides,
        }
    }

    pub fn default_index(&self) -> &str {
        &self.default_index
    }

    /// Full locale first, then its primary language subtag, then the default index
    pub fn resolve(&self, locale: Option<&str>) -> &str {
        let Some(locale) = locale.filter(|l| !l.is_empty()) else {
            return &self.default_index;
        };
        let key = locale.to_lowercase();
        if let Some(index) = self.overrides.get(&key) {
            return index;
        }
        let language = key.split('-').next().unwrap_or_default();
        self.overrides
            .get(language)
            .map_or(self.default_index.as_str(), String::as_str)
    }
}

/// Filter clauses for a filter set; each field becomes a `terms` clause
/// with its values in sorted order
pub fn filter_clauses(filters: &FilterSet) -> Vec<Value> {
    filters
        .iter()
        .map(|(field, values)| {
            let values: Vec<&str> = values.iter().map(String::as_str).collect();
            json!({ "terms": { field: values } })
        })
        .collect()
}

fn primary_clause(query: &str, mode: QueryMode) -> Value {
    match mode {
        QueryMode::Semantic => json!({
            "semantic": {
                "field": CONTENT_FIELD,
                "query": query,
            }
        }),
        QueryMode::Lexical => json!({
            "match": {
                CONTENT_FIELD: {
                    "query": query,
                    "operator": "and",
                }
            }
        }),
    }
}

/// Full `_search` body. Filters restrict candidates through a
/// `bool { must, filter }` wrapper so they never affect scoring.
pub fn build_query_body(
    query: &str,
    filters: Option<&FilterSet>,
    mode: QueryMode,
    size: usize,
) -> Value {
    let clause = primary_clause(query, mode);
    let filters = filters.map(filter_clauses).unwrap_or_default();
    if filters.is_empty() {
        return json!({ "size": size, "query": clause });
    }
    json!({
        "size": size,
        "query": {
            "bool": {
                "filter": filters,
                "must": [clause],
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> IndexResolver {
        let overrides = HashMap::from([
            ("fr-FR".to_string(), "idx-fr".to_string()),
            ("es".to_string(), "idx-es".to_string()),
            ("de".to_string(), String::new()),
        ]);
        IndexResolver::new("knowledge-base", &overrides)
    }

    #[test]
    fn test_resolve_full_locale() {
        assert_eq!(resolver().resolve(Some("fr-FR")), "idx-fr");
        assert_eq!(resolver().resolve(Some("FR-fr")), "idx-fr");
    }

    #[test]
    fn test_resolve_language_subtag() {
        assert_eq!(resolver().resolve(Some("es-MX")), "idx-es");
        assert_eq!(resolver().resolve(Some("es")), "idx-es");
    }

    #[test]
    fn test_resolve_default() {
        let resolver = resolver();
        assert_eq!(resolver.resolve(Some("de-DE")), "knowledge-base");
        assert_eq!(resolver.resolve(None), "knowledge-base");
        assert_eq!(resolver.resolve(Some("")), "knowledge-base");
        assert_eq!(resolver.resolve(Some("fr-CA")), "knowledge-base");
    }

    #[test]
    fn test_semantic_body_without_filters() {
        let body = build_query_body("db outage", None, QueryMode::Semantic, 8);
        assert_eq!(
            body,
            json!({
                "size": 8,
                "query": {"semantic": {"field": "content", "query": "db outage"}}
            })
        );
    }

    #[test]
    fn test_lexical_body_with_filters() {
        let mut filters = FilterSet::new();
        filters.extend("tags", ["sev", "incident", "ticket"]);

        let body = build_query_body("db outage", Some(&filters), QueryMode::Lexical, 3);
        assert_eq!(
            body,
            json!({
                "size": 3,
                "query": {
                    "bool": {
                        "filter": [{"terms": {"tags": ["incident", "sev", "ticket"]}}],
                        "must": [{"match": {"content": {"query": "db outage", "operator": "and"}}}]
                    }
                }
            })
        );
    }

    #[test]
    fn test_empty_filter_set_adds_no_clauses() {
        let body = build_query_body("vpn", Some(&FilterSet::new()), QueryMode::Lexical, 5);
        assert!(body["query"].get("bool").is_none());
        assert!(body["query"].get("match").is_some());
    }
}
