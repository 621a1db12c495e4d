//! Keyword-driven filter inference

use crate::models::FilterSet;

/// Field the inferred tags are matched against
pub const TAGS_FIELD: &str = "tags";

/// If any trigger appears in the query, all tags of the rule apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRule {
    pub triggers: Vec<String>,
    pub tags: Vec<String>,
}

impl FilterRule {
    pub fn new(triggers: &[&str], tags: &[&str]) -> Self {
        Self {
            triggers: triggers.iter().map(|t| t.to_lowercase()).collect(),
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
        }
    }

    fn matches(&self, lowered_query: &str) -> bool {
        self.triggers
            .iter()
            .any(|trigger| lowered_query.contains(trigger.as_str()))
    }
}

/// Maps free-text queries to tag filters
#[derive(Debug, Clone)]
pub struct FilterInferencer {
    rules: Vec<FilterRule>,
}

impl FilterInferencer {
    pub fn new(rules: Vec<FilterRule>) -> Self {
        Self { rules }
    }

    /// Union the tags of every rule with a trigger that is a substring of the
    /// lower-cased query. Empty when nothing matches.
    pub fn infer(&self, query: &str) -> FilterSet {
        let lowered = query.to_lowercase();
        let mut filters = FilterSet::new();
        for rule in self.rules.iter().filter(|rule| rule.matches(&lowered)) {
            filters.extend(TAGS_FIELD, rule.tags.iter().cloned());
        }
        filters
    }
}

impl Default for FilterInferencer {
    fn default() -> Self {
        Self::new(vec![
            FilterRule::new(
                &["sev", "incident", "ticket", "outage"],
                &["ticket", "incident", "sev"],
            ),
            FilterRule::new(
                &["policy", "procedure", "byod", "compliance"],
                &["policy", "procedure", "compliance"],
            ),
            FilterRule::new(
                &["playbook", "runbook", "remediation"],
                &["playbook", "runbook", "remediation"],
            ),
            FilterRule::new(&["postmortem", "rca"], &["postmortem", "rca"]),
            FilterRule::new(&["chat", "transcript"], &["chat", "conversation"]),
        ])
    }
}
