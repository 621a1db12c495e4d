use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Locales accepted on chat requests
pub const SUPPORTED_LOCALES: [&str; 3] = ["en-US", "es-ES", "fr-FR"];

/// Structured search filters: field name to the set of accepted values.
/// Backed by ordered collections so generated queries are reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FilterSet(BTreeMap<String, BTreeSet<String>>);

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union `values` into `field`, creating the field even if `values` is empty
    pub fn extend<I, S>(&mut self, field: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .entry(field.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
    }

    pub fn get(&self, field: &str) -> Option<&BTreeSet<String>> {
        self.0.get(field)
    }

    /// True when no field is present at all ("no filtering")
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.0.iter().map(|(field, values)| (field.as_str(), values))
    }
}

/// Raw document fields as stored in the index (`_source`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HitSource(Map<String, Value>);

impl HitSource {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    /// String value of a field, `None` when missing, not a string, or empty
    pub fn text(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Human-readable rendering of a field; list values are joined with `", "`.
    /// Returns `None` for absent, null, false, zero or empty values.
    pub fn display_value(&self, field: &str) -> Option<String> {
        let value = self.0.get(field)?;
        if !is_truthy(value) {
            return None;
        }
        let rendered = match value {
            Value::Array(items) => items
                .iter()
                .filter(|item| is_truthy(item))
                .map(stringify)
                .collect::<Vec<_>>()
                .join(", "),
            other => stringify(other),
        };
        (!rendered.is_empty()).then_some(rendered)
    }

    /// Tags attached to the document; a bare string counts as a single tag
    pub fn tags(&self) -> Vec<String> {
        match self.0.get("tags") {
            Some(Value::Array(items)) => items
                .iter()
                .filter(|item| is_truthy(item))
                .map(stringify)
                .collect(),
            Some(Value::String(tag)) if !tag.is_empty() => vec![tag.clone()],
            _ => Vec::new(),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags().iter().any(|t| t == tag)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One document returned by the search backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(rename = "_index", default)]
    pub index: Option<String>,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub source: HitSource,
    /// Relevance assigned by the reranker, never by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rerank_score: Option<f64>,
}

impl SearchHit {
    pub fn index_name(&self) -> &str {
        self.index.as_deref().unwrap_or("unknown")
    }

    /// Rerank relevance wins over the base score when present
    pub fn display_score(&self) -> Option<f64> {
        self.rerank_score.or(self.score)
    }

    /// Text handed to the reranker: `content`, then `text`, then empty
    pub fn rerank_text(&self) -> &str {
        self.source
            .text("content")
            .or_else(|| self.source.text("text"))
            .unwrap_or("")
    }
}

/// Ordered label/value pairs shown alongside a citation.
/// Serialized as a JSON object in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata(Vec<(String, String)>);

impl Metadata {
    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<String>) {
        let label = label.into();
        let value = value.into();
        if let Some(entry) = self.0.iter_mut().find(|(l, _)| *l == label) {
            entry.1 = value;
        } else {
            self.0.push((label, value));
        }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(l, v)| (l.as_str(), v.as_str()))
    }
}

impl Serialize for Metadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, value) in &self.0 {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

/// Numbered reference surfaced next to a generated answer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Citation {
    pub id: String,
    pub title: String,
    pub snippet: Option<String>,
    pub uri: Option<String>,
    pub score: Option<f64>,
    pub metadata: Metadata,
}

impl Citation {
    /// Label used in the `sources` list of a chat response
    pub fn source_label(&self) -> &str {
        self.uri.as_deref().unwrap_or(&self.id)
    }
}

/// Kinds of follow-up actions the copilot can propose or execute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    SlackWebhook,
    JiraWebhook,
    ReviewTicket,
    ManualReview,
}

impl ActionKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SlackWebhook => "slack_webhook",
            Self::JiraWebhook => "jira_webhook",
            Self::ReviewTicket => "review_ticket",
            Self::ManualReview => "manual_review",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Proposed (never auto-executed) operational action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowUpAction {
    pub label: String,
    pub action: ActionKind,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub locale: Option<String>,
}

impl ChatRequest {
    pub fn last_user_message(&self) -> Option<&ChatMessage> {
        self.messages.iter().rev().find(|m| m.role == Role::User)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub reply: ChatMessage,
    pub sources: Vec<String>,
    pub references: Vec<Citation>,
    pub follow_ups: Vec<FollowUpAction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRequest {
    pub action: ActionKind,
    #[serde(default)]
    pub payload: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub status: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn source(value: Value) -> HitSource {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_display_value_joins_lists() {
        let src = source(json!({"owner": ["alice", "", "bob"], "status": "open"}));
        assert_eq!(src.display_value("owner").as_deref(), Some("alice, bob"));
        assert_eq!(src.display_value("status").as_deref(), Some("open"));
    }

    #[test]
    fn test_display_value_skips_falsy() {
        let src = source(json!({"status": "", "priority": 0, "owner": null, "tags": []}));
        assert_eq!(src.display_value("status"), None);
        assert_eq!(src.display_value("priority"), None);
        assert_eq!(src.display_value("owner"), None);
        assert_eq!(src.display_value("tags"), None);
        assert_eq!(src.display_value("missing"), None);
    }

    #[test]
    fn test_display_value_numbers() {
        let src = source(json!({"priority": 2}));
        assert_eq!(src.display_value("priority").as_deref(), Some("2"));
    }

    #[test]
    fn test_tags_from_string_or_list() {
        assert_eq!(
            source(json!({"tags": ["ticket", "sev"]})).tags(),
            vec!["ticket".to_string(), "sev".to_string()]
        );
        assert_eq!(source(json!({"tags": "ticket"})).tags(), vec!["ticket"]);
        assert!(source(json!({})).tags().is_empty());
    }

    #[test]
    fn test_search_hit_deserializes_elastic_shape() {
        let hit: SearchHit = serde_json::from_value(json!({
            "_id": "INC-1",
            "_index": "knowledge-base",
            "_score": 3.5,
            "_source": {"title": "Outage", "content": "db down"}
        }))
        .unwrap();

        assert_eq!(hit.id.as_deref(), Some("INC-1"));
        assert_eq!(hit.index_name(), "knowledge-base");
        assert_eq!(hit.display_score(), Some(3.5));
        assert_eq!(hit.rerank_text(), "db down");
        assert_eq!(hit.rerank_score, None);
    }

    #[test]
    fn test_rerank_score_takes_priority() {
        let hit = SearchHit {
            score: Some(1.0),
            rerank_score: Some(0.25),
            ..Default::default()
        };
        assert_eq!(hit.display_score(), Some(0.25));
    }

    #[test]
    fn test_rerank_text_falls_back_to_text_field() {
        let hit = SearchHit {
            source: source(json!({"text": "transcript"})),
            ..Default::default()
        };
        assert_eq!(hit.rerank_text(), "transcript");
        assert_eq!(SearchHit::default().rerank_text(), "");
        assert_eq!(SearchHit::default().index_name(), "unknown");
    }

    #[test]
    fn test_metadata_serializes_in_order() {
        let mut metadata = Metadata::default();
        metadata.insert("Severity", "SEV1");
        metadata.insert("Owner", "alice");
        metadata.insert("Tags", "ticket");

        let json = serde_json::to_string(&metadata).unwrap();
        assert_eq!(json, r#"{"Severity":"SEV1","Owner":"alice","Tags":"ticket"}"#);
    }

    #[test]
    fn test_action_kind_wire_names() {
        let kind: ActionKind = serde_json::from_value(json!("jira_webhook")).unwrap();
        assert_eq!(kind, ActionKind::JiraWebhook);
        assert_eq!(ActionKind::SlackWebhook.to_string(), "slack_webhook");
        assert!(serde_json::from_value::<ActionKind>(json!("delete_everything")).is_err());
    }

    #[test]
    fn test_last_user_message() {
        let request = ChatRequest {
            session_id: None,
            messages: vec![
                ChatMessage::user("first"),
                ChatMessage::assistant("answer"),
                ChatMessage::user("second"),
                ChatMessage::assistant("another"),
            ],
            locale: None,
        };
        assert_eq!(request.last_user_message().unwrap().content, "second");
    }
}
