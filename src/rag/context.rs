//! Citations and grounding context from ranked search hits

use std::sync::Arc;

use crate::metrics::Metrics;
use crate::models::Citation;
use crate::models::Metadata;
use crate::models::SearchHit;
use crate::rag::text::shorten;

pub const TITLE_WIDTH: usize = 80;
pub const SNIPPET_WIDTH: usize = 220;

/// Source fields surfaced as citation metadata, in display order
pub const METADATA_FIELDS: [(&str, &str); 7] = [
    ("severity", "Severity"),
    ("priority", "Priority"),
    ("status", "Status"),
    ("owner", "Owner"),
    ("assigned_to", "Assignee"),
    ("category", "Category"),
    ("service", "Service"),
];

/// Label under which document tags are merged into the metadata
pub const TAGS_LABEL: &str = "Tags";

/// Citations plus the text block used to ground generation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssembledContext {
    pub citations: Vec<Citation>,
    pub context: String,
}

impl AssembledContext {
    pub fn is_empty(&self) -> bool {
        self.citations.is_empty()
    }
}

/// Assembler for creating context from search hits
pub struct ContextAssembler {
    max_citations: usize,
    metrics: Option<Arc<Metrics>>,
}

impl ContextAssembler {
    /// Create a new context assembler
    #[must_use]
    pub fn new(max_citations: usize) -> Self {
        Self {
            max_citations,
            metrics: None,
        }
    }

    /// Count every materialised citation against its source index
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Build numbered citations for the first `max_citations` hits and the
    /// matching context block. Entries are separated by a blank line.
    pub fn assemble(&self, hits: &[SearchHit]) -> AssembledContext {
        let mut citations = Vec::with_capacity(hits.len().min(self.max_citations));
        let mut entries = Vec::with_capacity(citations.capacity());

        for (position, hit) in hits.iter().take(self.max_citations).enumerate() {
            let number = position + 1;
            if let Some(metrics) = &self.metrics {
                metrics.record_source(hit.index_name());
            }

            let citation = build_citation(hit, number);
            entries.push(format_entry(number, &citation));
            citations.push(citation);
        }

        AssembledContext {
            citations,
            context: entries.join("\n\n"),
        }
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new(4)
    }
}

/// Citation view of a hit; `number` only seeds the fallback id
pub fn build_citation(hit: &SearchHit, number: usize) -> Citation {
    let source = &hit.source;
    let content = source.text("content").unwrap_or("");

    let title = source
        .text("title")
        .map_or_else(|| shorten(content, TITLE_WIDTH), str::to_string);
    let snippet = source
        .text("summary")
        .map_or_else(|| shorten(content, SNIPPET_WIDTH), str::to_string);
    let uri = source
        .text("uri")
        .or_else(|| source.text("link"))
        .map(str::to_string);

    Citation {
        id: hit
            .id
            .clone()
            .unwrap_or_else(|| format!("doc-{number}")),
        title: if title.is_empty() {
            "Untitled".to_string()
        } else {
            title
        },
        snippet: (!snippet.is_empty()).then_some(snippet),
        uri,
        score: hit.display_score(),
        metadata: extract_metadata(hit),
    }
}

/// Present, non-empty metadata fields in display order, then tags
pub fn extract_metadata(hit: &SearchHit) -> Metadata {
    let mut metadata = Metadata::default();
    for (field, label) in METADATA_FIELDS {
        if let Some(value) = hit.source.display_value(field) {
            metadata.insert(label, value);
        }
    }
    if let Some(tags) = hit.source.display_value("tags") {
        metadata.insert(TAGS_LABEL, tags);
    }
    metadata
}

/// One context entry:
///
/// ```text
/// [1] Title
/// Snippet: ...
/// Metadata: Severity: SEV1; Status: open
/// Source: https://...
/// ```
pub fn format_entry(number: usize, citation: &Citation) -> String {
    let mut lines = vec![
        format!("[{number}] {}", citation.title),
        format!("Snippet: {}", citation.snippet.as_deref().unwrap_or("N/A")),
    ];
    if !citation.metadata.is_empty() {
        let metadata_line = citation
            .metadata
            .iter()
            .map(|(label, value)| format!("{label}: {value}"))
            .collect::<Vec<_>>()
            .join("; ");
        lines.push(format!("Metadata: {metadata_line}"));
    }
    lines.push(format!("Source: {}", citation.source_label()));
    lines.join("\n")
}
