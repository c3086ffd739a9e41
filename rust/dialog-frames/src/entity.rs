//! Linked entities and numerical elements, the two sources of frame
//! element fillers.

use serde::{Deserialize, Serialize};

/// A text span resolved by an entity linker to a knowledge-base resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedEntity {
    /// Surface text of the span.
    pub chunk: String,
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
    /// Canonical identifier of the resolved resource.
    pub uri: String,
    pub confidence: f64,
    /// Full ontology type URIs, in linker order.
    #[serde(default)]
    pub types: Vec<String>,
}

impl LinkedEntity {
    pub fn new(chunk: impl Into<String>, uri: impl Into<String>, confidence: f64) -> Self {
        LinkedEntity {
            chunk: chunk.into(),
            start: 0,
            end: 0,
            uri: uri.into(),
            confidence,
            types: Vec::new(),
        }
    }

    pub fn with_type(mut self, type_uri: impl Into<String>) -> Self {
        self.types.push(type_uri.into());
        self
    }

    /// Class local names of this entity's types, in source order.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(|uri| local_name(uri))
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }
}

/// Strip an ontology type URI down to its class name:
/// `http://dbpedia.org/ontology/Person` → `Person`. Names without a
/// namespace are returned unchanged.
pub fn local_name(uri: &str) -> &str {
    let trimmed = uri.trim_end_matches(['/', '#']);
    match trimmed.rfind(['/', '#', ':']) {
        Some(index) => &trimmed[index + 1..],
        None => trimmed,
    }
}

/// A normalized numerical or temporal expression found in a sentence, e.g.
/// `Time` for "1998" with literal value `1998`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericalElement {
    /// The frame element tag (`Time`, `Duration`, ...).
    pub tag: String,
    pub chunk: String,
    /// The normalized literal value.
    pub value: String,
    pub confidence: f64,
}

impl NumericalElement {
    pub fn new(
        tag: impl Into<String>,
        chunk: impl Into<String>,
        value: impl Into<String>,
        confidence: f64,
    ) -> Self {
        NumericalElement {
            tag: tag.into(),
            chunk: chunk.into(),
            value: value.into(),
            confidence,
        }
    }
}

/// DBpedia ontology namespace used for bare class names in fixtures.
pub const DBPEDIA_ONTOLOGY: &str = "http://dbpedia.org/ontology/";

/// Expand a class name to its DBpedia ontology URI.
pub fn dbpedia_type(class: &str) -> String {
    format!("{DBPEDIA_ONTOLOGY}{class}")
}
