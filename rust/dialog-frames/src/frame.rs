//! Frame definitions and their frame elements.
//!
//! A frame is a semantic scenario triggered by a lexical unit (a verb
//! lemma). Its frame elements (FEs) are the roles participants can play,
//! each annotated with the ontology classes an entity must carry to fill it.
//!
//! Frame definitions arrive as JSON keyed by trigger lemma:
//!
//! ```json
//! {
//!   "play": {
//!     "frame": "competition",
//!     "pos": "V",
//!     "core_fes": [
//!       {"fe": "Participant_1", "type": "Core", "dbpedia_classes": ["Person", "Organisation"]},
//!       {"fe": "Competition", "type": "Core", "dbpedia_classes": ["Competition"]}
//!     ],
//!     "extra_fes": [
//!       {"fe": "Place", "type": "Extra", "dbpedia_classes": ["Place"]}
//!     ]
//!   }
//! }
//! ```
//!
//! The raw shape is validated once into a [`FrameDefinition`], which also
//! inverts the FE → ontology relation into the class → FE index the
//! assigner consults for every sentence.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FrameError;

/// Whether a frame element is required by the frame or merely optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeType {
    Core,
    Extra,
}

impl fmt::Display for FeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeType::Core => write!(f, "Core"),
            FeType::Extra => write!(f, "Extra"),
        }
    }
}

/// A named role within a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameElementSpec {
    /// Unique within its frame (e.g. `Participant_1`).
    pub name: String,
    pub fe_type: FeType,
    /// Ontology class local names this FE accepts, e.g. `Person`.
    /// Source order, duplicates removed.
    pub ontology_classes: Vec<String>,
    /// Free-form semantic type annotation carried through from the data.
    pub semantic_type: Option<String>,
}

impl FrameElementSpec {
    pub fn new(name: impl Into<String>, fe_type: FeType, classes: &[&str]) -> Self {
        FrameElementSpec {
            name: name.into(),
            fe_type,
            ontology_classes: dedup(classes.iter().map(|class| class.to_string())),
            semantic_type: None,
        }
    }

    pub fn is_core(&self) -> bool {
        self.fe_type == FeType::Core
    }

    pub fn accepts(&self, class: &str) -> bool {
        self.ontology_classes.iter().any(|c| c == class)
    }
}

/// A validated frame, immutable once built.
#[derive(Debug, Clone)]
pub struct FrameDefinition {
    name: String,
    lemma: String,
    pos_prefix: String,
    /// Core elements first, then extra, each in source order.
    elements: Vec<FrameElementSpec>,
    core_count: usize,
    by_name: HashMap<String, usize>,
    /// Ontology class → indices into `elements`, in element order.
    ontology_to_fe: HashMap<String, Vec<usize>>,
}

impl FrameDefinition {
    /// Validate a frame and precompute its lookup indices.
    pub fn new(
        name: impl Into<String>,
        lemma: impl Into<String>,
        pos_prefix: impl Into<String>,
        core: Vec<FrameElementSpec>,
        extra: Vec<FrameElementSpec>,
    ) -> Result<Self, FrameError> {
        let name = name.into();
        let lemma = lemma.into();

        if name.trim().is_empty() {
            return Err(FrameError::EmptyFrameName { lemma });
        }

        for (listed, specs, expected) in [("core", &core, FeType::Core), ("extra", &extra, FeType::Extra)] {
            if let Some(spec) = specs.iter().find(|spec| spec.fe_type != expected) {
                return Err(FrameError::MisplacedElement {
                    frame: name,
                    element: spec.name.clone(),
                    declared: spec.fe_type.to_string(),
                    listed: listed.to_string(),
                });
            }
        }

        let core_count = core.len();
        let elements: Vec<FrameElementSpec> = core.into_iter().chain(extra).collect();

        let mut by_name = HashMap::new();
        let mut ontology_to_fe: HashMap<String, Vec<usize>> = HashMap::new();

        for (index, spec) in elements.iter().enumerate() {
            if spec.name.trim().is_empty() {
                return Err(FrameError::EmptyElementName { frame: name });
            }
            if by_name.insert(spec.name.clone(), index).is_some() {
                return Err(FrameError::DuplicateElement {
                    frame: name,
                    element: spec.name.clone(),
                });
            }
            for class in &spec.ontology_classes {
                ontology_to_fe.entry(class.clone()).or_default().push(index);
            }
        }

        Ok(FrameDefinition {
            name,
            lemma,
            pos_prefix: pos_prefix.into(),
            elements,
            core_count,
            by_name,
            ontology_to_fe,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The lexical unit that triggers this frame.
    pub fn lemma(&self) -> &str {
        &self.lemma
    }

    pub fn pos_prefix(&self) -> &str {
        &self.pos_prefix
    }

    /// Whether a token with this POS tag may trigger the frame.
    pub fn accepts_pos(&self, pos: &str) -> bool {
        pos.starts_with(&self.pos_prefix)
    }

    pub fn core_elements(&self) -> &[FrameElementSpec] {
        &self.elements[..self.core_count]
    }

    pub fn extra_elements(&self) -> &[FrameElementSpec] {
        &self.elements[self.core_count..]
    }

    pub fn elements(&self) -> impl Iterator<Item = &FrameElementSpec> {
        self.elements.iter()
    }

    pub fn element(&self, name: &str) -> Option<&FrameElementSpec> {
        self.by_name.get(name).map(|&index| &self.elements[index])
    }

    /// Every FE that accepts the given ontology class, core before extra.
    pub fn elements_of_class<'a>(
        &'a self,
        class: &str,
    ) -> impl Iterator<Item = &'a FrameElementSpec> + use<'a> {
        self.ontology_to_fe
            .get(class)
            .into_iter()
            .flatten()
            .map(|&index| &self.elements[index])
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.ontology_to_fe.contains_key(class)
    }

    /// A frame without any ontology-annotated FE can never receive an
    /// automatic assignment.
    pub fn is_inert(&self) -> bool {
        self.ontology_to_fe.is_empty()
    }

    pub fn ontology_classes(&self) -> impl Iterator<Item = &str> {
        self.ontology_to_fe.keys().map(|class| class.as_str())
    }
}

/// The on-disk shape of one frame, keyed by its trigger lemma.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFrame {
    pub frame: String,
    pub pos: String,
    #[serde(default)]
    pub core_fes: Vec<RawFrameElement>,
    #[serde(default)]
    pub extra_fes: Vec<RawFrameElement>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFrameElement {
    pub fe: String,
    #[serde(rename = "type")]
    pub fe_type: FeType,
    #[serde(default)]
    pub dbpedia_classes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_type: Option<String>,
}

impl From<RawFrameElement> for FrameElementSpec {
    fn from(raw: RawFrameElement) -> Self {
        FrameElementSpec {
            name: raw.fe,
            fe_type: raw.fe_type,
            ontology_classes: dedup(raw.dbpedia_classes),
            semantic_type: raw.semantic_type,
        }
    }
}

impl RawFrame {
    pub fn into_definition(self, lemma: impl Into<String>) -> Result<FrameDefinition, FrameError> {
        FrameDefinition::new(
            self.frame,
            lemma,
            self.pos,
            self.core_fes.into_iter().map(FrameElementSpec::from).collect(),
            self.extra_fes.into_iter().map(FrameElementSpec::from).collect(),
        )
    }
}

fn dedup(classes: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    classes
        .into_iter()
        .filter(|class| seen.insert(class.clone()))
        .collect()
}

/// Builder for constructing frames in code.
pub struct FrameBuilder {
    name: String,
    lemma: String,
    pos_prefix: String,
    core: Vec<FrameElementSpec>,
    extra: Vec<FrameElementSpec>,
}

impl FrameBuilder {
    pub fn new(name: impl Into<String>, lemma: impl Into<String>) -> Self {
        FrameBuilder {
            name: name.into(),
            lemma: lemma.into(),
            pos_prefix: "V".into(),
            core: Vec::new(),
            extra: Vec::new(),
        }
    }

    pub fn pos(mut self, prefix: impl Into<String>) -> Self {
        self.pos_prefix = prefix.into();
        self
    }

    pub fn core(mut self, name: impl Into<String>, classes: &[&str]) -> Self {
        self.core.push(FrameElementSpec::new(name, FeType::Core, classes));
        self
    }

    pub fn extra(mut self, name: impl Into<String>, classes: &[&str]) -> Self {
        self.extra.push(FrameElementSpec::new(name, FeType::Extra, classes));
        self
    }

    pub fn build(self) -> Result<FrameDefinition, FrameError> {
        FrameDefinition::new(self.name, self.lemma, self.pos_prefix, self.core, self.extra)
    }
}

/// The `competition` frame, triggered by "play".
pub fn frame_competition() -> Result<FrameDefinition, FrameError> {
    FrameBuilder::new("competition", "play")
        .core("Participant_1", &["Person", "Organisation"])
        .core("Participant_2", &["Person", "Organisation"])
        .core("Competition", &["Competition"])
        .extra("Place", &["Place"])
        .extra("Time", &[])
        .build()
}
