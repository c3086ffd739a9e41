//! Greedy assignment of linked entities to a frame's elements.
//!
//! The assigner walks the sentence's linked entities once and binds each to
//! at most one frame element whose ontology class matches one of the
//! entity's types. There is no backtracking: the result depends on the
//! iteration order, which is fixed as follows.
//!
//! 1. Stop-word chunks and untyped entities are dropped.
//! 2. Entities are stably sorted by number of types, most types first.
//! 3. For each entity, its types are tried in source order. The first type
//!    whose class has a free FE in the frame wins: a free Core FE of that
//!    class if there is one, otherwise any free FE of that class, chosen
//!    uniformly at random among the candidates.
//!
//! An FE, once bound, stays bound: later entities can't overwrite it. A
//! chunk, once claimed, can't be claimed again by a second FE.

use std::collections::{BTreeMap, HashSet};

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::entity::{LinkedEntity, local_name};
use crate::frame::{FeType, FrameDefinition};
use crate::stopwords::StopWords;

/// One entity bound to one frame element.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignedFrameElement {
    pub fe_name: String,
    pub fe_type: FeType,
    /// Class local name of the type that matched, e.g. `Person`.
    pub entity_ontology_type: String,
    pub chunk: String,
    pub entity_uri: String,
    pub confidence_score: f64,
}

/// The outcome of one assignment pass, keyed by FE name.
pub type Assignment = BTreeMap<String, AssignedFrameElement>;

/// Binds linked entities to frame elements by ontology type.
#[derive(Debug, Clone, Default)]
pub struct FrameElementAssigner {
    stopwords: StopWords,
}

impl FrameElementAssigner {
    pub fn new(stopwords: StopWords) -> Self {
        FrameElementAssigner { stopwords }
    }

    /// Assign entities to the frame's elements, breaking ties with `rng`.
    pub fn assign<R: Rng + ?Sized>(
        &self,
        entities: &[LinkedEntity],
        frame: &FrameDefinition,
        rng: &mut R,
    ) -> Assignment {
        let mut assignment = Assignment::new();

        if frame.is_inert() {
            debug!(frame = frame.name(), "frame maps no ontology classes, nothing to assign");
            return assignment;
        }

        let mut candidates: Vec<&LinkedEntity> = entities
            .iter()
            .filter(|entity| {
                if self.stopwords.contains(&entity.chunk) {
                    debug!(chunk = %entity.chunk, "skipping stop word");
                    return false;
                }
                !entity.types.is_empty()
            })
            .collect();
        candidates.sort_by(|a, b| b.types.len().cmp(&a.types.len()));

        let mut claimed_chunks: HashSet<&str> = HashSet::new();

        for entity in candidates {
            if claimed_chunks.contains(entity.chunk.as_str()) {
                debug!(chunk = %entity.chunk, "chunk already bound, skipping");
                continue;
            }

            match self.bind(entity, frame, &assignment, rng) {
                Some(bound) => {
                    claimed_chunks.insert(entity.chunk.as_str());
                    assignment.insert(bound.fe_name.clone(), bound);
                }
                None => {
                    debug!(chunk = %entity.chunk, frame = frame.name(), "entity left unassigned");
                }
            }
        }

        assignment
    }

    /// Find a free frame element for one entity, trying its types in order.
    fn bind<R: Rng + ?Sized>(
        &self,
        entity: &LinkedEntity,
        frame: &FrameDefinition,
        assignment: &Assignment,
        rng: &mut R,
    ) -> Option<AssignedFrameElement> {
        for type_uri in &entity.types {
            let class = local_name(type_uri);
            if !frame.has_class(class) {
                continue;
            }

            let free: Vec<_> = frame
                .elements_of_class(class)
                .filter(|spec| !assignment.contains_key(&spec.name))
                .collect();

            let core: Vec<_> = free.iter().copied().filter(|spec| spec.is_core()).collect();
            let available = if core.is_empty() { free } else { core };

            let Some(spec) = available.choose(rng) else {
                continue;
            };

            return Some(AssignedFrameElement {
                fe_name: spec.name.clone(),
                fe_type: spec.fe_type,
                entity_ontology_type: class.to_string(),
                chunk: entity.chunk.clone(),
                entity_uri: entity.uri.clone(),
                confidence_score: entity.confidence,
            });
        }

        None
    }
}
