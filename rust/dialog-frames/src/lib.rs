//! # Dialog Frames — Rule-Based Frame Semantic Role Labeling
//!
//! Labels entity-linked sentences with semantic frames. Given a sentence
//! whose tokens are POS-tagged and whose named entities are linked to an
//! ontology, the labeler picks the frame its verb triggers and binds the
//! entities to that frame's elements by ontology type.
//!
//! ## Core Ideas
//!
//! - **Frames are data**: each frame is loaded once from JSON and indexed
//!   by ontology class, so matching an entity to a role is a lookup.
//! - **Assignment is greedy**: entities are resolved one at a time, Core
//!   roles before Extra ones, with an injectable random source breaking
//!   ties. A role, once bound, is never rebound.
//! - **Collaborators are seams**: tagging, numerical normalization, stop
//!   words, scoring and post-hoc rules are passed in, never global.
//!
//! ## Architecture
//!
//! ```text
//! InputSentence → Tag → Trigger lookup (FrameRepository)
//!   → Assign entities (FrameElementAssigner) + Numerical FEs
//!     → Score (ScoringPolicy) → Classification rules
//!       → LabeledSentence
//! ```
//!
//! [`batch::BatchLabeler`] runs that pipeline over many sentences on a pool
//! of worker threads.

pub mod assign;
pub mod batch;
pub mod cli;
pub mod entity;
pub mod error;
pub mod frame;
pub mod label;
pub mod numerical;
pub mod repository;
pub mod rules;
pub mod score;
pub mod sentence;
pub mod stopwords;
pub mod token;

pub use assign::{AssignedFrameElement, Assignment, FrameElementAssigner};
pub use batch::{BatchConfig, BatchItem, BatchLabeler, BatchReport, CancelToken, JsonLines};
pub use entity::{LinkedEntity, NumericalElement};
pub use error::{FrameError, LabelError};
pub use frame::{FeType, FrameDefinition, FrameElementSpec};
pub use label::{LabelOptions, SentenceLabeler};
pub use repository::FrameRepository;
pub use score::ScoreType;
pub use sentence::{FrameElement, InputSentence, LabeledSentence};
