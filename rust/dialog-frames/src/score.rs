//! Confidence scoring for finished labelings.
//!
//! A score summarizes how well a labeling fills its frame. Two base
//! policies exist, and both weight Core frame elements by `core_weight`
//! relative to Extra ones (which always weigh 1):
//!
//! 1. **Coverage**: the weighted fraction of the frame's declared FEs that
//!    were filled.
//! 2. **Confidence**: the weighted mean of the filled FEs' confidences.
//!
//! `Both` multiplies the two. Every policy is a pure function of the FE set
//! and the frame it was labeled against, and yields a value in `[0, 1]`.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::frame::{FeType, FrameDefinition};
use crate::sentence::FrameElement;

/// A confidence score in the range [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Confidence(pub f64);

impl Confidence {
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Confidence(0.0);
        }
        Confidence(value.clamp(0.0, 1.0))
    }
}

/// Which scoring policy to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ScoreType {
    Coverage,
    Confidence,
    Both,
}

impl ScoreType {
    pub fn policy(&self) -> &'static dyn ScoringPolicy {
        match self {
            ScoreType::Coverage => &CoveragePolicy,
            ScoreType::Confidence => &ConfidencePolicy,
            ScoreType::Both => &CombinedPolicy,
        }
    }
}

impl fmt::Display for ScoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreType::Coverage => write!(f, "coverage"),
            ScoreType::Confidence => write!(f, "confidence"),
            ScoreType::Both => write!(f, "both"),
        }
    }
}

/// Computes a confidence score for a labeling.
pub trait ScoringPolicy: Send + Sync {
    fn score(&self, elements: &[FrameElement], frame: &FrameDefinition, core_weight: f64) -> Confidence;
}

fn weight(fe_type: FeType, core_weight: f64) -> f64 {
    match fe_type {
        FeType::Core => core_weight,
        FeType::Extra => 1.0,
    }
}

/// Weighted fraction of the frame's declared FEs that are filled.
/// FEs the frame doesn't declare (e.g. numerical tags) don't count.
pub struct CoveragePolicy;

impl ScoringPolicy for CoveragePolicy {
    fn score(&self, elements: &[FrameElement], frame: &FrameDefinition, core_weight: f64) -> Confidence {
        let filled: HashSet<&str> = elements.iter().map(|fe| fe.fe.as_str()).collect();

        let (mut achieved, mut possible) = (0.0, 0.0);
        for spec in frame.elements() {
            let w = weight(spec.fe_type, core_weight);
            possible += w;
            if filled.contains(spec.name.as_str()) {
                achieved += w;
            }
        }

        if possible <= 0.0 {
            return Confidence(0.0);
        }
        Confidence::new(achieved / possible)
    }
}

/// Weighted mean of the filled FEs' confidences.
pub struct ConfidencePolicy;

impl ScoringPolicy for ConfidencePolicy {
    fn score(&self, elements: &[FrameElement], _frame: &FrameDefinition, core_weight: f64) -> Confidence {
        let (mut total, mut weights) = (0.0, 0.0);
        for fe in elements {
            let w = weight(fe.fe_type, core_weight);
            total += w * fe.score;
            weights += w;
        }

        if weights <= 0.0 {
            return Confidence(0.0);
        }
        Confidence::new(total / weights)
    }
}

/// Coverage × confidence.
pub struct CombinedPolicy;

impl ScoringPolicy for CombinedPolicy {
    fn score(&self, elements: &[FrameElement], frame: &FrameDefinition, core_weight: f64) -> Confidence {
        let coverage = CoveragePolicy.score(elements, frame, core_weight);
        let confidence = ConfidencePolicy.score(elements, frame, core_weight);
        Confidence::new(coverage.0 * confidence.0)
    }
}
