//! Error types for frame loading and sentence labeling.

use thiserror::Error;

/// Failures while loading frame definitions. Any of these is fatal: a
/// repository is never handed out partially loaded.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("failed to read frame data: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed frame data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("frame triggered by '{lemma}' has an empty name")]
    EmptyFrameName { lemma: String },

    #[error("frame '{frame}' declares a frame element with an empty name")]
    EmptyElementName { frame: String },

    #[error("frame '{frame}' declares frame element '{element}' more than once")]
    DuplicateElement { frame: String, element: String },

    #[error("frame '{frame}' lists {declared} element '{element}' among its {listed} elements")]
    MisplacedElement {
        frame: String,
        element: String,
        declared: String,
        listed: String,
    },
}

/// Failures while labeling a single sentence.
#[derive(Debug, Error)]
pub enum LabelError {
    #[error("tagger failed: {0}")]
    Tagger(String),

    #[error("numerical normalizer failed: {0}")]
    Normalizer(String),

    #[error("malformed sentence record: {0}")]
    Record(String),

    #[error("collaborator panicked: {0}")]
    Collaborator(String),

    #[error("labeling invariant violated: {0}")]
    Invariant(String),
}

impl LabelError {
    /// Whether this error should halt a whole batch rather than just the
    /// sentence that raised it.
    pub fn is_fatal(&self) -> bool {
        matches!(self, LabelError::Invariant(_))
    }
}

impl From<serde_json::Error> for LabelError {
    fn from(error: serde_json::Error) -> Self {
        LabelError::Record(error.to_string())
    }
}
