//! The frame repository: every known frame, keyed by trigger lemma.
//!
//! Built once at startup and read-only afterwards, so it can be shared by
//! reference across labeling workers without locking. Each
//! [`FrameDefinition`] computes its ontology index when it is constructed;
//! nothing downstream recomputes it.

use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::error::FrameError;
use crate::frame::{FrameDefinition, RawFrame};

#[derive(Debug, Clone, Default)]
pub struct FrameRepository {
    frames: HashMap<String, FrameDefinition>,
}

impl FrameRepository {
    /// Index frames by their trigger lemma. A later frame with the same
    /// lemma replaces an earlier one.
    pub fn new(frames: impl IntoIterator<Item = FrameDefinition>) -> Self {
        let frames = frames
            .into_iter()
            .map(|frame| {
                if frame.is_inert() {
                    debug!(frame = frame.name(), lemma = frame.lemma(), "frame has no ontology-typed elements");
                }
                (frame.lemma().to_string(), frame)
            })
            .collect();
        FrameRepository { frames }
    }

    /// Parse and validate frame data. Fails on the first invalid frame.
    pub fn from_json(json: &str) -> Result<Self, FrameError> {
        let raw: BTreeMap<String, RawFrame> = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, FrameError> {
        let raw: BTreeMap<String, RawFrame> = serde_json::from_reader(reader)?;
        Self::from_raw(raw)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FrameError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    fn from_raw(raw: BTreeMap<String, RawFrame>) -> Result<Self, FrameError> {
        let frames = raw
            .into_iter()
            .map(|(lemma, frame)| frame.into_definition(lemma))
            .collect::<Result<Vec<_>, _>>()?;

        let repository = Self::new(frames);
        info!(
            frames = repository.len(),
            inert = repository.frames().filter(|frame| frame.is_inert()).count(),
            "loaded frame repository"
        );
        Ok(repository)
    }

    /// The frame triggered by a lemma, if any.
    pub fn lookup(&self, lemma: &str) -> Option<&FrameDefinition> {
        self.frames.get(lemma)
    }

    pub fn frames(&self) -> impl Iterator<Item = &FrameDefinition> {
        self.frames.values()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAMES: &str = r#"{
        "play": {
            "frame": "competition",
            "pos": "V",
            "core_fes": [
                {"fe": "Participant_1", "type": "Core", "dbpedia_classes": ["Person", "Organisation"]},
                {"fe": "Participant_2", "type": "Core", "dbpedia_classes": ["Person", "Organisation"]},
                {"fe": "Competition", "type": "Core", "dbpedia_classes": ["Competition"]}
            ],
            "extra_fes": [
                {"fe": "Place", "type": "Extra", "dbpedia_classes": ["Place"], "semantic_type": "Location"}
            ]
        },
        "rest": {
            "frame": "idle",
            "pos": "V",
            "core_fes": [{"fe": "Agent", "type": "Core"}]
        }
    }"#;

    #[test]
    fn loads_and_indexes_frames() {
        let repository = FrameRepository::from_json(FRAMES).unwrap();
        assert_eq!(repository.len(), 2);

        let competition = repository.lookup("play").unwrap();
        assert_eq!(competition.name(), "competition");
        assert_eq!(competition.lemma(), "play");
        assert_eq!(competition.elements_of_class("Person").count(), 2);
        assert_eq!(
            competition.element("Place").unwrap().semantic_type.as_deref(),
            Some("Location")
        );

        assert!(repository.lookup("rest").unwrap().is_inert());
        assert!(repository.lookup("sleep").is_none());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            FrameRepository::from_json("{\"play\": {\"frame\": 1}}"),
            Err(FrameError::Json(_))
        ));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(matches!(
            FrameRepository::from_path("/nonexistent/frames.json"),
            Err(FrameError::Io(_))
        ));
    }
}
