//! Sentence records: what the labeler reads and what it emits.
//!
//! Both travel as one JSON object per line. Input:
//!
//! ```json
//! {"text": "Jo played Leslie at tennis.", "url": "http://...", "name": "Jo",
//!  "linked_entities": [{"chunk": "Jo", "start": 0, "end": 2, "uri": "...",
//!                       "confidence": 1.0, "types": ["http://dbpedia.org/ontology/Person"]}],
//!  "tagged": [["Jo", "NP", "Jo"], ["played", "VVD", "play"]]}
//! ```
//!
//! Output carries the input's identifying fields plus the frame, its
//! lexical unit and the bound frame elements:
//!
//! ```json
//! {"name": "Jo", "url": "...", "text": "...", "linked_entities": [...],
//!  "frame": "competition", "lu": "play",
//!  "fes": [{"fe": "Competition", "fe_type": "Core", "entity_type": "Competition",
//!           "chunk": "tennis", "uri": "...", "score": 1.0}],
//!  "score": 0.8}
//! ```

use serde::{Deserialize, Serialize};

use crate::assign::AssignedFrameElement;
use crate::entity::{LinkedEntity, NumericalElement};
use crate::frame::FeType;
use crate::token::TaggedToken;

/// A sentence awaiting labeling.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InputSentence {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub linked_entities: Vec<LinkedEntity>,
    /// Pre-computed tagging; when absent the labeler tags `text` itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagged: Option<Vec<TaggedToken>>,
}

impl InputSentence {
    pub fn new(text: impl Into<String>, url: impl Into<String>) -> Self {
        InputSentence {
            text: text.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn entity(mut self, entity: LinkedEntity) -> Self {
        self.linked_entities.push(entity);
        self
    }

    pub fn tagged(mut self, tokens: Vec<TaggedToken>) -> Self {
        self.tagged = Some(tokens);
        self
    }

    /// A sentence is malformed when it has no source URL or no text.
    pub fn is_well_formed(&self) -> bool {
        !self.url.trim().is_empty() && !self.text.trim().is_empty()
    }
}

/// One frame element of a labeled sentence, as written to the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameElement {
    pub fe: String,
    pub fe_type: FeType,
    /// Ontology class of the filler, or the numerical tag for literals.
    pub entity_type: String,
    pub chunk: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Normalized value of a numerical element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal: Option<String>,
    pub score: f64,
}

impl From<AssignedFrameElement> for FrameElement {
    fn from(assigned: AssignedFrameElement) -> Self {
        FrameElement {
            fe: assigned.fe_name,
            fe_type: assigned.fe_type,
            entity_type: assigned.entity_ontology_type,
            chunk: assigned.chunk,
            uri: Some(assigned.entity_uri),
            literal: None,
            score: assigned.confidence_score,
        }
    }
}

impl From<NumericalElement> for FrameElement {
    fn from(numerical: NumericalElement) -> Self {
        FrameElement {
            fe: numerical.tag.clone(),
            fe_type: FeType::Extra,
            entity_type: numerical.tag,
            chunk: numerical.chunk,
            uri: None,
            literal: Some(numerical.value),
            score: numerical.confidence,
        }
    }
}

/// A sentence with its frame and bound frame elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledSentence {
    pub name: String,
    pub url: String,
    pub text: String,
    pub linked_entities: Vec<LinkedEntity>,
    pub frame: String,
    /// The lexical unit (lemma) that triggered the frame.
    pub lu: String,
    pub fes: Vec<FrameElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl LabeledSentence {
    pub fn element(&self, fe: &str) -> Option<&FrameElement> {
        self.fes.iter().find(|element| element.fe == fe)
    }

    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn labeled() -> LabeledSentence {
        LabeledSentence {
            name: "Jo".into(),
            url: "http://example.org/jo".into(),
            text: "Jo played tennis in 1990.".into(),
            linked_entities: vec![],
            frame: "competition".into(),
            lu: "play".into(),
            fes: vec![
                FrameElement::from(NumericalElement::new("Time", "1990", "1990", 1.0)),
                FrameElement {
                    fe: "Competition".into(),
                    fe_type: FeType::Core,
                    entity_type: "Competition".into(),
                    chunk: "tennis".into(),
                    uri: Some("http://dbpedia.org/resource/Tennis".into()),
                    literal: None,
                    score: 1.0,
                },
            ],
            score: Some(0.5),
        }
    }

    #[test]
    fn labeled_sentence_survives_the_wire() {
        let sentence = labeled();
        let line = sentence.to_json_line().unwrap();
        let mut back: LabeledSentence = serde_json::from_str(&line).unwrap();

        let mut expected = sentence.fes.clone();
        expected.sort_by(|a, b| a.fe.cmp(&b.fe));
        back.fes.sort_by(|a, b| a.fe.cmp(&b.fe));
        assert_eq!(back.fes, expected);
    }

    #[test]
    fn wire_shape_uses_documented_keys() {
        let value = serde_json::to_value(labeled()).unwrap();
        assert_eq!(value["frame"], "competition");
        assert_eq!(value["lu"], "play");
        assert_eq!(value["fes"][1]["fe_type"], "Core");
        assert_eq!(value["fes"][1]["entity_type"], "Competition");
        assert_eq!(value["fes"][0]["literal"], "1990");
        assert!(value["fes"][0].get("uri").is_none());
    }

    #[test]
    fn missing_url_parses_but_is_malformed() {
        let sentence: InputSentence = serde_json::from_str(r#"{"text": "Jo played."}"#).unwrap();
        assert!(!sentence.is_well_formed());
        assert!(!InputSentence::new("   ", "http://x").is_well_formed());
    }
}
