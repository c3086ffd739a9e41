//! Post-hoc classification rules.
//!
//! Rules run on a finished labeling and may add frame elements the greedy
//! assigner couldn't, for semantic categories that hold regardless of
//! frame. The standard rule set deduces a `Place` element from any linked
//! entity of ontology class `Place` whose chunk no element claims yet.
//!
//! With `overwrite = false` a rule never touches an element that already
//! exists, which makes applying a rule set twice the same as applying it
//! once.

use tracing::debug;

use crate::frame::FeType;
use crate::sentence::{FrameElement, LabeledSentence};

pub trait ClassificationRule: Send + Sync {
    /// Apply the rule, returning whether the sentence changed.
    fn apply(&self, sentence: &mut LabeledSentence, overwrite: bool) -> bool;
}

/// Bind the first unclaimed linked entity of `ontology_class` to an Extra
/// element named `fe_name`.
#[derive(Debug, Clone)]
pub struct TypedElementRule {
    pub fe_name: String,
    pub ontology_class: String,
}

impl TypedElementRule {
    pub fn new(fe_name: impl Into<String>, ontology_class: impl Into<String>) -> Self {
        TypedElementRule {
            fe_name: fe_name.into(),
            ontology_class: ontology_class.into(),
        }
    }
}

impl ClassificationRule for TypedElementRule {
    fn apply(&self, sentence: &mut LabeledSentence, overwrite: bool) -> bool {
        let existing = sentence.fes.iter().position(|fe| fe.fe == self.fe_name);
        if existing.is_some() && !overwrite {
            return false;
        }

        let claimed = |chunk: &str| {
            sentence
                .fes
                .iter()
                .enumerate()
                .any(|(index, fe)| Some(index) != existing && fe.chunk == chunk)
        };

        let Some(entity) = sentence
            .linked_entities
            .iter()
            .find(|entity| entity.has_class(&self.ontology_class) && !claimed(&entity.chunk))
        else {
            return false;
        };

        let element = FrameElement {
            fe: self.fe_name.clone(),
            fe_type: FeType::Extra,
            entity_type: self.ontology_class.clone(),
            chunk: entity.chunk.clone(),
            uri: Some(entity.uri.clone()),
            literal: None,
            score: entity.confidence,
        };

        debug!(fe = %self.fe_name, chunk = %element.chunk, "classification rule bound element");
        match existing {
            Some(index) => sentence.fes[index] = element,
            None => sentence.fes.push(element),
        }
        true
    }
}

/// An ordered set of rules applied one after another.
#[derive(Default)]
pub struct CustomRules {
    rules: Vec<Box<dyn ClassificationRule>>,
}

impl CustomRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in rules: `Place` from any unclaimed `Place` entity.
    pub fn standard() -> Self {
        CustomRules::new().with(TypedElementRule::new("Place", "Place"))
    }

    pub fn with(mut self, rule: impl ClassificationRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Apply every rule in order and return how many changed the sentence.
    pub fn apply(&self, sentence: &mut LabeledSentence, overwrite: bool) -> usize {
        self.rules
            .iter()
            .filter(|rule| rule.apply(sentence, overwrite))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{LinkedEntity, dbpedia_type};
    use pretty_assertions::assert_eq;

    fn sentence() -> LabeledSentence {
        LabeledSentence {
            name: "Jo".into(),
            url: "http://example.org/jo".into(),
            text: "Jo played Leslie at tennis in Rome.".into(),
            linked_entities: vec![
                LinkedEntity::new("Jo", "http://dbpedia.org/resource/Jo", 1.0)
                    .with_type(dbpedia_type("Person")),
                LinkedEntity::new("Rome", "http://dbpedia.org/resource/Rome", 0.8)
                    .with_type(dbpedia_type("Place")),
            ],
            frame: "competition".into(),
            lu: "play".into(),
            fes: vec![FrameElement {
                fe: "Participant_1".into(),
                fe_type: FeType::Core,
                entity_type: "Person".into(),
                chunk: "Jo".into(),
                uri: Some("http://dbpedia.org/resource/Jo".into()),
                literal: None,
                score: 1.0,
            }],
            score: None,
        }
    }

    #[test]
    fn place_rule_adds_unclaimed_place() {
        let mut labeled = sentence();
        assert_eq!(CustomRules::standard().apply(&mut labeled, false), 1);

        let place = labeled.element("Place").unwrap();
        assert_eq!(place.chunk, "Rome");
        assert_eq!(place.fe_type, FeType::Extra);
        assert_eq!(place.score, 0.8);
    }

    #[test]
    fn applying_twice_without_overwrite_is_idempotent() {
        let rules = CustomRules::standard();
        let mut once = sentence();
        rules.apply(&mut once, false);

        let mut twice = once.clone();
        assert_eq!(rules.apply(&mut twice, false), 0);
        assert_eq!(twice, once);
    }

    #[test]
    fn claimed_chunks_are_left_alone() {
        let mut labeled = sentence();
        labeled.fes[0].chunk = "Rome".into();
        assert_eq!(CustomRules::standard().apply(&mut labeled, false), 0);
        assert!(labeled.element("Place").is_none());
    }

    #[test]
    fn overwrite_replaces_existing_element() {
        let mut labeled = sentence();
        labeled.fes.push(FrameElement {
            fe: "Place".into(),
            fe_type: FeType::Extra,
            entity_type: "Place".into(),
            chunk: "court".into(),
            uri: None,
            literal: None,
            score: 0.1,
        });

        assert_eq!(CustomRules::standard().apply(&mut labeled.clone(), false), 0);
        assert_eq!(CustomRules::standard().apply(&mut labeled, true), 1);
        assert_eq!(labeled.element("Place").unwrap().chunk, "Rome");
        assert_eq!(labeled.fes.len(), 2);
    }
}
