//! The sentence labeler: from an entity-linked sentence to a frame labeling.
//!
//! Labeling one sentence runs these stages in order:
//!
//! ```text
//! Validate → Tag (if not pre-tagged) → Normalize numericals
//!   → Scan tokens for a trigger lemma → Assign entities to FEs
//!     → Merge numerical FEs → Score → Classification rules
//! ```
//!
//! The first trigger whose frame yields any frame element wins; later
//! triggers in the sentence are never considered. A sentence that yields
//! nothing is not an error, it is simply not labeled.

use rand::Rng;
use tracing::debug;

use crate::assign::FrameElementAssigner;
use crate::error::LabelError;
use crate::frame::FrameDefinition;
use crate::numerical::{NoNormalizer, NumericalNormalizer};
use crate::repository::FrameRepository;
use crate::rules::CustomRules;
use crate::score::ScoreType;
use crate::sentence::{FrameElement, InputSentence, LabeledSentence};
use crate::stopwords::StopWords;
use crate::token::{LexiconTagger, TaggedToken, Tagger};

/// Per-run labeling switches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelOptions {
    /// Run the numerical normalizer and merge its elements.
    pub normalize_numerical: bool,
    /// Attach a confidence score computed with this policy.
    pub score_type: Option<ScoreType>,
    /// Weight of Core elements relative to Extra ones when scoring.
    pub core_weight: f64,
}

impl Default for LabelOptions {
    fn default() -> Self {
        LabelOptions {
            normalize_numerical: false,
            score_type: None,
            core_weight: 2.0,
        }
    }
}

/// Labels sentences against a frame repository.
///
/// All collaborators are owned by the labeler and only read during
/// labeling, so one labeler can be shared by reference across threads.
pub struct SentenceLabeler {
    repository: FrameRepository,
    assigner: FrameElementAssigner,
    tagger: Box<dyn Tagger>,
    normalizer: Box<dyn NumericalNormalizer>,
    rules: CustomRules,
    options: LabelOptions,
}

impl SentenceLabeler {
    /// A labeler with no stop words, an empty lexicon tagger, no numerical
    /// normalizer and no custom rules.
    pub fn new(repository: FrameRepository) -> Self {
        SentenceLabeler {
            repository,
            assigner: FrameElementAssigner::default(),
            tagger: Box::new(LexiconTagger::new()),
            normalizer: Box::new(NoNormalizer),
            rules: CustomRules::new(),
            options: LabelOptions::default(),
        }
    }

    pub fn with_stopwords(mut self, stopwords: StopWords) -> Self {
        self.assigner = FrameElementAssigner::new(stopwords);
        self
    }

    pub fn with_tagger(mut self, tagger: impl Tagger + 'static) -> Self {
        self.tagger = Box::new(tagger);
        self
    }

    pub fn with_normalizer(mut self, normalizer: impl NumericalNormalizer + 'static) -> Self {
        self.normalizer = Box::new(normalizer);
        self
    }

    pub fn with_rules(mut self, rules: CustomRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_options(mut self, options: LabelOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &LabelOptions {
        &self.options
    }

    pub fn repository(&self) -> &FrameRepository {
        &self.repository
    }

    /// Label a sentence, breaking assignment ties with the thread-local
    /// generator.
    pub fn label(&self, sentence: &InputSentence) -> Result<Option<LabeledSentence>, LabelError> {
        self.label_with_rng(sentence, &mut rand::thread_rng())
    }

    /// Label a sentence, breaking assignment ties with `rng`.
    ///
    /// Returns `Ok(None)` when the sentence is malformed or nothing in it
    /// fills a frame element.
    pub fn label_with_rng<R: Rng + ?Sized>(
        &self,
        sentence: &InputSentence,
        rng: &mut R,
    ) -> Result<Option<LabeledSentence>, LabelError> {
        if !sentence.is_well_formed() {
            debug!(name = %sentence.name, "skipping sentence without url or text");
            return Ok(None);
        }

        let tagged = match &sentence.tagged {
            Some(tokens) => tokens.clone(),
            None => self.tagger.tag(&sentence.text)?,
        };

        let numerical: Vec<FrameElement> = if self.options.normalize_numerical {
            self.normalizer
                .normalize(&sentence.text)?
                .into_iter()
                .map(FrameElement::from)
                .collect()
        } else {
            Vec::new()
        };

        let Some((frame, fes)) = self.find_frame(sentence, &tagged, numerical, rng) else {
            debug!(name = %sentence.name, "no trigger produced frame elements");
            return Ok(None);
        };

        let mut labeled = LabeledSentence {
            name: sentence.name.clone(),
            url: sentence.url.clone(),
            text: sentence.text.clone(),
            linked_entities: sentence.linked_entities.clone(),
            frame: frame.name().to_string(),
            lu: frame.lemma().to_string(),
            fes,
            score: None,
        };

        if let Some(score_type) = self.options.score_type {
            let score = score_type
                .policy()
                .score(&labeled.fes, frame, self.options.core_weight);
            labeled.score = Some(score.0);
        }

        self.rules.apply(&mut labeled, false);

        if labeled.fes.is_empty() || labeled.lu.trim().is_empty() {
            return Err(LabelError::Invariant(format!(
                "sentence '{}' reached output with {} frame elements and lexical unit '{}'",
                labeled.name,
                labeled.fes.len(),
                labeled.lu
            )));
        }

        Ok(Some(labeled))
    }

    /// Scan tokens for the first trigger whose frame yields elements.
    fn find_frame<R: Rng + ?Sized>(
        &self,
        sentence: &InputSentence,
        tagged: &[TaggedToken],
        numerical: Vec<FrameElement>,
        rng: &mut R,
    ) -> Option<(&FrameDefinition, Vec<FrameElement>)> {
        for token in tagged {
            let Some(frame) = self.repository.lookup(&token.lemma) else {
                continue;
            };
            if !frame.accepts_pos(&token.pos) {
                continue;
            }
            if frame.is_inert() {
                debug!(frame = frame.name(), lemma = %token.lemma, "skipping inert frame");
                continue;
            }

            let assignment = self
                .assigner
                .assign(&sentence.linked_entities, frame, rng);

            if assignment.is_empty() && numerical.is_empty() {
                debug!(frame = frame.name(), lemma = %token.lemma, "trigger yielded nothing");
                continue;
            }

            // An entity-backed element shadows a numerical one of the same name.
            let mut fes: Vec<FrameElement> = numerical
                .into_iter()
                .filter(|fe| !assignment.contains_key(&fe.fe))
                .collect();
            fes.extend(assignment.into_values().map(FrameElement::from));
            return Some((frame, fes));
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{LinkedEntity, dbpedia_type};
    use crate::frame::{FeType, FrameBuilder, frame_competition};
    use crate::numerical::PatternNormalizer;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn labeler() -> SentenceLabeler {
        let idle = FrameBuilder::new("idle", "rest").core("Agent", &[]).build().unwrap();
        SentenceLabeler::new(FrameRepository::new([frame_competition().unwrap(), idle]))
    }

    fn person(chunk: &str) -> LinkedEntity {
        LinkedEntity::new(chunk, format!("http://dbpedia.org/resource/{chunk}"), 1.0)
            .with_type(dbpedia_type("Person"))
    }

    fn tennis_match() -> InputSentence {
        InputSentence::new("Jo played Leslie at tennis.", "http://example.org/jo")
            .named("Jo")
            .entity(person("Jo"))
            .entity(person("Leslie"))
            .entity(
                LinkedEntity::new("tennis", "http://dbpedia.org/resource/Tennis", 1.0)
                    .with_type(dbpedia_type("Competition")),
            )
            .tagged(vec![
                TaggedToken::new("Jo", "NP", "Jo"),
                TaggedToken::new("played", "VVD", "play"),
                TaggedToken::new("Leslie", "NP", "Leslie"),
                TaggedToken::new("at", "IN", "at"),
                TaggedToken::new("tennis", "NN", "tennis"),
                TaggedToken::new(".", "SENT", "."),
            ])
    }

    #[test]
    fn labels_competition() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let labeled = labeler()
            .label_with_rng(&tennis_match(), &mut rng)
            .unwrap()
            .unwrap();

        assert_eq!(labeled.frame, "competition");
        assert_eq!(labeled.lu, "play");
        assert_eq!(labeled.fes.len(), 3);

        let competition = labeled.element("Competition").unwrap();
        assert_eq!(competition.chunk, "tennis");
        assert_eq!(competition.score, 1.0);
        assert_eq!(competition.fe_type, FeType::Core);
        assert!(labeled.score.is_none());
    }

    #[test]
    fn no_trigger_yields_none() {
        let mut sentence = tennis_match();
        sentence.tagged = Some(vec![TaggedToken::new("Jo", "NP", "Jo")]);
        assert!(labeler().label(&sentence).unwrap().is_none());
    }

    #[test]
    fn trigger_requires_pos_prefix() {
        let mut sentence = tennis_match();
        sentence.tagged = Some(vec![TaggedToken::new("play", "NN", "play")]);
        assert!(labeler().label(&sentence).unwrap().is_none());
    }

    #[test]
    fn trigger_without_entities_yields_none() {
        let mut sentence = tennis_match();
        sentence.linked_entities.clear();
        assert!(labeler().label(&sentence).unwrap().is_none());
    }

    #[test]
    fn malformed_sentences_are_skipped() {
        let mut sentence = tennis_match();
        sentence.url = String::new();
        assert!(labeler().label(&sentence).unwrap().is_none());

        let mut sentence = tennis_match();
        sentence.text = "  ".into();
        assert!(labeler().label(&sentence).unwrap().is_none());
    }

    #[test]
    fn inert_frame_is_skipped_for_a_later_trigger() {
        let mut sentence = tennis_match();
        sentence.tagged = Some(vec![
            TaggedToken::new("rested", "VVD", "rest"),
            TaggedToken::new("played", "VVD", "play"),
        ]);

        let labeled = labeler().label(&sentence).unwrap().unwrap();
        assert_eq!(labeled.frame, "competition");
    }

    #[test]
    fn first_productive_trigger_wins() {
        let travel = FrameBuilder::new("travel", "go").core("Traveller", &["Person"]).build().unwrap();
        let labeler = SentenceLabeler::new(FrameRepository::new([frame_competition().unwrap(), travel]));

        let mut sentence = tennis_match();
        sentence.tagged = Some(vec![
            TaggedToken::new("went", "VVD", "go"),
            TaggedToken::new("played", "VVD", "play"),
        ]);

        let labeled = labeler.label(&sentence).unwrap().unwrap();
        assert_eq!(labeled.frame, "travel");
        assert_eq!(labeled.fes.len(), 1);
    }

    #[test]
    fn numerical_elements_alone_are_enough() {
        let labeler = labeler()
            .with_normalizer(PatternNormalizer::for_language("en").unwrap())
            .with_options(LabelOptions {
                normalize_numerical: true,
                ..LabelOptions::default()
            });

        let mut sentence = tennis_match();
        sentence.text = "Jo played in 1990.".into();
        sentence.linked_entities.clear();

        let labeled = labeler.label(&sentence).unwrap().unwrap();
        assert_eq!(labeled.fes.len(), 1);
        assert_eq!(labeled.fes[0].fe, "Time");
        assert_eq!(labeled.fes[0].literal.as_deref(), Some("1990"));
    }

    #[test]
    fn assigned_elements_shadow_numerical_ones() {
        let dated = FrameBuilder::new("founding", "found")
            .core("Founder", &["Person"])
            .extra("Time", &["Year"])
            .build()
            .unwrap();
        let labeler = SentenceLabeler::new(FrameRepository::new([dated]))
            .with_normalizer(PatternNormalizer::for_language("en").unwrap())
            .with_options(LabelOptions {
                normalize_numerical: true,
                ..LabelOptions::default()
            });

        let sentence = InputSentence::new("Jo founded it in 1990.", "http://example.org/jo")
            .entity(person("Jo"))
            .entity(
                LinkedEntity::new("1990", "http://dbpedia.org/resource/1990", 0.7)
                    .with_type(dbpedia_type("Year")),
            )
            .tagged(vec![TaggedToken::new("founded", "VVD", "found")]);

        let labeled = labeler.label(&sentence).unwrap().unwrap();
        let times: Vec<_> = labeled.fes.iter().filter(|fe| fe.fe == "Time").collect();
        assert_eq!(times.len(), 1);
        assert_eq!(times[0].uri.as_deref(), Some("http://dbpedia.org/resource/1990"));
        assert!(times[0].literal.is_none());
    }

    #[test]
    fn untagged_sentences_use_the_tagger() {
        let labeler = labeler().with_tagger(LexiconTagger::new().with("played", "VVD", "play"));
        let mut sentence = tennis_match();
        sentence.tagged = None;

        let labeled = labeler.label(&sentence).unwrap().unwrap();
        assert_eq!(labeled.lu, "play");
    }

    #[test]
    fn score_is_attached_when_requested() {
        let labeler = labeler().with_options(LabelOptions {
            score_type: Some(ScoreType::Confidence),
            ..LabelOptions::default()
        });

        let labeled = labeler.label(&tennis_match()).unwrap().unwrap();
        assert_eq!(labeled.score, Some(1.0));
    }

    #[test]
    fn rules_add_elements_the_frame_lacks() {
        let travel = FrameBuilder::new("travel", "go").core("Traveller", &["Person"]).build().unwrap();
        let labeler = SentenceLabeler::new(FrameRepository::new([travel]))
            .with_rules(CustomRules::standard());

        let sentence = InputSentence::new("Jo went to Rome.", "http://example.org/jo")
            .entity(person("Jo"))
            .entity(
                LinkedEntity::new("Rome", "http://dbpedia.org/resource/Rome", 0.9)
                    .with_type(dbpedia_type("Place")),
            )
            .tagged(vec![TaggedToken::new("went", "VVD", "go")]);

        let labeled = labeler.label(&sentence).unwrap().unwrap();
        assert_eq!(labeled.element("Traveller").unwrap().chunk, "Jo");
        assert_eq!(labeled.element("Place").unwrap().chunk, "Rome");
    }
}
