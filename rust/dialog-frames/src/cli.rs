use std::path::PathBuf;

use clap::Parser;

use crate::batch::BatchConfig;
use crate::label::LabelOptions;
use crate::score::ScoreType;

#[derive(Debug, Parser)]
#[command(name = "label")]
#[command(bin_name = "label")]
#[command(about = "Label entity-linked sentences with semantic frames", long_about = None)]
pub struct LabelCli {
    /// Sentences to label, one JSON object per line.
    pub sentences: PathBuf,

    /// Frame definitions keyed by trigger lemma.
    pub frames: PathBuf,

    /// Language code used for stop words and numerical normalization.
    #[arg(short, long, default_value = "en")]
    pub language: String,

    /// Where to write labeled sentences; stdout when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of worker threads.
    #[arg(short, long, default_value_t = 1)]
    pub workers: usize,

    /// Capacity of the job and result queues.
    #[arg(long, default_value_t = 64)]
    pub queue_depth: usize,

    /// Attach a confidence score computed with this policy.
    #[arg(short, long, value_enum)]
    pub score_type: Option<ScoreType>,

    /// Weight of Core frame elements relative to Extra ones when scoring.
    #[arg(long, default_value_t = 2.0)]
    pub core_weight: f64,

    /// Extract and merge numerical and temporal frame elements.
    #[arg(short, long)]
    pub normalize_numerical: bool,

    /// Apply the standard classification rules to every labeling.
    #[arg(long)]
    pub rules: bool,

    /// Seed for reproducible tie-breaking.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop-word list replacing the built-in one, one word per line.
    #[arg(long)]
    pub stopwords: Option<PathBuf>,

    /// Tagger lexicon for sentences without pre-computed tagging.
    #[arg(long)]
    pub lexicon: Option<PathBuf>,
}

impl LabelCli {
    pub fn label_options(&self) -> LabelOptions {
        LabelOptions {
            normalize_numerical: self.normalize_numerical,
            score_type: self.score_type,
            core_weight: self.core_weight,
        }
    }

    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig {
            workers: self.workers.max(1),
            queue_depth: self.queue_depth,
            seed: self.seed,
        }
    }
}
