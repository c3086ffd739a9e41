use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use dialog_frames::batch::{BatchLabeler, CancelToken, JsonLines};
use dialog_frames::cli::LabelCli;
use dialog_frames::numerical::PatternNormalizer;
use dialog_frames::repository::FrameRepository;
use dialog_frames::rules::CustomRules;
use dialog_frames::stopwords::StopWords;
use dialog_frames::token::LexiconTagger;
use dialog_frames::{BatchReport, SentenceLabeler};

#[tokio::main]
pub async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = LabelCli::parse();

    let repository = FrameRepository::from_path(&cli.frames)
        .with_context(|| format!("loading frame data from {}", cli.frames.display()))?;

    let stopwords = match &cli.stopwords {
        Some(path) => StopWords::from_path(path)
            .with_context(|| format!("loading stop words from {}", path.display()))?,
        None => StopWords::for_language(&cli.language),
    };

    let tagger = match &cli.lexicon {
        Some(path) => LexiconTagger::from_path(path)
            .with_context(|| format!("loading lexicon from {}", path.display()))?,
        None => LexiconTagger::new(),
    };

    let normalizer = PatternNormalizer::for_language(&cli.language)
        .context("building numerical normalizer")?;

    let rules = if cli.rules {
        CustomRules::standard()
    } else {
        CustomRules::new()
    };

    let labeler = SentenceLabeler::new(repository)
        .with_stopwords(stopwords)
        .with_tagger(tagger)
        .with_normalizer(normalizer)
        .with_rules(rules)
        .with_options(cli.label_options());

    let input = File::open(&cli.sentences)
        .with_context(|| format!("opening sentences {}", cli.sentences.display()))?;

    let output: Box<dyn Write + Send> = match &cli.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("creating output {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout()),
    };

    let cancel = CancelToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, finishing in-flight sentences");
            on_interrupt.cancel();
        }
    });

    let config = cli.batch_config();
    let report = tokio::task::spawn_blocking(move || -> Result<BatchReport> {
        let lines = JsonLines::new(BufReader::new(input));

        let mut writer = BufWriter::new(output);
        let mut write_error = None;

        let batch = BatchLabeler::new(&labeler, config).with_cancel(cancel);
        let report = batch.run(lines, |sentence| {
            if write_error.is_some() {
                return;
            }
            let written = sentence
                .to_json_line()
                .map_err(anyhow::Error::from)
                .and_then(|line| writeln!(writer, "{line}").map_err(anyhow::Error::from));
            if let Err(error) = written {
                write_error = Some(error);
            }
        })?;

        if let Some(error) = write_error {
            return Err(error.context("writing labeled sentences"));
        }
        writer.flush().context("flushing output")?;
        Ok(report)
    })
    .await??;

    info!(
        processed = report.processed,
        labeled = report.labeled,
        skipped = report.skipped,
        failed = report.failed,
        "done"
    );

    Ok(())
}
