//! Batch labeling over a pool of worker threads.
//!
//! A dispatcher thread feeds `(index, item)` jobs into a bounded queue,
//! workers pull from it and label one sentence at a time, and the calling
//! thread collects outcomes from a bounded result queue and hands labeled
//! sentences to a sink. With a single worker the batch runs inline on the
//! calling thread with no queues at all.
//!
//! A failure on one record is logged and counted; it never stops the
//! batch, and neither does a panicking collaborator. The one exception is
//! an invariant violation, which cancels the batch and is returned once
//! in-flight work has drained.

use std::any::Any;
use std::io::{self, BufRead};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::sync_channel;
use std::thread;

use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use crate::error::LabelError;
use crate::label::SentenceLabeler;
use crate::sentence::{InputSentence, LabeledSentence};

/// Worker pool settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    /// Number of worker threads; 1 runs inline.
    pub workers: usize,
    /// Capacity of the job and result queues.
    pub queue_depth: usize,
    /// When set, item `i` is labeled with a generator seeded by `seed + i`.
    pub seed: Option<u64>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            workers: 1,
            queue_depth: 64,
            seed: None,
        }
    }
}

/// Shared stop flag. Once tripped, no new work is dispatched or picked up;
/// work already in flight finishes.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Aggregate counts for a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Items whose labeling ran to an outcome.
    pub processed: usize,
    pub labeled: usize,
    /// Items that were malformed or yielded no frame elements.
    pub skipped: usize,
    /// Items whose labeling raised an error.
    pub failed: usize,
}

/// A unit of batch input: an already parsed sentence, or a line of JSON
/// parsed on the worker.
#[derive(Debug, Clone)]
pub enum BatchItem {
    Sentence(InputSentence),
    /// A raw JSON line and its 1-based line number in the source.
    Line { number: usize, text: String },
    /// A line that could not be read, e.g. one that isn't valid UTF-8.
    Unreadable { number: usize, reason: String },
}

impl BatchItem {
    /// The 1-based record number used in logs: the source line number for
    /// lines, the position in the batch otherwise.
    fn record(&self, index: usize) -> usize {
        match self {
            BatchItem::Sentence(_) => index + 1,
            BatchItem::Line { number, .. } | BatchItem::Unreadable { number, .. } => *number,
        }
    }
}

impl From<InputSentence> for BatchItem {
    fn from(sentence: InputSentence) -> Self {
        BatchItem::Sentence(sentence)
    }
}

/// Numbered JSON lines read from a byte stream.
///
/// Blank lines are skipped but still counted, so numbers match the source.
/// A line that isn't UTF-8 becomes a [`BatchItem::Unreadable`] item and
/// reading carries on; an I/O error does the same but ends the stream.
pub struct JsonLines<R> {
    reader: R,
    number: usize,
    finished: bool,
}

impl<R: BufRead> JsonLines<R> {
    pub fn new(reader: R) -> Self {
        JsonLines {
            reader,
            number: 0,
            finished: false,
        }
    }
}

impl<R: BufRead> Iterator for JsonLines<R> {
    type Item = BatchItem;

    fn next(&mut self) -> Option<BatchItem> {
        while !self.finished {
            let mut buffer = Vec::new();
            match self.reader.read_until(b'\n', &mut buffer) {
                Ok(0) => self.finished = true,
                Ok(_) => {
                    self.number += 1;
                    match String::from_utf8(buffer) {
                        Ok(text) if text.trim().is_empty() => continue,
                        Ok(text) => {
                            return Some(BatchItem::Line {
                                number: self.number,
                                text,
                            });
                        }
                        Err(error) => {
                            return Some(BatchItem::Unreadable {
                                number: self.number,
                                reason: error.to_string(),
                            });
                        }
                    }
                }
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => {
                    self.finished = true;
                    self.number += 1;
                    return Some(BatchItem::Unreadable {
                        number: self.number,
                        reason: error.to_string(),
                    });
                }
            }
        }
        None
    }
}

type Outcome = Result<Option<LabeledSentence>, LabelError>;

/// Fans [`SentenceLabeler::label`] out over a worker pool.
pub struct BatchLabeler<'a> {
    labeler: &'a SentenceLabeler,
    config: BatchConfig,
    cancel: CancelToken,
}

impl<'a> BatchLabeler<'a> {
    pub fn new(labeler: &'a SentenceLabeler, config: BatchConfig) -> Self {
        BatchLabeler {
            labeler,
            config,
            cancel: CancelToken::new(),
        }
    }

    /// Share a cancel token with the caller, e.g. a signal handler.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Label every item and collect the results. Order is only preserved
    /// with a single worker.
    pub fn label_many<I, T>(&self, items: I) -> Result<(Vec<LabeledSentence>, BatchReport), LabelError>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send,
        T: Into<BatchItem> + Send,
    {
        let mut labeled = Vec::new();
        let report = self.run(items, |sentence| labeled.push(sentence))?;
        Ok((labeled, report))
    }

    /// Label every item, handing each labeled sentence to `sink` on the
    /// calling thread.
    pub fn run<I, T, F>(&self, items: I, mut sink: F) -> Result<BatchReport, LabelError>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send,
        T: Into<BatchItem> + Send,
        F: FnMut(LabeledSentence),
    {
        let mut report = BatchReport::default();
        let mut fatal = None;

        let mut collect = |record: usize, outcome: Outcome| match outcome {
            Ok(Some(sentence)) => {
                report.processed += 1;
                report.labeled += 1;
                sink(sentence);
            }
            Ok(None) => {
                report.processed += 1;
                report.skipped += 1;
            }
            Err(error) if error.is_fatal() => {
                self.cancel.cancel();
                if fatal.is_none() {
                    fatal = Some(error);
                }
            }
            Err(error) => {
                warn!(record, %error, "failed to label record");
                report.processed += 1;
                report.failed += 1;
            }
        };

        if self.config.workers <= 1 {
            for (index, item) in items.into_iter().enumerate() {
                if self.cancel.is_cancelled() {
                    break;
                }
                let item: BatchItem = item.into();
                let record = item.record(index);
                collect(record, self.label_one(index, item));
            }
        } else {
            self.run_pool(items, &mut collect);
        }

        if let Some(error) = fatal {
            return Err(error);
        }

        info!(
            processed = report.processed,
            labeled = report.labeled,
            skipped = report.skipped,
            failed = report.failed,
            "batch finished"
        );
        Ok(report)
    }

    fn run_pool<I, T>(&self, items: I, collect: &mut dyn FnMut(usize, Outcome))
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send,
        T: Into<BatchItem> + Send,
    {
        let depth = self.config.queue_depth.max(1);
        let (job_tx, job_rx) = sync_channel::<(usize, T)>(depth);
        let (result_tx, result_rx) = sync_channel::<(usize, Outcome)>(depth);
        let job_rx = Arc::new(Mutex::new(job_rx));
        let items = items.into_iter();

        thread::scope(|scope| {
            let cancel = &self.cancel;

            scope.spawn(move || {
                for job in items.enumerate() {
                    if cancel.is_cancelled() || job_tx.send(job).is_err() {
                        break;
                    }
                }
            });

            for _ in 0..self.config.workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();

                scope.spawn(move || {
                    loop {
                        if cancel.is_cancelled() {
                            break;
                        }
                        let job = job_rx.lock().recv();
                        let Ok((index, item)) = job else {
                            break;
                        };
                        let item: BatchItem = item.into();
                        let record = item.record(index);
                        let outcome = self.label_one(index, item);
                        if result_tx.send((record, outcome)).is_err() {
                            break;
                        }
                    }
                });
            }

            drop(job_rx);
            drop(result_tx);

            for (record, outcome) in result_rx {
                collect(record, outcome);
            }
        });
    }

    /// Label one item. A panic inside a collaborator is caught and reported
    /// as a per-record failure.
    fn label_one(&self, index: usize, item: BatchItem) -> Outcome {
        let sentence = match item {
            BatchItem::Sentence(sentence) => sentence,
            BatchItem::Line { text, .. } => serde_json::from_str(&text)?,
            BatchItem::Unreadable { reason, .. } => return Err(LabelError::Record(reason)),
        };

        let mut rng = match self.config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed.wrapping_add(index as u64)),
            None => ChaCha8Rng::from_entropy(),
        };

        panic::catch_unwind(AssertUnwindSafe(|| {
            self.labeler.label_with_rng(&sentence, &mut rng)
        }))
        .unwrap_or_else(|payload| Err(LabelError::Collaborator(panic_message(&*payload))))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return message.to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "panic with a non-string payload".to_string()
}
