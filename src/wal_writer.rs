//! Asynchronous transaction log writer.
//!
//! Mutations are enqueued onto a bounded channel and drained by a single
//! writer task, which is the only code allowed to touch the log file while
//! the process runs. The task assigns each event the next sequence number,
//! writes one line, and fsyncs before taking the next event, so durable
//! order always equals enqueue order.
//!
//! A failed write is fatal to the writer: the error is published once on the
//! one-shot error channel and the task stops. The owning process is expected
//! to observe that channel and stop accepting mutations.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, oneshot};

use crate::event::Event;
use crate::wal_reader::{LogReader, ReplayError};

#[derive(Error, Debug)]
pub enum LogWriteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct FileTransactionLog {
    path: PathBuf,
    events_tx: mpsc::Sender<Event>,
    // Both consumed by run().
    events_rx: Option<mpsc::Receiver<Event>>,
    file: Option<std::fs::File>,
    error_rx: Option<oneshot::Receiver<LogWriteError>>,
    // Written only by the writer task, after each event is durable.
    last_sequence: Arc<AtomicU64>,
}

impl FileTransactionLog {
    /// Open (or create) the log file at `path` and prepare the pending-event
    /// queue. The writer task is not started until [`run`](Self::run).
    pub fn open(path: impl AsRef<Path>, queue_capacity: usize) -> Result<Self, LogWriteError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let (events_tx, events_rx) = mpsc::channel(queue_capacity);

        Ok(Self {
            path,
            events_tx,
            events_rx: Some(events_rx),
            file: Some(file),
            error_rx: None,
            last_sequence: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Iterate the durable log from the beginning, in sequence order.
    /// Used by startup replay only; never called while the writer runs.
    pub fn read_events(&self) -> Result<LogReader, ReplayError> {
        LogReader::open(&self.path)
    }

    /// Sequence number of the most recently durably recorded event.
    pub fn last_sequence(&self) -> u64 {
        self.last_sequence.load(Ordering::SeqCst)
    }

    /// Prime the sequence counter from replay, before [`run`](Self::run).
    /// Restart must continue the existing sequence without reuse or gaps.
    pub(crate) fn set_last_sequence(&self, sequence: u64) {
        self.last_sequence.store(sequence, Ordering::SeqCst);
    }

    /// Start the single writer task. Call exactly once, after replay has
    /// primed the sequence counter; a second call is a no-op with a warning.
    pub fn run(&mut self) {
        let (Some(events_rx), Some(file)) = (self.events_rx.take(), self.file.take()) else {
            tracing::warn!("transaction log writer already started");
            return;
        };

        let (error_tx, error_rx) = oneshot::channel();
        self.error_rx = Some(error_rx);

        let last_sequence = Arc::clone(&self.last_sequence);
        let path = self.path.clone();
        tokio::spawn(async move {
            let file = tokio::fs::File::from_std(file);
            if let Err(err) = write_loop(events_rx, file, last_sequence).await {
                tracing::error!(error = %err, ?path, "transaction log write failed; writer stopping");
                metrics::counter!("tidekv_log_write_failures_total", 1);
                let _ = error_tx.send(err);
            }
        });
    }

    /// Take the one-shot channel on which a fatal writer error is delivered.
    /// `None` until [`run`](Self::run) has been called, or if already taken.
    pub fn err(&mut self) -> Option<oneshot::Receiver<LogWriteError>> {
        self.error_rx.take()
    }

    /// Record a Put that has already been applied to the store. Returns once
    /// the event is queued; suspends briefly if the queue is full.
    pub async fn write_put(&self, key: &str, value: &str) {
        self.enqueue(Event::put(key, value)).await;
    }

    /// Record a Delete that has already been applied to the store.
    pub async fn write_delete(&self, key: &str) {
        self.enqueue(Event::delete(key)).await;
    }

    async fn enqueue(&self, event: Event) {
        if self.events_tx.send(event).await.is_err() {
            // The writer has stopped; the error channel already carried the
            // cause. Nothing further can be durably recorded.
            tracing::warn!("transaction log writer is not running; event not recorded");
        }
    }

    #[cfg(test)]
    pub(crate) fn with_file(file: std::fs::File, queue_capacity: usize) -> Self {
        let (events_tx, events_rx) = mpsc::channel(queue_capacity);
        Self {
            path: PathBuf::new(),
            events_tx,
            events_rx: Some(events_rx),
            file: Some(file),
            error_rx: None,
            last_sequence: Arc::new(AtomicU64::new(0)),
        }
    }
}

/// Drain the queue strictly in order: assign the next sequence number, write
/// one line, fsync, then publish the new durable cursor. Returns on the first
/// write failure or when every sender has been dropped.
async fn write_loop(
    mut events_rx: mpsc::Receiver<Event>,
    mut file: tokio::fs::File,
    last_sequence: Arc<AtomicU64>,
) -> Result<(), LogWriteError> {
    let mut sequence = last_sequence.load(Ordering::SeqCst);

    while let Some(mut event) = events_rx.recv().await {
        sequence += 1;
        event.sequence = sequence;

        file.write_all(event.encode().as_bytes()).await?;
        file.flush().await?;
        file.sync_data().await?;

        last_sequence.store(sequence, Ordering::SeqCst);
        metrics::counter!("tidekv_events_logged_total", 1);
    }

    Ok(())
}
