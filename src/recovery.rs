//! Startup replay: rebuild store state from the durable transaction log.

use crate::event::EventKind;
use crate::store::KeyValueStore;
use crate::wal_reader::ReplayError;
use crate::wal_writer::FileTransactionLog;

/// Reapply every durable event, in append order, to a fresh store.
///
/// Replay is not itself logged, and the log's sequence counter is primed
/// with the highest sequence seen so later appends continue the sequence.
/// An empty log leaves the store empty and the counter at 0. Any malformed
/// record aborts replay; the caller must not serve traffic on a partially
/// reconstructed store.
///
/// Returns the number of events applied. Must run before
/// [`FileTransactionLog::run`] and before the store is shared.
pub fn replay_log(
    log: &FileTransactionLog,
    store: &KeyValueStore,
) -> Result<u64, ReplayError> {
    let start = std::time::Instant::now();
    let mut applied = 0u64;
    let mut max_sequence = 0u64;

    for result in log.read_events()? {
        let event = result?;
        match event.kind {
            EventKind::Put => store.put(&event.key, &event.value)?,
            EventKind::Delete => store.delete(&event.key)?,
        }
        max_sequence = event.sequence;
        applied += 1;
    }

    log.set_last_sequence(max_sequence);

    metrics::histogram!("tidekv_replay_duration_seconds", start.elapsed().as_secs_f64());
    tracing::info!(
        events = applied,
        last_sequence = max_sequence,
        keys = store.key_count(),
        "transaction log replay complete"
    );

    Ok(applied)
}
