//! Transaction log reader for startup replay.
//!
//! Yields events one at a time, in the order they were appended, validating
//! line framing and sequence monotonicity as it goes. A malformed record
//! terminates iteration with an error rather than being skipped: recovery
//! from a log we cannot fully parse would serve a partially reconstructed
//! store.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use thiserror::Error;

use crate::errors::StoreError;
use crate::event::{Event, ParseEventError};

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed record at line {line}: {source}")]
    Malformed {
        line: u64,
        #[source]
        source: ParseEventError,
    },

    #[error("sequence regression at line {line}: {found} after {last}")]
    OutOfOrder { line: u64, found: u64, last: u64 },

    #[error("store rejected replayed event: {0}")]
    Store(#[from] StoreError),
}

pub struct LogReader {
    lines: Lines<BufReader<File>>,
    line: u64,
    last_sequence: u64,
    failed: bool,
}

impl LogReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let file = File::open(path)?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
            line: 0,
            last_sequence: 0,
            failed: false,
        })
    }

    fn fail(&mut self, err: ReplayError) -> Option<Result<Event, ReplayError>> {
        self.failed = true;
        Some(Err(err))
    }
}

impl Iterator for LogReader {
    type Item = Result<Event, ReplayError>;

    fn next(&mut self) -> Option<Self::Item> {
        // An error ends the sequence; records past it are never surfaced.
        if self.failed {
            return None;
        }

        let line = match self.lines.next()? {
            Ok(line) => line,
            Err(err) => return self.fail(err.into()),
        };
        self.line += 1;

        let event = match line.parse::<Event>() {
            Ok(event) => event,
            Err(source) => {
                return self.fail(ReplayError::Malformed {
                    line: self.line,
                    source,
                })
            }
        };

        if event.sequence <= self.last_sequence {
            return self.fail(ReplayError::OutOfOrder {
                line: self.line,
                found: event.sequence,
                last: self.last_sequence,
            });
        }
        self.last_sequence = event.sequence;

        Some(Ok(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use tempfile::tempdir;

    fn write_log(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tx.log");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_reads_events_in_order() {
        let (_dir, path) = write_log("1\t2\ta\t1\n2\t2\tb\t2\n3\t1\ta\t\n");

        let events: Vec<Event> = LogReader::open(&path)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(events.len(), 3);
        assert_eq!(events[0].sequence, 1);
        assert_eq!(events[0].kind, EventKind::Put);
        assert_eq!(events[2].kind, EventKind::Delete);
        assert_eq!(events[2].key, "a");
    }

    #[test]
    fn test_empty_log_yields_nothing() {
        let (_dir, path) = write_log("");
        assert_eq!(LogReader::open(&path).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_field_is_an_error_not_a_skip() {
        let (_dir, path) = write_log("1\t2\ta\t1\n2\t2\tb\n3\t2\tc\t3\n");

        let results: Vec<_> = LogReader::open(&path).unwrap().collect();
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(ReplayError::Malformed { line: 2, .. })
        ));
        // Nothing past the first bad record is surfaced.
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_sequence_regression_is_an_error() {
        let (_dir, path) = write_log("1\t2\ta\t1\n1\t2\tb\t2\n");

        let results: Vec<_> = LogReader::open(&path).unwrap().collect();
        assert!(matches!(
            results[1],
            Err(ReplayError::OutOfOrder {
                line: 2,
                found: 1,
                last: 1
            })
        ));
    }

    #[test]
    fn test_truncated_tail_is_an_error() {
        // Crash mid-append: the final line lost its value and newline.
        let (_dir, path) = write_log("1\t2\ta\t1\n2\t2\tb");

        let results: Vec<_> = LogReader::open(&path).unwrap().collect();
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(ReplayError::Malformed { .. })));
    }
}
