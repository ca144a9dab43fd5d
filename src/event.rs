//! Transaction log events and their durable line format.
//!
//! One event per line, tab-separated, newline-terminated:
//!
//! ```text
//! <sequence:u64>\t<kind:1|2>\t<key>\t<value>
//! ```
//!
//! Kind 1 is Delete, 2 is Put; zero is deliberately unused so a zeroed field
//! is never a valid kind. The value is parsed as the remainder of the line,
//! so values may themselves contain tabs. Keys may not (enforced at the HTTP
//! boundary), and neither keys nor values may contain newlines.

use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EventKind {
    Delete = 1,
    Put = 2,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Position in the durable log. Assigned by the single writer task at
    /// append time; zero until then.
    pub sequence: u64,
    pub kind: EventKind,
    pub key: String,
    pub value: String,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseEventError {
    #[error("expected 4 tab-separated fields")]
    FieldCount,

    #[error("invalid sequence number: {0:?}")]
    Sequence(String),

    #[error("invalid event kind: {0:?}")]
    Kind(String),
}

impl Event {
    pub fn put(key: &str, value: &str) -> Self {
        Self {
            sequence: 0,
            kind: EventKind::Put,
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    pub fn delete(key: &str) -> Self {
        Self {
            sequence: 0,
            kind: EventKind::Delete,
            key: key.to_string(),
            value: String::new(),
        }
    }

    /// Serialize to one durable log line, including the trailing newline.
    pub fn encode(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\n",
            self.sequence, self.kind as u8, self.key, self.value
        )
    }
}

impl FromStr for Event {
    type Err = ParseEventError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut fields = line.splitn(4, '\t');
        let sequence = fields.next().ok_or(ParseEventError::FieldCount)?;
        let kind = fields.next().ok_or(ParseEventError::FieldCount)?;
        let key = fields.next().ok_or(ParseEventError::FieldCount)?;
        let value = fields.next().ok_or(ParseEventError::FieldCount)?;

        let sequence = sequence
            .parse::<u64>()
            .map_err(|_| ParseEventError::Sequence(sequence.to_string()))?;
        let kind = match kind {
            "1" => EventKind::Delete,
            "2" => EventKind::Put,
            other => return Err(ParseEventError::Kind(other.to_string())),
        };

        Ok(Self {
            sequence,
            kind,
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_put() {
        let mut event = Event::put("a", "1");
        event.sequence = 7;
        assert_eq!(event.encode(), "7\t2\ta\t1\n");
    }

    #[test]
    fn test_encode_delete_has_empty_value() {
        let mut event = Event::delete("a");
        event.sequence = 3;
        assert_eq!(event.encode(), "3\t1\ta\t\n");
    }

    #[test]
    fn test_parse_roundtrip() {
        let mut event = Event::put("user:42", "hello world");
        event.sequence = 12;
        let parsed: Event = event.encode().trim_end_matches('\n').parse().unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_parse_value_keeps_embedded_tabs() {
        let parsed: Event = "5\t2\tk\ta\tb\tc".parse().unwrap();
        assert_eq!(parsed.sequence, 5);
        assert_eq!(parsed.key, "k");
        assert_eq!(parsed.value, "a\tb\tc");
    }

    #[test]
    fn test_parse_missing_field() {
        let err = "5\t2\tkey-only".parse::<Event>().unwrap_err();
        assert_eq!(err, ParseEventError::FieldCount);
    }

    #[test]
    fn test_parse_bad_sequence() {
        let err = "abc\t2\tk\tv".parse::<Event>().unwrap_err();
        assert_eq!(err, ParseEventError::Sequence("abc".to_string()));
    }

    #[test]
    fn test_parse_bad_kind() {
        let err = "1\t0\tk\tv".parse::<Event>().unwrap_err();
        assert_eq!(err, ParseEventError::Kind("0".to_string()));

        let err = "1\t9\tk\tv".parse::<Event>().unwrap_err();
        assert_eq!(err, ParseEventError::Kind("9".to_string()));
    }

    #[test]
    fn test_parse_empty_line() {
        assert!("".parse::<Event>().is_err());
    }
}
