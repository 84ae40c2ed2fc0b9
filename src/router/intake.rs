//! Line-oriented event intake.
//
// One event per line: `auction <id>` or `bid <id>`. The id is the rest of the
// line as raw bytes and may contain anything but a newline, including
// sequences that are not valid UTF-8.

use std::fmt;

use crate::governor::TraceCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Auction,
    Bid,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Auction => "auction",
            EventKind::Bid => "bid",
        }
    }

    pub fn metric_category(self) -> TraceCategory {
        match self {
            EventKind::Auction => TraceCategory::AuctionMetric,
            EventKind::Bid => TraceCategory::BidMetric,
        }
    }

    pub fn message_category(self) -> TraceCategory {
        match self {
            EventKind::Auction => TraceCategory::AuctionMessage,
            EventKind::Bid => TraceCategory::BidMessage,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("unknown event kind {0:?}")]
    UnknownKind(String),
    #[error("missing event id")]
    MissingId,
}

/// A parsed intake line borrowing from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event<'a> {
    pub kind: EventKind,
    pub id: &'a [u8],
}

impl Event<'_> {
    /// Id for logs and replies; invalid UTF-8 is replaced, never rejected.
    pub fn display_id(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(self.id)
    }
}

fn trim_ascii(mut bytes: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = bytes {
        if !first.is_ascii_whitespace() {
            break;
        }
        bytes = rest;
    }
    while let [rest @ .., last] = bytes {
        if !last.is_ascii_whitespace() {
            break;
        }
        bytes = rest;
    }
    bytes
}

/// Parses one intake line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &[u8]) -> Result<Option<Event<'_>>, IntakeError> {
    let line = trim_ascii(line);
    if line.is_empty() {
        return Ok(None);
    }

    let (kind, id) = match line.iter().position(u8::is_ascii_whitespace) {
        Some(at) => (&line[..at], trim_ascii(&line[at..])),
        None => (line, &[][..]),
    };

    let kind = match kind {
        b"auction" => EventKind::Auction,
        b"bid" => EventKind::Bid,
        other => return Err(IntakeError::UnknownKind(String::from_utf8_lossy(other).into_owned())),
    };

    if id.is_empty() {
        return Err(IntakeError::MissingId);
    }

    Ok(Some(Event { kind, id }))
}
