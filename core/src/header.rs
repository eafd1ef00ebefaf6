//! Response header line consumer.
//!
//! # Design
//! The engine hands over every raw header line it receives, CRLF included,
//! one call per line. `ResponseHeaders::consume` keeps the meaningful ones in
//! arrival order.
//!
//! Postcondition: `consume` returns the length of the line it was given,
//! untrimmed. Engines treat any other count as a failed write and abort the
//! transfer, so the return value must never reflect what was kept.

const CONTINUE_LINE: &str = "http/1.1 100 continue";

/// Ordered response header lines of the most recent transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    lines: Vec<String>,
}

impl ResponseHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one raw header line and report it as fully consumed.
    pub fn consume(&mut self, line: &[u8]) -> usize {
        let text = String::from_utf8_lossy(line);
        let trimmed = text.trim_matches(|c| c == '\r' || c == '\n');
        if !trimmed.is_empty() && !trimmed.eq_ignore_ascii_case(CONTINUE_LINE) {
            self.lines.push(trimmed.to_string());
        }
        line.len()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Value of the last header named `name` (case-insensitive).
    ///
    /// With redirects followed, earlier hops' headers are also present; the
    /// last match belongs to the final response.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.lines.iter().rev().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim())
        })
    }
}
