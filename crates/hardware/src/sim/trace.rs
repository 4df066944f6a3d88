//! Memory Trace Parsing.
//!
//! A trace is a text file with one access per line: `<R|W> <hex-address>`, for
//! example `R 0x1f40` or `W 7ffc`. Anything after the address is ignored. Replay
//! stops at the first line that cannot be parsed; later lines are not processed.

use std::io::BufRead;

use tracing::warn;

use crate::common::{AccessType, Result};

/// One access from a trace file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceEntry {
    /// Read or write.
    pub op: AccessType,
    /// Byte address.
    pub addr: u32,
}

impl TraceEntry {
    /// Parses one trace line, returning `None` if it is malformed.
    ///
    /// ```
    /// use cachesim_core::common::AccessType;
    /// use cachesim_core::sim::trace::TraceEntry;
    ///
    /// let entry = TraceEntry::parse("W 0x1f40").unwrap();
    /// assert_eq!(entry.op, AccessType::Write);
    /// assert_eq!(entry.addr, 0x1f40);
    /// assert!(TraceEntry::parse("X 10").is_none());
    /// ```
    pub fn parse(line: &str) -> Option<Self> {
        let mut fields = line.split_whitespace();
        let op = fields.next()?.parse::<AccessType>().ok()?;
        let raw = fields.next()?;
        let digits = raw
            .strip_prefix("0x")
            .or_else(|| raw.strip_prefix("0X"))
            .unwrap_or(raw);
        let addr = u32::from_str_radix(digits, 16).ok()?;
        Some(Self { op, addr })
    }
}

/// Iterator over the entries of a trace, stopping at the first malformed line.
///
/// A line that is not valid UTF-8 counts as malformed; only genuine read
/// failures are yielded as errors.
#[derive(Debug)]
pub struct TraceReader<R> {
    reader: R,
    line: usize,
    buf: Vec<u8>,
    stopped_at: Option<usize>,
    done: bool,
}

impl<R: BufRead> TraceReader<R> {
    /// Wraps a buffered reader.
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: Vec::new(),
            stopped_at: None,
            done: false,
        }
    }

    /// 1-based number of the malformed line that ended the trace, if any.
    pub const fn stopped_at(&self) -> Option<usize> {
        self.stopped_at
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<TraceEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => {
                self.line += 1;
                let entry = std::str::from_utf8(&self.buf)
                    .ok()
                    .and_then(TraceEntry::parse);
                if let Some(entry) = entry {
                    Some(Ok(entry))
                } else {
                    let text = String::from_utf8_lossy(&self.buf);
                    warn!(
                        line = self.line,
                        text = text.trim_end(),
                        "malformed trace line, stopping"
                    );
                    self.stopped_at = Some(self.line);
                    self.done = true;
                    None
                }
            }
            Err(e) => {
                self.done = true;
                Some(Err(e.into()))
            }
        }
    }
}
