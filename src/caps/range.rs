//! `Range: bytes=<start>-<end>` handling for texture responses

/// Inclusive byte range as sent by the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

/// Result of resolving a range against a buffer length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeResolution {
    /// Clamped inclusive slice to serve
    Satisfiable { start: usize, end: usize },
    /// `start` lies at or beyond the end of the data
    Unsatisfiable,
}

impl ByteRange {
    /// Parse `bytes=<start>-<end>`. Open-ended and suffix forms are rejected,
    /// as are multi-range requests.
    pub fn parse(header: &str) -> Option<Self> {
        let spec = header.strip_prefix("bytes=")?;
        let mut parts = spec.split('-');
        let start = parts.next()?.trim().parse::<u64>().ok()?;
        let end = parts.next()?.trim().parse::<u64>().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self { start, end })
    }

    /// Clamp against a buffer of `len` bytes.
    ///
    /// Satisfiability is checked before clamping so an out-of-range start
    /// never degrades into serving the last byte.
    pub fn resolve(&self, len: usize) -> RangeResolution {
        let len = len as u64;
        if self.start >= len {
            return RangeResolution::Unsatisfiable;
        }
        let end = self.end.min(len - 1);
        let start = self.start.min(end);
        RangeResolution::Satisfiable {
            start: start as usize,
            end: end as usize,
        }
    }
}
