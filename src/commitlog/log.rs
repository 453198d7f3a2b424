use std::fmt;

/// Sequence is the position of an entry in the log. Sequences start at 0, are dense, and an
/// entry's sequence never changes once assigned.
#[derive(Copy, Clone, PartialOrd, PartialEq, Ord, Eq, Hash)]
pub struct Sequence(u64);

impl Sequence {
    pub fn new(sequence: u64) -> Self {
        Sequence(sequence)
    }

    pub fn new_usize(sequence: usize) -> Self {
        Self::new(sequence as u64)
    }

    pub fn start() -> Self {
        Self::new(0)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub(crate) fn as_usize(&self) -> usize {
        self.0 as usize
    }

    pub fn plus(&self, delta: u64) -> Sequence {
        Sequence::new(self.0 + delta)
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LogError {
    #[error("Log is full. Max entries: {max_entries}")]
    CapacityExceeded { max_entries: u64 },
    #[error("Requested range [{start:?}, {end:?}) is outside of log with length {len}")]
    OutOfRange { start: Sequence, end: Sequence, len: u64 },
}

/// Log is an append only log. Entries are never removed.
pub trait Log<E> {
    /// append() appends an entry at the next sequence, then returns the sequence that was just
    /// used to append the entry.
    fn append(&mut self, entry: E) -> Result<Sequence, LogError>;

    fn read(&self, sequence: Sequence) -> Option<&E>;

    /// Mutable access is for entry metadata. Implementations don't re-order or replace entries.
    fn read_mut(&mut self, sequence: Sequence) -> Option<&mut E>;

    /// Entries in `[start, end)`. Fails if `end` is past the end of the log or `start > end`.
    fn slice(&self, start: Sequence, end: Sequence) -> Result<&[E], LogError>;

    fn len(&self) -> u64;

    /// next_sequence returns the sequence that will be used by the next append.
    fn next_sequence(&self) -> Sequence {
        Sequence::new(self.len())
    }
}
