use std::iter;
use std::ops::Range;

use thiserror::Error;
use tracing::debug;

use crate::genomics::alphabet::{reverse_complement, AlphabetError, NO_DATA, TERMINATOR};
use crate::genomics::{AlignedRead, Orientation, SequenceIndex};

/// Errors surfaced while placing rows into the anchor frame.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AlignError {
    /// Anchor cannot fit inside a read of the configured length.
    #[error("pattern of length {pattern_len} does not fit reads of length {read_len}")]
    PatternTooLong {
        /// Anchor length.
        pattern_len: usize,
        /// Read length including the terminator.
        read_len: usize,
    },

    /// Recovered row carries no terminator.
    #[error("row of length {row_len} has no terminator")]
    MissingTerminator {
        /// Length of the offending row.
        row_len: usize,
    },

    /// Terminator falls inside the anchor occurrence.
    #[error("terminator overlaps the anchor pattern")]
    AnchorOverlapsTerminator,

    /// Row does not fit the window derived for this query.
    #[error("row of length {row_len} exceeds the read length {read_len}")]
    ReadTooLong {
        /// Length of the offending row.
        row_len: usize,
        /// Read length used to size the window.
        read_len: usize,
    },

    /// Row contained a symbol the reverse complement cannot map.
    #[error(transparent)]
    Alphabet(#[from] AlphabetError),
}

/// Rank ranges of rows matching the anchor on each strand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRanges {
    /// Rows starting with the pattern.
    pub forward: Range<usize>,
    /// Rows starting with the reverse complement of the pattern.
    pub reverse: Range<usize>,
}

impl MatchRanges {
    /// Look up both strands of `pattern` (already normalized).
    pub fn find<I: SequenceIndex + ?Sized>(
        index: &I,
        pattern: &[u8],
    ) -> Result<Self, AlphabetError> {
        let reverse_pattern = reverse_complement(pattern)?;
        Ok(Self {
            forward: index.find_range(pattern),
            reverse: index.find_range(&reverse_pattern),
        })
    }

    /// Number of forward matches.
    pub fn forward_count(&self) -> usize {
        self.forward.len()
    }

    /// Number of reverse-complement matches.
    pub fn reverse_count(&self) -> usize {
        self.reverse.len()
    }

    /// Matches on both strands.
    pub fn total(&self) -> usize {
        self.forward_count() + self.reverse_count()
    }

    /// Whether neither strand matched.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Places recovered rows into a fixed-width frame with the anchor starting at
/// column `read_len - pattern_len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceAligner {
    read_len: usize,
    pattern_len: usize,
}

impl SequenceAligner {
    /// Create an aligner for reads of `read_len` symbols (terminator included).
    pub fn new(read_len: usize, pattern_len: usize) -> Result<Self, AlignError> {
        if pattern_len == 0 || pattern_len >= read_len {
            return Err(AlignError::PatternTooLong {
                pattern_len,
                read_len,
            });
        }
        Ok(Self {
            read_len,
            pattern_len,
        })
    }

    /// Read length used when the dataset has no uniform length: the length of
    /// the first recovered row.
    pub fn derive_read_len<I: SequenceIndex + ?Sized>(
        index: &I,
        uniform_length: Option<usize>,
    ) -> usize {
        uniform_length
            .filter(|&len| len > 0)
            .unwrap_or_else(|| index.recover_row(0).len())
    }

    /// Read length including the terminator.
    pub fn read_len(&self) -> usize {
        self.read_len
    }

    /// Anchor length.
    pub fn pattern_len(&self) -> usize {
        self.pattern_len
    }

    /// Columns of flank on each side of the anchor.
    pub fn margin(&self) -> usize {
        self.read_len - self.pattern_len
    }

    /// Width `L = 2 * read_len - pattern_len` of every aligned read.
    pub fn window_len(&self) -> usize {
        2 * self.read_len - self.pattern_len
    }

    /// Columns occupied by the anchor.
    pub fn anchor_columns(&self) -> Range<usize> {
        self.margin()..self.read_len
    }

    /// Align a row recovered for the given strand.
    pub fn align(&self, row: &[u8], orientation: Orientation) -> Result<AlignedRead, AlignError> {
        match orientation {
            Orientation::Forward => self.align_forward(row),
            Orientation::ReverseComplement => self.align_reverse(row),
        }
    }

    /// Align a row that starts with the pattern. A pattern ending in `$`
    /// keeps the terminator as the last anchor symbol and has no right flank.
    pub fn align_forward(&self, row: &[u8]) -> Result<AlignedRead, AlignError> {
        let l = self.pattern_len;
        let end = self.terminator(row)?;
        if end + 1 < l {
            return Err(AlignError::AnchorOverlapsTerminator);
        }
        // Symbols after the terminator wrap around to the start of the read.
        self.place(row.len(), &row[end + 1..], &row[..l], &row[l..=end])
    }

    /// Align a row that starts with the reverse complement of the pattern.
    /// The row is reverse-complemented first, so the anchor ends the string.
    pub fn align_reverse(&self, row: &[u8]) -> Result<AlignedRead, AlignError> {
        let l = self.pattern_len;
        let flipped = reverse_complement(row)?;
        let n = flipped.len();
        let end = self.terminator(&flipped)?;
        if end + 1 == n {
            return self.place(n, &flipped[..n - l], &flipped[n - l..], &[]);
        }
        if end + l > n {
            return Err(AlignError::AnchorOverlapsTerminator);
        }
        self.place(n, &flipped[end..n - l], &flipped[n - l..], &flipped[..end])
    }

    /// Recover and align every row in `ranges`, forward strand first.
    pub fn align_matches<I: SequenceIndex + ?Sized>(
        &self,
        index: &I,
        ranges: &MatchRanges,
    ) -> Result<Vec<AlignedRead>, AlignError> {
        let mut reads = Vec::with_capacity(ranges.total());
        for rank in ranges.forward.clone() {
            reads.push(self.align_forward(&index.recover_row(rank))?);
        }
        for rank in ranges.reverse.clone() {
            reads.push(self.align_reverse(&index.recover_row(rank))?);
        }
        debug!(
            forward = ranges.forward_count(),
            reverse = ranges.reverse_count(),
            window = self.window_len(),
            "aligned matching rows"
        );
        Ok(reads)
    }

    fn terminator(&self, row: &[u8]) -> Result<usize, AlignError> {
        row.iter()
            .position(|&symbol| symbol == TERMINATOR)
            .ok_or(AlignError::MissingTerminator { row_len: row.len() })
    }

    /// Put the anchor at its columns between lowercased flanks.
    fn place(
        &self,
        row_len: usize,
        left: &[u8],
        anchor: &[u8],
        right: &[u8],
    ) -> Result<AlignedRead, AlignError> {
        if left.len() > self.margin() || right.len() > self.margin() {
            return Err(AlignError::ReadTooLong {
                row_len,
                read_len: self.read_len,
            });
        }

        let mut frame = Vec::with_capacity(self.window_len());
        frame.extend(iter::repeat(NO_DATA).take(self.margin() - left.len()));
        frame.extend(left.iter().map(u8::to_ascii_lowercase));
        frame.extend_from_slice(anchor);
        frame.extend(right.iter().map(u8::to_ascii_lowercase));
        frame.resize(self.window_len(), NO_DATA);
        Ok(AlignedRead::new(frame))
    }
}
