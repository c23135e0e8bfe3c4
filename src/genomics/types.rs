use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::genomics::alphabet::is_called;

/// Identifier of a haplotype group. Allocated monotonically and never reused
/// within one merger run.
pub type GroupId = usize;

/// Strand on which a read matched the anchor pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Row matched the pattern as given.
    Forward,
    /// Row matched the reverse complement of the pattern.
    ReverseComplement,
}

/// Read placed in the anchor-centred coordinate frame of a query.
///
/// Uppercase bases belong to the anchor window, lowercase bases flank it,
/// `.` marks columns without data and `$` marks the end of the stored read.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlignedRead {
    sequence: Arc<[u8]>,
}

impl AlignedRead {
    /// Wrap an already laid-out sequence.
    pub fn new(sequence: impl Into<Arc<[u8]>>) -> Self {
        Self {
            sequence: sequence.into(),
        }
    }

    /// Width of the coordinate frame.
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Whether the frame has zero width.
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Raw symbols of the read.
    pub fn as_bytes(&self) -> &[u8] {
        &self.sequence
    }

    /// Symbol at `column`.
    pub fn symbol_at(&self, column: usize) -> Option<u8> {
        self.sequence.get(column).copied()
    }

    /// Number of columns holding a base call.
    pub fn called_columns(&self) -> usize {
        self.sequence.iter().filter(|&&symbol| is_called(symbol)).count()
    }

    /// Column of the terminator, if the read carries one.
    pub fn terminator_column(&self) -> Option<usize> {
        self.sequence
            .iter()
            .position(|&symbol| symbol == crate::genomics::alphabet::TERMINATOR)
    }
}

impl From<&str> for AlignedRead {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl fmt::Display for AlignedRead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.sequence))
    }
}

impl fmt::Debug for AlignedRead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AlignedRead({})", self)
    }
}

impl Serialize for AlignedRead {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Cluster of reads believed to come from the same sequence variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HaplotypeGroup {
    /// Merger-assigned identifier.
    pub id: GroupId,
    /// Representative sequence for the group.
    pub consensus: AlignedRead,
    /// Raw member reads.
    pub members: Vec<AlignedRead>,
}

impl HaplotypeGroup {
    /// Number of member reads.
    pub fn size(&self) -> usize {
        self.members.len()
    }
}
