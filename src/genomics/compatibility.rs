use crate::genomics::alphabet::{is_called, NO_DATA};
use crate::genomics::AlignedRead;

/// Column agreement between two equally wide sequences, counted over columns
/// both sides call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlapCounts {
    /// Jointly called columns whose bases differ.
    pub conflicts: usize,
    /// Jointly called columns whose bases agree.
    pub shared: usize,
}

/// Outcome of comparing two group consensuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compatibility {
    /// At least one jointly called column disagrees.
    Incompatible {
        /// Number of conflicting columns.
        conflicts: usize,
    },
    /// No conflicts; the pair may merge with the given weight.
    Mergeable {
        /// `shared * (size_a + size_b)`; zero for disjoint coverage.
        weight: u64,
    },
}

impl Compatibility {
    /// Merge weight when the pair is mergeable.
    pub fn weight(self) -> Option<u64> {
        match self {
            Compatibility::Mergeable { weight } => Some(weight),
            Compatibility::Incompatible { .. } => None,
        }
    }
}

/// Count conflicting and shared called columns. Case is ignored.
///
/// # Panics
///
/// Panics when the sequences differ in width.
pub fn overlap(a: &AlignedRead, b: &AlignedRead) -> OverlapCounts {
    assert_eq!(a.len(), b.len(), "compared sequences must share a width");
    let mut counts = OverlapCounts::default();
    for (&x, &y) in a.as_bytes().iter().zip(b.as_bytes()) {
        if !(is_called(x) && is_called(y)) {
            continue;
        }
        if x.eq_ignore_ascii_case(&y) {
            counts.shared += 1;
        } else {
            counts.conflicts += 1;
        }
    }
    counts
}

/// Decide whether consensuses `a` (of `size_a` reads) and `b` (of `size_b`
/// reads) may merge.
pub fn compatibility(
    a: &AlignedRead,
    size_a: usize,
    b: &AlignedRead,
    size_b: usize,
) -> Compatibility {
    let OverlapCounts { conflicts, shared } = overlap(a, b);
    if conflicts > 0 {
        Compatibility::Incompatible { conflicts }
    } else {
        Compatibility::Mergeable {
            weight: shared as u64 * (size_a + size_b) as u64,
        }
    }
}

/// Representative sequence of a prospective merge: per column, `a`'s call,
/// else `b`'s call, else `.`. This overrides rather than re-votes.
///
/// # Panics
///
/// Panics when the sequences differ in width.
pub fn combine(a: &AlignedRead, b: &AlignedRead) -> AlignedRead {
    assert_eq!(a.len(), b.len(), "combined sequences must share a width");
    let merged: Vec<u8> = a
        .as_bytes()
        .iter()
        .zip(b.as_bytes())
        .map(|(&x, &y)| {
            if is_called(x) {
                x
            } else if is_called(y) {
                y
            } else {
                NO_DATA
            }
        })
        .collect();
    AlignedRead::new(merged)
}
