use serde::Serialize;

use crate::genomics::consensus::build_consensus;
use crate::genomics::{AlignedRead, HaplotypeGroup};

/// Default member count at which a group is reported on its own.
pub const DEFAULT_MIN_CONFIDENT_SIZE: usize = 5;

/// Whether a record stands for one group or pools the small ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Group with at least the configured number of members.
    Confident,
    /// All reads from smaller groups, re-voted together.
    Remainder,
}

/// Haplotype reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HaplotypeRecord {
    /// Confident group or pooled remainder.
    pub kind: RecordKind,
    /// Representative sequence.
    pub consensus: AlignedRead,
    /// Reads supporting the record.
    pub members: Vec<AlignedRead>,
}

impl HaplotypeRecord {
    /// Number of supporting reads.
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

/// Split merged groups (largest first) into confident records followed by at
/// most one remainder record whose consensus is a full re-vote of the pool.
pub fn classify_groups(
    groups: Vec<HaplotypeGroup>,
    min_confident_size: usize,
) -> Vec<HaplotypeRecord> {
    let mut records = Vec::new();
    let mut pool = Vec::new();
    for group in groups {
        if group.size() >= min_confident_size {
            records.push(HaplotypeRecord {
                kind: RecordKind::Confident,
                consensus: group.consensus,
                members: group.members,
            });
        } else {
            pool.extend(group.members);
        }
    }

    if !pool.is_empty() {
        let consensus = build_consensus(&pool).sequence;
        records.push(HaplotypeRecord {
            kind: RecordKind::Remainder,
            consensus,
            members: pool,
        });
    }
    records
}
