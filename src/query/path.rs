//! Unambiguous walks through the implicit de Bruijn graph of a dataset.
//!
//! Counts are always pooled over both strands: the forward successor
//! `kmer[1..] + b` is paired with its reverse complement `comp(b) + rc[..k-1]`.

use serde::Serialize;
use tracing::{debug, info};

use crate::config::QueryConfig;
use crate::genomics::alphabet::BASE_COUNT;
use crate::genomics::{normalize_pattern, reverse_complement, BaseCode, SequenceIndex};
use crate::query::{for_each_dataset, DatasetReport, QueryError};

/// Why a walk stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathStop {
    /// Last appended k-mer fell below the count threshold.
    BelowThreshold,
    /// More than one successor or predecessor met the threshold.
    Branch,
    /// Walk reached the configured extension cap.
    LengthCap,
}

/// Result of walking forward from a seed k-mer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathExtension {
    /// Seed followed by every appended base.
    pub path: String,
    /// Forward count of the seed and of each k-mer appended after it.
    pub forward_counts: Vec<usize>,
    /// Reverse-complement count matching each entry of `forward_counts`.
    pub reverse_counts: Vec<usize>,
    /// Forward counts of the four candidate successors at the last step.
    pub next_forward: [usize; BASE_COUNT],
    /// Reverse-complement counts of those successors.
    pub next_reverse: [usize; BASE_COUNT],
    /// Reason the walk ended.
    pub stop: PathStop,
}

fn with_suffix(prefix: &[u8], base: u8) -> Vec<u8> {
    let mut kmer = Vec::with_capacity(prefix.len() + 1);
    kmer.extend_from_slice(prefix);
    kmer.push(base);
    kmer
}

fn with_prefix(base: u8, suffix: &[u8]) -> Vec<u8> {
    let mut kmer = Vec::with_capacity(suffix.len() + 1);
    kmer.push(base);
    kmer.extend_from_slice(suffix);
    kmer
}

/// Extend `kmer` (already normalized) one base at a time while at most one
/// successor and at most one predecessor reach `threshold` pooled occurrences.
///
/// The appended base is the successor with the highest pooled count, ties
/// going to the earliest of A, C, G, T. The walk stops when the last k-mer
/// drops below `threshold`, on a branch, or after `max_extension` bases.
pub fn extend_path<I: SequenceIndex + ?Sized>(
    index: &I,
    kmer: &[u8],
    threshold: usize,
    max_extension: usize,
) -> Result<PathExtension, QueryError> {
    let mut path = kmer.to_vec();
    let mut current = kmer.to_vec();
    let mut reverse = reverse_complement(kmer)?;
    let mut forward_counts = vec![index.count_occurrences(&current)];
    let mut reverse_counts = vec![index.count_occurrences(&reverse)];
    let mut next_forward = [0; BASE_COUNT];
    let mut next_reverse = [0; BASE_COUNT];

    let stop = loop {
        let last = forward_counts.last().copied().unwrap_or(0)
            + reverse_counts.last().copied().unwrap_or(0);
        if last < threshold {
            break PathStop::BelowThreshold;
        }
        if path.len() - kmer.len() >= max_extension {
            break PathStop::LengthCap;
        }

        current.remove(0);
        reverse.pop();

        let mut back = [0; BASE_COUNT];
        for base in BaseCode::ALL {
            let (b, c) = (base.to_upper(), base.complement().to_upper());
            next_forward[base.index()] = index.count_occurrences(&with_suffix(&current, b));
            next_reverse[base.index()] = index.count_occurrences(&with_prefix(c, &reverse));
            back[base.index()] = index.count_occurrences(&with_prefix(b, &current))
                + index.count_occurrences(&with_suffix(&reverse, c));
        }

        let pooled = |base: &BaseCode| next_forward[base.index()] + next_reverse[base.index()];
        let ahead = BaseCode::ALL.iter().filter(|b| pooled(*b) >= threshold).count();
        let behind = back.iter().filter(|&&count| count >= threshold).count();
        if ahead > 1 || behind > 1 {
            debug!(ahead, behind, length = path.len(), "path branches");
            break PathStop::Branch;
        }

        // `max_by_key` keeps the last maximum, so scan in reverse to favour A.
        let best = BaseCode::ALL
            .iter()
            .rev()
            .max_by_key(|base| pooled(*base))
            .copied()
            .unwrap_or(BaseCode::A);
        current.push(best.to_upper());
        reverse.insert(0, best.complement().to_upper());
        forward_counts.push(next_forward[best.index()]);
        reverse_counts.push(next_reverse[best.index()]);
        path.push(best.to_upper());
    };

    Ok(PathExtension {
        path: String::from_utf8_lossy(&path).into_owned(),
        forward_counts,
        reverse_counts,
        next_forward,
        next_reverse,
        stop,
    })
}

/// Walk from `kmer` in one dataset, bounded by the configured extension cap.
pub fn run_path_query(
    config: &QueryConfig,
    dataset: &str,
    kmer: &str,
    threshold: usize,
) -> Result<DatasetReport<PathExtension>, QueryError> {
    let kmer = normalize_pattern(kmer)?;
    let mut reports = for_each_dataset(config, &[dataset.to_string()], |index, _| {
        extend_path(index, &kmer, threshold, config.max_path_extension)
    })?;
    let report = reports.pop().ok_or(QueryError::NoDatasets)?;
    info!(
        dataset = %report.dataset,
        extended = report.outcome.path.len() - kmer.len(),
        stop = ?report.outcome.stop,
        "extended path"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genomics::MemoryIndex;

    #[test]
    fn follows_unique_successors() {
        let index = MemoryIndex::from_reads(["AAACACCC"; 3]).unwrap();
        let walk = extend_path(&index, b"AAAC", 2, 100).unwrap();

        // The final base is appended with no support, which ends the walk.
        assert_eq!(walk.path, "AAACACCCA");
        assert_eq!(walk.forward_counts, vec![3, 3, 3, 3, 3, 0]);
        assert_eq!(walk.reverse_counts, vec![0; 6]);
        assert_eq!(walk.stop, PathStop::BelowThreshold);
    }

    #[test]
    fn pools_reverse_strand() {
        let index = MemoryIndex::from_reads(["GGGTGTTT"; 3]).unwrap();
        let walk = extend_path(&index, b"AAAC", 2, 100).unwrap();
        assert_eq!(walk.path, "AAACACCCA");
        assert_eq!(walk.forward_counts, vec![0; 6]);
        assert_eq!(walk.reverse_counts, vec![3, 3, 3, 3, 3, 0]);
    }

    #[test]
    fn stops_at_branch() {
        let mut reads = vec!["AAACA"; 3];
        reads.extend(["AAACC"; 3]);
        let index = MemoryIndex::from_reads(&reads).unwrap();
        let walk = extend_path(&index, b"AAAC", 2, 100).unwrap();

        assert_eq!(walk.path, "AAAC");
        assert_eq!(walk.forward_counts, vec![6]);
        assert_eq!(walk.next_forward, [3, 3, 0, 0]);
        assert_eq!(walk.stop, PathStop::Branch);
    }

    #[test]
    fn cycles_are_capped() {
        let index = MemoryIndex::from_reads(["ACACACACAC"]).unwrap();
        let walk = extend_path(&index, b"ACAC", 1, 3).unwrap();
        assert_eq!(walk.path, "ACACACA");
        assert_eq!(walk.stop, PathStop::LengthCap);
    }

    #[test]
    fn unsupported_seed_stops_immediately() {
        let index = MemoryIndex::from_reads(["AAACACCC"]).unwrap();
        let walk = extend_path(&index, b"GGGG", 1, 100).unwrap();
        assert_eq!(walk.path, "GGGG");
        assert_eq!(walk.forward_counts, vec![0]);
        assert_eq!(walk.stop, PathStop::BelowThreshold);
    }
}
