//! Greedy haplotype merging over an incrementally maintained compatibility
//! graph.
//!
//! Nodes start as buckets of byte-identical aligned reads. Every pair of
//! nodes whose consensuses never disagree on a jointly called column is joined
//! by an edge weighted `shared_columns * (size_a + size_b)`. The merger then
//! repeatedly contracts the heaviest edge:
//!
//! 1. the lowest `(low_id, high_id)` pair wins among equally heavy edges;
//! 2. the merged node takes a fresh id, the override-combined consensus of its
//!    endpoints and their concatenated members;
//! 3. it keeps only neighbours adjacent to *both* endpoints, each edge weighted
//!    by the sum of the two edges it replaces.
//!
//! Edge weights are never recomputed from the merged consensus, so the result
//! depends on merge order exactly as the summation implies.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use tracing::{debug, trace};

use crate::genomics::compatibility::{combine, compatibility};
use crate::genomics::consensus::build_consensus;
use crate::genomics::{AlignedRead, GroupId, HaplotypeGroup};

/// Contraction performed by one merger step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeRecord {
    /// Lower-id endpoint.
    pub low: GroupId,
    /// Higher-id endpoint.
    pub high: GroupId,
    /// Weight of the contracted edge.
    pub weight: u64,
    /// Id allocated to the merged group.
    pub merged: GroupId,
}

/// Arena of live haplotype groups plus their compatibility graph.
#[derive(Debug, Clone, Default)]
pub struct GreedyMerger {
    groups: BTreeMap<GroupId, HaplotypeGroup>,
    adjacency: BTreeMap<GroupId, BTreeMap<GroupId, u64>>,
    next_id: GroupId,
    read_count: usize,
}

impl GreedyMerger {
    /// Bucket exact duplicates (ids follow first appearance) and connect every
    /// compatible pair.
    pub fn from_reads(reads: Vec<AlignedRead>) -> Self {
        let read_count = reads.len();
        let mut bucket_of: HashMap<AlignedRead, usize> = HashMap::new();
        let mut buckets: Vec<Vec<AlignedRead>> = Vec::new();
        for read in reads {
            let slot = *bucket_of.entry(read.clone()).or_insert_with(|| {
                buckets.push(Vec::new());
                buckets.len() - 1
            });
            buckets[slot].push(read);
        }

        let mut merger = Self {
            read_count,
            ..Self::default()
        };
        for members in buckets {
            let consensus = build_consensus(&members).sequence;
            merger.insert_group(consensus, members);
        }
        merger.connect_all_pairs();
        debug!(
            reads = read_count,
            nodes = merger.groups.len(),
            edges = merger.edge_count(),
            "built compatibility graph"
        );
        merger
    }

    fn insert_group(&mut self, consensus: AlignedRead, members: Vec<AlignedRead>) -> GroupId {
        let id = self.next_id;
        self.next_id += 1;
        self.groups.insert(
            id,
            HaplotypeGroup {
                id,
                consensus,
                members,
            },
        );
        self.adjacency.insert(id, BTreeMap::new());
        id
    }

    fn connect_all_pairs(&mut self) {
        let nodes: Vec<&HaplotypeGroup> = self.groups.values().collect();
        let mut edges = Vec::new();
        for (i, a) in nodes.iter().enumerate() {
            for b in &nodes[i + 1..] {
                if let Some(weight) =
                    compatibility(&a.consensus, a.size(), &b.consensus, b.size()).weight()
                {
                    edges.push((a.id, b.id, weight));
                }
            }
        }
        for (a, b, weight) in edges {
            self.link(a, b, weight);
        }
    }

    fn link(&mut self, a: GroupId, b: GroupId, weight: u64) {
        self.adjacency.entry(a).or_default().insert(b, weight);
        self.adjacency.entry(b).or_default().insert(a, weight);
    }

    /// Number of live groups.
    pub fn node_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of live compatibility edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(BTreeMap::len).sum::<usize>() / 2
    }

    /// Total member reads across live groups.
    pub fn read_count(&self) -> usize {
        self.read_count
    }

    /// Live group with the given id.
    pub fn group(&self, id: GroupId) -> Option<&HaplotypeGroup> {
        self.groups.get(&id)
    }

    /// Weight of the edge between two live groups.
    pub fn edge_weight(&self, a: GroupId, b: GroupId) -> Option<u64> {
        self.adjacency.get(&a).and_then(|neighbours| neighbours.get(&b)).copied()
    }

    /// Heaviest edge as `(low, high, weight)`; the lowest id pair wins ties.
    pub fn best_edge(&self) -> Option<(GroupId, GroupId, u64)> {
        self.adjacency
            .iter()
            .flat_map(|(&low, neighbours)| {
                neighbours
                    .range(low + 1..)
                    .map(move |(&high, &weight)| (low, high, weight))
            })
            .max_by_key(|&(low, high, weight)| (weight, Reverse(low), Reverse(high)))
    }

    /// Contract the heaviest edge. Returns `None` once the graph has no edges.
    pub fn merge_step(&mut self) -> Option<MergeRecord> {
        let (low, high, weight) = self.best_edge()?;

        let low_neighbours = self.detach(low);
        let high_neighbours = self.detach(high);
        let low_group = self.groups.remove(&low)?;
        let high_group = self.groups.remove(&high)?;

        let consensus = combine(&low_group.consensus, &high_group.consensus);
        let mut members = low_group.members;
        members.extend(high_group.members);
        let merged = self.insert_group(consensus, members);

        for (&neighbour, &low_weight) in &low_neighbours {
            if let Some(&high_weight) = high_neighbours.get(&neighbour) {
                self.link(merged, neighbour, low_weight + high_weight);
            }
        }

        trace!(
            low,
            high,
            weight,
            merged,
            degree = self.adjacency.get(&merged).map_or(0, BTreeMap::len),
            "merged haplotype groups"
        );
        Some(MergeRecord {
            low,
            high,
            weight,
            merged,
        })
    }

    /// Remove `id` from the graph, returning its former neighbours (without
    /// the edge to any already-detached node).
    fn detach(&mut self, id: GroupId) -> BTreeMap<GroupId, u64> {
        let neighbours = self.adjacency.remove(&id).unwrap_or_default();
        for neighbour in neighbours.keys() {
            if let Some(back) = self.adjacency.get_mut(neighbour) {
                back.remove(&id);
            }
        }
        neighbours
    }

    /// Merge until no edges remain and return the surviving groups, largest
    /// first (equal sizes keep ascending id order).
    pub fn run(mut self) -> Vec<HaplotypeGroup> {
        let initial_nodes = self.node_count();
        let mut merges = 0usize;
        while self.merge_step().is_some() {
            merges += 1;
        }
        debug_assert!(merges < initial_nodes.max(1));
        debug_assert_eq!(
            self.groups.values().map(HaplotypeGroup::size).sum::<usize>(),
            self.read_count
        );
        debug!(
            merges,
            groups = self.node_count(),
            "greedy merging finished"
        );

        let mut groups: Vec<HaplotypeGroup> = self.groups.into_values().collect();
        groups.sort_by_key(|group| Reverse(group.size()));
        groups
    }
}

/// Cluster aligned reads into haplotype groups, largest first.
pub fn merge_haplotypes(reads: Vec<AlignedRead>) -> Vec<HaplotypeGroup> {
    GreedyMerger::from_reads(reads).run()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reads(raw: &[&str]) -> Vec<AlignedRead> {
        raw.iter().map(|&r| AlignedRead::from(r)).collect()
    }

    #[test]
    fn duplicates_collapse_into_one_node() {
        let merger = GreedyMerger::from_reads(reads(&["ACGT", "ACGT", "ACGT"]));
        assert_eq!(merger.node_count(), 1);
        assert_eq!(merger.edge_count(), 0);
        assert_eq!(merger.group(0).map(HaplotypeGroup::size), Some(3));
    }

    #[test]
    fn conflicting_nodes_are_never_joined() {
        let merger = GreedyMerger::from_reads(reads(&["AACC", "AAGC"]));
        assert_eq!(merger.edge_count(), 0);
        let groups = merger.run();
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn initial_weights_scale_by_sizes() {
        let merger = GreedyMerger::from_reads(reads(&["AAC.", "AAC.", ".ACG"]));
        // Shared columns 1 and 2, sizes 2 + 1.
        assert_eq!(merger.edge_weight(0, 1), Some(6));
        assert_eq!(merger.edge_weight(1, 0), Some(6));
    }

    #[test]
    fn heaviest_edge_merges_first_with_lowest_pair_on_ties() {
        // No two nodes share a called column, so every edge weighs zero.
        let mut merger = GreedyMerger::from_reads(reads(&["A...", ".A..", "..A.", "A..."]));
        assert_eq!(merger.node_count(), 3);
        assert_eq!(merger.best_edge(), Some((0, 1, 0)));

        let record = merger.merge_step().unwrap();
        assert_eq!(
            record,
            MergeRecord {
                low: 0,
                high: 1,
                weight: 0,
                merged: 3
            }
        );
        let merged = merger.group(3).unwrap();
        assert_eq!(merged.consensus.to_string(), "AA..");
        assert_eq!(merged.size(), 3);
    }

    #[test]
    fn merged_edges_sum_replaced_weights() {
        let mut merger = GreedyMerger::from_reads(reads(&["ACG.", "ACG.", "AC..", ".CGT"]));
        // Node 0 = "ACG." x2, node 1 = "AC..", node 2 = ".CGT".
        assert_eq!(merger.edge_weight(0, 1), Some(2 * 3));
        assert_eq!(merger.edge_weight(0, 2), Some(2 * 3));
        assert_eq!(merger.edge_weight(1, 2), Some(2));

        let record = merger.merge_step().unwrap();
        assert_eq!((record.low, record.high, record.merged), (0, 1, 3));
        assert_eq!(merger.edge_weight(3, 2), Some(6 + 2));
        assert_eq!(merger.edge_weight(0, 2), None);
    }

    #[test]
    fn neighbours_of_only_one_endpoint_are_dropped() {
        // 0 and 1 are compatible; 2 conflicts with 1 but not with 0.
        let mut merger = GreedyMerger::from_reads(reads(&["AC..", "ACG.", "A.T."]));
        assert!(merger.edge_weight(0, 2).is_some());
        assert!(merger.edge_weight(1, 2).is_none());

        merger.merge_step().unwrap();
        assert_eq!(merger.edge_count(), 0);
        let groups = merger.run();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].size(), 2);
    }

    #[test]
    fn run_conserves_reads_and_sorts_by_size() {
        let input = reads(&[
            "ACGT..", "ACGT..", ".CGTA.", "..GTAC", "TTTT..", "TTTT..", "TTTT..", "TTTA..",
        ]);
        let total = input.len();
        let groups = merge_haplotypes(input);
        assert_eq!(groups.iter().map(HaplotypeGroup::size).sum::<usize>(), total);
        assert!(groups.windows(2).all(|pair| pair[0].size() >= pair[1].size()));
    }

    #[test]
    fn empty_input_produces_no_groups() {
        assert!(merge_haplotypes(Vec::new()).is_empty());
    }
}
