use std::collections::HashMap;

use kmer_haplotyper::genomics::{
    build_consensus, compatibility, merge_haplotypes, overlap, AlignedRead, GreedyMerger,
};
use proptest::prelude::*;

const WIDTH: usize = 8;

fn aligned_read() -> impl Strategy<Value = AlignedRead> {
    proptest::collection::vec(
        prop_oneof![
            Just(b'A'),
            Just(b'C'),
            Just(b'G'),
            Just(b'T'),
            Just(b'a'),
            Just(b'c'),
            Just(b'.'),
            Just(b'.'),
        ],
        WIDTH,
    )
    .prop_map(AlignedRead::new)
}

fn read_set() -> impl Strategy<Value = Vec<AlignedRead>> {
    proptest::collection::vec(aligned_read(), 1..24)
}

proptest! {
    #[test]
    fn compatibility_is_symmetric(
        a in aligned_read(),
        b in aligned_read(),
        size_a in 1usize..10,
        size_b in 1usize..10,
    ) {
        prop_assert_eq!(
            compatibility(&a, size_a, &b, size_b),
            compatibility(&b, size_b, &a, size_a)
        );
    }

    #[test]
    fn merging_conserves_reads(reads in read_set()) {
        let groups = merge_haplotypes(reads.clone());

        let mut members: Vec<AlignedRead> =
            groups.iter().flat_map(|group| group.members.iter().cloned()).collect();
        let mut expected = reads;
        members.sort();
        expected.sort();
        prop_assert_eq!(members, expected);

        prop_assert!(groups.windows(2).all(|pair| pair[0].size() >= pair[1].size()));
        prop_assert!(groups.iter().all(|group| group.consensus.len() == WIDTH));
    }

    #[test]
    fn identical_reads_share_a_group(reads in read_set()) {
        let groups = merge_haplotypes(reads);
        let mut owner: HashMap<AlignedRead, usize> = HashMap::new();
        for group in &groups {
            for member in &group.members {
                let previous = owner.insert(member.clone(), group.id);
                prop_assert!(previous.map_or(true, |id| id == group.id));
            }
        }
    }

    #[test]
    fn merging_terminates_and_never_joins_conflicts(reads in read_set()) {
        let mut merger = GreedyMerger::from_reads(reads);
        let initial = merger.node_count();
        let mut merges = 0;
        while let Some((low, high, _)) = merger.best_edge() {
            let a = &merger.group(low).expect("live endpoint").consensus;
            let b = &merger.group(high).expect("live endpoint").consensus;
            prop_assert_eq!(overlap(a, b).conflicts, 0);

            let record = merger.merge_step().expect("edge available");
            prop_assert_eq!((record.low, record.high), (low, high));
            merges += 1;
        }
        prop_assert!(merges + 1 <= initial);
        prop_assert_eq!(merger.node_count(), initial - merges);
    }

    #[test]
    fn consensus_keeps_width(reads in read_set()) {
        let consensus = build_consensus(&reads);
        prop_assert_eq!(consensus.sequence.len(), WIDTH);
        prop_assert_eq!(consensus.disagreements.len(), WIDTH);
    }
}
