use crate::genomics::alphabet::{BaseCode, BASE_COUNT, NO_DATA};
use crate::genomics::AlignedRead;

/// Vote tally for a single column of aligned reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnTally {
    /// Case-insensitive votes per base [A, C, G, T].
    pub counts: [u32; BASE_COUNT],
    /// Subset of `counts` cast with an uppercase (anchor) letter.
    pub uppercase: [u32; BASE_COUNT],
}

impl ColumnTally {
    pub(crate) fn observe(&mut self, symbol: u8) {
        if let Some(base) = BaseCode::from_ascii(symbol) {
            self.counts[base.index()] += 1;
            if symbol.is_ascii_uppercase() {
                self.uppercase[base.index()] += 1;
            }
        }
    }

    /// Total called votes in the column.
    pub fn depth(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Majority base, ties going to the earliest base in A < C < G < T.
    /// `None` when the column holds no calls.
    pub fn winner(&self) -> Option<BaseCode> {
        let mut best: Option<BaseCode> = None;
        for base in BaseCode::ALL {
            let count = self.counts[base.index()];
            if count == 0 {
                continue;
            }
            match best {
                Some(current) if self.counts[current.index()] >= count => {}
                _ => best = Some(base),
            }
        }
        best
    }

    /// Symbol emitted for the column: the winner, uppercase when any of its
    /// votes came from an anchor position, otherwise `.`.
    pub fn call(&self) -> u8 {
        match self.winner() {
            Some(base) if self.uppercase[base.index()] > 0 => base.to_upper(),
            Some(base) => base.to_lower(),
            None => NO_DATA,
        }
    }

    /// Called votes that disagree with the winner.
    pub fn disagreements(&self) -> u32 {
        match self.winner() {
            Some(base) => self.depth() - self.counts[base.index()],
            None => 0,
        }
    }
}

/// Column-wise majority vote over a set of reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Consensus {
    /// Voted sequence, same width as the inputs.
    pub sequence: AlignedRead,
    /// Per-column count of votes disagreeing with the chosen symbol.
    pub disagreements: Vec<u32>,
}

impl Consensus {
    /// Columns where at least one read disagreed with the majority.
    pub fn contested_columns(&self) -> impl Iterator<Item = usize> + '_ {
        self.disagreements
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(column, _)| column)
    }
}

/// Tally every column of `reads`.
///
/// # Panics
///
/// Panics when the reads do not all share the same width; aligned reads of
/// one query always do.
pub fn tally_columns(reads: &[AlignedRead]) -> Vec<ColumnTally> {
    let width = reads.first().map(AlignedRead::len).unwrap_or(0);
    let mut columns = vec![ColumnTally::default(); width];
    for read in reads {
        assert_eq!(
            read.len(),
            width,
            "aligned reads of one query must share a width"
        );
        for (tally, &symbol) in columns.iter_mut().zip(read.as_bytes()) {
            tally.observe(symbol);
        }
    }
    columns
}

/// Build the majority-vote consensus of `reads`. An empty input yields an
/// empty consensus.
///
/// # Panics
///
/// Panics when the reads do not all share the same width.
pub fn build_consensus(reads: &[AlignedRead]) -> Consensus {
    let columns = tally_columns(reads);
    let sequence: Vec<u8> = columns.iter().map(ColumnTally::call).collect();
    let disagreements = columns.iter().map(ColumnTally::disagreements).collect();
    Consensus {
        sequence: AlignedRead::new(sequence),
        disagreements,
    }
}
