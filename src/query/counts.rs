use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use tracing::debug;

use crate::config::QueryConfig;
use crate::genomics::{normalize_pattern, reverse_complement, SequenceIndex};
use crate::query::{for_each_dataset, QueryError};

/// Which strands to count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrandSelection {
    /// Count the query as given.
    pub forward: bool,
    /// Count its reverse complement.
    pub reverse: bool,
}

impl StrandSelection {
    /// Both strands.
    pub const BOTH: Self = Self {
        forward: true,
        reverse: true,
    };
    /// Forward strand only.
    pub const FORWARD: Self = Self {
        forward: true,
        reverse: false,
    };
    /// Reverse-complement strand only.
    pub const REVERSE: Self = Self {
        forward: false,
        reverse: true,
    };
}

impl Default for StrandSelection {
    fn default() -> Self {
        Self::BOTH
    }
}

/// Per-query occurrence counts. A strand that was not selected has an empty
/// list. Serializes as `[[forward...], [reverse...]]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrandCounts {
    /// Counts of each query as given.
    pub forward: Vec<usize>,
    /// Counts of each query's reverse complement.
    pub reverse: Vec<usize>,
}

impl Serialize for StrandCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.forward, &self.reverse).serialize(serializer)
    }
}

/// Decode a JSON array of strings.
pub fn parse_query_list(json: &str) -> Result<Vec<String>, QueryError> {
    Ok(serde_json::from_str(json)?)
}

/// Count every query on the selected strands. All terms are validated before
/// any counting happens.
pub fn count_queries<I: SequenceIndex + ?Sized>(
    index: &I,
    queries: &[String],
    strands: StrandSelection,
) -> Result<StrandCounts, QueryError> {
    let terms = queries
        .iter()
        .map(|query| normalize_pattern(query))
        .collect::<Result<Vec<_>, _>>()?;

    let mut counts = StrandCounts::default();
    if strands.forward {
        counts.forward = terms.iter().map(|term| index.count_occurrences(term)).collect();
    }
    if strands.reverse {
        counts.reverse = terms
            .iter()
            .map(|term| -> Result<usize, QueryError> {
                Ok(index.count_occurrences(&reverse_complement(term)?))
            })
            .collect::<Result<_, _>>()?;
    }
    debug!(queries = terms.len(), "counted query terms");
    Ok(counts)
}

/// Count a JSON list of queries against one dataset and return the JSON
/// `[[forward...], [reverse...]]` reply.
pub fn run_mass_query(
    config: &QueryConfig,
    dataset: &str,
    queries_json: &str,
    strands: StrandSelection,
) -> Result<String, QueryError> {
    let queries = parse_query_list(queries_json)?;
    let mut reports = for_each_dataset(config, &[dataset.to_string()], |index, _| {
        count_queries(index, &queries, strands)
    })?;
    let counts = reports.pop().map(|report| report.outcome).unwrap_or_default();
    Ok(serde_json::to_string(&counts)?)
}

/// Count a JSON list of queries against a JSON list of datasets and return a
/// JSON object keyed by dataset id.
pub fn run_batch_query(
    config: &QueryConfig,
    datasets_json: &str,
    queries_json: &str,
    strands: StrandSelection,
) -> Result<String, QueryError> {
    let datasets = parse_query_list(datasets_json)?;
    let queries = parse_query_list(queries_json)?;
    let reports = for_each_dataset(config, &datasets, |index, _| {
        count_queries(index, &queries, strands)
    })?;
    let by_dataset: BTreeMap<String, StrandCounts> = reports
        .into_iter()
        .map(|report| (report.dataset, report.outcome))
        .collect();
    Ok(serde_json::to_string(&by_dataset)?)
}
