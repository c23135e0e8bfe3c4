//! Query handlers sitting between the dataset configuration and the
//! haplotype engine.
//!
//! Each handler validates the pattern up front, resolves datasets through the
//! [`QueryConfig`] it is handed, and reports one result per dataset.

mod allele;
mod compare;
mod counts;
mod path;

pub use allele::{allele_query, extract_haplotypes, run_allele_query, AlleleOutcome};
pub use compare::{center_out_cmp, compare_query, run_compare_query, CompareOutcome, ComparedRead};
pub use counts::{
    count_queries, parse_query_list, run_batch_query, run_mass_query, StrandCounts,
    StrandSelection,
};
pub use path::{extend_path, run_path_query, PathExtension, PathStop};

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::config::{ConfigError, DatasetLocation, QueryConfig};
use crate::genomics::{
    load_index, AlignError, AlphabetError, IndexError, MemoryIndex, SequenceIndex,
};

/// Errors surfaced to the caller of a query handler.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Pattern or query term contains a symbol outside the index alphabet.
    #[error(transparent)]
    Alphabet(#[from] AlphabetError),

    /// Dataset could not be loaded.
    #[error(transparent)]
    Index(#[from] IndexError),

    /// Recovered rows could not be placed in the anchor frame.
    #[error(transparent)]
    Align(#[from] AlignError),

    /// Dataset id or limits were invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Request named no datasets.
    #[error("no datasets selected")]
    NoDatasets,

    /// JSON list of datasets or queries could not be decoded.
    #[error("invalid JSON list: {0}")]
    Json(#[from] serde_json::Error),
}

/// Headline figures for a loaded dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    /// Stored strings.
    pub string_count: usize,
    /// Stored symbols, terminators included.
    pub total_size: usize,
}

impl DatasetSummary {
    /// Summarize `index`.
    pub fn of<I: SequenceIndex + ?Sized>(index: &I) -> Self {
        Self {
            string_count: index.string_count(),
            total_size: index.total_size(),
        }
    }
}

/// Outcome of a handler for one dataset.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetReport<O> {
    /// Dataset id as requested.
    pub dataset: String,
    /// Label of the owning group.
    pub group: String,
    /// Dataset name within the group.
    pub name: String,
    /// Size figures of the dataset.
    pub summary: DatasetSummary,
    /// Handler-specific result.
    pub outcome: O,
}

/// Resolve and load every requested dataset in turn, handing each index to
/// `handler`. Stops at the first failure.
pub(crate) fn for_each_dataset<O, F>(
    config: &QueryConfig,
    datasets: &[String],
    mut handler: F,
) -> Result<Vec<DatasetReport<O>>, QueryError>
where
    F: FnMut(&MemoryIndex, &DatasetLocation) -> Result<O, QueryError>,
{
    if datasets.is_empty() {
        return Err(QueryError::NoDatasets);
    }
    config.validate()?;

    let mut reports = Vec::with_capacity(datasets.len());
    for dataset in datasets {
        let location = config.resolve(dataset)?;
        let index = load_index(&location.directory)?;
        let summary = DatasetSummary::of(&index);
        info!(
            dataset = %location.id,
            strings = summary.string_count,
            symbols = summary.total_size,
            "loaded dataset"
        );
        let outcome = handler(&index, &location)?;
        reports.push(DatasetReport {
            dataset: location.id,
            group: location.group_label,
            name: location.name,
            summary,
            outcome,
        });
    }
    Ok(reports)
}
