//! Output formatters

pub mod json;
pub mod terminal;

use crate::app::OutputFormat;
use tutorloop_core::db::RankedRecord;
use tutorloop_core::{KnowledgeStats, PipelineOutcome, RecordInfo};

/// Knowledge base summary shown by `kb status`
pub struct StatusReport<'a> {
    pub db_path: &'a std::path::Path,
    pub stats: &'a KnowledgeStats,
    pub embedding_models: &'a [(String, usize)],
}

pub fn format_outcome(outcome: &PipelineOutcome, format: OutputFormat, verbose: bool) -> String {
    match format {
        OutputFormat::Json => json::format_outcome(outcome),
        OutputFormat::Cli => terminal::format_outcome(outcome, verbose),
    }
}

pub fn format_ranked(results: &[RankedRecord], threshold: f64, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_ranked(results, threshold),
        OutputFormat::Cli => terminal::format_ranked(results, threshold),
    }
}

pub fn format_records(records: &[RecordInfo], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::to_pretty(&records),
        OutputFormat::Cli => terminal::format_records(records),
    }
}

pub fn format_record(record: &RecordInfo, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::to_pretty(record),
        OutputFormat::Cli => terminal::format_record(record),
    }
}

pub fn format_status(report: &StatusReport<'_>, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_status(report),
        OutputFormat::Cli => terminal::format_status(report),
    }
}
