//! JSON output formatter

use super::StatusReport;
use serde::Serialize;
use tutorloop_core::db::RankedRecord;
use tutorloop_core::PipelineOutcome;

pub fn to_pretty<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string()) + "\n"
}

pub fn format_outcome(outcome: &PipelineOutcome) -> String {
    to_pretty(outcome)
}

pub fn format_ranked(results: &[RankedRecord], threshold: f64) -> String {
    let output: Vec<serde_json::Value> = results
        .iter()
        .map(|r| {
            let distance = r.distance();
            serde_json::json!({
                "id": r.record.id,
                "question": r.record.question,
                "category": r.record.category,
                "source": r.record.source,
                "similarity": r.similarity,
                "distance": distance,
                "hit": distance < threshold,
            })
        })
        .collect();

    to_pretty(&output)
}

pub fn format_status(report: &StatusReport<'_>) -> String {
    let models: Vec<serde_json::Value> = report
        .embedding_models
        .iter()
        .map(|(model, count)| serde_json::json!({ "model": model, "count": count }))
        .collect();

    to_pretty(&serde_json::json!({
        "database": report.db_path.display().to_string(),
        "record_count": report.stats.record_count,
        "corrected_count": report.stats.corrected_count,
        "by_category": report.stats.by_category,
        "by_source": report.stats.by_source,
        "embedding_models": models,
    }))
}
