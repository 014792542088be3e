//! Terminal output formatter

use super::StatusReport;
use tutorloop_core::db::RankedRecord;
use tutorloop_core::{PipelineOutcome, RecordInfo};

const PREVIEW_LINES: usize = 5;

pub fn format_outcome(outcome: &PipelineOutcome, verbose: bool) -> String {
    let mut output = String::new();
    output.push_str(outcome.answer.trim_end());
    output.push('\n');

    if verbose {
        output.push('\n');
        if let Some(provenance) = outcome.provenance {
            output.push_str(&format!("Source:      {}\n", provenance));
        }
        output.push_str(&format!("Disposition: {:?}\n", outcome.disposition));
        if let Some(ref review) = outcome.review {
            output.push_str(&format!(
                "Review:      accuracy {}/10, clarity {}/10 ({})\n",
                review.accuracy, review.clarity, review.reason
            ));
        }
        if let Some(ref id) = outcome.record_id {
            output.push_str(&format!("Stored as:   #{}\n", id));
        }
    }

    output
}

pub fn format_ranked(results: &[RankedRecord], threshold: f64) -> String {
    if results.is_empty() {
        return "No records found\n".to_string();
    }

    let mut output = String::new();
    for result in results {
        let score_pct = (result.similarity.max(0.0) * 100.0).round() as u32;
        let marker = if result.distance() < threshold {
            "  (hit)"
        } else {
            ""
        };
        output.push_str(&format!(
            "{:>3}% {} #{}{}\n",
            score_pct, result.record.question, result.record.id, marker
        ));
    }
    output
}

pub fn format_records(records: &[RecordInfo]) -> String {
    let mut output = String::new();
    for record in records {
        output.push_str(&format!(
            "#{}  [{}/{}]  {}\n",
            record.id, record.category, record.source, record.question
        ));
    }
    output
}

pub fn format_record(record: &RecordInfo) -> String {
    let mut output = String::new();
    output.push_str(&format!("Id:          {}\n", record.id));
    output.push_str(&format!("Question:    {}\n", record.question));
    output.push_str(&format!("Category:    {}\n", record.category));
    output.push_str(&format!("Difficulty:  {}\n", record.difficulty));
    if !record.tags.is_empty() {
        output.push_str(&format!("Tags:        {}\n", record.tags.join(", ")));
    }
    output.push_str(&format!("Source:      {}\n", record.source));
    output.push_str(&format!("Created:     {}\n", record.created_at));

    if let Some(ref correction) = record.correction {
        output.push_str(&format!(
            "Corrected:   accuracy {}/10, clarity {}/10 ({})\n",
            correction.accuracy_score, correction.clarity_score, correction.correction_reason
        ));
    }

    output.push_str("\nAnswer:\n");
    let lines: Vec<&str> = record.answer.lines().collect();
    for line in lines.iter().take(PREVIEW_LINES) {
        output.push_str(&format!("  {}\n", line));
    }
    if lines.len() > PREVIEW_LINES {
        output.push_str("  ...\n");
    }
    output
}

pub fn format_status(report: &StatusReport<'_>) -> String {
    let stats = report.stats;
    let mut output = String::new();
    output.push_str(&format!("Database:        {}\n", report.db_path.display()));
    output.push_str(&format!("Records:         {}\n", stats.record_count));
    output.push_str(&format!("Corrected:       {}\n", stats.corrected_count));

    output.push_str("\nCategories:\n");
    for (category, count) in &stats.by_category {
        output.push_str(&format!("  {:<15}{}\n", category, count));
    }

    output.push_str("\nSources:\n");
    for (source, count) in &stats.by_source {
        output.push_str(&format!("  {:<20}{}\n", source, count));
    }

    if !report.embedding_models.is_empty() {
        output.push_str("\nEmbeddings:\n");
        for (model, count) in report.embedding_models {
            output.push_str(&format!("  {:<30}{}\n", model, count));
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(answer: &str) -> RecordInfo {
        RecordInfo {
            id: "kb-1".to_string(),
            question: "What is 2 + 2?".to_string(),
            answer: answer.to_string(),
            category: "general".to_string(),
            difficulty: "medium".to_string(),
            tags: vec![],
            source: "seed_corpus".to_string(),
            correction: None,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_long_answers_are_truncated() {
        let answer = (1..=8).map(|i| format!("line {}", i)).collect::<Vec<_>>().join("\n");
        let text = format_record(&record(&answer));
        assert!(text.contains("  line 5\n"));
        assert!(!text.contains("line 6"));
        assert!(text.contains("  ...\n"));
    }

    #[test]
    fn test_ranked_marks_hits() {
        let results = vec![
            RankedRecord {
                record: record("4"),
                similarity: 0.9,
            },
            RankedRecord {
                record: record("4"),
                similarity: 0.2,
            },
        ];
        let text = format_ranked(&results, 0.6);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with(" 90% What is 2 + 2? #kb-1"));
        assert!(lines[0].ends_with("(hit)"));
        assert!(!lines[1].ends_with("(hit)"));
    }
}
