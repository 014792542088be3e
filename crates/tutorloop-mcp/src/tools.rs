//! MCP tool definitions and handlers

use crate::protocol::*;
use anyhow::{anyhow, Result};
use serde_json::Value;
use tutorloop_core::{KnowledgeStore, QueryOrchestrator};

const DEFAULT_SEARCH_LIMIT: usize = 5;

pub fn ask_question_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "ask_question".to_string(),
        description: "Answer a math question step by step, using the knowledge base first \
                      and web search as a fallback"
            .to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "question": {
                    "type": "string",
                    "description": "The math question to answer"
                }
            },
            "required": ["question"]
        }),
    }
}

pub fn kb_search_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "kb_search".to_string(),
        description: "Find stored questions closest to a query by embedding similarity"
            .to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Question to look up"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum results (default: 5)",
                    "default": DEFAULT_SEARCH_LIMIT
                },
                "threshold": {
                    "type": "number",
                    "description": "Maximum cosine distance counted as a hit"
                }
            },
            "required": ["query"]
        }),
    }
}

pub fn kb_status_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "kb_status".to_string(),
        description: "Show knowledge base record counts by category and source".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {}
        }),
    }
}

fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow!("Missing required argument: {}", key))
}

pub async fn handle_ask_question(
    orchestrator: &QueryOrchestrator,
    args: Value,
) -> Result<ToolResult> {
    let question = required_str(&args, "question")?;
    let outcome = orchestrator.run(question).await?;

    Ok(ToolResult::text(
        outcome.answer.clone(),
        serde_json::to_value(&outcome)?,
    ))
}

pub async fn handle_kb_search(
    store: &KnowledgeStore,
    args: Value,
    default_threshold: f64,
) -> Result<ToolResult> {
    let query = required_str(&args, "query")?;
    let limit = args
        .get("limit")
        .and_then(|v| v.as_u64())
        .map(|v| v as usize)
        .unwrap_or(DEFAULT_SEARCH_LIMIT);
    let threshold = args
        .get("threshold")
        .and_then(|v| v.as_f64())
        .unwrap_or(default_threshold);

    let ranked = store.nearest(query, limit).await?;

    let mut summary = format!("Found {} records for '{}'", ranked.len(), query);
    let results: Vec<Value> = ranked
        .iter()
        .map(|r| {
            let distance = r.distance();
            let hit = distance < threshold;
            summary.push_str(&format!(
                "\n  {:.3} {} {} [{}]",
                r.similarity,
                if hit { "*" } else { " " },
                r.record.question,
                r.record.id
            ));
            serde_json::json!({
                "id": r.record.id,
                "question": r.record.question,
                "answer": r.record.answer,
                "category": r.record.category,
                "source": r.record.source,
                "similarity": r.similarity,
                "distance": distance,
                "hit": hit,
            })
        })
        .collect();

    Ok(ToolResult::text(
        summary,
        serde_json::json!({ "results": results, "threshold": threshold }),
    ))
}

pub async fn handle_kb_status(store: &KnowledgeStore) -> Result<ToolResult> {
    let stats = store.stats().await?;

    let mut summary = format!(
        "Knowledge base: {} records ({} corrected)",
        stats.record_count, stats.corrected_count
    );
    summary.push_str("\n\nCategories:");
    for (category, count) in &stats.by_category {
        summary.push_str(&format!("\n  - {}: {}", category, count));
    }
    summary.push_str("\n\nSources:");
    for (source, count) in &stats.by_source {
        summary.push_str(&format!("\n  - {}: {}", source, count));
    }

    Ok(ToolResult::text(summary, serde_json::to_value(&stats)?))
}
