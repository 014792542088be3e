//! Knowledge base commands

use super::open_store;
use crate::app::{KbAction, KbArgs, OutputFormat};
use crate::output::{self, StatusReport};
use anyhow::Result;
use tutorloop_core::Config;

pub async fn run(args: KbArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let store = open_store(config)?;

    match args.action {
        KbAction::Status => {
            let stats = store.stats().await?;
            let models = store.embedding_models().await?;
            let db_path = config.knowledge.resolved_db_path();
            let report = StatusReport {
                db_path: &db_path,
                stats: &stats,
                embedding_models: &models,
            };
            print!("{}", output::format_status(&report, format));
        }

        KbAction::Seed => {
            let written = store.seed().await?;
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::json!({ "seeded": written }));
                }
                OutputFormat::Cli if written == 0 => {
                    println!("Knowledge base already has records, nothing seeded");
                }
                OutputFormat::Cli => println!("Seeded {} records", written),
            }
        }

        KbAction::Search {
            query,
            limit,
            threshold,
        } => {
            let query = query.join(" ");
            let threshold = threshold.unwrap_or(config.knowledge.threshold);
            let results = store.nearest(&query, limit).await?;
            print!("{}", output::format_ranked(&results, threshold, format));
        }

        KbAction::List { limit, offset } => {
            let records = store.list(limit, offset).await?;
            print!("{}", output::format_records(&records, format));
        }

        KbAction::Get { id } => {
            let record = store.get(&id).await?;
            print!("{}", output::format_record(&record, format));
        }
    }

    Ok(())
}
