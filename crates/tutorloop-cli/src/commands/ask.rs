//! Ask command

use super::open_store;
use crate::app::{AskArgs, OutputFormat};
use crate::output;
use anyhow::Result;
use tutorloop_core::{Config, QueryOrchestrator};

pub async fn run(
    args: AskArgs,
    config: &Config,
    format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let question = args.question.join(" ");

    let store = open_store(config)?;
    let orchestrator = QueryOrchestrator::with_store(config, store)?;
    let outcome = orchestrator.run(&question).await?;

    print!("{}", output::format_outcome(&outcome, format, verbose));
    Ok(())
}
