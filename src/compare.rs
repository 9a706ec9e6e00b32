//! compare command: Compare a local machine view against a local HTML file
//!
//! Same metrics as `inspect`, no network.

use crate::report::{build_comparison, ViewComparison};
use crate::tokenizer::extract_chunk_ids;
use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tokio::fs;

#[derive(Args)]
pub struct CompareArgs {
    /// Machine view file (e.g. page.llm.md)
    #[arg(value_name = "MACHINE_VIEW")]
    pub machine_view: PathBuf,

    /// HTML file the machine view stands in for
    #[arg(value_name = "HTML")]
    pub html: PathBuf,

    /// Omit file contents from the output
    #[arg(long)]
    pub brief: bool,
}

#[derive(Debug, Serialize)]
pub struct CompareOutput {
    pub machine_view_file: String,
    pub html_file: String,
    pub chunks: Vec<String>,
    pub comparison: ViewComparison,
}

pub async fn run_compare(args: CompareArgs) -> Result<()> {
    let machine_view = fs::read_to_string(&args.machine_view)
        .await
        .with_context(|| format!("Failed to read file: {}", args.machine_view.display()))?;
    let html = fs::read_to_string(&args.html)
        .await
        .with_context(|| format!("Failed to read file: {}", args.html.display()))?;

    let output = compare(&args, &machine_view, &html);
    println!("{}", serde_json::to_string_pretty(&output)?);

    eprintln!(
        "Done: {} -> {} tokens ({:.1}% saved)",
        output.comparison.html_view.tokens,
        output.comparison.machine_view.tokens,
        output.comparison.savings.token_percent
    );

    Ok(())
}

fn compare(args: &CompareArgs, machine_view: &str, html: &str) -> CompareOutput {
    let mut comparison = build_comparison(machine_view, html);
    if args.brief {
        comparison.machine_view.content.clear();
        comparison.html_view.content.clear();
    }

    CompareOutput {
        machine_view_file: args.machine_view.display().to_string(),
        html_file: args.html.display().to_string(),
        chunks: extract_chunk_ids(machine_view),
        comparison,
    }
}
