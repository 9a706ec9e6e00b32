//! check-cors command: Probe whether a URL answers direct requests

use crate::fetch::{is_local_url, Fetcher, HttpTransport, DEFAULT_TIMEOUT_MS};
use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::time::Duration;

#[derive(Args)]
pub struct CheckCorsArgs {
    /// URL to probe with a HEAD request
    #[arg(value_name = "URL")]
    pub url: String,

    /// Timeout in milliseconds
    #[arg(long, env = "ARW_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout: u64,
}

#[derive(Debug, Serialize)]
pub struct CorsReport {
    pub url: String,
    pub cors: bool,
    pub local: bool,
}

pub async fn run_check_cors(args: CheckCorsArgs) -> Result<()> {
    let transport = HttpTransport::new(Duration::from_millis(args.timeout))
        .context("Failed to build HTTP client")?;
    let fetcher = Fetcher::new(transport);

    let report = CorsReport {
        cors: fetcher.test_cors(&args.url).await,
        local: is_local_url(&args.url),
        url: args.url,
    };

    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}
