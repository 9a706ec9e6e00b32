//! inspect command: Inspect a site's Agent-Ready Web surface
//!
//! Fetches `/llms.txt`, then every declared machine view alongside its HTML
//! page, and reports size and token savings. Entry and probe failures are
//! collected in the result; only manifest problems stop a run.

use crate::fetch::{Fetcher, HttpTransport, Transport, DEFAULT_PROXY_BASE, DEFAULT_TIMEOUT_MS};
use crate::manifest::{parse_manifest, ContentEntry, MANIFEST_PATH};
use crate::probe::probe_discovery_surface;
use crate::report::{build_comparison, InspectionResult, ViewComparison};
use crate::tokenizer::extract_chunk_ids;
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use futures::future::join_all;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

#[derive(Args)]
pub struct InspectArgs {
    /// Site to inspect (e.g. https://example.com or http://localhost:3000)
    #[arg(value_name = "URL")]
    pub url: String,

    /// Output format
    #[arg(long, short, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Timeout per request in milliseconds
    #[arg(long, env = "ARW_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout: u64,

    /// CORS relay used when a remote site blocks direct requests
    #[arg(long, env = "ARW_PROXY_URL", default_value = DEFAULT_PROXY_BASE)]
    pub proxy_url: String,
}

/// Configuration for an inspection run
pub struct InspectConfig {
    pub timeout_ms: u64,
    pub proxy_url: String,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            proxy_url: DEFAULT_PROXY_BASE.to_string(),
        }
    }
}

/// Run the inspect command
pub async fn run_inspect(args: InspectArgs) -> Result<()> {
    let config = InspectConfig {
        timeout_ms: args.timeout,
        proxy_url: args.proxy_url,
    };

    eprintln!("Inspecting {}...", args.url);

    let inspector = Inspector::from_config(&config)?;
    let result = inspector.inspect(&args.url).await;

    let output = match args.format {
        OutputFormat::Yaml => serde_yaml::to_string(&result)?,
        OutputFormat::Json => serde_json::to_string_pretty(&result)?,
    };
    println!("{}", output);

    let summary = result.summary();
    eprintln!(
        "Done: {}/{} views compared, {} -> {} tokens ({:.1}% saved), {} warnings, {} errors{}",
        summary.views_compared,
        summary.views_declared,
        summary.html_tokens,
        summary.machine_tokens,
        summary.token_percent,
        result.warnings.len(),
        result.errors.len(),
        if result.used_proxy { " [via proxy]" } else { "" }
    );

    if !result.errors.is_empty() {
        for error in &result.errors {
            eprintln!("error: {}", error);
        }
        std::process::exit(1);
    }

    Ok(())
}

/// Strip exactly one trailing slash
pub fn normalize_base_url(url: &str) -> &str {
    url.strip_suffix('/').unwrap_or(url)
}

/// Absolute URLs pass through; paths are joined to `base_url`
pub fn resolve_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else if path.starts_with('/') {
        format!("{base_url}{path}")
    } else {
        format!("{base_url}/{path}")
    }
}

/// What one content entry's pipeline produced
#[derive(Debug)]
enum EntryOutcome {
    Compared {
        path: String,
        content: String,
        chunks: Vec<String>,
        comparison: ViewComparison,
        used_proxy: bool,
    },
    /// Machine view fetched, HTML comparison not possible
    ViewOnly {
        path: String,
        content: String,
        chunks: Vec<String>,
        warning: String,
        used_proxy: bool,
    },
    Failed {
        warning: String,
        used_proxy: bool,
    },
}

pub struct Inspector<T = HttpTransport> {
    fetcher: Fetcher<T>,
}

impl Inspector<HttpTransport> {
    pub fn from_config(config: &InspectConfig) -> Result<Self> {
        let transport = HttpTransport::new(Duration::from_millis(config.timeout_ms))
            .context("Failed to build HTTP client")?;
        Ok(Self::new(
            Fetcher::new(transport).with_proxy_base(config.proxy_url.clone()),
        ))
    }
}

impl<T: Transport> Inspector<T> {
    pub fn new(fetcher: Fetcher<T>) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &Fetcher<T> {
        &self.fetcher
    }

    /// Inspect one site. Never fails: problems land in `errors`/`warnings`.
    #[instrument(skip(self))]
    pub async fn inspect(&self, target_url: &str) -> InspectionResult {
        let base_url = normalize_base_url(target_url);
        let mut result = InspectionResult::new(base_url);
        let manifest_url = format!("{base_url}{MANIFEST_PATH}");

        if !self.fetcher.test_cors(&manifest_url).await {
            warn!("CORS probe failed for {}", manifest_url);
            result.warnings.push(format!(
                "CORS check failed for {manifest_url}; remote requests may go through the proxy"
            ));
        }

        let manifest = match self.fetcher.fetch(&manifest_url).await {
            Ok(fetched) => fetched,
            Err(err) => {
                result.errors.push(format!("Failed to fetch llms.txt: {err}"));
                return result;
            }
        };
        result.used_proxy |= manifest.used_proxy;

        if !manifest.response.is_success() {
            result.errors.push(format!(
                "Failed to fetch llms.txt: HTTP {}",
                manifest.response.status
            ));
            return result;
        }

        result.raw_yaml = Some(manifest.response.body.clone());

        let parsed = match parse_manifest(&manifest.response.body) {
            Ok(parsed) => parsed,
            Err(err) => {
                result.errors.push(err.to_string());
                return result;
            }
        };
        result.warnings.extend(parsed.warnings);
        let discovery = parsed.discovery;

        info!(
            "Manifest for {} declares {} content entries",
            discovery.site,
            discovery.content.len()
        );

        let entries = join_all(discovery.content.iter().filter_map(|entry| {
            entry
                .machine_view
                .as_deref()
                .map(move |path| self.inspect_entry(base_url, entry, path))
        }));
        let probes = probe_discovery_surface(&self.fetcher, base_url, &manifest.response.headers);

        let (outcomes, (discovery_info, probes_used_proxy)) = futures::join!(entries, probes);

        for outcome in outcomes {
            match outcome {
                EntryOutcome::Compared {
                    path,
                    content,
                    chunks,
                    comparison,
                    used_proxy,
                } => {
                    result.used_proxy |= used_proxy;
                    result.machine_views.insert(path.clone(), content);
                    result.chunks.insert(path.clone(), chunks);
                    result.comparisons.insert(path, comparison);
                }
                EntryOutcome::ViewOnly {
                    path,
                    content,
                    chunks,
                    warning,
                    used_proxy,
                } => {
                    result.used_proxy |= used_proxy;
                    result.machine_views.insert(path.clone(), content);
                    result.chunks.insert(path, chunks);
                    result.warnings.push(warning);
                }
                EntryOutcome::Failed {
                    warning,
                    used_proxy,
                } => {
                    result.used_proxy |= used_proxy;
                    result.warnings.push(warning);
                }
            }
        }

        result.used_proxy |= probes_used_proxy;
        result.discovery_info = Some(discovery_info);
        result.discovery = Some(discovery);
        result
    }

    async fn inspect_entry(&self, base_url: &str, entry: &ContentEntry, path: &str) -> EntryOutcome {
        let view_url = resolve_url(base_url, path);
        debug!("Fetching machine view {}", view_url);

        let view = self.fetcher.fetch_text(&view_url).await;
        let mut used_proxy = view.used_proxy;
        let content = match view.text {
            Ok(content) => content,
            Err(reason) => {
                return EntryOutcome::Failed {
                    warning: format!("Failed to fetch machine view {path}: {reason}"),
                    used_proxy,
                }
            }
        };
        let chunks = extract_chunk_ids(&content);

        let Some(page) = entry.url.as_deref() else {
            return EntryOutcome::ViewOnly {
                path: path.to_string(),
                content,
                chunks,
                warning: format!("Content entry for {path} has no url; skipping HTML comparison"),
                used_proxy,
            };
        };

        let html_url = resolve_url(base_url, page);
        debug!("Fetching HTML {}", html_url);

        let html = self.fetcher.fetch_text(&html_url).await;
        used_proxy |= html.used_proxy;
        match html.text {
            Ok(html) => EntryOutcome::Compared {
                path: path.to_string(),
                comparison: build_comparison(&content, &html),
                content,
                chunks,
                used_proxy,
            },
            Err(reason) => EntryOutcome::ViewOnly {
                path: path.to_string(),
                content,
                chunks,
                warning: format!("Failed to fetch HTML for {path} ({html_url}): {reason}"),
                used_proxy,
            },
        }
    }
}
