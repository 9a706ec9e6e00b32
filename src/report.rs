//! Inspection result model
//!
//! Serialized as-is for the `inspect` and `compare` commands.

use crate::manifest::ArwDiscovery;
use crate::tokenizer::{
    calculate_savings, count_html_lines, count_lines, estimate_html_tokens, estimate_tokens,
    extract_chunk_ids,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Everything learned about one site in one run
#[derive(Debug, Clone, Default, Serialize)]
pub struct InspectionResult {
    pub url: String,
    pub inspected_at: String,
    pub discovery: Option<ArwDiscovery>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_yaml: Option<String>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Machine-view path -> content
    pub machine_views: BTreeMap<String, String>,
    /// Machine-view path -> chunk IDs in document order
    pub chunks: BTreeMap<String, Vec<String>>,
    pub comparisons: BTreeMap<String, ViewComparison>,
    pub used_proxy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovery_info: Option<DiscoveryInfo>,
}

impl InspectionResult {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            inspected_at: chrono::Utc::now().to_rfc3339(),
            ..Default::default()
        }
    }

    /// Totals across every comparison
    pub fn summary(&self) -> Summary {
        let views_compared = self.comparisons.len();
        let machine_tokens: usize = self
            .comparisons
            .values()
            .map(|c| c.machine_view.tokens)
            .sum();
        let html_tokens: usize = self.comparisons.values().map(|c| c.html_view.tokens).sum();
        let savings = calculate_savings(machine_tokens, html_tokens);

        Summary {
            views_declared: self
                .discovery
                .as_ref()
                .map(|d| d.content.iter().filter(|e| e.machine_view.is_some()).count())
                .unwrap_or(0),
            views_fetched: self.machine_views.len(),
            views_compared,
            machine_tokens,
            html_tokens,
            token_percent: savings.percent_saved,
        }
    }
}

/// Aggregate numbers for a one-line report
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub views_declared: usize,
    pub views_fetched: usize,
    pub views_compared: usize,
    pub machine_tokens: usize,
    pub html_tokens: usize,
    pub token_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewComparison {
    pub machine_view: MachineViewStats,
    pub html_view: HtmlViewStats,
    pub savings: Savings,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MachineViewStats {
    pub content: String,
    /// UTF-8 bytes
    pub size: usize,
    pub lines: usize,
    pub chunks: usize,
    pub tokens: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HtmlViewStats {
    pub content: String,
    /// UTF-8 bytes
    pub size: usize,
    /// Non-blank lines after breaking at block tags
    pub lines: usize,
    pub tokens: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Savings {
    pub size_percent: f64,
    pub token_percent: f64,
    pub tokens: i64,
}

/// Compare a machine view against the HTML page it stands in for
pub fn build_comparison(machine_view: &str, html: &str) -> ViewComparison {
    let machine_size = machine_view.len();
    let html_size = html.len();
    let machine_tokens = estimate_tokens(machine_view);
    let html_tokens = estimate_html_tokens(html);
    let tokens = calculate_savings(machine_tokens, html_tokens);

    let size_percent = if html_size > 0 {
        (html_size as f64 - machine_size as f64) * 100.0 / html_size as f64
    } else {
        0.0
    };

    ViewComparison {
        machine_view: MachineViewStats {
            content: machine_view.to_string(),
            size: machine_size,
            lines: count_lines(machine_view),
            chunks: extract_chunk_ids(machine_view).len(),
            tokens: machine_tokens,
        },
        html_view: HtmlViewStats {
            content: html.to_string(),
            size: html_size,
            lines: count_html_lines(html),
            tokens: html_tokens,
        },
        savings: Savings {
            size_percent,
            token_percent: tokens.percent_saved,
            tokens: tokens.absolute_tokens,
        },
    }
}

/// Snapshot of the optional discovery surfaces around the manifest
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiscoveryInfo {
    pub well_known: WellKnownFiles,
    pub ai_headers: AiHeaders,
    pub robots: RobotsInfo,
    pub sitemap: SitemapInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WellKnownFiles {
    pub manifest: WellKnownFile,
    pub content_index: WellKnownFile,
    pub policies: WellKnownFile,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WellKnownFile {
    pub url: String,
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AiHeaders {
    pub found: bool,
    pub headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RobotsInfo {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub has_arw_hints: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SitemapInfo {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub entry_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
