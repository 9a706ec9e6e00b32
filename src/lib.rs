//! arw-inspect: Agent-Ready Web inspection
//!
//! Commands:
//! - inspect: Fetch llms.txt and compare machine views against HTML
//! - check-cors: Probe whether a URL answers direct requests
//! - compare: Compare a local machine view against a local HTML file

pub mod check_cors;
pub mod compare;
pub mod error;
pub mod fetch;
pub mod inspect;
pub mod manifest;
pub mod probe;
pub mod report;
pub mod tokenizer;

pub use error::{FailureKind, FetchError, ManifestError, TransportError};
pub use fetch::{
    is_local_url, FetchOptions, Fetched, Fetcher, HttpResponse, HttpTransport, Method, Transport,
};
pub use inspect::{InspectConfig, Inspector};
pub use manifest::{parse_manifest, ArwDiscovery, ContentEntry};
pub use report::{build_comparison, DiscoveryInfo, InspectionResult, ViewComparison};
pub use tokenizer::{
    calculate_savings, estimate_html_tokens, estimate_tokens, extract_chunk_ids,
    strip_html_to_text,
};
