//! Optional discovery surfaces around llms.txt
//!
//! `.well-known/arw-*` files, robots.txt, sitemap.xml, and `AI-*` response
//! headers. Absence is normal, so failures are recorded on the probe's own
//! record and never reported as warnings.

use crate::fetch::{Fetcher, Transport};
use crate::report::{AiHeaders, DiscoveryInfo, RobotsInfo, SitemapInfo, WellKnownFile, WellKnownFiles};
use std::collections::BTreeMap;
use tracing::debug;

pub const WELL_KNOWN_MANIFEST: &str = "/.well-known/arw-manifest.json";
pub const WELL_KNOWN_CONTENT_INDEX: &str = "/.well-known/arw-content-index.json";
pub const WELL_KNOWN_POLICIES: &str = "/.well-known/arw-policies.json";
pub const ROBOTS_PATH: &str = "/robots.txt";
pub const SITEMAP_PATH: &str = "/sitemap.xml";

/// Collect every header whose name starts with `ai-`, any case
pub fn scan_ai_headers(headers: &[(String, String)]) -> AiHeaders {
    let headers: BTreeMap<String, String> = headers
        .iter()
        .filter(|(name, _)| name.to_ascii_lowercase().starts_with("ai-"))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    AiHeaders {
        found: !headers.is_empty(),
        headers,
    }
}

/// robots.txt mentions llms.txt, the ARW well-known path, or "agent-ready"
pub fn has_arw_hints(robots: &str) -> bool {
    robots.contains("llms.txt")
        || robots.contains("/.well-known/arw")
        || robots.to_lowercase().contains("agent-ready")
}

/// Number of literal `<url>` tags. Not an XML parse.
pub fn count_sitemap_entries(xml: &str) -> usize {
    xml.matches("<url>").count()
}

async fn probe_file<T: Transport>(fetcher: &Fetcher<T>, url: String) -> (WellKnownFile, bool) {
    let fetched = fetcher.fetch_text(&url).await;
    let file = match fetched.text {
        Ok(content) => WellKnownFile {
            url,
            exists: true,
            content: Some(content),
            error: None,
        },
        Err(error) => {
            debug!("Probe {} failed: {}", url, error);
            WellKnownFile {
                url,
                exists: false,
                content: None,
                error: Some(error),
            }
        }
    };
    (file, fetched.used_proxy)
}

/// Fetch the three `.well-known/arw-*.json` files concurrently
pub async fn probe_well_known<T: Transport>(
    fetcher: &Fetcher<T>,
    base_url: &str,
) -> (WellKnownFiles, bool) {
    let ((manifest, p1), (content_index, p2), (policies, p3)) = futures::join!(
        probe_file(fetcher, format!("{base_url}{WELL_KNOWN_MANIFEST}")),
        probe_file(fetcher, format!("{base_url}{WELL_KNOWN_CONTENT_INDEX}")),
        probe_file(fetcher, format!("{base_url}{WELL_KNOWN_POLICIES}")),
    );

    (
        WellKnownFiles {
            manifest,
            content_index,
            policies,
        },
        p1 || p2 || p3,
    )
}

pub async fn probe_robots<T: Transport>(fetcher: &Fetcher<T>, base_url: &str) -> (RobotsInfo, bool) {
    let (file, used_proxy) = probe_file(fetcher, format!("{base_url}{ROBOTS_PATH}")).await;
    let has_arw_hints = file.content.as_deref().map(has_arw_hints).unwrap_or(false);

    (
        RobotsInfo {
            exists: file.exists,
            content: file.content,
            has_arw_hints,
            error: file.error,
        },
        used_proxy,
    )
}

pub async fn probe_sitemap<T: Transport>(
    fetcher: &Fetcher<T>,
    base_url: &str,
) -> (SitemapInfo, bool) {
    let (file, used_proxy) = probe_file(fetcher, format!("{base_url}{SITEMAP_PATH}")).await;
    let entry_count = file.content.as_deref().map(count_sitemap_entries).unwrap_or(0);

    (
        SitemapInfo {
            exists: file.exists,
            content: file.content,
            entry_count,
            error: file.error,
        },
        used_proxy,
    )
}

/// Run every probe concurrently. `manifest_headers` are the llms.txt response headers.
pub async fn probe_discovery_surface<T: Transport>(
    fetcher: &Fetcher<T>,
    base_url: &str,
    manifest_headers: &[(String, String)],
) -> (DiscoveryInfo, bool) {
    let ai_headers = scan_ai_headers(manifest_headers);

    let ((well_known, p1), (robots, p2), (sitemap, p3)) = futures::join!(
        probe_well_known(fetcher, base_url),
        probe_robots(fetcher, base_url),
        probe_sitemap(fetcher, base_url),
    );

    (
        DiscoveryInfo {
            well_known,
            ai_headers,
            robots,
            sitemap,
        },
        p1 || p2 || p3,
    )
}
