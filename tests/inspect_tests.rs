//! End-to-end inspection against mock sites

use arw_inspect::{Fetcher, HttpTransport, InspectConfig, Inspector};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn inspector() -> Inspector {
    Inspector::from_config(&InspectConfig {
        timeout_ms: 5_000,
        ..Default::default()
    })
    .unwrap()
}

async fn serve(server: &MockServer, route: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_site_only_manifest() {
    let server = MockServer::start().await;
    serve(&server, "/llms.txt", 200, "site: example.com").await;

    let result = inspector().inspect(&server.uri()).await;

    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let discovery = result.discovery.as_ref().unwrap();
    assert_eq!(discovery.site, "example.com");
    assert!(result.machine_views.is_empty());
    assert!(result.comparisons.is_empty());
    assert!(result.warnings.iter().any(|w| w.contains("version")));
    assert_eq!(result.raw_yaml.as_deref(), Some("site: example.com"));
    assert!(!result.used_proxy);
}

#[tokio::test]
async fn test_trailing_slash_stripped_once() {
    let server = MockServer::start().await;
    serve(&server, "/llms.txt", 200, "version: '1.0'\nsite: example.com").await;

    let result = inspector().inspect(&format!("{}/", server.uri())).await;

    assert_eq!(result.url, server.uri());
    assert!(result.errors.is_empty(), "{:?}", result.errors);
}

#[tokio::test]
async fn test_missing_site_stops_before_content() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/llms.txt",
        200,
        "version: '1.0'\ncontent:\n  - url: /\n    machine_view: /index.llm.md\n",
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/index.llm.md"))
        .respond_with(ResponseTemplate::new(200).set_body_string("# Home"))
        .expect(0)
        .mount(&server)
        .await;

    let result = inspector().inspect(&server.uri()).await;

    assert_eq!(result.errors, vec!["Missing required field: site".to_string()]);
    assert!(result.discovery.is_none());
    assert!(result.machine_views.is_empty());
    assert!(result.comparisons.is_empty());
    assert!(result.discovery_info.is_none());
}

#[tokio::test]
async fn test_manifest_not_found_is_terminal() {
    let server = MockServer::start().await;

    let result = inspector().inspect(&server.uri()).await;

    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("HTTP 404"));
    assert!(result.discovery.is_none());
    assert!(result.raw_yaml.is_none());
}

#[tokio::test]
async fn test_invalid_yaml_is_terminal() {
    let server = MockServer::start().await;
    serve(&server, "/llms.txt", 200, "site: [unclosed").await;

    let result = inspector().inspect(&server.uri()).await;

    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("Failed to parse llms.txt as YAML"));
    assert!(result.discovery.is_none());
    assert!(result.raw_yaml.is_some());
}

#[tokio::test]
async fn test_one_failed_entry_does_not_affect_others() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/llms.txt",
        200,
        r#"version: "1.0"
site: example.com
content:
  - url: /
    machine_view: /index.llm.md
  - url: /pricing
    machine_view: /pricing.llm.md
  - url: /about
    machine_view: /about.llm.md
"#,
    )
    .await;
    serve(
        &server,
        "/index.llm.md",
        200,
        "# Home\n<!-- chunk: hero -->\nWelcome\n<!-- chunk: features -->\nFeatures",
    )
    .await;
    serve(&server, "/pricing.llm.md", 404, "").await;
    serve(&server, "/about.llm.md", 200, "# About\n<!-- chunk: team -->").await;
    serve(
        &server,
        "/",
        200,
        "<html><head><script>var a = 1;</script></head><body><h1>Home</h1><p>Welcome</p><p>Features</p></body></html>",
    )
    .await;
    serve(
        &server,
        "/about",
        200,
        "<html><body><div><h1>About</h1><p>Our team</p></div></body></html>",
    )
    .await;

    let result = inspector().inspect(&server.uri()).await;

    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert_eq!(result.machine_views.len(), 2);
    assert_eq!(result.comparisons.len(), 2);
    assert!(result.machine_views.contains_key("/index.llm.md"));
    assert!(result.machine_views.contains_key("/about.llm.md"));
    assert!(!result.chunks.contains_key("/pricing.llm.md"));
    assert_eq!(result.chunks["/index.llm.md"], vec!["hero", "features"]);
    assert_eq!(result.chunks["/about.llm.md"], vec!["team"]);

    let failed: Vec<_> = result
        .warnings
        .iter()
        .filter(|w| w.contains("/pricing.llm.md"))
        .collect();
    assert_eq!(failed.len(), 1);
    assert!(failed[0].contains("HTTP 404"));

    let home = &result.comparisons["/index.llm.md"];
    assert_eq!(home.machine_view.chunks, 2);
    assert!(home.html_view.size > home.machine_view.size);
    assert!(home.html_view.lines > 1);

    let summary = result.summary();
    assert_eq!(summary.views_declared, 3);
    assert_eq!(summary.views_fetched, 2);
    assert_eq!(summary.views_compared, 2);
}

#[tokio::test]
async fn test_html_failure_keeps_machine_view() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/llms.txt",
        200,
        "version: 1\nsite: example.com\ncontent:\n  - url: /gone\n    machine_view: /gone.llm.md\n",
    )
    .await;
    serve(&server, "/gone.llm.md", 200, "<!-- chunk: x -->").await;

    let result = inspector().inspect(&server.uri()).await;

    assert!(result.errors.is_empty());
    assert_eq!(result.chunks["/gone.llm.md"], vec!["x"]);
    assert!(result.comparisons.is_empty());
    assert!(result
        .warnings
        .iter()
        .any(|w| w.contains("Failed to fetch HTML for /gone.llm.md")));
}

#[tokio::test]
async fn test_discovery_surface() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/llms.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("AI-Usage-Policy", "summaries-ok")
                .set_body_string("version: '1.0'\nsite: example.com"),
        )
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/llms.txt"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    serve(
        &server,
        "/.well-known/arw-policies.json",
        200,
        r#"{"training":"disallow"}"#,
    )
    .await;
    serve(&server, "/robots.txt", 200, "User-agent: *\n# agent-ready: /llms.txt\n").await;
    serve(
        &server,
        "/sitemap.xml",
        200,
        "<urlset><url><loc>/</loc></url><url><loc>/a</loc></url><url><loc>/b</loc></url></urlset>",
    )
    .await;

    let result = inspector().inspect(&server.uri()).await;

    assert!(result.errors.is_empty());
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);

    let info = result.discovery_info.unwrap();
    assert!(info.ai_headers.found);
    assert_eq!(info.ai_headers.headers["ai-usage-policy"], "summaries-ok");
    assert!(info.well_known.policies.exists);
    assert_eq!(
        info.well_known.policies.content.as_deref(),
        Some(r#"{"training":"disallow"}"#)
    );
    assert!(!info.well_known.manifest.exists);
    assert!(info.well_known.manifest.error.is_some());
    assert!(!info.well_known.content_index.exists);
    assert!(info.robots.has_arw_hints);
    assert_eq!(info.sitemap.entry_count, 3);
}

#[tokio::test]
async fn test_local_server_down() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let transport = HttpTransport::new(Duration::from_secs(2)).unwrap();
    let inspector = Inspector::new(Fetcher::new(transport));

    let result = inspector.inspect(&format!("http://127.0.0.1:{}", port)).await;

    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("not running"));
    assert!(!result.used_proxy);
}
