//! HTTP fetching with CORS-proxy fallback
//!
//! Direct requests first. A remote target whose direct request fails with a
//! CORS-class failure is retried once through a public relay
//! (`api.allorigins.win` by default). Local targets are never relayed.

use crate::error::{FailureKind, FetchError, TransportError};
use async_trait::async_trait;
use reqwest::Client;
use std::net::Ipv4Addr;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Relay used when a remote site refuses direct cross-origin requests
pub const DEFAULT_PROXY_BASE: &str = "https://api.allorigins.win/raw";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Head,
}

/// A completed HTTP exchange, whatever the status
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    /// Header name/value pairs in the order received
    pub headers: Vec<(String, String)>,
    /// Empty for HEAD requests
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into an `Http` failure
    pub fn error_for_status(self) -> Result<Self, TransportError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(TransportError::new(
                FailureKind::Http,
                format!("HTTP {}", self.status),
            ))
        }
    }
}

/// The single I/O primitive the inspector needs
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, method: Method, url: &str) -> Result<HttpResponse, TransportError>;
}

/// reqwest-backed transport
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("arw-inspect/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, method: Method, url: &str) -> Result<HttpResponse, TransportError> {
        let request = match method {
            Method::Get => self.client.get(url),
            Method::Head => self.client.head(url),
        };

        let response = request.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let body = match method {
            Method::Head => String::new(),
            Method::Get => response.text().await.map_err(classify)?,
        };

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Connection-level refusals are what a browser reports as a failed
/// cross-origin fetch; only those are worth relaying.
fn classify(err: reqwest::Error) -> TransportError {
    let kind = if err.is_timeout() {
        FailureKind::Network
    } else if err.is_connect() || err.is_request() || err.is_redirect() {
        FailureKind::Cors
    } else {
        FailureKind::Network
    };
    TransportError::new(kind, err.to_string())
}

/// Per-call options
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOptions {
    pub method: Method,
    /// Skip the direct attempt and go through the relay
    pub use_proxy: bool,
}

/// Response plus whether the relay was needed to get it
#[derive(Debug, Clone)]
pub struct Fetched {
    pub response: HttpResponse,
    pub used_proxy: bool,
}

/// Body of a 2xx GET or a printable reason, plus the relay flag
#[derive(Debug, Clone)]
pub struct TextFetch {
    pub text: Result<String, String>,
    pub used_proxy: bool,
}

/// True for loopback, `.local`, and private IPv4 hosts.
/// Unparseable URLs are treated as remote.
pub fn is_local_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };

    if matches!(host, "localhost" | "127.0.0.1" | "[::1]") || host.ends_with(".local") {
        return true;
    }

    host.parse::<Ipv4Addr>()
        .map(|ip| ip.is_private())
        .unwrap_or(false)
}

pub struct Fetcher<T = HttpTransport> {
    transport: T,
    proxy_base: String,
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            proxy_base: DEFAULT_PROXY_BASE.to_string(),
        }
    }

    /// Use a different relay exposing the same `?url=<target>` contract
    pub fn with_proxy_base(mut self, proxy_base: impl Into<String>) -> Self {
        self.proxy_base = proxy_base.into();
        self
    }

    /// GET with default options
    pub async fn fetch(&self, url: &str) -> Result<Fetched, FetchError> {
        self.fetch_with_cors(url, FetchOptions::default()).await
    }

    /// Fetch `url`, falling back to the relay once on a CORS-class failure
    /// of a remote target.
    pub async fn fetch_with_cors(
        &self,
        url: &str,
        options: FetchOptions,
    ) -> Result<Fetched, FetchError> {
        let local = is_local_url(url);

        if local && options.use_proxy {
            return Err(FetchError::ProxyForLocal(url.to_string()));
        }

        if options.use_proxy {
            return self.fetch_via_proxy(url, options.method).await;
        }

        match self.transport.send(options.method, url).await {
            Ok(response) => Ok(Fetched {
                response,
                used_proxy: false,
            }),
            Err(err) if local => Err(FetchError::LocalUnreachable {
                url: url.to_string(),
                detail: err.to_string(),
            }),
            Err(err) if err.kind == FailureKind::Cors => {
                warn!("Direct fetch of {} failed ({}), retrying via proxy", url, err.detail);
                self.fetch_via_proxy(url, options.method).await
            }
            Err(err) => Err(FetchError::Transport(err)),
        }
    }

    async fn fetch_via_proxy(&self, url: &str, method: Method) -> Result<Fetched, FetchError> {
        if url.is_empty() || !url.starts_with("http") {
            return Err(FetchError::InvalidProxyTarget(url.to_string()));
        }

        let proxy_url =
            Url::parse_with_params(&self.proxy_base, &[("url", url)]).map_err(|e| {
                FetchError::Proxy {
                    url: url.to_string(),
                    detail: format!("bad proxy base '{}': {}", self.proxy_base, e),
                }
            })?;

        debug!("Proxy fetch: {}", proxy_url);

        let response = self
            .transport
            .send(method, proxy_url.as_str())
            .await
            .map_err(|e| FetchError::Proxy {
                url: url.to_string(),
                detail: e.to_string(),
            })?;

        Ok(Fetched {
            response,
            used_proxy: true,
        })
    }

    /// GET a body that must come back 2xx, flattening every failure to a message
    pub async fn fetch_text(&self, url: &str) -> TextFetch {
        match self.fetch(url).await {
            Ok(fetched) => {
                let used_proxy = fetched.used_proxy;
                let text = fetched
                    .response
                    .error_for_status()
                    .map(|r| r.body)
                    .map_err(|e| e.detail);
                TextFetch { text, used_proxy }
            }
            Err(err) => TextFetch {
                text: Err(err.to_string()),
                used_proxy: false,
            },
        }
    }

    /// Advisory probe: does a direct HEAD succeed? Never errors.
    pub async fn test_cors(&self, url: &str) -> bool {
        match self.transport.send(Method::Head, url).await {
            Ok(response) => response.is_success(),
            Err(err) => {
                debug!("CORS probe of {} failed: {}", url, err);
                false
            }
        }
    }
}
