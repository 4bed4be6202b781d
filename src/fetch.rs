//! Resource fetchers used to seed a generation at install time
//!
//! - `HttpFetcher`: pulls resources from a live http(s) origin
//! - `DirFetcher`: reads resources from a local site build directory

use crate::cache::{RequestKey, StoredResponse};
use crate::config::schema::OriginConfig;
use crate::error::{OffcacheError, OffcacheResult};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Source of network responses during seeding
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Retrieve a resource. Non-success statuses are errors.
    async fn fetch(&self, key: &RequestKey) -> OffcacheResult<StoredResponse>;

    /// Description of where resources come from, for display
    fn origin(&self) -> String;
}

/// Create the fetcher configured by `[origin]`
///
/// `source` values starting with `http://` or `https://` select the HTTP
/// fetcher; anything else is treated as a directory path.
pub fn create_fetcher(origin: &OriginConfig) -> Arc<dyn ResourceFetcher> {
    if is_http_url(&origin.source) {
        Arc::new(HttpFetcher::new(origin))
    } else {
        Arc::new(DirFetcher::new(&origin.source))
    }
}

fn is_http_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Fetches resources over HTTP with a blocking `ureq` agent
pub struct HttpFetcher {
    agent: ureq::Agent,
    base: String,
    user_agent: String,
    max_body_bytes: u64,
}

impl HttpFetcher {
    pub fn new(origin: &OriginConfig) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(origin.timeout_secs)))
            .build();

        Self {
            agent: ureq::Agent::new_with_config(config),
            base: origin.source.trim_end_matches('/').to_string(),
            user_agent: origin.user_agent.clone(),
            max_body_bytes: origin.max_body_bytes,
        }
    }

    /// Resolve a manifest key against the origin base URL
    pub fn resolve(&self, resource: &str) -> String {
        if is_http_url(resource) {
            resource.to_string()
        } else if resource.starts_with('/') {
            format!("{}{}", self.base, resource)
        } else {
            format!("{}/{}", self.base, resource)
        }
    }

    fn fetch_blocking(
        agent: &ureq::Agent,
        url: &str,
        user_agent: &str,
        max_body_bytes: u64,
    ) -> OffcacheResult<StoredResponse> {
        // Ask for identity encoding so the stored body matches the stored headers
        let mut response = agent
            .get(url)
            .header("User-Agent", user_agent)
            .header("Accept-Encoding", "identity")
            .call()
            .map_err(|e| match e {
                ureq::Error::StatusCode(status) => OffcacheError::FetchStatus {
                    url: url.to_string(),
                    status,
                },
                other => OffcacheError::fetch(url, other.to_string()),
            })?;

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

        let body = response
            .body_mut()
            .with_config()
            .limit(max_body_bytes)
            .read_to_vec()
            .map_err(|e| OffcacheError::fetch(url, e.to_string()))?;

        Ok(StoredResponse::new(status, headers, body))
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch(&self, key: &RequestKey) -> OffcacheResult<StoredResponse> {
        let url = self.resolve(&key.url);
        let agent = self.agent.clone();
        let user_agent = self.user_agent.clone();
        let max_body_bytes = self.max_body_bytes;

        debug!("Fetching {}", url);
        let response = tokio::task::spawn_blocking(move || {
            Self::fetch_blocking(&agent, &url, &user_agent, max_body_bytes)
        })
        .await
        .map_err(|e| OffcacheError::Internal(format!("fetch task failed: {}", e)))??;

        if !response.is_success() {
            return Err(OffcacheError::FetchStatus {
                url: self.resolve(&key.url),
                status: response.status,
            });
        }
        Ok(response)
    }

    fn origin(&self) -> String {
        self.base.clone()
    }
}

/// Serves resources out of a local site build directory
#[derive(Debug, Clone)]
pub struct DirFetcher {
    root: PathBuf,
}

impl DirFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map a manifest key onto a file below the root
    ///
    /// Scheme and host of absolute URLs are dropped, as are query and
    /// fragment. `/` and trailing-slash paths map to `index.html`.
    pub fn resolve(&self, resource: &str) -> OffcacheResult<PathBuf> {
        let path = match resource.split_once("://") {
            Some((_, rest)) => rest.find('/').map_or("/", |idx| &rest[idx..]),
            None => resource,
        };
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default();

        let mut resolved = self.root.clone();
        for segment in path.split('/') {
            match segment {
                "" | "." => {}
                ".." => return Err(OffcacheError::PathEscape(resource.to_string())),
                s => resolved.push(s),
            }
        }

        if path.is_empty() || path.ends_with('/') {
            resolved.push("index.html");
        }
        Ok(resolved)
    }
}

#[async_trait]
impl ResourceFetcher for DirFetcher {
    async fn fetch(&self, key: &RequestKey) -> OffcacheResult<StoredResponse> {
        let path = self.resolve(&key.url)?;
        debug!("Reading {} for {}", path.display(), key.url);

        let body = match tokio::fs::read(&path).await {
            Ok(body) => body,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(OffcacheError::FetchStatus {
                    url: key.url.clone(),
                    status: 404,
                })
            }
            Err(e) => return Err(OffcacheError::io(format!("reading {}", path.display()), e)),
        };

        let headers = vec![
            ("content-type".to_string(), content_type_for(&path).to_string()),
            ("content-length".to_string(), body.len().to_string()),
        ];
        Ok(StoredResponse::new(200, headers, body))
    }

    fn origin(&self) -> String {
        self.root.display().to_string()
    }
}

/// Guess a content type from a file extension
fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "text/javascript; charset=utf-8",
        Some("json" | "webmanifest") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("txt") => "text/plain; charset=utf-8",
        Some("xml") => "application/xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn origin(source: &str) -> OriginConfig {
        OriginConfig {
            source: source.to_string(),
            ..OriginConfig::default()
        }
    }

    #[test]
    fn http_resolve_joins_base() {
        let fetcher = HttpFetcher::new(&origin("https://example.com/site/"));
        assert_eq!(fetcher.resolve("/"), "https://example.com/site/");
        assert_eq!(fetcher.resolve("/app.css"), "https://example.com/site/app.css");
        assert_eq!(fetcher.resolve("img/a.png"), "https://example.com/site/img/a.png");
        assert_eq!(
            fetcher.resolve("https://cdn.example.com/font.woff2"),
            "https://cdn.example.com/font.woff2"
        );
    }

    #[test]
    fn dir_resolve_maps_index_and_strips_query() {
        let fetcher = DirFetcher::new("/srv/site");
        assert_eq!(fetcher.resolve("/").unwrap(), PathBuf::from("/srv/site/index.html"));
        assert_eq!(
            fetcher.resolve("/blog/").unwrap(),
            PathBuf::from("/srv/site/blog/index.html")
        );
        assert_eq!(
            fetcher.resolve("/app.css?v=3#x").unwrap(),
            PathBuf::from("/srv/site/app.css")
        );
        assert_eq!(
            fetcher.resolve("https://example.com/js/main.js").unwrap(),
            PathBuf::from("/srv/site/js/main.js")
        );
        assert_eq!(
            fetcher.resolve("https://example.com").unwrap(),
            PathBuf::from("/srv/site/index.html")
        );
    }

    #[test]
    fn dir_resolve_rejects_traversal() {
        let fetcher = DirFetcher::new("/srv/site");
        assert!(matches!(
            fetcher.resolve("/../etc/passwd"),
            Err(OffcacheError::PathEscape(_))
        ));
    }

    #[test]
    fn content_types() {
        assert_eq!(content_type_for(Path::new("a/index.HTML")), "text/html; charset=utf-8");
        assert_eq!(content_type_for(Path::new("logo.png")), "image/png");
        assert_eq!(content_type_for(Path::new("blob")), "application/octet-stream");
    }

    #[test]
    fn create_fetcher_picks_backend() {
        assert!(create_fetcher(&origin("http://localhost:8080"))
            .origin()
            .starts_with("http://"));
        assert_eq!(create_fetcher(&origin("/srv/site")).origin(), "/srv/site");
    }

    #[tokio::test]
    async fn dir_fetch_reads_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("index.html"), "<h1>Tax help</h1>").unwrap();
        let fetcher = DirFetcher::new(temp.path());

        let resp = fetcher.fetch(&RequestKey::get("/")).await.unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, b"<h1>Tax help</h1>");
        assert_eq!(resp.header("content-type"), Some("text/html; charset=utf-8"));
        assert_eq!(resp.header("content-length"), Some("17"));
    }

    #[tokio::test]
    async fn dir_fetch_missing_is_404() {
        let temp = TempDir::new().unwrap();
        let fetcher = DirFetcher::new(temp.path());

        let err = fetcher
            .fetch(&RequestKey::get("/missing.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, OffcacheError::FetchStatus { status: 404, .. }));
    }

    /// Local origin served by axum on a random port, shut down on drop
    struct TestOrigin {
        base: String,
        shutdown: Option<tokio::sync::oneshot::Sender<()>>,
    }

    impl TestOrigin {
        async fn start() -> Self {
            use axum::http::{header, HeaderMap, StatusCode};
            use axum::routing::get;

            let router = axum::Router::new()
                .route(
                    "/app.css",
                    get(|| async {
                        (
                            [(header::CONTENT_TYPE, "text/css"), (header::ETAG, "\"a1\"")],
                            "body { margin: 0 }",
                        )
                    }),
                )
                .route("/gone.js", get(|| async { StatusCode::NOT_FOUND }))
                .route("/broken", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
                .route("/large.bin", get(|| async { vec![7u8; 4096] }))
                .route(
                    "/encoding",
                    get(|headers: HeaderMap| async move {
                        headers
                            .get(header::ACCEPT_ENCODING)
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or("none")
                            .to_string()
                    }),
                );

            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let (shutdown, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
            tokio::spawn(async move {
                axum::serve(listener, router)
                    .with_graceful_shutdown(async {
                        shutdown_rx.await.ok();
                    })
                    .await
                    .unwrap();
            });

            Self {
                base: format!("http://{}", addr),
                shutdown: Some(shutdown),
            }
        }

        fn fetcher(&self, max_body_bytes: u64) -> HttpFetcher {
            HttpFetcher::new(&OriginConfig {
                source: self.base.clone(),
                timeout_secs: 5,
                max_body_bytes,
                ..OriginConfig::default()
            })
        }
    }

    impl Drop for TestOrigin {
        fn drop(&mut self) {
            if let Some(shutdown) = self.shutdown.take() {
                let _ = shutdown.send(());
            }
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn http_fetch_keeps_status_headers_and_body() {
        let origin = TestOrigin::start().await;
        let fetcher = origin.fetcher(1024);

        let resp = fetcher.fetch(&RequestKey::get("/app.css")).await.unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, b"body { margin: 0 }");
        assert_eq!(resp.header("content-type"), Some("text/css"));
        assert_eq!(resp.header("etag"), Some("\"a1\""));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn http_fetch_non_success_is_an_error() {
        let origin = TestOrigin::start().await;
        let fetcher = origin.fetcher(1024);

        match fetcher.fetch(&RequestKey::get("/gone.js")).await {
            Err(OffcacheError::FetchStatus { url, status }) => {
                assert_eq!(status, 404);
                assert!(url.ends_with("/gone.js"));
            }
            other => panic!("expected FetchStatus, got {:?}", other),
        }
        assert!(matches!(
            fetcher.fetch(&RequestKey::get("/broken")).await,
            Err(OffcacheError::FetchStatus { status: 503, .. })
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn http_fetch_caps_body_size() {
        let origin = TestOrigin::start().await;

        assert!(matches!(
            origin.fetcher(1024).fetch(&RequestKey::get("/large.bin")).await,
            Err(OffcacheError::Fetch { .. })
        ));
        let resp = origin
            .fetcher(8192)
            .fetch(&RequestKey::get("/large.bin"))
            .await
            .unwrap();
        assert_eq!(resp.body.len(), 4096);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn http_fetch_requests_identity_encoding() {
        let origin = TestOrigin::start().await;

        let resp = origin
            .fetcher(1024)
            .fetch(&RequestKey::get("/encoding"))
            .await
            .unwrap();
        assert_eq!(resp.body, b"identity");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn http_fetch_unreachable_origin_is_fetch_error() {
        let base = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            format!("http://{}", listener.local_addr().unwrap())
        };
        let fetcher = HttpFetcher::new(&OriginConfig {
            source: base,
            timeout_secs: 2,
            ..OriginConfig::default()
        });

        assert!(matches!(
            fetcher.fetch(&RequestKey::get("/")).await,
            Err(OffcacheError::Fetch { .. })
        ));
    }
}
