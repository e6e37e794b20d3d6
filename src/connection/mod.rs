//! A connection to one cluster node.
//!
//! [`Connection`] resolves host, port and scheme (including Elastic Cloud
//! ids), assembles default headers, compresses request bodies, logs every
//! exchange and turns error statuses into [`ApiError`]s. The bytes
//! themselves go through a [`Transport`].

mod auth;
mod cloud_id;
mod trace;
mod transport;

pub use auth::ApiKey;
pub use cloud_id::CloudId;
pub use trace::{curl_command, pretty_json, RequestLogger, LOG_TARGET, TRACE_TARGET};
pub use transport::{
    HttpRequest, HttpResponse, Method, ReqwestTransport, Transport, TransportFailure,
};

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::Value;

use crate::config::ConnectionConfig;
use crate::error::{ApiError, Error, Result};

const DEFAULT_PORT: u16 = 9200;

pub fn default_user_agent() -> String {
    format!("elastic-client-rs/{} (Rust)", env!("CARGO_PKG_VERSION"))
}

/// Per-request overrides.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Merged over the connection's headers (names are lower-cased).
    pub headers: BTreeMap<String, String>,
    pub timeout: Option<Duration>,
    /// Statuses returned as responses instead of errors.
    pub ignore: Vec<u16>,
}

pub struct Connection {
    hostname: String,
    port: Option<u16>,
    host: String,
    url_prefix: String,
    use_ssl: bool,
    http_compress: bool,
    timeout: Duration,
    headers: BTreeMap<String, String>,
    transport: Arc<dyn Transport>,
    logger: RequestLogger,
}

impl Connection {
    /// Connect with the default `reqwest` transport.
    pub fn from_config(config: &ConnectionConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(Duration::from_secs(10))?;
        Self::new(config, Arc::new(transport))
    }

    pub fn new(config: &ConnectionConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let mut hostname = config.host.clone();
        let mut port = config.port;
        let mut use_ssl = config.use_ssl;
        let mut http_compress = config.http_compress;

        if let Some(cloud_id) = config.cloud_id.as_deref() {
            let cloud = CloudId::parse(cloud_id)?;
            hostname = cloud.host;
            if port.is_none() {
                port = cloud.port;
            }
            use_ssl = true;
            if http_compress.is_none() {
                http_compress = Some(true);
            }
        } else if port.is_none() {
            // cloud ids fall back to the https default (443) instead
            port = Some(DEFAULT_PORT);
        }

        let mut headers: BTreeMap<String, String> = config
            .headers
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.clone()))
            .collect();
        headers
            .entry("content-type".to_string())
            .or_insert_with(|| "application/json".to_string());
        headers
            .entry("user-agent".to_string())
            .or_insert_with(default_user_agent);
        if let Some(api_key) = &config.api_key {
            headers.insert("authorization".to_string(), api_key.header_value());
        }
        let http_compress = http_compress.unwrap_or(false);
        if http_compress {
            headers.insert("accept-encoding".to_string(), "gzip,deflate".to_string());
        }

        let mut scheme = config.scheme.as_str();
        if use_ssl || scheme == "https" {
            scheme = "https";
            use_ssl = true;
        }

        let mut host = format!("{scheme}://{hostname}");
        if let Some(port) = port {
            host.push_str(&format!(":{port}"));
        }

        let url_prefix = match config.url_prefix.trim_matches('/') {
            "" => String::new(),
            p => format!("/{p}"),
        };

        let timeout = Duration::try_from_secs_f64(config.timeout_secs)
            .ok()
            .filter(|t| !t.is_zero())
            .ok_or_else(|| {
                Error::ImproperlyConfigured(format!(
                    "timeout must be a positive number of seconds, got {}",
                    config.timeout_secs
                ))
            })?;

        Ok(Self {
            hostname,
            port,
            host,
            logger: RequestLogger::new(url_prefix.clone()),
            url_prefix,
            use_ssl,
            http_compress,
            timeout,
            headers,
            transport,
        })
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// `scheme://host[:port]`
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    pub fn use_ssl(&self) -> bool {
        self.use_ssl
    }

    pub fn http_compress(&self) -> bool {
        self.http_compress
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Send one request. `url` is the path plus query string, without the
    /// url prefix; `body` is already serialized.
    pub async fn perform_request(
        &self,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
        options: &RequestOptions,
    ) -> Result<HttpResponse> {
        let path = format!("{}{}", self.url_prefix, url);
        let full_url = format!("{}{}", self.host, path);

        let mut headers = self.headers.clone();
        for (k, v) in &options.headers {
            headers.insert(k.to_ascii_lowercase(), v.clone());
        }

        let wire_body = match &body {
            Some(b) if self.http_compress && !b.is_empty() => {
                headers.insert("content-encoding".to_string(), "gzip".to_string());
                Some(gzip_compress(b)?)
            }
            other => other.clone(),
        };

        let request = HttpRequest {
            method,
            url: full_url.clone(),
            headers,
            body: wire_body,
            timeout: options.timeout.unwrap_or(self.timeout),
        };

        let start = Instant::now();
        let response = match self.transport.send(request).await {
            Ok(r) => r,
            Err(failure) => {
                self.logger.log_request_fail(
                    method,
                    &full_url,
                    &path,
                    body.as_deref(),
                    start.elapsed(),
                    None,
                    None,
                    Some(&failure as &dyn fmt::Display),
                );
                return Err(failure.into());
            }
        };
        let duration = start.elapsed();
        let raw = String::from_utf8_lossy(&response.body).into_owned();

        if !(200..300).contains(&response.status) && !options.ignore.contains(&response.status) {
            self.logger.log_request_fail(
                method,
                &full_url,
                &path,
                body.as_deref(),
                duration,
                Some(response.status),
                Some(&raw),
                None,
            );
            return Err(error_from_response(response.status, &raw));
        }

        self.logger.log_request_success(
            method,
            &full_url,
            &path,
            body.as_deref(),
            response.status,
            &raw,
            duration,
        );
        Ok(response)
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Connection: {}>", self.host)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("host", &self.host)
            .field("url_prefix", &self.url_prefix)
            .field("http_compress", &self.http_compress)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

pub fn gzip_compress(body: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(body)
        .and_then(|_| encoder.finish())
        .map_err(|e| Error::Connection(format!("Failed to compress request body: {e}")))
}

/// Build the error for a non-2xx response. The message is the server's
/// `error.type` (or `error` string) when the body is JSON, the raw body
/// otherwise.
pub fn error_from_response(status: u16, raw: &str) -> Error {
    let mut message = raw.to_string();
    let mut info = None;

    if !raw.is_empty() {
        match serde_json::from_str::<Value>(raw) {
            Ok(decoded) => {
                match decoded.get("error") {
                    Some(Value::String(s)) => message = s.clone(),
                    Some(Value::Object(obj)) => {
                        message = match obj.get("type") {
                            Some(Value::String(t)) => t.clone(),
                            Some(other) => other.to_string(),
                            None => Value::Object(obj.clone()).to_string(),
                        }
                    }
                    Some(other) => message = other.to_string(),
                    None => {}
                }
                info = Some(decoded);
            }
            Err(err) => {
                tracing::warn!(target: LOG_TARGET, "Undecodable raw error response from server: {err}");
            }
        }
    }

    ApiError::new(status, message, info).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiErrorKind;
    use async_trait::async_trait;
    use base64::Engine;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        status: u16,
        body: Vec<u8>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    #[async_trait]
    impl Transport for Recorder {
        async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportFailure> {
            self.seen.lock().push(request);
            Ok(HttpResponse {
                status: self.status,
                headers: BTreeMap::new(),
                body: self.body.clone(),
            })
        }
    }

    struct Unreachable;

    #[async_trait]
    impl Transport for Unreachable {
        async fn send(&self, _request: HttpRequest) -> std::result::Result<HttpResponse, TransportFailure> {
            Err(TransportFailure::Timeout("timed out after 10s".into()))
        }
    }

    fn conn(config: ConnectionConfig) -> Connection {
        Connection::new(&config, Arc::new(Recorder::default())).unwrap()
    }

    #[test]
    fn test_default_host_and_headers() {
        let c = conn(ConnectionConfig::default());
        assert_eq!(c.host(), "http://localhost:9200");
        assert_eq!(c.headers()["content-type"], "application/json");
        assert!(c.headers()["user-agent"].starts_with("elastic-client-rs/"));
        assert!(!c.headers().contains_key("accept-encoding"));
        assert!(!c.headers().contains_key("authorization"));
        assert_eq!(c.to_string(), "<Connection: http://localhost:9200>");
    }

    #[test]
    fn test_api_key_tuple_header() {
        let c = conn(ConnectionConfig {
            api_key: Some(ApiKey::from(("id", "key"))),
            ..Default::default()
        });
        let expected = format!(
            "ApiKey {}",
            base64::engine::general_purpose::STANDARD.encode("id:key")
        );
        assert_eq!(c.headers()["authorization"], expected);
    }

    #[test]
    fn test_user_headers_are_lowercased_and_override_defaults() {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/x-ndjson".to_string());
        headers.insert("X-Opaque-Id".to_string(), "abc".to_string());
        let c = conn(ConnectionConfig {
            headers,
            ..Default::default()
        });
        assert_eq!(c.headers()["content-type"], "application/x-ndjson");
        assert_eq!(c.headers()["x-opaque-id"], "abc");
    }

    #[test]
    fn test_cloud_id_resolution() {
        let encoded = base64::engine::general_purpose::STANDARD
            .encode("westeurope.azure.elastic-cloud.com:9243$abc$def");
        let c = conn(ConnectionConfig {
            cloud_id: Some(format!("deployment:{encoded}")),
            ..Default::default()
        });
        assert_eq!(c.hostname(), "abc.westeurope.azure.elastic-cloud.com");
        assert_eq!(c.port(), Some(9243));
        assert_eq!(c.host(), "https://abc.westeurope.azure.elastic-cloud.com:9243");
        assert!(c.use_ssl());
        assert!(c.http_compress());
        assert_eq!(c.headers()["accept-encoding"], "gzip,deflate");
    }

    #[test]
    fn test_cloud_id_without_port_uses_https_default() {
        let encoded = base64::engine::general_purpose::STANDARD.encode("example.com$abc$def");
        let c = conn(ConnectionConfig {
            cloud_id: Some(format!("d:{encoded}")),
            http_compress: Some(false),
            ..Default::default()
        });
        assert_eq!(c.host(), "https://abc.example.com");
        assert_eq!(c.port(), None);
        assert!(!c.http_compress());
    }

    #[test]
    fn test_explicit_port_beats_cloud_port() {
        let encoded = base64::engine::general_purpose::STANDARD.encode("example.com:9243$abc$def");
        let c = conn(ConnectionConfig {
            cloud_id: Some(format!("d:{encoded}")),
            port: Some(9400),
            ..Default::default()
        });
        assert_eq!(c.host(), "https://abc.example.com:9400");
    }

    #[test]
    fn test_malformed_cloud_id_is_config_error() {
        let err = Connection::new(
            &ConnectionConfig {
                cloud_id: Some("garbage".into()),
                ..Default::default()
            },
            Arc::new(Recorder::default()),
        )
        .unwrap_err();
        assert!(matches!(err, Error::ImproperlyConfigured(_)));
    }

    #[test]
    fn test_timeout_out_of_range_is_config_error() {
        for timeout_secs in [0.0, -1.0, f64::NAN, f64::INFINITY, 1e20] {
            let err = Connection::new(
                &ConnectionConfig {
                    timeout_secs,
                    ..Default::default()
                },
                Arc::new(Recorder::default()),
            )
            .unwrap_err();
            assert!(
                matches!(err, Error::ImproperlyConfigured(_)),
                "timeout {timeout_secs} gave {err:?}"
            );
        }

        let c = conn(ConnectionConfig {
            timeout_secs: 2.5,
            ..Default::default()
        });
        assert_eq!(c.timeout(), Duration::from_millis(2500));
    }

    #[test]
    fn test_https_scheme_and_url_prefix() {
        let c = conn(ConnectionConfig {
            host: "es.internal".into(),
            port: Some(443),
            scheme: "https".into(),
            url_prefix: "/proxy/es/".into(),
            ..Default::default()
        });
        assert_eq!(c.host(), "https://es.internal:443");
        assert_eq!(c.url_prefix(), "/proxy/es");
        assert!(c.use_ssl());
    }

    #[test]
    fn test_error_from_response_uses_error_type() {
        let raw = r#"{"error":{"type":"index_not_found_exception","reason":"no such index"},"status":404}"#;
        match error_from_response(404, raw) {
            Error::Api(e) => {
                assert_eq!(e.kind, ApiErrorKind::NotFound);
                assert_eq!(e.message, "index_not_found_exception");
                assert_eq!(e.info.unwrap()["status"], 404);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_error_from_response_string_error_and_raw_body() {
        match error_from_response(400, r#"{"error":"bad things"}"#) {
            Error::Api(e) => {
                assert_eq!(e.kind, ApiErrorKind::BadRequest);
                assert_eq!(e.message, "bad things");
            }
            other => panic!("unexpected {other:?}"),
        }
        match error_from_response(502, "<html>Bad Gateway</html>") {
            Error::Api(e) => {
                assert_eq!(e.kind, ApiErrorKind::Transport);
                assert_eq!(e.message, "<html>Bad Gateway</html>");
                assert!(e.info.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_perform_request_builds_full_url_and_compresses() {
        let transport = Arc::new(Recorder {
            status: 200,
            body: b"{}".to_vec(),
            ..Default::default()
        });
        let c = Connection::new(
            &ConnectionConfig {
                url_prefix: "prefix".into(),
                http_compress: Some(true),
                ..Default::default()
            },
            transport.clone(),
        )
        .unwrap();

        let resp = c
            .perform_request(
                Method::Post,
                "/idx/_search?size=1",
                Some(b"{\"query\":{}}".to_vec()),
                &RequestOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status, 200);

        let seen = transport.seen.lock();
        let req = &seen[0];
        assert_eq!(req.url, "http://localhost:9200/prefix/idx/_search?size=1");
        assert_eq!(req.headers["content-encoding"], "gzip");
        let body = req.body.as_ref().unwrap();
        assert_eq!(&body[..2], &[0x1f, 0x8b]);
        assert_eq!(req.timeout, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_perform_request_maps_status_to_error() {
        let transport = Arc::new(Recorder {
            status: 409,
            body: br#"{"error":{"type":"version_conflict_engine_exception"}}"#.to_vec(),
            ..Default::default()
        });
        let c = Connection::new(&ConnectionConfig::default(), transport).unwrap();
        let err = c
            .perform_request(Method::Put, "/idx/_doc/1", None, &RequestOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_api(ApiErrorKind::Conflict));
    }

    #[tokio::test]
    async fn test_ignored_status_is_returned() {
        let transport = Arc::new(Recorder {
            status: 404,
            ..Default::default()
        });
        let c = Connection::new(&ConnectionConfig::default(), transport).unwrap();
        let resp = c
            .perform_request(
                Method::Head,
                "/missing",
                None,
                &RequestOptions {
                    ignore: vec![404],
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(resp.status, 404);
    }

    #[tokio::test]
    async fn test_transport_failure_surfaces_as_timeout() {
        let c = Connection::new(&ConnectionConfig::default(), Arc::new(Unreachable)).unwrap();
        let err = c
            .perform_request(Method::Get, "/", None, &RequestOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ConnectionTimeout(_)));
    }
}
