//! Request logging.
//!
//! Every request is logged under [`LOG_TARGET`]. A second target,
//! [`TRACE_TARGET`], replays requests as copy-pasteable `curl` commands
//! against `localhost:9200`; it is silent unless a subscriber enables it,
//! e.g. `RUST_LOG=elastic_client::trace=debug`.

use std::fmt::Display;
use std::time::Duration;

use tracing::Level;

use super::transport::Method;

pub const LOG_TARGET: &str = "elastic_client";
pub const TRACE_TARGET: &str = "elastic_client::trace";

/// Logger handle owned by a connection.
#[derive(Debug, Clone, Default)]
pub struct RequestLogger {
    url_prefix: String,
}

impl RequestLogger {
    pub fn new(url_prefix: impl Into<String>) -> Self {
        Self {
            url_prefix: url_prefix.into(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn log_request_success(
        &self,
        method: Method,
        full_url: &str,
        path: &str,
        body: Option<&[u8]>,
        status: u16,
        response: &str,
        duration: Duration,
    ) {
        tracing::info!(
            target: LOG_TARGET,
            "{} {} [status:{} request:{:.3}s]",
            method,
            full_url,
            status,
            duration.as_secs_f64()
        );
        let body = body.map(String::from_utf8_lossy);
        tracing::debug!(target: LOG_TARGET, "> {}", body.as_deref().unwrap_or_default());
        tracing::debug!(target: LOG_TARGET, "< {}", response);

        self.log_trace(method, path, body.as_deref(), Some(status), Some(response), duration);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn log_request_fail(
        &self,
        method: Method,
        full_url: &str,
        path: &str,
        body: Option<&[u8]>,
        duration: Duration,
        status: Option<u16>,
        response: Option<&str>,
        error: Option<&dyn Display>,
    ) {
        // a missing document on HEAD is an answer, not a failure
        if method == Method::Head && status == Some(404) {
            return;
        }

        let status_str = status.map_or_else(|| "N/A".to_string(), |s| s.to_string());
        match error {
            Some(e) => tracing::warn!(
                target: LOG_TARGET,
                error = %e,
                "{} {} [status:{} request:{:.3}s]",
                method,
                full_url,
                status_str,
                duration.as_secs_f64()
            ),
            None => tracing::warn!(
                target: LOG_TARGET,
                "{} {} [status:{} request:{:.3}s]",
                method,
                full_url,
                status_str,
                duration.as_secs_f64()
            ),
        }

        let body = body.map(String::from_utf8_lossy);
        tracing::debug!(target: LOG_TARGET, "> {}", body.as_deref().unwrap_or_default());

        self.log_trace(method, path, body.as_deref(), status, response, duration);

        if let Some(response) = response {
            tracing::debug!(target: LOG_TARGET, "< {}", response);
        }
    }

    fn log_trace(
        &self,
        method: Method,
        path: &str,
        body: Option<&str>,
        status: Option<u16>,
        response: Option<&str>,
        duration: Duration,
    ) {
        if !tracing::enabled!(target: TRACE_TARGET, Level::INFO) {
            return;
        }

        tracing::info!(
            target: TRACE_TARGET,
            "{}",
            curl_command(method, path, body, &self.url_prefix)
        );

        if tracing::enabled!(target: TRACE_TARGET, Level::DEBUG) {
            let status = status.map_or_else(|| "N/A".to_string(), |s| s.to_string());
            let response = response
                .filter(|r| !r.is_empty())
                .map(|r| pretty_json(r).replace('\n', "\n#"))
                .unwrap_or_default();
            tracing::debug!(
                target: TRACE_TARGET,
                "#[{}] ({:.3}s)\n#{}",
                status,
                duration.as_secs_f64(),
                response
            );
        }
    }
}

/// The `curl` line the trace target prints for a request.
pub fn curl_command(method: Method, path: &str, body: Option<&str>, url_prefix: &str) -> String {
    let mut path = match path.find('?') {
        Some(_) => path.replacen('?', "?pretty&", 1),
        None => format!("{path}?pretty"),
    };
    if !url_prefix.is_empty() {
        path = path.replacen(url_prefix, "", 1);
    }

    let body = body.filter(|b| !b.is_empty());
    format!(
        "curl {}-X{} 'http://localhost:9200{}' -d '{}'",
        if body.is_some() {
            "-H 'Content-Type: application/json' "
        } else {
            ""
        },
        method,
        path,
        body.map(pretty_json).unwrap_or_default()
    )
}

/// Re-indent JSON with sorted keys for trace output. Non-JSON input (bulk
/// bodies, plain text) comes back unchanged.
pub fn pretty_json(data: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(data) {
        Ok(value) => serde_json::to_string_pretty(&value)
            .map(|s| s.replace('\'', "\\u0027"))
            .unwrap_or_else(|_| data.to_string()),
        Err(_) => data.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Arc;

    use parking_lot::Mutex;
    use tracing_subscriber::fmt::MakeWriter;
    use tracing_subscriber::EnvFilter;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    /// Run `f` under a subscriber with the given filter, returning what it printed.
    fn capture_logs(filter: &str, f: impl FnOnce()) -> String {
        let out = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(filter))
            .with_writer(out.clone())
            .with_ansi(false)
            .without_time()
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = out.0.lock().clone();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    fn fail(logger: &RequestLogger, method: Method, status: Option<u16>) {
        logger.log_request_fail(
            method,
            "http://localhost:9200/idx/_doc/1",
            "/idx/_doc/1",
            None,
            Duration::from_millis(10),
            status,
            Some(r#"{"found":false}"#),
            None,
        );
    }

    #[test]
    fn test_head_404_is_not_logged() {
        let logger = RequestLogger::default();
        let logs = capture_logs("trace", || fail(&logger, Method::Head, Some(404)));
        assert!(logs.is_empty(), "{logs}");
    }

    #[test]
    fn test_failure_logged_at_warn() {
        let logger = RequestLogger::default();
        let logs = capture_logs("elastic_client=warn", || {
            fail(&logger, Method::Get, Some(500));
            fail(&logger, Method::Head, None);
        });
        assert!(logs.contains("WARN"), "{logs}");
        assert!(
            logs.contains("GET http://localhost:9200/idx/_doc/1 [status:500 request:0.010s]"),
            "{logs}"
        );
        assert!(
            logs.contains("HEAD http://localhost:9200/idx/_doc/1 [status:N/A request:0.010s]"),
            "{logs}"
        );
        assert!(!logs.contains("curl"), "{logs}");
    }

    #[test]
    fn test_trace_target_only_when_enabled() {
        let logger = RequestLogger::default();
        let success = || {
            logger.log_request_success(
                Method::Post,
                "http://localhost:9200/idx/_search",
                "/idx/_search",
                Some(&br#"{"size":1}"#[..]),
                200,
                r#"{"took":1}"#,
                Duration::from_millis(5),
            )
        };

        let quiet = capture_logs("elastic_client=debug,elastic_client::trace=off", success);
        assert!(quiet.contains("POST http://localhost:9200/idx/_search [status:200 request:0.005s]"));
        assert!(!quiet.contains("curl"), "{quiet}");

        let traced = capture_logs("elastic_client::trace=debug", success);
        assert!(
            traced.contains("curl -H 'Content-Type: application/json' -XPOST 'http://localhost:9200/idx/_search?pretty'"),
            "{traced}"
        );
        assert!(traced.contains("#[200] (0.005s)"), "{traced}");
        assert!(!traced.contains("[status:200"), "{traced}");
    }

    #[test]
    fn test_curl_without_body() {
        assert_eq!(
            curl_command(Method::Get, "/_cluster/health", None, ""),
            "curl -XGET 'http://localhost:9200/_cluster/health?pretty' -d ''"
        );
    }

    #[test]
    fn test_curl_with_query_and_body() {
        let cmd = curl_command(
            Method::Post,
            "/idx/_search?size=1",
            Some(r#"{"query":{"match_all":{}}}"#),
            "",
        );
        assert_eq!(
            cmd,
            "curl -H 'Content-Type: application/json' -XPOST \
             'http://localhost:9200/idx/_search?pretty&size=1' -d '{\n  \"query\": {\n    \"match_all\": {}\n  }\n}'"
        );
    }

    #[test]
    fn test_curl_strips_url_prefix() {
        let cmd = curl_command(Method::Get, "/proxy/_search", None, "/proxy");
        assert!(cmd.contains("'http://localhost:9200/_search?pretty'"), "{cmd}");
    }

    #[test]
    fn test_pretty_json_sorts_keys_and_escapes_quotes() {
        let out = pretty_json(r#"{"b":"it's","a":1}"#);
        assert_eq!(out, "{\n  \"a\": 1,\n  \"b\": \"it\\u0027s\"\n}");
    }

    #[test]
    fn test_pretty_json_leaves_ndjson_alone() {
        let bulk = "{\"index\":{}}\n{\"a\":1}\n";
        assert_eq!(pretty_json(bulk), bulk);
    }
}
