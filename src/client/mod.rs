//! The API client.
//!
//! [`Elasticsearch`] serializes request bodies, sends them through the
//! [`Connection`] and deserializes the response by its mimetype. Endpoints
//! are grouped into namespaces reached through accessor methods, e.g.
//! `client.search_application().get("my-app", &Default::default())`.

mod graph;
mod indices;
mod ingest;
mod logstash;
mod ml;
mod search_application;
mod shutdown;
pub mod utils;
mod xpack;

pub use graph::{ExploreRequest, Graph};
pub use indices::Indices;
pub use ingest::Ingest;
pub use logstash::Logstash;
pub use ml::Ml;
pub use search_application::{ListParams, SearchApplication};
pub use shutdown::{PutNodeRequest, Shutdown, ShutdownParams};
pub use utils::{CommonParams, QueryString, Stability};
pub use xpack::XPack;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::config::ConnectionConfig;
use crate::connection::{Connection, Method, RequestOptions, Transport};
use crate::error::{Error, Result};
use crate::serializer::{
    Body, Deserializer, JsonSerializer, Serializer, JSON_MIMETYPE, NDJSON_MIMETYPE,
};
use utils::path_part;

/// A decoded response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Body,
}

impl ApiResponse {
    /// The JSON body, or `Value::Null` for non-JSON bodies.
    pub fn json(&self) -> &Value {
        self.body.as_json().unwrap_or(&Value::Null)
    }

    pub fn into_json(self) -> Value {
        self.body.into_json().unwrap_or(Value::Null)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One endpoint call, assembled by a namespace.
#[derive(Debug, Clone)]
pub(crate) struct Request {
    pub method: Method,
    pub path: String,
    pub query: QueryString,
    pub body: Option<Body>,
    pub content_type: Option<&'static str>,
    pub ignore: Vec<u16>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>, query: QueryString) -> Self {
        Self {
            method,
            path: path.into(),
            query,
            body: None,
            content_type: None,
            ignore: Vec::new(),
        }
    }

    pub fn json_body(mut self, body: Value) -> Self {
        self.body = Some(Body::Json(body));
        self.content_type = Some(JSON_MIMETYPE);
        self
    }

    pub fn ignore(mut self, statuses: &[u16]) -> Self {
        self.ignore.extend_from_slice(statuses);
        self
    }
}

#[derive(Clone)]
pub struct Elasticsearch {
    connection: Arc<Connection>,
    serializer: Arc<JsonSerializer>,
    deserializer: Arc<Deserializer>,
}

impl Elasticsearch {
    /// Build a client over the default `reqwest` transport.
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        Ok(Self::from_connection(Connection::from_config(config)?))
    }

    /// Build a client over a caller-supplied transport.
    pub fn with_transport(config: &ConnectionConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        Ok(Self::from_connection(Connection::new(config, transport)?))
    }

    pub fn from_connection(connection: Connection) -> Self {
        Self {
            connection: Arc::new(connection),
            serializer: Arc::new(JsonSerializer::default()),
            deserializer: Arc::new(Deserializer::default()),
        }
    }

    /// Replace the serializer used for request bodies.
    pub fn with_serializer(mut self, serializer: JsonSerializer) -> Self {
        self.serializer = Arc::new(serializer);
        self
    }

    pub fn with_deserializer(mut self, deserializer: Deserializer) -> Self {
        self.deserializer = Arc::new(deserializer);
        self
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn serializer(&self) -> &JsonSerializer {
        &self.serializer
    }

    pub(crate) async fn send(&self, request: Request) -> Result<ApiResponse> {
        let Request {
            method,
            path,
            query,
            body,
            content_type,
            ignore,
        } = request;

        let mut headers = BTreeMap::new();
        headers.insert("accept".to_string(), JSON_MIMETYPE.to_string());
        if let Some(ct) = content_type {
            headers.insert("content-type".to_string(), ct.to_string());
        }

        let encoded = body
            .as_ref()
            .map(|b| self.serializer.dumps(b))
            .transpose()?;

        let options = RequestOptions {
            headers,
            timeout: None,
            ignore,
        };
        let response = self
            .connection
            .perform_request(method, &query.append_to(&path), encoded, &options)
            .await?;

        let body = if response.body.is_empty() || method == Method::Head {
            Body::Json(Value::Null)
        } else {
            self.deserializer
                .loads(&response.body, response.content_type())?
        };

        Ok(ApiResponse {
            status: response.status,
            headers: response.headers,
            body,
        })
    }

    /// Escape hatch for endpoints without a dedicated method.
    pub async fn perform_request(
        &self,
        method: Method,
        path: &str,
        query: QueryString,
        body: Option<Value>,
    ) -> Result<ApiResponse> {
        let mut request = Request::new(method, path, query);
        if let Some(body) = body {
            request = request.json_body(body);
        }
        self.send(request).await
    }

    // ─── Namespaces ──────────────────────────────────────

    pub fn search_application(&self) -> SearchApplication<'_> {
        SearchApplication::new(self)
    }

    pub fn logstash(&self) -> Logstash<'_> {
        Logstash::new(self)
    }

    pub fn shutdown(&self) -> Shutdown<'_> {
        Shutdown::new(self)
    }

    pub fn xpack(&self) -> XPack<'_> {
        XPack::new(self)
    }

    pub fn graph(&self) -> Graph<'_> {
        Graph::new(self)
    }

    pub fn indices(&self) -> Indices<'_> {
        Indices::new(self)
    }

    pub fn ingest(&self) -> Ingest<'_> {
        Ingest::new(self)
    }

    pub fn ml(&self) -> Ml<'_> {
        Ml::new(self)
    }

    // ─── Root endpoints ──────────────────────────────────

    /// Basic cluster information.
    pub async fn info(&self, common: &CommonParams) -> Result<ApiResponse> {
        self.send(Request::new(Method::Get, "/", QueryString::with_common(common)))
            .await
    }

    pub async fn search(&self, index: &str, body: Value, common: &CommonParams) -> Result<ApiResponse> {
        let path = format!("/{}/_search", path_part("index", index)?);
        self.send(Request::new(Method::Post, path, QueryString::with_common(common)).json_body(body))
            .await
    }

    /// Send newline-delimited `operations` (action lines and sources,
    /// already interleaved) to the bulk API.
    pub async fn bulk(
        &self,
        index: Option<&str>,
        operations: &[Value],
        refresh: Option<&str>,
        common: &CommonParams,
    ) -> Result<ApiResponse> {
        if operations.is_empty() {
            return Err(Error::InvalidArgument(
                "Empty value passed for parameter 'operations'".into(),
            ));
        }
        let path = match index {
            Some(index) => format!("/{}/_bulk", path_part("index", index)?),
            None => "/_bulk".to_string(),
        };
        let mut query = QueryString::with_common(common);
        query.set_opt("refresh", refresh);

        let mut ndjson = String::new();
        for op in operations {
            ndjson.push_str(&serde_json::to_string(op).map_err(crate::error::SerializationError::from)?);
            ndjson.push('\n');
        }

        let mut request = Request::new(Method::Post, path, query);
        request.body = Some(Body::Text(ndjson));
        request.content_type = Some(NDJSON_MIMETYPE);
        self.send(request).await
    }

    pub async fn delete_by_query(
        &self,
        index: &str,
        query_body: Value,
        refresh: Option<bool>,
        common: &CommonParams,
    ) -> Result<ApiResponse> {
        let path = format!("/{}/_delete_by_query", path_part("index", index)?);
        let mut query = QueryString::with_common(common);
        query.set_opt("refresh", refresh);
        self.send(Request::new(Method::Post, path, query).json_body(query_body))
            .await
    }
}

impl fmt::Debug for Elasticsearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Elasticsearch({})>", self.connection)
    }
}
