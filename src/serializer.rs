//! Request/response body serializers.
//!
//! A [`Serializer`] turns a [`Body`] into bytes for the wire and back. The
//! [`Deserializer`] picks one by the response's `content-type`.
//!
//! Values that have no native JSON form (timestamps, UUIDs, decimals,
//! fixed-width numeric scalars and numeric arrays) are described by
//! [`Encodable`] and narrowed to plain JSON through a [`TypeRegistry`].
//! The registry is a closed set of [`Capability`] tags decided when the
//! serializer is built; encoding anything outside it is an error.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat};
use serde_json::{Number, Value};
use uuid::Uuid;

use crate::error::{Error, Result, SerializationError};

pub const JSON_MIMETYPE: &str = "application/json";
pub const TEXT_MIMETYPE: &str = "text/plain";
pub const MAPBOX_VECTOR_TILE_MIMETYPE: &str = "application/vnd.mapbox-vector-tile";
pub const NDJSON_MIMETYPE: &str = "application/x-ndjson";
const COMPAT_JSON_MIMETYPE: &str = "application/vnd.elasticsearch+json";

/// A request or response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    Text(String),
    Binary(Vec<u8>),
}

impl Body {
    fn kind(&self) -> &'static str {
        match self {
            Body::Json(_) => "JSON value",
            Body::Text(_) => "text",
            Body::Binary(_) => "binary data",
        }
    }

    /// The JSON payload, if this body is JSON.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Body::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_json(self) -> Option<Value> {
        match self {
            Body::Json(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Body::Json(value)
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Body::Text(value)
    }
}

/// Encodes and decodes bodies of one mimetype.
pub trait Serializer: Send + Sync {
    fn mimetype(&self) -> &'static str;

    fn loads(&self, raw: &[u8]) -> std::result::Result<Body, SerializationError>;

    fn dumps(&self, data: &Body) -> std::result::Result<Vec<u8>, SerializationError>;
}

// ─── JSON ────────────────────────────────────────────────

/// `application/json`. Text bodies pass through untouched.
#[derive(Debug, Clone, Default)]
pub struct JsonSerializer {
    registry: TypeRegistry,
}

impl JsonSerializer {
    pub fn with_registry(registry: TypeRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Narrow a typed value to JSON and wrap it as a body.
    pub fn encode(&self, value: &Encodable) -> std::result::Result<Body, SerializationError> {
        self.registry.encode(value).map(Body::Json)
    }
}

impl Serializer for JsonSerializer {
    fn mimetype(&self) -> &'static str {
        JSON_MIMETYPE
    }

    fn loads(&self, raw: &[u8]) -> std::result::Result<Body, SerializationError> {
        serde_json::from_slice(raw)
            .map(Body::Json)
            .map_err(|source| SerializationError::Decode {
                raw: String::from_utf8_lossy(raw).into_owned(),
                source,
            })
    }

    fn dumps(&self, data: &Body) -> std::result::Result<Vec<u8>, SerializationError> {
        match data {
            Body::Text(s) => Ok(s.as_bytes().to_vec()),
            Body::Json(v) => Ok(serde_json::to_vec(v)?),
            other => Err(SerializationError::WrongBody(other.kind(), "JSON")),
        }
    }
}

// ─── Text ────────────────────────────────────────────────

/// `text/plain`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextSerializer;

impl Serializer for TextSerializer {
    fn mimetype(&self) -> &'static str {
        TEXT_MIMETYPE
    }

    fn loads(&self, raw: &[u8]) -> std::result::Result<Body, SerializationError> {
        Ok(Body::Text(String::from_utf8_lossy(raw).into_owned()))
    }

    fn dumps(&self, data: &Body) -> std::result::Result<Vec<u8>, SerializationError> {
        match data {
            Body::Text(s) => Ok(s.as_bytes().to_vec()),
            other => Err(SerializationError::WrongBody(other.kind(), "text")),
        }
    }
}

// ─── Mapbox vector tiles ─────────────────────────────────

/// `application/vnd.mapbox-vector-tile`. Opaque bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapboxVectorTileSerializer;

impl Serializer for MapboxVectorTileSerializer {
    fn mimetype(&self) -> &'static str {
        MAPBOX_VECTOR_TILE_MIMETYPE
    }

    fn loads(&self, raw: &[u8]) -> std::result::Result<Body, SerializationError> {
        Ok(Body::Binary(raw.to_vec()))
    }

    fn dumps(&self, data: &Body) -> std::result::Result<Vec<u8>, SerializationError> {
        match data {
            Body::Text(s) => Ok(s.as_bytes().to_vec()),
            Body::Binary(b) => Ok(b.clone()),
            other => Err(SerializationError::WrongBody(
                other.kind(),
                "a MapBox vector tile",
            )),
        }
    }
}

/// The serializers every client starts with, keyed by mimetype.
pub fn default_serializers() -> HashMap<String, Arc<dyn Serializer>> {
    let list: Vec<Arc<dyn Serializer>> = vec![
        Arc::new(JsonSerializer::default()),
        Arc::new(TextSerializer),
        Arc::new(MapboxVectorTileSerializer),
    ];
    list.into_iter()
        .map(|s| (s.mimetype().to_string(), s))
        .collect()
}

// ─── Deserializer ────────────────────────────────────────

/// Chooses a serializer by response mimetype.
#[derive(Clone)]
pub struct Deserializer {
    serializers: HashMap<String, Arc<dyn Serializer>>,
    default: Arc<dyn Serializer>,
}

impl std::fmt::Debug for Deserializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&String> = self.serializers.keys().collect();
        keys.sort();
        f.debug_struct("Deserializer")
            .field("mimetypes", &keys)
            .field("default", &self.default.mimetype())
            .finish()
    }
}

impl Default for Deserializer {
    fn default() -> Self {
        let serializers = default_serializers();
        let default = serializers[JSON_MIMETYPE].clone();
        Self {
            serializers,
            default,
        }
    }
}

impl Deserializer {
    pub fn new(
        serializers: HashMap<String, Arc<dyn Serializer>>,
        default_mimetype: &str,
    ) -> Result<Self> {
        let default = serializers.get(default_mimetype).cloned().ok_or_else(|| {
            Error::ImproperlyConfigured(format!(
                "Cannot find default serializer ({default_mimetype})"
            ))
        })?;
        Ok(Self {
            serializers,
            default,
        })
    }

    pub fn loads(
        &self,
        raw: &[u8],
        mimetype: Option<&str>,
    ) -> std::result::Result<Body, SerializationError> {
        let serializer = match mimetype.filter(|m| !m.is_empty()) {
            None => &self.default,
            Some(m) => {
                // drop `charset` and `compatible-with` parameters
                let mut m = m.split(';').next().unwrap_or_default().trim();
                if m == COMPAT_JSON_MIMETYPE {
                    m = JSON_MIMETYPE;
                }
                self.serializers
                    .get(m)
                    .ok_or_else(|| SerializationError::UnknownMimetype(m.to_string()))?
            }
        };
        serializer.loads(raw)
    }
}

// ─── Typed values ────────────────────────────────────────

/// Family of non-native values the JSON serializer knows how to narrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Dates and timestamps, encoded as ISO-8601.
    Temporal,
    /// UUIDs, encoded in hyphenated form.
    Uuid,
    /// Arbitrary-precision decimals, narrowed to a float.
    Decimal,
    /// Fixed-width integer scalars.
    FixedWidthInteger,
    /// Fixed-width floating scalars.
    FloatingScalar,
    /// Numeric arrays, flattened to a JSON list.
    SequenceLike,
    /// Missing-value markers, encoded as `null`.
    Missing,
}

impl Capability {
    pub const ALL: [Capability; 7] = [
        Capability::Temporal,
        Capability::Uuid,
        Capability::Decimal,
        Capability::FixedWidthInteger,
        Capability::FloatingScalar,
        Capability::SequenceLike,
        Capability::Missing,
    ];
}

/// A value to be narrowed to JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum Encodable {
    /// Already native; passed through.
    Json(Value),
    DateTime(DateTime<FixedOffset>),
    NaiveDateTime(NaiveDateTime),
    Date(NaiveDate),
    Uuid(Uuid),
    /// Decimal in its canonical string form.
    Decimal(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    IntArray(Vec<i64>),
    FloatArray(Vec<f64>),
    Missing,
    Seq(Vec<Encodable>),
    Map(BTreeMap<String, Encodable>),
}

impl Encodable {
    /// Capability needed to encode this value, `None` for native values
    /// and containers.
    pub fn capability(&self) -> Option<Capability> {
        match self {
            Encodable::Json(_) | Encodable::Seq(_) | Encodable::Map(_) => None,
            Encodable::DateTime(_) | Encodable::NaiveDateTime(_) | Encodable::Date(_) => {
                Some(Capability::Temporal)
            }
            Encodable::Uuid(_) => Some(Capability::Uuid),
            Encodable::Decimal(_) => Some(Capability::Decimal),
            Encodable::Int(_) | Encodable::UInt(_) => Some(Capability::FixedWidthInteger),
            Encodable::Float(_) => Some(Capability::FloatingScalar),
            Encodable::IntArray(_) | Encodable::FloatArray(_) => Some(Capability::SequenceLike),
            Encodable::Missing => Some(Capability::Missing),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Encodable::Json(_) => "json",
            Encodable::DateTime(_) => "datetime",
            Encodable::NaiveDateTime(_) => "naive datetime",
            Encodable::Date(_) => "date",
            Encodable::Uuid(_) => "uuid",
            Encodable::Decimal(_) => "decimal",
            Encodable::Int(_) => "int64",
            Encodable::UInt(_) => "uint64",
            Encodable::Float(_) => "float64",
            Encodable::IntArray(_) => "int64 array",
            Encodable::FloatArray(_) => "float64 array",
            Encodable::Missing => "missing",
            Encodable::Seq(_) => "sequence",
            Encodable::Map(_) => "map",
        }
    }

    fn unsupported(&self) -> SerializationError {
        SerializationError::Unsupported {
            value: format!("{self:?}"),
            type_name: self.type_name(),
        }
    }
}

macro_rules! encodable_from {
    ($($t:ty => $variant:ident as $cast:ty),* $(,)?) => {
        $(impl From<$t> for Encodable {
            fn from(v: $t) -> Self {
                Encodable::$variant(v as $cast)
            }
        })*
    };
}

encodable_from!(
    i8 => Int as i64, i16 => Int as i64, i32 => Int as i64, i64 => Int as i64,
    u8 => UInt as u64, u16 => UInt as u64, u32 => UInt as u64, u64 => UInt as u64,
    f32 => Float as f64, f64 => Float as f64,
);

impl<Tz: chrono::TimeZone> From<DateTime<Tz>> for Encodable {
    fn from(v: DateTime<Tz>) -> Self {
        Encodable::DateTime(v.fixed_offset())
    }
}

impl From<NaiveDateTime> for Encodable {
    fn from(v: NaiveDateTime) -> Self {
        Encodable::NaiveDateTime(v)
    }
}

impl From<NaiveDate> for Encodable {
    fn from(v: NaiveDate) -> Self {
        Encodable::Date(v)
    }
}

impl From<Uuid> for Encodable {
    fn from(v: Uuid) -> Self {
        Encodable::Uuid(v)
    }
}

impl From<Vec<f32>> for Encodable {
    fn from(v: Vec<f32>) -> Self {
        Encodable::FloatArray(v.into_iter().map(f64::from).collect())
    }
}

impl From<Vec<f64>> for Encodable {
    fn from(v: Vec<f64>) -> Self {
        Encodable::FloatArray(v)
    }
}

impl From<Vec<i64>> for Encodable {
    fn from(v: Vec<i64>) -> Self {
        Encodable::IntArray(v)
    }
}

impl From<Value> for Encodable {
    fn from(v: Value) -> Self {
        Encodable::Json(v)
    }
}

/// Closed set of capabilities a JSON serializer may use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRegistry {
    capabilities: HashSet<Capability>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new(Capability::ALL)
    }
}

impl TypeRegistry {
    pub fn new(capabilities: impl IntoIterator<Item = Capability>) -> Self {
        Self {
            capabilities: capabilities.into_iter().collect(),
        }
    }

    /// Only native JSON values are accepted.
    pub fn native_only() -> Self {
        Self::new([])
    }

    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    pub fn encode(&self, value: &Encodable) -> std::result::Result<Value, SerializationError> {
        if let Some(cap) = value.capability() {
            if !self.supports(cap) {
                return Err(value.unsupported());
            }
        }

        match value {
            Encodable::Json(v) => Ok(v.clone()),
            Encodable::DateTime(dt) => Ok(Value::String(
                dt.to_rfc3339_opts(SecondsFormat::AutoSi, false),
            )),
            Encodable::NaiveDateTime(dt) => {
                Ok(Value::String(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()))
            }
            Encodable::Date(d) => Ok(Value::String(d.format("%Y-%m-%d").to_string())),
            Encodable::Uuid(u) => Ok(Value::String(u.hyphenated().to_string())),
            Encodable::Decimal(s) => {
                let f: f64 = s.trim().parse().map_err(|_| value.unsupported())?;
                float_value(f).ok_or_else(|| value.unsupported())
            }
            Encodable::Int(i) => Ok(Value::from(*i)),
            Encodable::UInt(u) => Ok(Value::from(*u)),
            Encodable::Float(f) => float_value(*f).ok_or_else(|| value.unsupported()),
            Encodable::IntArray(xs) => Ok(Value::Array(xs.iter().map(|x| Value::from(*x)).collect())),
            Encodable::FloatArray(xs) => xs
                .iter()
                .map(|x| float_value(*x).ok_or_else(|| value.unsupported()))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(Value::Array),
            Encodable::Missing => Ok(Value::Null),
            Encodable::Seq(items) => items
                .iter()
                .map(|item| self.encode(item))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(Value::Array),
            Encodable::Map(map) => {
                let mut out = serde_json::Map::with_capacity(map.len());
                for (k, v) in map {
                    out.insert(k.clone(), self.encode(v)?);
                }
                Ok(Value::Object(out))
            }
        }
    }
}

fn float_value(f: f64) -> Option<Value> {
    Number::from_f64(f).map(Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_json_dumps_compact_and_unicode() {
        let s = JsonSerializer::default();
        let out = s.dumps(&Body::Json(json!({"a": [1, 2], "name": "中文"}))).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), r#"{"a":[1,2],"name":"中文"}"#);
    }

    #[test]
    fn test_json_dumps_passes_strings_through() {
        let s = JsonSerializer::default();
        let out = s.dumps(&Body::Text("{\"raw\": true}".into())).unwrap();
        assert_eq!(out, b"{\"raw\": true}");
    }

    #[test]
    fn test_json_loads_error_is_serialization_error() {
        let s = JsonSerializer::default();
        let err = s.loads(b"{not json").unwrap_err();
        assert!(matches!(err, SerializationError::Decode { .. }));
    }

    #[test]
    fn test_text_serializer_rejects_json() {
        let err = TextSerializer.dumps(&Body::Json(json!({}))).unwrap_err();
        assert!(matches!(err, SerializationError::WrongBody(_, "text")));
        assert_eq!(TextSerializer.dumps(&Body::Text("hi".into())).unwrap(), b"hi");
    }

    #[test]
    fn test_mapbox_serializer_keeps_bytes() {
        let tile = vec![0x1a, 0x02, 0xff];
        assert_eq!(
            MapboxVectorTileSerializer.loads(&tile).unwrap(),
            Body::Binary(tile.clone())
        );
        assert!(MapboxVectorTileSerializer
            .dumps(&Body::Json(json!([1])))
            .is_err());
    }

    #[test]
    fn test_encode_temporal_and_uuid() {
        let reg = TypeRegistry::default();
        let dt = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(
            reg.encode(&dt.into()).unwrap(),
            json!("2024-01-02T03:04:05+00:00")
        );
        let date = NaiveDate::from_ymd_opt(2020, 2, 29).unwrap();
        assert_eq!(reg.encode(&date.into()).unwrap(), json!("2020-02-29"));

        let id = Uuid::parse_str("936da01f-9abd-4d9d-80c7-02af85c822a8").unwrap();
        assert_eq!(
            reg.encode(&id.into()).unwrap(),
            json!("936da01f-9abd-4d9d-80c7-02af85c822a8")
        );
    }

    #[test]
    fn test_encode_numeric_narrowing() {
        let reg = TypeRegistry::default();
        assert_eq!(reg.encode(&Encodable::Decimal("1.25".into())).unwrap(), json!(1.25));
        assert_eq!(reg.encode(&7u8.into()).unwrap(), json!(7));
        assert_eq!(reg.encode(&(-3i16).into()).unwrap(), json!(-3));
        assert_eq!(reg.encode(&0.5f32.into()).unwrap(), json!(0.5));
        assert_eq!(
            reg.encode(&vec![1.0f32, 2.5].into()).unwrap(),
            json!([1.0, 2.5])
        );
        assert_eq!(reg.encode(&Encodable::Missing).unwrap(), Value::Null);
    }

    #[test]
    fn test_encode_nested_document() {
        let reg = TypeRegistry::default();
        let mut doc = BTreeMap::new();
        doc.insert("count".to_string(), Encodable::UInt(3));
        doc.insert(
            "tags".to_string(),
            Encodable::Seq(vec![Encodable::Json(json!("a")), Encodable::Missing]),
        );
        assert_eq!(
            reg.encode(&Encodable::Map(doc)).unwrap(),
            json!({"count": 3, "tags": ["a", null]})
        );
    }

    #[test]
    fn test_encode_rejects_unregistered_capability() {
        let reg = TypeRegistry::new([Capability::Temporal]);
        let err = reg.encode(&Encodable::Float(1.0)).unwrap_err();
        assert!(matches!(err, SerializationError::Unsupported { type_name: "float64", .. }));
        assert!(TypeRegistry::native_only()
            .encode(&Encodable::Json(json!({"ok": true})))
            .is_ok());
    }

    #[test]
    fn test_encode_rejects_non_finite() {
        let reg = TypeRegistry::default();
        assert!(reg.encode(&Encodable::Float(f64::NAN)).is_err());
        assert!(reg.encode(&Encodable::Decimal("not-a-number".into())).is_err());
        assert!(reg.encode(&Encodable::FloatArray(vec![1.0, f64::INFINITY])).is_err());
    }

    #[test]
    fn test_deserializer_picks_by_mimetype() {
        let d = Deserializer::default();
        assert_eq!(
            d.loads(b"{\"a\":1}", Some("application/json; charset=UTF-8")).unwrap(),
            Body::Json(json!({"a": 1}))
        );
        assert_eq!(
            d.loads(b"{\"a\":1}", Some("application/vnd.elasticsearch+json; compatible-with=8"))
                .unwrap(),
            Body::Json(json!({"a": 1}))
        );
        assert_eq!(
            d.loads(b"green", Some("text/plain")).unwrap(),
            Body::Text("green".into())
        );
        assert_eq!(d.loads(b"[1]", None).unwrap(), Body::Json(json!([1])));
    }

    #[test]
    fn test_deserializer_unknown_mimetype() {
        let err = Deserializer::default()
            .loads(b"x", Some("application/x-yaml"))
            .unwrap_err();
        assert!(matches!(err, SerializationError::UnknownMimetype(m) if m == "application/x-yaml"));
    }

    #[test]
    fn test_deserializer_missing_default_is_config_error() {
        let mut serializers = default_serializers();
        serializers.remove(JSON_MIMETYPE);
        let err = Deserializer::new(serializers, JSON_MIMETYPE).unwrap_err();
        assert!(matches!(err, Error::ImproperlyConfigured(_)));
    }
}
