use base64::Engine;
use serde::{Deserialize, Serialize};

/// API key credentials for the `authorization` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiKey {
    /// Already base64-encoded token, sent as-is.
    Encoded(String),
    /// `id` and `api_key` pair, joined as `id:key` and base64-encoded.
    IdKey { id: String, api_key: String },
}

impl ApiKey {
    pub fn id_key(id: impl Into<String>, api_key: impl Into<String>) -> Self {
        ApiKey::IdKey {
            id: id.into(),
            api_key: api_key.into(),
        }
    }

    pub fn header_value(&self) -> String {
        match self {
            ApiKey::Encoded(token) => format!("ApiKey {token}"),
            ApiKey::IdKey { id, api_key } => {
                let joined = format!("{id}:{api_key}");
                format!(
                    "ApiKey {}",
                    base64::engine::general_purpose::STANDARD.encode(joined.as_bytes())
                )
            }
        }
    }
}

impl From<(&str, &str)> for ApiKey {
    fn from((id, key): (&str, &str)) -> Self {
        ApiKey::id_key(id, key)
    }
}

impl From<&str> for ApiKey {
    fn from(token: &str) -> Self {
        ApiKey::Encoded(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_key_pair_is_base64_joined() {
        let key = ApiKey::from(("id", "key"));
        // base64("id:key")
        assert_eq!(key.header_value(), "ApiKey aWQ6a2V5");
    }

    #[test]
    fn test_encoded_token_passes_through() {
        let key = ApiKey::from("c29tZS10b2tlbg==");
        assert_eq!(key.header_value(), "ApiKey c29tZS10b2tlbg==");
    }

    #[test]
    fn test_untagged_deserialization() {
        let k: ApiKey = serde_json::from_str(r#""abc""#).unwrap();
        assert_eq!(k, ApiKey::Encoded("abc".into()));
        let k: ApiKey = serde_json::from_str(r#"{"id":"a","api_key":"b"}"#).unwrap();
        assert_eq!(k, ApiKey::id_key("a", "b"));
    }
}
