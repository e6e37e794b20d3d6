//! Helpers shared by the endpoint namespaces: path quoting, query strings,
//! common parameters and stability warnings.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display};

use parking_lot::Mutex;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::{Error, Result};

/// Everything but unreserved characters, `,` and `*`.
const PATH_PART: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b',')
    .remove(b'*');

/// Percent-encode a path part. Multi-target expressions (`a,b`, `logs-*`)
/// survive unchanged.
pub fn quote(value: &str) -> String {
    utf8_percent_encode(value, PATH_PART).to_string()
}

/// Quote a required path part, rejecting empty values.
pub fn path_part(param: &str, value: &str) -> Result<String> {
    if value.is_empty() {
        return Err(Error::InvalidArgument(format!(
            "Empty value passed for parameter '{param}'"
        )));
    }
    Ok(quote(value))
}

/// Join a list of targets into a single `a,b,c` path part.
pub fn path_list(param: &str, values: &[&str]) -> Result<String> {
    if values.is_empty() || values.iter().all(|v| v.is_empty()) {
        return Err(Error::InvalidArgument(format!(
            "Empty value passed for parameter '{param}'"
        )));
    }
    Ok(values.iter().map(|v| quote(v)).collect::<Vec<_>>().join(","))
}

/// Query parameters every endpoint accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommonParams {
    /// Include the stack trace of returned errors.
    pub error_trace: Option<bool>,
    /// Only return these response paths; sent comma-joined.
    pub filter_path: Option<Vec<String>>,
    /// Human-readable units in the response.
    pub human: Option<bool>,
    /// Pretty-print the response JSON.
    pub pretty: Option<bool>,
}

impl CommonParams {
    pub fn filter_path<S: Into<String>>(paths: impl IntoIterator<Item = S>) -> Self {
        Self {
            filter_path: Some(paths.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }
}

/// Ordered query-string builder. Keys are emitted alphabetically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryString {
    params: BTreeMap<&'static str, String>,
}

impl QueryString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_common(common: &CommonParams) -> Self {
        let mut q = Self::new();
        q.set_opt("error_trace", common.error_trace);
        if let Some(paths) = &common.filter_path {
            q.set("filter_path", paths.join(","));
        }
        q.set_opt("human", common.human);
        q.set_opt("pretty", common.pretty);
        q
    }

    pub fn set(&mut self, key: &'static str, value: impl Display) -> &mut Self {
        self.params.insert(key, value.to_string());
        self
    }

    pub fn set_opt<V: Display>(&mut self, key: &'static str, value: Option<V>) -> &mut Self {
        if let Some(v) = value {
            self.set(key, v);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// `path?k=v&...`, or `path` unchanged when there are no parameters.
    pub fn append_to(&self, path: &str) -> String {
        if self.is_empty() {
            path.to_string()
        } else {
            format!("{path}?{self}")
        }
    }
}

impl Display for QueryString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{k}={}", quote(v))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stability {
    Stable,
    Beta,
    Experimental,
}

static WARNED: Mutex<BTreeSet<&'static str>> = Mutex::new(BTreeSet::new());

/// Log once per endpoint that it is not yet generally available.
pub fn stability_warning(endpoint_id: &'static str, stability: Stability) {
    let message = match stability {
        Stability::Stable => return,
        Stability::Beta => {
            "This API is in beta and is subject to change. The design and code is less mature \
             than official GA features and is being provided as-is with no warranties."
        }
        Stability::Experimental => {
            "This API is in technical preview and may be changed or removed in a future release."
        }
    };
    if WARNED.lock().insert(endpoint_id) {
        tracing::warn!(target: crate::connection::LOG_TARGET, endpoint = endpoint_id, "{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ascii() {
        assert_eq!(quote("abc123"), "abc123");
    }

    #[test]
    fn test_quote_unicode() {
        assert_eq!(quote("some-index-type-中文"), "some-index-type-%E4%B8%AD%E6%96%87");
    }

    #[test]
    fn test_quote_keeps_comma_and_star() {
        assert_eq!(quote("中*文,"), "%E4%B8%AD*%E6%96%87,");
    }

    #[test]
    fn test_quote_reserved_characters() {
        assert_eq!(quote("a/b c?d"), "a%2Fb%20c%3Fd");
        assert_eq!(quote("x%y&z=~_."), "x%25y%26z%3D~_.");
    }

    #[test]
    fn test_path_part_rejects_empty() {
        let err = path_part("name", "").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument: Empty value passed for parameter 'name'"
        );
        assert_eq!(path_part("name", "my app").unwrap(), "my%20app");
    }

    #[test]
    fn test_path_list_joins() {
        assert_eq!(path_list("index", &["a", "b*"]).unwrap(), "a,b*");
        assert!(path_list("index", &[]).is_err());
    }

    #[test]
    fn test_query_string_is_sorted_and_quoted() {
        let mut q = QueryString::with_common(&CommonParams {
            pretty: Some(true),
            filter_path: Some(vec!["hits.hits._id".into(), "took".into()]),
            ..Default::default()
        });
        q.set("size", 10).set_opt::<&str>("q", None).set("from", 5);
        assert_eq!(
            q.append_to("/_application/search_application"),
            "/_application/search_application?filter_path=hits.hits._id,took&from=5&pretty=true&size=10"
        );
    }

    #[test]
    fn test_empty_query_string() {
        assert_eq!(QueryString::new().append_to("/"), "/");
    }
}
