//! Request arguments and their two wire encodings.
//!
//! # Design
//! `Args` keeps pairs in insertion order so the query string and the JSON
//! body are deterministic for a given call. GET arguments become a
//! `?k=v&k=v` suffix; POST arguments become a JSON object. Neither encoding
//! can fail.

use serde_json::{Map, Value};

use crate::error::WebreqError;

/// How GET argument keys and values are written into the query string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueryEncoding {
    /// Keys and values are copied verbatim. Compatible with existing servers
    /// that expect the unencoded form; `&`, `=` or spaces in a value will
    /// corrupt the query.
    #[default]
    Raw,
    /// Keys and values are percent-encoded.
    Percent,
}

/// Insertion-ordered `string -> string` mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    pairs: Vec<(String, String)>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`. An existing key keeps its position and the
    /// previous value is returned.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.pairs.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parse a JSON object into arguments, preserving key order.
    ///
    /// String values are taken as-is; numbers and booleans use their JSON
    /// spelling. Nulls, arrays and nested objects are rejected.
    pub fn from_json(json: &str) -> Result<Self, WebreqError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| WebreqError::InvalidArgs(e.to_string()))?;
        let Value::Object(map) = value else {
            return Err(WebreqError::InvalidArgs("expected a JSON object".to_string()));
        };

        let mut args = Args::new();
        for (key, value) in map {
            let value = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => {
                    return Err(WebreqError::InvalidArgs(format!(
                        "value for {key:?} must be a scalar, got {other}"
                    )))
                }
            };
            args.insert(key, value);
        }
        Ok(args)
    }

    fn to_json_object(&self) -> Value {
        let map: Map<String, Value> = self
            .pairs
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        Value::Object(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Args {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut args = Args::new();
        for (k, v) in iter {
            args.insert(k, v);
        }
        args
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Args {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Build the query suffix for a GET request.
///
/// Absent arguments produce an empty string. Present but empty arguments
/// produce a lone `"?"`, matching what existing callers of this facade have
/// always sent.
pub fn build_get_query(args: Option<&Args>, encoding: QueryEncoding) -> String {
    let Some(args) = args else {
        return String::new();
    };

    let pairs: Vec<String> = args
        .iter()
        .map(|(k, v)| match encoding {
            QueryEncoding::Raw => format!("{k}={v}"),
            QueryEncoding::Percent => {
                format!("{}={}", urlencoding::encode(k), urlencoding::encode(v))
            }
        })
        .collect();
    format!("?{}", pairs.join("&"))
}

/// Build the JSON body for a POST request. Absent arguments serialize as `{}`.
pub fn build_post_body(args: Option<&Args>) -> String {
    match args {
        Some(args) => args.to_json_object().to_string(),
        None => "{}".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_query_absent_args_is_empty() {
        assert_eq!(build_get_query(None, QueryEncoding::Raw), "");
    }

    #[test]
    fn get_query_empty_args_is_bare_marker() {
        assert_eq!(build_get_query(Some(&Args::new()), QueryEncoding::Raw), "?");
    }

    #[test]
    fn get_query_keeps_insertion_order() {
        let args = Args::from([("zeta", "1"), ("alpha", "2"), ("mid", "3")]);
        assert_eq!(
            build_get_query(Some(&args), QueryEncoding::Raw),
            "?zeta=1&alpha=2&mid=3"
        );
    }

    #[test]
    fn get_query_raw_does_not_encode() {
        let args = Args::from([("q", "a b&c")]);
        assert_eq!(build_get_query(Some(&args), QueryEncoding::Raw), "?q=a b&c");
    }

    #[test]
    fn get_query_percent_encodes_keys_and_values() {
        let args = Args::from([("first name", "a b&c=d")]);
        assert_eq!(
            build_get_query(Some(&args), QueryEncoding::Percent),
            "?first%20name=a%20b%26c%3Dd"
        );
    }

    #[test]
    fn post_body_absent_and_empty_are_empty_object() {
        assert_eq!(build_post_body(None), "{}");
        assert_eq!(build_post_body(Some(&Args::new())), "{}");
    }

    #[test]
    fn post_body_is_stable_across_calls() {
        let args = Args::from([("key", "value")]);
        for _ in 0..3 {
            assert_eq!(build_post_body(Some(&args)), r#"{"key":"value"}"#);
        }
    }

    #[test]
    fn post_body_keeps_insertion_order_and_escapes() {
        let args = Args::from([("b", "say \"hi\""), ("a", "1")]);
        assert_eq!(
            build_post_body(Some(&args)),
            r#"{"b":"say \"hi\"","a":"1"}"#
        );
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut args = Args::from([("a", "1"), ("b", "2")]);
        assert_eq!(args.insert("a", "3"), Some("1".to_string()));
        assert_eq!(args.len(), 2);
        assert_eq!(args.get("a"), Some("3"));
        assert_eq!(build_get_query(Some(&args), QueryEncoding::Raw), "?a=3&b=2");
    }

    #[test]
    fn from_json_preserves_order_and_stringifies_scalars() {
        let args = Args::from_json(r#"{"z":"x","n":5,"flag":true}"#).unwrap();
        let pairs: Vec<_> = args.iter().collect();
        assert_eq!(pairs, vec![("z", "x"), ("n", "5"), ("flag", "true")]);
    }

    #[test]
    fn from_json_rejects_non_objects_and_nested_values() {
        assert!(matches!(
            Args::from_json("[1,2]"),
            Err(WebreqError::InvalidArgs(_))
        ));
        assert!(matches!(
            Args::from_json(r#"{"a":{"b":"c"}}"#),
            Err(WebreqError::InvalidArgs(_))
        ));
        assert!(matches!(
            Args::from_json(r#"{"a":null}"#),
            Err(WebreqError::InvalidArgs(_))
        ));
        assert!(matches!(Args::from_json("not json"), Err(WebreqError::InvalidArgs(_))));
    }
}
