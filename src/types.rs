use std::collections::HashMap;
use std::fmt;

pub use crate::error::{Error, Result};

/// Caller-supplied argument map. Keys not named by any rule are ignored.
pub type Args = HashMap<String, Value>;

/// Resolved key/value payload for one call, in insertion order
/// (`serde_json` is built with `preserve_order`). Every bound value is a
/// JSON string; the encoders serialize the map as-is.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// Scheme-specific form pairs destined for urlencoding by the transport.
pub type Form = Vec<(&'static str, String)>;

/// One caller argument. Transformers pattern-match on this exhaustively;
/// anything outside the union is rejected at the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Text(String),
    IntSeq(Vec<i64>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
            Value::IntSeq(seq) => {
                let mut first = true;
                for n in seq {
                    if !first {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", n)?;
                    first = false;
                }
                Ok(())
            }
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<i64>> for Value {
    fn from(seq: Vec<i64>) -> Self {
        Value::IntSeq(seq)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// The three request-obfuscation schemes, distinguished by key material,
/// cipher mode and payload envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoType {
    Weapi,
    Eapi,
    Linuxapi,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Text("abc".into()).to_string(), "abc");
        assert_eq!(Value::IntSeq(vec![1, 2, 3]).to_string(), "1,2,3");
        assert_eq!(Value::IntSeq(vec![]).to_string(), "");
    }
}
