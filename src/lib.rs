//! Request signing core for the NCM music service.
//!
//! Reproduces the service's three request-obfuscation schemes (weapi,
//! eapi, linuxapi) bit-for-bit and resolves caller arguments against a
//! static endpoint catalog. Pure computation: the HTTP transport and
//! cookie jar live with the caller.

pub mod catalog;
pub mod crypto;
pub mod error;
pub mod provider;
pub mod request;
pub mod transform;
pub mod types;

pub use error::{Error, Result};
pub use provider::{EndpointDescriptor, ParameterRule, RuleKind, UrlSpec, UserAgentClass};
pub use request::{encode_request, EncodedRequest, EncodingContext};
pub use types::{Args, CryptoType, Form, Method, Payload, Value};

#[cfg(test)]
mod tests {
    use super::*;

    // Catalog lookup through scheme encoding, end to end.
    #[test]
    fn test_encode_catalog_request() {
        let descriptor = catalog::lookup("/search").unwrap();
        let mut args = Args::new();
        args.insert("keywords".to_string(), Value::Text("nocturne".into()));

        let request =
            encode_request(descriptor, &args, &EncodingContext::default()).unwrap();
        assert_eq!(request.url, "https://music.163.com/weapi/search/get");
        assert_eq!(request.form[0].0, "params");
        assert_eq!(request.form[1].0, "encSecKey");
    }
}
