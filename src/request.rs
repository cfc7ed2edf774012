//! Turns a bound payload into the exact URL, form pairs and headers the
//! transport must send. Stops short of any I/O: timeouts, retries and the
//! cookie jar stay with the caller.

use std::collections::HashMap;

use chrono::Utc;
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use serde::Serialize;

use crate::crypto::ncm;
use crate::error::Result;
use crate::provider::{EndpointDescriptor, UserAgentClass};
use crate::types::{Args, CryptoType, Form, Payload};

const LINUX_FORWARD_URL: &str = "https://music.163.com/api/linux/forward";
const LINUX_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/60.0.3112.90 Safari/537.36";

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (iPhone; CPU iPhone OS 9_1 like Mac OS X) AppleWebKit/601.1.46 (KHTML, like Gecko) Version/9.0 Mobile/13B143 Safari/601.1",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 9_1 like Mac OS X) AppleWebKit/601.1.46 (KHTML, like Gecko) Version/9.0 Mobile/13B143 Safari/601.1",
    "Mozilla/5.0 (Linux; Android 5.0; SM-G900P Build/LRX21T) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/59.0.3071.115 Mobile Safari/537.36",
    "Mozilla/5.0 (Linux; Android 6.0; Nexus 5 Build/MRA58N) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/59.0.3071.115 Mobile Safari/537.36",
    "Mozilla/5.0 (Linux; Android 5.1.1; Nexus 6 Build/LYZ28E) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/59.0.3071.115 Mobile Safari/537.36",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 10_3_2 like Mac OS X) AppleWebKit/603.2.4 (KHTML, like Gecko) Mobile/14F89",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 10_0 like Mac OS X) AppleWebKit/602.1.38 (KHTML, like Gecko) Version/10.0 Mobile/14A300 Safari/602.1",
    "Mozilla/5.0 (iPad; CPU OS 10_0 like Mac OS X) AppleWebKit/602.1.38 (KHTML, like Gecko) Version/10.0 Mobile/14A300 Safari/602.1",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.12; rv:46.0) Gecko/20100101 Firefox/46.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_12_5) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/59.0.3071.115 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_12_5) AppleWebKit/603.2.4 (KHTML, like Gecko) Version/10.1.1 Safari/603.2.4",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:46.0) Gecko/20100101 Firefox/46.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/51.0.2704.103 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/42.0.2311.135 Safari/537.36 Edge/13.10586",
];

static API_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w*api").expect("api segment regex"));

/// Per-call bag: cookie snapshot plus an optional user-agent override.
/// Never shared across calls.
#[derive(Debug, Default)]
pub struct EncodingContext<'a> {
    pub cookies: HashMap<&'a str, &'a str>,
    pub user_agent: Option<&'a str>,
}

impl<'a> EncodingContext<'a> {
    fn cookie(&self, name: &str, fallback: &'a str) -> &'a str {
        self.cookies.get(name).copied().unwrap_or(fallback)
    }
}

/// Everything the transport needs for one call.
#[derive(Debug)]
pub struct EncodedRequest {
    pub url: String,
    pub form: Form,
    pub user_agent: String,
    /// eapi carries its device identity in the Cookie header; other
    /// schemes leave this to the caller's jar.
    pub cookie_header: Option<String>,
}

#[derive(Serialize)]
struct LinuxForward<'a> {
    method: &'static str,
    url: String,
    params: &'a Payload,
}

/// Bind `args` against `descriptor` and encode under its scheme.
pub fn encode_request(
    descriptor: &EndpointDescriptor,
    args: &Args,
    context: &EncodingContext<'_>,
) -> Result<EncodedRequest> {
    let mut payload = descriptor.bind(args)?;
    let url = descriptor.url.resolve(args);
    log::debug!("{}: encoding as {:?}", descriptor.route, descriptor.crypto);

    let (url, form, cookie_header) = match descriptor.crypto {
        CryptoType::Weapi => {
            let csrf = context.cookie("__csrf", "");
            payload.insert(
                "csrf_token".to_string(),
                serde_json::Value::String(csrf.to_string()),
            );
            let form = ncm::weapi(&payload)?;
            (
                rewrite_api_segment(&url, "weapi"),
                form,
                fixed_cookie_header(descriptor),
            )
        }
        CryptoType::Linuxapi => {
            let envelope = LinuxForward {
                method: descriptor.method.as_str(),
                url: rewrite_api_segment(&url, "api"),
                params: &payload,
            };
            let form = ncm::linuxapi(&envelope)?;
            (
                LINUX_FORWARD_URL.to_string(),
                form,
                fixed_cookie_header(descriptor),
            )
        }
        CryptoType::Eapi => {
            let header = eapi_header(descriptor, context);
            let cookie_header = header
                .iter()
                .map(|(name, value)| {
                    format!("{}={}", name, value.as_str().unwrap_or_default())
                })
                .collect::<Vec<_>>()
                .join("; ");
            payload.insert(
                "header".to_string(),
                serde_json::Value::String(serde_json::to_string(&header)?),
            );
            let path = descriptor.url_override.unwrap_or(descriptor.route);
            let form = ncm::eapi(path, &payload)?;
            (rewrite_api_segment(&url, "eapi"), form, Some(cookie_header))
        }
    };

    // linuxapi impersonates the desktop client regardless of the endpoint
    let user_agent = match descriptor.crypto {
        CryptoType::Linuxapi => LINUX_USER_AGENT.to_string(),
        _ => choose_user_agent(descriptor.user_agent, context.user_agent),
    };

    Ok(EncodedRequest {
        url,
        form,
        user_agent,
        cookie_header,
    })
}

/// Cookie defaults baked into the descriptor, for schemes that do not
/// build their own header.
fn fixed_cookie_header(descriptor: &EndpointDescriptor) -> Option<String> {
    if descriptor.cookies.is_empty() {
        return None;
    }
    Some(
        descriptor
            .cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; "),
    )
}

/// Device-identity fields the eapi scheme expects, drawn from the cookie
/// snapshot with the service's stock defaults.
fn eapi_header(
    descriptor: &EndpointDescriptor,
    context: &EncodingContext<'_>,
) -> serde_json::Map<String, serde_json::Value> {
    let cookie = |name: &str, fallback: &str| -> String {
        if let Some(value) = context.cookies.get(name) {
            return (*value).to_string();
        }
        for (fixed_name, fixed_value) in descriptor.cookies {
            if *fixed_name == name {
                return (*fixed_value).to_string();
            }
        }
        fallback.to_string()
    };

    let now = Utc::now();
    let request_id = format!(
        "{}_{:04}",
        now.timestamp_millis(),
        rand::thread_rng().gen_range(0..1000)
    );

    let mut header = serde_json::Map::new();
    let mut put = |name: &str, value: String| {
        header.insert(name.to_string(), serde_json::Value::String(value));
    };
    put("osver", cookie("osver", ""));
    put("deviceId", cookie("deviceId", ""));
    put("appver", cookie("appver", "6.1.1"));
    put("versioncode", cookie("versioncode", "140"));
    put("mobilename", cookie("mobilename", ""));
    put("buildver", cookie("buildver", &now.timestamp().to_string()));
    put("resolution", cookie("resolution", "1920x1080"));
    put("__csrf", cookie("__csrf", ""));
    put("os", cookie("os", "android"));
    put("channel", cookie("channel", ""));
    put("requestId", request_id);
    if let Some(music_u) = context.cookies.get("MUSIC_U") {
        put("MUSIC_U", (*music_u).to_string());
    }
    if let Some(music_a) = context.cookies.get("MUSIC_A") {
        put("MUSIC_A", (*music_a).to_string());
    }
    header
}

fn rewrite_api_segment(url: &str, scheme: &str) -> String {
    API_SEGMENT.replace_all(url, scheme).into_owned()
}

fn choose_user_agent(class: UserAgentClass, fixed: Option<&str>) -> String {
    if let Some(ua) = fixed {
        return ua.to_string();
    }
    let mut rng = rand::thread_rng();
    let pick = match class {
        UserAgentClass::Mobile => rng.gen_range(0..7),
        UserAgentClass::Pc => rng.gen_range(8..13),
        UserAgentClass::Any => rng.gen_range(0..USER_AGENTS.len()),
    };
    USER_AGENTS[pick].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::ncm::eapi_decrypt;
    use crate::provider::ParameterRule;
    use crate::types::{CryptoType, Value};

    fn args(entries: &[(&str, Value)]) -> Args {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_rewrite_api_segment() {
        assert_eq!(
            rewrite_api_segment("https://music.163.com/api/v1/album/1", "weapi"),
            "https://music.163.com/weapi/v1/album/1"
        );
        assert_eq!(
            rewrite_api_segment("https://music.163.com/weapi/login", "eapi"),
            "https://music.163.com/eapi/login"
        );
    }

    #[test]
    fn test_weapi_request_injects_csrf() {
        let desc = EndpointDescriptor::new(
            "/login/refresh",
            "https://music.163.com/api/login/token/refresh",
            CryptoType::Weapi,
        );
        let mut context = EncodingContext::default();
        context.cookies.insert("__csrf", "token123");
        let request = encode_request(&desc, &Args::new(), &context).unwrap();
        assert_eq!(request.url, "https://music.163.com/weapi/login/token/refresh");
        assert_eq!(request.form[0].0, "params");
        assert_eq!(request.form[1].0, "encSecKey");
        assert!(request.cookie_header.is_none());
    }

    #[test]
    fn test_linuxapi_request_forwards() {
        let desc = EndpointDescriptor::new(
            "/toplist",
            "https://music.163.com/weapi/toplist",
            CryptoType::Linuxapi,
        );
        let request = encode_request(&desc, &Args::new(), &EncodingContext::default()).unwrap();
        assert_eq!(request.url, LINUX_FORWARD_URL);
        assert_eq!(request.form.len(), 1);
        assert_eq!(request.form[0].0, "eparams");
        assert_eq!(request.user_agent, LINUX_USER_AGENT);

        // the envelope forwards the descriptor's method and rewritten url
        let cipher = hex::decode(&request.form[0].1).unwrap();
        let plain = crate::crypto::decrypt(
            crate::crypto::AesMode::Ecb,
            b"rFgB&h#%2?^eDg:Q",
            None,
            &cipher,
        )
        .unwrap();
        let plain = String::from_utf8(plain).unwrap();
        assert!(plain.contains(r#""method":"POST""#));
        assert!(plain.contains(r#""url":"https://music.163.com/api/toplist""#));
    }

    #[test]
    fn test_fixed_cookie_header() {
        let desc = EndpointDescriptor::new(
            "/login",
            "https://music.163.com/weapi/login",
            CryptoType::Weapi,
        )
        .cookies(&[("os", "pc")]);
        let request = encode_request(&desc, &Args::new(), &EncodingContext::default()).unwrap();
        assert_eq!(request.cookie_header.as_deref(), Some("os=pc"));
    }

    #[test]
    fn test_eapi_request_envelope() {
        let desc = EndpointDescriptor::new(
            "/activate/init/profile",
            "http://music.163.com/eapi/activate/initProfile",
            CryptoType::Eapi,
        )
        .rules(vec![ParameterRule::required("nickname")])
        .url_override("/api/activate/initProfile");

        let mut context = EncodingContext::default();
        context.cookies.insert("osver", "13");
        context.cookies.insert("MUSIC_U", "secret");

        let request =
            encode_request(&desc, &args(&[("nickname", "me".into())]), &context).unwrap();
        assert_eq!(request.url, "http://music.163.com/eapi/activate/initProfile");

        let cookie_header = request.cookie_header.unwrap();
        assert!(cookie_header.contains("osver=13"));
        assert!(cookie_header.contains("appver=6.1.1"));
        assert!(cookie_header.contains("MUSIC_U=secret"));

        // digest envelope is computed against the override path
        let cipher = hex::decode(&request.form[0].1).unwrap();
        let plain = String::from_utf8(eapi_decrypt(&cipher).unwrap()).unwrap();
        assert!(plain.starts_with("/api/activate/initProfile-36cd479b6b5-"));
        assert!(plain.contains(r#""nickname":"me""#));
        // the header map travels as an embedded JSON string
        assert!(plain.contains(r#"\"os\":\"android\""#));
    }

    #[test]
    fn test_choose_user_agent() {
        assert_eq!(choose_user_agent(UserAgentClass::Any, Some("custom")), "custom");
        let ua = choose_user_agent(UserAgentClass::Pc, None);
        assert!(USER_AGENTS[8..13].contains(&ua.as_str()));
        let ua = choose_user_agent(UserAgentClass::Mobile, None);
        assert!(USER_AGENTS[..7].contains(&ua.as_str()));
    }
}
