//! Compiled-in endpoint catalog. A representative slice of the service's
//! route table; the full table is declarative data maintained elsewhere
//! and follows exactly this shape.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::error::{Error, Result};
use crate::provider::{EndpointDescriptor, ParameterRule, UserAgentClass};
use crate::transform;
use crate::types::{Args, CryptoType, Value};

static CATALOG: Lazy<HashMap<&'static str, EndpointDescriptor>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for descriptor in build() {
        map.insert(descriptor.route, descriptor);
    }
    map
});

pub fn lookup(route: &str) -> Option<&'static EndpointDescriptor> {
    CATALOG.get(route)
}

pub fn routes() -> impl Iterator<Item = &'static str> {
    CATALOG.keys().copied()
}

fn required(args: &Args, key: &str) -> Result<Value> {
    args.get(key)
        .cloned()
        .ok_or_else(|| Error::MissingParameter(key.to_string()))
}

/// `t == 1` selects the subscribe variant of a toggle endpoint.
fn toggle(args: &Args) -> &'static str {
    match args.get("t") {
        Some(Value::Int(1)) => "sub",
        _ => "unsub",
    }
}

fn comment_thread_id(args: &Args) -> Result<String> {
    let kind = required(args, "type")?;
    if kind == Value::Int(6) {
        return Ok(required(args, "threadId")?.to_string());
    }
    let id = required(args, "id")?;
    Ok(format!("{}{}", transform::comment_type(&kind)?, id))
}

fn resource_thread_id(args: &Args) -> Result<String> {
    let kind = required(args, "type")?;
    if kind == Value::Int(6) {
        return Ok(required(args, "threadId")?.to_string());
    }
    let id = required(args, "id")?;
    Ok(format!("{}{}", transform::resource_type(&kind)?, id))
}

fn scrobble_logs(args: &Args) -> Result<String> {
    let json = serde_json::json!({
        "id": required(args, "id")?.to_string(),
        "sourceId": required(args, "sourceId")?.to_string(),
        "time": required(args, "time")?.to_string(),
        "download": 0,
        "end": "playend",
        "type": "song",
        "wifi": 0,
    });
    let log = serde_json::json!({
        "action": "play",
        "json": json.to_string(),
    });
    Ok(log.to_string())
}

fn build() -> Vec<EndpointDescriptor> {
    vec![
        EndpointDescriptor::new(
            "/activate/init/profile",
            "http://music.163.com/eapi/activate/initProfile",
            CryptoType::Eapi,
        )
        .rules(vec![ParameterRule::required("nickname")])
        .url_override("/api/activate/initProfile"),
        EndpointDescriptor::dynamic(
            "/album",
            |args| {
                format!(
                    "https://music.163.com/weapi/v1/album/{}",
                    args.get("id").map(Value::to_string).unwrap_or_default()
                )
            },
            CryptoType::Weapi,
        ),
        EndpointDescriptor::new(
            "/album/sublist",
            "https://music.163.com/weapi/album/sublist",
            CryptoType::Weapi,
        )
        .rules(vec![
            ParameterRule::optional("limit", 25),
            ParameterRule::optional("offset", 0),
            ParameterRule::constant("total", "true"),
        ]),
        EndpointDescriptor::new(
            "/artist/list",
            "https://music.163.com/weapi/artist/list",
            CryptoType::Weapi,
        )
        .rules(vec![
            ParameterRule::optional("categoryCode", 1001).from_key("cat"),
            ParameterRule::optional("initial", "").with(transform::artist_initial),
            ParameterRule::optional("offset", 0),
            ParameterRule::optional("limit", 30),
            ParameterRule::constant("total", "true"),
        ]),
        EndpointDescriptor::dynamic(
            "/artist/sub",
            |args| format!("https://music.163.com/weapi/artist/{}", toggle(args)),
            CryptoType::Weapi,
        )
        .rules(vec![
            ParameterRule::required("artistId").from_key("id"),
            ParameterRule::required("artistIds")
                .from_key("id")
                .with(transform::json_array),
        ]),
        EndpointDescriptor::new(
            "/banner",
            "https://music.163.com/api/v2/banner/get",
            CryptoType::Linuxapi,
        )
        .rules(vec![ParameterRule::optional("clientType", "pc")
            .from_key("type")
            .with(transform::banner_type)]),
        EndpointDescriptor::new(
            "/captcha/sent",
            "https://music.163.com/weapi/sms/captcha/sent",
            CryptoType::Weapi,
        )
        .rules(vec![
            ParameterRule::required("cellphone").from_key("phone"),
            ParameterRule::optional("ctcode", 86),
        ]),
        EndpointDescriptor::dynamic(
            "/comment/like",
            |args| {
                let action = match args.get("t") {
                    Some(Value::Int(1)) => "like",
                    _ => "unlike",
                };
                format!("https://music.163.com/weapi/v1/comment/{}", action)
            },
            CryptoType::Weapi,
        )
        .rules(vec![
            ParameterRule::required("commentId").from_key("cid"),
            ParameterRule::derived("threadId", comment_thread_id),
        ])
        .cookies(&[("os", "pc")]),
        EndpointDescriptor::new(
            "/daily_signin",
            "https://music.163.com/weapi/point/dailyTask",
            CryptoType::Weapi,
        )
        .rules(vec![ParameterRule::optional("type", 0)]),
        EndpointDescriptor::new(
            "/dj/toplist",
            "https://music.163.com/api/djradio/toplist",
            CryptoType::Weapi,
        )
        .rules(vec![
            ParameterRule::optional("limit", 30),
            ParameterRule::optional("offset", 0),
            ParameterRule::optional("type", "new").with(transform::dj_toplist_type),
        ]),
        EndpointDescriptor::new(
            "/login",
            "https://music.163.com/weapi/login",
            CryptoType::Weapi,
        )
        .rules(vec![
            ParameterRule::required("username").from_key("email"),
            ParameterRule::required("password").with(transform::md5_hex),
            ParameterRule::constant("rememberLogin", "true"),
        ])
        .cookies(&[("os", "pc")])
        .user_agent(UserAgentClass::Pc),
        EndpointDescriptor::new(
            "/login/cellphone",
            "https://music.163.com/weapi/login/cellphone",
            CryptoType::Weapi,
        )
        .rules(vec![
            ParameterRule::required("phone"),
            ParameterRule::optional("countrycode", ""),
            ParameterRule::required("password").with(transform::md5_hex),
            ParameterRule::constant("rememberLogin", "true"),
        ])
        .cookies(&[("os", "pc")])
        .user_agent(UserAgentClass::Pc),
        EndpointDescriptor::dynamic(
            "/mv/sub",
            |args| format!("https://music.163.com/weapi/mv/{}", toggle(args)),
            CryptoType::Weapi,
        )
        .rules(vec![
            ParameterRule::required("mvId").from_key("mvid"),
            ParameterRule::required("mvIds")
                .from_key("mvid")
                .with(transform::json_array),
        ]),
        EndpointDescriptor::new(
            "/personal_fm",
            "https://music.163.com/weapi/v1/radio/get",
            CryptoType::Weapi,
        ),
        EndpointDescriptor::new(
            "/playlist/tracks",
            "https://music.163.com/weapi/playlist/manipulate/tracks",
            CryptoType::Weapi,
        )
        .rules(vec![
            ParameterRule::required("op"),
            ParameterRule::required("pid"),
            ParameterRule::required("trackIds").with(transform::json_array),
        ]),
        EndpointDescriptor::dynamic(
            "/resource/like",
            |args| {
                let action = match args.get("t") {
                    Some(Value::Int(1)) => "like",
                    _ => "unlike",
                };
                format!("https://music.163.com/weapi/resource/{}", action)
            },
            CryptoType::Weapi,
        )
        .rules(vec![ParameterRule::derived("threadId", resource_thread_id)])
        .cookies(&[("os", "pc")]),
        EndpointDescriptor::new(
            "/scrobble",
            "https://music.163.com/weapi/feedback/weblog",
            CryptoType::Weapi,
        )
        .rules(vec![ParameterRule::derived("logs", scrobble_logs)]),
        EndpointDescriptor::new(
            "/search",
            "https://music.163.com/weapi/search/get",
            CryptoType::Weapi,
        )
        .rules(vec![
            ParameterRule::required("s").from_key("keywords"),
            ParameterRule::optional("type", 1),
            ParameterRule::optional("limit", 30),
            ParameterRule::optional("offset", 0),
        ]),
        EndpointDescriptor::new(
            "/song/detail",
            "https://music.163.com/weapi/v3/song/detail",
            CryptoType::Weapi,
        )
        .rules(vec![
            ParameterRule::required("c")
                .from_key("ids")
                .with(transform::json_array_quoted),
            ParameterRule::required("ids").with(transform::json_array),
        ]),
        EndpointDescriptor::new(
            "/song/url",
            "https://music.163.com/api/song/enhance/player/url",
            CryptoType::Linuxapi,
        )
        .rules(vec![
            ParameterRule::required("ids")
                .from_key("id")
                .with(transform::json_array),
            ParameterRule::optional("br", 999000),
        ])
        .cookies(&[("os", "pc")]),
        EndpointDescriptor::new(
            "/top/list",
            "https://music.163.com/weapi/v3/playlist/detail",
            CryptoType::Linuxapi,
        )
        .rules(vec![
            ParameterRule::required("id")
                .from_key("idx")
                .with(transform::top_list_id),
            ParameterRule::constant("n", 10000),
        ]),
        EndpointDescriptor::new(
            "/toplist",
            "https://music.163.com/weapi/toplist",
            CryptoType::Linuxapi,
        ),
    ]
}
