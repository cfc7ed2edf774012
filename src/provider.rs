//! Endpoint descriptors and the parameter-binding engine that resolves a
//! caller argument map into the literal payload an endpoint expects.

use crate::error::{Error, Result};
use crate::transform::TransformFn;
use crate::types::{Args, CryptoType, Method, Payload, Value};

pub type DeriveFn = fn(&Args) -> Result<String>;
pub type UrlFn = fn(&Args) -> String;

/// How one output field resolves. Exactly one path fires per rule per
/// call; Optional and Constant always carry a concrete default.
pub enum RuleKind {
    Required,
    Optional(Value),
    Constant(Value),
    /// Reads the full caller map, e.g. to combine several keys.
    Derived(DeriveFn),
}

/// One field's resolution policy within an endpoint descriptor.
pub struct ParameterRule {
    pub name: &'static str,
    /// Caller key to read; the output name when `None`.
    pub source: Option<&'static str>,
    pub kind: RuleKind,
    pub transform: Option<TransformFn>,
}

impl ParameterRule {
    pub fn required(name: &'static str) -> Self {
        Self {
            name,
            source: None,
            kind: RuleKind::Required,
            transform: None,
        }
    }

    pub fn optional(name: &'static str, default: impl Into<Value>) -> Self {
        Self {
            name,
            source: None,
            kind: RuleKind::Optional(default.into()),
            transform: None,
        }
    }

    pub fn constant(name: &'static str, value: impl Into<Value>) -> Self {
        Self {
            name,
            source: None,
            kind: RuleKind::Constant(value.into()),
            transform: None,
        }
    }

    pub fn derived(name: &'static str, derive: DeriveFn) -> Self {
        Self {
            name,
            source: None,
            kind: RuleKind::Derived(derive),
            transform: None,
        }
    }

    pub fn from_key(mut self, source: &'static str) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with(mut self, transform: TransformFn) -> Self {
        self.transform = Some(transform);
        self
    }

    fn source_key(&self) -> &str {
        self.source.unwrap_or(self.name)
    }

    /// Transformer applies to caller-supplied values only; defaults are
    /// emitted verbatim.
    fn render(&self, value: &Value) -> Result<String> {
        match self.transform {
            Some(transform) => transform(value),
            None => Ok(value.to_string()),
        }
    }
}

pub enum UrlSpec {
    Fixed(&'static str),
    Dynamic(UrlFn),
}

impl UrlSpec {
    pub fn resolve(&self, args: &Args) -> String {
        match self {
            UrlSpec::Fixed(url) => (*url).to_string(),
            UrlSpec::Dynamic(f) => f(args),
        }
    }
}

/// User-agent class the transport should impersonate for this endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserAgentClass {
    #[default]
    Any,
    Pc,
    Mobile,
}

/// Static description of one remote operation. Built once at startup,
/// never mutated.
pub struct EndpointDescriptor {
    pub route: &'static str,
    pub method: Method,
    pub url: UrlSpec,
    pub rules: Vec<ParameterRule>,
    pub crypto: CryptoType,
    /// Cookie defaults the call needs even without a session.
    pub cookies: &'static [(&'static str, &'static str)],
    pub user_agent: UserAgentClass,
    /// eapi digests are computed against this path, not the request URL.
    pub url_override: Option<&'static str>,
}

impl EndpointDescriptor {
    pub fn new(route: &'static str, url: &'static str, crypto: CryptoType) -> Self {
        Self {
            route,
            method: Method::Post,
            url: UrlSpec::Fixed(url),
            rules: Vec::new(),
            crypto,
            cookies: &[],
            user_agent: UserAgentClass::Any,
            url_override: None,
        }
    }

    pub fn dynamic(route: &'static str, url: UrlFn, crypto: CryptoType) -> Self {
        Self {
            url: UrlSpec::Dynamic(url),
            ..Self::new(route, "", crypto)
        }
    }

    pub fn rules(mut self, rules: Vec<ParameterRule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn cookies(mut self, cookies: &'static [(&'static str, &'static str)]) -> Self {
        self.cookies = cookies;
        self
    }

    pub fn user_agent(mut self, class: UserAgentClass) -> Self {
        self.user_agent = class;
        self
    }

    pub fn url_override(mut self, path: &'static str) -> Self {
        self.url_override = Some(path);
        self
    }

    /// Resolve `args` into the payload this endpoint expects. Rules fire
    /// in declared order; unknown extra caller keys are ignored.
    pub fn bind(&self, args: &Args) -> Result<Payload> {
        let mut payload = Payload::new();
        for rule in &self.rules {
            let rendered = match &rule.kind {
                RuleKind::Derived(derive) => derive(args)?,
                RuleKind::Required => {
                    let value = args
                        .get(rule.source_key())
                        .ok_or_else(|| Error::MissingParameter(rule.source_key().to_string()))?;
                    rule.render(value)?
                }
                RuleKind::Optional(default) => match args.get(rule.source_key()) {
                    Some(value) => rule.render(value)?,
                    None => default.to_string(),
                },
                RuleKind::Constant(value) => value.to_string(),
            };
            payload.insert(rule.name.to_string(), serde_json::Value::String(rendered));
        }
        log::debug!("{}: bound {} parameters", self.route, payload.len());
        Ok(payload)
    }
}
