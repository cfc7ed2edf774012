use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The embedded public-key constant failed structural validation.
    /// This indicates build corruption and is fatal.
    #[error("malformed public key")]
    MalformedKey,
    #[error("missing required parameter: {0}")]
    MissingParameter(String),
    #[error("unsupported value type: {0}")]
    UnsupportedValueType(String),
    #[error("cbc mode requires an iv")]
    MissingIv,
    #[error("ecb mode does not take an iv")]
    UnexpectedIv,
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Crypto(#[from] openssl::error::ErrorStack),
}

pub type Result<T> = std::result::Result<T, Error>;
