use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("dns failure: {0}")]
    Dns(String),

    #[error("connect timeout")]
    ConnectTimeout,

    #[error("request timeout")]
    RequestTimeout,

    #[error("too many redirects")]
    RedirectLoop,

    #[error("http error {status}")]
    Http { status: reqwest::StatusCode },

    #[error("body too large ({0} bytes)")]
    BodyTooLarge(u64),

    #[error("unsupported content-type: {0}")]
    UnsupportedContentType(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("unknown: {0}")]
    Unknown(String),
}

impl FetchError {
    pub fn from_reqwest_error(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            if err.is_connect() {
                Self::ConnectTimeout
            } else {
                Self::RequestTimeout
            }
        } else if err.is_redirect() {
            Self::RedirectLoop
        } else if let Some(status) = err.status() {
            Self::Http { status }
        } else if err.is_connect() {
            Self::Dns(err.to_string())
        } else if err.is_request() {
            Self::Io(err.to_string())
        } else if err.is_decode() || err.is_body() {
            Self::Io(err.to_string())
        } else {
            Self::Unknown(err.to_string())
        }
    }
}
