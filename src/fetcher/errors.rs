use thiserror::Error;

/// Transport- and protocol-level failure of a single HTTP attempt.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("unsupported url scheme: {0}")]
    UnsupportedScheme(String),

    #[error("dns failure: {0}")]
    Dns(String),

    #[error("connection failed: {0}")]
    Connect(String),

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

    #[error("render backend error: {0}")]
    RenderBackend(String),

    #[error("http client setup failed: {0}")]
    Client(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("unknown: {0}")]
    Unknown(String),
}

impl FetchError {
    pub fn should_retry(&self) -> bool {
        crate::fetcher::classify::classify(self).is_transient()
    }

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
            let message = err.to_string();
            if message.contains("dns") || message.contains("resolve") {
                Self::Dns(message)
            } else {
                Self::Connect(message)
            }
        } else if err.is_body() || err.is_decode() {
            Self::Io(err.to_string())
        } else if err.is_request() {
            Self::Connect(err.to_string())
        } else {
            Self::Unknown(err.to_string())
        }
    }
}

/// Why a single fetch strategy produced no markup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrategyMiss {
    /// The remote actively refused us (401/403).
    #[error("access blocked (HTTP {0})")]
    Blocked(u16),

    /// Any other 4xx.
    #[error("client error (HTTP {0})")]
    ClientError(u16),

    /// Timeouts, DNS failures, resets and 5xx/429 that outlived their retries.
    #[error("transient failure: {0}")]
    Transient(String),

    /// The strategy needs a credential or endpoint that is not configured.
    #[error("not configured")]
    NotConfigured,

    #[error("{0}")]
    Failed(String),
}
