use crate::fetcher::{
    decode::decode_body,
    errors::FetchError,
    types::{RawPage, StrategyKind},
};
use chrono::Utc;
use reqwest::{Client, ClientBuilder, RequestBuilder, header};
use std::time::Duration;
use url::Url;

const MAX_BODY_SIZE: u64 = 5 * 1024 * 1024; // 5MB
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Realistic desktop browser identification; many news sites refuse bot agents.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Build an HTTP client whose whole-request timeout is `timeout`.
pub fn build_client(timeout: Duration) -> Result<Client, FetchError> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        header::HeaderValue::from_static("en-US,en;q=0.9"),
    );

    ClientBuilder::new()
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .timeout(timeout)
        .user_agent(BROWSER_USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(10))
        .default_headers(headers)
        .build()
        .map_err(|e| FetchError::Client(e.to_string()))
}

/// Only http(s) URLs are ever sent over the wire.
pub fn ensure_http(url: &Url) -> Result<(), FetchError> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(FetchError::UnsupportedScheme(other.to_string())),
    }
}

/// Send `request` and turn the response into a [`RawPage`] for `page_url`.
///
/// Origin fetches must answer with HTML; render and proxy backends are
/// trusted to return markup whatever their content type says.
pub async fn send(
    request: RequestBuilder,
    page_url: &Url,
    strategy: StrategyKind,
) -> Result<RawPage, FetchError> {
    let response = request.send().await.map_err(FetchError::from_reqwest_error)?;

    // Status first: a refusal stays a refusal however large its body.
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Http { status });
    }

    if let Some(content_length) = response.content_length()
        && content_length > MAX_BODY_SIZE
    {
        return Err(FetchError::BodyTooLarge(content_length));
    }

    let url = if strategy.hits_origin() {
        response.url().clone()
    } else {
        page_url.clone()
    };

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .unwrap_or("text/html")
        .to_string();

    if strategy.hits_origin()
        && !content_type.contains("text/html")
        && !content_type.contains("application/xhtml")
    {
        return Err(FetchError::UnsupportedContentType(content_type));
    }

    let body = response
        .bytes()
        .await
        .map_err(FetchError::from_reqwest_error)?;

    // Content-Length may be missing or wrong
    if body.len() as u64 > MAX_BODY_SIZE {
        return Err(FetchError::BodyTooLarge(body.len() as u64));
    }

    let (html, charset) = decode_body(&content_type, &body);

    Ok(RawPage {
        url,
        status,
        html,
        charset,
        strategy,
        fetched_at: Utc::now(),
    })
}
