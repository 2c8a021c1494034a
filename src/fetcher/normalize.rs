use url::Url;

/// Strip the query string and fragment from `raw`, keeping scheme, host and
/// path. Input that does not parse as an absolute URL is returned trimmed but
/// otherwise unchanged.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    match Url::parse(trimmed) {
        Ok(url) => strip(url).to_string(),
        Err(_) => trimmed.to_string(),
    }
}

/// Same as [`normalize_url`] for an already parsed URL.
pub fn strip(mut url: Url) -> Url {
    url.set_query(None);
    url.set_fragment(None);
    url
}
