use url::Url;

use super::SnapshotError;

/// A host page fetched over http(s).
#[derive(Clone)]
pub struct FetchResult {
    pub html: String,
    /// Final address after redirects.
    pub url: String,
}

/// Fetch a host page and return its markup (blocking).
pub fn fetch_url(url_str: &str) -> Result<FetchResult, SnapshotError> {
    let parsed = normalize_url(url_str)?;

    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("chat-toc/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(15))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| SnapshotError::fetch(format!("Client error: {}", e)))?;

    let response = client
        .get(parsed.as_str())
        .header("Accept", "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
        .send()
        .map_err(|e| SnapshotError::fetch(format!("Request failed: {}", e)))?;

    let status = response.status().as_u16();
    if !response.status().is_success() {
        return Err(SnapshotError::fetch(format!("HTTP {} from {}", status, parsed)));
    }
    let final_url = response.url().to_string();

    let html = response
        .text()
        .map_err(|e| SnapshotError::decode(format!("Failed to read body: {}", e)))?;

    log::debug!("Fetched {} ({} bytes, HTTP {})", final_url, html.len(), status);
    Ok(FetchResult {
        html,
        url: final_url,
    })
}

/// Bare hosts get an `https://` scheme.
pub fn normalize_url(url_str: &str) -> Result<Url, SnapshotError> {
    let url = if url_str.starts_with("http://") || url_str.starts_with("https://") {
        url_str.to_string()
    } else {
        format!("https://{}", url_str)
    };
    Url::parse(&url).map_err(|e| SnapshotError::fetch(format!("Invalid URL: {}", e)))
}
