// ABOUTME: HTTP fetching for pages, stylesheets and images.
// ABOUTME: Applies SSRF protection, content-length limits and charset-aware decoding.

use std::collections::HashMap;
use std::net::IpAddr;

use bytes::Bytes;
use ipnet::{Ipv4Net, Ipv6Net};
use once_cell::sync::Lazy;
use url::Url;

use crate::error::FetchError;

/// Default maximum response size (10 MB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

static PRIVATE_V4: Lazy<Vec<Ipv4Net>> = Lazy::new(|| {
    // RFC1918, loopback, link-local
    ["10.0.0.0/8", "172.16.0.0/12", "192.168.0.0/16", "127.0.0.0/8", "169.254.0.0/16"]
        .iter()
        .filter_map(|net| net.parse().ok())
        .collect()
});
static PRIVATE_V6: Lazy<Vec<Ipv6Net>> = Lazy::new(|| {
    // unique local, link-local
    ["fc00::/7", "fe80::/10"]
        .iter()
        .filter_map(|net| net.parse().ok())
        .collect()
});

/// Options for fetching a resource.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub headers: HashMap<String, String>,
    pub allow_private_networks: bool,
    pub parse_non_200: bool,
    pub max_content_length: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            headers: HashMap::new(),
            allow_private_networks: false,
            parse_non_200: false,
            max_content_length: MAX_CONTENT_LENGTH,
        }
    }
}

/// Result of a successful fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub status: u16,
    pub url: String,
    pub final_url: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl FetchResult {
    /// Decode the body as text, using the charset from the content-type header or detection.
    pub fn text(&self) -> String {
        decode_body(&self.body, self.content_type.as_deref())
    }
}

/// Check if an IP address is in a private/reserved range.
fn is_private_ip(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(ip) => PRIVATE_V4.iter().any(|net| net.contains(ip)),
        IpAddr::V6(ip) => ip.is_loopback() || PRIVATE_V6.iter().any(|net| net.contains(ip)),
    }
}

/// Rejects URLs whose host is, or resolves to, a private address.
async fn guard_private_host(target: &Url, url: &str, reason: &str) -> Result<(), FetchError> {
    let Some(host) = target.host_str() else {
        return Ok(());
    };
    let host = host.trim_start_matches('[').trim_end_matches(']');

    if let Ok(ip) = host.parse::<IpAddr>() {
        if is_private_ip(&ip) {
            return Err(FetchError::ssrf(url, "Fetch", Some(anyhow::anyhow!("{}", reason))));
        }
        return Ok(());
    }

    let port = target.port_or_known_default().unwrap_or(80);
    let addrs = tokio::net::lookup_host((host, port)).await.map_err(|e| {
        FetchError::fetch(url, "Fetch", Some(anyhow::anyhow!("DNS lookup failed: {}", e)))
    })?;
    for socket_addr in addrs {
        if is_private_ip(&socket_addr.ip()) {
            return Err(FetchError::ssrf(url, "Fetch", Some(anyhow::anyhow!("{}", reason))));
        }
    }
    Ok(())
}

/// Decode body bytes to a String using charset from content-type header or detection.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(ct) = content_type {
        if let Some(charset) = extract_charset(ct) {
            if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
                let (decoded, _, _) = encoding.decode(body);
                return decoded.into_owned();
            }
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract charset value from Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    lower.split(';').find_map(|part| {
        part.trim()
            .strip_prefix("charset=")
            .map(|charset| charset.trim_matches('"').trim_matches('\'').to_string())
    })
}

fn check_size(url: &str, len: usize, limit: usize) -> Result<(), FetchError> {
    if len > limit {
        return Err(FetchError::fetch(
            url,
            "Fetch",
            Some(anyhow::anyhow!("content too large: {} bytes (limit {})", len, limit)),
        ));
    }
    Ok(())
}

/// Fetches `url`, refusing private hosts unless allowed and bodies over the size limit.
pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
    opts: &FetchOptions,
) -> Result<FetchResult, FetchError> {
    if url.is_empty() {
        return Err(FetchError::invalid_url(url, "Fetch", None));
    }

    let parsed_url = Url::parse(url).map_err(|e| {
        FetchError::invalid_url(url, "Fetch", Some(anyhow::anyhow!("invalid URL: {}", e)))
    })?;

    let scheme = parsed_url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(FetchError::invalid_url(
            url,
            "Fetch",
            Some(anyhow::anyhow!("scheme must be http or https")),
        ));
    }

    if !opts.allow_private_networks {
        guard_private_host(&parsed_url, url, "private IP addresses are not allowed").await?;
    }

    let mut request = client.get(parsed_url);
    for (key, value) in &opts.headers {
        request = request.header(key, value);
    }

    let response = request
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(url, "Fetch", e))?;

    // redirects may land somewhere private
    if !opts.allow_private_networks {
        guard_private_host(
            response.url(),
            url,
            "redirect to private IP address is not allowed",
        )
        .await?;
    }

    if let Some(len) = response.content_length() {
        check_size(url, len as usize, opts.max_content_length)?;
    }

    let status = response.status().as_u16();
    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_lowercase());

    let body = response
        .bytes()
        .await
        .map_err(|e| FetchError::from_reqwest(url, "Fetch", e))?;

    check_size(url, body.len(), opts.max_content_length)?;

    if !(200..300).contains(&status) && !opts.parse_non_200 {
        return Err(FetchError::fetch(
            url,
            "Fetch",
            Some(anyhow::anyhow!("HTTP status {}", status)),
        ));
    }

    tracing::trace!(url, status, bytes = body.len(), "fetched");

    Ok(FetchResult {
        status,
        url: url.to_string(),
        final_url,
        content_type,
        body,
    })
}
