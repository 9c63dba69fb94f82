//! Shared HTTP plumbing for the live provider adapters

use crate::config::ProviderSettings;
use crate::error::FetchError;
use anyhow::{Context, Result};
use reqwest::{Client, Response, StatusCode, Url};
use tracing::debug;

/// Build the HTTP client shared by all adapters
pub fn build_client(settings: &ProviderSettings) -> Result<Client> {
    Client::builder()
        .user_agent(settings.user_agent.as_str())
        .timeout(settings.http_timeout())
        .build()
        .context("Failed to build HTTP client")
}

/// Append `segments` to `base_url` as path segments, percent-encoding each one
pub fn endpoint_url(base_url: &str, segments: &[&str]) -> Result<Url, FetchError> {
    let mut url = Url::parse(base_url).map_err(|e| FetchError::Transient {
        message: format!("invalid provider URL {}: {}", base_url, e),
    })?;

    url.path_segments_mut()
        .map_err(|_| FetchError::Transient {
            message: format!("provider URL {} cannot take a path", base_url),
        })?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

/// Send a GET request, mapping 404 to [`FetchError::NotFound`]
pub async fn get(client: &Client, url: &str, username: &str) -> Result<Response, FetchError> {
    debug!("GET {}", url);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::Transient {
            message: format!("request to {} failed: {}", url, e),
        })?;

    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::NOT_FOUND => Err(FetchError::NotFound {
            username: username.to_string(),
        }),
        status => Err(FetchError::Transient {
            message: format!("{} returned status {}", url, status),
        }),
    }
}

/// Fetch and decode a JSON body
pub async fn get_json(
    client: &Client,
    url: &str,
    username: &str,
) -> Result<serde_json::Value, FetchError> {
    get(client, url, username)
        .await?
        .json()
        .await
        .map_err(|e| FetchError::Transient {
            message: format!("invalid JSON from {}: {}", url, e),
        })
}

/// Fetch a text body
pub async fn get_text(client: &Client, url: &str, username: &str) -> Result<String, FetchError> {
    get(client, url, username)
        .await?
        .text()
        .await
        .map_err(|e| FetchError::Transient {
            message: format!("unreadable body from {}: {}", url, e),
        })
}

/// Read an integer rating from a JSON value, accepting numbers or numeric strings
pub fn rating_from_json(value: &serde_json::Value) -> Option<i32> {
    match value {
        serde_json::Value::Number(n) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rating_from_json() {
        assert_eq!(rating_from_json(&json!(1850)), Some(1850));
        assert_eq!(rating_from_json(&json!("1850")), Some(1850));
        assert_eq!(rating_from_json(&json!(null)), None);
        assert_eq!(rating_from_json(&json!("unrated")), None);
    }

    #[test]
    fn test_endpoint_url_encodes_segments() {
        let url = endpoint_url("https://lichess.org/", &["api", "user", "a/b?c#d"]).unwrap();
        assert_eq!(url.as_str(), "https://lichess.org/api/user/a%2Fb%3Fc%23d");

        let nested = endpoint_url("http://localhost:8080/mirror", &["api", "user", "x"]).unwrap();
        assert_eq!(nested.as_str(), "http://localhost:8080/mirror/api/user/x");
    }

    #[test]
    fn test_endpoint_url_rejects_bad_base() {
        assert!(matches!(
            endpoint_url("not a url", &["api"]),
            Err(FetchError::Transient { .. })
        ));
    }

    #[test]
    fn test_build_client() {
        assert!(build_client(&ProviderSettings::default()).is_ok());
    }
}
