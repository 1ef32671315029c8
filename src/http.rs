//! HTTP helpers shared by the backends and the Java runtime cache.
//!
//! Every upstream field access is fallible: transport and status failures map
//! to [`InstallError::Network`], bodies that do not match the expected shape
//! map to [`InstallError::Schema`].

use crate::error::InstallError;
use serde::de::DeserializeOwned;

const USER_AGENT: &str = concat!("mcserver/", env!("CARGO_PKG_VERSION"));

/// Build the client used for every request.
pub fn client() -> Result<reqwest::Client, InstallError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(InstallError::from)
}

/// GET a URL and fail on non-success status.
pub async fn get(client: &reqwest::Client, url: &str) -> Result<reqwest::Response, InstallError> {
    tracing::debug!("GET {}", url);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| InstallError::Network(format!("Failed to reach {}: {}", url, e)))?;

    if !response.status().is_success() {
        return Err(InstallError::Network(format!(
            "{} returned HTTP {}",
            url,
            response.status().as_u16()
        )));
    }

    Ok(response)
}

/// GET a URL and return the body as text.
async fn get_text(client: &reqwest::Client, url: &str) -> Result<String, InstallError> {
    get(client, url)
        .await?
        .text()
        .await
        .map_err(|e| InstallError::Network(format!("Failed to read body of {}: {}", url, e)))
}

/// GET a URL and decode a JSON body into `T`.
pub async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
) -> Result<T, InstallError> {
    let body = get_text(client, url).await?;
    serde_json::from_str(&body).map_err(|e| InstallError::Schema {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// GET a URL and decode an XML body into `T`.
pub async fn get_xml<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
) -> Result<T, InstallError> {
    let body = get_text(client, url).await?;
    serde_xml_rs::from_str(&body).map_err(|e| InstallError::Schema {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize)]
    struct Payload {
        versions: Vec<String>,
    }

    #[tokio::test]
    async fn test_get_json_decodes_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/list"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(r#"{"versions":["a","b"]}"#, "application/json"),
            )
            .mount(&server)
            .await;

        let client = client().unwrap();
        let payload: Payload = get_json(&client, &format!("{}/list", server.uri()))
            .await
            .unwrap();
        assert_eq!(payload.versions, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_wrong_shape_is_schema_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/list"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(r#"{"nope":1}"#, "application/json"))
            .mount(&server)
            .await;

        let client = client().unwrap();
        let result: Result<Payload, _> = get_json(&client, &format!("{}/list", server.uri())).await;
        assert!(matches!(result, Err(InstallError::Schema { .. })));
    }

    #[tokio::test]
    async fn test_http_error_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client().unwrap();
        let result = get_text(&client, &format!("{}/anything", server.uri())).await;
        match result {
            Err(InstallError::Network(msg)) => assert!(msg.contains("503")),
            other => panic!("expected network error, got {:?}", other),
        }
    }
}
