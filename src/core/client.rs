use crate::domain::model::Record;
use crate::utils::error::{EtlError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// How the remote API expects the token to be presented.
#[derive(Debug, Clone)]
pub enum Auth {
    /// IC Project style `X-Auth-Token` header.
    Token(String),
    /// `Authorization: Bearer <token>` (Apilo).
    Bearer(String),
}

/// Thin JSON client over one API instance. Holds the base URL and auth
/// header; endpoints are addressed by relative path.
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, auth: Auth) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let invalid_token = |_| EtlError::InvalidConfigValue {
            field: "authorization token".to_string(),
            reason: "token contains characters not allowed in a header".to_string(),
        };
        match auth {
            Auth::Token(token) => {
                headers.insert(
                    "X-Auth-Token",
                    HeaderValue::from_str(&token).map_err(invalid_token)?,
                );
            }
            Auth::Bearer(token) => {
                headers.insert(
                    AUTHORIZATION,
                    HeaderValue::from_str(&format!("Bearer {}", token)).map_err(invalid_token)?,
                );
            }
        }

        let http = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let base_url: String = base_url.into();
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Non-success statuses become `Api { status, body }` with the server
    /// body preserved for the operator.
    async fn expect_success(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(EtlError::Api {
            status: status.as_u16(),
            body,
        })
    }

    pub async fn get_value(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<serde_json::Value> {
        tracing::debug!("GET {}", path);
        let response = self.http.get(self.url(path)).query(query).send().await?;
        let response = Self::expect_success(response).await?;
        Ok(response.json().await?)
    }

    /// A list endpoint: the body must be a JSON array of objects.
    pub async fn get_records(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<Vec<Record>> {
        match self.get_value(path, query).await? {
            serde_json::Value::Array(items) => Ok(items
                .into_iter()
                .filter_map(Record::from_value)
                .collect()),
            _ => Err(EtlError::Payload(format!(
                "expected a JSON array from {}",
                path
            ))),
        }
    }

    /// Creates an entity and returns the created record (201 with a body).
    pub async fn create(&self, path: &str, payload: &serde_json::Value) -> Result<Record> {
        tracing::debug!("POST {}", path);
        let response = self.http.post(self.url(path)).json(payload).send().await?;
        let response = Self::expect_success(response).await?;
        let value: serde_json::Value = response.json().await?;
        Record::from_value(value)
            .ok_or_else(|| EtlError::Payload(format!("expected a JSON object from {}", path)))
    }

    /// Fire-and-check creation: only the status matters.
    pub async fn submit(&self, path: &str, payload: &serde_json::Value) -> Result<()> {
        tracing::debug!("POST {}", path);
        let response = self.http.post(self.url(path)).json(payload).send().await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    /// Body-less PATCH, used for server-side actions like PDF generation.
    pub async fn patch(&self, path: &str) -> Result<()> {
        tracing::debug!("PATCH {}", path);
        let response = self.http.patch(self.url(path)).send().await?;
        Self::expect_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_token_auth_header_is_sent() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/things")
                .header("X-Auth-Token", "secret");
            then.status(200).json_body(json!([]));
        });

        let client = ApiClient::new(server.base_url(), Auth::Token("secret".into())).unwrap();
        let records = client.get_records("things", &[]).await.unwrap();

        mock.assert();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_bearer_auth_header_is_sent() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/orders")
                .header("Authorization", "Bearer abc123");
            then.status(200).json_body(json!({"orders": []}));
        });

        let client = ApiClient::new(server.base_url(), Auth::Bearer("abc123".into())).unwrap();
        let value = client.get_value("orders", &[]).await.unwrap();

        mock.assert();
        assert!(value.get("orders").is_some());
    }

    #[tokio::test]
    async fn test_error_status_carries_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/things");
            then.status(422).body("validation failed");
        });

        let client = ApiClient::new(server.base_url(), Auth::Token("t".into())).unwrap();
        let err = client.get_records("things", &[]).await.unwrap_err();

        match err {
            EtlError::Api { status, body } => {
                assert_eq!(status, 422);
                assert_eq!(body, "validation failed");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_array_list_response_is_rejected() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/things");
            then.status(200).json_body(json!({"unexpected": true}));
        });

        let client = ApiClient::new(server.base_url(), Auth::Token("t".into())).unwrap();
        assert!(matches!(
            client.get_records("things", &[]).await,
            Err(EtlError::Payload(_))
        ));
    }

    #[tokio::test]
    async fn test_create_returns_created_record() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/finance/tax-rates")
                .json_body(json!({"name": "VAT 23%", "value": 23.0, "isDefault": false}));
            then.status(201)
                .json_body(json!({"id": "tr-1", "name": "VAT 23%"}));
        });

        let client = ApiClient::new(server.base_url(), Auth::Token("t".into())).unwrap();
        let created = client
            .create(
                "finance/tax-rates",
                &json!({"name": "VAT 23%", "value": 23.0, "isDefault": false}),
            )
            .await
            .unwrap();

        mock.assert();
        assert_eq!(created.str("id"), Some("tr-1"));
    }
}
