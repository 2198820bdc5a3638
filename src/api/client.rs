use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::api::types::{ListMethod, ListRequest, PagedResult, SaveMode};
use crate::api::ResourceBackend;
use crate::config::ApiConfig;
use crate::error::ClientError;
use crate::types::EntityId;

/// Thin wrapper over `reqwest` for the school API. Attaches the bearer token
/// and maps non-success responses to [`ClientError`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    log_requests: bool,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = base_url.into();
        Url::parse(&base_url).map_err(|e| ClientError::invalid_endpoint(&base_url, e))?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url,
            token: None,
            log_requests: false,
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ClientError> {
        let mut client = Self::new(config.base_url.clone(), config.request_timeout())?;
        client.log_requests = config.enable_request_logging;
        Ok(client)
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join an endpoint onto the base URL, keeping any path prefix the base
    /// carries and any query the endpoint carries
    pub fn url(&self, endpoint: &str) -> Result<Url, ClientError> {
        let joined = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| ClientError::invalid_endpoint(endpoint, e))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        if self.log_requests {
            tracing::debug!("{} {}", method, url);
        }
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn check(&self, response: Response) -> Result<String, ClientError> {
        let status = response.status();
        let url = response.url().clone();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        let err = ClientError::from_response(status.as_u16(), &body);
        match &err {
            ClientError::Unauthorized(_) => {
                tracing::warn!("Unauthorized response from {}; session token rejected", url);
            }
            _ => {
                tracing::debug!("{} returned {}: {}", url, status, err);
            }
        }
        Err(err)
    }

    /// Fetch one page from a list endpoint
    pub async fn list(&self, request: &ListRequest) -> Result<PagedResult, ClientError> {
        let mut url = self.url(&request.endpoint)?;
        let builder = match request.method {
            ListMethod::Get => {
                url.query_pairs_mut().extend_pairs(request.query());
                self.request(Method::GET, url)
            }
            ListMethod::Post => self.request(Method::POST, url).json(&request.body()),
        };

        let body = self.check(builder.send().await?).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// `DELETE <endpoint>?id=<id>`; only the status matters
    pub async fn delete(&self, endpoint: &str, id: &EntityId) -> Result<(), ClientError> {
        let mut url = self.url(endpoint)?;
        url.query_pairs_mut().append_pair("id", id.as_str());
        self.check(self.request(Method::DELETE, url).send().await?).await?;
        Ok(())
    }

    /// `GET <endpoint>?id=<id>`
    pub async fn get_by_id(&self, endpoint: &str, id: &EntityId) -> Result<Value, ClientError> {
        let mut url = self.url(endpoint)?;
        url.query_pairs_mut().append_pair("id", id.as_str());
        let body = self.check(self.request(Method::GET, url).send().await?).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Create (POST) or update (PUT) a record. Some endpoints answer with
    /// plain text, which is handed back as a JSON string.
    pub async fn save(&self, endpoint: &str, mode: SaveMode, record: &Value) -> Result<Value, ClientError> {
        let url = self.url(endpoint)?;
        let method = match mode {
            SaveMode::Create => Method::POST,
            SaveMode::Update => Method::PUT,
        };
        let body = self.check(self.request(method, url).json(record).send().await?).await?;

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    }
}

#[async_trait]
impl ResourceBackend for ApiClient {
    async fn list(&self, request: &ListRequest) -> Result<PagedResult, ClientError> {
        ApiClient::list(self, request).await
    }

    async fn delete(&self, endpoint: &str, id: &EntityId) -> Result<(), ClientError> {
        ApiClient::delete(self, endpoint, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn url_keeps_base_path_and_endpoint_query() {
        let url = client("https://school.example.com/backend/").url("/api/users/getAll/12?type=TEACHER").unwrap();
        assert_eq!(url.as_str(), "https://school.example.com/backend/api/users/getAll/12?type=TEACHER");
    }

    #[test]
    fn relative_endpoints_join_the_same_way() {
        let url = client("http://localhost:8080").url("api/schoolClasses/getAll/3").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/schoolClasses/getAll/3");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = ApiClient::new("not a url", Duration::from_secs(1)).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_ENDPOINT");
    }

    #[test]
    fn empty_token_is_ignored() {
        let c = client("http://localhost:8080").with_token(Some(String::new()));
        assert!(c.token.is_none());
    }
}
