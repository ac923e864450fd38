//! JSON-over-HTTP transport with per-account proxy routing.

use crate::error::NetworkError;
use crate::proxy::ProxyRoute;
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};

/// A single JSON request.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRequest {
    pub method: Method,
    pub url: String,
    /// Sent as `Authorization: Bearer <token>`
    pub bearer: Option<String>,
    pub body: Option<Value>,
}

impl JsonRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            bearer: None,
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            bearer: None,
            body: Some(body),
        }
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }
}

/// Performs one HTTP request and returns the parsed JSON body.
///
/// `proxy = None` is a direct connection. Implementations must not panic on
/// a bad proxy address.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn request_json(
        &self,
        request: JsonRequest,
        proxy: Option<&str>,
    ) -> Result<Value, NetworkError>;
}

/// reqwest-backed transport.
///
/// reqwest binds proxies per client, so one client is built per distinct
/// proxy address and reused for every later request through it.
pub struct ReqwestTransport {
    timeout: Option<Duration>,
    clients: Mutex<HashMap<Option<String>, Client>>,
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ReqwestTransport {
    /// Create a transport. `timeout = None` leaves requests unbounded.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            clients: Mutex::new(HashMap::new()),
        }
    }

    fn client_for(&self, proxy: Option<&str>) -> Result<Client, NetworkError> {
        let key = proxy.map(str::trim).filter(|p| !p.is_empty()).map(str::to_string);

        let mut clients = self
            .clients
            .lock()
            .map_err(|_| NetworkError::transport("client cache poisoned"))?;
        if let Some(client) = clients.get(&key) {
            return Ok(client.clone());
        }

        let client = self.build_client(key.as_deref())?;
        clients.insert(key, client.clone());
        Ok(client)
    }

    fn build_client(&self, proxy: Option<&str>) -> Result<Client, NetworkError> {
        let mut builder = Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let proxy = match ProxyRoute::parse(proxy) {
            Ok(route) => match route.to_reqwest() {
                Ok(p) => {
                    debug!("Client route: {}", route);
                    p
                }
                Err(e) => {
                    warn!("Unusable proxy {}, connecting directly: {}", route, e);
                    None
                }
            },
            Err(e) => {
                warn!("Malformed proxy address, connecting directly: {}", e);
                None
            }
        };

        // Direct means direct: ignore HTTP_PROXY and friends from the environment.
        builder = match proxy {
            Some(p) => builder.proxy(p),
            None => builder.no_proxy(),
        };

        builder
            .build()
            .map_err(|e| NetworkError::transport(format!("HTTP client error: {}", e)))
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn request_json(
        &self,
        request: JsonRequest,
        proxy: Option<&str>,
    ) -> Result<Value, NetworkError> {
        let client = self.client_for(proxy)?;

        let mut builder = client.request(request.method, &request.url);
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| NetworkError::transport(format!("request failed: {}", e)))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| NetworkError::status(status.as_u16(), format!("reading body: {}", e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v.get("message")?.as_str().map(str::to_string))
                .unwrap_or_else(|| format!("status code {}", status.as_u16()));
            return Err(NetworkError::status(status.as_u16(), message));
        }

        serde_json::from_str(&text)
            .map_err(|e| NetworkError::status(status.as_u16(), format!("invalid JSON body: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn get_with_bearer_returns_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/invite-code"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"ok": true}})))
            .mount(&server)
            .await;

        let transport = ReqwestTransport::default();
        let request = JsonRequest::get(format!("{}/users/invite-code", server.uri())).bearer("tok");
        let value = transport.request_json(request, None).await.unwrap();
        assert_eq!(value["data"]["ok"], json!(true));
    }

    #[tokio::test]
    async fn post_sends_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bandwidth/share"))
            .and(body_json(json!({"quality": 80})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
            .expect(1)
            .mount(&server)
            .await;

        let transport = ReqwestTransport::default();
        let url = format!("{}/bandwidth/share", server.uri());
        let request = JsonRequest::post(url, json!({"quality": 80}));
        assert!(transport.request_json(request, None).await.is_ok());
    }

    #[tokio::test]
    async fn error_status_carries_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "exists"})))
            .mount(&server)
            .await;

        let transport = ReqwestTransport::default();
        let err = transport
            .request_json(JsonRequest::post(server.uri(), json!({})), None)
            .await
            .unwrap_err();
        assert_eq!(err, NetworkError::status(401, "exists"));
    }

    #[tokio::test]
    async fn error_status_without_body_uses_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let transport = ReqwestTransport::default();
        let err = transport
            .request_json(JsonRequest::get(server.uri()), None)
            .await
            .unwrap_err();
        assert_eq!(err.status, Some(503));
        assert_eq!(err.message, "status code 503");
    }

    #[tokio::test]
    async fn malformed_proxy_falls_back_to_direct() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"direct": 1})))
            .mount(&server)
            .await;

        let transport = ReqwestTransport::default();
        let value = transport
            .request_json(JsonRequest::get(server.uri()), Some("not a proxy"))
            .await
            .unwrap();
        assert_eq!(value["direct"], json!(1));
    }

    #[tokio::test]
    async fn connection_failure_has_no_status() {
        let transport = ReqwestTransport::new(Some(Duration::from_secs(2)));
        let err = transport
            .request_json(JsonRequest::get("http://127.0.0.1:9/"), None)
            .await
            .unwrap_err();
        assert_eq!(err.status, None);
    }
}
