// ecxctl - CLI for the Equinix ECX Fabric API
// Copyright (C) 2024 Mathias Uhl <mathiasuhl@gmx.de>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use crate::config::{Credentials, EffectiveConfig};
use crate::error::ApiError;
use crate::token::{OAuthTokenProvider, StaticToken, TOKEN_PATH, TokenProvider};
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("ecxctl/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct ResponseData {
    pub status: u16,
    pub path: String,
    pub body: String,
}

impl ResponseData {
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body).map_err(|source| ApiError::Decode {
            path: self.path.clone(),
            source,
        })
    }
}

/// A successful answer; 204 is kept apart from bodies.
#[derive(Debug, Clone)]
pub enum Reply {
    Body(ResponseData),
    NoContent,
}

pub struct ApiClient {
    base_url: Url,
    http: Client,
    tokens: Box<dyn TokenProvider>,
}

impl ApiClient {
    pub fn new(endpoint: &str, http: Client, tokens: Box<dyn TokenProvider>) -> Result<Self> {
        let base_url = Url::parse(&normalize_endpoint(endpoint)).context("parsing API endpoint")?;
        Ok(Self {
            base_url,
            http,
            tokens,
        })
    }

    /// Client for a resolved configuration: playground token or OAuth exchange.
    pub fn from_config(config: &EffectiveConfig) -> Result<Self> {
        let http = build_http(config.ignore_ssl)?;
        let endpoint = normalize_endpoint(&config.endpoint);
        debug!(%endpoint, "using API endpoint");

        let tokens: Box<dyn TokenProvider> = match &config.credentials {
            Credentials::Playground { token } => Box::new(StaticToken(token.clone())),
            Credentials::OAuth(request) => {
                let token_url = Url::parse(&endpoint)
                    .and_then(|base| base.join(TOKEN_PATH))
                    .context("building token URL")?;
                Box::new(OAuthTokenProvider::new(
                    http.clone(),
                    token_url,
                    request.clone(),
                ))
            }
        };

        Self::new(&endpoint, http, tokens)
    }

    pub fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Reply, ApiError> {
        self.request(Method::GET, path, query, Option::<&()>::None)
    }

    pub fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Reply, ApiError> {
        self.request(Method::POST, path, &[], Some(body))
    }

    pub fn delete(&self, path: &str) -> Result<Reply, ApiError> {
        self.request(Method::DELETE, path, &[], Option::<&()>::None)
    }

    fn request<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&T>,
    ) -> Result<Reply, ApiError> {
        let normalized = path.trim_start_matches('/');
        let url = self
            .base_url
            .join(normalized)
            .map_err(ApiError::transport)?;
        let token = self.tokens.token()?;

        let mut request = self
            .http
            .request(method.clone(), url)
            .bearer_auth(token)
            .header(ACCEPT, HeaderValue::from_static("application/json"));

        if !query.is_empty() {
            request = request.query(query);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().map_err(ApiError::transport)?;
        let status = response.status();
        let text = response.text().map_err(ApiError::transport)?;
        debug!(%method, path, status = status.as_u16(), "response received");

        match status {
            StatusCode::NO_CONTENT => Ok(Reply::NoContent),
            StatusCode::BAD_REQUEST => Err(ApiError::bad_request(&text)),
            s if s.is_success() => Ok(Reply::Body(ResponseData {
                status: s.as_u16(),
                path: path.to_string(),
                body: text,
            })),
            s => Err(ApiError::Status {
                status: s.as_u16(),
                body: truncate(&text, 200),
            }),
        }
    }
}

pub fn build_http(ignore_ssl: bool) -> Result<Client> {
    if ignore_ssl {
        warn!("insecure mode, ignoring TLS certificate validation");
    }
    Client::builder()
        .user_agent(HeaderValue::from_static(USER_AGENT))
        .danger_accept_invalid_certs(ignore_ssl)
        .build()
        .context("building HTTP client")
}

/// Hosts given without a scheme (`api.equinix.com`) default to https.
pub fn normalize_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim();
    let mut url = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}

fn truncate(text: &str, max: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer) -> ApiClient {
        ApiClient::new(
            &server.base_url(),
            Client::new(),
            Box::new(StaticToken("test-token".into())),
        )
        .unwrap()
    }

    #[test]
    fn sends_bearer_token_and_query() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/ecx/v3/connections")
                .query_param("metroCode", "LD")
                .header("Authorization", "Bearer test-token");
            then.status(200).json_body(json!({"content": []}));
        });

        let reply = client(&server)
            .get("/ecx/v3/connections", &[("metroCode", "LD".into())])
            .unwrap();

        mock.assert();
        let Reply::Body(data) = reply else {
            panic!("expected a body");
        };
        assert_eq!(data.status, 200);
        let value: serde_json::Value = data.decode().unwrap();
        assert!(value["content"].is_array());
    }

    #[test]
    fn posts_json_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/ecx/v3/connections")
                .json_body(json!({"primaryName": "c1"}));
            then.status(200).body(r#"{"primaryConnectionId": "abc"}"#);
        });

        let reply = client(&server)
            .post_json("/ecx/v3/connections", &json!({"primaryName": "c1"}))
            .unwrap();

        mock.assert();
        assert!(matches!(reply, Reply::Body(_)));
    }

    #[test]
    fn no_content_is_not_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/ecx/v3/metros");
            then.status(204);
        });

        let reply = client(&server).get("/ecx/v3/metros", &[]).unwrap();
        assert!(matches!(reply, Reply::NoContent));
    }

    #[test]
    fn bad_request_carries_server_errors() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/ecx/v3/connections");
            then.status(400).json_body(json!([
                {"errorCode": "IC-LAYER2-4001", "errorMessage": "Invalid metro"},
                {"errorCode": "IC-LAYER2-4002", "errorMessage": "Invalid page"}
            ]));
        });

        let err = client(&server).get("/ecx/v3/connections", &[]).unwrap_err();
        let codes: Vec<_> = err.entries().iter().map(|e| e.error_code.as_str()).collect();
        assert_eq!(codes, vec!["IC-LAYER2-4001", "IC-LAYER2-4002"]);
    }

    #[test]
    fn other_statuses_are_status_errors() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/ecx/v3/connections");
            then.status(401).body("token expired");
        });

        let err = client(&server).get("/ecx/v3/connections", &[]).unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 401, ref body } if body == "token expired"));
    }

    #[test]
    fn unreachable_host_is_transport_error() {
        let client = ApiClient::new(
            "http://127.0.0.1:1",
            Client::new(),
            Box::new(StaticToken("t".into())),
        )
        .unwrap();
        let err = client.get("/ecx/v3/metros", &[]).unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[test]
    fn decode_failure_names_the_path() {
        let data = ResponseData {
            status: 200,
            path: "/ecx/v3/metros".into(),
            body: "<html>".into(),
        };
        let err = data.decode::<Vec<String>>().unwrap_err();
        assert!(err.to_string().contains("/ecx/v3/metros"));
    }

    #[test]
    fn normalizes_endpoints() {
        assert_eq!(normalize_endpoint("api.equinix.com"), "https://api.equinix.com/");
        assert_eq!(normalize_endpoint("http://localhost:8080"), "http://localhost:8080/");
        assert_eq!(normalize_endpoint("https://x.test/base/"), "https://x.test/base/");
    }

    #[test]
    fn truncates_long_bodies() {
        let long = "x".repeat(300);
        let short = truncate(&long, 200);
        assert_eq!(short.len(), 203);
        assert!(short.ends_with("..."));
    }
}
