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

use crate::error::ApiError;
use once_cell::sync::OnceCell;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const TOKEN_PATH: &str = "oauth2/v1/token";
pub const DEFAULT_GRANT_TYPE: &str = "client_credentials";

/// Supplies the bearer credential attached to every API request.
pub trait TokenProvider {
    fn token(&self) -> Result<String, ApiError>;
}

/// Fixed token, as handed out by the developer playground.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

impl TokenProvider for StaticToken {
    fn token(&self) -> Result<String, ApiError> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthRequest {
    pub client_id: String,
    pub client_secret: String,
    pub grant_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_password: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Exchanges application credentials for an access token on first use.
///
/// The token is kept for the lifetime of the provider and never refreshed;
/// a failed exchange is not remembered and is retried on the next call.
#[derive(Debug)]
pub struct OAuthTokenProvider {
    http: Client,
    token_url: Url,
    request: OAuthRequest,
    token: OnceCell<String>,
}

impl OAuthTokenProvider {
    pub fn new(http: Client, token_url: Url, request: OAuthRequest) -> Self {
        Self {
            http,
            token_url,
            request,
            token: OnceCell::new(),
        }
    }

    fn authenticate(&self) -> Result<String, ApiError> {
        debug!(
            url = %self.token_url,
            client_id = %self.request.client_id,
            grant_type = %self.request.grant_type,
            "requesting access token"
        );
        let response = self
            .http
            .post(self.token_url.clone())
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .json(&self.request)
            .send()
            .map_err(ApiError::transport)?;

        let status = response.status();
        let text = response.text().map_err(ApiError::transport)?;
        if !status.is_success() {
            return Err(ApiError::Auth(format!(
                "token endpoint answered HTTP {}: {}",
                status.as_u16(),
                text.trim()
            )));
        }

        let parsed: TokenResponse = serde_json::from_str(&text).map_err(|source| {
            ApiError::Decode {
                path: TOKEN_PATH.to_string(),
                source,
            }
        })?;
        debug!("token acquired");
        Ok(parsed.access_token)
    }
}

impl TokenProvider for OAuthTokenProvider {
    fn token(&self) -> Result<String, ApiError> {
        self.token
            .get_or_try_init(|| self.authenticate())
            .map(Clone::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn request() -> OAuthRequest {
        OAuthRequest {
            client_id: "app".into(),
            client_secret: "secret".into(),
            grant_type: DEFAULT_GRANT_TYPE.into(),
            user_name: Some("user".into()),
            user_password: None,
        }
    }

    fn provider(server: &MockServer) -> OAuthTokenProvider {
        let url = Url::parse(&server.url("/oauth2/v1/token")).unwrap();
        OAuthTokenProvider::new(Client::new(), url, request())
    }

    #[test]
    fn exchanges_credentials_once() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/oauth2/v1/token").json_body(json!({
                "client_id": "app",
                "client_secret": "secret",
                "grant_type": "client_credentials",
                "user_name": "user"
            }));
            then.status(200)
                .json_body(json!({"access_token": "tok-1", "token_timeout": "3600"}));
        });

        let provider = provider(&server);
        assert_eq!(provider.token().unwrap(), "tok-1");
        assert_eq!(provider.token().unwrap(), "tok-1");
        mock.assert_hits(1);
    }

    #[test]
    fn rejected_credentials_are_auth_errors() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/oauth2/v1/token");
            then.status(401).body("invalid client");
        });

        let provider = provider(&server);
        let err = provider.token().unwrap_err();
        assert!(matches!(err, ApiError::Auth(ref m) if m.contains("401")));
        // failures are not memoized
        assert!(provider.token().is_err());
        mock.assert_hits(2);
    }

    #[test]
    fn malformed_token_body_is_decode_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/oauth2/v1/token");
            then.status(200).json_body(json!({"token": "wrong-key"}));
        });

        let err = provider(&server).token().unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[test]
    fn static_token_is_returned_verbatim() {
        assert_eq!(StaticToken("play".into()).token().unwrap(), "play");
    }
}
