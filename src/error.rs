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

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// One `{errorCode, errorMessage}` entry of a 400 response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorEntry {
    #[serde(default)]
    pub error_code: String,
    #[serde(default)]
    pub error_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub more_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
}

impl fmt::Display for ApiErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error {} with message {}", self.error_code, self.error_message)
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),
    #[error("bad request: {}", join_entries(.0))]
    BadRequest(Vec<ApiErrorEntry>),
    #[error("decoding response from `{path}`: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("`{path}` returned no content")]
    NoContent { path: String },
    #[error("routing instance name `{name}` already exists in metro {metro_code}")]
    NameTaken { name: String, metro_code: String },
}

impl ApiError {
    pub fn transport(err: impl Into<BoxError>) -> Self {
        Self::Transport(err.into())
    }

    /// Parse a 400 body into the server's error list.
    ///
    /// The envelope is usually an array, occasionally a single object. Anything
    /// else is kept verbatim as the message of one entry.
    pub fn bad_request(body: &str) -> Self {
        if let Ok(entries) = serde_json::from_str::<Vec<ApiErrorEntry>>(body) {
            if !entries.is_empty() {
                return Self::BadRequest(entries);
            }
        }
        if let Ok(entry) = serde_json::from_str::<ApiErrorEntry>(body) {
            if !entry.error_code.is_empty() || !entry.error_message.is_empty() {
                return Self::BadRequest(vec![entry]);
            }
        }
        Self::BadRequest(vec![ApiErrorEntry {
            error_code: String::new(),
            error_message: body.trim().to_string(),
            more_info: None,
            property: None,
        }])
    }

    pub fn entries(&self) -> &[ApiErrorEntry] {
        match self {
            Self::BadRequest(entries) => entries,
            _ => &[],
        }
    }
}

fn join_entries(entries: &[ApiErrorEntry]) -> String {
    entries
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_error_array() {
        let err = ApiError::bad_request(
            r#"[{"errorCode":"IC-LAYER2-4021","errorMessage":"Invalid vlan","property":"primaryVlanSTag"}]"#,
        );
        let entries = err.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].error_code, "IC-LAYER2-4021");
        assert_eq!(entries[0].property.as_deref(), Some("primaryVlanSTag"));
        assert_eq!(
            err.to_string(),
            "bad request: Error IC-LAYER2-4021 with message Invalid vlan"
        );
    }

    #[test]
    fn parses_single_error_object() {
        let err = ApiError::bad_request(r#"{"errorCode":"E1","errorMessage":"nope"}"#);
        assert_eq!(err.entries()[0].error_code, "E1");
    }

    #[test]
    fn keeps_unstructured_body_as_message() {
        let err = ApiError::bad_request("  upstream exploded \n");
        let entries = err.entries();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].error_code.is_empty());
        assert_eq!(entries[0].error_message, "upstream exploded");
    }

    #[test]
    fn transport_error_wraps_message() {
        let err = ApiError::transport("connection reset");
        assert_eq!(err.to_string(), "transport error: connection reset");
        assert!(err.entries().is_empty());
    }
}
