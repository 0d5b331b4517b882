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

//! Typed records and endpoints of the ECX Fabric buyer API.

pub mod connections;
pub mod metros;
pub mod ports;
pub mod routing;
pub mod sellers;

use crate::client::Reply;
use crate::collection::{Collection, ListResponse, PageDescriptor};
use crate::error::ApiError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// Paged list body. L3 seller services name the item list `sellerServices`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageEnvelope<T> {
    #[serde(default)]
    total_count: u64,
    #[serde(default)]
    page_size: u64,
    #[serde(default = "Vec::new", alias = "sellerServices")]
    content: Vec<T>,
}

pub(crate) fn page_from_reply<T: DeserializeOwned>(
    reply: Reply,
) -> Result<ListResponse<T>, ApiError> {
    match reply {
        Reply::NoContent => Ok(ListResponse::NoContent),
        Reply::Body(data) => {
            let page: PageEnvelope<T> = data.decode()?;
            Ok(ListResponse::Page {
                items: page.content,
                total_count: page.total_count,
                page_size: page.page_size,
            })
        }
    }
}

/// Bare JSON array answered in one go, reported as a single full page.
pub(crate) fn array_from_reply<T: DeserializeOwned>(
    reply: Reply,
) -> Result<ListResponse<T>, ApiError> {
    match reply {
        Reply::NoContent => Ok(ListResponse::NoContent),
        Reply::Body(data) => {
            let items: Vec<T> = data.decode()?;
            Ok(Collection::from_items(items).into())
        }
    }
}

pub(crate) fn object_from_reply<T: DeserializeOwned>(
    reply: Reply,
    path: &str,
) -> Result<T, ApiError> {
    match reply {
        Reply::Body(data) => data.decode(),
        Reply::NoContent => Err(ApiError::NoContent {
            path: path.to_string(),
        }),
    }
}

/// Explicit `null` decodes like a missing key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Query pairs for an explicit page; the initial request carries none.
pub(crate) fn paging_params(
    page: Option<PageDescriptor>,
    number_key: &'static str,
    size_key: &'static str,
) -> Vec<(&'static str, String)> {
    match page {
        Some(p) => vec![
            (number_key, p.page_number.to_string()),
            (size_key, p.page_size.to_string()),
        ],
        None => Vec::new(),
    }
}
