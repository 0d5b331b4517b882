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

use super::array_from_reply;
use crate::client::ApiClient;
use crate::collection::{Collection, ListResponse, PageDescriptor};
use crate::error::ApiError;
use crate::pagination::ListEndpoint;
use crate::record_fields;
use serde::{Deserialize, Serialize};

const METROS_PATH: &str = "/ecx/v3/metros";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metro {
    #[serde(deserialize_with = "super::null_as_default")]
    pub code: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub region: String,
}

record_fields!(Metro {
    "code" => code,
    "name" => name,
    "region" => region,
});

pub struct MetrosApi<'a> {
    client: &'a ApiClient,
}

impl<'a> MetrosApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn list(&self) -> Result<Collection<Metro>, ApiError> {
        self.fetch_all(&())
    }
}

/// Served as one unpaginated array; paging descriptors are ignored.
impl ListEndpoint for MetrosApi<'_> {
    type Record = Metro;
    type Query = ();

    fn fetch(&self, _: &(), _: Option<PageDescriptor>) -> Result<ListResponse<Metro>, ApiError> {
        array_from_reply(self.client.get(METROS_PATH, &[])?)
    }
}
