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

//! Physical buyer ports available for new connections.

use super::array_from_reply;
use crate::client::ApiClient;
use crate::collection::{Collection, ListResponse, PageDescriptor};
use crate::error::ApiError;
use crate::pagination::ListEndpoint;
use crate::record_fields;
use serde::{Deserialize, Serialize};

const PORTS_PATH: &str = "/ecx/v3/port/userport";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Port {
    #[serde(deserialize_with = "super::null_as_default")]
    pub uuid: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub region: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub ibx: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub metro_code: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub device_priority: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub encapsulation: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub status: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub provision_status: String,
    pub port_speed: Option<i64>,
    pub available_bandwidth: Option<i64>,
    #[serde(deserialize_with = "super::null_as_default")]
    pub buyout: bool,
}

record_fields!(Port {
    "uuid" => uuid,
    "name" => name,
    "region" => region,
    "ibx" => ibx,
    "metroCode" => metro_code,
    "devicePriority" => device_priority,
    "encapsulation" => encapsulation,
    "status" => status,
    "provisionStatus" => provision_status,
    "portSpeed" => port_speed,
    "availableBandwidth" => available_bandwidth,
    "buyout" => buyout,
});

pub struct PortsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> PortsApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn list(&self) -> Result<Collection<Port>, ApiError> {
        self.fetch_all(&())
    }
}

impl ListEndpoint for PortsApi<'_> {
    type Record = Port;
    type Query = ();

    fn fetch(&self, _: &(), _: Option<PageDescriptor>) -> Result<ListResponse<Port>, ApiError> {
        array_from_reply(self.client.get(PORTS_PATH, &[])?)
    }
}
