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

//! Buyer-side layer 2 connections (virtual circuits).

use super::{object_from_reply, page_from_reply, paging_params};
use crate::client::ApiClient;
use crate::collection::{Collection, ListResponse, PageDescriptor};
use crate::error::ApiError;
use crate::pagination::ListEndpoint;
use crate::record_fields;
use serde::{Deserialize, Serialize};
use tracing::debug;

const CONNECTIONS_PATH: &str = "/ecx/v3/connections";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Connection {
    #[serde(deserialize_with = "super::null_as_default")]
    pub uuid: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub status: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub provider_status: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub redundancy_type: String,
    #[serde(rename = "redundantUUID")]
    #[serde(deserialize_with = "super::null_as_default")]
    pub redundant_uuid: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub metro_code: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub metro_description: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub port_name: String,
    #[serde(rename = "portUUID")]
    #[serde(deserialize_with = "super::null_as_default")]
    pub port_uuid: String,
    pub vlan_s_tag: Option<i64>,
    #[serde(deserialize_with = "super::null_as_default")]
    pub named_tag: String,
    pub speed: Option<i64>,
    #[serde(deserialize_with = "super::null_as_default")]
    pub speed_unit: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub billing_tier: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub authorization_key: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub buyer_organization_name: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub seller_organization_name: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub seller_service_name: String,
    #[serde(rename = "sellerServiceUUID")]
    #[serde(deserialize_with = "super::null_as_default")]
    pub seller_service_uuid: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub seller_metro_code: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub z_side_port_name: String,
    #[serde(rename = "zSidePortUUID")]
    #[serde(deserialize_with = "super::null_as_default")]
    pub z_side_port_uuid: String,
    pub z_side_vlan_s_tag: Option<i64>,
    #[serde(deserialize_with = "super::null_as_default")]
    pub notifications: Vec<String>,
    #[serde(deserialize_with = "super::null_as_default")]
    pub created_by: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub created_date: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub last_updated_date: String,
}

record_fields!(Connection {
    "uuid" => uuid,
    "name" => name,
    "status" => status,
    "providerStatus" => provider_status,
    "redundancyType" => redundancy_type,
    "redundantUUID" => redundant_uuid,
    "metroCode" => metro_code,
    "metroDescription" => metro_description,
    "portName" => port_name,
    "portUUID" => port_uuid,
    "vlanSTag" => vlan_s_tag,
    "namedTag" => named_tag,
    "speed" => speed,
    "speedUnit" => speed_unit,
    "billingTier" => billing_tier,
    "authorizationKey" => authorization_key,
    "buyerOrganizationName" => buyer_organization_name,
    "sellerOrganizationName" => seller_organization_name,
    "sellerServiceName" => seller_service_name,
    "sellerServiceUUID" => seller_service_uuid,
    "sellerMetroCode" => seller_metro_code,
    "zSidePortName" => z_side_port_name,
    "zSidePortUUID" => z_side_port_uuid,
    "zSideVlanSTag" => z_side_vlan_s_tag,
    "notifications" => notifications,
    "createdBy" => created_by,
    "createdDate" => created_date,
    "lastUpdatedDate" => last_updated_date,
});

/// Server-side narrowing for the connection list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionQuery {
    pub metro_code: Option<String>,
}

/// Body of a layer 2 connection order towards a seller service profile.
///
/// Only the shape is enforced here; the API rejects inconsistent orders with
/// a bad-request error list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateL2Connection {
    pub primary_name: String,
    #[serde(rename = "primaryPortUUID")]
    pub primary_port_uuid: String,
    pub primary_vlan_s_tag: i64,
    #[serde(rename = "profileUUID")]
    pub profile_uuid: String,
    pub speed: i64,
    pub speed_unit: String,
    pub notifications: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_metro_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub named_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_order_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_name: Option<String>,
    #[serde(
        rename = "secondaryPortUUID",
        skip_serializing_if = "Option::is_none"
    )]
    pub secondary_port_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_vlan_s_tag: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionCreated {
    #[serde(deserialize_with = "super::null_as_default")]
    pub message: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub primary_connection_id: String,
    pub secondary_connection_id: Option<String>,
    #[serde(deserialize_with = "super::null_as_default")]
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionDeleted {
    #[serde(deserialize_with = "super::null_as_default")]
    pub message: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub primary_connection_id: String,
}

pub struct ConnectionsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ConnectionsApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Every buyer connection, optionally restricted to one metro.
    pub fn list(&self, metro_code: Option<&str>) -> Result<Collection<Connection>, ApiError> {
        let query = ConnectionQuery {
            metro_code: metro_code
                .filter(|m| !m.is_empty())
                .map(str::to_string),
        };
        self.fetch_all(&query)
    }

    pub fn get(&self, uuid: &str) -> Result<Connection, ApiError> {
        let path = format!("{CONNECTIONS_PATH}/{uuid}");
        debug!(uuid, "fetching connection");
        object_from_reply(self.client.get(&path, &[])?, &path)
    }

    pub fn delete(&self, uuid: &str) -> Result<ConnectionDeleted, ApiError> {
        let path = format!("{CONNECTIONS_PATH}/{uuid}");
        debug!(uuid, "deleting connection");
        object_from_reply(self.client.delete(&path)?, &path)
    }

    pub fn create_l2(&self, order: &CreateL2Connection) -> Result<ConnectionCreated, ApiError> {
        debug!(
            name = %order.primary_name,
            profile = %order.profile_uuid,
            "creating layer 2 connection"
        );
        object_from_reply(
            self.client.post_json(CONNECTIONS_PATH, order)?,
            CONNECTIONS_PATH,
        )
    }
}

impl ListEndpoint for ConnectionsApi<'_> {
    type Record = Connection;
    type Query = ConnectionQuery;

    fn fetch(
        &self,
        query: &ConnectionQuery,
        page: Option<PageDescriptor>,
    ) -> Result<ListResponse<Connection>, ApiError> {
        let mut params = Vec::new();
        if let Some(metro) = &query.metro_code {
            params.push(("metroCode", metro.clone()));
        }
        params.extend(paging_params(page, "pageNumber", "pageSize"));
        page_from_reply(self.client.get(CONNECTIONS_PATH, &params)?)
    }
}
