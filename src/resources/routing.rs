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

use super::{object_from_reply, page_from_reply, paging_params};
use crate::client::ApiClient;
use crate::collection::{Collection, ListResponse, PageDescriptor};
use crate::error::ApiError;
use crate::pagination::ListEndpoint;
use crate::record_fields;
use serde::{Deserialize, Serialize};
use tracing::debug;

const ROUTING_PATH: &str = "/ecx/v3/l3/routinginstance";
const EXISTS_PATH: &str = "/ecx/v3/l3/routinginstance/exist";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoutingInstance {
    #[serde(deserialize_with = "super::null_as_default")]
    pub uuid: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub metro_code: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub state: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub route_type: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub redundancy_type: String,
    pub asn: Option<i64>,
    #[serde(deserialize_with = "super::null_as_default")]
    pub created_by: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub created_date: String,
}

record_fields!(RoutingInstance {
    "uuid" => uuid,
    "name" => name,
    "metroCode" => metro_code,
    "state" => state,
    "routeType" => route_type,
    "redundancyType" => redundancy_type,
    "asn" => asn,
    "createdBy" => created_by,
    "createdDate" => created_date,
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingQuery {
    pub metro_code: Option<String>,
    pub states: Vec<String>,
}

/// Body of a layer 3 routing instance order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoutingInstance {
    pub metro_code: String,
    #[serde(rename = "primaryRIName")]
    pub primary_name: String,
    #[serde(rename = "secondaryRIName", skip_serializing_if = "Option::is_none")]
    pub secondary_name: Option<String>,
    pub route_type: String,
    pub asn: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bgp_authorization_key: Option<String>,
    pub notification_emails: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RoutingInstanceCreated {
    #[serde(rename = "primaryRIUUID", default)]
    primary_uuid: String,
}

#[derive(Debug, Deserialize)]
struct ExistsResponse {
    #[serde(default)]
    exist: bool,
}

pub struct RoutingApi<'a> {
    client: &'a ApiClient,
}

impl<'a> RoutingApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn list(&self, query: &RoutingQuery) -> Result<Collection<RoutingInstance>, ApiError> {
        self.fetch_all(query)
    }

    /// Whether `name` is already taken in `metro_code`.
    pub fn name_exists(&self, name: &str, metro_code: &str) -> Result<bool, ApiError> {
        let params = [
            ("name", name.to_string()),
            ("metroCode", metro_code.to_string()),
        ];
        let reply = self.client.get(EXISTS_PATH, &params)?;
        let exists: ExistsResponse = object_from_reply(reply, EXISTS_PATH)?;
        Ok(exists.exist)
    }

    /// Order a routing instance and return the primary instance UUID.
    ///
    /// The primary name is checked first; a taken name fails with
    /// [`ApiError::NameTaken`] before anything is posted.
    pub fn create(&self, order: &CreateRoutingInstance) -> Result<String, ApiError> {
        if self.name_exists(&order.primary_name, &order.metro_code)? {
            return Err(ApiError::NameTaken {
                name: order.primary_name.clone(),
                metro_code: order.metro_code.clone(),
            });
        }
        debug!(
            name = %order.primary_name,
            metro = %order.metro_code,
            "creating routing instance"
        );
        let reply = self.client.post_json(ROUTING_PATH, order)?;
        let created: RoutingInstanceCreated = object_from_reply(reply, ROUTING_PATH)?;
        Ok(created.primary_uuid)
    }
}

impl ListEndpoint for RoutingApi<'_> {
    type Record = RoutingInstance;
    type Query = RoutingQuery;

    fn fetch(
        &self,
        query: &RoutingQuery,
        page: Option<PageDescriptor>,
    ) -> Result<ListResponse<RoutingInstance>, ApiError> {
        let mut params = Vec::new();
        if let Some(metro) = &query.metro_code {
            params.push(("metroCode", metro.clone()));
        }
        params.extend(query.states.iter().map(|s| ("states", s.clone())));
        params.extend(paging_params(page, "pageNumber", "pageSize"));
        page_from_reply(self.client.get(ROUTING_PATH, &params)?)
    }
}
