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

//! Seller offerings: layer 2 service profiles and layer 3 seller services.
//!
//! Both lists are paginated, but with different parameter names. Profiles
//! take `pageNumber`/`pageSize` and a repeated `metroCode`; L3 services take
//! `page`/`total` and a repeated `metros`.

use super::{object_from_reply, page_from_reply, paging_params};
use crate::client::ApiClient;
use crate::collection::{Collection, ListResponse, PageDescriptor};
use crate::error::ApiError;
use crate::pagination::ListEndpoint;
use crate::record_fields;
use serde::{Deserialize, Serialize};

const PROFILES_PATH: &str = "/ecx/v3/serviceprofiles";
const L3_SERVICES_PATH: &str = "/ecx/v3/l3/seller/services";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SellerProfile {
    #[serde(deserialize_with = "super::null_as_default")]
    pub uuid: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub state: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub organization_name: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub global_organization: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub integration_id: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub auth_key_label: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub connection_name_label: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub required_redundancy: bool,
    #[serde(deserialize_with = "super::null_as_default")]
    pub allow_custom_speed: bool,
    #[serde(deserialize_with = "super::null_as_default")]
    pub private: bool,
    #[serde(deserialize_with = "super::null_as_default")]
    pub speed_from_api: bool,
    #[serde(deserialize_with = "super::null_as_default")]
    pub metros: Vec<serde_json::Value>,
    #[serde(deserialize_with = "super::null_as_default")]
    pub speed_bands: Vec<serde_json::Value>,
    #[serde(deserialize_with = "super::null_as_default")]
    pub created_by: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub created_date: String,
}

record_fields!(SellerProfile {
    "uuid" => uuid,
    "name" => name,
    "description" => description,
    "state" => state,
    "organizationName" => organization_name,
    "globalOrganization" => global_organization,
    "integrationId" => integration_id,
    "authKeyLabel" => auth_key_label,
    "connectionNameLabel" => connection_name_label,
    "requiredRedundancy" => required_redundancy,
    "allowCustomSpeed" => allow_custom_speed,
    "private" => private,
    "metros" => metros,
    "createdBy" => created_by,
    "createdDate" => created_date,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SellerService {
    #[serde(deserialize_with = "super::null_as_default")]
    pub uuid: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub state: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub organization_name: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub route_type: String,
    pub asn: Option<i64>,
    #[serde(deserialize_with = "super::null_as_default")]
    pub metros: Vec<serde_json::Value>,
    #[serde(deserialize_with = "super::null_as_default")]
    pub created_date: String,
}

record_fields!(SellerService {
    "uuid" => uuid,
    "name" => name,
    "description" => description,
    "state" => state,
    "organizationName" => organization_name,
    "routeType" => route_type,
    "asn" => asn,
    "metros" => metros,
    "createdDate" => created_date,
});

/// Metro codes to narrow a seller listing; empty means every metro.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetroQuery {
    pub metro_codes: Vec<String>,
}

impl MetroQuery {
    /// From a `LD,AM` style list.
    pub fn from_csv(csv: Option<&str>) -> Self {
        let metro_codes = csv
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect();
        Self { metro_codes }
    }

    fn params(&self, key: &'static str) -> Vec<(&'static str, String)> {
        self.metro_codes.iter().map(|m| (key, m.clone())).collect()
    }
}

/// Layer 2 seller service profiles.
pub struct SellerProfilesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> SellerProfilesApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn list(&self, query: &MetroQuery) -> Result<Collection<SellerProfile>, ApiError> {
        self.fetch_all(query)
    }

    pub fn profile(&self, uuid: &str) -> Result<SellerProfile, ApiError> {
        let path = format!("{PROFILES_PATH}/{uuid}");
        object_from_reply(self.client.get(&path, &[])?, &path)
    }
}

impl ListEndpoint for SellerProfilesApi<'_> {
    type Record = SellerProfile;
    type Query = MetroQuery;

    fn fetch(
        &self,
        query: &MetroQuery,
        page: Option<PageDescriptor>,
    ) -> Result<ListResponse<SellerProfile>, ApiError> {
        let mut params = query.params("metroCode");
        params.extend(paging_params(page, "pageNumber", "pageSize"));
        page_from_reply(self.client.get(PROFILES_PATH, &params)?)
    }
}

/// Layer 3 seller services.
pub struct SellerServicesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> SellerServicesApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn list(&self, query: &MetroQuery) -> Result<Collection<SellerService>, ApiError> {
        self.fetch_all(query)
    }
}

impl ListEndpoint for SellerServicesApi<'_> {
    type Record = SellerService;
    type Query = MetroQuery;

    fn fetch(
        &self,
        query: &MetroQuery,
        page: Option<PageDescriptor>,
    ) -> Result<ListResponse<SellerService>, ApiError> {
        let mut params = query.params("metros");
        params.extend(paging_params(page, "page", "total"));
        page_from_reply(self.client.get(L3_SERVICES_PATH, &params)?)
    }
}
