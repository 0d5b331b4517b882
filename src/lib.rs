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

//! Client helpers for the Equinix ECX Fabric buyer API.
//!
//! List endpoints are walked page by page into one [`Collection`] through
//! [`ListEndpoint::fetch_all`]; the result can then be narrowed with
//! [`FilterCriteria`], matched against each record's wire field names.

pub mod client;
pub mod collection;
pub mod config;
pub mod error;
pub mod filter;
pub mod pagination;
pub mod render;
pub mod resources;
pub mod token;

pub use client::ApiClient;
pub use collection::{Collection, ListResponse, PageDescriptor};
pub use error::{ApiError, ApiErrorEntry};
pub use filter::{FieldValue, FilterCriteria, RecordFields};
pub use pagination::ListEndpoint;
