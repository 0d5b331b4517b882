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

//! Walking multi-page list endpoints into one collection.

use crate::collection::{Collection, ListResponse, PageDescriptor};
use crate::error::ApiError;
use tracing::debug;

/// A remote list endpoint that serves one page per call.
///
/// `page` is `None` for the initial request, which the server answers with
/// page 0 together with the total count and its page size.
pub trait ListEndpoint {
    type Record;
    type Query;

    fn fetch(
        &self,
        query: &Self::Query,
        page: Option<PageDescriptor>,
    ) -> Result<ListResponse<Self::Record>, ApiError>;

    /// Single page; a no-content answer is an empty collection.
    fn fetch_page(
        &self,
        query: &Self::Query,
        page: Option<PageDescriptor>,
    ) -> Result<Collection<Self::Record>, ApiError> {
        self.fetch(query, page).map(Collection::from)
    }

    /// Every page of `query`, fetched one after another.
    ///
    /// Any failing page aborts the walk and no partial collection is returned.
    fn fetch_all(&self, query: &Self::Query) -> Result<Collection<Self::Record>, ApiError> {
        let mut collection = self.fetch_page(query, None)?;
        if collection.total_count == 0 || collection.page_size == 0 {
            return Ok(collection);
        }

        let page_size = collection.page_size;
        let total_pages = collection.total_count.div_ceil(page_size);
        debug!(
            total_count = collection.total_count,
            page_size, total_pages, "walking remaining pages"
        );

        // page 0 came with the unparameterized request above
        for page_number in 1..total_pages {
            debug!(page_number, "fetching page");
            let page = self.fetch_page(
                query,
                Some(PageDescriptor {
                    page_number,
                    page_size,
                }),
            )?;
            collection.append(page.items);
        }

        Ok(collection)
    }
}
