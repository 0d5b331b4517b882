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

//! Shared page and collection types used by every list endpoint.

use crate::filter::{self, FilterCriteria, RecordFields};

/// Paging parameters for one explicit page request.
///
/// The remote side is 0-indexed and serves page 0 for a request without any
/// paging parameters, so explicit descriptors start at page 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDescriptor {
    pub page_number: u64,
    pub page_size: u64,
}

/// What a remote list endpoint answered for one page.
#[derive(Debug, Clone, PartialEq)]
pub enum ListResponse<T> {
    Page {
        items: Vec<T>,
        total_count: u64,
        page_size: u64,
    },
    NoContent,
}

/// Items accumulated for one logical list request.
///
/// `total_count` and `page_size` are the values reported by the first page.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page_size: u64,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> Collection<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            page_size: 0,
        }
    }

    /// Wrap an unpaginated result; counts mirror the item count.
    pub fn from_items(items: Vec<T>) -> Self {
        let len = items.len() as u64;
        Self {
            items,
            total_count: len,
            page_size: len,
        }
    }

    pub fn append(&mut self, items: Vec<T>) {
        self.items.extend(items);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> From<ListResponse<T>> for Collection<T> {
    fn from(response: ListResponse<T>) -> Self {
        match response {
            ListResponse::Page {
                items,
                total_count,
                page_size,
            } => Self {
                items,
                total_count,
                page_size,
            },
            ListResponse::NoContent => Self::empty(),
        }
    }
}

impl<T> From<Collection<T>> for ListResponse<T> {
    fn from(collection: Collection<T>) -> Self {
        ListResponse::Page {
            items: collection.items,
            total_count: collection.total_count,
            page_size: collection.page_size,
        }
    }
}

impl<T: RecordFields + Clone> Collection<T> {
    /// New collection holding only the records matching `criteria`.
    pub fn filtered(&self, criteria: &FilterCriteria) -> Self {
        Self {
            items: filter::filter(&self.items, criteria),
            total_count: self.total_count,
            page_size: self.page_size,
        }
    }

    /// In-place variant of [`Collection::filtered`].
    pub fn apply_filter(&mut self, criteria: &FilterCriteria) {
        self.items = filter::filter(&self.items, criteria);
    }
}
