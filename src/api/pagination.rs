use serde::{Deserialize, Serialize};

use crate::repositories::results::PageRequest;

pub(crate) const DEFAULT_LIMIT: i64 = 20;
pub(crate) const MAX_LIMIT: i64 = 100;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageQuery {
    pub(crate) skip: Option<i64>,
    pub(crate) limit: Option<i64>,
}

impl PageQuery {
    pub(crate) fn page(&self) -> PageRequest {
        PageRequest {
            skip: self.skip.unwrap_or(0).max(0),
            limit: self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PaginatedResponse<T> {
    pub(crate) items: Vec<T>,
    pub(crate) total_count: i64,
    pub(crate) skip: i64,
    pub(crate) limit: i64,
}

impl<T> PaginatedResponse<T> {
    pub(crate) fn new(items: Vec<T>, total_count: i64, page: PageRequest) -> Self {
        Self { items, total_count, skip: page.skip, limit: page.limit }
    }
}
