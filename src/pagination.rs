use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_RESULTS_PER_PAGE: u32 = 10;
pub const MAX_RESULTS_PER_PAGE: u32 = 50;

/// Paging query parameters as sent by clients.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    /// Kept as text so that unparsable values fall back to the default.
    pub results_per_page: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based.
    pub page: u32,
    pub results_per_page: u32,
}

impl PageParams {
    /// Pages start at 1. A non-positive page size falls back to the
    /// default and large ones are capped.
    pub fn resolve(&self) -> Result<PageRequest> {
        let page = match self.page {
            None => 1,
            Some(page) if page >= 1 && page <= i64::from(u32::MAX) => page as u32,
            Some(page) => return Err(Error::InvalidPage(page)),
        };
        let results_per_page = match self
            .results_per_page
            .as_ref()
            .and_then(|size| size.trim().parse::<i64>().ok())
        {
            Some(size) if size > 0 => size.min(i64::from(MAX_RESULTS_PER_PAGE)) as u32,
            _ => DEFAULT_RESULTS_PER_PAGE,
        };
        Ok(PageRequest {
            page,
            results_per_page,
        })
    }
}

impl PageRequest {
    pub fn limit(&self) -> i64 {
        i64::from(self.results_per_page)
    }

    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * self.limit()
    }
}

/// One page of a collection response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub num_results: i64,
    pub objects: Vec<T>,
    pub page: u32,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(request: PageRequest, num_results: i64, objects: Vec<T>) -> Self {
        let per_page = request.limit();
        Page {
            num_results,
            objects,
            page: request.page,
            total_pages: (num_results + per_page - 1) / per_page,
        }
    }
}
