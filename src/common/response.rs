// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! JSON envelope and pagination shared by every service.
//!
//! Successful bodies look like `{"success": true, "data": ..., "message": ...}`;
//! failures are produced by [`crate::PlatformError`] as
//! `{"success": false, "error": ...}`.

use crate::{PlatformError, PlatformResult};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// 200 with `data`.
pub fn ok<T>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data: Some(data),
        message: None,
    })
}

pub fn ok_with_message<T>(data: T, message: &str) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data: Some(data),
        message: Some(message.to_string()),
    })
}

/// 201 with `data` and a human readable message.
pub fn created<T>(data: T, message: &str) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, ok_with_message(data, message))
}

/// `?page&size` query parameters. `page` is zero based.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
    pub size: Option<usize>,
}

impl PageQuery {
    pub fn new(page: usize, size: usize) -> Self {
        Self {
            page: Some(page),
            size: Some(size),
        }
    }

    /// Resolve to `(page, size)`, applying the default size and rejecting
    /// sizes outside `1..=MAX_PAGE_SIZE`.
    pub fn resolve(&self) -> PlatformResult<(usize, usize)> {
        let page = self.page.unwrap_or(0);
        let size = self.size.unwrap_or(DEFAULT_PAGE_SIZE);
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(PlatformError::Validation(format!(
                "size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        Ok((page, size))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total_elements: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Slice an already filtered and ordered list into the requested page.
    pub fn from_items(items: Vec<T>, query: PageQuery) -> PlatformResult<Self> {
        let (page, size) = query.resolve()?;
        let total_elements = items.len();
        let total_pages = total_elements.div_ceil(size);
        let content = items
            .into_iter()
            .skip(page.saturating_mul(size))
            .take(size)
            .collect();
        Ok(Page {
            content,
            page,
            size,
            total_elements,
            total_pages,
        })
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_page_slicing() {
        let items: Vec<u32> = (1..=45).collect();
        let page = Page::from_items(items, PageQuery::new(2, 20)).expect("page");
        assert_eq!(page.content, vec![41, 42, 43, 44, 45]);
        assert_eq!(page.total_elements, 45);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let page = Page::from_items(vec![1, 2, 3], PageQuery::new(5, 10)).expect("page");
        assert!(page.content.is_empty());
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_page_size_bounds() {
        assert!(PageQuery::new(0, 0).resolve().is_err());
        assert!(PageQuery::new(0, MAX_PAGE_SIZE + 1).resolve().is_err());
        assert_eq!(PageQuery::default().resolve(), Ok((0, DEFAULT_PAGE_SIZE)));
    }

    #[test]
    fn test_envelope_skips_missing_message() {
        let body = serde_json::to_value(ok(7).0).expect("json");
        assert_eq!(body, serde_json::json!({"success": true, "data": 7}));
    }
}
