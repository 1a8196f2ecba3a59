/// Offset/limit windowing and end-of-page detection
use serde::{Deserialize, Serialize};

use crate::error::{RankingError, Result};

pub const MAX_PAGE_LIMIT: usize = 50;
pub const DEFAULT_FEED_LIMIT: usize = 10;
pub const DEFAULT_NEARBY_LIMIT: usize = 20;

/// Validated page bounds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
}

impl PageRequest {
    /// Accepts signed input so negative values from clients are rejected, not wrapped.
    pub fn new(offset: i64, limit: i64) -> Result<Self> {
        if offset < 0 {
            return Err(RankingError::InvalidInput(
                "offset must be >= 0".to_string(),
            ));
        }
        validate_limit(limit)?;
        Ok(Self {
            offset: offset as usize,
            limit: limit as usize,
        })
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_FEED_LIMIT,
        }
    }
}

pub fn validate_limit(limit: i64) -> Result<usize> {
    if limit < 1 || limit > MAX_PAGE_LIMIT as i64 {
        return Err(RankingError::InvalidInput(format!(
            "limit must be 1-{}",
            MAX_PAGE_LIMIT
        )));
    }
    Ok(limit as usize)
}

/// Ordered page of results.
///
/// `is_end` is `items.len() < limit`, so a final page of exactly `limit`
/// items reports `false` and the caller's next request comes back empty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedPage<T> {
    pub items: Vec<T>,
    #[serde(rename = "isEnd")]
    pub is_end: bool,
}

impl<T> RankedPage<T> {
    pub fn from_items(mut items: Vec<T>, limit: usize) -> Self {
        items.truncate(limit);
        let is_end = items.len() < limit;
        Self { items, is_end }
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            is_end: true,
        }
    }
}

/// `items[offset..offset + limit]`, clamped to the slice
pub fn window<T: Clone>(items: &[T], offset: usize, limit: usize) -> Vec<T> {
    let start = offset.min(items.len());
    let end = start.saturating_add(limit).min(items.len());
    items[start..end].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_bounds() {
        assert!(PageRequest::new(0, 1).is_ok());
        assert!(PageRequest::new(100, 50).is_ok());
        assert!(PageRequest::new(-1, 10).is_err());
        assert!(PageRequest::new(0, 0).is_err());
        assert!(PageRequest::new(0, 51).is_err());

        let page = PageRequest::default();
        assert_eq!(page.offset, 0);
        assert_eq!(page.limit, DEFAULT_FEED_LIMIT);
    }

    #[test]
    fn test_is_end_flag() {
        let short = RankedPage::from_items(vec![1, 2, 3], 10);
        assert!(short.is_end);

        // exact multiple of limit still reports more
        let full = RankedPage::from_items(vec![1, 2, 3], 3);
        assert!(!full.is_end);

        let over = RankedPage::from_items(vec![1, 2, 3, 4, 5], 3);
        assert_eq!(over.items, vec![1, 2, 3]);
        assert!(!over.is_end);

        let empty: RankedPage<u8> = RankedPage::empty();
        assert!(empty.is_end);
        assert!(empty.items.is_empty());
    }

    #[test]
    fn test_window() {
        let items: Vec<u32> = (0..7).collect();
        assert_eq!(window(&items, 0, 3), vec![0, 1, 2]);
        assert_eq!(window(&items, 5, 3), vec![5, 6]);
        assert!(window(&items, 9, 3).is_empty());
        assert_eq!(window(&items, 2, usize::MAX), vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_serialized_flag_name() {
        let page = RankedPage::from_items(vec!["a"], 2);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["isEnd"], serde_json::Value::Bool(true));
        assert_eq!(json["items"][0], "a");
    }
}
