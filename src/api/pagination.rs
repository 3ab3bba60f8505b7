//! `limit` / `offset` query parameters and the list response envelope.

use serde::{Deserialize, Serialize};

use crate::store::{Listing, Page};

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Raw pagination parameters. Kept as strings so that garbage falls back to
/// defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl PageParams {
    /// `limit` defaults to 10 and is clamped to 1..=100; `offset` defaults to
    /// 0 and negatives become 0.
    pub fn page(&self) -> Page {
        let limit = self
            .limit
            .as_deref()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .map(|v| v.clamp(1, MAX_LIMIT))
            .unwrap_or(DEFAULT_LIMIT);
        let offset = self
            .offset
            .as_deref()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .map(|v| v.max(0))
            .unwrap_or(0);
        Page { limit, offset }
    }
}

/// `{data, total, limit, offset}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListEnvelope<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

impl<T> ListEnvelope<T> {
    pub fn new(listing: Listing<T>, page: Page) -> Self {
        Self {
            data: listing.items,
            total: listing.total,
            limit: page.limit,
            offset: page.offset,
        }
    }

    /// Envelope for an unpaginated collection.
    pub fn all(items: Vec<T>) -> Self {
        let total = items.len() as i64;
        Self {
            data: items,
            total,
            limit: total,
            offset: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(limit: Option<&str>, offset: Option<&str>) -> Page {
        PageParams {
            limit: limit.map(String::from),
            offset: offset.map(String::from),
        }
        .page()
    }

    #[test]
    fn defaults() {
        assert_eq!(params(None, None), Page { limit: 10, offset: 0 });
    }

    #[test]
    fn limit_is_clamped() {
        assert_eq!(params(Some("500"), None).limit, 100);
        assert_eq!(params(Some("0"), None).limit, 1);
        assert_eq!(params(Some("-3"), None).limit, 1);
        assert_eq!(params(Some("25"), None).limit, 25);
    }

    #[test]
    fn negative_offset_becomes_zero() {
        assert_eq!(params(None, Some("-5")).offset, 0);
        assert_eq!(params(None, Some("40")).offset, 40);
    }

    #[test]
    fn unparsable_values_fall_back() {
        assert_eq!(params(Some("ten"), Some("")), Page { limit: 10, offset: 0 });
    }

    #[test]
    fn envelope_carries_page() {
        let listing = Listing {
            items: vec![1, 2],
            total: 7,
        };
        let envelope = ListEnvelope::new(listing, Page { limit: 2, offset: 4 });
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"data": [1, 2], "total": 7, "limit": 2, "offset": 4})
        );
    }
}
