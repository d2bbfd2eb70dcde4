//! Cursor pagination.
//!
//! A page token is the URL-safe base64 encoding of an RFC3339 timestamp with nanosecond
//! precision: the `created_at` of the last row on the previous page. Lists are ordered newest
//! first, so the next page selects rows strictly older than the token.

use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::db::errors::{DbError, Result};

/// Page size used when the caller asks for none, or for a non-positive one.
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Requests above this are clamped rather than rejected.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Encoder/decoder for opaque page tokens.
pub struct PageToken;

impl PageToken {
    pub fn encode(created_at: &DateTime<Utc>) -> String {
        general_purpose::URL_SAFE.encode(created_at.to_rfc3339_opts(SecondsFormat::Nanos, true))
    }

    pub fn decode(token: &str) -> Result<DateTime<Utc>> {
        let bytes = general_purpose::URL_SAFE
            .decode(token)
            .map_err(|e| DbError::invalid_argument(format!("invalid page token: {e}")))?;
        let text = String::from_utf8(bytes).map_err(|_| DbError::invalid_argument("invalid page token: not utf-8"))?;
        let parsed = DateTime::parse_from_rfc3339(&text)
            .map_err(|e| DbError::invalid_argument(format!("invalid page token timestamp: {e}")))?;
        Ok(parsed.with_timezone(&Utc))
    }
}

/// Page size and position for a list call.
#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    pub page_size: Option<i64>,
    pub page_token: Option<String>,
}

impl PageRequest {
    pub fn new(page_size: Option<i64>, page_token: Option<String>) -> Self {
        Self { page_size, page_token }
    }

    /// Effective page size, in `1..=MAX_PAGE_SIZE`.
    #[inline]
    pub fn limit(&self) -> i64 {
        match self.page_size {
            Some(size) if size > 0 => size.min(MAX_PAGE_SIZE),
            _ => DEFAULT_PAGE_SIZE,
        }
    }

    /// Decoded cursor, `None` on the first page. An empty token counts as the first page.
    pub fn cursor(&self) -> Result<Option<DateTime<Utc>>> {
        match self.page_token.as_deref() {
            None | Some("") => Ok(None),
            Some(token) => PageToken::decode(token).map(Some),
        }
    }
}

/// One page of results. `next_page_token` is `None` once the listing is exhausted.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

impl<T> Page<T> {
    /// Build a page from a query that fetched `limit + 1` rows. The extra row only signals that
    /// another page exists; it is dropped and the token points at the last row kept.
    pub fn from_overfetch(mut rows: Vec<T>, limit: i64, created_at: impl Fn(&T) -> DateTime<Utc>) -> Self {
        let limit = limit.max(0) as usize;
        if rows.len() > limit {
            rows.truncate(limit);
            let next_page_token = rows.last().map(|row| PageToken::encode(&created_at(row)));
            Self {
                items: rows,
                next_page_token,
            }
        } else {
            Self {
                items: rows,
                next_page_token: None,
            }
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_page_token: self.next_page_token,
        }
    }

    pub fn try_map<U, E>(self, f: impl FnMut(T) -> std::result::Result<U, E>) -> std::result::Result<Page<U>, E> {
        Ok(Page {
            items: self.items.into_iter().map(f).collect::<std::result::Result<_, _>>()?,
            next_page_token: self.next_page_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_token_round_trip_keeps_nanoseconds() {
        let ts = Utc.timestamp_opt(1_718_000_000, 123_456_789).unwrap();
        let token = PageToken::encode(&ts);
        assert_eq!(PageToken::decode(&token).unwrap(), ts);

        let now = Utc::now();
        assert_eq!(PageToken::decode(&PageToken::encode(&now)).unwrap(), now);
    }

    #[test]
    fn test_token_is_url_safe_base64_of_rfc3339() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap();
        let token = PageToken::encode(&ts);
        let raw = general_purpose::URL_SAFE.decode(&token).unwrap();
        assert_eq!(String::from_utf8(raw).unwrap(), "2025-03-01T12:30:00.000000000Z");
        assert!(!token.contains('+') && !token.contains('/'));
    }

    #[test]
    fn test_bad_tokens_are_invalid_argument() {
        for token in ["***", "bm90IGEgdGltZQ==", "////"] {
            let err = PageToken::decode(token).unwrap_err();
            assert!(matches!(err, DbError::InvalidArgument { .. }), "{token}: {err:?}");
        }
    }

    #[test]
    fn test_limit_defaults_and_clamps() {
        assert_eq!(PageRequest::default().limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(PageRequest::new(Some(0), None).limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(PageRequest::new(Some(-5), None).limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(PageRequest::new(Some(1), None).limit(), 1);
        assert_eq!(PageRequest::new(Some(100), None).limit(), 100);
        assert_eq!(PageRequest::new(Some(1_000), None).limit(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_empty_token_is_first_page() {
        assert_eq!(PageRequest::new(None, Some(String::new())).cursor().unwrap(), None);
        assert!(PageRequest::new(None, Some("garbage!".to_string())).cursor().is_err());
    }

    #[test]
    fn test_from_overfetch() {
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let rows: Vec<DateTime<Utc>> = (0..3).map(|i| base - Duration::seconds(i)).collect();

        let page = Page::from_overfetch(rows.clone(), 2, |ts| *ts);
        assert_eq!(page.items.len(), 2);
        let token = page.next_page_token.expect("more rows");
        assert_eq!(PageToken::decode(&token).unwrap(), rows[1]);

        let last = Page::from_overfetch(rows[2..].to_vec(), 2, |ts| *ts);
        assert_eq!(last.items, vec![rows[2]]);
        assert!(last.next_page_token.is_none());

        let exact = Page::from_overfetch(rows[..2].to_vec(), 2, |ts| *ts);
        assert!(exact.next_page_token.is_none());
    }
}
