//! Opaque keyset cursors and page envelopes.
//!
//! A [`Cursor`] wraps a serialisable key (typically the sort columns of the
//! last row on a page) and encodes it as URL-safe base64 JSON. Clients treat
//! the token as opaque and hand it back to fetch the next page.
//!
//! [`Page`] is the response envelope. Repositories fetch `limit + 1` rows and
//! call [`Page::from_overfetch`], which trims the extra row and derives the
//! next cursor from the last row kept.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Errors raised while encoding or decoding cursors.
#[derive(Debug, thiserror::Error)]
pub enum CursorError {
    /// The token is not valid base64.
    #[error("cursor is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
    /// The decoded token does not match the expected key shape.
    #[error("cursor payload is malformed: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Opaque continuation token around a keyset position.
///
/// # Examples
/// ```
/// use pagination::Cursor;
///
/// let token = Cursor::new((42_u64, "b".to_owned())).encode().expect("encode");
/// let decoded = Cursor::<(u64, String)>::decode(&token).expect("decode");
/// assert_eq!(decoded.key(), &(42, "b".to_owned()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor<K> {
    key: K,
}

impl<K> Cursor<K> {
    /// Wrap a keyset position.
    pub const fn new(key: K) -> Self {
        Self { key }
    }

    /// Borrow the wrapped key.
    pub const fn key(&self) -> &K {
        &self.key
    }

    /// Unwrap the key.
    pub fn into_inner(self) -> K {
        self.key
    }
}

impl<K: Serialize> Cursor<K> {
    /// Encode as URL-safe base64 JSON without padding.
    ///
    /// # Errors
    /// Returns [`CursorError::Payload`] when the key cannot be serialised.
    pub fn encode(&self) -> Result<String, CursorError> {
        let bytes = serde_json::to_vec(&self.key)?;
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }
}

impl<K: DeserializeOwned> Cursor<K> {
    /// Decode a token produced by [`Cursor::encode`].
    ///
    /// # Errors
    /// Returns [`CursorError`] when the token is not base64 or does not hold
    /// a key of the expected shape.
    pub fn decode(token: &str) -> Result<Self, CursorError> {
        let bytes = URL_SAFE_NO_PAD.decode(token.trim())?;
        let key = serde_json::from_slice(&bytes)?;
        Ok(Self { key })
    }
}

/// One page of results plus the token for the next page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page, in sort order.
    pub items: Vec<T>,
    /// Token for the following page; absent on the last page.
    pub next_cursor: Option<String>,
    /// Page size that produced this page.
    pub limit: usize,
}

impl<T> Page<T> {
    /// Build a page from `limit + 1` fetched rows.
    ///
    /// When more than `limit` rows are supplied the surplus is dropped and
    /// the next cursor is derived from the last row kept.
    ///
    /// # Errors
    /// Returns [`CursorError::Payload`] when the cursor key cannot be
    /// serialised.
    ///
    /// # Examples
    /// ```
    /// use pagination::Page;
    ///
    /// let page = Page::from_overfetch(vec![5, 4, 3], 2, |item| *item).expect("page");
    /// assert_eq!(page.items, vec![5, 4]);
    /// assert!(page.next_cursor.is_some());
    /// ```
    pub fn from_overfetch<K, F>(mut items: Vec<T>, limit: usize, key_of: F) -> Result<Self, CursorError>
    where
        K: Serialize,
        F: Fn(&T) -> K,
    {
        let has_more = items.len() > limit;
        items.truncate(limit);
        let next_cursor = match (has_more, items.last()) {
            (true, Some(last)) => Some(Cursor::new(key_of(last)).encode()?),
            _ => None,
        };
        Ok(Self {
            items,
            next_cursor,
            limit,
        })
    }

    /// Convert every item while keeping the cursor.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
            limit: self.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn short_pages_have_no_next_cursor() {
        let page = Page::from_overfetch(vec![1, 2], 5, |item| *item).expect("page");
        assert_eq!(page.items, vec![1, 2]);
        assert!(page.next_cursor.is_none());
        assert_eq!(page.limit, 5);
    }

    #[rstest]
    fn exact_pages_have_no_next_cursor() {
        let page = Page::from_overfetch(vec![1, 2], 2, |item| *item).expect("page");
        assert!(page.next_cursor.is_none());
    }

    #[rstest]
    fn overfetched_pages_point_at_last_kept_item() {
        let page = Page::from_overfetch(vec![9, 8, 7], 2, |item| *item).expect("page");
        let token = page.next_cursor.expect("next cursor");
        let cursor = Cursor::<i32>::decode(&token).expect("decode");
        assert_eq!(cursor.into_inner(), 8);
    }

    #[rstest]
    #[case("!!!")]
    #[case("bm90LWpzb24")]
    fn malformed_tokens_fail_to_decode(#[case] token: &str) {
        assert!(Cursor::<(u64, u64)>::decode(token).is_err());
    }

    #[rstest]
    fn map_preserves_cursor() {
        let page = Page::from_overfetch(vec![3, 2, 1], 2, |item| *item).expect("page");
        let cursor = page.next_cursor.clone();
        let mapped = page.map(|item| item.to_string());
        assert_eq!(mapped.items, vec!["3".to_owned(), "2".to_owned()]);
        assert_eq!(mapped.next_cursor, cursor);
    }

    #[rstest]
    fn envelope_serialises_in_camel_case() {
        let page = Page {
            items: vec![1],
            next_cursor: Some("abc".to_owned()),
            limit: 1,
        };
        let value = serde_json::to_value(&page).expect("serialise");
        assert_eq!(value["nextCursor"], "abc");
    }
}
