//! Prefix listing shared by every backend.
//!
//! Backends only know how to fetch one page of raw keys for a prefix. This
//! module owns prefix normalization, the continuation loop and the conversion
//! of raw keys into relative `ObjectPath`s, so listing behaves the same on
//! every vendor.

use async_trait::async_trait;

use crate::error::{StorageError, StorageResult};
use crate::traits::ObjectPath;

/// Page size requested from backends. Servers may cap lower; the loop does not care.
pub(crate) const PAGE_SIZE: usize = 1000;

/// One page of a backend listing.
#[derive(Debug, Default)]
pub(crate) struct ListPage {
    /// Full object keys, in backend order.
    pub keys: Vec<String>,
    /// More pages follow.
    pub truncated: bool,
    /// Token for the next page, taken from this response.
    pub next_token: Option<String>,
}

/// A backend listing API that returns keys one page at a time.
#[async_trait]
pub(crate) trait PagedList: Send + Sync {
    /// Fetch the page of keys starting with `prefix` that `token` points at
    /// (`None` for the first page).
    async fn list_page(&self, prefix: &str, token: Option<String>) -> StorageResult<ListPage>;
}

/// Returned when a backend flags a page as truncated but hands out no token.
#[derive(Debug, thiserror::Error)]
#[error("listing '{prefix}' stopped at page {page}: truncated response without continuation token")]
pub struct MissingContinuationToken {
    pub prefix: String,
    pub page: usize,
}

/// `"p"` and `"p/"` both become `"p/"`. The empty prefix stays empty.
pub(crate) fn normalize_prefix(prefix: &str) -> String {
    if prefix.is_empty() || prefix.ends_with('/') {
        prefix.to_string()
    } else {
        format!("{}/", prefix)
    }
}

/// Strip the normalized prefix and one leading `/`; `None` for the prefix marker itself.
pub(crate) fn relative_entry(key: &str, prefix: &str) -> Option<ObjectPath> {
    let rest = key.strip_prefix(prefix).unwrap_or(key);
    let rest = rest.strip_prefix('/').unwrap_or(rest);
    if rest.is_empty() {
        None
    } else {
        Some(ObjectPath::file(rest))
    }
}

/// Collect every page under `prefix` into one sequence.
///
/// Any failing page aborts the whole listing; no partial result is returned.
pub(crate) async fn list_all<L>(lister: &L, prefix: &str) -> StorageResult<Vec<ObjectPath>>
where
    L: PagedList + ?Sized,
{
    let prefix = normalize_prefix(prefix);
    let mut entries = Vec::new();
    let mut token: Option<String> = None;
    let mut page_no = 0usize;

    loop {
        let page = lister.list_page(&prefix, token.take()).await?;
        page_no += 1;

        entries.extend(
            page.keys
                .iter()
                .filter_map(|key| relative_entry(key, &prefix)),
        );

        if !page.truncated {
            break;
        }
        match page.next_token {
            Some(next) if !next.is_empty() => token = Some(next),
            _ => {
                return Err(StorageError::backend(MissingContinuationToken {
                    prefix,
                    page: page_no,
                }))
            }
        }
    }

    tracing::debug!(
        prefix = %prefix,
        pages = page_no,
        entries = entries.len(),
        "Listing complete"
    );

    Ok(entries)
}
