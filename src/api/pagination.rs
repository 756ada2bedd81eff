//! Fixed-size page slicing for question lists
//!
//! Pages are 1-indexed. All matching rows are fetched first and the page is
//! cut out of the full result in memory.

pub const QUESTIONS_PER_PAGE: usize = 10;

/// Read `page` from a query string.
///
/// Absent or non-integer values fall back to page 1; the first `page` key wins.
pub fn page_from_query(query: Option<&str>) -> i64 {
    query
        .into_iter()
        .flat_map(|q| q.split('&'))
        .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
        .find(|(key, _)| *key == "page")
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(1)
}

/// Window `[(page-1)*size, (page-1)*size+size)` of `items`; empty when out of range
pub fn page_slice<T>(items: &[T], page: i64) -> &[T] {
    let Some(start) = page
        .checked_sub(1)
        .and_then(|p| usize::try_from(p).ok())
        .and_then(|p| p.checked_mul(QUESTIONS_PER_PAGE))
    else {
        return &[];
    };
    if start >= items.len() {
        return &[];
    }
    let end = items.len().min(start + QUESTIONS_PER_PAGE);
    &items[start..end]
}
