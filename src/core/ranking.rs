use std::cmp::Reverse;

/// Number of items a dashboard card shows before summarizing the rest.
pub const DISPLAY_LIMIT: usize = 3;

/// The highest-ranked items plus a count of those left out.
#[derive(Debug, Clone, PartialEq)]
pub struct TopN<T> {
    pub items: Vec<T>,
    pub remainder: usize,
}

/// Keeps the `n` items with the largest key.
///
/// The sort is stable, so items with equal keys keep their input order.
pub fn top_n_by<T, K, F>(mut items: Vec<T>, n: usize, key: F) -> TopN<T>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    items.sort_by_key(|item| Reverse(key(item)));
    let remainder = items.len().saturating_sub(n);
    items.truncate(n);
    TopN { items, remainder }
}
