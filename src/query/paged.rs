use crate::api::ApiResult;
use crate::query::cache::{QueryCache, QueryKey, QueryStatus};
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::future::Future;

/// Pagination controller: current page plus the total-page count derived from
/// the latest successful response for the active key.
///
/// Page and search term live together so the derived query key can never pair
/// a stale page number with a new term — `apply_search` resets to page 1 in
/// the same update that records the term.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PageState {
    page: u32,
    total_pages: u32,
    search: String,
}

impl PageState {
    pub fn new() -> Self {
        Self {
            page: 1,
            total_pages: 0,
            search: String::new(),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Out-of-range pages are not clamped here; the UI hides controls outside
    /// the valid range.
    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// Records a new effective search term. Returns true when the term
    /// actually changed, in which case the page resets to 1 so a page number
    /// from the previous filter is never reused against a new result set.
    pub fn apply_search(&mut self, search: &str) -> bool {
        let search = search.trim();
        if self.search == search {
            return false;
        }
        self.search = search.to_string();
        self.page = 1;
        true
    }

    pub fn sync_total(&mut self, total_pages: u32) {
        self.total_pages = total_pages;
    }

    /// Page controls are suppressed for zero or one page.
    pub fn show_controls(&self) -> bool {
        self.total_pages > 1
    }

    pub fn key(&self, resource: &'static str) -> QueryKey {
        QueryKey::new(resource, self.page, &self.search)
    }
}

impl Default for PageState {
    fn default() -> Self {
        Self::new()
    }
}

/// Read side of one observed query. Copyable; every accessor is a tracked
/// signal read, so views re-render on state transitions of the underlying
/// cache entry and on key changes.
pub(crate) struct QueryHandle<V: Clone + Send + Sync + 'static> {
    cache: RwSignal<QueryCache<V>>,
    key: Memo<QueryKey>,
    enabled: Memo<bool>,
}

// Manual impls: the handle is a bundle of Copy signal handles, so it is Copy
// no matter what V is (a derive would demand V: Copy).
impl<V: Clone + Send + Sync + 'static> Clone for QueryHandle<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V: Clone + Send + Sync + 'static> Copy for QueryHandle<V> {}

impl<V: Clone + Send + Sync + 'static> QueryHandle<V> {
    /// Data to render: the observed key's result, or the previous key's as a
    /// placeholder while the new one is in flight.
    pub fn data(&self) -> Option<V> {
        if !self.enabled.get() {
            return None;
        }
        let key = self.key.get();
        self.cache.with(|c| c.display(&key).map(|(v, _)| v.clone()))
    }

    /// First load only: fetching with nothing displayable yet.
    pub fn is_loading(&self) -> bool {
        self.is_fetching() && self.data().is_none()
    }

    pub fn is_fetching(&self) -> bool {
        if !self.enabled.get() {
            return false;
        }
        let key = self.key.get();
        self.cache.with(|c| c.status(&key) == QueryStatus::Fetching)
    }

    pub fn is_error(&self) -> bool {
        self.error().is_some()
    }

    pub fn error(&self) -> Option<String> {
        if !self.enabled.get() {
            return None;
        }
        let key = self.key.get();
        self.cache.with(|c| c.error(&key))
    }

    /// Marks every entry of the observed resource stale and lets the fetch
    /// effect refetch the observed key. Called after successful mutations.
    pub fn invalidate(&self) {
        let resource = self.key.get_untracked().resource;
        self.cache.update(|c| c.invalidate(resource));
    }
}

/// Wires the fetch cycle for one observed, paginated, searchable query.
///
/// A single effect tracks the observed key, the enabled flag, and the cache
/// itself: whenever the cache says the key needs a fetch (first observation,
/// parameter change, invalidation), it begins a ticket and spawns the network
/// call; dedup in `begin` keeps it to one in-flight call per key. Results
/// settle back into the cache, which re-notifies the effect and the views.
pub(crate) fn use_paged_query<V, F, Fut>(
    cache: RwSignal<QueryCache<V>>,
    key: Memo<QueryKey>,
    enabled: Memo<bool>,
    fetch: F,
) -> QueryHandle<V>
where
    V: Clone + Send + Sync + 'static,
    F: Fn(QueryKey) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ApiResult<V>> + 'static,
{
    Effect::new(move |_| {
        if !enabled.get() {
            return;
        }

        let k = key.get();
        if !cache.with(|c| c.needs_fetch(&k)) {
            return;
        }

        let Some(ticket) = cache.try_update(|c| c.begin(&k)).flatten() else {
            return;
        };

        let fut = fetch(k);
        spawn_local(async move {
            let result = fut.await.map_err(|e| e.to_string());
            cache.update(|c| {
                c.settle(&ticket, result);
            });
        });
    });

    QueryHandle {
        cache,
        key,
        enabled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults_to_one() {
        let p = PageState::new();
        assert_eq!(p.page(), 1);
        assert_eq!(p.total_pages(), 0);
    }

    #[test]
    fn test_set_page_floors_at_one() {
        let mut p = PageState::new();
        p.set_page(0);
        assert_eq!(p.page(), 1);
        p.set_page(3);
        assert_eq!(p.page(), 3);
    }

    #[test]
    fn test_search_change_resets_page_before_key_is_built() {
        let mut p = PageState::new();
        p.set_page(5);
        p.sync_total(9);

        assert!(p.apply_search("cat"));
        let key = p.key("notes");
        assert_eq!(key.page, 1);
        assert_eq!(key.search, "cat");
    }

    #[test]
    fn test_unchanged_search_keeps_page() {
        let mut p = PageState::new();
        p.apply_search("cat");
        p.set_page(2);

        // Whitespace-only difference is not a term change.
        assert!(!p.apply_search(" cat "));
        assert_eq!(p.page(), 2);
    }

    #[test]
    fn test_controls_hidden_iff_single_page() {
        let mut p = PageState::new();
        assert!(!p.show_controls());
        p.sync_total(1);
        assert!(!p.show_controls());
        p.sync_total(2);
        assert!(p.show_controls());
        p.sync_total(0);
        assert!(!p.show_controls());
    }

    #[test]
    fn test_scenario_twelve_items_three_pages() {
        let mut p = PageState::new();
        p.apply_search("cat");

        let key = p.key("notes");
        assert_eq!((key.resource, key.page, key.search.as_str()), ("notes", 1, "cat"));

        // Response for the active key reports 3 pages.
        p.sync_total(3);
        assert!(p.show_controls());
    }
}
