use std::collections::HashMap;

/// Identifies one cacheable fetch: (resource, page, normalized search term).
/// Two fetches with equal keys share one cache entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct QueryKey {
    pub resource: &'static str,
    pub page: u32,
    pub search: String,
}

impl QueryKey {
    pub fn new(resource: &'static str, page: u32, search: &str) -> Self {
        Self {
            resource,
            page: page.max(1),
            search: search.trim().to_string(),
        }
    }
}

/// Observable state of one cache entry.
///
/// Transitions: `Idle → Fetching → {Success, Error}`, and back to `Fetching`
/// on invalidation or key-parameter change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum QueryStatus {
    Idle,
    Fetching,
    Success,
    Error,
}

/// Handle for one in-flight fetch. `settle` only applies a result whose
/// ticket still matches the entry's current flight, so responses for
/// superseded requests are discarded instead of overwriting newer state.
#[derive(Clone, Debug)]
pub(crate) struct FetchTicket {
    key: QueryKey,
    id: u64,
    epoch: u64,
}

#[derive(Clone, Debug)]
struct Flight {
    id: u64,
    epoch: u64,
}

#[derive(Clone, Debug)]
struct Entry<V> {
    data: Option<V>,
    error: Option<String>,
    /// Resource epoch the data/error was settled under. Entries whose epoch
    /// trails the resource epoch are stale and get refetched.
    epoch: u64,
    in_flight: Option<Flight>,
}

impl<V> Default for Entry<V> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            epoch: 0,
            in_flight: None,
        }
    }
}

/// Keyed cache of in-flight and completed fetches.
///
/// One instance per resource family, created at application start and owned
/// by the view tree (not a global). Pure state machine: the reactive layer
/// in `paged.rs` runs the actual network calls and feeds results back in.
#[derive(Clone, Debug)]
pub(crate) struct QueryCache<V> {
    entries: HashMap<QueryKey, Entry<V>>,
    epochs: HashMap<&'static str, u64>,
    /// Most recent successfully settled key per resource; backs the
    /// keep-previous-data placeholder during pagination/search transitions.
    last_success: HashMap<&'static str, QueryKey>,
    ticket_seq: u64,
}

impl<V> Default for QueryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> QueryCache<V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            epochs: HashMap::new(),
            last_success: HashMap::new(),
            ticket_seq: 0,
        }
    }

    fn epoch(&self, resource: &'static str) -> u64 {
        self.epochs.get(resource).copied().unwrap_or(0)
    }

    /// Whether the fetch cycle should issue a network call for `key`.
    ///
    /// False while a call for the same key and epoch is already in flight
    /// (dedup), and for settled entries that are still fresh. Errored entries
    /// are not retried until an invalidation or parameter change; failure is
    /// terminal for that epoch.
    pub fn needs_fetch(&self, key: &QueryKey) -> bool {
        let epoch = self.epoch(key.resource);
        match self.entries.get(key) {
            None => true,
            Some(entry) => match &entry.in_flight {
                Some(flight) => flight.epoch != epoch,
                None => {
                    if entry.data.is_none() && entry.error.is_none() {
                        true
                    } else {
                        entry.epoch != epoch
                    }
                }
            },
        }
    }

    /// Starts a fetch for `key`, returning the ticket to settle it with.
    /// Returns `None` when an equivalent fetch is already in flight — at most
    /// one network call per key at a time.
    pub fn begin(&mut self, key: &QueryKey) -> Option<FetchTicket> {
        let epoch = self.epoch(key.resource);
        let entry = self.entries.entry(key.clone()).or_default();

        if let Some(flight) = &entry.in_flight {
            if flight.epoch == epoch {
                return None;
            }
        }

        self.ticket_seq += 1;
        let id = self.ticket_seq;
        entry.in_flight = Some(Flight { id, epoch });

        Some(FetchTicket {
            key: key.clone(),
            id,
            epoch,
        })
    }

    /// Applies a completed fetch. Returns false (and changes nothing) when
    /// the ticket was superseded — a newer fetch for the same key took over,
    /// so this response is for a stale request. Responses otherwise apply in
    /// completion order: the last settled response for a key wins.
    pub fn settle(&mut self, ticket: &FetchTicket, result: Result<V, String>) -> bool {
        let Some(entry) = self.entries.get_mut(&ticket.key) else {
            return false;
        };

        match &entry.in_flight {
            Some(flight) if flight.id == ticket.id => {}
            _ => return false,
        }

        entry.in_flight = None;
        entry.epoch = ticket.epoch;
        match result {
            Ok(v) => {
                entry.data = Some(v);
                entry.error = None;
                self.last_success.insert(ticket.key.resource, ticket.key.clone());
            }
            Err(e) => {
                // Keep any previously fetched data; only this key is marked
                // errored and other cached keys are untouched.
                entry.error = Some(e);
            }
        }
        true
    }

    /// Marks every entry of `resource` stale (epoch bump). Used after a
    /// create/delete mutation so the next observation refetches instead of
    /// serving the cached list.
    pub fn invalidate(&mut self, resource: &'static str) {
        *self.epochs.entry(resource).or_insert(0) += 1;
    }

    pub fn status(&self, key: &QueryKey) -> QueryStatus {
        match self.entries.get(key) {
            None => QueryStatus::Idle,
            Some(entry) => {
                if entry.in_flight.is_some() {
                    QueryStatus::Fetching
                } else if entry.error.is_some() {
                    QueryStatus::Error
                } else if entry.data.is_some() {
                    QueryStatus::Success
                } else {
                    QueryStatus::Idle
                }
            }
        }
    }

    pub fn error(&self, key: &QueryKey) -> Option<String> {
        self.entries.get(key).and_then(|e| e.error.clone())
    }

    /// Data cached for exactly this key.
    pub fn data(&self, key: &QueryKey) -> Option<&V> {
        self.entries.get(key).and_then(|e| e.data.as_ref())
    }

    /// Data to render for `key`: the key's own data when present, otherwise
    /// the resource's most recent successful result as a placeholder
    /// (keep-previous-data), so pagination and search transitions don't blank
    /// the view while the new key fetches. The bool is true for placeholders.
    pub fn display(&self, key: &QueryKey) -> Option<(&V, bool)> {
        if let Some(v) = self.data(key) {
            return Some((v, false));
        }

        let prev = self.last_success.get(key.resource)?;
        self.entries
            .get(prev)
            .and_then(|e| e.data.as_ref())
            .map(|v| (v, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(page: u32, search: &str) -> QueryKey {
        QueryKey::new("notes", page, search)
    }

    #[test]
    fn test_key_normalizes_search_and_page() {
        let k = QueryKey::new("notes", 0, "  cat ");
        assert_eq!(k.page, 1);
        assert_eq!(k.search, "cat");
        assert_eq!(k, QueryKey::new("notes", 1, "cat"));
    }

    #[test]
    fn test_state_machine_idle_fetching_success() {
        let mut cache: QueryCache<u32> = QueryCache::new();
        let k = key(1, "cat");

        assert_eq!(cache.status(&k), QueryStatus::Idle);
        assert!(cache.needs_fetch(&k));

        let t = cache.begin(&k).expect("fresh key should start a fetch");
        assert_eq!(cache.status(&k), QueryStatus::Fetching);

        assert!(cache.settle(&t, Ok(12)));
        assert_eq!(cache.status(&k), QueryStatus::Success);
        assert_eq!(cache.data(&k), Some(&12));
        assert!(!cache.needs_fetch(&k));
    }

    #[test]
    fn test_in_flight_fetches_are_deduplicated() {
        let mut cache: QueryCache<u32> = QueryCache::new();
        let k = key(1, "");

        assert!(cache.begin(&k).is_some());
        // Same key, same epoch: no second network call.
        assert!(cache.begin(&k).is_none());
        assert!(!cache.needs_fetch(&k));
    }

    #[test]
    fn test_error_marks_only_that_key() {
        let mut cache: QueryCache<u32> = QueryCache::new();
        let k1 = key(1, "");
        let k2 = key(2, "");

        let t1 = cache.begin(&k1).unwrap();
        cache.settle(&t1, Ok(1));

        let t2 = cache.begin(&k2).unwrap();
        cache.settle(&t2, Err("boom".to_string()));

        assert_eq!(cache.status(&k2), QueryStatus::Error);
        assert_eq!(cache.error(&k2).as_deref(), Some("boom"));
        // Other cached keys survive.
        assert_eq!(cache.status(&k1), QueryStatus::Success);
        assert_eq!(cache.data(&k1), Some(&1));
        // No automatic retry for the failed key.
        assert!(!cache.needs_fetch(&k2));
    }

    #[test]
    fn test_invalidate_marks_stale_and_refetches() {
        let mut cache: QueryCache<u32> = QueryCache::new();
        let k = key(1, "");

        let t = cache.begin(&k).unwrap();
        cache.settle(&t, Ok(7));
        assert!(!cache.needs_fetch(&k));

        cache.invalidate("notes");
        assert!(cache.needs_fetch(&k));
        // Stale data is still displayable until the refetch settles.
        assert_eq!(cache.display(&k), Some((&7, false)));

        let t2 = cache.begin(&k).unwrap();
        cache.settle(&t2, Ok(8));
        assert_eq!(cache.data(&k), Some(&8));
        assert!(!cache.needs_fetch(&k));
    }

    #[test]
    fn test_invalidate_allows_errored_key_to_retry() {
        let mut cache: QueryCache<u32> = QueryCache::new();
        let k = key(1, "");

        let t = cache.begin(&k).unwrap();
        cache.settle(&t, Err("boom".to_string()));
        assert!(!cache.needs_fetch(&k));

        cache.invalidate("notes");
        assert!(cache.needs_fetch(&k));
    }

    #[test]
    fn test_superseded_response_is_discarded() {
        let mut cache: QueryCache<u32> = QueryCache::new();
        let k = key(1, "");

        let t1 = cache.begin(&k).unwrap();

        // Invalidation mid-flight: a newer fetch takes over the entry.
        cache.invalidate("notes");
        assert!(cache.needs_fetch(&k));
        let t2 = cache.begin(&k).unwrap();

        // The old response arrives late and must not overwrite the new flight.
        assert!(!cache.settle(&t1, Ok(1)));
        assert_eq!(cache.data(&k), None);
        assert_eq!(cache.status(&k), QueryStatus::Fetching);

        assert!(cache.settle(&t2, Ok(2)));
        assert_eq!(cache.data(&k), Some(&2));
    }

    #[test]
    fn test_last_settled_response_wins() {
        let mut cache: QueryCache<u32> = QueryCache::new();
        let k = key(1, "");

        let t1 = cache.begin(&k).unwrap();
        cache.settle(&t1, Ok(1));

        cache.invalidate("notes");
        let t2 = cache.begin(&k).unwrap();
        cache.settle(&t2, Ok(2));

        assert_eq!(cache.data(&k), Some(&2));
    }

    #[test]
    fn test_keep_previous_data_during_page_transition() {
        let mut cache: QueryCache<u32> = QueryCache::new();
        let k1 = key(1, "cat");
        let k2 = key(2, "cat");

        let t1 = cache.begin(&k1).unwrap();
        cache.settle(&t1, Ok(12));

        // Page flips; the new key has no data yet, so the previous page's
        // data is offered as a placeholder instead of blanking the view.
        cache.begin(&k2).unwrap();
        assert_eq!(cache.display(&k2), Some((&12, true)));
        assert_eq!(cache.status(&k2), QueryStatus::Fetching);

        // Once the new page settles, it displays as its own data.
        let t2 = cache.begin(&k2);
        assert!(t2.is_none(), "in-flight fetch must not be duplicated");
    }

    #[test]
    fn test_display_none_before_first_success() {
        let mut cache: QueryCache<u32> = QueryCache::new();
        let k = key(1, "");
        cache.begin(&k).unwrap();
        assert!(cache.display(&k).is_none());
    }

    #[test]
    fn test_invalidate_scopes_to_resource() {
        let mut cache: QueryCache<u32> = QueryCache::new();
        let notes = QueryKey::new("notes", 1, "");
        let movies = QueryKey::new("movies", 1, "matrix");

        let t1 = cache.begin(&notes).unwrap();
        cache.settle(&t1, Ok(1));
        let t2 = cache.begin(&movies).unwrap();
        cache.settle(&t2, Ok(2));

        cache.invalidate("notes");
        assert!(cache.needs_fetch(&notes));
        assert!(!cache.needs_fetch(&movies));
    }
}
