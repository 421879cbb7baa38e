use crate::api::{EnvConfig, MoviesApi, NotesApi};
use crate::models::{FetchNotesResponse, SearchMoviesResponse};
use crate::query::QueryCache;
use crate::toast::Toasts;
use leptos::prelude::*;

/// Application-wide state, created once at mount and provided through
/// context. The query caches live here — explicit objects scoped to the view
/// tree, torn down never in this long-lived UI (tests build their own).
#[derive(Clone)]
pub(crate) struct AppState {
    pub notes_api: StoredValue<NotesApi>,
    pub movies_api: StoredValue<MoviesApi>,

    /// One cache per resource family; invalidated by the notes mutations.
    pub notes_cache: RwSignal<QueryCache<FetchNotesResponse>>,
    pub movies_cache: RwSignal<QueryCache<SearchMoviesResponse>>,

    pub toasts: Toasts,
}

impl AppState {
    pub fn new() -> Self {
        let cfg = EnvConfig::new();

        Self {
            notes_api: StoredValue::new(NotesApi::from_env(&cfg)),
            movies_api: StoredValue::new(MoviesApi::from_env(&cfg)),
            notes_cache: RwSignal::new(QueryCache::new()),
            movies_cache: RwSignal::new(QueryCache::new()),
            toasts: Toasts::new(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub(crate) struct AppContext(pub AppState);
