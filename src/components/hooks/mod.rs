mod use_debounce;

pub(crate) use use_debounce::{use_debounced, SEARCH_DEBOUNCE_MS};
