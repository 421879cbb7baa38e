mod cache;
mod paged;

pub(crate) use cache::{QueryCache, QueryKey};
pub(crate) use paged::{use_paged_query, PageState};
