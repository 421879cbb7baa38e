use crate::components::hooks::{use_debounced, SEARCH_DEBOUNCE_MS};
use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Card, CardContent, Input, Label,
    Spinner, Textarea,
};
use crate::models::{Movie, NewNote, Note, NOTE_TAGS};
use crate::query::{use_paged_query, PageState, QueryKey};
use crate::state::AppContext;
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::JsCast;

const NOTES_RESOURCE: &str = "notes";
const MOVIES_RESOURCE: &str = "movies";

const NOTES_PER_PAGE: u32 = 12;

/// Compact page strip: first and last page always visible, a one-page window
/// around the current page, `None` marking an elided run.
fn page_window(current: u32, total: u32) -> Vec<Option<u32>> {
    if total <= 7 {
        return (1..=total).map(Some).collect();
    }

    let mut pages: Vec<u32> = vec![1];
    let lo = current.saturating_sub(1).max(2);
    let hi = (current + 1).min(total - 1);
    for p in lo..=hi {
        pages.push(p);
    }
    pages.push(total);

    let mut out: Vec<Option<u32>> = Vec::new();
    let mut prev = 0;
    for p in pages {
        if p <= prev {
            continue;
        }
        if prev != 0 && p > prev + 1 {
            out.push(None);
        }
        out.push(Some(p));
        prev = p;
    }
    out
}

#[component]
fn SearchBox(
    value: RwSignal<String>,
    #[prop(into, optional)] placeholder: String,
) -> impl IntoView {
    view! {
        <div class="w-full max-w-xs">
            <Input r#type="search" bind_value=value placeholder=placeholder />
        </div>
    }
}

/// Prev/next plus a numbered strip. Renders nothing at all while the result
/// set fits on one page.
#[component]
fn PaginationControls(page_state: RwSignal<PageState>) -> impl IntoView {
    view! {
        <Show
            when=move || page_state.with(|p| p.show_controls())
            fallback=|| ().into_view()
        >
            <nav class="flex items-center gap-1" aria-label="Pagination">
                <Button
                    size=ButtonSize::Sm
                    variant=ButtonVariant::Outline
                    attr:disabled=move || page_state.with(|p| p.page() <= 1)
                    on:click=move |_| {
                        page_state.update(|p| {
                            let prev = p.page().saturating_sub(1);
                            p.set_page(prev);
                        });
                    }
                >
                    "Prev"
                </Button>

                {move || {
                    let (current, total) = page_state.with(|p| (p.page(), p.total_pages()));
                    page_window(current, total)
                        .into_iter()
                        .map(|item| match item {
                            Some(p) => {
                                let is_current = p == current;
                                view! {
                                    <Button
                                        size=ButtonSize::Sm
                                        variant=if is_current {
                                            ButtonVariant::Default
                                        } else {
                                            ButtonVariant::Outline
                                        }
                                        on:click=move |_| {
                                            page_state.update(|s| s.set_page(p));
                                        }
                                    >
                                        {p.to_string()}
                                    </Button>
                                }
                                    .into_any()
                            }
                            None => view! {
                                <span class="px-1 text-xs text-muted-foreground">"…"</span>
                            }
                                .into_any(),
                        })
                        .collect_view()
                }}

                <Button
                    size=ButtonSize::Sm
                    variant=ButtonVariant::Outline
                    attr:disabled=move || page_state.with(|p| p.page() >= p.total_pages())
                    on:click=move |_| {
                        page_state.update(|p| {
                            let next = p.page() + 1;
                            p.set_page(next);
                        });
                    }
                >
                    "Next"
                </Button>
            </nav>
        </Show>
    }
}

#[component]
fn NoteForm(
    on_submit: Callback<NewNote>,
    on_cancel: Callback<()>,
    pending: RwSignal<bool>,
) -> impl IntoView {
    let title: RwSignal<String> = RwSignal::new(String::new());
    let content: RwSignal<String> = RwSignal::new(String::new());
    let tag: RwSignal<String> = RwSignal::new(NOTE_TAGS[0].to_string());
    let form_error: RwSignal<Option<String>> = RwSignal::new(None);

    let on_form_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        if pending.get_untracked() {
            return;
        }

        let title_val = title.get_untracked();
        if title_val.trim().is_empty() {
            form_error.set(Some("Title is required".to_string()));
            return;
        }
        form_error.set(None);

        on_submit.run(NewNote {
            title: title_val.trim().to_string(),
            content: content.get_untracked(),
            tag: tag.get_untracked(),
        });
    };

    let on_tag_change = move |ev: web_sys::Event| {
        if let Some(target) = ev.target() {
            if let Some(select) = target.dyn_ref::<web_sys::HtmlSelectElement>() {
                tag.set(select.value());
            }
        }
    };

    view! {
        <form class="flex flex-col gap-3" on:submit=on_form_submit>
            <div class="flex flex-col gap-2">
                <Label html_for="note-title">"Title"</Label>
                <Input id="note-title" placeholder="Note title" bind_value=title required=true />
            </div>

            <div class="flex flex-col gap-2">
                <Label html_for="note-content">"Content"</Label>
                <Textarea id="note-content" placeholder="Write something…" bind_value=content rows=5 />
            </div>

            <div class="flex flex-col gap-2">
                <Label html_for="note-tag">"Tag"</Label>
                <select
                    id="note-tag"
                    class="border-input h-9 w-full rounded-md border bg-transparent px-3 py-1 text-sm shadow-xs outline-none focus-visible:border-ring focus-visible:ring-2 focus-visible:ring-ring/50"
                    prop:value=move || tag.get()
                    on:change=on_tag_change
                >
                    {NOTE_TAGS
                        .iter()
                        .map(|t| {
                            let t = *t;
                            view! { <option value=t>{t}</option> }
                        })
                        .collect_view()}
                </select>
            </div>

            <Show when=move || form_error.get().is_some() fallback=|| ().into_view()>
                {move || {
                    form_error.get().map(|e| view! {
                        <Alert class="border-destructive/30">
                            <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                        </Alert>
                    })
                }}
            </Show>

            <div class="flex items-center justify-end gap-2 pt-2">
                <Button
                    variant=ButtonVariant::Outline
                    size=ButtonSize::Sm
                    attr:r#type="button"
                    attr:disabled=move || pending.get()
                    on:click=move |_| on_cancel.run(())
                >
                    "Cancel"
                </Button>
                <Button size=ButtonSize::Sm attr:disabled=move || pending.get()>
                    <span class="inline-flex items-center gap-2">
                        <Show when=move || pending.get() fallback=|| ().into_view()>
                            <Spinner />
                        </Show>
                        {move || if pending.get() { "Creating..." } else { "Create" }}
                    </span>
                </Button>
            </div>
        </form>
    }
}

#[component]
fn NoteList(
    notes: Vec<Note>,
    on_delete: Callback<String>,
    pending_delete: RwSignal<Option<String>>,
) -> impl IntoView {
    view! {
        <ul class="grid gap-3 sm:grid-cols-2 lg:grid-cols-3">
            {notes
                .into_iter()
                .map(|note| {
                    let delete_id = note.id.clone();
                    let pending_id = note.id.clone();
                    let is_deleting = move || pending_delete.get().as_deref() == Some(pending_id.as_str());
                    let is_deleting_label = is_deleting.clone();

                    view! {
                        <li class="flex flex-col gap-2 rounded-md border border-border bg-background p-4">
                            <h2 class="truncate text-sm font-semibold">{note.title}</h2>
                            <p class="line-clamp-4 flex-1 whitespace-pre-wrap text-sm text-muted-foreground">
                                {note.content}
                            </p>
                            <div class="flex items-center justify-between pt-1">
                                <span class="rounded-md bg-accent px-2 py-0.5 text-xs text-accent-foreground">
                                    {note.tag}
                                </span>
                                <Button
                                    variant=ButtonVariant::Destructive
                                    size=ButtonSize::Sm
                                    attr:disabled=is_deleting
                                    on:click=move |_| on_delete.run(delete_id.clone())
                                >
                                    {move || if is_deleting_label() { "Deleting..." } else { "Delete" }}
                                </Button>
                            </div>
                        </li>
                    }
                })
                .collect_view()}
        </ul>
    }
}

#[component]
pub fn NotesPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let notes_api = app_state.0.notes_api;
    let cache = app_state.0.notes_cache;
    let toasts = app_state.0.toasts;

    let search_input: RwSignal<String> = RwSignal::new(String::new());
    let debounced = use_debounced(search_input, SEARCH_DEBOUNCE_MS);
    let page_state: RwSignal<PageState> = RwSignal::new(PageState::new());

    // The debounced term flows into the pagination controller, which resets
    // to page 1 in the same update; the query key below can never observe a
    // new term paired with the old page.
    Effect::new(move |_| {
        let term = debounced.get();
        if page_state.with_untracked(|p| p.search() == term.trim()) {
            return;
        }
        page_state.update(|p| {
            p.apply_search(&term);
        });
    });

    let key = Memo::new(move |_| page_state.with(|p| p.key(NOTES_RESOURCE)));
    let enabled = Memo::new(move |_| true);

    let query = use_paged_query(cache, key, enabled, move |k: QueryKey| {
        let api = notes_api.get_value();
        async move { api.fetch_notes(k.page, NOTES_PER_PAGE, &k.search).await }
    });

    // Total-page count follows the latest successful response for the active
    // key (placeholder data keeps the previous count during transitions).
    Effect::new(move |_| {
        if let Some(data) = query.data() {
            let total = data.total_pages;
            if page_state.with_untracked(|p| p.total_pages() != total) {
                page_state.update(|p| p.sync_total(total));
            }
        }
    });

    let modal_open: RwSignal<bool> = RwSignal::new(false);
    let create_pending: RwSignal<bool> = RwSignal::new(false);
    let delete_pending: RwSignal<Option<String>> = RwSignal::new(None);

    let on_create = Callback::new(move |note: NewNote| {
        if create_pending.get_untracked() {
            return;
        }
        create_pending.set(true);

        let api = notes_api.get_value();
        spawn_local(async move {
            match api.create_note(&note).await {
                Ok(_) => {
                    toasts.success("Note created");
                    modal_open.set(false);
                    query.invalidate();
                }
                Err(e) => {
                    if e.is_validation() {
                        toasts.error(format!("Note rejected by the server: {e}"));
                    } else {
                        toasts.error(format!("Failed to create note: {e}"));
                    }
                }
            }
            create_pending.set(false);
        });
    });

    let on_delete = Callback::new(move |id: String| {
        if delete_pending.get_untracked().is_some() {
            return;
        }
        delete_pending.set(Some(id.clone()));

        let api = notes_api.get_value();
        spawn_local(async move {
            match api.delete_note(&id).await {
                Ok(_) => {
                    toasts.success("Note deleted");
                    query.invalidate();
                }
                Err(e) => {
                    if e.is_not_found() {
                        // Server no longer knows the id; reconcile the list.
                        toasts.info("Note was already deleted");
                        query.invalidate();
                    } else {
                        toasts.error(format!("Failed to delete note: {e}"));
                    }
                }
            }
            delete_pending.set(None);
        });
    });

    view! {
        <div class="space-y-4">
            <div class="flex flex-wrap items-center justify-between gap-3">
                <SearchBox value=search_input placeholder="Search notes" />

                <div class="flex items-center gap-3">
                    <Show when=move || query.is_fetching() && !query.is_loading() fallback=|| ().into_view()>
                        <Spinner class="text-muted-foreground" />
                    </Show>
                    <PaginationControls page_state=page_state />
                </div>

                <Button on:click=move |_| modal_open.set(true)>"Create note +"</Button>
            </div>

            <Card>
                <CardContent>
                    <div class="mb-3 text-sm font-medium">"Notes"</div>

                    <Show
                        when=move || !query.is_error()
                        fallback=move || view! {
                            <Alert class="border-destructive/30">
                                <AlertDescription class="text-destructive">
                                    "Something went wrong!"
                                </AlertDescription>
                                <div class="pt-2">
                                    <Button
                                        variant=ButtonVariant::Outline
                                        size=ButtonSize::Sm
                                        on:click=move |_| query.invalidate()
                                    >
                                        "Try again"
                                    </Button>
                                </div>
                            </Alert>
                        }
                    >
                        <Show
                            when=move || !query.is_loading()
                            fallback=|| view! {
                                <div class="flex items-center gap-2 text-sm text-muted-foreground">
                                    <Spinner />
                                    "Loading notes…"
                                </div>
                            }
                        >
                            {move || {
                                let notes = query.data().map(|d| d.notes).unwrap_or_default();
                                if notes.is_empty() {
                                    view! {
                                        <div class="rounded-md border border-border bg-muted p-4 text-sm text-muted-foreground">
                                            "No notes found."
                                        </div>
                                    }
                                        .into_any()
                                } else {
                                    view! {
                                        <NoteList
                                            notes=notes
                                            on_delete=on_delete
                                            pending_delete=delete_pending
                                        />
                                    }
                                        .into_any()
                                }
                            }}
                        </Show>
                    </Show>
                </CardContent>
            </Card>

            <Show when=move || modal_open.get() fallback=|| ().into_view()>
                <div class="fixed inset-0 z-50 flex items-center justify-center bg-black/30 px-4">
                    <div class="w-full max-w-sm rounded-md border border-border bg-background p-4 shadow-lg">
                        <div class="mb-3 space-y-1">
                            <div class="text-sm font-medium">"Create note"</div>
                            <div class="text-xs text-muted-foreground">
                                "The server validates title, content and tag."
                            </div>
                        </div>

                        <NoteForm
                            on_submit=on_create
                            on_cancel=Callback::new(move |_| modal_open.set(false))
                            pending=create_pending
                        />
                    </div>
                </div>
            </Show>
        </div>
    }
}

#[component]
fn MovieGrid(movies: Vec<Movie>) -> impl IntoView {
    view! {
        <ul class="grid gap-4 sm:grid-cols-2 lg:grid-cols-4">
            {movies
                .into_iter()
                .map(|movie| {
                    let year = movie.release_date.get(..4).unwrap_or("").to_string();
                    let rating = format!("{:.1}", movie.vote_average);
                    let poster = movie.poster_url();

                    view! {
                        <li class="flex flex-col overflow-hidden rounded-md border border-border bg-background">
                            {match poster {
                                Some(src) => view! {
                                    <img src=src alt=movie.title.clone() class="aspect-[2/3] w-full object-cover" />
                                }
                                    .into_any(),
                                None => view! {
                                    <div class="flex aspect-[2/3] w-full items-center justify-center bg-muted text-xs text-muted-foreground">
                                        "No poster"
                                    </div>
                                }
                                    .into_any(),
                            }}
                            <div class="flex flex-1 flex-col gap-1 p-3">
                                <h2 class="truncate text-sm font-semibold">{movie.title}</h2>
                                <p class="line-clamp-3 text-xs text-muted-foreground">{movie.overview}</p>
                                <div class="flex items-center justify-between pt-1 text-xs text-muted-foreground">
                                    <span>{year}</span>
                                    <span>{rating}</span>
                                </div>
                            </div>
                        </li>
                    }
                })
                .collect_view()}
        </ul>
    }
}

#[component]
pub fn MoviesPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let movies_api = app_state.0.movies_api;
    let cache = app_state.0.movies_cache;
    let toasts = app_state.0.toasts;

    let search_input: RwSignal<String> = RwSignal::new(String::new());
    let debounced = use_debounced(search_input, SEARCH_DEBOUNCE_MS);
    let page_state: RwSignal<PageState> = RwSignal::new(PageState::new());

    Effect::new(move |_| {
        let term = debounced.get();
        if page_state.with_untracked(|p| p.search() == term.trim()) {
            return;
        }
        page_state.update(|p| {
            p.apply_search(&term);
        });
    });

    let key = Memo::new(move |_| page_state.with(|p| p.key(MOVIES_RESOURCE)));

    // An empty query issues no call at all: no loader, no error.
    let enabled = Memo::new(move |_| page_state.with(|p| !p.search().is_empty()));

    let query = use_paged_query(cache, key, enabled, move |k: QueryKey| {
        let api = movies_api.get_value();
        async move { api.search_movies(&k.search, k.page).await }
    });

    Effect::new(move |_| {
        if let Some(data) = query.data() {
            let total = data.total_pages;
            if page_state.with_untracked(|p| p.total_pages() != total) {
                page_state.update(|p| p.sync_total(total));
            }
        }
    });

    // A successful search with zero matches is a notification, not an error.
    // Keyed on the settled query so the toast fires once per empty result set.
    Effect::new(move |prev: Option<Option<QueryKey>>| {
        let prev = prev.flatten();

        if !enabled.get() {
            return None;
        }

        let k = key.get();
        let is_empty = cache.with(|c| c.data(&k).map(|d| d.results.is_empty()));
        match is_empty {
            Some(true) => {
                if prev.as_ref() != Some(&k) {
                    toasts.info("No movies found for your request.");
                }
                Some(k)
            }
            _ => None,
        }
    });

    view! {
        <div class="space-y-4">
            <div class="flex flex-wrap items-center justify-between gap-3">
                <SearchBox value=search_input placeholder="Search movies" />

                <div class="flex items-center gap-3">
                    <Show when=move || query.is_fetching() && !query.is_loading() fallback=|| ().into_view()>
                        <Spinner class="text-muted-foreground" />
                    </Show>
                    <PaginationControls page_state=page_state />
                </div>
            </div>

            <Show
                when=move || enabled.get()
                fallback=|| view! {
                    <div class="rounded-md border border-border bg-muted p-4 text-sm text-muted-foreground">
                        "Start typing to search movies."
                    </div>
                }
            >
                <Show
                    when=move || !query.is_error()
                    fallback=move || view! {
                        <Alert class="border-destructive/30">
                            <AlertDescription class="text-destructive">
                                "Something went wrong!"
                            </AlertDescription>
                            <div class="pt-2">
                                <Button
                                    variant=ButtonVariant::Outline
                                    size=ButtonSize::Sm
                                    on:click=move |_| query.invalidate()
                                >
                                    "Try again"
                                </Button>
                            </div>
                        </Alert>
                    }
                >
                    <Show
                        when=move || !query.is_loading()
                        fallback=|| view! {
                            <div class="flex items-center gap-2 text-sm text-muted-foreground">
                                <Spinner />
                                "Searching movies…"
                            </div>
                        }
                    >
                        {move || {
                            let movies = query.data().map(|d| d.results).unwrap_or_default();
                            if movies.is_empty() {
                                view! {
                                    <div class="rounded-md border border-border bg-muted p-4 text-sm text-muted-foreground">
                                        "No results."
                                    </div>
                                }
                                    .into_any()
                            } else {
                                view! { <MovieGrid movies=movies /> }.into_any()
                            }
                        }}
                    </Show>
                </Show>
            </Show>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_window_small_totals_list_every_page() {
        assert_eq!(page_window(1, 1), vec![Some(1)]);
        assert_eq!(
            page_window(2, 3),
            vec![Some(1), Some(2), Some(3)]
        );
        assert_eq!(page_window(4, 7).len(), 7);
    }

    #[test]
    fn test_page_window_elides_middle() {
        // current=1, total=10: 1 2 … 10
        assert_eq!(
            page_window(1, 10),
            vec![Some(1), Some(2), None, Some(10)]
        );

        // current=5, total=10: 1 … 4 5 6 … 10
        assert_eq!(
            page_window(5, 10),
            vec![Some(1), None, Some(4), Some(5), Some(6), None, Some(10)]
        );

        // current=10, total=10: 1 … 9 10
        assert_eq!(
            page_window(10, 10),
            vec![Some(1), None, Some(9), Some(10)]
        );
    }

    #[test]
    fn test_page_window_no_gap_for_adjacent_runs() {
        // current=3, total=10: 1 2 3 4 … 10 (no gap between 1 and 2)
        assert_eq!(
            page_window(3, 10),
            vec![Some(1), Some(2), Some(3), Some(4), None, Some(10)]
        );
    }
}
