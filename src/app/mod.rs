use crate::pages::{MoviesPage, NotesPage};
use crate::state::{AppContext, AppState};
use crate::toast::Toaster;
use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App() -> impl IntoView {
    let state = AppState::new();
    let toasts = state.toasts;
    provide_context(AppContext(state));

    // IMPORTANT:
    // - Leptos CSR requires the `csr` feature on `leptos`.
    // - router hooks require a <Router> context.
    view! {
        <Router>
            <div class="min-h-screen bg-background">
                <header class="border-b border-border">
                    <div class="mx-auto flex w-full max-w-[1080px] items-center justify-between px-4 py-3">
                        <a href="/" class="text-sm font-semibold text-foreground">"NoteHub"</a>
                        <nav class="flex items-center gap-4 text-sm text-muted-foreground">
                            <a href="/" class="transition-colors hover:text-foreground">"Notes"</a>
                            <a href="/movies" class="transition-colors hover:text-foreground">"Movies"</a>
                        </nav>
                    </div>
                </header>

                <main class="mx-auto w-full max-w-[1080px] px-4 py-6">
                    <Routes fallback=|| view! { <div class="px-4 py-8 text-xs text-muted-foreground">"Not found"</div> }>
                        <Route path=path!("movies") view=MoviesPage />
                        <Route path=path!("") view=NotesPage />
                    </Routes>
                </main>
            </div>

            <Toaster toasts=toasts />
        </Router>
    }
}
