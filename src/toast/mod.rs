use leptos::prelude::*;
use wasm_bindgen::JsCast;

const TOAST_DISMISS_MS: i32 = 4000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ToastKind {
    Success,
    Info,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
}

/// Pure toast queue; ids are monotonic so auto-dismiss callbacks can target
/// the exact toast they were scheduled for.
#[derive(Clone, Debug, Default)]
pub(crate) struct ToastQueue {
    seq: u64,
    items: Vec<Toast>,
}

impl ToastQueue {
    pub fn push(&mut self, kind: ToastKind, message: impl Into<String>) -> u64 {
        self.seq += 1;
        self.items.push(Toast {
            id: self.seq,
            kind,
            message: message.into(),
        });
        self.seq
    }

    pub fn dismiss(&mut self, id: u64) {
        self.items.retain(|t| t.id != id);
    }

    pub fn items(&self) -> &[Toast] {
        &self.items
    }
}

/// Signal-backed toast surface shared through app state. Each push schedules
/// its own dismissal; dismissing an already-gone id is a no-op.
#[derive(Clone, Copy)]
pub(crate) struct Toasts {
    queue: RwSignal<ToastQueue>,
}

impl Toasts {
    pub fn new() -> Self {
        Self {
            queue: RwSignal::new(ToastQueue::default()),
        }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(ToastKind::Success, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.show(ToastKind::Info, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.show(ToastKind::Error, message);
    }

    fn show(&self, kind: ToastKind, message: impl Into<String>) {
        let id = self
            .queue
            .try_update(|q| q.push(kind, message))
            .unwrap_or(0);
        self.schedule_dismiss(id);
    }

    fn schedule_dismiss(&self, id: u64) {
        let Some(win) = web_sys::window() else {
            return;
        };

        let queue = self.queue;
        let cb = wasm_bindgen::closure::Closure::once_into_js(move || {
            queue.update(|q| q.dismiss(id));
        });

        let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(
            cb.as_ref().unchecked_ref(),
            TOAST_DISMISS_MS,
        );
    }

    pub fn items(&self) -> Vec<Toast> {
        self.queue.with(|q| q.items().to_vec())
    }
}

fn kind_class(kind: ToastKind) -> &'static str {
    match kind {
        ToastKind::Success => "border-emerald-500/40 text-emerald-700",
        ToastKind::Info => "border-border text-foreground",
        ToastKind::Error => "border-destructive/40 text-destructive",
    }
}

#[component]
pub(crate) fn Toaster(toasts: Toasts) -> impl IntoView {
    view! {
        <div class="pointer-events-none fixed bottom-4 right-4 z-50 flex w-full max-w-xs flex-col gap-2">
            {move || {
                toasts
                    .items()
                    .into_iter()
                    .map(|t| {
                        let class = format!(
                            "pointer-events-auto rounded-md border bg-background px-4 py-3 text-sm shadow-lg {}",
                            kind_class(t.kind)
                        );
                        view! { <div class=class>{t.message}</div> }
                    })
                    .collect_view()
            }}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_assigns_monotonic_ids() {
        let mut q = ToastQueue::default();
        let a = q.push(ToastKind::Success, "Note created");
        let b = q.push(ToastKind::Error, "Failed to delete note");
        assert!(b > a);
        assert_eq!(q.items().len(), 2);
    }

    #[test]
    fn test_dismiss_removes_only_target() {
        let mut q = ToastQueue::default();
        let a = q.push(ToastKind::Success, "Note deleted");
        let b = q.push(ToastKind::Info, "No movies found for your request.");

        q.dismiss(a);
        assert_eq!(q.items().len(), 1);
        assert_eq!(q.items()[0].id, b);

        // Dismissing an already-gone id is a no-op.
        q.dismiss(a);
        assert_eq!(q.items().len(), 1);
    }
}
