use leptos::prelude::*;
use wasm_bindgen::JsCast;

/// Quiet period for search inputs: a query fires only after the input has
/// been stable this long.
pub(crate) const SEARCH_DEBOUNCE_MS: i32 = 1000;

/// Pure scheduling core of the debouncer, independent of any event-loop
/// primitive: `schedule` supersedes the previous pending emission and hands
/// back a token; `fire` emits only when the token is still current, and only
/// once. The wasm shell below maps tokens onto `set_timeout` callbacks.
#[derive(Clone, Debug, Default)]
pub(crate) struct DebounceState<T> {
    seq: u64,
    pending: Option<(u64, T)>,
}

impl<T> DebounceState<T> {
    pub fn new() -> Self {
        Self {
            seq: 0,
            pending: None,
        }
    }

    /// Replaces any pending emission with `value`. The returned token
    /// identifies this schedule; older tokens are dead from this point on.
    pub fn schedule(&mut self, value: T) -> u64 {
        self.seq += 1;
        self.pending = Some((self.seq, value));
        self.seq
    }

    /// Emits the pending value if `token` is still the current schedule.
    /// A superseded or already-fired token yields nothing and leaves any
    /// newer pending emission in place.
    pub fn fire(&mut self, token: u64) -> Option<T> {
        match self.pending.take() {
            Some((t, value)) if t == token => Some(value),
            other => {
                self.pending = other;
                None
            }
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

/// Mirrors `input` into the returned signal after `delay_ms` of quiet.
///
/// Bursts collapse to the last value: each input change clears the previous
/// browser timeout and supersedes the pending schedule, so exactly one
/// emission happens per quiet window, for the final value in the burst.
pub(crate) fn use_debounced(input: RwSignal<String>, delay_ms: i32) -> RwSignal<String> {
    let output = RwSignal::new(input.get_untracked());
    let state: StoredValue<DebounceState<String>> = StoredValue::new(DebounceState::new());
    let timer_id: RwSignal<Option<i32>> = RwSignal::new(None);

    Effect::new(move |prev: Option<()>| {
        let value = input.get();

        // First run only registers the dependency on `input`.
        if prev.is_none() {
            return;
        }

        let Some(win) = web_sys::window() else {
            return;
        };

        if let Some(tid) = timer_id.get_untracked() {
            let _ = win.clear_timeout_with_handle(tid);
        }

        // Back at the already-emitted value (e.g. deleted a trailing
        // keystroke): nothing new to emit.
        if value == output.get_untracked() {
            state.update_value(|s| s.cancel());
            timer_id.set(None);
            return;
        }

        let token = state
            .try_update_value(|s| s.schedule(value))
            .unwrap_or_default();

        let cb = wasm_bindgen::closure::Closure::once_into_js(move || {
            let fired = state.try_update_value(|s| s.fire(token)).flatten();
            if let Some(v) = fired {
                output.set(v);
            }
            timer_id.set(None);
        });

        let tid = win
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                cb.as_ref().unchecked_ref(),
                delay_ms,
            )
            .unwrap_or(0);
        timer_id.set(Some(tid));
    });

    output
}
