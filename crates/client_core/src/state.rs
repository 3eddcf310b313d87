use std::sync::Arc;

use crate::observable::{ConsumeOnce, Observable, Subscription};

/// Loading/error flags and the last one-shot message of a controller.
#[derive(Debug, Clone, Default)]
pub struct RequestState {
    pub is_loading: bool,
    pub is_error: bool,
    pub message: Option<Arc<ConsumeOnce<String>>>,
}

impl RequestState {
    /// Takes the message if no other observer has taken it yet.
    pub fn take_message(&self) -> Option<String> {
        self.message.as_ref()?.take_if_unconsumed()
    }

    pub fn peek_message(&self) -> Option<String> {
        self.message.as_ref()?.peek()
    }
}

/// Write side of a controller's [`RequestState`].
#[derive(Default)]
pub(crate) struct RequestTracker {
    state: Observable<RequestState>,
}

impl RequestTracker {
    pub(crate) fn begin(&self) {
        self.state.update(|state| state.is_loading = true);
    }

    pub(crate) fn succeed(&self, message: impl Into<String>) {
        self.finish(false, message.into());
    }

    pub(crate) fn fail(&self, message: impl Into<String>) {
        self.finish(true, message.into());
    }

    /// Publishes a message without touching the loading/error flags.
    pub(crate) fn notify(&self, message: impl Into<String>) {
        let message = Arc::new(ConsumeOnce::new(message.into()));
        self.state.update(|state| state.message = Some(message));
    }

    pub(crate) fn snapshot(&self) -> RequestState {
        self.state.get()
    }

    pub(crate) fn subscribe(&self) -> Subscription<RequestState> {
        self.state.subscribe()
    }

    fn finish(&self, is_error: bool, message: String) {
        let message = Arc::new(ConsumeOnce::new(message));
        self.state.update(|state| {
            state.is_loading = false;
            state.is_error = is_error;
            state.message = Some(message);
        });
    }
}
