//! One-shot document-ready gate with a deferred callback queue.

/// Loading state a document reports, mirroring `document.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

impl ReadyState {
    /// Whether the DOM is already usable in this state.
    pub fn is_loaded(self) -> bool {
        matches!(self, ReadyState::Interactive | ReadyState::Complete)
    }
}

type Callback = Box<dyn FnOnce()>;

/// Runs callbacks once the document has loaded.
///
/// Callbacks registered before [`ReadyGate::open`] are queued and run in
/// registration order when the gate opens. Callbacks registered afterwards
/// run immediately. The gate opens at most once and never closes.
pub struct ReadyGate {
    // `None` once the gate is open; the queue is never reused.
    pending: Option<Vec<Callback>>,
}

impl ReadyGate {
    /// A closed gate waiting for the load signal.
    pub fn new() -> Self {
        Self {
            pending: Some(Vec::new()),
        }
    }

    /// A gate for a document observed in `state` at construction time.
    pub fn for_state(state: ReadyState) -> Self {
        if state.is_loaded() {
            Self { pending: None }
        } else {
            Self::new()
        }
    }

    pub fn is_ready(&self) -> bool {
        self.pending.is_none()
    }

    /// Number of callbacks waiting for the load signal.
    pub fn pending_count(&self) -> usize {
        self.pending.as_ref().map_or(0, Vec::len)
    }

    /// Run `callback` now if the document is ready, otherwise once it is.
    pub fn on_ready<F>(&mut self, callback: F)
    where
        F: FnOnce() + 'static,
    {
        match self.pending.as_mut() {
            Some(queue) => queue.push(Box::new(callback)),
            None => callback(),
        }
    }

    /// Deliver the load signal: open the gate and drain the queue in order.
    ///
    /// Returns `false` if the gate was already open.
    pub fn open(&mut self) -> bool {
        let Some(queue) = self.pending.take() else {
            tracing::trace!("Ready gate already open, ignoring load signal");
            return false;
        };

        tracing::debug!("Document ready, running {} deferred callbacks", queue.len());
        for callback in queue {
            callback();
        }
        true
    }
}

impl Default for ReadyGate {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ReadyGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadyGate")
            .field("is_ready", &self.is_ready())
            .field("pending", &self.pending_count())
            .finish()
    }
}
