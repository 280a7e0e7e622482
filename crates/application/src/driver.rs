use crate::context::LookupContext;
use crate::ports::{EngineOutcome, ExternalHandle, TimerKind, TimerToken};
use crate::request::{
    CompletionCallback, CompletionKind, Request, RequestId, SubQuery, UserContext,
};
use ferrous_lookup_domain::{DomainError, Extensions, RecordType};
use rustc_hash::FxHashMap;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Owns every in-flight request and routes reactor events to them.
///
/// Runs on the reactor's thread only. Completion, explicit cancellation and
/// timeout all end in [`LookupDriver::finish`], which removes the request from
/// the registry before tearing it down; a second trigger finds nothing to do.
pub struct LookupDriver {
    context: LookupContext,
    requests: FxHashMap<RequestId, Request>,
    handles: FxHashMap<ExternalHandle, RequestId>,
    next_id: u64,
}

impl LookupDriver {
    pub fn new(context: LookupContext) -> Self {
        Self {
            context,
            requests: FxHashMap::default(),
            handles: FxHashMap::default(),
            next_id: 1,
        }
    }

    pub fn context(&self) -> &LookupContext {
        &self.context
    }

    pub fn in_flight(&self) -> usize {
        self.requests.len()
    }

    pub fn request(&self, id: RequestId) -> Option<&Request> {
        self.requests.get(&id)
    }

    /// Builds a request, arms its deadline and dispatches it.
    ///
    /// `callback` fires exactly once, later, from reactor context. On error
    /// nothing stays allocated and the callback is never invoked.
    pub fn submit(
        &mut self,
        name: &str,
        record_type: RecordType,
        extensions: Option<&Extensions>,
        user_context: Option<UserContext>,
        callback: CompletionCallback,
    ) -> Result<RequestId, DomainError> {
        let id = RequestId(self.next_id);
        self.next_id += 1;

        let defaults;
        let extensions = match extensions {
            Some(extensions) => extensions,
            None => {
                defaults = self.context.default_extensions();
                &defaults
            }
        };

        let mut request = Request::new(&self.context, id, name, record_type, extensions)?;
        request.set_completion(user_context, callback);

        let timeout_ms = self.context.config.timeout_ms;
        if timeout_ms > 0 {
            request.arm_timer(TimerKind::Timeout, Duration::from_millis(timeout_ms))?;
        }

        let sent = request.dispatch(self.context.config.dispatch_mode);
        if request.is_complete() {
            // every hand-off was rejected
            request.defer_completion(request.completion_kind())?;
        }

        track(&mut self.handles, id, &sent);
        self.requests.insert(id, request);
        debug!(request = %id, dispatched = sent.len(), "Request submitted");
        Ok(id)
    }

    /// Answer delivery from the resolver engine.
    pub fn on_answer(&mut self, handle: ExternalHandle, outcome: EngineOutcome) {
        let Some(id) = self.handles.remove(&handle) else {
            debug!(handle = handle.0, "Answer for unknown or finished sub-query ignored");
            return;
        };
        let Some(request) = self.requests.get_mut(&id) else {
            return;
        };

        match request.attach_outcome(handle, outcome) {
            Ok(index) => trace!(request = %id, index, "Outcome attached"),
            Err(error) => debug!(request = %id, error = %error, "Outcome not attached"),
        }

        let sent = request.dispatch(self.context.config.dispatch_mode);
        let complete = request.is_complete();
        let kind = request.completion_kind();
        track(&mut self.handles, id, &sent);

        if complete {
            self.finish(id, kind);
        }
    }

    /// Timer expiry delivered by the reactor.
    pub fn on_timer_fired(&mut self, token: TimerToken) {
        let id = token.request;
        let Some(request) = self.requests.get_mut(&id) else {
            debug!(request = %id, kind = ?token.kind, "Timer fired for finished request");
            return;
        };
        request.timer_fired(token.kind);

        match token.kind {
            TimerKind::Timeout => {
                let abandoned = request.time_out();
                warn!(request = %id, name = %request.name(), abandoned, "Request timed out");
                self.finish(id, CompletionKind::Timeout);
            }
            TimerKind::LocalCallback => {
                let kind = request
                    .deferred_completion()
                    .unwrap_or_else(|| request.completion_kind());
                self.finish(id, kind);
            }
        }
    }

    /// Cancels a request: in-flight sub-queries are abandoned, answers already
    /// received are kept, and the completion callback fires with `Canceled`.
    pub fn cancel(&mut self, id: RequestId) -> Result<(), DomainError> {
        let request = self
            .requests
            .get_mut(&id)
            .ok_or(DomainError::UnknownRequest(id.0))?;
        request.cancel();
        self.finish(id, CompletionKind::Canceled);
        Ok(())
    }

    /// Tears a request down without delivering its completion.
    pub fn destroy(&mut self, id: RequestId) -> Result<(), DomainError> {
        let mut request = self
            .requests
            .remove(&id)
            .ok_or(DomainError::UnknownRequest(id.0))?;
        untrack(&mut self.handles, &request);
        request.cancel();
        drop(request.take_callback());
        request.finalize();
        Ok(())
    }

    /// Tears down every request still registered, delivering `Canceled`.
    pub fn shutdown(&mut self) {
        let ids: Vec<RequestId> = self.requests.keys().copied().collect();
        for id in ids {
            if let Some(request) = self.requests.get_mut(&id) {
                request.cancel();
            }
            self.finish(id, CompletionKind::Canceled);
        }
    }

    fn finish(&mut self, id: RequestId, kind: CompletionKind) {
        let Some(mut request) = self.requests.remove(&id) else {
            debug!(request = %id, "Request already finalized");
            return;
        };
        untrack(&mut self.handles, &request);

        let callback = request.take_callback();
        let completion = request.build_completion(kind);
        request.finalize();

        debug!(
            request = %id,
            kind = %kind,
            answered = completion.answered(),
            "Request completed"
        );
        if let Some(callback) = callback {
            callback(completion);
        }
    }
}

impl Drop for LookupDriver {
    fn drop(&mut self) {
        if !self.requests.is_empty() {
            self.shutdown();
        }
    }
}

fn track(handles: &mut FxHashMap<ExternalHandle, RequestId>, id: RequestId, sent: &[ExternalHandle]) {
    for handle in sent {
        handles.insert(*handle, id);
    }
}

fn untrack(handles: &mut FxHashMap<ExternalHandle, RequestId>, request: &Request) {
    for handle in request
        .sub_queries()
        .iter()
        .filter_map(SubQuery::external_handle)
    {
        handles.remove(&handle);
    }
}
