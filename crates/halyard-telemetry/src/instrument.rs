//! Traced handler wrapper.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use serde_json::{json, Value};

use halyard_core::{
    BoxHandler, Handler, HttpResponse, JwtToken, Payload, RequestContext, ServiceResult,
};

use crate::metrics::record_cold_start;
use crate::tracer::Tracer;

/// Annotation key set on the first traced invocation.
pub const COLD_START_ANNOTATION: &str = "ColdStart";

/// Remembers whether the first invocation has happened.
#[derive(Debug)]
pub struct ColdStart(AtomicBool);

impl ColdStart {
    /// Creates a flag that reports one cold start.
    #[must_use]
    pub const fn new() -> Self {
        Self(AtomicBool::new(true))
    }

    /// The flag shared by every handler in this process.
    #[must_use]
    pub fn process() -> Arc<Self> {
        static PROCESS: OnceLock<Arc<ColdStart>> = OnceLock::new();
        Arc::clone(PROCESS.get_or_init(|| Arc::new(Self::new())))
    }

    /// Returns `true` exactly once.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

impl Default for ColdStart {
    fn default() -> Self {
        Self::new()
    }
}

/// Wraps a handler so each invocation runs inside a subsegment.
///
/// The subsegment is named `## <name>`. The first invocation in the process
/// is annotated `ColdStart=true`. Responses are attached as metadata only
/// when `persist_response` is set; errors are always recorded and then
/// returned unchanged.
pub struct TracedHandler {
    inner: BoxHandler,
    name: String,
    tracer: Arc<dyn Tracer>,
    persist_response: bool,
    cold_start: Arc<ColdStart>,
}

impl TracedHandler {
    /// Wraps `inner`.
    pub fn new(inner: BoxHandler, name: impl Into<String>, tracer: Arc<dyn Tracer>) -> Self {
        Self {
            inner,
            name: name.into(),
            tracer,
            persist_response: false,
            cold_start: ColdStart::process(),
        }
    }

    /// Attach responses as metadata.
    #[must_use]
    pub const fn with_persist_response(mut self, persist: bool) -> Self {
        self.persist_response = persist;
        self
    }

    /// Use a specific cold-start flag instead of the process-wide one.
    #[must_use]
    pub fn with_cold_start(mut self, cold_start: Arc<ColdStart>) -> Self {
        self.cold_start = cold_start;
        self
    }

    /// The handler name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn response_metadata(response: &HttpResponse) -> Value {
        json!({
            "statusCode": response.status().as_u16(),
            "body": response.body(),
            "message": response.message(),
        })
    }
}

impl std::fmt::Debug for TracedHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TracedHandler")
            .field("name", &self.name)
            .field("persist_response", &self.persist_response)
            .finish_non_exhaustive()
    }
}

impl Handler for TracedHandler {
    fn handle(
        &self,
        token: Option<&JwtToken>,
        body: &Payload,
        ctx: &RequestContext,
    ) -> ServiceResult<HttpResponse> {
        let mut segment = self.tracer.begin_subsegment(&format!("## {}", self.name));

        if self.cold_start.take() {
            segment.put_annotation(COLD_START_ANNOTATION, Value::Bool(true));
            record_cold_start();
        }

        let result = segment
            .scope()
            .in_scope(|| self.inner.handle(token, body, ctx));

        match &result {
            Ok(response) if self.persist_response => {
                segment.put_metadata(
                    &format!("{} response", self.name),
                    Self::response_metadata(response),
                );
            }
            Ok(_) => {}
            Err(error) => segment.add_exception(error),
        }

        result
    }
}
