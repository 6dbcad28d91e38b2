//! Handler tracing.
//!
//! A [`Tracer`] opens one [`Subsegment`] per handler invocation. The
//! subsegment collects annotations (indexed key/value pairs), metadata
//! (arbitrary JSON) and exceptions, and closes when dropped.
//!
//! [`SpanTracer`] is the default: each subsegment is a `tracing` span, so
//! whatever subscriber the host installed receives it.

use serde_json::Value;
use tracing::Span;

use halyard_core::ServiceError;

/// An open unit of traced work.
pub trait Subsegment {
    /// Adds an indexed key/value pair.
    fn put_annotation(&mut self, key: &str, value: Value);

    /// Attaches arbitrary JSON.
    fn put_metadata(&mut self, key: &str, value: Value);

    /// Records an error raised inside the subsegment.
    fn add_exception(&mut self, error: &ServiceError);

    /// The span the traced work runs in. Events the handler emits are
    /// recorded inside it.
    fn scope(&self) -> Span {
        Span::none()
    }
}

/// Opens subsegments.
pub trait Tracer: Send + Sync + 'static {
    /// Opens a subsegment named `name`. It closes when the returned value is
    /// dropped.
    fn begin_subsegment(&self, name: &str) -> Box<dyn Subsegment>;
}

/// Tracer backed by `tracing` spans.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpanTracer;

impl SpanTracer {
    /// Creates a span tracer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Tracer for SpanTracer {
    fn begin_subsegment(&self, name: &str) -> Box<dyn Subsegment> {
        let span = tracing::info_span!("subsegment", name = %name);
        Box::new(SpanSubsegment { span })
    }
}

/// A subsegment recorded as events on a `tracing` span.
#[derive(Debug)]
pub struct SpanSubsegment {
    span: Span,
}

impl SpanSubsegment {
    /// The underlying span.
    #[must_use]
    pub const fn span(&self) -> &Span {
        &self.span
    }
}

impl Subsegment for SpanSubsegment {
    fn put_annotation(&mut self, key: &str, value: Value) {
        tracing::info!(parent: &self.span, annotation = key, value = %value, "annotation");
    }

    fn put_metadata(&mut self, key: &str, value: Value) {
        tracing::debug!(parent: &self.span, metadata = key, value = %value, "metadata");
    }

    fn add_exception(&mut self, error: &ServiceError) {
        tracing::error!(
            parent: &self.span,
            error = %error,
            error_code = error.error_code(),
            "exception"
        );
    }
    fn scope(&self) -> Span {
        self.span.clone()
    }
}
