//! Observability for embench: subscriber setup and the span attribute names
//! used when instrumenting embedding calls.

pub mod genai_attrs;
pub mod tracing_setup;
