//! OpenTelemetry GenAI semantic convention attributes for embedding calls.
//!
//! Span naming convention: `"{operation} {model}"`
//! (e.g., `"embeddings text-embedding-3-small"`).

/// The name of the operation being performed.
pub const GEN_AI_OPERATION_NAME: &str = "gen_ai.operation.name";

/// The name of the GenAI provider (e.g., "openai").
pub const GEN_AI_PROVIDER_NAME: &str = "gen_ai.provider.name";

/// The model ID requested.
pub const GEN_AI_REQUEST_MODEL: &str = "gen_ai.request.model";

/// Number of inputs submitted in one embeddings request.
pub const GEN_AI_REQUEST_BATCH_SIZE: &str = "gen_ai.request.batch_size";

/// Dimensionality of the returned vectors.
pub const GEN_AI_EMBEDDINGS_DIMENSION_COUNT: &str = "gen_ai.embeddings.dimension.count";

/// Embeddings operation name value.
pub const OP_EMBEDDINGS: &str = "embeddings";

/// Span for one provider embeddings request.
///
/// `gen_ai.embeddings.dimension.count` starts empty and is recorded once the
/// response arrives.
pub fn embeddings_span(provider: &str, model: &str, batch_size: usize) -> tracing::Span {
    tracing::info_span!(
        "embeddings",
        otel.name = %format!("{OP_EMBEDDINGS} {model}"),
        "gen_ai.operation.name" = OP_EMBEDDINGS,
        "gen_ai.provider.name" = provider,
        "gen_ai.request.model" = model,
        "gen_ai.request.batch_size" = batch_size,
        "gen_ai.embeddings.dimension.count" = tracing::field::Empty,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_declares_convention_fields() {
        tracing::subscriber::with_default(tracing_subscriber::registry(), || {
            let span = embeddings_span("openai", "text-embedding-3-small", 4);
            let fields = span.metadata().expect("span enabled").fields();
            for name in [
                GEN_AI_OPERATION_NAME,
                GEN_AI_PROVIDER_NAME,
                GEN_AI_REQUEST_MODEL,
                GEN_AI_REQUEST_BATCH_SIZE,
                GEN_AI_EMBEDDINGS_DIMENSION_COUNT,
            ] {
                assert!(fields.field(name).is_some(), "missing field {name}");
            }
        });
    }
}
