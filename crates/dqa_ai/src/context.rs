use crate::retrieve::RetrievedSet;

/// Fixed character-to-token ratio, rounded up. An approximation of
/// generator input cost; exactness is not required, only consistency.
pub fn estimate_tokens(text: &str) -> usize {
    text.len().div_ceil(4)
}

/// Render the retrieved set into a single source-annotated context block
/// for the generator.
///
/// Each candidate becomes a `[Source: <filename>, Page: <n>]` header line,
/// the chunk text, and a `---` separator. The token-budget check here is
/// independent of the retriever's own check because header text adds
/// overhead the retriever never counted; rendering truncates the moment the
/// next unit would overflow. Empty input yields an empty string, which
/// downstream treats as "no grounding available".
pub fn assemble_context(retrieved: &RetrievedSet, token_budget: usize) -> String {
    let mut out = String::new();
    let mut total_tokens = 0usize;

    for cand in &retrieved.candidates {
        let unit = format!(
            "[Source: {}, Page: {}]\n{}\n\n---\n\n",
            cand.metadata.filename, cand.metadata.page_number, cand.text
        );
        let est = estimate_tokens(&unit);
        if total_tokens + est > token_budget {
            tracing::info!(
                total_tokens,
                token_budget,
                "stopping context assembly at token budget"
            );
            break;
        }
        out.push_str(&unit);
        total_tokens += est;
    }

    out.trim_end().to_string()
}
