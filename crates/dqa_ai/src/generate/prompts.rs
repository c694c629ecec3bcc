pub fn grounded_answer_prompt(context: &str, question: &str, refusal_sentinel: &str) -> String {
    // Keep the contract explicit:
    // - Use ONLY the context provided.
    // - Refusal must be the exact sentinel, nothing else.
    // - A trailing confidence line is the single optional structured extra.
    format!(
        r#"You are a strict document-grounded assistant.

Rules (non-negotiable):
1) Answer using ONLY the context below. Do not invent facts.
2) If the context does not contain the answer, respond exactly: {refusal_sentinel}
3) Do not assume anything that is not in the context.
4) If the context contains conflicting information, mention the conflict.
5) Be concise but complete.

Context:
{context}

Question:
{question}

Output:
- Answer in plain text.
- End with a final line of exactly "Confidence: High", "Confidence: Medium", or "Confidence: Low".
"#
    )
}
